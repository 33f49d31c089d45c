//! Field lists of the three survey forms.

use super::{FieldKind, FieldSpec};

const YES_NO: &[&str] = &["yes", "no"];
const YES_NO_SOMETIMES: &[&str] = &["yes", "no", "sometimes"];
const YES_NO_MAYBE: &[&str] = &["yes", "no", "maybe"];
const YES_NO_NOT_SURE: &[&str] = &["yes", "no", "not_sure"];

const REQUIRED: &str = "This field is required";

const fn choice(
    name: &'static str,
    label: &'static str,
    options: &'static [&'static str],
) -> FieldSpec {
    FieldSpec {
        name,
        label,
        kind: FieldKind::Choice(options),
        required: true,
        message: REQUIRED,
    }
}

const fn optional_text(name: &'static str, label: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        label,
        kind: FieldKind::Text,
        required: false,
        message: "",
    }
}

pub const STUDENT_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: "age",
        label: "Your age",
        kind: FieldKind::Integer { positive: true },
        required: true,
        message: "Age is required",
    },
    FieldSpec {
        name: "gender",
        label: "Your gender",
        kind: FieldKind::Choice(&["male", "female", "other"]),
        required: true,
        message: "Gender is required",
    },
    FieldSpec {
        name: "grade",
        label: "Your class",
        kind: FieldKind::Text,
        required: true,
        message: "Class is required",
    },
    FieldSpec {
        name: "device_hours",
        label: "How many hours do you use mobile/computer daily excluding study?",
        kind: FieldKind::Number { positive: true },
        required: true,
        message: REQUIRED,
    },
    choice(
        "device_usage",
        "What do you mostly use your device for?",
        &["games", "social_media", "youtube", "online_classes"],
    ),
    choice(
        "excessive_use",
        "Do you use your phone more than you intend to?",
        YES_NO_SOMETIMES,
    ),
    choice(
        "skip_studies",
        "Do you skip studies for gaming or YouTube?",
        YES_NO_SOMETIMES,
    ),
    choice(
        "irritated_without_phone",
        "Do you feel irritated or restless without your phone?",
        YES_NO_SOMETIMES,
    ),
    choice(
        "night_use",
        "Do you use devices late at night that affect your sleep?",
        YES_NO_SOMETIMES,
    ),
    choice(
        "tried_smoking_gambling",
        "Have you ever tried smoking or online gambling?",
        YES_NO,
    ),
    choice(
        "feel_lonely",
        "Do you often feel lonely, sad, or anxious?",
        YES_NO_SOMETIMES,
    ),
    choice(
        "share_problems",
        "Do you share your problems with friends or stay silent?",
        &["share", "stay_silent", "sometimes"],
    ),
    choice(
        "interested_counseling",
        "Would you be interested in a school wellness program or counseling?",
        YES_NO_MAYBE,
    ),
    optional_text(
        "desired_support",
        "What kind of support or programs would you like from school?",
    ),
    optional_text(
        "suggestions",
        "In your opinion, how can we reduce student digital addiction?",
    ),
];

pub const PARENT_FIELDS: &[FieldSpec] = &[
    choice(
        "child_too_much_time",
        "Do you think your child spends too much time on mobile/internet?",
        YES_NO_NOT_SURE,
    ),
    choice(
        "noticed_anxiety",
        "Have you noticed anxiety, depression, or sleep issues in your child?",
        YES_NO_MAYBE,
    ),
    choice(
        "monitor_activities",
        "Do you monitor your child's online activities regularly?",
        YES_NO_SOMETIMES,
    ),
    choice(
        "aware_counseling",
        "Are you aware of any counseling or awareness program at the school?",
        YES_NO_NOT_SURE,
    ),
    choice(
        "support_school_app",
        "Would you support the use of a school app to track and support student wellbeing?",
        YES_NO_MAYBE,
    ),
    choice(
        "participate_initiatives",
        "Would you be interested in participating in school's anti-addiction initiatives?",
        YES_NO_MAYBE,
    ),
];

pub const TEACHER_FIELDS: &[FieldSpec] = &[
    choice(
        "observed_addiction",
        "Have you observed signs of gadget addiction among students?",
        YES_NO_SOMETIMES,
    ),
    choice(
        "noticed_behavior_changes",
        "Have you noticed reduced focus or behavioral changes in students?",
        YES_NO_SOMETIMES,
    ),
    choice(
        "address_distractions",
        "How do you address digital distractions in class?",
        &["discussions", "rules", "activities", "other"],
    ),
    choice(
        "observed_substance_use",
        "Have you observed any signs of substance or gambling habits?",
        &["yes", "no", "suspected"],
    ),
    choice(
        "participate_counseling",
        "Do you participate in or support counseling/wellness sessions?",
        YES_NO_SOMETIMES,
    ),
    choice(
        "interested_adadc",
        "Are you interested in participating in the ADADC digital program?",
        YES_NO_MAYBE,
    ),
];
