//! Survey forms: declarative field lists with validation, and submission.
//!
//! Each [`EntityKind`] has one form. A form validates raw text input (as typed
//! into the submission CLI or read from a JSON file) and produces a record
//! ready for [`RecordStore::insert`]. Validation reports every failing field,
//! not only the first one.

mod forms;

use std::collections::BTreeMap;
use std::fmt;

use tracing::{info, warn};

use crate::model::{ColumnType, EntityKind, Row, Value};
use crate::store::{RecordStore, StoreError};

pub use forms::{PARENT_FIELDS, STUDENT_FIELDS, TEACHER_FIELDS};

/// Acknowledgement shown after a successful submission.
pub const SUBMITTED_MESSAGE: &str = "Survey submitted successfully!";

/// Acknowledgement shown after a failed submission. There is no retry.
pub const FAILED_MESSAGE: &str = "Error submitting survey. Please try again.";

/// Input kind of one form field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    /// Whole number; `positive` rejects zero and negatives.
    Integer { positive: bool },
    /// Any number; `positive` rejects zero and negatives.
    Number { positive: bool },
    /// One of a fixed set of option values.
    Choice(&'static [&'static str]),
    /// Free text.
    Text,
}

impl FieldKind {
    pub fn column_type(&self) -> ColumnType {
        match self {
            FieldKind::Integer { .. } => ColumnType::Integer,
            FieldKind::Number { .. } => ColumnType::Number,
            FieldKind::Choice(_) | FieldKind::Text => ColumnType::Text,
        }
    }
}

/// One form field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    /// Column name in the survey table.
    pub name: &'static str,
    /// Question shown to the respondent.
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    /// Message reported when a required field is missing.
    pub message: &'static str,
}

/// A single validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Errors returned by [`submit`].
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitError {
    Invalid(Vec<FieldError>),
    Store(StoreError),
}

impl fmt::Display for SubmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmitError::Invalid(errors) => {
                let parts: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
                write!(f, "invalid survey: {}", parts.join("; "))
            }
            SubmitError::Store(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for SubmitError {}

impl From<StoreError> for SubmitError {
    fn from(e: StoreError) -> Self {
        SubmitError::Store(e)
    }
}

/// Form definition for one survey population.
#[derive(Debug, Clone, Copy)]
pub struct SurveyForm {
    pub kind: EntityKind,
    pub title: &'static str,
    pub fields: &'static [FieldSpec],
}

impl SurveyForm {
    pub fn for_kind(kind: EntityKind) -> SurveyForm {
        match kind {
            EntityKind::Student => SurveyForm {
                kind,
                title: "Student Survey",
                fields: STUDENT_FIELDS,
            },
            EntityKind::Parent => SurveyForm {
                kind,
                title: "Parent Survey",
                fields: PARENT_FIELDS,
            },
            EntityKind::Teacher => SurveyForm {
                kind,
                title: "Teacher Survey",
                fields: TEACHER_FIELDS,
            },
        }
    }

    pub fn field(&self, name: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Validates raw input and builds the record to insert.
    ///
    /// Values are trimmed; blank values count as missing. Fields are emitted
    /// in form order; optional text left blank is omitted.
    pub fn validate(&self, input: &BTreeMap<String, String>) -> Result<Row, Vec<FieldError>> {
        let mut errors = Vec::new();

        for name in input.keys() {
            if self.field(name).is_none() {
                errors.push(FieldError::new(name, "unknown field"));
            }
        }

        let mut record = Row::new();
        for spec in self.fields {
            let raw = input.get(spec.name).map(|s| s.trim()).unwrap_or("");
            if raw.is_empty() {
                if spec.required {
                    errors.push(FieldError::new(spec.name, spec.message));
                }
                continue;
            }
            match parse_field(spec, raw) {
                Ok(value) => record.set(spec.name, value),
                Err(message) => errors.push(FieldError::new(spec.name, message)),
            }
        }

        if errors.is_empty() {
            Ok(record)
        } else {
            Err(errors)
        }
    }
}

fn parse_field(spec: &FieldSpec, raw: &str) -> Result<Value, String> {
    match spec.kind {
        FieldKind::Integer { positive } => {
            let n: i64 = raw
                .parse()
                .map_err(|_| "must be a whole number".to_string())?;
            if positive && n <= 0 {
                return Err("must be a positive number".to_string());
            }
            Ok(Value::from(n))
        }
        FieldKind::Number { positive } => {
            let n: f64 = raw.parse().map_err(|_| "must be a number".to_string())?;
            if !n.is_finite() {
                return Err("must be a number".to_string());
            }
            if positive && n <= 0.0 {
                return Err("must be a positive number".to_string());
            }
            Ok(Value::Number(n))
        }
        FieldKind::Choice(options) => {
            if options.contains(&raw) {
                Ok(Value::from(raw))
            } else {
                Err(format!("must be one of: {}", options.join(", ")))
            }
        }
        FieldKind::Text => Ok(Value::from(raw)),
    }
}

/// Inserts a validated record into the kind's table.
///
/// Store failures are logged and returned; nothing is retried.
pub fn submit(store: &dyn RecordStore, kind: EntityKind, record: &Row) -> Result<(), SubmitError> {
    let table = kind.table_name();
    match store.insert(table, record) {
        Ok(()) => {
            info!(table, fields = record.len(), "survey submitted");
            Ok(())
        }
        Err(e) => {
            warn!(table, error = %e, "survey submission failed");
            Err(SubmitError::Store(e))
        }
    }
}

/// Validates and submits in one step.
pub fn validate_and_submit(
    store: &dyn RecordStore,
    kind: EntityKind,
    input: &BTreeMap<String, String>,
) -> Result<Row, SubmitError> {
    let record = SurveyForm::for_kind(kind)
        .validate(input)
        .map_err(SubmitError::Invalid)?;
    submit(store, kind, &record)?;
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn input(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn valid_student() -> BTreeMap<String, String> {
        input(&[
            ("age", "14"),
            ("gender", "female"),
            ("grade", "8"),
            ("device_hours", "3.5"),
            ("device_usage", "social_media"),
            ("excessive_use", "sometimes"),
            ("skip_studies", "no"),
            ("irritated_without_phone", "yes"),
            ("night_use", "yes"),
            ("tried_smoking_gambling", "no"),
            ("feel_lonely", "sometimes"),
            ("share_problems", "stay_silent"),
            ("interested_counseling", "maybe"),
        ])
    }

    #[test]
    fn valid_student_record() {
        let record = SurveyForm::for_kind(EntityKind::Student)
            .validate(&valid_student())
            .unwrap();
        assert_eq!(record.value("age"), &Value::Number(14.0));
        assert_eq!(record.value("device_hours"), &Value::Number(3.5));
        assert_eq!(record.value("grade"), &Value::from("8"));
        // Optional text left out entirely.
        assert!(record.get("suggestions").is_none());
        // Form order is kept.
        let first: Vec<&str> = record.fields().map(|(n, _)| n).take(3).collect();
        assert_eq!(first, vec!["age", "gender", "grade"]);
    }

    #[test]
    fn missing_required_fields_report_messages() {
        let mut data = valid_student();
        data.remove("age");
        data.remove("grade");
        data.insert("night_use".to_string(), "   ".to_string());
        let errors = SurveyForm::for_kind(EntityKind::Student)
            .validate(&data)
            .unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.contains(&FieldError::new("age", "Age is required")));
        assert!(errors.contains(&FieldError::new("grade", "Class is required")));
        assert!(errors.contains(&FieldError::new("night_use", "This field is required")));
    }

    #[test]
    fn numbers_must_be_positive() {
        let mut data = valid_student();
        data.insert("age".to_string(), "-3".to_string());
        data.insert("device_hours".to_string(), "0".to_string());
        let errors = SurveyForm::for_kind(EntityKind::Student)
            .validate(&data)
            .unwrap_err();
        assert_eq!(errors.len(), 2);

        data.insert("age".to_string(), "13.5".to_string());
        data.insert("device_hours".to_string(), "2".to_string());
        let errors = SurveyForm::for_kind(EntityKind::Student)
            .validate(&data)
            .unwrap_err();
        assert_eq!(errors, vec![FieldError::new("age", "must be a whole number")]);
    }

    #[test]
    fn choices_and_unknown_fields_are_checked() {
        let data = input(&[
            ("observed_addiction", "yes"),
            ("noticed_behavior_changes", "sometimes"),
            ("address_distractions", "shouting"),
            ("observed_substance_use", "suspected"),
            ("participate_counseling", "no"),
            ("interested_adadc", "maybe"),
            ("favourite_colour", "blue"),
        ]);
        let errors = SurveyForm::for_kind(EntityKind::Teacher)
            .validate(&data)
            .unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0], FieldError::new("favourite_colour", "unknown field"));
        assert_eq!(errors[1].field, "address_distractions");
        assert!(errors[1].message.contains("discussions"));
    }

    #[test]
    fn parent_form_requires_every_field() {
        let errors = SurveyForm::for_kind(EntityKind::Parent)
            .validate(&BTreeMap::new())
            .unwrap_err();
        assert_eq!(errors.len(), PARENT_FIELDS.len());
    }

    #[test]
    fn submit_inserts_into_kind_table() {
        let store = MemoryStore::with_survey_tables();
        let record = validate_and_submit(&store, EntityKind::Student, &valid_student()).unwrap();
        assert_eq!(record.value("gender"), &Value::from("female"));
        assert_eq!(store.count("student_surveys", None).unwrap(), 1);
        assert_eq!(store.count("parent_surveys", None).unwrap(), 0);
    }

    #[test]
    fn invalid_input_is_not_submitted() {
        let store = MemoryStore::with_survey_tables();
        let err = validate_and_submit(&store, EntityKind::Parent, &BTreeMap::new()).unwrap_err();
        assert!(matches!(err, SubmitError::Invalid(_)));
        assert_eq!(store.count("parent_surveys", None).unwrap(), 0);
    }

    #[test]
    fn store_failure_surfaces_as_submit_error() {
        let store = MemoryStore::new();
        let record = Row::new().with("noticed_anxiety", "yes");
        let err = submit(&store, EntityKind::Parent, &record).unwrap_err();
        assert!(matches!(err, SubmitError::Store(StoreError::SchemaMismatch(_))));
    }
}
