//! In-process record store.
//!
//! Tables live behind one `RwLock`; readers (count, schema, page fetch) run
//! concurrently, inserts take the write lock. Rows are kept in `id` order.
//! `demo()` seeds the three survey tables with deterministic data so the
//! viewer and the dashboard can run without a database.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::debug;

use super::{Filter, RecordStore, StoreError};
use crate::model::{ColumnDescriptor, ColumnType, EntityKind, ROW_ID_FIELD, Row, Value};
use crate::survey::{FieldKind, SurveyForm};

/// Column stamped with the insert time when a record does not carry one.
const CREATED_AT_FIELD: &str = "created_at";

/// Rows seeded per kind by [`MemoryStore::demo`].
const DEMO_STUDENTS: usize = 23;
const DEMO_PARENTS: usize = 12;
const DEMO_TEACHERS: usize = 8;

/// 2024-01-05T10:00:00Z, first demo submission.
const DEMO_EPOCH: i64 = 1_704_448_800;
/// Seven hours between demo submissions.
const DEMO_STEP_SECS: i64 = 25_200;

const DEMO_SUGGESTIONS: &[&str] = &[
    "more sports periods",
    "phone free days",
    "talk with a counselor",
    "parents should set limits",
];

#[derive(Debug, Default)]
struct Table {
    columns: Vec<ColumnDescriptor>,
    rows: Vec<Row>,
    next_id: u64,
}

impl Table {
    fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.raw_name == name)
    }
}

/// Record store holding its tables in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<String, Table>>,
}

impl MemoryStore {
    /// Store without any tables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty survey tables with the columns of the three forms.
    pub fn with_survey_tables() -> Self {
        let store = Self::new();
        for kind in EntityKind::all() {
            store.create_table(kind.table_name(), survey_columns(*kind));
        }
        store
    }

    /// Survey tables seeded with deterministic demo submissions.
    pub fn demo() -> Self {
        let store = Self::with_survey_tables();
        let mut rng = DemoRng::new(0x5eed_cafe);
        let mut seq = 0i64;
        for (kind, n) in [
            (EntityKind::Student, DEMO_STUDENTS),
            (EntityKind::Parent, DEMO_PARENTS),
            (EntityKind::Teacher, DEMO_TEACHERS),
        ] {
            for _ in 0..n {
                let mut record = demo_record(kind, &mut rng);
                if let Some(ts) = DateTime::<Utc>::from_timestamp(DEMO_EPOCH + seq * DEMO_STEP_SECS, 0)
                {
                    record.set(
                        CREATED_AT_FIELD,
                        ts.to_rfc3339_opts(SecondsFormat::Secs, true),
                    );
                }
                seq += 1;
                store.push(kind.table_name(), record);
            }
        }
        store
    }

    /// Creates (or replaces) a table with the given columns.
    pub fn create_table(&self, name: &str, columns: Vec<ColumnDescriptor>) {
        self.write().insert(
            name.to_string(),
            Table {
                columns,
                rows: Vec::new(),
                next_id: 1,
            },
        );
    }

    fn push(&self, table: &str, record: Row) {
        if let Some(t) = self.write().get_mut(table) {
            let id = t.next_id;
            t.next_id += 1;
            t.rows.push(complete_row(&t.columns, id, record));
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Table>> {
        match self.tables.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Table>> {
        match self.tables.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

fn unknown_table(table: &str) -> StoreError {
    StoreError::SchemaMismatch(format!("relation \"{}\" does not exist", table))
}

fn unknown_column(table: &str, column: &str) -> StoreError {
    StoreError::SchemaMismatch(format!(
        "column \"{}\" of relation \"{}\" does not exist",
        column, table
    ))
}

/// Lays a record out in column order: `id` assigned, missing fields null.
fn complete_row(columns: &[ColumnDescriptor], id: u64, mut record: Row) -> Row {
    if record.get(ROW_ID_FIELD).is_none() {
        record.set(ROW_ID_FIELD, id as f64);
    }
    columns
        .iter()
        .map(|c| (c.raw_name.clone(), record.value(&c.raw_name).clone()))
        .collect()
}

impl RecordStore for MemoryStore {
    fn count(&self, table: &str, filter: Option<&Filter>) -> Result<u64, StoreError> {
        let tables = self.read();
        let t = tables.get(table).ok_or_else(|| unknown_table(table))?;
        match filter {
            None => Ok(t.rows.len() as u64),
            Some(f) => {
                if !t.has_column(&f.column) {
                    return Err(unknown_column(table, &f.column));
                }
                Ok(t.rows.iter().filter(|r| f.matches(r)).count() as u64)
            }
        }
    }

    fn columns(&self, table: &str) -> Result<Vec<ColumnDescriptor>, StoreError> {
        let tables = self.read();
        let t = tables.get(table).ok_or_else(|| unknown_table(table))?;
        Ok(t.columns.clone())
    }

    fn rows(&self, table: &str, offset: u64, limit: u64) -> Result<Vec<Row>, StoreError> {
        let tables = self.read();
        let t = tables.get(table).ok_or_else(|| unknown_table(table))?;
        Ok(t.rows
            .iter()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    fn insert(&self, table: &str, record: &Row) -> Result<(), StoreError> {
        if record.is_empty() {
            return Err(StoreError::Rejected("empty record".to_string()));
        }
        let mut tables = self.write();
        let t = tables.get_mut(table).ok_or_else(|| unknown_table(table))?;
        if let Some((name, _)) = record.fields().find(|(name, _)| !t.has_column(name)) {
            return Err(unknown_column(table, name));
        }

        let mut record = record.clone();
        if record.value(CREATED_AT_FIELD).is_null() && t.has_column(CREATED_AT_FIELD) {
            record.set(
                CREATED_AT_FIELD,
                Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            );
        }
        let id = t.next_id;
        t.next_id += 1;
        t.rows.push(complete_row(&t.columns, id, record));
        debug!(table, id, "record inserted");
        Ok(())
    }

    fn distribution(&self, table: &str, column: &str) -> Result<Vec<(Value, u64)>, StoreError> {
        let tables = self.read();
        let t = tables.get(table).ok_or_else(|| unknown_table(table))?;
        if !t.has_column(column) {
            return Err(unknown_column(table, column));
        }

        let mut groups: Vec<(Value, u64)> = Vec::new();
        for row in &t.rows {
            let value = row.value(column);
            match groups.iter_mut().find(|(v, _)| v == value) {
                Some(group) => group.1 += 1,
                None => groups.push((value.clone(), 1)),
            }
        }
        groups.sort_by(|a, b| compare_values(&a.0, &b.0));
        Ok(groups)
    }

    fn describe(&self) -> String {
        "memory (demo data)".to_string()
    }
}

/// Value order used for grouped results; nulls sort last.
fn compare_values(a: &Value, b: &Value) -> Ordering {
    fn rank(v: &Value) -> u8 {
        match v {
            Value::Bool(_) => 0,
            Value::Number(_) => 1,
            Value::String(_) => 2,
            Value::Null => 3,
        }
    }
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => x.total_cmp(y),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

/// Columns of a survey table: `id`, `created_at`, then the form fields.
fn survey_columns(kind: EntityKind) -> Vec<ColumnDescriptor> {
    let mut columns = vec![
        ColumnDescriptor::typed(ROW_ID_FIELD, ColumnType::Integer),
        ColumnDescriptor::typed(CREATED_AT_FIELD, ColumnType::Timestamp),
    ];
    columns.extend(
        SurveyForm::for_kind(kind)
            .fields
            .iter()
            .map(|f| ColumnDescriptor::typed(f.name, f.kind.column_type())),
    );
    columns
}

fn demo_record(kind: EntityKind, rng: &mut DemoRng) -> Row {
    let mut record = Row::new();
    for field in SurveyForm::for_kind(kind).fields {
        let value = match field.kind {
            FieldKind::Integer { .. } => Value::from(12 + rng.below(6) as i64),
            FieldKind::Number { .. } => Value::Number(0.5 * (1 + rng.below(20)) as f64),
            FieldKind::Choice(options) => Value::from(options[rng.below(options.len() as u64) as usize]),
            FieldKind::Text if field.required => Value::from((6 + rng.below(5)).to_string()),
            FieldKind::Text => match rng.below(2 * DEMO_SUGGESTIONS.len() as u64) as usize {
                i if i < DEMO_SUGGESTIONS.len() => Value::from(DEMO_SUGGESTIONS[i]),
                _ => Value::Null,
            },
        };
        record.set(field.name, value);
    }
    record
}

/// xorshift64; only used to spread demo answers.
struct DemoRng(u64);

impl DemoRng {
    fn new(seed: u64) -> Self {
        Self(seed.max(1))
    }

    fn below(&mut self, n: u64) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        if n == 0 { 0 } else { x % n }
    }
}
