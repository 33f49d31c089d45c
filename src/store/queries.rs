//! SQL builders for the Postgres record store.
//!
//! Table and column names are interpolated as quoted identifiers; values are
//! always passed as bind parameters.

/// Quotes an identifier, doubling embedded quotes.
pub(crate) fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// WHERE clause shape of a count query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CountFilter<'a> {
    All,
    /// `column::text = $1`
    Equals(&'a str),
    IsNull(&'a str),
}

pub(crate) fn build_count_query(table: &str, filter: CountFilter<'_>) -> String {
    match filter {
        CountFilter::All => format!("SELECT count(*) FROM {}", quote_ident(table)),
        // Text comparison keeps the bind type independent of the column type.
        CountFilter::Equals(column) => format!(
            "SELECT count(*) FROM {} WHERE {}::text = $1",
            quote_ident(table),
            quote_ident(column)
        ),
        CountFilter::IsNull(column) => format!(
            "SELECT count(*) FROM {} WHERE {} IS NULL",
            quote_ident(table),
            quote_ident(column)
        ),
    }
}

/// Column names and types of a table in the current search path.
pub(crate) fn build_columns_query() -> &'static str {
    "SELECT column_name::text, data_type::text \
     FROM information_schema.columns \
     WHERE table_schema = current_schema() AND table_name = $1 \
     ORDER BY ordinal_position"
}

/// Page of rows as JSON objects; `$1` = limit, `$2` = offset.
pub(crate) fn build_rows_query(table: &str) -> String {
    format!(
        "SELECT to_jsonb(t) FROM {} AS t ORDER BY t.\"id\" LIMIT $1 OFFSET $2",
        quote_ident(table)
    )
}

/// Insert of one JSON record; the server coerces each field to the column type.
pub(crate) fn build_insert_query(table: &str, columns: &[&str]) -> String {
    let table = quote_ident(table);
    let cols = columns
        .iter()
        .map(|c| quote_ident(c))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "INSERT INTO {table} ({cols}) SELECT {cols} FROM jsonb_populate_record(NULL::{table}, $1)"
    )
}

/// Grouped value counts; values come back as JSON to keep their type.
pub(crate) fn build_distribution_query(table: &str, column: &str) -> String {
    let column = quote_ident(column);
    format!(
        "SELECT to_jsonb({column}), count(*) FROM {} GROUP BY {column} ORDER BY {column} NULLS LAST",
        quote_ident(table)
    )
}
