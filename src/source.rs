use std::path::Path;

use duckdb::types::ValueRef;
use duckdb::Connection;
use tracing::debug;

use crate::error::SourceError;
use crate::interface::{Record, RecordSet, Value};

macro_rules! text {
    ($value:expr) => {{
        Value::Text($value.to_string())
    }};
}

pub fn open(path: Option<&Path>) -> Result<Connection, SourceError> {
    let conn = match path {
        Some(path) => Connection::open(path)?,
        None => Connection::open_in_memory()?,
    };
    Ok(conn)
}

fn to_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Boolean(e) => Value::Bool(e),
        ValueRef::TinyInt(e) => Value::Int(e.into()),
        ValueRef::SmallInt(e) => Value::Int(e.into()),
        ValueRef::Int(e) => Value::Int(e.into()),
        ValueRef::BigInt(e) => Value::Int(e),
        ValueRef::HugeInt(e) => text!(e),
        ValueRef::UTinyInt(e) => Value::UInt(e.into()),
        ValueRef::USmallInt(e) => Value::UInt(e.into()),
        ValueRef::UInt(e) => Value::UInt(e.into()),
        ValueRef::UBigInt(e) => Value::UInt(e),
        ValueRef::Float(e) => Value::Float(e.into()),
        ValueRef::Double(e) => Value::Float(e),
        ValueRef::Decimal(e) => text!(e),
        // raw counts in the column's unit
        ValueRef::Timestamp(_, e) => Value::Int(e),
        ValueRef::Time64(_, e) => Value::Int(e),
        ValueRef::Date32(e) => Value::Int(e.into()),
        ValueRef::Text(e) => text!(String::from_utf8_lossy(e)),
        ValueRef::Blob(e) => text!(String::from_utf8_lossy(e)),
    }
}

/// Runs the first statement of `sql` and returns its rows, one record per row, with the
/// column names as field names.
pub fn query_records(conn: &Connection, sql: &str) -> Result<RecordSet, SourceError> {
    let first = sql.split(';').next().unwrap_or_default().trim();
    if first.is_empty() {
        return Err(SourceError::EmptyQuery);
    }
    debug!(query = first, "running");

    let mut statement = conn.prepare(first)?;
    let mut rows = statement.query([])?;
    let names: Vec<String> = rows
        .as_ref()
        .map(|statement| statement.column_names())
        .unwrap_or_default();

    let mut records = RecordSet::new();
    while let Some(row) = rows.next()? {
        let mut record = Record::new();
        for (i, name) in names.iter().enumerate() {
            record.insert(name.as_str(), to_value(row.get_ref(i)?));
        }
        records.push(record);
    }
    Ok(records)
}
