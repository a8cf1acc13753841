use serde_json::Value;
use tokio_postgres::types::Type;

use dbapi_api::Row;

/// Result column as reported by the prepared statement.
#[derive(Debug, Clone)]
pub struct ColumnInfo {
    pub name: String,
    pub ty: Type,
}

/// Build a JSON row from the text values of the simple-query protocol.
///
/// `values` are positional and must line up with `columns`.
pub fn row_to_json<'a>(columns: &[ColumnInfo], values: impl IntoIterator<Item = Option<&'a str>>) -> Row {
    let mut row = Row::new();
    for (column, value) in columns.iter().zip(values) {
        let value = match value {
            Some(text) => text_to_json(&column.ty, text),
            None => Value::Null,
        };
        row.insert(column.name.clone(), value);
    }
    row
}

/// Convert one value from its Postgres text form.
///
/// Booleans, integers, floats and JSON become native JSON; everything else
/// (numeric, dates, arrays, ...) keeps the text form so no precision is lost.
pub fn text_to_json(ty: &Type, text: &str) -> Value {
    let as_text = || Value::String(text.to_owned());
    match ty.name() {
        "bool" => match text {
            "t" => Value::Bool(true),
            "f" => Value::Bool(false),
            _ => as_text(),
        },
        "int2" | "int4" | "int8" | "oid" => text.parse::<i64>().map(Value::from).unwrap_or_else(|_| as_text()),
        "float4" | "float8" => text
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .unwrap_or_else(as_text),
        "json" | "jsonb" => serde_json::from_str(text).unwrap_or_else(|_| as_text()),
        _ => as_text(),
    }
}
