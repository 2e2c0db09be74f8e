use std::error::Error as StdError;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use postgres_types::{FromSql, Kind, Type};
use rust_decimal::Decimal;
use serde_json::{Map, Number, Value};

use crate::error::DataAccessError;

/// One record of `user_locations`: column name to JSON value, in column order.
pub type Row = Map<String, Value>;

type DecodeError = Box<dyn StdError + Sync + Send>;

/// Raw wire bytes of one column, `None` for SQL `NULL`.
struct RawColumn<'a>(Option<&'a [u8]>);

impl<'a> FromSql<'a> for RawColumn<'a> {
    fn from_sql(_: &Type, raw: &'a [u8]) -> Result<Self, DecodeError> {
        Ok(RawColumn(Some(raw)))
    }

    fn from_sql_null(_: &Type) -> Result<Self, DecodeError> {
        Ok(RawColumn(None))
    }

    fn accepts(_: &Type) -> bool {
        true
    }
}

/// Converts a Postgres row into a [`Row`], dispatching on each column's type.
pub fn row_to_json(row: &tokio_postgres::Row) -> Result<Row, DataAccessError> {
    let mut record = Map::with_capacity(row.len());

    for (idx, column) in row.columns().iter().enumerate() {
        let RawColumn(raw) = row.try_get(idx)?;
        let value = column_to_json(column.name(), column.type_(), raw)?;
        record.insert(column.name().to_string(), value);
    }

    Ok(record)
}

/// Decodes one column value from its binary wire form.
///
/// SQL `NULL` of any mapped type becomes `null`; a type without a mapping is an
/// [`DataAccessError::UnsupportedColumnType`].
pub fn column_to_json(column: &str, ty: &Type, raw: Option<&[u8]>) -> Result<Value, DataAccessError> {
    let decoded = match *ty {
        Type::BOOL => decode(ty, raw, Value::Bool),
        Type::INT2 => decode(ty, raw, |v: i16| Value::from(v)),
        Type::INT4 => decode(ty, raw, |v: i32| Value::from(v)),
        Type::INT8 => decode(ty, raw, |v: i64| Value::from(v)),
        Type::OID => decode(ty, raw, |v: u32| Value::from(v)),
        Type::FLOAT4 => decode(ty, raw, float4_value),
        Type::FLOAT8 => decode(ty, raw, float8_value),
        Type::NUMERIC => decode(ty, raw, numeric_value),
        Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME | Type::UNKNOWN => {
            decode(ty, raw, Value::String)
        }
        Type::UUID => decode(ty, raw, |v: uuid::Uuid| Value::String(v.to_string())),
        Type::JSON | Type::JSONB => decode(ty, raw, |v: Value| v),
        Type::TIMESTAMPTZ => decode(ty, raw, |v: DateTime<Utc>| Value::String(v.to_rfc3339())),
        Type::TIMESTAMP => decode(ty, raw, timestamp_value),
        Type::DATE => decode(ty, raw, |v: NaiveDate| Value::String(v.to_string())),
        Type::TIME => decode(ty, raw, |v: NaiveTime| Value::String(v.to_string())),
        Type::BYTEA => decode(ty, raw, |v: Vec<u8>| bytea_value(&v)),
        // Enum labels and citext travel as plain UTF-8 text
        _ if is_text_like(ty) => decode(ty, raw, Value::String),
        _ => return Err(DataAccessError::unsupported_column(column, ty.name())),
    };

    decoded.map_err(|source| DataAccessError::decode(column, source))
}

fn is_text_like(ty: &Type) -> bool {
    matches!(ty.kind(), Kind::Enum(_)) || ty.name() == "citext"
}

/// Decodes a nullable value and maps a present one to JSON.
fn decode<'a, T, F>(ty: &Type, raw: Option<&'a [u8]>, map: F) -> Result<Value, DecodeError>
where
    T: FromSql<'a>,
    F: FnOnce(T) -> Value,
{
    let value = Option::<T>::from_sql_nullable(ty, raw)?;
    Ok(value.map(map).unwrap_or(Value::Null))
}

/// Widens through the shortest decimal form so `12.9::real` stays `12.9`.
pub fn float4_value(v: f32) -> Value {
    v.to_string()
        .parse::<f64>()
        .map(float8_value)
        .unwrap_or(Value::Null)
}

/// Non-finite floats have no JSON representation and become `null`.
pub fn float8_value(v: f64) -> Value {
    Number::from_f64(v).map(Value::Number).unwrap_or(Value::Null)
}

/// A JSON number when the decimal survives the trip through `f64`/`i64`
/// with the same value, otherwise its exact decimal string.
pub fn numeric_value(v: Decimal) -> Value {
    let text = v.normalize().to_string();

    match serde_json::from_str::<Value>(&text) {
        Ok(Value::Number(n)) if same_decimal(&n, &v) => Value::Number(n),
        _ => Value::String(text),
    }
}

/// Compares by value: `f64` prints in shortest form, e.g. `1e-7` or `1e20`.
fn same_decimal(n: &Number, v: &Decimal) -> bool {
    let printed = n.to_string();
    Decimal::from_str_exact(&printed)
        .or_else(|_| Decimal::from_scientific(&printed))
        .map(|parsed| parsed == *v)
        .unwrap_or(false)
}

pub fn timestamp_value(v: NaiveDateTime) -> Value {
    Value::String(v.format("%Y-%m-%dT%H:%M:%S%.f").to_string())
}

/// Postgres' hex escape format, e.g. `\x00ff`.
pub fn bytea_value(bytes: &[u8]) -> Value {
    let mut text = String::with_capacity(2 + bytes.len() * 2);
    text.push_str("\\x");
    for byte in bytes {
        text.push_str(&format!("{:02x}", byte));
    }
    Value::String(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    #[test]
    fn test_float4_keeps_short_form() {
        assert_eq!(float4_value(12.9), json!(12.9));
        assert_eq!(float4_value(77.6), json!(77.6));
        assert_eq!(float4_value(f32::NAN), Value::Null);
    }

    #[test]
    fn test_float8_non_finite_is_null() {
        assert_eq!(float8_value(12.9), json!(12.9));
        assert_eq!(float8_value(f64::INFINITY), Value::Null);
        assert_eq!(float8_value(f64::NAN), Value::Null);
    }

    #[test]
    fn test_numeric_as_number_when_exact() {
        assert_eq!(numeric_value(Decimal::from_str("12.90").unwrap()), json!(12.9));
        assert_eq!(numeric_value(Decimal::from_str("42").unwrap()), json!(42));
        assert_eq!(numeric_value(Decimal::from_str("-7.5").unwrap()), json!(-7.5));
    }

    #[test]
    fn test_numeric_exact_in_exponent_form() {
        assert_eq!(numeric_value(Decimal::from_str("0.0000001").unwrap()), json!(1e-7));
        assert_eq!(
            numeric_value(Decimal::from_str("100000000000000000000").unwrap()),
            json!(1e20)
        );
    }

    #[test]
    fn test_numeric_as_string_when_lossy() {
        let precise = Decimal::from_str("0.1234567890123456789").unwrap();
        assert_eq!(numeric_value(precise), json!("0.1234567890123456789"));
    }

    #[test]
    fn test_timestamp_is_iso_8601() {
        let ts = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(9, 30, 5)
            .unwrap();
        assert_eq!(timestamp_value(ts), json!("2024-03-01T09:30:05"));
    }

    #[test]
    fn test_null_of_mapped_type_is_null() {
        assert_eq!(column_to_json("id", &Type::INT4, None).unwrap(), Value::Null);
        assert_eq!(column_to_json("lat", &Type::FLOAT8, None).unwrap(), Value::Null);
        assert_eq!(column_to_json("name", &Type::TEXT, None).unwrap(), Value::Null);
    }

    #[test]
    fn test_scalar_columns_decoded() {
        let id = 1_i32.to_be_bytes();
        assert_eq!(column_to_json("id", &Type::INT4, Some(&id[..])).unwrap(), json!(1));

        let lat = 12.9_f32.to_be_bytes();
        assert_eq!(column_to_json("lat", &Type::FLOAT4, Some(&lat[..])).unwrap(), json!(12.9));

        let lng = 77.6_f64.to_be_bytes();
        assert_eq!(column_to_json("lng", &Type::FLOAT8, Some(&lng[..])).unwrap(), json!(77.6));

        assert_eq!(
            column_to_json("name", &Type::VARCHAR, Some(&b"asha"[..])).unwrap(),
            json!("asha")
        );
        assert_eq!(column_to_json("active", &Type::BOOL, Some(&[1][..])).unwrap(), json!(true));
        assert_eq!(
            column_to_json("meta", &Type::JSONB, Some(&b"\x01{\"accuracy\":5}"[..])).unwrap(),
            json!({"accuracy": 5})
        );
    }

    #[test]
    fn test_enum_and_citext_as_text() {
        let mood = Type::new(
            "mood".to_string(),
            90_001,
            Kind::Enum(vec!["moving".to_string(), "idle".to_string()]),
            "public".to_string(),
        );
        assert_eq!(column_to_json("state", &mood, Some(&b"idle"[..])).unwrap(), json!("idle"));

        let citext = Type::new("citext".to_string(), 90_002, Kind::Simple, "public".to_string());
        assert_eq!(
            column_to_json("email", &citext, Some(&b"A@Example.com"[..])).unwrap(),
            json!("A@Example.com")
        );
    }

    #[test]
    fn test_unmapped_type_is_unsupported() {
        let err = column_to_json("position", &Type::POINT, Some(&[0; 16][..])).unwrap_err();
        assert!(matches!(
            err,
            DataAccessError::UnsupportedColumnType { ref column, ref type_name }
                if column == "position" && type_name == "point"
        ));
    }

    #[test]
    fn test_malformed_bytes_are_decode_fault() {
        let err = column_to_json("id", &Type::INT4, Some(&[0, 1][..])).unwrap_err();
        assert!(matches!(err, DataAccessError::Decode { ref column, .. } if column == "id"));
        assert!(err.fault_message().starts_with("error decoding column \"id\""));
    }

    #[test]
    fn test_bytea_hex() {
        assert_eq!(bytea_value(&[0x00, 0xff, 0x1a]), json!("\\x00ff1a"));
        assert_eq!(bytea_value(&[]), json!("\\x"));
    }
}
