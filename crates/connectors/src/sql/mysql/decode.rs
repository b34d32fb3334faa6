use chrono::{NaiveDate, NaiveDateTime};
use model::{
    core::{data_type::DataType, value::Value},
    records::row::ColumnDescriptor,
};
use mysql_async::{
    Column, Value as MySqlValue,
    consts::{ColumnFlags, ColumnType},
};

pub fn column_descriptor(column: &Column) -> ColumnDescriptor {
    ColumnDescriptor {
        name: column.name_str().to_string(),
        data_type: map_column_type(column.column_type(), column.flags()),
    }
}

/// Maps a wire-level column descriptor to a model data type.
pub fn map_column_type(column_type: ColumnType, flags: ColumnFlags) -> DataType {
    let unsigned = flags.contains(ColumnFlags::UNSIGNED_FLAG);
    let binary = flags.contains(ColumnFlags::BINARY_FLAG);

    match column_type {
        ColumnType::MYSQL_TYPE_TINY => DataType::TinyInt,
        ColumnType::MYSQL_TYPE_SHORT => DataType::SmallInt,
        ColumnType::MYSQL_TYPE_INT24 | ColumnType::MYSQL_TYPE_LONG => DataType::Int,
        ColumnType::MYSQL_TYPE_LONGLONG => {
            if unsigned {
                DataType::BigIntUnsigned
            } else {
                DataType::BigInt
            }
        }
        ColumnType::MYSQL_TYPE_DECIMAL | ColumnType::MYSQL_TYPE_NEWDECIMAL => DataType::Decimal,
        ColumnType::MYSQL_TYPE_FLOAT => DataType::Float,
        ColumnType::MYSQL_TYPE_DOUBLE => DataType::Double,
        ColumnType::MYSQL_TYPE_DATE | ColumnType::MYSQL_TYPE_NEWDATE => DataType::Date,
        ColumnType::MYSQL_TYPE_TIME | ColumnType::MYSQL_TYPE_TIME2 => DataType::Time,
        ColumnType::MYSQL_TYPE_DATETIME | ColumnType::MYSQL_TYPE_DATETIME2 => DataType::DateTime,
        ColumnType::MYSQL_TYPE_TIMESTAMP | ColumnType::MYSQL_TYPE_TIMESTAMP2 => {
            DataType::Timestamp
        }
        ColumnType::MYSQL_TYPE_YEAR => DataType::Year,
        ColumnType::MYSQL_TYPE_VARCHAR | ColumnType::MYSQL_TYPE_VAR_STRING => DataType::VarChar,
        ColumnType::MYSQL_TYPE_STRING => {
            if binary {
                DataType::Blob
            } else {
                DataType::Char
            }
        }
        ColumnType::MYSQL_TYPE_TINY_BLOB
        | ColumnType::MYSQL_TYPE_MEDIUM_BLOB
        | ColumnType::MYSQL_TYPE_LONG_BLOB
        | ColumnType::MYSQL_TYPE_BLOB => {
            // TEXT columns share the blob type codes; the binary flag is
            // what actually separates them.
            if binary {
                DataType::Blob
            } else {
                DataType::Text
            }
        }
        ColumnType::MYSQL_TYPE_JSON => DataType::Json,
        ColumnType::MYSQL_TYPE_ENUM => DataType::Enum,
        ColumnType::MYSQL_TYPE_SET => DataType::Set,
        ColumnType::MYSQL_TYPE_BIT => DataType::Bit,
        ColumnType::MYSQL_TYPE_GEOMETRY => DataType::Geometry,
        ColumnType::MYSQL_TYPE_NULL => DataType::Null,
        other => DataType::Custom(format!("{other:?}")),
    }
}

/// Decodes one raw driver value into a model value, guided by the column
/// type. The text protocol delivers almost everything as bytes, so most
/// arms parse; decoding is lenient and falls back to a string (or raw
/// bytes) rather than failing a whole row over one odd cell.
pub fn decode_value(raw: MySqlValue, data_type: &DataType) -> Value {
    match raw {
        MySqlValue::NULL => Value::Null,
        MySqlValue::Int(v) => Value::Int(v),
        MySqlValue::UInt(v) => Value::Uint(v),
        MySqlValue::Float(v) => Value::Float(v as f64),
        MySqlValue::Double(v) => Value::Float(v),
        MySqlValue::Date(year, month, day, hour, minute, second, micros) => {
            decode_temporal(year, month, day, hour, minute, second, micros, data_type)
        }
        MySqlValue::Time(negative, days, hours, minutes, seconds, micros) => Value::String(
            render_time(negative, days, hours, minutes, seconds, micros),
        ),
        MySqlValue::Bytes(bytes) => decode_bytes(bytes, data_type),
    }
}

fn decode_bytes(bytes: Vec<u8>, data_type: &DataType) -> Value {
    match data_type {
        DataType::Blob | DataType::Geometry | DataType::Bit => Value::Bytes(bytes),
        _ => {
            let text = match String::from_utf8(bytes) {
                Ok(text) => text,
                Err(err) => return Value::Bytes(err.into_bytes()),
            };
            decode_text(text, data_type)
        }
    }
}

fn decode_text(text: String, data_type: &DataType) -> Value {
    match data_type {
        DataType::TinyInt | DataType::SmallInt | DataType::Int | DataType::BigInt => {
            text.parse::<i64>().map(Value::Int).unwrap_or(Value::String(text))
        }
        DataType::BigIntUnsigned => text
            .parse::<u64>()
            .map(Value::Uint)
            .unwrap_or(Value::String(text)),
        DataType::Float | DataType::Double => text
            .parse::<f64>()
            .map(Value::Float)
            .unwrap_or(Value::String(text)),
        DataType::Year => text.parse::<i64>().map(Value::Int).unwrap_or(Value::String(text)),
        DataType::Date => NaiveDate::parse_from_str(&text, "%Y-%m-%d")
            .map(Value::Date)
            .unwrap_or(Value::String(text)),
        DataType::DateTime | DataType::Timestamp => {
            NaiveDateTime::parse_from_str(&text, "%Y-%m-%d %H:%M:%S%.f")
                .map(|naive| Value::Timestamp(naive.and_utc()))
                .unwrap_or(Value::String(text))
        }
        DataType::Json => serde_json::from_str(&text)
            .map(Value::Json)
            .unwrap_or(Value::String(text)),
        // DECIMAL stays textual on purpose: exports render it verbatim
        // instead of rounding through f64.
        _ => Value::String(text),
    }
}

#[allow(clippy::too_many_arguments)]
fn decode_temporal(
    year: u16,
    month: u8,
    day: u8,
    hour: u8,
    minute: u8,
    second: u8,
    micros: u32,
    data_type: &DataType,
) -> Value {
    let date = NaiveDate::from_ymd_opt(year as i32, month as u32, day as u32);
    let Some(date) = date else {
        return Value::Null;
    };

    if matches!(data_type, DataType::Date) {
        return Value::Date(date);
    }

    date.and_hms_micro_opt(hour as u32, minute as u32, second as u32, micros)
        .map(|naive| Value::Timestamp(naive.and_utc()))
        .unwrap_or(Value::Date(date))
}

fn render_time(negative: bool, days: u32, hours: u8, minutes: u8, seconds: u8, micros: u32) -> String {
    let sign = if negative { "-" } else { "" };
    let total_hours = days * 24 + hours as u32;
    if micros > 0 {
        format!("{sign}{total_hours:02}:{minutes:02}:{seconds:02}.{micros:06}")
    } else {
        format!("{sign}{total_hours:02}:{minutes:02}:{seconds:02}")
    }
}
