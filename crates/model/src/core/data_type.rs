use serde::{Deserialize, Serialize};

/// Column type tag carried alongside every field value. Derived from the
/// MySQL column descriptor by the connector; sinks use it to pick output
/// column types.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum DataType {
    TinyInt,
    SmallInt,
    Int,
    BigInt,
    BigIntUnsigned,
    Decimal,
    Float,
    Double,
    Boolean,
    Char,
    VarChar,
    Text,
    Blob,
    Date,
    Time,
    DateTime,
    Timestamp,
    Year,
    Json,
    Enum,
    Set,
    Bit,
    Geometry,
    Null,
    Custom(String),
}

impl DataType {
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            DataType::TinyInt
                | DataType::SmallInt
                | DataType::Int
                | DataType::BigInt
                | DataType::BigIntUnsigned
                | DataType::Decimal
                | DataType::Float
                | DataType::Double
        )
    }

    pub fn is_textual(&self) -> bool {
        matches!(
            self,
            DataType::Char | DataType::VarChar | DataType::Text | DataType::Enum | DataType::Set
        )
    }
}
