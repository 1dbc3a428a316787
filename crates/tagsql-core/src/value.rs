use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

///
/// Value
///
/// Dynamically typed cell exchanged with the backend boundary.
/// Bound arguments are read out of a record as `Value`s and scanned
/// result columns are written back from them.
///
/// Null → the attribute is `Option::None` (SQL NULL).
///

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    Text(String),
    Blob(Vec<u8>),
    #[serde(with = "time::serde::rfc3339")]
    Timestamp(OffsetDateTime),
}

impl Value {
    /// Short variant label used in binding diagnostics.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Uint(_) => "uint",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::Blob(_) => "blob",
            Self::Timestamp(_) => "timestamp",
        }
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    // Integer views shared by the integer conversions.
    fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            Self::Uint(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Uint(v) => Some(*v),
            Self::Int(v) => u64::try_from(*v).ok(),
            _ => None,
        }
    }
}

///
/// FieldValue
///
/// Conversion boundary between a leaf attribute type and `Value`.
/// `from_value` returns `None` when the value does not fit the type.
///

pub trait FieldValue {
    fn to_value(&self) -> Value;

    #[must_use]
    fn from_value(value: &Value) -> Option<Self>
    where
        Self: Sized;
}

impl FieldValue for bool {
    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }
}

impl FieldValue for String {
    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Text(v) => Some(v.clone()),
            _ => None,
        }
    }
}

impl FieldValue for Vec<u8> {
    fn to_value(&self) -> Value {
        Value::Blob(self.clone())
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Blob(v) => Some(v.clone()),
            _ => None,
        }
    }
}

impl FieldValue for OffsetDateTime {
    fn to_value(&self) -> Value {
        Value::Timestamp(*self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Timestamp(v) => Some(*v),
            _ => None,
        }
    }
}

impl FieldValue for f64 {
    fn to_value(&self) -> Value {
        Value::Float(*self)
    }

    #[expect(clippy::cast_precision_loss)]
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Float(v) => Some(*v),
            Value::Int(v) => Some(*v as Self),
            Value::Uint(v) => Some(*v as Self),
            _ => None,
        }
    }
}

impl FieldValue for f32 {
    fn to_value(&self) -> Value {
        Value::Float(f64::from(*self))
    }

    #[expect(clippy::cast_possible_truncation)]
    fn from_value(value: &Value) -> Option<Self> {
        f64::from_value(value).map(|v| v as Self)
    }
}

impl<T: FieldValue> FieldValue for Option<T> {
    fn to_value(&self) -> Value {
        match self {
            Some(v) => v.to_value(),
            None => Value::Null,
        }
    }

    fn from_value(value: &Value) -> Option<Self> {
        if value.is_null() {
            return Some(None);
        }

        T::from_value(value).map(Some)
    }
}

impl<T: FieldValue> FieldValue for Box<T> {
    fn to_value(&self) -> Value {
        (**self).to_value()
    }

    fn from_value(value: &Value) -> Option<Self> {
        T::from_value(value).map(Self::new)
    }
}

// impl_signed_field_value
macro_rules! impl_signed_field_value {
    ( $( $type:ty ),* $(,)? ) => {
        $(
            impl FieldValue for $type {
                fn to_value(&self) -> Value {
                    Value::Int(i64::from(*self))
                }

                fn from_value(value: &Value) -> Option<Self> {
                    value.as_i64().and_then(|v| <$type>::try_from(v).ok())
                }
            }
        )*
    };
}

// impl_unsigned_field_value
macro_rules! impl_unsigned_field_value {
    ( $( $type:ty ),* $(,)? ) => {
        $(
            impl FieldValue for $type {
                fn to_value(&self) -> Value {
                    Value::Uint(u64::from(*self))
                }

                fn from_value(value: &Value) -> Option<Self> {
                    value.as_u64().and_then(|v| <$type>::try_from(v).ok())
                }
            }
        )*
    };
}

impl_signed_field_value!(i8, i16, i32, i64);
impl_unsigned_field_value!(u8, u16, u32, u64);
