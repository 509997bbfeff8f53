//! The dynamically typed scalar ([`Value`]) and the static-type side of the
//! type resolver ([`ColumnType`] plus the [`with_column_type!`] macro).

use std::cmp::Ordering;
use std::fmt;

use crate::error::{Error, StorageResult};

/// A tagged scalar over the fixed set of supported element types.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Long(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Double(v) => write!(f, "{v}"),
            Self::String(v) => write!(f, "{v}"),
        }
    }
}

/// The static-type side of a column: one implementor per type tag in
/// `{"int", "long", "float", "double", "string"}`.
///
/// This is the bridge the type resolver ([`with_column_type!`]) uses to go from a
/// runtime type-tag string to a concrete `T` that the rest of a scan or segment
/// operation can be monomorphized over.
pub trait ColumnType:
    Clone + fmt::Debug + PartialEq + PartialOrd + Send + Sync + 'static
{
    /// The wire vocabulary tag for this type, e.g. `"int"`.
    const TYPE_TAG: &'static str;

    /// Casts a dynamically typed [`Value`] into this concrete type.
    ///
    /// Numeric casts are lossy-but-deterministic (ordinary `as` truncation/rounding).
    /// Casting a string to a number, or a number to a string, always fails.
    fn from_value(value: &Value) -> StorageResult<Self>;

    /// Wraps this concrete value back up as a dynamically typed [`Value`].
    fn into_value(self) -> Value;

    /// A total order over `Self`, used for dictionary sorting and binary search.
    ///
    /// For floats this resolves NaN payload/sign ordering deterministically (via
    /// `f32::total_cmp`/`f64::total_cmp`) rather than panicking or miscomparing;
    /// for everything else it's the natural `Ord`.
    fn natural_cmp(&self, other: &Self) -> Ordering;
}

impl ColumnType for i32 {
    const TYPE_TAG: &'static str = "int";

    fn from_value(value: &Value) -> StorageResult<Self> {
        match value {
            Value::Int(v) => Ok(*v),
            Value::Long(v) => Ok(*v as Self),
            Value::Float(v) => Ok(*v as Self),
            Value::Double(v) => Ok(*v as Self),
            Value::String(_) => Err(Error::CastFailure {
                value: value.clone(),
                to: Self::TYPE_TAG,
            }),
        }
    }

    fn into_value(self) -> Value {
        Value::Int(self)
    }

    fn natural_cmp(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }
}

impl ColumnType for i64 {
    const TYPE_TAG: &'static str = "long";

    fn from_value(value: &Value) -> StorageResult<Self> {
        match value {
            Value::Int(v) => Ok(*v as Self),
            Value::Long(v) => Ok(*v),
            Value::Float(v) => Ok(*v as Self),
            Value::Double(v) => Ok(*v as Self),
            Value::String(_) => Err(Error::CastFailure {
                value: value.clone(),
                to: Self::TYPE_TAG,
            }),
        }
    }

    fn into_value(self) -> Value {
        Value::Long(self)
    }

    fn natural_cmp(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }
}

impl ColumnType for f32 {
    const TYPE_TAG: &'static str = "float";

    fn from_value(value: &Value) -> StorageResult<Self> {
        match value {
            Value::Int(v) => Ok(*v as Self),
            Value::Long(v) => Ok(*v as Self),
            Value::Float(v) => Ok(*v),
            Value::Double(v) => Ok(*v as Self),
            Value::String(_) => Err(Error::CastFailure {
                value: value.clone(),
                to: Self::TYPE_TAG,
            }),
        }
    }

    fn into_value(self) -> Value {
        Value::Float(self)
    }

    fn natural_cmp(&self, other: &Self) -> Ordering {
        Self::total_cmp(self, other)
    }
}

impl ColumnType for f64 {
    const TYPE_TAG: &'static str = "double";

    fn from_value(value: &Value) -> StorageResult<Self> {
        match value {
            Value::Int(v) => Ok(*v as Self),
            Value::Long(v) => Ok(*v as Self),
            Value::Float(v) => Ok(*v as Self),
            Value::Double(v) => Ok(*v),
            Value::String(_) => Err(Error::CastFailure {
                value: value.clone(),
                to: Self::TYPE_TAG,
            }),
        }
    }

    fn into_value(self) -> Value {
        Value::Double(self)
    }

    fn natural_cmp(&self, other: &Self) -> Ordering {
        Self::total_cmp(self, other)
    }
}

impl ColumnType for String {
    const TYPE_TAG: &'static str = "string";

    fn from_value(value: &Value) -> StorageResult<Self> {
        match value {
            Value::String(v) => Ok(v.clone()),
            _ => Err(Error::CastFailure {
                value: value.clone(),
                to: Self::TYPE_TAG,
            }),
        }
    }

    fn into_value(self) -> Value {
        Value::String(self)
    }

    fn natural_cmp(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }
}

/// The type resolver: given a type-tag string, invokes `$body` exactly once with
/// `$T` bound to the corresponding concrete [`ColumnType`] implementor.
///
/// This is the sole bridge from runtime type tags to statically typed inner
/// loops -- every performance-sensitive path (segment construction, scanning,
/// compression) enters it once and stays monomorphic thereafter. An unknown
/// tag resolves to `Err(Error::UnknownColumnType(..))`; `$body` must therefore
/// evaluate to a `StorageResult<_>` in every arm.
#[macro_export]
macro_rules! with_column_type {
    ($tag:expr, |$T:ident| $body:expr) => {
        match $tag {
            "int" => {
                type $T = i32;
                $body
            }
            "long" => {
                type $T = i64;
                $body
            }
            "float" => {
                type $T = f32;
                $body
            }
            "double" => {
                type $T = f64;
                $body
            }
            "string" => {
                type $T = String;
                $body
            }
            other => Err($crate::error::Error::UnknownColumnType(other.to_string())),
        }
    };
}

/// The exact set of type tags accepted by `add_column` and the type resolver.
pub const SUPPORTED_TYPE_TAGS: [&str; 5] = ["int", "long", "float", "double", "string"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_casts_are_lossy_but_deterministic() {
        assert_eq!(i32::from_value(&Value::Double(3.9)).unwrap(), 3);
        assert_eq!(i64::from_value(&Value::Float(-2.5)).unwrap(), -2);
        assert_eq!(f64::from_value(&Value::Int(7)).unwrap(), 7.0);
    }

    #[test]
    fn string_and_number_casts_fail_both_ways() {
        assert!(i32::from_value(&Value::String("3".into())).is_err());
        assert!(String::from_value(&Value::Int(3)).is_err());
    }

    #[test]
    fn with_column_type_dispatches_on_tag() {
        let resolved_tag: StorageResult<&'static str> = with_column_type!("long", |T| {
            let value: T = T::from_value(&Value::Long(41))?;
            drop(value);
            Ok(T::TYPE_TAG)
        });
        assert_eq!(resolved_tag.unwrap(), "long");
    }

    #[test]
    fn with_column_type_rejects_unknown_tags() {
        let result: StorageResult<i64> = with_column_type!("blob", |T| { Ok(T::TYPE_TAG.len() as i64) });
        assert!(matches!(result, Err(Error::UnknownColumnType(tag)) if tag == "blob"));
    }
}
