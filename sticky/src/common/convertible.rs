use crate::collection::{Document, ObjectId};
use crate::common::Value;
use crate::errors::{ErrorKind, StickyError, StickyResult};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;
use std::str::FromStr;

/// Two-way mapping between a Rust value and a document [Value].
///
/// `to_value` produces the serialized form written to the store and
/// `from_value` rebuilds the Rust value, failing with
/// [ErrorKind::ValidationError] when the stored value does not fit.
pub trait Convertible {
    type Output;

    fn to_value(&self) -> StickyResult<Value>;
    fn from_value(value: &Value) -> StickyResult<Self::Output>;
}

/// Converts a stored value into `T`, used by derived conversions.
pub fn from_value<T: Convertible>(value: &Value) -> StickyResult<T::Output> {
    T::from_value(value)
}

fn mismatch(value: &Value, expected: &str) -> StickyError {
    log::error!("Value {} is not {}", value, expected);
    StickyError::new(
        &format!("Value {} is not {}", value, expected),
        ErrorKind::ValidationError,
    )
}

macro_rules! impl_convertible_for_signed {
    ($($ty:ty),*) => {
        $(
            impl Convertible for $ty {
                type Output = $ty;

                fn to_value(&self) -> StickyResult<Value> {
                    Ok(Value::I64(*self as i64))
                }

                fn from_value(value: &Value) -> StickyResult<Self> {
                    value
                        .as_i64()
                        .and_then(|i| <$ty>::try_from(i).ok())
                        .ok_or_else(|| mismatch(value, concat!("a valid ", stringify!($ty))))
                }
            }
        )*
    };
}

macro_rules! impl_convertible_for_unsigned {
    ($($ty:ty),*) => {
        $(
            impl Convertible for $ty {
                type Output = $ty;

                fn to_value(&self) -> StickyResult<Value> {
                    Ok(Value::U64(*self as u64))
                }

                fn from_value(value: &Value) -> StickyResult<Self> {
                    value
                        .as_u64()
                        .and_then(|u| <$ty>::try_from(u).ok())
                        .ok_or_else(|| mismatch(value, concat!("a valid ", stringify!($ty))))
                }
            }
        )*
    };
}

impl_convertible_for_signed!(i8, i16, i32, i64);
impl_convertible_for_unsigned!(u8, u16, u32, u64, usize);

impl Convertible for f32 {
    type Output = f32;

    fn to_value(&self) -> StickyResult<Value> {
        Ok(Value::F64(*self as f64))
    }

    fn from_value(value: &Value) -> StickyResult<Self> {
        value
            .as_f64()
            .map(|f| f as f32)
            .ok_or_else(|| mismatch(value, "a number"))
    }
}

impl Convertible for f64 {
    type Output = f64;

    fn to_value(&self) -> StickyResult<Value> {
        Ok(Value::F64(*self))
    }

    fn from_value(value: &Value) -> StickyResult<Self> {
        value.as_f64().ok_or_else(|| mismatch(value, "a number"))
    }
}

impl Convertible for bool {
    type Output = bool;

    fn to_value(&self) -> StickyResult<Value> {
        Ok(Value::Bool(*self))
    }

    fn from_value(value: &Value) -> StickyResult<Self> {
        value.as_bool().copied().ok_or_else(|| mismatch(value, "a bool"))
    }
}

impl Convertible for String {
    type Output = String;

    fn to_value(&self) -> StickyResult<Value> {
        Ok(Value::String(self.clone()))
    }

    fn from_value(value: &Value) -> StickyResult<Self> {
        match value {
            Value::String(s) => Ok(s.clone()),
            // identifiers surface as their string form
            Value::ObjectId(id) => Ok(id.to_string()),
            _ => Err(mismatch(value, "a string")),
        }
    }
}

impl Convertible for &str {
    type Output = String;

    fn to_value(&self) -> StickyResult<Value> {
        Ok(Value::String(self.to_string()))
    }

    fn from_value(value: &Value) -> StickyResult<Self::Output> {
        String::from_value(value)
    }
}

impl Convertible for DateTime<Utc> {
    type Output = DateTime<Utc>;

    fn to_value(&self) -> StickyResult<Value> {
        Ok(Value::DateTime(*self))
    }

    fn from_value(value: &Value) -> StickyResult<Self> {
        match value {
            Value::DateTime(dt) => Ok(*dt),
            Value::String(s) => DateTime::parse_from_rfc3339(s)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|_| mismatch(value, "an RFC 3339 timestamp")),
            _ => Err(mismatch(value, "a timestamp")),
        }
    }
}

impl Convertible for ObjectId {
    type Output = ObjectId;

    fn to_value(&self) -> StickyResult<Value> {
        Ok(Value::ObjectId(*self))
    }

    fn from_value(value: &Value) -> StickyResult<Self> {
        match value {
            Value::ObjectId(id) => Ok(*id),
            Value::String(s) => ObjectId::parse(s),
            _ => Err(mismatch(value, "an object id")),
        }
    }
}

impl Convertible for Document {
    type Output = Document;

    fn to_value(&self) -> StickyResult<Value> {
        Ok(Value::Document(self.clone()))
    }

    fn from_value(value: &Value) -> StickyResult<Self> {
        value.as_document().cloned().ok_or_else(|| mismatch(value, "a document"))
    }
}

impl Convertible for Value {
    type Output = Value;

    fn to_value(&self) -> StickyResult<Value> {
        Ok(self.clone())
    }

    fn from_value(value: &Value) -> StickyResult<Self> {
        Ok(value.clone())
    }
}

impl<T> Convertible for Option<T>
where
    T: Convertible,
{
    type Output = Option<T::Output>;

    fn to_value(&self) -> StickyResult<Value> {
        match self {
            Some(v) => v.to_value(),
            None => Ok(Value::Null),
        }
    }

    fn from_value(value: &Value) -> StickyResult<Self::Output> {
        match value {
            Value::Null => Ok(None),
            _ => Ok(Some(T::from_value(value)?)),
        }
    }
}

impl<T> Convertible for Box<T>
where
    T: Convertible,
{
    type Output = Box<T::Output>;

    fn to_value(&self) -> StickyResult<Value> {
        self.as_ref().to_value()
    }

    fn from_value(value: &Value) -> StickyResult<Self::Output> {
        Ok(Box::new(T::from_value(value)?))
    }
}

impl<T> Convertible for Vec<T>
where
    T: Convertible,
{
    type Output = Vec<T::Output>;

    fn to_value(&self) -> StickyResult<Value> {
        let mut arr = Vec::with_capacity(self.len());
        for item in self {
            arr.push(item.to_value()?);
        }
        Ok(Value::Array(arr))
    }

    fn from_value(value: &Value) -> StickyResult<Self::Output> {
        match value {
            Value::Array(arr) => {
                let mut vec = Vec::with_capacity(arr.len());
                for item in arr {
                    vec.push(T::from_value(item)?);
                }
                Ok(vec)
            }
            _ => Err(mismatch(value, "an array")),
        }
    }
}

impl<K, V> Convertible for BTreeMap<K, V>
where
    K: ToString + FromStr + Ord,
    V: Convertible,
{
    type Output = BTreeMap<K, V::Output>;

    fn to_value(&self) -> StickyResult<Value> {
        let mut doc = Document::new();
        for (k, v) in self {
            doc.put(&k.to_string(), v.to_value()?)?;
        }
        Ok(Value::Document(doc))
    }

    fn from_value(value: &Value) -> StickyResult<Self::Output> {
        let doc = value.as_document().ok_or_else(|| mismatch(value, "a document"))?;
        let mut result = BTreeMap::new();
        for (k, v) in doc.iter() {
            let key = K::from_str(k).map_err(|_| mismatch(&Value::from(k), "a valid map key"))?;
            result.insert(key, V::from_value(v)?);
        }
        Ok(result)
    }
}

impl<K, V> Convertible for HashMap<K, V>
where
    K: ToString + FromStr + Eq + Hash,
    V: Convertible,
{
    type Output = HashMap<K, V::Output>;

    fn to_value(&self) -> StickyResult<Value> {
        let mut doc = Document::new();
        for (k, v) in self {
            doc.put(&k.to_string(), v.to_value()?)?;
        }
        Ok(Value::Document(doc))
    }

    fn from_value(value: &Value) -> StickyResult<Self::Output> {
        let doc = value.as_document().ok_or_else(|| mismatch(value, "a document"))?;
        let mut result = HashMap::new();
        for (k, v) in doc.iter() {
            let key = K::from_str(k).map_err(|_| mismatch(&Value::from(k), "a valid map key"))?;
            result.insert(key, V::from_value(v)?);
        }
        Ok(result)
    }
}
