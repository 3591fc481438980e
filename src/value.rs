//! Dynamically typed arguments.
//!
//! [`Value`] covers callers whose argument types are only known at run time:
//! an argument list is an [`Args`] vector, keyed element-wise.
//!
//! Each value encodes to a [`CanonicalKey`]: one type tag per element, fixed
//! width numbers, and length prefixes for strings and lists. The encoding is
//! injective, so two values share a key exactly when they are equal, and
//! values of different types never do: `Int(1)`, `Float(1.0)` and `Str("1")`
//! are three distinct keys.
//!
//! # Examples
//!
//! ```
//! use memo_rs::args;
//! use memo_rs::memo::Memo;
//! use memo_rs::value::{Args, Value};
//!
//! let describe = Memo::new(|args: &Args| args.len());
//! assert_eq!(describe.call(args![1, "1"]), Ok(2));
//! assert_eq!(describe.call(vec![Value::Int(1), Value::from("1")]), Ok(2));
//! assert_eq!(describe.hits(), 1);
//! ```

use std::fmt::{Debug, Display, Formatter};

use crate::config::MemoConfig;
use crate::error::KeyError;
use crate::key::{canonical_f64, ArgKey};

/// A dynamically typed argument value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
}

/// A dynamically typed argument list.
pub type Args = Vec<Value>;

/// Builds an [`Args`] vector from anything convertible into [`Value`].
#[macro_export]
macro_rules! args {
    () => {
        ::std::vec::Vec::<$crate::value::Value>::new()
    };
    ($($x:expr),+ $(,)?) => {
        ::std::vec![$($crate::value::Value::from($x)),+]
    };
}

/// Injective byte encoding of a [`Value`].
///
/// `Debug` prints the decoded value, e.g. `[1, "a"]`.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct CanonicalKey(Vec<u8>);

impl CanonicalKey {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Decodes the key back into the value it was built from.
    pub fn to_value(&self) -> Option<Value> {
        let mut bytes = self.0.as_slice();
        let value = Value::decode(&mut bytes)?;
        bytes.is_empty().then_some(value)
    }
}

impl Debug for CanonicalKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.to_value() {
            Some(value) => write!(f, "{}", value),
            None => f.debug_tuple("CanonicalKey").field(&self.0).finish(),
        }
    }
}

fn take<'a>(bytes: &mut &'a [u8], n: usize) -> Option<&'a [u8]> {
    if bytes.len() < n {
        return None;
    }
    let (head, tail) = bytes.split_at(n);
    *bytes = tail;
    Some(head)
}

fn take_word(bytes: &mut &[u8]) -> Option<[u8; 8]> {
    take(bytes, 8)?.try_into().ok()
}

fn take_len(bytes: &mut &[u8]) -> Option<usize> {
    usize::try_from(u64::from_be_bytes(take_word(bytes)?)).ok()
}

const TAG_NULL: u8 = 0;
const TAG_BOOL: u8 = 1;
const TAG_INT: u8 = 2;
const TAG_FLOAT: u8 = 3;
const TAG_STR: u8 = 4;
const TAG_LIST: u8 = 5;

impl Value {
    /// Returns the name of the value's type.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::List(_) => "list",
        }
    }

    fn encode(&self, buf: &mut Vec<u8>, depth: usize, max_depth: usize) -> Result<(), KeyError> {
        match self {
            Value::Null => buf.push(TAG_NULL),
            Value::Bool(b) => {
                buf.push(TAG_BOOL);
                buf.push(*b as u8);
            }
            Value::Int(i) => {
                buf.push(TAG_INT);
                buf.extend_from_slice(&i.to_be_bytes());
            }
            Value::Float(x) => {
                buf.push(TAG_FLOAT);
                buf.extend_from_slice(&canonical_f64(*x)?.to_be_bytes());
            }
            Value::Str(s) => {
                buf.push(TAG_STR);
                buf.extend_from_slice(&(s.len() as u64).to_be_bytes());
                buf.extend_from_slice(s.as_bytes());
            }
            Value::List(items) => {
                if depth >= max_depth {
                    return Err(KeyError::TooDeep {
                        depth: depth + 1,
                        max: max_depth,
                    });
                }
                buf.push(TAG_LIST);
                buf.extend_from_slice(&(items.len() as u64).to_be_bytes());
                for item in items {
                    item.encode(buf, depth + 1, max_depth)?;
                }
            }
        }
        Ok(())
    }

    fn decode(bytes: &mut &[u8]) -> Option<Value> {
        let tag = take(bytes, 1)?[0];
        let value = match tag {
            TAG_NULL => Value::Null,
            TAG_BOOL => Value::Bool(take(bytes, 1)?[0] != 0),
            TAG_INT => Value::Int(i64::from_be_bytes(take_word(bytes)?)),
            TAG_FLOAT => Value::Float(f64::from_bits(u64::from_be_bytes(take_word(bytes)?))),
            TAG_STR => {
                let len = take_len(bytes)?;
                let s = take(bytes, len)?;
                Value::Str(String::from_utf8(s.to_vec()).ok()?)
            }
            TAG_LIST => {
                let len = take_len(bytes)?;
                let mut items = Vec::with_capacity(len.min(bytes.len()));
                for _ in 0..len {
                    items.push(Value::decode(bytes)?);
                }
                Value::List(items)
            }
            _ => return None,
        };
        Some(value)
    }
}

impl ArgKey for Value {
    type Key = CanonicalKey;

    fn arg_key(&self, config: &MemoConfig) -> Result<Self::Key, KeyError> {
        let mut buf = Vec::new();
        self.encode(&mut buf, 0, config.max_key_depth)?;
        Ok(CanonicalKey(buf))
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{:?}", x),
            Value::Str(s) => write!(f, "{:?}", s),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(x: Option<T>) -> Self {
        x.map_or(Value::Null, Into::into)
    }
}
