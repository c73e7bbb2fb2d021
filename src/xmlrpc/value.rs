// Copyright 2014-2015 Galen Clark Haynes
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

// Rust XML-RPC library

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::ops::Index;

use indexmap::IndexMap;

/// Represents an XML-RPC data value
#[derive(Clone, PartialEq, Debug)]
pub enum Value {
    Nil,
    Integer(i64),
    Double(f64),
    Boolean(bool),
    String(String),
    Array(Array),
    Struct(Struct),
}

pub type Array = Vec<Value>;

/// Struct members, kept in the order they were inserted.
pub type Struct = IndexMap<String, Value>;

/// Flattened view of a struct handed to JSON-producing callers.
pub type StringMap = IndexMap<String, String>;

impl Value {
    /// If the value is a struct, looks up the member `key`.
    pub fn find<'a>(&'a self, key: &str) -> Option<&'a Value> {
        match *self {
            Value::Struct(ref map) => map.get(key),
            _ => None,
        }
    }

    pub fn is_struct(&self) -> bool {
        self.as_struct().is_some()
    }

    pub fn as_struct(&self) -> Option<&Struct> {
        match *self {
            Value::Struct(ref map) => Some(map),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match *self {
            Value::String(ref s) => Some(s),
            _ => None,
        }
    }

    /// The XML-RPC tag this value is written under.
    pub fn type_tag(&self) -> &'static str {
        match *self {
            Value::Nil => "nil",
            Value::Integer(_) => "i4",
            Value::Double(_) => "double",
            Value::Boolean(_) => "boolean",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Struct(_) => "struct",
        }
    }
}

impl<'a> Index<&'a str> for Value {
    type Output = Value;

    fn index(&self, idx: &str) -> &Value {
        self.find(idx).expect("no such struct member")
    }
}

impl Index<usize> for Value {
    type Output = Value;

    fn index(&self, idx: usize) -> &Value {
        match *self {
            Value::Array(ref v) => &v[idx],
            _ => panic!("can only index a Value with usize if it is an array"),
        }
    }
}

/// Writes a double so it reads back as one: `1.0`, not `1`.
pub(crate) fn write_double<W: fmt::Write + ?Sized>(w: &mut W, v: f64) -> fmt::Result {
    write!(w, "{:?}", v)
}

/// The textual form of a value: `null` for nil, decimal numbers,
/// `[a, b]` for arrays and `{k=v}` for structs. This is also what
/// `to_string_map` hands back for each member.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Value::Nil => f.write_str("null"),
            Value::Integer(n) => write!(f, "{}", n),
            Value::Double(n) => write_double(f, n),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::String(ref s) => f.write_str(s),
            Value::Array(ref items) => {
                f.write_str("[")?;
                for (idx, item) in items.iter().enumerate() {
                    if idx != 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Value::Struct(ref map) => {
                f.write_str("{")?;
                for (idx, (key, value)) in map.iter().enumerate() {
                    if idx != 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}={}", key, value)?;
                }
                f.write_str("}")
            }
        }
    }
}

/// Coerces every member of `input` to its textual form, `Nil` becoming
/// `"null"`. A missing mapping gives an empty one.
pub fn to_string_map(input: Option<&Struct>) -> StringMap {
    match input {
        Some(map) => map.iter().map(|(key, value)| (key.clone(), value.to_string())).collect(),
        None => StringMap::new(),
    }
}

macro_rules! from_integer_impl {
    ($($t:ty),+) => (
        $(impl From<$t> for Value {
            fn from(v: $t) -> Value { Value::Integer(i64::from(v)) }
        })+
    )
}

from_integer_impl! { i8, i16, i32, i64, u8, u16, u32 }

impl From<f32> for Value {
    fn from(v: f32) -> Value {
        Value::Double(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Value {
        Value::Double(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Value {
        Value::Boolean(v)
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Value {
        Value::Nil
    }
}

impl<'a> From<&'a str> for Value {
    fn from(v: &'a str) -> Value {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Value {
        Value::String(v)
    }
}

impl<A: Into<Value>> From<Vec<A>> for Value {
    fn from(v: Vec<A>) -> Value {
        Value::Array(v.into_iter().map(Into::into).collect())
    }
}

impl<A: Into<Value>> From<Option<A>> for Value {
    fn from(v: Option<A>) -> Value {
        match v {
            None => Value::Nil,
            Some(value) => value.into(),
        }
    }
}

impl<A: Into<Value>> From<IndexMap<String, A>> for Value {
    fn from(v: IndexMap<String, A>) -> Value {
        Value::Struct(v.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

impl<A: Into<Value>> From<BTreeMap<String, A>> for Value {
    fn from(v: BTreeMap<String, A>) -> Value {
        Value::Struct(v.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

impl<A: Into<Value>> From<HashMap<String, A>> for Value {
    fn from(v: HashMap<String, A>) -> Value {
        Value::Struct(v.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Value {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Value {
        Value::Struct(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::{to_string_map, Struct, Value};

    #[test]
    fn test_display_scalars() {
        assert_eq!("null", Value::Nil.to_string());
        assert_eq!("-42", Value::Integer(-42).to_string());
        assert_eq!("1.0", Value::Double(1.0).to_string());
        assert_eq!("2.5", Value::Double(2.5).to_string());
        assert_eq!("true", Value::Boolean(true).to_string());
        assert_eq!("a<b", Value::from("a<b").to_string());
    }

    #[test]
    fn test_display_nested() {
        let value: Value = vec![("a", Value::from(vec![1, 2])), ("b", Value::Nil)]
            .into_iter()
            .collect();
        assert_eq!("{a=[1, 2], b=null}", value.to_string());
    }

    #[test]
    fn test_to_string_map_nil_becomes_null() {
        let mut map = Struct::new();
        map.insert("x".to_string(), Value::Nil);
        map.insert("y".to_string(), Value::Integer(7));

        let result = to_string_map(Some(&map));

        assert_eq!(Some(&"null".to_string()), result.get("x"));
        assert_eq!(Some(&"7".to_string()), result.get("y"));
        assert_eq!(vec!["x", "y"], result.keys().map(|k| k.as_str()).collect::<Vec<_>>());
    }

    #[test]
    fn test_to_string_map_missing_source() {
        assert!(to_string_map(None).is_empty());
    }

    #[test]
    fn test_struct_keeps_insertion_order() {
        let value: Value = vec![("zeta", 1), ("alpha", 2), ("mid", 3)].into_iter().collect();
        let keys: Vec<&str> = value.as_struct().unwrap().keys().map(|k| k.as_str()).collect();
        assert_eq!(vec!["zeta", "alpha", "mid"], keys);
    }

    #[test]
    fn test_find_and_index() {
        let inner: Value = vec![("deep", "here")].into_iter().collect();
        let outer: Value = vec![("inner", inner), ("flat", Value::from(1))].into_iter().collect();

        assert_eq!(Some(&Value::from(1)), outer.find("flat"));
        assert_eq!(None, outer.find("deep"));
        assert_eq!(None, Value::from(1).find("flat"));
        assert_eq!(Value::from("here"), outer["inner"]["deep"]);
    }

    #[test]
    fn test_conversions() {
        assert_eq!(Value::Integer(300), Value::from(300u16));
        assert_eq!(Value::Double(0.5), Value::from(0.5f32));
        assert_eq!(Value::Nil, Value::from(None::<i32>));
        assert_eq!("i4", Value::from(3i64).type_tag());
        assert_eq!(Value::from(vec![1, 2])[1], Value::Integer(2));
    }
}
