//! Bridge between backend JSON bodies and the XML-RPC value model.

use std::collections::BTreeMap;

use rustc_serialize::json::Json;

use crate::error::Result;
use crate::xmlrpc::{StringMap, Struct, Value};

/// Parses a JSON body. Blank input means the backend sent nothing.
pub fn parse(body: &str) -> Result<Option<Value>> {
    if body.trim().is_empty() {
        return Ok(None);
    }
    let json = Json::from_str(body)?;
    Ok(Some(to_value(json)))
}

pub fn to_value(json: Json) -> Value {
    match json {
        Json::Null => Value::Nil,
        Json::Boolean(b) => Value::Boolean(b),
        Json::I64(n) => Value::Integer(n),
        Json::U64(n) => match i64::try_from(n) {
            Ok(n) => Value::Integer(n),
            // Too wide for an integer tag, keep the digits.
            Err(_) => Value::String(n.to_string()),
        },
        Json::F64(n) => Value::Double(n),
        Json::String(s) => Value::String(s),
        Json::Array(items) => Value::Array(items.into_iter().map(to_value).collect()),
        Json::Object(map) => Value::Struct(map.into_iter().map(|(k, v)| (k, to_value(v))).collect()),
    }
}

pub fn from_value(value: &Value) -> Json {
    match *value {
        Value::Nil => Json::Null,
        Value::Boolean(b) => Json::Boolean(b),
        Value::Integer(n) => Json::I64(n),
        Value::Double(n) => Json::F64(n),
        Value::String(ref s) => Json::String(s.clone()),
        Value::Array(ref items) => Json::Array(items.iter().map(from_value).collect()),
        Value::Struct(ref members) => Json::Object(object(members)),
    }
}

fn object(members: &Struct) -> BTreeMap<String, Json> {
    members.iter().map(|(k, v)| (k.clone(), from_value(v))).collect()
}

pub fn from_string_map(map: &StringMap) -> Json {
    Json::Object(map.iter().map(|(k, v)| (k.clone(), Json::String(v.clone()))).collect())
}
