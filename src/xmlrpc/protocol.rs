// Copyright 2014-2015 Galen Clark Haynes
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

// Rust XML-RPC library

use xml::escape::escape_str_pcdata;

use crate::xmlrpc::encoding::{self, replace_invalid_chars, XML_DECLARATION};
use crate::xmlrpc::value::{Struct, Value};

/// A decoded `methodCall`: the method name, if any, and its named
/// parameters.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CallRequest {
    method: Option<String>,
    params: Struct,
}

impl CallRequest {
    pub fn new(method: Option<String>, params: Struct) -> CallRequest {
        CallRequest { method, params }
    }

    pub fn method_name(&self) -> Option<&str> {
        self.method.as_deref()
    }

    pub fn param(&self, name: &str) -> Option<&Value> {
        self.params.get(name)
    }

    pub fn params(&self) -> &Struct {
        &self.params
    }

    pub fn into_parts(self) -> (Option<String>, Struct) {
        (self.method, self.params)
    }
}

/// Builds a `methodCall` document whose single parameter is a struct of
/// named members, the shape `parse_request` reads back.
#[derive(Debug)]
pub struct Call {
    pub method: String,
    members: Struct,
}

impl Call {
    pub fn new(method: &str) -> Call {
        Call {
            method: method.to_string(),
            members: Struct::new(),
        }
    }

    pub fn param<T: Into<Value>>(mut self, name: &str, value: T) -> Call {
        self.members.insert(name.to_string(), value.into());
        self
    }

    pub fn finalize(self) -> String {
        let members = Value::Struct(self.members);
        format!(
            "{}<methodCall><methodName>{}</methodName><params><param>{}</param></params></methodCall>",
            XML_DECLARATION,
            escape_str_pcdata(&replace_invalid_chars(&self.method)),
            encoding::as_xml(&members)
        )
    }
}

/// Body of a successful `methodResponse` carrying `value`.
pub fn response(value: &Value) -> String {
    encoding::encode(value)
}

/// Body of an error `methodResponse`: a struct with a single `error` member.
pub fn error_response(message: &str) -> String {
    let mut members = Struct::new();
    members.insert("error".to_string(), Value::from(message));
    encoding::encode(&Value::Struct(members))
}
