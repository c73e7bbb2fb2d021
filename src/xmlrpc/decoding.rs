// Copyright 2014-2015 Galen Clark Haynes
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

// Rust XML-RPC library

use thiserror::Error;

use xml::reader;

use crate::xmlrpc::protocol::CallRequest;
use crate::xmlrpc::tree::{Document, Element};
use crate::xmlrpc::value::{Struct, Value};

/// Element nesting allowed by default before a document is refused.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// The errors that can arise while decoding an XML-RPC document.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    /// The input is not well-formed XML.
    #[error("malformed document: {0}")]
    MalformedDocument(String),
    /// A typed element's text does not parse as its type.
    #[error("malformed <{tag}> value: {text:?}")]
    MalformedValue { tag: String, text: String },
    /// Elements nest deeper than the configured limit.
    #[error("document nests deeper than {limit} elements")]
    DepthLimitExceeded { limit: usize },
}

impl From<reader::Error> for DecodeError {
    fn from(err: reader::Error) -> DecodeError {
        DecodeError::MalformedDocument(err.to_string())
    }
}

pub type DecodeResult<T> = Result<T, DecodeError>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecodeOptions {
    pub max_depth: usize,
}

impl Default for DecodeOptions {
    fn default() -> DecodeOptions {
        DecodeOptions { max_depth: DEFAULT_MAX_DEPTH }
    }
}

/// Shortcut function to decode the first `<value>` of a document or fragment
pub fn parse_value(text: &str) -> DecodeResult<Value> {
    DecodeOptions::default().parse_value(text)
}

/// Shortcut function to decode a `methodCall` document
pub fn parse_request(text: &str) -> DecodeResult<CallRequest> {
    DecodeOptions::default().parse_request(text)
}

impl DecodeOptions {
    pub fn new(max_depth: usize) -> DecodeOptions {
        DecodeOptions { max_depth }
    }

    /// Decodes the root element when it is a `<value>`, otherwise the first
    /// `<value>` in document order. A document without any yields `Nil`.
    pub fn parse_value(&self, text: &str) -> DecodeResult<Value> {
        let doc = Document::parse(text, self.max_depth)?;
        match doc.elements_by_name("value").first() {
            Some(element) => build_value(element),
            None => {
                debug!("no <value> element in {} document", doc.root().name());
                Ok(Value::Nil)
            }
        }
    }

    /// Reads the method name and every `member` value in the document as a
    /// named parameter.
    ///
    /// The scan is flat: members of a struct-valued parameter are reported
    /// next to the top-level parameters, and a later member with the same
    /// name replaces an earlier one.
    pub fn parse_request(&self, text: &str) -> DecodeResult<CallRequest> {
        let doc = Document::parse(text, self.max_depth)?;

        let method = doc.elements_by_name("methodName").first().map(|e| e.text_content());

        let mut params = Struct::new();
        for (member, value) in doc.elements_with_parent("value", "member") {
            let name = match member.child("name") {
                Some(name) => name.text_content(),
                None => continue,
            };
            params.insert(name, build_value(value)?);
        }

        debug!("decoded call {:?} with {} parameter(s)", method, params.len());
        Ok(CallRequest::new(method, params))
    }
}

/// Decodes one `<value>` element.
pub fn build_value(element: &Element) -> DecodeResult<Value> {
    let typed = match element.first_child_element() {
        Some(typed) => typed,
        // Only ASCII whitespace and controls are trimmed; U+00A0 and friends stay.
        None => {
            let text = element.text_content();
            return Ok(Value::String(text.trim_matches(|c: char| c <= ' ').to_string()));
        }
    };

    match typed.name() {
        "string" => Ok(Value::String(typed.text_content())),
        "i4" | "int" => build_integer(typed),
        "double" => build_double(typed),
        "boolean" => Ok(Value::Boolean(parse_bool(&typed.text_content()))),
        "nil" => Ok(Value::Nil),
        "array" => build_array(typed),
        "struct" => build_struct(typed),
        // Unknown types such as base64 or dateTime.iso8601 are passed on as text.
        _ => Ok(Value::String(typed.text_content())),
    }
}

fn malformed(typed: &Element, text: String) -> DecodeError {
    DecodeError::MalformedValue { tag: typed.name().to_string(), text }
}

fn build_integer(typed: &Element) -> DecodeResult<Value> {
    let text = typed.text_content();
    match text.parse::<i64>() {
        Ok(n) => Ok(Value::Integer(n)),
        Err(_) => Err(malformed(typed, text)),
    }
}

fn build_double(typed: &Element) -> DecodeResult<Value> {
    let text = typed.text_content();
    match text.trim().parse::<f64>() {
        Ok(n) => Ok(Value::Double(n)),
        Err(_) => Err(malformed(typed, text)),
    }
}

fn parse_bool(text: &str) -> bool {
    text == "1" || text.eq_ignore_ascii_case("true")
}

fn build_array(typed: &Element) -> DecodeResult<Value> {
    let data = match typed.child("data") {
        Some(data) => data,
        None => return Ok(Value::Array(Vec::new())),
    };
    data.child_elements()
        .filter(|e| e.name() == "value")
        .map(build_value)
        .collect::<DecodeResult<Vec<Value>>>()
        .map(Value::Array)
}

fn build_struct(typed: &Element) -> DecodeResult<Value> {
    let mut members = Struct::new();
    for member in typed.child_elements().filter(|e| e.name() == "member") {
        match (member.child("name"), member.child("value")) {
            (Some(name), Some(value)) => {
                members.insert(name.text_content(), build_value(value)?);
            }
            _ => trace!("skipping incomplete struct member"),
        }
    }
    Ok(Value::Struct(members))
}
