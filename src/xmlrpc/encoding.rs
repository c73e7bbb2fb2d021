// Copyright 2014-2015 Galen Clark Haynes
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

// Rust XML-RPC library

use std::borrow::Cow;
use std::fmt;

use xml::escape::escape_str_attribute;

use crate::xmlrpc::value::{write_double, Value};

pub type EncodeResult = fmt::Result;

pub const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>";

/// Shortcut function to encode a `Value` as a complete `methodResponse` document
pub fn encode(root: &Value) -> String {
    let mut s = String::new();
    {
        let mut encoder = Encoder::new(&mut s);
        let written = encoder.emit_response(root);
        debug_assert!(written.is_ok(), "writing into a String cannot fail");
    }
    s
}

/// Shortcut function to encode a `Value` as a bare `<value>` fragment
pub fn encode_value(value: &Value) -> String {
    as_xml(value).to_string()
}

fn is_xml_char(c: char) -> bool {
    match c {
        '\t' | '\n' | '\r' => true,
        '\u{0}'..='\u{1F}' | '\u{FFFE}' | '\u{FFFF}' => false,
        _ => true,
    }
}

/// Replaces characters XML 1.0 cannot carry, even as references, with
/// U+FFFD.
pub(crate) fn replace_invalid_chars(v: &str) -> Cow<'_, str> {
    if v.chars().all(is_xml_char) {
        Cow::Borrowed(v)
    } else {
        Cow::Owned(v.chars().map(|c| if is_xml_char(c) { c } else { '\u{FFFD}' }).collect())
    }
}

// Quotes are escaped as well, so text stays safe wherever it is pasted.
fn escape_str(wr: &mut dyn fmt::Write, v: &str) -> fmt::Result {
    let v = replace_invalid_chars(v);
    wr.write_str(escape_str_attribute(&v).as_ref())
}

/// A structure for implementing serialization to XML-RPC.
pub struct Encoder<'a> {
    writer: &'a mut (dyn fmt::Write + 'a),
    indent: usize,
    at_start: bool,
}

impl<'a> Encoder<'a> {
    /// Creates a new XML-RPC encoder whose output will be written to the writer
    /// specified.
    pub fn new(writer: &'a mut dyn fmt::Write) -> Encoder<'a> {
        Encoder { writer, indent: 0, at_start: true }
    }

    fn newline(&mut self) -> EncodeResult {
        if self.at_start {
            self.at_start = false;
            return Ok(());
        }
        self.writer.write_char('\n')?;
        for _ in 0..self.indent {
            self.writer.write_str("  ")?;
        }
        Ok(())
    }

    fn open(&mut self, tag: &str) -> EncodeResult {
        self.newline()?;
        self.indent += 1;
        write!(self.writer, "<{}>", tag)
    }

    fn close(&mut self, tag: &str) -> EncodeResult {
        self.indent -= 1;
        self.newline()?;
        write!(self.writer, "</{}>", tag)
    }

    fn leaf(&mut self, tag: &str, text: &str) -> EncodeResult {
        self.newline()?;
        write!(self.writer, "<{}>", tag)?;
        escape_str(self.writer, text)?;
        write!(self.writer, "</{}>", tag)
    }

    /// Writes the declaration and `methodResponse/params/param` envelope
    /// around `root`.
    pub fn emit_response(&mut self, root: &Value) -> EncodeResult {
        self.writer.write_str(XML_DECLARATION)?;
        self.at_start = false;
        self.open("methodResponse")?;
        self.open("params")?;
        self.open("param")?;
        self.emit_value(root)?;
        self.close("param")?;
        self.close("params")?;
        self.close("methodResponse")?;
        self.writer.write_char('\n')
    }

    /// Writes `<value>` wrapping the typed element for `v`.
    pub fn emit_value(&mut self, v: &Value) -> EncodeResult {
        self.open("value")?;
        match *v {
            Value::Nil => self.emit_nil()?,
            Value::Struct(ref members) => {
                self.open("struct")?;
                for (name, value) in members {
                    self.emit_member(name, value)?;
                }
                self.close("struct")?;
            }
            Value::Array(ref items) => {
                self.open("array")?;
                self.open("data")?;
                for item in items {
                    self.emit_value(item)?;
                }
                self.close("data")?;
                self.close("array")?;
            }
            Value::Integer(n) => self.emit_i4(n)?,
            Value::Double(n) => self.emit_double(n)?,
            Value::Boolean(b) => self.emit_bool(b)?,
            Value::String(ref s) => self.emit_str(s)?,
        }
        self.close("value")
    }

    fn emit_nil(&mut self) -> EncodeResult {
        self.newline()?;
        self.writer.write_str("<nil/>")
    }

    fn emit_i4(&mut self, v: i64) -> EncodeResult {
        self.leaf("i4", &v.to_string())
    }

    fn emit_double(&mut self, v: f64) -> EncodeResult {
        let mut text = String::new();
        write_double(&mut text, v)?;
        self.leaf("double", &text)
    }

    fn emit_bool(&mut self, v: bool) -> EncodeResult {
        self.leaf("boolean", if v { "1" } else { "0" })
    }

    fn emit_str(&mut self, v: &str) -> EncodeResult {
        self.leaf("string", v)
    }

    fn emit_member(&mut self, name: &str, value: &Value) -> EncodeResult {
        self.open("member")?;
        self.leaf("name", name)?;
        self.emit_value(value)?;
        self.close("member")
    }
}

pub struct AsXml<'a> {
    inner: &'a Value,
}

/// Wraps a value so that formatting it yields its `<value>` fragment.
pub fn as_xml(value: &Value) -> AsXml<'_> {
    AsXml { inner: value }
}

struct FormatShim<'a, 'b: 'a> {
    inner: &'a mut fmt::Formatter<'b>,
}

impl<'a, 'b> fmt::Write for FormatShim<'a, 'b> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.inner.write_str(s)
    }
}

impl<'a> fmt::Display for AsXml<'a> {
    /// Encodes an XML-RPC value into a string
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut shim = FormatShim { inner: f };
        let mut encoder = Encoder::new(&mut shim);
        encoder.emit_value(self.inner)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{encode, encode_value, replace_invalid_chars, XML_DECLARATION};
    use crate::xmlrpc::decoding::parse_value;
    use crate::xmlrpc::tree::Document;
    use crate::xmlrpc::value::Value;

    fn parse(text: &str) -> Document {
        Document::parse(text, 64).unwrap()
    }

    #[test]
    fn test_encode_envelope() {
        let body = encode(&Value::from("ok"));
        assert!(body.starts_with(XML_DECLARATION));

        let doc = parse(&body);
        let root = doc.root();
        assert_eq!("methodResponse", root.name());
        let value = root
            .child("params")
            .and_then(|params| params.child("param"))
            .and_then(|param| param.child("value"))
            .unwrap();
        let typed = value.first_child_element().unwrap();
        assert_eq!("string", typed.name());
        assert_eq!("ok", typed.text_content());
    }

    #[test]
    fn test_encode_nil_is_empty_element() {
        let doc = parse(&encode_value(&Value::Nil));
        let nil = doc.root().first_child_element().unwrap();
        assert_eq!("nil", nil.name());
        assert!(nil.children().is_empty());
    }

    #[test]
    fn test_encode_scalars_tags() {
        let cases = vec![
            (Value::Integer(-17), "i4", "-17"),
            (Value::Integer(0), "i4", "0"),
            (Value::Double(4.2), "double", "4.2"),
            (Value::Boolean(true), "boolean", "1"),
            (Value::Boolean(false), "boolean", "0"),
            (Value::from("text"), "string", "text"),
        ];
        for (value, tag, text) in cases {
            let doc = parse(&encode_value(&value));
            let typed = doc.root().first_child_element().unwrap();
            assert_eq!(tag, typed.name());
            assert_eq!(text, typed.text_content());
        }
    }

    #[test]
    fn test_encode_escapes_text() {
        let value: Value = vec![("a&b", "<tag attr=\"x\">'q'</tag>")].into_iter().collect();
        let body = encode(&value);

        assert!(!body.contains("<tag"));
        assert!(body.contains("a&amp;b"));
        assert_eq!(value, parse_value(&body).unwrap());
    }

    #[test]
    fn test_encode_struct_keeps_member_order() {
        let value: Value = vec![("b", 1), ("a", 2), ("c", 3)].into_iter().collect();
        let doc = parse(&encode_value(&value));
        let names: Vec<String> = doc
            .root()
            .first_child_element()
            .unwrap()
            .child_elements()
            .map(|member| member.child("name").unwrap().text_content())
            .collect();
        assert_eq!(vec!["b", "a", "c"], names);
    }

    #[test]
    fn test_encode_array_layout() {
        let doc = parse(&encode_value(&Value::from(vec![1, 2, 3])));
        let data = doc.root().child("array").and_then(|array| array.child("data")).unwrap();
        assert_eq!(3, data.child_elements().filter(|e| e.name() == "value").count());
    }

    #[test]
    fn test_encode_replaces_control_chars() {
        let value: Value = vec![("k\u{0}", "a\u{1}b\u{1F}\u{FFFF}")].into_iter().collect();

        let decoded = parse_value(&encode(&value)).unwrap();
        assert_eq!(Some(&Value::from("a\u{FFFD}b\u{FFFD}\u{FFFD}")), decoded.find("k\u{FFFD}"));

        assert_eq!(Value::from("a\u{FFFD}b"), parse_value(&encode(&Value::from("a\u{1}b"))).unwrap());
    }

    #[test]
    fn test_replace_invalid_chars_keeps_legal_whitespace() {
        assert_eq!("tab\there\r\nnbsp\u{A0}", replace_invalid_chars("tab\there\r\nnbsp\u{A0}"));
        assert_eq!("x\u{FFFD}y", replace_invalid_chars("x\u{8}y"));
    }
}
