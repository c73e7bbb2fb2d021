// Copyright 2014-2015 Galen Clark Haynes
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

// Rust XML-RPC library

#![forbid(non_camel_case_types)]

//! XML-RPC codec: the value model, the encoder and the decoder
//!
//! # What is XML-RPC?
//!
//! An RPC encoding where every value is an XML element tagged with its
//! type (`i4`, `double`, `boolean`, `string`, `nil`, `array`, `struct`).
//!
//! Basic documentation found on Wikipedia
//! http://en.wikipedia.org/wiki/XML-RPC
//!
//! Full specification of the XML-RPC protocol is found here:
//! http://xmlrpc.scripting.com/spec.html
//!
//! # Dialect
//!
//! Responses are written the usual way, one `methodResponse` carrying one
//! `param`. Calls are read in a looser way: every `<value>` sitting directly
//! in a `<member>` anywhere in the document is a named parameter, so members
//! of struct-valued parameters show up as parameters too.
//!
//! ```
//! use xmlrpc_bridge::xmlrpc::{encode, parse_value, Value};
//!
//! let value: Value = vec![("a", Value::from(1)), ("b", Value::from("x"))].into_iter().collect();
//! assert_eq!(value, parse_value(&encode(&value)).unwrap());
//! ```

pub use self::decoding::{parse_request, parse_value, DecodeError, DecodeOptions, DecodeResult};
pub use self::encoding::{as_xml, encode, encode_value, Encoder};
pub use self::protocol::{error_response, response, Call, CallRequest};
pub use self::value::{to_string_map, Array, StringMap, Struct, Value};

pub mod decoding;
pub mod encoding;
pub mod protocol;
pub mod tree;
pub mod value;
