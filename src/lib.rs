//! XML-RPC front for JSON backends.
//!
//! [`xmlrpc`] holds the codec: a value model, an encoder writing
//! `methodResponse` documents and a decoder reading values and calls.
//! [`dispatch`] maps decoded calls onto backend routes and turns every
//! answer, failures included, back into XML-RPC.

#[macro_use]
extern crate log;

pub mod config;
pub mod dispatch;
pub mod error;
pub mod json;
pub mod xmlrpc;

pub use crate::error::{Error, Result};
