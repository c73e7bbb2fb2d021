use std::io;

use rustc_serialize::json::ParserError;
use thiserror::Error;

use crate::xmlrpc::DecodeError;

pub type Result<T> = ::std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Io(#[from] io::Error),
    #[error("invalid JSON: {0}")]
    Json(#[from] ParserError),
    #[error("{0}")]
    Decode(#[from] DecodeError),
    /// The call could not be routed: no method, an unknown one, or a
    /// parameter of the wrong kind.
    #[error("{0}")]
    Dispatch(String),
    /// The backend failed to answer.
    #[error("backend error: {0}")]
    Backend(String),
}
