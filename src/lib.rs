//! Build a callable REST client from a WADL description at runtime.
//!
//! A parsed WADL document is turned into two views over the same set of
//! operations: a tree navigable by URL path segment with verb-named leaves,
//! and a flat table keyed by globally unique operation names.

pub mod ast;
pub mod build;
pub mod client;
pub mod invoke;
mod parse;
pub mod payload;
pub mod transport;

pub const WADL_MIME_TYPE: &str = "application/vnd.sun.wadl+xml";

pub use build::{build_operations, Operation, ResourceRecord, ResourceSet};
pub use client::{Client, ClientNode};
pub use invoke::{Call, CallOutcome};
pub use parse::{parse, parse_bytes, parse_file, parse_string, Error as ParseError};
pub use payload::Payload;
pub use transport::{
    Body, CallStats, FilePart, RequestExecutor, RestHandler, TransportRequest, TransportResponse,
};

/// The REST verbs a WADL method may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Verb {
    Get,
    Post,
    Put,
    Delete,
}

impl Verb {
    /// Lower-case form, used as the tree-node binding key ("get", "post", ..).
    pub fn key(&self) -> &'static str {
        match self {
            Verb::Get => "get",
            Verb::Post => "post",
            Verb::Put => "put",
            Verb::Delete => "delete",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Get => "GET",
            Verb::Post => "POST",
            Verb::Put => "PUT",
            Verb::Delete => "DELETE",
        }
    }
}

impl std::str::FromStr for Verb {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Verb::Get),
            "POST" => Ok(Verb::Post),
            "PUT" => Ok(Verb::Put),
            "DELETE" => Ok(Verb::Delete),
            _ => Err(Error::UnsupportedVerb(s.to_string())),
        }
    }
}

impl std::fmt::Display for Verb {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug)]
pub enum Error {
    /// Malformed WADL input; aborts client construction.
    Wadl(ParseError),
    /// Invalid construction-time configuration (base URL, headers, ..).
    Configuration(String),
    /// A WADL method declared a verb the client cannot dispatch.
    UnsupportedVerb(String),
    /// Fewer positional path arguments than the path template requires.
    NotEnoughArguments { expected: usize, given: usize },
    /// The transport returned a non-success status.
    Request { status: u16, body: String },
    /// The renaming fixpoint kept producing new names past the round cap.
    NamingDiverged { rounds: usize },
    Reqwest(reqwest::Error),
    Url(url::ParseError),
    Json(serde_json::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::Wadl(err) => write!(f, "WADL error: {}", err),
            Error::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            Error::UnsupportedVerb(verb) => write!(f, "Unsupported verb: {}", verb),
            Error::NotEnoughArguments { expected, given } => write!(
                f,
                "Not enough arguments: path template has {} placeholder(s), {} argument(s) given",
                expected, given
            ),
            Error::Request { status, body } => write!(f, "Error {}: {}", status, body),
            Error::NamingDiverged { rounds } => {
                write!(f, "Flat naming did not converge after {} rounds", rounds)
            }
            Error::Reqwest(err) => write!(f, "Reqwest error: {}", err),
            Error::Url(err) => write!(f, "URL error: {}", err),
            Error::Json(err) => write!(f, "JSON error: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Wadl(err) => Some(err),
            Error::Reqwest(err) => Some(err),
            Error::Url(err) => Some(err),
            Error::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Self {
        Error::Wadl(err)
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Reqwest(err)
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::Url(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err)
    }
}
