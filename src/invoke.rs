//! Turns an [`Operation`] and a transport into one REST call.
//!
//! A [`Call`] collects positional path arguments, keyword arguments, and
//! the reserved extras (body, cookies, files, headers, raw-response flag,
//! timeout), then substitutes the operation's path template and delegates
//! to the executor.

use crate::build::{template_placeholders, Operation};
use crate::payload::Payload;
use crate::transport::{Body, FilePart, RequestExecutor, TransportRequest, TransportResponse};
use crate::Error;
use std::collections::HashMap;
use std::time::Duration;

/// What an invocation produced.
#[derive(Debug)]
pub enum CallOutcome {
    /// Decoded JSON body, wrapped.
    Payload(Payload),
    /// Non-JSON body, verbatim.
    Bytes(Vec<u8>),
    /// The unprocessed transport response (raw-response flag was set).
    Raw(TransportResponse),
    /// Success with an empty body.
    NoContent,
}

impl CallOutcome {
    pub fn payload(self) -> Option<Payload> {
        match self {
            CallOutcome::Payload(payload) => Some(payload),
            _ => None,
        }
    }
}

/// A single pending invocation of one operation.
pub struct Call<'a> {
    operation: &'a Operation,
    executor: &'a dyn RequestExecutor,
    args: Vec<String>,
    kwargs: Vec<(String, String)>,
    headers: HashMap<String, String>,
    body: Option<Body>,
    cookies: HashMap<String, String>,
    files: HashMap<String, FilePart>,
    raw_response: bool,
    timeout: Option<Duration>,
}

impl Operation {
    /// Start a call against this operation on the given transport.
    pub fn call<'a>(&'a self, executor: &'a dyn RequestExecutor) -> Call<'a> {
        Call {
            operation: self,
            executor,
            args: Vec::new(),
            kwargs: Vec::new(),
            headers: HashMap::new(),
            body: None,
            cookies: HashMap::new(),
            files: HashMap::new(),
            raw_response: false,
            timeout: None,
        }
    }
}

impl<'a> Call<'a> {
    /// Positional path argument; consumed in placeholder order.
    pub fn arg(mut self, value: impl ToString) -> Self {
        self.args.push(value.to_string());
        self
    }

    /// Keyword argument. Names matching a declared path parameter are
    /// promoted to the positional list; the rest become query parameters.
    /// Values are not URL-escaped, callers pre-encode where needed.
    pub fn kwarg(mut self, name: &str, value: impl ToString) -> Self {
        self.kwargs.push((name.to_string(), value.to_string()));
        self
    }

    /// Ad-hoc header, overriding a declared one on conflict.
    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_string(), value.to_string());
        self
    }

    /// Request payload.
    pub fn body(mut self, body: Body) -> Self {
        self.body = Some(body);
        self
    }

    pub fn cookie(mut self, name: &str, value: &str) -> Self {
        self.cookies.insert(name.to_string(), value.to_string());
        self
    }

    /// Attach a file for multipart upload.
    pub fn file(mut self, field: &str, filename: &str, content: Vec<u8>) -> Self {
        self.files.insert(
            field.to_string(),
            FilePart {
                filename: filename.to_string(),
                content,
            },
        );
        self
    }

    /// Return the transport response unprocessed instead of decoding it.
    pub fn raw_response(mut self) -> Self {
        self.raw_response = true;
        self
    }

    /// Per-call timeout, passed through to the transport.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Substitute the path template and perform the request.
    pub fn send(self) -> Result<CallOutcome, Error> {
        let operation = self.operation;

        let mut headers = operation.headers.clone();
        headers.extend(self.headers);

        // Keyword arguments naming a declared path param join the
        // positional list, in declaration order.
        let mut positional = self.args;
        let mut remaining = self.kwargs;
        for param in &operation.path_params {
            if let Some(pos) = remaining.iter().position(|(name, _)| *name == param.name) {
                positional.push(remaining.remove(pos).1);
            }
        }

        let placeholders = template_placeholders(&operation.resource_path);
        log::debug!("Template params: {:?}", placeholders);
        log::debug!("Template args  : {:?}", positional);
        log::debug!("Query args     : {:?}", remaining);

        if positional.len() < placeholders.len() {
            log::error!(
                "Requires {} argument(s) for path parameters: {:?}",
                placeholders.len(),
                placeholders
            );
            return Err(Error::NotEnoughArguments {
                expected: placeholders.len(),
                given: positional.len(),
            });
        }

        let mut url = operation.resource_path.clone();
        for (idx, name) in placeholders.iter().enumerate() {
            url = url.replacen(&format!("{{{}}}", name), &positional[idx], 1);
        }
        url = crate::build::normalize_slashes(&url);

        // Unconsumed keywords become the query string, unescaped.
        if !remaining.is_empty() {
            let query = remaining
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect::<Vec<_>>()
                .join("&");
            url = format!("{}?{}", url, query);
        }

        log::debug!("URL: {}", url);

        let response = self.executor.execute(TransportRequest {
            verb: operation.verb,
            url,
            headers,
            body: self.body,
            cookies: self.cookies,
            files: self.files,
            timeout: self.timeout,
        })?;

        if self.raw_response {
            return Ok(CallOutcome::Raw(response));
        }

        if !response.ok {
            return Err(Error::Request {
                status: response.status,
                body: response.text(),
            });
        }

        let is_json = response
            .content_type()
            .map(|ct| ct.contains("application/json"))
            .unwrap_or(false);
        if is_json && !response.body.is_empty() {
            let value: serde_json::Value = serde_json::from_slice(&response.body)?;
            return Ok(CallOutcome::Payload(Payload::from_value(value)));
        }

        if !response.body.is_empty() {
            Ok(CallOutcome::Bytes(response.body))
        } else {
            Ok(CallOutcome::NoContent)
        }
    }
}
