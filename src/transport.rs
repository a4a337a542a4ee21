//! Transport boundary: the [`RequestExecutor`] trait the invoker delegates
//! to, plus [`RestHandler`], a blocking reqwest implementation with a base
//! URL, default headers, basic auth, and call statistics.

use crate::{Error, Verb};
use std::cell::Cell;
use std::collections::HashMap;
use std::time::Duration;

/// A request body as the caller supplied it.
#[derive(Debug, Clone)]
pub enum Body {
    /// Serialized with serde_json before sending.
    Json(serde_json::Value),
    Text(String),
    Bytes(Vec<u8>),
}

impl Body {
    fn into_bytes(self) -> Result<Vec<u8>, Error> {
        match self {
            Body::Json(value) => Ok(serde_json::to_vec(&value)?),
            Body::Text(text) => Ok(text.into_bytes()),
            Body::Bytes(bytes) => Ok(bytes),
        }
    }
}

/// One part of a multipart file upload.
#[derive(Debug, Clone)]
pub struct FilePart {
    pub filename: String,
    pub content: Vec<u8>,
}

/// Everything the invoker hands to the transport for one call.
#[derive(Debug)]
pub struct TransportRequest {
    pub verb: Verb,
    /// Path and query string relative to the transport's base URL,
    /// placeholders already substituted.
    pub url: String,
    pub headers: HashMap<String, String>,
    pub body: Option<Body>,
    pub cookies: HashMap<String, String>,
    pub files: HashMap<String, FilePart>,
    pub timeout: Option<Duration>,
}

/// What came back from the wire.
#[derive(Debug, Clone, Default)]
pub struct TransportResponse {
    pub status: u16,
    pub ok: bool,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl TransportResponse {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case("content-type"))
            .map(|(_, v)| v.as_str())
    }
}

/// Running totals over every call made through an executor, updated
/// whether or not the response was a success.
#[derive(Debug, Default)]
pub struct CallStats {
    total: Cell<u64>,
    ok: Cell<u64>,
    failed: Cell<u64>,
}

impl CallStats {
    pub fn record(&self, ok: bool) {
        self.total.set(self.total.get() + 1);
        if ok {
            self.ok.set(self.ok.get() + 1);
        } else {
            self.failed.set(self.failed.get() + 1);
        }
    }

    pub fn total(&self) -> u64 {
        self.total.get()
    }

    pub fn ok(&self) -> u64 {
        self.ok.get()
    }

    pub fn failed(&self) -> u64 {
        self.failed.get()
    }
}

/// The transport collaborator the invoker delegates to. The core never
/// constructs authentication; implementations carry it.
pub trait RequestExecutor {
    fn execute(&self, request: TransportRequest) -> Result<TransportResponse, Error>;

    fn stats(&self) -> &CallStats;
}

/// Blocking HTTP executor. Holds a single shared session; headers are
/// rebuilt per call, so callers must not interleave invocations on the
/// same handler without external synchronization.
pub struct RestHandler {
    base_url: url::Url,
    default_headers: HashMap<String, Option<String>>,
    client: reqwest::blocking::Client,
    auth: Option<(String, String)>,
    stats: CallStats,
}

impl RestHandler {
    /// `base_url` gets an `https://` scheme if it has none. Fails with a
    /// configuration error if the result is not a valid URL.
    pub fn new(base_url: &str) -> Result<Self, Error> {
        let trimmed = base_url.trim_end_matches('/');
        let with_scheme = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            trimmed.to_string()
        } else {
            format!("https://{}", trimmed.trim_start_matches('/'))
        };
        let base_url = url::Url::parse(&with_scheme)
            .map_err(|e| Error::Configuration(format!("invalid base URL {:?}: {}", trimmed, e)))?;
        Ok(RestHandler {
            base_url,
            default_headers: HashMap::new(),
            client: reqwest::blocking::Client::new(),
            auth: None,
            stats: CallStats::default(),
        })
    }

    pub fn with_credentials(mut self, user: &str, password: &str) -> Self {
        log::info!("RestHandler authenticates via username and password for: {}", user);
        self.auth = Some((user.to_string(), password.to_string()));
        self
    }

    /// Headers sent with every request unless a call overrides them.
    /// A `None` value removes the header after merging.
    pub fn with_default_headers(mut self, headers: HashMap<String, Option<String>>) -> Self {
        self.default_headers = headers;
        self
    }

    pub fn base_url(&self) -> &url::Url {
        &self.base_url
    }

    /// Default headers under, per-call headers over, `None` values dropped.
    fn merged_headers(&self, call_headers: &HashMap<String, String>) -> HashMap<String, String> {
        let mut merged: HashMap<String, Option<String>> = self.default_headers.clone();
        for (k, v) in call_headers {
            merged.insert(k.clone(), Some(v.clone()));
        }
        merged
            .into_iter()
            .filter_map(|(k, v)| v.map(|v| (k, v)))
            .collect()
    }

    fn full_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

fn header_map(headers: &HashMap<String, String>) -> Result<reqwest::header::HeaderMap, Error> {
    let mut map = reqwest::header::HeaderMap::new();
    for (k, v) in headers {
        let name = reqwest::header::HeaderName::from_bytes(k.as_bytes())
            .map_err(|e| Error::Configuration(format!("invalid header name {:?}: {}", k, e)))?;
        let value = reqwest::header::HeaderValue::from_str(v)
            .map_err(|e| Error::Configuration(format!("invalid header value for {}: {}", k, e)))?;
        map.insert(name, value);
    }
    Ok(map)
}

fn cookie_header(cookies: &HashMap<String, String>) -> String {
    cookies
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("; ")
}

impl RequestExecutor for RestHandler {
    fn execute(&self, request: TransportRequest) -> Result<TransportResponse, Error> {
        let verb = request.verb;
        let url = self.full_url(&request.url);
        log::info!("Doing request: {} {}", verb, url);

        let headers = self.merged_headers(&request.headers);
        log::debug!("Headers: {:?}", headers);

        let method = match verb {
            Verb::Get => reqwest::Method::GET,
            Verb::Post => reqwest::Method::POST,
            Verb::Put => reqwest::Method::PUT,
            Verb::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self
            .client
            .request(method, url.as_str())
            .headers(header_map(&headers)?);

        if let Some((user, password)) = &self.auth {
            builder = builder.basic_auth(user, Some(password));
        }
        if !request.cookies.is_empty() {
            builder = builder.header(reqwest::header::COOKIE, cookie_header(&request.cookies));
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        // GET and DELETE carry neither a body nor uploads.
        if matches!(verb, Verb::Post | Verb::Put) {
            if !request.files.is_empty() {
                let mut form = reqwest::blocking::multipart::Form::new();
                for (field, part) in request.files {
                    form = form.part(
                        field,
                        reqwest::blocking::multipart::Part::bytes(part.content)
                            .file_name(part.filename),
                    );
                }
                builder = builder.multipart(form);
            } else if let Some(body) = request.body {
                builder = builder.body(body.into_bytes()?);
            }
        }

        let response = builder.send()?;
        let status = response.status().as_u16();
        let ok = response.status().is_success();
        log::info!("HTTP code: {}", status);

        let mut response_headers = HashMap::new();
        for (name, value) in response.headers() {
            if let Ok(value) = value.to_str() {
                response_headers.insert(name.as_str().to_string(), value.to_string());
            }
        }

        let body = response.bytes()?.to_vec();
        self.stats.record(ok);
        if !ok {
            log::error!("{}", String::from_utf8_lossy(&body));
        }

        Ok(TransportResponse {
            status,
            ok,
            headers: response_headers,
            body,
        })
    }

    fn stats(&self) -> &CallStats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maplit::hashmap;

    #[test]
    fn test_base_url_scheme_default() {
        let handler = RestHandler::new("jira.example.com/rest/").unwrap();
        assert_eq!(handler.base_url().as_str(), "https://jira.example.com/rest");
        let handler = RestHandler::new("http://jira.example.com").unwrap();
        assert_eq!(handler.base_url().as_str(), "http://jira.example.com/");
    }

    #[test]
    fn test_base_url_invalid() {
        assert!(matches!(
            RestHandler::new(""),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_header_merge_drops_none_defaults() {
        let handler = RestHandler::new("example.com")
            .unwrap()
            .with_default_headers(hashmap! {
                "Accept".to_string() => Some("application/json".to_string()),
                "X-Trace".to_string() => None,
            });
        let merged = handler.merged_headers(&hashmap! {
            "Content-Type".to_string() => "application/json".to_string(),
        });
        assert_eq!(merged.get("Accept").unwrap(), "application/json");
        assert_eq!(merged.get("Content-Type").unwrap(), "application/json");
        assert!(!merged.contains_key("X-Trace"));
    }

    #[test]
    fn test_call_stats() {
        let stats = CallStats::default();
        stats.record(true);
        stats.record(false);
        stats.record(true);
        assert_eq!(stats.total(), 3);
        assert_eq!(stats.ok(), 2);
        assert_eq!(stats.failed(), 1);
    }

    #[test]
    fn test_cookie_header() {
        let header = cookie_header(&hashmap! {
            "session".to_string() => "abc".to_string(),
        });
        assert_eq!(header, "session=abc");
    }
}
