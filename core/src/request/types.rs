use crate::errors::{error_codes, BindingError};
use crate::request::parser::{parse_form_body, parse_json_mapping, parse_query_string};
use crate::types::RawPayload;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    GET,
    POST,
    PUT,
    DELETE,
    PATCH,
    HEAD,
    OPTIONS,
    TRACE,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::GET => "GET",
            HttpMethod::POST => "POST",
            HttpMethod::PUT => "PUT",
            HttpMethod::DELETE => "DELETE",
            HttpMethod::PATCH => "PATCH",
            HttpMethod::HEAD => "HEAD",
            HttpMethod::OPTIONS => "OPTIONS",
            HttpMethod::TRACE => "TRACE",
        }
    }

    /// Methods whose payload is read from the body rather than the query.
    pub fn has_body(&self) -> bool {
        matches!(self, HttpMethod::POST | HttpMethod::PUT | HttpMethod::PATCH)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = BindingError;

    fn from_str(method: &str) -> Result<Self, Self::Err> {
        match method.to_uppercase().as_str() {
            "GET" => Ok(HttpMethod::GET),
            "POST" => Ok(HttpMethod::POST),
            "PUT" => Ok(HttpMethod::PUT),
            "DELETE" => Ok(HttpMethod::DELETE),
            "PATCH" => Ok(HttpMethod::PATCH),
            "HEAD" => Ok(HttpMethod::HEAD),
            "OPTIONS" => Ok(HttpMethod::OPTIONS),
            "TRACE" => Ok(HttpMethod::TRACE),
            _ => Err(BindingError::malformed(
                error_codes::INVALID_HTTP_METHOD,
                format!("Invalid HTTP method: {}", method),
            )),
        }
    }
}

/// Body format declared by the `Content-Type` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentFormat {
    Json,
    Form,
    Other(String),
}

impl ContentFormat {
    /// Maps a `Content-Type` value (parameters ignored) to a format.
    pub fn from_mime(content_type: &str) -> Self {
        let mime = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        match mime.as_str() {
            "application/json" | "application/x-json" => ContentFormat::Json,
            "application/x-www-form-urlencoded" | "multipart/form-data" => ContentFormat::Form,
            _ if mime.ends_with("+json") => ContentFormat::Json,
            _ => ContentFormat::Other(mime),
        }
    }
}

/// **REQUEST ACCESSOR**
///
/// The parts of an incoming request the binding layer reads.
pub trait RequestSource {
    fn method(&self) -> HttpMethod;

    fn content_format(&self) -> Option<ContentFormat>;

    /// Size of the raw body in bytes, if one is buffered.
    fn body_size(&self) -> usize {
        0
    }

    /// Body parsed as a JSON mapping.
    fn json_body(&self) -> Result<RawPayload, BindingError>;

    /// Body parsed as form fields.
    fn form_body(&self) -> Result<RawPayload, BindingError>;

    fn query_params(&self) -> RawPayload;
}

#[derive(Debug, Clone)]
pub enum RequestBody {
    Empty,
    /// Body already decoded by the framework.
    Json(Value),
    /// Form fields already decoded by the framework.
    Form(RawPayload),
    Raw(Vec<u8>),
}

#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub path: String,
    pub headers: HashMap<String, String>,
    pub query_string: String,
    pub body: RequestBody,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        let path = path.into();
        let (path, query_string) = match path.split_once('?') {
            Some((path, query)) => (path.to_string(), query.to_string()),
            None => (path, String::new()),
        };
        Self {
            method,
            path,
            headers: HashMap::new(),
            query_string,
            body: RequestBody::Empty,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query_string = query.into();
        self
    }

    /// Raw body with the given `Content-Type`.
    pub fn with_body(self, content_type: &str, body: impl Into<Vec<u8>>) -> Self {
        let mut request = self.with_header("Content-Type", content_type);
        request.body = RequestBody::Raw(body.into());
        request
    }

    /// Pre-decoded JSON body; sets `Content-Type: application/json`.
    pub fn with_json(self, value: Value) -> Self {
        let mut request = self.with_header("Content-Type", "application/json");
        request.body = RequestBody::Json(value);
        request
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

impl RequestSource for HttpRequest {
    fn method(&self) -> HttpMethod {
        self.method
    }

    fn content_format(&self) -> Option<ContentFormat> {
        self.header("Content-Type").map(ContentFormat::from_mime)
    }

    fn body_size(&self) -> usize {
        match &self.body {
            RequestBody::Raw(bytes) => bytes.len(),
            _ => 0,
        }
    }

    fn json_body(&self) -> Result<RawPayload, BindingError> {
        match &self.body {
            RequestBody::Json(Value::Object(map)) => Ok(map.clone()),
            RequestBody::Json(_) => Err(BindingError::malformed(
                error_codes::JSON_NOT_MAPPING,
                "JSON content is not a mapping",
            )),
            RequestBody::Raw(bytes) => parse_json_mapping(bytes),
            RequestBody::Empty => Err(BindingError::malformed(
                error_codes::INVALID_JSON,
                "Request body is empty",
            )),
            RequestBody::Form(_) => Err(BindingError::malformed(
                error_codes::INVALID_JSON,
                "Request body holds form fields, not JSON",
            )),
        }
    }

    fn form_body(&self) -> Result<RawPayload, BindingError> {
        match &self.body {
            RequestBody::Form(fields) => Ok(fields.clone()),
            RequestBody::Raw(bytes) => parse_form_body(bytes),
            RequestBody::Empty | RequestBody::Json(_) => Ok(RawPayload::new()),
        }
    }

    fn query_params(&self) -> RawPayload {
        parse_query_string(&self.query_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_method_parsing() {
        assert_eq!("patch".parse::<HttpMethod>().unwrap(), HttpMethod::PATCH);
        assert!(matches!(
            "PURGE".parse::<HttpMethod>(),
            Err(BindingError::MalformedPayload { .. })
        ));
        assert!(HttpMethod::PUT.has_body());
        assert!(!HttpMethod::DELETE.has_body());
    }

    #[test]
    fn test_content_format_detection() {
        assert_eq!(ContentFormat::from_mime("application/json; charset=utf-8"), ContentFormat::Json);
        assert_eq!(ContentFormat::from_mime("application/ld+json"), ContentFormat::Json);
        assert_eq!(
            ContentFormat::from_mime("multipart/form-data; boundary=x"),
            ContentFormat::Form
        );
        assert_eq!(
            ContentFormat::from_mime("text/csv"),
            ContentFormat::Other("text/csv".to_string())
        );
    }

    #[test]
    fn test_query_split_from_path() {
        let request = HttpRequest::new(HttpMethod::GET, "/users?page=2&q=a%20b");
        assert_eq!(request.path, "/users");
        let query = request.query_params();
        assert_eq!(query["page"], json!("2"));
        assert_eq!(query["q"], json!("a b"));
        assert!(request.content_format().is_none());
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let request = HttpRequest::new(HttpMethod::POST, "/").with_header("content-type", "application/json");
        assert_eq!(request.header("Content-Type"), Some("application/json"));
        assert_eq!(request.content_format(), Some(ContentFormat::Json));
    }

    #[test]
    fn test_json_body_variants() {
        let decoded = HttpRequest::new(HttpMethod::POST, "/").with_json(json!({"name": "x"}));
        assert_eq!(decoded.json_body().unwrap()["name"], json!("x"));

        let raw = HttpRequest::new(HttpMethod::POST, "/").with_body("application/json", r#"{"n": 1}"#);
        assert_eq!(raw.json_body().unwrap()["n"], json!(1));

        let list = HttpRequest::new(HttpMethod::POST, "/").with_json(json!([1, 2]));
        assert!(matches!(list.json_body(), Err(BindingError::MalformedPayload { .. })));

        let empty = HttpRequest::new(HttpMethod::POST, "/");
        assert!(empty.json_body().is_err());
    }
}
