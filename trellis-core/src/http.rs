// HTTP request and response types

use crate::Error;
use crate::logging::debug;
use std::collections::HashMap;

/// HTTP request wrapper
///
/// Holds the request data a controller reads: query (GET) and form (POST)
/// parameters, cookies and headers. The dispatcher hands actions a request
/// whose query parameters already include the matched route variables.
#[derive(Debug, Clone, Default)]
pub struct HttpRequest {
    pub method: String,
    pub uri: String,
    pub headers: HashMap<String, String>,
    pub cookies: HashMap<String, String>,
    pub body: Vec<u8>,
    pub query_params: HashMap<String, String>,
    pub post_params: HashMap<String, String>,
}

impl HttpRequest {
    /// Create a request, parsing the query string out of `uri`
    pub fn new(method: impl Into<String>, uri: impl Into<String>) -> Self {
        let uri = uri.into();
        let query_params = uri
            .split_once('?')
            .map(|(_, query)| parse_urlencoded(query.as_bytes()))
            .unwrap_or_default();

        Self {
            method: method.into(),
            uri,
            query_params,
            ..Default::default()
        }
    }

    pub fn get(uri: impl Into<String>) -> Self {
        Self::new("GET", uri)
    }

    pub fn post(uri: impl Into<String>) -> Self {
        Self::new("POST", uri)
    }

    /// Add a header; a `Cookie` header also fills the cookie jar
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        if name.eq_ignore_ascii_case("cookie") {
            self.cookies.extend(parse_cookie_header(&value));
        }
        self.headers.insert(name, value);
        self
    }

    /// Set a urlencoded form body and parse it into the post parameters
    pub fn with_form_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self.post_params = parse_urlencoded(&self.body);
        self
    }

    pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.insert(name.into(), value.into());
        self
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    /// The raw request URI, query string included
    pub fn request_uri(&self) -> &str {
        &self.uri
    }

    /// The URI without its query string; this is what routes match against
    pub fn path(&self) -> &str {
        self.uri
            .split_once('?')
            .map(|(path, _)| path)
            .unwrap_or(&self.uri)
    }

    /// Get a header value, case-insensitively
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Get a query parameter by name
    pub fn query(&self, name: &str) -> Option<&str> {
        self.query_params.get(name).map(String::as_str)
    }

    pub fn query_exists(&self, name: &str) -> bool {
        self.query_params.contains_key(name)
    }

    /// Get a form parameter by name
    pub fn post_data(&self, name: &str) -> Option<&str> {
        self.post_params.get(name).map(String::as_str)
    }

    pub fn post_exists(&self, name: &str) -> bool {
        self.post_params.contains_key(name)
    }

    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    pub fn cookie_exists(&self, name: &str) -> bool {
        self.cookies.contains_key(name)
    }

    /// Overlay values onto the query parameters; overlaid values win
    pub fn overlay_query<'a, I>(&mut self, values: I)
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        for (key, value) in values {
            self.query_params.insert(key.clone(), value.clone());
        }
    }
}

/// Parse an `application/x-www-form-urlencoded` payload
///
/// Invalid percent sequences decode lossily instead of leaving the value raw.
/// Pairs with an empty name are dropped.
pub(crate) fn parse_urlencoded(input: &[u8]) -> HashMap<String, String> {
    let pairs: Vec<(String, String)> = match serde_urlencoded::from_bytes(input) {
        Ok(pairs) => pairs,
        Err(err) => {
            debug!(error = %err, "Discarding malformed urlencoded data");
            Vec::new()
        }
    };

    pairs
        .into_iter()
        .filter(|(key, _)| !key.is_empty())
        .collect()
}

/// Parse a `Cookie` request header, percent-decoding names and values
fn parse_cookie_header(header: &str) -> impl Iterator<Item = (String, String)> + '_ {
    header.split(';').filter_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        Some((decode_cookie_part(name.trim()), decode_cookie_part(value.trim())))
    })
}

fn decode_cookie_part(raw: &str) -> String {
    String::from_utf8_lossy(&urlencoding::decode_binary(raw.as_bytes())).into_owned()
}

/// A cookie to set on the response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    /// Lifetime in seconds; 0 means a session cookie
    pub max_age: u64,
    pub path: Option<String>,
    pub domain: Option<String>,
    pub secure: bool,
    pub http_only: bool,
}

impl Cookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            max_age: 0,
            path: None,
            domain: None,
            secure: false,
            http_only: true,
        }
    }

    pub fn max_age(mut self, seconds: u64) -> Self {
        self.max_age = seconds;
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn http_only(mut self, http_only: bool) -> Self {
        self.http_only = http_only;
        self
    }

    /// Render as a `Set-Cookie` header value
    pub fn to_header_value(&self) -> String {
        let mut header = format!(
            "{}={}",
            urlencoding::encode(&self.name),
            urlencoding::encode(&self.value)
        );
        if self.max_age > 0 {
            header.push_str(&format!("; Max-Age={}", self.max_age));
        }
        if let Some(path) = &self.path {
            header.push_str(&format!("; Path={}", path));
        }
        if let Some(domain) = &self.domain {
            header.push_str(&format!("; Domain={}", domain));
        }
        if self.secure {
            header.push_str("; Secure");
        }
        if self.http_only {
            header.push_str("; HttpOnly");
        }
        header
    }
}

/// HTTP response wrapper
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub cookies: Vec<Cookie>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            cookies: Vec::new(),
            body: Vec::new(),
        }
    }

    pub fn ok() -> Self {
        Self::new(200)
    }

    pub fn not_found() -> Self {
        Self::new(404)
    }

    pub fn internal_server_error() -> Self {
        Self::new(500)
    }

    /// A 302 redirect to `location`
    pub fn redirect(location: impl Into<String>) -> Self {
        Self::new(302).with_header("Location", location)
    }

    /// An HTML response with the given status
    pub fn html(status: u16, body: impl Into<String>) -> Self {
        Self::new(status)
            .with_header("Content-Type", "text/html; charset=utf-8")
            .with_body(body.into().into_bytes())
    }

    /// Plain-text response for an error, using its status code
    pub fn from_error(error: &Error) -> Self {
        let status = error.status_code();
        let message = if status == 404 {
            "Not Found".to_string()
        } else {
            "Internal Server Error".to_string()
        };
        Self::new(status)
            .with_header("Content-Type", "text/plain; charset=utf-8")
            .with_body(message.into_bytes())
    }

    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.add_header(key, value);
        self
    }

    pub fn add_header(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.headers.insert(key.into(), value.into());
    }

    pub fn set_cookie(&mut self, cookie: Cookie) {
        self.cookies.push(cookie);
    }

    pub fn body_string(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}
