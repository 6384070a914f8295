//! Low-level HTTP client: `DaisyHttp`.
//!
//! Composes `base_url + path + ?query`, attaches Basic auth, serializes JSON
//! bodies and normalizes every response into [`HttpResponse`] or
//! [`HttpError::Api`]. Domain clients sit on top of this.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use crate::auth::Credentials;
use crate::error::HttpError;
use crate::http::query::encode_query;
use crate::http::transport::{find_header, HttpRequest, Method, Transport};
use crate::shared::DataEnvelope;

const ACCEPT: &str = "Accept";
const CONTENT_TYPE: &str = "Content-Type";
const AUTHORIZATION: &str = "Authorization";
const JSON: &str = "application/json";

/// Normalized successful response.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub data: Value,
    pub status: u16,
    pub status_text: String,
    pub headers: Vec<(String, String)>,
}

impl HttpResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// Decode `data` as `T`.
    pub fn json<T: DeserializeOwned>(self) -> Result<T, HttpError> {
        serde_json::from_value(self.data).map_err(|e| HttpError::Deserialize(e.to_string()))
    }
}

/// Low-level HTTP client for the Daisy REST API.
#[derive(Clone)]
pub struct DaisyHttp {
    base_url: String,
    transport: Arc<dyn Transport>,
    credentials: Credentials,
    headers: Vec<(String, String)>,
}

impl DaisyHttp {
    pub fn new(
        base_url: &str,
        credentials: Credentials,
        transport: Arc<dyn Transport>,
        extra_headers: Vec<(String, String)>,
    ) -> Self {
        let mut headers = vec![
            (ACCEPT.to_string(), JSON.to_string()),
            (CONTENT_TYPE.to_string(), JSON.to_string()),
        ];
        for (name, value) in extra_headers {
            headers.retain(|(k, _)| !k.eq_ignore_ascii_case(&name));
            headers.push((name, value));
        }

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            transport,
            credentials,
            headers,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    // ── Typed helpers ────────────────────────────────────────────────────

    /// GET and unwrap the `{ "data": ... }` envelope.
    pub async fn get_data<T: DeserializeOwned, Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: Option<&Q>,
    ) -> Result<T, HttpError> {
        let resp = self.get(path, query).await?;
        Ok(resp.json::<DataEnvelope<T>>()?.data)
    }

    /// POST and unwrap the `{ "data": ... }` envelope.
    pub async fn post_data<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, HttpError> {
        let resp = self.post(path, body).await?;
        Ok(resp.json::<DataEnvelope<T>>()?.data)
    }

    pub async fn get<Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: Option<&Q>,
    ) -> Result<HttpResponse, HttpError> {
        let qs = match query {
            Some(q) => encode_query(q)?,
            None => String::new(),
        };
        self.request(Method::Get, path, &qs, None).await
    }

    pub async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<HttpResponse, HttpError> {
        let body = serde_json::to_string(body).map_err(|e| HttpError::Serialize(e.to_string()))?;
        self.request(Method::Post, path, "", Some(body)).await
    }

    // ── Core ─────────────────────────────────────────────────────────────

    /// Single round trip. `query` is an already-encoded query string and is
    /// only appended when non-empty.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        query: &str,
        body: Option<String>,
    ) -> Result<HttpResponse, HttpError> {
        let mut url = format!("{}{}", self.base_url, path);
        if !query.is_empty() {
            url.push('?');
            url.push_str(query);
        }

        let mut headers = self.headers.clone();
        headers.push((
            AUTHORIZATION.to_string(),
            self.credentials.basic_auth_header(),
        ));

        let request = HttpRequest {
            method,
            url,
            headers,
            body: if method == Method::Get { None } else { body },
        };
        let url = request.url.clone();

        let raw = self.transport.send(request).await?;
        tracing::debug!(method = %method, url = %url, status = raw.status, "HTTP request");

        let data = materialize(raw.header(CONTENT_TYPE), &raw.body);
        let success = (200..300).contains(&raw.status);

        match data {
            Ok(data) if success => Ok(HttpResponse {
                data,
                status: raw.status,
                status_text: raw.status_text,
                headers: raw.headers,
            }),
            Err(e) if success => Err(e),
            data => {
                let body = data.unwrap_or(Value::String(raw.body));
                Err(HttpError::Api {
                    status: raw.status,
                    message: error_message(&body, &raw.status_text, raw.status),
                    status_text: raw.status_text,
                    body,
                })
            }
        }
    }
}

/// `text/html` stays text; everything else is JSON. Empty bodies are `null`.
fn materialize(content_type: Option<&str>, body: &str) -> Result<Value, HttpError> {
    let is_html = content_type
        .map(|ct| ct.trim().to_ascii_lowercase().starts_with("text/html"))
        .unwrap_or(false);
    if is_html {
        return Ok(Value::String(body.to_string()));
    }
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(body).map_err(|e| HttpError::Deserialize(e.to_string()))
}

/// The server's `message`, else `error`, else the status text.
fn error_message(body: &Value, status_text: &str, status: u16) -> String {
    let field = |name: &str| body.get(name).and_then(Value::as_str).map(str::to_string);
    field("message")
        .or_else(|| field("error"))
        .or_else(|| body.as_str().filter(|s| !s.is_empty()).map(str::to_string))
        .or_else(|| Some(status_text.to_string()).filter(|s| !s.is_empty()))
        .unwrap_or_else(|| format!("HTTP {}", status))
}
