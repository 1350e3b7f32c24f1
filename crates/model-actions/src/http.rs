//! reqwest-backed [`Transport`].

use async_trait::async_trait;
use reqwest::Method;
use serde_json::{Map, Value};

use crate::transport::{ActionResponse, RequestOptions, Transport, TransportError};

/// Sends actions over HTTP.
///
/// `GET`, `HEAD` and `DELETE` carry the payload as query parameters; every
/// other method sends it as a JSON body. Non-2xx responses become
/// [`TransportError`]s carrying the status and the parsed body.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: Option<String>,
    headers: Vec<(String, String)>,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        HttpTransport {
            client,
            ..Default::default()
        }
    }

    /// Prepended to URLs that start with `/`, for adapters configured with a
    /// namespace but no host.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Sent with every request, e.g. an authorization header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    fn absolute(&self, url: &str) -> String {
        match &self.base_url {
            Some(base) if url.starts_with('/') => format!("{}{url}", base.trim_end_matches('/')),
            _ => url.to_string(),
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn request(
        &self,
        url: &str,
        method: &str,
        options: RequestOptions,
    ) -> Result<ActionResponse, TransportError> {
        let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())
            .map_err(|e| TransportError::network(format!("invalid method '{method}': {e}")))?;
        let url = self.absolute(url);

        let mut builder = self.client.request(method.clone(), &url);
        for (name, value) in &self.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if sends_query(&method) {
            if !options.data.is_empty() {
                builder = builder.query(&query_pairs(&options.data));
            }
        } else {
            builder = builder.json(&options.data);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::network(e.to_string()))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| TransportError::network(e.to_string()))?;
        let body = parse_body(&text);

        if status.is_success() {
            Ok(ActionResponse {
                status: status.as_u16(),
                body,
            })
        } else {
            tracing::debug!(%url, status = status.as_u16(), "action request rejected");
            let body = (!text.is_empty()).then_some(body);
            Err(TransportError::status(status.as_u16(), body))
        }
    }
}

fn sends_query(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::DELETE)
}

/// Strings go out bare; everything else as its JSON text.
fn query_pairs(data: &Map<String, Value>) -> Vec<(String, String)> {
    data.iter()
        .map(|(k, v)| {
            let v = match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (k.clone(), v)
        })
        .collect()
}

fn parse_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn options(v: Value) -> RequestOptions {
        RequestOptions {
            data: v.as_object().cloned().unwrap_or_default(),
        }
    }

    #[test]
    fn parse_body_variants() {
        assert_eq!(parse_body(""), Value::Null);
        assert_eq!(parse_body("{\"a\":1}"), json!({"a": 1}));
        assert_eq!(parse_body("OK"), json!("OK"));
    }

    #[test]
    fn query_pairs_unquote_strings() {
        let pairs = query_pairs(json!({"q": "x", "n": 2}).as_object().unwrap());
        assert!(pairs.contains(&("q".into(), "x".into())));
        assert!(pairs.contains(&("n".into(), "2".into())));
    }

    #[test]
    fn base_url_only_applies_to_rooted_paths() {
        let t = HttpTransport::new().with_base_url("http://localhost:9000/");
        assert_eq!(t.absolute("/api/likes"), "http://localhost:9000/api/likes");
        assert_eq!(t.absolute("https://other.io/x"), "https://other.io/x");
    }

    #[tokio::test]
    async fn post_sends_json_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/flags")
            .match_header("authorization", "Bearer t0k")
            .match_body(Matcher::Json(json!({"reason": "spam"})))
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":9}"#)
            .create_async()
            .await;

        let transport = HttpTransport::new()
            .with_base_url(server.url())
            .with_header("Authorization", "Bearer t0k");
        let response = transport
            .request("/api/flags", "post", options(json!({"reason": "spam"})))
            .await
            .unwrap();

        assert_eq!(response.status, 201);
        assert_eq!(response.body, json!({"id": 9}));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn get_sends_query_params() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/stats")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("range".into(), "week".into()),
                Matcher::UrlEncoded("limit".into(), "5".into()),
            ]))
            .with_status(200)
            .create_async()
            .await;

        let url = format!("{}/api/stats", server.url());
        let response = HttpTransport::new()
            .request(&url, "GET", options(json!({"range": "week", "limit": 5})))
            .await
            .unwrap();

        assert_eq!(response.body, Value::Null);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/likes")
            .with_status(422)
            .with_body(r#"{"errors":["already liked"]}"#)
            .create_async()
            .await;

        let url = format!("{}/api/likes", server.url());
        let err = HttpTransport::new()
            .request(&url, "POST", RequestOptions::default())
            .await
            .unwrap_err();

        assert_eq!(err.status, Some(422));
        assert_eq!(err.body, Some(json!({"errors": ["already liked"]})));
    }

    #[tokio::test]
    async fn unreachable_host_is_a_network_error() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let url = format!("http://127.0.0.1:{port}/x");
        let err = HttpTransport::new()
            .request(&url, "POST", RequestOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.status, None);
    }

    #[tokio::test]
    async fn invalid_method_is_rejected() {
        let err = HttpTransport::new()
            .request("http://127.0.0.1:9/x", "NOT A METHOD", RequestOptions::default())
            .await
            .unwrap_err();
        assert!(err.message.contains("invalid method"));
    }
}
