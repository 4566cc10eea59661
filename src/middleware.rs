//! Request pipeline for the partner client.
//!
//! A request passes through each stage in order; the last stage hands it to
//! the transport. Stages may edit the request before calling [`Next::run`]
//! and inspect the response afterwards.

use crate::auth::Authorizer;
use crate::error::{CliError, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, IF_MATCH, USER_AGENT};
use reqwest::{Request, StatusCode, Url};
use std::sync::Arc;

/// A fully buffered response.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub url: Url,
    pub body: String,
}

impl RawResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

#[async_trait]
pub trait Middleware: Send + Sync {
    async fn handle(&self, req: Request, next: Next<'_>) -> Result<RawResponse>;
}

/// The remainder of the pipeline.
pub struct Next<'a> {
    http: &'a reqwest::Client,
    stack: &'a [Arc<dyn Middleware>],
}

impl<'a> Next<'a> {
    pub fn new(http: &'a reqwest::Client, stack: &'a [Arc<dyn Middleware>]) -> Self {
        Self { http, stack }
    }

    pub async fn run(self, req: Request) -> Result<RawResponse> {
        match self.stack.split_first() {
            Some((stage, rest)) => stage.handle(req, Next::new(self.http, rest)).await,
            None => send(self.http, req).await,
        }
    }
}

async fn send(http: &reqwest::Client, req: Request) -> Result<RawResponse> {
    let resp = http.execute(req).await?;
    let status = resp.status();
    let headers = resp.headers().clone();
    let url = resp.url().clone();
    let body = resp.text().await?;
    Ok(RawResponse {
        status,
        headers,
        url,
        body,
    })
}

/// Adds `Authorization: Bearer <token>`.
pub struct Authorize(pub Arc<dyn Authorizer>);

#[async_trait]
impl Middleware for Authorize {
    async fn handle(&self, mut req: Request, next: Next<'_>) -> Result<RawResponse> {
        let token = self.0.token().await?;
        let value = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|e| CliError::Authorization(format!("token is not a valid header value: {e}")))?;
        req.headers_mut().insert(AUTHORIZATION, value);
        next.run(req).await
    }
}

/// Sets `User-Agent` unless the request already carries one.
pub struct UserAgent(pub HeaderValue);

impl Default for UserAgent {
    fn default() -> Self {
        UserAgent(HeaderValue::from_static(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        )))
    }
}

#[async_trait]
impl Middleware for UserAgent {
    async fn handle(&self, mut req: Request, next: Next<'_>) -> Result<RawResponse> {
        req.headers_mut()
            .entry(USER_AGENT)
            .or_insert_with(|| self.0.clone());
        next.run(req).await
    }
}

/// Dumps every request and response at debug level. Runs outside
/// [`Authorize`], so the bearer token never reaches the log.
pub struct HttpLogger;

#[async_trait]
impl Middleware for HttpLogger {
    async fn handle(&self, req: Request, next: Next<'_>) -> Result<RawResponse> {
        let body = req
            .body()
            .and_then(|b| b.as_bytes())
            .map(|b| String::from_utf8_lossy(b).into_owned())
            .unwrap_or_default();
        tracing::debug!(
            method = %req.method(),
            url = %req.url(),
            headers = ?req.headers(),
            %body,
            "request"
        );

        let res = next.run(req).await?;
        tracing::debug!(
            status = res.status.as_u16(),
            headers = ?res.headers,
            body = %res.body,
            "response"
        );
        Ok(res)
    }
}

/// Entity-tag condition for a PUT.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Precondition {
    /// `If-Match: *`, the resource must exist.
    Any,
    Etag(String),
}

impl Precondition {
    /// `*` selects [`Precondition::Any`], anything else is taken as an etag.
    pub fn parse(value: &str) -> Self {
        match value {
            "*" => Precondition::Any,
            tag => Precondition::Etag(tag.to_string()),
        }
    }

    fn header_value(&self) -> Result<HeaderValue> {
        let raw = match self {
            Precondition::Any => "*",
            Precondition::Etag(tag) => tag.as_str(),
        };
        HeaderValue::from_str(raw)
            .map_err(|e| CliError::InvalidInput(format!("invalid If-Match value {raw:?}: {e}")))
    }
}

pub struct IfMatch(pub Precondition);

#[async_trait]
impl Middleware for IfMatch {
    async fn handle(&self, mut req: Request, next: Next<'_>) -> Result<RawResponse> {
        req.headers_mut().insert(IF_MATCH, self.0.header_value()?);
        next.run(req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticToken;
    use std::sync::Mutex;

    /// Records the order stages see the request in.
    struct Trace {
        name: &'static str,
        seen: Arc<Mutex<Vec<&'static str>>>,
    }

    #[async_trait]
    impl Middleware for Trace {
        async fn handle(&self, req: Request, next: Next<'_>) -> Result<RawResponse> {
            self.seen.lock().unwrap().push(self.name);
            next.run(req).await
        }
    }

    #[tokio::test]
    async fn test_stages_run_in_order_and_headers_reach_server() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PUT", "/thing")
            .match_header("authorization", "Bearer tok")
            .match_header("if-match", "W/\"1\"")
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let seen = Arc::new(Mutex::new(Vec::new()));
        let stack: Vec<Arc<dyn Middleware>> = vec![
            Arc::new(Trace { name: "outer", seen: seen.clone() }),
            Arc::new(IfMatch(Precondition::Etag("W/\"1\"".into()))),
            Arc::new(Trace { name: "inner", seen: seen.clone() }),
            Arc::new(HttpLogger),
            Arc::new(Authorize(Arc::new(StaticToken::new("tok")))),
        ];

        let http = reqwest::Client::new();
        let url = Url::parse(&format!("{}/thing", server.url())).unwrap();
        let req = http.put(url).build().unwrap();
        let res = Next::new(&http, &stack).run(req).await.unwrap();

        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.body, "{}");
        assert_eq!(*seen.lock().unwrap(), vec!["outer", "inner"]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_any_precondition_sends_star() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PUT", "/thing")
            .match_header("if-match", "*")
            .with_status(412)
            .create_async()
            .await;

        let stack: Vec<Arc<dyn Middleware>> = vec![Arc::new(IfMatch(Precondition::Any))];
        let http = reqwest::Client::new();
        let req = http.put(format!("{}/thing", server.url())).build().unwrap();
        let res = Next::new(&http, &stack).run(req).await.unwrap();

        assert_eq!(res.status, StatusCode::PRECONDITION_FAILED);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_user_agent_does_not_replace_caller_value() {
        let mut server = mockito::Server::new_async().await;
        let default_ua = server
            .mock("GET", "/default")
            .match_header("user-agent", concat!("pub-cli/", env!("CARGO_PKG_VERSION")))
            .with_status(200)
            .create_async()
            .await;
        let custom_ua = server
            .mock("GET", "/custom")
            .match_header("user-agent", "tooling/2")
            .with_status(200)
            .create_async()
            .await;

        let stack: Vec<Arc<dyn Middleware>> = vec![Arc::new(UserAgent::default())];
        let http = reqwest::Client::new();

        let req = http.get(format!("{}/default", server.url())).build().unwrap();
        Next::new(&http, &stack).run(req).await.unwrap();

        let req = http
            .get(format!("{}/custom", server.url()))
            .header(USER_AGENT, "tooling/2")
            .build()
            .unwrap();
        Next::new(&http, &stack).run(req).await.unwrap();

        default_ua.assert_async().await;
        custom_ua.assert_async().await;
    }

    #[test]
    fn test_precondition_parse() {
        assert_eq!(Precondition::parse("*"), Precondition::Any);
        assert_eq!(
            Precondition::parse("W/\"abc\""),
            Precondition::Etag("W/\"abc\"".into())
        );
    }

    #[test]
    fn test_raw_response_header_lookup() {
        let mut headers = HeaderMap::new();
        headers.insert("operation-location", HeaderValue::from_static("/ops/1"));
        let res = RawResponse {
            status: StatusCode::ACCEPTED,
            headers,
            url: Url::parse("https://cloudpartner.azure.com/").unwrap(),
            body: String::new(),
        };
        assert_eq!(res.header("Operation-Location"), Some("/ops/1"));
        assert_eq!(res.header("Location"), None);
    }
}
