use crate::auth::{self, Authorizer};
use crate::error::{CliError, Result};
use crate::middleware::{Authorize, HttpLogger, IfMatch, Middleware, Next, Precondition, RawResponse};
use crate::model::{Offer, OfferStatus, Operation, OperationDetail, Publisher, PublishRequest};
use async_trait::async_trait;
use reqwest::header::{HeaderValue, ACCEPT, CONTENT_TYPE, ETAG, LOCATION};
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_HOST: &str = "https://cloudpartner.azure.com/";
pub const DEFAULT_API_VERSION: &str = "2017-10-31";

const API_VERSION_PARAM: &str = "api-version";
const OPERATION_LOCATION: &str = "operation-location";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Everything the command surface needs from the Cloud Partner Portal.
#[async_trait]
pub trait PartnerService: Send + Sync {
    async fn list_offers(&self, publisher_id: &str) -> Result<Vec<Offer>>;

    async fn get_offer(&self, publisher_id: &str, offer_id: &str) -> Result<Offer>;

    async fn get_offer_by_version(
        &self,
        publisher_id: &str,
        offer_id: &str,
        version: i64,
    ) -> Result<Offer>;

    /// `slot` is `draft`, `preview` or `production`.
    async fn get_offer_by_slot(&self, publisher_id: &str, offer_id: &str, slot: &str)
        -> Result<Offer>;

    async fn get_offer_status(&self, publisher_id: &str, offer_id: &str) -> Result<OfferStatus>;

    /// PUT the offer to `api/publishers/{offer.publisher_id}/offers/{offer.id}`.
    async fn put_offer(&self, offer: &Offer, precondition: Option<Precondition>) -> Result<Offer>;

    /// Start publication. Returns the operation location to poll.
    async fn publish_offer(
        &self,
        publisher_id: &str,
        offer_id: &str,
        notification_emails: Option<&str>,
    ) -> Result<Option<String>>;

    async fn go_live(
        &self,
        publisher_id: &str,
        offer_id: &str,
        notification_emails: Option<&str>,
    ) -> Result<Option<String>>;

    async fn cancel_operation(
        &self,
        publisher_id: &str,
        offer_id: &str,
        notification_emails: Option<&str>,
    ) -> Result<Option<String>>;

    async fn list_operations(
        &self,
        publisher_id: &str,
        offer_id: &str,
        filtered_status: Option<&str>,
    ) -> Result<Vec<Operation>>;

    async fn get_operation(
        &self,
        publisher_id: &str,
        offer_id: &str,
        operation_id: &str,
    ) -> Result<OperationDetail>;

    /// Follow an operation location as returned by publish, go-live or cancel.
    async fn get_operation_by_uri(&self, uri: &str) -> Result<OperationDetail>;

    async fn list_publishers(&self) -> Result<Vec<Publisher>>;
}

pub struct PartnerClient {
    http: reqwest::Client,
    host: Url,
    api_version: String,
    authorizer: Arc<dyn Authorizer>,
    middlewares: Vec<Arc<dyn Middleware>>,
    debug: bool,
}

impl PartnerClient {
    /// The transport shared by the client and its authorizer.
    fn http() -> Result<reqwest::Client> {
        Ok(reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?)
    }

    /// Authorize from `AZURE_TOKEN` or the `AZURE_*` service principal variables.
    pub fn from_env(host: &str, api_version: &str) -> Result<Self> {
        let http = Self::http()?;
        let authorizer = auth::from_env(http.clone())?;
        Self::new(http, host, api_version, authorizer)
    }

    pub fn new(
        http: reqwest::Client,
        host: &str,
        api_version: &str,
        authorizer: Arc<dyn Authorizer>,
    ) -> Result<Self> {
        let mut host = Url::parse(host)
            .map_err(|e| CliError::Config(format!("invalid host '{host}': {e}")))?;
        if !host.path().ends_with('/') {
            let path = format!("{}/", host.path());
            host.set_path(&path);
        }

        Ok(Self {
            http,
            host,
            api_version: api_version.to_string(),
            authorizer,
            middlewares: Vec::new(),
            debug: std::env::var("DEBUG").map(|v| v == "true").unwrap_or(false),
        })
    }

    /// Register a stage that runs before the built-in ones.
    pub fn with_middleware(mut self, middleware: Arc<dyn Middleware>) -> Self {
        self.middlewares.push(middleware);
        self
    }

    fn entity_url(&self, path: &str) -> Result<Url> {
        self.host
            .join(path.trim_start_matches('/'))
            .map_err(|e| CliError::InvalidInput(format!("invalid request path '{path}': {e}")))
    }

    fn offer_path(publisher_id: &str, offer_id: &str) -> String {
        format!("api/publishers/{publisher_id}/offers/{offer_id}")
    }

    /// Resolve an operation location against the host, adding `api-version`
    /// only when the location does not carry one.
    fn operation_url(&self, uri: &str) -> Result<Url> {
        let mut url = self
            .host
            .join(uri)
            .map_err(|e| CliError::InvalidInput(format!("invalid operation URI '{uri}': {e}")))?;
        if !url.query_pairs().any(|(k, _)| k == API_VERSION_PARAM) {
            url.query_pairs_mut()
                .append_pair(API_VERSION_PARAM, &self.api_version);
        }
        Ok(url)
    }

    fn request<B: Serialize + ?Sized>(
        &self,
        method: Method,
        mut url: Url,
        query: &[(&str, &str)],
        body: Option<&B>,
    ) -> Result<reqwest::Request> {
        {
            let mut pairs = url.query_pairs_mut();
            if !query.iter().any(|(k, _)| *k == API_VERSION_PARAM) {
                pairs.append_pair(API_VERSION_PARAM, &self.api_version);
            }
            for (k, v) in query {
                pairs.append_pair(k, v);
            }
        }

        let mut builder = self
            .http
            .request(method, url)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .header(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(body) = body {
            builder = builder.json(body);
        }
        Ok(builder.build()?)
    }

    /// Run `req` through the pipeline: registered stages, then `extra`, then
    /// the request logger and authorization. Non-2xx responses become
    /// [`CliError::Remote`].
    async fn execute(
        &self,
        req: reqwest::Request,
        extra: Vec<Arc<dyn Middleware>>,
    ) -> Result<RawResponse> {
        let mut stack: Vec<Arc<dyn Middleware>> = self.middlewares.clone();
        stack.extend(extra);
        if self.debug {
            stack.push(Arc::new(HttpLogger));
        }
        stack.push(Arc::new(Authorize(self.authorizer.clone())));

        let method = req.method().clone();
        tracing::debug!(%method, url = %req.url(), "sending request");
        let res = Next::new(&self.http, &stack).run(req).await?;
        tracing::debug!(%method, url = %res.url, status = res.status.as_u16(), "received response");

        if !res.status.is_success() {
            return Err(CliError::Remote {
                uri: res.url.to_string(),
                status: res.status.as_u16(),
                body: res.body,
            });
        }
        Ok(res)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<(T, RawResponse)> {
        let req = self.request::<()>(Method::GET, self.entity_url(path)?, query, None)?;
        let res = self.execute(req, Vec::new()).await?;
        Ok((decode(&res)?, res))
    }

    async fn get_offer_at(&self, path: &str) -> Result<Offer> {
        let (mut offer, res): (Offer, _) = self.get(path, &[]).await?;
        if offer.etag.is_none() {
            offer.etag = res.header(ETAG.as_str()).map(str::to_string);
        }
        Ok(offer)
    }

    /// POST a publish-style request and return where to poll for progress.
    async fn start_operation(&self, path: &str, notification_emails: Option<&str>) -> Result<Option<String>> {
        let body = PublishRequest::new(notification_emails.map(str::to_string));
        let req = self.request(Method::POST, self.entity_url(path)?, &[], Some(&body))?;
        let res = self.execute(req, Vec::new()).await?;
        let location = res
            .header(OPERATION_LOCATION)
            .or_else(|| res.header(LOCATION.as_str()))
            .map(str::to_string);
        if location.is_none() {
            tracing::warn!(%path, "response carried no operation location");
        }
        Ok(location)
    }
}

fn decode<T: DeserializeOwned>(res: &RawResponse) -> Result<T> {
    serde_json::from_str(&res.body).map_err(|e| {
        tracing::debug!(url = %res.url, error = %e, "failed to decode response body");
        CliError::Json(e)
    })
}

#[async_trait]
impl PartnerService for PartnerClient {
    async fn list_offers(&self, publisher_id: &str) -> Result<Vec<Offer>> {
        let path = format!("api/publishers/{publisher_id}/offers");
        Ok(self.get(&path, &[]).await?.0)
    }

    async fn get_offer(&self, publisher_id: &str, offer_id: &str) -> Result<Offer> {
        self.get_offer_at(&Self::offer_path(publisher_id, offer_id)).await
    }

    async fn get_offer_by_version(
        &self,
        publisher_id: &str,
        offer_id: &str,
        version: i64,
    ) -> Result<Offer> {
        let path = format!("{}/versions/{version}", Self::offer_path(publisher_id, offer_id));
        self.get_offer_at(&path).await
    }

    async fn get_offer_by_slot(
        &self,
        publisher_id: &str,
        offer_id: &str,
        slot: &str,
    ) -> Result<Offer> {
        let path = format!("{}/slot/{slot}", Self::offer_path(publisher_id, offer_id));
        self.get_offer_at(&path).await
    }

    async fn get_offer_status(&self, publisher_id: &str, offer_id: &str) -> Result<OfferStatus> {
        let path = format!("{}/status", Self::offer_path(publisher_id, offer_id));
        Ok(self.get(&path, &[]).await?.0)
    }

    async fn put_offer(&self, offer: &Offer, precondition: Option<Precondition>) -> Result<Offer> {
        if offer.publisher_id.is_empty() || offer.id.is_empty() {
            return Err(CliError::InvalidInput(
                "offer must carry both 'id' and 'publisherId' to be saved".into(),
            ));
        }

        let path = Self::offer_path(&offer.publisher_id, &offer.id);
        let req = self.request(Method::PUT, self.entity_url(&path)?, &[], Some(offer))?;
        let extra: Vec<Arc<dyn Middleware>> = precondition
            .map(|p| Arc::new(IfMatch(p)) as Arc<dyn Middleware>)
            .into_iter()
            .collect();
        let res = self.execute(req, extra).await?;

        let mut saved: Offer = decode(&res)?;
        if saved.etag.is_none() {
            saved.etag = res.header(ETAG.as_str()).map(str::to_string);
        }
        Ok(saved)
    }

    async fn publish_offer(
        &self,
        publisher_id: &str,
        offer_id: &str,
        notification_emails: Option<&str>,
    ) -> Result<Option<String>> {
        let path = format!("{}/publish", Self::offer_path(publisher_id, offer_id));
        self.start_operation(&path, notification_emails).await
    }

    async fn go_live(
        &self,
        publisher_id: &str,
        offer_id: &str,
        notification_emails: Option<&str>,
    ) -> Result<Option<String>> {
        let path = format!("{}/golive", Self::offer_path(publisher_id, offer_id));
        self.start_operation(&path, notification_emails).await
    }

    async fn cancel_operation(
        &self,
        publisher_id: &str,
        offer_id: &str,
        notification_emails: Option<&str>,
    ) -> Result<Option<String>> {
        let path = format!("{}/cancel", Self::offer_path(publisher_id, offer_id));
        self.start_operation(&path, notification_emails).await
    }

    async fn list_operations(
        &self,
        publisher_id: &str,
        offer_id: &str,
        filtered_status: Option<&str>,
    ) -> Result<Vec<Operation>> {
        let path = format!("{}/submissions", Self::offer_path(publisher_id, offer_id));
        let query: Vec<(&str, &str)> = filtered_status
            .map(|status| ("filteredStatus", status))
            .into_iter()
            .collect();
        Ok(self.get(&path, &query).await?.0)
    }

    async fn get_operation(
        &self,
        publisher_id: &str,
        offer_id: &str,
        operation_id: &str,
    ) -> Result<OperationDetail> {
        let path = format!(
            "{}/operations/{operation_id}",
            Self::offer_path(publisher_id, offer_id)
        );
        Ok(self.get(&path, &[]).await?.0)
    }

    async fn get_operation_by_uri(&self, uri: &str) -> Result<OperationDetail> {
        let url = self.operation_url(uri)?;
        // api-version is already settled by operation_url
        let req = self
            .http
            .get(url)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .build()?;
        let res = self.execute(req, Vec::new()).await?;
        decode(&res)
    }

    async fn list_publishers(&self) -> Result<Vec<Publisher>> {
        Ok(self.get("api/publishers", &[]).await?.0)
    }
}
