//! A client for the Vamp router management API.
//!
//! Routes are read and written as whole JSON documents under `/v1/routes`.

#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]


use bytes::Bytes;
use http::{header, Method, Request, StatusCode, Uri};
use http_body_util::{BodyExt, Full};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use thiserror::Error;
use tracing::{debug, trace};
use vamp_router_controller_core::{Route, RouterApi};

const ROUTES_PATH: &str = "/v1/routes";

#[derive(Clone)]
pub struct VampClient {
    base: String,
    http: Client<HttpConnector, Full<Bytes>>,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid router API address: {0}")]
    InvalidUri(#[from] http::uri::InvalidUri),

    #[error("router API address must include a scheme and host: {0}")]
    Address(String),

    #[error("failed to build request: {0}")]
    Request(#[from] http::Error),

    #[error("request failed: {0}")]
    Http(#[from] hyper_util::client::legacy::Error),

    #[error("failed to read response body: {0}")]
    Body(#[from] hyper::Error),

    #[error("invalid route JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("router API responded with {status}: {body}")]
    Status { status: StatusCode, body: String },
}

// === impl VampClient ===

impl VampClient {
    /// Builds a client for the API rooted at `address`, e.g.
    /// `http://vamp-router:10001`.
    pub fn new(address: &str) -> Result<Self, Error> {
        let uri = address.parse::<Uri>()?;
        if uri.scheme().is_none() || uri.authority().is_none() {
            return Err(Error::Address(address.to_string()));
        }

        let http = Client::builder(TokioExecutor::new()).build_http();
        Ok(Self {
            base: address.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub async fn fetch(&self, name: &str) -> Result<Option<Route>, Error> {
        let path = format!("{ROUTES_PATH}/{name}");
        let (status, body) = self.send(Method::GET, &path, None).await?;
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let route = Self::decode(status, body)?;
        Ok(Some(route))
    }

    pub async fn create(&self, route: &Route) -> Result<Route, Error> {
        let (status, body) = self.send(Method::POST, ROUTES_PATH, Some(route)).await?;
        Self::decode_or(status, body, route)
    }

    pub async fn replace(&self, route: &Route) -> Result<Route, Error> {
        let path = format!("{ROUTES_PATH}/{}", route.name);
        let (status, body) = self.send(Method::PUT, &path, Some(route)).await?;
        Self::decode_or(status, body, route)
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        route: Option<&Route>,
    ) -> Result<(StatusCode, Bytes), Error> {
        let body = match route {
            Some(route) => Full::new(Bytes::from(serde_json::to_vec(route)?)),
            None => Full::default(),
        };
        let req = Request::builder()
            .method(method.clone())
            .uri(format!("{}{}", self.base, path))
            .header(header::ACCEPT, "application/json")
            .header(header::CONTENT_TYPE, "application/json")
            .body(body)?;
        trace!(?req);

        let rsp = self.http.request(req).await?;
        let status = rsp.status();
        let body = rsp.into_body().collect().await?.to_bytes();
        debug!(%method, path, %status, "Router API responded");
        Ok((status, body))
    }

    fn decode(status: StatusCode, body: Bytes) -> Result<Route, Error> {
        if !status.is_success() {
            return Err(Error::Status {
                status,
                body: String::from_utf8_lossy(&body).trim().to_string(),
            });
        }
        serde_json::from_slice(&body).map_err(Into::into)
    }

    /// Writes may be acknowledged without echoing the route back.
    fn decode_or(status: StatusCode, body: Bytes, sent: &Route) -> Result<Route, Error> {
        if status.is_success() && body.iter().all(u8::is_ascii_whitespace) {
            return Ok(sent.clone());
        }
        Self::decode(status, body)
    }
}

impl std::fmt::Debug for VampClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VampClient")
            .field("base", &self.base)
            .finish()
    }
}

#[async_trait::async_trait]
impl RouterApi for VampClient {
    async fn get_route(&self, name: &str) -> anyhow::Result<Option<Route>> {
        self.fetch(name).await.map_err(Into::into)
    }

    async fn create_route(&self, route: &Route) -> anyhow::Result<Route> {
        self.create(route).await.map_err(Into::into)
    }

    async fn replace_route(&self, route: &Route) -> anyhow::Result<Route> {
        self.replace(route).await.map_err(Into::into)
    }
}
