//! Request extractors
//!
//! - `ValidJson`: JSON body that passed its declared constraints
//! - `PathParams`: path segments with JSON error responses
//! - `QueryParams`: query string supporting repeated and comma separated lists
//! - `ClientIp`: caller address used for view statistics

use std::net::SocketAddr;
use std::str::FromStr;
use axum::async_trait;
use axum::extract::{ConnectInfo, FromRequest, FromRequestParts, Path, Request};
use axum::http::{request::Parts, HeaderMap};
use axum::Json;
use chrono::NaiveDateTime;
use serde::de::DeserializeOwned;
use validator::Validate;
use crate::utils::errors::{EventHubError, Result};
use crate::utils::helpers::{parse_timestamp, PageRequest};

/// JSON body validated with `validator`
#[derive(Debug, Clone)]
pub struct ValidJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = EventHubError;

    async fn from_request(req: Request, state: &S) -> std::result::Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| EventHubError::InvalidInput(rejection.body_text()))?;
        value.validate()?;
        Ok(Self(value))
    }
}

/// Path parameters, malformed segments become a 400 JSON error
#[derive(Debug, Clone)]
pub struct PathParams<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for PathParams<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = EventHubError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> std::result::Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| EventHubError::InvalidInput(rejection.body_text()))?;
        Ok(Self(value))
    }
}

/// Decoded query string pairs in request order
#[derive(Debug, Clone, Default)]
pub struct QueryParams(Vec<(String, String)>);

#[async_trait]
impl<S> FromRequestParts<S> for QueryParams
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> std::result::Result<Self, Self::Rejection> {
        Ok(QueryParams::parse(parts.uri.query().unwrap_or_default()))
    }
}

impl QueryParams {
    pub fn parse(query: &str) -> Self {
        Self(
            url::form_urlencoded::parse(query.as_bytes())
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect(),
        )
    }

    /// First non-blank value of `name`
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .filter(|(k, _)| k == name)
            .map(|(_, v)| v.trim())
            .find(|v| !v.is_empty())
    }

    pub fn parse_by<T>(&self, name: &str, f: impl Fn(&str) -> Option<T>) -> Result<Option<T>> {
        match self.get(name) {
            None => Ok(None),
            Some(raw) => f(raw)
                .map(Some)
                .ok_or_else(|| invalid_value(name, raw)),
        }
    }

    pub fn value<T: FromStr>(&self, name: &str) -> Result<Option<T>> {
        self.parse_by(name, |raw| raw.parse().ok())
    }

    pub fn required<T: FromStr>(&self, name: &str) -> Result<T> {
        self.value(name)?
            .ok_or_else(|| EventHubError::validation(name, "must not be null"))
    }

    /// Timestamp in the wire format
    pub fn timestamp(&self, name: &str) -> Result<Option<NaiveDateTime>> {
        self.parse_by(name, parse_timestamp)
    }

    /// Values of every `name` occurrence, each split on commas
    pub fn list_by<T>(&self, name: &str, f: impl Fn(&str) -> Option<T>) -> Result<Vec<T>> {
        self.0
            .iter()
            .filter(|(k, _)| k == name)
            .flat_map(|(_, v)| v.split(','))
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .map(|raw| f(raw).ok_or_else(|| invalid_value(name, raw)))
            .collect()
    }

    pub fn list<T: FromStr>(&self, name: &str) -> Result<Vec<T>> {
        self.list_by(name, |raw| raw.parse().ok())
    }

    /// `from` and `size`, validated
    pub fn page(&self) -> Result<PageRequest> {
        let defaults = PageRequest::default();
        let page = PageRequest::new(
            self.value("from")?.unwrap_or(defaults.from),
            self.value("size")?.unwrap_or(defaults.size),
        );
        page.validate()?;
        Ok(page)
    }
}

fn invalid_value(name: &str, raw: &str) -> EventHubError {
    EventHubError::validation(name, format!("Failed to convert value: {}", raw))
}

/// Client IP address
///
/// Priority: first `X-Forwarded-For` entry, `X-Real-IP`, connection address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIp(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> std::result::Result<Self, Self::Rejection> {
        let connect_info = parts.extensions.get::<ConnectInfo<SocketAddr>>();
        Ok(Self(client_ip(&parts.headers, connect_info.map(|c| c.0))))
    }
}

fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let forwarded = headers
        .get("X-Forwarded-For")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim);
    let real_ip = headers
        .get("X-Real-IP")
        .and_then(|v| v.to_str().ok())
        .map(str::trim);

    forwarded
        .into_iter()
        .chain(real_ip)
        .find(|ip| ip.parse::<std::net::IpAddr>().is_ok())
        .map(str::to_string)
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| "127.0.0.1".to_string())
}
