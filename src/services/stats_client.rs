//! Stats service client
//!
//! HTTP client the main service uses to record page hits and read
//! aggregated views back from the stats service.

use std::collections::HashMap;
use std::time::Duration;
use chrono::NaiveDateTime;
use reqwest::Client;
use tracing::{debug, warn};
use crate::config::StatsClientConfig;
use crate::models::event::{event_uri, Event};
use crate::models::hit::{EndpointHit, ViewStats};
use crate::utils::errors::{EventHubError, Result};
use crate::utils::helpers::{format_timestamp, now};

#[derive(Clone, Debug)]
pub struct StatsClient {
    client: Client,
    base_url: String,
    app_name: String,
}

impl StatsClient {
    /// Create a new StatsClient instance
    pub fn new(config: &StatsClientConfig) -> Result<Self> {
        let base_url = url::Url::parse(&config.base_url)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("event-hub/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(EventHubError::Http)?;

        Ok(Self {
            client,
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
            app_name: config.app_name.clone(),
        })
    }

    /// POST one hit to the stats service
    pub async fn record_hit(&self, hit: &EndpointHit) -> Result<()> {
        debug!(uri = %hit.uri, ip = %hit.ip, "Recording hit");

        self.client
            .post(format!("{}/hit", self.base_url))
            .json(hit)
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }

    /// Query aggregated views for `uris` between `start` and `end`
    pub async fn get_stats(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
        uris: &[String],
        unique: bool,
    ) -> Result<Vec<ViewStats>> {
        let mut params: Vec<(&str, String)> = vec![
            ("start", format_timestamp(start)),
            ("end", format_timestamp(end)),
            ("unique", unique.to_string()),
        ];
        params.extend(uris.iter().map(|uri| ("uris", uri.clone())));

        let stats = self
            .client
            .get(format!("{}/stats", self.base_url))
            .query(&params)
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<ViewStats>>()
            .await?;

        Ok(stats)
    }

    /// Record a view of `uri` by `ip`; failures are logged and swallowed
    pub async fn track_view(&self, uri: &str, ip: &str) {
        let hit = EndpointHit {
            app: self.app_name.clone(),
            uri: uri.to_string(),
            ip: ip.to_string(),
            timestamp: now(),
        };

        if let Err(e) = self.record_hit(&hit).await {
            warn!(uri = %uri, error = %e, "Failed to record hit");
        }
    }

    /// Unique-IP views per event id, empty when the stats service is unavailable
    pub async fn event_views(&self, events: &[Event]) -> HashMap<i64, i64> {
        let Some(start) = events
            .iter()
            .map(|e| e.published_on.unwrap_or(e.created_on))
            .min()
        else {
            return HashMap::new();
        };

        let uris: Vec<String> = events.iter().map(Event::uri).collect();
        match self.get_stats(start, now(), &uris, true).await {
            Ok(stats) => views_by_event(&stats),
            Err(e) => {
                warn!(events = events.len(), error = %e, "Failed to load event views");
                HashMap::new()
            }
        }
    }
}

/// Map `/events/{id}` rows to event ids, ignoring other uris
pub fn views_by_event(stats: &[ViewStats]) -> HashMap<i64, i64> {
    let mut views = HashMap::new();
    for row in stats {
        if let Some(id) = row
            .uri
            .strip_prefix("/events/")
            .and_then(|id| id.parse::<i64>().ok())
        {
            if row.uri == event_uri(id) {
                *views.entry(id).or_insert(0) += row.hits;
            }
        }
    }
    views
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::event::tests::sample_event;
    use chrono::NaiveDate;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> StatsClient {
        StatsClient::new(&StatsClientConfig {
            base_url: server.uri(),
            app_name: "event-hub".to_string(),
            timeout_seconds: 2,
        })
        .unwrap()
    }

    #[test]
    fn test_views_by_event_skips_foreign_uris() {
        let stats = vec![
            ViewStats { app: "event-hub".into(), uri: "/events/5".into(), hits: 3 },
            ViewStats { app: "event-hub".into(), uri: "/events".into(), hits: 10 },
            ViewStats { app: "event-hub".into(), uri: "/events/05".into(), hits: 1 },
        ];
        let views = views_by_event(&stats);
        assert_eq!(views.get(&5), Some(&3));
        assert_eq!(views.len(), 1);
    }

    #[test]
    fn test_new_rejects_malformed_base_url() {
        let config = StatsClientConfig {
            base_url: "not a url".to_string(),
            app_name: "event-hub".to_string(),
            timeout_seconds: 1,
        };
        assert!(StatsClient::new(&config).is_err());
    }

    #[tokio::test]
    async fn test_record_hit_posts_json() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hit"))
            .and(body_partial_json(json!({"app": "event-hub", "uri": "/events/1", "ip": "10.0.0.1"})))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let hit = EndpointHit {
            app: "event-hub".to_string(),
            uri: "/events/1".to_string(),
            ip: "10.0.0.1".to_string(),
            timestamp: NaiveDate::from_ymd_opt(2030, 1, 1).unwrap().and_hms_opt(12, 0, 0).unwrap(),
        };
        client.record_hit(&hit).await.unwrap();
    }

    #[tokio::test]
    async fn test_get_stats_sends_wire_dates_and_uris() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/stats"))
            .and(query_param("start", "2030-01-01 00:00:00"))
            .and(query_param("unique", "true"))
            .and(query_param("uris", "/events/1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"app": "event-hub", "uri": "/events/1", "hits": 4}
            ])))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let start = NaiveDate::from_ymd_opt(2030, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        let stats = client
            .get_stats(start, start + chrono::Duration::days(1), &["/events/1".to_string()], true)
            .await
            .unwrap();
        assert_eq!(stats, vec![ViewStats { app: "event-hub".into(), uri: "/events/1".into(), hits: 4 }]);
    }

    #[tokio::test]
    async fn test_event_views_degrade_to_empty_on_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/stats"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let views = client.event_views(&[sample_event(0, false, 0)]).await;
        assert!(views.is_empty());
    }

    #[tokio::test]
    async fn test_event_views_skip_request_without_events() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert!(client.event_views(&[]).await.is_empty());
    }

    #[tokio::test]
    async fn test_track_view_swallows_failures() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hit"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server).track_view("/events", "127.0.0.1").await;
    }
}
