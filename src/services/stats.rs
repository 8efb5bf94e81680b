//! View statistics service, the stats server side

use chrono::NaiveDateTime;
use tracing::debug;
use crate::database::repositories::HitRepository;
use crate::models::hit::{EndpointHit, Hit, StatsQuery, ViewStats};
use crate::utils::errors::{EventHubError, Result};

#[derive(Clone, Debug)]
pub struct StatsService {
    hits: HitRepository,
}

impl StatsService {
    pub fn new(hits: HitRepository) -> Self {
        Self { hits }
    }

    /// Append a hit
    pub async fn record(&self, hit: EndpointHit) -> Result<Hit> {
        let saved = self.hits.record(&hit).await?;
        debug!(hit_id = saved.id, app = %saved.app, uri = %saved.uri, "Hit recorded");
        Ok(saved)
    }

    /// Views per (app, uri) within the inclusive range
    pub async fn stats(
        &self,
        start: Option<NaiveDateTime>,
        end: Option<NaiveDateTime>,
        uris: Vec<String>,
        unique: bool,
    ) -> Result<Vec<ViewStats>> {
        let query = build_query(start, end, uris, unique)?;
        self.hits.stats(&query).await
    }
}

/// Validate the range and assemble a stats query
pub fn build_query(
    start: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
    uris: Vec<String>,
    unique: bool,
) -> Result<StatsQuery> {
    let start = start.ok_or_else(|| EventHubError::validation("start", "must not be null"))?;
    let end = end.ok_or_else(|| EventHubError::validation("end", "must not be null"))?;
    if start > end {
        return Err(EventHubError::validation("start", "must not be after end"));
    }

    Ok(StatsQuery { start, end, uris, unique })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::NaiveDate;

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2030, 1, 1).unwrap().and_hms_opt(hour, 0, 0).unwrap()
    }

    #[test]
    fn test_build_query_requires_both_bounds() {
        assert_matches!(
            build_query(None, Some(at(1)), vec![], false),
            Err(EventHubError::Validation(fields)) if fields[0].field == "start"
        );
        assert_matches!(
            build_query(Some(at(1)), None, vec![], false),
            Err(EventHubError::Validation(fields)) if fields[0].field == "end"
        );
    }

    #[test]
    fn test_build_query_rejects_inverted_range() {
        assert!(build_query(Some(at(5)), Some(at(1)), vec![], true).is_err());
        let query = build_query(Some(at(1)), Some(at(1)), vec!["/events/1".into()], true).unwrap();
        assert!(query.unique);
        assert_eq!(query.uris, vec!["/events/1".to_string()]);
    }

    #[test]
    fn test_stats_rejects_open_range_without_querying() {
        tokio_test::block_on(async {
            let mut config = crate::config::Settings::default().stats_database;
            config.min_connections = 0;
            let pool = crate::database::create_lazy_pool(&config).unwrap();
            let service = StatsService::new(HitRepository::new(pool));

            let result = service.stats(Some(at(1)), None, vec![], false).await;
            assert_matches!(result, Err(EventHubError::Validation(_)));
        });
    }
}
