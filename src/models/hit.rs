//! Hit model for the stats service

use serde::{Deserialize, Serialize};
use chrono::NaiveDateTime;
use sqlx::FromRow;
use validator::Validate;

use crate::utils::helpers::{date_format, validate_ip, validate_not_blank};

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Hit {
    pub id: i64,
    pub app: String,
    pub uri: String,
    pub ip: String,
    pub timestamp: NaiveDateTime,
}

/// Body of `POST /hit`, also sent by the stats client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct EndpointHit {
    #[validate(custom(function = "validate_not_blank"))]
    #[validate(length(max = 255))]
    pub app: String,
    #[validate(custom(function = "validate_not_blank"))]
    #[validate(length(max = 512))]
    pub uri: String,
    #[validate(custom(function = "validate_ip"))]
    pub ip: String,
    #[serde(with = "date_format")]
    pub timestamp: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ViewStats {
    pub app: String,
    pub uri: String,
    pub hits: i64,
}

/// Parameters of an aggregate views query
#[derive(Debug, Clone, PartialEq)]
pub struct StatsQuery {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub uris: Vec<String>,
    pub unique: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_hit_validation() {
        let hit: EndpointHit = serde_json::from_str(
            r#"{"app":"ewm-main-service","uri":"/events/1","ip":"192.163.0.1","timestamp":"2022-09-06 11:00:23"}"#,
        )
        .unwrap();
        assert!(hit.validate().is_ok());

        let blank_uri = EndpointHit {
            uri: " ".to_string(),
            ..hit.clone()
        };
        assert!(blank_uri.validate().is_err());

        let bad_ip = EndpointHit {
            ip: "1.2.3".to_string(),
            ..hit
        };
        assert!(bad_ip.validate().is_err());
    }
}
