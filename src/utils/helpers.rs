//! Helper functions and utilities
//!
//! This module contains the wire date format, pagination types and
//! small validation helpers shared by both services.

use chrono::{Local, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use validator::{Validate, ValidationError};

/// Date format used on the wire by both services
pub const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Current local time truncated to whole seconds
pub fn now() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

/// Format a timestamp in the wire format
pub fn format_timestamp(timestamp: NaiveDateTime) -> String {
    timestamp.format(DATE_TIME_FORMAT).to_string()
}

/// Parse a timestamp in the wire format
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value.trim(), DATE_TIME_FORMAT).ok()
}

/// Serde adapter for `yyyy-MM-dd HH:mm:ss` timestamps
pub mod date_format {
    use super::DATE_TIME_FORMAT;
    use chrono::NaiveDateTime;
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&date.format(DATE_TIME_FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&s, DATE_TIME_FORMAT).map_err(serde::de::Error::custom)
    }

    /// Same format for optional fields
    pub mod option {
        use super::DATE_TIME_FORMAT;
        use chrono::NaiveDateTime;
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S>(date: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match date {
                Some(date) => serializer.serialize_str(&date.format(DATE_TIME_FORMAT).to_string()),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
        where
            D: Deserializer<'de>,
        {
            let value: Option<String> = Option::deserialize(deserializer)?;
            match value {
                Some(s) if !s.trim().is_empty() => NaiveDateTime::parse_from_str(s.trim(), DATE_TIME_FORMAT)
                    .map(Some)
                    .map_err(serde::de::Error::custom),
                _ => Ok(None),
            }
        }
    }
}

/// Offset based pagination parameters (`from`, `size`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Validate)]
pub struct PageRequest {
    #[serde(default)]
    #[validate(range(min = 0, message = "must be greater than or equal to 0"))]
    pub from: i64,
    #[serde(default = "default_page_size")]
    #[validate(range(min = 1, message = "must be greater than 0"))]
    pub size: i64,
}

fn default_page_size() -> i64 {
    10
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            from: 0,
            size: default_page_size(),
        }
    }
}

impl PageRequest {
    pub fn new(from: i64, size: i64) -> Self {
        Self { from, size }
    }

    /// Apply to an in-memory collection that is already sorted
    pub fn slice<T>(&self, items: Vec<T>) -> Vec<T> {
        let from = usize::try_from(self.from).unwrap_or(0);
        let size = usize::try_from(self.size).unwrap_or(0);
        items.into_iter().skip(from).take(size).collect()
    }
}

/// A page of query results
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self { items }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
        }
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }
}

/// Accept IPv4/IPv6 literals and `localhost`
pub fn validate_ip(ip: &str) -> Result<(), ValidationError> {
    let ip = ip.trim();
    if ip.eq_ignore_ascii_case("localhost") || ip.parse::<IpAddr>().is_ok() {
        Ok(())
    } else {
        Err(ValidationError::new("ip").with_message("must be an IPv4/IPv6 address or localhost".into()))
    }
}

/// Reject strings that are empty after trimming
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::new("not_blank").with_message("must not be blank".into()))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_timestamp_round_trip_through_wire_format() {
        let ts = NaiveDate::from_ymd_opt(2024, 5, 17)
            .unwrap()
            .and_hms_opt(18, 30, 5)
            .unwrap();
        assert_eq!(format_timestamp(ts), "2024-05-17 18:30:05");
        assert_eq!(parse_timestamp("2024-05-17 18:30:05"), Some(ts));
        assert_eq!(parse_timestamp("2024-05-17T18:30:05"), None);
    }

    #[test]
    fn test_validate_ip() {
        assert!(validate_ip("192.168.0.1").is_ok());
        assert!(validate_ip("::1").is_ok());
        assert!(validate_ip("localhost").is_ok());
        assert!(validate_ip("999.1.1.1").is_err());
        assert!(validate_ip("not-an-ip").is_err());
    }

    #[test]
    fn test_page_request_slice() {
        let page = PageRequest::new(2, 2);
        assert_eq!(page.slice(vec![1, 2, 3, 4, 5]), vec![3, 4]);
        assert_eq!(PageRequest::new(10, 2).slice(vec![1, 2]), Vec::<i32>::new());
    }

    #[test]
    fn test_page_request_rejects_negative_from_and_zero_size() {
        assert!(PageRequest::new(-1, 10).validate().is_err());
        assert!(PageRequest::new(0, 0).validate().is_err());
        assert!(PageRequest::default().validate().is_ok());
    }

    #[test]
    fn test_page_map() {
        let page = Page::new(vec![1, 2]).map(|v| v * 10);
        assert_eq!(page.into_items(), vec![10, 20]);
    }
}
