//! Sunset resolution with a same-day memo
//!
//! Sunset times come from an external lookup (sunrise-sunset.org by
//! default). Results are cached per rounded coordinate pair and calendar
//! day. A failed lookup is never reported to the caller: the fallback
//! sunset is returned and memoized for the rest of the day instead.

use crate::error::SunsetError;
use chrono::{DateTime, Local, NaiveDate, NaiveTime, Timelike, Utc};
use dashmap::DashMap;
use serde::Deserialize;
use std::future::Future;

/// Source of sunset instants for a location
pub trait SunsetLookup: Send + Sync + 'static {
    /// Sunset instant (UTC) for today at the given coordinates
    fn sunset(
        &self,
        lat: f64,
        lng: f64,
    ) -> impl Future<Output = Result<DateTime<Utc>, SunsetError>> + Send;
}

#[derive(Debug, Deserialize)]
struct SunsetResponse {
    status: String,
    #[serde(default)]
    results: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct SunsetResults {
    sunset: DateTime<Utc>,
}

/// HTTP client for the sunrise-sunset.org JSON API
#[derive(Debug, Clone)]
pub struct SunriseSunsetClient {
    http: reqwest::Client,
    base_url: String,
}

impl SunriseSunsetClient {
    /// Create a client against the given endpoint
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

impl SunsetLookup for SunriseSunsetClient {
    async fn sunset(&self, lat: f64, lng: f64) -> Result<DateTime<Utc>, SunsetError> {
        let response = self
            .http
            .get(&self.base_url)
            .query(&[
                ("lat", lat.to_string()),
                ("lng", lng.to_string()),
                ("formatted", "0".to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SunsetError::Status(response.status()));
        }

        let body: SunsetResponse = serde_json::from_slice(&response.bytes().await?)?;
        if body.status != "OK" {
            return Err(SunsetError::Api(body.status));
        }

        let results: SunsetResults = serde_json::from_value(body.results)?;
        Ok(results.sunset)
    }
}

/// Cache key: coordinates rounded to 4 decimals plus the calendar day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    lat_e4: i64,
    lng_e4: i64,
    day: NaiveDate,
}

impl CacheKey {
    #[must_use]
    pub fn new(lat: f64, lng: f64, day: NaiveDate) -> Self {
        Self {
            lat_e4: (lat * 10_000.0).round() as i64,
            lng_e4: (lng * 10_000.0).round() as i64,
            day,
        }
    }

    #[must_use]
    pub fn day(&self) -> NaiveDate {
        self.day
    }
}

/// Resolves local sunset times, memoizing results for the current day
pub struct SunsetResolver<L> {
    lookup: L,
    cache: DashMap<CacheKey, NaiveTime>,
    fallback: NaiveTime,
}

impl<L: SunsetLookup> SunsetResolver<L> {
    /// Create a resolver that substitutes `fallback` when the lookup fails
    pub fn new(lookup: L, fallback: NaiveTime) -> Self {
        Self {
            lookup,
            cache: DashMap::new(),
            fallback,
        }
    }

    /// Local sunset time for today at the given coordinates
    pub async fn resolve(&self, lat: f64, lng: f64) -> NaiveTime {
        self.resolve_on(lat, lng, Local::now().date_naive()).await
    }

    /// Local sunset time at the given coordinates, memoized under `today`
    pub async fn resolve_on(&self, lat: f64, lng: f64, today: NaiveDate) -> NaiveTime {
        let key = CacheKey::new(lat, lng, today);
        if let Some(cached) = self.cache.get(&key).map(|entry| *entry.value()) {
            tracing::debug!("Sunset cache hit for ({}, {}) on {}: {}", lat, lng, today, cached);
            return cached;
        }

        let sunset = match self.lookup.sunset(lat, lng).await {
            Ok(instant) => {
                let local = instant.with_timezone(&Local).time();
                let local = local.with_nanosecond(0).unwrap_or(local);
                tracing::info!("Resolved sunset for ({}, {}) on {}: {}", lat, lng, today, local);
                local
            }
            Err(e) => {
                tracing::warn!(
                    "Sunset lookup for ({}, {}) failed, using fallback {}: {}",
                    lat,
                    lng,
                    self.fallback,
                    e
                );
                self.fallback
            }
        };

        self.cache.insert(key, sunset);
        sunset
    }

    /// Drop every cache entry not created on `today`, returning how many were removed
    pub fn purge_stale(&self, today: NaiveDate) -> usize {
        let before = self.cache.len();
        self.cache.retain(|key, _| key.day() == today);
        before - self.cache.len()
    }

    /// Number of memoized entries
    #[must_use]
    pub fn cached_count(&self) -> usize {
        self.cache.len()
    }
}

#[cfg(test)]
pub(crate) mod fake {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// Lookup returning a settable instant (or failing) while counting calls
    #[derive(Clone)]
    pub struct FakeLookup {
        sunset: Arc<Mutex<Option<DateTime<Utc>>>>,
        calls: Arc<AtomicUsize>,
    }

    impl FakeLookup {
        pub fn returning(sunset: DateTime<Utc>) -> Self {
            Self {
                sunset: Arc::new(Mutex::new(Some(sunset))),
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        pub fn failing() -> Self {
            Self {
                sunset: Arc::new(Mutex::new(None)),
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        pub fn set(&self, sunset: Option<DateTime<Utc>>) {
            *self.sunset.lock().unwrap() = sunset;
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl SunsetLookup for FakeLookup {
        async fn sunset(&self, _lat: f64, _lng: f64) -> Result<DateTime<Utc>, SunsetError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let sunset = *self.sunset.lock().unwrap();
            sunset.ok_or_else(|| SunsetError::Api("INVALID_REQUEST".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fake::FakeLookup;
    use super::*;
    use chrono::TimeZone;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn fallback() -> NaiveTime {
        NaiveTime::from_hms_opt(18, 45, 0).unwrap()
    }

    fn instant() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 22, 10, 33).unwrap()
    }

    #[tokio::test]
    async fn test_same_day_resolves_once() {
        let lookup = FakeLookup::returning(instant());
        let resolver = SunsetResolver::new(lookup.clone(), fallback());

        let first = resolver.resolve_on(17.074656, -61.81752, day(1)).await;
        let second = resolver.resolve_on(17.074656, -61.81752, day(1)).await;

        assert_eq!(first, second);
        assert_eq!(first, instant().with_timezone(&Local).time());
        assert_eq!(lookup.call_count(), 1);
    }

    #[tokio::test]
    async fn test_rounding_shares_cache_entry() {
        let lookup = FakeLookup::returning(instant());
        let resolver = SunsetResolver::new(lookup.clone(), fallback());

        resolver.resolve_on(17.07466, -61.81752, day(1)).await;
        resolver.resolve_on(17.074661, -61.817519, day(1)).await;
        assert_eq!(lookup.call_count(), 1);

        resolver.resolve_on(17.0750, -61.81752, day(1)).await;
        assert_eq!(lookup.call_count(), 2);
    }

    #[tokio::test]
    async fn test_next_day_issues_new_lookup() {
        let lookup = FakeLookup::returning(instant());
        let resolver = SunsetResolver::new(lookup.clone(), fallback());

        resolver.resolve_on(10.0, 20.0, day(1)).await;
        resolver.resolve_on(10.0, 20.0, day(2)).await;
        assert_eq!(lookup.call_count(), 2);
        assert_eq!(resolver.cached_count(), 2);
    }

    #[tokio::test]
    async fn test_failure_memoizes_fallback() {
        let lookup = FakeLookup::failing();
        let resolver = SunsetResolver::new(lookup.clone(), fallback());

        assert_eq!(resolver.resolve_on(10.0, 20.0, day(1)).await, fallback());
        assert_eq!(resolver.resolve_on(10.0, 20.0, day(1)).await, fallback());
        assert_eq!(lookup.call_count(), 1);
    }

    #[tokio::test]
    async fn test_purge_keeps_only_today() {
        let lookup = FakeLookup::returning(instant());
        let resolver = SunsetResolver::new(lookup, fallback());

        resolver.resolve_on(10.0, 20.0, day(1)).await;
        resolver.resolve_on(11.0, 20.0, day(1)).await;
        resolver.resolve_on(10.0, 20.0, day(2)).await;

        assert_eq!(resolver.purge_stale(day(2)), 2);
        assert_eq!(resolver.cached_count(), 1);
        assert_eq!(resolver.purge_stale(day(2)), 0);
    }

    #[test]
    fn test_payload_parsing() {
        let body: SunsetResponse = serde_json::from_str(
            r#"{"results":{"sunrise":"2024-06-01T10:01:02+00:00","sunset":"2024-06-01T22:10:33+00:00"},"status":"OK"}"#,
        )
        .unwrap();
        assert_eq!(body.status, "OK");
        let results: SunsetResults = serde_json::from_value(body.results).unwrap();
        assert_eq!(results.sunset, instant());
    }

    #[test]
    fn test_error_payload_has_no_results() {
        let body: SunsetResponse =
            serde_json::from_str(r#"{"results":"","status":"INVALID_REQUEST"}"#).unwrap();
        assert_eq!(body.status, "INVALID_REQUEST");
        assert!(serde_json::from_value::<SunsetResults>(body.results).is_err());
    }
}
