//! Coarse geolocation and public IP lookup.
//!
//! Lookups fall through three tiers: the full geolocation service, an
//! IP-only service, and finally a record of "Unknown" values. The probe never
//! returns an error; callers learn which tier answered from
//! [`LocationLookup::source`].

use std::time::Duration;

use async_trait::async_trait;
use chrono_tz::Tz;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{config::Config, error::ProbeError, services::device::UNKNOWN};

pub const UNKNOWN_LOCATION: &str = "Unknown Location";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationInfo {
    pub ip: String,
    pub city: String,
    pub region: String,
    pub country: String,
    pub country_code: String,
    /// "city, region, country-code" or "Unknown Location".
    pub location: String,
    pub timezone: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl LocationInfo {
    /// Everything unknown except the local timezone.
    pub fn unknown(timezone: impl Into<String>) -> Self {
        Self {
            ip: UNKNOWN.to_string(),
            city: UNKNOWN.to_string(),
            region: UNKNOWN.to_string(),
            country: UNKNOWN.to_string(),
            country_code: UNKNOWN.to_string(),
            location: UNKNOWN_LOCATION.to_string(),
            timezone: timezone.into(),
            latitude: None,
            longitude: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationSource {
    /// Full geolocation lookup succeeded.
    Primary,
    /// Only the public IP could be resolved.
    IpOnly,
    /// Both services failed.
    Default,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocationLookup {
    pub info: LocationInfo,
    pub source: LocationSource,
}

impl LocationLookup {
    pub fn is_degraded(&self) -> bool {
        self.source != LocationSource::Primary
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LocationProbe: Send + Sync {
    async fn locate(&self) -> LocationLookup;
}

#[derive(Debug, Deserialize)]
struct GeoResponse {
    ip: Option<String>,
    city: Option<String>,
    region: Option<String>,
    country_name: Option<String>,
    country_code: Option<String>,
    timezone: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    #[serde(default)]
    error: bool,
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IpResponse {
    ip: Option<String>,
}

fn or_unknown(value: Option<String>) -> String {
    value
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

impl GeoResponse {
    fn into_info(self, fallback_timezone: &str) -> LocationInfo {
        let city = or_unknown(self.city);
        let region = or_unknown(self.region);
        let country_code = or_unknown(self.country_code);
        LocationInfo {
            ip: or_unknown(self.ip),
            location: format!("{}, {}, {}", city, region, country_code),
            city,
            region,
            country: or_unknown(self.country_name),
            country_code,
            timezone: self
                .timezone
                .filter(|tz| !tz.is_empty())
                .unwrap_or_else(|| fallback_timezone.to_string()),
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

pub struct HttpLocationProbe {
    client: Client,
    primary_url: String,
    fallback_url: String,
    time_zone: Tz,
}

impl HttpLocationProbe {
    pub fn new(config: &Config) -> reqwest::Result<Self> {
        Self::with_urls(
            &config.geo_primary_url,
            &config.geo_fallback_url,
            config.http_timeout,
            config.time_zone,
        )
    }

    pub fn with_urls(
        primary_url: impl Into<String>,
        fallback_url: impl Into<String>,
        timeout: Duration,
        time_zone: Tz,
    ) -> reqwest::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            primary_url: primary_url.into(),
            fallback_url: fallback_url.into(),
            time_zone,
        })
    }

    async fn fetch<T: DeserializeOwned>(&self, url: &str) -> Result<T, ProbeError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ProbeError::Status(status));
        }
        Ok(response.json::<T>().await?)
    }

    async fn primary(&self) -> Result<LocationInfo, ProbeError> {
        let body: GeoResponse = self.fetch(&self.primary_url).await?;
        if body.error {
            return Err(ProbeError::Rejected(
                body.reason.unwrap_or_else(|| "unspecified".to_string()),
            ));
        }
        Ok(body.into_info(self.time_zone.name()))
    }

    async fn ip_only(&self) -> Result<LocationInfo, ProbeError> {
        let body: IpResponse = self.fetch(&self.fallback_url).await?;
        let ip = body
            .ip
            .filter(|ip| !ip.trim().is_empty())
            .ok_or(ProbeError::MissingField("ip"))?;
        Ok(LocationInfo {
            ip,
            ..LocationInfo::unknown(self.time_zone.name())
        })
    }
}

#[async_trait]
impl LocationProbe for HttpLocationProbe {
    async fn locate(&self) -> LocationLookup {
        let primary_err = match self.primary().await {
            Ok(info) => {
                return LocationLookup {
                    info,
                    source: LocationSource::Primary,
                }
            }
            Err(err) => err,
        };
        tracing::warn!(error = %primary_err, "primary location lookup failed, trying IP-only lookup");

        match self.ip_only().await {
            Ok(info) => LocationLookup {
                info,
                source: LocationSource::IpOnly,
            },
            Err(err) => {
                tracing::warn!(error = %err, "IP lookup failed, using unknown location");
                LocationLookup {
                    info: LocationInfo::unknown(self.time_zone.name()),
                    source: LocationSource::Default,
                }
            }
        }
    }
}

/// Answers every lookup with a fixed record. For offline runs and tests.
#[derive(Debug, Clone)]
pub struct StaticLocationProbe {
    lookup: LocationLookup,
}

impl StaticLocationProbe {
    pub fn new(info: LocationInfo) -> Self {
        Self {
            lookup: LocationLookup {
                info,
                source: LocationSource::Primary,
            },
        }
    }

    pub fn unknown(time_zone: Tz) -> Self {
        Self {
            lookup: LocationLookup {
                info: LocationInfo::unknown(time_zone.name()),
                source: LocationSource::Default,
            },
        }
    }
}

#[async_trait]
impl LocationProbe for StaticLocationProbe {
    async fn locate(&self) -> LocationLookup {
        self.lookup.clone()
    }
}
