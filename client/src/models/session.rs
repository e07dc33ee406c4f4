//! Models for tracking login sessions on this device.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse device class derived from the user-agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DeviceClass {
    #[default]
    Desktop,
    Mobile,
    Tablet,
}

impl DeviceClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceClass::Desktop => "Desktop",
            DeviceClass::Mobile => "Mobile",
            DeviceClass::Tablet => "Tablet",
        }
    }
}

impl fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// One login on one device.
pub struct Session {
    /// Opaque identifier generated when the session is created.
    pub id: String,
    /// Display label, e.g. "Desktop - Chrome".
    pub device: String,
    pub device_type: DeviceClass,
    pub browser: String,
    pub os: String,
    /// "city, region, country-code" or "Unknown Location".
    pub location: String,
    pub ip: String,
    /// Set once at creation.
    pub login_time: DateTime<Utc>,
    /// Refreshed by the heartbeat.
    pub last_active: DateTime<Utc>,
    /// True only for the most recently created session.
    pub current: bool,
}
