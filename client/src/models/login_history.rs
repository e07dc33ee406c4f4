use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoginStatus {
    Success,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginHistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub device: String,
    pub location: String,
    pub ip: String,
    pub status: LoginStatus,
}
