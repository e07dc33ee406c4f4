use serde::{Deserialize, Serialize};

pub const DEFAULT_ACTIVITY_ICON: &str = "📋";

fn default_icon() -> String {
    DEFAULT_ACTIVITY_ICON.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub action: String,
    /// Epoch milliseconds.
    pub timestamp: i64,
    #[serde(default = "default_icon")]
    pub icon: String,
}

impl ActivityEntry {
    /// The one rule for what a usable entry looks like, applied on every read
    /// and by the explicit clean pass.
    pub fn is_valid(&self) -> bool {
        self.timestamp > 0 && !self.action.trim().is_empty()
    }
}

/// Notable dashboard actions and how they appear in the feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivityEvent {
    Login,
    Logout,
    PasswordChange,
    ProfileUpdate,
    Enable2fa,
    PatientAdded { patient: String },
    PatientUpdated { patient: String },
    PatientDischarged { patient: String },
    TransferRequested { patient: String },
    BedAssigned { bed: String, patient: String },
    BedReleased { bed: String },
    BedMaintenance { bed: String },
    BedMaintenanceComplete { bed: String },
    StaffAdded { staff: String },
    StaffUpdated { staff: String },
    StaffScheduled { staff: String },
    StaffStatusChanged { staff: String, status: String },
    EquipmentAdded { equipment: String },
    EquipmentAssigned { equipment: String },
    EquipmentMaintenance { equipment: String },
    EquipmentMaintenanceComplete { equipment: String },
    TransferApproved { patient: String },
    TransferRejected { patient: String },
    TransferCompleted { patient: String },
    ReportGenerated { report: String },
    SettingsChanged,
}

impl ActivityEvent {
    pub fn action(&self) -> String {
        match self {
            ActivityEvent::Login => "Logged in".to_string(),
            ActivityEvent::Logout => "Logged out".to_string(),
            ActivityEvent::PasswordChange => "Changed password".to_string(),
            ActivityEvent::ProfileUpdate => "Updated profile information".to_string(),
            ActivityEvent::Enable2fa => "Enabled 2FA".to_string(),
            ActivityEvent::PatientAdded { patient } => format!("Added patient: {patient}"),
            ActivityEvent::PatientUpdated { patient } => format!("Updated patient: {patient}"),
            ActivityEvent::PatientDischarged { patient } => {
                format!("Discharged patient: {patient}")
            }
            ActivityEvent::TransferRequested { patient } => {
                format!("Requested transfer for: {patient}")
            }
            ActivityEvent::BedAssigned { bed, patient } => {
                format!("Assigned bed {bed} to {patient}")
            }
            ActivityEvent::BedReleased { bed } => format!("Released bed {bed}"),
            ActivityEvent::BedMaintenance { bed } => format!("Marked bed {bed} for maintenance"),
            ActivityEvent::BedMaintenanceComplete { bed } => {
                format!("Completed maintenance on bed {bed}")
            }
            ActivityEvent::StaffAdded { staff } => format!("Added staff: {staff}"),
            ActivityEvent::StaffUpdated { staff } => format!("Updated staff: {staff}"),
            ActivityEvent::StaffScheduled { staff } => format!("Assigned schedule to {staff}"),
            ActivityEvent::StaffStatusChanged { staff, status } => {
                format!("{staff} is now {status}")
            }
            ActivityEvent::EquipmentAdded { equipment } => format!("Added equipment: {equipment}"),
            ActivityEvent::EquipmentAssigned { equipment } => {
                format!("Assigned equipment: {equipment}")
            }
            ActivityEvent::EquipmentMaintenance { equipment } => {
                format!("{equipment} moved to maintenance")
            }
            ActivityEvent::EquipmentMaintenanceComplete { equipment } => {
                format!("{equipment} maintenance completed")
            }
            ActivityEvent::TransferApproved { patient } => {
                format!("Approved transfer for {patient}")
            }
            ActivityEvent::TransferRejected { patient } => {
                format!("Rejected transfer for {patient}")
            }
            ActivityEvent::TransferCompleted { patient } => {
                format!("Completed transfer for {patient}")
            }
            ActivityEvent::ReportGenerated { report } => format!("Generated {report} report"),
            ActivityEvent::SettingsChanged => "Updated system settings".to_string(),
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            ActivityEvent::Login => "🔓",
            ActivityEvent::Logout | ActivityEvent::PasswordChange => "🔒",
            ActivityEvent::ProfileUpdate => "✏️",
            ActivityEvent::Enable2fa => "📱",
            ActivityEvent::PatientAdded { .. } => "👤",
            ActivityEvent::PatientUpdated { .. } | ActivityEvent::StaffUpdated { .. } => "📝",
            ActivityEvent::PatientDischarged { .. }
            | ActivityEvent::BedReleased { .. }
            | ActivityEvent::BedMaintenanceComplete { .. }
            | ActivityEvent::EquipmentMaintenanceComplete { .. }
            | ActivityEvent::TransferApproved { .. } => "✅",
            ActivityEvent::TransferRequested { .. } | ActivityEvent::TransferCompleted { .. } => {
                "🔄"
            }
            ActivityEvent::BedAssigned { .. } => "🛏️",
            ActivityEvent::BedMaintenance { .. } | ActivityEvent::EquipmentAssigned { .. } => "🔧",
            ActivityEvent::StaffAdded { .. } | ActivityEvent::StaffStatusChanged { .. } => "👨‍⚕️",
            ActivityEvent::StaffScheduled { .. } => "📅",
            ActivityEvent::EquipmentAdded { .. } => "📦",
            ActivityEvent::EquipmentMaintenance { .. } => "⚠️",
            ActivityEvent::TransferRejected { .. } => "❌",
            ActivityEvent::ReportGenerated { .. } => "📊",
            ActivityEvent::SettingsChanged => "⚙️",
        }
    }
}
