pub mod activity;
pub mod login_history;
pub mod session;

pub use activity::{ActivityEntry, ActivityEvent};
pub use login_history::{LoginHistoryEntry, LoginStatus};
pub use session::{DeviceClass, Session};
