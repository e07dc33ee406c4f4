pub mod activity;
pub mod repository;
pub mod session;

pub use activity::{ActivityLog, ActivityView, CleanReport, RecordOutcome};
pub use repository::{JsonCollection, Repository};
pub use session::SessionStore;
