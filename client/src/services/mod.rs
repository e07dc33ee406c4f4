pub mod auth;
pub mod device;
pub mod location;
pub mod session_manager;

pub use auth::{AuthService, AuthState};
pub use device::DeviceInfo;
pub use location::{
    HttpLocationProbe, LocationInfo, LocationLookup, LocationProbe, LocationSource,
    StaticLocationProbe,
};
pub use session_manager::{Interaction, SessionManager, SessionPhase};
