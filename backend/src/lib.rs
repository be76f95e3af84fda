pub mod config;
pub mod error;
pub mod logging;
pub mod routes;
pub mod test_util;
pub mod throttle;
pub mod vision;

pub use config::{Config, ModelsConfig, ServerConfig, ThrottleConfig};
pub use error::ApiError;
pub use throttle::AdmissionController;
pub use vision::{FrameAnalysis, VisionService};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    /// Frame admission: rate gate plus single-flight slot.
    pub throttle: AdmissionController,
    /// Detector and classifier handles, loaded once at startup.
    pub vision: VisionService,
}
