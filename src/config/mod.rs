pub mod evolution;
pub mod manager;
pub mod traits;

pub use evolution::EvolutionConfig;
pub use manager::{AppConfig, ConfigManager};
pub use traits::ConfigSection;
