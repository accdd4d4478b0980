//! Shared application service layer for the CSCC explorer.
//!
//! Configuration, the scenario data loader (synchronous and threaded), and
//! dataset maintenance tasks used by the command line front end.

pub mod config;
pub mod error;
pub mod loader;
pub mod progress;
pub mod split;

pub use config::{LoaderConfig, default_config_yaml, load_config, save_config, validate_config};
pub use error::{AppError, AppResult};
pub use loader::{
    FetchTicket, LoadedMetrics, LoaderMessage, LoaderState, ScenarioDataLoader, ScenarioRequest,
    load_country_range, load_metrics, load_metrics_with_progress,
};
pub use progress::{LoadProgressEvent, LoadStage};
pub use split::{SplitFile, SplitManifest, SplitOptions, load_manifest, split_dataset};
