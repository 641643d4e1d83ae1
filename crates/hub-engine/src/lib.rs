//! Smart hub engine
//!
//! Turns device settings and sensor readings into fan and light commands,
//! keeps a bounded reading history, and tracks a sunset-based light
//! schedule that is refreshed daily.

pub mod config;
pub mod decision;
pub mod duration;
pub mod error;
pub mod history;
pub mod hub;
pub mod model;
pub mod scheduler;
pub mod settings;
pub mod sunset;
pub mod window;

pub use config::{HubConfig, Location};
pub use error::{HubError, SunsetError};
pub use hub::SmartHub;
pub use model::*;
pub use sunset::{SunriseSunsetClient, SunsetLookup};
