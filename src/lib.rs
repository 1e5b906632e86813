pub mod config;
pub mod console;
pub mod domains;
pub mod error;
pub mod interfaces;
pub mod logging;
pub mod providers;
pub mod runtime_paths;
pub mod scheduler;
pub mod services;

pub use error::{Result, RouteVizError};
