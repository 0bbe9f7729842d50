//! Shared utilities for the energy report jobs
//!
//! Logging setup, `.env` loading and the small environment helpers every
//! job uses to read its settings.

pub mod config;
pub mod env;
pub mod logging;

pub use config::{Config, LogFormat};
pub use env::{env_opt, load_dotenv};
pub use logging::{init_from_config, init_tracing, init_tracing_json};
