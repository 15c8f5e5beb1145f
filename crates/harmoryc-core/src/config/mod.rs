//! HARMORYC launcher configuration layer.
//!
//! Every environment variable the launcher reads goes through this module;
//! callers use the typed configs instead of calling `std::env::var` directly.
//!
//! - `loader`: `env_or`, `env_optional`, `env_bool` and the `.env` loader
//! - `schema`: `LauncherConfig`, `ObservabilityConfig`
//! - `env_keys`: key constants

pub mod env_keys;
pub mod loader;
pub mod schema;

pub use loader::{env_bool, env_optional, env_or, load_dotenv, load_dotenv_from_dir};
pub use schema::{LauncherConfig, ObservabilityConfig};
