//! Configuration loading, application, and credential lookup.
mod apply;
mod credentials;
mod loader;
pub mod types;


pub use apply::apply_config;
pub use credentials::{DEFAULT_ENV_FILE, resolve_credential, resolve_credential_with};
pub use loader::{load_config, load_config_file};
