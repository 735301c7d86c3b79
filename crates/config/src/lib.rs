//! Configuration loading for the conduit client.
//!
//! Config files: `conduit.toml`, `conduit.yaml`, or `conduit.json`
//! Searched in `./` then `~/.config/conduit/`.
//!
//! Supports `${ENV_VAR}` substitution in all string values.

pub mod env_subst;
pub mod loader;
pub mod schema;

pub use {
    loader::{
        apply_env_overrides, config_dir, discover_and_load, find_or_default_config_path,
        load_config,
    },
    schema::{ApiConfig, ConduitConfig, WizardConfig},
};
