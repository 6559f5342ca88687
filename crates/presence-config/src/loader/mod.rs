//! Config loading: TOML file, then environment overrides.

mod env;
mod file;

#[cfg(test)]
mod tests;

pub use env::{apply_overrides, parse_scopes, ENV_CONFIG_PATH};
pub use file::{default_config_path, load_default, load_from_path};
