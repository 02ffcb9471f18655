//! Configuration: user settings loaded from `~/.gpam.toml`.

pub mod settings;

pub use settings::Settings;
