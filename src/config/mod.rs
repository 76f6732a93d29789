//! Configuration loading and management.

mod file;
mod paths;
mod types;
mod validate;

pub use file::{
    CONFIG_ENV, active_config_path, load_config_file, load_default_config, save_config,
    save_default_config,
};
pub use paths::{config_dir, config_file_path, default_model_dir};
pub use types::{Config, ConversionConfig, ModelConfig, SeparationConfig};
pub use validate::validate_config;
