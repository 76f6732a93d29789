//! Configuration type definitions.

use crate::constants::{DEFAULT_STEMS_DIR, conversion, model};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Separation model storage and source.
    pub model: ModelConfig,

    /// Separation backend settings.
    pub separation: SeparationConfig,

    /// Compressed output settings.
    pub conversion: ConversionConfig,
}

/// Where the separation model lives and where to fetch it from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Local model directory (default: platform data dir).
    pub dir: Option<PathBuf>,

    /// Remote archive fetched when the directory is empty.
    ///
    /// An empty string disables remote provisioning.
    pub url: Option<String>,

    /// Expected SHA-256 of the archive, hex encoded.
    pub sha256: Option<String>,
}

impl ModelConfig {
    /// Configured remote URL, treating an empty string as unset.
    pub fn remote_url(&self) -> Option<&str> {
        self.url.as_deref().map(str::trim).filter(|u| !u.is_empty())
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            dir: None,
            url: Some(model::DEFAULT_URL.to_string()),
            sha256: None,
        }
    }
}

/// Separation backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SeparationConfig {
    /// Backend executable.
    pub program: String,

    /// Model descriptor passed to the backend.
    pub model_name: String,

    /// Output root for separated stems.
    pub stems_dir: PathBuf,
}

impl Default for SeparationConfig {
    fn default() -> Self {
        Self {
            program: model::DEFAULT_PROGRAM.to_string(),
            model_name: model::DEFAULT_DESCRIPTOR.to_string(),
            stems_dir: PathBuf::from(DEFAULT_STEMS_DIR),
        }
    }
}

/// Compressed output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionConfig {
    /// Encoder executable. The bitrate is fixed at 64 kbit/s.
    pub program: String,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            program: conversion::DEFAULT_PROGRAM.to_string(),
        }
    }
}
