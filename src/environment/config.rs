// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Environment configuration files

use super::{Environment, EnvironmentOverrides, Operation, OverhangMethod, Segmentation};
use anyhow::{Context, Result};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Serializable environment settings; every field is optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnvironmentConfig {
    pub segmentation: Option<Segmentation>,
    pub tolerance: Option<f64>,
    pub max_twist_rate: Option<f64>,
    pub natural_up: Option<[f64; 3]>,
    pub overhang_method: Option<OverhangMethod>,
    pub operation: Option<Operation>,
    pub miter_limit: Option<f64>,
}

impl EnvironmentConfig {
    pub fn from_toml_str(source: &str) -> Result<Self> {
        toml::from_str(source).context("Failed to parse environment config")
    }

    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))
    }

    /// Load `polyframe.toml` from the working directory if present, then apply
    /// process environment variable overrides
    pub fn load() -> Result<Self> {
        let mut config = if Path::new("polyframe.toml").exists() {
            Self::from_file("polyframe.toml")?
        } else {
            Self::default()
        };
        config.apply_env_vars();
        Ok(config)
    }

    /// Apply `POLYFRAME_SEGMENTS` and `POLYFRAME_TOLERANCE` when set
    pub fn apply_env_vars(&mut self) {
        if let Some(count) = std::env::var("POLYFRAME_SEGMENTS")
            .ok()
            .and_then(|value| value.parse().ok())
        {
            self.segmentation = Some(Segmentation::fixed(count));
        }

        if let Some(tolerance) = std::env::var("POLYFRAME_TOLERANCE")
            .ok()
            .and_then(|value| value.parse().ok())
        {
            self.tolerance = Some(tolerance);
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))?;
        Ok(())
    }

    pub fn overrides(&self) -> EnvironmentOverrides {
        EnvironmentOverrides {
            segmentation: self.segmentation,
            tolerance: self.tolerance,
            max_twist_rate: self.max_twist_rate,
            natural_up: self.natural_up.map(Vector3::from),
            overhang_method: self.overhang_method,
            operation: self.operation,
            miter_limit: self.miter_limit,
        }
    }

    /// The default environment with this configuration applied
    pub fn environment(&self) -> Environment {
        Environment::default().applying(&self.overrides())
    }
}

impl Environment {
    /// Read an environment from a TOML configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Environment> {
        Ok(EnvironmentConfig::from_file(path)?.environment())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_partial_config() {
        let config = EnvironmentConfig::from_toml_str(
            r#"
            tolerance = 0.01
            operation = "subtraction"

            [segmentation]
            mode = "fixed"
            count = 24
            "#,
        )
        .unwrap();

        let env = config.environment();
        assert_eq!(env.segmentation, Segmentation::fixed(24));
        assert_eq!(env.tolerance, 0.01);
        assert_eq!(env.operation, Operation::Subtraction);
        assert_eq!(env.miter_limit, Environment::default().miter_limit);
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        assert!(EnvironmentConfig::from_toml_str("segments = 3").is_err());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("env.toml");
        let config = EnvironmentConfig {
            segmentation: Some(Segmentation::adaptive(4.0, 0.5)),
            natural_up: Some([0.0, 0.0, 1.0]),
            ..Default::default()
        };
        config.save(&path).unwrap();
        assert_eq!(EnvironmentConfig::from_file(&path).unwrap(), config);
    }
}
