//! Configuration management for the virtual stick
//!
//! Handles loading, parsing and validation of YAML configuration files.
//! Every field has a serde default, so an empty file is a valid config.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::error::{StickError, StickResult};
use crate::stick::EmissionMode;

/// Root configuration structure
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StickConfig {
    #[serde(default)]
    pub emission_mode: EmissionMode,
    /// Angle/power change (exclusive) that triggers a threshold-mode emission
    #[serde(default = "default_change_threshold")]
    pub change_threshold: u16,
    /// Threshold mode: emit at least this often while moving
    #[serde(default = "default_min_interval_ms")]
    pub min_interval_ms: u64,
    /// Continuous mode: tick period while the stick is held
    #[serde(default = "default_loop_interval_ms")]
    pub loop_interval_ms: u64,
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub axis: Option<AxisConfig>,
}

/// Pad sizing relative to the control's smaller half-dimension
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LayoutConfig {
    #[serde(default = "default_stick_ratio")]
    pub stick_ratio: f32,
    #[serde(default = "default_button_ratio")]
    pub button_ratio: f32,
}

/// Byte-axis output mapping
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AxisConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Neutral axis value
    #[serde(default = "default_axis_center")]
    pub center: u8,
    /// Power below this percentage maps to the neutral frame
    #[serde(default = "default_deadzone_percent")]
    pub deadzone_percent: u8,
    /// Low-pass filter weight of the newest sample, in (0, 1]
    #[serde(default = "default_filter_alpha")]
    pub filter_alpha: f32,
    /// Per-axis change (exclusive) required for a new frame
    #[serde(default = "default_axis_change_threshold")]
    pub change_threshold: u8,
    #[serde(default = "default_min_interval_ms")]
    pub min_interval_ms: u64,
}

impl Default for StickConfig {
    fn default() -> Self {
        Self {
            emission_mode: EmissionMode::default(),
            change_threshold: default_change_threshold(),
            min_interval_ms: default_min_interval_ms(),
            loop_interval_ms: default_loop_interval_ms(),
            layout: LayoutConfig::default(),
            axis: None,
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            stick_ratio: default_stick_ratio(),
            button_ratio: default_button_ratio(),
        }
    }
}

impl Default for AxisConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            center: default_axis_center(),
            deadzone_percent: default_deadzone_percent(),
            filter_alpha: default_filter_alpha(),
            change_threshold: default_axis_change_threshold(),
            min_interval_ms: default_min_interval_ms(),
        }
    }
}

impl StickConfig {
    /// Load configuration from file
    pub async fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let config = Self::from_yaml(&contents)
            .with_context(|| format!("Failed to parse YAML config: {}", path))?;

        config
            .validate()
            .with_context(|| format!("Invalid config: {}", path))?;

        Ok(config)
    }

    /// Parse configuration from a YAML string (no validation)
    pub fn from_yaml(contents: &str) -> Result<Self> {
        // An empty document deserializes to null, not to an empty mapping
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(contents)?)
    }

    /// Save configuration to file
    pub async fn save(&self, path: &str) -> Result<()> {
        let yaml = serde_yaml::to_string(self).context("Failed to serialize config to YAML")?;

        fs::write(path, yaml)
            .await
            .with_context(|| format!("Failed to write config file: {}", path))?;

        Ok(())
    }

    /// Check ranges that would make the engine misbehave
    pub fn validate(&self) -> StickResult<()> {
        if self.min_interval_ms == 0 {
            return Err(invalid("min_interval_ms must be greater than 0"));
        }
        if self.loop_interval_ms == 0 {
            return Err(invalid("loop_interval_ms must be greater than 0"));
        }
        if self.change_threshold > 100 {
            return Err(invalid("change_threshold must be at most 100"));
        }

        let ratio_ok = |r: f32| r.is_finite() && r > 0.0 && r <= 1.0;
        if !ratio_ok(self.layout.stick_ratio) {
            return Err(invalid("layout.stick_ratio must be in (0, 1]"));
        }
        if !ratio_ok(self.layout.button_ratio) {
            return Err(invalid("layout.button_ratio must be in (0, 1]"));
        }

        if let Some(axis) = &self.axis {
            if !ratio_ok(axis.filter_alpha) {
                return Err(invalid("axis.filter_alpha must be in (0, 1]"));
            }
            if axis.deadzone_percent > 100 {
                return Err(invalid("axis.deadzone_percent must be at most 100"));
            }
            if axis.center == 0 {
                return Err(invalid("axis.center must be greater than 0"));
            }
        }

        Ok(())
    }
}

fn invalid(msg: &str) -> StickError {
    StickError::InvalidConfig(msg.to_string())
}

// Default value functions
fn default_true() -> bool { true }
fn default_change_threshold() -> u16 { 5 }
fn default_min_interval_ms() -> u64 { 50 }
fn default_loop_interval_ms() -> u64 { 100 }
fn default_stick_ratio() -> f32 { 0.75 }
fn default_button_ratio() -> f32 { 0.25 }
fn default_axis_center() -> u8 { 127 }
fn default_deadzone_percent() -> u8 { 15 }
fn default_filter_alpha() -> f32 { 0.25 }
fn default_axis_change_threshold() -> u8 { 5 }
