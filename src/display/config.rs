use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::display::error::DisplayError;
use crate::types::{AverageType, MagnitudeType};

/// Settings of one live channel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    /// Volts per converter count; used by the voltage units.
    pub scale_factor: f64,
    pub average_type: AverageType,
    pub history: usize,
    /// Linear averages fall back to block averaging when disabled.
    pub history_enabled: bool,
    pub peak_count: usize,
    pub marker_count: usize,
}
impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            scale_factor: 1.0,
            average_type: AverageType::Sample,
            history: 1,
            history_enabled: true,
            peak_count: 5,
            marker_count: 1,
        }
    }
}
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    pub channels: usize,
    pub sample_rate_hz: f64,
    pub magnitude_type: MagnitudeType,
    /// `(top, bottom)` of the y axis; the bottom is the marker value before data arrives.
    pub y_axis_bounds: (f64, f64),
    /// Sweep window; ignored unless `sweep_stop_hz > sweep_start_hz`.
    pub sweep_start_hz: f64,
    pub sweep_stop_hz: f64,
    pub visible_peak_search: bool,
    /// One entry per channel, or empty to use defaults everywhere.
    pub channel_settings: Vec<ChannelConfig>,
}
impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            channels: 2,
            sample_rate_hz: 1000.0,
            magnitude_type: MagnitudeType::Dbfs,
            y_axis_bounds: (0.0, -140.0),
            sweep_start_hz: 0.0,
            sweep_stop_hz: 0.0,
            visible_peak_search: false,
            channel_settings: Vec::new(),
        }
    }
}
impl PlotConfig {
    pub fn from_json_str(text: &str) -> Result<Self, DisplayError> {
        let config: PlotConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, DisplayError> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
    pub fn to_json_string(&self) -> Result<String, DisplayError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
    pub fn validate(&self) -> Result<(), DisplayError> {
        if self.sample_rate_hz.is_nan() || self.sample_rate_hz <= 0.0 {
            return Err(DisplayError::InvalidSampleRate(self.sample_rate_hz));
        }
        if !self.channel_settings.is_empty() && self.channel_settings.len() != self.channels {
            return Err(DisplayError::ChannelMismatch {
                expected: self.channels,
                actual: self.channel_settings.len(),
            });
        }
        Ok(())
    }
    /// Settings of channel `idx`, falling back to defaults.
    pub fn channel(&self, idx: usize) -> ChannelConfig {
        self.channel_settings.get(idx).cloned().unwrap_or_default()
    }
}
