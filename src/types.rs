// src/types.rs
use serde::{Deserialize, Serialize};

// Averaging applied to a live channel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AverageType {
    #[default]
    Sample,
    PeakHold,
    PeakHoldContinuous,
    MinHold,
    MinHoldContinuous,
    LinearRms,
    LinearDb,
    ExponentialRms,
    ExponentialDb,
}

impl AverageType {
    /// dB-averaging types run the averaging engine after the magnitude conversion.
    pub fn averages_in_db(self) -> bool {
        matches!(self, AverageType::LinearDb | AverageType::ExponentialDb)
    }
}

// Display unit of the magnitude buffers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MagnitudeType {
    #[default]
    Dbfs,
    Dbv,
    Dbu,
    Vpeak,
    Vrms,
    VRootHz,
}

// What a marker is currently attached to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MarkerKind {
    Fixed,
    Peak,
}

// Notifications sent from the plot to the UI layer.
#[derive(Clone, Debug, PartialEq)]
pub enum PlotEvent {
    NewData,
    NewMarkerData,
    SampleRateUpdated(f64),
    SampleCountUpdated(usize),
    CurrentAverageIndex { channel: usize, index: usize },
    ChannelAdded(usize),
    MarkerSelected { channel: usize, marker: usize },
}
