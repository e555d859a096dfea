// src/display/mod.rs
pub mod average;
pub mod axis;
pub mod config;
pub mod error;
pub mod events;
pub mod magnitude;
pub mod markers;
pub mod peaks;
pub mod plot;
pub use average::{AveragePolicy, SpectrumAverage};
pub use axis::FrequencyAxis;
pub use config::{ChannelConfig, PlotConfig};
pub use error::DisplayError;
pub use events::{EventSink, RecordingSink};
pub use magnitude::{convert_buffer, convert_sample, SpectralDensity, WindowSums};
pub use markers::{MarkerData, MarkerReading, PeakStep};
pub use peaks::{Peak, PeakId, PeakTable, ScanWindow};
pub use plot::{policy_for, FftDisplayPlot};
