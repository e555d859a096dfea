//! Spectrum display core: averaging, magnitude units, peak search and
//! markers for live FFT traces.
pub mod acquisition;
pub mod display;
pub mod types;
pub use display::{DisplayError, EventSink, FftDisplayPlot, PlotConfig};
pub use types::{AverageType, MagnitudeType, MarkerKind, PlotEvent};
