// src/acquisition/mod.rs
pub mod pipeline;
pub mod source;
pub mod spectrum;
pub use pipeline::DisplayPipeline;
pub use source::{AcquisitionFrame, FrameSource, ManualSource, Tone, ToneSource};
pub use spectrum::{RawSpectrum, SpectrumBuilder, Window};
