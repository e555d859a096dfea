use std::collections::VecDeque;
use std::f64::consts::PI;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::display::DisplayError;

/// One block of time-domain samples, channels x samples.
#[derive(Clone, Debug)]
pub struct AcquisitionFrame {
    pub sample_rate_hz: f64,
    pub samples: Vec<Vec<f64>>,
}
impl AcquisitionFrame {
    pub fn validate(&self) -> Result<(), DisplayError> {
        if self.sample_rate_hz.is_nan() || self.sample_rate_hz <= 0.0 {
            return Err(DisplayError::InvalidSampleRate(self.sample_rate_hz));
        }
        if self.samples.is_empty() || self.samples.iter().any(|c| c.is_empty()) {
            return Err(DisplayError::EmptyFrame);
        }
        Ok(())
    }
    pub fn num_channels(&self) -> usize {
        self.samples.len()
    }
    pub fn samples_per_channel(&self) -> Option<usize> {
        self.samples.first().map(|c| c.len())
    }
}
/// Something that can yield acquisition frames on demand.
pub trait FrameSource {
    fn next_frame(&mut self) -> Result<Option<AcquisitionFrame>, DisplayError>;
}
/// In-memory source useful for tests and deterministic playback.
pub struct ManualSource {
    queue: VecDeque<AcquisitionFrame>,
}
impl ManualSource {
    pub fn new(frames: impl IntoIterator<Item = AcquisitionFrame>) -> Self {
        Self {
            queue: frames.into_iter().collect(),
        }
    }
}
impl FrameSource for ManualSource {
    fn next_frame(&mut self) -> Result<Option<AcquisitionFrame>, DisplayError> {
        Ok(self.queue.pop_front())
    }
}
/// Sine component of a synthesized channel; amplitude in converter counts.
#[derive(Clone, Copy, Debug)]
pub struct Tone {
    pub frequency_hz: f64,
    pub amplitude: f64,
}
/// Synthesizes tones plus uniform noise, continuing phase across frames.
pub struct ToneSource {
    sample_rate_hz: f64,
    frame_len: usize,
    channels: Vec<Vec<Tone>>,
    noise: f64,
    remaining: Option<usize>,
    position: u64,
    rng: StdRng,
}
impl ToneSource {
    pub fn new(sample_rate_hz: f64, frame_len: usize, channels: Vec<Vec<Tone>>) -> Self {
        Self {
            sample_rate_hz,
            frame_len,
            channels,
            noise: 0.0,
            remaining: None,
            position: 0,
            rng: StdRng::seed_from_u64(0x5eed),
        }
    }
    /// Peak amplitude of the added noise, in counts.
    pub fn with_noise(mut self, amplitude: f64, seed: u64) -> Self {
        self.noise = amplitude.abs();
        self.rng = StdRng::seed_from_u64(seed);
        self
    }
    /// Stops after `frames` frames.
    pub fn limited(mut self, frames: usize) -> Self {
        self.remaining = Some(frames);
        self
    }
}
impl FrameSource for ToneSource {
    fn next_frame(&mut self) -> Result<Option<AcquisitionFrame>, DisplayError> {
        if let Some(remaining) = self.remaining.as_mut() {
            if *remaining == 0 {
                return Ok(None);
            }
            *remaining -= 1;
        }
        let start = self.position;
        let mut samples = Vec::with_capacity(self.channels.len());
        for tones in &self.channels {
            let mut channel = Vec::with_capacity(self.frame_len);
            for n in 0..self.frame_len as u64 {
                let t = (start + n) as f64 / self.sample_rate_hz;
                let mut value: f64 = tones
                    .iter()
                    .map(|tone| tone.amplitude * (2.0 * PI * tone.frequency_hz * t).sin())
                    .sum();
                if self.noise > 0.0 {
                    value += self.rng.gen_range(-self.noise..=self.noise);
                }
                channel.push(value);
            }
            samples.push(channel);
        }
        self.position += self.frame_len as u64;
        Ok(Some(AcquisitionFrame {
            sample_rate_hz: self.sample_rate_hz,
            samples,
        }))
    }
}
