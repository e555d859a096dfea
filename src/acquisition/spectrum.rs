use std::f64::consts::PI;

use rustfft::{num_complex::Complex64, FftPlanner};

use crate::acquisition::AcquisitionFrame;
use crate::display::{DisplayError, WindowSums};

/// Window applied to every block before the transform.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Window {
    #[default]
    Rectangular,
    Hann,
}
impl Window {
    pub fn coefficients(self, len: usize) -> Vec<f64> {
        match self {
            Window::Rectangular => vec![1.0; len],
            Window::Hann => (0..len)
                .map(|n| 0.5 - 0.5 * (2.0 * PI * n as f64 / len as f64).cos())
                .collect(),
        }
    }
}
/// Full-length power spectra of one frame, the raw input of the display.
#[derive(Clone, Debug)]
pub struct RawSpectrum {
    pub sample_rate_hz: f64,
    /// `|X_k|^2` per channel; the display keeps the first half.
    pub power: Vec<Vec<f64>>,
    pub window: WindowSums,
}
impl RawSpectrum {
    pub fn num_raw_points(&self) -> usize {
        self.power.first().map_or(0, |c| c.len())
    }
}
/// Helper that computes FFTs for a given window size.
pub struct SpectrumBuilder {
    fft_size: usize,
    coefficients: Vec<f64>,
}
impl SpectrumBuilder {
    pub fn with_size(fft_size: usize) -> Self {
        Self::with_window(fft_size, Window::Rectangular)
    }
    pub fn with_window(fft_size: usize, window: Window) -> Self {
        Self {
            fft_size,
            coefficients: window.coefficients(fft_size),
        }
    }
    pub fn fft_size(&self) -> usize {
        self.fft_size
    }
    pub fn window_sums(&self) -> WindowSums {
        WindowSums {
            sum: self.coefficients.iter().sum(),
            sum_sqr: self.coefficients.iter().map(|c| c * c).sum(),
        }
    }
    /// Channels shorter than the transform are zero padded; longer ones truncated.
    pub fn compute(&self, frame: &AcquisitionFrame) -> Result<RawSpectrum, DisplayError> {
        frame.validate()?;
        if self.fft_size < 2 || self.fft_size % 2 != 0 {
            return Err(DisplayError::InvalidFrameLength(self.fft_size));
        }
        let mut planner = FftPlanner::<f64>::new();
        let fft = planner.plan_fft_forward(self.fft_size);
        let power = frame
            .samples
            .iter()
            .map(|channel| {
                let mut buffer: Vec<Complex64> = channel
                    .iter()
                    .zip(&self.coefficients)
                    .map(|(v, w)| Complex64::new(v * w, 0.0))
                    .collect();
                buffer.resize(self.fft_size, Complex64::new(0.0, 0.0));
                fft.process(&mut buffer);
                buffer.iter().map(|c| c.norm_sqr()).collect()
            })
            .collect();
        Ok(RawSpectrum {
            sample_rate_hz: frame.sample_rate_hz,
            power,
            window: self.window_sums(),
        })
    }
}
