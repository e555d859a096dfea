use std::f64::consts::SQRT_2;

use crate::types::MagnitudeType;

/// Full-scale reference of the converter, in counts.
pub const FULL_SCALE_COUNTS: f64 = 2048.0;
/// dBu reference voltage.
pub const DBU_REFERENCE_VOLTS: f64 = 0.77459667;

/// Converts one linear power value into display units.
///
/// `VRootHz` yields the per-bin RMS voltage; the density scaling is applied by
/// [`SpectralDensity`] once all overlapping buffers have been seen.
pub fn convert_sample(kind: MagnitudeType, v: f64, num_points: usize, scale: f64) -> f64 {
    let n = num_points as f64;
    match kind {
        MagnitudeType::Dbfs => {
            10.0 * ((v / (FULL_SCALE_COUNTS * FULL_SCALE_COUNTS)) / (n * n)).log10()
        }
        MagnitudeType::Dbv => {
            10.0 * v.log10() + 20.0 * scale.log10() - 20.0 * n.log10() - 20.0 * SQRT_2.log10()
        }
        MagnitudeType::Dbu => {
            10.0 * v.log10() + 20.0 * scale.log10()
                - 20.0 * n.log10()
                - 20.0 * (SQRT_2 * DBU_REFERENCE_VOLTS).log10()
        }
        MagnitudeType::Vpeak => v.sqrt() * scale / n,
        MagnitudeType::Vrms | MagnitudeType::VRootHz => v.sqrt() * scale / SQRT_2 / n,
    }
}

/// Converts a whole vector; `out` and `source` have the spectrum length.
pub fn convert_buffer(kind: MagnitudeType, source: &[f64], out: &mut [f64], scale: f64) {
    let n = source.len();
    for (o, v) in out.iter_mut().zip(source) {
        *o = convert_sample(kind, *v, n, scale);
    }
}

/// Window statistics needed for the spectral-density scaling.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WindowSums {
    pub sum: f64,
    pub sum_sqr: f64,
}

impl Default for WindowSums {
    fn default() -> Self {
        Self {
            sum: 1.0,
            sum_sqr: 1.0,
        }
    }
}

impl WindowSums {
    /// Equivalent noise bandwidth in Hz.
    pub fn enbw(&self, sample_rate: f64) -> f64 {
        sample_rate * self.sum_sqr / (self.sum * self.sum)
    }
}

/// Accumulates RMS spectra over `overlap` consecutive buffers before
/// publishing a V/sqrt(Hz) density.
#[derive(Debug)]
pub struct SpectralDensity {
    overlap: usize,
    buffer_idx: usize,
    accumulators: Vec<Vec<f64>>,
    window: Vec<WindowSums>,
}

impl SpectralDensity {
    pub fn new(channels: usize) -> Self {
        Self {
            overlap: 1,
            buffer_idx: 0,
            accumulators: Vec::new(),
            window: vec![WindowSums::default(); channels],
        }
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    pub fn set_overlap(&mut self, overlap: usize) {
        self.overlap = overlap.max(1);
        self.reset();
    }

    pub fn set_window_sums(&mut self, channel: usize, sums: WindowSums) -> bool {
        match self.window.get_mut(channel) {
            Some(slot) => {
                *slot = sums;
                true
            }
            None => false,
        }
    }

    pub fn reset(&mut self) {
        self.buffer_idx = 0;
        self.accumulators.clear();
    }

    /// True when the current buffer completes an overlap group.
    pub fn is_final_buffer(&self) -> bool {
        self.buffer_idx + 1 >= self.overlap
    }

    /// Folds one channel's RMS values in; returns the density of each bin on
    /// the final buffer of the group.
    pub fn accumulate(
        &mut self,
        channel: usize,
        rms: &[f64],
        sample_rate: f64,
    ) -> Option<Vec<f64>> {
        if self.accumulators.len() <= channel {
            self.accumulators.resize(channel + 1, Vec::new());
        }
        let final_buffer = self.is_final_buffer();
        let nb = (self.overlap as f64).sqrt();
        let enbw = self
            .window
            .get(channel)
            .copied()
            .unwrap_or_default()
            .enbw(sample_rate);
        let acc = &mut self.accumulators[channel];
        if acc.len() != rms.len() {
            *acc = vec![0.0; rms.len()];
        }
        for (a, r) in acc.iter_mut().zip(rms) {
            *a = (*a * *a + r * r).sqrt();
        }
        if !final_buffer {
            return None;
        }
        Some(acc.iter().map(|a| a / nb / enbw.sqrt()).collect())
    }

    /// Advances to the next buffer, clearing the accumulators after a full group.
    pub fn finish_buffer(&mut self) {
        if self.is_final_buffer() {
            self.reset();
        } else {
            self.buffer_idx += 1;
        }
    }
}
