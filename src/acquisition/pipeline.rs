use log::debug;

use crate::acquisition::source::FrameSource;
use crate::acquisition::spectrum::SpectrumBuilder;
use crate::display::{DisplayError, EventSink, FftDisplayPlot};

/// Pulls frames from a source, transforms them and feeds the plot.
pub struct DisplayPipeline<S: FrameSource, E: EventSink> {
    source: S,
    builder: SpectrumBuilder,
    plot: FftDisplayPlot<E>,
}
impl<S: FrameSource, E: EventSink> DisplayPipeline<S, E> {
    pub fn new(source: S, builder: SpectrumBuilder, mut plot: FftDisplayPlot<E>) -> Self {
        let sums = builder.window_sums();
        for ch in 0..plot.channel_count() {
            plot.set_window_coefficient_sum(ch, sums.sum, sums.sum_sqr);
        }
        Self {
            source,
            builder,
            plot,
        }
    }
    pub fn plot(&self) -> &FftDisplayPlot<E> {
        &self.plot
    }
    pub fn plot_mut(&mut self) -> &mut FftDisplayPlot<E> {
        &mut self.plot
    }
    pub fn into_plot(self) -> FftDisplayPlot<E> {
        self.plot
    }
    /// Processes one frame; `Ok(false)` once the source is exhausted.
    pub fn pump_once(&mut self) -> Result<bool, DisplayError> {
        let Some(frame) = self.source.next_frame()? else {
            return Ok(false);
        };
        if frame.num_channels() != self.plot.channel_count() {
            return Err(DisplayError::ChannelMismatch {
                expected: self.plot.channel_count(),
                actual: frame.num_channels(),
            });
        }
        let spectrum = self.builder.compute(&frame)?;
        self.plot.preset_sample_rate(spectrum.sample_rate_hz);
        self.plot.plot_data(&spectrum.power, spectrum.num_raw_points());
        Ok(true)
    }
    /// Pumps until the source runs dry or `max_frames` frames were shown.
    pub fn run(&mut self, max_frames: usize) -> Result<usize, DisplayError> {
        let mut shown = 0;
        while shown < max_frames && self.pump_once()? {
            shown += 1;
        }
        debug!("pipeline processed {shown} frames");
        Ok(shown)
    }
}
