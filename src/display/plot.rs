use log::{debug, warn};

use crate::display::average::{AveragePolicy, SpectrumAverage};
use crate::display::axis::FrequencyAxis;
use crate::display::config::PlotConfig;
use crate::display::error::DisplayError;
use crate::display::events::EventSink;
use crate::display::magnitude::{convert_buffer, SpectralDensity, WindowSums};
use crate::display::markers::{MarkerReading, MarkerSet, PeakStep, TraceData};
use crate::display::peaks::{Peak, PeakTable, ScanWindow};
use crate::types::{AverageType, MagnitudeType, MarkerKind, PlotEvent};

/// Markers and peaks attached to one displayed trace.
#[derive(Debug)]
struct Trace {
    peaks: PeakTable,
    markers: MarkerSet,
}

#[derive(Debug)]
struct LiveChannel {
    trace: Trace,
    scale_factor: f64,
    average_type: AverageType,
    history: usize,
    history_enabled: bool,
    engine: Option<SpectrumAverage>,
    avg_index: usize,
    /// Raw half-spectrum of the last acquisition.
    original: Vec<f64>,
    magnitudes: Vec<f64>,
}

impl LiveChannel {
    fn new() -> Self {
        Self {
            trace: Trace {
                peaks: PeakTable::with_count(1),
                markers: MarkerSet::default(),
            },
            scale_factor: 1.0,
            average_type: AverageType::Sample,
            history: 1,
            history_enabled: true,
            engine: None,
            avg_index: 0,
            original: Vec::new(),
            magnitudes: Vec::new(),
        }
    }
}

/// A stored trace shown next to the live channels.
#[derive(Debug)]
struct ReferenceTrace {
    name: String,
    axis: FrequencyAxis,
    y: Vec<f64>,
    trace: Trace,
}

const REFERENCE_MARKERS: usize = 5;
const REFERENCE_PEAKS: usize = 10;

/// Engine used for an averaging type; `None` displays every acquisition as is.
pub fn policy_for(average: AverageType, history_enabled: bool) -> Option<AveragePolicy> {
    match average {
        AverageType::Sample => None,
        AverageType::PeakHold => Some(AveragePolicy::PeakHold),
        AverageType::PeakHoldContinuous => Some(AveragePolicy::PeakHoldContinuous),
        AverageType::MinHold => Some(AveragePolicy::MinHold),
        AverageType::MinHoldContinuous => Some(AveragePolicy::MinHoldContinuous),
        AverageType::LinearRms if history_enabled => Some(AveragePolicy::LinearRms),
        AverageType::LinearRms => Some(AveragePolicy::LinearRmsBlock),
        AverageType::LinearDb if history_enabled => Some(AveragePolicy::LinearAverage),
        AverageType::LinearDb => Some(AveragePolicy::LinearAverageBlock),
        AverageType::ExponentialRms | AverageType::ExponentialDb => {
            Some(AveragePolicy::ExponentialAverage)
        }
    }
}

/// Turns raw power spectra into display magnitudes, peaks and marker readouts.
///
/// Live channels are indexed from 0; registered reference traces follow them.
/// Bad channel, marker or peak indices are logged and ignored.
pub struct FftDisplayPlot<E: EventSink> {
    sink: E,
    channels: Vec<LiveChannel>,
    references: Vec<ReferenceTrace>,
    axis: FrequencyAxis,
    num_points: usize,
    acquired: bool,
    sample_rate: f64,
    pending_sample_rate: Option<f64>,
    magnitude_type: MagnitudeType,
    preset_magnitude_type: MagnitudeType,
    density: SpectralDensity,
    y_axis_bounds: (f64, f64),
    sweep: Option<(f64, f64)>,
    visible_peak_search: bool,
}

impl<E: EventSink> FftDisplayPlot<E> {
    pub fn new(channels: usize, sink: E) -> Self {
        let defaults = PlotConfig::default();
        let sample_rate = defaults.sample_rate_hz;
        Self {
            sink,
            channels: (0..channels).map(|_| LiveChannel::new()).collect(),
            references: Vec::new(),
            axis: FrequencyAxis::new(0.0, sample_rate / 2.0, 0),
            num_points: 0,
            acquired: false,
            sample_rate,
            pending_sample_rate: None,
            magnitude_type: defaults.magnitude_type,
            preset_magnitude_type: defaults.magnitude_type,
            density: SpectralDensity::new(channels),
            y_axis_bounds: defaults.y_axis_bounds,
            sweep: None,
            visible_peak_search: false,
        }
    }

    pub fn from_config(config: &PlotConfig, sink: E) -> Result<Self, DisplayError> {
        config.validate()?;
        let mut plot = Self::new(config.channels, sink);
        plot.set_sample_rate(config.sample_rate_hz);
        plot.set_magnitude_type(config.magnitude_type);
        plot.set_amplitude(config.y_axis_bounds.0, config.y_axis_bounds.1);
        if config.sweep_stop_hz > config.sweep_start_hz {
            plot.set_start_stop(config.sweep_start_hz, config.sweep_stop_hz);
        }
        plot.set_visible_peak_search(config.visible_peak_search);
        for ch in 0..config.channels {
            let settings = config.channel(ch);
            plot.set_scale_factor(ch, settings.scale_factor);
            plot.set_average(
                ch,
                settings.average_type,
                settings.history,
                settings.history_enabled,
            );
            plot.set_peak_count(ch, settings.peak_count);
            plot.set_marker_count(ch, settings.marker_count);
        }
        Ok(plot)
    }

    pub fn sink(&self) -> &E {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut E {
        &mut self.sink
    }

    pub fn into_sink(self) -> E {
        self.sink
    }

    /// Number of live channels.
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Live channels plus reference traces.
    pub fn trace_count(&self) -> usize {
        self.channels.len() + self.references.len()
    }

    pub fn num_points(&self) -> usize {
        self.num_points
    }

    pub fn has_acquisition(&self) -> bool {
        self.acquired
    }

    pub fn x_axis(&self) -> &[f64] {
        self.axis.points()
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Magnitudes of a live channel or reference trace.
    pub fn magnitudes(&self, ch: usize) -> &[f64] {
        if let Some(channel) = self.channels.get(ch) {
            return &channel.magnitudes;
        }
        match self.references.get(ch - self.channels.len()) {
            Some(reference) => &reference.y,
            None => {
                warn!("magnitudes: invalid channel index {ch}");
                &[]
            }
        }
    }

    /// Raw half-spectrum of the last acquisition on a live channel.
    pub fn original_data(&self, ch: usize) -> &[f64] {
        match self.channels.get(ch) {
            Some(channel) => &channel.original,
            None => {
                warn!("original_data: invalid channel index {ch}");
                &[]
            }
        }
    }

    /// Processes one acquisition. `num_raw_points` is twice the number of
    /// displayed bins; only the first half of every buffer is used.
    pub fn plot_data<B: AsRef<[f64]>>(&mut self, buffers: &[B], num_raw_points: usize) {
        let half = num_raw_points / 2;
        if half == 0 || buffers.is_empty() {
            warn!("plot_data: empty acquisition ignored");
            return;
        }
        if buffers.len() != self.channels.len() {
            warn!(
                "plot_data: expected {} buffers, got {}",
                self.channels.len(),
                buffers.len()
            );
            return;
        }
        if let Some(short) = buffers.iter().position(|b| b.as_ref().len() < half) {
            warn!("plot_data: buffer {short} holds fewer than {half} points");
            return;
        }

        let mut sample_rate_changed = false;
        if let Some(rate) = self.pending_sample_rate.take() {
            if rate != self.sample_rate {
                self.apply_sample_rate(rate);
                sample_rate_changed = true;
            }
        }

        let mag_type_changed = self.preset_magnitude_type != self.magnitude_type;
        self.magnitude_type = self.preset_magnitude_type;

        let num_points_changed = half != self.num_points || !self.acquired;
        if num_points_changed {
            self.resize(half);
        }

        for (channel, buffer) in self.channels.iter_mut().zip(buffers) {
            channel.original.copy_from_slice(&buffer.as_ref()[..half]);
        }

        if mag_type_changed {
            self.reset_average_history();
        }
        self.average_and_convert();
        self.axis.regenerate(0.0, self.sample_rate / 2.0, self.num_points);

        if num_points_changed {
            for channel in &mut self.channels {
                channel.trace.markers.rebin_after_resize(&self.axis);
            }
        }
        if sample_rate_changed {
            for channel in &mut self.channels {
                channel.trace.markers.rebin_after_sample_rate(&self.axis);
            }
        }

        self.acquired = true;
        self.detect_markers();
        self.sink.emit(PlotEvent::NewData);
    }

    /// Re-runs averaging, conversion and marker detection on the last
    /// acquisition. Does nothing before the first acquisition.
    pub fn recalculate_magnitudes(&mut self) {
        if !self.acquired {
            return;
        }
        if self.preset_magnitude_type != self.magnitude_type {
            self.magnitude_type = self.preset_magnitude_type;
            self.reset_average_history();
        }
        self.average_and_convert();
        self.detect_markers();
        self.sink.emit(PlotEvent::NewData);
    }

    fn resize(&mut self, num_points: usize) {
        debug!("spectrum size {} -> {num_points}", self.num_points);
        self.num_points = num_points;
        for (idx, channel) in self.channels.iter_mut().enumerate() {
            channel.original = vec![0.0; num_points];
            channel.magnitudes = vec![0.0; num_points];
            let rebuild = channel
                .engine
                .as_ref()
                .is_some_and(|engine| engine.data_width() != num_points);
            if rebuild {
                channel.engine = policy_for(channel.average_type, channel.history_enabled)
                    .map(|policy| SpectrumAverage::new(policy, num_points, channel.history));
                channel.avg_index = 0;
                self.sink.emit(PlotEvent::CurrentAverageIndex {
                    channel: idx,
                    index: 0,
                });
            }
        }
        self.density.reset();
        self.sink.emit(PlotEvent::SampleCountUpdated(num_points));
        debug_assert!(self.channels.iter().all(|c| {
            c.original.len() == num_points
                && c.magnitudes.len() == num_points
                && c.engine.as_ref().map_or(true, |e| e.data_width() == num_points.max(1))
        }));
    }

    fn average_and_convert(&mut self) {
        let kind = self.magnitude_type;
        let sample_rate = self.sample_rate;
        for (idx, channel) in self.channels.iter_mut().enumerate() {
            channel.avg_index += 1;
            let history = channel.engine.as_ref().map_or(0, |e| e.history());
            if history > 0 {
                channel.avg_index %= history;
            }
            self.sink.emit(PlotEvent::CurrentAverageIndex {
                channel: idx,
                index: channel.avg_index,
            });

            let in_db = channel.average_type.averages_in_db();
            let averaged = match channel.engine.as_mut() {
                Some(engine) if !in_db => {
                    engine.push_new_data(&channel.original);
                    engine.get_average(&mut channel.magnitudes);
                    true
                }
                _ => false,
            };
            let source = if averaged {
                &channel.magnitudes
            } else {
                &channel.original
            };
            let mut converted = vec![0.0; source.len()];
            convert_buffer(kind, source, &mut converted, channel.scale_factor);

            if kind == MagnitudeType::VRootHz {
                if let Some(density) = self.density.accumulate(idx, &converted, sample_rate) {
                    channel.magnitudes.copy_from_slice(&density);
                }
            } else {
                channel.magnitudes.copy_from_slice(&converted);
            }

            if in_db {
                if let Some(engine) = channel.engine.as_mut() {
                    engine.push_new_data(&channel.magnitudes);
                    engine.get_average(&mut channel.magnitudes);
                }
            }
        }
        self.density.finish_buffer();
    }

    fn scan_window(&self) -> Option<ScanWindow> {
        match (self.visible_peak_search, self.sweep) {
            (true, Some((start, stop))) => Some(ScanWindow {
                sweep_start: start,
                sweep_stop: stop,
                stop_frequency: self.axis.stop(),
            }),
            _ => None,
        }
    }

    /// Refreshes fixed markers and peaks of every trace.
    fn detect_markers(&mut self) {
        let window = self.scan_window();
        let lower_bound = self.y_axis_bounds.1;
        for channel in &mut self.channels {
            let data = TraceData {
                axis: &self.axis,
                y: &channel.magnitudes,
                lower_bound,
            };
            channel.trace.markers.calculate_fixed(&data);
            channel
                .trace
                .peaks
                .find_peaks(self.axis.points(), &channel.magnitudes, window);
        }
        for reference in &mut self.references {
            let data = TraceData {
                axis: &reference.axis,
                y: &reference.y,
                lower_bound,
            };
            reference.trace.markers.calculate_fixed(&data);
            reference
                .trace
                .peaks
                .find_peaks(reference.axis.points(), &reference.y, None);
        }
        if self.any_marker_enabled() {
            for _ in 0..self.trace_count() {
                self.sink.emit(PlotEvent::NewMarkerData);
            }
        }
    }

    fn notify_markers(&mut self) {
        if self.any_marker_enabled() {
            self.sink.emit(PlotEvent::NewMarkerData);
        }
    }

    /// True when at least one marker of any trace is enabled.
    pub fn any_marker_enabled(&self) -> bool {
        self.channels
            .iter()
            .map(|c| &c.trace)
            .chain(self.references.iter().map(|r| &r.trace))
            .any(|t| t.markers.any_enabled())
    }

    /// Applies a new sample rate right away.
    pub fn set_sample_rate(&mut self, rate: f64) {
        if rate.is_nan() || rate <= 0.0 {
            warn!("set_sample_rate: ignoring invalid rate {rate}");
            return;
        }
        self.pending_sample_rate = None;
        if rate == self.sample_rate {
            return;
        }
        self.apply_sample_rate(rate);
        for channel in &mut self.channels {
            channel.trace.markers.rebin_after_sample_rate(&self.axis);
        }
    }

    /// Queues a sample rate for the next acquisition.
    pub fn preset_sample_rate(&mut self, rate: f64) {
        if rate.is_nan() || rate <= 0.0 {
            warn!("preset_sample_rate: ignoring invalid rate {rate}");
            return;
        }
        self.pending_sample_rate = Some(rate);
    }

    fn apply_sample_rate(&mut self, rate: f64) {
        debug!("sample rate {} -> {rate}", self.sample_rate);
        self.sample_rate = rate;
        self.axis.regenerate(0.0, rate / 2.0, self.num_points);
        self.sink.emit(PlotEvent::SampleRateUpdated(rate));
    }

    /// Sweep window used to center new markers and, when enabled, to limit the peak search.
    pub fn set_start_stop(&mut self, start: f64, stop: f64) {
        self.sweep = Some((start, stop));
    }

    pub fn set_visible_peak_search(&mut self, enabled: bool) {
        self.visible_peak_search = enabled;
    }

    pub fn set_amplitude(&mut self, top: f64, bottom: f64) {
        self.y_axis_bounds = (top, bottom);
    }

    pub fn y_axis_bounds(&self) -> (f64, f64) {
        self.y_axis_bounds
    }

    /// Takes effect on the next acquisition or recalculation.
    pub fn set_magnitude_type(&mut self, kind: MagnitudeType) {
        self.preset_magnitude_type = kind;
        self.density.reset();
    }

    pub fn magnitude_type(&self) -> MagnitudeType {
        self.preset_magnitude_type
    }

    pub fn set_nb_overlapping_averages(&mut self, count: usize) {
        self.density.set_overlap(count);
    }

    pub fn set_window_coefficient_sum(&mut self, ch: usize, sum: f64, sum_sqr: f64) {
        if !self.density.set_window_sums(ch, WindowSums { sum, sum_sqr }) {
            warn!("set_window_coefficient_sum: invalid channel index {ch}");
        }
    }

    fn live_mut(&mut self, ch: usize, op: &str) -> Option<&mut LiveChannel> {
        let channel = self.channels.get_mut(ch);
        if channel.is_none() {
            warn!("{op}: invalid channel index {ch}");
        }
        channel
    }

    pub fn set_scale_factor(&mut self, ch: usize, factor: f64) {
        if let Some(channel) = self.live_mut(ch, "set_scale_factor") {
            channel.scale_factor = factor;
        }
    }

    pub fn scale_factor(&self, ch: usize) -> f64 {
        self.channels.get(ch).map_or(0.0, |c| c.scale_factor)
    }

    /// Selects the averaging of a channel. A history change alone keeps the
    /// accumulated data; anything else restarts the average.
    pub fn set_average(
        &mut self,
        ch: usize,
        average: AverageType,
        history: usize,
        history_enabled: bool,
    ) {
        let num_points = self.num_points;
        let Some(channel) = self.live_mut(ch, "set_average") else {
            return;
        };
        let history_only = channel.average_type == average
            && channel.history_enabled == history_enabled
            && channel
                .engine
                .as_ref()
                .is_some_and(|engine| engine.history() != history.max(1));
        channel.history = history;
        if history_only {
            if let Some(engine) = channel.engine.as_mut() {
                engine.set_history(history);
            }
            return;
        }
        channel.average_type = average;
        channel.history_enabled = history_enabled;
        channel.engine = policy_for(average, history_enabled)
            .map(|policy| SpectrumAverage::new(policy, num_points, history));
        channel.avg_index = 0;
        self.sink.emit(PlotEvent::CurrentAverageIndex {
            channel: ch,
            index: 0,
        });
    }

    pub fn average_type(&self, ch: usize) -> AverageType {
        self.channels.get(ch).map_or(AverageType::Sample, |c| c.average_type)
    }

    pub fn average_history(&self, ch: usize) -> usize {
        self.channels.get(ch).map_or(0, |c| c.history)
    }

    pub fn current_average_index(&self, ch: usize) -> usize {
        self.channels.get(ch).map_or(0, |c| c.avg_index)
    }

    /// Forgets the averaged history of every channel.
    pub fn reset_average_history(&mut self) {
        debug!("resetting average history");
        for (idx, channel) in self.channels.iter_mut().enumerate() {
            if let Some(engine) = channel.engine.as_mut() {
                engine.reset();
            }
            channel.avg_index = 0;
            self.sink.emit(PlotEvent::CurrentAverageIndex {
                channel: idx,
                index: 0,
            });
        }
    }

    fn trace(&self, ch: usize) -> Option<&Trace> {
        match self.channels.get(ch) {
            Some(channel) => Some(&channel.trace),
            None => self
                .references
                .get(ch - self.channels.len())
                .map(|r| &r.trace),
        }
    }

    /// Peak table of a trace, for callers that walk both orderings.
    pub fn peak_table(&self, ch: usize) -> Option<&PeakTable> {
        self.trace(ch).map(|t| &t.peaks)
    }

    pub fn peak_count(&self, ch: usize) -> usize {
        self.trace(ch).map_or(0, |t| t.peaks.len())
    }

    /// Replaces the peak table; markers bound to a peak keep its last value as fixed markers.
    pub fn set_peak_count(&mut self, ch: usize, count: usize) {
        let live = ch < self.channels.len();
        let window = if live { self.scan_window() } else { None };
        let (trace, x, y) = if live {
            let channel = &mut self.channels[ch];
            (
                &mut channel.trace,
                self.axis.points(),
                channel.magnitudes.as_slice(),
            )
        } else if let Some(reference) = self.references.get_mut(ch - self.channels.len()) {
            (
                &mut reference.trace,
                reference.axis.points(),
                reference.y.as_slice(),
            )
        } else {
            warn!("set_peak_count: invalid channel index {ch}");
            return;
        };
        if trace.peaks.len() == count {
            return;
        }
        trace.markers.freeze_bound(&trace.peaks);
        trace.peaks = PeakTable::with_count(count);
        if !y.is_empty() {
            trace.peaks.find_peaks(x, y, window);
        }
    }

    pub fn peaks_by_magnitude(&self, ch: usize) -> Vec<Peak> {
        match self.trace(ch) {
            Some(trace) => trace.peaks.peaks_by_magnitude(),
            None => {
                warn!("peaks_by_magnitude: invalid channel index {ch}");
                Vec::new()
            }
        }
    }

    pub fn peaks_by_frequency(&self, ch: usize) -> Vec<Peak> {
        match self.trace(ch) {
            Some(trace) => trace.peaks.peaks_by_frequency(),
            None => {
                warn!("peaks_by_frequency: invalid channel index {ch}");
                Vec::new()
            }
        }
    }

    /// The `rank`-th strongest peak of a trace.
    pub fn peak(&self, ch: usize, rank: usize) -> Option<Peak> {
        let peaks = &self.trace(ch)?.peaks;
        match peaks.id_by_magnitude(rank).and_then(|id| peaks.get(id)) {
            Some(peak) => Some(*peak),
            None => {
                warn!("peak: invalid peak index {rank} on channel {ch}");
                None
            }
        }
    }

    /// Trace and readable data of a valid `(ch, mk)` pair.
    fn marker_target(
        &mut self,
        ch: usize,
        mk: usize,
        op: &str,
    ) -> Option<(&mut Trace, TraceData<'_>)> {
        let lower_bound = self.y_axis_bounds.1;
        let (trace, axis, y) = if ch < self.channels.len() {
            let channel = &mut self.channels[ch];
            (
                &mut channel.trace,
                &self.axis,
                channel.magnitudes.as_slice(),
            )
        } else if let Some(reference) = self.references.get_mut(ch - self.channels.len()) {
            (
                &mut reference.trace,
                &reference.axis,
                reference.y.as_slice(),
            )
        } else {
            warn!("{op}: invalid channel index {ch}");
            return None;
        };
        if mk >= trace.markers.len() {
            warn!("{op}: invalid marker index {mk} on channel {ch}");
            return None;
        }
        Some((
            trace,
            TraceData {
                axis,
                y,
                lower_bound,
            },
        ))
    }

    /// Recreates every marker of a trace when the count changes.
    pub fn set_marker_count(&mut self, ch: usize, count: usize) {
        let trace = if ch < self.channels.len() {
            &mut self.channels[ch].trace
        } else if let Some(reference) = self.references.get_mut(ch - self.channels.len()) {
            &mut reference.trace
        } else {
            warn!("set_marker_count: invalid channel index {ch}");
            return;
        };
        if trace.markers.len() != count {
            trace.markers.recreate(count);
        }
    }

    pub fn marker_count(&self, ch: usize) -> usize {
        self.trace(ch).map_or(0, |t| t.markers.len())
    }

    /// Enabling places the marker at the center of the current view.
    pub fn set_marker_enabled(&mut self, ch: usize, mk: usize, enabled: bool) {
        let view_center = if ch < self.channels.len() {
            self.sweep.map(|(start, stop)| (start + stop) / 2.0)
        } else {
            None
        };
        let Some((trace, data)) = self.marker_target(ch, mk, "set_marker_enabled") else {
            return;
        };
        let is_enabled = trace.markers.get(mk).is_some_and(|m| m.is_enabled());
        if enabled && !is_enabled {
            let center = view_center.unwrap_or_else(|| data.axis.center());
            trace.markers.enable(mk, center, &data);
        } else if !enabled && is_enabled {
            trace.markers.disable(mk);
        }
    }

    pub fn marker_enabled(&self, ch: usize, mk: usize) -> bool {
        self.trace(ch)
            .and_then(|t| t.markers.get(mk))
            .is_some_and(|m| m.is_enabled())
    }

    pub fn set_marker_visible(&mut self, ch: usize, mk: usize, visible: bool) {
        if let Some((trace, _)) = self.marker_target(ch, mk, "set_marker_visible") {
            trace.markers.set_visible(mk, visible);
        }
    }

    pub fn marker_visible(&self, ch: usize, mk: usize) -> bool {
        self.trace(ch)
            .and_then(|t| t.markers.get(mk))
            .is_some_and(|m| m.is_visible())
    }

    /// Selects one marker plot-wide.
    pub fn select_marker(&mut self, ch: usize, mk: usize) {
        if self.marker_target(ch, mk, "select_marker").is_none() {
            return;
        }
        for channel in &mut self.channels {
            channel.trace.markers.clear_selection();
        }
        for reference in &mut self.references {
            reference.trace.markers.clear_selection();
        }
        if let Some((trace, _)) = self.marker_target(ch, mk, "select_marker") {
            trace.markers.set_selected(mk, true);
        }
        self.sink.emit(PlotEvent::MarkerSelected {
            channel: ch,
            marker: mk,
        });
    }

    pub fn marker_selected(&self, ch: usize, mk: usize) -> bool {
        self.trace(ch)
            .and_then(|t| t.markers.get(mk))
            .is_some_and(|m| m.is_selected())
    }

    pub fn marker_type(&self, ch: usize, mk: usize) -> Option<MarkerKind> {
        self.marker_reading(ch, mk).map(|r| r.kind)
    }

    /// Current position and value of an enabled marker.
    pub fn marker_reading(&self, ch: usize, mk: usize) -> Option<MarkerReading> {
        let Some(trace) = self.trace(ch) else {
            warn!("marker_reading: invalid channel index {ch}");
            return None;
        };
        trace.markers.reading(mk, &trace.peaks)
    }

    pub fn marker_frequency(&self, ch: usize, mk: usize) -> f64 {
        self.marker_reading(ch, mk).map_or(0.0, |r| r.x)
    }

    pub fn marker_magnitude(&self, ch: usize, mk: usize) -> f64 {
        self.marker_reading(ch, mk).map_or(0.0, |r| r.y)
    }

    /// `(x, y)` of the markers the UI should draw.
    pub fn marker_positions(&self, ch: usize) -> Vec<(f64, f64)> {
        let Some(trace) = self.trace(ch) else {
            warn!("marker_positions: invalid channel index {ch}");
            return Vec::new();
        };
        (0..trace.markers.len())
            .filter_map(|mk| trace.markers.reading(mk, &trace.peaks))
            .filter(|r| r.update_ui)
            .map(|r| (r.x, r.y))
            .collect()
    }

    /// Moves a marker to the bin nearest `freq`, turning it into a fixed marker.
    pub fn set_marker_at_freq(&mut self, ch: usize, mk: usize, freq: f64) {
        let Some((trace, data)) = self.marker_target(ch, mk, "set_marker_at_freq") else {
            return;
        };
        let bin = data.axis.clamp_bin(data.axis.pos_at_frequency(freq));
        trace.markers.set_fixed(mk, bin, &data);
        self.notify_markers();
    }

    /// Moves a marker while the UI drags it; the UI stops redrawing it until released.
    pub fn drag_marker(&mut self, ch: usize, mk: usize, freq: f64) {
        let Some((trace, data)) = self.marker_target(ch, mk, "drag_marker") else {
            return;
        };
        let pos = data.axis.pos_at_frequency(freq);
        if pos < 0 {
            warn!("drag_marker: frequency {freq} lies before the first bin");
            return;
        }
        let bin = data.axis.clamp_bin(pos);
        trace.markers.drag(mk, bin, &data);
        self.notify_markers();
    }

    pub fn release_marker(&mut self, ch: usize, mk: usize) {
        if let Some((trace, _)) = self.marker_target(ch, mk, "release_marker") {
            trace.markers.release(mk);
        }
    }

    /// Binds a marker to the `rank`-th strongest peak.
    pub fn marker_to_peak(&mut self, ch: usize, mk: usize, rank: usize) {
        let Some((trace, _)) = self.marker_target(ch, mk, "marker_to_peak") else {
            return;
        };
        let Some(id) = trace.peaks.id_by_magnitude(rank) else {
            warn!("marker_to_peak: invalid peak index {rank} on channel {ch}");
            return;
        };
        trace.markers.bind(mk, id);
        self.notify_markers();
    }

    pub fn marker_to_max_peak(&mut self, ch: usize, mk: usize) {
        self.marker_to_peak(ch, mk, 0);
    }

    pub fn marker_to_next_higher_freq_peak(&mut self, ch: usize, mk: usize) {
        self.step_marker(ch, mk, PeakStep::HigherFrequency);
    }

    pub fn marker_to_next_lower_freq_peak(&mut self, ch: usize, mk: usize) {
        self.step_marker(ch, mk, PeakStep::LowerFrequency);
    }

    pub fn marker_to_next_higher_mag_peak(&mut self, ch: usize, mk: usize) {
        self.step_marker(ch, mk, PeakStep::HigherMagnitude);
    }

    pub fn marker_to_next_lower_mag_peak(&mut self, ch: usize, mk: usize) {
        self.step_marker(ch, mk, PeakStep::LowerMagnitude);
    }

    fn step_marker(&mut self, ch: usize, mk: usize, step: PeakStep) {
        let Some((trace, _)) = self.marker_target(ch, mk, "step_marker") else {
            return;
        };
        if let Some(id) = trace.markers.neighbour_peak(mk, &trace.peaks, step) {
            trace.markers.bind(mk, id);
            self.notify_markers();
        }
    }

    /// Adds a stored trace after the live channels and returns its channel index.
    pub fn register_reference(&mut self, name: &str, x: Vec<f64>, y: Vec<f64>) -> Option<usize> {
        if x.is_empty() || x.len() != y.len() {
            warn!(
                "register_reference: {name} has {} frequencies and {} values",
                x.len(),
                y.len()
            );
            return None;
        }
        if self.references.iter().any(|r| r.name == name) {
            warn!("register_reference: {name} is already registered");
            return None;
        }
        let mut trace = Trace {
            peaks: PeakTable::with_count(REFERENCE_PEAKS),
            markers: MarkerSet::default(),
        };
        trace.markers.recreate(REFERENCE_MARKERS);
        for mk in 0..REFERENCE_MARKERS {
            trace.markers.disable(mk);
        }
        trace.peaks.find_peaks(&x, &y, None);
        self.references.push(ReferenceTrace {
            name: name.to_owned(),
            axis: FrequencyAxis::from_points(x),
            y,
            trace,
        });
        let index = self.trace_count() - 1;
        debug!("reference {name} registered as channel {index}");
        self.sink.emit(PlotEvent::ChannelAdded(index));
        Some(index)
    }

    /// Removes a reference trace; returns whether it existed.
    pub fn unregister_reference(&mut self, name: &str) -> bool {
        let before = self.references.len();
        self.references.retain(|r| r.name != name);
        before != self.references.len()
    }

    pub fn reference_index(&self, name: &str) -> Option<usize> {
        self.references
            .iter()
            .position(|r| r.name == name)
            .map(|i| i + self.channels.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::events::RecordingSink;

    const E2E_CH0: [f64; 8] = [0.0, 0.0, 0.0, 100.0, 400.0, 100.0, 0.0, 0.0];

    fn raw(half: &[f64]) -> Vec<f64> {
        let mut data = half.to_vec();
        data.resize(half.len() * 2, 0.0);
        data
    }

    fn plot(channels: usize) -> FftDisplayPlot<RecordingSink> {
        let mut plot = FftDisplayPlot::new(channels, RecordingSink::default());
        plot.set_sample_rate(1000.0);
        plot.sink_mut().take();
        plot
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn end_to_end_two_channels() {
        let mut plot = plot(2);
        plot.set_marker_count(0, 1);
        plot.plot_data(&[raw(&E2E_CH0), raw(&[0.0; 8])], 16);

        assert_eq!(plot.num_points(), 8);
        assert_eq!(plot.x_axis()[4], 250.0);
        let peak = plot.peak(0, 0).unwrap();
        assert_eq!(peak.bin, 4);
        let expected = 10.0 * ((400.0_f64 / (2048.0 * 2048.0)) / (8.0 * 8.0)).log10();
        assert!(close(peak.y, expected));
        assert!(close(plot.magnitudes(0)[4], expected));

        plot.set_marker_enabled(0, 0, false);
        plot.set_marker_enabled(0, 0, true);
        let reading = plot.marker_reading(0, 0).unwrap();
        assert_eq!(reading.kind, MarkerKind::Fixed);
        assert_eq!(reading.x, 250.0);
        assert!(close(reading.y, expected));

        let events = &plot.sink().events;
        assert_eq!(events[0], PlotEvent::SampleCountUpdated(8));
        assert_eq!(plot.sink().count(&PlotEvent::NewMarkerData), 2);
        assert_eq!(events.last(), Some(&PlotEvent::NewData));
    }

    #[test]
    fn sample_averaging_leaves_data_untouched() {
        let mut plot = plot(1);
        plot.set_magnitude_type(MagnitudeType::Vpeak);
        let half = [4.0, 9.0, 16.0, 25.0];
        plot.plot_data(&[raw(&half)], 8);
        assert_eq!(plot.original_data(0), &half);
        let mut expected = [0.0; 4];
        convert_buffer(MagnitudeType::Vpeak, &half, &mut expected, 1.0);
        assert_eq!(plot.magnitudes(0), &expected);
    }

    #[test]
    fn malformed_acquisitions_are_ignored() {
        let mut plot = plot(2);
        plot.preset_sample_rate(2000.0);
        plot.plot_data::<Vec<f64>>(&[], 16);
        plot.plot_data(&[raw(&E2E_CH0)], 16);
        plot.plot_data(&[raw(&E2E_CH0), vec![0.0; 3]], 16);
        plot.plot_data(&[raw(&E2E_CH0), raw(&E2E_CH0)], 1);
        assert!(!plot.has_acquisition());
        assert!(plot.sink().events.is_empty());
        assert_eq!(plot.sample_rate(), 1000.0);
    }

    #[test]
    fn resize_keeps_fixed_marker_frequency() {
        let mut plot = plot(1);
        plot.set_marker_count(0, 1);
        plot.plot_data(&[raw(&[1.0; 8])], 16);
        plot.set_marker_at_freq(0, 0, 190.0);
        assert_eq!(plot.marker_frequency(0, 0), 187.5);

        plot.plot_data(&[raw(&[1.0; 16])], 32);
        let reading = plot.marker_reading(0, 0).unwrap();
        assert_eq!(reading.bin, 6);
        assert!((reading.x - 190.0).abs() <= 31.25);
        assert_eq!(plot.sink().count(&PlotEvent::SampleCountUpdated(16)), 1);
    }

    #[test]
    fn peak_bound_marker_follows_new_acquisitions() {
        let mut plot = plot(1);
        plot.set_magnitude_type(MagnitudeType::Vpeak);
        plot.set_marker_count(0, 1);
        plot.plot_data(&[raw(&E2E_CH0)], 16);
        plot.marker_to_max_peak(0, 0);
        assert_eq!(plot.marker_type(0, 0), Some(MarkerKind::Peak));
        assert_eq!(plot.marker_frequency(0, 0), 250.0);

        plot.plot_data(&[raw(&[0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 64.0, 0.0])], 16);
        let reading = plot.marker_reading(0, 0).unwrap();
        assert_eq!(reading.kind, MarkerKind::Peak);
        assert_eq!(reading.x, 375.0);
        assert!(close(reading.y, 1.0));
    }

    #[test]
    fn peak_views_share_records() {
        let mut plot = plot(1);
        plot.set_peak_count(0, 3);
        plot.set_magnitude_type(MagnitudeType::Vpeak);
        plot.plot_data(&[raw(&[0.0, 0.0, 0.0, 25.0, 1.0, 81.0, 4.0, 49.0, 0.0, 0.0])], 20);
        let table = plot.peak_table(0).unwrap();
        let mut by_mag = table.by_magnitude();
        let mut by_freq = table.by_frequency().to_vec();
        assert_ne!(by_mag, by_freq);
        by_mag.sort_by_key(|id| id.index());
        by_freq.sort_by_key(|id| id.index());
        assert_eq!(by_mag, by_freq);
        let freqs: Vec<f64> = plot.peaks_by_frequency(0).iter().map(|p| p.x).collect();
        assert!(freqs.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn db_averaging_order_changes_the_result() {
        let mut plot = plot(2);
        plot.set_average(0, AverageType::LinearRms, 2, true);
        plot.set_average(1, AverageType::LinearDb, 2, true);
        let first = raw(&[10.0, 200.0, 30.0, 4000.0]);
        let second = raw(&[1000.0, 2.0, 300.0, 40.0]);
        plot.plot_data(&[first.clone(), first], 8);
        plot.plot_data(&[second.clone(), second], 8);
        let rms = plot.magnitudes(0);
        let db = plot.magnitudes(1);
        assert!(rms.iter().zip(db).any(|(a, b)| (a - b).abs() > 1e-6));
    }

    #[test]
    fn average_index_wraps_and_survives_history_change() {
        let mut plot = plot(1);
        plot.set_average(0, AverageType::LinearRms, 3, true);
        let frame = [raw(&[1.0; 4])];
        let mut seen = Vec::new();
        for _ in 0..4 {
            plot.plot_data(&frame, 8);
            seen.push(plot.current_average_index(0));
        }
        assert_eq!(seen, vec![1, 2, 0, 1]);

        plot.set_average(0, AverageType::LinearRms, 4, true);
        assert_eq!(plot.current_average_index(0), 1);
        assert_eq!(plot.average_history(0), 4);

        plot.set_average(0, AverageType::PeakHold, 4, true);
        assert_eq!(plot.current_average_index(0), 0);
        assert_eq!(
            plot.sink().events.last(),
            Some(&PlotEvent::CurrentAverageIndex { channel: 0, index: 0 })
        );
    }

    #[test]
    fn magnitude_change_restarts_averaging() {
        let mut plot = plot(1);
        plot.set_magnitude_type(MagnitudeType::Vpeak);
        plot.set_average(0, AverageType::PeakHoldContinuous, 1, true);
        plot.plot_data(&[raw(&[1600.0; 4])], 8);
        plot.plot_data(&[raw(&[16.0; 4])], 8);
        assert!(close(plot.magnitudes(0)[0], 10.0));

        plot.set_magnitude_type(MagnitudeType::Vrms);
        plot.plot_data(&[raw(&[16.0; 4])], 8);
        assert!(close(plot.magnitudes(0)[0], 1.0 / 2f64.sqrt()));
    }

    #[test]
    fn reapplying_the_same_averaging_restarts_it() {
        let mut plot = plot(1);
        plot.set_magnitude_type(MagnitudeType::Vpeak);
        plot.set_average(0, AverageType::PeakHoldContinuous, 1, true);
        plot.plot_data(&[raw(&[1600.0; 4])], 8);
        plot.plot_data(&[raw(&[16.0; 4])], 8);
        assert!(close(plot.magnitudes(0)[0], 10.0));

        plot.set_average(0, AverageType::PeakHoldContinuous, 1, true);
        assert_eq!(
            plot.sink().events.last(),
            Some(&PlotEvent::CurrentAverageIndex { channel: 0, index: 0 })
        );
        plot.plot_data(&[raw(&[16.0; 4])], 8);
        assert!(close(plot.magnitudes(0)[0], 1.0));
    }

    #[test]
    fn exponential_db_averages_after_conversion() {
        let mut plot = plot(3);
        plot.set_average(0, AverageType::ExponentialRms, 2, true);
        plot.set_average(1, AverageType::ExponentialDb, 2, true);
        plot.set_average(2, AverageType::LinearRms, 2, true);
        let first = raw(&[10.0, 200.0, 30.0, 4000.0]);
        let second = raw(&[1000.0, 2.0, 300.0, 40.0]);
        plot.plot_data(&[first.clone(), first.clone(), first], 8);
        plot.plot_data(&[second.clone(), second.clone(), second], 8);

        // dB of the power mean: 10 * log10(505 / 2048^2 / 16)
        let rms_first = 10.0 * ((505.0_f64 / (2048.0 * 2048.0)) / 16.0).log10();
        // mean of the dB values is the dB of the geometric mean, 100
        let db_first = 10.0 * ((100.0_f64 / (2048.0 * 2048.0)) / 16.0).log10();
        assert!(close(plot.magnitudes(0)[0], rms_first));
        assert!(close(plot.magnitudes(1)[0], db_first));
        let db = plot.magnitudes(1);
        for other in [plot.magnitudes(0), plot.magnitudes(2)] {
            assert!(other.iter().zip(db).all(|(a, b)| (a - b).abs() > 1e-6));
        }
    }

    #[test]
    fn average_index_wraps_on_the_engine_history() {
        let mut plot = plot(1);
        plot.set_average(0, AverageType::LinearRms, 0, true);
        let frame = [raw(&[1.0; 4])];
        for _ in 0..3 {
            plot.plot_data(&frame, 8);
            assert_eq!(plot.current_average_index(0), 0);
        }
    }

    #[test]
    fn marker_enabled_before_data_lands_on_view_center() {
        let mut plot = plot(1);
        plot.set_marker_count(0, 1);
        plot.set_marker_enabled(0, 0, false);
        plot.set_marker_enabled(0, 0, true);
        let reading = plot.marker_reading(0, 0).unwrap();
        assert_eq!(reading.x, 250.0);
        assert_eq!(reading.y, plot.y_axis_bounds().1);

        plot.plot_data(&[raw(&E2E_CH0)], 16);
        let reading = plot.marker_reading(0, 0).unwrap();
        assert_eq!(reading.bin, 4);
        assert_eq!(reading.x, 250.0);
        let expected = 10.0 * ((400.0_f64 / (2048.0 * 2048.0)) / (8.0 * 8.0)).log10();
        assert!(close(reading.y, expected));
    }

    #[test]
    fn recalculate_waits_for_first_acquisition() {
        let mut plot = plot(1);
        plot.recalculate_magnitudes();
        assert!(plot.sink().events.is_empty());

        plot.set_magnitude_type(MagnitudeType::Vpeak);
        plot.plot_data(&[raw(&[64.0; 4])], 8);
        plot.set_magnitude_type(MagnitudeType::Vrms);
        plot.sink_mut().take();
        plot.recalculate_magnitudes();
        assert!(close(plot.magnitudes(0)[0], 2.0 / 2f64.sqrt()));
        assert_eq!(plot.sink().events.last(), Some(&PlotEvent::NewData));
    }

    #[test]
    fn marker_notifications_need_an_enabled_marker() {
        let mut plot = plot(2);
        plot.set_marker_count(0, 1);
        plot.set_marker_count(1, 1);
        plot.set_marker_enabled(0, 0, false);
        plot.set_marker_enabled(1, 0, false);
        plot.plot_data(&[raw(&E2E_CH0), raw(&E2E_CH0)], 16);
        assert_eq!(plot.sink().count(&PlotEvent::NewMarkerData), 0);
        plot.marker_to_next_higher_freq_peak(0, 0);
        assert_eq!(plot.sink().count(&PlotEvent::NewMarkerData), 0);
        assert!(!plot.any_marker_enabled());

        plot.set_marker_enabled(1, 0, true);
        plot.sink_mut().take();
        plot.plot_data(&[raw(&E2E_CH0), raw(&E2E_CH0)], 16);
        assert_eq!(plot.sink().count(&PlotEvent::NewMarkerData), 2);
    }

    #[test]
    fn stepping_between_peaks() {
        let mut plot = plot(1);
        plot.set_peak_count(0, 3);
        plot.set_marker_count(0, 1);
        plot.set_magnitude_type(MagnitudeType::Vpeak);
        plot.plot_data(&[raw(&[0.0, 0.0, 0.0, 25.0, 1.0, 81.0, 4.0, 49.0, 0.0, 0.0])], 20);
        plot.set_marker_at_freq(0, 0, plot.x_axis()[4]);

        plot.marker_to_next_higher_freq_peak(0, 0);
        assert_eq!(plot.marker_reading(0, 0).unwrap().bin, 5);
        plot.marker_to_next_higher_freq_peak(0, 0);
        assert_eq!(plot.marker_reading(0, 0).unwrap().bin, 7);
        plot.marker_to_next_higher_freq_peak(0, 0);
        assert_eq!(plot.marker_reading(0, 0).unwrap().bin, 7);
        plot.marker_to_next_lower_mag_peak(0, 0);
        assert_eq!(plot.marker_reading(0, 0).unwrap().bin, 3);
        plot.marker_to_next_higher_mag_peak(0, 0);
        assert_eq!(plot.marker_reading(0, 0).unwrap().bin, 7);
    }

    #[test]
    fn peak_count_change_freezes_bound_markers() {
        let mut plot = plot(1);
        plot.set_marker_count(0, 1);
        plot.set_magnitude_type(MagnitudeType::Vpeak);
        plot.plot_data(&[raw(&E2E_CH0)], 16);
        plot.marker_to_max_peak(0, 0);
        plot.set_peak_count(0, 4);
        let reading = plot.marker_reading(0, 0).unwrap();
        assert_eq!(reading.kind, MarkerKind::Fixed);
        assert_eq!(reading.bin, 4);
        assert_eq!(plot.peak_count(0), 4);
        assert_eq!(plot.peak(0, 0).unwrap().bin, 4);
    }

    #[test]
    fn queued_sample_rate_moves_markers_inside_the_span() {
        let mut plot = plot(1);
        plot.set_marker_count(0, 1);
        plot.plot_data(&[raw(&[1.0; 8])], 16);
        plot.set_marker_at_freq(0, 0, 375.0);
        plot.preset_sample_rate(500.0);
        assert_eq!(plot.sample_rate(), 1000.0);

        plot.plot_data(&[raw(&[1.0; 8])], 16);
        assert_eq!(plot.sink().count(&PlotEvent::SampleRateUpdated(500.0)), 1);
        let reading = plot.marker_reading(0, 0).unwrap();
        assert_eq!(reading.bin, 7);
        assert_eq!(reading.x, plot.x_axis()[7]);
    }

    #[test]
    fn dragged_markers_are_hidden_until_release() {
        let mut plot = plot(1);
        plot.set_marker_count(0, 2);
        plot.plot_data(&[raw(&[1.0; 8])], 16);
        plot.drag_marker(0, 1, 125.0);
        assert_eq!(plot.marker_positions(0).len(), 1);
        plot.drag_marker(0, 1, -100.0);
        assert_eq!(plot.marker_frequency(0, 1), 125.0);
        plot.release_marker(0, 1);
        assert_eq!(plot.marker_positions(0).len(), 2);
    }

    #[test]
    fn bad_indices_return_defaults() {
        let mut plot = plot(1);
        plot.set_marker_count(0, 1);
        plot.set_marker_at_freq(0, 3, 10.0);
        plot.set_marker_at_freq(4, 0, 10.0);
        plot.marker_to_peak(0, 0, 9);
        assert!(plot.marker_reading(7, 0).is_none());
        assert!(plot.magnitudes(7).is_empty());
        assert!(plot.peaks_by_magnitude(7).is_empty());
        assert_eq!(plot.marker_frequency(0, 5), 0.0);
        assert_eq!(plot.marker_type(0, 0), Some(MarkerKind::Fixed));
    }

    #[test]
    fn select_marker_is_exclusive() {
        let mut plot = plot(2);
        plot.set_marker_count(0, 2);
        plot.set_marker_count(1, 1);
        plot.select_marker(0, 1);
        plot.select_marker(1, 0);
        assert!(!plot.marker_selected(0, 1));
        assert!(plot.marker_selected(1, 0));
        assert_eq!(
            plot.sink().events.last(),
            Some(&PlotEvent::MarkerSelected { channel: 1, marker: 0 })
        );
    }

    #[test]
    fn reference_traces_follow_live_channels() {
        let mut plot = plot(2);
        let x: Vec<f64> = (0..10).map(|i| 100.0 + i as f64 * 10.0).collect();
        let y = vec![0.0, 0.0, 0.0, 5.0, 1.0, 9.0, 2.0, 7.0, 0.0, 0.0];
        assert_eq!(plot.register_reference("ref", x, y), Some(2));
        assert_eq!(plot.sink().events, vec![PlotEvent::ChannelAdded(2)]);
        assert_eq!(plot.trace_count(), 3);
        assert_eq!(plot.marker_count(2), 5);
        assert_eq!(plot.peak_count(2), 10);
        assert!(!plot.marker_enabled(2, 0));
        assert_eq!(plot.peak(2, 0).unwrap().x, 150.0);

        // Reference bins are (last - first) / count wide.
        plot.set_marker_at_freq(2, 0, 155.0);
        assert_eq!(plot.marker_frequency(2, 0), 160.0);
        assert!(plot.register_reference("ref", vec![1.0], vec![1.0]).is_none());

        assert!(plot.unregister_reference("ref"));
        assert!(!plot.unregister_reference("ref"));
        assert_eq!(plot.trace_count(), 2);
    }

    #[test]
    fn spectral_density_publishes_after_overlap_group() {
        let mut plot = plot(1);
        plot.set_magnitude_type(MagnitudeType::VRootHz);
        plot.set_nb_overlapping_averages(2);
        let frame = [raw(&[64.0; 4])];
        plot.plot_data(&frame, 8);
        assert_eq!(plot.magnitudes(0), &[0.0; 4]);
        plot.plot_data(&frame, 8);
        let expected = 2f64.sqrt() / 1000f64.sqrt();
        assert!(plot.magnitudes(0).iter().all(|v| close(*v, expected)));
    }

    #[test]
    fn builds_from_config() {
        let config = PlotConfig::from_json_str(
            r#"{
                "channels": 1,
                "sample_rate_hz": 2000.0,
                "magnitude_type": "DBV",
                "channel_settings": [
                    { "average_type": "EXPONENTIAL_DB", "history": 8, "peak_count": 2, "marker_count": 3 }
                ]
            }"#,
        )
        .unwrap();
        let plot = FftDisplayPlot::from_config(&config, ()).unwrap();
        assert_eq!(plot.sample_rate(), 2000.0);
        assert_eq!(plot.magnitude_type(), MagnitudeType::Dbv);
        assert_eq!(plot.average_type(0), AverageType::ExponentialDb);
        assert_eq!(plot.average_history(0), 8);
        assert_eq!(plot.peak_count(0), 2);
        assert_eq!(plot.marker_count(0), 3);
    }
}
