use crate::display::axis::FrequencyAxis;
use crate::display::peaks::{PeakId, PeakTable};
use crate::types::MarkerKind;

/// Position and value of a fixed marker.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MarkerData {
    pub x: f64,
    pub y: f64,
    pub bin: usize,
    /// Cleared while the UI is dragging the marker.
    pub update_ui: bool,
}

impl Default for MarkerData {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            bin: 0,
            update_ui: true,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum MarkerSource {
    Fixed(MarkerData),
    Peak(PeakId),
}

/// Current reading of an enabled marker.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MarkerReading {
    pub kind: MarkerKind,
    pub x: f64,
    pub y: f64,
    pub bin: usize,
    pub update_ui: bool,
}

/// Direction used when hopping a marker to a neighbouring peak.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PeakStep {
    HigherFrequency,
    LowerFrequency,
    HigherMagnitude,
    LowerMagnitude,
}

/// The data a marker reads its value from.
#[derive(Clone, Copy, Debug)]
pub struct TraceData<'a> {
    pub axis: &'a FrequencyAxis,
    /// Magnitudes, empty until the first acquisition.
    pub y: &'a [f64],
    /// Value used when no magnitude is available yet.
    pub lower_bound: f64,
}

impl TraceData<'_> {
    fn fixed_at(&self, bin: usize, update_ui: bool) -> MarkerData {
        MarkerData {
            x: self.axis.x(bin),
            y: self.y.get(bin).copied().unwrap_or(self.lower_bound),
            bin,
            update_ui,
        }
    }

    /// Fixed record nearest to `freq`. With no bins yet the frequency itself
    /// is kept, so the first resize lands the marker on the matching bin.
    fn fixed_at_frequency(&self, freq: f64, update_ui: bool) -> MarkerData {
        if self.axis.is_empty() {
            return MarkerData {
                x: freq,
                y: self.lower_bound,
                bin: 0,
                update_ui,
            };
        }
        let bin = self.axis.clamp_bin(self.axis.pos_at_frequency(freq));
        self.fixed_at(bin, update_ui)
    }
}

#[derive(Clone, Debug)]
pub struct Marker {
    label: String,
    source: Option<MarkerSource>,
    visible: bool,
    selected: bool,
}

impl Marker {
    fn new(index: usize) -> Self {
        Self {
            label: format!("M{}", index + 1),
            source: Some(MarkerSource::Fixed(MarkerData::default())),
            visible: true,
            selected: false,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_enabled(&self) -> bool {
        self.source.is_some()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn peak(&self) -> Option<PeakId> {
        match self.source {
            Some(MarkerSource::Peak(id)) => Some(id),
            _ => None,
        }
    }

    fn reading(&self, peaks: &PeakTable) -> Option<MarkerReading> {
        match self.source? {
            MarkerSource::Fixed(data) => Some(MarkerReading {
                kind: MarkerKind::Fixed,
                x: data.x,
                y: data.y,
                bin: data.bin,
                update_ui: data.update_ui,
            }),
            MarkerSource::Peak(id) => peaks.get(id).map(|peak| MarkerReading {
                kind: MarkerKind::Peak,
                x: peak.x,
                y: peak.y,
                bin: peak.bin,
                update_ui: true,
            }),
        }
    }

    fn fixed_mut(&mut self) -> Option<&mut MarkerData> {
        match &mut self.source {
            Some(MarkerSource::Fixed(data)) => Some(data),
            _ => None,
        }
    }
}

/// Markers of one channel. Indices are validated by the caller.
#[derive(Clone, Debug, Default)]
pub struct MarkerSet {
    markers: Vec<Marker>,
}

impl MarkerSet {
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&Marker> {
        self.markers.get(idx)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Marker> {
        self.markers.iter()
    }

    /// Destroys every marker and creates `count` fresh fixed markers at bin 0.
    pub fn recreate(&mut self, count: usize) {
        self.markers = (0..count).map(Marker::new).collect();
    }

    pub fn any_enabled(&self) -> bool {
        self.markers.iter().any(Marker::is_enabled)
    }

    pub fn reading(&self, idx: usize, peaks: &PeakTable) -> Option<MarkerReading> {
        self.markers.get(idx)?.reading(peaks)
    }

    /// Enables a marker as a fixed marker at the bin nearest to `freq`.
    pub fn enable(&mut self, idx: usize, freq: f64, trace: &TraceData<'_>) {
        let marker = &mut self.markers[idx];
        marker.source = Some(MarkerSource::Fixed(trace.fixed_at_frequency(freq, true)));
        marker.visible = true;
    }

    pub fn disable(&mut self, idx: usize) {
        let marker = &mut self.markers[idx];
        marker.source = None;
        marker.visible = false;
    }

    /// Moves a marker to `bin`. A fixed marker is updated in place; any other
    /// marker gets a new fixed record, in which case `true` is returned.
    pub fn set_fixed(&mut self, idx: usize, bin: usize, trace: &TraceData<'_>) -> bool {
        let marker = &mut self.markers[idx];
        if let Some(data) = marker.fixed_mut() {
            let update_ui = data.update_ui;
            *data = trace.fixed_at(bin, update_ui);
            return false;
        }
        marker.source = Some(MarkerSource::Fixed(trace.fixed_at(bin, true)));
        true
    }

    /// Replaces the marker's record with a fixed one that the UI does not
    /// redraw until [`MarkerSet::release`].
    pub fn drag(&mut self, idx: usize, bin: usize, trace: &TraceData<'_>) {
        self.markers[idx].source = Some(MarkerSource::Fixed(trace.fixed_at(bin, false)));
    }

    pub fn release(&mut self, idx: usize) {
        if let Some(data) = self.markers[idx].fixed_mut() {
            data.update_ui = true;
        }
    }

    pub fn bind(&mut self, idx: usize, peak: PeakId) {
        self.markers[idx].source = Some(MarkerSource::Peak(peak));
    }

    pub fn set_visible(&mut self, idx: usize, visible: bool) {
        self.markers[idx].visible = visible;
    }

    pub fn set_selected(&mut self, idx: usize, selected: bool) {
        self.markers[idx].selected = selected;
    }

    pub fn clear_selection(&mut self) {
        for marker in &mut self.markers {
            marker.selected = false;
        }
    }

    /// Re-reads every fixed marker from the trace at its bin.
    pub fn calculate_fixed(&mut self, trace: &TraceData<'_>) {
        for marker in &mut self.markers {
            if let Some(data) = marker.fixed_mut() {
                let bin = data.bin;
                data.x = trace.axis.x(bin);
                data.y = trace.y.get(bin).copied().unwrap_or(data.y);
            }
        }
    }

    /// Keeps fixed markers on their frequency after the bin count changed.
    pub fn rebin_after_resize(&mut self, axis: &FrequencyAxis) {
        for marker in &mut self.markers {
            if let Some(data) = marker.fixed_mut() {
                data.bin = axis.clamp_bin(axis.pos_at_frequency(data.x));
                data.x = axis.x(data.bin);
            }
        }
    }

    /// Keeps fixed markers on their frequency after the sample rate changed;
    /// markers beyond the new span go to the last bin.
    pub fn rebin_after_sample_rate(&mut self, axis: &FrequencyAxis) {
        for marker in &mut self.markers {
            if let Some(data) = marker.fixed_mut() {
                data.bin = if data.x > axis.stop() {
                    axis.len().saturating_sub(1)
                } else {
                    axis.clamp_bin(axis.pos_at_frequency(data.x))
                };
                data.x = axis.x(data.bin);
            }
        }
    }

    /// Turns markers bound to peaks into fixed markers holding the peak's
    /// last value. Used before the peak table is rebuilt.
    pub fn freeze_bound(&mut self, peaks: &PeakTable) {
        for marker in &mut self.markers {
            if let Some(MarkerSource::Peak(id)) = marker.source {
                let data = peaks
                    .get(id)
                    .map(|peak| MarkerData {
                        x: peak.x,
                        y: peak.y,
                        bin: peak.bin,
                        update_ui: true,
                    })
                    .unwrap_or_default();
                marker.source = Some(MarkerSource::Fixed(data));
            }
        }
    }

    /// Peak adjacent to the marker's current reading in the given direction.
    pub fn neighbour_peak(
        &self,
        idx: usize,
        peaks: &PeakTable,
        step: PeakStep,
    ) -> Option<PeakId> {
        let current = self.reading(idx, peaks)?;
        let x_of = |id: PeakId| peaks.get(id).map_or(f64::NAN, |p| p.x);
        let y_of = |id: PeakId| peaks.get(id).map_or(f64::NAN, |p| p.y);
        let mut by_frequency = peaks.by_frequency().iter().copied();
        let mut by_magnitude = peaks.by_magnitude().into_iter();
        match step {
            PeakStep::HigherFrequency => by_frequency.find(|&id| x_of(id) > current.x),
            PeakStep::LowerFrequency => by_frequency.rev().find(|&id| x_of(id) < current.x),
            PeakStep::HigherMagnitude => by_magnitude.rev().find(|&id| y_of(id) > current.y),
            PeakStep::LowerMagnitude => by_magnitude.find(|&id| y_of(id) < current.y),
        }
    }
}
