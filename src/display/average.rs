use ndarray::Array2;

/// Streaming statistic computed by a [`SpectrumAverage`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AveragePolicy {
    PeakHoldContinuous,
    MinHoldContinuous,
    ExponentialRms,
    ExponentialAverage,
    /// Accumulates `history` squared vectors, then publishes their mean.
    LinearRmsBlock,
    /// Accumulates `history` vectors, then publishes their mean.
    LinearAverageBlock,
    PeakHold,
    MinHold,
    LinearRms,
    LinearAverage,
}

impl AveragePolicy {
    /// Windowed policies keep a ring of the last `history` raw vectors.
    pub fn is_windowed(self) -> bool {
        matches!(
            self,
            AveragePolicy::PeakHold
                | AveragePolicy::MinHold
                | AveragePolicy::LinearRms
                | AveragePolicy::LinearAverage
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Extremum {
    Max,
    Min,
}

impl Extremum {
    fn beats(self, candidate: f64, current: f64) -> bool {
        match self {
            Extremum::Max => candidate > current,
            Extremum::Min => candidate < current,
        }
    }
}

#[derive(Debug)]
enum EngineState {
    Single {
        any_pushed: bool,
    },
    Block {
        any_pushed: bool,
        sums: Vec<f64>,
        count: usize,
    },
    Window(HistoryRing),
}

/// Ring of raw vectors; rows are history slots, columns are bins.
#[derive(Debug)]
struct HistoryRing {
    rows: Array2<f64>,
    insert_index: usize,
    inserted_count: usize,
    sums: Vec<f64>,
}

impl HistoryRing {
    fn new(history: usize, width: usize) -> Self {
        Self {
            rows: Array2::zeros((history, width)),
            insert_index: 0,
            inserted_count: 0,
            sums: vec![0.0; width],
        }
    }

    fn capacity(&self) -> usize {
        self.rows.nrows()
    }

    fn is_full(&self) -> bool {
        self.inserted_count == self.capacity()
    }

    /// Value about to be overwritten by the next push.
    fn evicted(&self, col: usize) -> f64 {
        self.rows[[self.insert_index, col]]
    }

    fn store(&mut self, data: &[f64]) {
        let mut row = self.rows.row_mut(self.insert_index);
        for (slot, value) in row.iter_mut().zip(data) {
            *slot = *value;
        }
        self.insert_index = (self.insert_index + 1) % self.capacity();
        self.inserted_count = (self.inserted_count + 1).min(self.capacity());
    }

    /// Extremum of a column over every stored slot except the one being overwritten.
    fn column_extremum_without_evicted(&self, col: usize, kind: Extremum) -> f64 {
        let column = self.rows.column(col);
        let mut best: Option<f64> = None;
        for (row, value) in column.iter().enumerate().take(self.inserted_count) {
            if row == self.insert_index {
                continue;
            }
            best = match best {
                Some(current) if !kind.beats(*value, current) => Some(current),
                _ => Some(*value),
            };
        }
        best.unwrap_or_else(|| self.rows[[0, col]])
    }

    /// Stored rows from oldest to newest.
    fn chronological(&self) -> Vec<Vec<f64>> {
        let start = if self.is_full() { self.insert_index } else { 0 };
        (0..self.inserted_count)
            .map(|offset| {
                let row = (start + offset) % self.capacity();
                self.rows.row(row).to_vec()
            })
            .collect()
    }

    fn reset(&mut self) {
        self.insert_index = 0;
        self.inserted_count = 0;
        self.sums.iter_mut().for_each(|s| *s = 0.0);
    }
}

/// Running aggregate over a stream of equally sized vectors.
///
/// `data_width` is fixed at construction; pushing vectors of another width
/// only touches the overlapping prefix, so owners rebuild the engine when the
/// spectrum size changes.
#[derive(Debug)]
pub struct SpectrumAverage {
    policy: AveragePolicy,
    data_width: usize,
    history_size: usize,
    average: Vec<f64>,
    state: EngineState,
}

impl SpectrumAverage {
    pub fn new(policy: AveragePolicy, data_width: usize, history: usize) -> Self {
        let data_width = data_width.max(1);
        let history_size = history.max(1);
        let state = match policy {
            AveragePolicy::LinearRmsBlock | AveragePolicy::LinearAverageBlock => {
                EngineState::Block {
                    any_pushed: false,
                    sums: vec![0.0; data_width],
                    count: 0,
                }
            }
            p if p.is_windowed() => EngineState::Window(HistoryRing::new(history_size, data_width)),
            _ => EngineState::Single { any_pushed: false },
        };
        Self {
            policy,
            data_width,
            history_size,
            average: vec![0.0; data_width],
            state,
        }
    }

    pub fn policy(&self) -> AveragePolicy {
        self.policy
    }

    pub fn data_width(&self) -> usize {
        self.data_width
    }

    pub fn history(&self) -> usize {
        self.history_size
    }

    pub fn history_enabled(&self) -> bool {
        self.policy.is_windowed()
    }

    /// Number of vectors currently contributing to a windowed average.
    pub fn fill_count(&self) -> usize {
        match &self.state {
            EngineState::Window(ring) => ring.inserted_count,
            EngineState::Block { count, .. } => *count,
            EngineState::Single { any_pushed } => usize::from(*any_pushed),
        }
    }

    pub fn push_new_data(&mut self, data: &[f64]) {
        let width = self.data_width.min(data.len());
        let data = &data[..width];
        let history = self.history_size as f64;
        match (&mut self.state, self.policy) {
            (EngineState::Single { any_pushed }, policy) => {
                if !*any_pushed {
                    for (avg, v) in self.average.iter_mut().zip(data) {
                        *avg = match policy {
                            AveragePolicy::ExponentialRms => v * v,
                            _ => *v,
                        };
                    }
                    *any_pushed = true;
                    return;
                }
                for (avg, v) in self.average.iter_mut().zip(data) {
                    *avg = match policy {
                        AveragePolicy::PeakHoldContinuous => v.max(*avg),
                        AveragePolicy::MinHoldContinuous => v.min(*avg),
                        AveragePolicy::ExponentialRms => (v * v + (history - 1.0) * *avg) / history,
                        _ => (v + (history - 1.0) * *avg) / history,
                    };
                }
            }
            (
                EngineState::Block {
                    any_pushed,
                    sums,
                    count,
                },
                policy,
            ) => {
                if !*any_pushed {
                    self.average[..width].copy_from_slice(data);
                    *any_pushed = true;
                } else if *count < self.history_size {
                    for (sum, v) in sums.iter_mut().zip(data) {
                        *sum += match policy {
                            AveragePolicy::LinearRmsBlock => v * v,
                            _ => *v,
                        };
                    }
                    *count += 1;
                } else if *count != 0 {
                    let n = *count as f64;
                    for (avg, sum) in self.average.iter_mut().zip(sums.iter_mut()) {
                        *avg = *sum / n;
                        *sum = 0.0;
                    }
                    *count = 0;
                }
            }
            (EngineState::Window(ring), AveragePolicy::PeakHold) => {
                push_extremum(ring, &mut self.average, data, self.history_size, Extremum::Max)
            }
            (EngineState::Window(ring), AveragePolicy::MinHold) => {
                push_extremum(ring, &mut self.average, data, self.history_size, Extremum::Min)
            }
            (EngineState::Window(ring), policy) => {
                let square = policy == AveragePolicy::LinearRms;
                let full = ring.is_full();
                for (col, v) in data.iter().enumerate() {
                    if full {
                        let old = ring.evicted(col);
                        ring.sums[col] -= if square { old * old } else { old };
                    }
                    ring.sums[col] += if square { v * v } else { *v };
                }
                ring.store(data);
            }
        }
    }

    /// Copies the current aggregate into `out` (up to `data_width` values).
    ///
    /// Linear window policies divide the running sums by the fill count, so
    /// reading before any push yields NaN.
    pub fn get_average(&self, out: &mut [f64]) {
        let n = self.data_width.min(out.len());
        match (&self.state, self.policy) {
            (
                EngineState::Window(ring),
                AveragePolicy::LinearRms | AveragePolicy::LinearAverage,
            ) => {
                let count = ring.inserted_count as f64;
                for (o, sum) in out[..n].iter_mut().zip(&ring.sums) {
                    *o = sum / count;
                }
            }
            _ => out[..n].copy_from_slice(&self.average[..n]),
        }
    }

    /// Forgets accumulated data without reallocating.
    pub fn reset(&mut self) {
        match &mut self.state {
            EngineState::Single { any_pushed } => *any_pushed = false,
            EngineState::Block {
                any_pushed,
                sums,
                count,
            } => {
                *any_pushed = false;
                *count = 0;
                sums.iter_mut().for_each(|s| *s = 0.0);
            }
            EngineState::Window(ring) => ring.reset(),
        }
    }

    /// Changes the history length, keeping the most recent vectors of a window.
    pub fn set_history(&mut self, history: usize) {
        let history = history.max(1);
        if let EngineState::Window(ring) = &mut self.state {
            let rows = ring.chronological();
            let keep = &rows[rows.len().saturating_sub(history)..];
            let mut resized = HistoryRing::new(history, self.data_width);
            let square = self.policy == AveragePolicy::LinearRms;
            for row in keep {
                for (sum, v) in resized.sums.iter_mut().zip(row) {
                    *sum += if square { v * v } else { *v };
                }
                resized.store(row);
            }
            let extremum = match self.policy {
                AveragePolicy::PeakHold => Some(Extremum::Max),
                AveragePolicy::MinHold => Some(Extremum::Min),
                _ => None,
            };
            if let (Some(kind), Some((first, rest))) = (extremum, keep.split_first()) {
                self.average.copy_from_slice(first);
                for row in rest {
                    for (avg, v) in self.average.iter_mut().zip(row) {
                        if kind.beats(*v, *avg) {
                            *avg = *v;
                        }
                    }
                }
            }
            *ring = resized;
        }
        self.history_size = history;
    }
}

fn push_extremum(
    ring: &mut HistoryRing,
    extremes: &mut [f64],
    data: &[f64],
    history: usize,
    kind: Extremum,
) {
    if ring.inserted_count == 0 || history == 1 {
        extremes[..data.len()].copy_from_slice(data);
    } else {
        let full = ring.is_full();
        for (col, v) in data.iter().enumerate() {
            if kind.beats(*v, extremes[col]) {
                extremes[col] = *v;
            }
            if !full {
                continue;
            }
            // The slot being overwritten held the extremum: rescan the rest of
            // the window and let the incoming value compete with it.
            if ring.evicted(col) == extremes[col] {
                let rest = ring.column_extremum_without_evicted(col, kind);
                extremes[col] = if kind.beats(*v, rest) { *v } else { rest };
            }
        }
    }
    ring.store(data);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn average_of(engine: &SpectrumAverage) -> Vec<f64> {
        let mut out = vec![0.0; engine.data_width()];
        engine.get_average(&mut out);
        out
    }

    #[test]
    fn zero_width_is_clamped_to_one() {
        let engine = SpectrumAverage::new(AveragePolicy::PeakHold, 0, 0);
        assert_eq!(engine.data_width(), 1);
        assert_eq!(engine.history(), 1);
    }

    #[test]
    fn continuous_holds_never_decay() {
        let mut peak = SpectrumAverage::new(AveragePolicy::PeakHoldContinuous, 3, 4);
        let mut min = SpectrumAverage::new(AveragePolicy::MinHoldContinuous, 3, 4);
        for data in [[1.0, 5.0, 2.0], [3.0, 1.0, 2.5], [0.0, 0.0, 0.0]] {
            peak.push_new_data(&data);
            min.push_new_data(&data);
        }
        assert_eq!(average_of(&peak), vec![3.0, 5.0, 2.5]);
        assert_eq!(average_of(&min), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn windowed_peak_hold_rescans_after_evicting_the_peak() {
        let history = 3;
        let mut engine = SpectrumAverage::new(AveragePolicy::PeakHold, 2, history);
        engine.push_new_data(&[9.0, 1.0]);
        engine.push_new_data(&[4.0, 2.0]);
        engine.push_new_data(&[6.0, 3.0]);
        assert_eq!(average_of(&engine), vec![9.0, 3.0]);
        // Evicts the first vector, which held the peak of bin 0.
        engine.push_new_data(&[5.0, 0.0]);
        assert_eq!(average_of(&engine), vec![6.0, 3.0]);
    }

    #[test]
    fn windowed_peak_hold_keeps_new_value_when_it_wins_the_rescan() {
        let mut engine = SpectrumAverage::new(AveragePolicy::PeakHold, 1, 2);
        engine.push_new_data(&[8.0]);
        engine.push_new_data(&[1.0]);
        engine.push_new_data(&[7.0]);
        assert_eq!(average_of(&engine), vec![7.0]);
    }

    #[test]
    fn windowed_min_hold_rescans_after_evicting_the_min() {
        let mut engine = SpectrumAverage::new(AveragePolicy::MinHold, 1, 3);
        for v in [-4.0, 2.0, 1.0] {
            engine.push_new_data(&[v]);
        }
        assert_eq!(average_of(&engine), vec![-4.0]);
        engine.push_new_data(&[3.0]);
        assert_eq!(average_of(&engine), vec![1.0]);
    }

    #[test]
    fn linear_average_divides_by_fill_count() {
        let mut engine = SpectrumAverage::new(AveragePolicy::LinearAverage, 2, 3);
        engine.push_new_data(&[2.0, 4.0]);
        assert_eq!(average_of(&engine), vec![2.0, 4.0]);
        engine.push_new_data(&[4.0, 8.0]);
        assert_eq!(average_of(&engine), vec![3.0, 6.0]);
        engine.push_new_data(&[6.0, 0.0]);
        engine.push_new_data(&[8.0, 0.0]);
        // Window now holds 4, 6, 8 for bin 0 and 8, 0, 0 for bin 1.
        let avg = average_of(&engine);
        assert!((avg[0] - 6.0).abs() < 1e-12);
        assert!((avg[1] - 8.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn linear_rms_accumulates_squares() {
        let mut engine = SpectrumAverage::new(AveragePolicy::LinearRms, 1, 2);
        engine.push_new_data(&[3.0]);
        engine.push_new_data(&[1.0]);
        assert_eq!(average_of(&engine), vec![5.0]);
        engine.push_new_data(&[2.0]);
        assert_eq!(average_of(&engine), vec![2.5]);
    }

    #[test]
    fn exponential_average_weights_history() {
        let mut engine = SpectrumAverage::new(AveragePolicy::ExponentialAverage, 1, 4);
        engine.push_new_data(&[8.0]);
        engine.push_new_data(&[0.0]);
        assert_eq!(average_of(&engine), vec![6.0]);

        let mut rms = SpectrumAverage::new(AveragePolicy::ExponentialRms, 1, 2);
        rms.push_new_data(&[2.0]);
        assert_eq!(average_of(&rms), vec![4.0]);
        rms.push_new_data(&[4.0]);
        assert_eq!(average_of(&rms), vec![10.0]);
    }

    #[test]
    fn block_average_publishes_after_history_pushes() {
        let mut engine = SpectrumAverage::new(AveragePolicy::LinearAverageBlock, 1, 2);
        engine.push_new_data(&[10.0]);
        assert_eq!(average_of(&engine), vec![10.0]);
        engine.push_new_data(&[2.0]);
        engine.push_new_data(&[4.0]);
        assert_eq!(average_of(&engine), vec![10.0]);
        engine.push_new_data(&[100.0]);
        assert_eq!(average_of(&engine), vec![3.0]);
        assert_eq!(engine.fill_count(), 0);
    }

    #[test]
    fn block_history_change_only_moves_the_divisor() {
        let mut engine = SpectrumAverage::new(AveragePolicy::LinearAverageBlock, 1, 2);
        engine.push_new_data(&[10.0]);
        engine.push_new_data(&[1.0]);
        engine.set_history(3);
        assert_eq!(engine.history(), 3);
        assert_eq!(engine.fill_count(), 1);
        engine.push_new_data(&[2.0]);
        engine.push_new_data(&[3.0]);
        assert_eq!(average_of(&engine), vec![10.0]);
        assert_eq!(engine.fill_count(), 3);
        engine.push_new_data(&[99.0]);
        assert_eq!(average_of(&engine), vec![2.0]);
        assert_eq!(engine.fill_count(), 0);
    }

    #[test]
    fn reset_restarts_accumulation() {
        let mut engine = SpectrumAverage::new(AveragePolicy::LinearAverage, 1, 4);
        engine.push_new_data(&[100.0]);
        engine.push_new_data(&[50.0]);
        engine.reset();
        assert_eq!(engine.fill_count(), 0);
        engine.push_new_data(&[1.0]);
        assert_eq!(average_of(&engine), vec![1.0]);

        let mut hold = SpectrumAverage::new(AveragePolicy::PeakHoldContinuous, 1, 1);
        hold.push_new_data(&[100.0]);
        hold.reset();
        hold.push_new_data(&[1.0]);
        assert_eq!(average_of(&hold), vec![1.0]);
    }

    #[test]
    fn shrinking_history_keeps_the_newest_vectors() {
        let mut engine = SpectrumAverage::new(AveragePolicy::LinearAverage, 1, 4);
        for v in [1.0, 2.0, 3.0, 4.0, 5.0] {
            engine.push_new_data(&[v]);
        }
        engine.set_history(2);
        assert_eq!(engine.history(), 2);
        assert_eq!(engine.fill_count(), 2);
        assert_eq!(average_of(&engine), vec![4.5]);
        engine.push_new_data(&[7.0]);
        assert_eq!(average_of(&engine), vec![6.0]);
    }

    #[test]
    fn growing_history_rebuilds_peak() {
        let mut engine = SpectrumAverage::new(AveragePolicy::PeakHold, 1, 2);
        for v in [9.0, 1.0, 2.0] {
            engine.push_new_data(&[v]);
        }
        assert_eq!(average_of(&engine), vec![2.0]);
        engine.set_history(5);
        assert_eq!(average_of(&engine), vec![2.0]);
        engine.push_new_data(&[0.5]);
        assert_eq!(average_of(&engine), vec![2.0]);
        assert_eq!(engine.fill_count(), 3);
    }
}
