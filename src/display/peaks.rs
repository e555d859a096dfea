use std::cmp::Ordering;

/// Magnitude reported by peak slots that found no extremum.
pub const PEAK_FLOOR: f64 = -200.0;
/// First bin searched when no sweep window narrows the scan.
pub const DEFAULT_SCAN_START: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Peak {
    pub x: f64,
    pub y: f64,
    pub bin: usize,
}

impl Default for Peak {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: PEAK_FLOOR,
            bin: 0,
        }
    }
}

/// Stable handle of a peak record inside one channel's [`PeakTable`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PeakId(usize);

impl PeakId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Sweep window restricting where peaks are searched.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScanWindow {
    pub sweep_start: f64,
    pub sweep_stop: f64,
    /// Stop frequency of the live axis; bins per Hz is `num_points / stop_frequency`.
    pub stop_frequency: f64,
}

impl ScanWindow {
    fn bins(&self, num_points: usize) -> (usize, usize) {
        let coef = num_points as f64 / self.stop_frequency;
        let start = (self.sweep_start * coef).max(0.0) as usize;
        let stop = (self.sweep_stop * coef).max(0.0) as usize;
        (start, stop.min(num_points))
    }
}

/// Peak records of one channel plus two orderings over the same records.
///
/// Records are rewritten in place on every search, so a [`PeakId`] keeps
/// pointing at "the n-th strongest peak" across acquisitions.
#[derive(Debug, Default)]
pub struct PeakTable {
    records: Vec<Peak>,
    by_frequency: Vec<PeakId>,
}

impl PeakTable {
    pub fn with_count(count: usize) -> Self {
        Self {
            records: vec![Peak::default(); count],
            by_frequency: (0..count).map(PeakId).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: PeakId) -> Option<&Peak> {
        self.records.get(id.0)
    }

    /// Id of the `rank`-th strongest peak.
    pub fn id_by_magnitude(&self, rank: usize) -> Option<PeakId> {
        (rank < self.records.len()).then_some(PeakId(rank))
    }

    /// Ids ordered by descending magnitude.
    pub fn by_magnitude(&self) -> Vec<PeakId> {
        (0..self.records.len()).map(PeakId).collect()
    }

    /// Ids ordered by ascending frequency.
    pub fn by_frequency(&self) -> &[PeakId] {
        &self.by_frequency
    }

    pub fn peaks_by_magnitude(&self) -> Vec<Peak> {
        self.records.clone()
    }

    pub fn peaks_by_frequency(&self) -> Vec<Peak> {
        self.by_frequency.iter().map(|id| self.records[id.0]).collect()
    }

    /// Finds the strongest local extrema of `y` and rewrites the records.
    ///
    /// A bin qualifies when the trace does not pass through it strictly
    /// rising or strictly falling; flats and valleys qualify as well.
    pub fn find_peaks(&mut self, x: &[f64], y: &[f64], window: Option<ScanWindow>) {
        let count = self.records.len();
        let num_points = y.len().min(x.len());
        let mut max_x = vec![0usize; count + 1];
        let mut max_y = vec![PEAK_FLOOR; count + 1];

        let (start, stop) = match window {
            Some(window) => window.bins(num_points),
            None => (DEFAULT_SCAN_START, num_points),
        };
        max_y[0] = y
            .get(if window.is_some() { start } else { 0 })
            .copied()
            .unwrap_or(PEAK_FLOOR);

        for i in start.max(2)..stop {
            let (prev, cur, next) = (y[i - 2], y[i - 1], y[i]);
            let rising = prev < cur && cur < next;
            let falling = prev > cur && cur > next;
            if rising || falling {
                continue;
            }
            if let Some(j) = (0..count).find(|&j| cur > max_y[j]) {
                for k in (j + 1..=count).rev() {
                    max_y[k] = max_y[k - 1];
                    max_x[k] = max_x[k - 1];
                }
                max_y[j] = cur;
                max_x[j] = i - 1;
            }
        }

        for (record, (&bin, &mag)) in self.records.iter_mut().zip(max_x.iter().zip(&max_y)) {
            record.x = x.get(bin).copied().unwrap_or(0.0);
            record.y = mag;
            record.bin = bin;
        }

        let records = &self.records;
        self.by_frequency = (0..count).map(PeakId).collect();
        self.by_frequency.sort_by(|a, b| {
            records[a.0]
                .x
                .partial_cmp(&records[b.0].x)
                .unwrap_or(Ordering::Equal)
        });
    }
}
