/// Frequency of every bin of a spectrum.
#[derive(Clone, Debug, PartialEq)]
pub struct FrequencyAxis {
    start: f64,
    stop: f64,
    points: Vec<f64>,
}

impl FrequencyAxis {
    pub fn new(start: f64, stop: f64, num_points: usize) -> Self {
        let mut axis = Self {
            start,
            stop,
            points: Vec::new(),
        };
        axis.regenerate(start, stop, num_points);
        axis
    }

    /// Axis of an externally supplied trace: the span runs from its first to
    /// its last point.
    pub fn from_points(points: Vec<f64>) -> Self {
        let start = points.first().copied().unwrap_or(0.0);
        let stop = points.last().copied().unwrap_or(0.0);
        Self {
            start,
            stop,
            points,
        }
    }

    pub fn regenerate(&mut self, start: f64, stop: f64, num_points: usize) {
        self.start = start;
        self.stop = stop;
        let bin = (stop - start) / num_points as f64;
        self.points.clear();
        self.points
            .extend((0..num_points).map(|i| start + i as f64 * bin));
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn stop(&self) -> f64 {
        self.stop
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn bin_size(&self) -> f64 {
        (self.stop - self.start) / self.points.len() as f64
    }

    pub fn points(&self) -> &[f64] {
        &self.points
    }

    pub fn center(&self) -> f64 {
        (self.start + self.stop) / 2.0
    }

    /// Nearest bin of `freq`, rounding halves up. Not clamped.
    pub fn pos_at_frequency(&self, freq: f64) -> i64 {
        ((freq - self.start) / self.bin_size() + 0.5).floor() as i64
    }

    /// Clamps a bin position into `[0, len - 1]`.
    pub fn clamp_bin(&self, pos: i64) -> usize {
        let last = self.points.len().saturating_sub(1) as i64;
        pos.clamp(0, last) as usize
    }

    pub fn x(&self, bin: usize) -> f64 {
        self.points.get(bin).copied().unwrap_or(self.start)
    }
}
