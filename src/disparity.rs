//! Disparity map with an explicit per-pixel validity bitmap.

/// Dense disparity map produced by the matcher.
///
/// Values are stored for every pixel; filters mark pixels invalid rather than
/// erasing them, so the bitmap is authoritative and the retained value of an
/// invalidated pixel must be ignored by consumers.
pub struct DisparityMap {
    values: Vec<f32>,
    valid: Vec<bool>,
    width: usize,
    height: usize,
}

impl DisparityMap {
    /// Creates a map with all pixels invalid and values zeroed.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            values: vec![0.0; width * height],
            valid: vec![false; width * height],
            width,
            height,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the disparity at `(x, y)` if the pixel is valid.
    pub fn get(&self, x: usize, y: usize) -> Option<f32> {
        let idx = y * self.width + x;
        self.valid[idx].then(|| self.values[idx])
    }

    /// Returns the stored value regardless of validity.
    pub(crate) fn raw(&self, idx: usize) -> f32 {
        self.values[idx]
    }

    pub fn is_valid(&self, x: usize, y: usize) -> bool {
        self.valid[y * self.width + x]
    }

    /// Stores a value and marks the pixel valid.
    pub(crate) fn put(&mut self, x: usize, y: usize, value: f32) {
        let idx = y * self.width + x;
        self.values[idx] = value;
        self.valid[idx] = true;
    }

    pub(crate) fn invalidate(&mut self, x: usize, y: usize) {
        self.valid[y * self.width + x] = false;
    }

    pub(crate) fn invalidate_idx(&mut self, idx: usize) {
        self.valid[idx] = false;
    }

    pub(crate) fn is_valid_idx(&self, idx: usize) -> bool {
        self.valid[idx]
    }

    /// Mutable access to the whole value and validity buffers, for the
    /// selector's row-chunked fill.
    pub(crate) fn buffers_mut(&mut self) -> (&mut [f32], &mut [bool]) {
        (&mut self.values, &mut self.valid)
    }

    /// Number of valid pixels.
    pub fn valid_count(&self) -> usize {
        self.valid.iter().filter(|&&v| v).count()
    }

    /// Observed (min, max) over valid pixels, or `None` when all are invalid.
    pub fn valid_range(&self) -> Option<(f32, f32)> {
        let mut range: Option<(f32, f32)> = None;
        for (value, &ok) in self.values.iter().zip(&self.valid) {
            if !ok {
                continue;
            }
            range = Some(match range {
                Some((lo, hi)) => (lo.min(*value), hi.max(*value)),
                None => (*value, *value),
            });
        }
        range
    }
}
