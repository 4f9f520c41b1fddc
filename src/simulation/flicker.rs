//! Damping of oscillating area errors
//!
//! The simulation records the area error after every tick. When the error
//! keeps alternating between growing and shrinking, the adaptation steps are
//! overshooting; the ratio computed here slows them down.

use std::collections::VecDeque;

/// Default number of remembered growth changes
pub const DEFAULT_WINDOW_LENGTH: usize = 10;

/// Sliding window of growth-direction changes of the area error
#[derive(Debug, Clone, PartialEq)]
pub struct FlickeringMitigation {
    length: usize,
    weights: Vec<f64>,
    weights_sum: f64,
    total_area: Option<f64>,
    last_error: Option<f64>,
    last_growth: Option<i8>,
    changes: VecDeque<bool>,
}

impl FlickeringMitigation {
    /// Mitigation with the default window length
    pub fn new() -> Self {
        Self::with_length(DEFAULT_WINDOW_LENGTH)
    }

    /// Mitigation remembering the last `length` growth changes
    ///
    /// A zero length is treated as 1.
    pub fn with_length(length: usize) -> Self {
        let length = length.max(1);
        let weights = change_weights(length);
        let weights_sum = weights.iter().sum();
        Self {
            length,
            weights,
            weights_sum,
            total_area: None,
            last_error: None,
            last_growth: None,
            changes: VecDeque::with_capacity(length + 1),
        }
    }

    /// Number of growth changes the window holds when full
    pub fn window_length(&self) -> usize {
        self.length
    }

    /// Number of growth changes currently recorded
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Whether no growth change has been recorded yet
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Area the errors are measured against
    pub fn total_area(&self) -> Option<f64> {
        self.total_area
    }

    /// Set the area the errors are measured against
    ///
    /// Non-positive or non-finite values are ignored.
    pub fn set_total_area(&mut self, area: f64) -> &mut Self {
        if area > 0.0 && area.is_finite() {
            self.total_area = Some(area);
        }
        self
    }

    /// Forget the recorded history, keeping the total area
    pub fn clear(&mut self) -> &mut Self {
        self.last_error = None;
        self.last_growth = None;
        self.changes.clear();
        self
    }

    /// Forget everything, including the total area and a custom length
    pub fn reset(&mut self) -> &mut Self {
        *self = Self::new();
        self
    }

    /// Record the area error of the latest tick
    pub fn add(&mut self, area_error: f64) -> &mut Self {
        let previous_error = self.last_error.replace(area_error);
        if let Some(previous_error) = previous_error {
            let previous_growth = self.last_growth.replace(direction(area_error, previous_error));
            if let Some(previous_growth) = previous_growth {
                self.changes.push_front(self.last_growth != Some(previous_growth));
                self.changes.truncate(self.length);
            }
        }
        self
    }

    /// Weighted share of recent growth flips, in `[0, 1]`
    ///
    /// Stays 0 until the window is full, and while the last error exceeds a
    /// tenth of the total area.
    pub fn ratio(&self) -> f64 {
        if self.changes.len() < self.length {
            return 0.0;
        }
        if let (Some(error), Some(area)) = (self.last_error, self.total_area) {
            if error > area / 10.0 {
                return 0.0;
            }
        }
        let weighted: f64 = self
            .changes
            .iter()
            .zip(&self.weights)
            .filter_map(|(changed, w)| changed.then_some(*w))
            .sum();
        weighted / self.weights_sum
    }
}

impl Default for FlickeringMitigation {
    fn default() -> Self {
        Self::new()
    }
}

fn direction(current: f64, previous: f64) -> i8 {
    if current >= previous {
        1
    } else {
        -1
    }
}

/// Recency weights 3, 2, 1, 1, ...
fn change_weights(length: usize) -> Vec<f64> {
    (0..length).map(|i| (3.0 - i as f64).max(1.0)).collect()
}
