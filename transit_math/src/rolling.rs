//! Bounded rolling windows
//!
//! - Trailing mean over the most recent values
//! - Lag buffer answering "value at lag k"

use crate::{MathError, Result};
use std::collections::VecDeque;

/// Trailing mean over at most `period` of the most recent values
#[derive(Debug, Clone)]
pub struct TrailingMean {
    period: usize,
    values: VecDeque<f64>,
    sum: f64,
}

impl TrailingMean {
    /// Create a new trailing mean with the specified period
    pub fn new(period: usize) -> Result<Self> {
        if period == 0 {
            return Err(MathError::InvalidInput(
                "Period must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            period,
            values: VecDeque::with_capacity(period),
            sum: 0.0,
        })
    }

    /// Create a trailing mean and feed it every value of `values` in order
    pub fn from_values(period: usize, values: &[f64]) -> Result<Self> {
        let mut mean = Self::new(period)?;
        for &value in values {
            mean.update(value);
        }
        Ok(mean)
    }

    /// Update the window with a new value
    pub fn update(&mut self, value: f64) {
        self.values.push_back(value);
        self.sum += value;

        if self.values.len() > self.period {
            if let Some(old_value) = self.values.pop_front() {
                self.sum -= old_value;
            }
        }
    }

    /// Mean of the values currently in the window.
    ///
    /// A window that is not yet full averages what it holds.
    pub fn value(&self) -> Result<f64> {
        if self.values.is_empty() {
            return Err(MathError::InsufficientData(
                "Trailing mean has no values".to_string(),
            ));
        }

        Ok(self.sum / self.values.len() as f64)
    }

}

/// Ring buffer holding the most recent `capacity` values of a series.
///
/// `get(1)` is the newest value, `get(capacity)` the oldest one retained.
#[derive(Debug, Clone)]
pub struct LagBuffer {
    capacity: usize,
    values: VecDeque<f64>,
}

impl LagBuffer {
    fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(MathError::InvalidInput(
                "Lag buffer capacity must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            capacity,
            values: VecDeque::with_capacity(capacity),
        })
    }

    /// Create a buffer seeded with the tail of `history` (oldest first)
    pub fn seeded(capacity: usize, history: &[f64]) -> Result<Self> {
        let mut buffer = Self::new(capacity)?;
        let start = history.len().saturating_sub(capacity);
        for &value in &history[start..] {
            buffer.push(value);
        }
        Ok(buffer)
    }

    /// Append the newest value, evicting the oldest when full
    pub fn push(&mut self, value: f64) {
        self.values.push_back(value);
        if self.values.len() > self.capacity {
            self.values.pop_front();
        }
    }

    /// Value `lag` steps back from the end, if retained. Lag 0 is never stored.
    pub fn get(&self, lag: usize) -> Option<f64> {
        if lag == 0 || lag > self.values.len() {
            return None;
        }
        self.values.get(self.values.len() - lag).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_mean_calculation() {
        let mut mean = TrailingMean::new(3).unwrap();

        assert!(mean.value().is_err());

        mean.update(10.0);
        assert_eq!(mean.value().unwrap(), 10.0);

        mean.update(20.0);
        mean.update(30.0);
        assert_eq!(mean.value().unwrap(), 20.0);

        mean.update(40.0);
        assert_eq!(mean.value().unwrap(), 30.0);
    }

    #[test]
    fn test_trailing_mean_partial_window() {
        let mean = TrailingMean::from_values(5, &[1.0, 2.0, 6.0]).unwrap();
        assert_eq!(mean.value().unwrap(), 3.0);

        let full = TrailingMean::from_values(2, &[1.0, 2.0, 6.0]).unwrap();
        assert_eq!(full.value().unwrap(), 4.0);
    }

    #[test]
    fn test_trailing_mean_rejects_zero_period() {
        assert!(TrailingMean::new(0).is_err());
    }

    #[test]
    fn test_lag_buffer_rejects_zero_capacity() {
        assert!(LagBuffer::seeded(0, &[1.0]).is_err());
    }

    #[test]
    fn test_lag_buffer_lookup() {
        let mut buffer = LagBuffer::seeded(3, &[1.0, 2.0, 3.0, 4.0]).unwrap();

        assert_eq!(buffer.get(1), Some(4.0));
        assert_eq!(buffer.get(3), Some(2.0));
        assert_eq!(buffer.get(4), None);
        assert_eq!(buffer.get(0), None);

        buffer.push(5.0);
        assert_eq!(buffer.get(1), Some(5.0));
        assert_eq!(buffer.get(3), Some(3.0));
    }
}
