//! Rolling-window statistics for the feature pipeline
//!
//! These fill the gaps where the `ta` crate's formulas differ from the
//! rolling semantics this table needs: the deviation here is the *sample*
//! standard deviation (ddof = 1), and all windows report `None` until full
//! so warm-up rows stay distinguishable from real values.

use std::collections::VecDeque;

/// Fixed-size rolling window exposing mean and sample standard deviation.
#[derive(Debug, Clone)]
pub struct RollingWindow {
    window: usize,
    values: VecDeque<f64>,
}

impl RollingWindow {
    pub fn new(window: usize) -> Self {
        Self {
            window,
            values: VecDeque::with_capacity(window + 1),
        }
    }

    pub fn push(&mut self, value: f64) {
        self.values.push_back(value);
        if self.values.len() > self.window {
            self.values.pop_front();
        }
    }

    pub fn is_full(&self) -> bool {
        self.values.len() == self.window
    }

    pub fn mean(&self) -> Option<f64> {
        if !self.is_full() {
            return None;
        }
        Some(self.values.iter().sum::<f64>() / self.window as f64)
    }

    /// Sample standard deviation (ddof = 1). `None` until the window is full
    /// or when the window holds fewer than two values.
    pub fn sample_std(&self) -> Option<f64> {
        if !self.is_full() || self.window < 2 {
            return None;
        }
        let mean = self.values.iter().sum::<f64>() / self.window as f64;
        let sum_sq: f64 = self.values.iter().map(|v| (v - mean).powi(2)).sum();
        Some((sum_sq / (self.window as f64 - 1.0)).sqrt())
    }
}

/// Rolling volume-weighted average of the typical price (H + L + C) / 3.
#[derive(Debug, Clone)]
pub struct RollingVwap {
    window: usize,
    entries: VecDeque<(f64, f64)>,
}

impl RollingVwap {
    pub fn new(window: usize) -> Self {
        Self {
            window,
            entries: VecDeque::with_capacity(window + 1),
        }
    }

    pub fn next(&mut self, high: f64, low: f64, close: f64, volume: f64) -> Option<f64> {
        let typical = (high + low + close) / 3.0;
        self.entries.push_back((typical * volume, volume));
        if self.entries.len() > self.window {
            self.entries.pop_front();
        }
        if self.entries.len() < self.window {
            return None;
        }

        let pv_sum: f64 = self.entries.iter().map(|(pv, _)| pv).sum();
        let vol_sum: f64 = self.entries.iter().map(|(_, v)| v).sum();
        if vol_sum > 0.0 {
            Some(pv_sum / vol_sum)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_none_until_full() {
        let mut w = RollingWindow::new(3);
        w.push(1.0);
        w.push(2.0);
        assert!(w.mean().is_none());
        w.push(3.0);
        assert_eq!(w.mean(), Some(2.0));
    }

    #[test]
    fn test_mean_slides() {
        let mut w = RollingWindow::new(3);
        for v in [1.0, 2.0, 3.0, 4.0] {
            w.push(v);
        }
        assert_eq!(w.mean(), Some(3.0));
    }

    #[test]
    fn test_sample_std_matches_ddof_one() {
        let mut w = RollingWindow::new(4);
        for v in [2.0, 4.0, 4.0, 6.0] {
            w.push(v);
        }
        // variance = ((-2)^2 + 0 + 0 + 2^2) / 3 = 8/3
        let expected = (8.0f64 / 3.0).sqrt();
        let std = w.sample_std().unwrap();
        assert!((std - expected).abs() < 1e-12, "got {std}");
    }

    #[test]
    fn test_constant_series_has_zero_std() {
        let mut w = RollingWindow::new(5);
        for _ in 0..5 {
            w.push(7.0);
        }
        assert_eq!(w.sample_std(), Some(0.0));
    }

    #[test]
    fn test_vwap_single_candle_window() {
        let mut vwap = RollingVwap::new(1);
        let v = vwap.next(12.0, 6.0, 9.0, 100.0).unwrap();
        assert!((v - 9.0).abs() < 1e-12);
    }

    #[test]
    fn test_vwap_weights_by_volume() {
        let mut vwap = RollingVwap::new(2);
        assert!(vwap.next(10.0, 10.0, 10.0, 1.0).is_none());
        // typical prices: 10 (vol 1) and 20 (vol 3) -> (10 + 60) / 4
        let v = vwap.next(20.0, 20.0, 20.0, 3.0).unwrap();
        assert!((v - 17.5).abs() < 1e-12);
    }

    #[test]
    fn test_vwap_zero_volume_window() {
        let mut vwap = RollingVwap::new(2);
        vwap.next(10.0, 10.0, 10.0, 0.0);
        assert!(vwap.next(20.0, 20.0, 20.0, 0.0).is_none());
    }
}
