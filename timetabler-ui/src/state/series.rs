//! Sliding window of chart points.

use std::collections::VecDeque;

/// Points kept per chart
pub const WINDOW: usize = 10;

/// Bounded series of `(label, value)` points, oldest first
#[derive(Clone, Debug, PartialEq)]
pub struct SeriesWindow {
    capacity: usize,
    points: VecDeque<(String, f64)>,
}

impl Default for SeriesWindow {
    fn default() -> Self {
        Self::new(WINDOW)
    }
}

impl SeriesWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            points: VecDeque::with_capacity(capacity + 1),
        }
    }

    /// Append a point, then drop the oldest until the window fits
    pub fn push(&mut self, label: impl Into<String>, value: f64) {
        self.points.push_back((label.into(), value));
        while self.points.len() > self.capacity {
            self.points.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.points.iter().map(|(l, _)| l.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|(_, v)| *v)
    }

    pub fn last(&self) -> Option<f64> {
        self.points.back().map(|(_, v)| *v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_after_each_push() {
        let mut series = SeriesWindow::default();
        for n in 1..=25 {
            series.push(format!("t{}", n), n as f64);
            assert_eq!(series.len(), n.min(WINDOW));
        }
    }

    #[test]
    fn test_oldest_dropped_first() {
        let mut series = SeriesWindow::default();
        for n in 1..=11 {
            series.push(n.to_string(), n as f64);
        }

        assert_eq!(series.labels().next(), Some("2"));
        assert_eq!(series.values().collect::<Vec<_>>(), (2..=11).map(|n| n as f64).collect::<Vec<_>>());
        assert_eq!(series.last(), Some(11.0));
    }

    #[test]
    fn test_empty() {
        let series = SeriesWindow::default();
        assert!(series.is_empty());
        assert_eq!(series.last(), None);
    }
}
