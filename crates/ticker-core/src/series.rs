// File: crates/ticker-core/src/series.rs
// Summary: Labeled price series (labels + values) with validation, trend and downsampling.

use crate::color::Sentiment;
use crate::downsample::lttb_indices;
use crate::error::{Error, Result};

/// Ordered `(label, value)` pairs. Empty is a valid "no data" state and
/// renders as an empty-axis chart.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Series {
    labels: Vec<String>,
    values: Vec<f64>,
}

impl Series {
    /// Labels and values must have the same length and values must be finite.
    pub fn new(labels: Vec<String>, values: Vec<f64>) -> Result<Self> {
        if labels.len() != values.len() {
            return Err(Error::config(format!(
                "series has {} labels but {} values",
                labels.len(),
                values.len()
            )));
        }
        if let Some(i) = values.iter().position(|v| !v.is_finite()) {
            return Err(Error::config(format!("series value at index {i} is not finite")));
        }
        Ok(Self { labels, values })
    }

    /// Label each value with its own text.
    pub fn from_values(values: Vec<f64>) -> Result<Self> {
        let labels = values.iter().map(|v| v.to_string()).collect();
        Self::new(labels, values)
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize { self.values.len() }
    pub fn is_empty(&self) -> bool { self.values.is_empty() }
    pub fn labels(&self) -> &[String] { &self.labels }
    pub fn values(&self) -> &[f64] { &self.values }

    pub fn first(&self) -> Option<f64> { self.values.first().copied() }
    pub fn last(&self) -> Option<f64> { self.values.last().copied() }

    /// Ascending when the last value is at least the first.
    pub fn sentiment(&self) -> Sentiment {
        Sentiment::of_series(&self.values)
    }

    /// `(min, max)` of the values, or `None` when empty.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        let mut iter = self.values.iter().copied();
        let first = iter.next()?;
        Some(iter.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
    }

    /// Downsample to at most `max_points` with LTTB, keeping each surviving
    /// point's label.
    pub fn downsample_lttb(&self, max_points: usize) -> Self {
        if self.len() <= max_points || max_points < 2 {
            return self.clone();
        }
        let xy: Vec<(f64, f64)> = self.values.iter().enumerate().map(|(i, &v)| (i as f64, v)).collect();
        let idx = lttb_indices(&xy, max_points);
        Self {
            labels: idx.iter().map(|&i| self.labels[i].clone()).collect(),
            values: idx.iter().map(|&i| self.values[i]).collect(),
        }
    }
}
