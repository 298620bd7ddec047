use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Simulation output: a time column plus one named series per state variable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    pub time: Vec<usize>,
    pub series: BTreeMap<String, Vec<f64>>,
}

impl Trajectory {
    /// Build from equally long named series; the time column is `0..len`.
    ///
    /// Series are truncated to the shortest one.
    pub fn from_series<I, S>(series: I) -> Self
    where
        I: IntoIterator<Item = (S, Vec<f64>)>,
        S: Into<String>,
    {
        let mut series: BTreeMap<String, Vec<f64>> =
            series.into_iter().map(|(name, values)| (name.into(), values)).collect();
        let len = series.values().map(Vec::len).min().unwrap_or(0);
        for values in series.values_mut() {
            values.truncate(len);
        }
        Self {
            time: (0..len).collect(),
            series,
        }
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    pub fn series(&self, name: &str) -> Option<&[f64]> {
        self.series.get(name).map(Vec::as_slice)
    }

    /// Value of every series at the last time step.
    pub fn last_row(&self) -> BTreeMap<&str, f64> {
        self.series
            .iter()
            .filter_map(|(name, values)| values.last().map(|v| (name.as_str(), *v)))
            .collect()
    }
}
