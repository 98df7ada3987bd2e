//! Y axis bounds and ticks for the medal trend chart

use serde::{Deserialize, Serialize};

/// Bounded, evenly spaced axis description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisScale {
    pub min: i64,
    pub max: i64,
    pub ticks: Vec<i64>,
}

impl AxisScale {
    /// Compute the axis for a series of counts.
    ///
    /// Bounds snap outward to multiples of 10 and never go below zero; the
    /// upper bound saturates at `i64::MAX`. Returns `None` for an empty series.
    pub fn from_values(values: &[i64]) -> Option<Self> {
        let lowest = *values.iter().min()?;
        let highest = *values.iter().max()?;

        let min = floor_to_ten(lowest).max(0);
        let max = ceil_to_ten(highest);
        let spacing = tick_spacing(max.saturating_sub(min));

        let mut ticks = Vec::new();
        let mut current = min;
        while current <= max {
            ticks.push(current);
            match current.checked_add(spacing) {
                Some(next) => current = next,
                None => break,
            }
        }

        Some(Self { min, max, ticks })
    }

    pub fn spacing(&self) -> i64 {
        tick_spacing(self.max.saturating_sub(self.min))
    }
}

/// Gap between two ticks for a given axis range
pub fn tick_spacing(range: i64) -> i64 {
    if range > 20 {
        10
    } else if range > 10 {
        5
    } else {
        2
    }
}

fn floor_to_ten(value: i64) -> i64 {
    value.saturating_sub(value.rem_euclid(10))
}

fn ceil_to_ten(value: i64) -> i64 {
    match value.rem_euclid(10) {
        0 => value,
        rem => value.saturating_add(10 - rem),
    }
}
