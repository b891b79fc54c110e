//! Forecasted companions of generated chronics.

use rand::rngs::StdRng;

use crate::chronics::TimeSeriesTable;
use crate::stages::noise::gaussian_noise;

/// Forecast obtained by perturbing the realized chronics.
///
/// Each value `v` becomes `v + N(0, planned_std * |v|)`, clamped to
/// `[0, cap]` where `cap` is the capacity of the column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlannedNoiseForecast {
    pub planned_std: f64,
}

impl PlannedNoiseForecast {
    pub fn new(planned_std: f64) -> Self {
        Self {
            planned_std: planned_std.max(0.0),
        }
    }

    /// Produces the forecasted table, named `"{actual}_forecasted"`.
    ///
    /// `caps` holds one capacity per column of `actual`; missing entries
    /// leave the column unbounded above.
    pub fn forecast(
        &self,
        actual: &TimeSeriesTable,
        caps: &[f64],
        rng: &mut StdRng,
    ) -> TimeSeriesTable {
        let std = self.planned_std;
        actual
            .map_values(|_, col, v| {
                let cap = caps.get(col).copied().unwrap_or(f64::INFINITY);
                (v + gaussian_noise(rng, std * v.abs())).clamp(0.0, cap.max(0.0))
            })
            .renamed(format!("{}_forecasted", actual.name()))
    }
}
