//! Sinusoidal load generator.

use std::f64::consts::PI;

use chrono::{NaiveDateTime, Timelike};
use tracing::debug;

use super::noise::gaussian_noise;
use super::{LoadBackend, LoadOutput, LoadRequest, capacities, outputs};
use crate::chronics::TimeSeriesTable;
use crate::error::StageError;
use crate::forecast::PlannedNoiseForecast;
use crate::io::export::export_table;
use crate::params::GenerationParameters;
use crate::seeds::stage_rng;

/// Parameters of the daily load shape, as ratios of each point's `Pmax`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SinusoidalLoadParams {
    /// Average consumption.
    pub base_ratio: f64,
    /// Amplitude of the daily variation.
    pub amp_ratio: f64,
    /// Phase offset in radians. `-PI/2` puts the minimum at midnight.
    pub phase_rad: f64,
    /// Standard deviation of the Gaussian noise.
    pub noise_std: f64,
    /// Relative standard deviation of the forecast error.
    pub planned_std: f64,
}

impl Default for SinusoidalLoadParams {
    fn default() -> Self {
        Self {
            base_ratio: 0.7,
            amp_ratio: 0.2,
            phase_rad: -PI / 2.0,
            noise_std: 0.02,
            planned_std: 0.01,
        }
    }
}

impl SinusoidalLoadParams {
    fn from_params(params: &GenerationParameters) -> Result<Self, StageError> {
        let d = Self::default();
        Ok(Self {
            base_ratio: params.f64_or("load_base_ratio", d.base_ratio)?,
            amp_ratio: params.f64_or("load_amp_ratio", d.amp_ratio)?,
            phase_rad: params.f64_or("load_phase_rad", d.phase_rad)?,
            noise_std: params.f64_or("load_noise_std", d.noise_std)?,
            planned_std: params.f64_or("planned_std", d.planned_std)?,
        })
    }
}

/// Fraction of the day elapsed at `stamp`, in `[0, 1)`.
pub(crate) fn day_position(stamp: &NaiveDateTime) -> f64 {
    stamp.num_seconds_from_midnight() as f64 / 86_400.0
}

/// Generates one load column per entry of the load characteristics.
///
/// Each point follows
/// `Pmax * (base + amp * sin(2π·day_pos + phase) + noise)`, floored at zero.
/// The forecasted table perturbs the realized one with `planned_std`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SinusoidalLoad;

impl LoadBackend for SinusoidalLoad {
    fn run(&mut self, request: LoadRequest<'_>) -> Result<LoadOutput, StageError> {
        let p = SinusoidalLoadParams::from_params(request.params)?;
        let horizon = request.params.horizon()?;
        let names = request.characteristics.names();
        let pmax = capacities(request.characteristics, &names)?;
        let mut rng = stage_rng(request.seed);

        let index = horizon.timestamps();
        let rows: Vec<Vec<f64>> = index
            .iter()
            .map(|stamp| {
                let angle = 2.0 * PI * day_position(stamp) + p.phase_rad;
                let shape = p.base_ratio + p.amp_ratio * angle.sin();
                pmax.iter()
                    .map(|cap| (cap * (shape + gaussian_noise(&mut rng, p.noise_std))).max(0.0))
                    .collect::<Vec<f64>>()
            })
            .collect();
        let columns = names.iter().map(|n| n.to_string()).collect();
        let load = TimeSeriesTable::new("load_p", index, columns, rows)?;
        let load_forecasted = PlannedNoiseForecast::new(p.planned_std).forecast(&load, &pmax, &mut rng);

        export_table(&load, &request.path.join(outputs::LOAD))?;
        export_table(&load_forecasted, &request.path.join(outputs::LOAD_FORECASTED))?;
        debug!(
            points = load.n_columns(),
            steps = load.n_rows(),
            path = %request.path.display(),
            "load chronics written"
        );

        Ok(LoadOutput {
            load,
            load_forecasted,
        })
    }
}
