//! Solar and wind generation with AR(1) variability.

use std::f64::consts::PI;

use chrono::NaiveDateTime;
use tracing::debug;

use super::load::day_position;
use super::noise::Ar1Process;
use super::{
    RenewableBackend, RenewableOutput, RenewableRequest, TYPE_COLUMN, capacities, outputs,
};
use crate::chronics::{CharacteristicsTable, TimeSeriesTable};
use crate::error::StageError;
use crate::forecast::PlannedNoiseForecast;
use crate::io::export::export_table;
use crate::params::GenerationParameters;
use crate::seeds::stage_rng;

/// Minimum cloud multiplier (heavy overcast).
const CLOUD_MIN: f64 = 0.2;
/// Maximum cloud multiplier (enhanced irradiance from cloud edges).
const CLOUD_MAX: f64 = 1.2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ar1RenewableParams {
    /// Hour of sunrise, inclusive.
    pub sunrise_hour: f64,
    /// Hour of sunset, exclusive.
    pub sunset_hour: f64,
    pub solar_alpha: f64,
    pub solar_cloud_noise_std: f64,
    pub wind_alpha: f64,
    /// Long-run capacity factor of wind generators.
    pub wind_mean_ratio: f64,
    pub wind_noise_std: f64,
    pub planned_std: f64,
}

impl Default for Ar1RenewableParams {
    fn default() -> Self {
        Self {
            sunrise_hour: 6.0,
            sunset_hour: 18.0,
            solar_alpha: 0.9,
            solar_cloud_noise_std: 0.2,
            wind_alpha: 0.95,
            wind_mean_ratio: 0.35,
            wind_noise_std: 0.05,
            planned_std: 0.01,
        }
    }
}

impl Ar1RenewableParams {
    fn from_params(params: &GenerationParameters) -> Result<Self, StageError> {
        let d = Self::default();
        let p = Self {
            sunrise_hour: params.f64_or("sunrise_hour", d.sunrise_hour)?,
            sunset_hour: params.f64_or("sunset_hour", d.sunset_hour)?,
            solar_alpha: params.f64_or("solar_alpha", d.solar_alpha)?,
            solar_cloud_noise_std: params.f64_or("solar_cloud_noise_std", d.solar_cloud_noise_std)?,
            wind_alpha: params.f64_or("wind_alpha", d.wind_alpha)?,
            wind_mean_ratio: params.f64_or("wind_mean_ratio", d.wind_mean_ratio)?,
            wind_noise_std: params.f64_or("wind_noise_std", d.wind_noise_std)?,
            planned_std: params.f64_or("planned_std", d.planned_std)?,
        };
        if !(0.0 <= p.sunrise_hour && p.sunrise_hour < p.sunset_hour && p.sunset_hour <= 24.0) {
            return Err(StageError::Other(format!(
                "need 0 <= sunrise_hour < sunset_hour <= 24, got {} and {}",
                p.sunrise_hour, p.sunset_hour
            )));
        }
        Ok(p)
    }

    /// Half-sine daylight profile: 0 at night, 1 at solar noon.
    fn daylight_fraction(&self, stamp: &NaiveDateTime) -> f64 {
        let hour = day_position(stamp) * 24.0;
        if hour < self.sunrise_hour || hour >= self.sunset_hour {
            return 0.0;
        }
        let x = (hour - self.sunrise_hour) / (self.sunset_hour - self.sunrise_hour);
        (PI * x).sin().max(0.0)
    }
}

/// Renewable backend driving every generator with its own AR(1) process.
///
/// Generators are taken from the `type` column of the production
/// characteristics (`solar` or `wind`). Solar output is
/// `Pmax * daylight * m(t)` with a cloud multiplier `m` in `[0.2, 1.2]`,
/// capped at `Pmax`. Wind output is `Pmax * w(t)` with `w` reverting to
/// `wind_mean_ratio` inside `[0, 1]`.
#[derive(Debug, Default, Clone, Copy)]
pub struct Ar1Renewable;

impl Ar1Renewable {
    fn table(
        name: &str,
        index: &[NaiveDateTime],
        names: &[&str],
        pmax: &[f64],
        mut value: impl FnMut(&NaiveDateTime, usize) -> f64,
    ) -> Result<TimeSeriesTable, StageError> {
        let rows = index
            .iter()
            .map(|stamp| {
                (0..names.len())
                    .map(|g| value(stamp, g).clamp(0.0, pmax[g].max(0.0)))
                    .collect::<Vec<f64>>()
            })
            .collect();
        let columns = names.iter().map(|n| n.to_string()).collect();
        Ok(TimeSeriesTable::new(name, index.to_vec(), columns, rows)?)
    }
}

fn generators_of<'a>(charac: &'a CharacteristicsTable, kind: &str) -> Vec<&'a str> {
    charac.names_where(TYPE_COLUMN, kind)
}

impl RenewableBackend for Ar1Renewable {
    fn run(&mut self, request: RenewableRequest<'_>) -> Result<RenewableOutput, StageError> {
        let p = Ar1RenewableParams::from_params(request.params)?;
        let index = request.params.horizon()?.timestamps();
        let mut rng = stage_rng(request.seed);

        let solar_names = generators_of(request.characteristics, "solar");
        let wind_names = generators_of(request.characteristics, "wind");
        let solar_pmax = capacities(request.characteristics, &solar_names)?;
        let wind_pmax = capacities(request.characteristics, &wind_names)?;

        let mut clouds: Vec<Ar1Process> = solar_names
            .iter()
            .map(|_| {
                Ar1Process::new(p.solar_alpha, 1.0, p.solar_cloud_noise_std, CLOUD_MIN, CLOUD_MAX)
            })
            .collect();
        let solar = Self::table("solar_p", &index, &solar_names, &solar_pmax, |stamp, g| {
            let m = clouds[g].step(&mut rng);
            solar_pmax[g] * p.daylight_fraction(stamp) * m
        })?;

        let mut winds: Vec<Ar1Process> = wind_names
            .iter()
            .map(|_| Ar1Process::new(p.wind_alpha, p.wind_mean_ratio, p.wind_noise_std, 0.0, 1.0))
            .collect();
        let wind = Self::table("wind_p", &index, &wind_names, &wind_pmax, |_, g| {
            wind_pmax[g] * winds[g].step(&mut rng)
        })?;

        let forecast = PlannedNoiseForecast::new(p.planned_std);
        let solar_forecasted = forecast.forecast(&solar, &solar_pmax, &mut rng);
        let wind_forecasted = forecast.forecast(&wind, &wind_pmax, &mut rng);

        let dir = request.path;
        export_table(&solar, &dir.join(outputs::SOLAR))?;
        export_table(&solar_forecasted, &dir.join(outputs::SOLAR_FORECASTED))?;
        export_table(&wind, &dir.join(outputs::WIND))?;
        export_table(&wind_forecasted, &dir.join(outputs::WIND_FORECASTED))?;
        debug!(
            solar = solar.n_columns(),
            wind = wind.n_columns(),
            steps = index.len(),
            path = %dir.display(),
            "renewable chronics written"
        );

        Ok(RenewableOutput {
            solar,
            solar_forecasted,
            wind,
            wind_forecasted,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> GenerationParameters {
        GenerationParameters::new()
            .with("start_date", "2012-01-01 00:00")
            .with("end_date", "2012-01-03 00:00")
            .with("dt", 60)
    }

    fn charac() -> CharacteristicsTable {
        let rows = [
            ("gen_0_solar", "solar", "50"),
            ("gen_1_wind", "wind", "80"),
            ("gen_2_thermal", "thermal", "200"),
            ("gen_3_solar", "solar", "20"),
        ];
        CharacteristicsTable::new(
            vec!["name".into(), "type".into(), "Pmax".into()],
            rows.iter()
                .map(|(n, t, p)| vec![n.to_string(), t.to_string(), p.to_string()])
                .collect(),
        )
        .unwrap()
    }

    fn run(seed: Option<u64>, params: &GenerationParameters) -> RenewableOutput {
        let tmp = tempfile::tempdir().unwrap();
        let charac = charac();
        Ar1Renewable
            .run(RenewableRequest {
                path: tmp.path(),
                seed,
                params,
                characteristics: &charac,
            })
            .unwrap()
    }

    #[test]
    fn splits_generators_by_type() {
        let out = run(Some(2), &params());
        assert_eq!(out.solar.columns(), &["gen_0_solar", "gen_3_solar"]);
        assert_eq!(out.wind.columns(), &["gen_1_wind"]);
        assert_eq!(out.solar.n_rows(), 48);
        assert_eq!(out.wind_forecasted.n_rows(), 48);
    }

    #[test]
    fn no_solar_at_night() {
        let out = run(Some(2), &params());
        let pv = out.solar.column("gen_0_solar").unwrap();
        for hour in [0, 3, 5, 18, 23, 24, 29, 47] {
            assert_eq!(pv[hour], 0.0, "hour {hour}");
        }
        assert!(pv[12] > 0.0);
    }

    #[test]
    fn output_within_capacity() {
        let out = run(Some(5), &params().with("wind_noise_std", 0.5));
        for row in out.wind.rows() {
            assert!((0.0..=80.0).contains(&row[0]));
        }
        for row in out.solar.rows() {
            assert!((0.0..=50.0).contains(&row[0]));
            assert!((0.0..=20.0).contains(&row[1]));
        }
    }

    #[test]
    fn seed_determinism() {
        assert_eq!(run(Some(11), &params()), run(Some(11), &params()));
        assert_ne!(run(Some(11), &params()).wind, run(Some(12), &params()).wind);
    }

    #[test]
    fn inverted_daylight_window_is_rejected() {
        let params = params().with("sunrise_hour", 19.0);
        let tmp = tempfile::tempdir().unwrap();
        let charac = charac();
        let err = Ar1Renewable
            .run(RenewableRequest {
                path: tmp.path(),
                seed: None,
                params: &params,
                characteristics: &charac,
            })
            .unwrap_err();
        assert!(err.to_string().contains("sunrise_hour"));
    }
}
