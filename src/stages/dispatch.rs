//! Merit-order economic dispatch.

use tracing::debug;

use super::{DispatchBackend, DispatchRequest, DispatchResult, outputs};
use crate::chronics::TimeSeriesTable;
use crate::error::StageError;
use crate::forecast::PlannedNoiseForecast;
use crate::io::export::export_table;
use crate::seeds::stage_rng;

/// Column of the slack table.
pub const SLACK_COLUMN: &str = "slack";

/// Serves the residual demand with the cheapest dispatchable units first.
///
/// For every step the residual `Σ load + loss − Σ renewables` is allocated
/// to non-renewable generators by increasing marginal cost, each up to
/// `p_max · (1 − reserve_margin)`. Whatever cannot be allocated (or the
/// renewable surplus, when the residual is negative) goes to the slack.
#[derive(Debug, Default, Clone, Copy)]
pub struct MeritOrderDispatch;

impl DispatchBackend for MeritOrderDispatch {
    fn run(&mut self, request: DispatchRequest<'_>) -> Result<DispatchResult, StageError> {
        let dispatcher = request.dispatcher;
        let scenario = dispatcher
            .scenario()
            .ok_or_else(|| StageError::Other("no scenario context installed".to_string()))?;

        let reserve_margin = request.opf_params.f64_or("reserve_margin", 0.0)?;
        if !(0.0..1.0).contains(&reserve_margin) {
            return Err(StageError::Other(format!(
                "reserve_margin must be in [0, 1), got {reserve_margin}"
            )));
        }
        let planned_std = request.params.f64_or("planned_std", 0.0)?;

        let units = dispatcher.grid().merit_order();
        let caps: Vec<f64> = units
            .iter()
            .map(|g| g.p_max * (1.0 - reserve_margin))
            .collect();

        let demand = scenario.load().row_sums();
        let renewables = scenario.prods().row_sums();
        let losses = match scenario.loss() {
            Some(loss) => loss.row_sums(),
            None => vec![0.0; demand.len()],
        };

        let mut production = Vec::with_capacity(demand.len());
        let mut slack = Vec::with_capacity(demand.len());
        for ((load, renewable), loss) in demand.iter().zip(&renewables).zip(&losses) {
            let residual = load + loss - renewable;
            let mut remaining = residual.max(0.0);
            let row: Vec<f64> = caps
                .iter()
                .map(|cap| {
                    let p = remaining.min(*cap);
                    remaining -= p;
                    p
                })
                .collect();
            let served: f64 = row.iter().sum();
            slack.push(vec![residual - served]);
            production.push(row);
        }

        let index = scenario.load().index().to_vec();
        let columns = units.iter().map(|g| g.name.clone()).collect();
        let production = TimeSeriesTable::new("prod_p", index.clone(), columns, production)?;
        let slack = TimeSeriesTable::new("slack", index, vec![SLACK_COLUMN.to_string()], slack)?;

        let mut rng = stage_rng(request.seed);
        let p_max: Vec<f64> = units.iter().map(|g| g.p_max).collect();
        let production_forecasted =
            PlannedNoiseForecast::new(planned_std).forecast(&production, &p_max, &mut rng);

        let dir = request.output_path;
        export_table(&production, &dir.join(outputs::PRODUCTION))?;
        export_table(&production_forecasted, &dir.join(outputs::PRODUCTION_FORECASTED))?;
        export_table(&slack, &dir.join(outputs::SLACK))?;
        debug!(
            scenario = scenario.name(),
            units = units.len(),
            grid = %request.grid_folder.display(),
            "dispatch written"
        );

        Ok(DispatchResult {
            production,
            production_forecasted,
            slack,
        })
    }
}
