//! Network loss generation.

use tracing::debug;

use super::{LossBackend, LossRequest, outputs};
use crate::chronics::TimeSeriesTable;
use crate::error::StageError;
use crate::io::export::export_table;

/// Column of the loss table.
pub const LOSS_COLUMN: &str = "loss";

/// Losses proportional to total consumption: `loss_pct / 100 * Σ load(t)`.
///
/// `loss_pct` is read from the loss domain parameters.
#[derive(Debug, Default, Clone, Copy)]
pub struct FlatRateLoss;

impl LossBackend for FlatRateLoss {
    fn run(&mut self, request: LossRequest<'_>) -> Result<TimeSeriesTable, StageError> {
        let manager = request.config_manager;
        manager.validate_configuration()?;
        let config = manager.read_configuration()?;
        let params = config.params.merged_with(request.params);
        let loss_pct = params.f64("loss_pct")?;
        if !(0.0..=100.0).contains(&loss_pct) {
            return Err(StageError::Other(format!(
                "loss_pct must be in [0, 100], got {loss_pct}"
            )));
        }

        let rate = loss_pct / 100.0;
        let rows = request
            .load
            .row_sums()
            .into_iter()
            .map(|total| vec![rate * total])
            .collect();
        let loss = TimeSeriesTable::new(
            "loss",
            request.load.index().to_vec(),
            vec![LOSS_COLUMN.to_string()],
            rows,
        )?;

        export_table(&loss, &request.path.join(outputs::LOSS))?;
        debug!(
            loss_pct,
            domain = manager.name(),
            input = %request.input_folder.display(),
            "loss chronics written"
        );
        Ok(loss)
    }
}
