//! Grid topology used by the dispatch stage.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{GenerationError, Result};

/// A generator as described in the grid file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Generator {
    pub name: String,
    /// Energy carrier: `"solar"`, `"wind"`, `"thermal"`, `"nuclear"`, `"hydro"`, ...
    pub carrier: String,
    #[serde(default)]
    pub p_min: f64,
    pub p_max: f64,
    #[serde(default)]
    pub marginal_cost: f64,
}

impl Generator {
    /// Renewable generators are not dispatched: their output is given by
    /// the renewable stage.
    pub fn is_renewable(&self) -> bool {
        matches!(self.carrier.as_str(), "solar" | "wind")
    }
}

/// Static description of the grid, read once per run.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GridTopology {
    pub generators: Vec<Generator>,
}

impl GridTopology {
    pub fn from_json_str(raw: &str) -> std::result::Result<Self, String> {
        let grid: GridTopology = serde_json::from_str(raw).map_err(|e| e.to_string())?;
        grid.check()?;
        Ok(grid)
    }

    /// Reads a grid file.
    ///
    /// # Errors
    ///
    /// Returns a `Configuration` error if the file cannot be read, is not a
    /// valid grid description, or has inconsistent generator limits.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|e| {
            GenerationError::configuration("Grid", format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json_str(&raw).map_err(|e| {
            GenerationError::configuration("Grid", format!("invalid grid {}: {e}", path.display()))
        })
    }

    fn check(&self) -> std::result::Result<(), String> {
        let mut names = std::collections::HashSet::new();
        for g in &self.generators {
            if !names.insert(g.name.as_str()) {
                return Err(format!("duplicate generator \"{}\"", g.name));
            }
            if g.p_min < 0.0 || g.p_max < g.p_min {
                return Err(format!(
                    "generator \"{}\": need 0 <= p_min <= p_max, got p_min={} p_max={}",
                    g.name, g.p_min, g.p_max
                ));
            }
        }
        Ok(())
    }

    /// Non-renewable generators sorted by increasing marginal cost, ties
    /// broken by name so the order is stable.
    pub fn merit_order(&self) -> Vec<&Generator> {
        let mut dispatchable: Vec<&Generator> =
            self.generators.iter().filter(|g| !g.is_renewable()).collect();
        dispatchable.sort_by(|a, b| {
            a.marginal_cost
                .total_cmp(&b.marginal_cost)
                .then_with(|| a.name.cmp(&b.name))
        });
        dispatchable
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GRID: &str = r#"{
        "generators": [
            {"name": "gas_0", "carrier": "thermal", "p_max": 100.0, "marginal_cost": 60.0},
            {"name": "nuc_0", "carrier": "nuclear", "p_min": 10.0, "p_max": 200.0, "marginal_cost": 10.0},
            {"name": "pv_0", "carrier": "solar", "p_max": 50.0},
            {"name": "coal_0", "carrier": "thermal", "p_max": 80.0, "marginal_cost": 60.0}
        ]
    }"#;

    #[test]
    fn merit_order_skips_renewables() {
        let grid = GridTopology::from_json_str(GRID).unwrap();
        let order: Vec<&str> = grid.merit_order().iter().map(|g| g.name.as_str()).collect();
        assert_eq!(order, vec!["nuc_0", "coal_0", "gas_0"]);
    }

    #[test]
    fn rejects_inverted_limits() {
        let raw = r#"{"generators": [{"name": "g", "carrier": "thermal", "p_min": 5, "p_max": 1}]}"#;
        assert!(GridTopology::from_json_str(raw).unwrap_err().contains("p_min"));
    }

    #[test]
    fn rejects_duplicate_names() {
        let raw = r#"{"generators": [
            {"name": "g", "carrier": "thermal", "p_max": 1},
            {"name": "g", "carrier": "hydro", "p_max": 2}
        ]}"#;
        assert!(GridTopology::from_json_str(raw).is_err());
    }
}
