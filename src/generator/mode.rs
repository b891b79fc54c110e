//! Stage selection from a mode string such as `"LRTK"`.

use std::fmt;

use crate::error::{GenerationError, Result};

/// Mode used when the caller does not pick one.
pub const DEFAULT_MODE: &str = "LRTK";

/// One unit of the generation pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Load,
    Renewable,
    Loss,
    Dispatch,
}

impl Stage {
    /// Pipeline order.
    pub const ALL: [Stage; 4] = [Stage::Load, Stage::Renewable, Stage::Loss, Stage::Dispatch];

    /// Letter selecting this stage in a mode string.
    pub fn flag(self) -> char {
        match self {
            Stage::Load => 'L',
            Stage::Renewable => 'R',
            Stage::Loss => 'D',
            Stage::Dispatch => 'T',
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Load => "load",
            Stage::Renewable => "renewable",
            Stage::Loss => "loss",
            Stage::Dispatch => "dispatch",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stages enabled for a run.
///
/// `K` (hydro) is accepted and ignored: it is part of the default mode but
/// no hydro stage exists. Any other letter is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Mode {
    pub load: bool,
    pub renewable: bool,
    pub loss: bool,
    pub dispatch: bool,
}

impl Mode {
    /// Parses a mode string. Letter order and repetitions are irrelevant.
    pub fn parse(mode: &str) -> Result<Self> {
        let mut parsed = Mode::default();
        for flag in mode.chars() {
            match flag {
                'L' => parsed.load = true,
                'R' => parsed.renewable = true,
                'D' => parsed.loss = true,
                'T' => parsed.dispatch = true,
                'K' => {}
                other => {
                    return Err(GenerationError::InvalidMode {
                        mode: mode.to_string(),
                        flag: other,
                    });
                }
            }
        }
        Ok(parsed)
    }

    pub fn all() -> Self {
        Self {
            load: true,
            renewable: true,
            loss: true,
            dispatch: true,
        }
    }

    pub fn contains(&self, stage: Stage) -> bool {
        match stage {
            Stage::Load => self.load,
            Stage::Renewable => self.renewable,
            Stage::Loss => self.loss,
            Stage::Dispatch => self.dispatch,
        }
    }

    /// Enabled stages in pipeline order.
    pub fn stages(&self) -> Vec<Stage> {
        Stage::ALL
            .into_iter()
            .filter(|s| self.contains(*s))
            .collect()
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for stage in self.stages() {
            write!(f, "{}", stage.flag())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_mode_skips_loss() {
        let mode = Mode::parse(DEFAULT_MODE).unwrap();
        assert!(!mode.loss);
        assert_eq!(mode.to_string(), "LRT");
        assert_eq!(Mode::parse("LRDT").unwrap(), Mode::all());
    }

    #[test]
    fn hydro_flag_is_a_no_op() {
        assert_eq!(Mode::parse("K").unwrap(), Mode::default());
        assert_eq!(Mode::parse("LRTK").unwrap().stages(), vec![
            Stage::Load,
            Stage::Renewable,
            Stage::Dispatch
        ]);
    }

    #[test]
    fn unknown_flag_is_rejected() {
        let err = Mode::parse("LRX").unwrap_err();
        assert!(matches!(err, GenerationError::InvalidMode { flag: 'X', .. }));
        assert!(Mode::parse("lr").is_err());
    }

    #[test]
    fn order_does_not_matter() {
        assert_eq!(Mode::parse("TRL").unwrap(), Mode::parse("LRT").unwrap());
        assert!(Mode::parse("").unwrap().stages().is_empty());
    }
}
