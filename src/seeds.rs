//! Per-scenario seed derivation for the load, renewable and dispatch stages.

use std::collections::HashSet;

use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::error::{GenerationError, Result};

/// Stream offsets so that equal base seeds still give unrelated streams.
const LOAD_STREAM_OFFSET: u64 = 0;
const RES_STREAM_OFFSET: u64 = 0x9E37_79B9_7F4A_7C15;
const DISP_STREAM_OFFSET: u64 = 0xD1B5_4A32_D192_ED03;

/// Seeds drawn for `n >= 2` scenarios stay below this bound so they can be
/// handed to tools that only accept 32-bit seeds.
const SEED_UPPER_BOUND: u64 = 1 << 32;

/// The seeds of one scenario. `None` means "seed from OS entropy".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SeedTriple {
    pub load: Option<u64>,
    pub res: Option<u64>,
    pub disp: Option<u64>,
}

/// One seed sequence per stage, each of length `n_scenarios`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedSequences {
    pub load: Vec<Option<u64>>,
    pub res: Vec<Option<u64>>,
    pub disp: Vec<Option<u64>>,
}

impl SeedSequences {
    pub fn len(&self) -> usize {
        self.load.len()
    }

    pub fn is_empty(&self) -> bool {
        self.load.is_empty()
    }

    /// Seeds of scenario `i`, if it exists.
    pub fn triple(&self, i: usize) -> Option<SeedTriple> {
        Some(SeedTriple {
            load: *self.load.get(i)?,
            res: *self.res.get(i)?,
            disp: *self.disp.get(i)?,
        })
    }

    /// Iterates the per-scenario triples in scenario order.
    pub fn triples(&self) -> impl Iterator<Item = SeedTriple> + '_ {
        (0..self.len()).filter_map(|i| self.triple(i))
    }
}

/// Checks that `scenario_id` is only given together with exactly one
/// scenario and that at least one scenario is requested.
pub fn check_scenario(n_scenarios: usize, scenario_id: Option<&str>) -> Result<()> {
    if n_scenarios < 1 || (n_scenarios >= 2 && scenario_id.is_some()) {
        return Err(GenerationError::InvalidScenarioCount {
            n_scenarios,
            scenario_id: scenario_id.map(str::to_string),
        });
    }
    Ok(())
}

/// Derives one seed per scenario and per stage.
///
/// With a single scenario the base seeds are passed through untouched so
/// that a caller fanning out one process per scenario keeps full control
/// of the seeds. With two or more scenarios each stage gets its own RNG,
/// seeded from its base seed (or OS entropy when unset), and draws
/// distinct seeds from it.
pub fn derive_seeds(n_scenarios: usize, base: SeedTriple) -> Result<SeedSequences> {
    check_scenario(n_scenarios, None)?;
    if n_scenarios == 1 {
        return Ok(SeedSequences {
            load: vec![base.load],
            res: vec![base.res],
            disp: vec![base.disp],
        });
    }
    Ok(SeedSequences {
        load: seed_stream(n_scenarios, base.load, LOAD_STREAM_OFFSET),
        res: seed_stream(n_scenarios, base.res, RES_STREAM_OFFSET),
        disp: seed_stream(n_scenarios, base.disp, DISP_STREAM_OFFSET),
    })
}

fn seed_stream(n: usize, base: Option<u64>, offset: u64) -> Vec<Option<u64>> {
    let mut rng = match base {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(offset)),
        None => StdRng::from_os_rng(),
    };
    let mut seen = HashSet::with_capacity(n);
    let mut seeds = Vec::with_capacity(n);
    while seeds.len() < n {
        let seed = rng.random_range(0..SEED_UPPER_BOUND);
        if seen.insert(seed) {
            seeds.push(Some(seed));
        }
    }
    seeds
}

/// Builds the RNG a stage should use for `seed`.
pub fn stage_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base(load: u64, res: u64, disp: u64) -> SeedTriple {
        SeedTriple {
            load: Some(load),
            res: Some(res),
            disp: Some(disp),
        }
    }

    fn all_distinct(seeds: &[Option<u64>]) -> bool {
        let set: HashSet<_> = seeds.iter().collect();
        set.len() == seeds.len()
    }

    #[test]
    fn single_scenario_passes_seeds_through() {
        let seeds = derive_seeds(1, base(1, 2, 3)).unwrap();
        assert_eq!(seeds.triple(0), Some(base(1, 2, 3)));

        let unset = derive_seeds(1, SeedTriple::default()).unwrap();
        assert_eq!(unset.load, vec![None]);
        assert_eq!(unset.res, vec![None]);
        assert_eq!(unset.disp, vec![None]);
    }

    #[test]
    fn fixed_base_seed_is_deterministic() {
        for n in [2, 3, 10, 50] {
            let a = derive_seeds(n, base(1, 2, 3)).unwrap();
            let b = derive_seeds(n, base(1, 2, 3)).unwrap();
            assert_eq!(a, b);
            assert_eq!(a.len(), n);
        }
    }

    #[test]
    fn seeds_are_distinct_within_each_sequence() {
        for n in [2, 5, 100] {
            let seeds = derive_seeds(n, base(7, 7, 7)).unwrap();
            assert!(all_distinct(&seeds.load));
            assert!(all_distinct(&seeds.res));
            assert!(all_distinct(&seeds.disp));
        }
        let entropy = derive_seeds(20, SeedTriple::default()).unwrap();
        assert!(entropy.load.iter().all(Option::is_some));
        assert!(all_distinct(&entropy.load));
    }

    #[test]
    fn equal_base_seeds_give_unrelated_streams() {
        let seeds = derive_seeds(4, base(5, 5, 5)).unwrap();
        assert_ne!(seeds.load, seeds.res);
        assert_ne!(seeds.res, seeds.disp);
    }

    #[test]
    fn streams_do_not_depend_on_each_other() {
        let a = derive_seeds(5, base(1, 2, 3)).unwrap();
        let b = derive_seeds(5, base(1, 99, 3)).unwrap();
        assert_eq!(a.load, b.load);
        assert_eq!(a.disp, b.disp);
        assert_ne!(a.res, b.res);
    }

    #[test]
    fn zero_scenarios_is_rejected() {
        let err = derive_seeds(0, SeedTriple::default()).unwrap_err();
        assert!(matches!(
            err,
            GenerationError::InvalidScenarioCount { n_scenarios: 0, .. }
        ));
    }

    #[test]
    fn scenario_id_requires_single_scenario() {
        assert!(check_scenario(1, Some("myscenario")).is_ok());
        assert!(check_scenario(1, None).is_ok());
        assert!(check_scenario(5, None).is_ok());
        assert!(matches!(
            check_scenario(3, Some("myscenario")),
            Err(GenerationError::InvalidScenarioCount { n_scenarios: 3, .. })
        ));
    }

    #[test]
    fn stage_rng_is_reproducible() {
        let mut a = stage_rng(Some(42));
        let mut b = stage_rng(Some(42));
        assert_eq!(a.random::<u64>(), b.random::<u64>());
    }
}
