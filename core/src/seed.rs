use alloc::collections::VecDeque;
use rand::prelude::*;

use crate::*;

/// Platform-supplied seed material for cell selection.
///
/// Each join draws one seed. Unpredictability of the starting cell is only
/// as good as this source.
pub trait SeedSource {
    fn next_seed(&mut self) -> u64;
}

/// Seeds drawn from a [`SmallRng`] keyed by a single root seed.
#[derive(Clone, Debug)]
pub struct RngSeedSource {
    rng: SmallRng,
}

impl RngSeedSource {
    pub fn new(root_seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(root_seed),
        }
    }
}

impl SeedSource for RngSeedSource {
    fn next_seed(&mut self) -> u64 {
        self.rng.random()
    }
}

/// Replays a fixed list of seeds, then repeats the last one.
#[derive(Clone, Debug, Default)]
pub struct FixedSeeds {
    seeds: VecDeque<u64>,
    last: u64,
}

impl FixedSeeds {
    pub fn new(seeds: impl IntoIterator<Item = u64>) -> Self {
        Self {
            seeds: seeds.into_iter().collect(),
            last: 0,
        }
    }
}

impl SeedSource for FixedSeeds {
    fn next_seed(&mut self) -> u64 {
        if let Some(seed) = self.seeds.pop_front() {
            self.last = seed;
        }
        self.last
    }
}

/// Uniform starting cell in `[1, total_cells]` derived from `seed`.
pub fn start_cell(seed: u64, total_cells: CellCount) -> CellIndex {
    let mut rng = SmallRng::seed_from_u64(seed);
    CellIndex::new_unchecked(rng.random_range(1..=total_cells))
}
