use std::{collections::HashSet, fmt::Display, str::FromStr};

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::{
    region::{Corner, Direction, Region},
    PixelGrid,
};

/// What to do when a neighbor candidate sticks out of the image
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub enum OutOfBounds {
    /// Stop looking at the remaining candidates altogether
    #[default]
    Stop,
    /// Skip the offending candidate and keep looking at the others
    Skip,
}

impl Display for OutOfBounds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                OutOfBounds::Stop => "stop",
                OutOfBounds::Skip => "skip",
            }
        )
    }
}

impl FromStr for OutOfBounds {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stop" => Ok(OutOfBounds::Stop),
            "skip" => Ok(OutOfBounds::Skip),
            _ => Err(anyhow::anyhow!("Invalid out-of-bounds policy: {}", s)),
        }
    }
}

/// Find the index (into [`Region::neighbors`]) of the unrevealed neighbor whose mean color is
/// closest to the mean color of `region`.
///
/// Candidates are looked at in neighbor order and ties go to the first one seen. Returns `None`
/// when no candidate qualifies.
pub fn closest_neighbor<G: PixelGrid + ?Sized>(
    grid: &G,
    region: &Region,
    revealed: &HashSet<Corner>,
    bounds: OutOfBounds,
) -> Option<usize> {
    let mean = grid.mean_color(region)?;
    let (width, height) = grid.extent();

    let mut closest: Option<(usize, f64)> = None;

    for (index, candidate) in region.neighbors().iter().enumerate() {
        if !candidate.within(width, height) {
            match bounds {
                OutOfBounds::Stop => break,
                OutOfBounds::Skip => continue,
            }
        }

        if revealed.contains(&candidate.corner()) {
            continue;
        }

        let Some(candidate_mean) = grid.mean_color(candidate) else {
            continue;
        };
        let distance = mean.distance(&candidate_mean);

        // strictly smaller, the first candidate wins a tie
        if closest.map_or(true, |(_, best)| distance < best) {
            closest = Some((index, distance));
        }
    }

    closest.map(|(index, _)| index)
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum WalkState {
    Walking,
    /// All steps of the current budget were taken
    BudgetSpent,
    /// The walk got stuck and the region could not be halved any further
    ShrinkExhausted,
}

impl WalkState {
    pub fn is_done(&self) -> bool {
        !matches!(self, WalkState::Walking)
    }
}

impl Display for WalkState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                WalkState::Walking => "walking",
                WalkState::BudgetSpent => "budget spent",
                WalkState::ShrinkExhausted => "shrink exhausted",
            }
        )
    }
}

/// The outcome of a finished walk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Walk {
    /// The seed followed by every region appended to the path, in order
    pub regions: Vec<Region>,
    pub state: WalkState,
    /// How many times the walk got stuck and restarted from a halved region
    pub shrinks: usize,
}

/// Greedy walk over an image, one region per step.
///
/// Every step moves to the unrevealed neighbor of the last region whose mean color is closest.
/// When no neighbor qualifies the last region is halved and the walk restarts from there with a
/// fresh budget, forgetting which corners the earlier part of the path used; once the region can
/// no longer be halved the walk ends.
#[derive(Debug)]
pub struct Walker {
    budget: usize,
    remaining: usize,
    bounds: OutOfBounds,
    path: Vec<Region>,
    /// Corners used since the walk (re)started
    revealed: HashSet<Corner>,
    shrinks: usize,
    state: WalkState,
}

impl Walker {
    /// The seed is trusted as is, it is not checked against the image
    pub fn new(seed: Region, budget: usize) -> Self {
        Self {
            budget,
            remaining: budget,
            bounds: OutOfBounds::default(),
            path: vec![seed],
            revealed: HashSet::from([seed.corner()]),
            shrinks: 0,
            state: if budget == 0 {
                WalkState::BudgetSpent
            } else {
                WalkState::Walking
            },
        }
    }

    pub fn with_bounds(mut self, bounds: OutOfBounds) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn finish<G: PixelGrid + ?Sized>(mut self, grid: &G) -> Walk {
        while !self.step(grid).is_done() {}

        debug!(
            "walk ended ({}) with {} regions after {} shrink(s)",
            self.state,
            self.path.len(),
            self.shrinks
        );

        Walk {
            regions: self.path,
            state: self.state,
            shrinks: self.shrinks,
        }
    }

    pub fn step<G: PixelGrid + ?Sized>(&mut self, grid: &G) -> WalkState {
        if self.state.is_done() {
            return self.state;
        }

        // the path is never empty, it starts out with the seed
        let current = self.path[self.path.len() - 1];

        match closest_neighbor(grid, &current, &self.revealed, self.bounds) {
            Some(index) => {
                let next = current.neighbors()[index];
                trace!("{} -> {} ({})", current, next, Direction::ALL[index]);

                self.reveal(next);
                self.remaining -= 1;

                if self.remaining == 0 {
                    self.state = WalkState::BudgetSpent;
                }
            }
            None => match current.shrink() {
                Some(seed) => {
                    debug!("stuck at {}, restarting from {}", current, seed);

                    // a restart gets the whole budget again, not what is left of it, and may step
                    // on corners the path used before it
                    self.revealed.clear();
                    self.reveal(seed);
                    self.remaining = self.budget;
                    self.shrinks += 1;
                }
                None => {
                    debug!("stuck at {}, cannot shrink any further", current);
                    self.state = WalkState::ShrinkExhausted;
                }
            },
        }

        self.state
    }

    fn reveal(&mut self, region: Region) {
        self.revealed.insert(region.corner());
        self.path.push(region);
    }

    pub fn state(&self) -> WalkState {
        self.state
    }

    pub fn path(&self) -> &[Region] {
        &self.path
    }
}

/// Walk from `seed` for up to `budget` steps with the default [`OutOfBounds`] policy and return
/// the regions visited
pub fn find_path<G: PixelGrid + ?Sized>(grid: &G, seed: Region, budget: usize) -> Vec<Region> {
    Walker::new(seed, budget).finish(grid).regions
}

#[cfg(test)]
mod test {

    use super::*;
    use image::{Rgba, RgbaImage};

    fn uniform(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba([128, 128, 128, 255]))
    }

    /// White on the left of `split`, black on the right
    fn two_tone(width: u32, height: u32, split: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, _| {
            if x < split {
                Rgba([255, 255, 255, 255])
            } else {
                Rgba([0, 0, 0, 255])
            }
        })
    }

    /// Split a path into the runs walked between restarts
    fn sub_paths(path: &[Region]) -> Vec<&[Region]> {
        let mut runs = Vec::new();
        let mut start = 0;
        for i in 1..path.len() {
            if path[i - 1].shrink() == Some(path[i]) {
                runs.push(&path[start..i]);
                start = i;
            }
        }
        runs.push(&path[start..]);
        runs
    }

    fn assert_unique_steps(path: &[Region]) {
        for run in sub_paths(path) {
            let mut seen = HashSet::new();
            for region in run {
                assert!(
                    seen.insert(region.corner()),
                    "{} revisits an earlier corner",
                    region
                );
            }
        }
    }

    #[test]
    fn test_closest_prefers_similar_color() {
        let img = two_tone(40, 30, 20);
        let region = Region::new(20, 30, 10, 20);

        // up and up-right are both black, up is seen first
        assert_eq!(
            closest_neighbor(&img, &region, &HashSet::new(), OutOfBounds::Stop),
            Some(1)
        );

        let revealed = HashSet::from([Corner { x: 20, y: 0 }]);
        assert_eq!(
            closest_neighbor(&img, &region, &revealed, OutOfBounds::Stop),
            Some(2)
        );
    }

    #[test]
    fn test_closest_stops_at_first_out_of_bounds() {
        let img = uniform(40, 30);
        let region = Region::new(0, 10, 10, 20);

        // the up-left candidate is outside, so nothing after it is considered
        assert_eq!(
            closest_neighbor(&img, &region, &HashSet::new(), OutOfBounds::Stop),
            None
        );
        assert_eq!(
            closest_neighbor(&img, &region, &HashSet::new(), OutOfBounds::Skip),
            Some(1)
        );
    }

    #[test]
    fn test_closest_without_candidates() {
        let img = uniform(10, 10);
        let region = Region::new(0, 10, 0, 10);

        assert_eq!(
            closest_neighbor(&img, &region, &HashSet::new(), OutOfBounds::Skip),
            None
        );
    }

    #[test]
    fn test_zero_budget_keeps_seed() {
        let img = uniform(100, 100);
        let seed = Region::new(0, 10, 0, 10);

        assert_eq!(find_path(&img, seed, 0), vec![seed]);
        assert!(matches!(
            Walker::new(seed, 0).finish(&img),
            Walk {
                state: WalkState::BudgetSpent,
                shrinks: 0,
                ..
            }
        ));
    }

    #[test]
    fn test_uniform_walk_takes_first_candidate() {
        let img = uniform(100, 100);
        let seed = Region::new(50, 60, 50, 60);

        let path = find_path(&img, seed, 5);

        assert_eq!(path.len(), 6);
        for pair in path.windows(2) {
            assert_eq!(pair[1], pair[0].neighbor(Direction::UpLeft));
        }
    }

    #[test]
    fn test_uniform_walk_from_the_corner_when_skipping() {
        let img = uniform(100, 100);
        let seed = Region::new(0, 10, 0, 10);

        let walk = Walker::new(seed, 5)
            .with_bounds(OutOfBounds::Skip)
            .finish(&img);

        assert_eq!(walk.state, WalkState::BudgetSpent);
        assert_eq!(walk.shrinks, 0);
        assert_eq!(walk.regions.len(), 6);
        // the first candidate inside the image is always the one to the right
        for (i, region) in walk.regions.iter().enumerate() {
            assert_eq!(*region, Region::new(10 * i as i64, 10 * (i as i64 + 1), 0, 10));
        }
    }

    #[test]
    fn test_corner_seed_shrinks_until_exhausted() {
        let img = uniform(100, 100);
        let seed = Region::new(0, 10, 0, 10);

        let walk = Walker::new(seed, 5).finish(&img);

        assert_eq!(walk.state, WalkState::ShrinkExhausted);
        assert_eq!(
            walk.regions,
            vec![
                seed,
                Region::new(0, 5, 0, 5),
                Region::new(0, 2, 0, 2),
                Region::new(0, 1, 0, 1),
            ]
        );
        assert_eq!(walk.shrinks, 3);
    }

    #[test]
    fn test_oversized_seed_hits_the_wall() {
        let img = uniform(60, 60);
        let seed = Region::new(0, 50, 0, 50);

        let walk = Walker::new(seed, 10).finish(&img);

        assert!(walk.shrinks >= 1);
        assert!(walk.regions.len() < 11);
        assert_eq!(walk.regions.len(), 6);
    }

    #[test]
    fn test_walk_follows_color() {
        let img = two_tone(40, 30, 20);
        let seed = Region::new(20, 30, 10, 20);

        let walk = Walker::new(seed, 4)
            .with_bounds(OutOfBounds::Skip)
            .finish(&img);

        assert_eq!(walk.regions.len(), 5);
        // never wanders into the white half
        assert!(walk.regions.iter().all(|r| r.x1 >= 20));
    }

    #[test]
    fn test_restart_keeps_the_full_budget() {
        let img = uniform(20, 20);
        let seed = Region::new(0, 10, 0, 10);

        let walk = Walker::new(seed, 5)
            .with_bounds(OutOfBounds::Skip)
            .finish(&img);

        // three steps fill the 2x2 tiling, then a restart at half size walks five more
        assert_eq!(walk.shrinks, 1);
        assert_eq!(walk.state, WalkState::BudgetSpent);
        assert_eq!(walk.regions.len(), 10);
        assert_eq!(walk.regions[4], Region::new(0, 5, 10, 15));
        // after the restart the origin corner is free again
        assert_eq!(walk.regions[6], Region::new(0, 5, 0, 5));
    }

    #[test]
    fn test_restart_may_step_on_earlier_corners() {
        let img = RgbaImage::from_fn(12, 8, |x, y| {
            Rgba([
                ((x + y) % 7 * 36) as u8,
                ((x + 2 * y) % 5 * 50) as u8,
                ((x + y) % 3 * 100) as u8,
                255,
            ])
        });
        let seed = Region::new(3, 5, 2, 4);

        let walk = Walker::new(seed, 4).finish(&img);

        assert_eq!(
            walk.regions,
            vec![
                seed,
                Region::new(1, 3, 4, 6),
                // stuck, restart at half size
                Region::new(1, 2, 4, 5),
                Region::new(2, 3, 3, 4),
                // same corner as the seed
                Region::new(3, 4, 2, 3),
                Region::new(4, 5, 1, 2),
                Region::new(5, 6, 0, 1),
            ]
        );
        assert_eq!(walk.shrinks, 1);
        assert_eq!(walk.state, WalkState::BudgetSpent);
        assert_eq!(find_path(&img, seed, 4), walk.regions);
    }

    #[test]
    fn test_huge_seed_does_not_overflow() {
        let img = uniform(10, 10);

        for seed in [
            Region::new(i64::MAX - 1, i64::MAX, 0, 1),
            Region::new(i64::MIN, i64::MAX, i64::MIN, i64::MAX),
        ] {
            for bounds in [OutOfBounds::Stop, OutOfBounds::Skip] {
                let walk = Walker::new(seed, 3).with_bounds(bounds).finish(&img);

                assert_eq!(walk.regions[0], seed);
                assert_eq!(walk.state, WalkState::ShrinkExhausted);
            }
        }
    }

    #[test]
    fn test_paths_stay_inside_and_never_revisit() {
        let img = RgbaImage::from_fn(64, 48, |x, y| {
            Rgba([(x * 4) as u8, (y * 5) as u8, ((x * y) % 256) as u8, 255])
        });

        for bounds in [OutOfBounds::Stop, OutOfBounds::Skip] {
            for seed in [
                Region::new(0, 16, 0, 16),
                Region::new(16, 24, 8, 16),
                Region::new(30, 37, 20, 25),
            ] {
                let walk = Walker::new(seed, 40).with_bounds(bounds).finish(&img);

                assert!(walk
                    .regions
                    .iter()
                    .all(|r| r.within(64, 48) && !r.is_empty()));
                assert_unique_steps(&walk.regions);
            }
        }
    }

    #[test]
    fn test_empty_seed_ends_immediately() {
        let img = uniform(10, 10);
        let seed = Region::new(5, 5, 0, 4);

        let walk = Walker::new(seed, 3).finish(&img);

        assert_eq!(walk.regions, vec![seed]);
        assert_eq!(walk.state, WalkState::ShrinkExhausted);
    }

    #[test]
    fn test_seed_outside_the_image_does_not_panic() {
        let img = uniform(10, 10);
        let seed = Region::new(-20, -10, 50, 60);

        let walk = Walker::new(seed, 3).finish(&img);

        assert_eq!(walk.regions[0], seed);
        assert!(walk.state.is_done());
    }

    #[test]
    fn test_step_by_step() {
        let img = uniform(100, 100);
        let mut walker = Walker::new(Region::new(50, 60, 50, 60), 2);

        assert_eq!(walker.step(&img), WalkState::Walking);
        assert_eq!(walker.path().len(), 2);
        assert_eq!(walker.step(&img), WalkState::BudgetSpent);
        // further steps do nothing
        assert_eq!(walker.step(&img), WalkState::BudgetSpent);
        assert_eq!(walker.path().len(), 3);
        assert_eq!(walker.state(), WalkState::BudgetSpent);
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!("skip".parse::<OutOfBounds>().unwrap(), OutOfBounds::Skip);
        assert_eq!(OutOfBounds::default().to_string(), "stop");
        assert!("wrap".parse::<OutOfBounds>().is_err());
    }
}
