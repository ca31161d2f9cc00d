//! Read-only searches across every platform.
//!
//! The load of a train is its locomotive power minus the total weight of its
//! cars. A negative load means the train is overloaded.

use serde::Serialize;

use super::Station;
use crate::yard::CarId;

/// Heaviest window of consecutive cars found by [`Station::find_heaviest_run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HeaviestRun {
    /// Platform holding the window.
    pub platform: usize,
    /// 1-based position of the first car of the window.
    pub position: usize,
    /// Handle of the first car of the window.
    pub first_car: CarId,
    /// Combined weight of the window.
    pub weight: u64,
}

impl Station {
    /// Platform whose train has the most spare power.
    ///
    /// Empty platforms count as a load of zero and the scan starts from
    /// platform 0 with load 0, so only a strictly positive load can win and
    /// ties keep the lowest index.
    pub fn find_express_train(&self) -> usize {
        let mut best = (0, 0_i64);
        for (index, platform) in self.platforms.iter().enumerate() {
            let load = platform
                .train
                .map(|train| self.train_load(&train))
                .unwrap_or(0);
            if load > best.1 {
                best = (index, load);
            }
        }
        best.0
    }

    /// Lowest-index platform whose train is overloaded.
    pub fn find_overloaded_train(&self) -> Option<usize> {
        self.platforms.iter().enumerate().find_map(|(index, platform)| {
            platform
                .train
                .filter(|train| self.train_load(train) < 0)
                .map(|_| index)
        })
    }

    /// Platform whose train has the least spare power (possibly negative).
    ///
    /// Empty platforms are skipped. With no train in the station the result
    /// is platform 0.
    pub fn find_optimal_train(&self) -> usize {
        let mut best: Option<(usize, i64)> = None;
        for (index, platform) in self.platforms.iter().enumerate() {
            let Some(train) = platform.train else {
                continue;
            };
            let load = self.train_load(&train);
            if best.map_or(true, |(_, min)| load < min) {
                best = Some((index, load));
            }
        }
        best.map_or(0, |(index, _)| index)
    }

    /// Heaviest run of `count` consecutive cars over all platforms.
    ///
    /// Only trains with at least `count` cars are scanned. A window must
    /// weigh more than zero to win; ties keep the earliest window found.
    pub fn find_heaviest_run(&self, count: usize) -> Option<HeaviestRun> {
        if count == 0 {
            return None;
        }
        let mut best: Option<HeaviestRun> = None;
        for (index, platform) in self.platforms.iter().enumerate() {
            let Some(train) = platform.train else {
                continue;
            };
            let cars: Vec<(CarId, u64)> = self
                .yard
                .cars(train.head)
                .map(|id| (id, u64::from(self.yard.weight_of(id))))
                .collect();
            for (offset, window) in cars.windows(count).enumerate() {
                let weight: u64 = window.iter().map(|(_, weight)| weight).sum();
                if weight > best.map_or(0, |run| run.weight) {
                    best = Some(HeaviestRun {
                        platform: index,
                        position: offset + 1,
                        first_car: window[0].0,
                        weight,
                    });
                }
            }
        }
        best
    }
}
