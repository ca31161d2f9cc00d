//! Fixed-capacity station and its per-platform trains.
//!
//! Operations are grouped the way callers use them:
//! [`composition`] rearranges cars, [`query`] searches without mutating and
//! [`maintenance`] sorts and repairs trains.

pub mod composition;
pub mod maintenance;
pub mod query;

use tracing::debug;

use crate::{
    error::{Result, StationError},
    yard::{CarId, CarYard},
};

pub use maintenance::Repair;
pub use query::HeaviestRun;

/// A locomotive and the sentinel heading its car sequence.
#[derive(Debug, Clone, Copy)]
pub struct Train {
    locomotive_power: u32,
    head: CarId,
}

impl Train {
    /// Traction power of the locomotive.
    pub fn locomotive_power(&self) -> u32 {
        self.locomotive_power
    }

    /// Sentinel node preceding the first real car.
    pub fn head(&self) -> CarId {
        self.head
    }
}

/// One slot of the station. Holds at most one train.
#[derive(Debug, Default, Clone)]
pub struct Platform {
    train: Option<Train>,
}

impl Platform {
    /// Train stationed here, if any.
    pub fn train(&self) -> Option<&Train> {
        self.train.as_ref()
    }

    /// Whether a train is stationed here.
    pub fn is_occupied(&self) -> bool {
        self.train.is_some()
    }
}

/// In-memory station: a fixed array of platforms sharing one car yard.
#[derive(Debug)]
pub struct Station {
    platforms: Box<[Platform]>,
    yard: CarYard,
}

impl Station {
    /// Open a station with `platforms` empty platforms.
    pub fn open(platforms: usize) -> Result<Self> {
        if platforms == 0 {
            return Err(StationError::InvalidConstruction);
        }
        debug!(platforms, "station opened");
        Ok(Self {
            platforms: vec![Platform::default(); platforms].into_boxed_slice(),
            yard: CarYard::new(),
        })
    }

    /// Tear the station down, returning how many real cars were released.
    pub fn close(mut self) -> usize {
        let mut released = 0;
        for index in 0..self.platforms.len() {
            if let Some(train) = self.platforms[index].train.take() {
                released += self.yard.release_chain(train.head);
            }
        }
        debug!(released, "station closed");
        released
    }

    /// Number of platforms, fixed at construction.
    pub fn platform_count(&self) -> usize {
        self.platforms.len()
    }

    /// All platforms in index order.
    pub fn platforms(&self) -> &[Platform] {
        &self.platforms
    }

    /// Platform at `index`.
    pub fn platform(&self, index: usize) -> Result<&Platform> {
        self.platforms.get(index).ok_or(StationError::InvalidIndex {
            index,
            platforms: self.platforms.len(),
        })
    }

    /// Arena storing every car of the station.
    pub fn yard(&self) -> &CarYard {
        &self.yard
    }

    /// Train at `index`, failing when the index is invalid or the platform is empty.
    pub fn train(&self, index: usize) -> Result<Train> {
        self.platform(index)?
            .train
            .ok_or(StationError::TrainAbsent { platform: index })
    }

    /// Weights of the real cars at `index`, in train order. Empty when no
    /// train is stationed there.
    pub fn car_weights(&self, index: usize) -> Result<Vec<u32>> {
        Ok(match self.platform(index)?.train {
            Some(train) => self.weights(train.head),
            None => Vec::new(),
        })
    }

    /// Number of real cars of the train at `index`.
    pub fn car_count(&self, index: usize) -> Result<usize> {
        let train = self.train(index)?;
        Ok(self.yard.cars(train.head).count())
    }

    /// Locomotive power minus total car weight, or `None` without a train.
    pub fn load(&self, index: usize) -> Result<Option<i64>> {
        Ok(self.platform(index)?.train.map(|train| self.train_load(&train)))
    }

    pub(crate) fn weights(&self, head: CarId) -> Vec<u32> {
        self.yard.cars(head).map(|id| self.yard.weight_of(id)).collect()
    }

    pub(crate) fn total_weight(&self, head: CarId) -> i64 {
        self.yard
            .cars(head)
            .map(|id| i64::from(self.yard.weight_of(id)))
            .sum()
    }

    pub(crate) fn train_load(&self, train: &Train) -> i64 {
        i64::from(train.locomotive_power) - self.total_weight(train.head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_station() {
        assert_eq!(
            Station::open(0).unwrap_err(),
            StationError::InvalidConstruction
        );
    }

    #[test]
    fn new_platforms_are_empty() -> Result<()> {
        let station = Station::open(5)?;
        assert_eq!(station.platform_count(), 5);
        for index in 0..5 {
            assert!(!station.platform(index)?.is_occupied());
            assert_eq!(station.load(index)?, None);
        }
        assert!(matches!(
            station.platform(5),
            Err(StationError::InvalidIndex {
                index: 5,
                platforms: 5
            })
        ));
        Ok(())
    }

    #[test]
    fn close_releases_every_car() -> Result<()> {
        let mut station = Station::open(3)?;
        station.arrive(0, 100)?;
        station.arrive(2, 40)?;
        for weight in [10, 20, 30] {
            station.append_car(0, weight)?;
        }
        station.append_car(2, 5)?;
        assert_eq!(station.yard().live(), 4);
        assert_eq!(station.close(), 4);
        Ok(())
    }
}
