//! Detached, serialisable copies of station state.

use serde::{Deserialize, Serialize};

use crate::station::Station;

/// State of one platform at the time of the snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformSnapshot {
    /// Platform index.
    pub index: usize,
    /// Locomotive power, absent for an empty platform.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locomotive_power: Option<u32>,
    /// Car weights in train order.
    #[serde(default)]
    pub cars: Vec<u32>,
    /// Locomotive power minus total car weight.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load: Option<i64>,
}

impl PlatformSnapshot {
    /// Whether a train was stationed on the platform.
    pub fn is_occupied(&self) -> bool {
        self.locomotive_power.is_some()
    }

    /// Whether the train was overloaded.
    pub fn is_overloaded(&self) -> bool {
        self.load.map(|load| load < 0).unwrap_or(false)
    }

    /// Total weight of the cars.
    pub fn total_weight(&self) -> u64 {
        self.cars.iter().map(|&weight| u64::from(weight)).sum()
    }
}

/// Copy of every platform, in index order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StationSnapshot {
    /// Platforms in index order.
    pub platforms: Vec<PlatformSnapshot>,
}

impl StationSnapshot {
    /// Capture the current state of `station`.
    pub fn capture(station: &Station) -> Self {
        let platforms = station
            .platforms()
            .iter()
            .enumerate()
            .map(|(index, platform)| match platform.train() {
                Some(train) => {
                    let cars: Vec<u32> = station
                        .yard()
                        .cars(train.head())
                        .map(|id| station.yard().weight_of(id))
                        .collect();
                    let weight: i64 = cars.iter().map(|&w| i64::from(w)).sum();
                    PlatformSnapshot {
                        index,
                        locomotive_power: Some(train.locomotive_power()),
                        load: Some(i64::from(train.locomotive_power()) - weight),
                        cars,
                    }
                }
                None => PlatformSnapshot {
                    index,
                    locomotive_power: None,
                    cars: Vec::new(),
                    load: None,
                },
            })
            .collect();
        Self { platforms }
    }

    /// Total number of cars across all platforms.
    pub fn car_count(&self) -> usize {
        self.platforms.iter().map(|platform| platform.cars.len()).sum()
    }
}
