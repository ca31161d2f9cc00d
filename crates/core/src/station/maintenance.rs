//! Sorting and overload repair.

use serde::Serialize;
use tracing::debug;

use super::Station;
use crate::error::{Result, StationError};

/// Car removed by [`Station::fix_overload`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Repair {
    /// Platform of the repaired train.
    pub platform: usize,
    /// 1-based position the car occupied.
    pub position: usize,
    /// Weight of the removed car.
    pub weight: u32,
    /// Load of the train after the removal; may still be negative.
    pub load: i64,
}

impl Station {
    /// Order the cars at `platform` by non-increasing weight.
    ///
    /// Adjacent cars are swapped by relinking, pass after pass, until a pass
    /// makes no swap. Equal weights are never swapped, so the order among
    /// them is kept.
    pub fn sort_descending(&mut self, platform: usize) -> Result<()> {
        let train = self.train(platform)?;
        let cars = self.yard.cars(train.head).count();
        let mut passes = 0;
        for pass in 0..cars {
            passes = pass + 1;
            let mut swapped = false;
            let mut prev = train.head;
            for _ in 0..cars - pass - 1 {
                let Some(first) = self.yard.link(prev) else {
                    break;
                };
                let Some(second) = self.yard.link(first) else {
                    break;
                };
                if self.yard.weight_of(first) < self.yard.weight_of(second) {
                    let after = self.yard.link(second);
                    self.yard.set_next(first, after);
                    self.yard.set_next(second, Some(first));
                    self.yard.set_next(prev, Some(second));
                    swapped = true;
                    prev = second;
                } else {
                    prev = first;
                }
            }
            if !swapped {
                break;
            }
        }
        debug!(platform, cars, passes, "train sorted");
        Ok(())
    }

    /// Uncouple one car from the first overloaded train.
    ///
    /// The car chosen is the one whose removal leaves the smallest total
    /// weight that is still at least the locomotive power, earliest first.
    /// When no single car qualifies the first car is removed. The train is
    /// not guaranteed to be within capacity afterwards.
    pub fn fix_overload(&mut self) -> Result<Repair> {
        let platform = self
            .find_overloaded_train()
            .ok_or_else(|| StationError::NothingToDo("no train is overloaded".to_string()))?;
        let train = self.train(platform)?;
        let power = i64::from(train.locomotive_power);
        let total = self.total_weight(train.head);
        if total == power {
            return Err(StationError::NothingToDo(format!(
                "platform {platform} is exactly at capacity"
            )));
        }

        let mut position = 1;
        let mut closest: Option<i64> = None;
        for (offset, id) in self.yard.cars(train.head).enumerate() {
            let remaining = total - i64::from(self.yard.weight_of(id));
            if remaining >= power && closest.map_or(true, |best| remaining < best) {
                closest = Some(remaining);
                position = offset + 1;
            }
        }

        let no_cars = || StationError::NothingToDo(format!("platform {platform} has no cars"));
        let before = self
            .yard
            .nth(train.head, position - 1)
            .ok_or_else(no_cars)?;
        let car = self.yard.link(before).ok_or_else(no_cars)?;
        let weight = self.yard.weight_of(car);
        let after = self.yard.link(car);
        self.yard.set_next(before, after);
        self.yard.release(car);

        let load = self.train_load(&train);
        debug!(platform, position, weight, load, "overload repaired");
        Ok(Repair {
            platform,
            position,
            weight,
            load,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn single_train(power: u32, cars: &[u32]) -> Result<Station> {
        let mut station = Station::open(1)?;
        station.arrive(0, power)?;
        for &weight in cars {
            station.append_car(0, weight)?;
        }
        Ok(station)
    }

    #[test]
    fn sorts_heaviest_first() -> Result<()> {
        let mut station = single_train(10, &[2, 9, 4, 9, 1, 7])?;
        station.sort_descending(0)?;
        assert_eq!(station.car_weights(0)?, vec![9, 9, 7, 4, 2, 1]);
        Ok(())
    }

    #[test]
    fn sort_is_stable_for_equal_weights() -> Result<()> {
        let mut station = single_train(10, &[5, 3, 5])?;
        let cars: Vec<_> = station.yard().cars(station.train(0)?.head()).collect();
        station.sort_descending(0)?;
        assert_eq!(station.car_weights(0)?, vec![5, 5, 3]);
        let sorted: Vec<_> = station.yard().cars(station.train(0)?.head()).collect();
        assert_eq!(sorted, vec![cars[0], cars[2], cars[1]]);
        Ok(())
    }

    #[test]
    fn sort_is_idempotent() -> Result<()> {
        let mut station = single_train(10, &[1, 8, 3, 8, 0])?;
        station.sort_descending(0)?;
        let once = station.car_weights(0)?;
        station.sort_descending(0)?;
        assert_eq!(station.car_weights(0)?, once);
        Ok(())
    }

    #[test]
    fn sort_handles_short_trains() -> Result<()> {
        let mut station = single_train(10, &[])?;
        station.sort_descending(0)?;
        assert!(station.car_weights(0)?.is_empty());
        station.append_car(0, 4)?;
        station.sort_descending(0)?;
        assert_eq!(station.car_weights(0)?, vec![4]);
        Ok(())
    }

    #[test]
    fn sort_needs_a_train() {
        let mut station = Station::open(2).expect("station");
        assert_eq!(
            station.sort_descending(1),
            Err(StationError::TrainAbsent { platform: 1 })
        );
    }

    #[test]
    fn fix_removes_closest_car_above_power() -> Result<()> {
        let mut station = single_train(100, &[30, 10, 25, 40, 10])?;
        // total 115: removing 10 leaves 105, removing 25 leaves 90
        let repair = station.fix_overload()?;
        assert_eq!(repair.position, 2);
        assert_eq!(repair.weight, 10);
        assert_eq!(repair.load, -5);
        assert_eq!(station.car_weights(0)?, vec![30, 25, 40, 10]);
        Ok(())
    }

    #[test]
    fn fix_falls_back_to_first_car() -> Result<()> {
        let mut station = single_train(100, &[30, 40, 50])?;
        let repair = station.fix_overload()?;
        assert_eq!((repair.position, repair.weight), (1, 30));
        assert_eq!(station.car_weights(0)?, vec![40, 50]);
        assert_eq!(station.find_overloaded_train(), None);
        Ok(())
    }

    #[test]
    fn fix_targets_first_overloaded_platform() -> Result<()> {
        let mut station = Station::open(3)?;
        station.arrive(0, 50)?;
        station.append_car(0, 20)?;
        for platform in [1, 2] {
            station.arrive(platform, 10)?;
            station.append_car(platform, 8)?;
            station.append_car(platform, 8)?;
        }
        let repair = station.fix_overload()?;
        assert_eq!(repair.platform, 1);
        assert_eq!(station.car_weights(1)?, vec![8]);
        assert_eq!(station.car_weights(2)?, vec![8, 8]);
        Ok(())
    }

    #[test]
    fn fix_without_overload_is_nothing_to_do() -> Result<()> {
        let mut station = single_train(100, &[50, 50])?;
        let err = station.fix_overload().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NothingToDo);
        assert_eq!(station.car_weights(0)?, vec![50, 50]);
        Ok(())
    }
}
