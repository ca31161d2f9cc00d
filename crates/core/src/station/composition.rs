//! Arrival, departure and car-level rearrangement.

use tracing::debug;

use super::{Station, Train};
use crate::{
    error::{Result, StationError},
    yard::CarId,
};

impl Station {
    /// Station a locomotive with no cars at `platform`.
    pub fn arrive(&mut self, platform: usize, locomotive_power: u32) -> Result<()> {
        if self.platform(platform)?.is_occupied() {
            return Err(StationError::PlatformOccupied { platform });
        }
        let head = self.yard.sentinel();
        self.platforms[platform].train = Some(Train {
            locomotive_power,
            head,
        });
        debug!(platform, locomotive_power, "train arrived");
        Ok(())
    }

    /// Send the train at `platform` away, releasing all of its cars.
    pub fn depart(&mut self, platform: usize) -> Result<usize> {
        let train = self.train(platform)?;
        self.platforms[platform].train = None;
        let released = self.yard.release_chain(train.head);
        debug!(platform, released, "train departed");
        Ok(released)
    }

    /// Couple a new car of `weight` behind the last car at `platform`.
    pub fn append_car(&mut self, platform: usize, weight: u32) -> Result<CarId> {
        let train = self.train(platform)?;
        let last = self.yard.tail(train.head);
        let car = self.yard.car(weight);
        self.yard.set_next(last, Some(car));
        debug!(platform, weight, "car appended");
        Ok(car)
    }

    /// Remove every car of exactly `weight`, keeping the others in order.
    /// Returns how many were removed; zero is not an error.
    pub fn remove_cars(&mut self, platform: usize, weight: u32) -> Result<usize> {
        let train = self.train(platform)?;
        let mut removed = 0;
        let mut prev = train.head;
        while let Some(current) = self.yard.link(prev) {
            if self.yard.weight_of(current) == weight {
                let after = self.yard.link(current);
                self.yard.set_next(prev, after);
                self.yard.release(current);
                removed += 1;
            } else {
                prev = current;
            }
        }
        debug!(platform, weight, removed, "cars removed");
        Ok(removed)
    }

    /// Move `count` cars starting at 1-based `from_position` on `from` so
    /// they directly follow car `to_position` on `to`.
    ///
    /// The run keeps its internal order and no car is reallocated. Every
    /// bound is checked before any link changes, so a rejected move leaves
    /// both trains untouched. On a single platform the destination may not
    /// fall inside the run itself.
    ///
    /// `to_position` names an existing car, so a run can never be placed in
    /// front of the first car or onto a train that has no cars.
    pub fn move_cars(
        &mut self,
        from: usize,
        from_position: usize,
        count: usize,
        to: usize,
        to_position: usize,
    ) -> Result<()> {
        let source = self.train(from)?;
        let target = self.train(to)?;
        if from_position == 0 {
            return Err(StationError::invalid_argument(
                "source position",
                "positions start at 1",
            ));
        }
        if to_position == 0 {
            return Err(StationError::invalid_argument(
                "destination position",
                "positions start at 1",
            ));
        }
        if count == 0 {
            return Err(StationError::invalid_argument(
                "car count",
                "at least one car must move",
            ));
        }

        let source_cars = self.yard.cars(source.head).count();
        if from_position > source_cars {
            return Err(StationError::RangeOutOfBounds {
                what: "source position",
                platform: from,
                requested: from_position,
                cars: source_cars,
            });
        }
        let last = from_position.saturating_add(count - 1);
        if last > source_cars {
            return Err(StationError::RangeOutOfBounds {
                what: "run end",
                platform: from,
                requested: last,
                cars: source_cars,
            });
        }
        let target_cars = self.yard.cars(target.head).count();
        if to_position > target_cars {
            return Err(StationError::RangeOutOfBounds {
                what: "destination position",
                platform: to,
                requested: to_position,
                cars: target_cars,
            });
        }
        if from == to && (from_position..=last).contains(&to_position) {
            return Err(StationError::OverlappingMove {
                platform: from,
                first: from_position,
                last,
                destination: to_position,
            });
        }

        let out_of_range = |what, platform, requested, cars| StationError::RangeOutOfBounds {
            what,
            platform,
            requested,
            cars,
        };
        let before_run = self
            .yard
            .nth(source.head, from_position - 1)
            .ok_or_else(|| out_of_range("source position", from, from_position, source_cars))?;
        let run_end = self
            .yard
            .nth(source.head, last)
            .ok_or_else(|| out_of_range("run end", from, last, source_cars))?;
        let anchor = self
            .yard
            .nth(target.head, to_position)
            .ok_or_else(|| out_of_range("destination position", to, to_position, target_cars))?;

        let run_start = self.yard.link(before_run);
        let after_run = self.yard.link(run_end);
        self.yard.set_next(before_run, after_run);
        let after_anchor = self.yard.link(anchor);
        self.yard.set_next(run_end, after_anchor);
        self.yard.set_next(anchor, run_start);

        debug!(from, from_position, count, to, to_position, "cars moved");
        Ok(())
    }
}
