//! Executes commands against an optional open station.

use std::fmt;

use tracing::{info, warn};

use crate::{
    command::{Command, CommandError},
    error::StationError,
    journal::Journal,
    render,
    snapshot::StationSnapshot,
    station::{HeaviestRun, Repair, Station},
};

/// Result of a successfully executed [`Command`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A station was opened.
    Opened {
        /// Number of platforms opened.
        platforms: usize,
    },
    /// The station was closed, releasing `released` cars.
    Closed {
        /// Cars released on close.
        released: usize,
    },
    /// Rendered station text, one line per platform.
    Rendered(String),
    /// Platform index answered by a query; `None` when nothing matched.
    Platform(Option<usize>),
    /// Heaviest run query answer.
    HeaviestRun(Option<HeaviestRun>),
    /// Number of cars removed or released.
    Removed(usize),
    /// Car removed by an overload repair.
    Repaired(Repair),
    /// Mutation applied with nothing to report.
    Done,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Opened { platforms } => write!(f, "opened station with {platforms} platforms"),
            Self::Closed { released } => write!(f, "station closed, {released} cars released"),
            Self::Rendered(text) => f.write_str(text.trim_end_matches('\n')),
            Self::Platform(Some(index)) => write!(f, "{index}"),
            Self::Platform(None) | Self::HeaviestRun(None) => f.write_str("-1"),
            Self::HeaviestRun(Some(run)) => write!(
                f,
                "{} (from car {}, weight {})",
                run.platform, run.position, run.weight
            ),
            Self::Removed(count) => write!(f, "{count} cars removed"),
            Self::Repaired(repair) => write!(
                f,
                "removed car {} (weight {}) from platform {}, load now {}",
                repair.position, repair.weight, repair.platform, repair.load
            ),
            Self::Done => f.write_str("ok"),
        }
    }
}

/// Owns the station being driven and the journal of what was done to it.
#[derive(Debug)]
pub struct Console {
    station: Option<Station>,
    journal: Journal,
}

impl Console {
    /// Console with no station open.
    pub fn new(journal_capacity: usize) -> Self {
        Self {
            station: None,
            journal: Journal::new(journal_capacity),
        }
    }

    /// Console driving an already opened station.
    pub fn with_station(station: Station, journal_capacity: usize) -> Self {
        Self {
            station: Some(station),
            journal: Journal::new(journal_capacity),
        }
    }

    /// Currently open station.
    pub fn station(&self) -> Option<&Station> {
        self.station.as_ref()
    }

    /// History of executed commands.
    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    /// Snapshot of the open station, if any.
    pub fn snapshot(&self) -> Option<StationSnapshot> {
        self.station.as_ref().map(StationSnapshot::capture)
    }

    /// Parse and execute one line. Blank lines and comments return `None`
    /// and are not journaled.
    pub fn execute_line(&mut self, line: &str) -> Result<Option<Outcome>, CommandError> {
        match Command::parse_line(line) {
            Ok(Some(command)) => Ok(Some(self.execute(&command)?)),
            Ok(None) => Ok(None),
            Err(err) => {
                warn!(line = line.trim(), %err, "command rejected");
                self.journal.record(line.trim(), err.to_string(), false);
                Err(err)
            }
        }
    }

    /// Execute a parsed command and journal the result.
    pub fn execute(&mut self, command: &Command) -> Result<Outcome, StationError> {
        let result = self.apply(command);
        match &result {
            Ok(outcome) => {
                info!(command = %command, "command executed");
                let summary = match outcome {
                    Outcome::Rendered(_) => "rendered".to_string(),
                    other => other.to_string(),
                };
                self.journal.record(command.to_string(), summary, true);
            }
            Err(err) => {
                warn!(command = %command, %err, kind = ?err.kind(), "command rejected");
                self.journal.record(command.to_string(), err.to_string(), false);
            }
        }
        result
    }

    fn station_mut(&mut self) -> Result<&mut Station, StationError> {
        self.station.as_mut().ok_or(StationError::NoStation)
    }

    fn station_ref(&self) -> Result<&Station, StationError> {
        self.station.as_ref().ok_or(StationError::NoStation)
    }

    fn apply(&mut self, command: &Command) -> Result<Outcome, StationError> {
        let outcome = match *command {
            Command::Open { platforms } => {
                let station = Station::open(platforms)?;
                if let Some(previous) = self.station.replace(station) {
                    previous.close();
                }
                Outcome::Opened { platforms }
            }
            Command::Close => {
                let station = self.station.take().ok_or(StationError::NoStation)?;
                Outcome::Closed {
                    released: station.close(),
                }
            }
            Command::Show => Outcome::Rendered(render::render_to_string(self.station_ref()?)),
            Command::Arrive { platform, power } => {
                self.station_mut()?.arrive(platform, power)?;
                Outcome::Done
            }
            Command::Leave { platform } => Outcome::Removed(self.station_mut()?.depart(platform)?),
            Command::Add { platform, weight } => {
                self.station_mut()?.append_car(platform, weight)?;
                Outcome::Done
            }
            Command::Remove { platform, weight } => {
                Outcome::Removed(self.station_mut()?.remove_cars(platform, weight)?)
            }
            Command::Move {
                from,
                from_position,
                count,
                to,
                to_position,
            } => {
                self.station_mut()?
                    .move_cars(from, from_position, count, to, to_position)?;
                Outcome::Done
            }
            Command::Express => Outcome::Platform(Some(self.station_ref()?.find_express_train())),
            Command::Overload => Outcome::Platform(self.station_ref()?.find_overloaded_train()),
            Command::Optimal => Outcome::Platform(Some(self.station_ref()?.find_optimal_train())),
            Command::Heaviest { count } => {
                Outcome::HeaviestRun(self.station_ref()?.find_heaviest_run(count))
            }
            Command::Order { platform } => {
                self.station_mut()?.sort_descending(platform)?;
                Outcome::Done
            }
            Command::Fix => Outcome::Repaired(self.station_mut()?.fix_overload()?),
        };
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(console: &mut Console, lines: &[&str]) {
        for line in lines {
            console.execute_line(line).expect(line);
        }
    }

    #[test]
    fn drives_a_station_end_to_end() {
        let mut console = Console::new(32);
        run(
            &mut console,
            &["open 2", "arrive 0 100", "add 0 30", "add 0 40", "add 0 50"],
        );
        assert_eq!(
            console.execute_line("overload"),
            Ok(Some(Outcome::Platform(Some(0))))
        );
        let shown = console.execute_line("show").expect("show").expect("outcome");
        assert_eq!(shown.to_string(), "0: (100)-|30|-|40|-|50|\n1: ");
        assert_eq!(console.journal().len(), 7);
    }

    #[test]
    fn commands_need_an_open_station() {
        let mut console = Console::new(8);
        assert_eq!(
            console.execute(&Command::Show),
            Err(StationError::NoStation)
        );
        assert_eq!(console.execute(&Command::Close), Err(StationError::NoStation));
        assert_eq!(console.journal().failures(), 2);
    }

    #[test]
    fn failed_open_keeps_current_station() {
        let mut console = Console::new(8);
        run(&mut console, &["open 1", "arrive 0 5"]);
        assert_eq!(
            console.execute(&Command::Open { platforms: 0 }),
            Err(StationError::InvalidConstruction)
        );
        let snapshot = console.snapshot().expect("station");
        assert_eq!(snapshot.platforms[0].locomotive_power, Some(5));
    }

    #[test]
    fn reopening_replaces_the_station() {
        let mut console = Console::new(8);
        run(&mut console, &["open 1", "arrive 0 5", "add 0 1", "open 3"]);
        let snapshot = console.snapshot().expect("station");
        assert_eq!(snapshot.platforms.len(), 3);
        assert_eq!(snapshot.car_count(), 0);
    }

    #[test]
    fn parse_errors_are_journaled() {
        let mut console = Console::new(8);
        assert!(console.execute_line("arrive 0").is_err());
        assert_eq!(console.execute_line("# nothing"), Ok(None));
        let last = console.journal().last().expect("entry");
        assert_eq!(last.command, "arrive 0");
        assert!(!last.ok);
    }

    #[test]
    fn empty_query_answers_print_minus_one() {
        assert_eq!(Outcome::Platform(None).to_string(), "-1");
        assert_eq!(Outcome::HeaviestRun(None).to_string(), "-1");
        assert_eq!(
            Outcome::Closed { released: 3 }.to_string(),
            "station closed, 3 cars released"
        );
    }
}
