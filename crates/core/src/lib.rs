#![warn(clippy::all, missing_docs)]

//! Core composition engine for a fixed-capacity train station.
//!
//! A [`Station`] holds a fixed number of platforms, each stationing at most
//! one train: a locomotive followed by an ordered sequence of cars. The
//! engine arrives and departs trains, couples and uncouples cars, splices
//! runs of cars between trains, searches trains by load and sorts or repairs
//! them. Around it sit the command language, console, journal and
//! configuration used by the terminal frontend.

pub mod command;
pub mod config;
pub mod console;
pub mod error;
pub mod journal;
pub mod render;
pub mod script;
pub mod shared;
pub mod snapshot;
pub mod station;
pub mod yard;

pub use command::{Command, CommandError};
pub use crate::config::AppConfig;
pub use console::{Console, Outcome};
pub use error::{ErrorKind, StationError};
pub use journal::{Journal, JournalEntry};
pub use script::Script;
pub use shared::SharedConsole;
pub use snapshot::{PlatformSnapshot, StationSnapshot};
pub use station::{HeaviestRun, Platform, Repair, Station, Train};
pub use yard::{CarId, CarYard};
