//! Line-oriented command language driving a station.
//!
//! One command per line, keyword first, integer arguments separated by
//! whitespace. `#` starts a comment and blank lines are ignored.

use std::{fmt, str::FromStr};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use thiserror::Error;

use crate::error::StationError;

/// A single station operation with its arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Command {
    /// Open a new station with the given number of platforms.
    Open {
        /// Number of platforms.
        platforms: usize,
    },
    /// Close the current station.
    Close,
    /// Render every platform.
    Show,
    /// A locomotive arrives on a platform.
    Arrive {
        /// Platform to occupy.
        platform: usize,
        /// Locomotive power.
        power: u32,
    },
    /// The train on a platform departs.
    Leave {
        /// Platform to clear.
        platform: usize,
    },
    /// Append a car.
    Add {
        /// Platform of the train.
        platform: usize,
        /// Weight of the new car.
        weight: u32,
    },
    /// Remove every car of a weight.
    Remove {
        /// Platform of the train.
        platform: usize,
        /// Weight to remove.
        weight: u32,
    },
    /// Move a run of cars between (or within) trains.
    Move {
        /// Source platform.
        from: usize,
        /// 1-based position of the first car moved.
        from_position: usize,
        /// Number of cars moved.
        count: usize,
        /// Destination platform.
        to: usize,
        /// 1-based car the run is placed after.
        to_position: usize,
    },
    /// Platform with the most spare power.
    Express,
    /// First overloaded platform.
    Overload,
    /// Platform with the least spare power.
    Optimal,
    /// Heaviest run of consecutive cars.
    Heaviest {
        /// Window length.
        count: usize,
    },
    /// Sort a train's cars by descending weight.
    Order {
        /// Platform of the train.
        platform: usize,
    },
    /// Remove one car from the first overloaded train.
    Fix,
}

/// Reasons a line could not be turned into a [`Command`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// Line does not have the shape `keyword [integer ...]`.
    #[error("malformed command line '{0}'")]
    Syntax(String),
    /// Keyword names no command.
    #[error("unknown command '{0}'")]
    UnknownKeyword(String),
    #[error("'{keyword}' takes {expected} argument(s), got {found}")]
    /// Wrong number of arguments.
    Arity {
        /// Command keyword.
        keyword: &'static str,
        /// Arguments the command takes.
        expected: usize,
        /// Arguments given.
        found: usize,
    },
    /// Argument value rejected.
    #[error(transparent)]
    Argument(#[from] StationError),
}

static LINE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<keyword>[A-Za-z_]+)(?P<args>(?:\s+-?\d+)*)$")
        .expect("failed to compile command line regex")
});

impl Command {
    /// Parse one script line. Blank lines and comments yield `None`.
    pub fn parse_line(line: &str) -> Result<Option<Self>, CommandError> {
        let content = line.split('#').next().unwrap_or_default().trim();
        if content.is_empty() {
            return Ok(None);
        }
        let captures = LINE_RE
            .captures(content)
            .ok_or_else(|| CommandError::Syntax(content.to_string()))?;
        let keyword = captures["keyword"].to_ascii_lowercase();
        let args = captures["args"]
            .split_whitespace()
            .map(|token| {
                token
                    .parse::<i64>()
                    .map_err(|_| CommandError::Syntax(content.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let command = match keyword.as_str() {
            "open" => {
                let [platforms] = arity::<1>("open", &args)?;
                Self::Open {
                    platforms: to_usize("platform count", platforms)?,
                }
            }
            "close" => {
                arity::<0>("close", &args)?;
                Self::Close
            }
            "show" => {
                arity::<0>("show", &args)?;
                Self::Show
            }
            "arrive" => {
                let [platform, power] = arity::<2>("arrive", &args)?;
                Self::Arrive {
                    platform: to_usize("platform", platform)?,
                    power: to_u32("locomotive power", power)?,
                }
            }
            "leave" => {
                let [platform] = arity::<1>("leave", &args)?;
                Self::Leave {
                    platform: to_usize("platform", platform)?,
                }
            }
            "add" => {
                let [platform, weight] = arity::<2>("add", &args)?;
                Self::Add {
                    platform: to_usize("platform", platform)?,
                    weight: to_u32("weight", weight)?,
                }
            }
            "remove" => {
                let [platform, weight] = arity::<2>("remove", &args)?;
                Self::Remove {
                    platform: to_usize("platform", platform)?,
                    weight: to_u32("weight", weight)?,
                }
            }
            "move" => {
                let [from, from_position, count, to, to_position] = arity::<5>("move", &args)?;
                Self::Move {
                    from: to_usize("platform", from)?,
                    from_position: to_usize("source position", from_position)?,
                    count: to_usize("car count", count)?,
                    to: to_usize("platform", to)?,
                    to_position: to_usize("destination position", to_position)?,
                }
            }
            "express" => {
                arity::<0>("express", &args)?;
                Self::Express
            }
            "overload" => {
                arity::<0>("overload", &args)?;
                Self::Overload
            }
            "optimal" => {
                arity::<0>("optimal", &args)?;
                Self::Optimal
            }
            "heaviest" => {
                let [count] = arity::<1>("heaviest", &args)?;
                Self::Heaviest {
                    count: to_usize("car count", count)?,
                }
            }
            "order" => {
                let [platform] = arity::<1>("order", &args)?;
                Self::Order {
                    platform: to_usize("platform", platform)?,
                }
            }
            "fix" => {
                arity::<0>("fix", &args)?;
                Self::Fix
            }
            _ => return Err(CommandError::UnknownKeyword(keyword)),
        };
        Ok(Some(command))
    }

    /// Whether the command leaves the station unchanged.
    pub fn is_query(&self) -> bool {
        matches!(
            self,
            Self::Show | Self::Express | Self::Overload | Self::Optimal | Self::Heaviest { .. }
        )
    }
}

fn arity<const N: usize>(keyword: &'static str, args: &[i64]) -> Result<[i64; N], CommandError> {
    <[i64; N]>::try_from(args).map_err(|_| CommandError::Arity {
        keyword,
        expected: N,
        found: args.len(),
    })
}

fn to_usize(name: &'static str, value: i64) -> Result<usize, StationError> {
    if value < 0 {
        return Err(StationError::invalid_argument(name, "must not be negative"));
    }
    usize::try_from(value).map_err(|_| StationError::invalid_argument(name, "too large"))
}

fn to_u32(name: &'static str, value: i64) -> Result<u32, StationError> {
    if value < 0 {
        return Err(StationError::invalid_argument(name, "must not be negative"));
    }
    u32::try_from(value).map_err(|_| StationError::invalid_argument(name, "too large"))
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_line(s)?.ok_or_else(|| CommandError::Syntax(s.trim().to_string()))
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open { platforms } => write!(f, "open {platforms}"),
            Self::Close => f.write_str("close"),
            Self::Show => f.write_str("show"),
            Self::Arrive { platform, power } => write!(f, "arrive {platform} {power}"),
            Self::Leave { platform } => write!(f, "leave {platform}"),
            Self::Add { platform, weight } => write!(f, "add {platform} {weight}"),
            Self::Remove { platform, weight } => write!(f, "remove {platform} {weight}"),
            Self::Move {
                from,
                from_position,
                count,
                to,
                to_position,
            } => write!(f, "move {from} {from_position} {count} {to} {to_position}"),
            Self::Express => f.write_str("express"),
            Self::Overload => f.write_str("overload"),
            Self::Optimal => f.write_str("optimal"),
            Self::Heaviest { count } => write!(f, "heaviest {count}"),
            Self::Order { platform } => write!(f, "order {platform}"),
            Self::Fix => f.write_str("fix"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn parses_every_keyword() {
        let cases = [
            ("open 3", Command::Open { platforms: 3 }),
            ("CLOSE", Command::Close),
            ("show", Command::Show),
            (
                "arrive 0 100",
                Command::Arrive {
                    platform: 0,
                    power: 100,
                },
            ),
            ("leave 2", Command::Leave { platform: 2 }),
            (
                "add 1 40",
                Command::Add {
                    platform: 1,
                    weight: 40,
                },
            ),
            (
                "remove 1 40",
                Command::Remove {
                    platform: 1,
                    weight: 40,
                },
            ),
            (
                "move 0 2 3 1 1",
                Command::Move {
                    from: 0,
                    from_position: 2,
                    count: 3,
                    to: 1,
                    to_position: 1,
                },
            ),
            ("express", Command::Express),
            ("overload", Command::Overload),
            ("optimal", Command::Optimal),
            ("heaviest 2", Command::Heaviest { count: 2 }),
            ("order 0", Command::Order { platform: 0 }),
            ("fix", Command::Fix),
        ];
        for (line, expected) in cases {
            let parsed: Command = line.parse().expect(line);
            assert_eq!(parsed, expected);
            assert_eq!(parsed.to_string(), line.to_ascii_lowercase());
        }
    }

    #[test]
    fn skips_blank_lines_and_comments() {
        assert_eq!(Command::parse_line("   "), Ok(None));
        assert_eq!(Command::parse_line("# arrivals"), Ok(None));
        assert_eq!(
            Command::parse_line("  add 0 5   # tanker"),
            Ok(Some(Command::Add {
                platform: 0,
                weight: 5
            }))
        );
    }

    #[test]
    fn rejects_negative_arguments() {
        let err = Command::parse_line("add 0 -5").unwrap_err();
        match err {
            CommandError::Argument(inner) => assert_eq!(inner.kind(), ErrorKind::InvalidArgument),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn reports_arity_and_unknown_keywords() {
        assert_eq!(
            Command::parse_line("arrive 1"),
            Err(CommandError::Arity {
                keyword: "arrive",
                expected: 2,
                found: 1
            })
        );
        assert_eq!(
            Command::parse_line("couple 1 2"),
            Err(CommandError::UnknownKeyword("couple".to_string()))
        );
        assert!(matches!(
            Command::parse_line("add zero 5"),
            Err(CommandError::Syntax(_))
        ));
    }

    #[test]
    fn serialises_with_operation_tag() -> anyhow::Result<()> {
        let value = serde_json::to_value(Command::Heaviest { count: 3 })?;
        assert_eq!(value, serde_json::json!({ "op": "heaviest", "count": 3 }));
        Ok(())
    }
}
