//! Plain-text rendering of station state.
//!
//! Each platform produces one line: `"<index>: \n"` when empty, otherwise
//! `"<index>: (<power>)"` followed by `"-|<weight>|"` per car. Consumers may
//! parse this output, so the format is fixed.

use std::{fmt, io};

use crate::station::Station;

/// Write one line per platform to `sink`.
pub fn render(station: &Station, sink: &mut impl io::Write) -> io::Result<()> {
    write!(sink, "{}", Rendered(station))
}

/// Render the whole station into a `String`.
pub fn render_to_string(station: &Station) -> String {
    Rendered(station).to_string()
}

/// Format a single platform line without its trailing newline.
pub fn platform_line(station: &Station, index: usize) -> String {
    let mut line = format!("{index}: ");
    if let Some(Some(train)) = station.platforms().get(index).map(|p| p.train()) {
        line.push_str(&format!("({})", train.locomotive_power()));
        for car in station.yard().cars(train.head()) {
            line.push_str(&format!("-|{}|", station.yard().weight_of(car)));
        }
    }
    line
}

struct Rendered<'a>(&'a Station);

impl fmt::Display for Rendered<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for index in 0..self.0.platform_count() {
            writeln!(f, "{}", platform_line(self.0, index))?;
        }
        Ok(())
    }
}
