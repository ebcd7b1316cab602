use crate::ai::racing_line::{CornerType, RacingLine, RacingLinePoint};
use crate::core::track::SafeZone;
use anyhow::Context;
use helpers::geometry::Vec2;
use serde::Deserialize;
use std::fs::OpenOptions;
use std::io::Read;
use std::path::Path;

/// One row of a racing line CSV file.
#[derive(Debug, Deserialize)]
struct CsvRacingLineEl {
    x: f64,
    y: f64,
    target_speed: f64,
    brake_zone: bool,
    corner_type: CornerType,
    safe_zone: SafeZone,
}

/// read_racing_line reads a racing line from a CSV file with the columns
/// x, y, target_speed, brake_zone, corner_type, safe_zone.
pub fn read_racing_line(filepath: &Path) -> anyhow::Result<RacingLine> {
    let fh = OpenOptions::new()
        .read(true)
        .open(filepath)
        .context(format!(
            "Failed to open racing line file {}!",
            filepath.display()
        ))?;
    parse_racing_line(fh).context(format!(
        "Failed to parse racing line file {}!",
        filepath.display()
    ))
}

pub fn parse_racing_line<R: Read>(reader: R) -> anyhow::Result<RacingLine> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut points = Vec::new();

    for (row, result) in csv_reader.deserialize().enumerate() {
        let el: CsvRacingLineEl = result.context(format!("Invalid racing line row {}!", row))?;
        points.push(RacingLinePoint {
            pos: Vec2::new(el.x, el.y),
            target_speed: el.target_speed,
            brake_zone: el.brake_zone,
            corner_type: el.corner_type,
            safe_zone: el.safe_zone,
        });
    }

    Ok(RacingLine::new(points)?)
}
