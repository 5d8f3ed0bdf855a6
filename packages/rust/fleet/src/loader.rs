//! Fleet CSV loader and filter.
//!
//! The table starts with one free-text metadata line, then a header row, then
//! one row per unit. Columns are read by position:
//!
//! | # | column              | # | column            |
//! |---|---------------------|---|-------------------|
//! | 0 | country             | 8 | first criticality |
//! | 1 | unit name           | 9 | first grid        |
//! | 2 | reactor type        | 10| commercial date   |
//! | 3 | net capacity (MWe)  | 11| shutdown date     |
//! | 4 | status              | 12| load factor       |
//! | 5 | operator            | 13| latitude          |
//! | 6 | construction date   | 14| longitude         |
//! | 7 | construction year   |   |                   |

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use cyclusgen_shared::{Coordinates, CyclusGenError, FilterConfig, ReactorRecord, Result};
use tracing::{debug, info, instrument, warn};

use crate::date::parse_date;

const COL_COUNTRY: usize = 0;
const COL_NAME: usize = 1;
const COL_TYPE: usize = 2;
const COL_CAPACITY: usize = 3;
const COL_STATUS: usize = 4;
const COL_COMMERCIAL: usize = 10;
const COL_SHUTDOWN: usize = 11;
const COL_LATITUDE: usize = 13;
const COL_LONGITUDE: usize = 14;

/// Source line number of the first data row (metadata line, then header).
const FIRST_DATA_LINE: usize = 3;

/// Load and filter the fleet table at `path`.
pub fn load_fleet(path: &Path, filter: &FilterConfig) -> Result<Vec<ReactorRecord>> {
    let file = File::open(path).map_err(|e| CyclusGenError::io(path, e))?;
    load_fleet_from_reader(file, filter)
}

/// Load and filter a fleet table from any reader.
///
/// Rows come back in source order. Fails with a configuration error if a
/// requested country has no rows at all in the source; a country whose rows
/// were all filtered out is simply absent from the result.
#[instrument(skip_all, fields(countries = filter.countries.len()))]
pub fn load_fleet_from_reader<R: Read>(reader: R, filter: &FilterConfig) -> Result<Vec<ReactorRecord>> {
    let mut buffered = BufReader::new(reader);

    let mut metadata = String::new();
    buffered
        .read_line(&mut metadata)
        .map_err(|e| CyclusGenError::io("<fleet table>", e))?;
    debug!(metadata = %metadata.trim(), "skipped metadata line");

    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(buffered);

    let requested: HashSet<&str> = filter.countries.iter().map(String::as_str).collect();
    let mut seen: HashSet<String> = HashSet::new();
    let mut records = Vec::new();
    let mut total_rows = 0usize;

    for (i, row) in csv_reader.records().enumerate() {
        let row = row?;
        let line = FIRST_DATA_LINE + i;
        total_rows += 1;

        let country = field(&row, COL_COUNTRY);
        if !requested.contains(country) {
            continue;
        }
        seen.insert(country.to_string());

        if let Some(record) = filter_row(&row, filter).map_err(|e| e.at_row(line))? {
            records.push(record);
        }
    }

    let missing: Vec<&str> = filter
        .countries
        .iter()
        .map(String::as_str)
        .filter(|c| !seen.contains(*c))
        .collect();
    if !missing.is_empty() {
        return Err(CyclusGenError::config(format!(
            "no rows in the fleet table for requested countries: {}",
            missing.join(", ")
        )));
    }

    info!(total_rows, kept = records.len(), "fleet table loaded");
    Ok(records)
}

/// Apply the status and capacity filters to one row of a requested country,
/// then normalize it. `Ok(None)` means the row was filtered out.
fn filter_row(row: &csv::StringRecord, filter: &FilterConfig) -> Result<Option<ReactorRecord>> {
    let raw_name = field(row, COL_NAME);

    let status = field(row, COL_STATUS).to_lowercase();
    if let Some(marker) = filter
        .exclude_status
        .iter()
        .find(|m| status.contains(m.as_str()))
    {
        debug!(unit = raw_name, %status, %marker, "dropped non-operating unit");
        return Ok(None);
    }

    let capacity = parse_number("net_capacity", field(row, COL_CAPACITY))?
        .ok_or_else(|| CyclusGenError::format("net_capacity", "capacity is empty"))?;
    if capacity <= filter.min_capacity_mwe {
        debug!(unit = raw_name, capacity, "dropped sub-threshold unit");
        return Ok(None);
    }

    let Some(commercial) = parse_date("commercial", field(row, COL_COMMERCIAL))? else {
        warn!(unit = raw_name, "no commercial operation date, unit skipped");
        return Ok(None);
    };
    let shutdown = parse_date("shutdown", field(row, COL_SHUTDOWN))?;

    let position = match (
        parse_coordinate(field(row, COL_LATITUDE)),
        parse_coordinate(field(row, COL_LONGITUDE)),
    ) {
        (Some(lat), Some(lon)) => Coordinates::from_finite(lat, lon),
        _ => None,
    };
    if position.is_none() {
        debug!(unit = raw_name, "no usable coordinates, position omitted");
    }

    Ok(Some(ReactorRecord {
        country: field(row, COL_COUNTRY).to_string(),
        name: refine_name(raw_name),
        reactor_type: field(row, COL_TYPE).to_string(),
        net_capacity_mwe: capacity,
        commercial,
        shutdown,
        position,
    }))
}

/// Clean a unit name for use as a prototype name.
///
/// Everything from an opening parenthesis on is dropped when the name carries
/// a parenthetical annotation, and `&` is spelled `and`.
pub fn refine_name(raw: &str) -> String {
    let name = match (raw.find('('), raw.find(')')) {
        (Some(start), Some(_)) => &raw[..start],
        _ => raw,
    };
    name.replace('&', "and").trim().to_string()
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Column value by position; short rows read as empty.
fn field(row: &csv::StringRecord, col: usize) -> &str {
    row.get(col).unwrap_or("")
}

/// Parse a numeric cell. Empty cells are `None`, anything else must be a
/// finite number.
fn parse_number(name: &str, raw: &str) -> Result<Option<f64>> {
    if raw.is_empty() {
        return Ok(None);
    }
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(Some(value)),
        Ok(_) => Err(CyclusGenError::format(name, format!("not a finite number: '{raw}'"))),
        Err(_) => Err(CyclusGenError::format(name, format!("not a number: '{raw}'"))),
    }
}

/// Coordinates are optional: unparsable cells read as missing.
fn parse_coordinate(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok()
}
