//! Fleet table ingestion: date normalization and the country/status/capacity
//! filter that turns raw rows into [`ReactorRecord`](cyclusgen_shared::ReactorRecord)s.

pub mod date;
mod loader;

pub use date::{HALF_MONTH_DAY, YearMonth, parse_date, parse_required_date};
pub use loader::{load_fleet, load_fleet_from_reader, refine_name};
