pub mod activity;
pub mod boards;
pub mod config;
pub mod import;
pub mod report;

use chrono::NaiveDate;
use planboard_core::activity::date::parse_date;
use planboard_core::{ActivityDb, Config, Planner, UuidIdGenerator};
use serde::Serialize;

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Planner over the on-disk database.
pub fn open_planner() -> Result<Planner<ActivityDb, UuidIdGenerator>, Box<dyn std::error::Error>> {
    let db = ActivityDb::open()?;
    Ok(Planner::load(db, UuidIdGenerator))
}

pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// `--horizon` if given, else the configured horizon for today.
pub fn horizon(config: &Config, explicit: Option<&str>) -> Result<NaiveDate, Box<dyn std::error::Error>> {
    match explicit {
        Some(value) => Ok(parse_date("horizon", value)?),
        None => Ok(config.planner.horizon(today())),
    }
}

pub fn parse_opt_date(field: &str, value: Option<&str>) -> Result<Option<NaiveDate>, Box<dyn std::error::Error>> {
    Ok(value.map(|v| parse_date(field, v)).transpose()?)
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
