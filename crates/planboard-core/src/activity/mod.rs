//! Activity model: templates, standalone events and materialized instances.
//!
//! A stored [`Activity`] is either a one-off event or a recurring *template*
//! (it carries a [`RecurrenceConfig`]). Instances produced by
//! [`crate::recurrence::expand`] are never stored; they point back to their
//! template through `parent_id`.

pub mod date;
mod draft;

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

pub use draft::ActivityDraft;

/// Department that owns an activity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Board {
    #[serde(rename = "RAPHATORIA")]
    Raphatoria,
    #[serde(rename = "RAPHA-LIFELINE")]
    RaphaLifeline,
    #[serde(rename = "WHOLENESS MISSIONS")]
    WholenessMissions,
    #[serde(rename = "EXCEL")]
    Excel,
    #[serde(rename = "RAPHA CHOIR")]
    RaphaChoir,
    #[serde(rename = "RAPHA THEATER")]
    RaphaTheater,
    #[serde(rename = "BROTHERS/SISTERS/WELFARE")]
    BrothersSistersWelfare,
    #[serde(rename = "FINANCIAL")]
    Financial,
    #[serde(rename = "SECRETARIAT")]
    Secretariat,
}

impl Board {
    pub const ALL: [Board; 9] = [
        Board::Raphatoria,
        Board::RaphaLifeline,
        Board::WholenessMissions,
        Board::Excel,
        Board::RaphaChoir,
        Board::RaphaTheater,
        Board::BrothersSistersWelfare,
        Board::Financial,
        Board::Secretariat,
    ];

    /// Wire label, as stored and as written in CSV files.
    pub fn label(&self) -> &'static str {
        match self {
            Board::Raphatoria => "RAPHATORIA",
            Board::RaphaLifeline => "RAPHA-LIFELINE",
            Board::WholenessMissions => "WHOLENESS MISSIONS",
            Board::Excel => "EXCEL",
            Board::RaphaChoir => "RAPHA CHOIR",
            Board::RaphaTheater => "RAPHA THEATER",
            Board::BrothersSistersWelfare => "BROTHERS/SISTERS/WELFARE",
            Board::Financial => "FINANCIAL",
            Board::Secretariat => "SECRETARIAT",
        }
    }

    /// Display colour (hex).
    pub fn color(&self) -> &'static str {
        match self {
            Board::Raphatoria => "#3B82F6",
            Board::RaphaLifeline => "#EF4444",
            Board::WholenessMissions => "#10B981",
            Board::Excel => "#8B5CF6",
            Board::RaphaChoir => "#06B6D4",
            Board::RaphaTheater => "#94a3b8",
            Board::BrothersSistersWelfare => "#000000",
            Board::Financial => "#EC4899",
            Board::Secretariat => "#D4AF37",
        }
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Board {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Board::ALL
            .into_iter()
            .find(|board| board.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ValidationError::UnknownBoard(s.to_string()))
    }
}

/// Activity status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Nationals,
    House,
    Statutory,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::Nationals, Status::House, Status::Statutory];

    pub fn label(&self) -> &'static str {
        match self {
            Status::Nationals => "NATIONALS",
            Status::House => "HOUSE",
            Status::Statutory => "STATUTORY",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Status {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Status::ALL
            .into_iter()
            .find(|status| status.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ValidationError::UnknownStatus(s.to_string()))
    }
}

/// How often a template repeats.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecurrenceFrequency {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
}

impl FromStr for RecurrenceFrequency {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(RecurrenceFrequency::None),
            "daily" => Ok(RecurrenceFrequency::Daily),
            "weekly" => Ok(RecurrenceFrequency::Weekly),
            "monthly" => Ok(RecurrenceFrequency::Monthly),
            _ => Err(ValidationError::UnknownFrequency(s.to_string())),
        }
    }
}

/// Recurrence rule carried by a template.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RecurrenceConfig {
    pub frequency: RecurrenceFrequency,
    /// Step size in days, weeks or months depending on `frequency`.
    #[serde(default = "default_interval")]
    pub interval: u32,
    /// Weekdays (0 = Sunday) for weekly rules. Non-empty switches the walk
    /// to a day-by-day scan and `interval` is ignored.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub days_of_week: BTreeSet<u8>,
    /// Inclusive last date an occurrence may start on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_recurrence: Option<NaiveDate>,
}

fn default_interval() -> u32 {
    1
}

impl RecurrenceConfig {
    pub fn new(frequency: RecurrenceFrequency, interval: u32) -> Self {
        Self {
            frequency,
            interval,
            days_of_week: BTreeSet::new(),
            end_recurrence: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.frequency != RecurrenceFrequency::None
    }

    /// Effective step; zero behaves as one.
    pub fn step(&self) -> u32 {
        self.interval.max(1)
    }

    pub fn scans_weekdays(&self) -> bool {
        self.frequency == RecurrenceFrequency::Weekly && !self.days_of_week.is_empty()
    }
}

/// Which part of a series an edit or delete applies to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum UpdateMode {
    /// This instance only
    Single,
    /// This and future instances
    Future,
    /// The entire series
    All,
}

impl FromStr for UpdateMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" => Ok(UpdateMode::Single),
            "future" => Ok(UpdateMode::Future),
            "all" => Ok(UpdateMode::All),
            _ => Err(ValidationError::UnknownScope(s.to_string())),
        }
    }
}

/// A stored activity, or an instance materialized from a template.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub activity_name: String,
    pub board: Board,
    pub status: Status,
    #[serde(default)]
    pub is_locked: bool,
    /// Present only on templates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<RecurrenceConfig>,
    /// Present only on materialized instances
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    /// Template occurrences excluded from expansion
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub skipped_dates: BTreeSet<NaiveDate>,
}

impl Activity {
    /// Whether this is part of a series: an instance, or a template with an
    /// active rule.
    pub fn is_recurring(&self) -> bool {
        self.parent_id.is_some() || self.active_recurrence().is_some()
    }

    pub fn active_recurrence(&self) -> Option<&RecurrenceConfig> {
        self.recurrence.as_ref().filter(|rule| rule.is_active())
    }

    /// Id of the stored record this activity belongs to.
    pub fn template_id(&self) -> &str {
        self.parent_id.as_deref().unwrap_or(&self.id)
    }

    pub fn duration_days(&self) -> i64 {
        date::days_between(self.start_date, self.end_date)
    }
}
