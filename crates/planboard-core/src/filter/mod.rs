//! Filtering, ordering and grouping of expanded activities.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::activity::date::start_of_month;
use crate::activity::{Activity, Board, Status};

/// Inclusive date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        Self { from, to }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }

    /// Whether `activity` starts or ends inside the range, or spans all of it.
    pub fn overlaps(&self, activity: &Activity) -> bool {
        self.contains(activity.start_date)
            || self.contains(activity.end_date)
            || (activity.start_date <= self.from && activity.end_date >= self.to)
    }
}

/// Criteria for listing activities. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityFilter {
    pub board: Option<Board>,
    pub status: Option<Status>,
    pub range: Option<DateRange>,
}

impl ActivityFilter {
    pub fn matches(&self, activity: &Activity) -> bool {
        self.board.map_or(true, |board| activity.board == board)
            && self.status.map_or(true, |status| activity.status == status)
            && self.range.map_or(true, |range| range.overlaps(activity))
    }

    pub fn apply(&self, activities: Vec<Activity>) -> Vec<Activity> {
        activities.into_iter().filter(|a| self.matches(a)).collect()
    }
}

/// Activities overlapping `range`, keeping input order.
pub fn overlapping(activities: &[Activity], range: DateRange) -> Vec<Activity> {
    activities
        .iter()
        .filter(|a| range.overlaps(a))
        .cloned()
        .collect()
}

/// Sort by start date. Ties keep their input order.
pub fn sort_chronological(activities: &mut [Activity]) {
    activities.sort_by_key(|a| a.start_date);
}

/// Activities of one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthGroup {
    /// `January 2024`
    pub label: String,
    pub month: NaiveDate,
    pub activities: Vec<Activity>,
}

/// Group by the month each activity starts in, months in chronological order.
pub fn group_by_month(mut activities: Vec<Activity>) -> Vec<MonthGroup> {
    sort_chronological(&mut activities);

    let mut groups: Vec<MonthGroup> = Vec::new();
    for activity in activities {
        let month = start_of_month(activity.start_date);
        match groups.last_mut() {
            Some(group) if group.month == month => group.activities.push(activity),
            _ => groups.push(MonthGroup {
                label: month.format("%B %Y").to_string(),
                month,
                activities: vec![activity],
            }),
        }
    }
    groups
}
