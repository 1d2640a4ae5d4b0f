use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Activity, Board, RecurrenceConfig, RecurrenceFrequency, Status};
use crate::error::ValidationError;

/// Submitted field values for a new or edited activity.
///
/// A draft carries no id: the series mutator decides whether it keeps an
/// existing id or mints a fresh one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ActivityDraft {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub activity_name: String,
    pub board: Board,
    pub status: Status,
    #[serde(default)]
    pub is_locked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<RecurrenceConfig>,
}

impl ActivityDraft {
    pub fn new(
        activity_name: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
        board: Board,
        status: Status,
    ) -> Self {
        Self {
            start_date,
            end_date,
            activity_name: activity_name.into(),
            board,
            status,
            is_locked: false,
            recurrence: None,
        }
    }

    /// Prefill a draft from an existing activity (or instance) being edited.
    ///
    /// The `@` national marker is stripped; [`normalize`](Self::normalize)
    /// puts it back when the status is still `NATIONALS`.
    pub fn from_activity(activity: &Activity) -> Self {
        let name = activity
            .activity_name
            .strip_prefix('@')
            .unwrap_or(&activity.activity_name);
        Self {
            start_date: activity.start_date,
            end_date: activity.end_date,
            activity_name: name.to_string(),
            board: activity.board,
            status: activity.status,
            is_locked: activity.is_locked,
            recurrence: activity.recurrence.clone(),
        }
    }

    pub fn with_recurrence(mut self, recurrence: RecurrenceConfig) -> Self {
        self.recurrence = Some(recurrence);
        self
    }

    /// Apply the submission rules.
    ///
    /// - the name is trimmed and must not be empty
    /// - `NATIONALS` names carry a leading `@`
    /// - `SECRETARIAT` entries are `STATUTORY` and locked; nothing else is locked
    /// - an end date before the start date is clamped to the start date
    /// - weekdays only survive on weekly rules, and a `NONE` rule is dropped
    pub fn normalize(mut self) -> Result<Self, ValidationError> {
        let name = self.activity_name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        self.activity_name = name.to_string();

        if self.board == Board::Secretariat {
            self.status = Status::Statutory;
        }
        self.is_locked = self.board == Board::Secretariat;

        if self.status == Status::Nationals && !self.activity_name.starts_with('@') {
            self.activity_name = format!("@{}", self.activity_name);
        }

        if self.end_date < self.start_date {
            self.end_date = self.start_date;
        }

        self.recurrence = match self.recurrence.take() {
            Some(rule) if rule.is_active() => {
                if let Some(day) = rule.days_of_week.iter().find(|day| **day > 6) {
                    return Err(ValidationError::InvalidWeekday(day.to_string()));
                }
                let days_of_week = if rule.frequency == RecurrenceFrequency::Weekly {
                    rule.days_of_week
                } else {
                    BTreeSet::new()
                };
                Some(RecurrenceConfig {
                    days_of_week,
                    ..rule
                })
            }
            _ => None,
        };

        Ok(self)
    }

    /// Turn the draft into a record with the given id. The result is never an
    /// instance and has no skipped dates.
    pub fn into_activity(self, id: String) -> Activity {
        Activity {
            id,
            start_date: self.start_date,
            end_date: self.end_date,
            activity_name: self.activity_name,
            board: self.board,
            status: self.status,
            is_locked: self.is_locked,
            recurrence: self.recurrence,
            parent_id: None,
            skipped_dates: BTreeSet::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::date::parse_date;

    fn draft(name: &str, board: Board, status: Status) -> ActivityDraft {
        let day = parse_date("startDate", "2024-03-10").unwrap();
        ActivityDraft::new(name, day, day, board, status)
    }

    #[test]
    fn blank_names_are_rejected() {
        let result = draft("   ", Board::Excel, Status::House).normalize();
        assert_eq!(result, Err(ValidationError::EmptyName));
    }

    #[test]
    fn nationals_get_marker_once() {
        let normalized = draft(" Congress ", Board::Excel, Status::Nationals)
            .normalize()
            .unwrap();
        assert_eq!(normalized.activity_name, "@Congress");
        let again = normalized.normalize().unwrap();
        assert_eq!(again.activity_name, "@Congress");
    }

    #[test]
    fn secretariat_is_statutory_and_locked() {
        let normalized = draft("AGM", Board::Secretariat, Status::House)
            .normalize()
            .unwrap();
        assert_eq!(normalized.status, Status::Statutory);
        assert!(normalized.is_locked);

        let mut other = draft("Choir practice", Board::RaphaChoir, Status::House);
        other.is_locked = true;
        assert!(!other.normalize().unwrap().is_locked);
    }

    #[test]
    fn end_date_is_clamped_and_rules_are_cleaned() {
        let mut d = draft("Outreach", Board::WholenessMissions, Status::House);
        d.end_date = parse_date("endDate", "2024-03-01").unwrap();
        let mut rule = RecurrenceConfig::new(RecurrenceFrequency::Monthly, 1);
        rule.days_of_week.insert(2);
        let normalized = d.with_recurrence(rule).normalize().unwrap();
        assert_eq!(normalized.end_date, normalized.start_date);
        assert!(normalized.recurrence.unwrap().days_of_week.is_empty());

        let none_rule = RecurrenceConfig::new(RecurrenceFrequency::None, 1);
        let dropped = draft("Once", Board::Excel, Status::House)
            .with_recurrence(none_rule)
            .normalize()
            .unwrap();
        assert!(dropped.recurrence.is_none());
    }

    #[test]
    fn out_of_range_weekdays_are_rejected() {
        let mut rule = RecurrenceConfig::new(RecurrenceFrequency::Weekly, 1);
        rule.days_of_week.insert(7);
        let result = draft("Prayer", Board::RaphaLifeline, Status::House)
            .with_recurrence(rule)
            .normalize();
        assert_eq!(result, Err(ValidationError::InvalidWeekday("7".into())));
    }

    #[test]
    fn prefill_strips_marker() {
        let activity = draft("Congress", Board::Excel, Status::Nationals)
            .normalize()
            .unwrap()
            .into_activity("a1".into());
        let prefilled = ActivityDraft::from_activity(&activity);
        assert_eq!(prefilled.activity_name, "Congress");
    }
}
