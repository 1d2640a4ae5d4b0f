//! Recurrence expansion.
//!
//! Turns stored activities into the concrete calendar instances a view shows.
//! Expansion is pure: the same templates and horizon always produce the same
//! instances, with the same ids, in the same order.
//!
//! ## Walk
//!
//! Starting at the template's `start_date`, the walk visits candidate dates
//! until one lies past `min(end_recurrence, horizon)`. The bound itself is
//! still visited. A candidate becomes an instance unless it is listed in the
//! template's `skipped_dates`, or the rule is a weekday scan and the
//! candidate's weekday is not selected.
//!
//! | frequency | step                                        |
//! |-----------|---------------------------------------------|
//! | DAILY     | `interval` days                             |
//! | WEEKLY    | 1 day with `days_of_week`, else `interval` weeks |
//! | MONTHLY   | `interval` calendar months (day clamped)    |

use chrono::{Days, Months, NaiveDate};
use tracing::debug;

use crate::activity::date::{compact, end_of_year, weekday_number};
use crate::activity::{Activity, RecurrenceConfig, RecurrenceFrequency};

/// Deterministic id of the instance of `template_id` starting on `date`.
///
/// `instance_id("t1", 2024-01-05) == "t1-20240105"`.
pub fn instance_id(template_id: &str, date: NaiveDate) -> String {
    format!("{template_id}-{}", compact(date))
}

/// Default expansion horizon: the last day of `today`'s year.
pub fn default_horizon(today: NaiveDate) -> NaiveDate {
    end_of_year(today)
}

/// Expand every recurring template into its instances up to `horizon`.
///
/// Non-recurring activities pass through unchanged. Instances of one template
/// are in ascending date order; templates keep their input order. The result
/// is not globally sorted.
pub fn expand(activities: &[Activity], horizon: NaiveDate) -> Vec<Activity> {
    let mut expanded = Vec::with_capacity(activities.len());

    for activity in activities {
        match activity.active_recurrence() {
            None => expanded.push(activity.clone()),
            Some(rule) => {
                let before = expanded.len();
                expanded.extend(
                    Occurrences::new(activity, rule, horizon)
                        .map(|date| materialize(activity, date)),
                );
                debug!(
                    template = %activity.id,
                    instances = expanded.len() - before,
                    "expanded recurring activity"
                );
            }
        }
    }

    expanded
}

/// Copy of `template` placed on `date`, keeping the template's duration.
///
/// An end that would run past the last representable date is clamped to it.
pub fn materialize(template: &Activity, date: NaiveDate) -> Activity {
    let duration = chrono::Duration::days(template.duration_days());
    Activity {
        id: instance_id(&template.id, date),
        start_date: date,
        end_date: date.checked_add_signed(duration).unwrap_or(NaiveDate::MAX),
        parent_id: Some(template.id.clone()),
        ..template.clone()
    }
}

/// Start dates of the instances a template produces.
pub struct Occurrences<'a> {
    template: &'a Activity,
    rule: &'a RecurrenceConfig,
    cursor: Option<NaiveDate>,
    limit: NaiveDate,
}

impl<'a> Occurrences<'a> {
    pub fn new(template: &'a Activity, rule: &'a RecurrenceConfig, horizon: NaiveDate) -> Self {
        let limit = rule
            .end_recurrence
            .map_or(horizon, |end| end.min(horizon));
        Self {
            template,
            rule,
            cursor: Some(template.start_date),
            limit,
        }
    }

    fn emits(&self, date: NaiveDate) -> bool {
        if self.template.skipped_dates.contains(&date) {
            return false;
        }
        !self.rule.scans_weekdays() || self.rule.days_of_week.contains(&weekday_number(date))
    }
}

impl Iterator for Occurrences<'_> {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        while let Some(current) = self.cursor {
            if current > self.limit {
                self.cursor = None;
                break;
            }
            self.cursor = advance(self.rule, current);
            if self.emits(current) {
                return Some(current);
            }
        }
        None
    }
}

/// Next candidate after `date`, or `None` when the walk must stop.
fn advance(rule: &RecurrenceConfig, date: NaiveDate) -> Option<NaiveDate> {
    let step = rule.step();
    match rule.frequency {
        RecurrenceFrequency::Daily => date.checked_add_days(Days::new(u64::from(step))),
        RecurrenceFrequency::Weekly if rule.scans_weekdays() => date.succ_opt(),
        RecurrenceFrequency::Weekly => date.checked_add_days(Days::new(7 * u64::from(step))),
        RecurrenceFrequency::Monthly => date.checked_add_months(Months::new(step)),
        RecurrenceFrequency::None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::date::parse_date;
    use crate::activity::{Board, Status};
    use proptest::prelude::*;

    fn d(s: &str) -> NaiveDate {
        parse_date("date", s).unwrap()
    }

    fn template(id: &str, start: &str, end: &str, rule: Option<RecurrenceConfig>) -> Activity {
        Activity {
            id: id.to_string(),
            start_date: d(start),
            end_date: d(end),
            activity_name: "Ward round".to_string(),
            board: Board::RaphaLifeline,
            status: Status::House,
            is_locked: false,
            recurrence: rule,
            parent_id: None,
            skipped_dates: Default::default(),
        }
    }

    fn rule(frequency: RecurrenceFrequency, interval: u32, until: Option<&str>) -> RecurrenceConfig {
        RecurrenceConfig {
            end_recurrence: until.map(d),
            ..RecurrenceConfig::new(frequency, interval)
        }
    }

    fn starts(instances: &[Activity]) -> Vec<String> {
        instances.iter().map(|a| a.start_date.to_string()).collect()
    }

    #[test]
    fn daily_every_other_day() {
        let t1 = template(
            "t1",
            "2024-01-01",
            "2024-01-01",
            Some(rule(RecurrenceFrequency::Daily, 2, Some("2024-01-07"))),
        );
        let instances = expand(&[t1], d("2024-12-31"));
        assert_eq!(
            starts(&instances),
            ["2024-01-01", "2024-01-03", "2024-01-05", "2024-01-07"]
        );
        assert_eq!(instances[0].id, "t1-20240101");
        assert_eq!(instances[3].id, "t1-20240107");
        assert!(instances.iter().all(|a| a.parent_id.as_deref() == Some("t1")));
    }

    #[test]
    fn non_recurring_passes_through() {
        let once = template("once", "2024-05-01", "2024-05-03", None);
        let none_rule = template(
            "none",
            "2024-05-01",
            "2024-05-01",
            Some(rule(RecurrenceFrequency::None, 1, None)),
        );
        let out = expand(&[once.clone(), none_rule.clone()], d("2024-12-31"));
        assert_eq!(out, vec![once, none_rule]);
    }

    #[test]
    fn end_bound_is_inclusive() {
        let t = template(
            "w",
            "2024-11-26",
            "2024-11-26",
            Some(rule(RecurrenceFrequency::Weekly, 1, Some("2024-12-10"))),
        );
        let out = expand(&[t.clone()], d("2024-12-31"));
        assert_eq!(starts(&out), ["2024-11-26", "2024-12-03", "2024-12-10"]);

        let mut shifted = t;
        shifted.recurrence.as_mut().unwrap().end_recurrence = Some(d("2024-12-09"));
        let out = expand(&[shifted], d("2024-12-31"));
        assert_eq!(starts(&out), ["2024-11-26", "2024-12-03"]);
    }

    #[test]
    fn horizon_caps_a_later_end_recurrence() {
        let t = template(
            "m",
            "2024-10-15",
            "2024-10-15",
            Some(rule(RecurrenceFrequency::Monthly, 1, Some("2025-06-30"))),
        );
        let out = expand(&[t], d("2024-12-31"));
        assert_eq!(starts(&out), ["2024-10-15", "2024-11-15", "2024-12-15"]);
    }

    #[test]
    fn weekday_scan_ignores_interval() {
        let mut weekly = rule(RecurrenceFrequency::Weekly, 3, Some("2024-01-21"));
        weekly.days_of_week = [1, 3].into_iter().collect();
        // 2024-01-01 is a Monday
        let t = template("mw", "2024-01-01", "2024-01-01", Some(weekly));
        let out = expand(&[t], d("2024-12-31"));
        assert_eq!(
            starts(&out),
            [
                "2024-01-01", "2024-01-03", "2024-01-08", "2024-01-10", "2024-01-15",
                "2024-01-17"
            ]
        );
    }

    #[test]
    fn weekly_interval_without_weekdays() {
        let t = template(
            "fortnight",
            "2024-01-02",
            "2024-01-03",
            Some(rule(RecurrenceFrequency::Weekly, 2, Some("2024-02-13"))),
        );
        let out = expand(&[t], d("2024-12-31"));
        assert_eq!(
            starts(&out),
            ["2024-01-02", "2024-01-16", "2024-01-30", "2024-02-13"]
        );
        assert!(out.iter().all(|a| a.duration_days() == 1));
    }

    #[test]
    fn monthly_clamps_short_months_and_keeps_walking_from_the_clamped_date() {
        let t = template(
            "eom",
            "2024-01-31",
            "2024-01-31",
            Some(rule(RecurrenceFrequency::Monthly, 1, Some("2024-04-30"))),
        );
        let out = expand(&[t], d("2024-12-31"));
        assert_eq!(
            starts(&out),
            ["2024-01-31", "2024-02-29", "2024-03-29", "2024-04-29"]
        );
    }

    #[test]
    fn skipped_dates_suppress_only_that_step() {
        let mut t = template(
            "t1",
            "2024-01-01",
            "2024-01-01",
            Some(rule(RecurrenceFrequency::Daily, 2, Some("2024-01-07"))),
        );
        t.skipped_dates.insert(d("2024-01-03"));
        let out = expand(&[t], d("2024-12-31"));
        assert_eq!(starts(&out), ["2024-01-01", "2024-01-05", "2024-01-07"]);
    }

    #[test]
    fn zero_interval_still_advances() {
        let t = template(
            "z",
            "2024-01-01",
            "2024-01-01",
            Some(rule(RecurrenceFrequency::Daily, 0, Some("2024-01-03"))),
        );
        assert_eq!(expand(&[t], d("2024-12-31")).len(), 3);
    }

    #[test]
    fn templates_keep_input_order() {
        let late = template(
            "late",
            "2024-06-01",
            "2024-06-01",
            Some(rule(RecurrenceFrequency::Daily, 1, Some("2024-06-02"))),
        );
        let early = template("early", "2024-01-01", "2024-01-01", None);
        let out = expand(&[late, early], d("2024-12-31"));
        let ids: Vec<_> = out.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, ["late-20240601", "late-20240602", "early"]);
    }

    #[test]
    fn start_after_horizon_yields_nothing() {
        let t = template(
            "future",
            "2025-02-01",
            "2025-02-01",
            Some(rule(RecurrenceFrequency::Daily, 1, None)),
        );
        assert!(expand(&[t], d("2024-12-31")).is_empty());
    }

    #[test]
    fn span_reaching_the_last_date_clamps_instead_of_overflowing() {
        let mut t = template(
            "long",
            "2024-01-01",
            "2024-01-01",
            Some(rule(RecurrenceFrequency::Daily, 1, None)),
        );
        t.end_date = NaiveDate::MAX;
        let out = expand(&[t], d("2024-01-03"));
        assert_eq!(starts(&out), ["2024-01-01", "2024-01-02", "2024-01-03"]);
        assert_eq!(out[0].end_date, NaiveDate::MAX);
        assert!(out.iter().all(|a| a.end_date == NaiveDate::MAX));
    }

    #[test]
    fn default_horizon_is_end_of_year() {
        assert_eq!(default_horizon(d("2024-03-04")), d("2024-12-31"));
    }

    fn arb_frequency() -> impl Strategy<Value = RecurrenceFrequency> {
        prop_oneof![
            Just(RecurrenceFrequency::Daily),
            Just(RecurrenceFrequency::Weekly),
            Just(RecurrenceFrequency::Monthly),
        ]
    }

    fn arb_template() -> impl Strategy<Value = Activity> {
        (
            0i64..365,
            0i64..5,
            arb_frequency(),
            0u32..4,
            proptest::collection::btree_set(0u8..7, 0..4),
            proptest::option::of(0i64..400),
            proptest::collection::btree_set(0i64..120, 0..6),
        )
            .prop_map(|(offset, span, frequency, interval, days, until, skips)| {
                let base = d("2024-01-01");
                let start = base + chrono::Duration::days(offset);
                let mut rule = RecurrenceConfig::new(frequency, interval);
                if frequency == RecurrenceFrequency::Weekly {
                    rule.days_of_week = days;
                }
                rule.end_recurrence = until.map(|u| base + chrono::Duration::days(u));
                let mut t = template("p", "2024-01-01", "2024-01-01", Some(rule));
                t.start_date = start;
                t.end_date = start + chrono::Duration::days(span);
                t.skipped_dates = skips
                    .into_iter()
                    .map(|s| start + chrono::Duration::days(s))
                    .collect();
                t
            })
    }

    proptest! {
        #[test]
        fn expansion_is_repeatable(t in arb_template()) {
            let horizon = d("2024-12-31");
            let templates = vec![t];
            prop_assert_eq!(expand(&templates, horizon), expand(&templates, horizon));
        }

        #[test]
        fn instances_keep_template_duration(t in arb_template()) {
            let expected = t.duration_days();
            for instance in expand(&[t], d("2024-12-31")) {
                prop_assert_eq!(instance.duration_days(), expected);
            }
        }

        #[test]
        fn skipped_dates_never_emitted(t in arb_template()) {
            let skipped = t.skipped_dates.clone();
            for instance in expand(&[t], d("2024-12-31")) {
                prop_assert!(!skipped.contains(&instance.start_date));
            }
        }

        #[test]
        fn weekday_scan_only_emits_selected_days(t in arb_template()) {
            let rule = t.recurrence.clone().unwrap();
            prop_assume!(rule.scans_weekdays());
            for instance in expand(&[t], d("2024-12-31")) {
                prop_assert!(rule.days_of_week.contains(&weekday_number(instance.start_date)));
            }
        }

        #[test]
        fn instances_stay_within_bounds_in_ascending_order(t in arb_template()) {
            let horizon = d("2024-12-31");
            let limit = t.recurrence.as_ref().unwrap().end_recurrence.map_or(horizon, |e| e.min(horizon));
            let start = t.start_date;
            let out = expand(&[t], horizon);
            for pair in out.windows(2) {
                prop_assert!(pair[0].start_date < pair[1].start_date);
            }
            for instance in &out {
                prop_assert!(instance.start_date >= start && instance.start_date <= limit);
                prop_assert_eq!(&instance.id, &instance_id("p", instance.start_date));
            }
        }
    }
}
