//! Activity management commands for CLI.

use chrono::NaiveDate;
use clap::{Args, Subcommand};
use planboard_core::activity::date::parse_date;
use planboard_core::filter::sort_chronological;
use planboard_core::{
    ActivityDraft, ActivityFilter, Board, Config, DateRange, RecurrenceConfig, RecurrenceFrequency,
    Status, UpdateMode,
};

use super::{horizon, open_planner, parse_opt_date, print_json, CliResult};

/// Recurrence options shared by create and edit.
#[derive(Args, Debug, Default)]
pub struct RecurrenceArgs {
    /// Repeat frequency: none, daily, weekly or monthly
    #[arg(long)]
    frequency: Option<String>,
    /// Step in days, weeks or months (default: 1)
    #[arg(long)]
    interval: Option<u32>,
    /// Comma-separated weekdays for weekly rules, 0 = Sunday (e.g. "1,3")
    #[arg(long)]
    days: Option<String>,
    /// Last date an occurrence may start on (YYYY-MM-DD)
    #[arg(long)]
    until: Option<String>,
}

impl RecurrenceArgs {
    fn is_empty(&self) -> bool {
        self.frequency.is_none() && self.interval.is_none() && self.days.is_none() && self.until.is_none()
    }

    /// Apply the options on top of `existing`.
    fn apply(
        &self,
        existing: Option<RecurrenceConfig>,
    ) -> Result<Option<RecurrenceConfig>, Box<dyn std::error::Error>> {
        if self.is_empty() {
            return Ok(existing);
        }

        let mut rule = match (&self.frequency, existing) {
            (Some(frequency), Some(rule)) => RecurrenceConfig {
                frequency: frequency.parse()?,
                ..rule
            },
            (Some(frequency), None) => RecurrenceConfig::new(frequency.parse()?, 1),
            (None, Some(rule)) => rule,
            (None, None) => return Err("--interval, --days and --until require --frequency".into()),
        };

        if let Some(interval) = self.interval {
            rule.interval = interval;
        }
        if let Some(days) = &self.days {
            rule.days_of_week = days
                .split(',')
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(|d| d.parse::<u8>().map_err(|_| format!("invalid weekday: {d}")))
                .collect::<Result<_, _>>()?;
        }
        if let Some(until) = &self.until {
            rule.end_recurrence = Some(parse_date("until", until)?);
        }

        if rule.frequency == RecurrenceFrequency::None {
            return Ok(None);
        }
        Ok(Some(rule))
    }
}

#[derive(Subcommand)]
pub enum ActivityAction {
    /// Create a new activity
    Create {
        /// Activity name
        #[arg(long)]
        name: String,
        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        start: String,
        /// End date (YYYY-MM-DD, default: start date)
        #[arg(long)]
        end: Option<String>,
        /// Board label (default: planner.default_board)
        #[arg(long)]
        board: Option<String>,
        /// Status label (default: planner.default_status)
        #[arg(long)]
        status: Option<String>,
        #[command(flatten)]
        recurrence: RecurrenceArgs,
    },
    /// List activities with recurring series expanded
    List {
        /// Filter by board
        #[arg(long)]
        board: Option<String>,
        /// Filter by status
        #[arg(long)]
        status: Option<String>,
        /// Only activities overlapping dates from this day on
        #[arg(long)]
        from: Option<String>,
        /// Only activities overlapping dates up to this day
        #[arg(long)]
        to: Option<String>,
        /// Expand series up to this day (default: end of the configured year)
        #[arg(long)]
        horizon: Option<String>,
    },
    /// Get a stored activity or an expanded instance
    Get {
        /// Activity or instance ID
        id: String,
        #[arg(long)]
        horizon: Option<String>,
    },
    /// Edit an activity or an instance of a series
    Edit {
        /// Activity or instance ID
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
        #[arg(long)]
        board: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[command(flatten)]
        recurrence: RecurrenceArgs,
        /// single, future or all (default: all)
        #[arg(long)]
        scope: Option<String>,
        #[arg(long)]
        horizon: Option<String>,
    },
    /// Delete an activity or part of a series
    Delete {
        /// Activity or instance ID
        id: String,
        /// single, future or all (default: single for instances, all otherwise)
        #[arg(long)]
        scope: Option<String>,
        #[arg(long)]
        horizon: Option<String>,
    },
}

pub fn run(action: ActivityAction) -> CliResult {
    let config = Config::load_or_default();
    let mut planner = open_planner()?;

    match action {
        ActivityAction::Create {
            name,
            start,
            end,
            board,
            status,
            recurrence,
        } => {
            let start_date = parse_date("start", &start)?;
            let end_date = parse_opt_date("end", end.as_deref())?.unwrap_or(start_date);
            let board = board
                .map(|b| b.parse::<Board>())
                .transpose()?
                .unwrap_or(config.planner.default_board);
            let status = status
                .map(|s| s.parse::<Status>())
                .transpose()?
                .unwrap_or(config.planner.default_status);

            let mut draft = ActivityDraft::new(name, start_date, end_date, board, status);
            draft.recurrence = recurrence.apply(None)?;
            let mutation = planner.submit(draft, None, None)?;
            print_json(&mutation)?;
        }
        ActivityAction::List {
            board,
            status,
            from,
            to,
            horizon: explicit,
        } => {
            let from = parse_opt_date("from", from.as_deref())?;
            let to = parse_opt_date("to", to.as_deref())?;
            let range = match (from, to) {
                (None, None) => None,
                (from, to) => Some(DateRange::new(
                    from.unwrap_or(NaiveDate::MIN),
                    to.unwrap_or(NaiveDate::MAX),
                )),
            };
            let filter = ActivityFilter {
                board: board.map(|b| b.parse()).transpose()?,
                status: status.map(|s| s.parse()).transpose()?,
                range,
            };

            let horizon = horizon(&config, explicit.as_deref())?;
            let mut activities = filter.apply(planner.expanded(horizon));
            sort_chronological(&mut activities);
            print_json(&activities)?;
        }
        ActivityAction::Get {
            id,
            horizon: explicit,
        } => {
            let horizon = horizon(&config, explicit.as_deref())?;
            let activity = planner
                .find(&id, horizon)
                .ok_or(format!("Activity not found: {id}"))?;
            print_json(&activity)?;
        }
        ActivityAction::Edit {
            id,
            name,
            start,
            end,
            board,
            status,
            recurrence,
            scope,
            horizon: explicit,
        } => {
            let horizon = horizon(&config, explicit.as_deref())?;
            let editing = planner
                .find(&id, horizon)
                .ok_or(format!("Activity not found: {id}"))?;
            let scope = scope.map(|s| s.parse::<UpdateMode>()).transpose()?;

            let mut draft = ActivityDraft::from_activity(&editing);
            if let Some(n) = name {
                draft.activity_name = n;
            }
            if let Some(s) = start {
                draft.start_date = parse_date("start", &s)?;
            }
            if let Some(e) = end {
                draft.end_date = parse_date("end", &e)?;
            }
            if let Some(b) = board {
                draft.board = b.parse()?;
            }
            if let Some(s) = status {
                draft.status = s.parse()?;
            }
            draft.recurrence = recurrence.apply(draft.recurrence.take())?;

            let mutation = planner.submit(draft, Some(&editing), scope)?;
            print_json(&mutation)?;
        }
        ActivityAction::Delete {
            id,
            scope,
            horizon: explicit,
        } => {
            let horizon = horizon(&config, explicit.as_deref())?;
            let target = planner
                .find(&id, horizon)
                .ok_or(format!("Activity not found: {id}"))?;
            let scope = match scope {
                Some(s) => s.parse::<UpdateMode>()?,
                None if target.parent_id.is_some() => UpdateMode::Single,
                None => UpdateMode::All,
            };

            let mutation = planner.delete(&target, scope);
            print_json(&mutation)?;
        }
    }
    Ok(())
}
