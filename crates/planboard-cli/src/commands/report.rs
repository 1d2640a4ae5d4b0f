use chrono::Months;
use clap::Args;
use planboard_core::activity::date::{end_of_month, parse_month};
use planboard_core::report::{build_prompt, generate_monthly_report, share_link};
use planboard_core::{Config, GeminiReportGenerator, ReportPeriod};
use serde_json::json;

use super::{open_planner, print_json, today, CliResult};

#[derive(Args)]
pub struct ReportArgs {
    /// Month to report on (YYYY-MM, default: current month)
    #[arg(long)]
    month: Option<String>,
    /// Print the prompt without calling the report service
    #[arg(long)]
    prompt_only: bool,
    /// Include a WhatsApp share link
    #[arg(long)]
    share: bool,
}

pub fn run(args: ReportArgs) -> CliResult {
    let config = Config::load_or_default();
    let planner = open_planner()?;

    let date = match args.month {
        Some(month) => parse_month(&month)?,
        None => today(),
    };

    // The report also lists the following month.
    let period_end = date
        .checked_add_months(Months::new(1))
        .map(end_of_month)
        .unwrap_or(date);
    let horizon = config.planner.horizon(today()).max(period_end);
    let activities = planner.expanded(horizon);

    if args.prompt_only {
        let period = ReportPeriod::for_month(&activities, date);
        println!("{}", build_prompt(&period, &config.report.organization)?);
        return Ok(());
    }

    let generator = GeminiReportGenerator::from_config(&config.report)?;
    let runtime = tokio::runtime::Runtime::new()?;
    let report = runtime.block_on(generate_monthly_report(
        &generator,
        &activities,
        date,
        &config.report.organization,
    ));

    let mut output = json!({
        "month": date.format("%Y-%m").to_string(),
        "report": report,
    });
    if args.share {
        output["shareLink"] = json!(share_link(&report));
    }
    print_json(&output)
}
