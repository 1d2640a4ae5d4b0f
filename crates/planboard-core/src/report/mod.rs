//! Monthly activity report.
//!
//! A report covers the viewed month plus the month after it. The text itself
//! is written by a language model behind [`ReportGenerator`]; this module
//! picks the activities, builds the prompt and turns service failures into
//! the fixed fallback texts.

use std::future::Future;

use chrono::{Months, NaiveDate};
use indoc::formatdoc;
use reqwest::Client;
use serde_json::json;
use tracing::{debug, error};

use crate::activity::date::{end_of_month, start_of_month};
use crate::activity::Activity;
use crate::error::ReportError;
use crate::filter::{overlapping, sort_chronological, DateRange};
use crate::storage::ReportConfig;

/// Returned when the service call fails.
pub const GENERATION_ERROR_TEXT: &str = "Error generating report with Gemini.";
/// Returned when the service answers with no text.
pub const EMPTY_REPORT_TEXT: &str = "Failed to generate report.";

/// Activities of the reported month and of the month after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPeriod {
    /// First day of the reported month.
    pub month: NaiveDate,
    pub current: Vec<Activity>,
    pub upcoming: Vec<Activity>,
}

impl ReportPeriod {
    /// Select from `activities` (already expanded) for the month containing
    /// `date`.
    pub fn for_month(activities: &[Activity], date: NaiveDate) -> Self {
        let month = start_of_month(date);
        let next = month.checked_add_months(Months::new(1)).unwrap_or(month);

        let select = |first: NaiveDate| {
            let mut selected = overlapping(activities, DateRange::new(first, end_of_month(first)));
            sort_chronological(&mut selected);
            selected
        };

        Self {
            month,
            current: select(month),
            upcoming: select(next),
        }
    }

    /// `MARCH 2024`
    pub fn title(&self) -> String {
        self.month.format("%B %Y").to_string().to_uppercase()
    }
}

/// Prompt asking for the report in the department-by-department layout.
pub fn build_prompt(period: &ReportPeriod, organization: &str) -> Result<String, ReportError> {
    let title = period.title();
    let current = serde_json::to_string(&period.current)?;
    let upcoming = serde_json::to_string(&period.upcoming)?;

    Ok(formatdoc! {"
        Generate a professional {organization} Monthly Activity Report based on these lists:
        Current Month ({title}): {current}
        Next Month: {upcoming}

        Strictly follow this formatting template:
        - ACTIVITIES FOR THE MONTH OF {title}
        PRAYER DEPARTMENT (RAPHA-LIFELINE): [Activity Name] from [Start Date] to [End Date]
        MISSIONS DEPARTMENT (WHOLENESS MISSIONS): [Activity Name] from [Start Date] to [End Date]
        ACADEMIC DEPARTMENT (EXCEL): [Activity Name] from [Start Date] to [End Date]
        OTHER ACTIVITIES: [Summary of all other boards, noting their date ranges]
        UPCOMING ACTIVITIES: [Next Month's list grouped simply by board with date ranges]

        If a department has no activities, mark it as \"None scheduled\".
        If an activity is a single day (Start Date equals End Date), just use \"[Activity Name] on [Date]\".
    "})
}

/// Text generation service.
pub trait ReportGenerator {
    /// Answer `prompt`. An empty string means the service produced nothing.
    fn generate(&self, prompt: &str) -> impl Future<Output = Result<String, ReportError>> + Send;
}

/// Gemini `generateContent` client.
pub struct GeminiReportGenerator {
    client: Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl GeminiReportGenerator {
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            model: model.into(),
            api_key: api_key.into(),
        }
    }

    /// Build from config, reading the key from `config.api_key_env`.
    ///
    /// # Errors
    /// Returns [`ReportError::MissingApiKey`] if the variable is unset or empty.
    pub fn from_config(config: &ReportConfig) -> Result<Self, ReportError> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ReportError::MissingApiKey {
                var: config.api_key_env.clone(),
            })?;
        Ok(Self::new(&config.endpoint, &config.model, api_key))
    }

    fn url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            self.model
        )
    }
}

impl ReportGenerator for GeminiReportGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, ReportError> {
        let body = json!({ "contents": [{ "parts": [{ "text": prompt }] }] });

        let resp = self
            .client
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(ReportError::Http {
                status: status.as_u16(),
                body: text,
            });
        }

        let payload: serde_json::Value = resp.json().await?;
        Ok(response_text(&payload))
    }
}

/// Concatenated text parts of the first candidate.
fn response_text(payload: &serde_json::Value) -> String {
    payload["candidates"][0]["content"]["parts"]
        .as_array()
        .map(|parts| {
            parts
                .iter()
                .filter_map(|part| part["text"].as_str())
                .collect::<String>()
        })
        .unwrap_or_default()
}

/// Produce the report for the month containing `date`.
///
/// Never fails: service errors are logged and replaced by
/// [`GENERATION_ERROR_TEXT`], an empty answer by [`EMPTY_REPORT_TEXT`].
pub async fn generate_monthly_report<G: ReportGenerator>(
    generator: &G,
    activities: &[Activity],
    date: NaiveDate,
    organization: &str,
) -> String {
    let period = ReportPeriod::for_month(activities, date);
    debug!(
        month = %period.month,
        current = period.current.len(),
        upcoming = period.upcoming.len(),
        "generating monthly report"
    );

    let result = match build_prompt(&period, organization) {
        Ok(prompt) => generator.generate(&prompt).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(text) if text.trim().is_empty() => EMPTY_REPORT_TEXT.to_string(),
        Ok(text) => text,
        Err(e) => {
            error!(error = %e, "report generation failed");
            GENERATION_ERROR_TEXT.to_string()
        }
    }
}

/// WhatsApp share link carrying `report` as the message text.
pub fn share_link(report: &str) -> String {
    format!("https://wa.me/?text={}", urlencoding::encode(report))
}
