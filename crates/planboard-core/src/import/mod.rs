//! CSV bulk import.
//!
//! The header row is matched loosely: any column whose lower-cased name
//! contains `name`, `start`, `end`, `board` or `status` feeds that field, so
//! `Activity Name,Start Date,End Date,Board,Status` works as well as
//! `name,start,end,board,status`. Import is all-or-nothing: the first bad row
//! aborts it.

use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use thiserror::Error;

use crate::activity::date::parse_date;
use crate::activity::{Activity, ActivityDraft, Board, Status};
use crate::error::DateError;
use crate::ids::IdGenerator;
use crate::series::Planner;
use crate::storage::ActivityStore;

const TEMPLATE_HEADERS: [&str; 5] = ["Activity Name", "Start Date", "End Date", "Board", "Status"];
const TEMPLATE_SAMPLE: [&str; 5] = [
    "Medical Outreach",
    "2024-12-01",
    "2024-12-03",
    "WHOLENESS MISSIONS",
    "HOUSE",
];

/// Errors that can occur while importing a CSV file
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("CSV file is empty or missing data.")]
    Empty,

    #[error("Row {line}: Missing required fields. Check if \"Board\" is present in CSV or selected above.")]
    MissingFields { line: u64 },

    #[error("Row {line}: Invalid Board \"{value}\".")]
    InvalidBoard { line: u64, value: String },

    #[error("Row {line}: Invalid Status \"{value}\".")]
    InvalidStatus { line: u64, value: String },

    #[error("Row {line}: {source}")]
    InvalidDate {
        line: u64,
        #[source]
        source: DateError,
    },

    #[error("Row {line}: End Date is before Start Date.")]
    EndBeforeStart { line: u64 },

    #[error("Failed to read CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to read CSV file: {0}")]
    Io(#[from] std::io::Error),
}

/// Column index for each field, from the header row.
#[derive(Debug, Default)]
struct Columns {
    name: Option<usize>,
    start: Option<usize>,
    end: Option<usize>,
    board: Option<usize>,
    status: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &csv::StringRecord) -> Self {
        let mut columns = Columns::default();
        for (i, header) in headers.iter().enumerate() {
            let header = header.trim().to_lowercase();
            if header.contains("name") {
                columns.name = Some(i);
            }
            if header.contains("start") {
                columns.start = Some(i);
            }
            if header.contains("end") {
                columns.end = Some(i);
            }
            if header.contains("board") {
                columns.board = Some(i);
            }
            if header.contains("status") {
                columns.status = Some(i);
            }
        }
        columns
    }
}

fn field<'r>(record: &'r csv::StringRecord, column: Option<usize>) -> Option<&'r str> {
    column
        .and_then(|i| record.get(i))
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// Parse CSV text into activity drafts.
///
/// `board_override` replaces whatever the board column says (and makes the
/// column optional). `SECRETARIAT` rows are forced to `STATUTORY` and locked.
pub fn parse_csv<R: Read>(
    reader: R,
    board_override: Option<Board>,
) -> Result<Vec<ActivityDraft>, ImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let columns = Columns::from_headers(csv_reader.headers()?);
    let mut drafts = Vec::new();

    for result in csv_reader.records() {
        let record = result?;
        if record.iter().all(|value| value.trim().is_empty()) {
            continue;
        }
        let line = record.position().map_or(0, |p| p.line());
        drafts.push(parse_row(&record, &columns, line, board_override)?);
    }

    if drafts.is_empty() {
        return Err(ImportError::Empty);
    }
    Ok(drafts)
}

fn parse_row(
    record: &csv::StringRecord,
    columns: &Columns,
    line: u64,
    board_override: Option<Board>,
) -> Result<ActivityDraft, ImportError> {
    let name = field(record, columns.name);
    let start = field(record, columns.start);
    let end = field(record, columns.end);
    let board = field(record, columns.board);
    let status = field(record, columns.status);

    let (Some(name), Some(start), Some(end), Some(status)) = (name, start, end, status) else {
        return Err(ImportError::MissingFields { line });
    };

    let board = match (board_override, board) {
        (Some(forced), _) => forced,
        (None, Some(label)) => label.parse().map_err(|_| ImportError::InvalidBoard {
            line,
            value: label.to_string(),
        })?,
        (None, None) => return Err(ImportError::MissingFields { line }),
    };
    let mut status: Status = status.parse().map_err(|_| ImportError::InvalidStatus {
        line,
        value: status.to_string(),
    })?;

    let parse = |field: &str, value: &str| -> Result<NaiveDate, ImportError> {
        parse_date(field, value).map_err(|source| ImportError::InvalidDate { line, source })
    };
    let start_date = parse("Start Date", start)?;
    let end_date = parse("End Date", end)?;
    if end_date < start_date {
        return Err(ImportError::EndBeforeStart { line });
    }

    let mut is_locked = false;
    if board == Board::Secretariat {
        status = Status::Statutory;
        is_locked = true;
    }

    Ok(ActivityDraft {
        is_locked,
        ..ActivityDraft::new(name, start_date, end_date, board, status)
    })
}

/// Read and parse a CSV file.
pub fn parse_csv_file(path: &Path, board_override: Option<Board>) -> Result<Vec<ActivityDraft>, ImportError> {
    let file = std::fs::File::open(path)?;
    parse_csv(file, board_override)
}

/// Parse `path` and store every row through `planner`.
///
/// Nothing is stored unless every row parses and validates.
pub fn import_file<S: ActivityStore, G: IdGenerator>(
    planner: &mut Planner<S, G>,
    path: &Path,
    board_override: Option<Board>,
) -> crate::error::Result<Vec<Activity>> {
    let drafts = parse_csv_file(path, board_override)?;
    Ok(planner.import(drafts)?)
}

/// Header plus one sample row, for users to fill in.
pub fn template_csv() -> String {
    format!("{}\n{}\n", TEMPLATE_HEADERS.join(","), TEMPLATE_SAMPLE.join(","))
}
