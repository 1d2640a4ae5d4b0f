use std::path::PathBuf;

use clap::Args;
use planboard_core::import::{import_file, template_csv};
use planboard_core::Board;
use serde_json::json;

use super::{open_planner, print_json, CliResult};

#[derive(Args)]
pub struct ImportArgs {
    /// CSV file with Activity Name, Start Date, End Date, Board and Status columns
    #[arg(required_unless_present = "template")]
    file: Option<PathBuf>,
    /// Use this board for every row instead of the Board column
    #[arg(long)]
    board: Option<String>,
    /// Print a CSV template instead of importing
    #[arg(long, conflicts_with = "file")]
    template: bool,
}

pub fn run(args: ImportArgs) -> CliResult {
    if args.template {
        print!("{}", template_csv());
        return Ok(());
    }
    let Some(file) = args.file else {
        return Err("no CSV file given".into());
    };

    let board = args.board.map(|b| b.parse::<Board>()).transpose()?;
    let mut planner = open_planner()?;
    let created = import_file(&mut planner, &file, board)?;
    print_json(&json!({
        "imported": created.len(),
        "activities": created,
    }))
}
