use planboard_core::Board;
use serde_json::json;

use super::{print_json, CliResult};

pub fn run() -> CliResult {
    let boards: Vec<_> = Board::ALL
        .iter()
        .map(|board| json!({ "board": board.label(), "color": board.color() }))
        .collect();
    print_json(&boards)
}
