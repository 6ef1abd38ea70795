//! Output formatting utilities

use chrono::{DateTime, FixedOffset, NaiveDate};
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, Color, ContentArrangement, Table};

use cardless_core::Money;

/// Print a success message
pub fn success(msg: &str) {
    println!("{}", msg.green());
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{}", msg.red());
}

/// Print a warning message
pub fn warning(msg: &str) {
    println!("{}", msg.yellow());
}

/// Print an info message
pub fn info(msg: &str) {
    println!("{}", msg.cyan());
}

/// Create a styled table
pub fn create_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Amount cell, green for money in and red for money out
pub fn money_cell(money: &Money) -> Cell {
    let cell = Cell::new(money.to_string());
    if money.is_positive() {
        cell.fg(Color::Green)
    } else {
        cell.fg(Color::Red)
    }
}

pub fn format_timestamp(ts: &DateTime<FixedOffset>) -> String {
    ts.format("%Y-%m-%d %H:%M").to_string()
}

pub fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string())
}

/// Optional text, `-` when absent
pub fn or_dash(value: Option<&str>) -> &str {
    value.unwrap_or("-")
}
