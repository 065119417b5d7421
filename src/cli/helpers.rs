//! Shared helper functions for CLI commands
//!
//! This module contains utility functions that are used across multiple
//! command modules to avoid code duplication.

/// Truncate a string to max_len, adding "..." if truncated
///
/// Useful for table columns that need fixed-width output.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

/// Escape a string for CSV output
///
/// Handles commas, quotes, and newlines according to RFC 4180.
pub fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Format a currency amount for display, two decimals
///
/// Stored and computed amounts stay full-precision; rounding happens here
/// and nowhere else.
pub fn format_money(amount: f64) -> String {
    format!("{:.2}", amount)
}

/// Format a quantity for display, trimming trailing zeros
///
/// Quantities are real numbers (0.05 m³ of concrete, 2.5 h of labor) but
/// whole values should read as whole values.
pub fn format_qty(qty: f64) -> String {
    let s = format!("{:.3}", qty);
    let trimmed = s.trim_end_matches('0').trim_end_matches('.');
    trimmed.to_string()
}

/// Format a percentage for display, one decimal
pub fn format_pct(pct: f64) -> String {
    format!("{:.1}", pct)
}
