use colored::Colorize;
use std::fmt;

/// Message categories used by the CLI output helpers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Success,
    Warning,
    Error,
    Section,
}

fn styled(kind: MessageKind, message: impl fmt::Display) -> String {
    let text = message.to_string();
    match kind {
        MessageKind::Info => format!("{} {}", "[i]".cyan(), text),
        MessageKind::Success => format!("{} {}", "[ok]".green().bold(), text),
        MessageKind::Warning => format!("{} {}", "[!]".yellow().bold(), text),
        MessageKind::Error => format!("{} {}", "[x]".red().bold(), text),
        MessageKind::Section => format!("=== {} ===", text.trim()).bold().to_string(),
    }
}

pub fn info(message: impl fmt::Display) {
    println!("{}", styled(MessageKind::Info, message));
}

pub fn success(message: impl fmt::Display) {
    println!("{}", styled(MessageKind::Success, message));
}

pub fn warning(message: impl fmt::Display) {
    println!("{}", styled(MessageKind::Warning, message));
}

pub fn error(message: impl fmt::Display) {
    eprintln!("{}", styled(MessageKind::Error, message));
}

pub fn section(title: impl fmt::Display) {
    println!("{}", styled(MessageKind::Section, title));
}

/// Formats a whole amount with `.` as the thousands separator, e.g. `1.250.000`.
pub fn format_amount(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    if value < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

pub fn format_money(value: i64, currency: &str) -> String {
    format!("{} {}", format_amount(value), currency)
}

pub fn format_unsigned_money(value: u64, currency: &str) -> String {
    format_money(i64::try_from(value).unwrap_or(i64::MAX), currency)
}

pub fn format_rate(value: f64) -> String {
    format!("{value:.2}%")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amounts_use_dot_grouping() {
        assert_eq!(format_amount(0), "0");
        assert_eq!(format_amount(999), "999");
        assert_eq!(format_amount(1_000), "1.000");
        assert_eq!(format_amount(1_000_000), "1.000.000");
        assert_eq!(format_amount(-12_345), "-12.345");
    }

    #[test]
    fn rates_show_two_decimals() {
        assert_eq!(format_rate(38.0), "38.00%");
        assert_eq!(format_rate(-3.5), "-3.50%");
    }
}
