//! Argument parsers shared by the command handlers.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use cofrinho_domain::{money::parse_amount, Category};

use crate::cli::core::CommandError;

pub fn amount(value: &str) -> Result<Decimal, CommandError> {
    parse_amount(value)
        .ok_or_else(|| CommandError::InvalidArguments(format!("`{value}` is not an amount")))
}

/// `YYYY-MM-DD` or `dd/mm/yyyy`.
pub fn date(value: &str) -> Result<NaiveDate, CommandError> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(value, "%d/%m/%Y"))
        .map_err(|_| {
            CommandError::InvalidArguments(format!(
                "`{value}` is not a date (use YYYY-MM-DD or dd/mm/yyyy)"
            ))
        })
}

/// `YYYY-MM` or `mm/yyyy`.
pub fn month(value: &str) -> Result<(i32, u32), CommandError> {
    let invalid =
        || CommandError::InvalidArguments(format!("`{value}` is not a month (use YYYY-MM)"));
    let (year, month) = match value.trim().split_once('-') {
        Some((year, month)) => (year, month),
        None => value
            .trim()
            .split_once('/')
            .map(|(month, year)| (year, month))
            .ok_or_else(invalid)?,
    };
    let year = year.parse::<i32>().map_err(|_| invalid())?;
    let month = month.parse::<u32>().map_err(|_| invalid())?;
    if !(1..=12).contains(&month) {
        return Err(invalid());
    }
    Ok((year, month))
}

pub fn number<T: std::str::FromStr>(value: &str, what: &str) -> Result<T, CommandError> {
    value
        .trim()
        .parse()
        .map_err(|_| CommandError::InvalidArguments(format!("`{value}` is not a valid {what}")))
}

pub fn category(value: &str) -> Result<Category, CommandError> {
    value.parse().map_err(|err: cofrinho_domain::UnknownCategory| {
        let known: Vec<&str> = Category::ALL.iter().map(|category| category.label()).collect();
        CommandError::InvalidArguments(format!("{err}; known: {}", known.join(", ")))
    })
}

pub fn require<'a>(args: &[&'a str], index: usize, usage: &str) -> Result<&'a str, CommandError> {
    args.get(index)
        .copied()
        .ok_or_else(|| CommandError::InvalidArguments(format!("usage: {usage}")))
}
