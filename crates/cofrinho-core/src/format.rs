//! Presentation helpers for money, dates, and percentages.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use cofrinho_domain::money::round_currency;

/// Formats currency amounts for presentation.
pub trait CurrencyFormatter: Send + Sync {
    fn format_amount(&self, amount: Decimal) -> String;
}

/// Formats dates for presentation.
pub trait DateFormatter: Send + Sync {
    fn format_date(&self, date: NaiveDate) -> String;
}

/// Brazilian real in pt-BR notation: `R$ 1.234,56`, dates as `dd/mm/yyyy`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrlFormatter;

impl BrlFormatter {
    /// Percentage with at most one decimal place, e.g. `33,3%`.
    pub fn format_percent(&self, value: Decimal) -> String {
        let rounded = value.round_dp(1).normalize();
        format!("{}%", rounded.to_string().replace('.', ","))
    }
}

impl CurrencyFormatter for BrlFormatter {
    fn format_amount(&self, amount: Decimal) -> String {
        let rounded = round_currency(amount);
        let body = format!("{:.2}", rounded.abs());
        let (integer, fraction) = body.split_once('.').unwrap_or((body.as_str(), "00"));
        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };
        format!("{sign}R$ {},{fraction}", group_thousands(integer, '.'))
    }
}

impl DateFormatter for BrlFormatter {
    fn format_date(&self, date: NaiveDate) -> String {
        date.format("%d/%m/%Y").to_string()
    }
}

fn group_thousands(digits: &str, separator: char) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (count, ch) in digits.chars().rev().enumerate() {
        if count != 0 && count % 3 == 0 {
            grouped.insert(0, separator);
        }
        grouped.insert(0, ch);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn formats_brl_amounts() {
        let fmt = BrlFormatter;
        assert_eq!(fmt.format_amount(dec!(1000)), "R$ 1.000,00");
        assert_eq!(fmt.format_amount(dec!(555.555)), "R$ 555,56");
        assert_eq!(fmt.format_amount(dec!(1234567.8)), "R$ 1.234.567,80");
        assert_eq!(fmt.format_amount(dec!(-0.16)), "-R$ 0,16");
        assert_eq!(fmt.format_amount(Decimal::ZERO), "R$ 0,00");
    }

    #[test]
    fn formats_dates_and_percentages() {
        let fmt = BrlFormatter;
        let date = NaiveDate::from_ymd_opt(2026, 2, 3).unwrap();
        assert_eq!(fmt.format_date(date), "03/02/2026");
        assert_eq!(fmt.format_percent(dec!(50)), "50%");
        assert_eq!(fmt.format_percent(dec!(100) / dec!(3)), "33,3%");
    }
}
