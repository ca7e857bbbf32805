//! Currency precision helpers built on `rust_decimal`.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};

/// Number of decimal places carried by stored currency amounts.
pub const CURRENCY_SCALE: u32 = 2;

/// Largest plan total accepted: one trillion. Keeps every derived sum far from `Decimal::MAX`.
// 1_000_000_000_000 == 0xE8_D4A5_1000 (lo = 0xD4A5_1000, mid = 0xE8).
pub const MAX_TOTAL_VALUE: Decimal = Decimal::from_parts(0xD4A5_1000, 0xE8, 0, false, 0);

/// Rounds to currency precision, halves away from zero (half-up for positive amounts).
pub fn round_currency(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(CURRENCY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Parses a user-entered amount.
///
/// Accepts plain decimals (`1000`, `1000.5`), pt-BR notation (`1.000,50`, `1000,50`), and an
/// optional `R$` prefix. Without a comma, a single dot followed by one or two digits is a
/// decimal point; any other dots are thousands separators.
pub fn parse_amount(input: &str) -> Option<Decimal> {
    let cleaned: String = input
        .trim()
        .trim_start_matches("R$")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    let normalized = if cleaned.contains(',') {
        cleaned.replace('.', "").replacen(',', ".", 1)
    } else {
        match cleaned.rfind('.') {
            Some(idx) if cleaned.matches('.').count() == 1 && (2..=3).contains(&(cleaned.len() - idx)) => {
                cleaned
            }
            Some(_) => cleaned.replace('.', ""),
            None => cleaned,
        }
    };

    Decimal::from_str(&normalized).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn rounds_half_up_to_cents() {
        assert_eq!(round_currency(dec!(20000) / dec!(36)), dec!(555.56));
        assert_eq!(round_currency(dec!(0.125)), dec!(0.13));
        assert_eq!(round_currency(dec!(0.124)), dec!(0.12));
        assert_eq!(round_currency(dec!(1000) / dec!(3)), dec!(333.33));
    }

    #[test]
    fn parses_plain_and_brazilian_notation() {
        assert_eq!(parse_amount("1000"), Some(dec!(1000)));
        assert_eq!(parse_amount("1000.50"), Some(dec!(1000.50)));
        assert_eq!(parse_amount("1.000,50"), Some(dec!(1000.50)));
        assert_eq!(parse_amount("1000,5"), Some(dec!(1000.5)));
        assert_eq!(parse_amount("R$ 20.000,00"), Some(dec!(20000.00)));
        assert_eq!(parse_amount("1.000"), Some(dec!(1000)));
        assert_eq!(parse_amount("1.234.567"), Some(dec!(1234567)));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("abc"), None);
        assert_eq!(parse_amount("R$"), None);
    }
}
