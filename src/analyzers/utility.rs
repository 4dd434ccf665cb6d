use rust_decimal::{Decimal, RoundingStrategy};

/// Formats a dollar amount with thousands separators, e.g. `$1,234,567.89`.
pub fn format_usd(amount: Decimal, decimals: u32) -> String {
    let rounded = amount.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let digits = format!("{:.*}", decimals as usize, rounded.abs());

    let (whole, fraction) = match digits.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (digits.as_str(), None),
    };

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if negative { "-" } else { "" };
    match fraction {
        Some(fraction) => format!("{sign}${grouped}.{fraction}"),
        None => format!("{sign}${grouped}"),
    }
}

/// Share of `part` in `total` as a percentage. Returns 0.0 for a zero total.
pub fn percent(part: Decimal, total: Decimal) -> Decimal {
    if total.is_zero() {
        Decimal::ZERO
    } else {
        (part / total * Decimal::ONE_HUNDRED).round_dp(1)
    }
}

/// Truncates to `max` characters, marking the cut with `...`.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let keep = max.saturating_sub(3);
    let mut out: String = text.chars().take(keep).collect();
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_usd() {
        assert_eq!(format_usd(Decimal::new(123_456_789, 2), 2), "$1,234,567.89");
        assert_eq!(format_usd(Decimal::from(150_000), 0), "$150,000");
        assert_eq!(format_usd(Decimal::new(99_950, 2), 0), "$1,000");
        assert_eq!(format_usd(Decimal::from(999), 0), "$999");
        assert_eq!(format_usd(Decimal::ZERO, 2), "$0.00");
        assert_eq!(format_usd(Decimal::from(-1500), 0), "-$1,500");
    }

    #[test]
    fn test_percent() {
        assert_eq!(percent(Decimal::from(1), Decimal::from(4)), Decimal::new(250, 1));
        assert_eq!(percent(Decimal::from(1), Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 45), "short");
        assert_eq!(truncate("abcdefghij", 8), "abcde...");
        assert_eq!(truncate("ééééé", 4), "é...");
    }
}
