// ---------------------------------------------------------------------------
// Display formatting for metrics (rounding happens only here)
// ---------------------------------------------------------------------------

/// Currency with two decimals and thousands separators: `$1,234.56`.
pub fn currency(value: f64) -> String {
    format!("${}", group_thousands(&format!("{value:.2}")))
}

/// Rounded integer with thousands separators: `45,787`.
pub fn count(value: f64) -> String {
    group_thousands(&format!("{value:.0}"))
}

/// Share of `part` in `whole` with one decimal, `0.0%` when `whole` is zero.
pub fn percent(part: f64, whole: f64) -> String {
    if whole == 0.0 {
        return "0.0%".to_string();
    }
    format!("{:.1}%", part / whole * 100.0)
}

/// Insert `,` every three digits of the integer part of a formatted number.
fn group_thousands(number: &str) -> String {
    let (sign, unsigned) = match number.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", number),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(frac) => format!("{sign}{grouped}.{frac}"),
        None => format!("{sign}{grouped}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_has_two_decimals_and_separators() {
        assert_eq!(currency(499_948.0), "$499,948.00");
        assert_eq!(currency(1_234_567.891), "$1,234,567.89");
        assert_eq!(currency(0.0), "$0.00");
        assert_eq!(currency(-1500.5), "$-1,500.50");
    }

    #[test]
    fn counts_are_rounded_integers() {
        assert_eq!(count(45_787.0), "45,787");
        assert_eq!(count(999.6), "1,000");
        assert_eq!(count(12.0), "12");
    }

    #[test]
    fn percent_handles_zero_whole() {
        assert_eq!(percent(1.0, 4.0), "25.0%");
        assert_eq!(percent(1.0, 0.0), "0.0%");
    }
}
