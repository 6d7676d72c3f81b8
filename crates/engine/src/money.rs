//! Peso amounts.
//!
//! Amounts are stored as i64 centavos to keep arithmetic exact; formatting
//! to `1234.56` happens only at the edges (CSV, PDF, messages).

/// Format centavos as a decimal peso string.
pub fn format_minor(amount_minor: i64) -> String {
    let sign = if amount_minor < 0 { "-" } else { "" };
    let abs = amount_minor.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}

#[cfg(test)]
mod tests {
    use super::format_minor;

    #[test]
    fn formats_whole_and_fractional_amounts() {
        assert_eq!(format_minor(500_000), "5000.00");
        assert_eq!(format_minor(123_456), "1234.56");
        assert_eq!(format_minor(5), "0.05");
        assert_eq!(format_minor(0), "0.00");
    }

    #[test]
    fn formats_negative_amounts() {
        assert_eq!(format_minor(-150), "-1.50");
    }
}
