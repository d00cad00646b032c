//! # Unit Conversion
//!
//! Loop is the integer unit everything internal uses; ICX (10^18 loop) is
//! what humans read and type. Conversion happens only at the display and
//! input edges, in pure integer arithmetic. Floating point never touches
//! an amount.

use crate::config::ICX_DECIMALS;

/// Render a loop amount as a decimal ICX string.
///
/// Trailing zeros in the fraction are trimmed, but at least one fractional
/// digit always remains: `2000000000000000000` loop renders as `"2.0"`,
/// not `"2"`.
pub fn format_icx(amount: u128) -> String {
    let scale = 10u128.pow(ICX_DECIMALS);
    let whole = amount / scale;
    let fraction = amount % scale;

    let mut digits = format!("{fraction:0width$}", width = ICX_DECIMALS as usize);
    while digits.len() > 1 && digits.ends_with('0') {
        digits.pop();
    }
    format!("{whole}.{digits}")
}

/// Parse a decimal ICX string into loop.
///
/// Accepts an optional fraction of up to 18 digits. Rejects empty parts,
/// more than one dot, non-digits, fractions too precise to represent, and
/// values that overflow `u128`.
pub fn parse_icx(text: &str) -> Option<u128> {
    let (whole_text, fraction_text) = match text.split_once('.') {
        Some((w, f)) => (w, f),
        None => (text, ""),
    };
    if whole_text.is_empty() || fraction_text.len() > ICX_DECIMALS as usize {
        return None;
    }
    if !whole_text.bytes().all(|b| b.is_ascii_digit())
        || !fraction_text.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }

    let scale = 10u128.pow(ICX_DECIMALS);
    let whole: u128 = whole_text.parse().ok()?;
    let fraction = if fraction_text.is_empty() {
        0
    } else {
        let parsed: u128 = fraction_text.parse().ok()?;
        parsed * 10u128.pow(ICX_DECIMALS - fraction_text.len() as u32)
    };
    whole.checked_mul(scale)?.checked_add(fraction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TRANSFER_FEE;

    #[test]
    fn whole_amounts_keep_one_fractional_digit() {
        assert_eq!(format_icx(2_000_000_000_000_000_000), "2.0");
        assert_eq!(format_icx(0), "0.0");
    }

    #[test]
    fn fractions_trim_trailing_zeros_only() {
        assert_eq!(format_icx(TRANSFER_FEE), "0.01");
        assert_eq!(format_icx(1), "0.000000000000000001");
        assert_eq!(format_icx(1_500_000_000_000_000_000), "1.5");
    }

    #[test]
    fn parse_inverts_format() {
        for amount in [0u128, 1, TRANSFER_FEE, 1_500_000_000_000_000_000] {
            assert_eq!(parse_icx(&format_icx(amount)), Some(amount));
        }
        assert_eq!(parse_icx("2"), Some(2_000_000_000_000_000_000));
        assert_eq!(parse_icx("0.01"), Some(TRANSFER_FEE));
    }

    #[test]
    fn malformed_input_is_rejected() {
        assert_eq!(parse_icx(""), None);
        assert_eq!(parse_icx("."), None);
        assert_eq!(parse_icx(".5"), None);
        assert_eq!(parse_icx("1.2.3"), None);
        assert_eq!(parse_icx("-1"), None);
        assert_eq!(parse_icx("1e18"), None);
        // 19 fractional digits is below loop resolution.
        assert_eq!(parse_icx("0.0000000000000000001"), None);
    }
}
