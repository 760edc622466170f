use rust_decimal::{Decimal, RoundingStrategy};

use crate::utils::amount_input::group_thousands;

const ROUNDING: RoundingStrategy = RoundingStrategy::MidpointAwayFromZero;

/// Significant digits kept for amounts below the smallest fixed tier.
const SIGNIFICANT_DIGITS: u32 = 4;

/// Format a non-negative token amount for display.
///
/// | amount            | format                                   |
/// |-------------------|------------------------------------------|
/// | `< 0.001`         | 4 significant digits                     |
/// | `[0.001, 1)`      | 4 decimal places                         |
/// | `[1, 100)`        | 2 decimal places                         |
/// | `>= 100`          | grouped integer, at most 2 decimals      |
///
/// Tiers are chosen on the unrounded value; all rounding is to nearest,
/// ties away from zero.
pub fn format_token_amount(amount: Decimal) -> String {
    if amount < Decimal::new(1, 3) {
        to_precision(amount, SIGNIFICANT_DIGITS)
    } else if amount < Decimal::ONE {
        to_fixed(amount, 4)
    } else if amount < Decimal::ONE_HUNDRED {
        to_fixed(amount, 2)
    } else {
        to_grouped(amount, 2)
    }
}

fn to_fixed(amount: Decimal, dp: u32) -> String {
    let mut rounded = amount.round_dp_with_strategy(dp, ROUNDING);
    rounded.rescale(dp);
    rounded.to_string()
}

fn to_grouped(amount: Decimal, max_dp: u32) -> String {
    let rounded = amount.round_dp_with_strategy(max_dp, ROUNDING).normalize();
    let text = rounded.to_string();
    match text.split_once('.') {
        Some((integer, fraction)) => format!("{}.{fraction}", group_thousands(integer)),
        None => group_thousands(&text),
    }
}

/// Power of ten of the leading significant digit. `amount` must be non-zero.
fn decimal_exponent(amount: Decimal) -> i32 {
    let normalized = amount.normalize();
    let digits = normalized.mantissa().unsigned_abs().to_string().len() as i32;
    digits - 1 - normalized.scale() as i32
}

/// Precision formatting: `precision` significant digits, switching to
/// exponential notation below `1e-6`.
fn to_precision(amount: Decimal, precision: u32) -> String {
    if amount.is_zero() {
        let mut zero = Decimal::ZERO;
        zero.rescale(precision.saturating_sub(1));
        return zero.to_string();
    }

    let exponent = decimal_exponent(amount);
    let dp = precision as i32 - 1 - exponent;
    let rounded = if dp >= 0 {
        amount.round_dp_with_strategy(dp as u32, ROUNDING)
    } else {
        amount
    };

    // Rounding may carry into the next power of ten (0.00099996 -> 0.001000).
    let exponent = decimal_exponent(rounded);
    if exponent < -6 {
        let digits = rounded.normalize().mantissa().unsigned_abs().to_string();
        let mut significant: String = digits.chars().take(precision as usize).collect();
        while significant.len() < precision as usize {
            significant.push('0');
        }
        let (lead, rest) = significant.split_at(1);
        return if rest.is_empty() {
            format!("{lead}e{exponent}")
        } else {
            format!("{lead}.{rest}e{exponent}")
        };
    }

    let mut fixed = rounded;
    fixed.rescale((precision as i32 - 1 - exponent).max(0) as u32);
    fixed.to_string()
}
