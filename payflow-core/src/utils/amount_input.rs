//! Amount-entry input mask and fiat amount parsing.

use rust_decimal::Decimal;
use std::str::FromStr;

/// Insert `,` between every group of three digits, counted from the right.
pub fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut grouped = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// Normalize a raw amount-field value after a keystroke.
///
/// Accepts digits and at most one decimal point (existing grouping
/// separators are ignored). Returns `None` when the value contains anything
/// else; the caller keeps its previous value in that case.
///
/// The integer part is regrouped with `,`; the decimal point and fractional
/// digits are kept verbatim, so `"1234."` becomes `"1,234."`.
pub fn normalize_amount_input(raw: &str) -> Option<String> {
    let stripped: String = raw.chars().filter(|ch| *ch != ',').collect();
    if !stripped.chars().all(|ch| ch.is_ascii_digit() || ch == '.') {
        return None;
    }

    let formatted = match stripped.split_once('.') {
        Some((integer, fraction)) => {
            if fraction.contains('.') {
                return None;
            }
            let mut out = group_thousands(integer);
            out.push('.');
            out.push_str(fraction);
            out
        }
        None => group_thousands(&stripped),
    };
    Some(formatted)
}

/// Parse a user-entered fiat amount into a non-negative decimal.
///
/// Grouping separators and surrounding whitespace are ignored; `"1."` and
/// `".5"` are accepted. Returns `None` for anything else.
pub fn parse_fiat_amount(input: &str) -> Option<Decimal> {
    let stripped: String = input.trim().chars().filter(|ch| *ch != ',').collect();
    if stripped.is_empty()
        || stripped == "."
        || !stripped.chars().all(|ch| ch.is_ascii_digit() || ch == '.')
    {
        return None;
    }

    let candidate = stripped.strip_suffix('.').unwrap_or(&stripped);
    let candidate = if candidate.starts_with('.') {
        format!("0{candidate}")
    } else {
        candidate.to_owned()
    };
    Decimal::from_str(&candidate).ok()
}

/// The amount-entry field of the first checkout step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AmountField {
    value: String,
}

impl AmountField {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply the field's new raw content. Returns `false` (and keeps the
    /// previous value) if the keystroke was rejected.
    pub fn input(&mut self, raw: &str) -> bool {
        match normalize_amount_input(raw) {
            Some(formatted) => {
                self.value = formatted;
                true
            }
            None => false,
        }
    }

    /// The formatted value shown to the payer.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// The value without grouping separators.
    pub fn plain(&self) -> String {
        self.value.replace(',', "")
    }

    pub fn parsed(&self) -> Option<Decimal> {
        parse_fiat_amount(&self.value)
    }
}
