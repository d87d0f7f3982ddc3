//! Kubernetes resource quantities.

use k8s_openapi::apimachinery::pkg::api::resource::Quantity;

use crate::nodeinfo::CapacityValue;

/// Largest power of ten that fits in an `i128`.
const MAX_POW10: u32 = 38;

impl From<&Quantity> for CapacityValue {
    fn from(quantity: &Quantity) -> Self {
        match parse_quantity_value(&quantity.0) {
            Some(value) => CapacityValue::I64(value),
            None => CapacityValue::Unsupported(format!("quantity {:?}", quantity.0)),
        }
    }
}

/// Parse a quantity string such as `"4"`, `"3920m"` or `"16329580Ki"` into an
/// integer, rounding fractional results up.
///
/// Supports the following suffixes:
/// - Decimal SI: "n", "u", "m", "k", "M", "G", "T", "P", "E"
/// - Binary SI: "Ki", "Mi", "Gi", "Ti", "Pi", "Ei"
/// - Decimal exponent: "e3", "E-2", ...
///
/// Returns `None` for malformed input and for values outside `i64`.
pub fn parse_quantity_value(value: &str) -> Option<i64> {
    let value = value.trim();

    let (negative, unsigned) = match value.as_bytes().first()? {
        b'-' => (true, &value[1..]),
        b'+' => (false, &value[1..]),
        _ => (false, value),
    };

    // Find the numeric part and the suffix
    let numeric_len = unsigned
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(unsigned.len());
    let (number, suffix) = unsigned.split_at(numeric_len);

    let (int_part, frac_part) = number.split_once('.').unwrap_or((number, ""));
    if (int_part.is_empty() && frac_part.is_empty()) || frac_part.contains('.') {
        return None;
    }

    let digits = format!("{int_part}{frac_part}");
    if digits.len() > MAX_POW10 as usize {
        return None;
    }
    let mantissa: i128 = digits.parse().ok()?;

    let (decimal_exp, binary_exp) = parse_suffix(suffix)?;
    let exp10 = decimal_exp.checked_sub(i32::try_from(frac_part.len()).ok()?)?;

    let mut numerator = if negative { -mantissa } else { mantissa };
    numerator = numerator.checked_mul(2i128.checked_pow(binary_exp)?)?;

    let denominator = if exp10 >= 0 {
        numerator = numerator.checked_mul(10i128.checked_pow(exp10.unsigned_abs())?)?;
        1
    } else if exp10.unsigned_abs() > MAX_POW10 {
        // Smaller than any representable fraction: round up
        return Some(i64::from(numerator > 0));
    } else {
        10i128.pow(exp10.unsigned_abs())
    };

    let quotient = numerator.div_euclid(denominator);
    let rounded = if numerator.rem_euclid(denominator) > 0 {
        quotient + 1
    } else {
        quotient
    };

    i64::try_from(rounded).ok()
}

/// Returns `(decimal exponent, binary exponent)` for a quantity suffix.
fn parse_suffix(suffix: &str) -> Option<(i32, u32)> {
    let exponents = match suffix {
        "" => (0, 0),
        "n" => (-9, 0),
        "u" => (-6, 0),
        "m" => (-3, 0),
        "k" => (3, 0),
        "M" => (6, 0),
        "G" => (9, 0),
        "T" => (12, 0),
        "P" => (15, 0),
        "E" => (18, 0),
        "Ki" => (0, 10),
        "Mi" => (0, 20),
        "Gi" => (0, 30),
        "Ti" => (0, 40),
        "Pi" => (0, 50),
        "Ei" => (0, 60),
        _ => {
            let exponent = suffix
                .strip_prefix('e')
                .or_else(|| suffix.strip_prefix('E'))?;
            (exponent.parse::<i32>().ok()?, 0)
        }
    };
    Some(exponents)
}
