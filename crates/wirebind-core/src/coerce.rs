//! Host-side coercion rules.
//!
//! Scalar bindings never reject a value. They coerce it the way the host
//! runtime would (`"abc"` becomes NaN, NaN becomes 0 as an integer, and so
//! on) and then truncate to the native width.

use crate::Dynamic;

/// Coerce a value to a boolean.
pub fn to_boolean(value: &Dynamic) -> bool {
    match value {
        Dynamic::Undefined | Dynamic::Null => false,
        Dynamic::Bool(b) => *b,
        Dynamic::Number(n) => !(n.is_nan() || *n == 0.0),
        Dynamic::String(s) => !s.is_empty(),
        Dynamic::Function(_) | Dynamic::Object(_) => true,
    }
}

/// Coerce a value to a number.
pub fn to_number(value: &Dynamic) -> f64 {
    match value {
        Dynamic::Undefined => f64::NAN,
        Dynamic::Null => 0.0,
        Dynamic::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Dynamic::Number(n) => *n,
        Dynamic::String(s) => string_to_number(s),
        Dynamic::Function(_) | Dynamic::Object(_) => f64::NAN,
    }
}

/// Coerce a value to an unsigned 32-bit integer (modulo 2^32).
pub fn to_uint32(value: &Dynamic) -> u32 {
    let n = to_number(value);
    if !n.is_finite() {
        return 0;
    }
    n.trunc().rem_euclid(4_294_967_296.0) as u32
}

/// Coerce a value to a signed 32-bit integer (modulo 2^32, two's complement).
pub fn to_int32(value: &Dynamic) -> i32 {
    to_uint32(value) as i32
}

/// Coerce a value to its string form.
pub fn to_string(value: &Dynamic) -> String {
    match value {
        Dynamic::Undefined => "undefined".to_string(),
        Dynamic::Null => "null".to_string(),
        Dynamic::Bool(b) => b.to_string(),
        Dynamic::Number(n) => number_to_string(*n),
        Dynamic::String(s) => s.to_string(),
        Dynamic::Function(f) => format!("function {}() {{ [native code] }}", f.name()),
        Dynamic::Object(_) => "[object Object]".to_string(),
    }
}

/// Format a number the way the host prints it.
///
/// Integral values have no fractional part, and magnitudes outside
/// `[1e-6, 1e21)` use exponent form with an explicit sign (`1e+21`).
pub fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }

    if (1e-6..1e21).contains(&n.abs()) {
        return format!("{}", n);
    }

    let s = format!("{:e}", n);
    match s.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            format!("{}e+{}", mantissa, exponent)
        }
        _ => s,
    }
}

fn string_to_number(s: &str) -> f64 {
    let trimmed = s.trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}');
    if trimmed.is_empty() {
        return 0.0;
    }

    match trimmed {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    let radix = match trimmed.get(..2) {
        Some("0x" | "0X") => 16,
        Some("0o" | "0O") => 8,
        Some("0b" | "0B") => 2,
        _ => 10,
    };
    if radix != 10 {
        return parse_radix(&trimmed[2..], radix);
    }

    // Rust accepts `inf`, `nan` and friends; the host does not.
    if trimmed
        .bytes()
        .any(|b| b.is_ascii_alphabetic() && b != b'e' && b != b'E')
    {
        return f64::NAN;
    }

    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

fn parse_radix(digits: &str, radix: u32) -> f64 {
    if digits.is_empty() {
        return f64::NAN;
    }
    digits
        .chars()
        .try_fold(0.0f64, |acc, c| {
            c.to_digit(radix).map(|d| acc * radix as f64 + d as f64)
        })
        .unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(n: f64) -> Dynamic {
        Dynamic::Number(n)
    }

    #[test]
    fn boolean_coercion() {
        assert!(!to_boolean(&Dynamic::Undefined));
        assert!(!to_boolean(&Dynamic::Null));
        assert!(!to_boolean(&num(0.0)));
        assert!(!to_boolean(&num(-0.0)));
        assert!(!to_boolean(&num(f64::NAN)));
        assert!(!to_boolean(&Dynamic::string("")));
        assert!(to_boolean(&Dynamic::string("false")));
        assert!(to_boolean(&num(-3.0)));
    }

    #[test]
    fn number_coercion() {
        assert!(to_number(&Dynamic::Undefined).is_nan());
        assert_eq!(to_number(&Dynamic::Null), 0.0);
        assert_eq!(to_number(&Dynamic::Bool(true)), 1.0);
        assert_eq!(to_number(&Dynamic::string("  42  ")), 42.0);
        assert_eq!(to_number(&Dynamic::string("")), 0.0);
        assert_eq!(to_number(&Dynamic::string("-1.5e3")), -1500.0);
        assert_eq!(to_number(&Dynamic::string(".5")), 0.5);
        assert_eq!(to_number(&Dynamic::string("0x1F")), 31.0);
        assert_eq!(to_number(&Dynamic::string("0b101")), 5.0);
        assert_eq!(to_number(&Dynamic::string("-Infinity")), f64::NEG_INFINITY);
    }

    #[test]
    fn number_coercion_rejects_garbage() {
        assert!(to_number(&Dynamic::string("12abc")).is_nan());
        assert!(to_number(&Dynamic::string("inf")).is_nan());
        assert!(to_number(&Dynamic::string("nan")).is_nan());
        assert!(to_number(&Dynamic::string("0x")).is_nan());
        assert!(to_number(&Dynamic::string("0xZZ")).is_nan());
    }

    #[test]
    fn uint32_wraps() {
        assert_eq!(to_uint32(&num(-1.0)), u32::MAX);
        assert_eq!(to_uint32(&num(4_294_967_296.0)), 0);
        assert_eq!(to_uint32(&num(4_294_967_297.5)), 1);
        assert_eq!(to_uint32(&num(f64::NAN)), 0);
        assert_eq!(to_uint32(&num(f64::INFINITY)), 0);
    }

    #[test]
    fn int32_wraps() {
        assert_eq!(to_int32(&num(2_147_483_648.0)), i32::MIN);
        assert_eq!(to_int32(&num(-2.9)), -2);
        assert_eq!(to_int32(&num(4_294_967_295.0)), -1);
        assert_eq!(to_int32(&Dynamic::string("7")), 7);
    }

    #[test]
    fn string_coercion() {
        assert_eq!(to_string(&Dynamic::Undefined), "undefined");
        assert_eq!(to_string(&Dynamic::Null), "null");
        assert_eq!(to_string(&Dynamic::Bool(false)), "false");
        assert_eq!(to_string(&num(42.0)), "42");
        assert_eq!(to_string(&Dynamic::string("abc")), "abc");
    }

    #[test]
    fn number_formatting() {
        assert_eq!(number_to_string(1.5), "1.5");
        assert_eq!(number_to_string(-0.0), "0");
        assert_eq!(number_to_string(f64::NAN), "NaN");
        assert_eq!(number_to_string(f64::NEG_INFINITY), "-Infinity");
        assert_eq!(number_to_string(1e21), "1e+21");
        assert_eq!(number_to_string(1.5e-7), "1.5e-7");
        assert_eq!(number_to_string(123456789.0), "123456789");
    }
}
