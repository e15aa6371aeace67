use crate::config::{ChartKind, Configuration};
use crate::value::{Record, Value};

/// A filtered row reduced to its plotted x value and numeric y.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CleanedRow<'a> {
    pub x: &'a Value,
    pub y: f64,
}

/// Convert a cell to a number. `None` means the value is not numeric.
///
/// Numbers pass through (NaN counts as invalid), booleans become 1 or 0,
/// null becomes 0 and text goes through [`parse_number`]. A missing cell is
/// handled by the caller and is always invalid.
pub fn to_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => *n,
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::Null => 0.0,
        Value::Text(s) => parse_number(s)?,
    };
    (!n.is_nan()).then_some(n)
}

/// Standard string-to-number conversion for loosely typed cells.
///
/// Surrounding whitespace is ignored and blank text is 0. Accepts decimal
/// literals with optional sign, fraction and exponent, unsigned `0x`, `0o`
/// and `0b` integers, and signed `Infinity`.
pub fn parse_number(text: &str) -> Option<f64> {
    let s = text.trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}');
    if s.is_empty() {
        return Some(0.0);
    }

    match s {
        "Infinity" | "+Infinity" => return Some(f64::INFINITY),
        "-Infinity" => return Some(f64::NEG_INFINITY),
        _ => {}
    }

    if s.len() > 2 && s.as_bytes()[0] == b'0' {
        let radix = match s.as_bytes()[1] {
            b'x' | b'X' => Some(16),
            b'o' | b'O' => Some(8),
            b'b' | b'B' => Some(2),
            _ => None,
        };
        if let Some(radix) = radix {
            return parse_radix(&s[2..], radix);
        }
    }

    if is_decimal_literal(s) {
        s.parse::<f64>().ok()
    } else {
        None
    }
}

fn parse_radix(digits: &str, radix: u32) -> Option<f64> {
    digits.chars().try_fold(0.0f64, |acc, c| {
        c.to_digit(radix).map(|d| acc * radix as f64 + d as f64)
    })
}

// [+-]? (digits ('.' digits?)? | '.' digits) ([eE] [+-]? digits)?
fn is_decimal_literal(s: &str) -> bool {
    let bytes = s.as_bytes();
    let mut i = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        i += 1;
    }

    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let mut mantissa_digits = i - int_start;

    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        let frac_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        mantissa_digits += i - frac_start;
    }
    if mantissa_digits == 0 {
        return false;
    }

    if i < bytes.len() && matches!(bytes[i], b'e' | b'E') {
        i += 1;
        if i < bytes.len() && matches!(bytes[i], b'+' | b'-') {
            i += 1;
        }
        let exp_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == exp_start {
            return false;
        }
    }

    i == bytes.len()
}

/// Pair each filtered row's x value with a numeric y, applying the
/// per-kind coercion policy:
///
/// - point, line, bar, volumetric: rows whose y is not numeric are dropped
/// - categorical with a y field: non-numeric y counts as 0, the row is kept
/// - categorical without a y field: every row counts as 1
pub fn clean_rows<'a>(rows: &[&'a Record], config: &Configuration) -> Vec<CleanedRow<'a>> {
    // x presence was established by the row filter
    let x_of = |r: &'a Record| r.get(&config.x_field).unwrap_or(&Value::Null);
    let y_of = |r: &Record| r.get(&config.y_field).and_then(to_number);

    match config.chart_kind {
        ChartKind::Categorical if config.has_y() => rows
            .iter()
            .copied()
            .map(|r| CleanedRow { x: x_of(r), y: y_of(r).unwrap_or(0.0) })
            .collect(),
        ChartKind::Categorical => rows
            .iter()
            .copied()
            .map(|r| CleanedRow { x: x_of(r), y: 1.0 })
            .collect(),
        ChartKind::Point | ChartKind::Line | ChartKind::Bar | ChartKind::Volumetric => rows
            .iter()
            .copied()
            .filter_map(|r| y_of(r).map(|y| CleanedRow { x: x_of(r), y }))
            .collect(),
    }
}
