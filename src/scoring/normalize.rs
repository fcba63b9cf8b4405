//! Header normalization and the coerce-or-default numeric policy.

use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// Canonical matching token for a column header.
///
/// Accents are stripped (NFD, combining marks dropped), the text is
/// lower-cased, and every run of characters outside `a-z0-9` becomes a single
/// space. `đ`/`Đ` has no decomposition and is folded to `d` explicitly.
pub fn normalize_header(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_space = false;

    for ch in raw.nfd().filter(|c| !is_combining_mark(*c)) {
        let ch = match ch {
            'đ' | 'Đ' => 'd',
            other => other,
        };
        for lower in ch.to_lowercase() {
            if lower.is_ascii_lowercase() || lower.is_ascii_digit() {
                if pending_space && !out.is_empty() {
                    out.push(' ');
                }
                pending_space = false;
                out.push(lower);
            } else {
                pending_space = true;
            }
        }
    }

    out
}

/// Largest count a single rubric cell can carry. Larger values clamp here so
/// weighted totals stay far inside `i64`.
pub const MAX_COUNT: i64 = 1_000_000;

/// Coerce-or-default: read a count cell as a non-negative integer.
///
/// Empty, non-numeric and non-finite values read as 0. Decimal values are
/// truncated, negative values clamp to 0 and values above [`MAX_COUNT`]
/// clamp to [`MAX_COUNT`].
pub fn coerce_or_default(raw: &str) -> i64 {
    coerce_signed_or_default(raw).clamp(0, MAX_COUNT)
}

/// Like [`coerce_or_default`] but keeps the sign and has no cap beyond `i64`.
/// Used for the total column.
pub fn coerce_signed_or_default(raw: &str) -> i64 {
    let trimmed = raw.trim();
    if let Ok(n) = trimmed.parse::<i64>() {
        return n;
    }
    match trimmed.parse::<f64>() {
        // `as` saturates, so oversized values land on i64::MIN/MAX
        Ok(f) if f.is_finite() => f.trunc() as i64,
        _ => 0,
    }
}
