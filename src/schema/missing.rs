//! SAS missing-value repair.
//!
//! SAS numeric variables have 28 missing values: the regular `.` and the
//! special missing values `.A` through `.Z` and `._`. The export stream
//! writes special missing values as the bare letter (or underscore), which a
//! typed column cannot hold. Repair turns them into nulls before typing.

/// Whether `value` is the SAS regular missing value or empty
#[must_use]
pub fn is_regular_missing(value: &str) -> bool {
    let v = value.trim();
    v.is_empty() || v == "."
}

/// Whether `value` is one of the SAS special missing values
#[must_use]
pub fn is_special_missing(value: &str) -> bool {
    let v = value.trim();
    let v = v.strip_prefix('.').unwrap_or(v);
    matches!(v.as_bytes(), [c] if c.is_ascii_alphabetic() || *c == b'_')
}

/// Apply missing-value rules to one raw value
///
/// * empty values are always absent
/// * in numerically stored columns `.` is always absent
/// * with `fix_missing`, special missing values in numerically stored
///   columns are absent too; without it they are kept for coercion to reject
/// * with `fix_cr`, line breaks in text columns become spaces
#[must_use]
pub fn repair_value(
    value: Option<String>,
    stores_numeric: bool,
    fix_missing: bool,
    fix_cr: bool,
) -> Option<String> {
    let value = value?;

    if value.trim().is_empty() {
        return None;
    }

    if stores_numeric {
        if is_regular_missing(&value) || (fix_missing && is_special_missing(&value)) {
            return None;
        }
        return Some(value);
    }

    if fix_cr && value.contains(['\r', '\n']) {
        return Some(value.replace("\r\n", " ").replace(['\r', '\n'], " "));
    }

    Some(value)
}
