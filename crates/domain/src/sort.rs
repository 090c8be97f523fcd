use std::cmp::Ordering;
use std::collections::HashSet;
use std::str::FromStr;

use mapr_ticket_core::{AppError, AppResult};

/// A named sort key for one list view.
pub trait SortKey: Copy + Eq + std::hash::Hash + FromStr<Err = AppError> + 'static {
    /// Record type ordered by this key.
    type Record;

    /// Every key accepted by the view, in documentation order.
    const ALL: &'static [Self];

    /// Returns the stable user-facing key name.
    fn as_str(&self) -> &'static str;

    /// Compares two records on this key alone.
    fn compare(self, left: &Self::Record, right: &Self::Record) -> Ordering;
}

/// Sorts records by `keys` in priority order, `keys[0]` highest.
///
/// Runs one stable sort per key from the lowest priority key to the highest,
/// which yields the same order as a composite comparator.
pub fn sort_records<K: SortKey>(records: &mut [K::Record], keys: &[K]) {
    for key in keys.iter().rev() {
        records.sort_by(|left, right| key.compare(left, right));
    }
}

/// Rejects empty and duplicated sort key lists.
pub fn validate_sort_keys<K: SortKey>(keys: &[K]) -> AppResult<()> {
    if keys.is_empty() {
        return Err(AppError::Validation(
            "sort order must name at least one key".to_owned(),
        ));
    }

    let mut seen = HashSet::new();
    for key in keys {
        if !seen.insert(*key) {
            return Err(AppError::Validation(format!(
                "duplicate sort key '{}'",
                key.as_str()
            )));
        }
    }

    Ok(())
}

/// Parses user-supplied key names into a validated sort order.
pub fn parse_sort_keys<K: SortKey>(values: &[impl AsRef<str>]) -> AppResult<Vec<K>> {
    let keys = values
        .iter()
        .map(|value| value.as_ref().trim())
        .filter(|value| !value.is_empty())
        .map(K::from_str)
        .collect::<AppResult<Vec<K>>>()?;

    validate_sort_keys(&keys)?;
    Ok(keys)
}

/// Builds the error returned for an unknown key name.
pub(crate) fn unknown_sort_key<K: SortKey>(value: &str) -> AppError {
    let accepted = K::ALL
        .iter()
        .map(SortKey::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    AppError::Validation(format!(
        "unknown sort key '{value}', expected one of: {accepted}"
    ))
}
