use crate::value::Record;

/// Field names available for axis selection, taken from the first record only.
/// An absent or empty dataset has no fields.
pub fn field_names(dataset: Option<&[Record]>) -> Vec<String> {
    dataset
        .and_then(|rows| rows.first())
        .map(|first| first.keys().cloned().collect())
        .unwrap_or_default()
}
