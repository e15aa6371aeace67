use crate::config::{ChartKind, Configuration};
use crate::value::Record;

/// Select the records that carry usable values for the configured fields.
///
/// The x field must be present and not blank. For every kind except
/// categorical the y field must be selected, present and not blank as well;
/// categorical charts skip the y check entirely. Never fails: an absent
/// dataset or an unselected x field yields no rows.
pub fn filter_rows<'a>(dataset: Option<&'a [Record]>, config: &Configuration) -> Vec<&'a Record> {
    let Some(rows) = dataset else {
        return Vec::new();
    };
    if !config.has_x() {
        return Vec::new();
    }
    let needs_y = config.chart_kind != ChartKind::Categorical;
    if needs_y && !config.has_y() {
        return Vec::new();
    }

    rows.iter()
        .filter(|r| has_value(r, &config.x_field))
        .filter(|r| !needs_y || has_value(r, &config.y_field))
        .collect()
}

/// True when `field` exists on the record with a non-blank value.
pub fn has_value(record: &Record, field: &str) -> bool {
    record.get(field).map_or(false, |v| !v.is_blank())
}
