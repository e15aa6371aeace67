use crate::config::ChartKind;

/// How cleaned rows are shaped into a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Parallel x/y sequences in row order (point, line, bar)
    Paired(ChartKind),
    /// Label/magnitude sums in first-seen label order
    Aggregated,
    /// Parallel x/y plus the row ordinal as z
    Volumetric,
}

/// Pick the assembly strategy for a chart kind. Stateless.
pub fn select_strategy(kind: ChartKind) -> Strategy {
    match kind {
        ChartKind::Point | ChartKind::Line | ChartKind::Bar => Strategy::Paired(kind),
        ChartKind::Categorical => Strategy::Aggregated,
        ChartKind::Volumetric => Strategy::Volumetric,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_kind_has_a_strategy() {
        assert_eq!(select_strategy(ChartKind::Point), Strategy::Paired(ChartKind::Point));
        assert_eq!(select_strategy(ChartKind::Line), Strategy::Paired(ChartKind::Line));
        assert_eq!(select_strategy(ChartKind::Bar), Strategy::Paired(ChartKind::Bar));
        assert_eq!(select_strategy(ChartKind::Categorical), Strategy::Aggregated);
        assert_eq!(select_strategy(ChartKind::Volumetric), Strategy::Volumetric);
    }

    #[test]
    fn test_unrecognized_name_assembles_as_point() {
        let kind = ChartKind::from_name_lenient("donut");
        assert_eq!(select_strategy(kind), Strategy::Paired(ChartKind::Point));
    }
}
