// Caller-side memoization of engine results

use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::config::{ChartKind, Configuration};
use crate::engine::evaluate;
use crate::series::Series;
use crate::value::Record;

/// Identity of a loaded dataset. A reloaded or edited dataset must get a new id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DatasetId(u64);

impl DatasetId {
    /// A process-unique id.
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        DatasetId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CacheKey {
    dataset: Option<DatasetId>,
    x_field: String,
    y_field: String,
    chart_kind: ChartKind,
}

impl CacheKey {
    fn new(dataset: Option<DatasetId>, config: &Configuration) -> Self {
        Self {
            dataset,
            x_field: config.x_field.clone(),
            y_field: config.y_field.clone(),
            chart_kind: config.chart_kind,
        }
    }
}

/// Holds the most recent result and recomputes only when the
/// `(dataset, xField, yField, chartKind)` tuple changes.
#[derive(Debug, Default)]
pub struct SeriesCache {
    last: Option<(CacheKey, Rc<[Series]>)>,
    hits: u64,
    misses: u64,
}

impl SeriesCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_evaluate(
        &mut self,
        dataset: Option<(DatasetId, &[Record])>,
        config: &Configuration,
    ) -> Rc<[Series]> {
        let key = CacheKey::new(dataset.map(|(id, _)| id), config);

        if let Some((cached_key, series)) = &self.last {
            if *cached_key == key {
                self.hits += 1;
                return Rc::clone(series);
            }
        }

        self.misses += 1;
        log::debug!(
            "Recomputing series for x='{}' y='{}' kind={}",
            key.x_field,
            key.y_field,
            key.chart_kind
        );
        let series: Rc<[Series]> = evaluate(dataset.map(|(_, rows)| rows), config).into();
        self.last = Some((key, Rc::clone(&series)));
        series
    }

    /// Drop the cached result so the next call recomputes.
    pub fn invalidate(&mut self) {
        self.last = None;
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::record;

    #[test]
    fn test_hits_on_same_key() {
        let data = vec![record([("a", 1i64), ("b", 2)])];
        let id = DatasetId::next();
        let config = Configuration::new("a", ChartKind::Point).with_y("b");
        let mut cache = SeriesCache::new();

        let first = cache.get_or_evaluate(Some((id, data.as_slice())), &config);
        let second = cache.get_or_evaluate(Some((id, data.as_slice())), &config);
        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!((cache.hits(), cache.misses()), (1, 1));
    }

    #[test]
    fn test_recomputes_on_change() {
        let data = vec![record([("a", 1i64), ("b", 2)])];
        let id = DatasetId::next();
        let mut cache = SeriesCache::new();

        let point = Configuration::new("a", ChartKind::Point).with_y("b");
        let first = cache.get_or_evaluate(Some((id, data.as_slice())), &point);

        let bar = Configuration::new("a", ChartKind::Bar).with_y("b");
        let second = cache.get_or_evaluate(Some((id, data.as_slice())), &bar);
        assert!(!Rc::ptr_eq(&first, &second));
        assert_eq!(second[0].kind(), ChartKind::Bar);

        let other = DatasetId::next();
        cache.get_or_evaluate(Some((other, data.as_slice())), &bar);
        assert_eq!(cache.misses(), 3);

        cache.invalidate();
        cache.get_or_evaluate(Some((other, data.as_slice())), &bar);
        assert_eq!(cache.misses(), 4);
    }

    #[test]
    fn test_absent_dataset() {
        let mut cache = SeriesCache::new();
        let config = Configuration::new("a", ChartKind::Point).with_y("b");
        assert!(cache.get_or_evaluate(None, &config).is_empty());
    }
}
