//! Memoized analysis results, keyed by dataset generation.

use crate::types::{AggregationResult, CorrelationMatrix};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct AggregationKey {
    pub generation: u64,
    pub dimension: String,
    pub metric: String,
}

impl AggregationKey {
    pub fn new(generation: u64, dimension: &str, metric: &str) -> Self {
        Self {
            generation,
            dimension: dimension.to_string(),
            metric: metric.to_string(),
        }
    }
}

/// Cached aggregation results and correlation matrix.
///
/// Only successful results are stored.
#[derive(Debug, Default)]
pub(crate) struct AnalysisCache {
    aggregations: RwLock<HashMap<AggregationKey, Arc<AggregationResult>>>,
    correlation: RwLock<Option<(u64, Arc<CorrelationMatrix>)>>,
}

impl AnalysisCache {
    pub fn aggregation(&self, key: &AggregationKey) -> Option<Arc<AggregationResult>> {
        self.aggregations.read().get(key).cloned()
    }

    pub fn store_aggregation(
        &self,
        key: AggregationKey,
        result: AggregationResult,
    ) -> Arc<AggregationResult> {
        let result = Arc::new(result);
        self.aggregations.write().insert(key, Arc::clone(&result));
        result
    }

    pub fn correlation(&self, generation: u64) -> Option<Arc<CorrelationMatrix>> {
        match &*self.correlation.read() {
            Some((cached, matrix)) if *cached == generation => Some(Arc::clone(matrix)),
            _ => None,
        }
    }

    pub fn store_correlation(
        &self,
        generation: u64,
        matrix: CorrelationMatrix,
    ) -> Arc<CorrelationMatrix> {
        let matrix = Arc::new(matrix);
        *self.correlation.write() = Some((generation, Arc::clone(&matrix)));
        matrix
    }

    pub fn aggregation_count(&self) -> usize {
        self.aggregations.read().len()
    }

    pub fn clear(&self) {
        self.aggregations.write().clear();
        *self.correlation.write() = None;
    }
}
