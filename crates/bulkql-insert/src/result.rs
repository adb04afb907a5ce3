//! Per-flush execution results

use bulkql_core::Value;
use serde::Serialize;

/// Outcome of one flushed statement
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionResult {
    pub affected_rows: u64,
    /// Generated keys in input row order; only set when returning was requested
    pub returned_keys: Option<Vec<Value>>,
    /// Rows in the flushed batch
    pub row_count: usize,
    pub execution_time_ms: u64,
}

/// Ordered execution results accumulated by a worker
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ResultSets {
    results: Vec<ExecutionResult>,
}

impl ResultSets {
    pub(crate) fn push(&mut self, result: ExecutionResult) {
        self.results.push(result);
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ExecutionResult> {
        self.results.iter()
    }

    pub fn as_slice(&self) -> &[ExecutionResult] {
        &self.results
    }

    pub fn last(&self) -> Option<&ExecutionResult> {
        self.results.last()
    }

    pub fn total_affected_rows(&self) -> u64 {
        self.results.iter().map(|r| r.affected_rows).sum()
    }

    pub fn total_rows(&self) -> usize {
        self.results.iter().map(|r| r.row_count).sum()
    }

    /// Every returned key across all flushes, in flush order
    pub fn returned_keys(&self) -> Vec<Value> {
        self.results
            .iter()
            .filter_map(|r| r.returned_keys.as_ref())
            .flatten()
            .cloned()
            .collect()
    }

    pub fn into_vec(self) -> Vec<ExecutionResult> {
        self.results
    }
}

impl IntoIterator for ResultSets {
    type Item = ExecutionResult;
    type IntoIter = std::vec::IntoIter<ExecutionResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.into_iter()
    }
}

impl<'a> IntoIterator for &'a ResultSets {
    type Item = &'a ExecutionResult;
    type IntoIter = std::slice::Iter<'a, ExecutionResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn result(affected_rows: u64, keys: Option<Vec<i64>>) -> ExecutionResult {
        ExecutionResult {
            affected_rows,
            returned_keys: keys.map(|k| k.into_iter().map(Value::Int64).collect()),
            row_count: affected_rows as usize,
            execution_time_ms: 0,
        }
    }

    #[test]
    fn totals_and_keys_follow_flush_order() {
        let mut sets = ResultSets::default();
        sets.push(result(2, Some(vec![1, 2])));
        sets.push(result(1, Some(vec![3])));

        assert_eq!(sets.len(), 2);
        assert_eq!(sets.total_affected_rows(), 3);
        assert_eq!(sets.total_rows(), 3);
        assert_eq!(
            sets.returned_keys(),
            vec![Value::Int64(1), Value::Int64(2), Value::Int64(3)]
        );
    }

    #[test]
    fn keys_absent_when_not_requested() {
        let mut sets = ResultSets::default();
        sets.push(result(4, None));
        assert!(sets.returned_keys().is_empty());
        assert_eq!(sets.last().and_then(|r| r.returned_keys.clone()), None);
    }
}
