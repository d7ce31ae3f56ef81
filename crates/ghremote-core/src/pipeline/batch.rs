//! Independent per-spec processing for batches.

use crate::error::Result;

/// Outcome for one spec in a batch.
#[derive(Debug)]
pub struct BatchItem<T> {
    /// The spec string as given
    pub spec: String,
    pub result: Result<T>,
}

impl<T> BatchItem<T> {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Run `op` for every spec in order. A failure is recorded on its item and
/// never stops the remaining specs.
pub fn run_batch<S, T, F>(specs: &[S], mut op: F) -> Vec<BatchItem<T>>
where
    S: AsRef<str>,
    F: FnMut(&str) -> Result<T>,
{
    specs
        .iter()
        .map(|spec| {
            let spec = spec.as_ref();
            let result = op(spec);
            if let Err(err) = &result {
                tracing::warn!("{}: {}", spec, err);
            }
            BatchItem {
                spec: spec.to_string(),
                result,
            }
        })
        .collect()
}

/// Number of failed items.
pub fn failure_count<T>(items: &[BatchItem<T>]) -> usize {
    items.iter().filter(|item| !item.is_ok()).count()
}
