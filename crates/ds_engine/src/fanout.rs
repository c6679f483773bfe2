//! Independent feasibility checks, sequential or through rayon.

use ds_core::DsError;
use rayon::prelude::*;

/// Run `check` on every item, keeping item order in the result.
///
/// The first error aborts the batch; no partial result is returned.
pub(crate) fn evaluate<T, F>(
    parallel: bool,
    items: &[T],
    check: F,
) -> Result<Vec<bool>, DsError>
where
    T: Sync,
    F: Fn(&T) -> Result<bool, DsError> + Sync,
{
    if parallel && items.len() > 1 {
        items.par_iter().map(&check).collect()
    } else {
        items.iter().map(check).collect()
    }
}
