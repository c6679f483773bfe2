//! Replacement of cyclical cases by their subcases.

use std::collections::BTreeSet;

use ds_core::DsError;
use ds_signature::CaseId;

use crate::design_space::DesignSpace;

impl DesignSpace {
    /// Replace `id` in `current` by its subcases, recursively.
    ///
    /// The subcases take the parent's position, in subcase order; a subcase
    /// already present elsewhere is moved there rather than repeated. Ids
    /// that are absent from `current`, simple, or in a design space that
    /// does not resolve cycles leave `current` unchanged.
    pub fn expand_to_subcases(
        &self,
        id: &CaseId,
        mut current: Vec<CaseId>,
    ) -> Result<Vec<CaseId>, DsError> {
        if !self.resolves_cycles() || !current.contains(id) {
            return Ok(current);
        }
        let case = self.case_by_id(id)?;
        let Some(subcases) = case.subcases() else {
            return Ok(current);
        };

        let children: Vec<CaseId> = subcases.iter().map(|s| s.id().clone()).collect();
        current.retain(|c| !children.contains(c));
        let Some(position) = current.iter().position(|c| c == id) else {
            return Ok(current);
        };
        tracing::trace!(
            target: "enumerate",
            case = %id,
            subcases = children.len(),
            "expand_cyclical"
        );
        current.splice(position..=position, children.iter().cloned());
        for child in &children {
            current = self.expand_to_subcases(child, current)?;
        }
        Ok(current)
    }

    /// Expand every cyclical member of `ids`, without duplicates.
    pub fn cycles_to_subcases(&self, ids: &[CaseId]) -> Result<Vec<CaseId>, DsError> {
        let mut seen = BTreeSet::new();
        let mut current: Vec<CaseId> = ids
            .iter()
            .filter(|id| seen.insert((*id).clone()))
            .cloned()
            .collect();
        for id in ids {
            current = self.expand_to_subcases(id, current)?;
        }
        Ok(current)
    }
}
