use ds_signature::{CaseId, Signature};
use proptest::prelude::*;

/// Per-equation term counts for a small system.
pub fn arb_term_counts() -> impl Strategy<Value = Vec<u32>> {
    prop::collection::vec(1u32..14, 1..6)
}

/// A concrete signature drawn from the given term counts.
pub fn arb_signature_for(counts: Vec<u32>) -> impl Strategy<Value = Signature> {
    counts
        .into_iter()
        .map(|t| 1..=t)
        .collect::<Vec<_>>()
        .prop_map(|terms| Signature::new(terms))
}

/// Term counts together with a signature that fits them.
pub fn arb_system_signature() -> impl Strategy<Value = (Vec<u32>, Signature)> {
    arb_term_counts().prop_flat_map(|counts| {
        let sig = arb_signature_for(counts.clone());
        (Just(counts), sig)
    })
}

/// Case identifiers with at most two levels of subcases.
pub fn arb_case_id() -> impl Strategy<Value = CaseId> {
    (1u64..200, prop::collection::vec(1u32..12, 0..3))
        .prop_map(|(number, path)| CaseId::with_path(number, path))
}
