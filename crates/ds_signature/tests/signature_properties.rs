//! Property tests for the identifier grammar and the case ordering.

use ds_signature::{
    compare_identifiers, expand_wildcards, parse_signature, sort_identifiers, CaseId,
    SignaturePattern, SignatureTerm,
};
use proptest::prelude::*;
use std::cmp::Ordering;
use std::convert::Infallible;

mod strategies;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn signature_text_round_trips((_counts, sig) in strategies::arb_system_signature()) {
        let text = sig.to_string();
        let parsed = parse_signature(&text).unwrap();
        prop_assert_eq!(parsed.subcase, None);
        prop_assert_eq!(parsed.pattern.to_signature(), Some(sig));
    }

    #[test]
    fn single_wildcard_expands_to_every_term(
        (counts, sig) in strategies::arb_system_signature(),
        position in any::<prop::sample::Index>(),
    ) {
        let i = position.index(sig.len());
        let mut terms: Vec<SignatureTerm> =
            sig.terms().iter().map(|&t| SignatureTerm::Index(t)).collect();
        terms[i] = SignatureTerm::Wildcard;
        let pattern = SignaturePattern::new(terms);

        let expanded = expand_wildcards::<_, Infallible>(&pattern, |eq| Ok(counts[eq])).unwrap();

        prop_assert_eq!(expanded.len(), counts[i] as usize);
        for (k, candidate) in expanded.iter().enumerate() {
            prop_assert_eq!(candidate.terms()[i], k as u32 + 1);
            for (j, (&a, &b)) in candidate.terms().iter().zip(sig.terms()).enumerate() {
                if j != i {
                    prop_assert_eq!(a, b);
                }
            }
        }
    }

    #[test]
    fn sorting_is_idempotent(ids in prop::collection::vec(strategies::arb_case_id(), 0..40)) {
        let mut once: Vec<String> = ids.iter().map(|i| i.to_string()).collect();
        sort_identifiers(&mut once);
        let mut twice = once.clone();
        sort_identifiers(&mut twice);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn text_order_matches_case_id_order(a in strategies::arb_case_id(), b in strategies::arb_case_id()) {
        let by_text = compare_identifiers(&a.to_string(), &b.to_string());
        prop_assert_eq!(by_text, a.cmp(&b));
    }

    #[test]
    fn parent_sorts_right_before_first_subcase(id in strategies::arb_case_id(), k in 1u32..6) {
        let parent = id.clone();
        let child = id.subcase(k);
        prop_assert_eq!(compare_identifiers(&parent.to_string(), &child.to_string()), Ordering::Less);
        prop_assert!(parent.is_ancestor_of(&child));
    }

    #[test]
    fn case_id_text_round_trips(id in strategies::arb_case_id()) {
        let back: CaseId = id.to_string().parse().unwrap();
        prop_assert_eq!(back, id);
    }
}
