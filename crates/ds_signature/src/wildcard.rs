//! Wildcard expansion of partial signatures.

use crate::signature::{Signature, SignaturePattern};

/// Expand every `*` of `pattern` into concrete signatures.
///
/// The leftmost wildcard is fixed first, to each term index `1..=t` in
/// increasing order where `t = term_count(position)`, and the remaining
/// pattern is expanded depth-first. A pattern without wildcards yields
/// itself. A position with a term count of zero yields nothing.
pub fn expand_wildcards<F, E>(
    pattern: &SignaturePattern,
    mut term_count: F,
) -> Result<Vec<Signature>, E>
where
    F: FnMut(usize) -> Result<u32, E>,
{
    let mut out = Vec::new();
    expand_into(pattern, &mut term_count, &mut out)?;
    Ok(out)
}

fn expand_into<F, E>(
    pattern: &SignaturePattern,
    term_count: &mut F,
    out: &mut Vec<Signature>,
) -> Result<(), E>
where
    F: FnMut(usize) -> Result<u32, E>,
{
    let Some(position) = pattern.first_wildcard() else {
        if let Some(signature) = pattern.to_signature() {
            out.push(signature);
        }
        return Ok(());
    };

    let count = term_count(position)?;
    for term in 1..=count {
        expand_into(&pattern.substitute(position, term), term_count, out)?;
    }
    Ok(())
}
