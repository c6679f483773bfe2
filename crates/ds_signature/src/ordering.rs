//! Total order over case identifier text.
//!
//! Identifiers are split on `_` and compared segment by segment. Inside a
//! segment every run of digits and every parenthesized group is one integer,
//! so `"10"` sorts after `"9"` and `"(12)3"` is the sequence `[12, 3]`. A
//! sequence that is a prefix of a longer one sorts first, which places a
//! cyclical parent immediately before its subcases.

use std::cmp::Ordering;

#[derive(Debug, PartialEq, Eq)]
enum Group<'a> {
    /// Decimal digits with leading zeros stripped.
    Number(&'a str),
    /// Anything that is not a number; sorts after all numbers.
    Other(char),
}

fn compare_decimal(a: &str, b: &str) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

fn compare_group(a: &Group<'_>, b: &Group<'_>) -> Ordering {
    match (a, b) {
        (Group::Number(x), Group::Number(y)) => compare_decimal(x, y),
        (Group::Number(_), Group::Other(_)) => Ordering::Less,
        (Group::Other(_), Group::Number(_)) => Ordering::Greater,
        (Group::Other(x), Group::Other(y)) => x.cmp(y),
    }
}

fn strip_zeros(digits: &str) -> &str {
    let trimmed = digits.trim_start_matches('0');
    if trimmed.is_empty() && !digits.is_empty() {
        &digits[digits.len() - 1..]
    } else {
        trimmed
    }
}

fn segment_groups(segment: &str) -> Vec<Group<'_>> {
    let bytes = segment.as_bytes();
    let mut groups = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i];
        if c.is_ascii_digit() {
            let start = i;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
            groups.push(Group::Number(strip_zeros(&segment[start..i])));
        } else if c == b'(' {
            let start = i + 1;
            let mut end = start;
            while end < bytes.len() && bytes[end].is_ascii_digit() {
                end += 1;
            }
            if end > start && end < bytes.len() && bytes[end] == b')' {
                groups.push(Group::Number(strip_zeros(&segment[start..end])));
                i = end + 1;
            } else {
                groups.push(Group::Other('('));
                i += 1;
            }
        } else {
            // Identifiers are ASCII; anything else is compared by char.
            let ch = segment[i..].chars().next().unwrap_or('\u{0}');
            groups.push(Group::Other(ch));
            i += ch.len_utf8();
        }
    }
    groups
}

fn compare_segment(a: &str, b: &str) -> Ordering {
    let ga = segment_groups(a);
    let gb = segment_groups(b);
    for (x, y) in ga.iter().zip(gb.iter()) {
        match compare_group(x, y) {
            Ordering::Equal => continue,
            ord => return ord,
        }
    }
    ga.len().cmp(&gb.len())
}

/// Compare two case identifiers under the case ordering.
///
/// Text that is numerically equal but spelled differently (`"01"` vs `"1"`)
/// falls back to a plain string comparison so the order stays total.
pub fn compare_identifiers(a: &str, b: &str) -> Ordering {
    let mut sa = a.split('_');
    let mut sb = b.split('_');
    loop {
        match (sa.next(), sb.next()) {
            (Some(x), Some(y)) => match compare_segment(x, y) {
                Ordering::Equal => continue,
                ord => return ord,
            },
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (None, None) => return a.cmp(b),
        }
    }
}

/// Sort identifiers in place under the case ordering.
pub fn sort_identifiers<S: AsRef<str>>(ids: &mut [S]) {
    ids.sort_by(|a, b| compare_identifiers(a.as_ref(), b.as_ref()));
}
