use nom::{
    branch::alt,
    bytes::complete::{tag, take_while_m_n},
    character::complete::{char, digit1},
    combinator::{map, map_res, opt},
    multi::{many0, many1},
    sequence::{delimited, pair, preceded},
    IResult,
};

use crate::case_id::CaseId;
use crate::error::SignatureError;
use crate::signature::{ParsedSignature, SignaturePattern, SignatureTerm};

// ============================================================================
// Signature grammar
//
//   signature := term+ ('_' digits)?
//   term      := digit | '(' digits ')' | '*'
// ============================================================================

fn single_digit(input: &str) -> IResult<&str, u32> {
    map_res(take_while_m_n(1, 1, |c: char| c.is_ascii_digit()), |d: &str| {
        d.parse::<u32>()
    })(input)
}

fn grouped_index(input: &str) -> IResult<&str, u32> {
    map_res(delimited(char('('), digit1, char(')')), |d: &str| {
        d.parse::<u32>()
    })(input)
}

fn parse_term(input: &str) -> IResult<&str, SignatureTerm> {
    alt((
        map(tag("*"), |_| SignatureTerm::Wildcard),
        map(grouped_index, SignatureTerm::Index),
        map(single_digit, SignatureTerm::Index),
    ))(input)
}

fn parse_subcase_suffix(input: &str) -> IResult<&str, u32> {
    preceded(char('_'), map_res(digit1, |d: &str| d.parse::<u32>()))(input)
}

/// Parse signature text such as `12(11)1`, `1*2` or `121_2`.
///
/// At most one `_` is accepted; the part after it is the subcase index.
pub fn parse_signature(input: &str) -> Result<ParsedSignature, SignatureError> {
    let text = input.trim();
    if text.is_empty() {
        return Err(SignatureError::malformed(input, "empty signature"));
    }
    if text.matches('_').count() > 1 {
        return Err(SignatureError::malformed(
            input,
            "more than one subcase separator",
        ));
    }

    let (remaining, (terms, subcase)) = pair(many1(parse_term), opt(parse_subcase_suffix))(text)
        .map_err(|e| SignatureError::malformed(input, format!("{}", e)))?;

    if !remaining.is_empty() {
        return Err(SignatureError::malformed(
            input,
            format!("unexpected input at \"{}\"", remaining),
        ));
    }

    Ok(ParsedSignature {
        pattern: SignaturePattern::new(terms),
        subcase,
    })
}

// ============================================================================
// Case identifier grammar
//
//   case_id := digits ('_' digits)*
// ============================================================================

fn parse_case_number(input: &str) -> IResult<&str, u64> {
    map_res(digit1, |d: &str| d.parse::<u64>())(input)
}

/// Parse a case identifier such as `12` or `12_2`.
pub fn parse_case_id(input: &str) -> Result<CaseId, SignatureError> {
    let text = input.trim();
    if text.is_empty() {
        return Err(SignatureError::malformed(input, "empty case identifier"));
    }

    let (remaining, (number, subcases)) =
        pair(parse_case_number, many0(parse_subcase_suffix))(text)
            .map_err(|e| SignatureError::malformed(input, format!("{}", e)))?;

    if !remaining.is_empty() {
        return Err(SignatureError::malformed(
            input,
            format!("unexpected input at \"{}\"", remaining),
        ));
    }

    Ok(CaseId::with_path(number, subcases))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::Signature;

    #[test]
    fn parses_plain_digits() {
        let parsed = parse_signature("1213").unwrap();
        assert_eq!(parsed.pattern.to_signature(), Some(Signature::new([1, 2, 1, 3])));
        assert_eq!(parsed.subcase, None);
    }

    #[test]
    fn parses_grouped_terms_and_subcase() {
        let parsed = parse_signature("(12)3_4").unwrap();
        assert_eq!(parsed.pattern.to_signature(), Some(Signature::new([12, 3])));
        assert_eq!(parsed.subcase, Some(4));
    }

    #[test]
    fn parses_wildcards() {
        let parsed = parse_signature("1*2").unwrap();
        assert_eq!(
            parsed.pattern.terms(),
            &[
                SignatureTerm::Index(1),
                SignatureTerm::Wildcard,
                SignatureTerm::Index(2)
            ]
        );
    }

    #[test]
    fn rejects_two_separators() {
        let err = parse_signature("12_1_2").unwrap_err();
        assert!(matches!(err, SignatureError::Malformed { .. }));
    }

    #[test]
    fn rejects_non_numeric_groups() {
        assert!(parse_signature("1a2").is_err());
        assert!(parse_signature("(1x)2").is_err());
        assert!(parse_signature("()").is_err());
        assert!(parse_signature("12_").is_err());
        assert!(parse_signature("").is_err());
    }

    #[test]
    fn case_ids_accept_nested_subcases() {
        let id = parse_case_id("7_2_1").unwrap();
        assert_eq!(id.number(), 7);
        assert_eq!(id.subcase_path(), &[2, 1]);
        assert!(parse_case_id("7__1").is_err());
        assert!(parse_case_id("x7").is_err());
        assert!(parse_case_id("7 1").is_err());
    }
}
