//! Decoding and narrowing of `gh pr list` output.
//!
//! The list operation is a "find one" query: it fetches a bounded result
//! set with a fixed machine-readable field selection, then picks a single
//! pull request number out of it.

use regex::Regex;

use crate::{error::Error, types::PrSummary};

/// Field selection requested from the list query.
pub const LIST_FIELDS: &str = "number,headRefName";

/// Upper bound on rows requested from the list query.
pub const LIST_LIMIT: &str = "1000";

pub(crate) fn decode(output: &str) -> Result<Vec<PrSummary>, Error> {
    serde_json::from_str(output).map_err(Error::Decode)
}

/// Picks the first matching pull request number out of decoded rows.
///
/// An empty `head_regex` means no filtering: the first row wins, and zero
/// rows is [`Error::EmptyResult`]. With a pattern, the first row whose head
/// branch matches wins; no match is [`Error::NoMatch`] even when the row
/// set itself was empty, since the filter path was taken.
pub(crate) fn select(rows: &[PrSummary], head_regex: &str) -> Result<String, Error> {
    if !head_regex.is_empty() {
        let pattern = Regex::new(head_regex).map_err(Error::InvalidPattern)?;
        return rows
            .iter()
            .find(|row| pattern.is_match(&row.head_ref_name))
            .map(|row| row.number.to_string())
            .ok_or(Error::NoMatch);
    }

    rows.first()
        .map(|row| row.number.to_string())
        .ok_or(Error::EmptyResult)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(entries: &[(u64, &str)]) -> Vec<PrSummary> {
        entries
            .iter()
            .map(|(number, head)| PrSummary {
                number: *number,
                head_ref_name: head.to_string(),
            })
            .collect()
    }

    #[test]
    fn decodes_and_selects_first_regex_match() {
        let decoded = decode(r#"[{"number":7,"headRefName":"feat/x"}]"#).unwrap();
        assert_eq!(select(&decoded, "^feat/").unwrap(), "7");
    }

    #[test]
    fn regex_picks_first_match_in_returned_order() {
        let rows = rows(&[(1, "main"), (5, "release/2"), (9, "release/3")]);
        assert_eq!(select(&rows, "^release/").unwrap(), "5");
    }

    #[test]
    fn no_regex_returns_first_row() {
        let rows = rows(&[(42, "chore/bump"), (43, "fix/null")]);
        assert_eq!(select(&rows, "").unwrap(), "42");
    }

    #[test]
    fn unmatched_regex_is_no_match_even_with_rows() {
        let rows = rows(&[(1, "main")]);
        assert!(matches!(select(&rows, "^feat/"), Err(Error::NoMatch)));
    }

    #[test]
    fn empty_rows_without_regex_is_empty_result() {
        assert!(matches!(select(&[], ""), Err(Error::EmptyResult)));
    }

    #[test]
    fn empty_rows_with_regex_is_no_match() {
        assert!(matches!(select(&[], "^feat/"), Err(Error::NoMatch)));
    }

    #[test]
    fn invalid_pattern_is_reported_before_selection() {
        let rows = rows(&[(1, "main")]);
        assert!(matches!(select(&rows, "("), Err(Error::InvalidPattern(_))));
    }

    #[test]
    fn malformed_output_is_a_decode_error() {
        assert!(matches!(decode("not json"), Err(Error::Decode(_))));
        assert!(matches!(decode(r#"{"number":7}"#), Err(Error::Decode(_))));
    }
}
