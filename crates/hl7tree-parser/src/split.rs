//! Splitting a blob of concatenated messages.

use hl7tree_core::{control::RECORD_BREAKS, delimiters::HEADER_CODE};

/// One message-sized fragment of a blob and its byte offset in the blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Record<'a> {
    pub offset: usize,
    pub text: &'a str,
}

/// Split `source` at every header line.
///
/// A header line starts at the beginning of the blob or right after a line
/// break character. Text before the first header is kept as a record of its
/// own unless it is blank.
pub fn split_records(source: &str) -> Vec<Record<'_>> {
    let mut starts: Vec<usize> = source
        .match_indices(HEADER_CODE)
        .map(|(index, _)| index)
        .filter(|&index| {
            source[..index]
                .chars()
                .next_back()
                .is_none_or(|prev| RECORD_BREAKS.contains(&prev))
        })
        .collect();

    if starts.first() != Some(&0) {
        starts.insert(0, 0);
    }

    starts
        .iter()
        .enumerate()
        .map(|(i, &start)| {
            let end = starts.get(i + 1).copied().unwrap_or(source.len());
            Record {
                offset: start,
                text: &source[start..end],
            }
        })
        .filter(|record| !record.text.trim().is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(source: &str) -> Vec<&str> {
        split_records(source).iter().map(|record| record.text).collect()
    }

    #[test]
    fn test_single_message() {
        assert_eq!(texts("MSH|^~\\&\rPID|1"), vec!["MSH|^~\\&\rPID|1"]);
    }

    #[test]
    fn test_two_messages() {
        let source = "MSH|^~\\&|A\rPID|1\rMSH|^~\\&|B\rPID|2";
        let records = split_records(source);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].text, "MSH|^~\\&|A\rPID|1\r");
        assert_eq!(records[1].offset, 17);
        assert_eq!(records[1].text, "MSH|^~\\&|B\rPID|2");
    }

    #[test]
    fn test_header_code_inside_a_field_does_not_split() {
        assert_eq!(texts("MSH|^~\\&|MSH\rPID|MSH"), vec!["MSH|^~\\&|MSH\rPID|MSH"]);
    }

    #[test]
    fn test_blank_leading_fragment_is_dropped() {
        assert_eq!(texts("\n\n  \nMSH|^~\\&"), vec!["MSH|^~\\&"]);
    }

    #[test]
    fn test_leading_fragment_is_kept() {
        assert_eq!(texts("PID|1\nMSH|^~\\&"), vec!["PID|1\n", "MSH|^~\\&"]);
    }

    #[test]
    fn test_empty_source() {
        assert!(split_records("").is_empty());
        assert!(split_records(" \r\n").is_empty());
    }

    #[test]
    fn test_block_framed_messages() {
        let source = "\x0bMSH|^~\\&|A\r\x1c\r\x0bMSH|^~\\&|B\r\x1c\r";
        assert_eq!(split_records(source).len(), 2);
    }
}
