use crate::error::Result;
use crate::models::{ExtractedText, NormalizedText};
use regex::Regex;

pub const SEGMENT_SEPARATOR: &str = "\n\n";

const HORIZONTAL_WHITESPACE: &str = r"[\t\p{Zs}]+";
// Four newlines are three blank lines once every line has been trimmed.
const EXCESS_BLANK_LINES: &str = r"\n{4,}";

/// Canonicalizes every segment and joins them with a blank line, recording where each one starts.
///
/// Segments that normalize to nothing add no separator; their recorded offset is
/// the end of the text joined so far, so offsets stay non-decreasing.
pub fn normalize(extracted: &ExtractedText) -> Result<NormalizedText> {
    let horizontal = Regex::new(HORIZONTAL_WHITESPACE)?;
    let blank_lines = Regex::new(EXCESS_BLANK_LINES)?;

    let mut full_text = String::new();
    let mut segment_boundaries = Vec::with_capacity(extracted.segments.len());

    for segment in &extracted.segments {
        let normalized = normalize_segment(&segment.text, &horizontal, &blank_lines);
        if normalized.is_empty() {
            segment_boundaries.push(full_text.len());
            continue;
        }

        if !full_text.is_empty() {
            full_text.push_str(SEGMENT_SEPARATOR);
        }
        segment_boundaries.push(full_text.len());
        full_text.push_str(&normalized);
    }

    Ok(NormalizedText {
        full_text,
        segment_boundaries,
    })
}

fn normalize_segment(text: &str, horizontal: &Regex, blank_lines: &Regex) -> String {
    let unified = text.replace("\r\n", "\n").replace('\r', "\n");
    let printable = unified
        .chars()
        .filter(|ch| !ch.is_control() || *ch == '\n' || *ch == '\t')
        .collect::<String>();
    let collapsed = horizontal.replace_all(&printable, " ");

    let trimmed_lines = collapsed
        .split('\n')
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n");

    blank_lines
        .replace_all(&trimmed_lines, SEGMENT_SEPARATOR)
        .trim_start_matches('\n')
        .trim_end()
        .to_string()
}
