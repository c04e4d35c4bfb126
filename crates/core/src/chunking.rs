use crate::error::Result;
use crate::models::{Chunk, NormalizedText, ProcessingConfig};
use regex::Regex;
use sha2::{Digest, Sha256};

const SENTENCE_END: &str = r#"[.!?]["'\)\]”’]*\s"#;

/// Splits normalized text into overlapping chunks of at most `max_chunk_chars` characters.
///
/// Each cut is the furthest candidate inside the window, searched in order of
/// preference: segment boundary, sentence end, whitespace, hard cut at the limit.
/// Candidates must lie more than `overlap_chars` past the chunk start so every
/// step advances.
pub fn chunk(normalized: &NormalizedText, config: &ProcessingConfig) -> Result<Vec<Chunk>> {
    config.validate()?;
    let text = normalized.full_text.as_str();

    if text.is_empty() {
        return Ok(vec![make_chunk(0, text, 0, 0)]);
    }

    let sentence_end = Regex::new(SENTENCE_END)?;
    let mut chunks = Vec::new();
    let mut start = 0;

    loop {
        let limit = advance_chars(text, start, config.max_chunk_chars);
        let end = if limit == text.len() {
            limit
        } else {
            let floor = advance_chars(text, start, config.overlap_chars);
            select_cut(text, &normalized.segment_boundaries, &sentence_end, floor, limit)
        };

        chunks.push(make_chunk(chunks.len(), text, start, end));

        if end >= text.len() {
            break;
        }
        start = retreat_chars(text, end, config.overlap_chars);
    }

    Ok(chunks)
}

/// Picks a cut in `(floor, limit]`; both offsets sit on char boundaries.
///
/// Segment boundaries come from the caller, so they may be unsorted or point
/// inside a character; those that do are ignored.
fn select_cut(
    text: &str,
    boundaries: &[usize],
    sentence_end: &Regex,
    floor: usize,
    limit: usize,
) -> usize {
    if let Some(boundary) = boundaries
        .iter()
        .copied()
        .filter(|&offset| offset > floor && offset <= limit && text.is_char_boundary(offset))
        .max()
    {
        return boundary;
    }

    let window = &text[floor..limit];

    if let Some(sentence) = sentence_end.find_iter(window).last() {
        return floor + sentence.end();
    }

    if let Some((index, ch)) = window.char_indices().rev().find(|(_, ch)| ch.is_whitespace()) {
        return floor + index + ch.len_utf8();
    }

    limit
}

/// Byte offset `count` characters after `from`, clamped to the end of `text`.
fn advance_chars(text: &str, from: usize, count: usize) -> usize {
    text[from..]
        .char_indices()
        .nth(count)
        .map(|(index, _)| from + index)
        .unwrap_or(text.len())
}

/// Byte offset `count` characters before `to`, clamped to zero.
fn retreat_chars(text: &str, to: usize, count: usize) -> usize {
    if count == 0 {
        return to;
    }
    text[..to]
        .char_indices()
        .rev()
        .nth(count - 1)
        .map(|(index, _)| index)
        .unwrap_or(0)
}

fn make_chunk(index: usize, text: &str, start: usize, end: usize) -> Chunk {
    let body = &text[start..end];
    Chunk {
        index,
        chunk_id: make_chunk_id(index, body),
        text: body.to_string(),
        start_offset: start,
        end_offset: end,
    }
}

fn make_chunk_id(index: usize, text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update((index as u64).to_le_bytes());
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}
