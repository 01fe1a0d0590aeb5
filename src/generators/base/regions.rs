//! Marked regions inside generated sources.
//!
//! A region's content is everything after the line holding the start marker up to, not
//! including, the line holding the end marker. Markers are matched on whole trimmed lines, so
//! indentation and `\r\n` endings do not matter.

use std::ops::Range;

pub const AUTO_REGION_START: &str = "#region AutoBind Generated";
pub const AUTO_REGION_END: &str = "#endregion AutoBind Generated";
pub const MANUAL_REGION_START: &str = "#region Manual Code";
pub const MANUAL_REGION_END: &str = "#endregion Manual Code";

/// Byte range of the content between the first `start` line and the next `end` line
pub fn find_region(text: &str, start: &str, end: &str) -> Option<Range<usize>> {
    let mut offset = 0;
    let mut content_start = None;
    for line in text.split_inclusive('\n') {
        let trimmed = line.trim();
        match content_start {
            None if trimmed == start => content_start = Some(offset + line.len()),
            Some(begin) if trimmed == end => return Some(begin..offset),
            _ => {}
        }
        offset += line.len();
    }
    None
}

pub fn extract_region<'a>(text: &'a str, start: &str, end: &str) -> Option<&'a str> {
    find_region(text, start, end).map(|range| &text[range])
}

/// Replace a region's content, leaving the marker lines and everything else untouched
pub fn replace_region(text: &str, start: &str, end: &str, content: &str) -> Option<String> {
    let range = find_region(text, start, end)?;
    let mut out = String::with_capacity(text.len() + content.len());
    out.push_str(&text[..range.start]);
    out.push_str(content);
    out.push_str(&text[range.end..]);
    Some(out)
}

/// User code kept from an existing single-file source
pub fn extract_manual_code(existing: &str) -> Option<&str> {
    extract_region(existing, MANUAL_REGION_START, MANUAL_REGION_END)
}
