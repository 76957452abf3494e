//! Lenient extraction of `VEVENT` blocks straight from calendar text.
//!
//! Used when the structured parser rejects a feed. Only the fields needed for
//! display are read, and a block that cannot be understood is dropped on its
//! own without affecting its neighbours.

use super::datetime::{resolve, ResolvedDateTime};
use super::{EventSource, FeedWindow};
use crate::error::FeedResult;
use crate::pipeline::models::{RawEventRecord, SourceTag};
use lazy_static::lazy_static;
use regex::Regex;
use std::borrow::Cow;
use tracing::debug;

lazy_static! {
    static ref EVENT_BLOCK: Regex = Regex::new(r"(?is)BEGIN:VEVENT(.*?)END:VEVENT").unwrap();
    static ref FOLDED_LINE: Regex = Regex::new(r"\r?\n[ \t]").unwrap();
    static ref CONTENT_LINE: Regex =
        Regex::new(r#"(?m)^([A-Za-z0-9-]+)((?:;(?:"[^"]*"|[^:;"\r\n])*)*):(.*)$"#).unwrap();
    static ref TZID_PARAM: Regex = Regex::new(r"(?i);TZID=([^;]+)").unwrap();
}

/// Block-scanning event source
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackSource;

impl EventSource for FallbackSource {
    fn tag(&self) -> SourceTag {
        SourceTag::Fallback
    }

    /// The window is not applied; every readable block is returned
    fn extract(&self, raw_text: &str, _window: &FeedWindow) -> FeedResult<Vec<RawEventRecord>> {
        Ok(parse_fallback(raw_text))
    }
}

/// One `NAME;PARAMS:VALUE` line of a block
#[derive(Debug)]
struct ContentLine<'a> {
    name: String,
    params: &'a str,
    value: &'a str,
}

/// Extract every readable event block from `raw_text`
pub fn parse_fallback(raw_text: &str) -> Vec<RawEventRecord> {
    EVENT_BLOCK
        .captures_iter(raw_text)
        .filter_map(|caps| caps.get(1))
        .filter_map(|block| parse_block(block.as_str()))
        .collect()
}

fn parse_block(block: &str) -> Option<RawEventRecord> {
    let unfolded = unfold(block);
    let lines = content_lines(&unfolded);
    let find = |name: &str| lines.iter().find(|line| line.name == name);

    let Some(start_line) = find("DTSTART") else {
        debug!("Skipping event block without DTSTART");
        return None;
    };

    let tzid = tzid_param(start_line.params);
    let start: ResolvedDateTime = match resolve(start_line.value, tzid.as_deref()) {
        Ok(resolved) => resolved,
        Err(e) => {
            debug!(error = %e, "Skipping event block with unreadable DTSTART");
            return None;
        }
    };

    // An explicit TZID on DTEND wins over the one on DTSTART
    let end = find("DTEND").and_then(|line| {
        let end_tzid = tzid_param(line.params).or_else(|| tzid.clone());
        match resolve(line.value, end_tzid.as_deref()) {
            Ok(resolved) => Some(resolved.instant),
            Err(e) => {
                debug!(error = %e, "Ignoring unreadable DTEND");
                None
            }
        }
    });

    let text = |name: &str| find(name).and_then(|line| non_empty(&unescape(line.value)));
    let raw_value = |name: &str| find(name).and_then(|line| non_empty(line.value));
    let timestamp = |name: &str| {
        find(name)
            .and_then(|line| resolve(line.value, None).ok())
            .map(|resolved| resolved.instant)
    };

    let mut record = RawEventRecord::new(start.instant, end, SourceTag::Fallback);
    record.all_day = start.date_only;
    record.summary = text("SUMMARY");
    record.uid = raw_value("UID");
    record.description = text("DESCRIPTION");
    record.location = text("LOCATION");
    record.status = raw_value("STATUS");
    record.url = raw_value("URL");
    record.recurrence_id = raw_value("RECURRENCE-ID");
    record.created = timestamp("CREATED");
    record.last_modified = timestamp("LAST-MODIFIED");

    Some(record)
}

/// Join continuation lines onto the line they continue
fn unfold(block: &str) -> Cow<'_, str> {
    FOLDED_LINE.replace_all(block, "")
}

/// Content lines that belong to the event itself, skipping nested components
fn content_lines(block: &str) -> Vec<ContentLine<'_>> {
    let mut depth = 0usize;
    let mut lines = Vec::new();

    for caps in CONTENT_LINE.captures_iter(block) {
        let (Some(name), Some(value)) = (caps.get(1), caps.get(3)) else {
            continue;
        };
        let name = name.as_str().to_ascii_uppercase();

        match name.as_str() {
            "BEGIN" => depth += 1,
            "END" => depth = depth.saturating_sub(1),
            _ if depth == 0 => lines.push(ContentLine {
                name,
                params: caps.get(2).map_or("", |m| m.as_str()),
                value: value.as_str().trim(),
            }),
            _ => {}
        }
    }

    lines
}

fn tzid_param(params: &str) -> Option<String> {
    TZID_PARAM
        .captures(params)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().trim_matches('"').to_string())
        .filter(|name| !name.is_empty())
}

/// Decode the backslash escapes of a TEXT value
fn unescape(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    let mut chars = value.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('n') | Some('N') => result.push('\n'),
            Some(escaped @ (',' | ';' | '\\')) => result.push(escaped),
            Some(other) => {
                result.push('\\');
                result.push(other);
            }
            None => result.push('\\'),
        }
    }

    result
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
