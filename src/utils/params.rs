/// Parse an optional integer parameter and clamp it into `[minimum, maximum]`.
///
/// Absent or unparsable values yield `default`.
pub fn clamp_int(value: Option<&str>, minimum: i64, maximum: i64, default: i64) -> i64 {
    match value.and_then(|v| v.trim().parse::<i64>().ok()) {
        Some(v) => v.clamp(minimum, maximum),
        None => default,
    }
}

/// Parse an optional result limit; negative or unparsable values mean "no limit"
pub fn parse_limit(value: Option<&str>) -> Option<usize> {
    value.and_then(|v| v.trim().parse::<usize>().ok())
}

/// Parse an optional boolean flag such as `include_ended=true`
pub fn parse_flag(value: Option<&str>) -> bool {
    matches!(
        value.map(|v| v.trim().to_ascii_lowercase()).as_deref(),
        Some("1" | "true" | "yes" | "on")
    )
}
