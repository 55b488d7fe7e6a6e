//! Duration grammar for moderation commands
//!
//! Accepts compact forms such as `30m`, `1d2h30m` or `2 hours`; the tokens
//! `permanent`, `forever`, `perm` and `0` mean "no expiry".

use chrono::Duration;

const PERMANENT_TOKENS: [&str; 4] = ["permanent", "forever", "perm", "0"];

/// Result of parsing a duration token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationToken {
    /// Explicit "no expiry"
    Permanent,
    /// A strictly positive span
    Span(Duration),
}

impl DurationToken {
    /// The span, or `None` for a permanent token
    pub fn as_duration(&self) -> Option<Duration> {
        match self {
            Self::Permanent => None,
            Self::Span(d) => Some(*d),
        }
    }
}

fn unit_seconds(unit: &str) -> Option<i64> {
    match unit {
        "s" | "sec" | "second" | "seconds" => Some(1),
        "m" | "min" | "minute" | "minutes" => Some(60),
        "h" | "hr" | "hour" | "hours" => Some(3_600),
        "d" | "day" | "days" => Some(86_400),
        "w" | "week" | "weeks" => Some(604_800),
        _ => None,
    }
}

/// Parse a duration token.
///
/// Every `<digits><optional spaces><letters>` group contributes to the total;
/// groups with an unknown unit are ignored. Returns `None` when nothing
/// usable was found or the total is not positive.
pub fn parse_duration(input: &str) -> Option<DurationToken> {
    let normalized = input.trim().to_lowercase();
    if normalized.is_empty() {
        return None;
    }
    if PERMANENT_TOKENS.contains(&normalized.as_str()) {
        return Some(DurationToken::Permanent);
    }

    let chars: Vec<char> = normalized.chars().collect();
    let mut total: i64 = 0;
    let mut i = 0;

    while i < chars.len() {
        if !chars[i].is_ascii_digit() {
            i += 1;
            continue;
        }

        let digits_start = i;
        while i < chars.len() && chars[i].is_ascii_digit() {
            i += 1;
        }
        let amount: String = chars[digits_start..i].iter().collect();

        let mut j = i;
        while j < chars.len() && chars[j].is_whitespace() {
            j += 1;
        }
        let unit_start = j;
        while j < chars.len() && chars[j].is_ascii_alphabetic() {
            j += 1;
        }
        if unit_start == j {
            continue;
        }
        let unit: String = chars[unit_start..j].iter().collect();
        i = j;

        let (Ok(amount), Some(multiplier)) = (amount.parse::<i64>(), unit_seconds(&unit)) else {
            continue;
        };
        total = total.checked_add(amount.checked_mul(multiplier)?)?;
    }

    if total <= 0 {
        return None;
    }
    Duration::try_seconds(total).map(DurationToken::Span)
}

/// Human readable form of a span in seconds
pub fn format_seconds(total_seconds: i64) -> String {
    fn plural(n: i64, unit: &str) -> String {
        if n == 1 {
            format!("{n} {unit}")
        } else {
            format!("{n} {unit}s")
        }
    }

    if total_seconds < 60 {
        format!("{total_seconds} seconds")
    } else if total_seconds < 3_600 {
        plural(total_seconds / 60, "minute")
    } else if total_seconds < 86_400 {
        plural(total_seconds / 3_600, "hour")
    } else {
        plural(total_seconds / 86_400, "day")
    }
}

/// Human readable form of an optional duration (`None` is permanent)
pub fn format_duration(duration: Option<Duration>) -> String {
    match duration {
        Some(d) if d.num_seconds() > 0 => format_seconds(d.num_seconds()),
        _ => "permanent".to_string(),
    }
}
