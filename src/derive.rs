use serde::Serialize;

/// Marker the trend service puts in messages when it has nothing for a pitcher.
pub const NO_DATA_MARKER: &str = "No data available";

pub const RATE_DECIMALS: usize = 3;
pub const TEMP_DECIMALS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Direction {
    Better,
    Worse,
    Neutral,
}

/// Hot/cold classification read out of a free-text trend message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TrendStatus {
    Cold,
    Hot,
    Consistent(Direction),
    Unknown,
}

impl TrendStatus {
    pub fn label(self) -> &'static str {
        match self {
            TrendStatus::Cold => "COLD",
            TrendStatus::Hot => "HOT",
            TrendStatus::Consistent(_) => "CONSISTENT",
            TrendStatus::Unknown => "Unknown",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            TrendStatus::Cold => "❄",
            TrendStatus::Hot => "🔥",
            TrendStatus::Consistent(Direction::Better) => "▲",
            TrendStatus::Consistent(Direction::Worse) => "▼",
            TrendStatus::Consistent(Direction::Neutral) => "●",
            TrendStatus::Unknown => "-",
        }
    }
}

fn has_data(message: Option<&str>) -> Option<&str> {
    let message = message?;
    if message.trim().is_empty() || message.contains(NO_DATA_MARKER) {
        return None;
    }
    Some(message)
}

/// First signed decimal directly followed by `%`, or 0 when there is none.
pub fn extract_percentage(message: Option<&str>) -> f64 {
    let Some(message) = has_data(message) else {
        return 0.0;
    };
    let bytes = message.as_bytes();
    for start in 0..bytes.len() {
        if let Some(end) = match_percentage_at(bytes, start) {
            return message[start..end].parse::<f64>().unwrap_or(0.0);
        }
    }
    0.0
}

// Matches `[-+]?\d+(\.\d+)?%` anchored at `start`; returns the end of the number.
fn match_percentage_at(bytes: &[u8], start: usize) -> Option<usize> {
    let mut idx = start;
    if matches!(bytes.get(idx), Some(b'+') | Some(b'-')) {
        idx += 1;
    }
    let int_start = idx;
    while bytes.get(idx).is_some_and(u8::is_ascii_digit) {
        idx += 1;
    }
    if idx == int_start {
        return None;
    }
    if bytes.get(idx) == Some(&b'.') {
        let frac_start = idx + 1;
        let mut frac_end = frac_start;
        while bytes.get(frac_end).is_some_and(u8::is_ascii_digit) {
            frac_end += 1;
        }
        if frac_end > frac_start && bytes.get(frac_end) == Some(&b'%') {
            return Some(frac_end);
        }
    }
    if bytes.get(idx) == Some(&b'%') {
        return Some(idx);
    }
    None
}

/// Precedence is Cold, then Hot, then Consistent; anything else is Unknown.
pub fn classify_status(message: Option<&str>) -> TrendStatus {
    let Some(message) = has_data(message) else {
        return TrendStatus::Unknown;
    };
    if message.contains("COLD") {
        TrendStatus::Cold
    } else if message.contains("HOT") {
        TrendStatus::Hot
    } else if message.contains("CONSISTENT") {
        let direction = if message.contains("better") {
            Direction::Better
        } else if message.contains("worse") {
            Direction::Worse
        } else {
            Direction::Neutral
        };
        TrendStatus::Consistent(direction)
    } else {
        TrendStatus::Unknown
    }
}

pub fn format_rate(value: f64) -> String {
    format!("{value:.prec$}", prec = RATE_DECIMALS)
}

pub fn format_temp(value: f64) -> String {
    format!("{value:.prec$}", prec = TEMP_DECIMALS)
}

pub fn truncate_date(timestamp: &str) -> &str {
    let trimmed = timestamp.trim();
    trimmed.split('T').next().unwrap_or(trimmed)
}

pub fn bbref_player_url(bbref_id: &str) -> Option<String> {
    let first = bbref_id.chars().next()?;
    Some(format!(
        "https://www.baseball-reference.com/players/{first}/{bbref_id}.shtml"
    ))
}
