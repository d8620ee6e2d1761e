use chrono::{Datelike, NaiveDate, NaiveDateTime};

use crate::state::{Player, SimilarityResult};

/// Label column of the player statistics card, in display order.
pub const ATTRIBUTE_TITLES: [&str; 6] = ["Name", "ID", "Positions", "Birth", "Height", "Weight"];

pub fn format_number(value: f64) -> String {
    if value.fract().abs() < 0.005 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

pub fn format_opt_number(value: Option<f64>) -> String {
    value.map(format_number).unwrap_or_else(|| "-".to_string())
}

pub fn format_measure(value: Option<f64>, unit: &str) -> String {
    match value {
        Some(v) => format!("{} ({unit})", format_number(v)),
        None => "-".to_string(),
    }
}

pub fn format_similarity(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.3}"),
        None => "-".to_string(),
    }
}

pub fn format_execution_time(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{} (μs)", format_number(v)),
        None => "-".to_string(),
    }
}

/// Birth date as sent, with the age appended when the date parses.
pub fn format_birth(raw: Option<&str>, today: NaiveDate) -> String {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return "-".to_string();
    };
    match parse_birth(raw) {
        Some(date) => format!("{raw} (age {})", age_on(date, today)),
        None => raw.to_string(),
    }
}

fn parse_birth(raw: &str) -> Option<NaiveDate> {
    const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%Y", "%d.%m.%Y"];
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, fmt) {
            return Some(date);
        }
    }
    // ISO timestamps such as "1998-04-12T00:00:00".
    raw.get(..19)
        .and_then(|head| NaiveDateTime::parse_from_str(head, "%Y-%m-%dT%H:%M:%S").ok())
        .map(|dt| dt.date())
}

fn age_on(birth: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        age -= 1;
    }
    age.max(0)
}

/// Value column of the player statistics card, aligned with `ATTRIBUTE_TITLES`.
pub fn attribute_values(player: &Player, today: NaiveDate) -> [String; 6] {
    [
        player.name.clone(),
        player.id.to_string(),
        player.positions.join(", "),
        format_birth(player.birth.as_deref(), today),
        format_measure(player.height, "cm"),
        format_measure(player.weight, "kg"),
    ]
}

pub fn graph_image_url<'a>(result: &'a SimilarityResult, fallback: &'a str) -> &'a str {
    result
        .graph_url
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .unwrap_or(fallback)
}
