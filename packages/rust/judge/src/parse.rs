//! Strict parsing of judge responses.
//!
//! The contract with the judge is narrow: the response must carry one number
//! in 0–100, either bare, as a JSON number, or as the sole value of a
//! single-key JSON object. A surrounding markdown code fence is tolerated.
//! Anything else is a per-candidate failure, not a guess.

/// Parse a judge response into a 0–100 percentage.
pub fn parse_percentage(text: &str) -> Option<u8> {
    let trimmed = strip_code_fence(text.trim());

    if let Ok(n) = trimmed.parse::<i64>() {
        return to_percentage(n as f64);
    }

    let value: serde_json::Value = serde_json::from_str(trimmed).ok()?;
    to_percentage(extract_number(&value)?)
}

fn extract_number(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::Object(map) if map.len() == 1 => extract_number(map.values().next()?),
        _ => None,
    }
}

fn to_percentage(n: f64) -> Option<u8> {
    if !n.is_finite() || !(0.0..=100.0).contains(&n) {
        return None;
    }
    Some(n.round() as u8)
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}
