use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimecodeError {
    #[error("empty timecode")]
    Empty,
    #[error("invalid timecode: {0}")]
    Invalid(String),
}

/// `m:ss` below an hour, `h:mm:ss` above. Fractions are truncated.
pub fn format_timecode(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);
    if h > 0 {
        format!("{h}:{m:02}:{s:02}")
    } else {
        format!("{m}:{s:02}")
    }
}

/// Accepts `ss[.fff]`, `m:ss[.fff]` and `h:mm:ss[.fff]`.
pub fn parse_timecode(text: &str) -> Result<f64, TimecodeError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(TimecodeError::Empty);
    }
    let invalid = || TimecodeError::Invalid(text.to_string());

    let parts: Vec<&str> = text.split(':').collect();
    if parts.len() > 3 {
        return Err(invalid());
    }

    let (seconds_part, unit_parts) = parts.split_last().ok_or_else(invalid)?;
    let seconds: f64 = seconds_part.parse().map_err(|_| invalid())?;
    if !seconds.is_finite() || seconds < 0.0 || (!unit_parts.is_empty() && seconds >= 60.0) {
        return Err(invalid());
    }

    let mut total = seconds;
    for (i, part) in unit_parts.iter().rev().enumerate() {
        let value: u64 = part.parse().map_err(|_| invalid())?;
        // Minutes are bounded only when hours are present.
        if i == 0 && unit_parts.len() == 2 && value >= 60 {
            return Err(invalid());
        }
        total += value as f64 * 60f64.powi(i as i32 + 1);
    }
    Ok(total)
}
