//! Timer argument parsing
//!
//! A timer segment is free text holding a duration, an optional quoted label
//! and an optional bracketed ringtone hint:
//!
//! ```text
//! segment         := duration-region rest?
//! duration-region := everything before the first `'` or `[`
//! duration        := skip* pair (sep* pair)*
//! pair            := digit+ unit
//! unit            := 'h' | 'm' | 's'
//! label           := first `'...'` substring          (default "Timer")
//! hint            := first `[...]` with a non-empty body
//! ```
//!
//! `skip` and `sep` are any characters other than ASCII letters and digits.
//! Repeated units add up, so `5m3m` is eight minutes. The duration ends at the
//! first ASCII letter that is not a unit, or at a number with no unit after it.

use thiserror::Error;

/// Label used when a segment carries no quoted label
pub const DEFAULT_LABEL: &str = "Timer";

/// Separator between timers in a sequence
pub const SEGMENT_SEPARATOR: char = ';';

/// A single parsed timer, immutable once created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerSpec {
    pub duration_seconds: u64,
    pub label: String,
    pub ringtone_hint: Option<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid time format in: {segment} (expected something like 1h30m)")]
    MissingDuration { segment: String },

    #[error("Invalid time format in: {segment} (number without h/m/s unit)")]
    MissingUnit { segment: String },

    #[error("Invalid time format in: {segment} (duration too large)")]
    Overflow { segment: String },

    #[error("No timers given")]
    EmptySequence,
}

/// Parse a whole `;`-separated sequence. Any bad segment fails the sequence.
pub fn parse_sequence(input: &str) -> Result<Vec<TimerSpec>, ParseError> {
    let specs = input
        .split(SEGMENT_SEPARATOR)
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(parse_segment)
        .collect::<Result<Vec<_>, _>>()?;

    if specs.is_empty() {
        return Err(ParseError::EmptySequence);
    }
    Ok(specs)
}

/// Parse one timer segment such as `90m'Break'[bell]`
pub fn parse_segment(segment: &str) -> Result<TimerSpec, ParseError> {
    let region_end = segment.find(['\'', '[']).unwrap_or(segment.len());
    let duration_seconds = parse_duration(&segment[..region_end], segment)?;

    let label = quoted_label(segment)
        .map(str::to_string)
        .unwrap_or_else(|| DEFAULT_LABEL.to_string());
    let ringtone_hint = bracketed_hint(segment).map(str::to_string);

    Ok(TimerSpec {
        duration_seconds,
        label,
        ringtone_hint,
    })
}

fn unit_seconds(unit: char) -> Option<u64> {
    match unit {
        'h' => Some(3600),
        'm' => Some(60),
        's' => Some(1),
        _ => None,
    }
}

fn parse_duration(region: &str, segment: &str) -> Result<u64, ParseError> {
    let overflow = || ParseError::Overflow {
        segment: segment.to_string(),
    };

    let mut chars = region.chars().peekable();
    let mut total: u64 = 0;
    let mut pairs = 0usize;
    let mut bare_number = false;

    loop {
        // Skip separators; a letter here ends the duration.
        while let Some(&c) = chars.peek() {
            if c.is_ascii_alphanumeric() {
                break;
            }
            chars.next();
        }

        match chars.peek() {
            Some(c) if c.is_ascii_digit() => {}
            _ => break,
        }

        let mut value: u64 = 0;
        while let Some(digit) = chars.peek().and_then(|c| c.to_digit(10)) {
            value = value
                .checked_mul(10)
                .and_then(|v| v.checked_add(u64::from(digit)))
                .ok_or_else(overflow)?;
            chars.next();
        }

        // A number without a unit is not a pair and ends the duration.
        let Some(scale) = chars.peek().copied().and_then(unit_seconds) else {
            bare_number = true;
            break;
        };
        chars.next();

        total = value
            .checked_mul(scale)
            .and_then(|v| total.checked_add(v))
            .ok_or_else(overflow)?;
        pairs += 1;
    }

    if pairs == 0 && bare_number {
        return Err(ParseError::MissingUnit {
            segment: segment.to_string(),
        });
    }
    if pairs == 0 {
        return Err(ParseError::MissingDuration {
            segment: segment.to_string(),
        });
    }
    Ok(total)
}

fn quoted_label(segment: &str) -> Option<&str> {
    let start = segment.find('\'')? + 1;
    let len = segment[start..].find('\'')?;
    Some(&segment[start..start + len])
}

fn bracketed_hint(segment: &str) -> Option<&str> {
    let mut offset = 0;
    while let Some(open) = segment[offset..].find('[') {
        let body_start = offset + open + 1;
        let close = segment[body_start..].find(']')?;
        if close > 0 {
            return Some(&segment[body_start..body_start + close]);
        }
        offset = body_start;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_units_accumulate() {
        assert_eq!(parse_segment("5m3m").unwrap().duration_seconds, 480);
        assert_eq!(parse_segment("1h30m").unwrap().duration_seconds, 5400);
        assert_eq!(parse_segment("1h 30m 15s").unwrap().duration_seconds, 5415);
    }

    #[test]
    fn label_and_hint_are_extracted() {
        let spec = parse_segment("90m'Break'[bell]").unwrap();
        assert_eq!(
            spec,
            TimerSpec {
                duration_seconds: 5400,
                label: "Break".to_string(),
                ringtone_hint: Some("bell".to_string()),
            }
        );
    }

    #[test]
    fn defaults_apply_without_label_or_hint() {
        let spec = parse_segment("45s").unwrap();
        assert_eq!(spec.label, DEFAULT_LABEL);
        assert_eq!(spec.ringtone_hint, None);
    }

    #[test]
    fn label_only_segment_is_rejected() {
        assert!(matches!(
            parse_segment("'just a label'"),
            Err(ParseError::MissingDuration { .. })
        ));
    }

    #[test]
    fn digits_inside_label_do_not_count() {
        let spec = parse_segment("10m 'Run 5k' [chime]").unwrap();
        assert_eq!(spec.duration_seconds, 600);
        assert_eq!(spec.label, "Run 5k");
        assert_eq!(spec.ringtone_hint.as_deref(), Some("chime"));
    }

    #[test]
    fn leading_punctuation_is_skipped() {
        assert_eq!(parse_segment("  -2m").unwrap().duration_seconds, 120);
    }

    #[test]
    fn trailing_words_end_the_duration() {
        assert_eq!(parse_segment("5m then 3s").unwrap().duration_seconds, 300);
    }

    #[test]
    fn trailing_number_without_unit_is_ignored() {
        assert_eq!(parse_segment("1h30").unwrap().duration_seconds, 3600);
        assert_eq!(parse_segment("5m3").unwrap().duration_seconds, 300);
        assert_eq!(parse_segment("2m 45 'Eggs'").unwrap().duration_seconds, 120);
    }

    #[test]
    fn non_ascii_letters_separate_pairs() {
        assert_eq!(parse_segment("5mé3s").unwrap().duration_seconds, 303);
    }

    #[test]
    fn bare_number_is_rejected() {
        assert!(matches!(
            parse_segment("25"),
            Err(ParseError::MissingUnit { .. })
        ));
    }

    #[test]
    fn empty_brackets_are_skipped() {
        let spec = parse_segment("1s [] [gong]").unwrap();
        assert_eq!(spec.ringtone_hint.as_deref(), Some("gong"));
    }

    #[test]
    fn empty_label_is_kept() {
        assert_eq!(parse_segment("1s''").unwrap().label, "");
    }

    #[test]
    fn unterminated_label_falls_back_to_default() {
        assert_eq!(parse_segment("1s 'oops").unwrap().label, DEFAULT_LABEL);
    }

    #[test]
    fn huge_values_overflow() {
        assert!(matches!(
            parse_segment("99999999999999999999h"),
            Err(ParseError::Overflow { .. })
        ));
    }

    #[test]
    fn sequence_splits_and_skips_blanks() {
        let specs = parse_sequence("3s 'Tea'; ;2s").unwrap();
        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].label, "Tea");
        assert_eq!(specs[1].duration_seconds, 2);
    }

    #[test]
    fn one_bad_segment_fails_the_sequence() {
        let err = parse_sequence("3s;oops;2s").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid time format in: oops (expected something like 1h30m)"
        );
    }

    #[test]
    fn blank_sequence_is_an_error() {
        assert_eq!(parse_sequence(" ; "), Err(ParseError::EmptySequence));
    }
}
