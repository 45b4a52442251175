use serde_json::Value;

/// Formats an integer with `,` as the thousands separator (`1234567` -> `1,234,567`).
pub fn format_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Like [`format_thousands`] but keeps the sign of negative values.
pub fn format_thousands_signed(value: i64) -> String {
    if value < 0 {
        format!("-{}", format_thousands(value.unsigned_abs()))
    } else {
        format_thousands(value as u64)
    }
}

/// Parses a server duration such as `"12.5ms"`, `"3"` or the plain number `3`
/// into milliseconds.
pub fn parse_duration_ms(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let s = s.trim();
            let s = s.strip_suffix("ms").unwrap_or(s).trim();
            s.parse::<f64>().ok().filter(|v| v.is_finite())
        }
        _ => None,
    }
}

pub fn format_millis(ms: f64) -> String {
    let rounded = ms.round();
    if rounded <= 0.0 {
        return "0ms".to_string();
    }
    format!("{}ms", format_thousands(rounded as u64))
}

/// Renders a JSON scalar the way it is shown in counters: integers get
/// thousands separators, strings holding an integer too, everything else as is.
pub fn display_counter(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                format_thousands(u)
            } else if let Some(i) = n.as_i64() {
                format_thousands_signed(i)
            } else {
                n.to_string()
            }
        }
        Value::String(s) => match s.trim().parse::<u64>() {
            Ok(u) => format_thousands(u),
            Err(_) => s.clone(),
        },
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// Plain string form of a JSON scalar without any formatting.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

/// First `n` characters of `s` (not bytes).
pub fn take_chars(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

pub fn parse_u64_opt(value: &str) -> Result<Option<u64>, String> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse::<u64>()
        .map(Some)
        .map_err(|_| "expected a non-negative integer".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn thousands_groups_from_the_right() {
        assert_eq!(format_thousands(0), "0");
        assert_eq!(format_thousands(999), "999");
        assert_eq!(format_thousands(1000), "1,000");
        assert_eq!(format_thousands(1234567), "1,234,567");
        assert_eq!(format_thousands_signed(-12345), "-12,345");
    }

    #[test]
    fn duration_accepts_strings_and_numbers() {
        assert_eq!(parse_duration_ms(&json!("12.5ms")), Some(12.5));
        assert_eq!(parse_duration_ms(&json!(" 7 ms")), Some(7.0));
        assert_eq!(parse_duration_ms(&json!(40)), Some(40.0));
        assert_eq!(parse_duration_ms(&json!("soon")), None);
        assert_eq!(parse_duration_ms(&json!(null)), None);
    }

    #[test]
    fn counters_format_integers_only() {
        assert_eq!(display_counter(&json!(1500000)), "1,500,000");
        assert_eq!(display_counter(&json!("2500")), "2,500");
        assert_eq!(display_counter(&json!("wikidata")), "wikidata");
        assert_eq!(display_counter(&json!(null)), "");
    }

    #[test]
    fn take_chars_respects_char_boundaries() {
        assert_eq!(take_chars("größe", 3), "grö");
        assert_eq!(take_chars("ab", 5), "ab");
    }
}
