use crate::utils::{char_len, take_chars};

const ELLIPSIS: &str = "[...]";

/// Display form of a result cell.
///
/// IRIs (`<...>`) are reduced to their last path segment, literals (`"..."`)
/// lose their language tag or datatype, and both are cut to `max_len`
/// characters with an ellipsis marker. Any other value is returned unchanged.
pub fn shorten(value: &str, max_len: usize) -> String {
    if value.starts_with('<') {
        shorten_iri(value, max_len)
    } else if value.starts_with('"') {
        shorten_literal(value, max_len)
    } else {
        value.to_string()
    }
}

fn shorten_iri(value: &str, max_len: usize) -> String {
    let end = if value.len() > 1 && value.ends_with('>') {
        value.len() - 1
    } else {
        value.len()
    };
    let inner = &value[1..end];

    let mut slash = inner.rfind('/');
    // `.../Foo_(a/b)`: the last slash sits inside a trailing parenthesized
    // group, so cut before the group instead.
    if let (Some(s), Some(close)) = (slash, inner.rfind(')')) {
        if close > s {
            if let Some(open) = inner[..close].rfind('(') {
                if open < s {
                    slash = inner[..open].rfind('/');
                }
            }
        }
    }

    let segment = match slash {
        Some(s) => &inner[s + 1..],
        None => inner,
    };

    if char_len(segment) > max_len {
        format!("{}{}", take_chars(segment, max_len.saturating_sub(1)), ELLIPSIS)
    } else {
        segment.to_string()
    }
}

fn shorten_literal(value: &str, max_len: usize) -> String {
    let literal = match value.rfind('"') {
        Some(pos) if pos > 0 => &value[..=pos],
        _ => value,
    };
    if char_len(literal) > max_len {
        format!(
            "{}{}\"",
            take_chars(literal, max_len.saturating_sub(1)),
            ELLIPSIS
        )
    } else {
        literal.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::shorten;

    #[test]
    fn iri_keeps_last_segment() {
        assert_eq!(shorten("<http://example.org/ns/Foo>", 26), "Foo");
        assert_eq!(shorten("<Foo>", 26), "Foo");
    }

    #[test]
    fn iri_with_slash_inside_parentheses_backs_up() {
        assert_eq!(
            shorten("<http://en.wikipedia.org/wiki/Foo_(a/b)>", 40),
            "Foo_(a/b)"
        );
        // parentheses entirely after the last slash change nothing
        assert_eq!(
            shorten("<http://en.wikipedia.org/wiki/AC/DC_(band)>", 40),
            "DC_(band)"
        );
    }

    #[test]
    fn iri_with_trailing_slash_has_empty_segment() {
        assert_eq!(shorten("<http://example.org/>", 40), "");
        assert_eq!(shorten("<>", 40), "");
    }

    #[test]
    fn long_iri_segment_is_truncated() {
        let out = shorten("<http://example.org/ABCDEFGHIJKLMNOPQRSTUVWXYZ>", 10);
        assert_eq!(out, "ABCDEFGHI[...]");
    }

    #[test]
    fn literal_drops_suffix_and_truncates_with_quoted_ellipsis() {
        assert_eq!(shorten("\"hello\"@en", 20), "\"hello\"");
        assert_eq!(
            shorten("\"42\"^^<http://www.w3.org/2001/XMLSchema#int>", 20),
            "\"42\""
        );
        let long = "\"The quick brown fox jumps over the lazy dog\"@en";
        let out = shorten(long, 12);
        assert_eq!(out, "\"The quick [...]\"");
        assert!(out.ends_with("[...]\""));
    }

    #[test]
    fn unterminated_literal_is_still_cut_on_chars() {
        assert_eq!(shorten("\"äöüäöüäöü", 4), "\"äö[...]\"");
    }

    #[test]
    fn plain_values_are_untouched() {
        let v = "just a very long plain value that is longer than the limit";
        assert_eq!(shorten(v, 5), v);
        assert_eq!(shorten("", 5), "");
    }
}
