use model::{LikeSpec, Literal};

/// Full-text wildcards, plus the backslash that escapes them.
const METACHARACTERS: &[char] = &['*', '?', '\\'];

/// Value of an equality clause: temporal literals in compact form,
/// everything else verbatim.
pub fn term(value: &Literal) -> String {
    if value.is_temporal() {
        if let Some(compact) = value.compact_date() {
            return compact;
        }
    }
    value.to_string()
}

/// Bound of a range clause. ISO date strings normalize like dates.
pub fn bound(value: &Literal) -> String {
    value.compact_date().unwrap_or_else(|| value.to_string())
}

/// Rewrites a LIKE pattern with the full-text wildcards `*` and `?`.
/// Everything else passes through untouched; an escaped character is
/// emitted literally, backslash-escaped only when it is itself a wildcard.
pub fn like_pattern(pattern: &str, spec: LikeSpec) -> String {
    let mut out = String::with_capacity(pattern.len());
    let mut chars = pattern.chars();

    while let Some(c) = chars.next() {
        if c == spec.escape {
            match chars.next() {
                Some(escaped) => push_escaped(&mut out, escaped),
                None => out.push(c),
            }
        } else if c == spec.wildcard {
            out.push('*');
        } else if c == spec.single_char {
            out.push('?');
        } else {
            out.push(c);
        }
    }
    out
}

fn push_escaped(out: &mut String, c: char) {
    if METACHARACTERS.contains(&c) {
        out.push('\\');
    }
    out.push(c);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_term_keeps_strings_verbatim() {
        assert_eq!(term(&Literal::from("2007-06-02")), "2007-06-02");
        assert_eq!(term(&Literal::from("starship trooper")), "starship trooper");
        let date = NaiveDate::from_ymd_opt(2007, 6, 2).unwrap();
        assert_eq!(term(&Literal::Date(date)), "20070602");
    }

    #[test]
    fn test_bound_normalizes_date_strings() {
        assert_eq!(bound(&Literal::from("2007-06-02")), "20070602");
        assert_eq!(bound(&Literal::Integer(42)), "42");
    }

    #[test]
    fn test_like_pattern_translation() {
        let spec = LikeSpec::default();
        assert_eq!(like_pattern("star%", spec), "star*");
        assert_eq!(like_pattern("st_r", spec), "st?r");
        assert_eq!(like_pattern("100\\%", spec), "100%");
        assert_eq!(like_pattern("a b", spec), "a b");
    }

    #[test]
    fn test_like_pattern_keeps_plain_characters() {
        let spec = LikeSpec::default();
        assert_eq!(like_pattern("urn:ogc:%", spec), "urn:ogc:*");
        assert_eq!(like_pattern("star trek%", spec), "star trek*");
        assert_eq!(like_pattern("a-b/c_", spec), "a-b/c?");
        assert_eq!(like_pattern("x\\\\y", spec), "x\\\\y");
    }

    #[test]
    fn test_like_pattern_custom_tokens() {
        let spec = LikeSpec {
            wildcard: '*',
            single_char: '#',
            escape: '!',
        };
        assert_eq!(like_pattern("Map*", spec), "Map*");
        assert_eq!(like_pattern("Map#", spec), "Map?");
        assert_eq!(like_pattern("Map!*", spec), "Map\\*");
        assert_eq!(like_pattern("Map!", spec), "Map!");
        assert_eq!(like_pattern("Map!?", spec), "Map\\?");
    }
}
