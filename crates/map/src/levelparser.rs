//! Parser for `level` and `repeat_on` tag values.
//!
//! The tag grammar in the wild is messy: single values (`0`, `-1`, `1.5`),
//! lists split by `;` or `,`, and ranges (`0-3`, `-1–2`). Values are human
//! floors; the emitted numeric levels are scaled by 10. Invalid tokens are
//! skipped silently, element evaluation never fails on bad data.

use osm::Element;

/// Parses `value` and invokes `f` with every numeric level found.
pub fn parse<F: FnMut(i32, Element<'_>)>(value: &str, element: Element<'_>, mut f: F) {
    for token in value.split([';', ',']) {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }

        if let Some((low, high)) = split_range(token) {
            if let (Some(low), Some(high)) = (parse_level(low), parse_level(high)) {
                let (low, high) = if low <= high { (low, high) } else { (high, low) };
                // ranges emit every full level they span
                let mut level = 10 * (low as f64 / 10.0).ceil() as i32;
                while level <= high {
                    f(level, element);
                    level += 10;
                }
            }
            continue;
        }

        if let Some(level) = parse_level(token) {
            f(level, element);
        }
    }
}

/// Splits `a-b` range tokens. The separator must not be the leading sign
/// and can be an ASCII hyphen or an en dash.
fn split_range(token: &str) -> Option<(&str, &str)> {
    let mut chars = token.char_indices();
    chars.next(); // a leading '-' is a sign, not a separator
    for (idx, c) in chars {
        if c == '–' {
            return Some((&token[..idx], &token[idx + c.len_utf8()..]));
        }
        if c == '-' {
            // "1e-5" style exponents don't occur in level tags, but signs
            // after the separator do ("-2--1")
            return Some((&token[..idx], &token[idx + 1..]));
        }
    }
    None
}

fn parse_level(token: &str) -> Option<i32> {
    let token = token.trim();
    let value: f64 = token.parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    Some((value * 10.0).round() as i32)
}

#[cfg(test)]
mod tests {
    use super::parse;
    use osm::Element;

    fn levels_of(value: &str) -> Vec<i32> {
        let mut out = Vec::new();
        parse(value, Element::Null, |level, _| out.push(level));
        out
    }

    #[test]
    fn single_values() {
        assert_eq!(levels_of("0"), vec![0]);
        assert_eq!(levels_of("-1"), vec![-10]);
        assert_eq!(levels_of("1.5"), vec![15]);
        assert_eq!(levels_of("0.5"), vec![5]);
    }

    #[test]
    fn lists() {
        assert_eq!(levels_of("-1;0;1;2"), vec![-10, 0, 10, 20]);
        assert_eq!(levels_of("0, 1"), vec![0, 10]);
    }

    #[test]
    fn ranges_emit_full_levels() {
        assert_eq!(levels_of("0-2"), vec![0, 10, 20]);
        assert_eq!(levels_of("-2--1"), vec![-20, -10]);
        assert_eq!(levels_of("-1–1"), vec![-10, 0, 10]);
    }

    #[test]
    fn garbage_is_skipped() {
        assert_eq!(levels_of("roof"), Vec::<i32>::new());
        assert_eq!(levels_of("0;roof;1"), vec![0, 10]);
        assert_eq!(levels_of(""), Vec::<i32>::new());
    }
}
