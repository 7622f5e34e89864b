//! PHP compatible functions.
//!
//! Tag parameters arrive as strings and the rules for what counts as a
//! number, what gets trimmed, and how a pixel size becomes an integer are all
//! the ones PHP uses, so they are reproduced here instead of relying on the
//! subtly different rules of [`str::parse`].

use std::borrow::Cow;

/// Returns true if `b` is whitespace according to PHP numeric strings.
#[inline]
fn is_numeric_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | b'\x0b' | b'\x0c')
}

/// Finds the leading numeric part of `n`, ignoring leading whitespace.
///
/// Returns the byte range of the number (sign, mantissa, and exponent) if at
/// least one mantissa digit exists.
fn numeric_prefix(n: &str) -> Option<(usize, usize)> {
    let b = n.as_bytes();
    let mut i = b.iter().position(|b| !is_numeric_space(*b)).unwrap_or(b.len());
    let start = i;

    if matches!(b.get(i), Some(b'+' | b'-')) {
        i += 1;
    }

    let int_start = i;
    while b.get(i).is_some_and(u8::is_ascii_digit) {
        i += 1;
    }
    let mut digits = i - int_start;

    if b.get(i) == Some(&b'.') {
        let frac_start = i + 1;
        let mut end = frac_start;
        while b.get(end).is_some_and(u8::is_ascii_digit) {
            end += 1;
        }
        if digits != 0 || end != frac_start {
            digits += end - frac_start;
            i = end;
        }
    }

    if digits == 0 {
        return None;
    }

    // An exponent only counts if it has digits, so '1e' is the number '1'
    // followed by junk
    if matches!(b.get(i), Some(b'e' | b'E')) {
        let mut end = i + 1;
        if matches!(b.get(end), Some(b'+' | b'-')) {
            end += 1;
        }
        let exp_start = end;
        while b.get(end).is_some_and(u8::is_ascii_digit) {
            end += 1;
        }
        if end != exp_start {
            i = end;
        }
    }

    Some((start, i))
}

/// Parses a string that satisfies [`is_numeric`](https://php.net/is_numeric),
/// returning `None` for anything else.
///
/// Unlike [`str::parse`], this accepts surrounding whitespace and rejects
/// `inf`, `NaN`, and friends.
pub fn numeric(n: &str) -> Option<f64> {
    let (start, end) = numeric_prefix(n)?;
    if n.as_bytes()[end..].iter().all(|b| is_numeric_space(*b)) {
        n[start..end].parse().ok()
    } else {
        None
    }
}

/// Casts a string to an integer like `(int)` does in PHP.
///
/// Only the leading numeric part of the string is used and any fraction is
/// truncated. A string with no leading number is zero.
// Clippy: Truncation and saturation is how PHP does it.
#[allow(clippy::cast_possible_truncation)]
pub fn intval(n: &str) -> i64 {
    numeric_prefix(n)
        .and_then(|(start, end)| n[start..end].parse::<f64>().ok())
        .map_or(0, |value| value as i64)
}

/// Trims whitespace like [`trim`](https://php.net/trim) with the default
/// character list.
pub fn trim(s: &str) -> &str {
    s.trim_matches([' ', '\t', '\n', '\r', '\0', '\x0b'])
}

/// Encodes HTML special characters like
/// [`htmlspecialchars`](https://php.net/htmlspecialchars) with `ENT_QUOTES`.
pub fn htmlspecialchars(s: &str) -> Cow<'_, str> {
    strtr(
        s,
        &[
            ("&", "&amp;"),
            ("\"", "&quot;"),
            ("'", "&#039;"),
            ("<", "&lt;"),
            (">", "&gt;"),
        ],
    )
}

/// Finds and replaces substrings in the input like [`strtr`](https://php.net/strtr).
/// To avoid extra temporary allocation, `replacements` should be ordered from
/// longest to shortest match.
pub fn strtr<'a>(input: &'a str, replacements: &[(&str, &str)]) -> Cow<'a, str> {
    let replacements = if replacements.is_sorted_by(|(a, _), (b, _)| a.len() >= b.len()) {
        Cow::Borrowed(replacements)
    } else {
        let mut replacements = Vec::from(replacements);
        replacements.sort_by(|(a, _), (b, _)| b.len().cmp(&a.len()));
        Cow::Owned(replacements)
    };

    let mut out = String::new();
    let mut flushed = 0;
    let mut rest = input;
    'next: while let Some(c) = rest.chars().next() {
        let offset = input.len() - rest.len();
        for (find, replace) in replacements.iter() {
            if !find.is_empty() && rest.starts_with(find) {
                out += &input[flushed..offset];
                out += *replace;
                flushed = offset + find.len();
                rest = &rest[find.len()..];
                continue 'next;
            }
        }
        rest = &rest[c.len_utf8()..];
    }

    if flushed == 0 {
        Cow::Borrowed(input)
    } else {
        out += &input[flushed..];
        Cow::Owned(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric() {
        assert_eq!(numeric("0"), Some(0.0));
        assert_eq!(numeric("51.485"), Some(51.485));
        assert_eq!(numeric("-0.15"), Some(-0.15));
        assert_eq!(numeric("+7"), Some(7.0));
        assert_eq!(numeric(".5"), Some(0.5));
        assert_eq!(numeric("5."), Some(5.0));
        assert_eq!(numeric("1e2"), Some(100.0));
        assert_eq!(numeric("1E-1"), Some(0.1));
        assert_eq!(numeric("  12"), Some(12.0));
        assert_eq!(numeric("12  "), Some(12.0));
        assert_eq!(numeric(""), None);
        assert_eq!(numeric("   "), None);
        assert_eq!(numeric("."), None);
        assert_eq!(numeric("-"), None);
        assert_eq!(numeric("1e"), None);
        assert_eq!(numeric("12px"), None);
        assert_eq!(numeric("1 2"), None);
        assert_eq!(numeric("0x1A"), None);
        assert_eq!(numeric("inf"), None);
        assert_eq!(numeric("NaN"), None);
        assert_eq!(numeric("true"), None);
    }

    #[test]
    fn test_intval() {
        assert_eq!(intval("300"), 300);
        assert_eq!(intval(" 300"), 300);
        assert_eq!(intval("30.9"), 30);
        assert_eq!(intval("-30.9"), -30);
        assert_eq!(intval("1e3"), 1000);
        assert_eq!(intval("12abc"), 12);
        assert_eq!(intval("abc"), 0);
        assert_eq!(intval(""), 0);
    }

    #[test]
    fn test_trim() {
        assert_eq!(trim(" \t lat=1 \n"), "lat=1");
        assert_eq!(trim("\0\x0b"), "");
        // Non-breaking space is not in the default list
        assert_eq!(trim("\u{a0}x"), "\u{a0}x");
    }

    #[test]
    fn test_htmlspecialchars() {
        assert_eq!(htmlspecialchars("51.5"), Cow::Borrowed("51.5"));
        assert_eq!(
            htmlspecialchars(r#"<a href="x">&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&amp;&#039;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_strtr() {
        assert_eq!(strtr("abc", &[("x", "y")]), Cow::Borrowed("abc"));
        assert_eq!(strtr("Hi all", &[("Hi", "Hello"), ("a", "A")]), "Hello All");
        assert_eq!(strtr("aab", &[("a", "1"), ("aa", "2")]), "2b");
        assert_eq!(strtr("día|noche", &[("|", "&#124;")]), "día&#124;noche");
    }
}
