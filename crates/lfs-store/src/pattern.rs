//! Lock path patterns.
//!
//! Patterns use `path.Match` syntax:
//!
//! - `*` matches any run of characters other than `/`; `**` is the same as `*`
//! - `?` matches one character other than `/`
//! - `[...]` is a character class of single characters and `lo-hi` ranges,
//!   negated by a leading `^`; a class must hold at least one item
//! - `\c` matches `c` literally, inside or outside a class
//!
//! The pattern is rewritten into the `glob` crate's dialect and matched with
//! a literal separator. Classes therefore never match `/`.

use std::iter::Peekable;
use std::str::Chars;

use glob::{MatchOptions, Pattern};
use tracing::debug;

const PATH_MATCH: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Path filter applied while listing.
pub(crate) enum PathFilter {
    Any,
    Glob(Pattern),
    /// Malformed pattern, or one containing an empty class.
    Nothing,
}

impl PathFilter {
    pub(crate) fn new(pattern: &str) -> Self {
        if pattern.is_empty() {
            return Self::Any;
        }
        let Some(rewritten) = to_glob(pattern) else {
            debug!(pattern, "lock path pattern matches nothing");
            return Self::Nothing;
        };
        match Pattern::new(&rewritten) {
            Ok(p) => Self::Glob(p),
            Err(err) => {
                debug!(pattern, error = %err, "invalid lock path pattern");
                Self::Nothing
            }
        }
    }

    pub(crate) fn accepts(&self, path: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Glob(p) => p.matches_with(path, PATH_MATCH),
            Self::Nothing => false,
        }
    }
}

/// Rewrite a `path.Match` pattern for [`Pattern::new`].
///
/// Returns `None` when the pattern is malformed or can never match.
fn to_glob(pattern: &str) -> Option<String> {
    let mut out = String::with_capacity(pattern.len());
    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '*' => {
                while chars.next_if_eq(&'*').is_some() {}
                out.push('*');
            }
            '?' => out.push('?'),
            '\\' => push_literal(&mut out, chars.next()?),
            '[' => push_class(&mut out, &mut chars)?,
            other => push_literal(&mut out, other),
        }
    }
    Some(out)
}

fn push_literal(out: &mut String, c: char) {
    match c {
        '*' | '?' | '[' | ']' => {
            out.push('[');
            out.push(c);
            out.push(']');
        }
        _ => out.push(c),
    }
}

/// One endpoint of a class range. Unescaped `-` and `]` are malformed here.
fn class_char(chars: &mut Peekable<Chars<'_>>) -> Option<char> {
    match chars.next()? {
        '-' | ']' => None,
        '\\' => chars.next(),
        c => Some(c),
    }
}

/// Parse a class whose `[` was already consumed and emit the equivalent
/// `glob` class.
fn push_class(out: &mut String, chars: &mut Peekable<Chars<'_>>) -> Option<()> {
    let negated = chars.next_if_eq(&'^').is_some();
    let mut ranges = Vec::new();
    let mut items = 0;
    loop {
        if items > 0 && chars.next_if_eq(&']').is_some() {
            break;
        }
        let lo = class_char(chars)?;
        let hi = match chars.next_if_eq(&'-') {
            Some(_) => class_char(chars)?,
            None => lo,
        };
        items += 1;
        // Inverted ranges are well formed but cover nothing.
        if lo <= hi {
            ranges.push((lo, hi));
        }
    }

    // `glob` reads `]` only as the first item, `-` only as the last, and a
    // leading `!` as negation, so those three are carved out and placed.
    let (close, ranges) = carve(ranges, ']');
    let (dash, ranges) = carve(ranges, '-');
    let (bang, ranges) = carve(ranges, '!');

    let mut spec = String::new();
    if close {
        spec.push(']');
    }
    for (lo, hi) in ranges {
        spec.push(lo);
        if lo != hi {
            spec.push('-');
            spec.push(hi);
        }
    }
    if bang {
        spec.push('!');
    }
    if dash {
        spec.push('-');
    }

    if spec.is_empty() {
        // Every range was inverted: a negated class takes any character.
        if !negated {
            return None;
        }
        out.push('?');
        return Some(());
    }
    if negated {
        out.push_str("[!");
    } else if spec == "!" {
        out.push('!');
        return Some(());
    } else if spec == "!-" {
        out.push_str("[-!]");
        return Some(());
    } else {
        out.push('[');
    }
    out.push_str(&spec);
    out.push(']');
    Some(())
}

/// Remove `c` from every range, reporting whether any range covered it.
fn carve(ranges: Vec<(char, char)>, c: char) -> (bool, Vec<(char, char)>) {
    let before = char::from_u32(c as u32 - 1);
    let after = char::from_u32(c as u32 + 1);
    let mut hit = false;
    let mut out = Vec::with_capacity(ranges.len() + 1);
    for (lo, hi) in ranges {
        if lo <= c && c <= hi {
            hit = true;
            if let Some(before) = before.filter(|_| lo < c) {
                out.push((lo, before));
            }
            if let Some(after) = after.filter(|_| c < hi) {
                out.push((after, hi));
            }
        } else {
            out.push((lo, hi));
        }
    }
    (hit, out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_like_path_match() {
        let cases: &[(&str, &str, bool)] = &[
            ("/a/*", "/a/x", true),
            ("/a/*", "/a/deep/z", false),
            ("*", "/a", false),
            ("/a/**", "/a/xyz", true),
            ("/a/**", "/a/deep/z", false),
            ("/a/x**", "/a/xyz", true),
            ("/a/x**z", "/a/xyz", true),
            ("/?", "/b", true),
            ("/?", "/bc", false),
            ("a?b", "a/b", false),
            ("/[a-c]", "/b", true),
            ("/[a-c]", "/d", false),
            ("/[^b]", "/c", true),
            ("/[^b]", "/b", false),
            ("/[!b]", "/!", true),
            ("/[!b]", "/b", true),
            ("/[!b]", "/c", false),
            ("/[!]", "/!", true),
            ("/[\\-!]", "/-", true),
            ("/[\\-!]", "/!", true),
            ("/[\\]]", "/]", true),
            ("/[^\\]]", "/]", false),
            ("/[^\\]]", "/x", true),
            ("/[\\--a]", "/X", true),
            ("/[\\--a]", "/b", false),
            ("/[z-a]", "/m", false),
            ("/[^z-a]", "/m", true),
            ("/\\*", "/*", true),
            ("/\\*", "/x", false),
            ("/\\a", "/a", true),
            ("/f]", "/f]", true),
            ("/f[[]", "/f[", true),
        ];
        for &(pattern, path, expected) in cases {
            assert_eq!(
                PathFilter::new(pattern).accepts(path),
                expected,
                "pattern {pattern:?} against {path:?}"
            );
        }
    }

    #[test]
    fn malformed_patterns_match_nothing() {
        for pattern in ["[", "/[]", "/[]a]", "/[^]", "/[-]", "/[a-]", "/[a", "/a\\"] {
            assert!(to_glob(pattern).is_none(), "{pattern:?}");
            assert!(!PathFilter::new(pattern).accepts("/a"), "{pattern:?}");
        }
    }

    #[test]
    fn empty_pattern_matches_everything() {
        assert!(PathFilter::new("").accepts("/any/path"));
    }

    #[test]
    fn rewrites() {
        assert_eq!(to_glob("/a/***").as_deref(), Some("/a/*"));
        assert_eq!(to_glob("/[^b]").as_deref(), Some("/[!b]"));
        assert_eq!(to_glob("/[!b]").as_deref(), Some("/[b!]"));
        assert_eq!(to_glob("/\\*x").as_deref(), Some("/[*]x"));
        assert_eq!(to_glob("/[]-a]"), None);
    }
}
