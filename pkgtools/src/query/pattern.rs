//! Query pattern classification.

use std::cmp::Ordering;
use std::fmt;

use glob::{MatchOptions, Pattern};
use regex::Regex;

use crate::error::{PkgError, PkgResult};

/// Direction of a date relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateOp {
    /// `>`: installed after the reference.
    After,
    /// `<`: installed before the reference.
    Before,
}

impl DateOp {
    /// Whether `cmp` (installation date against reference) satisfies the
    /// relation. `inclusive` is the trailing `=`.
    pub fn holds(self, cmp: Ordering, inclusive: bool) -> bool {
        match (self, cmp) {
            (DateOp::After, Ordering::Greater) | (DateOp::Before, Ordering::Less) => true,
            (_, Ordering::Equal) => inclusive,
            _ => false,
        }
    }

    fn symbol(self) -> char {
        match self {
            DateOp::After => '>',
            DateOp::Before => '<',
        }
    }
}

/// A parsed query expression.
///
/// The grammar has exactly four forms:
///
/// | Form | Example | Meaning |
/// |------|---------|---------|
/// | wildcard | `*` | everything |
/// | regex | built with [`QueryPattern::regex`] | unanchored search |
/// | date relation | `>=2024-01-01`, `<foo-1.0` | installation date comparison |
/// | glob | `py3*-setuptools*`, `curl` | fnmatch, or exact package name |
#[derive(Debug, Clone)]
pub enum QueryPattern {
    /// Matches everything.
    Wildcard,
    /// Regular expression searched for in the identifier.
    Regex(Regex),
    /// `[<>]=?<reference>` where the reference is a package or a date.
    DateRelation {
        op: DateOp,
        inclusive: bool,
        reference: String,
    },
    /// Shell glob, also accepted as an exact package name.
    Glob(String),
}

impl QueryPattern {
    /// Classify a pattern string.
    ///
    /// Classification never fails; problems such as an unknown date
    /// reference surface when the pattern is evaluated.
    ///
    /// ```
    /// use pkgtools::query::{DateOp, QueryPattern};
    ///
    /// assert!(matches!(QueryPattern::parse("*"), QueryPattern::Wildcard));
    /// assert!(matches!(
    ///     QueryPattern::parse(">=2024-01-01"),
    ///     QueryPattern::DateRelation { op: DateOp::After, inclusive: true, .. }
    /// ));
    /// assert!(matches!(QueryPattern::parse("=2024-01-01"), QueryPattern::Glob(_)));
    /// ```
    pub fn parse(pattern: &str) -> Self {
        if pattern == "*" {
            return QueryPattern::Wildcard;
        }

        let op = match pattern.chars().next() {
            Some('>') => Some(DateOp::After),
            Some('<') => Some(DateOp::Before),
            _ => None,
        };

        match op {
            Some(op) => {
                let rest = &pattern[1..];
                let (inclusive, reference) = match rest.strip_prefix('=') {
                    Some(reference) => (true, reference),
                    None => (false, rest),
                };
                QueryPattern::DateRelation {
                    op,
                    inclusive,
                    reference: reference.to_string(),
                }
            }
            None => QueryPattern::Glob(pattern.to_string()),
        }
    }

    /// Compile a regular expression pattern.
    ///
    /// # Errors
    ///
    /// [`PkgError::Format`] if `pattern` is not a valid regex.
    pub fn regex(pattern: &str) -> PkgResult<Self> {
        Regex::new(pattern)
            .map(QueryPattern::Regex)
            .map_err(|e| PkgError::format(pattern, e.to_string()))
    }
}

impl From<Regex> for QueryPattern {
    fn from(regex: Regex) -> Self {
        QueryPattern::Regex(regex)
    }
}

impl From<&str> for QueryPattern {
    fn from(pattern: &str) -> Self {
        QueryPattern::parse(pattern)
    }
}

impl fmt::Display for QueryPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryPattern::Wildcard => f.write_str("*"),
            QueryPattern::Regex(regex) => write!(f, "/{}/", regex.as_str()),
            QueryPattern::DateRelation {
                op,
                inclusive,
                reference,
            } => write!(
                f,
                "{}{}{}",
                op.symbol(),
                if *inclusive { "=" } else { "" },
                reference
            ),
            QueryPattern::Glob(glob) => f.write_str(glob),
        }
    }
}

/// How a glob treats `/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlobMode {
    /// Wildcards match any character, `/` included.
    Plain,
    /// Wildcards stop at `/`, as for file paths.
    Pathname,
}

/// Rewrite fnmatch syntax into the `glob` crate's dialect: `\c` quotes `c`,
/// `[^...]` negates like `[!...]`, and a `[` with no closing `]` is literal.
fn translate_glob(glob: &str) -> String {
    let chars: Vec<char> = glob.chars().collect();
    let mut out = String::with_capacity(glob.len() + 4);
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '\\' if i + 1 < chars.len() => {
                out.push_str(&Pattern::escape(&chars[i + 1].to_string()));
                i += 2;
            }
            '[' => match bracket_end(&chars, i) {
                Some(end) => {
                    out.push('[');
                    let mut j = i + 1;
                    if matches!(chars[j], '!' | '^') {
                        out.push('!');
                        j += 1;
                    }
                    while j < end {
                        if chars[j] == '\\' && j + 1 < end {
                            j += 1;
                        }
                        out.push(chars[j]);
                        j += 1;
                    }
                    out.push(']');
                    i = end + 1;
                }
                None => {
                    out.push_str("[[]");
                    i += 1;
                }
            },
            c => {
                out.push(c);
                i += 1;
            }
        }
    }

    out
}

/// Index of the `]` closing the bracket expression opened at `open`. A `]`
/// right after `[`, `[!` or `[^` is a member, not the end.
fn bracket_end(chars: &[char], open: usize) -> Option<usize> {
    let mut j = open + 1;
    if matches!(chars.get(j), Some('!' | '^')) {
        j += 1;
    }
    if chars.get(j) == Some(&']') {
        j += 1;
    }

    while j < chars.len() {
        match chars[j] {
            '\\' => j += 2,
            ']' => return Some(j),
            _ => j += 1,
        }
    }
    None
}

fn compile_glob(glob: &str) -> Option<Pattern> {
    let translated = translate_glob(glob);
    let compiled = Pattern::new(&translated).or_else(|_| {
        // `**` outside a whole path component means the same as `*`.
        let mut collapsed = translated.clone();
        while collapsed.contains("**") {
            collapsed = collapsed.replace("**", "*");
        }
        Pattern::new(&collapsed)
    });

    match compiled {
        Ok(pattern) => Some(pattern),
        Err(e) => {
            tracing::debug!(pattern = glob, error = %e, "Invalid glob pattern");
            None
        }
    }
}

/// fnmatch-style glob test. An invalid glob matches nothing.
pub fn glob_matches(glob: &str, text: &str, mode: GlobMode) -> bool {
    let Some(pattern) = compile_glob(glob) else {
        return false;
    };

    let options = MatchOptions {
        case_sensitive: true,
        require_literal_separator: mode == GlobMode::Pathname,
        require_literal_leading_dot: false,
    };

    pattern.matches_with(text, options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_wildcard() {
        assert!(matches!(QueryPattern::parse("*"), QueryPattern::Wildcard));
        assert!(matches!(QueryPattern::parse("**"), QueryPattern::Glob(_)));
    }

    #[test]
    fn test_parse_date_relations() {
        let cases = [
            (">2020-01-01", DateOp::After, false, "2020-01-01"),
            (">=2020-01-01", DateOp::After, true, "2020-01-01"),
            ("<foo-1.0", DateOp::Before, false, "foo-1.0"),
            ("<=foo-1.0", DateOp::Before, true, "foo-1.0"),
            (">", DateOp::After, false, ""),
        ];

        for (input, want_op, want_inclusive, want_reference) in cases {
            match QueryPattern::parse(input) {
                QueryPattern::DateRelation {
                    op,
                    inclusive,
                    reference,
                } => {
                    assert_eq!(op, want_op, "{}", input);
                    assert_eq!(inclusive, want_inclusive, "{}", input);
                    assert_eq!(reference, want_reference, "{}", input);
                }
                other => panic!("{} classified as {:?}", input, other),
            }
        }
    }

    #[test]
    fn test_parse_bare_equals_is_glob() {
        assert!(matches!(QueryPattern::parse("=2020-01-01"), QueryPattern::Glob(_)));
        assert!(matches!(QueryPattern::parse("a>b"), QueryPattern::Glob(_)));
    }

    #[test]
    fn test_regex_constructor() {
        assert!(matches!(QueryPattern::regex("^py3[0-9]+-"), Ok(QueryPattern::Regex(_))));
        assert!(matches!(QueryPattern::regex("("), Err(PkgError::Format { .. })));
    }

    #[test]
    fn test_display() {
        assert_eq!(QueryPattern::parse("<=foo-1.0").to_string(), "<=foo-1.0");
        assert_eq!(QueryPattern::parse("*").to_string(), "*");
        assert_eq!(QueryPattern::regex("^a").unwrap().to_string(), "/^a/");
    }

    #[test]
    fn test_date_op_holds() {
        assert!(DateOp::After.holds(Ordering::Greater, false));
        assert!(!DateOp::After.holds(Ordering::Equal, false));
        assert!(DateOp::After.holds(Ordering::Equal, true));
        assert!(!DateOp::After.holds(Ordering::Less, true));
        assert!(DateOp::Before.holds(Ordering::Less, false));
        assert!(!DateOp::Before.holds(Ordering::Greater, true));
    }

    #[test]
    fn test_glob_plain_crosses_slash() {
        assert!(glob_matches("foo-*", "foo-1.0", GlobMode::Plain));
        assert!(!glob_matches("bar-*", "foo-1.0", GlobMode::Plain));
        assert!(glob_matches("www/*", "www/foo/bar", GlobMode::Plain));
        assert!(glob_matches("foo-?.[0-9]", "foo-1.0", GlobMode::Plain));
    }

    #[test]
    fn test_glob_pathname_stops_at_slash() {
        assert!(glob_matches("www/*", "www/curl", GlobMode::Pathname));
        assert!(!glob_matches("*", "www/curl", GlobMode::Pathname));
        assert!(glob_matches("*/curl", "www/curl", GlobMode::Pathname));
    }

    #[test]
    fn test_glob_double_star_inside_word() {
        assert!(glob_matches("py**-foo", "py311-foo", GlobMode::Plain));
    }

    #[test]
    fn test_unclosed_bracket_is_literal() {
        assert!(glob_matches("foo[", "foo[", GlobMode::Plain));
        assert!(!glob_matches("foo[", "foo-1.0", GlobMode::Plain));
        assert!(glob_matches("misc/c[", "misc/c[", GlobMode::Pathname));
    }

    #[test]
    fn test_glob_negated_brackets() {
        for mode in [GlobMode::Plain, GlobMode::Pathname] {
            assert!(glob_matches("foo-[^0]*", "foo-1.0", mode));
            assert!(glob_matches("foo-[!0]*", "foo-1.0", mode));
            assert!(!glob_matches("foo-[^1]*", "foo-1.0", mode));
            assert!(glob_matches("[]a]*", "]x", mode));
            assert!(glob_matches("[^]a]*", "bx", mode));
        }
        assert!(glob_matches("www/[^.]*", "www/curl", GlobMode::Pathname));
        assert!(!glob_matches("[^a]*", "www/curl", GlobMode::Pathname));
    }

    #[test]
    fn test_glob_escaped_metacharacters() {
        for mode in [GlobMode::Plain, GlobMode::Pathname] {
            assert!(glob_matches("a\\*", "a*", mode));
            assert!(!glob_matches("a\\*", "a\\xyz", mode));
            assert!(!glob_matches("a\\*", "abc", mode));
            assert!(glob_matches("\\[x\\]", "[x]", mode));
            assert!(glob_matches("what\\?", "what?", mode));
            assert!(!glob_matches("what\\?", "whats", mode));
            assert!(glob_matches("a\\\\b", "a\\b", mode));
            assert!(glob_matches("[\\]]", "]", mode));
        }
        assert!(glob_matches("www/\\*", "www/*", GlobMode::Pathname));
        assert!(!glob_matches("www/\\*", "www/curl", GlobMode::Pathname));
    }

    #[test]
    fn test_translate_glob() {
        assert_eq!(translate_glob("foo-[^0-9]*"), "foo-[!0-9]*");
        assert_eq!(translate_glob("a\\*b\\c"), "a[*]bc");
        assert_eq!(translate_glob("c["), "c[[]");
        assert_eq!(translate_glob("plain-1.0"), "plain-1.0");
    }
}
