//! Shell word splitting and joining.
//!
//! The dialect is the POSIX subset that package tooling needs when building
//! command lines for `pkg`, `pkg_info` and `make`:
//!
//! - `"..."` double quotes, where a backslash escapes the next character
//! - `'...'` single quotes, taken literally
//! - `\c` a single escaped character outside of quotes
//! - unquoted runs of anything else
//!
//! Adjacent pieces without whitespace in between form one word, so
//! `a"b"c` is the single word `abc`.
//!
//! [`join`] produces strings that [`tokenize`] splits back into the same
//! arguments.

use std::borrow::Cow;

use crate::error::{PkgError, PkgResult};

/// Whitespace as the shell sees it (`[ \t\n\v\f\r]`).
pub(crate) fn is_shell_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\x0b' | '\x0c' | '\r')
}

/// Characters that force an argument to be quoted by [`join`].
fn is_shell_meta(c: char) -> bool {
    matches!(
        c,
        '*' | '?'
            | '{'
            | '}'
            | '['
            | ']'
            | '<'
            | '>'
            | '('
            | ')'
            | '~'
            | '&'
            | '|'
            | '\\'
            | '$'
            | ';'
            | '\''
            | '"'
            | '`'
    ) || is_shell_space(c)
}

fn unterminated(quote: char, rest: &str) -> PkgError {
    PkgError::UnterminatedQuote {
        quote,
        rest: rest.to_string(),
    }
}

/// Split a command line into words.
///
/// # Errors
///
/// Returns [`PkgError::UnterminatedQuote`] when a quote is never closed or
/// the line ends with a lone backslash.
///
/// # Examples
///
/// ```
/// use pkgtools::shell::tokenize;
///
/// let words = tokenize(r#"make -C "/usr/ports/www/my port" FLAVOR='py 3' a\ b"#).unwrap();
/// assert_eq!(words, ["make", "-C", "/usr/ports/www/my port", "FLAVOR=py 3", "a b"]);
/// ```
pub fn tokenize(line: &str) -> PkgResult<Vec<String>> {
    let mut words = Vec::new();
    let mut rest = line.trim_start_matches(is_shell_space);

    while !rest.is_empty() {
        let mut word = String::new();

        loop {
            let mut chars = rest.chars();
            match chars.next() {
                Some('"') => {
                    let consumed = read_double_quoted(rest, &mut word)?;
                    rest = &rest[consumed..];
                }
                Some('\'') => {
                    let end = rest[1..]
                        .find('\'')
                        .ok_or_else(|| unterminated('\'', rest))?;
                    word.push_str(&rest[1..1 + end]);
                    rest = &rest[end + 2..];
                }
                Some('\\') => {
                    let escaped = chars.next().ok_or_else(|| unterminated('\\', rest))?;
                    word.push(escaped);
                    rest = &rest[1 + escaped.len_utf8()..];
                }
                Some(c) if !is_shell_space(c) => {
                    let end = rest
                        .find(|c: char| is_shell_space(c) || matches!(c, '\\' | '\'' | '"'))
                        .unwrap_or(rest.len());
                    word.push_str(&rest[..end]);
                    rest = &rest[end..];
                }
                _ => {
                    rest = rest.trim_start_matches(is_shell_space);
                    break;
                }
            }
        }

        words.push(word);
    }

    Ok(words)
}

/// Consume a `"..."` run at the start of `input`, appending the unescaped
/// contents to `word`. Returns the number of bytes consumed.
fn read_double_quoted(input: &str, word: &mut String) -> PkgResult<usize> {
    let mut chars = input.char_indices().skip(1);

    while let Some((i, c)) = chars.next() {
        match c {
            '"' => return Ok(i + 1),
            '\\' => match chars.next() {
                Some((_, escaped)) => word.push(escaped),
                None => break,
            },
            c => word.push(c),
        }
    }

    Err(unterminated('"', input))
}

/// Quote a single argument for the shell if it needs it.
///
/// Arguments containing glob characters, redirections, quotes, `$`,
/// backticks or whitespace are wrapped in double quotes with `$`, `\`, `"`
/// and `` ` `` escaped. The empty string becomes `""`.
///
/// ```
/// use pkgtools::shell::quote;
///
/// assert_eq!(quote("pkg"), "pkg");
/// assert_eq!(quote("foo-*"), "\"foo-*\"");
/// assert_eq!(quote("$HOME"), "\"\\$HOME\"");
/// ```
pub fn quote(arg: &str) -> Cow<'_, str> {
    if arg.is_empty() {
        return Cow::Borrowed("\"\"");
    }

    if !arg.chars().any(is_shell_meta) {
        return Cow::Borrowed(arg);
    }

    let mut quoted = String::with_capacity(arg.len() + 2);
    quoted.push('"');
    for c in arg.chars() {
        if matches!(c, '$' | '\\' | '"' | '`') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');

    Cow::Owned(quoted)
}

/// Join arguments into one shell-safe command line.
///
/// ```
/// use pkgtools::shell::join;
///
/// assert_eq!(
///     join(["/usr/bin/mktemp", "-d", "/var/tmp/portupgradeXXXXXXXX"]),
///     "/usr/bin/mktemp -d /var/tmp/portupgradeXXXXXXXX"
/// );
/// assert_eq!(join(["pkg", "query", "%n %v"]), "pkg query \"%n %v\"");
/// ```
pub fn join<I, S>(args: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    args.into_iter()
        .map(|arg| quote(arg.as_ref()).into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================================================
    // tokenize
    // ========================================================================

    #[test]
    fn test_tokenize_plain_words() {
        assert_eq!(
            tokenize("  pkg   info\t-q  ").unwrap(),
            vec!["pkg", "info", "-q"]
        );
    }

    #[test]
    fn test_tokenize_empty_and_blank() {
        assert!(tokenize("").unwrap().is_empty());
        assert!(tokenize(" \t \n").unwrap().is_empty());
    }

    #[test]
    fn test_tokenize_double_quotes_unescape() {
        assert_eq!(
            tokenize(r#""a \"quoted\" \$word" x"#).unwrap(),
            vec![r#"a "quoted" $word"#, "x"]
        );
    }

    #[test]
    fn test_tokenize_single_quotes_are_literal() {
        assert_eq!(tokenize(r"'a \n b'").unwrap(), vec![r"a \n b"]);
    }

    #[test]
    fn test_tokenize_backslash_outside_quotes() {
        assert_eq!(tokenize(r"a\ b c\\d").unwrap(), vec!["a b", r"c\d"]);
    }

    #[test]
    fn test_tokenize_adjacent_pieces_concatenate() {
        assert_eq!(tokenize(r#"a"b"c'd'\e"#).unwrap(), vec!["abcde"]);
    }

    #[test]
    fn test_tokenize_empty_quotes_produce_empty_word() {
        assert_eq!(tokenize(r#"a "" ''"#).unwrap(), vec!["a", "", ""]);
    }

    #[test]
    fn test_tokenize_unmatched_double_quote() {
        let err = tokenize(r#"echo "abc"#).unwrap_err();
        assert!(matches!(err, PkgError::UnterminatedQuote { quote: '"', .. }));
    }

    #[test]
    fn test_tokenize_unmatched_single_quote() {
        let err = tokenize("echo 'abc").unwrap_err();
        assert!(matches!(err, PkgError::UnterminatedQuote { quote: '\'', .. }));
    }

    #[test]
    fn test_tokenize_escaped_quote_inside_double_quotes_does_not_close() {
        let err = tokenize(r#""abc\""#).unwrap_err();
        assert!(matches!(err, PkgError::UnterminatedQuote { quote: '"', .. }));
    }

    #[test]
    fn test_tokenize_trailing_backslash() {
        let err = tokenize("abc\\").unwrap_err();
        assert!(matches!(err, PkgError::UnterminatedQuote { quote: '\\', .. }));
    }

    #[test]
    fn test_tokenize_multibyte() {
        assert_eq!(tokenize("ä \"ö ü\" \\ß").unwrap(), vec!["ä", "ö ü", "ß"]);
    }

    // ========================================================================
    // join / quote
    // ========================================================================

    #[test]
    fn test_join_plain() {
        assert_eq!(join(["pkg", "info", "-qo", "foo-1.0"]), "pkg info -qo foo-1.0");
    }

    #[test]
    fn test_join_quotes_metacharacters() {
        for arg in ["a*", "a?", "{a}", "[a]", "<a", "a>", "(a)", "~a", "a&b", "a|b", "a;b"] {
            assert_eq!(join([arg]), format!("\"{}\"", arg), "arg {:?}", arg);
        }
    }

    #[test]
    fn test_join_escapes_inside_quotes() {
        assert_eq!(join([r#"a"b"#]), r#""a\"b""#);
        assert_eq!(join(["`id`"]), r#""\`id\`""#);
        assert_eq!(join([r"c:\x"]), r#""c:\\x""#);
        assert_eq!(join(["it's"]), r#""it's""#);
    }

    #[test]
    fn test_join_empty_argument() {
        assert_eq!(join(["a", "", "b"]), r#"a "" b"#);
        assert_eq!(join(Vec::<String>::new()), "");
    }

    #[test]
    fn test_join_tokenize_roundtrip_examples() {
        let args = vec![
            "cd /usr/ports/www/foo;".to_string(),
            "env".to_string(),
            "PKG_PATH=".to_string(),
            "%dn-%dv".to_string(),
            "tab\there".to_string(),
            "new\nline".to_string(),
            String::new(),
        ];
        assert_eq!(tokenize(&join(&args)).unwrap(), args);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_join_tokenize_roundtrip(
                args in proptest::collection::vec("[^\n]*", 0..8)
            ) {
                let line = join(&args);
                let split = tokenize(&line);
                prop_assert_eq!(split, Ok(args));
            }

            #[test]
            fn test_tokenize_never_panics(line in ".*") {
                let _ = tokenize(&line);
            }
        }
    }
}
