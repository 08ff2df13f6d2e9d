//! Flag tokenization and the forbidden-flag deny list

use crate::gate::GateError;

/// Split a user flag string the way a POSIX shell splits words.
///
/// Quotes and backslash escapes are honoured. Nothing is expanded: `$HOME`,
/// `*` and backticks come through as literal text, and a word starting with
/// `#` is an ordinary word rather than a comment. Unbalanced quoting is an
/// error.
pub fn tokenize_flags(flags: &str) -> Result<Vec<String>, GateError> {
    shell_words::split(&escape_leading_hashes(flags))
        .map_err(|e| GateError::MalformedFlags(e.to_string()))
}

/// Backslash-escape every unquoted `#` that opens a word, so the splitter
/// keeps it as text instead of discarding the rest of the line.
fn escape_leading_hashes(flags: &str) -> String {
    enum Quote {
        None,
        Single,
        Double,
    }

    let mut out = String::with_capacity(flags.len());
    let mut quote = Quote::None;
    let mut word_start = true;
    let mut chars = flags.chars();

    while let Some(c) = chars.next() {
        match quote {
            Quote::None => match c {
                '\\' => {
                    out.push(c);
                    if let Some(next) = chars.next() {
                        out.push(next);
                    }
                    word_start = false;
                    continue;
                }
                '\'' => quote = Quote::Single,
                '"' => quote = Quote::Double,
                ' ' | '\t' | '\n' => {
                    out.push(c);
                    word_start = true;
                    continue;
                }
                '#' if word_start => out.push('\\'),
                _ => {}
            },
            Quote::Single => {
                if c == '\'' {
                    quote = Quote::None;
                }
            }
            Quote::Double => match c {
                '\\' => {
                    out.push(c);
                    if let Some(next) = chars.next() {
                        out.push(next);
                    }
                    continue;
                }
                '"' => quote = Quote::None,
                _ => {}
            },
        }
        out.push(c);
        word_start = false;
    }

    out
}

/// A token rejected by the deny list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation<'a> {
    pub token: &'a str,
    pub pattern: &'a str,
}

/// Case-insensitive substring deny list.
///
/// A token is rejected when it contains any entry anywhere, so
/// `--level=1--OS-SHELL` is caught as well as `--os-shell`. This also
/// rejects longer legitimate options that happen to embed an entry
/// (`--eta` is inside `--beta-option`); that over-blocking is accepted.
#[derive(Debug, Clone)]
pub struct FlagPolicy {
    forbidden: Vec<String>,
}

impl FlagPolicy {
    pub fn new<I, S>(forbidden: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            forbidden: forbidden
                .into_iter()
                .map(|f| f.as_ref().to_lowercase())
                .filter(|f| !f.is_empty())
                .collect(),
        }
    }

    /// Entry of the deny list contained in `token`, if any
    pub fn matches<'a>(&'a self, token: &str) -> Option<&'a str> {
        let lowered = token.to_lowercase();
        self.forbidden
            .iter()
            .find(|pattern| lowered.contains(pattern.as_str()))
            .map(String::as_str)
    }

    /// First offending token in `tokens`, scanning the whole list
    pub fn first_violation<'a>(&'a self, tokens: &'a [String]) -> Option<Violation<'a>> {
        tokens.iter().find_map(|token| {
            self.matches(token).map(|pattern| Violation {
                token: token.as_str(),
                pattern,
            })
        })
    }

    pub fn patterns(&self) -> &[String] {
        &self.forbidden
    }
}
