use crate::ownership::{OwnershipFile, OwnershipRule};

/// Parse a CODEOWNERS file from a string, returning a `ParseResult` containing
/// the parsed rules and any errors encountered.
///
/// Every non-blank line that doesn't start with `#` is a rule: the first
/// whitespace-separated token is the pattern and the remaining tokens are
/// owners. Tokens are taken verbatim, so a backslash belongs to the pattern's
/// regular expression and a `#` after the pattern is just another owner.
pub fn parse(source: &str) -> ParseResult {
    Parser::new(source).parse()
}

/// The result of parsing a CODEOWNERS file. Contains a `Vec` of parsed rules
/// and a `Vec` of errors encountered during parsing. Errors are always
/// recoverable: the offending line is dropped and parsing continues with the
/// next one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseResult {
    pub rules: Vec<Rule>,
    pub errors: Vec<ParseError>,
}

impl ParseResult {
    /// Convert the `ParseResult` into an `OwnershipFile` governing paths
    /// under `root_directory`. Parse errors are kept on the file so they can
    /// be reported later.
    pub fn into_ownership_file(self, root_directory: impl Into<String>) -> OwnershipFile {
        let rules = self.rules.into_iter().map(OwnershipRule::from).collect();
        OwnershipFile::with_parse_errors(root_directory, rules, self.errors)
    }
}

/// A parsed CODEOWNERS rule. Contains a pattern and a list of owners, wrapped
/// in `Spanned` to preserve the original source location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub pattern: Spanned<String>,
    pub owners: Vec<Spanned<String>>,
    pub line: usize,
}

impl Rule {
    fn new(pattern: Spanned<String>, owners: Vec<Spanned<String>>, line: usize) -> Rule {
        Rule {
            pattern,
            owners,
            line,
        }
    }
}

impl From<Rule> for OwnershipRule {
    fn from(rule: Rule) -> Self {
        OwnershipRule::new(
            rule.pattern.0,
            rule.owners.into_iter().map(|o| o.0).collect(),
            rule.line,
        )
    }
}

/// An error encountered while parsing a CODEOWNERS file. Contains a message
/// describing the error, a `Span` indicating the location of the error and
/// the 1-based line it was found on.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {line}: {message}")]
pub struct ParseError {
    pub message: String,
    pub span: Span,
    pub line: usize,
}

impl ParseError {
    fn new(message: impl Into<String>, span: impl Into<Span>, line: usize) -> ParseError {
        ParseError {
            message: message.into(),
            span: span.into(),
            line,
        }
    }
}

/// A span of text in a CODEOWNERS file. Contains the start and end byte offsets
/// of the span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span(pub usize, pub usize);

impl From<(usize, usize)> for Span {
    fn from((start, end): (usize, usize)) -> Self {
        Span(start, end)
    }
}

/// A wrapper around a value that preserves the original source location of the
/// value. Contains the value and a `Span` indicating the location of the value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spanned<T>(pub T, pub Span);

impl<T> Spanned<T> {
    fn new(val: impl Into<T>, span: impl Into<Span>) -> Spanned<T> {
        Spanned(val.into(), span.into())
    }
}

struct Parser<'a> {
    source: &'a str,
    pos: usize,
    line: usize,
    errors: Vec<ParseError>,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            pos: 0,
            line: 1,
            errors: Vec::new(),
        }
    }

    fn parse(mut self) -> ParseResult {
        let mut rules = Vec::new();

        self.skip_whitespace();
        while let Some(c) = self.peek() {
            match c {
                '\n' => {
                    self.next();
                }
                '#' => self.skip_comment(),
                _ => rules.extend(self.parse_rule()),
            }
            self.skip_whitespace();
        }

        ParseResult {
            rules,
            errors: self.errors,
        }
    }

    fn skip_comment(&mut self) {
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.next();
        }
    }

    // Only called when the next character starts a token, so the pattern is
    // never empty.
    fn parse_rule(&mut self) -> Option<Rule> {
        let line = self.line;
        let pattern = self.parse_token()?;

        let mut owners = Vec::new();
        loop {
            self.skip_whitespace();
            let Some(owner) = self.parse_token() else {
                break;
            };
            owners.push(owner);
        }

        if owners.is_empty() {
            self.errors
                .push(ParseError::new("rule has no owners", pattern.1.clone(), line));
            return None;
        }

        Some(Rule::new(pattern, owners, line))
    }

    fn parse_token(&mut self) -> Option<Spanned<String>> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if is_separator(c) {
                break;
            }
            self.next();
        }

        if self.pos == start {
            None
        } else {
            Some(Spanned::new(&self.source[start..self.pos], (start, self.pos)))
        }
    }

    // Stops at `\n`, which ends the current rule.
    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c == '\n' || !c.is_whitespace() {
                break;
            }
            self.next();
        }
    }

    fn peek(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    fn next(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }
}

fn is_separator(c: char) -> bool {
    c.is_whitespace()
}
