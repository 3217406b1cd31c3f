use regex::Regex;

/// A pattern that could not be compiled as a regular expression.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid pattern `{pattern}`: {source}")]
pub struct PatternError {
    pattern: String,
    #[source]
    source: regex::Error,
}

impl PatternError {
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

/// A compiled rule pattern. Patterns are searched for anywhere in the
/// target path, so they only anchor when the expression itself does.
#[derive(Debug, Clone)]
pub enum Matcher {
    /// The bare `*` pattern, which matches every path.
    Wildcard,
    /// A pattern without regex meta characters. Searching for it is the
    /// same as searching for the equivalent regex.
    Literal(String),
    Regex(Regex),
    /// Never matches.
    Invalid(PatternError),
}

impl Matcher {
    pub fn compile(pattern: &str) -> Matcher {
        if pattern == "*" {
            return Matcher::Wildcard;
        }

        if !pattern.chars().any(regex_syntax::is_meta_character) {
            return Matcher::Literal(pattern.to_owned());
        }

        match Regex::new(pattern) {
            Ok(re) => Matcher::Regex(re),
            Err(source) => Matcher::Invalid(PatternError {
                pattern: pattern.to_owned(),
                source,
            }),
        }
    }

    pub fn is_match(&self, path: &str) -> bool {
        match self {
            Matcher::Wildcard => true,
            Matcher::Literal(literal) => {
                memchr::memmem::find(path.as_bytes(), literal.as_bytes()).is_some()
            }
            Matcher::Regex(re) => re.is_match(path),
            Matcher::Invalid(_) => false,
        }
    }

    pub fn error(&self) -> Option<&PatternError> {
        match self {
            Matcher::Invalid(err) => Some(err),
            _ => None,
        }
    }
}
