use crate::{
    parser::{self, ParseError},
    pattern::{Matcher, PatternError},
};

/// File name that marks an ownership file.
pub const CODEOWNERS_FILE_NAME: &str = "CODEOWNERS";

/// A single line of an ownership file: a pattern and the users that own the
/// paths it matches.
#[derive(Debug, Clone)]
pub struct OwnershipRule {
    pattern: String,
    owners: Vec<String>,
    line: usize,
    matcher: Matcher,
}

impl OwnershipRule {
    pub fn new(pattern: impl Into<String>, owners: Vec<String>, line: usize) -> Self {
        let pattern = pattern.into();
        let matcher = Matcher::compile(&pattern);
        Self {
            pattern,
            owners,
            line,
            matcher,
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn owners(&self) -> &[String] {
        &self.owners
    }

    /// 1-based line number of the rule in its source file.
    pub fn line(&self) -> usize {
        self.line
    }

    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    pub fn is_owned_by(&self, user: &str) -> bool {
        self.owners.iter().any(|owner| owner == user)
    }
}

/// A parsed ownership file. Its rules only apply to paths that start with
/// `root_directory`.
#[derive(Debug, Clone)]
pub struct OwnershipFile {
    root_directory: String,
    rules: Vec<OwnershipRule>,
    parse_errors: Vec<ParseError>,
}

impl OwnershipFile {
    pub fn new(root_directory: impl Into<String>, rules: Vec<OwnershipRule>) -> Self {
        Self::with_parse_errors(root_directory, rules, Vec::new())
    }

    pub(crate) fn with_parse_errors(
        root_directory: impl Into<String>,
        rules: Vec<OwnershipRule>,
        parse_errors: Vec<ParseError>,
    ) -> Self {
        Self {
            root_directory: root_directory.into(),
            rules,
            parse_errors,
        }
    }

    /// Parse the contents of an ownership file found in `root_directory`.
    pub fn parse(root_directory: impl Into<String>, source: &str) -> Self {
        parser::parse(source).into_ownership_file(root_directory)
    }

    pub fn root_directory(&self) -> &str {
        &self.root_directory
    }

    pub fn rules(&self) -> &[OwnershipRule] {
        &self.rules
    }

    pub fn parse_errors(&self) -> &[ParseError] {
        &self.parse_errors
    }

    /// Rules whose pattern failed to compile. These never match.
    pub fn invalid_patterns(&self) -> impl Iterator<Item = (&OwnershipRule, &PatternError)> {
        self.rules
            .iter()
            .filter_map(|rule| rule.matcher.error().map(|err| (rule, err)))
    }

    /// Whether the file governs `target_path`. This is a plain string prefix
    /// check, so a root of `foo` also covers `foobar/baz`.
    pub fn applies_to(&self, target_path: &str) -> bool {
        target_path.starts_with(&self.root_directory)
    }
}

/// Derive the root directory of an ownership file from its
/// workspace-relative path, e.g. `services/api/CODEOWNERS` governs
/// `services/api`. A file at the workspace root governs everything.
pub fn root_directory_for(relative_path: &str) -> &str {
    if relative_path == CODEOWNERS_FILE_NAME {
        return "";
    }
    relative_path
        .strip_suffix(CODEOWNERS_FILE_NAME)
        .and_then(|dir| dir.strip_suffix('/'))
        .unwrap_or(relative_path)
}
