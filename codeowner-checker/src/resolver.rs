use tracing::{debug, warn};

use crate::{
    notice::{Notice, Severity},
    ownership::{OwnershipFile, OwnershipRule},
};

/// What to resolve: a workspace-relative target path (forward slashes, no
/// leading slash) and the identifier of the current user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolutionQuery<'a> {
    pub target_path: &'a str,
    pub user: Option<&'a str>,
}

impl<'a> ResolutionQuery<'a> {
    pub fn new(target_path: &'a str, user: Option<&'a str>) -> Self {
        Self { target_path, user }
    }
}

/// Outcome of a resolution. The variants are mutually exclusive; callers are
/// expected to report each one differently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// No user identifier was configured. Nothing was scanned.
    ConfigurationMissing,
    /// There were no ownership files to scan.
    NoOwnershipFiles,
    Owner(OwnerMatch),
    NotOwner,
}

impl Resolution {
    pub fn is_owner(&self) -> bool {
        matches!(self, Resolution::Owner(_))
    }

    pub fn notice(&self) -> Notice {
        match self {
            Resolution::ConfigurationMissing => Notice::new(
                Severity::Warning,
                "code owner user is not configured; set it before checking ownership",
            ),
            Resolution::NoOwnershipFiles => Notice::new(
                Severity::Info,
                "no CODEOWNERS file found in the workspace",
            ),
            Resolution::Owner(_) => Notice::new(
                Severity::Info,
                "you are listed as a code owner for this file",
            ),
            Resolution::NotOwner => Notice::new(
                Severity::Info,
                "you are not listed as a code owner for this file",
            ),
        }
    }
}

/// The rule that granted ownership.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerMatch {
    /// Index of the ownership file in the slice passed to [`resolve`].
    pub file_index: usize,
    pub root_directory: String,
    pub pattern: String,
    pub line: usize,
}

/// A rule whose pattern matches a path, regardless of who owns it.
#[derive(Debug, Clone, Copy)]
pub struct RuleMatch<'a> {
    pub file_index: usize,
    pub file: &'a OwnershipFile,
    pub rule: &'a OwnershipRule,
}

/// Decide whether `query.user` owns `query.target_path`.
///
/// Files are scanned in the given order, skipping any whose root directory
/// isn't a prefix of the target. Within a file, rules are scanned in file
/// order and the first rule that both matches the target and lists the user
/// wins, ending the scan. Rules that match without listing the user don't end
/// anything. Rules with invalid patterns are logged and treated as
/// non-matching.
pub fn resolve(query: &ResolutionQuery<'_>, files: &[OwnershipFile]) -> Resolution {
    let Some(user) = query.user.filter(|user| !user.is_empty()) else {
        return Resolution::ConfigurationMissing;
    };
    if files.is_empty() {
        return Resolution::NoOwnershipFiles;
    }

    for (file_index, file) in files.iter().enumerate() {
        if !file.applies_to(query.target_path) {
            debug!(
                root = file.root_directory(),
                path = query.target_path,
                "ownership file does not cover target"
            );
            continue;
        }

        let owning_rule = file.rules().iter().find(|rule| {
            if let Some(err) = rule.matcher().error() {
                warn!(line = rule.line(), error = %err, "skipping rule with invalid pattern");
                return false;
            }
            rule.matcher().is_match(query.target_path) && rule.is_owned_by(user)
        });
        if let Some(rule) = owning_rule {
            debug!(
                root = file.root_directory(),
                line = rule.line(),
                pattern = rule.pattern(),
                user,
                "user owns target"
            );
            return Resolution::Owner(OwnerMatch {
                file_index,
                root_directory: file.root_directory().to_owned(),
                pattern: rule.pattern().to_owned(),
                line: rule.line(),
            });
        }
    }

    Resolution::NotOwner
}

/// Every rule, across all files covering `target_path`, whose pattern
/// matches it. Results are in scan order. Rules with invalid patterns never
/// match and aren't logged here; [`resolve`] reports them.
pub fn matching_rules<'a>(target_path: &str, files: &'a [OwnershipFile]) -> Vec<RuleMatch<'a>> {
    files
        .iter()
        .enumerate()
        .filter(|(_, file)| file.applies_to(target_path))
        .flat_map(move |(file_index, file)| {
            file.rules()
                .iter()
                .filter(move |rule| rule.matcher().is_match(target_path))
                .map(move |rule| RuleMatch {
                    file_index,
                    file,
                    rule,
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::{
        io,
        sync::{Arc, Mutex},
    };

    use super::*;

    fn root(source: &str) -> OwnershipFile {
        OwnershipFile::parse("", source)
    }

    fn query<'a>(target_path: &'a str, user: &'a str) -> ResolutionQuery<'a> {
        ResolutionQuery::new(target_path, Some(user))
    }

    fn owner_line(resolution: &Resolution) -> Option<(usize, usize)> {
        match resolution {
            Resolution::Owner(m) => Some((m.file_index, m.line)),
            _ => None,
        }
    }

    #[test]
    fn test_missing_user() {
        let files = [root("* alice")];
        for user in [None, Some("")] {
            let q = ResolutionQuery::new("src/x.ts", user);
            assert_eq!(resolve(&q, &files), Resolution::ConfigurationMissing);
            assert_eq!(resolve(&q, &[]), Resolution::ConfigurationMissing);
        }
    }

    #[test]
    fn test_no_files() {
        assert_eq!(
            resolve(&query("src/x.ts", "bob"), &[]),
            Resolution::NoOwnershipFiles
        );
    }

    #[test]
    fn test_wildcard_owner() {
        let files = [root("* alice bob")];
        let resolution = resolve(&query("src/x.ts", "bob"), &files);
        assert_eq!(
            resolution,
            Resolution::Owner(OwnerMatch {
                file_index: 0,
                root_directory: "".into(),
                pattern: "*".into(),
                line: 1,
            })
        );
        assert!(resolution.is_owner());
    }

    #[test]
    fn test_wildcard_respects_root_directory() {
        let files = [OwnershipFile::parse("web", "* alice")];
        assert!(resolve(&query("web/index.ts", "alice"), &files).is_owner());
        assert!(resolve(&query("web", "alice"), &files).is_owner());
        assert_eq!(
            resolve(&query("api/main.go", "alice"), &files),
            Resolution::NotOwner
        );
    }

    #[test]
    fn test_user_not_listed() {
        let files = [root("\\.md carol")];
        assert_eq!(
            resolve(&query("src/readme.md", "bob"), &files),
            Resolution::NotOwner
        );
        assert!(resolve(&query("src/readme.md", "carol"), &files).is_owner());
    }

    #[test]
    fn test_glob_style_pattern_is_not_a_regex() {
        // `*.md` doesn't compile as a regular expression, so it never matches.
        let files = [root("*.md carol")];
        assert_eq!(
            resolve(&query("src/readme.md", "bob"), &files),
            Resolution::NotOwner
        );
        assert_eq!(
            resolve(&query("src/readme.md", "carol"), &files),
            Resolution::NotOwner
        );
    }

    #[test]
    fn test_invalid_pattern_is_skipped() {
        let files = [root("[ dave")];
        assert_eq!(resolve(&query("[", "dave"), &files), Resolution::NotOwner);

        let files = [root("[ dave\nsrc/ dave")];
        assert_eq!(owner_line(&resolve(&query("src/a.rs", "dave"), &files)), Some((0, 2)));
    }

    #[test]
    fn test_first_owning_rule_wins() {
        let files = [root("src alice\nsrc/lib alice bob\n.* bob")];
        assert_eq!(owner_line(&resolve(&query("src/lib/a.rs", "alice"), &files)), Some((0, 1)));
        assert_eq!(owner_line(&resolve(&query("src/lib/a.rs", "bob"), &files)), Some((0, 2)));
        assert_eq!(owner_line(&resolve(&query("docs/a.md", "bob"), &files)), Some((0, 3)));
    }

    #[test]
    fn test_matching_rule_without_user_does_not_stop_scan() {
        let files = [
            root("* carol\nsrc carol"),
            OwnershipFile::parse("src", "\\.rs$ dave\n.* bob"),
        ];
        assert_eq!(owner_line(&resolve(&query("src/a.rs", "bob"), &files)), Some((1, 2)));
    }

    #[test]
    fn test_earlier_file_wins() {
        let files = [
            OwnershipFile::parse("src", "* alice"),
            root("* alice"),
        ];
        assert_eq!(owner_line(&resolve(&query("src/a.rs", "alice"), &files)), Some((0, 1)));
        assert_eq!(owner_line(&resolve(&query("lib/a.rs", "alice"), &files)), Some((1, 1)));
    }

    #[test]
    fn test_uncovered_file_contributes_nothing() {
        let files = [OwnershipFile::parse("api", ".* erin")];
        assert_eq!(
            resolve(&query("web/api/handler.rs", "erin"), &files),
            Resolution::NotOwner
        );
    }

    #[test]
    fn test_root_prefix_has_no_segment_boundary() {
        let files = [OwnershipFile::parse("foo", "* frank")];
        assert!(resolve(&query("foobar/x", "frank"), &files).is_owner());
        assert!(resolve(&query("foo2/bar", "frank"), &files).is_owner());
    }

    #[test]
    fn test_patterns_search_the_full_path() {
        let files = [root("lib frank\n^docs/ grace")];
        assert!(resolve(&query("crates/lib/src/a.rs", "frank"), &files).is_owner());
        assert!(resolve(&query("docs/a.md", "grace"), &files).is_owner());
        assert_eq!(
            resolve(&query("site/docs/a.md", "grace"), &files),
            Resolution::NotOwner
        );
    }

    #[test]
    fn test_matching_rules() {
        let files = [
            root("* alice\n[ bob\n\\.rs$ carol\n\\.md$ dave"),
            OwnershipFile::parse("src", "lib erin"),
            OwnershipFile::parse("docs", "* frank"),
        ];
        let matches = matching_rules("src/lib.rs", &files)
            .into_iter()
            .map(|m| (m.file_index, m.rule.pattern()))
            .collect::<Vec<_>>();
        assert_eq!(matches, [(0, "*"), (0, "\\.rs$"), (1, "lib")]);
    }

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl io::Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_invalid_pattern_warns_once_per_resolution() {
        let buf = SharedBuf::default();
        let writer = buf.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        let files = [root("[ dave\n* bob")];
        tracing::subscriber::with_default(subscriber, || {
            let resolution = resolve(&query("src/x.ts", "bob"), &files);
            assert!(resolution.is_owner());
            assert_eq!(matching_rules("src/x.ts", &files).len(), 1);
        });

        let logs = String::from_utf8(buf.0.lock().unwrap().clone()).unwrap();
        assert_eq!(logs.matches("skipping rule with invalid pattern").count(), 1);
    }

    #[test]
    fn test_notices() {
        let examples = [
            (Resolution::ConfigurationMissing, Severity::Warning),
            (Resolution::NoOwnershipFiles, Severity::Info),
            (Resolution::NotOwner, Severity::Info),
        ];
        for (resolution, severity) in examples {
            assert_eq!(resolution.notice().severity, severity);
        }

        let owned = resolve(&query("a", "alice"), &[root("* alice")]);
        assert_eq!(
            owned.notice().message,
            "you are listed as a code owner for this file"
        );
        assert_ne!(owned.notice().message, Resolution::NotOwner.notice().message);
    }
}
