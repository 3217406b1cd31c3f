//! Check whether a user is listed as a code owner for a path.
//!
//! Ownership files (`CODEOWNERS`) are parsed into [`OwnershipFile`]s, each
//! scoped to the directory it was found in. [`resolve`] then scans them for a
//! rule whose pattern matches the target path and whose owners include the
//! user. Patterns are `*` or regular expressions searched anywhere in the
//! workspace-relative path.
//!
//! ```
//! use codeowner_checker::{resolve, OwnershipFile, Resolution, ResolutionQuery};
//!
//! let files = vec![OwnershipFile::parse("", "* alice bob")];
//! let query = ResolutionQuery::new("src/x.ts", Some("bob"));
//! assert!(resolve(&query, &files).is_owner());
//!
//! let query = ResolutionQuery::new("src/x.ts", None);
//! assert_eq!(resolve(&query, &files), Resolution::ConfigurationMissing);
//! ```

pub mod parser;

mod notice;
mod ownership;
mod pattern;
mod resolver;

use std::{
    fs, io,
    path::{Path, PathBuf},
};

pub use notice::{Notice, Severity};
pub use ownership::{root_directory_for, OwnershipFile, OwnershipRule, CODEOWNERS_FILE_NAME};
pub use pattern::{Matcher, PatternError};
pub use resolver::{matching_rules, resolve, OwnerMatch, Resolution, ResolutionQuery, RuleMatch};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Read and parse the ownership file at `path`, scoping it to
/// `root_directory`. Invalid UTF-8 is replaced rather than rejected.
pub fn from_path(
    path: impl AsRef<Path>,
    root_directory: impl Into<String>,
) -> Result<OwnershipFile, Error> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(OwnershipFile::parse(
        root_directory,
        &String::from_utf8_lossy(&bytes),
    ))
}
