//! Repository reference parsing
//!
//! Accepts the forms people paste into a config: full web URLs (with or
//! without `/tree/...` sub-paths), host-qualified paths, `git@host:` remotes
//! and bare `owner/name`.

use crate::github::GithubError;
use std::fmt;
use std::str::FromStr;

/// Owner and name of a hosted repository
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositoryRef {
    pub owner: String,
    pub name: String,
}

impl RepositoryRef {
    /// Parses a repository reference
    ///
    /// # Arguments
    ///
    /// * `raw` - Any supported reference form
    ///
    /// # Returns
    ///
    /// * `Ok(RepositoryRef)` - Owner and name were found
    /// * `Err(GithubError::InvalidReference)` - Fewer than two path segments, or invalid characters
    ///
    /// # Example
    ///
    /// ```
    /// use onyx_harvest::github::RepositoryRef;
    ///
    /// let r = RepositoryRef::parse("git@github.com:onyx-lang/onyx.git").unwrap();
    /// assert_eq!(r.full_name(), "onyx-lang/onyx");
    /// ```
    pub fn parse(raw: &str) -> Result<Self, GithubError> {
        let invalid = || GithubError::InvalidReference(raw.to_string());

        let mut rest = raw.trim();
        for scheme in ["https://", "http://", "ssh://", "git://"] {
            if let Some(stripped) = rest.strip_prefix(scheme) {
                rest = stripped;
                break;
            }
        }

        // git@host:owner/name
        let rest = match rest.strip_prefix("git@") {
            Some(remote) => remote.replacen(':', "/", 1),
            None => rest.to_string(),
        };

        let mut segments = rest.split('/').filter(|s| !s.is_empty()).peekable();

        // A leading segment with a dot is a host (github.com, www.github.com)
        if segments.peek().is_some_and(|first| first.contains('.')) {
            segments.next();
        }

        let owner = segments.next().ok_or_else(invalid)?;
        let name = segments.next().ok_or_else(invalid)?;
        let name = name.strip_suffix(".git").unwrap_or(name);

        if !is_valid_segment(owner) || !is_valid_segment(name) {
            return Err(invalid());
        }

        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }

    /// `owner/name`
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

impl FromStr for RepositoryRef {
    type Err = GithubError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

fn is_valid_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}
