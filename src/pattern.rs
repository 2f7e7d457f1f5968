//! Ant-style glob patterns for entry selection.
//!
//! Patterns are matched against the whole relative path of an entry, one
//! `/`-separated segment at a time:
//!
//! | Token | Matches |
//! |-------|---------|
//! | `**` (whole segment) | zero or more segments |
//! | `*` | any characters within one segment |
//! | `?` | exactly one character within one segment |
//!
//! Everything else is literal and matching is case-sensitive. A pattern
//! ending in `/` matches everything below that directory (`dir/` is read as
//! `dir/**`).
//!
//! Patterns combine into a [`PatternSet`] (any pattern matches), and a
//! [`Filter`] turns a set into an include or exclude decision:
//!
//! ```rust
//! use archpatch::pattern::{Filter, PatternSet};
//!
//! let set = PatternSet::new(["META-INF/**", "*.txt"]).unwrap();
//! assert!(set.matches("META-INF/services/Foo"));
//! assert!(set.matches("readme.txt"));
//! assert!(!set.matches("docs/readme.txt"));
//!
//! let excludes = Filter::exclude(set);
//! assert!(excludes.accepts("org/Main.class"));
//! assert!(!excludes.accepts("META-INF/MANIFEST.MF"));
//! ```

use glob::{MatchOptions, Pattern};

use crate::{EntryPath, Error, Result};

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// One compiled pattern segment.
#[derive(Debug, Clone)]
enum Segment {
    /// `**`: zero or more whole segments.
    AnyDepth,
    /// A segment without wildcards.
    Literal(String),
    /// A segment with `*` or `?`, matched by `glob`.
    Wildcard(Pattern),
}

impl Segment {
    fn compile(pattern: &str, segment: &str) -> Result<Self> {
        if segment == "**" {
            return Ok(Self::AnyDepth);
        }
        if !segment.contains(['*', '?']) {
            return Ok(Self::Literal(segment.to_string()));
        }

        // Only `*` and `?` are wildcards. Runs of `*` inside a segment behave
        // like a single `*`; brackets are escaped so `glob` treats them literally.
        let mut glob = String::with_capacity(segment.len() + 4);
        let mut previous_star = false;
        for c in segment.chars() {
            match c {
                '*' if previous_star => continue,
                '*' | '?' => glob.push(c),
                '[' => glob.push_str("[[]"),
                ']' => glob.push_str("[]]"),
                c => glob.push(c),
            }
            previous_star = c == '*';
        }

        Pattern::new(&glob)
            .map(Self::Wildcard)
            .map_err(|e| Error::InvalidPattern {
                pattern: pattern.to_string(),
                reason: e.to_string(),
            })
    }

    fn matches(&self, segment: &str) -> bool {
        match self {
            Self::AnyDepth => true,
            Self::Literal(literal) => literal == segment,
            Self::Wildcard(pattern) => pattern.matches_with(segment, MATCH_OPTIONS),
        }
    }
}

/// A single compiled path pattern.
#[derive(Debug, Clone)]
pub struct PathPattern {
    source: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    /// Compiles a pattern.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPattern`] if the pattern is empty or a
    /// wildcard segment cannot be compiled.
    pub fn new(pattern: &str) -> Result<Self> {
        let mut normalized = pattern.replace('\\', "/");
        if normalized.ends_with('/') {
            normalized.push_str("**");
        }

        let segments = normalized
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| Segment::compile(pattern, s))
            .collect::<Result<Vec<_>>>()?;

        if segments.is_empty() {
            return Err(Error::InvalidPattern {
                pattern: pattern.to_string(),
                reason: "empty pattern".into(),
            });
        }

        Ok(Self {
            source: pattern.to_string(),
            segments,
        })
    }

    /// Returns the pattern as it was configured.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Returns true if the pattern matches the relative path.
    pub fn matches(&self, path: &str) -> bool {
        let path: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        match_segments(&self.segments, &path)
    }

    /// Returns true if the pattern matches the entry path.
    pub fn matches_entry(&self, path: &EntryPath) -> bool {
        let path: Vec<&str> = path.segments().collect();
        match_segments(&self.segments, &path)
    }
}

/// Matches in O(pattern × path) time.
///
/// `next[j]` holds whether the pattern tail after the current segment
/// matches `path[j..]`; rows are built from the last segment backwards.
fn match_segments(pattern: &[Segment], path: &[&str]) -> bool {
    let n = path.len();
    let mut next = vec![false; n + 1];
    next[n] = true;
    let mut current = vec![false; n + 1];

    for segment in pattern.iter().rev() {
        match segment {
            Segment::AnyDepth => {
                current[n] = next[n];
                for j in (0..n).rev() {
                    current[j] = next[j] || current[j + 1];
                }
            }
            segment => {
                current[n] = false;
                for j in 0..n {
                    current[j] = next[j + 1] && segment.matches(path[j]);
                }
            }
        }
        std::mem::swap(&mut next, &mut current);
    }
    next[0]
}

/// An OR-combination of patterns.
///
/// An empty set matches nothing.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    patterns: Vec<PathPattern>,
}

impl PatternSet {
    /// Compiles every pattern into a set.
    pub fn new<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| PathPattern::new(p.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    /// Returns true if any pattern matches the path.
    pub fn matches(&self, path: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(path))
    }

    /// Returns true if any pattern matches the entry path.
    pub fn matches_entry(&self, path: &EntryPath) -> bool {
        self.patterns.iter().any(|p| p.matches_entry(path))
    }

    /// Returns the number of patterns.
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Returns true if the set has no patterns.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// Whether matching entries are kept or dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterPolicy {
    /// Keep only entries matching the set.
    #[default]
    Include,
    /// Drop entries matching the set.
    Exclude,
}

impl FilterPolicy {
    /// Applies the policy to a match result.
    pub fn apply(&self, matched: bool) -> bool {
        match self {
            Self::Include => matched,
            Self::Exclude => !matched,
        }
    }
}

/// A pattern set combined with a [`FilterPolicy`].
#[derive(Debug, Clone)]
pub struct Filter {
    patterns: PatternSet,
    policy: FilterPolicy,
}

impl Filter {
    /// Accepts paths matching any pattern.
    pub fn include(patterns: PatternSet) -> Self {
        Self {
            patterns,
            policy: FilterPolicy::Include,
        }
    }

    /// Accepts paths matching none of the patterns.
    pub fn exclude(patterns: PatternSet) -> Self {
        Self {
            patterns,
            policy: FilterPolicy::Exclude,
        }
    }

    /// Returns true if the path passes the filter.
    pub fn accepts(&self, path: &str) -> bool {
        self.policy.apply(self.patterns.matches(path))
    }

    /// Returns true if the entry path passes the filter.
    pub fn accepts_entry(&self, path: &EntryPath) -> bool {
        self.policy.apply(self.patterns.matches_entry(path))
    }
}
