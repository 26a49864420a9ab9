use crate::sbom_generation::domain::{DependencyCollection, DependencyRecord, DerivedDependencySet};
use crate::shared::Result;
use std::cell::RefCell;

/// Maximum number of exclude patterns to prevent DoS attacks
const MAX_EXCLUDE_PATTERNS: usize = 64;

/// Maximum length of a single exclude pattern to prevent DoS attacks
const MAX_PATTERN_LENGTH: usize = 255;

/// PackageFilter - Filters dependency records based on exclusion patterns
///
/// Supports wildcard patterns using '*' to match zero or more characters.
/// Patterns are case-sensitive and validated against a character whitelist
/// that admits npm scoped names (`@scope/name`).
#[derive(Debug)]
pub struct PackageFilter {
    patterns: Vec<ExcludePattern>,
}

impl PackageFilter {
    /// Creates a new PackageFilter from raw pattern strings
    ///
    /// # Errors
    /// - Too many patterns (> MAX_EXCLUDE_PATTERNS)
    /// - Invalid pattern format (length, characters)
    pub fn new(patterns: Vec<String>) -> Result<Self> {
        if patterns.len() > MAX_EXCLUDE_PATTERNS {
            anyhow::bail!(
                "Too many exclusion patterns: {} (maximum: {})",
                patterns.len(),
                MAX_EXCLUDE_PATTERNS
            );
        }

        let patterns = patterns
            .into_iter()
            .map(ExcludePattern::new)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { patterns })
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Keeps only records whose name matches no exclusion pattern
    pub fn filter_records(&self, records: Vec<DependencyRecord>) -> Vec<DependencyRecord> {
        records
            .into_iter()
            .filter(|record| !self.matches(record.name()))
            .collect()
    }

    /// Applies the filter to any dependency set, producing a derived set
    pub fn filter_set(&self, set: &dyn DependencyCollection) -> DerivedDependencySet {
        let kept = set
            .values()
            .filter(|record| !self.matches(record.name()))
            .cloned();
        DerivedDependencySet::from_records(set.lockfile_type(), kept)
    }

    fn matches(&self, package_name: &str) -> bool {
        // Every pattern is evaluated so that match tracking stays accurate.
        self.patterns
            .iter()
            .fold(false, |hit, p| p.matches(package_name) || hit)
    }

    /// Returns the patterns that did not match any package
    ///
    /// Call after filtering to report patterns that had no effect.
    pub fn get_unmatched_patterns(&self) -> Vec<String> {
        self.patterns
            .iter()
            .filter(|p| !*p.matched.borrow())
            .map(|p| p.original.clone())
            .collect()
    }
}

/// Represents a single exclusion pattern with its compiled matcher
#[derive(Debug)]
struct ExcludePattern {
    original: String,
    matcher: PatternMatcher,
    matched: RefCell<bool>,
}

impl ExcludePattern {
    fn new(pattern: String) -> Result<Self> {
        validate_pattern(&pattern)?;

        let matcher = compile_pattern(&pattern);

        Ok(Self {
            original: pattern,
            matcher,
            matched: RefCell::new(false),
        })
    }

    fn matches(&self, package_name: &str) -> bool {
        let is_match = self.matcher.matches(package_name);
        if is_match {
            *self.matched.borrow_mut() = true;
        }
        is_match
    }
}

/// Pattern matcher types for efficient matching
#[derive(Debug)]
enum PatternMatcher {
    /// Exact match: "lodash"
    Exact(String),
    /// Leading wildcard: "*-loader"
    EndsWith(String),
    /// Trailing wildcard: "@types/*"
    StartsWith(String),
    /// Wildcards on both ends: "*eslint*"
    Contains(String),
    /// Any other arrangement: "@babel/*-plugin-*"
    Ordered {
        anchored_start: bool,
        anchored_end: bool,
        parts: Vec<String>,
    },
}

impl PatternMatcher {
    fn matches(&self, package_name: &str) -> bool {
        match self {
            PatternMatcher::Exact(s) => package_name == s,
            PatternMatcher::EndsWith(suffix) => package_name.ends_with(suffix),
            PatternMatcher::StartsWith(prefix) => package_name.starts_with(prefix),
            PatternMatcher::Contains(middle) => package_name.contains(middle),
            PatternMatcher::Ordered {
                anchored_start,
                anchored_end,
                parts,
            } => {
                let mut rest = package_name;
                for (index, part) in parts.iter().enumerate() {
                    if index == 0 && *anchored_start {
                        match rest.strip_prefix(part.as_str()) {
                            Some(tail) => rest = tail,
                            None => return false,
                        }
                        continue;
                    }
                    if index == parts.len() - 1 && *anchored_end {
                        return rest.ends_with(part.as_str());
                    }
                    match rest.find(part.as_str()) {
                        Some(pos) => rest = &rest[pos + part.len()..],
                        None => return false,
                    }
                }
                true
            }
        }
    }
}

fn validate_pattern(pattern: &str) -> Result<()> {
    if pattern.is_empty() {
        anyhow::bail!("Exclusion pattern cannot be empty");
    }

    if pattern.len() > MAX_PATTERN_LENGTH {
        anyhow::bail!(
            "Exclusion pattern is too long: '{}' ({} chars). Maximum: {} chars",
            pattern,
            pattern.len(),
            MAX_PATTERN_LENGTH
        );
    }

    for ch in pattern.chars() {
        if !is_valid_pattern_char(ch) {
            anyhow::bail!(
                "Exclusion pattern contains invalid character '{}' in pattern '{}'. \
                 Only alphanumeric, hyphens, underscores, dots, '@', '/', '~' and asterisks (*) are allowed.",
                ch,
                pattern
            );
        }
    }

    if pattern.chars().all(|c| c == '*') {
        anyhow::bail!(
            "Exclusion pattern cannot contain only wildcards: '{}'",
            pattern
        );
    }

    Ok(())
}

fn is_valid_pattern_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '@' | '/' | '~' | '*')
}

/// Compiles a pattern string into an optimized matcher
fn compile_pattern(pattern: &str) -> PatternMatcher {
    let wildcard_count = pattern.matches('*').count();
    let starts = pattern.starts_with('*');
    let ends = pattern.ends_with('*');

    match (wildcard_count, starts, ends) {
        (0, _, _) => PatternMatcher::Exact(pattern.to_string()),
        (1, true, false) => PatternMatcher::EndsWith(pattern[1..].to_string()),
        (1, false, true) => PatternMatcher::StartsWith(pattern[..pattern.len() - 1].to_string()),
        (2, true, true) => PatternMatcher::Contains(pattern[1..pattern.len() - 1].to_string()),
        _ => PatternMatcher::Ordered {
            anchored_start: !starts,
            anchored_end: !ends,
            parts: pattern
                .split('*')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        },
    }
}
