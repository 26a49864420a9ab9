//! npm-style requirement matching against installed versions.

use crate::sbom_generation::domain::DependencyRecord;
use semver::{Version, VersionReq};

const OPERATOR_CHARS: [char; 5] = ['<', '>', '=', '~', '^'];

/// A parsed npm requirement: one or more `||` alternatives.
#[derive(Debug, Clone)]
pub struct VersionRange {
    alternatives: Vec<VersionReq>,
}

impl VersionRange {
    /// Parses an npm range.
    ///
    /// Handles:
    /// - Standard semver ranges: ^1.0.0, ~1.0.0, >=1.0.0, etc.
    /// - Bare versions, which npm treats as exact: 1.2.3
    /// - Hyphen ranges: 1.0.0 - 2.0.0
    /// - X-ranges and partials: 1.x, 1.2.*, 1.2
    /// - Space-separated comparators: >= 2.1.2 < 3.0.0
    /// - OR ranges: ^1.0.0 || ^2.0.0
    ///
    /// Returns `None` for tags, URLs and other non-range requirements.
    pub fn parse(range: &str) -> Option<Self> {
        let range = range.trim();
        if range.is_empty() {
            return Some(Self {
                alternatives: vec![VersionReq::STAR],
            });
        }

        let alternatives: Vec<VersionReq> = range
            .split("||")
            .map(str::trim)
            .filter(|alt| !alt.is_empty())
            .filter_map(parse_alternative)
            .collect();

        if alternatives.is_empty() {
            None
        } else {
            Some(Self { alternatives })
        }
    }

    pub fn matches(&self, version: &Version) -> bool {
        self.alternatives.iter().any(|req| req.matches(version))
    }
}

/// Resolves an `npm:` alias requirement to the real name and its range.
///
/// `npm:real@^1.0.0` yields `("real", "^1.0.0")` and `npm:real` yields
/// `("real", "*")`. Yarn's `npm:^1.0.0` form only carries a range and keeps
/// the declared name. Anything else is returned unchanged.
pub fn resolve_alias<'a>(name: &'a str, requirement: &'a str) -> (&'a str, &'a str) {
    let Some(target) = requirement.trim().strip_prefix("npm:") else {
        return (name, requirement);
    };
    match target.rfind('@') {
        Some(index) if index > 0 => (&target[..index], &target[index + 1..]),
        _ if target.starts_with(|c: char| c.is_ascii_digit() || "^~<>=*".contains(c)) => {
            (name, target)
        }
        _ => (target, "*"),
    }
}

/// Picks the installed record a requirement resolves to.
///
/// A lone candidate always wins. Otherwise an exact version string match is
/// taken, then the highest version satisfying the range, then the highest
/// installed version when the requirement is not a range at all or nothing
/// satisfies it.
pub fn select_installed<'a>(
    requirement: &str,
    candidates: &[&'a DependencyRecord],
) -> Option<&'a DependencyRecord> {
    match candidates {
        [] => return None,
        [only] => return Some(*only),
        _ => {}
    }

    let requirement = requirement.trim();
    if let Some(exact) = candidates
        .iter()
        .copied()
        .find(|record| record.version() == requirement)
    {
        return Some(exact);
    }

    if let Some(range) = VersionRange::parse(requirement) {
        let satisfying = candidates.iter().copied().filter(|record| {
            Version::parse(record.version()).is_ok_and(|version| range.matches(&version))
        });
        if let Some(best) = highest(satisfying) {
            return Some(best);
        }
    }

    highest(candidates.iter().copied())
}

fn highest<'a>(records: impl Iterator<Item = &'a DependencyRecord>) -> Option<&'a DependencyRecord> {
    records.max_by(|a, b| {
        let left = Version::parse(a.version()).ok();
        let right = Version::parse(b.version()).ok();
        left.cmp(&right).then_with(|| a.version().cmp(b.version()))
    })
}

fn parse_alternative(alternative: &str) -> Option<VersionReq> {
    if let Some((start, end)) = parse_hyphen_range(alternative) {
        return VersionReq::parse(&format!(">={}, <={}", start, end)).ok();
    }

    let comparators: Vec<String> = comparator_tokens(alternative)
        .into_iter()
        .map(|token| normalize_comparator(&token))
        .collect();
    if comparators.iter().any(|c| c == "*") {
        return Some(VersionReq::STAR);
    }

    VersionReq::parse(&comparators.join(", ")).ok()
}

fn parse_hyphen_range(range: &str) -> Option<(&str, &str)> {
    let (start, end) = range.split_once(" - ")?;
    let (start, end) = (start.trim(), end.trim());
    if start.is_empty() || end.is_empty() {
        None
    } else {
        Some((start, end))
    }
}

/// Splits on whitespace, reattaching detached operators (`>= 1.0.0`).
fn comparator_tokens(range: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut pending_operator = String::new();
    for word in range.split_whitespace() {
        if word.chars().all(|c| OPERATOR_CHARS.contains(&c)) {
            pending_operator.push_str(word);
        } else {
            tokens.push(format!("{}{}", std::mem::take(&mut pending_operator), word));
        }
    }
    tokens
}

/// Rewrites one npm comparator into the `semver` crate's dialect.
fn normalize_comparator(token: &str) -> String {
    let split = token
        .find(|c: char| !OPERATOR_CHARS.contains(&c))
        .unwrap_or(token.len());
    let (operator, version) = token.split_at(split);
    let version = version.trim_start_matches(['v', 'V']);
    let version = strip_wildcard_segments(version);

    if version.is_empty() {
        return "*".to_string();
    }

    if operator.is_empty() {
        // npm reads a bare full version as exact and a bare partial as an x-range.
        return if Version::parse(&version).is_ok() {
            format!("={}", version)
        } else {
            format!("~{}", version)
        };
    }

    format!("{}{}", operator, version)
}

/// `1.2.x` -> `1.2`, `*` -> ``.
fn strip_wildcard_segments(version: &str) -> String {
    version
        .split('.')
        .take_while(|segment| !matches!(*segment, "x" | "X" | "*"))
        .collect::<Vec<_>>()
        .join(".")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(versions: &[&str]) -> Vec<DependencyRecord> {
        versions
            .iter()
            .map(|v| DependencyRecord::new("pkg", *v).unwrap())
            .collect()
    }

    fn select(requirement: &str, versions: &[&str]) -> Option<String> {
        let owned = records(versions);
        let candidates: Vec<&DependencyRecord> = owned.iter().collect();
        select_installed(requirement, &candidates).map(|r| r.version().to_string())
    }

    fn matches(range: &str, version: &str) -> bool {
        VersionRange::parse(range)
            .unwrap()
            .matches(&Version::parse(version).unwrap())
    }

    #[test]
    fn test_caret_and_tilde() {
        assert!(matches("^1.2.0", "1.9.0"));
        assert!(!matches("^1.2.0", "2.0.0"));
        assert!(matches("~1.2.0", "1.2.9"));
        assert!(!matches("~1.2.0", "1.3.0"));
    }

    #[test]
    fn test_bare_version_is_exact() {
        assert!(matches("1.2.3", "1.2.3"));
        assert!(!matches("1.2.3", "1.2.4"));
        assert!(matches("v1.2.3", "1.2.3"));
    }

    #[test]
    fn test_partial_and_x_ranges() {
        assert!(matches("1.x", "1.9.9"));
        assert!(!matches("1.x", "2.0.0"));
        assert!(matches("1.2.*", "1.2.7"));
        assert!(!matches("1.2.*", "1.3.0"));
        assert!(matches("1.2", "1.2.5"));
        assert!(matches("*", "0.0.1"));
        assert!(matches("", "3.0.0"));
        assert!(matches("^2.x", "2.5.0"));
    }

    #[test]
    fn test_hyphen_range() {
        assert!(matches("1.0.0 - 2.0.0", "2.0.0"));
        assert!(!matches("1.0.0 - 2.0.0", "2.0.1"));
    }

    #[test]
    fn test_space_separated_comparators() {
        assert!(matches(">= 2.1.2 < 3.0.0", "2.5.0"));
        assert!(matches(">=2.1.2 <3.0.0", "2.1.2"));
        assert!(!matches(">=2.1.2 <3.0.0", "3.0.0"));
    }

    #[test]
    fn test_or_range() {
        assert!(matches("^1.0.0 || ^2.0.0", "2.5.0"));
        assert!(matches("^14.0.0||^15.0.0", "14.1.0"));
        assert!(!matches("^1.0.0 || ^2.0.0", "3.0.0"));
    }

    #[test]
    fn test_non_ranges_do_not_parse() {
        assert!(VersionRange::parse("latest").is_none());
        assert!(VersionRange::parse("github:user/repo#main").is_none());
        assert!(VersionRange::parse("https://example.com/pkg.tgz").is_none());
    }

    #[test]
    fn test_resolve_alias() {
        assert_eq!(
            resolve_alias("string-width-cjs", "npm:string-width@^4.2.0"),
            ("string-width", "^4.2.0")
        );
        assert_eq!(
            resolve_alias("core", "npm:@babel/core@7.23.0"),
            ("@babel/core", "7.23.0")
        );
        assert_eq!(resolve_alias("lodash-alias", "npm:lodash"), ("lodash", "*"));
        assert_eq!(resolve_alias("lodash", "npm:^4.17.0"), ("lodash", "^4.17.0"));
        assert_eq!(resolve_alias("lodash", "^1.0.0"), ("lodash", "^1.0.0"));
    }

    #[test]
    fn test_select_single_candidate_always_wins() {
        assert_eq!(select("^9.0.0", &["1.0.0"]), Some("1.0.0".to_string()));
    }

    #[test]
    fn test_select_exact_version() {
        assert_eq!(select("1.5.0", &["1.0.0", "1.5.0", "2.0.0"]), Some("1.5.0".into()));
    }

    #[test]
    fn test_select_highest_satisfying() {
        assert_eq!(
            select("^1.0.0", &["1.0.0", "1.10.0", "1.9.0", "2.0.0"]),
            Some("1.10.0".into())
        );
    }

    #[test]
    fn test_select_falls_back_to_highest_installed() {
        assert_eq!(select("latest", &["1.0.0", "3.0.0", "2.0.0"]), Some("3.0.0".into()));
        assert_eq!(select("^9.0.0", &["1.0.0", "3.0.0"]), Some("3.0.0".into()));
    }

    #[test]
    fn test_select_skips_prereleases_for_plain_ranges() {
        assert_eq!(
            select("^2.0.0", &["2.0.0", "2.1.0-beta.1", "1.0.0"]),
            Some("2.0.0".into())
        );
    }

    #[test]
    fn test_select_no_candidates() {
        assert_eq!(select("^1.0.0", &[]), None);
    }
}
