//! Package keys ("dependency paths") of `pnpm-lock.yaml`.
//!
//! Older eras write `/name/version[_peer+info]`, newer ones write
//! `/name@version(peer@info)` or, in v9, the same without the leading slash.

use crate::sbom_generation::domain::PnpmEra;

/// A package key split into name and version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageKey<'a> {
    pub name: &'a str,
    pub version: &'a str,
}

/// Parses a package key with the grammar of `era`.
///
/// Returns `None` for local references (`link:`, `file:`) and for keys that
/// do not carry a version.
pub fn parse_key(key: &str, era: PnpmEra) -> Option<PackageKey<'_>> {
    if era.uses_at_separator() {
        parse_at_form(key)
    } else {
        parse_slash_form(key, !matches!(era, PnpmEra::Shrinkwrap))
    }
}

/// Parses a key whose grammar is not known up front, e.g. an alias target
/// written in a dependency map.
pub fn sniff_key(key: &str) -> Option<PackageKey<'_>> {
    if key.contains('(') {
        return parse_at_form(key);
    }

    let body = key.trim_start_matches('/');
    let unsuffixed = match body.split_once('_') {
        Some((head, _)) if last_segment_is_version(head) => head,
        _ => body,
    };

    match unsuffixed.rfind('@') {
        Some(index) if index > 0 && !unsuffixed[index + 1..].contains('/') => parse_at_form(key),
        _ => parse_slash_form(key, true),
    }
}

fn is_local(body: &str) -> bool {
    body.starts_with("link:") || body.starts_with("file:")
}

fn parse_at_form(key: &str) -> Option<PackageKey<'_>> {
    let body = key.strip_prefix('/').unwrap_or(key);
    if is_local(body) {
        return None;
    }
    let body = body.split('(').next().unwrap_or(body);
    let index = body.rfind('@').filter(|&index| index > 0)?;
    let (name, version) = (&body[..index], &body[index + 1..]);
    valid(name, version)
}

fn parse_slash_form(key: &str, strips_peer_suffix: bool) -> Option<PackageKey<'_>> {
    let body = key.strip_prefix('/').unwrap_or(key);
    if is_local(body) {
        return None;
    }

    let name_segments = if body.starts_with('@') { 2 } else { 1 };
    let mut boundary = 0;
    for _ in 0..name_segments {
        boundary += body[boundary..].find('/')? + 1;
    }
    let name = &body[..boundary - 1];
    let rest = &body[boundary..];

    let version = rest.split('/').next().unwrap_or(rest);
    let version = if strips_peer_suffix {
        version.split('_').next().unwrap_or(version)
    } else {
        version
    };
    valid(name, version)
}

fn valid<'a>(name: &'a str, version: &'a str) -> Option<PackageKey<'a>> {
    if name.is_empty() || !version.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    Some(PackageKey { name, version })
}

fn last_segment_is_version(path: &str) -> bool {
    path.rsplit('/')
        .next()
        .is_some_and(|segment| segment.starts_with(|c: char| c.is_ascii_digit()))
}
