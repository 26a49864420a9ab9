use crate::sbom_generation::domain::{LockfileType, PnpmEra};
use crate::shared::error::LockfileError;
use serde_yaml_ng::{Mapping, Value};

const INLINE_SPECIFIERS: &str = "inlineSpecifiers";

/// Reads the grammar era from the document's version descriptor.
///
/// `shrinkwrapVersion` wins over `lockfileVersion`. Numeric versions below
/// 6 are the v5 grammar; versions 7 and 8 were never published.
pub fn detect_era(root: &Mapping) -> Result<PnpmEra, LockfileError> {
    if root.contains_key("shrinkwrapVersion") {
        return Ok(PnpmEra::Shrinkwrap);
    }

    match root.get("lockfileVersion") {
        Some(Value::Number(number)) => {
            let version = number.as_f64().unwrap_or(f64::NAN);
            match version {
                v if v < 6.0 => Ok(PnpmEra::V5),
                v if (6.0..7.0).contains(&v) => Ok(PnpmEra::V6),
                v if (9.0..10.0).contains(&v) => Ok(PnpmEra::V9),
                _ => Err(unsupported(&number.to_string())),
            }
        }
        Some(Value::String(version)) => era_from_string(version),
        Some(Value::Tagged(tagged)) => match &tagged.value {
            Value::String(version) => era_from_string(version),
            _ => Err(unsupported("non-scalar")),
        },
        Some(_) => Err(unsupported("non-scalar")),
        None => Err(LockfileError::parse(
            LockfileType::Pnpm,
            "missing `lockfileVersion`",
        )),
    }
}

fn era_from_string(version: &str) -> Result<PnpmEra, LockfileError> {
    let version = version.trim();
    let digits = version
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(version.len());
    let major: Option<u32> = version[..digits].parse().ok();

    match major {
        Some(0..=5) if version.contains(INLINE_SPECIFIERS) => Ok(PnpmEra::V5Inline),
        Some(0..=5) => Ok(PnpmEra::V5),
        Some(6) => Ok(PnpmEra::V6),
        Some(9) => Ok(PnpmEra::V9),
        _ => Err(unsupported(version)),
    }
}

fn unsupported(version: &str) -> LockfileError {
    LockfileError::parse(
        LockfileType::Pnpm,
        format!("unsupported lockfileVersion {}", version),
    )
}
