use std::fmt;
use std::str::FromStr;

/// Shape of the generated document.
///
/// Parsed the same way from `--format` and from the config file's `format`
/// key: case-insensitive, with `md` accepted for Markdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize)]
#[serde(try_from = "String")]
pub enum OutputFormat {
    /// CycloneDX 1.6 JSON
    #[default]
    Json,
    Markdown,
    /// The bare dependency record list, as JSON
    Records,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 3] = [Self::Json, Self::Markdown, Self::Records];

    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Markdown => "markdown",
            OutputFormat::Records => "records",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        if wanted == "md" {
            return Ok(OutputFormat::Markdown);
        }
        Self::ALL
            .into_iter()
            .find(|format| format.as_str() == wanted)
            .ok_or_else(|| {
                format!(
                    "Invalid format: {}. Please specify 'json', 'markdown' or 'records'",
                    s
                )
            })
    }
}

impl TryFrom<String> for OutputFormat {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
