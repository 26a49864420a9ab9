/// Formatter adapters for different SBOM output formats
mod cyclonedx_formatter;
mod markdown_formatter;
mod records_formatter;

pub use cyclonedx_formatter::CycloneDxFormatter;
pub use markdown_formatter::MarkdownFormatter;
pub use records_formatter::RecordsFormatter;
