use crate::application::read_models::{ComponentView, SbomReadModel, SourceView};
use crate::ports::outbound::SbomFormatter;
use crate::shared::Result;

/// Markdown table header for package information
const TABLE_HEADER: &str = "| Package | Version | Direct | Source |\n";

/// Markdown table separator line
const TABLE_SEPARATOR: &str = "|---------|---------|--------|--------|\n";

const NPM_PACKAGE_URL: &str = "https://www.npmjs.com/package/";

/// MarkdownFormatter adapter for generating a human-readable Markdown SBOM
///
/// Package names link to their npm registry page.
pub struct MarkdownFormatter;

impl MarkdownFormatter {
    pub fn new() -> Self {
        Self
    }

    /// Escapes pipe characters and newlines for safe Markdown table rendering
    fn escape_markdown_table_cell(text: &str) -> String {
        text.replace('|', "\\|").replace('\n', " ")
    }

    fn package_link(name: &str) -> String {
        format!(
            "[{}]({}{})",
            Self::escape_markdown_table_cell(name),
            NPM_PACKAGE_URL,
            name
        )
    }
}

impl Default for MarkdownFormatter {
    fn default() -> Self {
        Self::new()
    }
}

/// Helper methods for rendering sections
impl MarkdownFormatter {
    fn render_header(&self, output: &mut String, model: &SbomReadModel) {
        output.push_str("# Software Bill of Materials (SBOM)\n\n");
        output.push_str(&format!(
            "Generated by {} {} at {}.\n\n",
            model.metadata.tool_name, model.metadata.tool_version, model.metadata.timestamp
        ));
    }

    fn render_sources(&self, output: &mut String, sources: &[SourceView]) {
        if sources.is_empty() {
            return;
        }
        output.push_str("## Lockfiles\n\n");
        for source in sources {
            output.push_str(&format!(
                "- `{}` ({}, {} packages)\n",
                source.path, source.lockfile_type, source.record_count
            ));
        }
        output.push('\n');
    }

    fn render_components(&self, output: &mut String, components: &[ComponentView]) {
        output.push_str("## Component Inventory\n\n");
        if components.is_empty() {
            output.push_str("No third-party packages were found.\n");
            return;
        }

        output.push_str(&format!("{} packages.\n\n", components.len()));
        output.push_str(TABLE_HEADER);
        output.push_str(TABLE_SEPARATOR);

        for component in components {
            let direct = if component.is_direct_dependency { "yes" } else { "" };
            let source = component.resolved.as_deref().unwrap_or("");

            output.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                Self::package_link(&component.name),
                Self::escape_markdown_table_cell(&component.version),
                direct,
                Self::escape_markdown_table_cell(source)
            ));
        }
    }
}

impl SbomFormatter for MarkdownFormatter {
    fn format(&self, model: &SbomReadModel) -> Result<String> {
        let mut output = String::new();
        self.render_header(&mut output, model);
        self.render_sources(&mut output, &model.sources);
        self.render_components(&mut output, &model.components);
        Ok(output)
    }
}
