use crate::application::read_models::SbomReadModel;
use crate::shared::Result;

/// Renders the read model as one output document.
///
/// Implementations exist for CycloneDX JSON, Markdown and the plain record
/// list. Component order in the model is already final.
pub trait SbomFormatter {
    /// # Errors
    /// Returns an error if serialization fails
    fn format(&self, model: &SbomReadModel) -> Result<String>;
}
