use crate::adapters::outbound::filesystem::{FileSystemWriter, StdoutPresenter};
use crate::ports::outbound::OutputPresenter;
use std::path::PathBuf;

/// Where the formatted SBOM goes
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PresenterType {
    #[default]
    Stdout,
    File(PathBuf),
}

impl From<Option<PathBuf>> for PresenterType {
    fn from(output: Option<PathBuf>) -> Self {
        output.map_or(PresenterType::Stdout, PresenterType::File)
    }
}

impl PresenterType {
    /// Line to print on stderr once the SBOM has been written.
    ///
    /// Stdout output needs no notice; the document itself is the result.
    pub fn completion_message(&self) -> Option<String> {
        match self {
            PresenterType::Stdout => None,
            PresenterType::File(path) => Some(format!("✅ SBOM written to {}", path.display())),
        }
    }
}

/// Factory for creating output presenters
pub struct PresenterFactory;

impl PresenterFactory {
    /// Creates the presenter for a destination.
    ///
    /// # Examples
    /// ```
    /// use lockfile_sbom::application::factories::{PresenterFactory, PresenterType};
    /// use std::path::PathBuf;
    ///
    /// let destination = PresenterType::from(Some(PathBuf::from("sbom.json")));
    /// let presenter = PresenterFactory::create(destination);
    /// ```
    pub fn create(presenter_type: PresenterType) -> Box<dyn OutputPresenter> {
        match presenter_type {
            PresenterType::Stdout => Box::new(StdoutPresenter::new()),
            PresenterType::File(path) => Box::new(FileSystemWriter::new(path)),
        }
    }
}
