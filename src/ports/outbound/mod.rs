/// Outbound ports (Driven ports) - Infrastructure interfaces
///
/// These ports define the interfaces that the application core uses
/// to interact with external systems (file system, console).
pub mod formatter;
pub mod lockfile_reader;
pub mod manifest_reader;
pub mod output_presenter;
pub mod progress_reporter;

pub use formatter::SbomFormatter;
pub use lockfile_reader::{AsyncLockfileReader, LockfileReader};
pub use manifest_reader::ManifestReader;
pub use output_presenter::OutputPresenter;
pub use progress_reporter::ProgressReporter;
