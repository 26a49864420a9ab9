use lockfile_sbom::adapters::outbound::console::StderrProgressReporter;
use lockfile_sbom::adapters::outbound::filesystem::FileSystemReader;
use lockfile_sbom::application::dto::SbomRequest;
use lockfile_sbom::application::factories::{FormatterFactory, PresenterFactory, PresenterType};
use lockfile_sbom::application::read_models::SbomReadModelBuilder;
use lockfile_sbom::application::use_cases::GenerateSbomUseCase;
use lockfile_sbom::cli::Args;
use lockfile_sbom::config::{self, ConfigFile};
use lockfile_sbom::logging;
use lockfile_sbom::sbom_generation::domain::LockfileType;
use lockfile_sbom::shared::error::{ExitCode, SbomError};
use lockfile_sbom::shared::Result;
use anyhow::Context;
use std::path::{Path, PathBuf};
use std::process;

fn main() {
    let args = match Args::try_parse_args() {
        Ok(args) => args,
        Err(e) => {
            let code = if e.use_stderr() {
                ExitCode::InvalidArguments
            } else {
                ExitCode::Success
            };
            let _ = e.print();
            process::exit(code.as_i32());
        }
    };

    logging::init(args.verbose);

    if let Err(e) = run(args) {
        eprintln!("\n❌ An error occurred:\n");
        eprintln!("{}", e);

        // Display error chain
        for cause in e.chain().skip(1) {
            eprintln!("\nCaused by: {}", cause);
        }

        eprintln!();
        process::exit(ExitCode::for_error(&e).as_i32());
    }
}

fn run(args: Args) -> Result<()> {
    let config = load_config(&args)?;
    let settings = config::resolve_settings(&args, config.as_ref())?;

    let lockfile_paths = if args.lockfiles.is_empty() {
        vec![discover_lockfile(Path::new("."))?]
    } else {
        args.lockfiles.clone()
    };

    let progress_reporter = if args.quiet {
        StderrProgressReporter::quiet()
    } else {
        StderrProgressReporter::new()
    };

    // Create use case with injected dependencies
    let use_case = GenerateSbomUseCase::new(
        FileSystemReader::new(),
        FileSystemReader::new(),
        progress_reporter,
    );

    let request = SbomRequest::new(lockfile_paths)
        .with_lockfile_type(settings.lockfile_type)
        .with_exclude_patterns(settings.exclude_patterns)
        .with_reachability(settings.reachability);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start the async runtime")?;
    let response = runtime.block_on(use_case.execute(request))?;

    if !args.quiet {
        eprintln!("{}", FormatterFactory::progress_message(settings.format));
    }

    let read_model = SbomReadModelBuilder::build(&response);
    let formatted_output = FormatterFactory::create(settings.format).format(&read_model)?;

    let presenter_type = PresenterType::from(settings.output);
    let completion_message = presenter_type.completion_message();
    PresenterFactory::create(presenter_type).present(&formatted_output)?;

    if let Some(message) = completion_message.filter(|_| !args.quiet) {
        eprintln!("{}", message);
    }

    Ok(())
}

fn load_config(args: &Args) -> Result<Option<ConfigFile>> {
    match &args.config {
        Some(path) => config::load_config_from_path(path).map(Some),
        None => config::discover_config(Path::new(".")),
    }
}

/// Finds the first known lockfile name present in `dir`.
fn discover_lockfile(dir: &Path) -> Result<PathBuf> {
    LockfileType::FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
        .ok_or_else(|| {
            SbomError::LockfileNotFound {
                path: dir.to_path_buf(),
                suggestion: "Pass a lockfile path, or run the command in a directory containing \
                             package-lock.json, pnpm-lock.yaml or yarn.lock"
                    .to_string(),
            }
            .into()
        })
}
