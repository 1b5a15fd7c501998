//! Process command implementation
//!
//! Runs the full pipeline: bundle acquisition, manifest validation,
//! resource resolution and rendering, and output-directory bookkeeping.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;
use std::time::Instant;

use crate::output::{emoji, OutputConfig};

/// Arguments for the process command
#[derive(Args, Debug)]
pub struct ProcessArgs {
    /// Path to the project configuration file
    #[arg(short, long, value_name = "PATH", env = "REMOTE_RESOURCES_CONFIG")]
    pub config: Option<PathBuf>,

    /// Project root directory (defaults to the configuration file's parent)
    #[arg(long, value_name = "PATH")]
    pub project_root: Option<PathBuf>,

    /// Local artifact repository root (overrides the configuration)
    #[arg(long, value_name = "PATH", env = "REMOTE_RESOURCES_REPOSITORY")]
    pub local_repository: Option<PathBuf>,

    /// Skip remote-resource processing
    #[arg(long, env = "REMOTE_RESOURCES_SKIP")]
    pub skip: bool,

    /// Suppress all output except errors
    #[arg(short, long)]
    pub quiet: bool,
}

/// Execute the process command
pub fn execute(args: ProcessArgs, output: &OutputConfig) -> Result<()> {
    use crate::acquisition::LocalRepositoryResolver;
    use crate::phases::orchestrator;
    use crate::projects::PomFileProjectBuilder;

    if args.skip {
        log::info!("Skipping remote resources execution.");
        return Ok(());
    }

    let start_time = Instant::now();

    let config_path = args
        .config
        .unwrap_or_else(|| PathBuf::from(".remote-resources.yaml"));

    if !config_path.exists() {
        anyhow::bail!("Configuration file not found: {}", config_path.display());
    }

    let project_root = match args.project_root {
        Some(root) => root,
        None => config_path
            .canonicalize()?
            .parent()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(".")),
    };

    if !args.quiet {
        println!(
            "{} Remote Resources Process",
            emoji(output, "📦", "[BUNDLE]")
        );
        println!();
    }

    let mut config = crate::config::from_file(&config_path)?;
    if let Some(repository) = args.local_repository {
        config.local_repository = Some(repository);
    }

    let repository = {
        let root = config.local_repository_root();
        if root.is_absolute() {
            root
        } else {
            project_root.join(root)
        }
    };
    let resolver = LocalRepositoryResolver::new(repository.clone());
    let builder = Box::new(PomFileProjectBuilder::new(repository));

    match orchestrator::execute_process(&config, &project_root, &resolver, builder) {
        Ok(report) => {
            let duration = start_time.elapsed();

            if !args.quiet {
                println!(
                    "{} Processed successfully in {:.2}s",
                    emoji(output, "✅", "[OK]"),
                    duration.as_secs_f64()
                );
                println!(
                    "   {} resource(s): {} written, {} up to date",
                    report.stats.resources, report.stats.written, report.stats.up_to_date
                );
                println!("   Output directory: {}", report.output_dir.display());

                let excluded: usize = report
                    .resource_dirs
                    .iter()
                    .map(|dir| dir.excludes.len())
                    .sum();
                if excluded > 0 {
                    println!("   {} local override(s) excluded from packaging", excluded);
                }
                if report.attached_to_main || report.attached_to_test {
                    let mut targets = Vec::new();
                    if report.attached_to_main {
                        targets.push("main");
                    }
                    if report.attached_to_test {
                        targets.push("test");
                    }
                    println!("   Attached to {} resources", targets.join(" and "));
                }
            }

            Ok(())
        }
        Err(e) => {
            if !args.quiet {
                println!("{} Processing failed", emoji(output, "❌", "[FAIL]"));
                println!();
            }
            Err(e.into())
        }
    }
}
