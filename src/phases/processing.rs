//! Phase 3: Resolution and Rendering
//!
//! For every resource path listed in a bundle manifest, in manifest order,
//! this phase decides the winning source and materializes the output file:
//!
//! 1. The template suffix is stripped to obtain the project resource name.
//! 2. The project's resource directories are scanned in declaration order
//!    for an override: a plain file (rendered when the directory filters,
//!    byte-copied otherwise) or a template file. The winning name is added
//!    to the directory's excludes so downstream packaging does not see a
//!    duplicate. Without a directory override, an enabled project-root
//!    file of the same name is copied verbatim.
//! 3. Otherwise the bundle's own copy is materialized: template resources
//!    are decoded with the bundle's source encoding, rendered and written;
//!    plain resources are byte-copied.
//! 4. The appended-resource step always runs afterwards: a same-named file
//!    under the appended-resources directory is appended raw, else a
//!    same-named template is rendered and appended.
//!
//! Bundles are processed in declaration order, so on resource-path
//! collisions the bundle declared last overwrites earlier output in place.
//!
//! All writes go through the change-detecting writer in
//! [`crate::phases::write`].

use std::fs;
use std::path::Path;

use log::{debug, info};

use crate::config::ResourceDir;
use crate::context::RenderContext;
use crate::error::{Error, Result};
use crate::manifest::ResolvedBundle;
use crate::phases::write::{append_bytes, write_if_differs};
use crate::render::{effective_encoding, render, Encoding, TEMPLATE_SUFFIX};

/// Fixed inputs of the processing phase.
pub struct ProcessingOptions<'a> {
    /// Directory receiving every materialized resource.
    pub output_dir: &'a Path,
    /// Directory holding appended resources and appended templates.
    pub appended_dir: &'a Path,
    /// The consuming project's root directory.
    pub project_root: &'a Path,
    /// Whether same-named project-root files override bundle resources.
    pub use_project_root_files: bool,
    /// Encoding applied when a bundle declares none.
    pub fallback_encoding: &'a str,
    /// In-memory comparison bound for idempotent writes.
    pub threshold: usize,
}

/// Counters reported by the processing phase.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessingStats {
    /// Resources listed across all processed bundles.
    pub resources: usize,
    /// Destination files actually (re)written.
    pub written: usize,
    /// Destination files skipped because their content was unchanged.
    pub up_to_date: usize,
}

/// Process every resource of every bundle, in declaration order.
pub fn execute(
    bundles: &[ResolvedBundle],
    resource_dirs: &mut [ResourceDir],
    context: &RenderContext,
    options: &ProcessingOptions,
) -> Result<ProcessingStats> {
    let resource_count: usize = bundles.iter().map(|b| b.manifest.resources.len()).sum();
    info!(
        "Copying {} resource{} from {} bundle{}.",
        resource_count,
        if resource_count == 1 { "" } else { "s" },
        bundles.len(),
        if bundles.len() == 1 { "" } else { "s" },
    );

    let mut stats = ProcessingStats::default();

    for bundle in bundles {
        let encoding = effective_encoding(
            bundle.manifest.source_encoding.as_deref(),
            options.fallback_encoding,
            &bundle.coordinates,
        )?;

        for bundle_resource in &bundle.manifest.resources {
            stats.resources += 1;
            process_resource(
                bundle,
                bundle_resource,
                encoding,
                resource_dirs,
                context,
                options,
                &mut stats,
            )?;
        }
    }

    Ok(stats)
}

fn process_resource(
    bundle: &ResolvedBundle,
    bundle_resource: &str,
    encoding: Encoding,
    resource_dirs: &mut [ResourceDir],
    context: &RenderContext,
    options: &ProcessingOptions,
    stats: &mut ProcessingStats,
) -> Result<()> {
    let (project_resource, templated) = match bundle_resource.strip_suffix(TEMPLATE_SUFFIX) {
        Some(stripped) => (stripped, true),
        None => (bundle_resource, false),
    };
    debug!(
        "bundle {} resource {} -> {}",
        bundle.coordinates, bundle_resource, project_resource
    );

    let dest = options.output_dir.join(project_resource);
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }

    let overridden = copy_resource_if_exists(
        &dest,
        project_resource,
        resource_dirs,
        context,
        encoding,
        options,
        stats,
    )?;

    if !overridden {
        if templated {
            let bytes = bundle
                .source
                .read(bundle_resource)?
                .ok_or_else(|| Error::BundleRead {
                    resource: bundle_resource.to_string(),
                    message: format!("not found in bundle {}", bundle.coordinates),
                })?;
            let text = encoding.decode(&bytes, bundle_resource)?;
            let rendered = render(&text, &context.tera_context_for(&text), bundle_resource)?;
            let output = encoding.encode(&rendered, bundle_resource)?;
            record(write_if_differs(&dest, &output, options.threshold)?, stats);
        } else {
            match bundle.source.read(bundle_resource)? {
                Some(bytes) => {
                    record(write_if_differs(&dest, &bytes, options.threshold)?, stats);
                }
                None => debug!(
                    "Resource {} not present in bundle {}, skipping",
                    bundle_resource, bundle.coordinates
                ),
            }
        }
    }

    append_if_exists(&dest, project_resource, encoding, context, options)?;

    Ok(())
}

/// Scan the project for an override of `project_resource`. The first match
/// wins and is excluded from its resource directory's packaging scan.
fn copy_resource_if_exists(
    dest: &Path,
    project_resource: &str,
    resource_dirs: &mut [ResourceDir],
    context: &RenderContext,
    encoding: Encoding,
    options: &ProcessingOptions,
    stats: &mut ProcessingStats,
) -> Result<bool> {
    for dir in resource_dirs.iter_mut() {
        if !dir.path.is_dir() {
            continue;
        }

        let source = dir.path.join(project_resource);
        let template_source = dir
            .path
            .join(format!("{}{}", project_resource, TEMPLATE_SUFFIX));

        let use_template = !source.is_file() && template_source.is_file();
        let chosen = if use_template { &template_source } else { &source };

        if !chosen.is_file() || is_same_file(chosen, dest) {
            continue;
        }

        if use_template || dir.filtering {
            let bytes = fs::read(chosen)?;
            let text = encoding.decode(&bytes, project_resource)?;
            let rendered = render(&text, &context.tera_context_for(&text), project_resource)?;
            let output = encoding.encode(&rendered, project_resource)?;
            record(write_if_differs(dest, &output, options.threshold)?, stats);
        } else {
            let bytes = fs::read(chosen)?;
            record(write_if_differs(dest, &bytes, options.threshold)?, stats);
        }

        // exclude the original so packaging does not see a duplicate
        dir.excludes.push(project_resource.to_string());
        return Ok(true);
    }

    if options.use_project_root_files {
        let root_file = options.project_root.join(project_resource);
        if root_file.is_file() && !is_same_file(&root_file, dest) {
            debug!(
                "Using project root file for {}: {}",
                project_resource,
                root_file.display()
            );
            let bytes = fs::read(root_file)?;
            record(write_if_differs(dest, &bytes, options.threshold)?, stats);
            return Ok(true);
        }
    }

    Ok(false)
}

/// Always attempted after the base file was produced: append a same-named
/// appended resource raw, else render and append a same-named appended
/// template.
fn append_if_exists(
    dest: &Path,
    project_resource: &str,
    encoding: Encoding,
    context: &RenderContext,
    options: &ProcessingOptions,
) -> Result<()> {
    let appended = options.appended_dir.join(project_resource);
    let appended_template = options
        .appended_dir
        .join(format!("{}{}", project_resource, TEMPLATE_SUFFIX));

    if appended.is_file() {
        info!("Copying appended resource: {}", project_resource);
        append_bytes(dest, &fs::read(appended)?)?;
    } else if appended_template.is_file() {
        info!(
            "Filtering appended resource: {}{}",
            project_resource, TEMPLATE_SUFFIX
        );
        let bytes = fs::read(appended_template)?;
        let text = encoding.decode(&bytes, project_resource)?;
        let rendered = render(&text, &context.tera_context_for(&text), project_resource)?;
        append_bytes(dest, &encoding.encode(&rendered, project_resource)?)?;
    }

    Ok(())
}

fn record(written: bool, stats: &mut ProcessingStats) {
    if written {
        stats.written += 1;
    } else {
        stats.up_to_date += 1;
    }
}

fn is_same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
