//! Orchestrator for the complete remote-resources run
//!
//! This module coordinates all phases behind one entry point: bundle
//! acquisition, manifest reading and required-property validation,
//! supplement loading, context construction, resource processing, and the
//! final output-directory bookkeeping.

use std::path::{Path, PathBuf};

use log::debug;

use crate::acquisition::{resolve_bundles, ArtifactResolver};
use crate::config::{Config, ResourceDir};
use crate::context::RenderContext;
use crate::descriptor::BundleDescriptor;
use crate::error::Result;
use crate::manifest::{read_manifest, validate_required_properties, ResolvedBundle};
use crate::phases::processing::{self, ProcessingOptions, ProcessingStats};
use crate::phases::write::write_marker;
use crate::projects::{ConfiguredDependencies, ProjectBuilder};
use crate::source::ResourceSource;
use crate::supplement::{build_locator, default_locations, load_supplements};

/// Outcome of a run: processing counters plus the project-facing side
/// effects (override excludes, resource-set attachment).
#[derive(Debug)]
pub struct RunReport {
    pub stats: ProcessingStats,
    /// Resource directories with the excludes accumulated during override
    /// resolution.
    pub resource_dirs: Vec<ResourceDir>,
    /// Whether the output directory was attached to the main resources.
    pub attached_to_main: bool,
    /// Whether the output directory was attached to the test resources.
    pub attached_to_test: bool,
    pub output_dir: PathBuf,
}

/// Execute a complete run against a configuration.
///
/// `project_root` anchors every relative path in the configuration. The
/// artifact resolver and project builder are collaborators so callers (and
/// tests) can substitute transports.
pub fn execute_process(
    config: &Config,
    project_root: &Path,
    resolver: &dyn ArtifactResolver,
    builder: Box<dyn ProjectBuilder>,
) -> Result<RunReport> {
    let output_dir = anchored(project_root, &config.output_dir);
    let build_dir = anchored(project_root, &config.build_dir);
    let appended_dir = anchored(project_root, &config.appended_resources_dir);

    // Phase 1: acquisition, in declaration order
    let descriptors = BundleDescriptor::parse_all(&config.bundles)?;
    let artifacts = resolve_bundles(&descriptors, &config.siblings, resolver)?;

    // Phase 2: manifests and required properties, before any resource work
    let mut bundles = Vec::with_capacity(artifacts.len());
    for (descriptor, artifact) in descriptors.iter().zip(&artifacts) {
        let source = ResourceSource::open(artifact)?;
        let manifest = read_manifest(&source, &descriptor.coordinates())?;
        bundles.push(ResolvedBundle {
            coordinates: descriptor.coordinates(),
            source,
            manifest,
        });
    }

    let properties = config.effective_properties();
    for bundle in &bundles {
        validate_required_properties(bundle, &properties)?;
    }

    // Supplements and the rendering context
    let supplement_descriptors = BundleDescriptor::parse_all(&config.supplemental_model_artifacts)?;
    let supplement_artifacts =
        resolve_bundles(&supplement_descriptors, &config.siblings, resolver)?;
    let locator = build_locator(project_root, &appended_dir, &supplement_artifacts)?;

    let locations = default_locations(&config.supplemental_models, &appended_dir);
    let supplements = load_supplements(&locations, &locator)?;

    let context = RenderContext::build(
        &properties,
        &config.project,
        locator.search_paths(),
        config.output_timestamp.as_deref(),
        Box::new(ConfiguredDependencies::new(
            config.dependencies.clone(),
            config.filter.clone(),
            builder,
            supplements,
        )),
    );

    // Phase 3: processing
    let mut resource_dirs: Vec<ResourceDir> = config
        .resource_dirs
        .iter()
        .map(|dir| ResourceDir {
            path: anchored(project_root, &dir.path),
            filtering: dir.filtering,
            excludes: dir.excludes.clone(),
        })
        .collect();

    let options = ProcessingOptions {
        output_dir: &output_dir,
        appended_dir: &appended_dir,
        project_root,
        use_project_root_files: config.use_project_root_files,
        fallback_encoding: &config.encoding,
        threshold: config.in_memory_comparison_threshold,
    };
    let stats = processing::execute(&bundles, &mut resource_dirs, &context, &options)?;

    // Phase 4: output bookkeeping
    let mut attached_to_main = false;
    let mut attached_to_test = false;
    if output_dir.exists() {
        attached_to_main = config.attach_to_main;
        attached_to_test = config.attach_to_test;
        write_marker(&build_dir, &output_dir)?;
    } else {
        debug!("Output directory {} was not created", output_dir.display());
    }

    Ok(RunReport {
        stats,
        resource_dirs,
        attached_to_main,
        attached_to_test,
        output_dir,
    })
}

fn anchored(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquisition::LocalRepositoryResolver;
    use crate::manifest::RESOURCES_MANIFEST;
    use crate::phases::write::OUTPUT_MARKER;
    use crate::projects::PomFileProjectBuilder;
    use std::fs;
    use tempfile::TempDir;

    fn install_bundle(repository: &Path, entries: &[(&str, &str)], manifest: &str) {
        let bundle_root = repository.join("org/acme/legal/1.0/legal-1.0.jar");
        // a directory artifact keeps the fixture simple; archives are
        // covered by the source tests
        fs::create_dir_all(bundle_root.join("META-INF")).unwrap();
        fs::write(bundle_root.join(RESOURCES_MANIFEST), manifest).unwrap();
        for (path, content) in entries {
            let full = bundle_root.join(path);
            fs::create_dir_all(full.parent().unwrap()).unwrap();
            fs::write(full, content).unwrap();
        }
    }

    fn base_config(repository: &Path) -> Config {
        crate::config::parse(&format!(
            r#"
project:
  groupId: org.acme
  artifactId: app
  version: "1.0"
  name: Demo
bundles:
  - org.acme:legal:1.0
output_timestamp: "2024-06-01T00:00:00Z"
local_repository: {}
"#,
            repository.display()
        ))
        .unwrap()
    }

    #[test]
    fn test_end_to_end_run_renders_and_marks() {
        let temp = TempDir::new().unwrap();
        let repository = temp.path().join("repository");
        install_bundle(
            &repository,
            &[("NOTICE.txt.tera", "{{ project.name }} ({{ presentYear }})")],
            r#"<remoteResourcesBundle>
                 <remoteResources>
                   <remoteResource>NOTICE.txt.tera</remoteResource>
                 </remoteResources>
               </remoteResourcesBundle>"#,
        );

        let config = base_config(&repository);
        let resolver = LocalRepositoryResolver::new(repository.clone());
        let builder = Box::new(PomFileProjectBuilder::new(repository));

        let report =
            execute_process(&config, temp.path(), &resolver, builder).unwrap();

        assert_eq!(report.stats.resources, 1);
        assert!(report.attached_to_main);
        assert!(report.attached_to_test);

        let notice = fs::read_to_string(report.output_dir.join("NOTICE.txt")).unwrap();
        assert_eq!(notice, "Demo (2024)");

        let marker = fs::read_to_string(temp.path().join("target").join(OUTPUT_MARKER)).unwrap();
        assert_eq!(marker, "remote-resources");
    }

    #[test]
    fn test_missing_required_property_fails_before_processing() {
        let temp = TempDir::new().unwrap();
        let repository = temp.path().join("repository");
        install_bundle(
            &repository,
            &[("NOTICE.txt", "plain")],
            r#"<remoteResourcesBundle>
                 <remoteResources>
                   <remoteResource>NOTICE.txt</remoteResource>
                 </remoteResources>
                 <requiredProjectProperties>
                   <requiredProjectProperty>projectName</requiredProjectProperty>
                 </requiredProjectProperties>
               </remoteResourcesBundle>"#,
        );

        let config = base_config(&repository);
        let resolver = LocalRepositoryResolver::new(repository.clone());
        let builder = Box::new(PomFileProjectBuilder::new(repository));

        let err = execute_process(&config, temp.path(), &resolver, builder).unwrap_err();
        assert!(err.to_string().contains("projectName"));
        // no resource work happened for the failing bundle
        assert!(!temp.path().join("target/remote-resources/NOTICE.txt").exists());
    }

    #[test]
    fn test_unresolvable_bundle_is_fatal() {
        let temp = TempDir::new().unwrap();
        let repository = temp.path().join("repository");
        fs::create_dir_all(&repository).unwrap();

        let config = base_config(&repository);
        let resolver = LocalRepositoryResolver::new(repository.clone());
        let builder = Box::new(PomFileProjectBuilder::new(repository));

        let err = execute_process(&config, temp.path(), &resolver, builder).unwrap_err();
        assert!(err.to_string().contains("org.acme:legal:1.0"));
    }

    #[test]
    fn test_supplemented_dependency_grouped_by_organization() {
        let temp = TempDir::new().unwrap();
        let repository = temp.path().join("repository");

        install_bundle(
            &repository,
            &[(
                "DEPENDENCIES.tera",
                "{% for g in projectsSortedByOrganization %}{{ g.organization.name }}: \
                 {% for p in g.projects %}{{ p.artifactId }}{% endfor %}{% endfor %}",
            )],
            r#"<remoteResourcesBundle>
                 <remoteResources>
                   <remoteResource>DEPENDENCIES.tera</remoteResource>
                 </remoteResources>
               </remoteResourcesBundle>"#,
        );

        // dependency model without an organization
        let dep_dir = repository.join("dep/dep/1.0");
        fs::create_dir_all(&dep_dir).unwrap();
        fs::write(
            dep_dir.join("dep-1.0.pom"),
            "<project><groupId>dep</groupId><artifactId>dep</artifactId><version>1.0</version></project>",
        )
        .unwrap();

        // supplement supplying the organization
        let appended = temp.path().join("src/main/appended-resources");
        fs::create_dir_all(&appended).unwrap();
        fs::write(
            appended.join("supplemental-models.xml"),
            r#"<supplementalDataModels>
                 <supplement>
                   <project>
                     <groupId>dep</groupId>
                     <artifactId>dep</artifactId>
                     <organization><name>Dep Org</name></organization>
                   </project>
                 </supplement>
               </supplementalDataModels>"#,
        )
        .unwrap();

        let mut config = base_config(&repository);
        config.dependencies = vec![crate::config::DependencyRef {
            coordinates: "dep:dep:1.0".to_string(),
            scope: "runtime".to_string(),
            direct: true,
        }];

        let resolver = LocalRepositoryResolver::new(repository.clone());
        let builder = Box::new(PomFileProjectBuilder::new(repository));

        let report = execute_process(&config, temp.path(), &resolver, builder).unwrap();

        let listing = fs::read_to_string(report.output_dir.join("DEPENDENCIES")).unwrap();
        assert_eq!(listing, "Dep Org: dep");
    }
}
