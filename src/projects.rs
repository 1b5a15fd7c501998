//! # Dependency Projects
//!
//! Computes the `projects` value of the rendering context: the consuming
//! project's dependency set is filtered, each surviving dependency's
//! metadata is built through the [`ProjectBuilder`] collaborator, merged
//! with any matching supplemental fragment, and the result is sorted by
//! coordinates. A dependency whose metadata cannot be built is skipped
//! with a warning; one unresolvable dependency must not block resource
//! generation.
//!
//! The organization grouping derives from the merged projects: groups are
//! ordered by organization name then URL, case-insensitively, with
//! projects lacking an organization collected under "an unknown
//! organization" at the end.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::PathBuf;

use glob::Pattern;
use log::{debug, warn};
use serde::Serialize;

use crate::config::{DependencyRef, FilterConfig};
use crate::context::DependencyProjectsSource;
use crate::descriptor::BundleDescriptor;
use crate::error::{Error, Result};
use crate::merge::assemble_model_inheritance;
use crate::model::{Organization, ProjectModel};
use crate::xml::{read_project_model, Doc};

/// Builds the metadata model of a resolved dependency artifact.
pub trait ProjectBuilder: Send + Sync {
    fn build(&self, dependency: &BundleDescriptor) -> Result<ProjectModel>;
}

/// Default builder reading project model documents from the local
/// repository layout (`group/as/dirs/artifact/version/artifact-version.pom`).
#[derive(Debug)]
pub struct PomFileProjectBuilder {
    root: PathBuf,
}

impl PomFileProjectBuilder {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }
}

impl ProjectBuilder for PomFileProjectBuilder {
    fn build(&self, dependency: &BundleDescriptor) -> Result<ProjectModel> {
        let path = self
            .root
            .join(dependency.group_id.split('.').collect::<PathBuf>())
            .join(&dependency.artifact_id)
            .join(&dependency.version)
            .join(format!(
                "{}-{}.pom",
                dependency.artifact_id, dependency.version
            ));

        let text = std::fs::read_to_string(&path).map_err(|e| Error::Acquisition {
            coordinates: dependency.coordinates(),
            message: format!("{}: {}", path.display(), e),
        })?;
        let doc = Doc::parse(&text).map_err(|message| Error::Acquisition {
            coordinates: dependency.coordinates(),
            message,
        })?;

        let mut model = read_project_model(&doc, doc.root());
        if model.group_id.is_none() {
            model.group_id = Some(dependency.group_id.clone());
        }
        if model.artifact_id.is_none() {
            model.artifact_id = Some(dependency.artifact_id.clone());
        }
        Ok(model)
    }
}

/// Apply the configured scope/coordinate filters to the dependency set,
/// preserving declaration order.
pub fn filter_dependencies<'a>(
    dependencies: &'a [DependencyRef],
    filter: &FilterConfig,
) -> Result<Vec<(&'a DependencyRef, BundleDescriptor)>> {
    let include_groups = compile_patterns(&filter.include_group_ids)?;
    let exclude_groups = compile_patterns(&filter.exclude_group_ids)?;
    let include_artifacts = compile_patterns(&filter.include_artifact_ids)?;
    let exclude_artifacts = compile_patterns(&filter.exclude_artifact_ids)?;

    let mut selected = Vec::new();

    for (position, dependency) in dependencies.iter().enumerate() {
        let descriptor = BundleDescriptor::parse(&dependency.coordinates, position + 1)?;

        if filter.exclude_transitive && !dependency.direct {
            continue;
        }
        if !filter.include_scope.is_empty() && dependency.scope != filter.include_scope {
            continue;
        }
        if !filter.exclude_scope.is_empty() && dependency.scope == filter.exclude_scope {
            continue;
        }
        if !matches_filters(&descriptor.group_id, &include_groups, &exclude_groups) {
            continue;
        }
        if !matches_filters(&descriptor.artifact_id, &include_artifacts, &exclude_artifacts) {
            continue;
        }

        selected.push((dependency, descriptor));
    }

    Ok(selected)
}

fn compile_patterns(patterns: &[String]) -> Result<Vec<Pattern>> {
    patterns.iter().map(|p| Ok(Pattern::new(p)?)).collect()
}

fn matches_filters(value: &str, includes: &[Pattern], excludes: &[Pattern]) -> bool {
    if !includes.is_empty() && !includes.iter().any(|p| p.matches(value)) {
        return false;
    }
    !excludes.iter().any(|p| p.matches(value))
}

/// Build the complete, supplement-merged dependency projects for a run.
pub fn build_projects(
    dependencies: &[DependencyRef],
    filter: &FilterConfig,
    builder: &dyn ProjectBuilder,
    supplements: &HashMap<String, ProjectModel>,
) -> Vec<ProjectModel> {
    let selected = match filter_dependencies(dependencies, filter) {
        Ok(selected) => selected,
        Err(e) => {
            warn!("Dependency filter could not be applied: {}", e);
            return Vec::new();
        }
    };

    let mut projects = Vec::new();

    for (_, descriptor) in selected {
        debug!("Building project for {}", descriptor.coordinates());

        let model = match builder.build(&descriptor) {
            Ok(model) => model,
            Err(e) => {
                warn!(
                    "Invalid project model for artifact [{}]. It will be ignored: {}",
                    descriptor.coordinates(),
                    e
                );
                continue;
            }
        };

        let key = format!("{}:{}", descriptor.group_id, descriptor.artifact_id);
        let mut merged = match supplements.get(&key) {
            Some(supplement) => {
                debug!("Adding project with groupId [{}] (supplemented)", descriptor.group_id);
                let mut supplemented = supplement.clone();
                assemble_model_inheritance(&mut supplemented, &model);
                supplemented
            }
            None => {
                debug!("Adding project with groupId [{}]", descriptor.group_id);
                model
            }
        };
        merged.version = Some(descriptor.version.clone());

        projects.push(merged);
    }

    projects.sort_by(|a, b| a.coordinates().cmp(&b.coordinates()));
    projects
}

/// One bucket of the organization grouping exposed to templates.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationGroup {
    pub organization: Organization,
    pub projects: Vec<ProjectModel>,
}

/// Name to show for projects without an organization.
pub const UNKNOWN_ORGANIZATION: &str = "an unknown organization";

/// Group projects by organization, ordered by name then URL
/// (case-insensitive, absent values last), with the unknown-organization
/// bucket at the end.
pub fn group_by_organization(projects: &[ProjectModel]) -> Vec<OrganizationGroup> {
    let mut groups: Vec<OrganizationGroup> = Vec::new();
    let mut unknown: Vec<ProjectModel> = Vec::new();

    for project in projects {
        let organization = project
            .organization
            .clone()
            .filter(|org| org.name.as_deref().map_or(false, |n| !n.is_empty()));

        match organization {
            Some(organization) => {
                match groups.iter_mut().find(|g| g.organization == organization) {
                    Some(group) => group.projects.push(project.clone()),
                    None => groups.push(OrganizationGroup {
                        organization,
                        projects: vec![project.clone()],
                    }),
                }
            }
            None => unknown.push(project.clone()),
        }
    }

    groups.sort_by(|a, b| compare_organizations(&a.organization, &b.organization));

    if !unknown.is_empty() {
        groups.push(OrganizationGroup {
            organization: Organization {
                name: Some(UNKNOWN_ORGANIZATION.to_string()),
                url: None,
            },
            projects: unknown,
        });
    }

    groups
}

fn compare_organizations(a: &Organization, b: &Organization) -> Ordering {
    compare_optional_ci(&a.name, &b.name).then_with(|| compare_optional_ci(&a.url, &b.url))
}

/// Case-insensitive comparison where absent values sort last.
fn compare_optional_ci(a: &Option<String>, b: &Option<String>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => a.to_lowercase().cmp(&b.to_lowercase()),
    }
}

/// [`DependencyProjectsSource`] over the configured dependency set.
pub struct ConfiguredDependencies {
    dependencies: Vec<DependencyRef>,
    filter: FilterConfig,
    builder: Box<dyn ProjectBuilder>,
    supplements: HashMap<String, ProjectModel>,
}

impl ConfiguredDependencies {
    pub fn new(
        dependencies: Vec<DependencyRef>,
        filter: FilterConfig,
        builder: Box<dyn ProjectBuilder>,
        supplements: HashMap<String, ProjectModel>,
    ) -> Self {
        Self {
            dependencies,
            filter,
            builder,
            supplements,
        }
    }
}

impl DependencyProjectsSource for ConfiguredDependencies {
    fn dependency_projects(&self) -> Vec<ProjectModel> {
        build_projects(
            &self.dependencies,
            &self.filter,
            self.builder.as_ref(),
            &self.supplements,
        )
    }
}
