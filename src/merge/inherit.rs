//! Field-by-field model inheritance merge
//!
//! Mutates a child model in place, filling every field the child has not
//! set from a parent model. Structured sub-objects (SCM, build,
//! distribution management, reporting) merge per sub-field rather than as
//! all-or-nothing blocks.

use std::collections::BTreeMap;

use crate::model::{
    Build, Dependency, DependencyManagement, DistributionManagement, ProjectModel, ReportPlugin,
    Reporting, Repository, Scm, Site,
};
use crate::path::append_path;

/// Merge `parent` into `child`: fields already set on the child win, unset
/// fields inherit. URL-shaped fields inherit with the child's artifact id
/// appended and the result path-normalized.
pub fn assemble_model_inheritance(child: &mut ProjectModel, parent: &ProjectModel) {
    assemble(child, parent, None, true);
}

/// Like [`assemble_model_inheritance`], inserting `adjustment` between the
/// parent path and the child artifact id on appended URL fields.
pub fn assemble_model_inheritance_with_adjustment(
    child: &mut ProjectModel,
    parent: &ProjectModel,
    adjustment: Option<&str>,
) {
    assemble(child, parent, adjustment, true);
}

fn assemble(
    child: &mut ProjectModel,
    parent: &ProjectModel,
    adjustment: Option<&str>,
    append_paths: bool,
) {
    inherit(&mut child.group_id, &parent.group_id);

    // The parent model's version may have resolved to something different,
    // so an unset version falls back to what the child asked its parent for.
    if child.version.is_none() {
        if let Some(parent_ref) = &child.parent {
            child.version = parent_ref.version.clone();
        }
    }

    inherit(&mut child.inception_year, &parent.inception_year);

    let child_artifact = child.artifact_id.clone();
    if child.url.is_none() {
        child.url = parent
            .url
            .as_deref()
            .map(|url| append_path(url, child_artifact.as_deref(), adjustment, append_paths));
    }

    assemble_distribution(child, parent, adjustment, append_paths);

    inherit(&mut child.issue_management, &parent.issue_management);
    inherit(&mut child.description, &parent.description);
    inherit(&mut child.organization, &parent.organization);

    assemble_scm(child, parent, adjustment, append_paths);

    inherit(&mut child.ci_management, &parent.ci_management);

    replace_if_empty(&mut child.developers, &parent.developers);
    replace_if_empty(&mut child.licenses, &parent.licenses);
    replace_if_empty(&mut child.contributors, &parent.contributors);
    replace_if_empty(&mut child.mailing_lists, &parent.mailing_lists);

    assemble_build(child, parent);
    assemble_dependencies(child, parent);

    child.repositories = merge_repository_lists(&child.repositories, &parent.repositories);

    assemble_reporting(child, parent);
    assemble_dependency_management(child, parent);

    // Properties merge last: parent first, child applied on top.
    let mut properties: BTreeMap<String, String> = parent.properties.clone();
    properties.extend(child.properties.clone());
    child.properties = properties;
}

/// Fill an unset optional field from the parent.
fn inherit<T: Clone>(child: &mut Option<T>, parent: &Option<T>) {
    if child.is_none() {
        *child = parent.clone();
    }
}

/// A non-empty child list is kept, otherwise the parent's list is taken.
fn replace_if_empty<T: Clone>(child: &mut Vec<T>, parent: &[T]) {
    if child.is_empty() {
        *child = parent.to_vec();
    }
}

fn is_unset(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, str::is_empty)
}

fn assemble_scm(
    child: &mut ProjectModel,
    parent: &ProjectModel,
    adjustment: Option<&str>,
    append_paths: bool,
) {
    let Some(parent_scm) = &parent.scm else {
        return;
    };

    let child_artifact = child.artifact_id.clone();
    let child_scm = child.scm.get_or_insert_with(Scm::default);

    if is_unset(&child_scm.connection) && !is_unset(&parent_scm.connection) {
        child_scm.connection = parent_scm.connection.as_deref().map(|connection| {
            append_path(connection, child_artifact.as_deref(), adjustment, append_paths)
        });
    }
    if is_unset(&child_scm.developer_connection) && !is_unset(&parent_scm.developer_connection) {
        child_scm.developer_connection = parent_scm.developer_connection.as_deref().map(
            |connection| append_path(connection, child_artifact.as_deref(), adjustment, append_paths),
        );
    }
    if is_unset(&child_scm.url) && !is_unset(&parent_scm.url) {
        child_scm.url = parent_scm
            .url
            .as_deref()
            .map(|url| append_path(url, child_artifact.as_deref(), adjustment, append_paths));
    }
}

fn assemble_distribution(
    child: &mut ProjectModel,
    parent: &ProjectModel,
    adjustment: Option<&str>,
    append_paths: bool,
) {
    let Some(parent_dist) = &parent.distribution_management else {
        return;
    };

    let child_artifact = child.artifact_id.clone();
    let child_dist = child
        .distribution_management
        .get_or_insert_with(DistributionManagement::default);

    if child_dist.site.is_none() {
        if let Some(parent_site) = &parent_dist.site {
            child_dist.site = Some(Site {
                id: parent_site.id.clone(),
                name: parent_site.name.clone(),
                url: parent_site.url.as_deref().map(|url| {
                    append_path(url, child_artifact.as_deref(), adjustment, append_paths)
                }),
            });
        }
    }

    if child_dist.repository.is_none() {
        child_dist.repository = parent_dist.repository.clone();
    }
    if child_dist.snapshot_repository.is_none() {
        child_dist.snapshot_repository = parent_dist.snapshot_repository.clone();
    }
    if is_unset(&child_dist.download_url) {
        child_dist.download_url = parent_dist.download_url.clone();
    }

    // Status and relocation are assessments of a single model and are
    // deliberately not inherited.
}

fn assemble_build(child: &mut ProjectModel, parent: &ProjectModel) {
    let Some(parent_build) = &parent.build else {
        return;
    };

    let child_build = child.build.get_or_insert_with(Build::default);

    inherit(&mut child_build.source_directory, &parent_build.source_directory);
    inherit(
        &mut child_build.script_source_directory,
        &parent_build.script_source_directory,
    );
    inherit(
        &mut child_build.test_source_directory,
        &parent_build.test_source_directory,
    );
    inherit(&mut child_build.output_directory, &parent_build.output_directory);
    inherit(
        &mut child_build.test_output_directory,
        &parent_build.test_output_directory,
    );
    inherit(&mut child_build.directory, &parent_build.directory);
    inherit(&mut child_build.default_goal, &parent_build.default_goal);
    inherit(&mut child_build.final_name, &parent_build.final_name);

    replace_if_empty(&mut child_build.filters, &parent_build.filters);
    replace_if_empty(&mut child_build.resources, &parent_build.resources);
    replace_if_empty(&mut child_build.test_resources, &parent_build.test_resources);

    // Extensions are accumulated
    for extension in &parent_build.extensions {
        if !child_build.extensions.contains(extension) {
            child_build.extensions.push(extension.clone());
        }
    }
}

/// Dependencies union by management key: parent entries first, child
/// entries following and replacing any parent entry with the same key.
fn assemble_dependencies(child: &mut ProjectModel, parent: &ProjectModel) {
    let mut order: Vec<String> = Vec::new();
    let mut by_key: BTreeMap<String, Dependency> = BTreeMap::new();

    for dependency in parent.dependencies.iter().chain(child.dependencies.iter()) {
        let key = dependency.management_key();
        if !by_key.contains_key(&key) {
            order.push(key.clone());
        }
        by_key.insert(key, dependency.clone());
    }

    child.dependencies = order
        .into_iter()
        .filter_map(|key| by_key.remove(&key))
        .collect();
}

/// Dependency management unions by key with a key-lexical result order, so
/// repeated merges are reproducible.
fn assemble_dependency_management(child: &mut ProjectModel, parent: &ProjectModel) {
    let Some(parent_mgmt) = &parent.dependency_management else {
        return;
    };

    match &mut child.dependency_management {
        None => child.dependency_management = Some(parent_mgmt.clone()),
        Some(child_mgmt) => {
            let mut merged: BTreeMap<String, Dependency> = BTreeMap::new();
            for dependency in &child_mgmt.dependencies {
                merged.insert(dependency.management_key(), dependency.clone());
            }
            for dependency in &parent_mgmt.dependencies {
                merged
                    .entry(dependency.management_key())
                    .or_insert_with(|| dependency.clone());
            }
            child.dependency_management = Some(DependencyManagement {
                dependencies: merged.into_values().collect(),
            });
        }
    }
}

/// Repositories union by id, child entries first.
fn merge_repository_lists(child: &[Repository], parent: &[Repository]) -> Vec<Repository> {
    let mut merged: Vec<Repository> = child.to_vec();
    for repository in parent {
        let present = merged.iter().any(|r| r.id == repository.id);
        if !present {
            merged.push(repository.clone());
        }
    }
    merged
}

fn assemble_reporting(child: &mut ProjectModel, parent: &ProjectModel) {
    let Some(parent_reporting) = &parent.reporting else {
        return;
    };

    let child_reporting = child.reporting.get_or_insert_with(Reporting::default);

    child_reporting.exclude_defaults = parent_reporting.exclude_defaults;
    if is_unset(&child_reporting.output_directory) {
        child_reporting.output_directory = parent_reporting.output_directory.clone();
    }

    merge_report_plugin_lists(child_reporting, parent_reporting);
}

/// Report plugins union by plugin key in sorted-map order; a child plugin
/// with the same key wins, additionally filling an unset version and
/// unioning report sets by id from the parent entry.
fn merge_report_plugin_lists(child: &mut Reporting, parent: &Reporting) {
    if parent.plugins.is_empty() {
        return;
    }

    let mut assembled: BTreeMap<String, ReportPlugin> = BTreeMap::new();
    let child_plugins: BTreeMap<String, ReportPlugin> = child
        .plugins
        .iter()
        .map(|p| (p.key(), p.clone()))
        .collect();

    for parent_plugin in &parent.plugins {
        let merged = match child_plugins.get(&parent_plugin.key()) {
            Some(child_plugin) => {
                let mut merged = child_plugin.clone();
                merge_report_plugin_definitions(&mut merged, parent_plugin);
                merged
            }
            None => parent_plugin.clone(),
        };
        assembled.insert(merged.key(), merged);
    }

    for (key, child_plugin) in child_plugins {
        assembled.entry(key).or_insert(child_plugin);
    }

    child.plugins = assembled.into_values().collect();
}

fn merge_report_plugin_definitions(child: &mut ReportPlugin, parent: &ReportPlugin) {
    if child.version.is_none() {
        child.version = parent.version.clone();
    }

    if parent.report_sets.is_empty() {
        return;
    }

    let mut assembled: BTreeMap<String, crate::model::ReportSet> = BTreeMap::new();
    for set in &child.report_sets {
        assembled.insert(set.effective_id().to_string(), set.clone());
    }
    for parent_set in &parent.report_sets {
        match assembled.get_mut(parent_set.effective_id()) {
            Some(child_set) => {
                for report in &parent_set.reports {
                    if !child_set.reports.contains(report) {
                        child_set.reports.push(report.clone());
                    }
                }
            }
            None => {
                assembled.insert(parent_set.effective_id().to_string(), parent_set.clone());
            }
        }
    }

    child.report_sets = assembled.into_values().collect();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        Extension, License, Organization, ParentRef, ReportSet, DeploymentRepository,
    };

    fn dep(group: &str, artifact: &str, version: &str) -> Dependency {
        Dependency {
            group_id: Some(group.to_string()),
            artifact_id: Some(artifact.to_string()),
            version: Some(version.to_string()),
            ..Dependency::default()
        }
    }

    #[test]
    fn test_set_child_scalars_are_preserved() {
        let mut child = ProjectModel {
            group_id: Some("child.group".to_string()),
            description: Some("child description".to_string()),
            inception_year: Some("2021".to_string()),
            ..ProjectModel::default()
        };
        let parent = ProjectModel {
            group_id: Some("parent.group".to_string()),
            description: Some("parent description".to_string()),
            inception_year: Some("1999".to_string()),
            ..ProjectModel::default()
        };

        assemble_model_inheritance(&mut child, &parent);

        assert_eq!(child.group_id.as_deref(), Some("child.group"));
        assert_eq!(child.description.as_deref(), Some("child description"));
        assert_eq!(child.inception_year.as_deref(), Some("2021"));
    }

    #[test]
    fn test_unset_scalars_inherit() {
        let mut child = ProjectModel::default();
        let parent = ProjectModel {
            group_id: Some("parent.group".to_string()),
            description: Some("d".to_string()),
            organization: Some(Organization {
                name: Some("Acme".to_string()),
                url: None,
            }),
            ..ProjectModel::default()
        };

        assemble_model_inheritance(&mut child, &parent);

        assert_eq!(child.group_id.as_deref(), Some("parent.group"));
        assert_eq!(child.description.as_deref(), Some("d"));
        assert_eq!(child.organization.unwrap().name.as_deref(), Some("Acme"));
    }

    #[test]
    fn test_merge_is_idempotent_on_complete_child() {
        let mut child = ProjectModel {
            group_id: Some("g".to_string()),
            artifact_id: Some("a".to_string()),
            version: Some("1".to_string()),
            url: Some("http://child".to_string()),
            description: Some("d".to_string()),
            licenses: vec![License {
                name: Some("MIT".to_string()),
                ..License::default()
            }],
            ..ProjectModel::default()
        };
        let parent = ProjectModel {
            url: Some("http://parent".to_string()),
            licenses: vec![License {
                name: Some("Apache-2.0".to_string()),
                ..License::default()
            }],
            ..ProjectModel::default()
        };

        let before = child.clone();
        assemble_model_inheritance(&mut child, &parent);

        assert_eq!(child.url, before.url);
        assert_eq!(child.licenses, before.licenses);
    }

    #[test]
    fn test_version_falls_back_to_declared_parent_version() {
        let mut child = ProjectModel {
            parent: Some(ParentRef {
                group_id: Some("g".to_string()),
                artifact_id: Some("parent".to_string()),
                version: Some("7.3".to_string()),
            }),
            ..ProjectModel::default()
        };
        let parent = ProjectModel {
            version: Some("9.9".to_string()),
            ..ProjectModel::default()
        };

        assemble_model_inheritance(&mut child, &parent);

        assert_eq!(child.version.as_deref(), Some("7.3"));
    }

    #[test]
    fn test_url_inherits_with_path_adjustment() {
        let mut child = ProjectModel {
            artifact_id: Some("module".to_string()),
            ..ProjectModel::default()
        };
        let parent = ProjectModel {
            url: Some("http://host/site".to_string()),
            ..ProjectModel::default()
        };

        assemble_model_inheritance_with_adjustment(&mut child, &parent, Some("modules"));

        assert_eq!(child.url.as_deref(), Some("http://host/site/modules/module"));
    }

    #[test]
    fn test_url_inherits_with_artifact_id_appended() {
        let mut child = ProjectModel {
            artifact_id: Some("module".to_string()),
            ..ProjectModel::default()
        };
        let parent = ProjectModel {
            url: Some("http://host/site/".to_string()),
            ..ProjectModel::default()
        };

        assemble_model_inheritance(&mut child, &parent);

        assert_eq!(child.url.as_deref(), Some("http://host/site/module"));
    }

    #[test]
    fn test_scm_merges_per_field() {
        let mut child = ProjectModel {
            artifact_id: Some("module".to_string()),
            scm: Some(Scm {
                url: Some("http://child/scm".to_string()),
                ..Scm::default()
            }),
            ..ProjectModel::default()
        };
        let parent = ProjectModel {
            scm: Some(Scm {
                connection: Some("scm:git:http://host/repo".to_string()),
                url: Some("http://parent/scm".to_string()),
                ..Scm::default()
            }),
            ..ProjectModel::default()
        };

        assemble_model_inheritance(&mut child, &parent);

        let scm = child.scm.unwrap();
        // child keeps its own url, inherits the connection with its id appended
        assert_eq!(scm.url.as_deref(), Some("http://child/scm"));
        assert_eq!(
            scm.connection.as_deref(),
            Some("scm:git:http://host/repo/module")
        );
    }

    #[test]
    fn test_replace_if_empty_lists() {
        let mut child = ProjectModel::default();
        let parent = ProjectModel {
            licenses: vec![License {
                name: Some("Apache-2.0".to_string()),
                ..License::default()
            }],
            ..ProjectModel::default()
        };

        assemble_model_inheritance(&mut child, &parent);
        assert_eq!(child.licenses.len(), 1);

        // a non-empty child list is not touched
        let mut child2 = ProjectModel {
            licenses: vec![License {
                name: Some("MIT".to_string()),
                ..License::default()
            }],
            ..ProjectModel::default()
        };
        assemble_model_inheritance(&mut child2, &parent);
        assert_eq!(child2.licenses.len(), 1);
        assert_eq!(child2.licenses[0].name.as_deref(), Some("MIT"));
    }

    #[test]
    fn test_extensions_union_by_identity() {
        let shared = Extension {
            group_id: Some("g".to_string()),
            artifact_id: Some("ext".to_string()),
            version: Some("1".to_string()),
        };
        let parent_only = Extension {
            group_id: Some("g".to_string()),
            artifact_id: Some("other".to_string()),
            version: Some("2".to_string()),
        };

        let mut child = ProjectModel {
            build: Some(Build {
                extensions: vec![shared.clone()],
                ..Build::default()
            }),
            ..ProjectModel::default()
        };
        let parent = ProjectModel {
            build: Some(Build {
                extensions: vec![shared.clone(), parent_only.clone()],
                ..Build::default()
            }),
            ..ProjectModel::default()
        };

        assemble_model_inheritance(&mut child, &parent);

        let extensions = child.build.unwrap().extensions;
        assert_eq!(extensions, vec![shared, parent_only]);
    }

    #[test]
    fn test_dependencies_union_by_key_child_wins() {
        let mut child = ProjectModel {
            dependencies: vec![dep("g", "shared", "2.0"), dep("g", "child-only", "1.0")],
            ..ProjectModel::default()
        };
        let parent = ProjectModel {
            dependencies: vec![dep("g", "shared", "1.0"), dep("g", "parent-only", "1.0")],
            ..ProjectModel::default()
        };

        assemble_model_inheritance(&mut child, &parent);

        let keys: Vec<String> = child.dependencies.iter().map(|d| d.management_key()).collect();
        // no duplicate keys, parent-then-child order
        assert_eq!(
            keys,
            vec!["g:shared:jar", "g:parent-only:jar", "g:child-only:jar"]
        );
        let shared = child
            .dependencies
            .iter()
            .find(|d| d.artifact_id.as_deref() == Some("shared"))
            .unwrap();
        assert_eq!(shared.version.as_deref(), Some("2.0"));
    }

    #[test]
    fn test_dependency_management_sorted_union() {
        let mut child = ProjectModel {
            dependency_management: Some(DependencyManagement {
                dependencies: vec![dep("g", "zeta", "2.0")],
            }),
            ..ProjectModel::default()
        };
        let parent = ProjectModel {
            dependency_management: Some(DependencyManagement {
                dependencies: vec![dep("g", "alpha", "1.0"), dep("g", "zeta", "1.0")],
            }),
            ..ProjectModel::default()
        };

        assemble_model_inheritance(&mut child, &parent);

        let managed = child.dependency_management.unwrap().dependencies;
        let keys: Vec<String> = managed.iter().map(|d| d.management_key()).collect();
        assert_eq!(keys, vec!["g:alpha:jar", "g:zeta:jar"]);
        assert_eq!(managed[1].version.as_deref(), Some("2.0"));
    }

    #[test]
    fn test_report_plugins_union_by_key() {
        let mut child = ProjectModel {
            reporting: Some(Reporting {
                plugins: vec![ReportPlugin {
                    group_id: Some("g".to_string()),
                    artifact_id: Some("reports".to_string()),
                    version: None,
                    report_sets: vec![ReportSet {
                        id: None,
                        reports: vec!["summary".to_string()],
                    }],
                }],
                ..Reporting::default()
            }),
            ..ProjectModel::default()
        };
        let parent = ProjectModel {
            reporting: Some(Reporting {
                plugins: vec![
                    ReportPlugin {
                        group_id: Some("g".to_string()),
                        artifact_id: Some("reports".to_string()),
                        version: Some("3.1".to_string()),
                        report_sets: vec![ReportSet {
                            id: None,
                            reports: vec!["index".to_string()],
                        }],
                    },
                    ReportPlugin {
                        group_id: Some("g".to_string()),
                        artifact_id: Some("audit".to_string()),
                        version: Some("1.0".to_string()),
                        report_sets: Vec::new(),
                    },
                ],
                ..Reporting::default()
            }),
            ..ProjectModel::default()
        };

        assemble_model_inheritance(&mut child, &parent);

        let plugins = child.reporting.unwrap().plugins;
        assert_eq!(plugins.len(), 2);
        // key-lexical order: g:audit before g:reports
        assert_eq!(plugins[0].artifact_id.as_deref(), Some("audit"));
        let merged = &plugins[1];
        assert_eq!(merged.version.as_deref(), Some("3.1"));
        assert_eq!(
            merged.report_sets[0].reports,
            vec!["summary".to_string(), "index".to_string()]
        );
    }

    #[test]
    fn test_distribution_site_url_appends() {
        let mut child = ProjectModel {
            artifact_id: Some("module".to_string()),
            ..ProjectModel::default()
        };
        let parent = ProjectModel {
            distribution_management: Some(DistributionManagement {
                site: Some(Site {
                    id: Some("site".to_string()),
                    name: Some("Site".to_string()),
                    url: Some("dav:https://host/site".to_string()),
                }),
                repository: Some(DeploymentRepository {
                    id: Some("releases".to_string()),
                    ..DeploymentRepository::default()
                }),
                snapshot_repository: None,
                download_url: Some("https://host/downloads".to_string()),
            }),
            ..ProjectModel::default()
        };

        assemble_model_inheritance(&mut child, &parent);

        let dist = child.distribution_management.unwrap();
        assert_eq!(
            dist.site.unwrap().url.as_deref(),
            Some("dav:https://host/site/module")
        );
        assert_eq!(dist.repository.unwrap().id.as_deref(), Some("releases"));
        assert_eq!(dist.download_url.as_deref(), Some("https://host/downloads"));
    }

    #[test]
    fn test_properties_child_overrides_on_collision() {
        let mut child = ProjectModel::default();
        child.properties.insert("shared".to_string(), "child".to_string());
        child.properties.insert("child-only".to_string(), "1".to_string());

        let mut parent = ProjectModel::default();
        parent.properties.insert("shared".to_string(), "parent".to_string());
        parent.properties.insert("parent-only".to_string(), "2".to_string());

        assemble_model_inheritance(&mut child, &parent);

        assert_eq!(child.properties.get("shared").map(String::as_str), Some("child"));
        assert_eq!(child.properties.get("parent-only").map(String::as_str), Some("2"));
        assert_eq!(child.properties.get("child-only").map(String::as_str), Some("1"));
    }

    #[test]
    fn test_repositories_union_by_id_child_first() {
        let mut child = ProjectModel {
            repositories: vec![Repository {
                id: Some("central".to_string()),
                url: Some("https://child/central".to_string()),
                ..Repository::default()
            }],
            ..ProjectModel::default()
        };
        let parent = ProjectModel {
            repositories: vec![
                Repository {
                    id: Some("central".to_string()),
                    url: Some("https://parent/central".to_string()),
                    ..Repository::default()
                },
                Repository {
                    id: Some("snapshots".to_string()),
                    ..Repository::default()
                },
            ],
            ..ProjectModel::default()
        };

        assemble_model_inheritance(&mut child, &parent);

        assert_eq!(child.repositories.len(), 2);
        assert_eq!(
            child.repositories[0].url.as_deref(),
            Some("https://child/central")
        );
        assert_eq!(child.repositories[1].id.as_deref(), Some("snapshots"));
    }

    #[test]
    fn test_merge_with_default_parent_is_noop_for_lists() {
        let mut child = ProjectModel {
            dependencies: vec![dep("g", "a", "1")],
            ..ProjectModel::default()
        };
        let before = child.clone();
        assemble_model_inheritance(&mut child, &ProjectModel::default());
        assert_eq!(child.dependencies, before.dependencies);
    }
}
