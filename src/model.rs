//! # Project Metadata Model
//!
//! This module defines the declarable metadata of a project: coordinates,
//! organization, SCM and issue-tracker locations, URLs, build layout,
//! distribution targets, dependencies and reporting configuration. One
//! instance is built per resolved dependency artifact per run, and partial
//! instances are loaded from supplemental model documents to fill gaps in
//! incomplete metadata before a dependency can appear in generated
//! resources.
//!
//! All structs serialize with camelCase field names so rendered templates
//! address them the way the corresponding document elements are spelled
//! (`project.groupId`, `project.organization.name`, ...).
//!
//! The merge rules that combine a child model with a parent live in
//! [`crate::merge`]; this module only carries the data and the derived
//! identity keys used by keyed list merges.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A project's declarable metadata, shaped like the project object model
/// documents it is read from. All fields are optional; the inheritance
/// merge fills unset fields from a parent model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectModel {
    pub group_id: Option<String>,
    pub artifact_id: Option<String>,
    pub version: Option<String>,
    pub parent: Option<ParentRef>,
    pub packaging: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub inception_year: Option<String>,
    pub organization: Option<Organization>,
    pub licenses: Vec<License>,
    pub developers: Vec<Contributor>,
    pub contributors: Vec<Contributor>,
    pub mailing_lists: Vec<MailingList>,
    pub scm: Option<Scm>,
    pub issue_management: Option<IssueManagement>,
    pub ci_management: Option<CiManagement>,
    pub build: Option<Build>,
    pub distribution_management: Option<DistributionManagement>,
    pub repositories: Vec<Repository>,
    pub dependencies: Vec<Dependency>,
    pub dependency_management: Option<DependencyManagement>,
    pub reporting: Option<Reporting>,
    pub properties: BTreeMap<String, String>,
}

impl ProjectModel {
    /// Lookup key used to match supplements to models.
    pub fn supplement_key(&self) -> Option<String> {
        match (&self.group_id, &self.artifact_id) {
            (Some(g), Some(a)) => Some(format!("{}:{}", g.trim(), a.trim())),
            _ => None,
        }
    }

    /// `groupId:artifactId:version` with unset parts rendered empty, used
    /// for sorting and diagnostics.
    pub fn coordinates(&self) -> String {
        format!(
            "{}:{}:{}",
            self.group_id.as_deref().unwrap_or(""),
            self.artifact_id.as_deref().unwrap_or(""),
            self.version.as_deref().unwrap_or("")
        )
    }
}

/// Reference to a parent project, carried so an unset version can fall back
/// to the version the child asked its parent for.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParentRef {
    pub group_id: Option<String>,
    pub artifact_id: Option<String>,
    pub version: Option<String>,
}

/// The organization behind a project. Used as the grouping identity for
/// organization-sorted dependency listings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Organization {
    pub name: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct License {
    pub name: Option<String>,
    pub url: Option<String>,
    pub distribution: Option<String>,
    pub comments: Option<String>,
}

/// A developer or contributor entry. Developers additionally carry an id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Contributor {
    pub id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub organization: Option<String>,
    pub url: Option<String>,
    pub roles: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MailingList {
    pub name: Option<String>,
    pub subscribe: Option<String>,
    pub unsubscribe: Option<String>,
    pub post: Option<String>,
    pub archive: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Scm {
    pub connection: Option<String>,
    pub developer_connection: Option<String>,
    pub url: Option<String>,
    pub tag: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IssueManagement {
    pub system: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CiManagement {
    pub system: Option<String>,
    pub url: Option<String>,
}

/// Build configuration: source layout, output directories and helper lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Build {
    pub source_directory: Option<String>,
    pub script_source_directory: Option<String>,
    pub test_source_directory: Option<String>,
    pub output_directory: Option<String>,
    pub test_output_directory: Option<String>,
    pub directory: Option<String>,
    pub default_goal: Option<String>,
    pub final_name: Option<String>,
    pub filters: Vec<String>,
    pub resources: Vec<BuildResource>,
    pub test_resources: Vec<BuildResource>,
    pub extensions: Vec<Extension>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BuildResource {
    pub directory: Option<String>,
    pub target_path: Option<String>,
    pub filtering: Option<bool>,
    pub includes: Vec<String>,
    pub excludes: Vec<String>,
}

/// A build extension. Merged by whole-value identity, so equality covers
/// every field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Extension {
    pub group_id: Option<String>,
    pub artifact_id: Option<String>,
    pub version: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DistributionManagement {
    pub site: Option<Site>,
    pub repository: Option<DeploymentRepository>,
    pub snapshot_repository: Option<DeploymentRepository>,
    pub download_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Site {
    pub id: Option<String>,
    pub name: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeploymentRepository {
    pub id: Option<String>,
    pub name: Option<String>,
    pub url: Option<String>,
    pub layout: Option<String>,
    pub unique_version: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Repository {
    pub id: Option<String>,
    pub name: Option<String>,
    pub url: Option<String>,
    pub layout: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Dependency {
    pub group_id: Option<String>,
    pub artifact_id: Option<String>,
    pub version: Option<String>,
    #[serde(rename = "type")]
    pub artifact_type: Option<String>,
    pub classifier: Option<String>,
    pub scope: Option<String>,
    pub optional: Option<bool>,
}

impl Dependency {
    /// Identity key for keyed dependency merges:
    /// `groupId:artifactId:type[:classifier]`, with the type defaulting to
    /// `jar`.
    pub fn management_key(&self) -> String {
        let mut key = format!(
            "{}:{}:{}",
            self.group_id.as_deref().unwrap_or(""),
            self.artifact_id.as_deref().unwrap_or(""),
            self.artifact_type.as_deref().unwrap_or("jar")
        );
        if let Some(classifier) = &self.classifier {
            key.push(':');
            key.push_str(classifier);
        }
        key
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DependencyManagement {
    pub dependencies: Vec<Dependency>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Reporting {
    pub exclude_defaults: Option<bool>,
    pub output_directory: Option<String>,
    pub plugins: Vec<ReportPlugin>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportPlugin {
    pub group_id: Option<String>,
    pub artifact_id: Option<String>,
    pub version: Option<String>,
    pub report_sets: Vec<ReportSet>,
}

impl ReportPlugin {
    /// Identity key for keyed report-plugin merges.
    pub fn key(&self) -> String {
        format!(
            "{}:{}",
            self.group_id.as_deref().unwrap_or(""),
            self.artifact_id.as_deref().unwrap_or("")
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportSet {
    pub id: Option<String>,
    pub reports: Vec<String>,
}

impl ReportSet {
    /// Report sets without an explicit id share the `default` identity.
    pub fn effective_id(&self) -> &str {
        self.id.as_deref().unwrap_or("default")
    }
}
