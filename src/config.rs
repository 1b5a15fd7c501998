//! # Configuration Schema and Parsing
//!
//! This module defines the data structures that represent the
//! `.remote-resources.yaml` configuration file of a consuming project, as
//! well as the logic for parsing it.
//!
//! ## Key Components
//!
//! - **`Config`**: The whole configuration: the consuming project's own
//!   metadata, the bundle descriptor list, sibling build units, supplement
//!   locations, the dependency set with its filter, resource directories,
//!   output layout and rendering options.
//!
//! - **`ResourceDir`**: One declared resource directory of the project,
//!   with its filtering flag and the exclude list that receives the names
//!   of local overrides consumed during a run.
//!
//! - **`DependencyRef` / `FilterConfig`**: The resolved dependency set and
//!   the scope/group/artifact filters applied to it before dependency
//!   metadata is built.
//!
//! The `project` section reuses [`ProjectModel`] and therefore spells its
//! keys the way project metadata documents do (`groupId`,
//! `inceptionYear`, ...); the surrounding configuration keys use
//! snake_case.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::ProjectModel;

/// Rendered or copied content at most this large is compared against the
/// existing destination before writing.
pub const DEFAULT_IN_MEMORY_THRESHOLD: usize = 5 * 1024 * 1024;

/// Project configuration for one remote-resources run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Metadata of the consuming project, exposed to templates as
    /// `project`.
    pub project: ProjectModel,

    /// Resource bundles to retrieve and process, as
    /// `groupId:artifactId:version[:type[:classifier]]` strings, in
    /// precedence order (last wins on resource-path collisions).
    pub bundles: Vec<String>,

    /// Build units of the same multi-module run whose output can satisfy a
    /// bundle descriptor without a repository round-trip.
    #[serde(default)]
    pub siblings: Vec<crate::acquisition::SiblingBuild>,

    /// Supplemental model document locations. When empty, the conventional
    /// `supplemental-models.xml` under the appended-resources directory is
    /// used if present.
    #[serde(default)]
    pub supplemental_models: Vec<String>,

    /// Artifacts added to the search path when locating supplemental model
    /// documents, in descriptor format.
    #[serde(default)]
    pub supplemental_model_artifacts: Vec<String>,

    /// The project's resolved dependency set.
    #[serde(default)]
    pub dependencies: Vec<DependencyRef>,

    /// Filters applied to the dependency set before metadata is built.
    #[serde(default)]
    pub filter: FilterConfig,

    /// The project's declared resource directories, scanned for overrides
    /// in declaration order.
    #[serde(default)]
    pub resource_dirs: Vec<ResourceDir>,

    /// Also consider same-named files in the project root as overrides.
    #[serde(default)]
    pub use_project_root_files: bool,

    /// Merge the project model's properties into the static properties
    /// below before rendering.
    #[serde(default)]
    pub include_project_properties: bool,

    /// Additional static properties exposed to templates.
    #[serde(default)]
    pub properties: BTreeMap<String, String>,

    /// Directory where processed resources are placed for packaging.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Build directory receiving the output marker file.
    #[serde(default = "default_build_dir")]
    pub build_dir: PathBuf,

    /// Directory containing extra content appended to generated resources.
    #[serde(default = "default_appended_dir")]
    pub appended_resources_dir: PathBuf,

    /// Fallback character encoding for template sources and rendered
    /// output when a bundle declares none.
    #[serde(default = "default_encoding")]
    pub encoding: String,

    /// Reproducible output timestamp, ISO-8601 or integer epoch seconds.
    /// The present year rendered into resources derives from it.
    #[serde(default)]
    pub output_timestamp: Option<String>,

    /// Rendered content no larger than this is compared with the existing
    /// destination file to skip redundant writes.
    #[serde(default = "default_threshold")]
    pub in_memory_comparison_threshold: usize,

    /// Attach the generated directory to the main resources of the build.
    #[serde(default = "default_true")]
    pub attach_to_main: bool,

    /// Attach the generated directory to the test resources of the build.
    #[serde(default = "default_true")]
    pub attach_to_test: bool,

    /// Root of the local artifact repository used by the default resolver
    /// and project builder. Defaults under the user's home directory.
    #[serde(default)]
    pub local_repository: Option<PathBuf>,
}

impl Config {
    /// Effective template properties: the static properties, with the
    /// project model's properties merged in when enabled.
    pub fn effective_properties(&self) -> BTreeMap<String, String> {
        let mut properties = BTreeMap::new();
        if self.include_project_properties {
            properties.extend(self.project.properties.clone());
        }
        properties.extend(self.properties.clone());
        properties
    }

    /// Local repository root, configured or conventional.
    pub fn local_repository_root(&self) -> PathBuf {
        self.local_repository.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".remote-resources")
                .join("repository")
        })
    }
}

/// One declared resource directory of the consuming project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceDir {
    pub path: PathBuf,
    /// Render local overrides from this directory through the template
    /// engine instead of byte-copying them.
    #[serde(default)]
    pub filtering: bool,
    /// Names excluded from this directory's packaging scan. Overrides
    /// consumed during a run are appended here.
    #[serde(default)]
    pub excludes: Vec<String>,
}

/// One resolved dependency of the consuming project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyRef {
    /// `groupId:artifactId:version[:type[:classifier]]`
    pub coordinates: String,
    #[serde(default = "default_scope")]
    pub scope: String,
    /// Whether this is a direct dependency (as opposed to transitive).
    #[serde(default)]
    pub direct: bool,
}

/// Scope and coordinate filters for the dependency set. Group and artifact
/// entries are glob patterns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Scope to include; empty means all scopes.
    #[serde(default = "default_scope")]
    pub include_scope: String,
    /// Scope to exclude; empty means none.
    #[serde(default)]
    pub exclude_scope: String,
    #[serde(default)]
    pub include_group_ids: Vec<String>,
    #[serde(default)]
    pub exclude_group_ids: Vec<String>,
    #[serde(default)]
    pub include_artifact_ids: Vec<String>,
    #[serde(default)]
    pub exclude_artifact_ids: Vec<String>,
    /// Drop transitive dependencies, keeping only direct ones.
    #[serde(default)]
    pub exclude_transitive: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            include_scope: default_scope(),
            exclude_scope: String::new(),
            include_group_ids: Vec::new(),
            exclude_group_ids: Vec::new(),
            include_artifact_ids: Vec::new(),
            exclude_artifact_ids: Vec::new(),
            exclude_transitive: false,
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("target/remote-resources")
}

fn default_build_dir() -> PathBuf {
    PathBuf::from("target")
}

fn default_appended_dir() -> PathBuf {
    PathBuf::from("src/main/appended-resources")
}

fn default_encoding() -> String {
    "UTF-8".to_string()
}

fn default_threshold() -> usize {
    DEFAULT_IN_MEMORY_THRESHOLD
}

fn default_true() -> bool {
    true
}

fn default_scope() -> String {
    "runtime".to_string()
}

/// Parse a configuration from YAML text.
pub fn parse(text: &str) -> Result<Config> {
    serde_yaml::from_str(text).map_err(|e| Error::ConfigParse {
        message: e.to_string(),
    })
}

/// Parse a configuration file.
pub fn from_file(path: &Path) -> Result<Config> {
    let text = fs::read_to_string(path)?;
    parse(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
project:
  groupId: org.acme
  artifactId: app
  version: "1.0"
  name: Acme App
bundles:
  - org.acme:legal-bundle:1.0
"#;

    #[test]
    fn test_parse_minimal() {
        let config = parse(MINIMAL).unwrap();
        assert_eq!(config.project.group_id.as_deref(), Some("org.acme"));
        assert_eq!(config.bundles, vec!["org.acme:legal-bundle:1.0".to_string()]);
        assert_eq!(config.output_dir, PathBuf::from("target/remote-resources"));
        assert_eq!(config.encoding, "UTF-8");
        assert_eq!(
            config.in_memory_comparison_threshold,
            DEFAULT_IN_MEMORY_THRESHOLD
        );
        assert!(config.attach_to_main);
        assert!(config.attach_to_test);
        assert!(!config.use_project_root_files);
    }

    #[test]
    fn test_parse_full_sections() {
        let text = r#"
project:
  groupId: org.acme
  artifactId: app
  version: "1.0"
  inceptionYear: "2020"
  properties:
    vendor: Acme
bundles:
  - org.acme:legal-bundle:1.0
resource_dirs:
  - path: src/main/resources
    filtering: true
dependencies:
  - coordinates: org.dep:lib:2.0
    scope: runtime
    direct: true
filter:
  include_scope: runtime
  exclude_group_ids: ["org.internal.*"]
properties:
  projectName: Acme App
include_project_properties: true
use_project_root_files: true
output_timestamp: "2024-02-01T00:00:00Z"
"#;
        let config = parse(text).unwrap();
        assert_eq!(config.resource_dirs.len(), 1);
        assert!(config.resource_dirs[0].filtering);
        assert_eq!(config.dependencies.len(), 1);
        assert!(config.dependencies[0].direct);
        assert_eq!(config.filter.exclude_group_ids, vec!["org.internal.*"]);
        assert_eq!(config.output_timestamp.as_deref(), Some("2024-02-01T00:00:00Z"));

        let properties = config.effective_properties();
        assert_eq!(properties.get("projectName").map(String::as_str), Some("Acme App"));
        assert_eq!(properties.get("vendor").map(String::as_str), Some("Acme"));
    }

    #[test]
    fn test_static_properties_override_project_properties() {
        let text = r#"
project:
  groupId: g
  artifactId: a
  version: "1"
  properties:
    shared: from-project
bundles: []
properties:
  shared: from-config
include_project_properties: true
"#;
        let config = parse(text).unwrap();
        assert_eq!(
            config.effective_properties().get("shared").map(String::as_str),
            Some("from-config")
        );
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let text = "project:\n  groupId: g\nbundles: []\nbogus: true\n";
        assert!(parse(text).is_err());
    }

    #[test]
    fn test_missing_bundles_is_rejected() {
        assert!(parse("project:\n  groupId: g\n").is_err());
    }
}
