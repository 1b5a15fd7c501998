//! # Supplemental Model Documents
//!
//! Dependencies frequently publish incomplete metadata: no organization,
//! no license block, no URL. A supplemental model document supplies partial
//! project models that fill those gaps before a dependency is listed in
//! generated resources:
//!
//! ```xml
//! <supplementalDataModels>
//!   <supplement>
//!     <project>
//!       <groupId>org.dep</groupId>
//!       <artifactId>lib</artifactId>
//!       <organization><name>Dep Org</name></organization>
//!     </project>
//!   </supplement>
//! </supplementalDataModels>
//! ```
//!
//! Documents are located through a [`SupplementLocator`]: an ordered list
//! of byte sources (the project directory, the appended-resources
//! directory, and any configured supplement artifacts), queried in order
//! with no implicit fallback. Loading happens once per run; the resulting
//! map keyed `groupId:artifactId` is read-only afterwards.
//!
//! A fragment missing its `groupId` or `artifactId` is a structural defect
//! and fails the run. A document that does not parse at all is logged as a
//! warning and dropped, so one broken supplement among many does not block
//! resource generation.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use url::Url;

use crate::error::{Error, Result};
use crate::model::ProjectModel;
use crate::source::ResourceSource;
use crate::xml::{read_project_model, Doc};

/// Conventional supplement document name inside the appended-resources
/// directory, loaded when no locations are configured explicitly.
pub const DEFAULT_SUPPLEMENTS_FILE: &str = "supplemental-models.xml";

/// Ordered search list for supplement documents.
pub struct SupplementLocator {
    sources: Vec<ResourceSource>,
}

impl SupplementLocator {
    pub fn new(sources: Vec<ResourceSource>) -> Self {
        Self { sources }
    }

    /// Search paths for diagnostics and the rendering context.
    pub fn search_paths(&self) -> Vec<String> {
        self.sources
            .iter()
            .map(|s| s.location().display().to_string())
            .collect()
    }

    /// Resolve a configured location to document bytes. Absolute paths and
    /// `file:` URLs are read directly; anything else is looked up against
    /// the search sources in order.
    pub fn locate(&self, location: &str) -> Result<Option<Vec<u8>>> {
        if let Ok(url) = Url::parse(location) {
            if url.scheme() == "file" {
                if let Ok(path) = url.to_file_path() {
                    return read_optional(&path);
                }
            }
        }

        let path = Path::new(location);
        if path.is_absolute() {
            return read_optional(path);
        }

        for source in &self.sources {
            if let Some(bytes) = source.read(location)? {
                return Ok(Some(bytes));
            }
        }

        Ok(None)
    }
}

fn read_optional(path: &Path) -> Result<Option<Vec<u8>>> {
    if path.is_file() {
        Ok(Some(fs::read(path)?))
    } else {
        Ok(None)
    }
}

/// Effective supplement locations: the configured list, or the
/// conventional document under the appended-resources directory when it
/// exists and nothing was configured.
pub fn default_locations(configured: &[String], appended_dir: &Path) -> Vec<String> {
    if !configured.is_empty() {
        return configured.to_vec();
    }
    let conventional = appended_dir.join(DEFAULT_SUPPLEMENTS_FILE);
    if conventional.is_file() {
        vec![conventional.display().to_string()]
    } else {
        Vec::new()
    }
}

/// Load every configured supplement document into a map keyed
/// `groupId:artifactId`. Later documents override earlier ones on key
/// collisions.
pub fn load_supplements(
    locations: &[String],
    locator: &SupplementLocator,
) -> Result<HashMap<String, ProjectModel>> {
    let mut supplements = HashMap::new();

    for location in locations {
        debug!("Loading supplemental models from {}", location);

        let bytes = locator.locate(location)?.ok_or_else(|| Error::SupplementLoad {
            location: location.clone(),
            message: "could not resolve document".to_string(),
        })?;

        let text = match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(e) => {
                warn!("Unable to read supplemental XML {}: {}", location, e);
                continue;
            }
        };

        let doc = match Doc::parse(&text) {
            Ok(doc) => doc,
            Err(e) => {
                warn!("Unable to parse supplemental XML {}: {}", location, e);
                continue;
            }
        };

        for (key, fragment) in read_fragments(&doc, location)? {
            supplements.insert(key, fragment);
        }
    }

    debug!("Loading supplements complete: {} fragment(s)", supplements.len());
    Ok(supplements)
}

fn read_fragments(doc: &Doc, location: &str) -> Result<Vec<(String, ProjectModel)>> {
    let root = doc.root();
    let mut fragments = Vec::new();

    for supplement in doc.children(root) {
        if doc.name(supplement) != Some("supplement") {
            continue;
        }
        let Some(project) = doc.child(supplement, "project") else {
            continue;
        };

        let model = read_project_model(doc, project);

        if model.group_id.as_deref().map_or(true, |g| g.trim().is_empty()) {
            return Err(Error::SupplementLoad {
                location: location.to_string(),
                message: "supplemental project XML requires that a <groupId> element be present"
                    .to_string(),
            });
        }
        if model.artifact_id.as_deref().map_or(true, |a| a.trim().is_empty()) {
            return Err(Error::SupplementLoad {
                location: location.to_string(),
                message: "supplemental project XML requires that an <artifactId> element be present"
                    .to_string(),
            });
        }

        if let Some(key) = model.supplement_key() {
            fragments.push((key, model));
        }
    }

    Ok(fragments)
}

/// Open supplement search sources: the project directory, the
/// appended-resources directory, and any resolved supplement artifacts.
pub fn build_locator(
    project_dir: &Path,
    appended_dir: &Path,
    artifacts: &[PathBuf],
) -> Result<SupplementLocator> {
    let mut sources = Vec::new();

    if project_dir.is_dir() {
        sources.push(ResourceSource::Directory(project_dir.to_path_buf()));
    }
    if appended_dir.is_dir() {
        sources.push(ResourceSource::Directory(appended_dir.to_path_buf()));
    }
    for artifact in artifacts {
        sources.push(ResourceSource::open(artifact)?);
    }

    Ok(SupplementLocator::new(sources))
}
