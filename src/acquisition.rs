//! # Bundle Acquisition
//!
//! Resolves each declared bundle descriptor to a local artifact, in
//! declaration order. Resolution order matters: when two bundles declare
//! the same resource path, the bundle declared later overwrites the
//! earlier one's output in place, so the last bundle listed wins.
//!
//! Before consulting the artifact-resolution collaborator, every
//! descriptor is matched against the configured sibling build units of the
//! same multi-module run. An exact group/artifact/version match
//! short-circuits to the sibling's already-built output directory (the
//! test output directory for a `test-jar` descriptor), avoiding a
//! redundant repository round-trip for artifacts produced earlier in the
//! same run.
//!
//! The transport itself is a collaborator behind [`ArtifactResolver`]; the
//! default implementation maps coordinates onto a local repository layout.

use std::path::PathBuf;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::descriptor::BundleDescriptor;
use crate::error::{Error, Result};

/// Artifact-download transport: resolve coordinates to a local file, or
/// fail. Failures are fatal and are not retried.
pub trait ArtifactResolver {
    fn resolve(&self, descriptor: &BundleDescriptor) -> Result<PathBuf>;
}

/// A build unit of the same multi-module run whose output can stand in for
/// its published artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiblingBuild {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    /// Directory holding the sibling's built classes and resources.
    pub output_directory: PathBuf,
    /// Directory holding the sibling's built test classes and resources.
    #[serde(default)]
    pub test_output_directory: Option<PathBuf>,
}

impl SiblingBuild {
    fn matches(&self, descriptor: &BundleDescriptor) -> bool {
        self.group_id == descriptor.group_id
            && self.artifact_id == descriptor.artifact_id
            && self.version == descriptor.version
    }

    fn directory_for(&self, descriptor: &BundleDescriptor) -> Option<PathBuf> {
        if descriptor.artifact_type == "test-jar" {
            self.test_output_directory.clone()
        } else {
            Some(self.output_directory.clone())
        }
    }
}

/// Resolve every descriptor to a local artifact path, preserving
/// declaration order.
pub fn resolve_bundles(
    descriptors: &[BundleDescriptor],
    siblings: &[SiblingBuild],
    resolver: &dyn ArtifactResolver,
) -> Result<Vec<PathBuf>> {
    let mut artifacts = Vec::with_capacity(descriptors.len());

    for descriptor in descriptors {
        info!("Preparing remote bundle {}", descriptor.coordinates());

        let sibling = siblings
            .iter()
            .find(|s| s.matches(descriptor))
            .and_then(|s| s.directory_for(descriptor))
            .filter(|dir| dir.exists());

        let artifact = match sibling {
            Some(dir) => {
                debug!(
                    "Bundle {} satisfied by sibling build output {}",
                    descriptor.coordinates(),
                    dir.display()
                );
                dir
            }
            None => resolver.resolve(descriptor)?,
        };

        artifacts.push(artifact);
    }

    Ok(artifacts)
}

/// Default resolver over a local repository directory layout:
/// `group/as/dirs/artifact/version/artifact-version[-classifier].ext`.
#[derive(Debug)]
pub struct LocalRepositoryResolver {
    root: PathBuf,
}

impl LocalRepositoryResolver {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Repository path of an artifact, relative to the repository root.
    pub fn artifact_path(descriptor: &BundleDescriptor) -> PathBuf {
        let mut file_name = format!("{}-{}", descriptor.artifact_id, descriptor.version);
        if let Some(classifier) = &descriptor.classifier {
            file_name.push('-');
            file_name.push_str(classifier);
        }
        file_name.push('.');
        file_name.push_str(descriptor.extension());

        descriptor
            .group_id
            .split('.')
            .collect::<PathBuf>()
            .join(&descriptor.artifact_id)
            .join(&descriptor.version)
            .join(file_name)
    }
}

impl ArtifactResolver for LocalRepositoryResolver {
    fn resolve(&self, descriptor: &BundleDescriptor) -> Result<PathBuf> {
        let path = self.root.join(Self::artifact_path(descriptor));
        if path.exists() {
            Ok(path)
        } else {
            Err(Error::Acquisition {
                coordinates: descriptor.coordinates(),
                message: format!("artifact not found at {}", path.display()),
            })
        }
    }
}
