//! # Bundle Manifests
//!
//! Every resource bundle carries a manifest document at a well-known
//! location inside the artifact, listing the resources the bundle
//! provides, the encoding its template sources were authored in, and the
//! project properties a consuming project must define before the bundle
//! can be processed.
//!
//! The manifest shape:
//!
//! ```xml
//! <remoteResourcesBundle>
//!   <remoteResources>
//!     <remoteResource>META-INF/NOTICE.txt.tera</remoteResource>
//!   </remoteResources>
//!   <sourceEncoding>UTF-8</sourceEncoding>
//!   <requiredProjectProperties>
//!     <requiredProjectProperty>projectName</requiredProjectProperty>
//!   </requiredProjectProperties>
//! </remoteResourcesBundle>
//! ```

use crate::error::{Error, Result};
use crate::source::ResourceSource;
use crate::xml::Doc;

/// Well-known manifest location inside every bundle artifact.
pub const RESOURCES_MANIFEST: &str = "META-INF/remote-resources.xml";

/// Parsed bundle manifest.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BundleManifest {
    /// Resource paths in manifest order. Order is significant: resources
    /// are processed in this order, and later bundles overwrite earlier
    /// ones on path collisions.
    pub resources: Vec<String>,
    /// Encoding of the bundle's template sources, when declared.
    pub source_encoding: Option<String>,
    /// Properties the consuming project must define.
    pub required_properties: Vec<String>,
}

/// A bundle ready for processing: coordinates for diagnostics, the opened
/// source, and its parsed manifest. Owned by the pipeline for one run.
#[derive(Debug)]
pub struct ResolvedBundle {
    pub coordinates: String,
    pub source: ResourceSource,
    pub manifest: BundleManifest,
}

/// Read and parse the manifest of a bundle source. A missing or malformed
/// manifest is fatal.
pub fn read_manifest(source: &ResourceSource, coordinates: &str) -> Result<BundleManifest> {
    let bytes = source
        .read(RESOURCES_MANIFEST)?
        .ok_or_else(|| Error::ManifestParse {
            bundle: coordinates.to_string(),
            message: format!("no {} entry found", RESOURCES_MANIFEST),
        })?;

    let text = String::from_utf8(bytes).map_err(|e| Error::ManifestParse {
        bundle: coordinates.to_string(),
        message: e.to_string(),
    })?;

    parse_manifest(&text).map_err(|message| Error::ManifestParse {
        bundle: coordinates.to_string(),
        message,
    })
}

/// Check that every property a bundle requires is present in the
/// project's effective property set. Runs before any resource of the
/// bundle is processed, so a failing bundle never leaves a
/// partially-processed run behind.
pub fn validate_required_properties(
    bundle: &ResolvedBundle,
    properties: &std::collections::BTreeMap<String, String>,
) -> Result<()> {
    for property in &bundle.manifest.required_properties {
        if !properties.contains_key(property) {
            return Err(Error::MissingRequiredProperty {
                property: property.clone(),
                bundle: format!(
                    "{} ({})",
                    bundle.coordinates,
                    bundle.source.location().display()
                ),
            });
        }
    }
    Ok(())
}

fn parse_manifest(text: &str) -> std::result::Result<BundleManifest, String> {
    let doc = Doc::parse(text)?;
    let root = doc.root();

    if doc.name(root) != Some("remoteResourcesBundle") {
        return Err(format!(
            "expected a <remoteResourcesBundle> document, found <{}>",
            doc.name(root).unwrap_or("?")
        ));
    }

    Ok(BundleManifest {
        resources: doc.string_list(root, "remoteResources", "remoteResource"),
        source_encoding: doc.child_text(root, "sourceEncoding"),
        required_properties: doc.string_list(
            root,
            "requiredProjectProperties",
            "requiredProjectProperty",
        ),
    })
}
