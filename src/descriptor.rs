//! # Bundle Descriptors
//!
//! A resource bundle is addressed with a colon-delimited coordinate string,
//! `groupId:artifactId:version[:type[:classifier]]`. This module parses
//! those strings into [`BundleDescriptor`] values and validates the whole
//! configured list up front, so a malformed descriptor is reported before
//! any bundle is resolved.
//!
//! The artifact type determines the file extension of the resolved artifact
//! and, for some types, a conventional classifier: a `test-jar` is the
//! `tests`-classified jar of its artifact.

use crate::error::{Error, Result};

/// Default artifact type when the descriptor omits one.
pub const DEFAULT_TYPE: &str = "jar";

/// Coordinates of one configured resource bundle.
///
/// Identity is the full 5-tuple. A descriptor is constructed once per
/// configured bundle string and consumed during acquisition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleDescriptor {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    /// Artifact type, `jar` when not specified.
    pub artifact_type: String,
    /// Explicit classifier, or the type's conventional classifier.
    pub classifier: Option<String>,
}

impl BundleDescriptor {
    /// Parse a single descriptor string. `position` is the 1-based ordinal
    /// of the descriptor in its configured list, used in error messages.
    pub fn parse(descriptor: &str, position: usize) -> Result<Self> {
        let parts: Vec<&str> = descriptor.split(':').collect();

        if parts.len() < 3 || parts.len() > 5 || parts.iter().any(|p| p.is_empty()) {
            return Err(Error::Descriptor {
                position: ordinal(position),
                descriptor: descriptor.to_string(),
            });
        }

        let artifact_type = parts.get(3).copied().unwrap_or(DEFAULT_TYPE).to_string();
        let classifier = parts
            .get(4)
            .map(|c| c.to_string())
            .or_else(|| conventional_classifier(&artifact_type).map(str::to_string));

        Ok(Self {
            group_id: parts[0].to_string(),
            artifact_id: parts[1].to_string(),
            version: parts[2].to_string(),
            artifact_type,
            classifier,
        })
    }

    /// Parse a configured descriptor list, preserving declaration order.
    pub fn parse_all(descriptors: &[String]) -> Result<Vec<Self>> {
        descriptors
            .iter()
            .enumerate()
            .map(|(i, d)| Self::parse(d, i + 1))
            .collect()
    }

    /// File extension of the resolved artifact.
    pub fn extension(&self) -> &str {
        match self.artifact_type.as_str() {
            "test-jar" => "jar",
            other => other,
        }
    }

    /// `groupId:artifactId:version` rendering for log and error messages.
    pub fn coordinates(&self) -> String {
        format!("{}:{}:{}", self.group_id, self.artifact_id, self.version)
    }
}

/// Conventional classifier implied by an artifact type.
fn conventional_classifier(artifact_type: &str) -> Option<&'static str> {
    match artifact_type {
        "test-jar" => Some("tests"),
        "javadoc" => Some("javadoc"),
        "java-source" => Some("sources"),
        _ => None,
    }
}

/// English ordinal for a 1-based position: 1st, 2nd, 3rd, Nth.
fn ordinal(position: usize) -> String {
    match position {
        1 => "1st".to_string(),
        2 => "2nd".to_string(),
        3 => "3rd".to_string(),
        n => format!("{}th", n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_three_components() {
        let d = BundleDescriptor::parse("org.acme:legal:1.0", 1).unwrap();
        assert_eq!(d.group_id, "org.acme");
        assert_eq!(d.artifact_id, "legal");
        assert_eq!(d.version, "1.0");
        assert_eq!(d.artifact_type, "jar");
        assert_eq!(d.classifier, None);
        assert_eq!(d.extension(), "jar");
    }

    #[test]
    fn test_parse_with_type_and_classifier() {
        let d = BundleDescriptor::parse("g:a:1:zip:site", 1).unwrap();
        assert_eq!(d.artifact_type, "zip");
        assert_eq!(d.classifier.as_deref(), Some("site"));
        assert_eq!(d.extension(), "zip");
    }

    #[test]
    fn test_test_jar_gets_conventional_classifier() {
        let d = BundleDescriptor::parse("g:a:1:test-jar", 1).unwrap();
        assert_eq!(d.classifier.as_deref(), Some("tests"));
        assert_eq!(d.extension(), "jar");
    }

    #[test]
    fn test_too_few_components() {
        let err = BundleDescriptor::parse("g:a", 1).unwrap_err();
        assert!(err.to_string().contains("1st"));
    }

    #[test]
    fn test_too_many_components() {
        let err = BundleDescriptor::parse("g:a:1:jar:x:extra", 4).unwrap_err();
        assert!(err.to_string().contains("4th"));
    }

    #[test]
    fn test_empty_component_rejected() {
        assert!(BundleDescriptor::parse("g::1", 1).is_err());
    }

    #[test]
    fn test_ordinals() {
        assert_eq!(ordinal(1), "1st");
        assert_eq!(ordinal(2), "2nd");
        assert_eq!(ordinal(3), "3rd");
        assert_eq!(ordinal(11), "11th");
    }

    #[test]
    fn test_parse_all_reports_position() {
        let list = vec!["g:a:1".to_string(), "bad".to_string()];
        let err = BundleDescriptor::parse_all(&list).unwrap_err();
        assert!(err.to_string().contains("2nd"));
    }
}
