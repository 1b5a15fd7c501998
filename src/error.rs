//! # Error Handling
//!
//! This module defines the centralized error handling mechanism for the
//! `remote-resources` application. It uses the `thiserror` library to create
//! a comprehensive `Error` enum that covers all anticipated failure modes,
//! providing clear and descriptive error messages.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum that represents all possible errors that can
//!   occur within the application. Each variant corresponds to a specific
//!   type of error and includes contextual information to aid in debugging.
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`, used
//!   throughout the application to simplify function signatures and ensure
//!   type safety.
//!
//! ## Failure policy
//!
//! Fatal conditions (malformed bundle descriptors, missing required
//! properties, unresolvable bundle artifacts, manifest parse errors,
//! template rendering errors, structural defects in supplemental model
//! documents, I/O errors) propagate through this enum to the top level and
//! terminate the run. Recoverable conditions (a supplement document that
//! fails to parse, a dependency whose metadata cannot be built) are caught
//! at the narrowest scope, logged as warnings, and never reach this type.
//!
//! Each fatal error carries enough context (bundle coordinates, resource
//! path, property name, file location) to locate the offending input
//! without internal diagnostics.

use thiserror::Error;

/// Main error type for remote-resources operations
#[derive(Error, Debug)]
pub enum Error {
    /// A bundle descriptor string does not have 3-5 colon-separated
    /// components. The ordinal identifies which configured descriptor is
    /// malformed.
    #[error(
        "The {position} resource bundle configured must specify a groupId, artifactId, \
         version and, optionally, type and classifier: '{descriptor}'"
    )]
    Descriptor { position: String, descriptor: String },

    /// A property required by a bundle manifest is absent from the
    /// consuming project's property set.
    #[error("Required property '{property}' is not defined; it is required by bundle {bundle}")]
    MissingRequiredProperty { property: String, bundle: String },

    /// A bundle artifact could not be resolved to a local file.
    #[error("Error resolving remote resource bundle {coordinates}: {message}")]
    Acquisition { coordinates: String, message: String },

    /// The resource manifest of a bundle is missing or malformed.
    #[error("Error parsing resource bundle manifest of {bundle}: {message}")]
    ManifestParse { bundle: String, message: String },

    /// A template resource failed to render.
    #[error("Error rendering resource '{resource}': {message}")]
    Render { resource: String, message: String },

    /// A supplemental model document is structurally invalid or cannot be
    /// located.
    #[error("Error loading supplemental data models from {location}: {message}")]
    SupplementLoad { location: String, message: String },

    /// A resource listed in a bundle manifest could not be read from the
    /// bundle source.
    #[error("Error reading bundle resource '{resource}': {message}")]
    BundleRead { resource: String, message: String },

    /// An error occurred while parsing the project configuration file.
    #[error("Configuration parsing error: {message}")]
    ConfigParse { message: String },

    /// Content could not be decoded from, or represented in, the
    /// configured encoding.
    #[error("Content of '{resource}' is not representable as {encoding}")]
    Encoding { resource: String, encoding: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A glob pattern error, wrapped from `glob::PatternError`.
    #[error("Glob pattern error: {0}")]
    Glob(#[from] glob::PatternError),

    /// A URL parsing error, wrapped from `url::ParseError`.
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
