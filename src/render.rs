//! # Template Rendering
//!
//! Template resources are rendered through `tera`, one source at a time
//! against the run's [`crate::context::RenderContext`]. The engine is a
//! collaborator: this module only adapts "source text + context ->
//! rendered text" and turns engine failures into fatal errors naming the
//! offending bundle resource.
//!
//! Bundle sources declare the encoding their templates were authored in;
//! when they declare none, the global fallback encoding from the
//! configuration applies. Supported encodings are UTF-8 and ISO-8859-1.

use crate::error::{Error, Result};

/// Marker suffix identifying template resources. The suffix is stripped
/// from the output name.
pub const TEMPLATE_SUFFIX: &str = ".tera";

/// Character encoding of template sources and rendered output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Utf8,
    Latin1,
}

impl Encoding {
    /// Resolve an encoding label. Labels are matched case-insensitively.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.to_ascii_uppercase().as_str() {
            "UTF-8" | "UTF8" => Some(Self::Utf8),
            "ISO-8859-1" | "ISO8859-1" | "LATIN1" => Some(Self::Latin1),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Utf8 => "UTF-8",
            Self::Latin1 => "ISO-8859-1",
        }
    }

    /// Decode raw bytes into text.
    pub fn decode(&self, bytes: &[u8], resource: &str) -> Result<String> {
        match self {
            Self::Utf8 => String::from_utf8(bytes.to_vec()).map_err(|_| Error::Encoding {
                resource: resource.to_string(),
                encoding: self.label().to_string(),
            }),
            Self::Latin1 => Ok(bytes.iter().map(|&b| b as char).collect()),
        }
    }

    /// Encode text into raw bytes. Characters outside ISO-8859-1 cannot be
    /// represented in that encoding and fail the resource.
    pub fn encode(&self, text: &str, resource: &str) -> Result<Vec<u8>> {
        match self {
            Self::Utf8 => Ok(text.as_bytes().to_vec()),
            Self::Latin1 => text
                .chars()
                .map(|c| {
                    let code = c as u32;
                    if code <= 0xFF {
                        Ok(code as u8)
                    } else {
                        Err(Error::Encoding {
                            resource: resource.to_string(),
                            encoding: self.label().to_string(),
                        })
                    }
                })
                .collect(),
        }
    }
}

/// Effective encoding for a bundle: its declared source encoding, else the
/// global fallback. An unknown label is a render error naming the bundle.
pub fn effective_encoding(
    declared: Option<&str>,
    fallback: &str,
    bundle: &str,
) -> Result<Encoding> {
    let label = declared.unwrap_or(fallback);
    Encoding::from_label(label).ok_or_else(|| Error::Render {
        resource: bundle.to_string(),
        message: format!("unsupported encoding '{}'", label),
    })
}

/// Render template source text against a context. A syntax or evaluation
/// error is fatal and reports the originating resource path.
pub fn render(source: &str, context: &tera::Context, resource: &str) -> Result<String> {
    tera::Tera::one_off(source, context, false).map_err(|e| Error::Render {
        resource: resource.to_string(),
        message: describe_tera_error(&e),
    })
}

/// Flatten a tera error chain into one message; the chain carries the
/// actually useful detail (the root cause is usually a parse error).
fn describe_tera_error(error: &tera::Error) -> String {
    let mut message = error.to_string();
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
