//! Engine error taxonomy.
//!
//! Every failure in the engine is construction-time and terminal for the
//! affected object: a model that fails to import stays empty, a shader
//! effect that fails to compile or link is never usable. There are no
//! retries. The one deliberate exception is [`Error::ResourceLoad`], which
//! callers are expected to recover from by substituting a placeholder
//! texture instead of tearing the process down.

use std::path::PathBuf;

/// Errors produced while building engine resources.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The scene file could not be read, or the importer produced an
    /// incomplete scene (missing buffer data, unsupported topology).
    #[error("scene import failed for {path}: {reason}")]
    Import { path: PathBuf, reason: String },

    /// A WGSL module failed validation. Carries the compiler's info log and
    /// the offending source text for diagnostics.
    #[error("shader compilation failed for {path}:\n{log}")]
    ShaderCompile {
        path: PathBuf,
        log: String,
        source_text: String,
    },

    /// The vertex and fragment modules could not be linked into a render
    /// pipeline (interface mismatch between stages or with the vertex
    /// buffer layout).
    #[error("shader link failed ({label}):\n{log}")]
    ShaderLink { label: String, log: String },

    /// A texture or mesh file was missing or undecodable. Recoverable: the
    /// loader substitutes a placeholder so a broken asset degrades visually
    /// instead of terminating the run.
    #[error("failed to load resource {path}: {reason}")]
    ResourceLoad { path: PathBuf, reason: String },

    /// GPU or windowing initialization failed. Always fatal, nothing can
    /// render without a device and a surface.
    #[error("platform initialization failed: {0}")]
    PlatformInit(String),

    /// The binary model cache was unreadable or written by another version.
    /// Treated as a cache miss by the caller.
    #[error("model cache rejected for {path}: {reason}")]
    Cache { path: PathBuf, reason: String },
}

impl Error {
    pub(crate) fn import(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Import {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn resource(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::ResourceLoad {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn cache(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Cache {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
