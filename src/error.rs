//! Crate-level error types.

use std::fmt;

use crate::gpu::render_context::RenderContextError;

/// Errors produced by the voro crate.
#[derive(Debug)]
pub enum VoroError {
    /// GPU context initialization failure.
    Gpu(RenderContextError),
    /// Generic I/O failure (options presets, shader overrides).
    Io(std::io::Error),
    /// TOML options parsing/serialization failure.
    OptionsParse(String),
    /// Options parsed fine but hold out-of-range values.
    InvalidOptions(String),
    /// WGSL composition or validation failure.
    ShaderCompose(String),
    /// A GPU allocation was requested beyond what the device allows.
    ResourceLimit {
        /// Label of the resource being allocated.
        label: String,
        /// Requested size (bytes for buffers, texels per side for targets).
        requested: u64,
        /// The device limit that was exceeded.
        limit: u64,
    },
    /// Viewer event-loop failure.
    Viewer(String),
}

impl fmt::Display for VoroError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gpu(e) => write!(f, "GPU error: {e}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::OptionsParse(msg) => {
                write!(f, "options parse error: {msg}")
            }
            Self::InvalidOptions(msg) => write!(f, "invalid options: {msg}"),
            Self::ShaderCompose(msg) => {
                write!(f, "shader composition failed: {msg}")
            }
            Self::ResourceLimit {
                label,
                requested,
                limit,
            } => write!(
                f,
                "cannot allocate '{label}': requested {requested} exceeds \
                 device limit {limit}"
            ),
            Self::Viewer(msg) => write!(f, "viewer error: {msg}"),
        }
    }
}

impl std::error::Error for VoroError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Gpu(e) => Some(e),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<RenderContextError> for VoroError {
    fn from(e: RenderContextError) -> Self {
        Self::Gpu(e)
    }
}

impl From<std::io::Error> for VoroError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_limit_message_names_the_resource() {
        let err = VoroError::ResourceLimit {
            label: "Voronoi Sites".into(),
            requested: 4096,
            limit: 1024,
        };
        let msg = err.to_string();
        assert!(msg.contains("Voronoi Sites"));
        assert!(msg.contains("4096"));
        assert!(msg.contains("1024"));
    }

    #[test]
    fn io_errors_keep_their_source() {
        use std::error::Error;
        let err = VoroError::from(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "missing preset",
        ));
        assert!(err.source().is_some());
    }
}
