use thiserror::Error;

use super::MAX_FLOATS_PER_VERTEX;

/// Errors reported by pipeline setup and draw-call validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    #[error("{count} floats per vertex exceeds the maximum of {max}")]
    TooManyAttributes { count: usize, max: usize },
    #[error("a vertex needs at least one attribute slot")]
    NoAttributes,
    #[error("no interpolation rule set for attribute slot {slot}")]
    UnsetInterpRule { slot: usize },
    #[error("{rules} interpolation rules given for {attributes} attribute slots")]
    ExtraInterpRules { rules: usize, attributes: usize },
    #[error("invalid render target size {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    #[error("vertex stride must be non-zero")]
    InvalidStride,
    #[error("vertex array of {len} floats is not a whole number of {stride}-float vertices")]
    PartialVertex { len: usize, stride: usize },
    #[error("indexed topology requires an index array")]
    MissingIndices,
    #[error("invalid index {index} at position {position} (only {vertex_count} vertices)")]
    InvalidIndex {
        index: u32,
        position: usize,
        vertex_count: usize,
    },
}

impl PipelineError {
    pub(crate) fn too_many_attributes(count: usize) -> Self {
        PipelineError::TooManyAttributes {
            count,
            max: MAX_FLOATS_PER_VERTEX,
        }
    }

    /// Setup-time failures; everything else is a rejected draw call
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            PipelineError::TooManyAttributes { .. }
                | PipelineError::NoAttributes
                | PipelineError::UnsetInterpRule { .. }
                | PipelineError::ExtraInterpRules { .. }
                | PipelineError::InvalidDimensions { .. }
        )
    }
}
