//! Error taxonomy for every stage of the render pipeline.

use std::fmt;
use thiserror::Error;

/// Pipeline stage that raised an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Grammar,
    Turtle,
    Bounds,
    Render,
    Catalog,
    Output,
    Manifest,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Grammar => "grammar",
            Stage::Turtle => "turtle",
            Stage::Bounds => "bounds",
            Stage::Render => "render",
            Stage::Catalog => "catalog",
            Stage::Output => "output",
            Stage::Manifest => "manifest",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Invalid grammar: {0}")]
    InvalidGrammar(String),

    #[error("Iteration count {requested} out of range (allowed 0..={max})")]
    IterationOutOfRange { requested: i64, max: u32 },

    #[error("Expanded string exceeds maximum length {limit}")]
    OutputTooLarge { limit: usize },

    #[error("Unbalanced ']' at symbol {position} (pop from empty stack)")]
    UnbalancedBracket { position: usize },

    #[error("Turtle position is not finite after symbol {position}")]
    NonFiniteCoordinate { position: usize },

    #[error("Drawing cannot be fitted: {0}")]
    UnfittableDrawing(String),

    #[error("Invalid turtle parameters: {0}")]
    InvalidTurtleParameters(String),

    #[error("Invalid canvas dimensions: {0}")]
    InvalidCanvasDimensions(String),

    #[error("Padding {padding} too large for {width}x{height} canvas")]
    PaddingTooLarge { padding: f64, width: f64, height: f64 },

    #[error("Invalid stroke: {0}")]
    InvalidStroke(String),

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Preset not found: {name} (available: {available})")]
    PresetNotFound { name: String, available: String },

    #[error("Preset catalog unreadable: {path}: {reason}")]
    CatalogUnreadable { path: String, reason: String },

    #[error("Preset requires engine >= {1}, current is {2} (preset {0})")]
    EngineVersionMismatch(String, String, String),

    #[error("Destination not writable: {path}: {reason}")]
    UnwritableDestination { path: String, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RenderError {
    pub fn stage(&self) -> Stage {
        match self {
            RenderError::InvalidGrammar(_)
            | RenderError::IterationOutOfRange { .. }
            | RenderError::OutputTooLarge { .. } => Stage::Grammar,
            RenderError::UnbalancedBracket { .. }
            | RenderError::NonFiniteCoordinate { .. }
            | RenderError::InvalidTurtleParameters(_) => Stage::Turtle,
            RenderError::InvalidCanvasDimensions(_)
            | RenderError::PaddingTooLarge { .. }
            | RenderError::UnfittableDrawing(_) => Stage::Bounds,
            RenderError::InvalidStroke(_) | RenderError::Encoding(_) => Stage::Render,
            RenderError::PresetNotFound { .. }
            | RenderError::CatalogUnreadable { .. }
            | RenderError::EngineVersionMismatch(..) => Stage::Catalog,
            RenderError::UnwritableDestination { .. } => Stage::Output,
            RenderError::Serialization(_) => Stage::Manifest,
        }
    }

    /// True when the caller supplied bad input, as opposed to an
    /// environment or encoder failure.
    pub fn is_user_error(&self) -> bool {
        !matches!(
            self,
            RenderError::Encoding(_)
                | RenderError::CatalogUnreadable { .. }
                | RenderError::UnwritableDestination { .. }
                | RenderError::Serialization(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_mapping() {
        assert_eq!(RenderError::OutputTooLarge { limit: 1 }.stage(), Stage::Grammar);
        assert_eq!(RenderError::UnbalancedBracket { position: 0 }.stage(), Stage::Turtle);
        assert_eq!(
            RenderError::InvalidCanvasDimensions("w".into()).stage(),
            Stage::Bounds
        );
        assert_eq!(RenderError::NonFiniteCoordinate { position: 3 }.stage(), Stage::Turtle);
        assert_eq!(RenderError::UnfittableDrawing("w".into()).stage(), Stage::Bounds);
        assert_eq!(Stage::Bounds.to_string(), "bounds");
    }

    #[test]
    fn test_user_error_classification() {
        assert!(RenderError::InvalidGrammar("empty".into()).is_user_error());
        assert!(!RenderError::Encoding("zlib".into()).is_user_error());
        let err = RenderError::UnwritableDestination {
            path: "/x".into(),
            reason: "denied".into(),
        };
        assert!(!err.is_user_error());
    }
}
