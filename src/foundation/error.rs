/// Convenience result type used across knitline.
pub type KnitlineResult<T> = Result<T, KnitlineError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum KnitlineError {
    /// Invalid transform parameter or unsupported image operation.
    #[error("transform error: {0}")]
    Transform(String),

    /// Unknown or inconsistent pattern alignment data.
    #[error("alignment error: {0}")]
    Alignment(String),

    /// Plugin discovery, activation, or contract failures.
    #[error("plugin error: {0}")]
    Plugin(String),

    /// Knitting job state-machine violation (operation invalid in the
    /// coordinator's current state). The coordinator absorbs this kind into a
    /// `Failed` terminal state; every other error propagates.
    #[error("invalid transition: {0}")]
    Transition(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl KnitlineError {
    /// Build a [`KnitlineError::Transform`] value.
    pub fn transform(msg: impl Into<String>) -> Self {
        Self::Transform(msg.into())
    }

    /// Build a [`KnitlineError::Alignment`] value.
    pub fn alignment(msg: impl Into<String>) -> Self {
        Self::Alignment(msg.into())
    }

    /// Build a [`KnitlineError::Plugin`] value.
    pub fn plugin(msg: impl Into<String>) -> Self {
        Self::Plugin(msg.into())
    }

    /// Build a [`KnitlineError::Transition`] value.
    pub fn transition(msg: impl Into<String>) -> Self {
        Self::Transition(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
