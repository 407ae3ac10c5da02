use thiserror::Error;

#[derive(Debug, Error)]
pub enum ThinFilmError {
    #[error("parse error: {0}")]
    Parse(String),

    #[error("spline fit needs at least 3 points, found {found}")]
    TooFewPoints { found: usize },

    #[error("spline fit got {x} x values but {y} y values")]
    LengthMismatch { x: usize, y: usize },

    #[error("data for spline fit must have unique x coordinates")]
    NonUniqueAbscissas,

    #[error("unable to resolve material '{name}': {reason}")]
    Resolution { name: String, reason: String },

    #[error("{model} mixing needs exactly 2 components, found {components}")]
    ModelArity {
        model: &'static str,
        components: usize,
    },

    #[error("invalid stack: {0}")]
    InvalidStack(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("archive error: {0}")]
    Archive(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ThinFilmError>;
