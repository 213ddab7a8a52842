//! Error type of the translator.
//!
//! Only failures that abort a block are errors: a block that is not a recognised statement
//! (`Classification`) or a statement that cannot become an equation (`Build`). Expressions the
//! symbolic parser cannot read and values the namespace cannot provide degrade the output
//! instead and never show up here.

/// Error type for translation, configuration and export
#[derive(Debug, thiserror::Error)]
pub enum CalcError {
    #[error("cannot classify block `{block}`: {reason}")]
    Classification { block: String, reason: String },
    #[error("cannot build equation from `{block}`: {reason}")]
    Build { block: String, reason: String },
    #[error("configuration error: {0}")]
    Config(String),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

impl CalcError {
    pub fn classification(block: &str, reason: impl Into<String>) -> Self {
        CalcError::Classification {
            block: block.trim().to_string(),
            reason: reason.into(),
        }
    }

    pub fn build(block: &str, reason: impl Into<String>) -> Self {
        CalcError::Build {
            block: block.trim().to_string(),
            reason: reason.into(),
        }
    }

    /// the offending source block, if the error belongs to one
    pub fn block(&self) -> Option<&str> {
        match self {
            CalcError::Classification { block, .. } | CalcError::Build { block, .. } => Some(block),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, CalcError>;
