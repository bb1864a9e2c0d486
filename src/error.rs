pub type EaselResult<T> = Result<T, EaselError>;

#[derive(thiserror::Error, Debug)]
pub enum EaselError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("document error: {0}")]
    Document(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl EaselError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn document(msg: impl Into<String>) -> Self {
        Self::Document(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(
            EaselError::validation("x")
                .to_string()
                .contains("validation error:")
        );
        assert!(
            EaselError::document("x")
                .to_string()
                .contains("document error:")
        );
        assert!(
            EaselError::storage("x")
                .to_string()
                .contains("storage error:")
        );
    }

    #[test]
    fn other_preserves_source() {
        let base = std::io::Error::other("boom");
        let err = EaselError::Other(anyhow::Error::new(base));
        assert!(err.to_string().contains("boom"));
    }
}
