pub type ScrollyteResult<T> = Result<T, ScrollyteError>;

#[derive(thiserror::Error, Debug)]
pub enum ScrollyteError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("animation error: {0}")]
    Animation(String),

    #[error("geometry error: {0}")]
    Geometry(String),

    #[error("asset error: {0}")]
    Asset(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ScrollyteError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn animation(msg: impl Into<String>) -> Self {
        Self::Animation(msg.into())
    }

    pub fn geometry(msg: impl Into<String>) -> Self {
        Self::Geometry(msg.into())
    }

    pub fn asset(msg: impl Into<String>) -> Self {
        Self::Asset(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(
            ScrollyteError::validation("x")
                .to_string()
                .contains("validation error:")
        );
        assert!(
            ScrollyteError::animation("x")
                .to_string()
                .contains("animation error:")
        );
        assert!(
            ScrollyteError::geometry("x")
                .to_string()
                .contains("geometry error:")
        );
        assert!(
            ScrollyteError::asset("x")
                .to_string()
                .contains("asset error:")
        );
    }

    #[test]
    fn other_preserves_source() {
        let base = std::io::Error::other("boom");
        let err = ScrollyteError::Other(anyhow::Error::new(base));
        assert!(err.to_string().contains("boom"));
    }
}
