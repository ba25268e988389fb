//! Error types shared by the data, engine and rendering layers.

pub type RaceResult<T> = Result<T, RaceError>;

#[derive(thiserror::Error, Debug)]
pub enum RaceError {
    /// The initial data load failed (network, HTTP status, body decoding).
    #[error("data source error: {0}")]
    DataSource(String),

    /// The loaded data could not be interpreted (e.g. an unparseable date).
    #[error("data format error: {0}")]
    DataFormat(String),

    /// A rendering sink failed while applying a transition.
    #[error("render error: {0}")]
    Render(String),

    #[error("config error: {0}")]
    Config(String),
}

impl RaceError {
    pub fn data_source(msg: impl Into<String>) -> Self {
        Self::DataSource(msg.into())
    }

    pub fn data_format(msg: impl Into<String>) -> Self {
        Self::DataFormat(msg.into())
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

impl From<reqwest::Error> for RaceError {
    fn from(e: reqwest::Error) -> Self {
        Self::DataSource(e.to_string())
    }
}

impl From<std::io::Error> for RaceError {
    fn from(e: std::io::Error) -> Self {
        Self::Render(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(RaceError::data_source("x")
            .to_string()
            .starts_with("data source error:"));
        assert!(RaceError::data_format("x")
            .to_string()
            .starts_with("data format error:"));
        assert!(RaceError::render("x").to_string().starts_with("render error:"));
        assert!(RaceError::config("x").to_string().starts_with("config error:"));
    }

    #[test]
    fn io_errors_map_to_render() {
        let err: RaceError = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "gone").into();
        assert!(matches!(err, RaceError::Render(_)));
    }
}
