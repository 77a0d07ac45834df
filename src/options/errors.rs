//! # Options Errors

use thiserror::Error;

/// Result type for loading operator options
pub type OptionsResult<T> = Result<T, OptionsError>;

/// Errors reading or parsing an options file
#[derive(Debug, Error)]
pub enum OptionsError {
    /// The options file could not be read
    #[error("failed to read options file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The options text is not valid YAML for the options tree
    #[error("invalid options YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_error_names_path() {
        let err = OptionsError::Read {
            path: "/etc/leader.yaml".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        let shown = err.to_string();
        assert!(shown.contains("/etc/leader.yaml"));
        assert!(shown.contains("gone"));
    }
}
