//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges and URL shapes
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: BackendConfig → Result<(), Vec<ValidationError>>

use thiserror::Error;
use url::Url;

use crate::config::schema::BackendConfig;
use crate::transport::registry::is_valid_reference;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("base_url '{0}' is not an absolute URL")]
    InvalidBaseUrl(String),

    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("jsonp.callback_namespace '{0}' must be dot-separated names of [A-Za-z0-9_$]")]
    InvalidNamespace(String),

    #[error("http.connect_timeout_ms must be greater than zero")]
    ZeroConnectTimeout,
}

/// Check a configuration, collecting every problem found.
pub fn validate_config(config: &BackendConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if Url::parse(&config.base_url).is_err() {
        errors.push(ValidationError::InvalidBaseUrl(config.base_url.clone()));
    }

    if config.jsonp.method.trim().is_empty() {
        errors.push(ValidationError::Empty("jsonp.method"));
    }

    let namespace = &config.jsonp.callback_namespace;
    if namespace.is_empty() {
        errors.push(ValidationError::Empty("jsonp.callback_namespace"));
    } else if !is_valid_reference(namespace) {
        errors.push(ValidationError::InvalidNamespace(namespace.clone()));
    }

    if config.jsonp.callback_placeholder.is_empty() {
        errors.push(ValidationError::Empty("jsonp.callback_placeholder"));
    }

    if config.http.connect_timeout_ms == 0 {
        errors.push(ValidationError::ZeroConnectTimeout);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&BackendConfig::default()), Ok(()));
    }

    #[test]
    fn test_reports_every_error() {
        let mut config = BackendConfig::default();
        config.base_url = "/relative".into();
        config.jsonp.method = "  ".into();
        config.jsonp.callback_namespace = "my callbacks".into();
        config.jsonp.callback_placeholder = String::new();
        config.http.connect_timeout_ms = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::InvalidBaseUrl("/relative".into()),
                ValidationError::Empty("jsonp.method"),
                ValidationError::InvalidNamespace("my callbacks".into()),
                ValidationError::Empty("jsonp.callback_placeholder"),
                ValidationError::ZeroConnectTimeout,
            ]
        );
    }

    #[test]
    fn test_namespace_must_be_callable_by_scripts() {
        let mut config = BackendConfig::default();

        config.jsonp.callback_namespace = "app-callbacks".into();
        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::InvalidNamespace("app-callbacks".into())])
        );

        config.jsonp.callback_namespace = "app..callbacks".into();
        assert!(validate_config(&config).is_err());

        config.jsonp.callback_namespace = "app.$jsonp".into();
        assert_eq!(validate_config(&config), Ok(()));
    }
}
