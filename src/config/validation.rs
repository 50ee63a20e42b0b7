//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate bind addresses and timeout ranges
//! - Check seed route patterns and destinations
//! - Detect duplicate seed routes
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RouterConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::fmt;
use std::net::SocketAddr;

use crate::backend::parse_destination;
use crate::config::schema::RouterConfig;
use crate::routing::path::validate_pattern;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path to the offending field (e.g. `routes[2].destination`).
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &RouterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("{:?} is not a socket address", config.listener.bind_address),
        ));
    }

    if config.admin.enabled {
        if config.admin.bind_address.parse::<SocketAddr>().is_err() {
            errors.push(ValidationError::new(
                "admin.bind_address",
                format!("{:?} is not a socket address", config.admin.bind_address),
            ));
        } else if config.admin.bind_address == config.listener.bind_address
            && !config.admin.bind_address.ends_with(":0")
        {
            errors.push(ValidationError::new(
                "admin.bind_address",
                "must differ from listener.bind_address",
            ));
        }
        if config.admin.api_key.as_deref().is_some_and(|k| k.trim().is_empty()) {
            errors.push(ValidationError::new("admin.api_key", "must not be blank"));
        }
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }
    if config.timeouts.upstream_secs == 0 {
        errors.push(ValidationError::new("timeouts.upstream_secs", "must be greater than 0"));
    }

    let mut seen = HashSet::new();
    for (i, route) in config.routes.iter().enumerate() {
        if let Err(e) = validate_pattern(&route.pattern) {
            errors.push(ValidationError::new(format!("routes[{}].pattern", i), e.to_string()));
        } else if !seen.insert(route.pattern.as_str()) {
            errors.push(ValidationError::new(
                format!("routes[{}].pattern", i),
                format!("duplicate pattern {:?}", route.pattern),
            ));
        }

        if let Err(e) = parse_destination(&route.destination) {
            errors.push(ValidationError::new(format!("routes[{}].destination", i), e.to_string()));
        }
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
    use crate::config::schema::RouteConfig;

    fn route(pattern: &str, destination: &str) -> RouteConfig {
        RouteConfig {
            pattern: pattern.into(),
            destination: destination.into(),
        }
    }

    #[test]
    fn default_config_is_valid() {
        assert_eq!(validate_config(&RouterConfig::default()), Ok(()));
    }

    #[test]
    fn collects_every_error() {
        let mut config = RouterConfig::default();
        config.listener.bind_address = "nowhere".into();
        config.timeouts.upstream_secs = 0;
        config.routes.push(route("", "http://:8080/"));
        config.routes.push(route("/foo/", "ftp://files"));
        config.routes.push(route("/foo/", "http://:8081/"));

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "listener.bind_address",
                "timeouts.upstream_secs",
                "routes[0].pattern",
                "routes[1].destination",
                "routes[2].pattern",
            ]
        );
    }

    #[test]
    fn admin_must_not_share_listener_address() {
        let mut config = RouterConfig::default();
        config.admin.bind_address = config.listener.bind_address.clone();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "admin.bind_address");
    }

    #[test]
    fn disabled_admin_is_not_checked() {
        let mut config = RouterConfig::default();
        config.admin.enabled = false;
        config.admin.bind_address = "bogus".into();
        assert!(validate_config(&config).is_ok());
    }
}
