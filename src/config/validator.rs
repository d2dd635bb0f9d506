use std::collections::HashMap;
use thiserror::Error;

use crate::config::{CatalogConfig, ServerSettings, Settings};

/// Path prefix under which catalogs are served
pub const CATALOG_PREFIX: &str = "/api/";

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Cross-reference error: {0}")]
    CrossReference(String),

    #[error("Duplicate entry: {0}")]
    Duplicate(String),
}

pub struct ConfigValidator;

impl ConfigValidator {
    pub fn validate(settings: &Settings) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = Self::validate_server(&settings.server) {
            errors.extend(e);
        }

        if let Err(e) = Self::validate_catalogs(&settings.catalogs) {
            errors.extend(e);
        }

        if let Err(e) = Self::validate_cross_references(settings) {
            errors.extend(e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_server(server: &ServerSettings) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if server.host.is_empty() {
            errors.push(ValidationError::MissingField("server.host".to_string()));
        }

        if server.port == 0 {
            errors.push(ValidationError::InvalidValue {
                field: "server.port".to_string(),
                reason: "Port must be greater than 0".to_string(),
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_catalogs(catalogs: &[CatalogConfig]) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();
        let mut seen_names = HashMap::new();

        for (idx, catalog) in catalogs.iter().enumerate() {
            if catalog.name.is_empty() {
                errors.push(ValidationError::MissingField(format!("catalogs[{}].name", idx)));
                continue;
            }

            if catalog.name.contains('/') {
                errors.push(ValidationError::InvalidValue {
                    field: format!("catalogs[{}].name", idx),
                    reason: format!("'{}' must be a single path segment", catalog.name),
                });
            }

            if let Some(prev_idx) = seen_names.insert(&catalog.name, idx) {
                errors.push(ValidationError::Duplicate(format!(
                    "Catalog '{}' appears at indices {} and {}",
                    catalog.name, prev_idx, idx
                )));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Every local `/api/<name>` address in the schema must name a catalog.
    /// Absolute URLs point at other services and are not checked.
    fn validate_cross_references(settings: &Settings) -> Result<(), Vec<ValidationError>> {
        let errors: Vec<ValidationError> = settings
            .schema
            .apis()
            .filter_map(catalog_name)
            .filter(|name| settings.catalog(name).is_none())
            .map(|name| {
                ValidationError::CrossReference(format!(
                    "Schema references unknown catalog '{}'",
                    name
                ))
            })
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Catalog name addressed by a local option API path
pub fn catalog_name(api: &str) -> Option<&str> {
    let path = api.split('?').next().unwrap_or(api);
    path.strip_prefix(CATALOG_PREFIX)
        .filter(|rest| !rest.is_empty() && !rest.contains('/'))
}
