//! # AutoForm Core
//!
//! Schema and dependent-option logic shared by the AutoForm server, the native
//! form session and the browser component.
//!
//! The crate performs no I/O. [`OptionResolver`] hands out [`FetchTicket`]s
//! describing the option requests it needs, and the caller reports each
//! result back through [`OptionResolver::complete`].
//!
//! ```rust
//! use autoform_core::{FormSchema, OptionResolver};
//! use std::sync::Arc;
//!
//! let schema: FormSchema = serde_json::from_str(r#"[
//!     { "name": "department", "label": "Department", "type": "select", "api": "/api/departments" },
//!     { "name": "team", "label": "Team", "type": "select", "api": "/api/teams", "dependsOn": "department" }
//! ]"#).unwrap();
//!
//! let mut resolver = OptionResolver::new(Arc::new(schema));
//! let initial = resolver.mount();
//! assert_eq!(initial.len(), 1);
//! assert_eq!(initial[0].url, "/api/departments");
//!
//! let tickets = resolver.set_value("department", "dev".into()).unwrap();
//! assert_eq!(tickets[0].url, "/api/teams?parent=dev");
//! ```

pub mod error;
pub mod option;
pub mod resolver;
pub mod schema;

pub use error::{OptionFetchError, ResolverError, SchemaError, SubmitError};
pub use option::{FieldOption, OptionValue};
pub use resolver::{option_request_url, FetchOutcome, FetchTicket, OptionResolver};
pub use schema::{
    is_blank, FieldDescriptor, FieldKind, FormSchema, FormValues, RequiredViolation,
    SelectField, ValidationRule,
};
