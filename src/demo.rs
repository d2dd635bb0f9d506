//! Built-in demo form: an employee profile with department/team and
//! country/city dependencies, plus the option catalogs backing it.

use autoform_core::FormSchema;

use crate::config::CatalogConfig;

const DEMO_SCHEMA: &str = include_str!("../demo/form.yaml");
const DEMO_CATALOGS: &str = include_str!("../demo/catalogs.yaml");

pub fn schema() -> Result<FormSchema, serde_yaml::Error> {
    serde_yaml::from_str(DEMO_SCHEMA)
}

pub fn catalogs() -> Result<Vec<CatalogConfig>, serde_yaml::Error> {
    serde_yaml::from_str(DEMO_CATALOGS)
}
