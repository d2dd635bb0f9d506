//! Dependent-option resolution
//!
//! [`OptionResolver`] owns the per-field option lists, loading flags and
//! current values of one form. A change to a field resets every field that
//! `dependsOn` it and issues a [`FetchTicket`] for its new option list.
//!
//! Tickets carry the generation they were issued under. Each new request
//! for a field bumps that field's generation, and [`OptionResolver::complete`]
//! drops any result whose generation is no longer current, so the last
//! request issued always wins regardless of the order responses arrive in.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::{OptionFetchError, ResolverError};
use crate::option::{FieldOption, OptionValue};
use crate::schema::{FormSchema, FormValues};

/// An option request the caller must perform and report back
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchTicket {
    pub field: String,
    pub url: String,
    pub generation: u64,
}

/// What [`OptionResolver::complete`] did with a result
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The options replaced the field's list
    Applied { count: usize },
    /// The fetch failed; the previous list was kept
    Failed,
    /// A newer request for the field was issued; the result was dropped
    Stale,
}

/// Build the address for an option request, appending `parent=<value>`
pub fn option_request_url(api: &str, param: Option<&OptionValue>) -> String {
    match param {
        None => api.to_string(),
        Some(value) => {
            let separator = if api.contains('?') { '&' } else { '?' };
            format!(
                "{}{}parent={}",
                api,
                separator,
                urlencoding::encode(&value.to_string())
            )
        }
    }
}

#[derive(Clone, Debug)]
pub struct OptionResolver {
    schema: Arc<FormSchema>,
    values: FormValues,
    options: HashMap<String, Vec<FieldOption>>,
    loading: HashMap<String, bool>,
    generations: HashMap<String, u64>,
    mounted: bool,
}

impl OptionResolver {
    pub fn new(schema: Arc<FormSchema>) -> Self {
        let options = schema
            .fields()
            .iter()
            .filter_map(|f| f.select().map(|s| (f, s)))
            .filter(|(_, s)| s.api.is_none() && !s.options.is_empty())
            .map(|(f, s)| (f.name.clone(), s.options.clone()))
            .collect();

        Self {
            schema,
            values: FormValues::new(),
            options,
            loading: HashMap::new(),
            generations: HashMap::new(),
            mounted: false,
        }
    }

    pub fn schema(&self) -> &Arc<FormSchema> {
        &self.schema
    }

    /// Issue the initial fetch for every field with an `api` and no
    /// `dependsOn`. Only the first call issues anything.
    pub fn mount(&mut self) -> Vec<FetchTicket> {
        if self.mounted {
            return Vec::new();
        }
        self.mounted = true;

        let schema = Arc::clone(&self.schema);
        schema
            .initial_fetches()
            .map(|(field, api)| self.issue(&field.name, api, None))
            .collect()
    }

    /// Record a new value for `name` and refresh the fields depending on it.
    ///
    /// Every dependent field has its value cleared. When the new value is
    /// usable as a parameter, each dependent with an `api` gets a fetch
    /// ticket; otherwise its options are cleared and any in-flight fetch is
    /// invalidated. The reset cascades down the dependency chain.
    pub fn set_value(&mut self, name: &str, value: Value) -> Result<Vec<FetchTicket>, ResolverError> {
        if self.schema.field(name).is_none() {
            return Err(ResolverError::UnknownField(name.to_string()));
        }

        let unchanged = match self.values.get(name) {
            Some(previous) => *previous == value,
            None => value.is_null(),
        };
        if unchanged {
            return Ok(Vec::new());
        }

        let param = OptionValue::from_json(&value);
        if value.is_null() {
            self.values.remove(name);
        } else {
            self.values.insert(name.to_string(), value);
        }

        let mut tickets = Vec::new();
        self.refresh_dependents(name, param.as_ref(), &mut tickets);
        Ok(tickets)
    }

    /// Issue a fetch for `name` outside of a dependency change, e.g. a
    /// manual reload. Returns `None` for fields without an `api`.
    pub fn begin_fetch(
        &mut self,
        name: &str,
        param: Option<&OptionValue>,
    ) -> Result<Option<FetchTicket>, ResolverError> {
        let field = self
            .schema
            .field(name)
            .ok_or_else(|| ResolverError::UnknownField(name.to_string()))?;
        let Some(api) = field.api().map(str::to_string) else {
            return Ok(None);
        };
        Ok(Some(self.issue(name, &api, param)))
    }

    /// Apply the result of a fetch issued by this resolver
    pub fn complete(
        &mut self,
        ticket: &FetchTicket,
        result: Result<Vec<FieldOption>, OptionFetchError>,
    ) -> FetchOutcome {
        let current = self.generations.get(&ticket.field).copied().unwrap_or(0);
        if ticket.generation != current {
            debug!(
                field = %ticket.field,
                generation = ticket.generation,
                current,
                "Discarding stale option response"
            );
            return FetchOutcome::Stale;
        }

        self.loading.insert(ticket.field.clone(), false);
        match result {
            Ok(options) => {
                let count = options.len();
                debug!(field = %ticket.field, count, "Applied option list");
                self.options.insert(ticket.field.clone(), options);
                FetchOutcome::Applied { count }
            }
            Err(e) => {
                warn!(field = %ticket.field, error = %e, "Option fetch failed, keeping previous options");
                FetchOutcome::Failed
            }
        }
    }

    pub fn options(&self, name: &str) -> &[FieldOption] {
        self.options.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_loading(&self, name: &str) -> bool {
        self.loading.get(name).copied().unwrap_or(false)
    }

    /// A dependent field is disabled until its parent holds a value usable
    /// as a fetch parameter. The same test decides whether a fetch is issued.
    pub fn is_disabled(&self, name: &str) -> bool {
        self.schema
            .field(name)
            .and_then(|f| f.depends_on())
            .is_some_and(|parent| self.values.get(parent).and_then(OptionValue::from_json).is_none())
    }

    pub fn value(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    fn issue(&mut self, name: &str, api: &str, param: Option<&OptionValue>) -> FetchTicket {
        let generation = self.bump_generation(name);
        self.loading.insert(name.to_string(), true);

        let url = option_request_url(api, param);
        debug!(field = name, url = %url, generation, "Issuing option fetch");
        FetchTicket {
            field: name.to_string(),
            url,
            generation,
        }
    }

    fn invalidate(&mut self, name: &str) {
        self.bump_generation(name);
        self.loading.insert(name.to_string(), false);
        self.options.remove(name);
    }

    fn bump_generation(&mut self, name: &str) -> u64 {
        let generation = self.generations.entry(name.to_string()).or_insert(0);
        *generation += 1;
        *generation
    }

    fn refresh_dependents(&mut self, parent: &str, param: Option<&OptionValue>, tickets: &mut Vec<FetchTicket>) {
        let schema = Arc::clone(&self.schema);
        for dependent in schema.dependents_of(parent) {
            let name = dependent.name.as_str();
            self.values.remove(name);

            match (param, dependent.api()) {
                (Some(param), Some(api)) => tickets.push(self.issue(name, api, Some(param))),
                (None, Some(_)) => self.invalidate(name),
                // Static options stay; only the value is reset
                (_, None) => {}
            }

            self.refresh_dependents(name, None, tickets);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldDescriptor, FieldKind, SelectField};
    use serde_json::json;

    fn demo_schema() -> Arc<FormSchema> {
        let schema: FormSchema = serde_json::from_value(json!([
            { "name": "firstName", "label": "First Name", "type": "input" },
            { "name": "department", "label": "Department", "type": "select", "api": "/api/departments" },
            { "name": "team", "label": "Team", "type": "select", "api": "/api/teams", "dependsOn": "department" },
            { "name": "role", "label": "Role", "type": "select", "api": "/api/roles" },
            { "name": "country", "label": "Country", "type": "select", "api": "/api/countries" },
            { "name": "city", "label": "City", "type": "select", "api": "/api/cities", "dependsOn": "country" }
        ]))
        .unwrap();
        Arc::new(schema)
    }

    fn teams(values: &[&str]) -> Vec<FieldOption> {
        values.iter().map(|v| FieldOption::new(*v, v.to_uppercase())).collect()
    }

    #[test]
    fn test_request_url() {
        assert_eq!(option_request_url("/api/roles", None), "/api/roles");
        assert_eq!(
            option_request_url("/api/teams", Some(&OptionValue::from("dev"))),
            "/api/teams?parent=dev"
        );
        assert_eq!(
            option_request_url("/api/teams?lang=en", Some(&OptionValue::from("r&d team"))),
            "/api/teams?lang=en&parent=r%26d%20team"
        );
        assert_eq!(
            option_request_url("/api/cities", Some(&OptionValue::from(42))),
            "/api/cities?parent=42"
        );
    }

    #[test]
    fn test_mount_fetches_independent_remote_fields_once() {
        let mut resolver = OptionResolver::new(demo_schema());

        let urls: Vec<String> = resolver.mount().into_iter().map(|t| t.url).collect();
        assert_eq!(urls, vec!["/api/departments", "/api/roles", "/api/countries"]);
        assert!(resolver.is_loading("department"));
        assert!(!resolver.is_loading("team"));

        assert!(resolver.mount().is_empty());
    }

    #[test]
    fn test_dependent_disabled_without_parent() {
        let mut resolver = OptionResolver::new(demo_schema());
        resolver.mount();

        assert!(resolver.is_disabled("team"));
        assert!(resolver.options("team").is_empty());
        assert!(!resolver.is_disabled("department"));
    }

    #[test]
    fn test_change_clears_dependent_and_fetches_with_parent() {
        let mut resolver = OptionResolver::new(demo_schema());
        resolver.mount();

        let tickets = resolver.set_value("department", json!("dev")).unwrap();
        assert_eq!(tickets.len(), 1);
        resolver.complete(&tickets[0], Ok(teams(&["frontend", "backend"])));
        resolver.set_value("team", json!("frontend")).unwrap();

        let tickets = resolver.set_value("department", json!("sales")).unwrap();
        assert_eq!(tickets.len(), 1);
        assert_eq!(tickets[0].field, "team");
        assert_eq!(tickets[0].url, "/api/teams?parent=sales");
        assert_eq!(resolver.value("team"), None);
        assert!(resolver.is_loading("team"));
        assert!(!resolver.is_disabled("team"));
    }

    #[test]
    fn test_whitespace_parent_counts_as_empty() {
        let mut resolver = OptionResolver::new(demo_schema());
        let tickets = resolver.set_value("department", json!("dev")).unwrap();
        resolver.complete(&tickets[0], Ok(teams(&["frontend"])));

        let tickets = resolver.set_value("department", json!("   ")).unwrap();
        assert!(tickets.is_empty());
        assert!(resolver.is_disabled("team"));
        assert!(resolver.options("team").is_empty());
        assert!(!resolver.is_loading("team"));
    }

    #[test]
    fn test_array_parent_disables_dependent() {
        let mut resolver = OptionResolver::new(demo_schema());

        let tickets = resolver.set_value("department", json!(["dev"])).unwrap();
        assert!(tickets.is_empty());
        assert!(resolver.is_disabled("team"));
    }

    #[test]
    fn test_zero_and_false_are_usable_parents() {
        let mut resolver = OptionResolver::new(demo_schema());

        let tickets = resolver.set_value("country", json!(0)).unwrap();
        assert_eq!(tickets[0].url, "/api/cities?parent=0");
        assert!(!resolver.is_disabled("city"));

        let tickets = resolver.set_value("department", json!(false)).unwrap();
        assert_eq!(tickets[0].url, "/api/teams?parent=false");
        assert!(!resolver.is_disabled("team"));
    }

    #[test]
    fn test_change_of_unrelated_field_issues_nothing() {
        let mut resolver = OptionResolver::new(demo_schema());
        let tickets = resolver.set_value("firstName", json!("Ada")).unwrap();
        assert!(tickets.is_empty());
        assert_eq!(resolver.value("firstName"), Some(&json!("Ada")));
    }

    #[test]
    fn test_unchanged_value_is_noop() {
        let mut resolver = OptionResolver::new(demo_schema());
        assert_eq!(resolver.set_value("department", json!("dev")).unwrap().len(), 1);
        assert!(resolver.set_value("department", json!("dev")).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let mut resolver = OptionResolver::new(demo_schema());
        assert_eq!(
            resolver.set_value("nope", json!(1)),
            Err(ResolverError::UnknownField("nope".to_string()))
        );
    }

    #[test]
    fn test_latest_request_wins_when_responses_arrive_in_order() {
        let mut resolver = OptionResolver::new(demo_schema());
        let first = resolver.set_value("department", json!("dev")).unwrap().remove(0);
        let second = resolver.set_value("department", json!("sales")).unwrap().remove(0);

        assert_eq!(resolver.complete(&first, Ok(teams(&["frontend"]))), FetchOutcome::Stale);
        assert!(resolver.is_loading("team"));
        assert_eq!(
            resolver.complete(&second, Ok(teams(&["domestic"]))),
            FetchOutcome::Applied { count: 1 }
        );

        assert_eq!(resolver.options("team"), teams(&["domestic"]).as_slice());
        assert!(!resolver.is_loading("team"));
    }

    #[test]
    fn test_latest_request_wins_when_responses_arrive_reversed() {
        let mut resolver = OptionResolver::new(demo_schema());
        let first = resolver.set_value("department", json!("dev")).unwrap().remove(0);
        let second = resolver.set_value("department", json!("sales")).unwrap().remove(0);

        resolver.complete(&second, Ok(teams(&["domestic"])));
        assert_eq!(resolver.complete(&first, Ok(teams(&["frontend"]))), FetchOutcome::Stale);

        assert_eq!(resolver.options("team"), teams(&["domestic"]).as_slice());
        assert!(!resolver.is_loading("team"));
    }

    #[test]
    fn test_failure_keeps_previous_options() {
        let mut resolver = OptionResolver::new(demo_schema());
        let ticket = resolver.set_value("department", json!("dev")).unwrap().remove(0);
        resolver.complete(&ticket, Ok(teams(&["frontend"])));

        let ticket = resolver.set_value("department", json!("sales")).unwrap().remove(0);
        let outcome = resolver.complete(
            &ticket,
            Err(OptionFetchError::Status {
                url: ticket.url.clone(),
                status: 500,
            }),
        );

        assert_eq!(outcome, FetchOutcome::Failed);
        assert_eq!(resolver.options("team"), teams(&["frontend"]).as_slice());
        assert!(!resolver.is_loading("team"));
    }

    #[test]
    fn test_clearing_parent_invalidates_in_flight_fetch() {
        let mut resolver = OptionResolver::new(demo_schema());
        let ticket = resolver.set_value("country", json!("vn")).unwrap().remove(0);

        let tickets = resolver.set_value("country", Value::Null).unwrap();
        assert!(tickets.is_empty());
        assert!(!resolver.is_loading("city"));
        assert!(resolver.is_disabled("city"));

        assert_eq!(resolver.complete(&ticket, Ok(teams(&["hn"]))), FetchOutcome::Stale);
        assert!(resolver.options("city").is_empty());
    }

    #[test]
    fn test_reset_cascades_down_dependency_chain() {
        let schema = FormSchema::new(vec![
            FieldDescriptor::new("region", "Region", FieldKind::Select(SelectField::remote("/api/regions"))),
            FieldDescriptor::new(
                "country",
                "Country",
                FieldKind::Select(SelectField::remote("/api/countries").depending_on("region")),
            ),
            FieldDescriptor::new(
                "city",
                "City",
                FieldKind::Select(SelectField::remote("/api/cities").depending_on("country")),
            ),
        ])
        .unwrap();
        let mut resolver = OptionResolver::new(Arc::new(schema));

        let ticket = resolver.set_value("region", json!("asia")).unwrap().remove(0);
        resolver.complete(&ticket, Ok(teams(&["vn"])));
        let ticket = resolver.set_value("country", json!("vn")).unwrap().remove(0);
        resolver.complete(&ticket, Ok(teams(&["hn"])));
        resolver.set_value("city", json!("hn")).unwrap();

        let tickets = resolver.set_value("region", json!("europe")).unwrap();
        assert_eq!(tickets.len(), 1);
        assert_eq!(tickets[0].field, "country");
        assert_eq!(resolver.value("country"), None);
        assert_eq!(resolver.value("city"), None);
        assert!(resolver.options("city").is_empty());
        assert!(resolver.is_disabled("city"));
    }

    #[test]
    fn test_static_options_survive_parent_change() {
        let schema = FormSchema::new(vec![
            FieldDescriptor::new("kind", "Kind", FieldKind::Input { placeholder: None }),
            FieldDescriptor::new(
                "size",
                "Size",
                FieldKind::Select(
                    SelectField::fixed(vec![FieldOption::new("s", "Small"), FieldOption::new("l", "Large")])
                        .depending_on("kind"),
                ),
            ),
        ])
        .unwrap();
        let mut resolver = OptionResolver::new(Arc::new(schema));
        resolver.set_value("kind", json!("shirt")).unwrap();
        resolver.set_value("size", json!("s")).unwrap();

        let tickets = resolver.set_value("kind", json!("hat")).unwrap();
        assert!(tickets.is_empty());
        assert_eq!(resolver.value("size"), None);
        assert_eq!(resolver.options("size").len(), 2);
    }

    #[test]
    fn test_manual_refresh() {
        let mut resolver = OptionResolver::new(demo_schema());
        let ticket = resolver.begin_fetch("role", None).unwrap().unwrap();
        assert_eq!(ticket.url, "/api/roles");
        assert_eq!(resolver.begin_fetch("firstName", None).unwrap(), None);
    }
}
