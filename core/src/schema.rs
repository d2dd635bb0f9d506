//! Field descriptors and the validated form schema

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};

use crate::error::SchemaError;
use crate::option::FieldOption;

/// Field name to current value, as submitted
pub type FormValues = Map<String, Value>;

/// Width of the layout grid used by `colSpan`
pub const GRID_COLUMNS: u8 = 24;

fn default_col_span() -> u8 {
    GRID_COLUMNS
}

fn default_max_length() -> u32 {
    100
}

fn default_upload_action() -> String {
    "/upload.do".to_string()
}

fn default_true() -> bool {
    true
}

// ============================================================================
// Validation Rules
// ============================================================================

/// A validation rule attached to a field.
///
/// Only `required` is interpreted here. Any other keys are kept as-is so a
/// richer validator can consume them.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationRule {
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ValidationRule {
    pub fn required(message: impl Into<String>) -> Self {
        Self {
            required: true,
            message: Some(message.into()),
            extra: Map::new(),
        }
    }
}

/// A required field that has no usable value
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequiredViolation {
    pub field: String,
    pub message: String,
}

// ============================================================================
// Field Kinds
// ============================================================================

/// Attributes of a `select` field
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectField {
    /// Address the options are fetched from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api: Option<String>,
    /// Field whose value parameterizes the fetch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depends_on: Option<String>,
    /// Static options, used when no `api` is set
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<FieldOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
}

impl SelectField {
    pub fn remote(api: impl Into<String>) -> Self {
        Self {
            api: Some(api.into()),
            ..Default::default()
        }
    }

    pub fn fixed(options: Vec<FieldOption>) -> Self {
        Self {
            options,
            ..Default::default()
        }
    }

    pub fn depending_on(mut self, parent: impl Into<String>) -> Self {
        self.depends_on = Some(parent.into());
        self
    }
}

/// Display kind of a field, tagged by `type`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldKind {
    Input {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        placeholder: Option<String>,
    },
    Select(SelectField),
    AutoComplete {
        #[serde(rename = "autoComplete", default)]
        suggestions: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        placeholder: Option<String>,
    },
    Number {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        prefix: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        suffix: Option<String>,
    },
    Checkbox,
    TextArea {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        placeholder: Option<String>,
        #[serde(rename = "maxLength", default = "default_max_length")]
        max_length: u32,
    },
    Upload {
        #[serde(default = "default_upload_action")]
        action: String,
    },
    Dragger {
        #[serde(default = "default_upload_action")]
        action: String,
        #[serde(default = "default_true")]
        multiple: bool,
    },
}

impl FieldKind {
    /// The `type` tag as written in a schema document
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldKind::Input { .. } => "input",
            FieldKind::Select(_) => "select",
            FieldKind::AutoComplete { .. } => "autocomplete",
            FieldKind::Number { .. } => "number",
            FieldKind::Checkbox => "checkbox",
            FieldKind::TextArea { .. } => "textarea",
            FieldKind::Upload { .. } => "upload",
            FieldKind::Dragger { .. } => "dragger",
        }
    }
}

// ============================================================================
// Field Descriptor
// ============================================================================

/// Declarative description of one form field
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    pub name: String,
    pub label: String,
    #[serde(flatten)]
    pub kind: FieldKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<ValidationRule>,
    #[serde(default = "default_col_span")]
    pub col_span: u8,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, label: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            kind,
            rules: Vec::new(),
            col_span: GRID_COLUMNS,
        }
    }

    pub fn with_rule(mut self, rule: ValidationRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn with_col_span(mut self, col_span: u8) -> Self {
        self.col_span = col_span;
        self
    }

    pub fn select(&self) -> Option<&SelectField> {
        match &self.kind {
            FieldKind::Select(select) => Some(select),
            _ => None,
        }
    }

    pub fn api(&self) -> Option<&str> {
        self.select().and_then(|s| s.api.as_deref())
    }

    pub fn depends_on(&self) -> Option<&str> {
        self.select().and_then(|s| s.depends_on.as_deref())
    }

    pub fn is_required(&self) -> bool {
        self.rules.iter().any(|r| r.required)
    }

    fn required_message(&self) -> String {
        self.rules
            .iter()
            .filter(|r| r.required)
            .find_map(|r| r.message.clone())
            .unwrap_or_else(|| format!("{} is required", self.label))
    }

    /// Whether `value` satisfies a `required` rule for this field's kind
    fn has_required_value(&self, value: Option<&Value>) -> bool {
        match (&self.kind, value) {
            (_, None) => false,
            (FieldKind::Checkbox, Some(v)) => v.as_bool() == Some(true),
            (_, Some(v)) => !is_blank(v),
        }
    }
}

/// Null, empty or whitespace-only strings and empty arrays count as blank
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

// ============================================================================
// Form Schema
// ============================================================================

/// Ordered, validated list of field descriptors.
///
/// Names are unique and every `dependsOn` edge points at an existing field
/// without forming a cycle.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<FieldDescriptor>", into = "Vec<FieldDescriptor>")]
pub struct FormSchema {
    fields: Vec<FieldDescriptor>,
}

impl FormSchema {
    pub fn new(fields: Vec<FieldDescriptor>) -> Result<Self, SchemaError> {
        let mut names = HashSet::new();
        for (idx, field) in fields.iter().enumerate() {
            if field.name.is_empty() {
                return Err(SchemaError::EmptyName(idx));
            }
            if !names.insert(field.name.as_str()) {
                return Err(SchemaError::DuplicateName(field.name.clone()));
            }
            if field.col_span == 0 || field.col_span > GRID_COLUMNS {
                return Err(SchemaError::InvalidColSpan {
                    field: field.name.clone(),
                    col_span: field.col_span,
                });
            }
        }

        let parents: HashMap<&str, &str> = fields
            .iter()
            .filter_map(|f| f.depends_on().map(|p| (f.name.as_str(), p)))
            .collect();

        for (&child, &parent) in &parents {
            if child == parent {
                return Err(SchemaError::SelfDependency(child.to_string()));
            }
            if !names.contains(parent) {
                return Err(SchemaError::UnknownDependency {
                    field: child.to_string(),
                    depends_on: parent.to_string(),
                });
            }
        }

        // Each field has at most one parent, so walking up the chain either
        // terminates or revisits a field.
        for field in &fields {
            let mut seen = HashSet::new();
            let mut current = field.name.as_str();
            while let Some(&parent) = parents.get(current) {
                if !seen.insert(current) {
                    return Err(SchemaError::DependencyCycle(field.name.clone()));
                }
                current = parent;
            }
        }

        Ok(Self { fields })
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Fields whose `dependsOn` names `parent`, in schema order
    pub fn dependents_of<'a>(&'a self, parent: &'a str) -> impl Iterator<Item = &'a FieldDescriptor> + 'a {
        self.fields
            .iter()
            .filter(move |f| f.depends_on() == Some(parent))
    }

    /// Fields fetched once at mount: an `api` and no `dependsOn`
    pub fn initial_fetches(&self) -> impl Iterator<Item = (&FieldDescriptor, &str)> {
        self.fields
            .iter()
            .filter(|f| f.depends_on().is_none())
            .filter_map(|f| f.api().map(|api| (f, api)))
    }

    /// Every `api` address referenced by the schema
    pub fn apis(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().filter_map(|f| f.api())
    }

    /// Required fields lacking a value, in schema order
    pub fn missing_required(&self, values: &FormValues) -> Vec<RequiredViolation> {
        self.fields
            .iter()
            .filter(|f| f.is_required())
            .filter(|f| !f.has_required_value(values.get(&f.name)))
            .map(|f| RequiredViolation {
                field: f.name.clone(),
                message: f.required_message(),
            })
            .collect()
    }
}

impl TryFrom<Vec<FieldDescriptor>> for FormSchema {
    type Error = SchemaError;

    fn try_from(fields: Vec<FieldDescriptor>) -> Result<Self, Self::Error> {
        FormSchema::new(fields)
    }
}

impl From<FormSchema> for Vec<FieldDescriptor> {
    fn from(schema: FormSchema) -> Self {
        schema.fields
    }
}
