use std::borrow::Cow;
use std::collections::HashMap;

use ragprep_core::config::{NormalizeConfig, SubSchemaConfig};
use serde_json::{Map, Value};

use crate::record::RawRecord;

/// Renders a nested mapping into one labeled sentence.
pub trait FieldExtractor: Send + Sync {
    fn render(&self, value: &Map<String, Value>) -> String;
}

impl<F> FieldExtractor for F
where
    F: Fn(&Map<String, Value>) -> String + Send + Sync,
{
    fn render(&self, value: &Map<String, Value>) -> String {
        self(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct SubField {
    key: String,
    label: String,
    default: String,
}

/// Fixed set of named sub-fields rendered as `Label: value.` pairs, with a
/// placeholder for each missing or null sub-field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubSchemaExtractor {
    fields: Vec<SubField>,
}

impl SubSchemaExtractor {
    /// Build from `(key, label, default)` triples, rendered in the given order.
    pub fn new<K, L, D>(fields: impl IntoIterator<Item = (K, L, D)>) -> Self
    where
        K: Into<String>,
        L: Into<String>,
        D: Into<String>,
    {
        Self {
            fields: fields
                .into_iter()
                .map(|(key, label, default)| SubField {
                    key: key.into(),
                    label: label.into(),
                    default: default.into(),
                })
                .collect(),
        }
    }

    /// `Patient ID: {patient_id|Unknown}. Diagnosis: {diagnosis|N/A}.`
    #[must_use]
    pub fn patient_details() -> Self {
        Self::new([
            ("patient_id", "Patient ID", "Unknown"),
            ("diagnosis", "Diagnosis", "N/A"),
        ])
    }

    #[must_use]
    pub fn from_config(config: &SubSchemaConfig) -> Self {
        Self::new(
            config
                .fields
                .iter()
                .map(|f| (f.key.clone(), f.label.clone(), f.default.clone())),
        )
    }
}

impl FieldExtractor for SubSchemaExtractor {
    fn render(&self, value: &Map<String, Value>) -> String {
        self.fields
            .iter()
            .map(|field| {
                let text = match value.get(&field.key) {
                    None | Some(Value::Null) => Cow::Borrowed(field.default.as_str()),
                    Some(v) => scalar_text(v).unwrap_or_else(|| Cow::Owned(v.to_string())),
                };
                format!("{}: {text}.", field.label)
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Field name to extractor lookup used for nested mappings.
pub struct ExtractorRegistry {
    extractors: HashMap<String, Box<dyn FieldExtractor>>,
}

impl ExtractorRegistry {
    #[must_use]
    pub fn empty() -> Self {
        Self {
            extractors: HashMap::new(),
        }
    }

    /// Registry holding the `patient_details` sub-schema.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register("patient_details", SubSchemaExtractor::patient_details());
        registry
    }

    /// Defaults plus every configured sub-schema. A configured schema replaces
    /// a default one registered under the same field.
    #[must_use]
    pub fn from_config(config: &NormalizeConfig) -> Self {
        let mut registry = Self::with_defaults();
        for schema in &config.sub_schemas {
            registry.register(schema.field.clone(), SubSchemaExtractor::from_config(schema));
        }
        registry
    }

    /// Returns `true` if an extractor was already registered for `field`.
    pub fn register(
        &mut self,
        field: impl Into<String>,
        extractor: impl FieldExtractor + 'static,
    ) -> bool {
        self.extractors
            .insert(field.into(), Box::new(extractor))
            .is_some()
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&dyn FieldExtractor> {
        self.extractors.get(field).map(|e| &**e)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.extractors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.extractors.is_empty()
    }
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl std::fmt::Debug for ExtractorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut fields: Vec<&str> = self.extractors.keys().map(String::as_str).collect();
        fields.sort_unstable();
        f.debug_struct("ExtractorRegistry")
            .field("fields", &fields)
            .finish()
    }
}

/// Turns one record into one narrative string.
///
/// Fields are visited in record order. Reserved keys are skipped, nested
/// mappings go through the registry, scalars render as
/// `The {Field Name} is: {value}.`, and everything else (null, arrays,
/// unregistered mappings) is dropped. The result always starts with
/// `SOURCE FILE: {source}. `.
#[derive(Debug)]
pub struct RecordNormalizer {
    reserved_keys: Vec<String>,
    registry: ExtractorRegistry,
}

impl RecordNormalizer {
    #[must_use]
    pub fn new(config: &NormalizeConfig) -> Self {
        Self::with_registry(
            config.reserved_keys.clone(),
            ExtractorRegistry::from_config(config),
        )
    }

    #[must_use]
    pub fn with_registry(reserved_keys: Vec<String>, registry: ExtractorRegistry) -> Self {
        Self {
            reserved_keys,
            registry,
        }
    }

    #[must_use]
    pub fn registry_mut(&mut self) -> &mut ExtractorRegistry {
        &mut self.registry
    }

    #[must_use]
    pub fn is_reserved(&self, key: &str) -> bool {
        self.reserved_keys.iter().any(|k| k == key)
    }

    #[must_use]
    pub fn normalize(&self, record: &RawRecord, source: &str) -> String {
        let mut sentences = Vec::with_capacity(record.len());
        for (key, value) in record {
            if self.is_reserved(key) {
                continue;
            }
            if let Value::Object(nested) = value {
                if let Some(extractor) = self.registry.get(key) {
                    let sentence = extractor.render(nested);
                    if !sentence.is_empty() {
                        sentences.push(sentence);
                    }
                }
            } else if let Some(text) = scalar_text(value) {
                sentences.push(format!(
                    "The {} is: {text}.",
                    title_case(&key.replace('_', " "))
                ));
            }
        }
        format!("SOURCE FILE: {source}. {}", sentences.join(" "))
    }
}

impl Default for RecordNormalizer {
    fn default() -> Self {
        Self::new(&NormalizeConfig::default())
    }
}

fn scalar_text(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::String(s) => Some(Cow::Borrowed(s.as_str())),
        Value::Number(n) => Some(Cow::Owned(n.to_string())),
        Value::Bool(true) => Some(Cow::Borrowed("True")),
        Value::Bool(false) => Some(Cow::Borrowed("False")),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Upper-case the first letter of every alphabetic run, lower-case the rest.
/// Any non-letter starts a new run.
#[must_use]
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_word = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}
