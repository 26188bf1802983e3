//! Flattening of nested metadata records into info properties.
//!
//! A record such as a movie's JSON-RPC details is walked depth first. Every
//! scalar leaf lands under its dotted path (`art.poster`, `cast.0.name`),
//! floats gain formatted variants (see [`format_key_value`]), and scalar
//! sequences are summarised as sorted, de-duplicated `.collection` strings.
//!
//! Fields named as sub-lookups (`tvshowid` inside a season, say) trigger a
//! secondary fetch through a [`LookupResolver`]; the fetched record is
//! flattened under `<prefix>item.` into the same output. Whether each
//! sub-lookup merged or was skipped is reported in [`Flattened::lookups`].

use crate::format::format_key_value;
use crate::models::InfoProperties;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};

const COLLECTION_SEPARATOR: &str = " / ";

/// Answer from a [`LookupResolver`].
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    Found(Map<String, Value>),
    /// The call succeeded but carried no record.
    Empty,
    Failed(String),
}

/// Source of secondary records for sub-lookup fields.
pub trait LookupResolver {
    /// Whether a lookup is defined for `field`.
    fn has_lookup(&self, field: &str) -> bool;

    fn lookup(&self, field: &str, id: i64) -> Lookup;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    NoDefinition,
    InvalidId,
    EmptyResult,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    /// Number of properties the nested record contributed.
    Merged { properties: usize },
    Skipped(SkipReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubLookupReport {
    /// Prefixed path of the triggering field, e.g. `tvshowid`.
    pub path: String,
    pub field: String,
    pub outcome: LookupOutcome,
}

/// Field name to every string value seen for it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionAccumulator {
    fields: BTreeMap<String, BTreeSet<String>>,
}

impl CollectionAccumulator {
    pub fn add(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.fields
            .entry(field.into())
            .or_default()
            .insert(value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Writes `<field>.collection` and `<field>.collection.count` for every
    /// accumulated field.
    pub fn write_collections(&self, properties: &mut InfoProperties) {
        for (field, values) in &self.fields {
            let joined = values
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(COLLECTION_SEPARATOR);
            properties.insert(format!("{field}.collection"), joined);
            properties.insert(format!("{field}.collection.count"), values.len().to_string());
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Flattened {
    pub properties: InfoProperties,
    pub lookups: Vec<SubLookupReport>,
}

#[derive(Default)]
pub struct Flattener<'a> {
    sub_lookups: Vec<String>,
    resolver: Option<&'a dyn LookupResolver>,
}

impl<'a> Flattener<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sub_lookups<S: AsRef<str>>(
        resolver: &'a dyn LookupResolver,
        fields: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            sub_lookups: fields.into_iter().map(|f| f.as_ref().to_string()).collect(),
            resolver: Some(resolver),
        }
    }

    pub fn flatten(&self, record: &Map<String, Value>) -> Flattened {
        let mut collections = CollectionAccumulator::default();
        let mut out = Flattened::default();
        self.walk(
            record,
            "",
            true,
            &mut collections,
            &mut out.properties,
            &mut out.lookups,
        );

        out.properties.insert("isfolder", "true");
        collections.write_collections(&mut out.properties);
        out
    }

    fn walk(
        &self,
        map: &Map<String, Value>,
        prefix: &str,
        lookups_enabled: bool,
        collections: &mut CollectionAccumulator,
        properties: &mut InfoProperties,
        reports: &mut Vec<SubLookupReport>,
    ) {
        for (key, value) in map {
            match value {
                Value::Object(child) => {
                    let prefix = format!("{prefix}{key}.");
                    self.walk(child, &prefix, lookups_enabled, collections, properties, reports);
                }
                Value::Array(items) => {
                    properties.insert(format!("{prefix}{key}.count"), items.len().to_string());
                    let mut local = CollectionAccumulator::default();

                    for (index, item) in items.iter().enumerate() {
                        if let Value::Object(child) = item {
                            let prefix = format!("{prefix}{key}.{index}.");
                            self.walk(
                                child,
                                &prefix,
                                lookups_enabled,
                                collections,
                                properties,
                                reports,
                            );
                            continue;
                        }

                        for (name, formatted) in format_key_value(key, item) {
                            properties.insert(format!("{prefix}{name}.{index}"), formatted.clone());
                            local.add(format!("{prefix}{name}"), formatted.clone());
                            collections.add(name, formatted);
                        }
                    }

                    local.write_collections(properties);
                }
                _ => {
                    for (name, formatted) in format_key_value(key, value) {
                        properties.insert(format!("{prefix}{name}"), formatted.clone());
                        collections.add(name, formatted);
                    }

                    if lookups_enabled {
                        if let Some(report) =
                            self.sub_lookup(key, value, prefix, collections, properties, reports)
                        {
                            reports.push(report);
                        }
                    }
                }
            }
        }
    }

    fn sub_lookup(
        &self,
        field: &str,
        value: &Value,
        prefix: &str,
        collections: &mut CollectionAccumulator,
        properties: &mut InfoProperties,
        reports: &mut Vec<SubLookupReport>,
    ) -> Option<SubLookupReport> {
        let resolver = self.resolver?;
        if !self.sub_lookups.iter().any(|f| f == field) {
            return None;
        }

        let outcome = if !resolver.has_lookup(field) {
            LookupOutcome::Skipped(SkipReason::NoDefinition)
        } else {
            match lookup_id(value) {
                None => LookupOutcome::Skipped(SkipReason::InvalidId),
                Some(id) => match resolver.lookup(field, id) {
                    Lookup::Found(record) if !record.is_empty() => {
                        // nested records never chain further lookups
                        let mut nested = InfoProperties::new();
                        let prefix = format!("{prefix}item.");
                        self.walk(&record, &prefix, false, collections, &mut nested, reports);
                        let merged = nested.len();
                        properties.extend(nested);
                        LookupOutcome::Merged { properties: merged }
                    }
                    Lookup::Found(_) | Lookup::Empty => {
                        LookupOutcome::Skipped(SkipReason::EmptyResult)
                    }
                    Lookup::Failed(message) => {
                        LookupOutcome::Skipped(SkipReason::Failed(message))
                    }
                },
            }
        };

        if let LookupOutcome::Skipped(reason) = &outcome {
            tracing::debug!(field, ?reason, "sub-lookup skipped");
        }

        Some(SubLookupReport {
            path: format!("{prefix}{field}"),
            field: field.to_string(),
            outcome,
        })
    }
}

/// Interprets a scalar as a positive library id.
fn lookup_id(value: &Value) -> Option<i64> {
    let id = match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }?;
    (id > 0).then_some(id)
}
