//! Settings documents with dotted-path access
//!
//! A [`Values`] document is an ordered, nested key/value tree. Every read
//! distinguishes three outcomes:
//!
//! - `Ok(Some(v))`: the path exists and holds a value readable as the
//!   requested type
//! - `Ok(None)`: the path (or one of its ancestors) is absent or null
//! - `Err(..)`: an ancestor is not a map, or the value has the wrong type
//!
//! Callers branch on all three, so they are never collapsed.

use indexmap::IndexMap;
use serde::de::{self, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{SerializeMap, SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::error::{CoreError, Result};

/// Ordered map backing every nested section of a document
pub type Map = IndexMap<String, Value>;

/// A single node of a settings document
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    /// Absent value; reads as not-found
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Map(Map),
}

impl Value {
    /// Human-readable type name used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Int(_) => "integer",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::List(_) => "list",
            Self::Map(_) => "map",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Render a scalar as a string (numbers and booleans included)
    fn scalar_string(&self) -> Option<String> {
        match self {
            Self::String(s) => Some(s.clone()),
            Self::Bool(b) => Some(b.to_string()),
            Self::Int(i) => Some(i.to_string()),
            Self::Float(f) => Some(f.to_string()),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(v.into())
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Self::Int(v.into())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Self::String(v.clone())
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Self::List(v)
    }
}

impl From<&[String]> for Value {
    fn from(v: &[String]) -> Self {
        Self::List(v.iter().map(Value::from).collect())
    }
}

impl From<&IndexMap<String, String>> for Value {
    fn from(v: &IndexMap<String, String>) -> Self {
        Self::Map(
            v.iter()
                .map(|(k, v)| (k.clone(), Value::from(v)))
                .collect(),
        )
    }
}

impl From<Map> for Value {
    fn from(v: Map) -> Self {
        Self::Map(v)
    }
}

impl From<Values> for Value {
    fn from(v: Values) -> Self {
        Self::Map(v.0)
    }
}

impl From<&Values> for Value {
    fn from(v: &Values) -> Self {
        Self::Map(v.0.clone())
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Int(i) => serializer.serialize_i64(*i),
            Self::Float(f) => serializer.serialize_f64(*f),
            Self::String(s) => serializer.serialize_str(s),
            Self::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Map(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map {
                    out.serialize_entry(k, v)?;
                }
                out.end()
            }
        }
    }
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a boolean, number, string, list, map or null")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> std::result::Result<Value, E> {
        Ok(Value::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Value, E> {
        Ok(Value::Int(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Value, E> {
        Ok(i64::try_from(v).map_or(Value::Float(v as f64), Value::Int))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<Value, E> {
        Ok(Value::Float(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Value, E> {
        Ok(Value::String(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> std::result::Result<Value, E> {
        Ok(Value::String(v))
    }

    fn visit_unit<E: de::Error>(self) -> std::result::Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_none<E: de::Error>(self) -> std::result::Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, d: D) -> std::result::Result<Value, D::Error> {
        Value::deserialize(d)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<Value, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(Value::List(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<Value, A::Error> {
        let mut map = Map::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((key, value)) = access.next_entry::<String, Value>()? {
            map.insert(key, value);
        }
        Ok(Value::Map(map))
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(ValueVisitor)
    }
}

/// Types that can be read out of a [`Value`] with the document's coercion rules
pub trait FromValue: Sized {
    /// Type name reported when coercion fails
    const EXPECTED: &'static str;

    fn from_value(value: &Value) -> Option<Self>;
}

impl FromValue for bool {
    const EXPECTED: &'static str = "boolean";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(*b),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }
}

impl FromValue for i64 {
    const EXPECTED: &'static str = "integer";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(i) => Some(*i),
            Value::Float(f) if f.fract() == 0.0 && f.is_finite() => Some(*f as i64),
            _ => None,
        }
    }
}

impl FromValue for i32 {
    const EXPECTED: &'static str = "32-bit integer";

    fn from_value(value: &Value) -> Option<Self> {
        i64::from_value(value).and_then(|i| i32::try_from(i).ok())
    }
}

impl FromValue for u32 {
    const EXPECTED: &'static str = "non-negative integer";

    fn from_value(value: &Value) -> Option<Self> {
        i64::from_value(value).and_then(|i| u32::try_from(i).ok())
    }
}

impl FromValue for f64 {
    const EXPECTED: &'static str = "number";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }
}

impl FromValue for String {
    const EXPECTED: &'static str = "string";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_str().map(str::to_string)
    }
}

impl FromValue for Vec<String> {
    const EXPECTED: &'static str = "list of strings";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::List(items) => items.iter().map(String::from_value).collect(),
            _ => None,
        }
    }
}

impl FromValue for IndexMap<String, String> {
    const EXPECTED: &'static str = "map of strings";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_map().and_then(|map| {
            map.iter()
                .map(|(k, v)| v.scalar_string().map(|s| (k.clone(), s)))
                .collect()
        })
    }
}

impl FromValue for Values {
    const EXPECTED: &'static str = "map";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_map().map(|map| Values(map.clone()))
    }
}

impl FromValue for Vec<Value> {
    const EXPECTED: &'static str = "list";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::List(items) => Some(items.clone()),
            _ => None,
        }
    }
}

impl FromValue for Vec<Values> {
    const EXPECTED: &'static str = "list of maps";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::List(items) => items.iter().map(Values::from_value).collect(),
            _ => None,
        }
    }
}

/// A settings document: the root map of a nested key/value tree
///
/// Every document owns its whole tree; cloning copies every nested list
/// and map, so two documents never share storage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Values(pub Map);

impl Values {
    /// Create an empty document
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Load a document from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse a document from a YAML string; an empty string is an empty document
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::new());
        }
        Self::from_root(serde_yaml::from_str(yaml)?)
    }

    /// Parse a document from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        Self::from_root(serde_json::from_str(json)?)
    }

    /// Serialize the document as YAML
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    fn from_root(value: Value) -> Result<Self> {
        match value {
            Value::Map(map) => Ok(Self(map)),
            Value::Null => Ok(Self::new()),
            other => Err(CoreError::TypeCoercion {
                path: "<root>".to_string(),
                expected: "map",
                found: other.kind(),
            }),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn as_map(&self) -> &Map {
        &self.0
    }

    pub fn into_map(self) -> Map {
        self.0
    }

    /// Produce an independently owned copy of the whole tree
    pub fn deep_copy(&self) -> Values {
        self.clone()
    }

    /// Get the raw value at a dotted path
    pub fn get_value(&self, path: &str) -> Result<Option<&Value>> {
        let (parents, last) = parse_path(path)?;
        let mut current = &self.0;
        for segment in parents {
            current = match current.get(segment) {
                None | Some(Value::Null) => return Ok(None),
                Some(Value::Map(map)) => map,
                Some(other) => return Err(mismatch(path, segment, other)),
            };
        }
        Ok(current.get(last).filter(|v| !v.is_null()))
    }

    /// Check whether a non-null value exists at a dotted path
    pub fn contains(&self, path: &str) -> Result<bool> {
        Ok(self.get_value(path)?.is_some())
    }

    /// Read the value at a dotted path as `T`
    pub fn get<T: FromValue>(&self, path: &str) -> Result<Option<T>> {
        match self.get_value(path)? {
            None => Ok(None),
            Some(value) => T::from_value(value)
                .map(Some)
                .ok_or_else(|| CoreError::TypeCoercion {
                    path: path.to_string(),
                    expected: T::EXPECTED,
                    found: value.kind(),
                }),
        }
    }

    /// Read the value at a dotted path as `T`, then remove it
    ///
    /// Ancestors are left in place even when they become empty. A value
    /// that fails coercion is left untouched.
    pub fn get_and_remove<T: FromValue>(&mut self, path: &str) -> Result<Option<T>> {
        let value = self.get(path)?;
        self.remove(path);
        Ok(value)
    }

    /// Set a value at a dotted path, creating intermediate maps as needed
    pub fn set(&mut self, path: &str, value: impl Into<Value>) -> Result<()> {
        let (parents, last) = parse_path(path)?;
        let mut current = &mut self.0;
        for segment in parents {
            let entry = current.entry(segment.to_string()).or_insert(Value::Null);
            if entry.is_null() {
                *entry = Value::Map(Map::new());
            }
            current = match entry {
                Value::Map(map) => map,
                other => return Err(mismatch(path, segment, other)),
            };
        }
        current.insert(last.to_string(), value.into());
        Ok(())
    }

    /// Remove the value at a dotted path
    ///
    /// Removing an absent path, or a path through a non-map value, is a no-op.
    /// Ancestors that become empty are kept ("section present but empty").
    pub fn remove(&mut self, path: &str) -> Option<Value> {
        let segments: Vec<&str> = path.split('.').collect();
        remove_in(&mut self.0, &segments, false)
    }

    /// Remove the value at a dotted path and prune ancestors left empty
    pub fn remove_pruned(&mut self, path: &str) -> Option<Value> {
        let segments: Vec<&str> = path.split('.').collect();
        remove_in(&mut self.0, &segments, true)
    }

    /// Recursively drop null values and empty maps
    pub fn prune_empty(&mut self) {
        prune_map(&mut self.0);
    }

    /// Deep merge `incoming` into this document, keeping existing values
    ///
    /// Rules:
    /// - Both maps: recursive merge
    /// - Key present (non-null) here: this document's value is kept
    /// - Key absent or null here: incoming value is copied in
    pub fn merge_missing(&mut self, incoming: &Values) {
        merge_missing_into(&mut self.0, &incoming.0);
    }
}

impl From<Map> for Values {
    fn from(map: Map) -> Self {
        Self(map)
    }
}

fn parse_path(path: &str) -> Result<(Vec<&str>, &str)> {
    let mut segments: Vec<&str> = path.split('.').collect();
    match segments.pop() {
        Some(last) if !last.is_empty() && segments.iter().all(|s| !s.is_empty()) => {
            Ok((segments, last))
        }
        _ => Err(CoreError::InvalidPath {
            path: path.to_string(),
        }),
    }
}

fn mismatch(path: &str, segment: &str, found: &Value) -> CoreError {
    CoreError::PathTypeMismatch {
        path: path.to_string(),
        segment: segment.to_string(),
        found: found.kind(),
    }
}

fn remove_in(map: &mut Map, segments: &[&str], prune: bool) -> Option<Value> {
    match segments {
        [] => None,
        [last] => map.shift_remove(*last),
        [first, rest @ ..] => {
            let child = match map.get_mut(*first) {
                Some(Value::Map(child)) => child,
                _ => return None,
            };
            let removed = remove_in(child, rest, prune);
            if prune && removed.is_some() && child.is_empty() {
                map.shift_remove(*first);
            }
            removed
        }
    }
}

fn prune_map(map: &mut Map) {
    for value in map.values_mut() {
        if let Value::Map(child) = value {
            prune_map(child);
        }
    }
    map.retain(|_, value| match value {
        Value::Null => false,
        Value::Map(child) => !child.is_empty(),
        _ => true,
    });
}

fn merge_missing_into(base: &mut Map, incoming: &Map) {
    for (key, incoming_value) in incoming {
        match base.get_mut(key) {
            Some(Value::Map(existing)) => {
                if let Value::Map(incoming_map) = incoming_value {
                    merge_missing_into(existing, incoming_map);
                }
            }
            Some(existing) if !existing.is_null() => {}
            Some(existing) => *existing = incoming_value.clone(),
            None => {
                base.insert(key.clone(), incoming_value.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(yaml: &str) -> Values {
        Values::from_yaml(yaml).unwrap()
    }

    #[test]
    fn test_set_creates_intermediate_maps() {
        let mut values = Values::new();
        values.set("global.proxy.logLevel", "debug").unwrap();
        values.set("global.proxy.concurrency", 2).unwrap();

        assert_eq!(
            values.get::<String>("global.proxy.logLevel").unwrap(),
            Some("debug".to_string())
        );
        assert_eq!(values.get::<i64>("global.proxy.concurrency").unwrap(), Some(2));
    }

    #[test]
    fn test_set_replaces_null_intermediate() {
        let mut values = doc("global: ~");
        values.set("global.hub", "quay.io").unwrap();
        assert_eq!(values.get::<String>("global.hub").unwrap().as_deref(), Some("quay.io"));
    }

    #[test]
    fn test_set_through_scalar_is_error() {
        let mut values = doc("global: oops");
        let err = values.set("global.hub", "quay.io").unwrap_err();
        assert!(matches!(err, CoreError::PathTypeMismatch { ref segment, .. } if segment == "global"));
    }

    #[test]
    fn test_three_state_reads() {
        let values = doc(
            r#"
mixer:
  policy:
    enabled: true
  telemetry: yes-please
"#,
        );

        assert_eq!(values.get::<bool>("mixer.policy.enabled").unwrap(), Some(true));
        assert_eq!(values.get::<bool>("mixer.policy.missing").unwrap(), None);
        assert_eq!(values.get::<bool>("pilot.enabled").unwrap(), None);

        let err = values.get::<bool>("mixer.telemetry.enabled").unwrap_err();
        assert!(matches!(err, CoreError::PathTypeMismatch { .. }));

        let err = values.get::<i64>("mixer.policy.enabled").unwrap_err();
        assert!(matches!(
            err,
            CoreError::TypeCoercion { expected: "integer", found: "boolean", .. }
        ));
    }

    #[test]
    fn test_null_reads_as_absent() {
        let values = doc("kiali:\n  enabled: ~\n");
        assert_eq!(values.get::<bool>("kiali.enabled").unwrap(), None);
        assert!(!values.contains("kiali.enabled").unwrap());
    }

    #[test]
    fn test_coercions() {
        let values = doc(
            r#"
flag: "false"
whole: 3.0
fraction: 2.5
count: 7
labels:
  app: web
  replicas: 3
  canary: true
ports: [a, b]
mixed: [a, 1]
"#,
        );

        assert_eq!(values.get::<bool>("flag").unwrap(), Some(false));
        assert_eq!(values.get::<i64>("whole").unwrap(), Some(3));
        assert!(values.get::<i64>("fraction").is_err());
        assert_eq!(values.get::<f64>("count").unwrap(), Some(7.0));
        assert!(values.get::<String>("count").is_err());

        let labels = values.get::<IndexMap<String, String>>("labels").unwrap().unwrap();
        assert_eq!(labels["replicas"], "3");
        assert_eq!(labels["canary"], "true");

        assert_eq!(
            values.get::<Vec<String>>("ports").unwrap(),
            Some(vec!["a".to_string(), "b".to_string()])
        );
        assert!(values.get::<Vec<String>>("mixed").is_err());
    }

    #[test]
    fn test_get_and_remove() {
        let mut values = doc("mixer:\n  policy:\n    enabled: true\n");
        assert_eq!(values.get_and_remove::<bool>("mixer.policy.enabled").unwrap(), Some(true));
        assert_eq!(values.get::<bool>("mixer.policy.enabled").unwrap(), None);
        // section kept, now empty
        assert_eq!(values.get::<Values>("mixer.policy").unwrap(), Some(Values::new()));
    }

    #[test]
    fn test_get_and_remove_keeps_value_on_type_error() {
        let mut values = doc("replicas: many\n");
        assert!(values.get_and_remove::<i64>("replicas").is_err());
        assert!(values.contains("replicas").unwrap());
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut values = doc("global:\n  hub: quay.io\n");
        let before = values.clone();
        assert!(values.remove("global.tag").is_none());
        assert!(values.remove("pilot.env.FOO").is_none());
        assert!(values.remove("global.hub.nested").is_none());
        assert_eq!(values, before);
    }

    #[test]
    fn test_remove_pruned() {
        let mut values = doc("a:\n  b:\n    c: 1\n  d: 2\n");
        values.remove_pruned("a.b.c");
        assert!(!values.contains("a.b").unwrap());
        assert_eq!(values.get::<i64>("a.d").unwrap(), Some(2));

        values.remove_pruned("a.d");
        assert!(values.is_empty());
    }

    #[test]
    fn test_invalid_paths() {
        let values = Values::new();
        assert!(matches!(values.get_value(""), Err(CoreError::InvalidPath { .. })));
        assert!(matches!(values.get_value("a..b"), Err(CoreError::InvalidPath { .. })));
        assert!(matches!(values.get_value("a."), Err(CoreError::InvalidPath { .. })));
    }

    #[test]
    fn test_deep_copy_is_independent() {
        let original = doc(
            r#"
gateways:
  istio-ingressgateway:
    ports:
      - name: http
        port: 80
"#,
        );

        let mut copy = original.deep_copy();
        copy.set("gateways.istio-ingressgateway.enabled", false).unwrap();
        if let Some(Value::Map(gateways)) = copy.0.get_mut("gateways") {
            if let Some(Value::Map(ingress)) = gateways.get_mut("istio-ingressgateway") {
                if let Some(Value::List(ports)) = ingress.get_mut("ports") {
                    ports.clear();
                }
            }
        }

        let ports = original
            .get::<Vec<Value>>("gateways.istio-ingressgateway.ports")
            .unwrap()
            .unwrap();
        assert_eq!(ports.len(), 1);
        assert!(!original.contains("gateways.istio-ingressgateway.enabled").unwrap());
    }

    #[test]
    fn test_prune_empty() {
        let mut values = doc(
            r#"
mixer:
  policy: {}
  telemetry:
    adapters: {}
pilot:
  enabled: ~
global:
  hub: quay.io
  list: []
"#,
        );
        values.prune_empty();

        assert!(!values.contains("mixer").unwrap());
        assert!(!values.contains("pilot").unwrap());
        assert!(values.contains("global.hub").unwrap());
        assert!(values.contains("global.list").unwrap());
    }

    #[test]
    fn test_merge_missing_keeps_existing() {
        let mut base = doc(
            r#"
global:
  hub: quay.io
  tag: ~
kiali:
  enabled: true
"#,
        );
        let incoming = doc(
            r#"
global:
  hub: docker.io
  tag: "2.0"
  imagePullPolicy: Always
kiali: disabled
grafana:
  enabled: true
"#,
        );

        base.merge_missing(&incoming);

        assert_eq!(base.get::<String>("global.hub").unwrap().as_deref(), Some("quay.io"));
        assert_eq!(base.get::<String>("global.tag").unwrap().as_deref(), Some("2.0"));
        assert_eq!(
            base.get::<String>("global.imagePullPolicy").unwrap().as_deref(),
            Some("Always")
        );
        assert_eq!(base.get::<bool>("kiali.enabled").unwrap(), Some(true));
        assert_eq!(base.get::<bool>("grafana.enabled").unwrap(), Some(true));
    }

    #[test]
    fn test_key_order_preserved() {
        let mut values = doc("b: 1\na: 2\nc: 3\n");
        values.set("a", 5).unwrap();
        let keys: Vec<&str> = values.as_map().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_yaml_roundtrip_preserves_types() {
        let values = doc("a: 1\nb: 1.5\nc: \"1\"\nd: true\ne: [x]\n");
        let reparsed = Values::from_yaml(&values.to_yaml().unwrap()).unwrap();
        assert_eq!(values, reparsed);
        assert_eq!(reparsed.get_value("c").unwrap(), Some(&Value::String("1".into())));
    }

    #[test]
    fn test_from_yaml_rejects_scalar_root() {
        assert!(Values::from_yaml("just a string").is_err());
        assert!(Values::from_yaml("").unwrap().is_empty());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("values.yaml");
        std::fs::write(&path, "global:\n  hub: quay.io\n").unwrap();

        let values = Values::from_file(&path).unwrap();
        assert_eq!(values.get::<String>("global.hub").unwrap().as_deref(), Some("quay.io"));
    }
}
