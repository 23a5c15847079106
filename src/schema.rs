//! The schema data model (spec.md §3, §4.5, §6.1).
//!
//! A pure data container plus the construction/round-trip logic.
//! Grounded on the teacher's `graph_catalog::schema_types::SchemaType`
//! (closed enum, `from_str`/`as_str`, case-insensitive alias table) and
//! `graph_catalog::errors::GraphSchemaError` (flat `thiserror` enum),
//! generalized from ClickHouse-column types to the Neo4j property type
//! set spec.md §3 requires, and from a single flat type table to the
//! full node/rel/relationship-triple/metadata schema.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::SchemaError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Neo4jType {
    #[serde(rename = "STRING")]
    String,
    #[serde(rename = "INTEGER")]
    Integer,
    #[serde(rename = "FLOAT")]
    Float,
    #[serde(rename = "BOOLEAN")]
    Boolean,
    #[serde(rename = "POINT")]
    Point,
    #[serde(rename = "DATE_TIME")]
    DateTime,
    #[serde(rename = "LIST")]
    List,
}

impl Neo4jType {
    /// Parses a `neo4j_type` string, accepting the `DATETIME` spelling
    /// as an alias for `DATE_TIME` per spec.md §3's normalization rule.
    pub fn parse(raw: &str) -> Option<Neo4jType> {
        match raw.to_ascii_uppercase().as_str() {
            "STRING" => Some(Neo4jType::String),
            "INTEGER" => Some(Neo4jType::Integer),
            "FLOAT" => Some(Neo4jType::Float),
            "BOOLEAN" => Some(Neo4jType::Boolean),
            "POINT" => Some(Neo4jType::Point),
            "DATE_TIME" | "DATETIME" => Some(Neo4jType::DateTime),
            "LIST" => Some(Neo4jType::List),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Neo4jType::String => "STRING",
            Neo4jType::Integer => "INTEGER",
            Neo4jType::Float => "FLOAT",
            Neo4jType::Boolean => "BOOLEAN",
            Neo4jType::Point => "POINT",
            Neo4jType::DateTime => "DATE_TIME",
            Neo4jType::List => "LIST",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    pub neo4j_type: Neo4jType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distinct_value_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example_values: Option<Vec<String>>,
}

impl Property {
    pub fn new(name: impl Into<String>, neo4j_type: Neo4jType) -> Self {
        Property {
            name: name.into(),
            neo4j_type,
            enum_values: None,
            min_value: None,
            max_value: None,
            distinct_value_count: None,
            example_values: None,
        }
    }

    pub fn from_dict(owner: &str, value: &Value) -> Result<Property, SchemaError> {
        let name = value
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| SchemaError::Malformed {
                message: format!("property on `{owner}` is missing a `name`"),
            })?;
        if name.is_empty() {
            return Err(SchemaError::Malformed {
                message: format!("property on `{owner}` has an empty name"),
            });
        }
        let type_name = value
            .get("neo4j_type")
            .and_then(Value::as_str)
            .ok_or_else(|| SchemaError::Malformed {
                message: format!("property `{name}` on `{owner}` is missing `neo4j_type`"),
            })?;
        let neo4j_type = Neo4jType::parse(type_name).ok_or_else(|| SchemaError::UnknownPropertyType {
            owner: owner.to_string(),
            property: name.to_string(),
            type_name: type_name.to_string(),
        })?;
        Ok(Property {
            name: name.to_string(),
            neo4j_type,
            enum_values: value
                .get("enum_values")
                .and_then(Value::as_array)
                .map(|a| a.iter().filter_map(|v| v.as_str().map(str::to_string)).collect()),
            min_value: value.get("min_value").and_then(Value::as_f64),
            max_value: value.get("max_value").and_then(Value::as_f64),
            distinct_value_count: value.get("distinct_value_count").and_then(Value::as_u64),
            example_values: value
                .get("example_values")
                .and_then(Value::as_array)
                .map(|a| a.iter().filter_map(|v| v.as_str().map(str::to_string)).collect()),
        })
    }

    pub fn to_dict(&self) -> Value {
        serde_json::to_value(self).expect("Property serializes infallibly")
    }
}

/// A permitted `(start_label, rel_type, end_label)` triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RelationshipPattern {
    pub start: String,
    pub end: String,
    pub rel_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    pub id: i64,
    pub name: String,
    pub constraint_type: String,
    pub entity_type: EntityType,
    pub labels_or_types: Vec<String>,
    pub properties: Vec<String>,
    #[serde(default)]
    pub owned_index: Option<String>,
    #[serde(default)]
    pub property_type: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityType {
    #[serde(rename = "NODE")]
    Node,
    #[serde(rename = "RELATIONSHIP")]
    Relationship,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Index {
    pub label: String,
    pub properties: Vec<String>,
    pub size: i64,
    pub index_type: String,
    pub values_selectivity: f64,
    pub distinct_values: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default)]
    pub constraints: Vec<Constraint>,
    #[serde(default)]
    pub indexes: Vec<Index>,
}

/// The full schema description a `validate` call is checked against.
///
/// `node_props`/`rel_props` are `IndexMap`s rather than `std::HashMap`s
/// so that label/rel-type insertion order survives a `to_dict`/
/// `from_dict` round trip, matching the ordering `serde_json`'s
/// `preserve_order` feature already gives the property lists and JSON
/// maps themselves (spec.md §4.5: "stable ordering of keys preserved by
/// insertion"). The inverse indices are derived once at construction
/// time for O(1) `InvalidPropertyAccess` checks (spec.md §9).
#[derive(Debug, Clone)]
pub struct Schema {
    node_props: IndexMap<String, Vec<Property>>,
    rel_props: IndexMap<String, Vec<Property>>,
    relationships: HashSet<RelationshipPattern>,
    metadata: Metadata,
    /// property name -> labels that declare it
    property_to_labels: HashMap<String, HashSet<String>>,
    /// property name -> rel types that declare it
    property_to_rel_types: HashMap<String, HashSet<String>>,
}

impl Schema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    pub fn node_labels(&self) -> impl Iterator<Item = &str> {
        self.node_props.keys().map(String::as_str)
    }

    pub fn rel_types(&self) -> impl Iterator<Item = &str> {
        self.rel_props.keys().map(String::as_str)
    }

    pub fn has_node_label(&self, label: &str) -> bool {
        self.node_props.contains_key(label)
    }

    pub fn has_rel_type(&self, rel_type: &str) -> bool {
        self.rel_props.contains_key(rel_type)
    }

    pub fn node_property(&self, label: &str, property: &str) -> Option<&Property> {
        self.node_props.get(label)?.iter().find(|p| p.name == property)
    }

    pub fn rel_property(&self, rel_type: &str, property: &str) -> Option<&Property> {
        self.rel_props.get(rel_type)?.iter().find(|p| p.name == property)
    }

    /// Labels (from the given candidate set, or all known labels if
    /// `candidates` is `None`) that declare `property`.
    pub fn labels_with_property<'a>(&'a self, property: &str) -> Option<&'a HashSet<String>> {
        self.property_to_labels.get(property)
    }

    pub fn rel_types_with_property<'a>(&'a self, property: &str) -> Option<&'a HashSet<String>> {
        self.property_to_rel_types.get(property)
    }

    pub fn relationships(&self) -> impl Iterator<Item = &RelationshipPattern> {
        self.relationships.iter()
    }

    /// The rel-type/direction check from spec.md §4.3.1.b: given the
    /// candidate start/end label sets and a rel type, does some triple
    /// in `relationships` permit this combination?
    pub fn permits_relationship(
        &self,
        start_labels: &[String],
        rel_type: &str,
        end_labels: &[String],
    ) -> bool {
        self.relationships.iter().any(|r| {
            r.rel_type == rel_type
                && (start_labels.is_empty() || start_labels.iter().any(|l| l == &r.start))
                && (end_labels.is_empty() || end_labels.iter().any(|l| l == &r.end))
        })
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn from_dict(value: &Value) -> Result<Schema, SchemaError> {
        let mut builder = Schema::builder();

        if let Some(node_props) = value.get("node_props").and_then(Value::as_object) {
            for (label, props) in node_props {
                let list = props.as_array().ok_or_else(|| SchemaError::Malformed {
                    message: format!("node_props[{label}] must be an array"),
                })?;
                for p in list {
                    builder.add_node_property(label, Property::from_dict(label, p)?)?;
                }
                builder.ensure_node_label(label);
            }
        }

        if let Some(rel_props) = value.get("rel_props").and_then(Value::as_object) {
            for (rel_type, props) in rel_props {
                let list = props.as_array().ok_or_else(|| SchemaError::Malformed {
                    message: format!("rel_props[{rel_type}] must be an array"),
                })?;
                for p in list {
                    builder.add_rel_property(rel_type, Property::from_dict(rel_type, p)?)?;
                }
                builder.ensure_rel_type(rel_type);
            }
        }

        if let Some(rels) = value.get("relationships").and_then(Value::as_array) {
            for r in rels {
                let start = r.get("start").and_then(Value::as_str).ok_or_else(|| SchemaError::Malformed {
                    message: "relationships[] entry is missing `start`".to_string(),
                })?;
                let end = r.get("end").and_then(Value::as_str).ok_or_else(|| SchemaError::Malformed {
                    message: "relationships[] entry is missing `end`".to_string(),
                })?;
                let rel_type = r.get("rel_type").and_then(Value::as_str).ok_or_else(|| SchemaError::Malformed {
                    message: "relationships[] entry is missing `rel_type`".to_string(),
                })?;
                builder.ensure_node_label(start);
                builder.ensure_node_label(end);
                builder.ensure_rel_type(rel_type);
                builder.add_relationship(start, rel_type, end);
            }
        }

        if let Some(meta) = value.get("metadata").and_then(Value::as_object) {
            let constraints = meta
                .get("constraint")
                .or_else(|| meta.get("constraints"))
                .cloned()
                .unwrap_or(Value::Array(vec![]));
            let indexes = meta
                .get("index")
                .or_else(|| meta.get("indexes"))
                .cloned()
                .unwrap_or(Value::Array(vec![]));
            builder.metadata.constraints =
                serde_json::from_value(constraints).map_err(|e| SchemaError::Malformed {
                    message: format!("invalid metadata.constraint: {e}"),
                })?;
            builder.metadata.indexes =
                serde_json::from_value(indexes).map_err(|e| SchemaError::Malformed {
                    message: format!("invalid metadata.index: {e}"),
                })?;
        }

        Ok(builder.build())
    }

    pub fn to_dict(&self) -> Value {
        let mut node_props = serde_json::Map::new();
        for (label, props) in &self.node_props {
            node_props.insert(
                label.clone(),
                Value::Array(props.iter().map(Property::to_dict).collect()),
            );
        }
        let mut rel_props = serde_json::Map::new();
        for (rel_type, props) in &self.rel_props {
            rel_props.insert(
                rel_type.clone(),
                Value::Array(props.iter().map(Property::to_dict).collect()),
            );
        }
        let relationships: Vec<Value> = self
            .relationships
            .iter()
            .map(|r| serde_json::to_value(r).expect("RelationshipPattern serializes infallibly"))
            .collect();
        serde_json::json!({
            "node_props": node_props,
            "rel_props": rel_props,
            "relationships": relationships,
            "metadata": {
                "constraint": self.metadata.constraints,
                "index": self.metadata.indexes,
            },
        })
    }
}

#[derive(Debug, Default)]
pub struct SchemaBuilder {
    node_props: IndexMap<String, Vec<Property>>,
    rel_props: IndexMap<String, Vec<Property>>,
    relationships: HashSet<RelationshipPattern>,
    metadata: Metadata,
}

impl SchemaBuilder {
    pub fn ensure_node_label(&mut self, label: &str) -> &mut Self {
        self.node_props.entry(label.to_string()).or_default();
        self
    }

    pub fn ensure_rel_type(&mut self, rel_type: &str) -> &mut Self {
        self.rel_props.entry(rel_type.to_string()).or_default();
        self
    }

    pub fn add_node_property(&mut self, label: &str, property: Property) -> Result<&mut Self, SchemaError> {
        let list = self.node_props.entry(label.to_string()).or_default();
        if list.iter().any(|p| p.name == property.name) {
            return Err(SchemaError::DuplicateProperty {
                owner: label.to_string(),
                property: property.name,
            });
        }
        list.push(property);
        Ok(self)
    }

    pub fn add_rel_property(&mut self, rel_type: &str, property: Property) -> Result<&mut Self, SchemaError> {
        let list = self.rel_props.entry(rel_type.to_string()).or_default();
        if list.iter().any(|p| p.name == property.name) {
            return Err(SchemaError::DuplicateProperty {
                owner: rel_type.to_string(),
                property: property.name,
            });
        }
        list.push(property);
        Ok(self)
    }

    pub fn add_relationship(&mut self, start: &str, rel_type: &str, end: &str) -> &mut Self {
        self.relationships.insert(RelationshipPattern {
            start: start.to_string(),
            end: end.to_string(),
            rel_type: rel_type.to_string(),
        });
        self
    }

    pub fn build(self) -> Schema {
        let mut property_to_labels: HashMap<String, HashSet<String>> = HashMap::new();
        for (label, props) in &self.node_props {
            for p in props {
                property_to_labels.entry(p.name.clone()).or_default().insert(label.clone());
            }
        }
        let mut property_to_rel_types: HashMap<String, HashSet<String>> = HashMap::new();
        for (rel_type, props) in &self.rel_props {
            for p in props {
                property_to_rel_types.entry(p.name.clone()).or_default().insert(rel_type.clone());
            }
        }
        Schema {
            node_props: self.node_props,
            rel_props: self.rel_props,
            relationships: self.relationships,
            metadata: self.metadata,
            property_to_labels,
            property_to_rel_types,
        }
    }
}
