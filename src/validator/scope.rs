//! `Scope`/`Binding`, the variable-tracking half of the semantic
//! validator (spec.md §3 "Scope (validator-internal)"). No teacher
//! counterpart exists (the teacher's planner resolves names against
//! ClickHouse views, not a Cypher-level scope stack); modeled on the
//! same ordered-map-of-owned-data shape the teacher uses for its own
//! lookup tables (`graph_catalog`'s label/type maps).

use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    Node,
    Rel,
    Path,
    Scalar,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub kind: BindingKind,
    pub labels: HashSet<String>,
    pub rel_types: HashSet<String>,
}

impl Binding {
    pub fn node(labels: HashSet<String>) -> Self {
        Binding { kind: BindingKind::Node, labels, rel_types: HashSet::new() }
    }

    pub fn rel(rel_types: HashSet<String>) -> Self {
        Binding { kind: BindingKind::Rel, labels: HashSet::new(), rel_types }
    }

    pub fn scalar() -> Self {
        Binding { kind: BindingKind::Scalar, labels: HashSet::new(), rel_types: HashSet::new() }
    }

    pub fn path() -> Self {
        Binding { kind: BindingKind::Path, labels: HashSet::new(), rel_types: HashSet::new() }
    }
}

/// A `VarName -> Binding` map. `WITH` replaces the whole scope rather
/// than mutating it in place (spec.md §3: "the old scope is replaced
/// by the new one").
#[derive(Debug, Clone, Default)]
pub struct Scope {
    vars: std::collections::HashMap<String, Binding>,
}

impl Scope {
    pub fn new() -> Self {
        Scope::default()
    }

    pub fn bind(&mut self, name: impl Into<String>, binding: Binding) {
        self.vars.insert(name.into(), binding);
    }

    pub fn get(&self, name: &str) -> Option<&Binding> {
        self.vars.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Binding)> {
        self.vars.iter()
    }
}
