//! Semantic validator (spec.md §4.3, §4.4): walks the AST with a scope
//! stack and checks every label, relationship type, property access,
//! literal-type comparison, and relationship direction against a
//! [`crate::schema::Schema`]. Never raises — it accumulates
//! [`ValidationError`]s and keeps going, the discipline spec.md §9
//! calls out as distinct from the parser's fail-fast behavior.
//!
//! Grounded on the teacher's `graph_catalog::schema_validator` for the
//! overall shape (a struct holding a schema reference plus a growing
//! diagnostic collection) generalized from "validate ClickHouse view
//! mappings against live table schemas" to "validate Cypher AST nodes
//! against a static `Schema`" — the two share no logic beyond that
//! shape, since the teacher's validator is async and talks to a
//! database.

pub mod scope;

use std::collections::HashSet;

use crate::ast::{
    BinaryOp, Clause, DeleteClause, Expression, LimitClause, Literal, MatchClause, MergeClause,
    NodePattern, OrderByClause, Pattern, PatternElement, Projection, Query, QuantifiedPathPattern,
    RelPattern, RemoveClause, RemoveItem, ReturnClause, SetClause, SetItem, SkipClause,
    UnwindClause, WithClause,
};
use crate::config::ValidatorConfig;
use crate::errors::ValidationError;
use crate::position::Position;
use crate::schema::{Neo4jType, Schema};
use scope::{Binding, BindingKind, Scope};

pub fn validate_query(query: &Query<'_>, schema: &Schema, config: &ValidatorConfig) -> Vec<ValidationError> {
    let mut ctx = Ctx { schema, config, errors: Vec::new(), scope: Scope::new(), expr_depth: 0 };
    for clause in &query.clauses {
        ctx.validate_clause(clause);
    }
    ctx.errors
}

struct Ctx<'s> {
    schema: &'s Schema,
    config: &'s ValidatorConfig,
    errors: Vec<ValidationError>,
    scope: Scope,
    expr_depth: usize,
}

/// Plain scalar-literal shape, used only for the §4.4 comparison check;
/// distinct from [`Neo4jType`] since an expression can produce a shape
/// (e.g. a list) that has no corresponding schema property type.
enum InferredType {
    Integer,
    Float,
    Str,
    Boolean,
    List,
    Point,
    DateTime,
}

impl InferredType {
    fn describe(&self) -> String {
        match self {
            InferredType::Integer => "INTEGER".to_string(),
            InferredType::Float => "FLOAT".to_string(),
            InferredType::Str => "STRING".to_string(),
            InferredType::Boolean => "BOOLEAN".to_string(),
            InferredType::List => "LIST".to_string(),
            InferredType::Point => "POINT".to_string(),
            InferredType::DateTime => "DATE_TIME".to_string(),
        }
    }
}

#[derive(Clone, Copy)]
enum PropertyOwner {
    Node,
    Rel,
}

impl Ctx<'_> {
    fn validate_clause(&mut self, clause: &Clause<'_>) {
        match clause {
            Clause::Match(m) => self.validate_match(m),
            Clause::Create(c) => {
                for pattern in &c.patterns {
                    self.bind_pattern(pattern);
                }
            }
            Clause::Merge(m) => self.validate_merge(m),
            Clause::With(w) => self.validate_with(w),
            Clause::Unwind(u) => self.validate_unwind(u),
            Clause::Set(s) => self.validate_set(s),
            Clause::Remove(r) => self.validate_remove(r),
            Clause::Delete(d) => self.validate_delete(d),
            Clause::Return(r) => self.validate_return(r),
        }
    }

    fn validate_match(&mut self, m: &MatchClause<'_>) {
        for pattern in &m.patterns {
            self.bind_pattern(pattern);
        }
        if let Some(where_clause) = &m.where_clause {
            self.validate_expression(&where_clause.condition);
        }
    }

    fn validate_merge(&mut self, m: &MergeClause<'_>) {
        self.bind_pattern(&m.pattern);
        if let Some(sc) = &m.on_create {
            self.validate_set_items(&sc.assignments, sc.pos);
        }
        if let Some(sc) = &m.on_match {
            self.validate_set_items(&sc.assignments, sc.pos);
        }
    }

    fn validate_unwind(&mut self, u: &UnwindClause<'_>) {
        self.validate_expression(&u.expr);
        self.scope.bind(u.alias, Binding::scalar());
    }

    fn validate_set(&mut self, s: &SetClause<'_>) {
        self.validate_set_items(&s.assignments, s.pos);
    }

    fn validate_set_items(&mut self, items: &[SetItem<'_>], clause_pos: Position) {
        for item in items {
            match item {
                SetItem::Property { variable, property, value } => {
                    self.validate_expression(value);
                    self.check_write_property(variable, property, value.pos());
                }
                SetItem::Label { variable, labels } => {
                    self.check_label_target(variable, labels, clause_pos);
                }
            }
        }
    }

    fn validate_remove(&mut self, r: &RemoveClause<'_>) {
        for item in &r.items {
            match item {
                RemoveItem::Property { variable, property } => {
                    self.check_write_property(variable, property, r.pos);
                }
                RemoveItem::Label { variable, labels } => {
                    self.check_label_target(variable, labels, r.pos);
                }
            }
        }
    }

    /// Shared by `SET x:Label` and `REMOVE x:Label`.
    fn check_label_target(&mut self, variable: &str, labels: &[&str], pos: Position) {
        if self.scope.get(variable).is_none() {
            self.errors.push(ValidationError::UndefinedVariable { name: variable.to_string(), pos });
        }
        for label in labels {
            if !self.schema.has_node_label(label) {
                self.errors.push(ValidationError::InvalidNodeLabel { label: label.to_string(), pos });
            }
        }
    }

    fn validate_delete(&mut self, d: &DeleteClause<'_>) {
        for target in &d.targets {
            self.validate_expression(target);
        }
    }

    /// Shared by `SET x.prop = v` and `REMOVE x.prop`: per spec.md
    /// §4.3.6, a write to an unknown property on a known binding is
    /// `InvalidPropertyAccess`.
    fn check_write_property(&mut self, variable: &str, property: &str, pos: Position) {
        let Some(binding) = self.scope.get(variable) else {
            self.errors.push(ValidationError::UndefinedVariable { name: variable.to_string(), pos });
            return;
        };
        let declared = match binding.kind {
            BindingKind::Node => self.property_known(&binding.labels, property, PropertyOwner::Node),
            BindingKind::Rel => self.property_known(&binding.rel_types, property, PropertyOwner::Rel),
            BindingKind::Scalar | BindingKind::Path => true,
        };
        if !declared {
            self.errors.push(ValidationError::InvalidPropertyAccess {
                variable: variable.to_string(),
                property: property.to_string(),
                pos,
            });
        }
    }

    fn validate_with(&mut self, w: &WithClause<'_>) {
        let new_scope = self.build_projection_scope(&w.projections);
        self.scope = new_scope;
        if let Some(where_clause) = &w.where_clause {
            self.validate_expression(&where_clause.condition);
        }
        self.validate_paging(w.order_by.as_ref(), w.skip.as_ref(), w.limit.as_ref());
    }

    fn validate_return(&mut self, r: &ReturnClause<'_>) {
        // Same projection rules as WITH, but the prior scope survives:
        // a RETURN is the end of the pipeline, not a rebind point.
        let _ = self.build_projection_scope(&r.projections);
        self.validate_paging(r.order_by.as_ref(), r.skip.as_ref(), r.limit.as_ref());
    }

    fn validate_paging(
        &mut self,
        order_by: Option<&OrderByClause<'_>>,
        skip: Option<&SkipClause<'_>>,
        limit: Option<&LimitClause<'_>>,
    ) {
        if let Some(ob) = order_by {
            for item in &ob.items {
                self.validate_expression(&item.expr);
            }
        }
        if let Some(skip) = skip {
            self.validate_expression(&skip.value);
        }
        if let Some(limit) = limit {
            self.validate_expression(&limit.value);
        }
    }

    /// Builds the post-projection scope, validating every projected
    /// expression against the *current* (pre-projection) scope along
    /// the way — spec.md §4.3.3: variables referenced in projections
    /// must be in the pre-`WITH` scope.
    fn build_projection_scope(&mut self, projections: &[Projection<'_>]) -> Scope {
        let mut new_scope = Scope::new();
        for proj in projections {
            match proj {
                Projection::Star => {
                    for (name, binding) in self.scope.iter() {
                        new_scope.bind(name.clone(), binding.clone());
                    }
                }
                Projection::Item { expr, alias, .. } => {
                    self.validate_expression(expr);
                    let binding = match expr.as_bare_variable().and_then(|v| self.scope.get(v)) {
                        Some(existing) => existing.clone(),
                        None => Binding::scalar(),
                    };
                    let name = alias.map(str::to_string).or_else(|| expr.as_bare_variable().map(str::to_string));
                    if let Some(name) = name {
                        new_scope.bind(name, binding);
                    }
                }
            }
        }
        new_scope
    }

    // ------------------------------------------------------------ patterns

    fn bind_pattern(&mut self, pattern: &Pattern<'_>) -> HashSet<String> {
        let mut prev_labels: Option<HashSet<String>> = None;
        let mut hops = 0usize;
        let mut i = 0;
        while i < pattern.elements.len() {
            match &pattern.elements[i] {
                PatternElement::Node(n) => {
                    prev_labels = Some(self.bind_node(n));
                    i += 1;
                }
                PatternElement::Quantified(q) => {
                    prev_labels = Some(self.bind_qpp(q));
                    i += 1;
                }
                PatternElement::Relationship(r) => {
                    hops += 1;
                    if hops > self.config.max_relationship_chain_depth {
                        break;
                    }
                    self.bind_rel(r);
                    let next_labels = pattern.elements.get(i + 1).and_then(|next| match next {
                        PatternElement::Node(n2) => Some(self.bind_node(n2)),
                        PatternElement::Quantified(q2) => Some(self.bind_qpp(q2)),
                        PatternElement::Relationship(_) => None,
                    });
                    if let (Some(prev), Some(next)) = (&prev_labels, &next_labels) {
                        self.check_relationship_direction(r, prev, next);
                    }
                    prev_labels = next_labels;
                    i += 2;
                }
            }
        }
        if let Some(path_var) = pattern.path_var {
            self.scope.bind(path_var, Binding::path());
        }
        prev_labels.unwrap_or_default()
    }

    fn effective_node_labels(&self, labels: &[&str]) -> HashSet<String> {
        if labels.is_empty() {
            self.schema.node_labels().map(String::from).collect()
        } else {
            labels.iter().map(|s| s.to_string()).collect()
        }
    }

    fn effective_rel_types(&self, rel_types: &[&str]) -> HashSet<String> {
        if rel_types.is_empty() {
            self.schema.rel_types().map(String::from).collect()
        } else {
            rel_types.iter().map(|s| s.to_string()).collect()
        }
    }

    fn bind_node(&mut self, n: &NodePattern<'_>) -> HashSet<String> {
        for label in &n.labels {
            if !self.schema.has_node_label(label) {
                self.errors.push(ValidationError::InvalidNodeLabel { label: label.to_string(), pos: n.pos });
            }
        }
        // A bare repeated reference to an already-bound node variable
        // (`(b)` after `(b:Person)` earlier in the query) keeps that
        // variable's existing label set rather than widening it back
        // out to every label in the schema.
        let reused = n
            .var
            .filter(|_| n.labels.is_empty())
            .and_then(|var| self.scope.get(var))
            .filter(|b| b.kind == BindingKind::Node)
            .map(|b| b.labels.clone());
        let labels = reused.unwrap_or_else(|| self.effective_node_labels(&n.labels));
        if let Some(var) = n.var {
            self.scope.bind(var, Binding::node(labels.clone()));
        }
        if let Some(map) = &n.prop_map {
            let owner = n.var.unwrap_or("<anonymous>").to_string();
            for kv in map {
                self.validate_expression(&kv.value);
                self.check_map_property(&owner, kv.key, &labels, PropertyOwner::Node, kv.value.pos());
            }
        }
        if let Some(where_expr) = &n.where_clause {
            self.validate_expression(where_expr);
        }
        labels
    }

    fn bind_rel(&mut self, r: &RelPattern<'_>) -> HashSet<String> {
        for rel_type in &r.rel_types {
            if !self.schema.has_rel_type(rel_type) {
                self.errors.push(ValidationError::InvalidRelationshipType {
                    rel_type: rel_type.to_string(),
                    pos: r.pos,
                });
            }
        }
        let rel_types = self.effective_rel_types(&r.rel_types);
        if let Some(var) = r.var {
            self.scope.bind(var, Binding::rel(rel_types.clone()));
        }
        if let Some(map) = &r.prop_map {
            let owner = r.var.unwrap_or("<anonymous>").to_string();
            for kv in map {
                self.validate_expression(&kv.value);
                self.check_map_property(&owner, kv.key, &rel_types, PropertyOwner::Rel, kv.value.pos());
            }
        }
        if let Some(where_expr) = &r.where_clause {
            self.validate_expression(where_expr);
        }
        rel_types
    }

    fn bind_qpp(&mut self, q: &QuantifiedPathPattern<'_>) -> HashSet<String> {
        // Inner variables bind into the enclosing scope rather than a
        // scope that is discarded on exit: a quantified path pattern
        // inside MATCH introduces row bindings just like a plain
        // pattern does, so `a`/`b` in `((a)-[r]->(b)){2,4}` must still
        // be visible to the RETURN that follows.
        self.bind_pattern(&q.inner);
        self.element_label_union(&q.inner)
    }

    fn element_label_union(&self, pattern: &Pattern<'_>) -> HashSet<String> {
        let first = pattern.elements.first().map(|e| self.element_labels(e));
        let last = pattern.elements.last().map(|e| self.element_labels(e));
        let mut labels = first.unwrap_or_default();
        labels.extend(last.unwrap_or_default());
        labels
    }

    fn element_labels(&self, element: &PatternElement<'_>) -> HashSet<String> {
        match element {
            PatternElement::Node(n) => self.effective_node_labels(&n.labels),
            PatternElement::Quantified(q) => self.element_label_union(&q.inner),
            PatternElement::Relationship(_) => HashSet::new(),
        }
    }

    fn check_relationship_direction(
        &mut self,
        r: &RelPattern<'_>,
        prev_labels: &HashSet<String>,
        next_labels: &HashSet<String>,
    ) {
        if r.rel_types.is_empty() {
            return;
        }
        let prev_vec: Vec<String> = prev_labels.iter().cloned().collect();
        let next_vec: Vec<String> = next_labels.iter().cloned().collect();
        let mut any_known = false;
        let mut any_permitted = false;
        for rel_type in &r.rel_types {
            if !self.schema.has_rel_type(rel_type) {
                continue;
            }
            any_known = true;
            let permitted = match r.direction {
                crate::ast::Direction::Outgoing => {
                    self.schema.permits_relationship(&prev_vec, rel_type, &next_vec)
                }
                crate::ast::Direction::Incoming => {
                    self.schema.permits_relationship(&next_vec, rel_type, &prev_vec)
                }
                crate::ast::Direction::Either => {
                    self.schema.permits_relationship(&prev_vec, rel_type, &next_vec)
                        || self.schema.permits_relationship(&next_vec, rel_type, &prev_vec)
                }
            };
            if permitted {
                any_permitted = true;
            }
        }
        if any_known && !any_permitted {
            self.errors.push(ValidationError::InvalidRelationshipDirection {
                rel_type: r.rel_types[0].to_string(),
                start_label: prev_vec.first().cloned().unwrap_or_default(),
                end_label: next_vec.first().cloned().unwrap_or_default(),
                pos: r.pos,
            });
        }
    }

    /// O(1)-per-candidate membership check against the schema's
    /// property -> owner inverse index (spec.md §9).
    fn property_known(&self, candidates: &HashSet<String>, property: &str, kind: PropertyOwner) -> bool {
        let owners = match kind {
            PropertyOwner::Node => self.schema.labels_with_property(property),
            PropertyOwner::Rel => self.schema.rel_types_with_property(property),
        };
        match owners {
            Some(owners) => candidates.iter().any(|c| owners.contains(c)),
            None => false,
        }
    }

    fn check_map_property(
        &mut self,
        owner: &str,
        property: &str,
        candidates: &HashSet<String>,
        kind: PropertyOwner,
        pos: Position,
    ) {
        if !self.property_known(candidates, property, kind) {
            self.errors.push(ValidationError::InvalidPropertyAccess {
                variable: owner.to_string(),
                property: property.to_string(),
                pos,
            });
        }
    }

    // ---------------------------------------------------------- expressions

    fn validate_expression(&mut self, expr: &Expression<'_>) {
        self.expr_depth += 1;
        if self.expr_depth > self.config.max_expression_depth {
            self.expr_depth -= 1;
            return;
        }
        self.validate_expression_inner(expr);
        self.expr_depth -= 1;
    }

    fn validate_expression_inner(&mut self, expr: &Expression<'_>) {
        match expr {
            Expression::Literal(..) | Expression::Parameter(..) => {}
            Expression::Variable(name, pos) => {
                if !self.scope.contains(name) {
                    self.errors.push(ValidationError::UndefinedVariable { name: name.to_string(), pos: *pos });
                }
            }
            Expression::List(items, _) => {
                for item in items {
                    self.validate_expression(item);
                }
            }
            Expression::Map(entries, _) => {
                for (_, v) in entries {
                    self.validate_expression(v);
                }
            }
            Expression::PropertyAccess { base, key, pos } => {
                self.validate_expression(base);
                if let Some(var) = base.as_bare_variable() {
                    self.check_property_access(var, key, *pos);
                }
            }
            Expression::FunctionCall { args, .. } => {
                for arg in args {
                    self.validate_expression(arg);
                }
            }
            Expression::Binary { op, lhs, rhs, pos } => {
                self.validate_expression(lhs);
                self.validate_expression(rhs);
                self.check_comparison(*op, lhs, rhs, *pos);
            }
            Expression::Unary { operand, .. } => self.validate_expression(operand),
            Expression::In { item, list, .. } => {
                self.validate_expression(item);
                self.validate_expression(list);
            }
            Expression::IsNull { operand, .. } => self.validate_expression(operand),
            Expression::PatternExpression(pattern, _) => {
                let saved = self.scope.clone();
                self.bind_pattern(pattern);
                self.scope = saved;
            }
            Expression::CaseWhen { subject, when_then, else_branch, .. } => {
                if let Some(s) = subject {
                    self.validate_expression(s);
                }
                for (when, then) in when_then {
                    self.validate_expression(when);
                    self.validate_expression(then);
                }
                if let Some(e) = else_branch {
                    self.validate_expression(e);
                }
            }
            Expression::ArraySubscript { base, index, .. } => {
                self.validate_expression(base);
                self.validate_expression(index);
            }
            Expression::ArraySlice { base, from, to, .. } => {
                self.validate_expression(base);
                if let Some(f) = from {
                    self.validate_expression(f);
                }
                if let Some(t) = to {
                    self.validate_expression(t);
                }
            }
            Expression::PatternComprehension { pattern, where_clause, projection, .. } => {
                let saved = self.scope.clone();
                self.bind_pattern(pattern);
                if let Some(w) = where_clause {
                    self.validate_expression(w);
                }
                self.validate_expression(projection);
                self.scope = saved;
            }
            Expression::Exists { pattern, where_clause, .. } => {
                let saved = self.scope.clone();
                self.bind_pattern(pattern);
                if let Some(w) = where_clause {
                    self.validate_expression(w);
                }
                self.scope = saved;
            }
        }
    }

    fn check_property_access(&mut self, variable: &str, property: &str, pos: Position) {
        let Some(binding) = self.scope.get(variable) else { return };
        let ok = match binding.kind {
            BindingKind::Node => self.property_known(&binding.labels, property, PropertyOwner::Node),
            BindingKind::Rel => self.property_known(&binding.rel_types, property, PropertyOwner::Rel),
            BindingKind::Scalar | BindingKind::Path => true,
        };
        if !ok {
            self.errors.push(ValidationError::InvalidPropertyAccess {
                variable: variable.to_string(),
                property: property.to_string(),
                pos,
            });
        }
    }

    fn check_comparison(&mut self, op: BinaryOp, lhs: &Expression<'_>, rhs: &Expression<'_>, pos: Position) {
        if !matches!(
            op,
            BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Gt | BinaryOp::Le | BinaryOp::Ge
        ) {
            return;
        }
        let (prop_side, other_side) = match (lhs, rhs) {
            (Expression::PropertyAccess { .. }, _) => (lhs, rhs),
            (_, Expression::PropertyAccess { .. }) => (rhs, lhs),
            _ => return,
        };
        let Expression::PropertyAccess { base, key, .. } = prop_side else { return };
        let Some(var) = base.as_bare_variable() else { return };
        let Some(binding) = self.scope.get(var) else { return };
        let declared = match binding.kind {
            BindingKind::Node => binding.labels.iter().find_map(|l| self.schema.node_property(l, key)),
            BindingKind::Rel => binding.rel_types.iter().find_map(|t| self.schema.rel_property(t, key)),
            BindingKind::Scalar | BindingKind::Path => None,
        };
        let Some(declared) = declared else { return };
        let Some(inferred) = infer_literal_type(other_side) else { return };
        if !types_compatible(declared.neo4j_type, &inferred) {
            self.errors.push(ValidationError::InvalidPropertyType {
                property: key.to_string(),
                expected: declared.neo4j_type.as_str().to_string(),
                found: inferred.describe(),
                pos,
            });
        }
    }
}

/// Literal-shape inference for the §4.4 comparison check. `null` and
/// `$parameter`s return `None`, which callers treat as "suppress the
/// check".
fn infer_literal_type(expr: &Expression<'_>) -> Option<InferredType> {
    match expr {
        Expression::Literal(Literal::Integer(_), _) => Some(InferredType::Integer),
        Expression::Literal(Literal::Float(_), _) => Some(InferredType::Float),
        Expression::Literal(Literal::String(_), _) | Expression::Literal(Literal::OwnedString(_), _) => {
            Some(InferredType::Str)
        }
        Expression::Literal(Literal::Boolean(_), _) => Some(InferredType::Boolean),
        Expression::Literal(Literal::Null, _) => None,
        Expression::Parameter(..) => None,
        Expression::List(..) => Some(InferredType::List),
        Expression::FunctionCall { name, .. } => match name.to_ascii_lowercase().as_str() {
            "point" => Some(InferredType::Point),
            "datetime" => Some(InferredType::DateTime),
            _ => None,
        },
        _ => None,
    }
}

fn types_compatible(declared: Neo4jType, inferred: &InferredType) -> bool {
    matches!(
        (declared, inferred),
        (Neo4jType::Integer, InferredType::Integer)
            | (Neo4jType::Integer, InferredType::Float)
            | (Neo4jType::Float, InferredType::Integer)
            | (Neo4jType::Float, InferredType::Float)
            | (Neo4jType::String, InferredType::Str)
            | (Neo4jType::Boolean, InferredType::Boolean)
            | (Neo4jType::List, InferredType::List)
            | (Neo4jType::Point, InferredType::Point)
            | (Neo4jType::DateTime, InferredType::DateTime)
    )
}
