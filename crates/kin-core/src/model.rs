//! Core data model for family trees.
//!
//! The tree is a directed graph where nodes are people and edges run
//! parent → child. Each person also carries `father` / `mother` references;
//! the edge set and those fields are two views of the same relation and are
//! kept in agreement by the mutation engine (see `mutation.rs`), which is
//! the only code allowed to write either of them.

use crate::config::GraphConfig;
use crate::id::PersonId;
use crate::parser::BirthDate;
use petgraph::Direction;
use petgraph::graph::NodeIndex;
use petgraph::stable_graph::StableDiGraph;
use petgraph::visit::{EdgeRef, IntoEdgeReferences};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

// ─── Gender & parent slots ───────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
}

impl Gender {
    /// The parent slot a person of this gender fills on their children.
    pub fn parent_slot(self) -> ParentSlot {
        match self {
            Gender::Male => ParentSlot::Father,
            Gender::Female => ParentSlot::Mother,
        }
    }
}

/// Which of a child's two parent references an edge corresponds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParentSlot {
    Father,
    Mother,
}

impl ParentSlot {
    /// The gender a parent in this slot must have.
    pub fn gender(self) -> Gender {
        match self {
            ParentSlot::Father => Gender::Male,
            ParentSlot::Mother => Gender::Female,
        }
    }
}

impl fmt::Display for ParentSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParentSlot::Father => f.write_str("father"),
            ParentSlot::Mother => f.write_str("mother"),
        }
    }
}

// ─── Person ──────────────────────────────────────────────────────────────

/// A single family member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: PersonId,
    pub name: String,
    pub gender: Gender,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub father: Option<PersonId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mother: Option<PersonId>,

    #[serde(default, rename = "birth", skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<BirthDate>,

    /// Age as computed by the form that collected the birth date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,

    /// Image reference shown as the node icon.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
}

impl Person {
    pub fn new(id: PersonId, name: impl Into<String>, gender: Gender) -> Self {
        Self {
            id,
            name: name.into(),
            gender,
            father: None,
            mother: None,
            birth_date: None,
            age: None,
            photo: None,
        }
    }

    #[must_use]
    pub fn with_parents(mut self, father: Option<PersonId>, mother: Option<PersonId>) -> Self {
        self.father = father;
        self.mother = mother;
        self
    }

    #[must_use]
    pub fn with_photo(mut self, photo: impl Into<String>) -> Self {
        self.photo = Some(photo.into());
        self
    }

    #[must_use]
    pub fn with_birth_date(mut self, birth_date: BirthDate) -> Self {
        self.birth_date = Some(birth_date);
        self
    }

    /// The parent reference stored in `slot`.
    pub fn parent(&self, slot: ParentSlot) -> Option<PersonId> {
        match slot {
            ParentSlot::Father => self.father,
            ParentSlot::Mother => self.mother,
        }
    }

    pub(crate) fn set_parent(&mut self, slot: ParentSlot, parent: Option<PersonId>) {
        match slot {
            ParentSlot::Father => self.father = parent,
            ParentSlot::Mother => self.mother = parent,
        }
    }

    /// The slot that currently holds `parent`, if any.
    pub fn slot_of(&self, parent: PersonId) -> Option<ParentSlot> {
        if self.father == Some(parent) {
            Some(ParentSlot::Father)
        } else if self.mother == Some(parent) {
            Some(ParentSlot::Mother)
        } else {
            None
        }
    }
}

// ─── Relation ────────────────────────────────────────────────────────────

/// A parent → child edge. Identified by the pair alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Relation {
    pub source: PersonId,
    pub target: PersonId,
}

impl Relation {
    pub fn new(source: PersonId, target: PersonId) -> Self {
        Self { source, target }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source, self.target)
    }
}

// ─── Family graph ────────────────────────────────────────────────────────

/// The complete family tree.
///
/// People live in a stable graph so indices survive removals; `id_index`
/// maps `PersonId` → `NodeIndex`. Graph edges are the relation list.
#[derive(Debug, Clone, Default)]
pub struct FamilyGraph {
    pub(crate) graph: StableDiGraph<Person, ()>,
    pub(crate) id_index: HashMap<PersonId, NodeIndex>,
    pub(crate) config: GraphConfig,
}

impl FamilyGraph {
    /// Create an empty family graph with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty family graph with explicit settings.
    #[must_use]
    pub fn with_config(config: GraphConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.id_index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id_index.is_empty()
    }

    pub fn contains(&self, id: PersonId) -> bool {
        self.id_index.contains_key(&id)
    }

    /// Look up a person by ID.
    pub fn get(&self, id: PersonId) -> Option<&Person> {
        self.id_index.get(&id).map(|idx| &self.graph[*idx])
    }

    pub(crate) fn index_of(&self, id: PersonId) -> Option<NodeIndex> {
        self.id_index.get(&id).copied()
    }

    /// All people, in storage order.
    pub fn people(&self) -> impl Iterator<Item = &Person> + '_ {
        self.graph.node_indices().map(|idx| &self.graph[idx])
    }

    /// All relations, in storage order.
    pub fn relations(&self) -> impl Iterator<Item = Relation> + '_ {
        self.graph.edge_references().map(|edge| {
            Relation::new(self.graph[edge.source()].id, self.graph[edge.target()].id)
        })
    }

    pub fn relation_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn has_relation(&self, source: PersonId, target: PersonId) -> bool {
        match (self.index_of(source), self.index_of(target)) {
            (Some(s), Some(t)) => self.graph.find_edge(s, t).is_some(),
            _ => false,
        }
    }

    /// Children of a person, in storage order.
    pub fn children(&self, id: PersonId) -> Vec<PersonId> {
        let Some(idx) = self.index_of(id) else {
            return Vec::new();
        };
        let mut children: Vec<NodeIndex> = self
            .graph
            .neighbors_directed(idx, Direction::Outgoing)
            .collect();
        children.sort();
        children.into_iter().map(|c| self.graph[c].id).collect()
    }

    /// People who may fill `slot` on some child: males for fathers,
    /// females for mothers. Forms use this to populate their pickers.
    pub fn candidates(&self, slot: ParentSlot) -> impl Iterator<Item = &Person> + '_ {
        self.people().filter(move |p| p.gender == slot.gender())
    }

    /// Check if `ancestor` is a parent/grandparent/etc. of `descendant`.
    pub fn is_ancestor_of(&self, ancestor: PersonId, descendant: PersonId) -> bool {
        if ancestor == descendant {
            return false;
        }
        match (self.index_of(ancestor), self.index_of(descendant)) {
            (Some(a), Some(d)) => petgraph::algo::has_path_connecting(&self.graph, a, d, None),
            _ => false,
        }
    }
}
