//! Interchange shape for seeding and exporting a family tree.
//!
//! `FamilyData` mirrors the node/edge lists a canvas host works with. Loading
//! goes through the mutation engine, so an accepted `FamilyData` always
//! yields a consistent graph.

use crate::config::GraphConfig;
use crate::error::FamilyError;
use crate::model::{FamilyGraph, Person, Relation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyData {
    pub nodes: Vec<Person>,
    #[serde(default)]
    pub edges: Vec<Relation>,
}

impl FamilyData {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl FamilyGraph {
    /// Build a graph from node and edge lists.
    ///
    /// Nodes may name parents that appear later in the list. Edges that the
    /// node fields already imply are accepted; an edge into an empty slot
    /// fills it; an edge that contradicts a filled slot is rejected with
    /// `InconsistentData`.
    pub fn from_data(data: FamilyData, config: GraphConfig) -> Result<Self, FamilyError> {
        let mut graph = FamilyGraph::with_config(config);

        for person in &data.nodes {
            let bare = person.clone().with_parents(None, None);
            graph.add_person(bare, None, None)?;
        }
        for person in data.nodes {
            if person.father.is_some() || person.mother.is_some() {
                graph.edit_person(person)?;
            }
        }

        for edge in data.edges {
            if graph.has_relation(edge.source, edge.target) {
                continue;
            }
            let conflict = FamilyError::InconsistentData {
                parent: edge.source,
                child: edge.target,
            };
            let slot = graph
                .get(edge.source)
                .ok_or(FamilyError::UnknownParent(edge.source))?
                .gender
                .parent_slot();
            let occupied = graph
                .get(edge.target)
                .ok_or(FamilyError::UnknownPerson(edge.target))?
                .parent(slot)
                .is_some();
            if occupied {
                return Err(conflict);
            }
            graph.add_relation(edge.source, edge.target)?;
        }

        log::debug!(
            "loaded family graph: {} people, {} relations",
            graph.len(),
            graph.relation_count()
        );
        Ok(graph)
    }

    /// Export people and relations in storage order.
    #[must_use]
    pub fn to_data(&self) -> FamilyData {
        FamilyData {
            nodes: self.people().cloned().collect(),
            edges: self.relations().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::PersonId;
    use crate::lint::lint_graph;

    fn id(s: &str) -> PersonId {
        PersonId::intern(s)
    }

    #[test]
    fn forward_parent_references_resolve() {
        let json = r#"{
            "nodes": [
                { "id": "fd_kid", "name": "Kid", "gender": "F", "father": "fd_dad" },
                { "id": "fd_dad", "name": "Dad", "gender": "M" }
            ],
            "edges": [ { "source": "fd_dad", "target": "fd_kid" } ]
        }"#;
        let graph = FamilyGraph::from_data(FamilyData::from_json(json).unwrap(), GraphConfig::default())
            .unwrap();

        assert_eq!(graph.get(id("fd_kid")).unwrap().father, Some(id("fd_dad")));
        assert_eq!(graph.relation_count(), 1);
        assert!(lint_graph(&graph).is_empty());
    }

    #[test]
    fn edge_only_relation_fills_empty_slot() {
        let json = r#"{
            "nodes": [
                { "id": "fe_mum", "name": "Mum", "gender": "F" },
                { "id": "fe_son", "name": "Son", "gender": "M" }
            ],
            "edges": [ { "source": "fe_mum", "target": "fe_son" } ]
        }"#;
        let graph = FamilyGraph::from_data(FamilyData::from_json(json).unwrap(), GraphConfig::default())
            .unwrap();
        assert_eq!(graph.get(id("fe_son")).unwrap().mother, Some(id("fe_mum")));
    }

    #[test]
    fn contradicting_edge_is_rejected() {
        let json = r#"{
            "nodes": [
                { "id": "fc_d1", "name": "D1", "gender": "M" },
                { "id": "fc_d2", "name": "D2", "gender": "M" },
                { "id": "fc_k", "name": "K", "gender": "M", "father": "fc_d1" }
            ],
            "edges": [ { "source": "fc_d2", "target": "fc_k" } ]
        }"#;
        let result =
            FamilyGraph::from_data(FamilyData::from_json(json).unwrap(), GraphConfig::default());
        assert_eq!(
            result.err(),
            Some(FamilyError::InconsistentData {
                parent: id("fc_d2"),
                child: id("fc_k"),
            })
        );
    }

    #[test]
    fn duplicate_nodes_are_rejected() {
        let json = r#"{ "nodes": [
            { "id": "fdup", "name": "A", "gender": "M" },
            { "id": "fdup", "name": "B", "gender": "F" }
        ] }"#;
        let result =
            FamilyGraph::from_data(FamilyData::from_json(json).unwrap(), GraphConfig::default());
        assert_eq!(result.err(), Some(FamilyError::DuplicateId(id("fdup"))));
    }

    #[test]
    fn export_reloads_to_same_data() {
        let json = r#"{
            "nodes": [
                { "id": "fx_dad", "name": "Dad", "gender": "M", "birth": "1952-08-20" },
                { "id": "fx_kid", "name": "Kid", "gender": "M", "father": "fx_dad", "photo": "/kid.png" }
            ]
        }"#;
        let graph = FamilyGraph::from_data(FamilyData::from_json(json).unwrap(), GraphConfig::default())
            .unwrap();
        let exported = graph.to_data();
        let reloaded = FamilyGraph::from_data(exported.clone(), GraphConfig::default()).unwrap();
        assert_eq!(reloaded.to_data(), exported);
        assert_eq!(exported.edges, vec![Relation::new(id("fx_dad"), id("fx_kid"))]);
    }
}
