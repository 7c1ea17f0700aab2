//! The mutation engine: the only code that writes people or relations.
//!
//! Each operation validates everything up front and only then touches the
//! graph, so an `Err` always means "nothing changed". After every successful
//! call, each person's `father` / `mother` fields match the incoming edges
//! of their node exactly.

use crate::config::RelationPolicy;
use crate::error::FamilyError;
use crate::id::PersonId;
use crate::model::{FamilyGraph, ParentSlot, Person, Relation};
use petgraph::Direction;
use petgraph::algo::has_path_connecting;
use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;

/// A mutation request, as produced by tools and form collaborators.
#[derive(Debug, Clone, PartialEq)]
pub enum FamilyMutation {
    AddPerson {
        person: Box<Person>,
        father: Option<PersonId>,
        mother: Option<PersonId>,
    },
    RemovePerson {
        id: PersonId,
    },
    EditPerson {
        person: Box<Person>,
    },
    AddRelation {
        source: PersonId,
        target: PersonId,
    },
    RemoveRelation {
        source: PersonId,
        target: PersonId,
    },
}

/// What a successful mutation did.
#[derive(Debug, Clone, PartialEq)]
pub enum MutationEffect {
    PersonAdded(PersonId),
    PersonRemoved(Person),
    /// Carries the person as stored before the edit.
    PersonEdited(Person),
    RelationAdded {
        relation: Relation,
        /// The relation unlinked to make room, under `RelationPolicy::Overwrite`.
        replaced: Option<Relation>,
    },
    RelationRemoved(Relation),
}

impl FamilyGraph {
    /// Apply a mutation in place.
    pub fn apply(&mut self, mutation: FamilyMutation) -> Result<MutationEffect, FamilyError> {
        match mutation {
            FamilyMutation::AddPerson {
                person,
                father,
                mother,
            } => self
                .add_person(*person, father, mother)
                .map(MutationEffect::PersonAdded),
            FamilyMutation::RemovePerson { id } => {
                self.remove_person(id).map(MutationEffect::PersonRemoved)
            }
            FamilyMutation::EditPerson { person } => {
                self.edit_person(*person).map(MutationEffect::PersonEdited)
            }
            FamilyMutation::AddRelation { source, target } => {
                let replaced = self.add_relation(source, target)?;
                Ok(MutationEffect::RelationAdded {
                    relation: Relation::new(source, target),
                    replaced,
                })
            }
            FamilyMutation::RemoveRelation { source, target } => {
                self.remove_relation(source, target)?;
                Ok(MutationEffect::RelationRemoved(Relation::new(source, target)))
            }
        }
    }

    /// Apply a mutation to a copy, leaving `self` untouched.
    pub fn applied(&self, mutation: FamilyMutation) -> Result<FamilyGraph, FamilyError> {
        let mut next = self.clone();
        next.apply(mutation)?;
        Ok(next)
    }

    // ─── People ──────────────────────────────────────────────────────────

    /// Insert a new person, linking the given parents.
    ///
    /// A `None` argument falls back to the matching field already set on
    /// `person`, so forms may pass parents either way.
    pub fn add_person(
        &mut self,
        mut person: Person,
        father: Option<PersonId>,
        mother: Option<PersonId>,
    ) -> Result<PersonId, FamilyError> {
        let id = person.id;
        if self.contains(id) {
            return Err(FamilyError::DuplicateId(id));
        }
        let father = father.or(person.father);
        let mother = mother.or(person.mother);
        let father_idx = self.check_parent(id, father, ParentSlot::Father)?;
        let mother_idx = self.check_parent(id, mother, ParentSlot::Mother)?;

        person.father = father;
        person.mother = mother;
        let idx = self.graph.add_node(person);
        self.id_index.insert(id, idx);
        for parent in [father_idx, mother_idx].into_iter().flatten() {
            self.graph.add_edge(parent, idx, ());
        }

        log::debug!("added person {id} (father: {father:?}, mother: {mother:?})");
        Ok(id)
    }

    /// Remove a person and every relation touching them. Children lose the
    /// corresponding parent reference.
    pub fn remove_person(&mut self, id: PersonId) -> Result<Person, FamilyError> {
        let idx = self.require(id)?;
        let children: Vec<NodeIndex> = self
            .graph
            .neighbors_directed(idx, Direction::Outgoing)
            .collect();

        let removed = self
            .graph
            .remove_node(idx)
            .ok_or(FamilyError::UnknownPerson(id))?;
        self.id_index.remove(&id);

        for child_idx in children {
            let child = &mut self.graph[child_idx];
            if let Some(slot) = child.slot_of(id) {
                child.set_parent(slot, None);
            }
        }

        log::debug!("removed person {id}");
        Ok(removed)
    }

    /// Replace a person's stored fields and rebuild their incoming relations
    /// from the new `father` / `mother`. Returns the previous value.
    ///
    /// Edges that are still implied are left in place, so an edit that does
    /// not change the parents leaves the relation list exactly as it was.
    pub fn edit_person(&mut self, updated: Person) -> Result<Person, FamilyError> {
        let id = updated.id;
        let idx = self.require(id)?;
        let father_idx = self.check_parent(id, updated.father, ParentSlot::Father)?;
        let mother_idx = self.check_parent(id, updated.mother, ParentSlot::Mother)?;

        for (parent, parent_idx) in [(updated.father, father_idx), (updated.mother, mother_idx)] {
            if let (Some(parent), Some(parent_idx)) = (parent, parent_idx)
                && has_path_connecting(&self.graph, idx, parent_idx, None)
            {
                return Err(FamilyError::Cycle { parent, child: id });
            }
        }

        // A gender change must not strand this person in a slot on a child.
        if updated.gender != self.graph[idx].gender {
            for child_idx in self.graph.neighbors_directed(idx, Direction::Outgoing) {
                if let Some(slot) = self.graph[child_idx].slot_of(id)
                    && slot.gender() != updated.gender
                {
                    return Err(FamilyError::GenderMismatch { parent: id, slot });
                }
            }
        }

        let previous = std::mem::replace(&mut self.graph[idx], updated);

        let wanted = [father_idx, mother_idx];
        let stale: Vec<EdgeIndex> = self
            .graph
            .edges_directed(idx, Direction::Incoming)
            .filter(|edge| !wanted.contains(&Some(edge.source())))
            .map(|edge| edge.id())
            .collect();
        for edge in stale {
            self.graph.remove_edge(edge);
        }
        for parent_idx in wanted.into_iter().flatten() {
            if self.graph.find_edge(parent_idx, idx).is_none() {
                self.graph.add_edge(parent_idx, idx, ());
            }
        }

        log::debug!("edited person {id}");
        Ok(previous)
    }

    // ─── Relations ───────────────────────────────────────────────────────

    /// Make `source` a parent of `target`. The slot is picked from the
    /// source's gender. Returns the relation that was displaced, if any.
    pub fn add_relation(
        &mut self,
        source: PersonId,
        target: PersonId,
    ) -> Result<Option<Relation>, FamilyError> {
        let source_idx = self.require(source)?;
        let target_idx = self.require(target)?;
        if source == target {
            return Err(FamilyError::SelfRelation(source));
        }
        if has_path_connecting(&self.graph, target_idx, source_idx, None) {
            return Err(FamilyError::Cycle {
                parent: source,
                child: target,
            });
        }

        let slot = self.graph[source_idx].gender.parent_slot();
        let mut replaced = None;
        match self.graph[target_idx].parent(slot) {
            Some(existing) if existing == source => {
                log::trace!("relation {source} -> {target} already present");
                return Ok(None);
            }
            Some(existing) => match self.config.relation_policy {
                RelationPolicy::Reject => {
                    return Err(FamilyError::SlotOccupied {
                        child: target,
                        slot,
                        existing,
                    });
                }
                RelationPolicy::Overwrite => {
                    if let Some(existing_idx) = self.index_of(existing)
                        && let Some(edge) = self.graph.find_edge(existing_idx, target_idx)
                    {
                        self.graph.remove_edge(edge);
                    }
                    replaced = Some(Relation::new(existing, target));
                }
            },
            None => {}
        }

        self.graph[target_idx].set_parent(slot, Some(source));
        self.graph.add_edge(source_idx, target_idx, ());

        log::debug!("linked {source} as {slot} of {target} (replaced: {replaced:?})");
        Ok(replaced)
    }

    /// Unlink `source` from `target`. The cleared slot is whichever of the
    /// target's references currently names `source`.
    pub fn remove_relation(&mut self, source: PersonId, target: PersonId) -> Result<(), FamilyError> {
        let missing = FamilyError::UnknownRelation {
            parent: source,
            child: target,
        };
        let (Some(source_idx), Some(target_idx)) = (self.index_of(source), self.index_of(target))
        else {
            return Err(missing);
        };
        let edge = self.graph.find_edge(source_idx, target_idx).ok_or(missing)?;

        self.graph.remove_edge(edge);
        let child = &mut self.graph[target_idx];
        if let Some(slot) = child.slot_of(source) {
            child.set_parent(slot, None);
        }

        log::debug!("unlinked {source} -> {target}");
        Ok(())
    }

    // ─── Validation helpers ──────────────────────────────────────────────

    fn require(&self, id: PersonId) -> Result<NodeIndex, FamilyError> {
        self.index_of(id).ok_or(FamilyError::UnknownPerson(id))
    }

    /// Check that `parent` may fill `slot` on `child`.
    fn check_parent(
        &self,
        child: PersonId,
        parent: Option<PersonId>,
        slot: ParentSlot,
    ) -> Result<Option<NodeIndex>, FamilyError> {
        let Some(parent) = parent else {
            return Ok(None);
        };
        if parent == child {
            return Err(FamilyError::SelfRelation(child));
        }
        let idx = self
            .index_of(parent)
            .ok_or(FamilyError::UnknownParent(parent))?;
        if self.graph[idx].gender != slot.gender() {
            return Err(FamilyError::GenderMismatch { parent, slot });
        }
        Ok(Some(idx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GraphConfig;
    use crate::lint::lint_graph;
    use crate::model::Gender;
    use pretty_assertions::assert_eq;

    fn id(s: &str) -> PersonId {
        PersonId::intern(s)
    }

    fn male(s: &str) -> Person {
        Person::new(id(s), s.to_uppercase(), Gender::Male)
    }

    fn female(s: &str) -> Person {
        Person::new(id(s), s.to_uppercase(), Gender::Female)
    }

    fn sorted_relations(graph: &FamilyGraph) -> Vec<(String, String)> {
        let mut out: Vec<(String, String)> = graph
            .relations()
            .map(|r| (r.source.to_string(), r.target.to_string()))
            .collect();
        out.sort();
        out
    }

    fn assert_consistent(graph: &FamilyGraph) {
        let diags = lint_graph(graph);
        assert!(diags.is_empty(), "invariant violations: {diags:?}");
    }

    /// a (M) + b (F) with no relations.
    fn couple() -> FamilyGraph {
        let mut graph = FamilyGraph::new();
        graph.add_person(male("mu_a"), None, None).unwrap();
        graph.add_person(female("mu_b"), None, None).unwrap();
        graph
    }

    #[test]
    fn add_person_links_parents() {
        let mut graph = couple();
        graph
            .add_person(male("mu_c"), Some(id("mu_a")), Some(id("mu_b")))
            .unwrap();

        let c = graph.get(id("mu_c")).unwrap();
        assert_eq!(c.father, Some(id("mu_a")));
        assert_eq!(c.mother, Some(id("mu_b")));
        assert_eq!(
            sorted_relations(&graph),
            vec![
                ("mu_a".to_string(), "mu_c".to_string()),
                ("mu_b".to_string(), "mu_c".to_string()),
            ]
        );
        assert_consistent(&graph);
    }

    #[test]
    fn add_person_uses_fields_when_arguments_absent() {
        let mut graph = couple();
        let kid = female("mu_kid").with_parents(Some(id("mu_a")), None);
        graph.add_person(kid, None, None).unwrap();
        assert!(graph.has_relation(id("mu_a"), id("mu_kid")));
        assert_consistent(&graph);
    }

    #[test]
    fn add_person_rejects_duplicates_and_unknown_parents() {
        let mut graph = couple();
        assert_eq!(
            graph.add_person(male("mu_a"), None, None),
            Err(FamilyError::DuplicateId(id("mu_a")))
        );
        assert_eq!(
            graph.add_person(male("mu_x"), Some(id("mu_ghost")), None),
            Err(FamilyError::UnknownParent(id("mu_ghost")))
        );
        assert!(!graph.contains(id("mu_x")));
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn add_person_rejects_wrong_gender_parent() {
        let mut graph = couple();
        assert_eq!(
            graph.add_person(male("mu_y"), Some(id("mu_b")), None),
            Err(FamilyError::GenderMismatch {
                parent: id("mu_b"),
                slot: ParentSlot::Father,
            })
        );
        assert_eq!(
            graph.add_person(male("mu_y"), None, Some(id("mu_y"))),
            Err(FamilyError::SelfRelation(id("mu_y")))
        );
    }

    #[test]
    fn add_then_remove_relation_scenario() {
        let mut graph = couple();

        // Slot comes from the source's gender: a is male, so b gets a father.
        assert_eq!(graph.add_relation(id("mu_a"), id("mu_b")), Ok(None));
        assert_eq!(graph.get(id("mu_b")).unwrap().father, Some(id("mu_a")));
        assert_eq!(
            sorted_relations(&graph),
            vec![("mu_a".to_string(), "mu_b".to_string())]
        );

        graph.remove_relation(id("mu_a"), id("mu_b")).unwrap();
        assert_eq!(graph.get(id("mu_b")).unwrap().father, None);
        assert_eq!(graph.relation_count(), 0);
        assert_eq!(graph.len(), 2);
        assert_consistent(&graph);
    }

    #[test]
    fn remove_person_cascades_scenario() {
        let mut graph = couple();
        graph
            .add_person(male("mu_c2"), Some(id("mu_a")), None)
            .unwrap();

        let removed = graph.remove_person(id("mu_a")).unwrap();
        assert_eq!(removed.id, id("mu_a"));

        assert_eq!(graph.get(id("mu_c2")).unwrap().father, None);
        assert_eq!(graph.relation_count(), 0);
        let mut ids: Vec<&str> = graph.people().map(|p| p.id.as_str()).collect();
        ids.sort();
        assert_eq!(ids, vec!["mu_b", "mu_c2"]);

        // Second removal reports the id as gone.
        assert_eq!(
            graph.remove_person(id("mu_a")),
            Err(FamilyError::UnknownPerson(id("mu_a")))
        );
        assert_consistent(&graph);
    }

    #[test]
    fn remove_person_clears_both_roles() {
        let mut graph = couple();
        graph
            .add_person(female("mu_mid"), Some(id("mu_a")), Some(id("mu_b")))
            .unwrap();
        graph
            .add_person(male("mu_low"), None, Some(id("mu_mid")))
            .unwrap();

        graph.remove_person(id("mu_mid")).unwrap();

        assert_eq!(graph.get(id("mu_low")).unwrap().mother, None);
        for relation in graph.relations() {
            assert_ne!(relation.source, id("mu_mid"));
            assert_ne!(relation.target, id("mu_mid"));
        }
        assert_consistent(&graph);
    }

    #[test]
    fn add_relation_rejects_cycles_without_changes() {
        let mut graph = couple();
        graph
            .add_person(male("mu_son"), Some(id("mu_a")), None)
            .unwrap();
        graph
            .add_person(male("mu_grandson"), Some(id("mu_son")), None)
            .unwrap();
        let before = graph.to_data();

        assert_eq!(
            graph.add_relation(id("mu_grandson"), id("mu_a")),
            Err(FamilyError::Cycle {
                parent: id("mu_grandson"),
                child: id("mu_a"),
            })
        );
        assert_eq!(graph.to_data(), before);
    }

    #[test]
    fn add_relation_rejects_self_and_unknown() {
        let mut graph = couple();
        assert_eq!(
            graph.add_relation(id("mu_a"), id("mu_a")),
            Err(FamilyError::SelfRelation(id("mu_a")))
        );
        assert_eq!(
            graph.add_relation(id("mu_a"), id("mu_nobody")),
            Err(FamilyError::UnknownPerson(id("mu_nobody")))
        );
    }

    #[test]
    fn add_relation_overwrites_occupied_slot() {
        let mut graph = couple();
        graph.add_person(male("mu_dad2"), None, None).unwrap();
        graph
            .add_person(female("mu_girl"), Some(id("mu_a")), None)
            .unwrap();

        let replaced = graph.add_relation(id("mu_dad2"), id("mu_girl")).unwrap();

        assert_eq!(replaced, Some(Relation::new(id("mu_a"), id("mu_girl"))));
        assert_eq!(graph.get(id("mu_girl")).unwrap().father, Some(id("mu_dad2")));
        assert!(!graph.has_relation(id("mu_a"), id("mu_girl")));
        assert_eq!(graph.relation_count(), 1);
        assert_consistent(&graph);
    }

    #[test]
    fn add_relation_reject_policy_keeps_existing_parent() {
        let mut graph = FamilyGraph::with_config(GraphConfig {
            relation_policy: RelationPolicy::Reject,
        });
        graph.add_person(male("mu_r1"), None, None).unwrap();
        graph.add_person(male("mu_r2"), None, None).unwrap();
        graph
            .add_person(male("mu_rk"), Some(id("mu_r1")), None)
            .unwrap();

        assert_eq!(
            graph.add_relation(id("mu_r2"), id("mu_rk")),
            Err(FamilyError::SlotOccupied {
                child: id("mu_rk"),
                slot: ParentSlot::Father,
                existing: id("mu_r1"),
            })
        );
        assert_eq!(graph.get(id("mu_rk")).unwrap().father, Some(id("mu_r1")));
    }

    #[test]
    fn add_relation_twice_does_not_duplicate() {
        let mut graph = couple();
        graph.add_relation(id("mu_b"), id("mu_a")).unwrap();
        graph.add_relation(id("mu_b"), id("mu_a")).unwrap();
        assert_eq!(graph.relation_count(), 1);
        assert_eq!(graph.get(id("mu_a")).unwrap().mother, Some(id("mu_b")));
    }

    #[test]
    fn remove_relation_unknown_edge_is_rejected() {
        let mut graph = couple();
        assert_eq!(
            graph.remove_relation(id("mu_a"), id("mu_b")),
            Err(FamilyError::UnknownRelation {
                parent: id("mu_a"),
                child: id("mu_b"),
            })
        );
    }

    #[test]
    fn edit_person_rebuilds_parent_edges() {
        let mut graph = couple();
        graph.add_person(male("mu_a2"), None, None).unwrap();
        graph
            .add_person(male("mu_e"), Some(id("mu_a")), Some(id("mu_b")))
            .unwrap();

        let mut updated = graph.get(id("mu_e")).unwrap().clone();
        updated.father = Some(id("mu_a2"));
        updated.mother = None;
        updated.name = "Renamed".into();
        let previous = graph.edit_person(updated).unwrap();

        assert_eq!(previous.father, Some(id("mu_a")));
        assert_eq!(graph.get(id("mu_e")).unwrap().name, "Renamed");
        assert_eq!(
            sorted_relations(&graph),
            vec![("mu_a2".to_string(), "mu_e".to_string())]
        );
        assert_consistent(&graph);
    }

    #[test]
    fn edit_person_identical_is_a_no_op_on_relations() {
        let mut graph = couple();
        graph
            .add_person(male("mu_same"), Some(id("mu_a")), Some(id("mu_b")))
            .unwrap();
        graph.add_person(female("mu_other"), Some(id("mu_a")), None).unwrap();
        let before: Vec<Relation> = graph.relations().collect();

        let same = graph.get(id("mu_same")).unwrap().clone();
        graph.edit_person(same).unwrap();

        let after: Vec<Relation> = graph.relations().collect();
        assert_eq!(after, before);
    }

    #[test]
    fn edit_person_rejects_descendant_as_parent() {
        let mut graph = couple();
        graph
            .add_person(male("mu_kid3"), Some(id("mu_a")), None)
            .unwrap();
        let before = graph.to_data();

        let mut updated = graph.get(id("mu_a")).unwrap().clone();
        updated.father = Some(id("mu_kid3"));
        assert_eq!(
            graph.edit_person(updated),
            Err(FamilyError::Cycle {
                parent: id("mu_kid3"),
                child: id("mu_a"),
            })
        );
        assert_eq!(graph.to_data(), before);
    }

    #[test]
    fn edit_person_rejects_gender_flip_of_a_parent() {
        let mut graph = couple();
        graph
            .add_person(male("mu_kid4"), Some(id("mu_a")), None)
            .unwrap();

        let mut flipped = graph.get(id("mu_a")).unwrap().clone();
        flipped.gender = Gender::Female;
        assert_eq!(
            graph.edit_person(flipped),
            Err(FamilyError::GenderMismatch {
                parent: id("mu_a"),
                slot: ParentSlot::Father,
            })
        );

        // Without children the flip is fine.
        let mut flipped_b = graph.get(id("mu_b")).unwrap().clone();
        flipped_b.gender = Gender::Male;
        assert!(graph.edit_person(flipped_b).is_ok());
    }

    #[test]
    fn applied_leaves_original_untouched() {
        let graph = couple();
        let next = graph
            .applied(FamilyMutation::AddRelation {
                source: id("mu_a"),
                target: id("mu_b"),
            })
            .unwrap();
        assert_eq!(graph.relation_count(), 0);
        assert_eq!(next.relation_count(), 1);

        let err = graph.applied(FamilyMutation::RemovePerson { id: id("mu_zz") });
        assert_eq!(err.err(), Some(FamilyError::UnknownPerson(id("mu_zz"))));
    }

    #[test]
    fn mutation_sequence_preserves_invariant() {
        let mut graph = FamilyGraph::new();
        let steps = vec![
            FamilyMutation::AddPerson {
                person: Box::new(male("seq_g1")),
                father: None,
                mother: None,
            },
            FamilyMutation::AddPerson {
                person: Box::new(female("seq_g2")),
                father: None,
                mother: None,
            },
            FamilyMutation::AddPerson {
                person: Box::new(male("seq_p")),
                father: Some(id("seq_g1")),
                mother: Some(id("seq_g2")),
            },
            FamilyMutation::AddPerson {
                person: Box::new(female("seq_q")),
                father: None,
                mother: None,
            },
            FamilyMutation::AddPerson {
                person: Box::new(male("seq_c")),
                father: None,
                mother: None,
            },
            FamilyMutation::AddRelation {
                source: id("seq_p"),
                target: id("seq_c"),
            },
            FamilyMutation::AddRelation {
                source: id("seq_q"),
                target: id("seq_c"),
            },
            FamilyMutation::AddRelation {
                source: id("seq_g1"),
                target: id("seq_c"),
            },
            FamilyMutation::RemoveRelation {
                source: id("seq_g2"),
                target: id("seq_p"),
            },
            FamilyMutation::EditPerson {
                person: Box::new(female("seq_q").with_parents(Some(id("seq_g1")), None)),
            },
            FamilyMutation::RemovePerson { id: id("seq_g1") },
        ];

        for step in steps {
            graph.apply(step.clone()).unwrap_or_else(|e| panic!("{step:?}: {e}"));
            assert_consistent(&graph);
        }
        assert_eq!(graph.len(), 4);
        assert_eq!(graph.get(id("seq_c")).unwrap().father, None);
        assert_eq!(graph.get(id("seq_c")).unwrap().mother, Some(id("seq_q")));
    }
}
