//! Editing session: the family graph, the active tool, the selection, and
//! the canvas they are drawn on.
//!
//! Every change flows through the same path: a tool or a form produces a
//! `FamilyMutation`, the graph validates and applies it, and only then does
//! the canvas receive a complete snapshot. A rejected mutation never reaches
//! the canvas half-applied.

use crate::adapter::{CanvasAdapter, ProvisionalEdge, RenderSnapshot};
use crate::config::EditorConfig;
use crate::input::InputEvent;
use crate::tools::{AddRelationTool, RemoveRelationTool, SelectTool, Tool, ToolKind};
use kin_core::data::FamilyData;
use kin_core::error::FamilyError;
use kin_core::id::PersonId;
use kin_core::model::{FamilyGraph, Person, Relation};
use kin_core::mutation::{FamilyMutation, MutationEffect};

/// Owns the authoritative graph and keeps the canvas in sync with it.
pub struct EditorSession<A: CanvasAdapter> {
    graph: FamilyGraph,
    adapter: A,
    config: EditorConfig,
    active_tool: ToolKind,
    select_tool: SelectTool,
    add_relation_tool: AddRelationTool,
    remove_relation_tool: RemoveRelationTool,
}

impl<A: CanvasAdapter> EditorSession<A> {
    /// Wrap an existing graph and draw it once.
    pub fn new(graph: FamilyGraph, adapter: A, config: EditorConfig) -> Self {
        let mut session = Self {
            graph,
            adapter,
            config,
            active_tool: ToolKind::Select,
            select_tool: SelectTool::new(),
            add_relation_tool: AddRelationTool::new(),
            remove_relation_tool: RemoveRelationTool::new(),
        };
        session.render();
        session
    }

    /// Start from an empty tree.
    pub fn empty(adapter: A, config: EditorConfig) -> Self {
        let graph = FamilyGraph::with_config(config.graph.clone());
        Self::new(graph, adapter, config)
    }

    /// Seed the session from interchange data.
    pub fn from_data(data: FamilyData, adapter: A, config: EditorConfig) -> Result<Self, FamilyError> {
        let graph = FamilyGraph::from_data(data, config.graph.clone())?;
        Ok(Self::new(graph, adapter, config))
    }

    /// Swap in a different tree, dropping selection and any gesture.
    pub fn replace_graph(&mut self, graph: FamilyGraph) {
        self.graph = graph;
        self.select_tool.reset();
        self.add_relation_tool.reset();
        self.remove_relation_tool.reset();
        self.render();
    }

    pub fn graph(&self) -> &FamilyGraph {
        &self.graph
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    pub fn adapter_mut(&mut self) -> &mut A {
        &mut self.adapter
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn active_tool(&self) -> ToolKind {
        self.active_tool
    }

    /// The current edit/delete target.
    pub fn selected(&self) -> Option<PersonId> {
        self.select_tool.selected
    }

    /// The stored record of the current target.
    pub fn selected_person(&self) -> Option<&Person> {
        self.selected().and_then(|id| self.graph.get(id))
    }

    /// The edge being drawn by the active tool, if any.
    pub fn provisional(&self) -> Option<ProvisionalEdge> {
        match self.active_tool {
            ToolKind::Select => self.select_tool.provisional(),
            ToolKind::AddRelation => self.add_relation_tool.provisional(),
            ToolKind::RemoveRelation => self.remove_relation_tool.provisional(),
        }
    }

    /// What the canvas should currently show.
    pub fn snapshot(&self) -> RenderSnapshot {
        let mut snapshot =
            RenderSnapshot::of_graph(&self.graph, self.config.default_photo.as_deref());
        snapshot.provisional = self.provisional();
        snapshot.selected = self.selected();
        snapshot
    }

    // ─── Mutations ───────────────────────────────────────────────────────

    pub fn add_person(
        &mut self,
        person: Person,
        father: Option<PersonId>,
        mother: Option<PersonId>,
    ) -> Result<PersonId, FamilyError> {
        let id = self
            .graph
            .add_person(person, father, mother)
            .inspect_err(log_rejected)?;
        self.render();
        Ok(id)
    }

    pub fn remove_person(&mut self, id: PersonId) -> Result<Person, FamilyError> {
        let removed = self.graph.remove_person(id).inspect_err(log_rejected)?;
        // The edit/delete target is consumed by any removal.
        self.select_tool.clear();
        if self.add_relation_tool.pending_source() == Some(id) {
            self.add_relation_tool.reset();
        }
        self.render();
        Ok(removed)
    }

    /// Replace a person's record. Returns the previous record.
    ///
    /// A photo change is pushed through `update_node_icon`; if nothing else
    /// changed, no full render follows.
    pub fn edit_person(&mut self, updated: Person) -> Result<Person, FamilyError> {
        let previous = self.graph.edit_person(updated).inspect_err(log_rejected)?;
        let Some(current) = self.graph.get(previous.id) else {
            return Ok(previous);
        };

        let photo_changed = current.photo != previous.photo;
        let only_photo_changed = photo_changed && {
            let mut photo_swapped = previous.clone();
            photo_swapped.photo.clone_from(&current.photo);
            photo_swapped == *current
        };

        if photo_changed {
            let image = current
                .photo
                .as_deref()
                .or(self.config.default_photo.as_deref());
            log::debug!("icon update for {}", previous.id);
            self.adapter.update_node_icon(previous.id, image);
        }
        if !only_photo_changed {
            self.render();
        }
        Ok(previous)
    }

    /// Change only the photo of `id`.
    pub fn set_photo(&mut self, id: PersonId, photo: Option<String>) -> Result<Person, FamilyError> {
        let mut updated = self
            .graph
            .get(id)
            .cloned()
            .ok_or(FamilyError::UnknownPerson(id))?;
        updated.photo = photo;
        self.edit_person(updated)
    }

    /// Link `source` as a parent of `target`. Returns the relation it
    /// replaced, if any.
    pub fn add_relation(
        &mut self,
        source: PersonId,
        target: PersonId,
    ) -> Result<Option<Relation>, FamilyError> {
        let replaced = self
            .graph
            .add_relation(source, target)
            .inspect_err(log_rejected)?;
        self.render();
        Ok(replaced)
    }

    pub fn remove_relation(&mut self, source: PersonId, target: PersonId) -> Result<(), FamilyError> {
        self.graph
            .remove_relation(source, target)
            .inspect_err(log_rejected)?;
        self.render();
        Ok(())
    }

    /// Apply any mutation through the session, with the same canvas
    /// side effects as the dedicated methods.
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

    // ─── Tools ───────────────────────────────────────────────────────────

    /// Make `kind` the active tool. (Re)enabling any mode starts from a
    /// clean gesture, even when `kind` is already active.
    pub fn set_tool(&mut self, kind: ToolKind) {
        let before = self.provisional();
        self.add_relation_tool.reset();
        self.remove_relation_tool.reset();
        if kind != self.active_tool {
            log::debug!("tool {:?} -> {:?}", self.active_tool, kind);
            self.active_tool = kind;
        }
        if self.provisional() != before {
            self.render();
        }
    }

    /// Switch to `kind`, or back to Select if `kind` is already active.
    pub fn toggle_tool(&mut self, kind: ToolKind) -> ToolKind {
        let next = if self.active_tool == kind {
            ToolKind::Select
        } else {
            kind
        };
        self.set_tool(next);
        next
    }

    /// Feed one pointer event through the selection tracker and the active
    /// tool, committing whatever mutation the tool completes.
    pub fn handle_event(
        &mut self,
        event: &InputEvent,
    ) -> Result<Option<MutationEffect>, FamilyError> {
        let before = (self.provisional(), self.selected());

        // Selection follows node clicks in every mode.
        self.select_tool.handle(event);

        let mutation = match self.active_tool {
            ToolKind::Select => None,
            ToolKind::AddRelation => self.add_relation_tool.handle(event),
            ToolKind::RemoveRelation => self.remove_relation_tool.handle(event),
        };

        match mutation {
            Some(mutation) => match self.apply(mutation) {
                Ok(effect) => Ok(Some(effect)),
                Err(err) => {
                    // The gesture is already back to idle; redraw without
                    // its provisional edge.
                    self.render();
                    Err(err)
                }
            },
            None => {
                if (self.provisional(), self.selected()) != before {
                    self.render();
                }
                Ok(None)
            }
        }
    }

    /// Push a full snapshot to the canvas.
    pub fn render(&mut self) {
        let snapshot = self.snapshot();
        self.adapter.render(&snapshot);
    }
}

fn log_rejected(err: &FamilyError) {
    log::warn!("mutation rejected: {err}");
}
