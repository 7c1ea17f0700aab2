//! Lint diagnostics for family graphs.
//!
//! Audits the two views of parenthood (edges and `father` / `mother`
//! fields) against each other without modifying anything. A graph built
//! only through the mutation engine always lints clean; the bridge exposes
//! this so hosts can verify imported or long-lived state.

use crate::id::PersonId;
use crate::model::{FamilyGraph, ParentSlot};
use petgraph::Direction;
use petgraph::visit::EdgeRef;

// ─── Diagnostic types ────────────────────────────────────────────────────

/// A single lint diagnostic for a person.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintDiagnostic {
    /// The person this diagnostic refers to.
    pub person: PersonId,
    /// Human-readable message.
    pub message: String,
    /// Short rule identifier (e.g. "missing-relation", "parent-gender").
    pub rule: &'static str,
}

// ─── Public API ──────────────────────────────────────────────────────────

/// Run all lint rules over the graph and return diagnostics.
#[must_use]
pub fn lint_graph(graph: &FamilyGraph) -> Vec<LintDiagnostic> {
    let mut diags = Vec::new();
    lint_parent_references(graph, &mut diags);
    lint_unbacked_relations(graph, &mut diags);
    diags
}

// ─── Rules ───────────────────────────────────────────────────────────────

/// Every `father` / `mother` reference must name an existing person of the
/// right gender, other than the person themself, and be backed by an edge.
fn lint_parent_references(graph: &FamilyGraph, diags: &mut Vec<LintDiagnostic>) {
    for person in graph.people() {
        for slot in [ParentSlot::Father, ParentSlot::Mother] {
            let Some(parent) = person.parent(slot) else {
                continue;
            };
            let mut report = |rule: &'static str, message: String| {
                diags.push(LintDiagnostic {
                    person: person.id,
                    message,
                    rule,
                });
            };

            if parent == person.id {
                report("self-parent", format!("`{}` is their own {slot}.", person.id));
                continue;
            }
            let Some(parent_person) = graph.get(parent) else {
                report(
                    "dangling-parent",
                    format!("{slot} `{parent}` of `{}` does not exist.", person.id),
                );
                continue;
            };
            if parent_person.gender != slot.gender() {
                report(
                    "parent-gender",
                    format!("`{parent}` cannot be the {slot} of `{}`.", person.id),
                );
            }
            if !graph.has_relation(parent, person.id) {
                report(
                    "missing-relation",
                    format!("no relation backs {slot} `{parent}` of `{}`.", person.id),
                );
            }
        }
    }
}

/// Every edge into a person must match one of their parent fields.
fn lint_unbacked_relations(graph: &FamilyGraph, diags: &mut Vec<LintDiagnostic>) {
    for idx in graph.graph.node_indices() {
        let person = &graph.graph[idx];
        for edge in graph.graph.edges_directed(idx, Direction::Incoming) {
            let parent = graph.graph[edge.source()].id;
            if person.slot_of(parent).is_none() {
                diags.push(LintDiagnostic {
                    person: person.id,
                    message: format!(
                        "relation `{parent}` -> `{}` matches neither parent field.",
                        person.id
                    ),
                    rule: "orphan-relation",
                });
            }
        }
    }
}
