//! String-in, JSON-out facade over `EditorSession`.
//!
//! Kept free of `wasm_bindgen` types so it runs (and is tested) natively;
//! `FamilyCanvas` only forwards to it.
//!
//! Every mutating call answers `{"ok":true,...}` or
//! `{"ok":false,"error":"..."}`.

use kin_core::data::FamilyData;
use kin_core::error::FamilyError;
use kin_core::id::PersonId;
use kin_core::lint::lint_graph;
use kin_core::model::{FamilyGraph, Gender, ParentSlot, Person};
use kin_core::parser::parse_birth_date;
use kin_editor::adapter::CanvasAdapter;
use kin_editor::config::EditorConfig;
use kin_editor::input::InputEvent;
use kin_editor::session::EditorSession;
use kin_editor::tools::ToolKind;
use serde::Deserialize;
use serde_json::{Value, json};
use std::fmt::Display;

/// What the add-member form submits. `id` is generated when absent.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonForm {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    pub gender: Gender,
    #[serde(default)]
    pub father: Option<String>,
    #[serde(default)]
    pub mother: Option<String>,
    #[serde(default)]
    pub birth: Option<String>,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub photo: Option<String>,
}

impl PersonForm {
    /// Turn the form into a `Person`. Blank strings count as missing.
    pub fn into_person(self) -> Result<Person, FamilyError> {
        let id = match non_blank(self.id) {
            Some(id) => PersonId::intern(&id),
            None => PersonId::generate(),
        };
        let birth_date = non_blank(self.birth)
            .map(|s| parse_birth_date(&s))
            .transpose()?;
        let mut person = Person::new(id, self.name, self.gender).with_parents(
            non_blank(self.father).map(|s| PersonId::intern(&s)),
            non_blank(self.mother).map(|s| PersonId::intern(&s)),
        );
        person.birth_date = birth_date;
        person.age = self.age;
        person.photo = non_blank(self.photo);
        Ok(person)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

fn ok(extra: Value) -> String {
    let mut body = json!({ "ok": true });
    if let (Some(body), Value::Object(extra)) = (body.as_object_mut(), extra) {
        body.extend(extra);
    }
    body.to_string()
}

fn fail(err: impl Display) -> String {
    json!({ "ok": false, "error": err.to_string() }).to_string()
}

pub fn tool_kind_from_name(name: &str) -> Option<ToolKind> {
    match name {
        "select" => Some(ToolKind::Select),
        "addRelation" => Some(ToolKind::AddRelation),
        "removeRelation" => Some(ToolKind::RemoveRelation),
        _ => None,
    }
}

pub fn tool_kind_to_name(kind: ToolKind) -> &'static str {
    match kind {
        ToolKind::Select => "select",
        ToolKind::AddRelation => "addRelation",
        ToolKind::RemoveRelation => "removeRelation",
    }
}

/// The canvas controller behind the JS surface.
pub struct Bridge<A: CanvasAdapter> {
    session: EditorSession<A>,
}

impl<A: CanvasAdapter> Bridge<A> {
    pub fn new(adapter: A, config: EditorConfig) -> Self {
        Self {
            session: EditorSession::empty(adapter, config),
        }
    }

    pub fn session(&self) -> &EditorSession<A> {
        &self.session
    }

    /// Replace the tree with `{"nodes":[...],"edges":[...]}`.
    pub fn load(&mut self, json: &str) -> String {
        let data = match FamilyData::from_json(json) {
            Ok(data) => data,
            Err(e) => return fail(format_args!("invalid family data: {e}")),
        };
        let config = self.session.config().graph.clone();
        match FamilyGraph::from_data(data, config) {
            Ok(graph) => {
                self.session.replace_graph(graph);
                ok(json!({ "people": self.session.graph().len() }))
            }
            Err(e) => fail(e),
        }
    }

    pub fn export_json(&self) -> String {
        self.session
            .graph()
            .to_data()
            .to_json()
            .unwrap_or_else(|_| r#"{"nodes":[],"edges":[]}"#.to_string())
    }

    // ─── Forms ───────────────────────────────────────────────────────────

    pub fn add_person(&mut self, json: &str) -> String {
        let form: PersonForm = match serde_json::from_str(json) {
            Ok(form) => form,
            Err(e) => return fail(format_args!("invalid person: {e}")),
        };
        let person = match form.into_person() {
            Ok(person) => person,
            Err(e) => return fail(e),
        };
        match self.session.add_person(person, None, None) {
            Ok(id) => ok(json!({ "id": id })),
            Err(e) => fail(e),
        }
    }

    /// Replace a stored person with the full record in `json`.
    pub fn edit_person(&mut self, json: &str) -> String {
        let person: Person = match serde_json::from_str(json) {
            Ok(person) => person,
            Err(e) => return fail(format_args!("invalid person: {e}")),
        };
        match self.session.edit_person(person) {
            Ok(_) => ok(json!({})),
            Err(e) => fail(e),
        }
    }

    pub fn set_photo(&mut self, id: &str, photo: &str) -> String {
        let photo = non_blank(Some(photo.to_string()));
        match self.session.set_photo(PersonId::intern(id), photo) {
            Ok(_) => ok(json!({})),
            Err(e) => fail(e),
        }
    }

    pub fn remove_person(&mut self, id: &str) -> String {
        match self.session.remove_person(PersonId::intern(id)) {
            Ok(removed) => ok(json!({ "removed": removed })),
            Err(e) => fail(e),
        }
    }

    /// Delete whoever was clicked last.
    pub fn remove_selected(&mut self) -> String {
        match self.session.selected() {
            Some(id) => match self.session.remove_person(id) {
                Ok(removed) => ok(json!({ "removed": removed })),
                Err(e) => fail(e),
            },
            None => fail("no person selected"),
        }
    }

    pub fn add_relation(&mut self, source: &str, target: &str) -> String {
        match self
            .session
            .add_relation(PersonId::intern(source), PersonId::intern(target))
        {
            Ok(replaced) => ok(json!({ "replaced": replaced })),
            Err(e) => fail(e),
        }
    }

    pub fn remove_relation(&mut self, source: &str, target: &str) -> String {
        match self
            .session
            .remove_relation(PersonId::intern(source), PersonId::intern(target))
        {
            Ok(()) => ok(json!({})),
            Err(e) => fail(e),
        }
    }

    // ─── Tools & pointer input ───────────────────────────────────────────

    /// Switch tools by name. Unknown names fall back to select.
    pub fn set_tool(&mut self, name: &str) {
        let kind = tool_kind_from_name(name).unwrap_or_default();
        self.session.set_tool(kind);
    }

    /// Toggle a mode button. Returns the tool now active.
    pub fn toggle_tool(&mut self, name: &str) -> String {
        let kind = tool_kind_from_name(name).unwrap_or_default();
        tool_kind_to_name(self.session.toggle_tool(kind)).to_string()
    }

    pub fn tool_name(&self) -> String {
        tool_kind_to_name(self.session.active_tool()).to_string()
    }

    pub fn click_node(&mut self, id: &str, x: f32, y: f32) -> String {
        self.dispatch(InputEvent::click_node(PersonId::intern(id), x, y))
    }

    pub fn click_edge(&mut self, source: &str, target: &str, x: f32, y: f32) -> String {
        self.dispatch(InputEvent::click_edge(
            PersonId::intern(source),
            PersonId::intern(target),
            x,
            y,
        ))
    }

    pub fn click_empty(&mut self, x: f32, y: f32) -> String {
        self.dispatch(InputEvent::click_empty(x, y))
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) -> String {
        self.dispatch(InputEvent::pointer_move(x, y))
    }

    fn dispatch(&mut self, event: InputEvent) -> String {
        match self.session.handle_event(&event) {
            Ok(effect) => ok(json!({ "changed": effect.is_some() })),
            Err(e) => fail(e),
        }
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    /// Selected person id, or empty string if none.
    pub fn selected_id(&self) -> String {
        self.session
            .selected()
            .map(|id| id.as_str().to_string())
            .unwrap_or_default()
    }

    /// Selected person as JSON, or `null`.
    pub fn selected_person_json(&self) -> String {
        serde_json::to_string(&self.session.selected_person()).unwrap_or_else(|_| "null".into())
    }

    /// People who may fill `slot` (`"father"` or `"mother"`), as
    /// `[{"id":..,"name":..}]` for the form dropdowns. Any other slot name
    /// yields `[]`.
    pub fn candidates_json(&self, slot: &str) -> String {
        let slot = match slot {
            "father" => ParentSlot::Father,
            "mother" => ParentSlot::Mother,
            _ => return "[]".to_string(),
        };
        let options: Vec<Value> = self
            .session
            .graph()
            .candidates(slot)
            .map(|p| json!({ "id": p.id, "name": p.name }))
            .collect();
        Value::Array(options).to_string()
    }

    /// Consistency diagnostics as a JSON array.
    pub fn lint_json(&self) -> String {
        let diagnostics: Vec<Value> = lint_graph(self.session.graph())
            .into_iter()
            .map(|d| json!({ "person": d.person, "rule": d.rule, "message": d.message }))
            .collect();
        Value::Array(diagnostics).to_string()
    }
}
