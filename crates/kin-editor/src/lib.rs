pub mod adapter;
pub mod config;
pub mod input;
pub mod session;
pub mod tools;

pub use adapter::{CanvasAdapter, EdgeEnd, NullCanvas, ProvisionalEdge, RenderNode, RenderSnapshot};
pub use config::EditorConfig;
pub use input::{Hit, InputEvent};
pub use session::EditorSession;
pub use tools::{GestureState, Tool, ToolKind};
