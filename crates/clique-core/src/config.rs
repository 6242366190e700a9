//! Engine configuration.
//!
//! Every field has a default matching the `<clique-*>` web components, so an
//! embedder only spells out what it renames.

use serde::Deserialize;

/// Stylesheet installed for the duration of a drag. Forces every element to
/// be non-selectable so sweeping across text does not start a selection.
pub const DEFAULT_SELECTION_CSS: &str = "
* {
  user-select: none !important;
  -webkit-user-select: none !important;
  -moz-user-select: none !important;
  -ms-user-select: none !important;
}
";

/// Selectors, attribute names, and drag behavior.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Viewport element, looked up inside the widget's shadow root.
    pub viewport_selector: String,

    /// Handle elements, looked up among a node's descendants.
    pub handle_selector: String,

    /// Attribute carrying a node's stable id.
    pub node_id_attribute: String,

    /// Attribute carrying a handle's name.
    pub handle_name_attribute: String,

    /// Install `selection_css` while a drag session is active. Default: **true**.
    pub suppress_selection: bool,

    pub selection_css: String,

    /// Global events that drive a drag session.
    pub move_event: String,
    pub up_event: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            viewport_selector: "#viewport".to_string(),
            handle_selector: "clique-handle".to_string(),
            node_id_attribute: "id".to_string(),
            handle_name_attribute: "name".to_string(),
            suppress_selection: true,
            selection_css: DEFAULT_SELECTION_CSS.to_string(),
            move_event: "pointermove".to_string(),
            up_event: "pointerup".to_string(),
        }
    }
}
