use crate::{Aesthetic, OptionSet, Panel, Viewport};

/// Everything the host needs to draw the page.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub panel: Panel,
    pub url_input: String,
    pub loading_label: Option<String>,
    pub error_message: Option<String>,
    /// Transient message about a rejected action.
    pub notice: Option<String>,
    pub reset_visible: bool,
    pub redraw_visible: bool,
    pub options_visible: bool,
    /// The display canvas has content and stays behind the panels.
    pub canvas_visible: bool,
    /// The raw markup container is shown (no display pipeline).
    pub content_visible: bool,
    pub options: OptionSet,
    pub container_class: String,
    pub container_style: String,
    pub current_url: Option<String>,
    pub language: Option<String>,
    pub presented_aesthetic: Option<Aesthetic>,
    pub permalink: Option<String>,
    pub viewport: Viewport,
    pub dirty: bool,
}

impl AppViewModel {
    pub fn form_visible(&self) -> bool {
        self.panel == Panel::Form
    }

    pub fn loading_visible(&self) -> bool {
        self.panel == Panel::Loading
    }

    pub fn error_visible(&self) -> bool {
        self.panel == Panel::Error
    }
}
