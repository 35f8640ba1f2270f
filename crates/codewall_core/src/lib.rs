//! Codewall core: pure state machine, option dispatch and view-model helpers.
mod aesthetic;
mod effect;
mod msg;
mod options;
mod query;
mod state;
mod update;
mod view_model;

pub use aesthetic::{
    Aesthetic, BloomSettings, DotScreenSettings, EffectPass, FilmSettings, GlitchSettings,
    KernelSize,
};
pub use effect::{Effect, RenderRequest};
pub use msg::Msg;
pub use options::{
    container_class, ControlChange, ControlId, OptionError, OptionSet, StyleClass,
    DEFAULT_FONT_SIZE, HIDE_COMMENTS_CLASS, MAX_FONT_SIZE, MIN_FONT_SIZE,
};
pub use query::{parse_query, permalink, Bootstrap, QueryError, URL_PARAM};
pub use state::{
    AppState, Panel, RequestId, SessionState, Stage, Viewport, DEFAULT_PERMALINK_BASE,
};
pub use update::update;
pub use view_model::AppViewModel;
