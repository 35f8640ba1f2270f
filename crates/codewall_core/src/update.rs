use crate::state::InFlight;
use crate::{
    parse_query, permalink, AppState, ControlChange, ControlId, Effect, Msg, Panel, Stage,
    Viewport,
};

const BUSY_NOTICE: &str = "A request is already in progress.";

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::InputChanged(text) => {
            state.url_input = text;
            Vec::new()
        }
        Msg::UrlSubmitted => submit_url(&mut state),
        Msg::Bootstrap(query) => return bootstrap(state, &query),
        Msg::FetchProgress { request_id, bytes } => {
            if state.is_current(request_id, Stage::Fetching) {
                state.loading_bytes = Some(bytes);
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::FetchSucceeded { request_id, text } => {
            if !state.is_current(request_id, Stage::Fetching) {
                return (state, Vec::new());
            }
            state.session.current_text = Some(text.clone());
            state.session.current_url = state.pending_url.take();
            state.in_flight = Some(InFlight {
                request_id,
                stage: Stage::Rendering,
                redraw: false,
            });
            state.mark_dirty();
            vec![Effect::Render(state.render_request(request_id, text))]
        }
        Msg::FetchFailed {
            request_id,
            message,
        } => {
            if !state.is_current(request_id, Stage::Fetching) {
                return (state, Vec::new());
            }
            state.pending_url = None;
            show_error(&mut state, message);
            Vec::new()
        }
        Msg::ContentPresented {
            request_id,
            language,
            rasterized,
        } => {
            if !state.is_current(request_id, Stage::Rendering) {
                return (state, Vec::new());
            }
            state.in_flight = None;
            let rendered_aesthetic = state.rendering_aesthetic.take();
            state.panel = Panel::Content;
            state.language = Some(language);
            if rasterized {
                state.session.display_running = true;
                state.presented_aesthetic = rendered_aesthetic;
            }
            state.content_visible = !rasterized;
            state.reset_visible = true;
            // The presented frame predates any change made while it rendered.
            state.redraw_visible =
                std::mem::take(&mut state.pending_changes) && state.session.display_running;
            state.error_message = None;
            state.permalink = state
                .session
                .current_url
                .as_deref()
                .and_then(|url| permalink(&state.permalink_base, url, &state.options).ok());
            state.mark_dirty();
            Vec::new()
        }
        Msg::RenderFailed {
            request_id,
            message,
        } => {
            if !state.is_current(request_id, Stage::Rendering) {
                return (state, Vec::new());
            }
            show_error(&mut state, message);
            Vec::new()
        }
        Msg::TryAgainClicked => {
            if state.panel == Panel::Error {
                state.panel = Panel::Form;
                state.error_message = None;
                state.notice = None;
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::ResetClicked => {
            if state.panel == Panel::Content {
                state.panel = Panel::Form;
                state.reset_visible = false;
                state.redraw_visible = state.session.current_text.is_some();
                state.notice = None;
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::RedrawClicked => redraw(&mut state),
        Msg::ControlChanged { name, value } => {
            change_control(&mut state, &name, &value);
            Vec::new()
        }
        Msg::Resized { width, height } => {
            if width == 0 || height == 0 {
                state.notice = Some(format!("Ignoring empty viewport {width}x{height}."));
                state.mark_dirty();
                return (state, Vec::new());
            }
            state.viewport = Viewport { width, height };
            if state.is_busy() {
                state.pending_changes = true;
            }
            if state.session.display_running {
                state.redraw_visible = state.session.current_text.is_some();
            }
            state.mark_dirty();
            vec![Effect::ResizeDisplay { width, height }]
        }
        Msg::Tick => Vec::new(),
    };

    (state, effects)
}

fn submit_url(state: &mut AppState) -> Vec<Effect> {
    if state.is_busy() {
        state.notice = Some(BUSY_NOTICE.to_string());
        state.mark_dirty();
        return Vec::new();
    }
    if state.panel != Panel::Form {
        state.notice = Some("Reset or try again before opening another URL.".to_string());
        state.mark_dirty();
        return Vec::new();
    }
    let url = state.url_input.trim().to_string();
    if url.is_empty() {
        state.notice = Some("Enter a URL first.".to_string());
        state.mark_dirty();
        return Vec::new();
    }

    let request_id = state.allocate_request_id();
    state.in_flight = Some(InFlight {
        request_id,
        stage: Stage::Fetching,
        redraw: false,
    });
    state.pending_url = Some(url.clone());
    state.panel = Panel::Loading;
    state.loading_bytes = None;
    state.notice = None;
    state.reset_visible = false;
    state.redraw_visible = false;
    state.mark_dirty();
    vec![Effect::Fetch { request_id, url }]
}

fn redraw(state: &mut AppState) -> Vec<Effect> {
    if state.is_busy() {
        state.notice = Some(BUSY_NOTICE.to_string());
        state.mark_dirty();
        return Vec::new();
    }
    let Some(text) = state.session.current_text.clone() else {
        state.notice = Some("Nothing to redraw yet.".to_string());
        state.mark_dirty();
        return Vec::new();
    };

    let request_id = state.allocate_request_id();
    state.in_flight = Some(InFlight {
        request_id,
        stage: Stage::Rendering,
        redraw: true,
    });
    state.panel = Panel::Loading;
    state.redraw_visible = false;
    state.reset_visible = false;
    state.notice = None;
    state.mark_dirty();
    vec![Effect::Render(state.render_request(request_id, text))]
}

fn show_error(state: &mut AppState, message: String) {
    state.in_flight = None;
    state.pending_changes = false;
    state.rendering_aesthetic = None;
    state.panel = Panel::Error;
    state.error_message = Some(message);
    state.content_visible = false;
    state.reset_visible = false;
    state.mark_dirty();
}

fn change_control(state: &mut AppState, name: &str, value: &str) {
    let result = name
        .parse::<ControlId>()
        .and_then(|control| state.options.apply(control, value));

    match result {
        Ok(change) => {
            if let ControlChange::HideComments(flag) = change {
                state.session.hide_comments = flag;
            }
            if state.is_busy() {
                state.pending_changes = true;
            }
            if state.session.display_running && state.session.current_text.is_some() {
                state.redraw_visible = true;
            }
            state.notice = None;
        }
        Err(err) => {
            state.notice = Some(err.to_string());
        }
    }
    state.mark_dirty();
}

fn bootstrap(mut state: AppState, query: &str) -> (AppState, Vec<Effect>) {
    let parsed = parse_query(query);
    let mut rejected = Vec::new();

    for (control, value) in parsed.controls {
        if let Err(err) = state.options.apply(control, &value) {
            rejected.push(err.to_string());
        }
    }
    state.session.hide_comments = state.options.hide_comments;
    state.mark_dirty();

    let mut effects = Vec::new();
    if let Some(url) = parsed.url {
        state.url_input = url;
        effects = submit_url(&mut state);
    }
    // Submission clears the notice, so rejected parameters are reported last.
    if !rejected.is_empty() {
        state.notice = Some(rejected.join("; "));
    }

    (state, effects)
}
