//! Static HTML snapshot of the page: panels, controls, the content container
//! and the display frame. Rewritten whenever the view changes.

use std::fmt::Write as _;

use codewall_core::{Aesthetic, AppViewModel, ControlId, StyleClass};
use codewall_engine::{escape_html, stylesheet, RenderedContent};

pub const PAGE_FILE: &str = "index.html";
pub const FRAME_FILE: &str = "frame.png";

const PAGE_CSS: &str = "\
body { margin: 0; background: #000; color: #ddd; font-family: monospace; }
[hidden] { display: none !important; }
#display { position: fixed; inset: 0; width: 100%; height: 100%; object-fit: cover; }
.panel { position: relative; max-width: 48em; margin: 2em auto; padding: 1em;
  background: rgba(0, 0, 0, 0.8); }
#content { white-space: normal; padding: 16px; }
";

pub fn render_page(
    view: &AppViewModel,
    content: Option<&RenderedContent>,
    generated_at: &str,
) -> String {
    let mut html = String::new();
    let _ = writeln!(html, "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">");
    let _ = writeln!(html, "<meta name=\"generated\" content=\"{}\">", escape_html(generated_at));
    let _ = writeln!(html, "<title>codewall</title>");
    let _ = writeln!(html, "<style>\n{PAGE_CSS}{}</style>\n</head>\n<body>", stylesheet());

    let _ = writeln!(
        html,
        "<img id=\"display\" src=\"{FRAME_FILE}\" alt=\"\"{}>",
        hidden_unless(view.canvas_visible)
    );

    let _ = writeln!(
        html,
        "<form id=\"form\" class=\"panel\"{}>",
        hidden_unless(view.form_visible())
    );
    let _ = writeln!(
        html,
        "<input id=\"url\" name=\"url\" type=\"url\" value=\"{}\">",
        escape_html(&view.url_input)
    );
    let _ = writeln!(html, "<button id=\"go\">Go</button>\n</form>");

    let _ = writeln!(
        html,
        "<div id=\"loading\" class=\"panel\"{}>{}</div>",
        hidden_unless(view.loading_visible()),
        escape_html(view.loading_label.as_deref().unwrap_or(""))
    );

    let _ = writeln!(
        html,
        "<div id=\"error\" class=\"panel\"{}><p>{}</p>\
         <button id=\"try-again\">Try again</button></div>",
        hidden_unless(view.error_visible()),
        escape_html(view.error_message.as_deref().unwrap_or(""))
    );

    if let Some(notice) = &view.notice {
        let _ = writeln!(html, "<p id=\"notice\" class=\"panel\">{}</p>", escape_html(notice));
    }

    write_controls(&mut html, view);

    let _ = writeln!(
        html,
        "<button id=\"reset\"{}>Reset</button>\n<button id=\"redraw\"{}>Redraw</button>",
        hidden_unless(view.reset_visible),
        hidden_unless(view.redraw_visible)
    );

    if let Some(link) = &view.permalink {
        let _ = writeln!(
            html,
            "<a id=\"permalink\" href=\"{0}\">{0}</a>",
            escape_html(link)
        );
    }

    let _ = writeln!(
        html,
        "<div id=\"content\" class=\"{}\" style=\"{}\"{}>{}</div>",
        escape_html(&view.container_class),
        escape_html(&view.container_style),
        hidden_unless(view.content_visible),
        content.map(|content| content.markup.as_str()).unwrap_or("")
    );

    let _ = writeln!(html, "</body>\n</html>");
    html
}

fn write_controls(html: &mut String, view: &AppViewModel) {
    let options = &view.options;
    let _ = writeln!(
        html,
        "<fieldset id=\"options\" class=\"panel\"{}>",
        hidden_unless(view.options_visible)
    );

    let _ = writeln!(html, "<select id=\"{}\">", ControlId::StyleSelect.name());
    for style in StyleClass::ALL {
        write_option(html, style.class_name(), style == options.style);
    }
    let _ = writeln!(html, "</select>");

    let _ = writeln!(html, "<select id=\"{}\">", ControlId::AestheticSelect.name());
    for aesthetic in Aesthetic::ALL {
        write_option(html, aesthetic.name(), aesthetic == options.aesthetic);
    }
    let _ = writeln!(html, "</select>");

    let _ = writeln!(
        html,
        "<input id=\"{}\" type=\"number\" value=\"{}\">",
        ControlId::FontSize.name(),
        options.font_size
    );
    for (control, checked) in [
        (ControlId::HideComments, options.hide_comments),
        (ControlId::HideOptions, options.hide_options),
    ] {
        let _ = writeln!(
            html,
            "<input id=\"{}\" type=\"checkbox\"{}>",
            control.name(),
            if checked { " checked" } else { "" }
        );
    }
    let _ = writeln!(html, "</fieldset>");
}

fn write_option(html: &mut String, value: &str, selected: bool) {
    let _ = writeln!(
        html,
        "<option value=\"{value}\"{}>{value}</option>",
        if selected { " selected" } else { "" }
    );
}

fn hidden_unless(visible: bool) -> &'static str {
    if visible {
        ""
    } else {
        " hidden"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codewall_core::{update, AppState, Msg};

    fn run(msgs: Vec<Msg>) -> AppViewModel {
        let mut state = AppState::new();
        for msg in msgs {
            state = update(state, msg).0;
        }
        state.view()
    }

    #[test]
    fn initial_page_shows_only_the_form_and_options() {
        let html = render_page(&run(vec![]), None, "2026-01-01T00:00:00Z");
        assert!(html.contains("<form id=\"form\" class=\"panel\">"));
        assert!(html.contains("<div id=\"loading\" class=\"panel\" hidden>"));
        assert!(html.contains("<fieldset id=\"options\" class=\"panel\">"));
        assert!(html.contains("<img id=\"display\" src=\"frame.png\" alt=\"\" hidden>"));
        assert!(html.contains("<option value=\"venturis\" selected>venturis</option>"));
        assert!(html.contains("content=\"2026-01-01T00:00:00Z\""));
    }

    #[test]
    fn container_reflects_live_options() {
        let view = run(vec![
            Msg::ControlChanged {
                name: "styleSelect".into(),
                value: "delos".into(),
            },
            Msg::ControlChanged {
                name: "fontSize".into(),
                value: "30".into(),
            },
            Msg::ControlChanged {
                name: "hideComments".into(),
                value: "on".into(),
            },
        ]);
        let html = render_page(&view, None, "now");
        assert!(html.contains(
            "<div id=\"content\" class=\"delos hide-comments\" style=\"font-size: 30px;\" hidden>"
        ));
        assert!(html.contains("<input id=\"hideComments\" type=\"checkbox\" checked>"));
    }

    #[test]
    fn input_is_escaped() {
        let view = run(vec![Msg::InputChanged("\"><script>".into())]);
        let html = render_page(&view, None, "now");
        assert!(html.contains("value=\"&quot;&gt;&lt;script&gt;\""));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn error_message_quotes_are_escaped() {
        let view = run(vec![
            Msg::InputChanged("https://x.org/a.rs".into()),
            Msg::UrlSubmitted,
            Msg::FetchFailed {
                request_id: 1,
                message: "can't read 'a.rs'".into(),
            },
        ]);
        let html = render_page(&view, None, "now");
        assert!(html.contains("<p>can&#39;t read &#39;a.rs&#39;</p>"));
    }
}
