use codewall_core::{AppViewModel, ControlId, Panel};

/// Console status for a view: one line per visible element.
pub fn status_lines(view: &AppViewModel) -> Vec<String> {
    let mut lines = Vec::new();

    match view.panel {
        Panel::Form => lines.push(match &view.current_url {
            Some(url) => format!("[form] last opened: {url}"),
            None => "[form] open <url> to begin".to_string(),
        }),
        Panel::Loading => lines.push(format!(
            "[loading] {}",
            view.loading_label.as_deref().unwrap_or("Working...")
        )),
        Panel::Content => {
            let language = view.language.as_deref().unwrap_or("unknown");
            let target = if view.canvas_visible {
                match view.presented_aesthetic {
                    Some(aesthetic) => format!("on the display ({aesthetic})"),
                    None => "on the display".to_string(),
                }
            } else {
                "as markup".to_string()
            };
            lines.push(format!("[content] {language} source shown {target}"));
        }
        Panel::Error => lines.push(format!(
            "[error] {}",
            view.error_message.as_deref().unwrap_or("Something went wrong.")
        )),
    }

    if let Some(notice) = &view.notice {
        lines.push(format!("  ! {notice}"));
    }

    let buttons: Vec<&str> = [
        (view.panel == Panel::Error, "retry"),
        (view.reset_visible, "reset"),
        (view.redraw_visible, "redraw"),
    ]
    .into_iter()
    .filter_map(|(visible, name)| visible.then_some(name))
    .collect();
    if !buttons.is_empty() {
        lines.push(format!("  actions: {}", buttons.join(", ")));
    }

    if view.options_visible {
        let options = ControlId::ALL
            .into_iter()
            .map(|control| format!("{}={}", control.name(), view.options.value_of(control)))
            .collect::<Vec<_>>()
            .join(" ");
        lines.push(format!("  options: {options}"));
    }

    lines
}
