use axum::extract::State;
use axum::response::Html;

use diffview_core::{MaterializedChange, Snapshot};

use super::AppState;

/// Plain listing of the published changes with links to the JSON API.
pub async fn index_page(State(state): State<AppState>) -> Html<String> {
    Html(render_index(&state.store.all()))
}

fn render_index(snapshot: &Snapshot) -> String {
    let mut html = String::from(
        "<!doctype html>\n<html>\n<head><meta charset=\"utf-8\"><title>diffview</title></head>\n<body>\n",
    );

    if snapshot.is_empty() {
        html.push_str("<p>No changes.</p>\n");
    } else {
        html.push_str("<ul>\n");
        for change in snapshot.iter() {
            html.push_str(&render_item(change));
        }
        html.push_str("</ul>\n");
    }

    html.push_str("</body>\n</html>\n");
    html
}

fn render_item(change: &MaterializedChange) -> String {
    let label = match (change.record.path_before(), change.record.path_after()) {
        (Some(before), Some(after)) if before != after => {
            format!("{} -&gt; {}", escape(before), escape(after))
        }
        _ => escape(change.record.path()),
    };

    let note = if change.no_changes {
        " (no changes)"
    } else {
        ""
    };

    format!(
        "<li>[{}] <a href=\"/api/changes/{}\">{}</a>{}</li>\n",
        change.display_kind, change.index, label, note
    )
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
