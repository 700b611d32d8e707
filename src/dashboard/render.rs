//! Server-side rendering of the todo page.

use super::templates;
use crate::types::{Todo, TodoCounts, TodoStatus};
use chrono::DateTime;

/// Kind of flash message shown under the creation form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// A one-shot message carried across a redirect in the `msg` query parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

impl Notice {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            text: text.into(),
        }
    }

    /// Parse a `success:...` / `error:...` query value. Unprefixed text is a success.
    pub fn parse(raw: &str) -> Self {
        if let Some(text) = raw.strip_prefix("error:") {
            Self::error(text)
        } else if let Some(text) = raw.strip_prefix("success:") {
            Self::success(text)
        } else {
            Self::success(raw)
        }
    }

    /// Location of the page with this notice attached.
    pub fn redirect_target(&self) -> String {
        let prefix = match self.kind {
            NoticeKind::Success => "success",
            NoticeKind::Error => "error",
        };
        format!(
            "/?msg={}",
            urlencoding::encode(&format!("{}:{}", prefix, self.text))
        )
    }

    fn render(&self) -> String {
        let class = match self.kind {
            NoticeKind::Success => "message-success",
            NoticeKind::Error => "message-error",
        };
        format!(
            r#"<div class="message {}">{}</div>"#,
            class,
            html_escape(&self.text)
        )
    }
}

/// Values echoed back into the creation form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    pub task: String,
    pub status: TodoStatus,
}

/// Escape HTML special characters.
///
/// Braces are escaped too so user text can never form a template placeholder.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
        .replace('{', "&#123;")
        .replace('}', "&#125;")
}

/// Badge class for a status.
pub fn status_badge(status: TodoStatus) -> &'static str {
    match status {
        TodoStatus::Completed => "badge-success",
        TodoStatus::InProgress => "badge-info",
        TodoStatus::Pending => "badge-warning",
    }
}

/// Format epoch milliseconds as `YYYY-MM-DD HH:MM:SS` (UTC).
pub fn format_timestamp(ms: i64) -> String {
    DateTime::from_timestamp_millis(ms)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn status_options(selected: TodoStatus) -> String {
    TodoStatus::ALL
        .iter()
        .map(|status| {
            format!(
                r#"<option value="{0}"{1}>{0}</option>"#,
                status.as_str(),
                if *status == selected { " selected" } else { "" }
            )
        })
        .collect::<Vec<_>>()
        .join("")
}

fn render_stats(counts: &TodoCounts) -> String {
    format!(
        r#"<div class="grid-stats">
            <div class="stat"><div class="stat-label">Total Tasks</div><div class="stat-value">{}</div></div>
            <div class="stat"><div class="stat-label">Completed</div><div class="stat-value">{}</div></div>
            <div class="stat"><div class="stat-label">Pending</div><div class="stat-value">{}</div></div>
        </div>"#,
        counts.total, counts.completed, counts.pending
    )
}

fn render_row(todo: &Todo) -> String {
    format!(
        r#"<div class="todo" id="todo-{id}">
            <div class="todo-row">
                <div><strong>{task}</strong></div>
                <div><span class="badge {badge}">{status}</span></div>
                <form class="inline" method="post" action="/todos/{id}/status">
                    <select name="status" aria-label="Update" onchange="this.form.submit()">{options}</select>
                    <noscript><button type="submit" class="btn">Update</button></noscript>
                </form>
                <form class="inline" method="post" action="/todos/{id}/delete">
                    <button type="submit" class="btn" title="Delete">&#128465;&#65039;</button>
                </form>
            </div>
            <div class="caption">Created: {created}</div>
            <hr>
        </div>"#,
        id = todo.id,
        task = html_escape(&todo.task),
        badge = status_badge(todo.status),
        status = todo.status.as_str(),
        options = status_options(todo.status),
        created = format_timestamp(todo.created_at),
    )
}

fn render_todos(todos: &[Todo]) -> String {
    if todos.is_empty() {
        return r#"<div class="message message-info">No todos yet. Add one using the sidebar!</div>"#
            .to_string();
    }

    let mut html = render_stats(&TodoCounts::from_todos(todos));
    html.push_str("<hr>");
    for todo in todos {
        html.push_str(&render_row(todo));
    }
    html
}

/// Render the full page from a list snapshot.
pub fn render_page(todos: &[Todo], form: &FormState, notice: Option<&Notice>) -> String {
    templates::INDEX_TEMPLATE
        .replace("{{message}}", &notice.map(Notice::render).unwrap_or_default())
        .replace("{{status_options}}", &status_options(form.status))
        .replace("{{task_value}}", &html_escape(&form.task))
        .replace("{{todos}}", &render_todos(todos))
}
