//! HTTP server implementation for the todo page.
//!
//! This module provides the axum-based HTTP server that serves the page,
//! handles the form posts and exposes a small JSON API.

use axum::{
    Router,
    extract::{Form, Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Redirect, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use super::render::{FormState, Notice, render_page};
use crate::db::Database;
use crate::error::{AppError, AppResult};
use crate::types::{ParseStatusError, Todo, TodoCounts, TodoStatus, is_valid_task};

/// Server state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    db: Arc<Database>,
}

impl AppState {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Arc<Database> {
        &self.db
    }
}

/// Health check response.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// JSON snapshot of the list and its counters.
#[derive(Debug, Serialize, Deserialize)]
pub struct TodoListResponse {
    pub todos: Vec<Todo>,
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub in_progress: usize,
}

#[derive(Debug, Deserialize)]
struct IndexParams {
    msg: Option<String>,
}

/// Form data for new todos.
#[derive(Debug, Deserialize)]
struct CreateTodoForm {
    #[serde(default)]
    task: String,
    status: Option<String>,
}

/// Form data for the inline status selector.
#[derive(Debug, Deserialize)]
struct StatusForm {
    status: String,
}

fn parse_status(raw: &str) -> AppResult<TodoStatus> {
    raw.parse()
        .map_err(|e: ParseStatusError| AppError::invalid_value("status", &e.to_string()))
}

/// Root page - renders the form, counters and list from a fresh query.
async fn index_page(
    State(state): State<AppState>,
    Query(params): Query<IndexParams>,
) -> AppResult<Html<String>> {
    let todos = state.db().list_todos()?;
    let notice = params.msg.as_deref().map(Notice::parse);
    Ok(Html(render_page(&todos, &FormState::default(), notice.as_ref())))
}

/// Handle the creation form.
///
/// Blank task text re-renders the page with an error and never reaches the store.
async fn create_todo_handler(
    State(state): State<AppState>,
    Form(form): Form<CreateTodoForm>,
) -> AppResult<Response> {
    let status = match form.status.as_deref() {
        Some(raw) => parse_status(raw)?,
        None => TodoStatus::default(),
    };

    if !is_valid_task(&form.task) {
        debug!("Rejected todo with empty task description");
        let todos = state.db().list_todos()?;
        let form_state = FormState {
            task: form.task,
            status,
        };
        let notice = Notice::error("Please enter a task description");
        let html = render_page(&todos, &form_state, Some(&notice));
        return Ok((StatusCode::UNPROCESSABLE_ENTITY, Html(html)).into_response());
    }

    let id = state.db().create_todo(&form.task, status)?;
    info!(id, "Todo added");
    Ok(Redirect::to(&Notice::success("Todo added successfully!").redirect_target()).into_response())
}

/// Handle a change of the inline status selector.
///
/// The choice is compared with the stored row, not the rendered page, so a
/// page left open while another session edits the row still applies the change.
async fn update_status_handler(
    State(state): State<AppState>,
    Path(todo_id): Path<i64>,
    Form(form): Form<StatusForm>,
) -> AppResult<Redirect> {
    let status = parse_status(&form.status)?;

    let stored = match state.db().get_todo(todo_id)? {
        Some(todo) => todo,
        None => {
            let notice = Notice::error(AppError::todo_not_found(todo_id).message);
            return Ok(Redirect::to(&notice.redirect_target()));
        }
    };

    if stored.status == status {
        debug!(id = todo_id, "Status unchanged, skipping update");
        return Ok(Redirect::to("/"));
    }

    match state.db().update_todo_status(todo_id, status) {
        Ok(()) => Ok(Redirect::to("/")),
        Err(e) => {
            // Deleted by another session between the read and the write.
            let err = AppError::from(e);
            if err.is_not_found() {
                Ok(Redirect::to(&Notice::error(err.message).redirect_target()))
            } else {
                Err(err)
            }
        }
    }
}

/// Handle todo deletion. Deleting an id that is already gone still redirects normally.
async fn delete_todo_handler(
    State(state): State<AppState>,
    Path(todo_id): Path<i64>,
) -> AppResult<Redirect> {
    state.db().delete_todo(todo_id)?;
    Ok(Redirect::to("/"))
}

/// JSON list endpoint.
async fn api_todos(State(state): State<AppState>) -> AppResult<Json<TodoListResponse>> {
    let todos = state.db().list_todos()?;
    let counts = TodoCounts::from_todos(&todos);
    Ok(Json(TodoListResponse {
        todos,
        total: counts.total,
        completed: counts.completed,
        pending: counts.pending,
        in_progress: counts.in_progress,
    }))
}

/// Health check endpoint.
async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Build the router with all routes.
pub fn build_router(db: Arc<Database>) -> Router {
    Router::new()
        // Page routes
        .route("/", get(index_page))
        .route("/todos", post(create_todo_handler))
        .route("/todos/{todo_id}/status", post(update_status_handler))
        .route("/todos/{todo_id}/delete", post(delete_todo_handler))
        // API routes
        .route("/api/todos", get(api_todos))
        .route("/api/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState::new(db))
}

/// Handle for a running server.
pub struct ServerHandle {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl ServerHandle {
    /// Address the server is bound to.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Signal graceful shutdown and wait for in-flight requests to finish.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        let _ = self.task.await;
    }
}

/// Bind `addr` and start serving in the background.
pub async fn start_server(db: Arc<Database>, addr: &str) -> anyhow::Result<ServerHandle> {
    let app = build_router(db);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let bound_addr = listener.local_addr()?;

    info!("Todo app listening on http://{}", bound_addr);

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let task = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
                info!("Todo app shutting down");
            })
            .await
        {
            tracing::error!("Server error: {}", e);
        }
    });

    Ok(ServerHandle {
        addr: bound_addr,
        shutdown_tx: Some(shutdown_tx),
        task,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_response_serialization() {
        let response = HealthResponse {
            status: "healthy",
            version: "0.1.0",
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("0.1.0"));
    }

    #[test]
    fn parse_status_maps_to_validation_error() {
        let err = parse_status("Done").unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::InvalidFieldValue);
        assert_eq!(err.field.as_deref(), Some("status"));
        assert_eq!(parse_status("In Progress").unwrap(), TodoStatus::InProgress);
    }
}
