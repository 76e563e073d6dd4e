use std::time::{SystemTime, UNIX_EPOCH};

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Map, Value};
use tokio::net::{TcpListener, ToSocketAddrs};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

use crate::command::{field_text, parse_int, Command, STUDENT_DELETED, STUDENT_NOT_FOUND};
use crate::error::{DbError, Result};
use crate::{Interpreter, Store, Student};

/// An HTTP server exposing the students REST endpoints over a [`Store`].
///
/// | Method + Path           | Command(s) executed                           |
/// |-------------------------|-----------------------------------------------|
/// | `GET /students`         | select                                        |
/// | `GET /students/:id`     | select, then a lookup by id                   |
/// | `POST /students`        | insert of the body plus a timestamp `id`      |
/// | `PUT /students/:id`     | one update per body field, then a lookup      |
/// | `DELETE /students/:id`  | delete                                        |
///
/// Every handler runs its commands on tokio's blocking pool, since the store does synchronous
/// file IO.
///
/// # Example
/// ```rust,ignore
/// use studentdb::{JsonFileStore, StudentServer};
/// let store = JsonFileStore::new("storage.json");
/// StudentServer::new(store).run("0.0.0.0:5000").await?;
/// ```
pub struct StudentServer<S: Store> {
    interpreter: Interpreter<S>,
}

impl<S: Store> StudentServer<S> {
    /// Create a new `StudentServer` over the given [`Store`]
    pub fn new(store: S) -> Self {
        StudentServer {
            interpreter: Interpreter::new(store),
        }
    }

    /// builds the axum [`Router`] holding every endpoint, with CORS open to all origins
    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        Router::new()
            .route("/students", get(list_students::<S>).post(add_student::<S>))
            .route(
                "/students/:id",
                get(get_student::<S>)
                    .put(update_student::<S>)
                    .delete(delete_student::<S>),
            )
            .layer(TraceLayer::new_for_http())
            .layer(cors)
            .with_state(self.interpreter.clone())
    }

    /// starts a server listening on the given address.
    ///
    /// # Errors
    /// returns [`DbError::Io`] if the address could not be bound
    pub async fn run<A: ToSocketAddrs>(self, addr: A) -> Result<()> {
        let listener = TcpListener::bind(addr).await?;
        self.serve(listener).await
    }

    /// serves requests arriving on an already bound `listener`
    pub async fn serve(self, listener: TcpListener) -> Result<()> {
        info!("Listening on {}", listener.local_addr()?);
        axum::serve(listener, self.router()).await?;
        Ok(())
    }
}

/// `GET /students`
async fn list_students<S: Store>(State(interp): State<Interpreter<S>>) -> Response {
    match blocking(interp, |i| i.students()).await {
        Ok(students) => Json(students).into_response(),
        Err(e) => failure("Error fetching students", e),
    }
}

/// `GET /students/:id`
async fn get_student<S: Store>(
    State(interp): State<Interpreter<S>>,
    Path(id): Path<String>,
) -> Response {
    let id = parse_int(&id);
    let found = blocking(interp, move |i| match id {
        Some(id) => i.find(id),
        // still read the document, so a corrupt store is reported as such
        None => i.students().map(|_| None),
    })
    .await;

    match found {
        Ok(Some(student)) => Json(student).into_response(),
        Ok(None) => not_found(),
        Err(e) => failure("Error fetching student", e),
    }
}

/// `POST /students`
async fn add_student<S: Store>(State(interp): State<Interpreter<S>>, body: Bytes) -> Response {
    let created = blocking(interp, move |i| {
        let fields = object_body(&body)?;
        let student = Student::with_id(now_millis(), fields);
        i.execute(Command::Insert {
            students: vec![student.clone()],
        })?;
        Ok(student)
    })
    .await;

    match created {
        Ok(student) => Json(student).into_response(),
        Err(e) => failure("Error adding student", e),
    }
}

/// `PUT /students/:id`
async fn update_student<S: Store>(
    State(interp): State<Interpreter<S>>,
    Path(id): Path<String>,
    body: Bytes,
) -> Response {
    let id = parse_int(&id);
    let updated = blocking(interp, move |i| {
        let fields = object_body(&body)?;
        for (field, value) in fields {
            let id = id.ok_or_else(|| {
                DbError::MalformedCommandPayload("no student id to update".to_string())
            })?;
            let outcome = i.execute(Command::Update {
                field,
                value: field_text(&value),
                id,
            })?;
            debug!(?outcome, "applied field update");
        }
        match id {
            Some(id) => i.find(id),
            None => Ok(None),
        }
    })
    .await;

    match updated {
        Ok(student) => Json(student).into_response(),
        Err(e) => failure("Error updating student", e),
    }
}

/// `DELETE /students/:id`
async fn delete_student<S: Store>(
    State(interp): State<Interpreter<S>>,
    Path(id): Path<String>,
) -> Response {
    let id = parse_int(&id);
    match blocking(interp, move |i| i.execute(Command::Delete { id })).await {
        Ok(_) => Json(json!({ "message": STUDENT_DELETED })).into_response(),
        Err(e) => failure("Error deleting student", e),
    }
}

/// runs `job` on the blocking thread pool with a handle to the interpreter
async fn blocking<S, T, F>(interp: Interpreter<S>, job: F) -> Result<T>
where
    S: Store,
    T: Send + 'static,
    F: FnOnce(&Interpreter<S>) -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(move || job(&interp))
        .await
        .map_err(|e| DbError::StringErr(format!("request task failed: {}", e)))?
}

/// parses a request body into a JSON object. An empty body is an empty object.
fn object_body(body: &[u8]) -> Result<Map<String, Value>> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }
    match serde_json::from_slice(body) {
        Ok(Value::Object(fields)) => Ok(fields),
        Ok(other) => Err(DbError::MalformedCommandPayload(format!(
            "expected a JSON object, got {}",
            other
        ))),
        Err(e) => Err(DbError::MalformedCommandPayload(e.to_string())),
    }
}

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}

fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "message": STUDENT_NOT_FOUND })),
    )
        .into_response()
}

fn failure(message: &str, e: DbError) -> Response {
    error!("{}: {}", message, e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "message": message, "error": e.to_string() })),
    )
        .into_response()
}
