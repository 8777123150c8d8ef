//! Generic entry CRUD handlers.
//!
//! One handler set serves all four collections. The `:collection` path
//! segment is parsed into [`Collection`]; unknown names are 404. Reads
//! require a signed-in identity, writes require the admin identity, and both
//! checks happen here regardless of anything a client hides in its UI.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use larder_core::{has_nonempty_name, Action, Collection, Decision, Entry, FieldMap};

use crate::error::ApiError;
use crate::identity::CallerIdentity;
use crate::state::AppState;

/// Envelope for collection listings.
#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub status: u16,
    pub data: Vec<Entry>,
}

fn authorize(state: &AppState, caller: &CallerIdentity, action: Action) -> Result<(), ApiError> {
    match state.policy.authorize(caller.0.as_ref(), action) {
        Decision::Allow => Ok(()),
        Decision::Unauthenticated => {
            Err(ApiError::Unauthorized("Sign-in required".to_string()))
        }
        Decision::Forbidden => Err(ApiError::Forbidden(
            "Write access is limited to the configured admin".to_string(),
        )),
    }
}

fn parse_collection(segment: &str) -> Result<Collection, ApiError> {
    segment
        .parse::<Collection>()
        .map_err(|_| ApiError::NotFound(format!("Unknown collection '{}'", segment)))
}

fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    raw.parse::<Uuid>()
        .map_err(|_| ApiError::BadRequest(format!("Invalid entry id '{}'", raw)))
}

fn body_object(body: serde_json::Value) -> Result<FieldMap, ApiError> {
    match body {
        serde_json::Value::Object(map) => Ok(map),
        _ => Err(ApiError::BadRequest(
            "Request body must be a JSON object".to_string(),
        )),
    }
}

/// `GET /api/:collection`: every entry, unfiltered, store order.
pub async fn list_entries(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(collection): Path<String>,
) -> Result<Json<ListResponse>, ApiError> {
    authorize(&state, &caller, Action::Read)?;
    let collection = parse_collection(&collection)?;

    let data = state.repo.list(collection).await?;
    Ok(Json(ListResponse { status: 200, data }))
}

/// `GET /api/:collection/:id`: one entry or 404.
pub async fn get_entry(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path((collection, id)): Path<(String, String)>,
) -> Result<Json<Entry>, ApiError> {
    authorize(&state, &caller, Action::Read)?;
    let collection = parse_collection(&collection)?;
    let id = parse_id(&id)?;

    let entry = state
        .repo
        .get(collection, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Entry not found: {}", id)))?;
    Ok(Json(entry))
}

/// `POST /api/:collection`: insert a partial document, return the new id.
///
/// No field validation beyond "body is a JSON object": the store is
/// schema-flexible and routes write what they are given.
pub async fn create_entry(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(collection): Path<String>,
    Json(body): Json<serde_json::Value>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    authorize(&state, &caller, Action::Write)?;
    let collection = parse_collection(&collection)?;
    let fields = body_object(body)?;

    let id = state.repo.insert(collection, fields).await?;
    Ok((StatusCode::CREATED, Json(serde_json::json!({ "id": id }))))
}

/// `PUT /api/:collection/:id`: replace only the provided fields.
///
/// An `id` in the body that contradicts the path is rejected; a matching or
/// absent one is stripped before apply. No match is 404.
pub async fn update_entry(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path((collection, id)): Path<(String, String)>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>, ApiError> {
    authorize(&state, &caller, Action::Write)?;
    let collection = parse_collection(&collection)?;
    let id = parse_id(&id)?;
    let fields = body_object(body)?;

    if let Some(body_id) = fields.get("id").and_then(|v| v.as_str()) {
        if body_id != id.to_string() {
            return Err(ApiError::BadRequest("ID mismatch".to_string()));
        }
    }

    state.repo.update(collection, id, fields).await?;
    Ok(Json(serde_json::json!({
        "message": "Entry updated successfully"
    })))
}

/// `DELETE /api/:collection/:id`: remove the entry; no match is 404.
pub async fn delete_entry(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path((collection, id)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>, ApiError> {
    authorize(&state, &caller, Action::Write)?;
    let collection = parse_collection(&collection)?;
    let id = parse_id(&id)?;

    state.repo.delete(collection, id).await?;
    Ok(Json(serde_json::json!({
        "message": "Entry deleted successfully"
    })))
}

/// `POST /api/:collection/bulk`: batch insert.
///
/// The body must be a non-empty array of partial documents. Elements without
/// a non-empty trimmed `name` are dropped; if nothing survives the filter
/// the whole import is rejected before any insert.
pub async fn bulk_create_entries(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(collection): Path<String>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>, ApiError> {
    authorize(&state, &caller, Action::Write)?;
    let collection = parse_collection(&collection)?;

    let items = match body {
        serde_json::Value::Array(items) if !items.is_empty() => items,
        _ => {
            return Err(ApiError::BadRequest(
                "Invalid input: expected a non-empty array".to_string(),
            ))
        }
    };

    let valid_items: Vec<FieldMap> = items
        .into_iter()
        .filter_map(|item| match item {
            serde_json::Value::Object(map) if has_nonempty_name(&map) => Some(map),
            _ => None,
        })
        .collect();

    if valid_items.is_empty() {
        return Err(ApiError::BadRequest(
            "No valid items to import".to_string(),
        ));
    }

    let count = valid_items.len();
    let inserted_ids = state.repo.insert_many(collection, valid_items).await?;

    Ok(Json(serde_json::json!({
        "message": format!("Successfully imported {} items", count),
        "insertedIds": inserted_ids,
    })))
}
