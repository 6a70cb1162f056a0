use axum::{
    extract::{multipart::MultipartRejection, Multipart, Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;

use service::contact::domain::{Contact, DeletedContact, UpdatedContact};

use super::form::read_contact_form;
use super::ServerState;
use crate::errors::JsonApiError;

#[utoipa::path(
    get, path = "/api/contacts/get/all", tag = "contacts",
    responses(
        (status = 200, description = "All contacts", body = [crate::openapi::ContactDoc]),
        (status = 500, description = "Storage Failure", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<Contact>>, JsonApiError> {
    let all = state
        .contacts
        .list()
        .await
        .map_err(|e| JsonApiError::from_service(e, StatusCode::NOT_FOUND))?;
    info!(count = all.len(), "list contacts");
    Ok(Json(all))
}

#[utoipa::path(
    get, path = "/api/contacts/get/{id}", tag = "contacts",
    params(("id" = String, Path, description = "Contact id")),
    responses(
        (status = 200, description = "OK", body = crate::openapi::ContactDoc),
        (status = 400, description = "Invalid Id", body = crate::openapi::ErrorDoc),
        (status = 404, description = "Not Found", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn get(State(state): State<ServerState>, Path(id): Path<String>) -> Result<Json<Contact>, JsonApiError> {
    state
        .contacts
        .get(&id)
        .await
        .map(Json)
        .map_err(|e| JsonApiError::from_service(e, StatusCode::NOT_FOUND))
}

#[utoipa::path(
    post, path = "/api/contacts/create", tag = "contacts",
    request_body(content = crate::openapi::ContactFormDoc, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Created", body = crate::openapi::ContactDoc),
        (status = 400, description = "Validation Error or Invalid Form", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn create(
    State(state): State<ServerState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Contact>, JsonApiError> {
    let form = read_contact_form(multipart).await?;
    let created = state
        .contacts
        .create(form.input, form.upload)
        .await
        .map_err(|e| JsonApiError::from_service(e, StatusCode::NOT_FOUND))?;
    info!(id = created.id, "created contact");
    Ok(Json(created))
}

#[utoipa::path(
    put, path = "/api/contacts/update/{id}", tag = "contacts",
    params(("id" = String, Path, description = "Contact id")),
    request_body(content = crate::openapi::ContactFormDoc, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Updated", body = crate::openapi::UpdatedContactDoc),
        (status = 400, description = "Invalid Id, Not Found, Validation Error or Invalid Form", body = crate::openapi::ErrorDoc),
        (status = 409, description = "Conflict", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UpdatedContact>, JsonApiError> {
    let form = read_contact_form(multipart).await?;
    let updated = state
        .contacts
        .update(&id, form.input, form.upload)
        .await
        .map_err(|e| JsonApiError::from_service(e, StatusCode::BAD_REQUEST))?;
    info!(id = updated.id, "updated contact");
    Ok(Json(UpdatedContact::new(updated)))
}

#[utoipa::path(
    delete, path = "/api/contacts/delete/{id}", tag = "contacts",
    params(("id" = String, Path, description = "Contact id")),
    responses(
        (status = 200, description = "Deleted", body = crate::openapi::MessageDoc),
        (status = 400, description = "Invalid Id or Not Found", body = crate::openapi::ErrorDoc),
        (status = 409, description = "Conflict", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn delete(State(state): State<ServerState>, Path(id): Path<String>) -> Result<Json<DeletedContact>, JsonApiError> {
    let deleted = state
        .contacts
        .delete(&id)
        .await
        .map_err(|e| JsonApiError::from_service(e, StatusCode::BAD_REQUEST))?;
    info!(id = deleted.id, "deleted contact");
    Ok(Json(deleted))
}
