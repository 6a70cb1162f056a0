//! Multipart parsing for the create/update forms.

use axum::extract::{
    multipart::{MultipartError, MultipartRejection},
    Multipart,
};
use tracing::warn;

use service::contact::domain::{ContactInput, Upload};

use crate::errors::JsonApiError;

pub const IMAGE_FIELD: &str = "image";

#[derive(Debug, Default)]
pub struct ContactForm {
    pub input: ContactInput,
    pub upload: Option<Upload>,
}

fn bad_form(e: MultipartError) -> JsonApiError {
    warn!(error = %e, "failed to read multipart form");
    JsonApiError::new(e.status(), "Invalid Form", Some(e.body_text()))
}

fn not_multipart(e: MultipartRejection) -> JsonApiError {
    warn!(error = %e, "request body is not multipart");
    JsonApiError::new(e.status(), "Invalid Form", Some(e.body_text()))
}

/// Collect the contact fields and optional `image` file from a multipart body.
/// A file part with neither a name nor content counts as no upload.
pub async fn read_contact_form(multipart: Result<Multipart, MultipartRejection>) -> Result<ContactForm, JsonApiError> {
    let mut multipart = multipart.map_err(not_multipart)?;
    let mut form = ContactForm::default();
    while let Some(field) = multipart.next_field().await.map_err(bad_form)? {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "firstName" => form.input.first_name = Some(field.text().await.map_err(bad_form)?),
            "lastName" => form.input.last_name = Some(field.text().await.map_err(bad_form)?),
            "title" => form.input.title = Some(field.text().await.map_err(bad_form)?),
            "email" => form.input.email = Some(field.text().await.map_err(bad_form)?),
            "phone" => form.input.phone = Some(field.text().await.map_err(bad_form)?),
            IMAGE_FIELD => {
                let original_name = field.file_name().unwrap_or("").to_string();
                let bytes = field.bytes().await.map_err(bad_form)?;
                if original_name.is_empty() && bytes.is_empty() {
                    continue;
                }
                form.upload = Some(Upload { original_name, bytes: bytes.to_vec() });
            }
            other => warn!(field = %other, "ignoring unknown multipart field"),
        }
    }
    Ok(form)
}
