//! Multipart form collection shared by the upload routes.

use axum::body::Bytes;
use axum::extract::Multipart;
use std::collections::HashMap;

use crate::api::error::{ApiError, ApiResult};

#[derive(Debug)]
pub struct FormField {
    pub file_name: Option<String>,
    pub data: Bytes,
}

impl FormField {
    pub fn text(&self) -> Option<String> {
        std::str::from_utf8(&self.data)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }
}

/// All parts of a multipart body keyed by field name; later duplicates win
#[derive(Debug, Default)]
pub struct Form {
    fields: HashMap<String, FormField>,
}

impl Form {
    pub async fn read(mut multipart: Multipart) -> ApiResult<Self> {
        let mut form = Form::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::Validation(format!("Malformed form data: {}", e)))?
        {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            let file_name = field.file_name().map(str::to_string);
            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::Validation(format!("Malformed form data: {}", e)))?;
            form.fields.insert(name, FormField { file_name, data });
        }
        Ok(form)
    }

    /// Field with a non-empty payload
    pub fn file(&self, name: &str) -> Option<&FormField> {
        self.fields.get(name).filter(|f| !f.data.is_empty())
    }

    pub fn text(&self, name: &str) -> Option<String> {
        self.fields.get(name).and_then(FormField::text)
    }
}
