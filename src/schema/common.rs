use std::collections::BTreeMap;

use poem_openapi::Object;
use serde::{Deserialize, Serialize};
use validator::ValidationErrors;

#[derive(Object, Deserialize, Serialize, Debug)]
pub struct BadRequestResponse {
    pub message: String,
    /// Offending fields, each with its list of messages.
    #[oai(default, skip_serializing_if_is_empty)]
    #[serde(default)]
    pub errors: BTreeMap<String, Vec<String>>,
}

impl BadRequestResponse {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
            errors: BTreeMap::new(),
        }
    }
}

impl From<ValidationErrors> for BadRequestResponse {
    fn from(value: ValidationErrors) -> Self {
        let errors = value
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                let messages = errs
                    .iter()
                    .map(|x| match &x.message {
                        Some(message) => message.to_string(),
                        None => x.code.to_string(),
                    })
                    .collect();
                (field.to_string(), messages)
            })
            .collect();
        Self {
            message: "Invalid field values".to_string(),
            errors,
        }
    }
}

#[derive(Object, Deserialize, Serialize, Debug)]
pub struct UnauthorizedResponse {
    pub message: String,
}

impl Default for UnauthorizedResponse {
    fn default() -> Self {
        Self {
            message: "Unauthorized".to_string(),
        }
    }
}

#[derive(Object, Deserialize, Serialize, Debug)]
pub struct NotFoundResponse {
    pub message: String,
}

#[derive(Object, Deserialize, Serialize, Debug)]
pub struct InternalServerErrorResponse {
    pub message: String,
}

impl InternalServerErrorResponse {
    /// Logs the failing step and hides its detail from the client.
    pub fn new(module: &str, function: &str, step: &str, err: &str) -> Self {
        tracing::error!(module, function, step, "{}", err);
        Self {
            message: "Internal server error".to_string(),
        }
    }
}
