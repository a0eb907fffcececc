//! Validated JSON extractor - Combines deserialization with validation.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::errors::{AppError, FieldError};

/// Validated JSON extractor that automatically validates requests.
///
/// Malformed bodies become a `ValidationError` with the parser message;
/// rule violations become a `ValidationError` whose `details` list one
/// `{ field, message }` per failure.
///
/// # Example
///
/// ```rust,ignore
/// use serde::Deserialize;
/// use validator::Validate;
/// use bizhub::api::extractors::ValidatedJson;
///
/// #[derive(Deserialize, Validate)]
/// struct CreateTable {
///     #[validate(range(min = 1))]
///     capacity: i32,
/// }
///
/// async fn create_table(ValidatedJson(payload): ValidatedJson<CreateTable>) {
///     // payload is already validated
/// }
/// ```
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| AppError::validation(e.body_text()))?;

        value
            .validate()
            .map_err(|e| AppError::InvalidFields(field_errors(&e)))?;

        Ok(ValidatedJson(value))
    }
}

/// Flatten validator output into `{ field, message }` pairs, sorted by field
fn field_errors(errors: &validator::ValidationErrors) -> Vec<FieldError> {
    let mut fields: Vec<FieldError> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            let field = field.to_string();
            errs.iter().map(move |e| FieldError {
                field: field.clone(),
                message: e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field)),
            })
        })
        .collect();

    if fields.is_empty() {
        fields.push(FieldError {
            field: "body".to_string(),
            message: errors.to_string(),
        });
    }

    fields.sort_by(|a, b| a.field.cmp(&b.field));
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, Validate)]
    struct Sample {
        #[validate(email(message = "Invalid email address"))]
        email: String,
        #[validate(range(min = 1))]
        capacity: i32,
    }

    #[test]
    fn test_field_errors_list_every_failure() {
        let sample = Sample {
            email: "nope".into(),
            capacity: 0,
        };
        let errors = sample.validate().unwrap_err();

        let fields = field_errors(&errors);

        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].field, "capacity");
        assert_eq!(fields[0].message, "capacity is invalid");
        assert_eq!(fields[1].field, "email");
        assert_eq!(fields[1].message, "Invalid email address");
    }
}
