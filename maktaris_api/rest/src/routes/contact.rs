use std::{sync::Arc, time::Duration};

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing, Extension, Json, Router,
};
use maktaris_core_contact_contracts::{ContactFeatureService, ContactSendError};
use maktaris_models::submission::{FieldError, FieldName, SubmissionDraft};

use super::error;
use crate::{
    middlewares::client_ip::ClientIp,
    models::{
        ApiFieldTooLong, ApiInvalidEmail, ApiMissingFields, ApiRateLimited, ApiSendSuccess,
        ApiServerError,
    },
};

pub fn router(service: Arc<impl ContactFeatureService>, production: bool) -> Router<()> {
    Router::new()
        .route("/api/send-email", routing::post(send_email))
        .with_state((service, production))
}

async fn send_email(
    State((service, production)): State<(Arc<impl ContactFeatureService>, bool)>,
    Extension(ClientIp(client_ip)): Extension<ClientIp>,
    payload: Result<Json<SubmissionDraft>, JsonRejection>,
) -> Response {
    let Ok(Json(draft)) = payload else {
        return error(StatusCode::BAD_REQUEST, "Invalid JSON body");
    };

    match service.send_message(client_ip, draft).await {
        Ok(message_id) => Json(ApiSendSuccess {
            success: true,
            message: "Email sent successfully",
            message_id: message_id.into_inner(),
        })
        .into_response(),
        Err(ContactSendError::RateLimited { retry_after }) => rate_limited(retry_after),
        Err(ContactSendError::Validation(errors)) => validation_error(&errors),
        Err(ContactSendError::Send) => {
            tracing::error!("smtp server rejected the contact email");
            send_failure(production, None)
        }
        Err(ContactSendError::Other(err)) => {
            tracing::error!("failed to relay contact email: {err:#}");
            send_failure(production, Some(err))
        }
    }
}

fn rate_limited(retry_after: Duration) -> Response {
    let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
    (
        StatusCode::TOO_MANY_REQUESTS,
        [(header::RETRY_AFTER, secs.to_string())],
        Json(ApiRateLimited {
            error: "Too many requests",
            retry_after: secs.to_string(),
        }),
    )
        .into_response()
}

fn validation_error(errors: &[FieldError]) -> Response {
    let missing_fields = errors
        .iter()
        .filter_map(|err| match err {
            FieldError::Missing(field) => Some(field.as_str()),
            _ => None,
        })
        .collect::<Vec<_>>();
    if !missing_fields.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiMissingFields {
                error: "Missing required fields",
                missing_fields,
            }),
        )
            .into_response();
    }

    if let Some(received_email) = errors.iter().find_map(|err| match err {
        FieldError::InvalidEmail { received } => Some(received.clone()),
        _ => None,
    }) {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiInvalidEmail {
                error: "Invalid email address",
                received_email,
            }),
        )
            .into_response();
    }

    if let Some((field, length)) = errors.iter().find_map(|err| match err {
        FieldError::TooLong { field, length, .. } => Some((*field, *length)),
        _ => None,
    }) {
        let error = match field {
            FieldName::Name => "Name too long",
            FieldName::Email => "Email too long",
            FieldName::Subject => "Subject too long",
            FieldName::Message => "Message too long",
        };
        return (StatusCode::BAD_REQUEST, Json(ApiFieldTooLong { error, length })).into_response();
    }

    error(StatusCode::BAD_REQUEST, "Invalid submission")
}

fn send_failure(production: bool, err: Option<anyhow::Error>) -> Response {
    let details = (!production).then(|| match err {
        Some(err) => format!("{err:#}"),
        None => "the smtp server rejected the message".into(),
    });

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiServerError {
            error: "Failed to send email",
            details,
        }),
    )
        .into_response()
}
