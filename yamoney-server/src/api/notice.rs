//! Provider callback endpoints.
//!
//! # Endpoints
//!
//! - `GET|POST /check/` – `checkOrder`: may the order be paid?
//! - `GET|POST /aviso/` – `paymentAviso`: the order has been paid
//!
//! Parameters arrive as a urlencoded form body (POST) or query string (GET).
//! Every answer is an XML document with HTTP status 200; the outcome is
//! carried in its `code` attribute.

use axum::{
    Router,
    extract::{Form, State, rejection::FormRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use yamoney_sdk::objects::{NoticeAction, NoticePayload, NoticeResponse, ResultCode};

use crate::state::AppState;

/// Build the notification router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/check/", get(check_order).post(check_order))
        .route("/aviso/", get(payment_aviso).post(payment_aviso))
}

async fn check_order(
    State(state): State<AppState>,
    payload: Result<Form<NoticePayload>, FormRejection>,
) -> XmlResponse {
    dispatch(&state, NoticeAction::CheckOrder, payload).await
}

async fn payment_aviso(
    State(state): State<AppState>,
    payload: Result<Form<NoticePayload>, FormRejection>,
) -> XmlResponse {
    dispatch(&state, NoticeAction::PaymentAviso, payload).await
}

async fn dispatch(
    state: &AppState,
    action: NoticeAction,
    payload: Result<Form<NoticePayload>, FormRejection>,
) -> XmlResponse {
    match payload {
        Ok(Form(payload)) => XmlResponse(state.notices.handle(action, payload).await),
        Err(rejection) => {
            tracing::warn!(%action, error = %rejection, "Malformed notification");
            XmlResponse(
                NoticeResponse::new(action, ResultCode::BadRequest, 0, None)
                    .with_message(rejection.body_text()),
            )
        }
    }
}

/// Serializes a [`NoticeResponse`] as `application/xml`.
pub struct XmlResponse(pub NoticeResponse);

impl IntoResponse for XmlResponse {
    fn into_response(self) -> Response {
        match self.0.to_xml() {
            Ok(body) => ([(header::CONTENT_TYPE, "application/xml")], body).into_response(),
            Err(e) => {
                tracing::error!(error = %e, "Failed to render notification response");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
            }
        }
    }
}
