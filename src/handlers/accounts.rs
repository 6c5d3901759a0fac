use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::CookieJar;

use crate::auth::{expired_session_cookie, session_cookie, SessionToken};
use crate::models::{LoginPayload, RegistrationPayload};
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{completed, Destination};

/// POST /register - Create an account and log it in
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Result<Json<RegistrationPayload>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = body?;
    let outcome = state.identity.register(&payload).await?;
    let jar = jar.add(session_cookie(
        outcome.value.token.clone(),
        state.secure_cookies,
    ));
    let response = completed(
        StatusCode::CREATED,
        Some(outcome.value),
        outcome.message,
        Destination::Index,
    );
    Ok((jar, response))
}

/// POST /login
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Result<Json<LoginPayload>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = body?;
    let outcome = state.identity.login(&payload).await?;
    let jar = jar.add(session_cookie(
        outcome.value.token.clone(),
        state.secure_cookies,
    ));
    let response = completed(
        StatusCode::OK,
        Some(outcome.value),
        outcome.message,
        Destination::Index,
    );
    Ok((jar, response))
}

/// POST /logout
pub async fn logout(
    State(state): State<AppState>,
    SessionToken(token): SessionToken,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let outcome = state.identity.logout(token.as_deref()).await?;
    let jar = jar.remove(expired_session_cookie());
    let response = completed(
        StatusCode::OK,
        None::<()>,
        outcome.message,
        Destination::Index,
    );
    Ok((jar, response).into_response())
}
