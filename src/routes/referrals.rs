use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::{Value, json};
use sqlx::PgPool;
use tracing::Span;

use crate::best_effort::best_effort;
use crate::domain::{MobileNumber, NewReferral, Referral};
use crate::error::{HttpError, Result};
use crate::startup::AppState;

pub const INVALID_REFERRAL_DETAILS: &str = "Invalid referral details";

/// Reads a submission from any JSON value. `number` is checked first, so a
/// bad number is reported as such whatever shape the rest of the body has.
impl TryFrom<&Value> for NewReferral {
    type Error = String;

    fn try_from(body: &Value) -> Result<Self, Self::Error> {
        let number = MobileNumber::parse(body.get("number").unwrap_or(&Value::Null))?;
        let text = |field: &str| {
            body.get(field)
                .and_then(Value::as_str)
                .map(str::to_owned)
                .ok_or_else(|| INVALID_REFERRAL_DETAILS.to_owned())
        };

        Ok(Self {
            name: text("name")?,
            city: text("city")?,
            email: text("email")?,
            number,
        })
    }
}

#[tracing::instrument(
    name = "submitting a new referral",
    skip_all,
    fields(
        referral_email = tracing::field::Empty,
        referral_name = tracing::field::Empty
    )
)]
pub async fn post_submit_referral(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse> {
    let new_referral = NewReferral::try_from(&body).map_err(HttpError::ValidationError)?;
    Span::current()
        .record("referral_email", tracing::field::display(&new_referral.email))
        .record("referral_name", tracing::field::display(&new_referral.name));

    let referral = insert_referral(&state.db_pool, &new_referral)
        .await
        .map_err(HttpError::DatabaseError)?;

    best_effort(
        "sending referral confirmation email",
        state
            .email_client
            .send_referral_confirmation(&referral.name, &referral.email),
    )
    .await;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Referral submitted successfully",
            "referral": referral,
        })),
    ))
}

#[tracing::instrument(name = "saving new referral in the database", skip_all)]
pub async fn insert_referral(
    pool: &PgPool,
    new_referral: &NewReferral,
) -> Result<Referral, sqlx::Error> {
    sqlx::query_as::<_, Referral>(
        r#"
        INSERT INTO referrals (name, city, email, number)
        VALUES ($1, $2, $3, $4)
        RETURNING id, name, city, email, number, created_at
        "#,
    )
    .bind(&new_referral.name)
    .bind(&new_referral.city)
    .bind(&new_referral.email)
    .bind(new_referral.number.get())
    .fetch_one(pool)
    .await
}
