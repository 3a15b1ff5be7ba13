//! Axum adapter exposing the login endpoints and a session-protected route.
//!
//! | Route | Behavior |
//! | --- | --- |
//! | `GET /auth` | `307` redirect to the provider authorize page |
//! | `GET /auth/callback` | `200` JSON session on success, `500` with a generic message otherwise |
//! | `GET /api/me` | member id of the session holder, `401` on any gate failure |
//!
//! [`require_member`] can guard any other route; handlers behind it read the resolved member
//! from the [`CurrentMember`] request extension.

// crates.io
use axum::{
	Extension, Json, Router,
	extract::{Query, Request, State},
	http::StatusCode,
	middleware::{Next, from_fn_with_state},
	response::{IntoResponse, Redirect, Response},
	routing::get,
};
// self
use crate::{_prelude::*, auth::Member, flows::Gatekeeper, gate::AuthRejection};

const LOGIN_FAILED: &str = "Login failed. Please start again.";
const UNAUTHORIZED: &str = "Unauthorized.";

/// Member resolved by [`require_member`], available as a request extension.
#[derive(Clone, Debug)]
pub struct CurrentMember(pub Member);

/// Query parameters the provider appends to the callback.
#[derive(Debug, Deserialize)]
pub struct CallbackParams {
	/// Request token being redeemed.
	pub oauth_token: Option<String>,
	/// Verifier proving the resource owner approved the token.
	pub oauth_verifier: Option<String>,
}

/// Session handed back to the client after a successful callback.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
	/// Session token to present on protected calls.
	pub token: String,
	/// Member the session belongs to.
	pub member_id: String,
	/// Expiry, seconds since the Unix epoch.
	pub expires_at: i64,
}

/// Builds the router serving the login flow and `/api/me`.
pub fn router(gatekeeper: Arc<Gatekeeper>) -> Router {
	let protected = Router::new()
		.route("/api/me", get(me))
		.route_layer(from_fn_with_state(gatekeeper.clone(), require_member));

	Router::new()
		.route("/auth", get(begin))
		.route("/auth/callback", get(callback))
		.merge(protected)
		.with_state(gatekeeper)
}

/// Middleware rejecting requests without a valid session with `401`.
pub async fn require_member(
	State(gatekeeper): State<Arc<Gatekeeper>>,
	mut req: Request,
	next: Next,
) -> Response {
	let presented = req
		.headers()
		.get(gatekeeper.session_header())
		.and_then(|value| value.to_str().ok())
		.map(str::to_owned);

	match gatekeeper.authenticate(presented.as_deref()).await {
		Ok(member) => {
			req.extensions_mut().insert(CurrentMember(member));

			next.run(req).await
		},
		Err(rejection) => rejection.into_response(),
	}
}

async fn begin(State(gatekeeper): State<Arc<Gatekeeper>>) -> Result<Redirect, Error> {
	let url = gatekeeper.begin_login().await?;

	Ok(Redirect::temporary(url.as_str()))
}

async fn callback(
	State(gatekeeper): State<Arc<Gatekeeper>>,
	Query(params): Query<CallbackParams>,
) -> Response {
	let (Some(token), Some(verifier)) = (params.oauth_token, params.oauth_verifier) else {
		tracing::warn!("Callback is missing oauth_token or oauth_verifier.");

		return login_failed();
	};

	match gatekeeper.complete_login(&token, &verifier).await {
		Ok(outcome) => Json(SessionResponse {
			token: outcome.session.token,
			member_id: outcome.member.id.to_string(),
			expires_at: outcome.session.expires_at.unix_timestamp(),
		})
		.into_response(),
		Err(e) => e.into_response(),
	}
}

async fn me(Extension(CurrentMember(member)): Extension<CurrentMember>) -> Json<serde_json::Value> {
	Json(serde_json::json!({ "member_id": member.id }))
}

fn login_failed() -> Response {
	(StatusCode::INTERNAL_SERVER_ERROR, Json(serde_json::json!({ "error": LOGIN_FAILED })))
		.into_response()
}

impl IntoResponse for Error {
	fn into_response(self) -> Response {
		let status =
			StatusCode::from_u16(self.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

		if status == StatusCode::UNAUTHORIZED {
			return (status, Json(serde_json::json!({ "error": UNAUTHORIZED }))).into_response();
		}

		tracing::error!(error = %self, "Login request failed.");

		login_failed()
	}
}
impl IntoResponse for AuthRejection {
	fn into_response(self) -> Response {
		tracing::debug!(rejection = %self, "Protected request rejected.");

		(StatusCode::UNAUTHORIZED, Json(serde_json::json!({ "error": UNAUTHORIZED })))
			.into_response()
	}
}
