use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: String,
    pub email: String,
    /// "agent" | "admin" | "buyer", issued by the marketplace auth service.
    pub role: String,
    pub exp: usize,
}

#[derive(Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    #[allow(dead_code)] // Reserved for request logging / audit display
    pub email: String,
    pub role: String,
}

pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    // Health probe stays open
    let path = req.uri().path();
    if path == "/health" {
        return Ok(next.run(req).await);
    }

    /// 401 with a stable code so the dashboard only logs the user out when the
    /// server explicitly declines auth (not on network errors).
    fn auth_declined_response() -> Response {
        let body = serde_json::json!({
            "code": "INSIGHTS_AUTH_DECLINED",
            "message": "Authentication required or session invalid"
        });
        (StatusCode::UNAUTHORIZED, Json(body)).into_response()
    }

    // Extract token from Authorization header
    let auth_header = match req.headers().get(AUTHORIZATION).and_then(|h| h.to_str().ok()) {
        Some(h) => h,
        None => return Ok(auth_declined_response()),
    };

    if !auth_header.starts_with("Bearer ") {
        return Ok(auth_declined_response());
    }

    let token = &auth_header[7..]; // Skip "Bearer "

    // Decode and validate JWT
    let decoding_key = DecodingKey::from_secret(state.config.jwt_secret.as_ref());
    let validation = Validation::new(Algorithm::HS256);

    let token_data = match decode::<Claims>(token, &decoding_key, &validation) {
        Ok(d) => d,
        Err(_) => return Ok(auth_declined_response()),
    };

    let claims = token_data.claims;

    let user_id = match Uuid::parse_str(&claims.user_id) {
        Ok(u) => u,
        Err(_) => return Ok(auth_declined_response()),
    };

    // Property insights are an agent/admin dashboard surface. Buyer tokens
    // are valid sessions but have no business here.
    if claims.role != "agent" && claims.role != "admin" {
        let body = serde_json::json!({
            "code": "INSIGHTS_FORBIDDEN",
            "message": "Insufficient permissions"
        });
        return Ok((StatusCode::FORBIDDEN, Json(body)).into_response());
    }

    // Attach user info to request
    let auth_user = AuthUser {
        user_id,
        email: claims.email,
        role: claims.role,
    };
    req.extensions_mut().insert(auth_user);

    Ok(next.run(req).await)
}

/// Sign a token the auth middleware will accept. Used by the issue_token bin
/// and by tests; production tokens come from the marketplace auth service.
pub fn mint_token(
    user_id: &Uuid,
    email: &str,
    role: &str,
    secret: &str,
    expiration_secs: u64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let exp = (Utc::now() + Duration::seconds(expiration_secs as i64)).timestamp() as usize;
    let claims = Claims {
        user_id: user_id.to_string(),
        email: email.to_string(),
        role: role.to_string(),
        exp,
    };

    let header = Header::new(Algorithm::HS256);
    let encoding_key = EncodingKey::from_secret(secret.as_ref());
    encode(&header, &claims, &encoding_key)
}
