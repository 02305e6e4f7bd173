use actix_web::{dev::Payload, http::header::HeaderMap, FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};
use uuid::Uuid;

use super::error::ApiError;
use crate::domain::{Caller, Role};

// ============================================================================
// Caller Extraction
// ============================================================================
//
// Authentication happens at the gateway, which forwards the verified
// identity as headers:
// - X-User-Id     uuid of the authenticated user
// - X-User-Role   Cliente | Empresa | Administrador
// - X-Company-Id  uuid of the user's company, required for Empresa
//
// ============================================================================

pub const USER_ID_HEADER: &str = "X-User-Id";
pub const USER_ROLE_HEADER: &str = "X-User-Role";
pub const COMPANY_ID_HEADER: &str = "X-Company-Id";

impl FromRequest for Caller {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(caller_from_headers(req.headers()))
    }
}

fn caller_from_headers(headers: &HeaderMap) -> Result<Caller, ApiError> {
    let user_id = uuid_header(headers, USER_ID_HEADER)?
        .ok_or_else(|| missing(USER_ID_HEADER))?;

    let role: Role = text_header(headers, USER_ROLE_HEADER)?
        .ok_or_else(|| missing(USER_ROLE_HEADER))?
        .parse()
        .map_err(|e| ApiError::Unauthenticated(format!("{e}")))?;

    let caller = match role {
        Role::Customer => Caller::Customer { user_id },
        Role::Admin => Caller::Admin { user_id },
        Role::Company => {
            let company_id = uuid_header(headers, COMPANY_ID_HEADER)?
                .ok_or_else(|| missing(COMPANY_ID_HEADER))?;
            Caller::Company { user_id, company_id }
        }
    };

    tracing::debug!(
        user_id = %caller.user_id(),
        role = %caller.role(),
        company_id = ?caller.company_id(),
        "Caller identified"
    );
    Ok(caller)
}

fn text_header<'a>(headers: &'a HeaderMap, name: &str) -> Result<Option<&'a str>, ApiError> {
    match headers.get(name) {
        None => Ok(None),
        Some(value) => value
            .to_str()
            .map(|v| Some(v.trim()).filter(|v| !v.is_empty()))
            .map_err(|_| ApiError::Unauthenticated(format!("Header {name} is not valid text"))),
    }
}

fn uuid_header(headers: &HeaderMap, name: &str) -> Result<Option<Uuid>, ApiError> {
    text_header(headers, name)?
        .map(|raw| {
            Uuid::parse_str(raw)
                .map_err(|_| ApiError::Unauthenticated(format!("Header {name} is not a valid id")))
        })
        .transpose()
}

fn missing(name: &str) -> ApiError {
    ApiError::Unauthenticated(format!("Missing {name} header"))
}
