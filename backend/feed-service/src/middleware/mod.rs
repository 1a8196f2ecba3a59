/// Viewer identity for feed requests
///
/// Authentication happens at the gateway, which forwards the verified user id
/// in the `x-user-id` header.
use actix_web::{dev::Payload, FromRequest, HttpRequest};
use futures::future::{ready, Ready};
use uuid::Uuid;

use crate::error::AppError;

pub const USER_ID_HEADER: &str = "x-user-id";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserId(pub Uuid);

fn extract_user_id(req: &HttpRequest) -> Result<UserId, AppError> {
    let header_value = req
        .headers()
        .get(USER_ID_HEADER)
        .ok_or_else(|| AppError::Unauthorized("Missing x-user-id header".into()))?;

    let value = header_value
        .to_str()
        .map_err(|_| AppError::Unauthorized("Invalid x-user-id header".into()))?;

    Uuid::parse_str(value.trim())
        .map(UserId)
        .map_err(|_| AppError::Unauthorized("Invalid x-user-id header value".into()))
}

impl FromRequest for UserId {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(extract_user_id(req))
    }
}
