//! Caller identity.
//!
//! The ajo server sits behind an authenticating proxy, which strips any client-supplied identity headers and sets
//! `ajo-user-id` and `ajo-user-email` for signed-in users. Handlers that act on behalf of a user take a
//! [`UserIdentity`] argument, and requests without these headers are rejected with `401 Unauthorized`.
use actix_web::{dev::Payload, FromRequest, HttpRequest};
use ajo_engine::db_types::UserInfo;
use futures::future::{ready, Ready};
use log::*;

use crate::errors::ServerError;

pub const USER_ID_HEADER: &str = "ajo-user-id";
pub const USER_EMAIL_HEADER: &str = "ajo-user-email";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserIdentity(pub UserInfo);

impl UserIdentity {
    pub fn user_id(&self) -> &str {
        &self.0.user_id
    }

    pub fn info(&self) -> &UserInfo {
        &self.0
    }
}

impl FromRequest for UserIdentity {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(identity_from_headers(req))
    }
}

fn identity_from_headers(req: &HttpRequest) -> Result<UserIdentity, ServerError> {
    let header = |name: &str| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .ok_or_else(|| {
                debug!("💻️ Request to {} has no usable {name} header", req.path());
                ServerError::Unauthenticated(format!("The {name} header is missing"))
            })
    };
    let user_id = header(USER_ID_HEADER)?;
    let email = header(USER_EMAIL_HEADER)?;
    Ok(UserIdentity(UserInfo::new(user_id, email)))
}
