use std::{convert::Infallible, sync::Arc};

use axum::{
    extract::FromRequestParts,
    http::{header::SET_COOKIE, request::Parts},
    response::Response,
};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    core::app_state::AppState,
    session::{Session, session_cookie, session_id_from_headers},
};

/// The caller's session, created on first contact.
pub struct CurrentSession {
    pub id: Uuid,
    pub session: Arc<Mutex<Session>>,
    pub is_new: bool,
}

impl FromRequestParts<Arc<AppState>> for CurrentSession {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let requested = session_id_from_headers(&parts.headers);
        let (id, session, is_new) = state.sessions.get_or_create(requested).await;
        Ok(Self {
            id,
            session,
            is_new,
        })
    }
}

impl CurrentSession {
    /// Adds `Set-Cookie` when the session was created by this request.
    pub fn attach(&self, mut res: Response) -> Response {
        if self.is_new {
            if let Some(v) = session_cookie(self.id) {
                res.headers_mut().append(SET_COOKIE, v);
            }
        }
        res
    }
}
