pub mod login;
pub mod register;

use axum::response::Redirect;
use tower_sessions::Session;

use crate::data::models::LoginError;

pub async fn handle_logout(session: Session) -> Result<Redirect, LoginError> {
    session.flush().await.map_err(|e| {
        log::error!("Failed to clear session: {}", e);
        LoginError::SessionError("Failed to logout".into())
    })?;
    Ok(Redirect::to("/"))
}
