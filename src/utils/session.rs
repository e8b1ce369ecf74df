use tower_sessions::Session;

use crate::data::models::LoginError;

pub async fn set_user_session(
    session: &Session,
    user_id: i32,
    email: &str,
) -> Result<(), LoginError> {
    session.insert("user_id", user_id).await?;
    session.insert("user_email", email).await?;
    Ok(())
}

/// The logged-in user, if any. Handlers resolve this once and pass the id
/// down explicitly; nothing below the handler layer reads the session.
pub async fn current_user_id(session: &Session) -> Option<i32> {
    match session.get::<i32>("user_id").await {
        Ok(user_id) => user_id,
        Err(e) => {
            log::error!("Failed to read user_id from session: {}", e);
            None
        }
    }
}
