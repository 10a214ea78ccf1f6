// Best-effort direct messages. Delivery failures (DMs closed, unknown user)
// are logged and reported to the caller as `false`, never as errors.

use poise::serenity_prelude as serenity;

pub async fn dm(http: &serenity::Http, user_id: u64, content: impl Into<String>) -> bool {
    if user_id == 0 {
        return false;
    }
    let message = serenity::CreateMessage::new().content(content);
    match serenity::UserId::new(user_id)
        .direct_message(http, message)
        .await
    {
        Ok(_) => true,
        Err(e) => {
            tracing::warn!(user_id, error = %e, "Could not deliver direct message");
            false
        }
    }
}

/// DM every id in `user_ids`. Returns how many messages were delivered.
pub async fn dm_all(http: &serenity::Http, user_ids: &[u64], content: &str) -> usize {
    let mut delivered = 0;
    for user_id in user_ids {
        if dm(http, *user_id, content).await {
            delivered += 1;
        }
    }
    delivered
}
