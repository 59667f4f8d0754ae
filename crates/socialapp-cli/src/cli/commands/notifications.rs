//! Notification handlers.

use anyhow::{Context, Result};
use socialapp_core::core::gateway::Gateway;

use super::{cancellable, require_session};

pub async fn list(gateway: &Gateway) -> Result<()> {
    require_session(gateway).await?;
    let notifications = gateway.session().notifications();
    if notifications.is_empty() {
        println!("No notifications.");
        return Ok(());
    }

    for notification in &notifications {
        let marker = if notification.read { " " } else { "*" };
        println!(
            "{marker} {id}  {sender} {kind} {scream}  {at}",
            id = notification.notification_id.as_deref().unwrap_or("-"),
            sender = notification.sender.as_deref().unwrap_or("someone"),
            kind = notification.kind.as_deref().unwrap_or("notified"),
            scream = notification.scream_id.as_deref().unwrap_or("-"),
            at = notification.created_at.as_deref().unwrap_or(""),
        );
    }
    Ok(())
}

/// Marks the given ids read, or every unread notification when none given.
pub async fn read(gateway: &Gateway, ids: Vec<String>) -> Result<()> {
    require_session(gateway).await?;
    let ids = if ids.is_empty() {
        gateway.session().snapshot().unread_notification_ids()
    } else {
        ids
    };
    if ids.is_empty() {
        println!("No unread notifications.");
        return Ok(());
    }

    let count = ids.len();
    cancellable(gateway, gateway.mark_notifications_read(ids))
        .await
        .context("Failed to mark notifications read")?;
    println!("Marked {count} notification(s) read.");
    Ok(())
}
