use anyhow::Result;
use clap::Args;
use tavsiyece::{RedisStore, Tavsiyece};

use super::report;
use crate::examples::ExampleGroup;
use crate::output::OutputManager;

pub const EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Notifications",
    commands: &[
        "tavsiyece notifications u1            # Latest notifications for u1",
        "tavsiyece notifications u1 --read-all # Mark everything read, then list",
    ],
}];

#[derive(Args)]
pub struct NotificationsArgs {
    /// Recipient user id
    pub user: String,

    /// Maximum number of notifications to list
    #[arg(long, default_value_t = 20)]
    pub limit: usize,

    /// Mark every notification as read before listing
    #[arg(long)]
    pub read_all: bool,
}

pub async fn handle_notifications(
    args: NotificationsArgs,
    app: &Tavsiyece<RedisStore>,
    output: &OutputManager,
) -> Result<()> {
    let inbox = app.inbox();

    if args.read_all {
        let updated = inbox.mark_all_read(&args.user).await.map_err(|err| report(output, err))?;
        output.verbose(&format!("marked {updated} notifications read"));
    }

    let notifications = inbox
        .list(&args.user, args.limit)
        .await
        .map_err(|err| report(output, err))?;
    let unread = notifications.iter().filter(|n| !n.is_read).count();
    output.heading(&format!("Bildirimler ({unread} okunmamış)"));
    if notifications.is_empty() {
        output.info("Henüz bildirim yok.");
        return Ok(());
    }
    output.display(&notifications)
}
