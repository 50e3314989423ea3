use anyhow::Result;
use clap::Args;
use tavsiyece::{RedisStore, Tavsiyece};

use super::report;
use crate::examples::ExampleGroup;
use crate::output::OutputManager;

pub const FOLLOW_EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Follow",
    commands: &["tavsiyece follow u1 u2                # u1 starts following u2 and u2 is notified"],
}];

pub const UNFOLLOW_EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Unfollow",
    commands: &["tavsiyece unfollow u1 u2              # Remove both sides of the edge"],
}];

pub const LIST_EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Lists",
    commands: &[
        "tavsiyece followers u2                # First page of u2's followers",
        "tavsiyece following u1 --limit 50     # Up to 50 accounts u1 follows",
    ],
}];

#[derive(Args)]
pub struct EdgeArgs {
    /// Acting user id
    pub follower: String,

    /// Target user id
    pub followee: String,
}

#[derive(Args)]
pub struct ListArgs {
    /// User whose list to show
    pub user: String,

    /// Maximum number of entries (defaults to the configured list size)
    #[arg(long)]
    pub limit: Option<usize>,
}

pub async fn handle_follow(args: EdgeArgs, app: &Tavsiyece<RedisStore>, output: &OutputManager) -> Result<()> {
    let followed = app
        .follow_and_notify(&args.follower, &args.followee)
        .await
        .map_err(|err| report(output, err))?;
    if followed {
        output.success(&format!("{} artık {} kullanıcısını takip ediyor.", args.follower, args.followee));
    } else {
        output.warning("Kullanıcılar kendilerini takip edemez.");
    }
    Ok(())
}

pub async fn handle_unfollow(args: EdgeArgs, app: &Tavsiyece<RedisStore>, output: &OutputManager) -> Result<()> {
    let removed = app
        .graph()
        .unfollow(&args.follower, &args.followee)
        .await
        .map_err(|err| report(output, err))?;
    if removed {
        output.success(&format!("{} artık {} kullanıcısını takip etmiyor.", args.follower, args.followee));
    } else {
        output.warning("Kullanıcılar kendilerini takipten çıkaramaz.");
    }
    Ok(())
}

pub async fn handle_followers(args: ListArgs, app: &Tavsiyece<RedisStore>, output: &OutputManager) -> Result<()> {
    let limit = args.limit.unwrap_or(app.config().limits.follow_list);
    let users = app
        .graph()
        .list_followers(&args.user, limit)
        .await
        .map_err(|err| report(output, err))?;
    output.heading(&format!("Takipçiler: {}", args.user));
    if users.is_empty() {
        output.info("Henüz takipçi yok.");
        return Ok(());
    }
    output.display(&users)
}

pub async fn handle_following(args: ListArgs, app: &Tavsiyece<RedisStore>, output: &OutputManager) -> Result<()> {
    let limit = args.limit.unwrap_or(app.config().limits.follow_list);
    let users = app
        .graph()
        .list_following(&args.user, limit)
        .await
        .map_err(|err| report(output, err))?;
    output.heading(&format!("Takip edilenler: {}", args.user));
    if users.is_empty() {
        output.info("Henüz kimse takip edilmiyor.");
        return Ok(());
    }
    output.display(&users)
}
