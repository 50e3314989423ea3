use anyhow::Result;
use clap::Args;
use tavsiyece::{FeedOutcome, RedisStore, Tavsiyece};

use super::report;
use crate::examples::ExampleGroup;
use crate::output::OutputManager;

pub const EXAMPLES: &[ExampleGroup] = &[
    ExampleGroup {
        title: "Home Feed",
        commands: &["tavsiyece feed u1                     # Posts by u1 and everyone u1 follows"],
    },
    ExampleGroup {
        title: "Other Feeds",
        commands: &[
            "tavsiyece feed u1 --author u2         # u2's posts as seen by u1",
            "tavsiyece feed u1 --saved             # Posts u1 bookmarked",
            "tavsiyece --output json feed u1       # Machine-readable output",
        ],
    },
];

#[derive(Args)]
pub struct FeedArgs {
    /// Viewing user id
    pub viewer: String,

    /// Show one author's posts instead of the home feed
    #[arg(long, conflicts_with = "saved")]
    pub author: Option<String>,

    /// Show the viewer's saved posts
    #[arg(long)]
    pub saved: bool,
}

pub async fn handle_feed(args: FeedArgs, app: &Tavsiyece<RedisStore>, output: &OutputManager) -> Result<()> {
    let feed = app.feed();

    if let Some(author) = &args.author {
        let items = feed
            .build_profile_feed(&args.viewer, author)
            .await
            .map_err(|err| report(output, err))?;
        output.heading(&format!("Tavsiyeler: {author}"));
        return output.display(&items);
    }

    if args.saved {
        let items = feed
            .build_saved_feed(&args.viewer)
            .await
            .map_err(|err| report(output, err))?;
        output.heading("Kaydedilenler");
        if items.is_empty() {
            output.info("Henüz kaydedilmiş tavsiye yok.");
            return Ok(());
        }
        return output.display(&items);
    }

    let outcome = feed
        .build_home_feed(&args.viewer)
        .await
        .map_err(|err| report(output, err))?;
    match outcome {
        FeedOutcome::Items(items) => {
            output.heading("Akış");
            output.display(&items)
        }
        FeedOutcome::NoFollowing => {
            output.info("Henüz kimseyi takip etmiyorsunuz. Arama sekmesinden kullanıcı bulabilirsiniz.");
            Ok(())
        }
        FeedOutcome::NoPosts => {
            output.info("Takip ettiğiniz kişiler henüz tavsiye paylaşmadı.");
            Ok(())
        }
    }
}
