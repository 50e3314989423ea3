use anyhow::Result;
use clap::Args;
use tavsiyece::{RedisStore, SearchOutcome, Tavsiyece};

use crate::examples::ExampleGroup;
use crate::output::{OutputManager, SearchReport};

pub const EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Search",
    commands: &[
        "tavsiyece search kahve                # Users starting with 'kahve' and posts tagged 'kahve'",
        "tavsiyece search \"film önerisi\"       # Posts containing every word",
    ],
}];

#[derive(Args)]
pub struct SearchArgs {
    /// Free-text query
    pub query: String,
}

pub async fn handle_search(args: SearchArgs, app: &Tavsiyece<RedisStore>, output: &OutputManager) -> Result<()> {
    let results = match app.search().search(&args.query).await {
        SearchOutcome::Inactive => {
            output.warning("Arama yapmak için bir şeyler yazın.");
            return Ok(());
        }
        SearchOutcome::Results(results) => results,
    };

    for failure in &results.failures {
        output.error(&failure.error.user_message());
        output.verbose(&format!("{:?} search failed: {}", failure.section, failure.error));
    }
    if results.is_empty() && results.failures.is_empty() {
        output.info("Sonuç bulunamadı.");
        return Ok(());
    }

    output.heading(&format!("\"{}\" için sonuçlar", args.query.trim()));
    output.display(&SearchReport::from(&results))
}
