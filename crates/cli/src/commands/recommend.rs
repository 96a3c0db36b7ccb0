use serde::Serialize;

use shopsense_agent::TrackEvent;
use shopsense_core::domain::product::{format_price, ProductId};
use shopsense_core::recommendations::ScoredProduct;

use crate::commands::session::Session;
use crate::commands::{build_runtime, load_config, to_details, CommandFailure, CommandResult};

/// Signals to replay before ranking, since behavior is not kept between runs.
#[derive(Clone, Debug, Default)]
pub struct RecommendArgs {
    pub limit: Option<usize>,
    pub viewed: Vec<String>,
    pub searched: Vec<String>,
}

#[derive(Debug, Serialize)]
struct Ranked<'a> {
    id: &'a str,
    name: &'a str,
    price: String,
    score: f64,
    reasoning: &'a [String],
}

pub fn run(args: RecommendArgs) -> CommandResult {
    let config = match load_config("recommend") {
        Ok(config) => config,
        Err(result) => return result,
    };
    let runtime = match build_runtime("recommend") {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };
    let limit = args.limit.unwrap_or(config.assistant.default_recommendation_limit);

    let result = runtime.block_on(async {
        let session = Session::open(&config).await?;
        let mut assistant = session.default_assistant(&config).await;
        for id in &args.viewed {
            assistant.track(TrackEvent::View(ProductId::new(id.as_str())));
        }
        for query in &args.searched {
            assistant.track(TrackEvent::Search(query.clone()));
        }
        let ranked = assistant.explain_recommendations(limit);
        session.close().await;
        Ok::<_, CommandFailure>(ranked)
    });

    match result {
        Ok(ranked) => {
            let rows = ranked.iter().map(ranked_row).collect::<Vec<_>>();
            CommandResult::success_with(
                "recommend",
                format!("{} recommendations", rows.len()),
                to_details(&rows),
            )
        }
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("recommend", error_class, message, exit_code)
        }
    }
}

fn ranked_row(scored: &ScoredProduct) -> Ranked<'_> {
    Ranked {
        id: scored.product.id.as_str(),
        name: &scored.product.name,
        price: format_price(scored.product.price),
        score: scored.score,
        reasoning: &scored.reasoning,
    }
}
