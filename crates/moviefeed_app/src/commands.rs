use std::sync::Arc;
use std::time::Duration;

use feed_logging::{feed_info, feed_warn};
use moviefeed_core::{CatalogItem, FeedViewModel, FilterSpec, SearchPhase, SearchViewModel};
use moviefeed_engine::{
    CatalogClient, FeedController, FetchOutcome, SearchController, SearchOutcome, SearchSettings,
};
use tokio::runtime::Handle;

/// Delay between simulated keystrokes for `search --typed`.
const KEYSTROKE_DELAY: Duration = Duration::from_millis(60);

pub async fn run_feed(client: Arc<dyn CatalogClient>, filters: FilterSpec, pages: u32) {
    let feed = FeedController::new(client, filters);
    report_fetch(feed.load_initial().await);

    for _ in 1..pages {
        let Some(last) = feed.view().items.last().map(|item| item.id) else {
            break;
        };
        let outcome = feed.on_item_appeared(last).await;
        let failed = matches!(outcome, FetchOutcome::Failed(_));
        report_fetch(outcome);
        if failed {
            report_fetch(feed.retry().await);
        }
    }

    print_feed(&feed.view());
    feed.close();
}

pub async fn run_search(
    client: Arc<dyn CatalogClient>,
    settings: SearchSettings,
    query: String,
    typed: bool,
) {
    let search = SearchController::new(client, settings, Handle::current());

    if typed {
        let mut updates = search.subscribe();
        let mut prefix = String::new();
        for ch in query.chars() {
            prefix.push(ch);
            search.on_query_changed(prefix.clone());
            tokio::time::sleep(KEYSTROKE_DELAY).await;
        }
        let settle = settings.debounce * 2 + Duration::from_secs(30);
        let settled = tokio::time::timeout(
            settle,
            updates.wait_for(|view| is_final(view, &prefix)),
        )
        .await
        .is_ok();
        if !settled {
            feed_warn!("Search did not settle within {:?}", settle);
        }
    } else {
        match search.search_now(query).await {
            SearchOutcome::Found(items) => feed_info!("Search returned {} item(s)", items.len()),
            SearchOutcome::NoResults => feed_info!("Search returned no results"),
            SearchOutcome::Failed(err) => feed_warn!("Search failed: {}", err),
            SearchOutcome::Invalid(_) | SearchOutcome::Superseded => {}
        }
    }

    print_search(&search.view());
    search.close();
}

fn is_final(view: &SearchViewModel, query: &str) -> bool {
    view.query == query
        && matches!(view.phase, SearchPhase::Settled(_) | SearchPhase::Idle)
}

fn report_fetch(outcome: FetchOutcome) {
    match outcome {
        FetchOutcome::Appended { page, stats } => feed_info!(
            "Page {}: {} new, {} duplicate(s) dropped",
            page,
            stats.appended,
            stats.skipped
        ),
        FetchOutcome::Failed(err) => feed_warn!("Page request failed: {}", err),
        FetchOutcome::Skipped(reason) => feed_info!("Page request skipped: {:?}", reason),
        FetchOutcome::Discarded => {}
    }
}

fn print_feed(view: &FeedViewModel) {
    if let Some(message) = &view.error_message {
        println!("error: {message}");
    }
    if view.items.is_empty() {
        println!("No movies found.");
        return;
    }
    for item in &view.items {
        println!("{}", format_item(item));
    }
    println!("-- {} movie(s), next page {}", view.items.len(), view.page);
}

fn print_search(view: &SearchViewModel) {
    if let Some(message) = &view.validation_message {
        println!("{message}");
        return;
    }
    match view.phase {
        SearchPhase::Settled(_) if view.is_empty_result() => {
            println!("No results for {:?}.", view.last_valid_query.as_deref().unwrap_or(""));
        }
        _ if view.error_message.is_some() => {
            println!("error: {}", view.error_message.as_deref().unwrap_or_default());
        }
        _ => {
            for item in &view.results {
                println!("{}", format_item(item));
            }
        }
    }
}

fn format_item(item: &CatalogItem) -> String {
    match (item.release_year(), item.vote_average) {
        (Some(year), Some(vote)) => format!("{:>8}  {} ({year}) {vote:.1}", item.id, item.title),
        (Some(year), None) => format!("{:>8}  {} ({year})", item.id, item.title),
        _ => format!("{:>8}  {}", item.id, item.title),
    }
}
