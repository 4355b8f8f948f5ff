//! Corpus scans.
//!
//! A parsed [`Query`] is immutable, so one instance is shared read-only
//! across every card (and every worker thread for parallel scans).

use rayon::prelude::*;

use crate::ast::Query;
use crate::config::SearchSettings;
use crate::eval::{CardAccessor, evaluate};

/// Returns the cards matching `query`, in corpus order.
pub fn search<'c, C: CardAccessor>(query: &Query, cards: &'c [C]) -> Vec<&'c C> {
    let matches: Vec<&C> = cards.iter().filter(|card| evaluate(query, *card)).collect();
    log::debug!("scanned {} cards, {} matched {query}", cards.len(), matches.len());
    matches
}

/// Like [`search`], evaluating cards on the rayon thread pool.
///
/// Results keep corpus order.
pub fn search_parallel<'c, C: CardAccessor + Sync>(query: &Query, cards: &'c [C]) -> Vec<&'c C> {
    let matches: Vec<&C> = cards
        .par_iter()
        .filter(|card| evaluate(query, *card))
        .collect();
    log::debug!(
        "scanned {} cards in parallel, {} matched {query}",
        cards.len(),
        matches.len()
    );
    matches
}

/// Runs a scan according to `settings`, truncating to `settings.limit`.
pub fn search_with<'c, C: CardAccessor + Sync>(
    query: &Query,
    cards: &'c [C],
    settings: &SearchSettings,
) -> Vec<&'c C> {
    if !settings.parallel
        && let Some(limit) = settings.limit
    {
        // Sequential scans can stop early.
        return cards
            .iter()
            .filter(|card| evaluate(query, *card))
            .take(limit)
            .collect();
    }

    let mut matches = if settings.parallel {
        search_parallel(query, cards)
    } else {
        search(query, cards)
    };
    if let Some(limit) = settings.limit {
        matches.truncate(limit);
    }
    matches
}
