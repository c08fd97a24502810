use serde::{Deserialize, Serialize};
use tally_types::{Collection, Expense};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::config::FlowConfig;
use crate::debounce::Debounce;

/// Result of one filter pass.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilteredView {
    /// Query the records were filtered with, as typed.
    pub query: String,
    /// Number of passes run so far, starting at 1 for the initial view.
    pub pass: u64,
    pub records: Collection,
}

/// Case-insensitive substring match over the searchable fields.
///
/// `needle` must already be lowercased. The amount is matched in its
/// displayed form, so `"$5"` and `"5.5"` both work.
pub fn matches(expense: &Expense, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    [
        expense.origin.as_str(),
        expense.description.as_str(),
        expense.formatted_amount().as_str(),
        expense.charged.as_str(),
    ]
    .iter()
    .any(|field| field.to_lowercase().contains(needle))
}

/// Records of `collection` matching `query`, in collection order.
pub fn filter_collection(collection: &Collection, query: &str) -> Collection {
    let needle = query.to_lowercase();
    collection
        .iter()
        .filter(|expense| matches(expense, &needle))
        .cloned()
        .collect()
}

/// Handles to a running filter stage.
pub struct FilterPipeline {
    view: watch::Receiver<FilteredView>,
    task: JoinHandle<()>,
}

impl FilterPipeline {
    pub fn view(&self) -> watch::Receiver<FilteredView> {
        self.view.clone()
    }

    pub fn into_parts(self) -> (watch::Receiver<FilteredView>, JoinHandle<()>) {
        (self.view, self.task)
    }
}

/// Spawn the search-filter stage.
///
/// The empty query is applied immediately. Queries are debounced by
/// `config.search_debounce()`; the collection is re-filtered with the
/// current query on every collection change. The task ends when either
/// input closes.
pub fn filter(
    mut collection: watch::Receiver<Collection>,
    mut queries: mpsc::UnboundedReceiver<String>,
    config: &FlowConfig,
) -> FilterPipeline {
    let initial = FilteredView {
        query: String::new(),
        pass: 1,
        records: collection.borrow_and_update().clone(),
    };
    let (view_tx, view_rx) = watch::channel(initial);
    let quiet = config.search_debounce();

    let task = tokio::spawn(async move {
        let mut debounce = Debounce::new(quiet);
        let mut query = String::new();
        let mut pass = 1u64;

        loop {
            tokio::select! {
                changed = collection.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                next = queries.recv() => {
                    match next {
                        Some(next) => debounce.push(next),
                        None => break,
                    }
                    continue;
                }
                settled = debounce.ready(), if debounce.is_armed() => {
                    query = settled;
                }
            }

            pass += 1;
            let records = filter_collection(&collection.borrow_and_update(), &query);
            debug!(pass, query = %query, matched = records.len(), "filter pass");
            view_tx.send_replace(FilteredView {
                query: query.clone(),
                pass,
                records,
            });
        }
        debug!("filter input closed; filter stopped");
    });

    FilterPipeline {
        view: view_rx,
        task,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use proptest::prelude::*;
    use std::time::Duration;
    use tally_types::{ExpenseDraft, RecordId};

    fn record(id: &str, origin: &str, description: &str, amount: u64, charged: &str) -> Expense {
        Expense::confirmed(
            RecordId::confirmed(id).unwrap(),
            DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
            ExpenseDraft::new(origin, description, amount, charged),
        )
    }

    fn base() -> Collection {
        Collection::from(vec![record("1", "Store", "Milk", 500, "Ann")])
    }

    fn mixed() -> Collection {
        Collection::from(vec![
            record("3", "Cafe", "Latte", 550, "Bob"),
            record("2", "Gym", "", 1234, "Ann"),
            record("1", "Store", "Milk", 500, "Ann"),
        ])
    }

    // -----------------------------------------------------------------------
    // Predicate
    // -----------------------------------------------------------------------

    #[test]
    fn query_matches_counterparty_case_insensitively() {
        assert_eq!(filter_collection(&base(), "ann"), base());
        assert_eq!(filter_collection(&base(), "ANN"), base());
    }

    #[test]
    fn unmatched_amount_yields_nothing() {
        assert!(filter_collection(&base(), "9.99").is_empty());
    }

    #[test]
    fn amount_matches_displayed_form() {
        let c = mixed();
        let ids = |q: &str| {
            filter_collection(&c, q)
                .iter()
                .map(|e| e.id.to_string())
                .collect::<Vec<_>>()
        };
        assert_eq!(ids("$5.5"), vec!["3"]);
        assert_eq!(ids("12.34"), vec!["2"]);
        assert_eq!(ids("$5"), vec!["3", "1"]);
    }

    #[test]
    fn empty_query_keeps_everything_in_order() {
        assert_eq!(filter_collection(&mixed(), ""), mixed());
    }

    proptest! {
        #[test]
        fn filtering_is_deterministic(query in "[a-zA-Z0-9$. ]{0,6}") {
            let c = mixed();
            prop_assert_eq!(filter_collection(&c, &query), filter_collection(&c, &query));
        }

        #[test]
        fn filtering_is_idempotent(query in "[a-zA-Z0-9$. ]{0,6}") {
            let once = filter_collection(&mixed(), &query);
            prop_assert_eq!(filter_collection(&once, &query), once.clone());
        }
    }

    // -----------------------------------------------------------------------
    // Running stage
    // -----------------------------------------------------------------------

    fn config() -> FlowConfig {
        FlowConfig {
            search_debounce_ms: 500,
            ..FlowConfig::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn initial_view_is_unfiltered() {
        let (_collection_tx, collection_rx) = watch::channel(mixed());
        let (_query_tx, query_rx) = mpsc::unbounded_channel();
        let pipeline = filter(collection_rx, query_rx, &config());

        let view = pipeline.view().borrow().clone();
        assert_eq!(view.pass, 1);
        assert_eq!(view.query, "");
        assert_eq!(view.records, mixed());
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_queries_produce_one_pass() {
        let (_collection_tx, collection_rx) = watch::channel(mixed());
        let (query_tx, query_rx) = mpsc::unbounded_channel();
        let pipeline = filter(collection_rx, query_rx, &config());
        let mut view = pipeline.view();
        view.borrow_and_update();

        for q in ["a", "ab", "abc"] {
            query_tx.send(q.to_string()).unwrap();
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        assert!(!view.has_changed().unwrap());

        view.changed().await.unwrap();
        let applied = view.borrow_and_update().clone();
        assert_eq!(applied.pass, 2);
        assert_eq!(applied.query, "abc");
        assert!(applied.records.is_empty());

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(!view.has_changed().unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn collection_change_refilters_with_current_query() {
        let (collection_tx, collection_rx) = watch::channel(base());
        let (query_tx, query_rx) = mpsc::unbounded_channel();
        let pipeline = filter(collection_rx, query_rx, &config());
        let mut view = pipeline.view();

        query_tx.send("ann".to_string()).unwrap();
        view.wait_for(|v| v.query == "ann").await.unwrap();

        collection_tx.send_replace(mixed());
        let refiltered = view.wait_for(|v| v.records.len() == 2).await.unwrap().clone();
        assert_eq!(refiltered.query, "ann");
        assert_eq!(refiltered.pass, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn stage_stops_when_queries_close() {
        let (_collection_tx, collection_rx) = watch::channel(base());
        let (query_tx, query_rx) = mpsc::unbounded_channel::<String>();
        let pipeline = filter(collection_rx, query_rx, &config());
        drop(query_tx);
        let (_view, task) = pipeline.into_parts();
        task.await.unwrap();
    }
}
