use std::sync::Arc;

use tally_flow::{
    filter, merge, project, FilteredView, FlowConfig, FlowError, Meta, Settlement,
    SubmissionWorkflow, WorkflowEvent, WorkflowState,
};
use tally_store::{ExpenseStore, StoreError};
use tally_types::{Collection, ExpenseDraft};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::error::{SdkError, SdkResult};

/// A live expense session.
///
/// Owns the stage tasks wiring the backing store to the observable surfaces.
/// Dropping the session stops every task.
pub struct Expenses {
    collection: watch::Receiver<Collection>,
    filtered: watch::Receiver<FilteredView>,
    meta: watch::Receiver<Meta>,
    settlements: broadcast::Sender<Settlement<StoreError>>,
    workflow: Arc<SubmissionWorkflow>,
    queries: mpsc::UnboundedSender<String>,
    tasks: Vec<JoinHandle<()>>,
}

impl Expenses {
    /// Fetch the base collection and start the session.
    ///
    /// A failing `list()` is returned as [`SdkError::Fetch`]; no stages are
    /// started in that case.
    pub async fn open(store: Arc<dyn ExpenseStore>, config: &FlowConfig) -> SdkResult<Self> {
        let records = store.list().await.map_err(SdkError::Fetch)?;
        info!(count = records.len(), "listed expenses");

        let (submission_tx, submission_rx) = mpsc::unbounded_channel();
        let merged = merge(
            Collection::from(records),
            submission_rx,
            config.settlement_capacity,
        );

        // Subscribe before any submission can be made.
        let workflow = Arc::new(SubmissionWorkflow::new(store, submission_tx));
        let listener = workflow.listen(merged.subscribe_settlements());
        let (collection, settlements, merge_task) = merged.into_parts();

        let (queries, query_rx) = mpsc::unbounded_channel();
        let (filtered, filter_task) = filter(collection.clone(), query_rx, config).into_parts();
        let (meta, meta_task) = project(collection.clone(), Meta::from_collection);

        Ok(Self {
            collection,
            filtered,
            meta,
            settlements,
            workflow,
            queries,
            tasks: vec![merge_task, listener, filter_task, meta_task],
        })
    }

    /// The full collection, including an optimistic placeholder while an add
    /// is in flight.
    pub fn collection(&self) -> watch::Receiver<Collection> {
        self.collection.clone()
    }

    /// The collection narrowed by the debounced search query.
    pub fn filtered_collection(&self) -> watch::Receiver<FilteredView> {
        self.filtered.clone()
    }

    pub fn workflow_state(&self) -> watch::Receiver<WorkflowState> {
        self.workflow.subscribe()
    }

    /// Distinct origins and people, recomputed on each collection change.
    pub fn meta(&self) -> watch::Receiver<Meta> {
        self.meta.clone()
    }

    /// Settlements of submissions made after this call.
    pub fn settlements(&self) -> broadcast::Receiver<Settlement<StoreError>> {
        self.settlements.subscribe()
    }

    /// Feed raw search text. Applied after the debounce quiet period.
    pub fn on_search_change(&self, text: impl Into<String>) -> SdkResult<()> {
        self.queries
            .send(text.into())
            .map_err(|_| SdkError::Flow(FlowError::SearchChannelClosed))
    }

    /// Feed a UI event into the create-expense workflow.
    pub fn on_workflow_event(&self, event: WorkflowEvent) -> WorkflowState {
        self.workflow.handle(event)
    }

    /// Run the whole workflow for one draft and wait for its settlement.
    ///
    /// A rejected add is returned as `Ok(Settlement::Rejected(_))`. When this
    /// returns the collection is reconciled and the workflow is unlatched, so
    /// another `submit` can follow immediately.
    pub async fn submit(&self, draft: ExpenseDraft) -> SdkResult<Settlement<StoreError>> {
        if self.workflow.state().is_submitting() {
            return Err(FlowError::SubmissionInFlight.into());
        }
        let mut settlements = self.settlements();

        self.on_workflow_event(WorkflowEvent::Open);
        match self.on_workflow_event(WorkflowEvent::Submit(draft)) {
            WorkflowState::Submitting => {}
            WorkflowState::Closed => return Err(FlowError::SubmissionChannelClosed.into()),
            WorkflowState::Open => return Err(FlowError::SubmissionInFlight.into()),
        }

        let settlement = loop {
            match settlements.recv().await {
                Ok(settlement) => break settlement,
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => return Err(FlowError::SubmissionChannelClosed.into()),
            }
        };
        debug!(fulfilled = settlement.is_fulfilled(), "submission settled");

        // The latch is released by the listener task, which may not have run yet.
        self.workflow_state()
            .wait_for(|s| !s.is_submitting())
            .await
            .map_err(|_| FlowError::SubmissionChannelClosed)?;
        Ok(settlement)
    }
}

impl Drop for Expenses {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

impl std::fmt::Debug for Expenses {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Expenses")
            .field("records", &self.collection.borrow().len())
            .field("workflow", &self.workflow.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::DateTime;
    use std::time::Duration;
    use tally_store::{InMemoryExpenseStore, StoreConfig, StoreResult};
    use tally_types::{Expense, RecordId};

    fn record(id: &str, origin: &str, description: &str, amount: u64, charged: &str) -> Expense {
        Expense::confirmed(
            RecordId::confirmed(id).unwrap(),
            DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
            ExpenseDraft::new(origin, description, amount, charged),
        )
    }

    fn base() -> Vec<Expense> {
        vec![record("1", "Store", "Milk", 500, "Ann")]
    }

    fn store(latency_ms: u64) -> Arc<InMemoryExpenseStore> {
        let config = StoreConfig {
            latency_ms,
            ..StoreConfig::default()
        };
        Arc::new(InMemoryExpenseStore::with_records(config, base()))
    }

    struct Offline;

    #[async_trait]
    impl ExpenseStore for Offline {
        async fn list(&self) -> StoreResult<Vec<Expense>> {
            Err(StoreError::Unavailable("offline".into()))
        }

        async fn add(&self, _draft: ExpenseDraft) -> StoreResult<Expense> {
            Err(StoreError::Unavailable("offline".into()))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn open_publishes_base_collection() {
        let session = Expenses::open(store(2000), &FlowConfig::default()).await.unwrap();
        assert_eq!(session.collection().borrow().clone(), Collection::from(base()));
        assert_eq!(session.filtered_collection().borrow().records, Collection::from(base()));
        assert_eq!(*session.workflow_state().borrow(), WorkflowState::Closed);

        let meta = session.meta().borrow().clone();
        assert_eq!(meta.origins, vec!["Store"]);
        assert_eq!(meta.people, vec!["Ann"]);
    }

    #[tokio::test]
    async fn fetch_failure_is_an_error() {
        let err = Expenses::open(Arc::new(Offline), &FlowConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SdkError::Fetch(StoreError::Unavailable(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn rejected_submission_shows_placeholder_then_rolls_back() {
        let session = Expenses::open(store(2000), &FlowConfig::default()).await.unwrap();
        let mut collection = session.collection();
        let mut state = session.workflow_state();
        let mut settlements = session.settlements();

        session.on_workflow_event(WorkflowEvent::Open);
        let next = session.on_workflow_event(WorkflowEvent::Submit(ExpenseDraft::new(
            "Cafe", "bad", 300, "Bob",
        )));
        assert_eq!(next, WorkflowState::Submitting);

        collection.changed().await.unwrap();
        {
            let intermediate = collection.borrow_and_update();
            assert_eq!(intermediate.len(), 2);
            assert!(intermediate[0].is_placeholder());
            assert_eq!(intermediate[0].origin, "Cafe");
            assert_eq!(intermediate[1].id.as_str(), "1");
        }

        // Latched while in flight.
        assert_eq!(
            session.on_workflow_event(WorkflowEvent::Cancel),
            WorkflowState::Submitting
        );

        let settlement = settlements.recv().await.unwrap();
        assert_eq!(
            settlement,
            Settlement::Rejected(StoreError::Rejected("bad description".into()))
        );
        assert_eq!(*collection.borrow(), Collection::from(base()));
        state.wait_for(|s| *s == WorkflowState::Closed).await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn successful_submission_prepends_store_record() {
        let backing = store(2000);
        let session = Expenses::open(backing.clone(), &FlowConfig::default())
            .await
            .unwrap();

        let settlement = session
            .submit(ExpenseDraft::new("Cafe", "Latte", 300, "Bob"))
            .await
            .unwrap();
        let Settlement::Fulfilled(confirmed) = settlement else {
            panic!("expected fulfilled settlement");
        };
        assert!(!confirmed.id.is_pending());

        let collection = session.collection().borrow().clone();
        assert_eq!(collection.len(), 2);
        assert_eq!(collection[0], confirmed);
        assert_eq!(&collection[1..], &base()[..]);
        assert_eq!(backing.snapshot()[0], confirmed);

        let mut state = session.workflow_state();
        state.wait_for(|s| *s == WorkflowState::Closed).await.unwrap();

        let mut meta_rx = session.meta();
        let meta = meta_rx.wait_for(|m| m.origins.len() == 2).await.unwrap().clone();
        assert_eq!(meta.origins, vec!["Cafe", "Store"]);
    }

    #[tokio::test(start_paused = true)]
    async fn search_is_debounced_through_the_session() {
        let session = Expenses::open(store(0), &FlowConfig::default()).await.unwrap();
        let mut view = session.filtered_collection();

        session.on_search_change("a").unwrap();
        session.on_search_change("an").unwrap();
        session.on_search_change("ann").unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!view.has_changed().unwrap());

        view.changed().await.unwrap();
        let applied = view.borrow_and_update().clone();
        assert_eq!(applied.query, "ann");
        assert_eq!(applied.pass, 2);
        assert_eq!(applied.records, Collection::from(base()));

        session.on_search_change("9.99").unwrap();
        let empty = view.wait_for(|v| v.query == "9.99").await.unwrap().clone();
        assert!(empty.records.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn submit_while_in_flight_is_refused() {
        let session = Expenses::open(store(2000), &FlowConfig::default()).await.unwrap();
        session.on_workflow_event(WorkflowEvent::Open);
        session.on_workflow_event(WorkflowEvent::Submit(ExpenseDraft::new("A", "", 1, "B")));

        let err = session
            .submit(ExpenseDraft::new("C", "", 1, "D"))
            .await
            .unwrap_err();
        assert!(matches!(err, SdkError::Flow(FlowError::SubmissionInFlight)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn back_to_back_submissions_on_multi_thread_runtime() {
        let session = Expenses::open(store(0), &FlowConfig::default()).await.unwrap();

        for round in 0..100 {
            let first = session
                .submit(ExpenseDraft::new("A", "", 100, "B"))
                .await
                .unwrap();
            assert!(first.is_fulfilled(), "round {round}");
            assert!(!session.workflow_state().borrow().is_submitting());

            let second = session
                .submit(ExpenseDraft::new("C", "bad", 100, "D"))
                .await
                .unwrap_or_else(|e| panic!("round {round}: {e}"));
            assert!(!second.is_fulfilled());
        }

        let collection = session.collection().borrow().clone();
        assert_eq!(collection.len(), 101);
        assert_eq!(collection.placeholder_count(), 0);
    }
}
