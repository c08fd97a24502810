use std::fmt::Debug;

use futures_util::StreamExt;
use tally_types::{Collection, Expense, Resource};
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::resource::ResourceStream;

/// Resource stream of one add operation: the placeholder is the optimistic
/// record, the value is the store-confirmed record.
pub type AddStream<E> = ResourceStream<Expense, Expense, E>;

/// Terminal outcome of one submission, published after the collection has
/// been reconciled.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Settlement<E> {
    Fulfilled(Expense),
    Rejected(E),
}

impl<E> Settlement<E> {
    pub fn is_fulfilled(&self) -> bool {
        matches!(self, Self::Fulfilled(_))
    }
}

/// Apply one resource state to the collection.
///
/// - `Pending` prepends the placeholder.
/// - `Fulfilled` replaces the placeholder with the confirmed record.
/// - `Rejected` removes the placeholder.
///
/// Submissions are serialized, so the placeholder being reconciled is the
/// head of the collection. If the head is not a placeholder the front-most
/// placeholder is used instead; a fulfilled record with no placeholder left
/// to replace is prepended.
///
/// Returns the settlement for terminal states.
pub fn apply<E: Debug>(
    collection: &mut Collection,
    resource: Resource<Expense, Expense, E>,
) -> Option<Settlement<E>> {
    match resource {
        Resource::Pending { placeholder } => {
            collection.prepend(placeholder);
            None
        }
        Resource::Fulfilled { value } => {
            match placeholder_slot(collection) {
                Some(index) => {
                    collection.replace_at(index, value.clone());
                }
                None => {
                    warn!(id = %value.id, "no placeholder to replace; prepending confirmed record");
                    collection.prepend(value.clone());
                }
            }
            Some(Settlement::Fulfilled(value))
        }
        Resource::Rejected { error } => {
            match placeholder_slot(collection) {
                Some(index) => {
                    collection.remove_at(index);
                }
                None => warn!(?error, "no placeholder to roll back"),
            }
            Some(Settlement::Rejected(error))
        }
    }
}

fn placeholder_slot(collection: &Collection) -> Option<usize> {
    if collection.head().is_some_and(Expense::is_placeholder) {
        return Some(0);
    }
    let index = collection.placeholder_position()?;
    warn!(index, "placeholder is not at the head of the collection");
    Some(index)
}

/// Handles to a running merger.
pub struct MergedCollection<E> {
    collection: watch::Receiver<Collection>,
    settlements: broadcast::Sender<Settlement<E>>,
    task: JoinHandle<()>,
}

impl<E: Clone> MergedCollection<E> {
    /// Latest materialized collection.
    pub fn collection(&self) -> watch::Receiver<Collection> {
        self.collection.clone()
    }

    /// Subscribe to settlements published after this call.
    pub fn subscribe_settlements(&self) -> broadcast::Receiver<Settlement<E>> {
        self.settlements.subscribe()
    }

    /// Split into the raw channel ends and the task handle.
    pub fn into_parts(
        self,
    ) -> (
        watch::Receiver<Collection>,
        broadcast::Sender<Settlement<E>>,
        JoinHandle<()>,
    ) {
        (self.collection, self.settlements, self.task)
    }
}

/// Spawn the optimistic merger.
///
/// The accumulator starts as `base` and is published on the returned watch
/// channel after every fold step. Submission streams are consumed one at a
/// time in arrival order; a stream queued behind an unsettled one waits
/// until the earlier one settles. Each terminal state is also broadcast as
/// a [`Settlement`], after the reconciled collection is visible.
///
/// The task ends when every submission sender has been dropped.
pub fn merge<E>(
    base: Collection,
    mut submissions: mpsc::UnboundedReceiver<AddStream<E>>,
    settlement_capacity: usize,
) -> MergedCollection<E>
where
    E: Clone + Debug + Send + 'static,
{
    let (collection_tx, collection_rx) = watch::channel(base.clone());
    let (settlement_tx, _) = broadcast::channel(settlement_capacity.max(1));
    let settlements = settlement_tx.clone();

    let task = tokio::spawn(async move {
        let mut accumulator = base;
        while let Some(mut stream) = submissions.recv().await {
            while let Some(resource) = stream.next().await {
                let settlement = apply(&mut accumulator, resource);
                debug!(
                    len = accumulator.len(),
                    settled = settlement.is_some(),
                    "collection folded"
                );
                collection_tx.send_replace(accumulator.clone());
                if let Some(settlement) = settlement {
                    // No subscribers is fine; the collection already reflects it.
                    let _ = settlement_tx.send(settlement);
                }
            }
        }
        debug!("submission channel closed; merger stopped");
    });

    MergedCollection {
        collection: collection_rx,
        settlements,
        task,
    }
}
