use std::fmt;
use std::sync::Arc;

use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use tally_store::{ExpenseStore, StoreError};
use tally_types::{Expense, ExpenseDraft};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::{FlowError, FlowResult};
use crate::merge::{AddStream, Settlement};
use crate::resource::wrap;

// ---------------------------------------------------------------------------
// States, events, transitions
// ---------------------------------------------------------------------------

/// State of the create-expense workflow.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowState {
    /// No form shown.
    #[default]
    Closed,
    /// Form shown, accepting input.
    Open,
    /// An add operation is in flight; every UI event is ignored.
    Submitting,
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Closed => "closed",
            Self::Open => "open",
            Self::Submitting => "submitting",
        };
        f.write_str(s)
    }
}

/// Events the presentation layer can send to the workflow.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WorkflowEvent {
    Open,
    Cancel,
    Submit(ExpenseDraft),
}

/// Everything that can drive a transition: a UI event, or the settlement of
/// the in-flight add. Only the workflow itself raises `Settled`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Trigger {
    Event(WorkflowEvent),
    Settled,
}

/// Side effect requested by a transition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    StartSubmission(ExpenseDraft),
}

/// Result of applying a trigger to a state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transition {
    pub next: WorkflowState,
    pub effect: Option<Effect>,
    /// `false` when the trigger did not match any transition for the state.
    pub accepted: bool,
}

impl Transition {
    fn to(next: WorkflowState) -> Self {
        Self {
            next,
            effect: None,
            accepted: true,
        }
    }

    fn ignored(state: WorkflowState) -> Self {
        Self {
            next: state,
            effect: None,
            accepted: false,
        }
    }
}

impl WorkflowState {
    /// Total transition function.
    ///
    /// | state      | trigger  | next       |
    /// |------------|----------|------------|
    /// | Closed     | Open     | Open       |
    /// | Open       | Cancel   | Closed     |
    /// | Open       | Submit   | Submitting (starts the add) |
    /// | Submitting | Settled  | Closed     |
    ///
    /// Every other combination leaves the state unchanged.
    pub fn transition(self, trigger: Trigger) -> Transition {
        use WorkflowState::*;

        match (self, trigger) {
            (Closed, Trigger::Event(WorkflowEvent::Open)) => Transition::to(Open),
            (Open, Trigger::Event(WorkflowEvent::Cancel)) => Transition::to(Closed),
            (Open, Trigger::Event(WorkflowEvent::Submit(draft))) => Transition {
                next: Submitting,
                effect: Some(Effect::StartSubmission(draft)),
                accepted: true,
            },
            (Submitting, Trigger::Settled) => Transition::to(Closed),
            (state, _) => Transition::ignored(state),
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open)
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self, Self::Submitting)
    }
}

// ---------------------------------------------------------------------------
// SubmissionWorkflow
// ---------------------------------------------------------------------------

/// Stateful driver around [`WorkflowState::transition`].
///
/// Publishes the current state on a watch channel and executes the
/// `StartSubmission` effect by wrapping `store.add(draft)` into an
/// [`AddStream`] and handing it to the merger. The latch is released only by
/// a settlement coming back from the merger (see [`Self::listen`]).
pub struct SubmissionWorkflow {
    state: watch::Sender<WorkflowState>,
    submissions: mpsc::UnboundedSender<AddStream<StoreError>>,
    store: Arc<dyn ExpenseStore>,
}

impl SubmissionWorkflow {
    pub fn new(
        store: Arc<dyn ExpenseStore>,
        submissions: mpsc::UnboundedSender<AddStream<StoreError>>,
    ) -> Self {
        let (state, _) = watch::channel(WorkflowState::Closed);
        Self {
            state,
            submissions,
            store,
        }
    }

    /// Current state.
    pub fn state(&self) -> WorkflowState {
        *self.state.borrow()
    }

    /// Observe state changes. Only actual changes are published.
    pub fn subscribe(&self) -> watch::Receiver<WorkflowState> {
        self.state.subscribe()
    }

    /// Feed a UI event into the machine and return the resulting state.
    pub fn handle(&self, event: WorkflowEvent) -> WorkflowState {
        self.apply(Trigger::Event(event))
    }

    /// Release the latch after the in-flight add settled.
    pub fn settle(&self) -> WorkflowState {
        self.apply(Trigger::Settled)
    }

    fn apply(&self, trigger: Trigger) -> WorkflowState {
        let mut effect = None;
        self.state.send_if_modified(|state| {
            let current = *state;
            let transition = current.transition(trigger);
            if transition.accepted {
                debug!(from = %current, to = %transition.next, "workflow transition");
            } else {
                debug!(state = %current, "workflow event ignored");
            }
            effect = transition.effect;
            *state = transition.next;
            current != transition.next
        });

        if let Some(Effect::StartSubmission(draft)) = effect {
            if let Err(e) = self.start_submission(draft) {
                warn!(error = %e, "could not start submission; closing workflow");
                self.state.send_replace(WorkflowState::Closed);
            }
        }
        self.state()
    }

    fn start_submission(&self, draft: ExpenseDraft) -> FlowResult<()> {
        info!(origin = %draft.origin, amount = draft.amount, "submitting expense");
        let placeholder = Expense::placeholder(&draft);
        let store = Arc::clone(&self.store);
        let stream = wrap(async move { store.add(draft).await }, placeholder).boxed();
        self.submissions
            .send(stream)
            .map_err(|_| FlowError::SubmissionChannelClosed)
    }

    /// Spawn a task that releases the latch on every settlement.
    ///
    /// A lagged receiver also releases the latch, since the skipped values
    /// can only be settlements. The task ends when the settlement channel
    /// closes; an in-flight submission can no longer settle at that point,
    /// so the latch is released first.
    pub fn listen(
        self: &Arc<Self>,
        mut settlements: broadcast::Receiver<Settlement<StoreError>>,
    ) -> JoinHandle<()> {
        let workflow = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                match settlements.recv().await {
                    Ok(Settlement::Fulfilled(expense)) => {
                        info!(id = %expense.id, "submission confirmed");
                        workflow.settle();
                    }
                    Ok(Settlement::Rejected(error)) => {
                        warn!(%error, "submission rejected");
                        workflow.settle();
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "settlement listener lagged");
                        workflow.settle();
                    }
                    Err(RecvError::Closed) => {
                        if workflow.state().is_submitting() {
                            warn!("settlement channel closed mid-submission; releasing latch");
                            workflow.settle();
                        }
                        break;
                    }
                }
            }
            debug!("settlement channel closed; listener stopped");
        })
    }
}

impl fmt::Debug for SubmissionWorkflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubmissionWorkflow")
            .field("state", &self.state())
            .finish()
    }
}
