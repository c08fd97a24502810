//! Stream composition engine for Tally.
//!
//! Keeps a locally displayed expense collection consistent with an
//! asynchronous backing store. The engine is built from small stages
//! connected by tokio channels: `mpsc` carries input events and the stream of
//! submission streams, `watch` publishes the latest materialized view of each
//! observable surface.
//!
//! # Stages
//!
//! - [`wrap`] -- turns one async call plus a placeholder into a
//!   [`ResourceStream`] (Pending, then Fulfilled or Rejected)
//! - [`merge`] -- folds submission streams into the collection optimistically
//! - [`SubmissionWorkflow`] -- closed/open/submitting latch around `add`
//! - [`filter`] -- debounced, case-insensitive search over the collection
//! - [`project`] -- derives a watch channel from another (used for [`Meta`])
//!
//! # Ordering
//!
//! Within one submission Pending always precedes the terminal value. Across
//! submissions the workflow latch and the sequential merger guarantee at most
//! one placeholder is ever in the collection.

pub mod config;
pub mod debounce;
pub mod error;
pub mod filter;
pub mod merge;
pub mod meta;
pub mod project;
pub mod resource;
pub mod workflow;

pub use config::FlowConfig;
pub use debounce::Debounce;
pub use error::{FlowError, FlowResult};
pub use filter::{filter, filter_collection, matches, FilterPipeline, FilteredView};
pub use merge::{apply, merge, AddStream, MergedCollection, Settlement};
pub use meta::Meta;
pub use project::project;
pub use resource::{wrap, ResourceStream};
pub use workflow::{Effect, SubmissionWorkflow, Transition, Trigger, WorkflowEvent, WorkflowState};
