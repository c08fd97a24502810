use std::future::Future;

use futures_util::future::{self, FutureExt};
use futures_util::stream::{self, BoxStream, FusedStream, StreamExt};
use tally_types::Resource;

/// Boxed resource stream, nameable so it can travel through channels.
pub type ResourceStream<T, P, E> = BoxStream<'static, Resource<T, P, E>>;

/// Wrap an asynchronous operation into a stream of [`Resource`] states.
///
/// Yields exactly two values: `Pending { placeholder }` without suspending,
/// then `Fulfilled` or `Rejected` once the operation settles. Failures are
/// delivered as data rather than ending the stream abnormally.
///
/// The operation is not polled until the stream is polled past the pending
/// value, so a stream nobody consumes never runs it. Dropping a `next()`
/// future while the operation is in flight keeps the operation, and the next
/// poll resumes it.
pub fn wrap<T, P, E, F>(operation: F, placeholder: P) -> impl FusedStream<Item = Resource<T, P, E>>
where
    F: Future<Output = Result<T, E>>,
{
    stream::once(future::ready(Resource::Pending { placeholder }))
        .chain(stream::once(operation.map(Resource::from_result)))
}
