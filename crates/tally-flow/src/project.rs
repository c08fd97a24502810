use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Derive a watch channel from another by applying `f` to every value.
///
/// The derived channel starts with `f` applied to the current source value
/// and is recomputed on each source change. The task ends when the source
/// sender is dropped or every derived receiver is gone.
pub fn project<A, B, F>(
    mut source: watch::Receiver<A>,
    f: F,
) -> (watch::Receiver<B>, JoinHandle<()>)
where
    A: Send + Sync + 'static,
    B: Send + Sync + 'static,
    F: Fn(&A) -> B + Send + 'static,
{
    let initial = f(&*source.borrow_and_update());
    let (tx, rx) = watch::channel(initial);

    let task = tokio::spawn(async move {
        loop {
            tokio::select! {
                changed = source.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                _ = tx.closed() => break,
            }
            let next = f(&*source.borrow_and_update());
            tx.send_replace(next);
        }
    });

    (rx, task)
}
