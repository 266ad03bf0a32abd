use std::future::Future;
use std::time::Duration;

use tokio::sync::oneshot;

/// The single terminal state of a user-visible side effect such as
/// rendering an invoice for print or download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion<T> {
    Completed(T),
    Cancelled,
    TimedOut,
}

/// Handle given to the worker; dropping it without calling `finish`
/// resolves the operation as cancelled.
pub struct CompletionSignal<T> {
    sender: oneshot::Sender<T>,
}

impl<T> CompletionSignal<T> {
    pub fn finish(self, value: T) {
        let _ = self.sender.send(value);
    }
}

/// Runs `work` with a completion signal and waits for exactly one outcome.
pub async fn run_bounded<T, F, Fut>(timeout: Duration, work: F) -> Completion<T>
where
    T: Send + 'static,
    F: FnOnce(CompletionSignal<T>) -> Fut,
    Fut: Future<Output = ()> + Send + 'static,
{
    let (sender, receiver) = oneshot::channel();
    let task = tokio::spawn(work(CompletionSignal { sender }));

    let outcome = match tokio::time::timeout(timeout, receiver).await {
        Ok(Ok(value)) => Completion::Completed(value),
        Ok(Err(_)) => Completion::Cancelled,
        Err(_) => Completion::TimedOut,
    };

    if !matches!(outcome, Completion::Completed(_)) {
        task.abort();
    }
    outcome
}
