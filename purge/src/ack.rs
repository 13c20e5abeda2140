use shared::Result;
use std::fmt;
use tokio::sync::oneshot;

/// Single-use acknowledgment callback.
///
/// Consuming `self` in [`Ack::resolve`] makes a second invocation impossible.
pub struct Ack<T> {
    callback: Box<dyn FnOnce(Result<T>) + Send + 'static>,
}

impl<T: Send + 'static> Ack<T> {
    pub fn new<F>(callback: F) -> Self
    where
        F: FnOnce(Result<T>) + Send + 'static,
    {
        Self {
            callback: Box::new(callback),
        }
    }

    /// Ack whose outcome is delivered through a oneshot channel.
    ///
    /// The receiver yields `Err(RecvError)` if the ack is dropped unresolved.
    pub fn channel() -> (Self, oneshot::Receiver<Result<T>>) {
        let (tx, rx) = oneshot::channel();
        let ack = Self::new(move |result| {
            // receiver may have given up waiting
            let _ = tx.send(result);
        });
        (ack, rx)
    }

    pub fn resolve(self, result: Result<T>) {
        (self.callback)(result)
    }

    /// Ack accepting `U`, converting a success with `convert` before resolving this one.
    pub fn adapt<U, F>(self, convert: F) -> Ack<U>
    where
        U: Send + 'static,
        F: FnOnce(U) -> T + Send + 'static,
    {
        Ack::new(move |result: Result<U>| self.resolve(result.map(convert)))
    }
}

impl<T> fmt::Debug for Ack<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ack").finish_non_exhaustive()
    }
}
