/// Customization seam for a [`QuorumRequest`](crate::QuorumRequest).
///
/// Two forms: implement [`RequestHandler`] on a struct (mockable, can
/// collect responses as they are filtered), or use [`Callbacks`] for
/// inline closures with default filtering.
use std::fmt;
use std::marker::PhantomData;

use crate::types::MessageWithSender;

/// Decides which inbound messages count as responses and reacts to
/// quorum and completion.
pub trait RequestHandler<M> {
    /// The typed response this request waits for.
    type Response: MessageWithSender;

    /// Map an inbound message to a response, or `None` if it does not apply.
    fn filter_response(&mut self, message: M) -> Option<Self::Response>;

    /// Called once, when a majority of members has responded.
    fn on_quorum_reached(&mut self) {}

    /// Called once, when every member has responded.
    fn on_completed(&mut self) {}
}

type Callback = Box<dyn FnMut() + Send>;

/// Closure-based handler.
///
/// Accepts any message that converts into `R` (`M: TryInto<R>`); a message
/// that already is an `R` always converts.
///
/// ```rust
/// use paxos_protocol::{Callbacks, Member, MessageWithSender};
///
/// struct Promise { from: Member }
///
/// impl MessageWithSender for Promise {
///     fn sender(&self) -> Member { self.from }
/// }
///
/// let callbacks = Callbacks::<Promise>::new()
///     .on_quorum(|| println!("majority promised"))
///     .on_completed(|| println!("everyone promised"));
/// ```
pub struct Callbacks<R> {
    quorum: Option<Callback>,
    completed: Option<Callback>,
    _response: PhantomData<fn() -> R>,
}

impl<R> Callbacks<R> {
    pub fn new() -> Self {
        Self {
            quorum: None,
            completed: None,
            _response: PhantomData,
        }
    }

    /// Run `f` when quorum is reached.
    pub fn on_quorum(mut self, f: impl FnMut() + Send + 'static) -> Self {
        self.quorum = Some(Box::new(f));
        self
    }

    /// Run `f` when every member has responded.
    pub fn on_completed(mut self, f: impl FnMut() + Send + 'static) -> Self {
        self.completed = Some(Box::new(f));
        self
    }
}

impl<R> Default for Callbacks<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> fmt::Debug for Callbacks<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callbacks")
            .field("quorum", &self.quorum.is_some())
            .field("completed", &self.completed.is_some())
            .finish()
    }
}

impl<M, R> RequestHandler<M> for Callbacks<R>
where
    R: MessageWithSender,
    M: TryInto<R>,
{
    type Response = R;

    fn filter_response(&mut self, message: M) -> Option<R> {
        message.try_into().ok()
    }

    fn on_quorum_reached(&mut self) {
        if let Some(f) = self.quorum.as_mut() {
            f();
        }
    }

    fn on_completed(&mut self) {
        if let Some(f) = self.completed.as_mut() {
            f();
        }
    }
}
