/// Async dispatch loop for a single [`QuorumRequest`].
///
/// One task owns the request and serializes every event onto it:
/// inbound messages from a channel and ticks from a local interval.
/// Nothing else touches the request while the loop runs.
use std::time::Duration;

use paxos_transport::CommLayer;
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};

use crate::handler::RequestHandler;
use crate::request::QuorumRequest;
use crate::types::Inbound;

/// Drive `request` until every member has responded, it is finished, or
/// `inbound_rx` closes. Returns the request so the caller can read its
/// final state (or keep driving it by hand).
///
/// Tick times are `baseline + elapsed`, where `elapsed` counts from the
/// first poll of this future: start driving at the baseline instant. A
/// request whose baseline is already in the past should use
/// [`drive_with_clock`] with the clock the baseline came from.
pub async fn drive<Req, H, T, M>(
    request: QuorumRequest<Req, H, T>,
    inbound_rx: mpsc::Receiver<M>,
    tick_every: Duration,
) -> QuorumRequest<Req, H, T>
where
    H: RequestHandler<M>,
    T: CommLayer,
{
    let start = Instant::now();
    let baseline = request.baseline();
    let clock = move || {
        let elapsed = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        baseline.saturating_add(elapsed)
    };
    drive_with_clock(request, inbound_rx, tick_every, clock).await
}

/// Like [`drive`], but every tick reads `clock` (milliseconds, same time
/// base as the request's baseline, e.g. [`now_ms`](crate::now_ms)).
pub async fn drive_with_clock<Req, H, T, M>(
    mut request: QuorumRequest<Req, H, T>,
    mut inbound_rx: mpsc::Receiver<M>,
    tick_every: Duration,
    mut clock: impl FnMut() -> u64,
) -> QuorumRequest<Req, H, T>
where
    H: RequestHandler<M>,
    T: CommLayer,
{
    let mut ticker = tokio::time::interval(tick_every.max(Duration::from_millis(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // Skip the immediate first tick
    ticker.tick().await;

    while !request.is_completed() && !request.is_finished() {
        tokio::select! {
            message = inbound_rx.recv() => match message {
                Some(message) => request.receive(Inbound::Message(message)),
                None => {
                    tracing::debug!("inbound channel closed, stopping request driver");
                    break;
                }
            },
            _ = ticker.tick() => request.tick(clock()),
        }
    }

    request
}
