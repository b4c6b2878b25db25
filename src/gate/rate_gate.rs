use std::convert::Infallible;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use super::GateError;
use crate::utils::time::TimeUnit;

/// Throttles a rate limited operation.
///
/// Permits are concurrency slots: each admission takes one and hands it back
/// when the guarded operation completes. Draining the pool arms a cool-down of
/// one `period`, during which nobody is admitted, even if permits come back
/// earlier. A release that finds the pool drained re-arms the cool-down from
/// the moment of release.
///
/// Clones share the same state.
#[derive(Debug, Clone)]
pub struct RateGate {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    capacity: usize,
    period: Duration,
    state: Mutex<GateState>,
    released: Notify,
}

/// Both fields are always read and written under the same lock.
#[derive(Debug)]
struct GateState {
    available: usize,
    window_reset_at: Instant,
}

impl GateState {
    // Cool-down deadline never moves backward
    fn arm(&mut self, deadline: Instant) {
        if deadline > self.window_reset_at {
            self.window_reset_at = deadline;
        }
    }
}

enum Admission {
    Granted,
    CoolDown(Instant),
    Exhausted,
}

impl RateGate {
    /// Creates a gate admitting `capacity` operations per `period`.
    ///
    /// Fails with [`GateError::InvalidConfiguration`] when `capacity` is zero.
    pub fn new(capacity: usize, period: Duration) -> Result<Self, GateError> {
        if capacity == 0 {
            return Err(GateError::InvalidConfiguration(
                "capacity must be greater than zero".into(),
            ));
        }

        Ok(Self {
            inner: Arc::new(Inner {
                capacity,
                period,
                state: Mutex::new(GateState {
                    available: capacity,
                    window_reset_at: Instant::now(),
                }),
                released: Notify::new(),
            }),
        })
    }

    /// Creates a gate admitting `request_limit` operations per single `unit` of time.
    pub fn per_time_unit(unit: TimeUnit, request_limit: usize) -> Result<Self, GateError> {
        Self::new(request_limit, unit.as_duration())
    }

    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }

    pub fn period(&self) -> Duration {
        self.inner.period
    }

    /// Permits currently free to be claimed.
    pub fn available(&self) -> usize {
        self.inner.state.lock().available
    }

    /// Instant at which the current cool-down ends.
    pub fn window_reset_at(&self) -> Instant {
        self.inner.state.lock().window_reset_at
    }

    pub fn is_cooling_down(&self) -> bool {
        Instant::now() < self.window_reset_at()
    }

    /// Waits for admission and reserves one permit.
    ///
    /// Dropping the returned future before it completes is the way to give
    /// up waiting: no permit is consumed and the gate state is untouched.
    pub async fn acquire(&self) -> GatePermit {
        match self.admit(std::future::pending::<Infallible>()).await {
            Ok(permit) => permit,
            Err(never) => match never {},
        }
    }

    /// Waits for admission unless `token` is cancelled first.
    ///
    /// On cancellation returns [`GateError::Interrupted`] and leaves the gate
    /// exactly as it was before the call.
    pub async fn acquire_with_cancel(
        &self,
        token: &CancellationToken,
    ) -> Result<GatePermit, GateError> {
        self.admit(async {
            token.cancelled().await;
            warn!("Admission wait cancelled");
            GateError::Interrupted
        })
        .await
    }

    /// Runs `op` once admitted, releasing the permit on every exit path.
    ///
    /// The result of `op` is returned untouched.
    pub async fn run_guarded<F, Fut, T, E>(&self, op: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let _permit = self.acquire().await;
        op().await
    }

    /// Same as [`RateGate::run_guarded`], but gives up waiting when `token` is cancelled.
    pub async fn run_guarded_with_cancel<F, Fut, T, E>(
        &self,
        token: &CancellationToken,
        op: F,
    ) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: From<GateError>,
    {
        let _permit = self.acquire_with_cancel(token).await?;
        op().await
    }

    async fn admit<C, E>(&self, cancel: C) -> Result<GatePermit, E>
    where
        C: Future<Output = E>,
    {
        tokio::pin!(cancel);

        loop {
            // Registered before the state is inspected so a release in between is not lost
            let notified = self.inner.released.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            match self.inner.try_admit(Instant::now()) {
                Admission::Granted => {
                    return Ok(GatePermit {
                        inner: self.inner.clone(),
                    })
                }
                Admission::CoolDown(deadline) => {
                    trace!("Gate cooling down, waiting until {:?}", deadline);
                    tokio::select! {
                        _ = sleep_until(deadline) => {}
                        reason = &mut cancel => {
                            self.inner.abandon_wait();
                            return Err(reason);
                        }
                    }
                }
                Admission::Exhausted => {
                    trace!("No permits available, queueing");
                    tokio::select! {
                        _ = notified.as_mut() => {}
                        reason = &mut cancel => {
                            self.inner.abandon_wait();
                            return Err(reason);
                        }
                    }
                }
            }
        }
    }
}

impl Inner {
    fn try_admit(&self, now: Instant) -> Admission {
        let remaining = {
            let mut state = self.state.lock();

            if now < state.window_reset_at {
                return Admission::CoolDown(state.window_reset_at);
            }

            if state.available == 0 {
                return Admission::Exhausted;
            }

            state.available -= 1;

            if state.available == 0 {
                state.arm(now + self.period);
                debug!(
                    "Permit pool exhausted, cool-down armed for {:?}",
                    self.period
                );
            }

            state.available
        };

        trace!("Admitted, {} of {} permits left", remaining, self.capacity);

        // Pass the wake-up on while permits remain so queued callers keep moving
        if remaining > 0 {
            self.released.notify_one();
        }

        Admission::Granted
    }

    fn release(&self) {
        {
            let mut state = self.state.lock();
            let observed_exhausted = state.available == 0;

            state.available = (state.available + 1).min(self.capacity);

            if observed_exhausted {
                state.arm(Instant::now() + self.period);
                debug!(
                    "Release observed exhausted pool, cool-down re-armed for {:?}",
                    self.period
                );
            }
        }

        self.released.notify_one();
    }

    fn abandon_wait(&self) {
        // A wake-up this caller consumed must not be lost for the rest of the queue
        if self.state.lock().available > 0 {
            self.released.notify_one();
        }
    }
}

/// One reserved slot of a [`RateGate`].
///
/// Handed back to the gate when dropped, so release happens on every exit
/// path of the guarded operation, unwinding included.
#[must_use = "the permit is released as soon as it is dropped"]
#[derive(Debug)]
pub struct GatePermit {
    inner: Arc<Inner>,
}

impl GatePermit {
    /// Hands the permit back to the gate.
    pub fn release(self) {
        drop(self);
    }
}

impl Drop for GatePermit {
    fn drop(&mut self) {
        self.inner.release();
    }
}
