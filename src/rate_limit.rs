use governor::clock::{Clock, DefaultClock};
use governor::state::keyed::DefaultKeyedStateStore;
use governor::{Quota, RateLimiter};
use std::cmp::Reverse;
use std::num::NonZeroU32;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::{Duration, Instant};
use tracing::debug;

/// Riot limits per routing value: 20 requests every second, 100 every 2 minutes.
const REQUESTS_PER_SECOND: u32 = 20;
const REQUESTS_PER_TWO_MINUTES: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Idle,
    Pending { ticket: u64, fire_at: Instant },
}

#[derive(Debug)]
struct ThrottleState {
    last_start: Option<Instant>,
    slot: Slot,
    next_ticket: u64,
}

enum Admission {
    Now,
    Deferred { ticket: u64, fire_at: Instant },
}

/// Spaces the starts of calls to `func` at least `interval` apart.
///
/// The first call after a quiet period runs straight away. A call that comes
/// in too early is deferred until `last_start + interval`. Only one deferred
/// call is kept: a newer one replaces it, and the replaced caller gets `None`
/// back without `func` ever running.
///
/// Callers that await each call before issuing the next never get replaced,
/// so for them this is simply a fixed delay between calls.
pub struct Throttle<F> {
    func: F,
    interval: Duration,
    state: Mutex<ThrottleState>,
}

impl<F> Throttle<F> {
    pub fn new(func: F, interval: Duration) -> Self {
        Throttle {
            func,
            interval,
            state: Mutex::new(ThrottleState {
                last_start: None,
                slot: Slot::Idle,
                next_ticket: 0,
            }),
        }
    }

    pub fn call<A, R>(&self, arg: A) -> Option<R>
    where
        F: Fn(A) -> R,
    {
        match self.admit(Instant::now()) {
            Admission::Now => Some((self.func)(arg)),
            Admission::Deferred { ticket, fire_at } => {
                let wait = fire_at.saturating_duration_since(Instant::now());
                debug!(wait_ms = wait.as_millis() as u64, ticket, "deferring throttled call");
                thread::sleep(wait);

                if self.fire(ticket) {
                    Some((self.func)(arg))
                } else {
                    debug!(ticket, "throttled call superseded by a newer one");
                    None
                }
            }
        }
    }

    fn state(&self) -> MutexGuard<'_, ThrottleState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn admit(&self, now: Instant) -> Admission {
        let mut state = self.state();
        let ticket = state.next_ticket;

        let fire_at = match state.slot {
            // Replace whatever is waiting; it keeps its slot in time.
            Slot::Pending { fire_at, .. } => fire_at,
            Slot::Idle => match state.last_start {
                Some(last) if now < last + self.interval => last + self.interval,
                _ => {
                    state.last_start = Some(now);
                    return Admission::Now;
                }
            },
        };

        state.next_ticket += 1;
        state.slot = Slot::Pending { ticket, fire_at };
        Admission::Deferred { ticket, fire_at }
    }

    fn fire(&self, ticket: u64) -> bool {
        let mut state = self.state();
        match state.slot {
            Slot::Pending { ticket: current, .. } if current == ticket => {
                state.slot = Slot::Idle;
                state.last_start = Some(Instant::now());
                true
            }
            _ => false,
        }
    }
}

type HostRateLimiter = RateLimiter<String, DefaultKeyedStateStore<String>, DefaultClock>;

/// Blocks requests until every quota admits them. Quotas are tracked per host,
/// which is how Riot scopes its limits (na1, euw1, americas, ...).
pub struct UpstreamQuota {
    limiters: Vec<HostRateLimiter>,
    clock: DefaultClock,
}

impl UpstreamQuota {
    /// Quotas are checked longest window first, so a long wait never holds a
    /// cell of a shorter window that would have refilled meanwhile.
    pub fn new(quotas: impl IntoIterator<Item = Quota>) -> Self {
        let mut quotas: Vec<Quota> = quotas.into_iter().collect();
        quotas.sort_by_key(|q| Reverse(q.replenish_interval() * q.burst_size().get()));

        UpstreamQuota {
            limiters: quotas.into_iter().map(HostRateLimiter::keyed).collect(),
            clock: DefaultClock::default(),
        }
    }

    pub fn riot_defaults() -> Self {
        let per_second = Quota::per_second(NonZeroU32::new(REQUESTS_PER_SECOND).expect("non-zero"));
        let per_two_minutes = Quota::with_period(Duration::from_secs(120) / REQUESTS_PER_TWO_MINUTES)
            .expect("non-zero period")
            .allow_burst(NonZeroU32::new(REQUESTS_PER_TWO_MINUTES).expect("non-zero"));

        Self::new([per_second, per_two_minutes])
    }

    /// Waits until `host` may send another request. Returns the time spent waiting.
    pub fn acquire(&self, host: &str) -> Duration {
        let key = host.to_string();
        let mut waited = Duration::ZERO;

        for limiter in &self.limiters {
            while let Err(not_until) = limiter.check_key(&key) {
                let wait = not_until.wait_time_from(self.clock.now());
                debug!(host, wait_ms = wait.as_millis() as u64, "upstream quota exhausted, waiting");
                waited += wait;
                thread::sleep(wait);
            }
        }

        waited
    }
}
