use crate::domain::models::UserId;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::warn;

pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// When a user's cooldown runs out. A duration too large for the platform's
/// `Instant` range never runs out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expiry {
    At(Instant),
    Never { cooldown_seconds: u64 },
}

impl Expiry {
    fn after(now: Instant, cooldown_seconds: u64) -> Self {
        match now.checked_add(Duration::from_secs(cooldown_seconds)) {
            Some(at) => Expiry::At(at),
            None => Expiry::Never { cooldown_seconds },
        }
    }

    /// Whole seconds left, rounded up; `None` once expired.
    fn remaining(self, now: Instant) -> Option<u64> {
        match self {
            Expiry::At(at) if at > now => Some(ceil_seconds(at - now)),
            Expiry::At(_) => None,
            Expiry::Never { cooldown_seconds } => Some(cooldown_seconds),
        }
    }
}

/// Per-user expiries. The map lock covers the whole check-then-set, so
/// two concurrent acquisitions for one user cannot both pass.
pub struct CooldownGate {
    cooldown_seconds: AtomicU64,
    clock: Box<dyn Clock>,
    expiries: Mutex<HashMap<UserId, Expiry>>,
}

impl CooldownGate {
    pub fn new(cooldown_seconds: u64, clock: Box<dyn Clock>) -> Self {
        Self {
            cooldown_seconds: AtomicU64::new(cooldown_seconds),
            clock,
            expiries: Mutex::new(HashMap::new()),
        }
    }

    /// On success the user's expiry is moved to `now + cooldown`. On failure
    /// returns the whole seconds left, rounded up.
    pub fn try_acquire(&self, user: &UserId) -> Result<(), u64> {
        let now = self.clock.now();
        let mut expiries = self.expiries.lock();
        if let Some(expiry) = expiries.get(user).copied() {
            if let Some(left) = expiry.remaining(now) {
                return Err(left);
            }
            expiries.remove(user);
        }
        let cooldown = self.cooldown_seconds.load(Ordering::Relaxed);
        if cooldown > 0 {
            let expiry = Expiry::after(now, cooldown);
            if let Expiry::Never { .. } = expiry {
                warn!(%user, cooldown, "cooldown exceeds the clock range; user stays throttled");
            }
            expiries.insert(user.clone(), expiry);
        }
        Ok(())
    }

    /// Give back a reservation whose emission did not go through.
    pub fn release(&self, user: &UserId) {
        self.expiries.lock().remove(user);
    }

    /// Applies to acquisitions from now on; existing expiries are kept.
    pub fn set_cooldown_seconds(&self, seconds: u64) {
        self.cooldown_seconds.store(seconds, Ordering::Relaxed);
    }

    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut expiries = self.expiries.lock();
        let before = expiries.len();
        expiries.retain(|_, expiry| expiry.remaining(now).is_some());
        before - expiries.len()
    }

    pub fn clear(&self) {
        self.expiries.lock().clear();
    }

    pub fn tracked(&self) -> usize {
        self.expiries.lock().len()
    }
}

fn ceil_seconds(d: Duration) -> u64 {
    let ms = d.as_millis() as u64;
    ms.div_ceil(1000)
}


#[cfg(test)]
mod tests {
    use super::testing::ManualClock;
    use super::*;
    use std::sync::Arc;
    use std::sync::Barrier;

    #[test]
    fn throttles_until_expiry() {
        let clock = ManualClock::new();
        let gate = CooldownGate::new(5, Box::new(clock.clone()));
        let u = UserId::new("u");
        assert_eq!(gate.try_acquire(&u), Ok(()));
        assert_eq!(gate.try_acquire(&u), Err(5));
        clock.advance(Duration::from_millis(1500));
        assert_eq!(gate.try_acquire(&u), Err(4));
        clock.advance(Duration::from_millis(3600));
        assert_eq!(gate.try_acquire(&u), Ok(()));
        assert_eq!(gate.try_acquire(&u), Err(5));
    }

    #[test]
    fn users_are_independent() {
        let gate = CooldownGate::new(5, Box::new(ManualClock::new()));
        assert!(gate.try_acquire(&UserId::new("a")).is_ok());
        assert!(gate.try_acquire(&UserId::new("b")).is_ok());
        assert!(gate.try_acquire(&UserId::new("a")).is_err());
    }

    #[test]
    fn zero_cooldown_never_throttles() {
        let gate = CooldownGate::new(0, Box::new(ManualClock::new()));
        let u = UserId::new("u");
        for _ in 0..5 {
            assert_eq!(gate.try_acquire(&u), Ok(()));
        }
        assert_eq!(gate.tracked(), 0);
    }

    #[test]
    fn purge_and_clear_drop_entries() {
        let clock = ManualClock::new();
        let gate = CooldownGate::new(2, Box::new(clock.clone()));
        gate.try_acquire(&UserId::new("a")).unwrap();
        clock.advance(Duration::from_secs(1));
        gate.try_acquire(&UserId::new("b")).unwrap();
        clock.advance(Duration::from_millis(1500));
        assert_eq!(gate.purge_expired(), 1);
        assert_eq!(gate.tracked(), 1);
        gate.clear();
        assert!(gate.try_acquire(&UserId::new("b")).is_ok());
    }

    #[test]
    fn simultaneous_acquisitions_admit_exactly_one() {
        let gate = Arc::new(CooldownGate::new(5, Box::new(SystemClock)));
        let barrier = Arc::new(Barrier::new(16));
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let gate = gate.clone();
                let barrier = barrier.clone();
                std::thread::spawn(move || {
                    barrier.wait();
                    gate.try_acquire(&UserId::new("same")).is_ok()
                })
            })
            .collect();
        let admitted = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();
        assert_eq!(admitted, 1);
    }

    #[test]
    fn cooldown_beyond_clock_range_throttles_without_panicking() {
        let huge = i64::MAX as u64;
        let gate = CooldownGate::new(huge, Box::new(SystemClock));
        let u = UserId::new("u");
        assert_eq!(gate.try_acquire(&u), Ok(()));
        assert_eq!(gate.try_acquire(&u), Err(huge));
        assert_eq!(gate.purge_expired(), 0);
        gate.release(&u);
        assert_eq!(gate.try_acquire(&u), Ok(()));
    }
}
