//! Shared production and consumption quotas.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::debug;

/// Outcome of [`TerminationCoordinator::try_claim_production`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Claim {
    /// The caller owns the given 1-based production ordinal.
    Proceed(usize),
    /// Quota exhausted (or cancelled); stop producing.
    Done,
}

#[derive(Debug, Default)]
struct Production {
    claimed: usize,
    deposited: usize,
    cancelled: bool,
}

impl Production {
    fn no_more_claims(&self, target: usize) -> bool {
        self.cancelled || self.claimed >= target
    }
}

/// Apportions a fixed number of items across any number of producers and
/// consumers.
///
/// Production and consumption are tracked under separate locks. Claims are
/// handed out one at a time, so with `target` = T exactly T claims ever
/// succeed no matter how many producers race for them.
///
/// Production counts as finished once no more claims can succeed *and*
/// every claimed item has been deposited; that is the moment a buffer fed by
/// the producers can be closed.
#[derive(Debug)]
pub struct TerminationCoordinator {
    target: usize,
    production: Mutex<Production>,
    consumed: Mutex<usize>,
}

impl TerminationCoordinator {
    pub fn new(target: usize) -> Self {
        Self {
            target,
            production: Mutex::new(Production::default()),
            consumed: Mutex::new(0),
        }
    }

    pub fn target(&self) -> usize {
        self.target
    }

    /// Claims one unit of production quota.
    pub fn try_claim_production(&self) -> Claim {
        let mut production = self.lock_production();
        if production.no_more_claims(self.target) {
            return Claim::Done;
        }
        production.claimed += 1;
        Claim::Proceed(production.claimed)
    }

    /// Reports that a claimed item has been handed to the buffer.
    ///
    /// Returns `true` if this deposit finished production.
    pub fn record_deposit(&self) -> bool {
        let mut production = self.lock_production();
        debug_assert!(
            production.deposited < production.claimed,
            "deposit without a matching claim"
        );
        production.deposited += 1;
        production.no_more_claims(self.target) && production.deposited == production.claimed
    }

    /// `true` once no claim can succeed and every claimed item is deposited.
    pub fn is_production_finished(&self) -> bool {
        let production = self.lock_production();
        production.no_more_claims(self.target) && production.deposited == production.claimed
    }

    /// Adds `n` withdrawn items to the consumption counter and returns the
    /// new total. The counter never exceeds the target.
    pub fn record_consumption(&self, n: usize) -> usize {
        let mut consumed = self.lock_consumed();
        *consumed = (*consumed + n).min(self.target);
        *consumed
    }

    pub fn is_consumption_finished(&self) -> bool {
        *self.lock_consumed() >= self.target
    }

    /// Stops all further claims. Claims already granted are unaffected.
    pub fn cancel(&self) {
        let mut production = self.lock_production();
        if !production.cancelled {
            production.cancelled = true;
            debug!(
                claimed = production.claimed,
                target = self.target,
                "production cancelled"
            );
        }
    }

    pub fn claimed(&self) -> usize {
        self.lock_production().claimed
    }

    pub fn deposited(&self) -> usize {
        self.lock_production().deposited
    }

    pub fn consumed(&self) -> usize {
        *self.lock_consumed()
    }

    fn lock_production(&self) -> MutexGuard<'_, Production> {
        self.production
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_consumed(&self) -> MutexGuard<'_, usize> {
        self.consumed.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn claims_stop_at_target() {
        let coordinator = TerminationCoordinator::new(3);
        assert_eq!(coordinator.try_claim_production(), Claim::Proceed(1));
        assert_eq!(coordinator.try_claim_production(), Claim::Proceed(2));
        assert_eq!(coordinator.try_claim_production(), Claim::Proceed(3));
        assert_eq!(coordinator.try_claim_production(), Claim::Done);
        assert_eq!(coordinator.claimed(), 3);
    }

    #[test]
    fn production_finishes_on_last_deposit() {
        let coordinator = TerminationCoordinator::new(2);
        coordinator.try_claim_production();
        coordinator.try_claim_production();
        assert!(!coordinator.is_production_finished());

        assert!(!coordinator.record_deposit());
        assert!(!coordinator.is_production_finished());
        assert!(coordinator.record_deposit());
        assert!(coordinator.is_production_finished());
    }

    #[test]
    fn zero_target_is_finished_immediately() {
        let coordinator = TerminationCoordinator::new(0);
        assert_eq!(coordinator.try_claim_production(), Claim::Done);
        assert!(coordinator.is_production_finished());
        assert!(coordinator.is_consumption_finished());
    }

    #[test]
    fn consumption_saturates_at_target() {
        let coordinator = TerminationCoordinator::new(3);
        assert_eq!(coordinator.record_consumption(2), 2);
        assert!(!coordinator.is_consumption_finished());
        assert_eq!(coordinator.record_consumption(2), 3);
        assert!(coordinator.is_consumption_finished());
    }

    #[test]
    fn cancel_blocks_new_claims() {
        let coordinator = TerminationCoordinator::new(10);
        assert_eq!(coordinator.try_claim_production(), Claim::Proceed(1));
        coordinator.cancel();
        assert_eq!(coordinator.try_claim_production(), Claim::Done);
        assert!(!coordinator.is_production_finished());
        assert!(coordinator.record_deposit());
    }

    #[test]
    fn concurrent_claims_are_exact() {
        const TARGET: usize = 10_000;
        let coordinator = Arc::new(TerminationCoordinator::new(TARGET));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let coordinator = Arc::clone(&coordinator);
                thread::spawn(move || {
                    let mut ordinals = Vec::new();
                    while let Claim::Proceed(n) = coordinator.try_claim_production() {
                        ordinals.push(n);
                    }
                    ordinals
                })
            })
            .collect();

        let mut all: Vec<usize> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        all.sort_unstable();
        assert_eq!(all, (1..=TARGET).collect::<Vec<_>>());
    }
}
