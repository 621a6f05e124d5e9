use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use pathmem_types::{PlayerProfile, SessionOutcome};
use uuid::Uuid;

/// Binds an optimistic log entry to the transaction attempt that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CorrelationId(Uuid);

impl CorrelationId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileMutation {
    /// Install a profile. Has no effect if one is already present.
    Create(PlayerProfile),
    RecordOutcome(SessionOutcome),
}

impl ProfileMutation {
    fn apply(&self, profile: &mut Option<PlayerProfile>) {
        match self {
            Self::Create(created) => {
                if profile.is_none() {
                    *profile = Some(created.clone());
                }
            }
            Self::RecordOutcome(outcome) => {
                if let Some(profile) = profile.as_mut() {
                    profile.record_outcome(outcome);
                }
            }
        }
    }
}

#[derive(Debug)]
struct Entry {
    id: CorrelationId,
    mutation: ProfileMutation,
}

#[derive(Debug, Default)]
struct StoreState {
    confirmed: Option<PlayerProfile>,
    log: Vec<Entry>,
}

impl StoreState {
    fn view(&self) -> Option<PlayerProfile> {
        let mut profile = self.confirmed.clone();
        for entry in &self.log {
            entry.mutation.apply(&mut profile);
        }
        profile
    }

    fn take(&mut self, id: CorrelationId) -> Option<Entry> {
        let index = self.log.iter().position(|entry| entry.id == id)?;
        Some(self.log.remove(index))
    }
}

/// Process-wide view of the caller's profile.
///
/// What readers see is the confirmed profile with every outstanding optimistic
/// entry replayed on top, in submission order. Cloning shares the same store.
#[derive(Debug, Clone, Default)]
pub struct ProfileStore {
    state: Arc<Mutex<StoreState>>,
}

impl ProfileStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_profile(profile: PlayerProfile) -> Self {
        Self {
            state: Arc::new(Mutex::new(StoreState {
                confirmed: Some(profile),
                log: Vec::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The profile as the UI should show it, optimistic entries included.
    #[must_use]
    pub fn view(&self) -> Option<PlayerProfile> {
        self.lock().view()
    }

    /// The profile without any unconfirmed entries.
    #[must_use]
    pub fn confirmed(&self) -> Option<PlayerProfile> {
        self.lock().confirmed.clone()
    }

    #[must_use]
    pub fn has_profile(&self) -> bool {
        self.lock().view().is_some()
    }

    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.lock().log.len()
    }

    pub fn apply_optimistic(&self, id: CorrelationId, mutation: ProfileMutation) {
        tracing::debug!(correlation_id = %id, ?mutation, "Applying optimistic profile update");
        self.lock().log.push(Entry { id, mutation });
    }

    /// Fold the entry into the confirmed profile. Returns `false` if no entry has this id.
    pub fn confirm(&self, id: CorrelationId) -> bool {
        let mut state = self.lock();
        let Some(entry) = state.take(id) else {
            return false;
        };
        entry.mutation.apply(&mut state.confirmed);
        true
    }

    /// Drop the entry as if it had never been applied. Returns `false` if no entry has this id.
    pub fn revert(&self, id: CorrelationId) -> bool {
        let reverted = self.lock().take(id).is_some();
        if reverted {
            tracing::debug!(correlation_id = %id, "Reverted optimistic profile update");
        }
        reverted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(level: u8, score: u64, won: bool) -> SessionOutcome {
        SessionOutcome {
            level,
            score,
            lives_remaining: if won { 2 } else { 0 },
            won,
        }
    }

    #[test]
    fn create_then_confirm() {
        let store = ProfileStore::new();
        let id = CorrelationId::new();
        store.apply_optimistic(id, ProfileMutation::Create(PlayerProfile::spawned("0xa", 1)));

        assert!(store.has_profile());
        assert_eq!(store.confirmed(), None);

        assert!(store.confirm(id));
        assert_eq!(store.confirmed(), Some(PlayerProfile::spawned("0xa", 1)));
        assert_eq!(store.pending_len(), 0);
    }

    #[test]
    fn create_never_replaces_existing_profile() {
        let mut existing = PlayerProfile::spawned("0xa", 1);
        existing.wins = 4;
        let store = ProfileStore::with_profile(existing.clone());

        let id = CorrelationId::new();
        store.apply_optimistic(id, ProfileMutation::Create(PlayerProfile::spawned("0xa", 9)));
        assert!(store.confirm(id));
        assert_eq!(store.view(), Some(existing));
    }

    #[test]
    fn revert_leaves_other_entries_intact() {
        let store = ProfileStore::with_profile(PlayerProfile::spawned("0xa", 1));
        let first = CorrelationId::new();
        let second = CorrelationId::new();
        store.apply_optimistic(first, ProfileMutation::RecordOutcome(outcome(3, 700, true)));
        store.apply_optimistic(second, ProfileMutation::RecordOutcome(outcome(5, 40, false)));

        assert!(store.revert(first));

        let view = store.view().unwrap();
        assert_eq!(view.games_played, 1);
        assert_eq!(view.wins, 0);
        assert_eq!(view.losses, 1);
        assert_eq!(view.best_level, 5);
        assert_eq!(view.last_score, 40);
    }

    #[test]
    fn revert_restores_prior_view_exactly() {
        let store = ProfileStore::with_profile(PlayerProfile::spawned("0xa", 1));
        let before = store.view();

        let id = CorrelationId::new();
        store.apply_optimistic(id, ProfileMutation::RecordOutcome(outcome(2, 150, true)));
        assert_ne!(store.view(), before);

        assert!(store.revert(id));
        assert_eq!(store.view(), before);
        assert!(!store.revert(id));
    }

    #[test]
    fn outcome_without_profile_is_a_no_op() {
        let store = ProfileStore::new();
        let id = CorrelationId::new();
        store.apply_optimistic(id, ProfileMutation::RecordOutcome(outcome(1, 50, true)));
        assert!(!store.has_profile());
        assert!(store.confirm(id));
        assert_eq!(store.confirmed(), None);
    }

    #[test]
    fn clones_share_state() {
        let store = ProfileStore::new();
        let other = store.clone();
        let id = CorrelationId::new();
        other.apply_optimistic(id, ProfileMutation::Create(PlayerProfile::spawned("0xb", 2)));
        assert!(store.has_profile());
    }
}
