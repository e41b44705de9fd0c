//! Domain expansion eligibility and the process-wide cooldown map.
//!
//! Cooldowns are keyed by `(owner id, pet display name)`, not by a stable pet
//! identifier, so a renamed pet would start with a fresh cooldown.

use crate::clock::Clock;
use crate::pet::Pet;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;

type CooldownKey = (String, String);

pub struct DomainCooldowns {
    last_used: DashMap<CooldownKey, DateTime<Utc>>,
    clock: Arc<dyn Clock>,
    cooldown: chrono::Duration,
}

impl DomainCooldowns {
    pub fn new(clock: Arc<dyn Clock>, cooldown: chrono::Duration) -> Self {
        Self {
            last_used: DashMap::new(),
            clock,
            cooldown,
        }
    }

    /// True when `pet` is mythic and has not unleashed its domain for
    /// `owner_id` within the cooldown window. Read-only.
    pub fn can_use_domain_expansion(&self, owner_id: &str, pet: &Pet) -> bool {
        if !pet.is_mythic() {
            return false;
        }
        let key = (owner_id.to_string(), pet.name.clone());
        match self.last_used.get(&key) {
            Some(last) => self.clock.now() - *last >= self.cooldown,
            None => true,
        }
    }

    /// Stamp the cooldown for `(owner_id, pet_name)` with the current time.
    /// Entries whose cooldown has run out are dropped on the way.
    pub fn record_use(&self, owner_id: &str, pet_name: &str) -> DateTime<Utc> {
        let now = self.clock.now();
        self.prune_expired(now);
        self.last_used
            .insert((owner_id.to_string(), pet_name.to_string()), now);
        tracing::debug!(owner_id, pet_name, %now, "Domain expansion cooldown started");
        now
    }

    fn prune_expired(&self, now: DateTime<Utc>) {
        self.last_used.retain(|_, last| now - *last < self.cooldown);
    }

    /// Number of pets currently on cooldown or not yet pruned.
    pub fn tracked(&self) -> usize {
        self.last_used.len()
    }

    pub fn last_use(&self, owner_id: &str, pet_name: &str) -> Option<DateTime<Utc>> {
        self.last_used
            .get(&(owner_id.to_string(), pet_name.to_string()))
            .map(|entry| *entry)
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }
}

impl std::fmt::Debug for DomainCooldowns {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DomainCooldowns")
            .field("entries", &self.last_used.len())
            .field("cooldown", &self.cooldown)
            .finish()
    }
}
