use std::{
    collections::{BTreeMap, BTreeSet, HashMap, HashSet},
    sync::{Mutex, MutexGuard},
    time::Duration,
};

use async_trait::async_trait;
use nong_core::{AssignmentStore, StoreError};
use nong_model::{
    MAX_SLOTS, PartnerId, Preference, QuotaSnapshot, Registrant, RegistrantId, SlotCounts,
};

use crate::seed::SeedTarget;

#[derive(Default)]
struct Inner {
    registrants: BTreeMap<RegistrantId, Registrant>,
    partners: BTreeSet<PartnerId>,
    /// Uniqueness index: partner -> registrant holding it.
    holders: HashMap<PartnerId, RegistrantId>,
}

/// In-process store backed by ordered maps.
///
/// Every operation takes the same mutex, so `atomic_assign` is trivially
/// transactional. An optional per-call latency widens the window between a
/// pool read and a persist, which lets tests provoke uniqueness conflicts.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    latency: Option<Duration>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep for `latency` before every async store call.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, StoreError> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Backend("memory store mutex poisoned".into()))
    }

    async fn io(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

impl SeedTarget for MemoryStore {
    fn insert_registrant(
        &self,
        id: &RegistrantId,
        preference: Preference,
    ) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        if inner.registrants.contains_key(id) {
            return Err(StoreError::Backend(format!("registrant {id} already exists")));
        }
        inner
            .registrants
            .insert(id.clone(), Registrant::new(id.clone(), preference));
        Ok(())
    }

    fn insert_partner(&self, id: &PartnerId) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        if !inner.partners.insert(id.clone()) {
            return Err(StoreError::Backend(format!("partner {id} already exists")));
        }
        Ok(())
    }
}

#[async_trait]
impl AssignmentStore for MemoryStore {
    async fn read_unassigned_partners(&self) -> Result<Vec<PartnerId>, StoreError> {
        self.io().await;
        let inner = self.lock()?;
        Ok(inner
            .partners
            .iter()
            .filter(|p| !inner.holders.contains_key(*p))
            .cloned()
            .collect())
    }

    async fn read_registrant_preference(
        &self,
        id: &RegistrantId,
    ) -> Result<Option<Preference>, StoreError> {
        self.io().await;
        Ok(self.lock()?.registrants.get(id).map(|r| r.preference))
    }

    async fn read_slot_counts(&self, id: &RegistrantId) -> Result<SlotCounts, StoreError> {
        self.io().await;
        self.lock()?
            .registrants
            .get(id)
            .map(Registrant::slot_counts)
            .ok_or_else(|| StoreError::NotFound(format!("registrant {id}")))
    }

    async fn read_quota_snapshot(&self) -> Result<QuotaSnapshot, StoreError> {
        self.io().await;
        let inner = self.lock()?;
        let mut snapshot = QuotaSnapshot::new();
        for r in inner.registrants.values() {
            snapshot
                .add(r.preference, r.slot_count() as u8, 1)
                .map_err(|e| StoreError::Backend(e.to_string()))?;
        }
        Ok(snapshot)
    }

    async fn atomic_assign(
        &self,
        id: &RegistrantId,
        partners: &[PartnerId],
    ) -> Result<(), StoreError> {
        self.io().await;
        let mut inner = self.lock()?;
        let Inner {
            registrants,
            partners: pool,
            holders,
        } = &mut *inner;

        let registrant = registrants
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(format!("registrant {id}")))?;
        if registrant.is_assigned() || partners.len() > MAX_SLOTS {
            return Err(StoreError::SlotOccupied {
                registrant: id.clone(),
            });
        }

        // Validate everything before the first write.
        let mut seen = HashSet::new();
        for partner in partners {
            if !pool.contains(partner) {
                return Err(StoreError::NotFound(format!("partner {partner}")));
            }
            if holders.contains_key(partner) || !seen.insert(partner) {
                return Err(StoreError::UniqueViolation {
                    partner: partner.clone(),
                });
            }
        }

        let mut incoming = partners.iter();
        for slot in registrant.slots.iter_mut().filter(|s| s.is_none()) {
            let Some(partner) = incoming.next() else {
                break;
            };
            *slot = Some(partner.clone());
            holders.insert(partner.clone(), id.clone());
        }
        Ok(())
    }

    async fn fetch_registrant(&self, id: &RegistrantId) -> Result<Option<Registrant>, StoreError> {
        self.io().await;
        Ok(self.lock()?.registrants.get(id).cloned())
    }
}
