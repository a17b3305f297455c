use serde::{Deserialize, Serialize};

use crate::{MAX_SLOTS, PartnerId, Preference, RegistrantId};

/// A registrant together with the partners already linked to it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registrant {
    pub id: RegistrantId,
    pub preference: Preference,
    /// Partner slots; filled front to back.
    pub slots: [Option<PartnerId>; MAX_SLOTS],
}

impl Registrant {
    /// Create a registrant with no assigned partners.
    pub fn new(id: impl Into<RegistrantId>, preference: Preference) -> Self {
        Self {
            id: id.into(),
            preference,
            slots: Default::default(),
        }
    }

    /// Number of occupied slots.
    pub fn slot_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Returns `true` once any slot holds a partner.
    pub fn is_assigned(&self) -> bool {
        self.slots.iter().any(Option::is_some)
    }

    /// Returns `true` once every slot holds a partner.
    pub fn is_fully_assigned(&self) -> bool {
        self.slot_count() >= MAX_SLOTS
    }

    /// Assigned partners in slot order.
    pub fn partners(&self) -> impl Iterator<Item = &PartnerId> {
        self.slots.iter().flatten()
    }

    /// Slot summary as reported by a store.
    pub fn slot_counts(&self) -> SlotCounts {
        SlotCounts::new(self.slot_count() as u8)
    }
}

/// Slot occupancy of a single registrant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotCounts {
    /// Occupied slots.
    pub count: u8,
    /// Whether no further partner can be added.
    pub already_full: bool,
}

impl SlotCounts {
    pub fn new(count: u8) -> Self {
        Self {
            count,
            already_full: count as usize >= MAX_SLOTS,
        }
    }

    /// Returns `true` once any slot holds a partner. An assigned registrant
    /// takes no further rounds, even with a slot left.
    pub fn is_assigned(&self) -> bool {
        self.count > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_registrant_has_no_partners() {
        let r = Registrant::new("s-1", Preference::Neutral);
        assert_eq!(r.slot_count(), 0);
        assert!(!r.is_assigned());
        assert!(!r.slot_counts().is_assigned());
        assert!(!r.is_fully_assigned());
        assert_eq!(r.partners().count(), 0);
    }

    #[test]
    fn both_slots_mean_fully_assigned() {
        let mut r = Registrant::new("s-1", Preference::PrefersTwo);
        r.slots = [Some(PartnerId::from("f-1")), Some(PartnerId::from("f-2"))];

        assert!(r.is_fully_assigned());
        assert_eq!(r.slot_counts(), SlotCounts { count: 2, already_full: true });
        assert!(r.slot_counts().is_assigned());
    }

    #[test]
    fn one_slot_is_assigned_but_not_full() {
        let mut r = Registrant::new("s-1", Preference::DeclinesTwo);
        r.slots[0] = Some(PartnerId::from("f-1"));

        assert!(r.is_assigned());
        assert!(!r.is_fully_assigned());
        assert_eq!(r.slot_counts(), SlotCounts { count: 1, already_full: false });
        assert!(r.slot_counts().is_assigned());
    }

    #[test]
    fn serde_uses_camel_case() {
        let r = Registrant::new("s-9", Preference::DeclinesTwo);
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["id"], "s-9");
        assert_eq!(json["preference"], "declines-two");
        assert_eq!(json["slots"], serde_json::json!([null, null]));
    }
}
