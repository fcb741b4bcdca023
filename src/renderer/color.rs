use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::contact_tracker::MAX_SLOTS;
use crate::event_model::{Contact, NO_TRACKING_ID};

/// 0xRRGGBB
pub type Rgb = u32;

/// 槽位 -> (上一次见到的 tracking id, 颜色)
///
/// 只有槽位里的 tracking id 变了才换颜色, 同一个触点在各帧之间颜色不变
#[derive(Debug, Clone)]
pub struct ColorTable {
    entries: [(i32, Rgb); MAX_SLOTS],
    rng: StdRng,
}

impl Default for ColorTable {
    fn default() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }
}

impl ColorTable {
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            entries: [(NO_TRACKING_ID, 0); MAX_SLOTS],
            rng,
        }
    }

    pub fn color_for(&mut self, contact: &Contact) -> Rgb {
        let Some(entry) = self.entries.get_mut(contact.slot) else {
            return 0xffffff;
        };
        if entry.0 != contact.tracking_id {
            *entry = (contact.tracking_id, self.rng.r#gen::<u32>() & 0xffffff);
        }
        entry.1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact(slot: usize, id: i32) -> Contact {
        Contact {
            tracking_id: id,
            ..Contact::empty(slot)
        }
    }

    #[test]
    fn stable_while_id_unchanged() {
        let mut colors = ColorTable::with_seed(7);
        let first = colors.color_for(&contact(3, 100));
        for _ in 0..10 {
            assert_eq!(colors.color_for(&contact(3, 100)), first);
        }
    }

    #[test]
    fn new_id_new_color() {
        let mut colors = ColorTable::with_seed(7);
        let old = colors.color_for(&contact(3, 100));
        let new = colors.color_for(&contact(3, 101));
        assert_ne!(old, new);
        assert_eq!(colors.color_for(&contact(3, 101)), new);
    }

    #[test]
    fn slots_are_independent() {
        let mut colors = ColorTable::with_seed(1);
        let a = colors.color_for(&contact(0, 5));
        colors.color_for(&contact(1, 6));
        colors.color_for(&contact(1, 7));
        assert_eq!(colors.color_for(&contact(0, 5)), a);
    }

    #[test]
    fn colors_fit_in_24_bits() {
        let mut colors = ColorTable::with_seed(99);
        for id in 0..200 {
            assert!(colors.color_for(&contact(0, id)) <= 0xffffff);
        }
    }
}
