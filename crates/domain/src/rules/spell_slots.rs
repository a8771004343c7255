//! Spell slot tables by caster progression.
//!
//! Slots are looked up per class from that class's own level. Pact casters
//! get all their slots at a single slot level, so their map has one entry.

use std::collections::BTreeMap;

use crate::catalog::CasterType;

/// Slot counts by spell level, index 0 is 1st level. Row `n` is class level `n + 1`.
const FULL_CASTER: [&[u32]; 20] = [
    &[2],
    &[3],
    &[4, 2],
    &[4, 3],
    &[4, 3, 2],
    &[4, 3, 3],
    &[4, 3, 3, 1],
    &[4, 3, 3, 2],
    &[4, 3, 3, 3, 1],
    &[4, 3, 3, 3, 2],
    &[4, 3, 3, 3, 2, 1],
    &[4, 3, 3, 3, 2, 1],
    &[4, 3, 3, 3, 2, 1, 1],
    &[4, 3, 3, 3, 2, 1, 1],
    &[4, 3, 3, 3, 2, 1, 1, 1],
    &[4, 3, 3, 3, 2, 1, 1, 1],
    &[4, 3, 3, 3, 2, 1, 1, 1, 1],
    &[4, 3, 3, 3, 3, 1, 1, 1, 1],
    &[4, 3, 3, 3, 3, 2, 1, 1, 1],
    &[4, 3, 3, 3, 3, 2, 2, 1, 1],
];

const HALF_CASTER: [&[u32]; 20] = [
    &[],
    &[2],
    &[3],
    &[3],
    &[4, 2],
    &[4, 2],
    &[4, 3],
    &[4, 3],
    &[4, 3, 2],
    &[4, 3, 2],
    &[4, 3, 3],
    &[4, 3, 3],
    &[4, 3, 3, 1],
    &[4, 3, 3, 1],
    &[4, 3, 3, 2],
    &[4, 3, 3, 2],
    &[4, 3, 3, 3, 1],
    &[4, 3, 3, 3, 1],
    &[4, 3, 3, 3, 2],
    &[4, 3, 3, 3, 2],
];

const THIRD_CASTER: [&[u32]; 20] = [
    &[],
    &[],
    &[2],
    &[3],
    &[3],
    &[3],
    &[4, 2],
    &[4, 2],
    &[4, 2],
    &[4, 3],
    &[4, 3],
    &[4, 3],
    &[4, 3, 2],
    &[4, 3, 2],
    &[4, 3, 2],
    &[4, 3, 3],
    &[4, 3, 3],
    &[4, 3, 3],
    &[4, 3, 3, 1],
    &[4, 3, 3, 1],
];

/// `(slot level, slot count)` for pact magic.
const PACT: [(u8, u32); 20] = [
    (1, 1),
    (1, 2),
    (2, 2),
    (2, 2),
    (3, 2),
    (3, 2),
    (4, 2),
    (4, 2),
    (5, 2),
    (5, 2),
    (5, 3),
    (5, 3),
    (5, 3),
    (5, 3),
    (5, 3),
    (5, 3),
    (5, 4),
    (5, 4),
    (5, 4),
    (5, 4),
];

/// Maximum slots keyed by spell level. Levels outside 1..=20 are clamped;
/// a class level with no slots yields an empty map.
pub fn spell_slots(caster_type: CasterType, class_level: u8) -> BTreeMap<u8, u32> {
    let row = usize::from(class_level.clamp(1, 20)) - 1;
    let table = match caster_type {
        CasterType::Full => FULL_CASTER[row],
        CasterType::Half => HALF_CASTER[row],
        CasterType::Third => THIRD_CASTER[row],
        CasterType::Pact => {
            let (slot_level, count) = PACT[row];
            return BTreeMap::from([(slot_level, count)]);
        }
    };
    (1u8..).zip(table.iter().copied()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_caster_rows() {
        assert_eq!(spell_slots(CasterType::Full, 1), BTreeMap::from([(1, 2)]));
        assert_eq!(
            spell_slots(CasterType::Full, 5),
            BTreeMap::from([(1, 4), (2, 3), (3, 2)])
        );
        let top = spell_slots(CasterType::Full, 20);
        assert_eq!(top.len(), 9);
        assert_eq!(top[&6], 2);
        assert_eq!(top[&7], 2);
    }

    #[test]
    fn half_casters_start_at_level_two() {
        assert!(spell_slots(CasterType::Half, 1).is_empty());
        assert_eq!(spell_slots(CasterType::Half, 2), BTreeMap::from([(1, 2)]));
        assert_eq!(
            spell_slots(CasterType::Half, 20),
            BTreeMap::from([(1, 4), (2, 3), (3, 3), (4, 3), (5, 2)])
        );
    }

    #[test]
    fn third_casters_start_at_level_three() {
        assert!(spell_slots(CasterType::Third, 2).is_empty());
        assert_eq!(spell_slots(CasterType::Third, 3), BTreeMap::from([(1, 2)]));
        assert_eq!(spell_slots(CasterType::Third, 19)[&4], 1);
    }

    #[test]
    fn pact_slots_share_one_level() {
        assert_eq!(spell_slots(CasterType::Pact, 1), BTreeMap::from([(1, 1)]));
        assert_eq!(spell_slots(CasterType::Pact, 5), BTreeMap::from([(3, 2)]));
        assert_eq!(spell_slots(CasterType::Pact, 11), BTreeMap::from([(5, 3)]));
        assert_eq!(spell_slots(CasterType::Pact, 17), BTreeMap::from([(5, 4)]));
    }

    #[test]
    fn highest_slot_matches_max_spell_level() {
        for caster in [CasterType::Full, CasterType::Half, CasterType::Third, CasterType::Pact] {
            for level in 3..=20u8 {
                let highest = spell_slots(caster, level).keys().max().copied();
                assert_eq!(highest, Some(caster.max_spell_level(level)), "{caster:?} {level}");
            }
        }
    }

    #[test]
    fn out_of_range_levels_clamp() {
        assert_eq!(spell_slots(CasterType::Full, 0), spell_slots(CasterType::Full, 1));
        assert_eq!(spell_slots(CasterType::Full, 25), spell_slots(CasterType::Full, 20));
    }
}
