//! Helpers shared by the inventory features.

use std::ops::RangeInclusive;

use skyfall_core::item::Slot;

/// The 7x4 content area of a six-row chest menu. Border slots hold
/// navigation items and are never touched.
pub const MENU_SLOTS: [RangeInclusive<usize>; 4] = [10..=16, 19..=25, 28..=34, 37..=43];

/// True for a chest slot inside [`MENU_SLOTS`].
pub fn is_menu_slot(slot: &Slot) -> bool {
    slot.in_chest() && MENU_SLOTS.iter().any(|range| range.contains(&slot.index))
}

/// Drop `§x` formatting codes from a display name.
pub fn strip_formatting(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == '§' {
            chars.next();
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use skyfall_core::item::{ItemStack, SlotContainer};

    #[test]
    fn menu_slots_exclude_borders_and_player_inventory() {
        let at = |index, container| Slot::new(index, index as i32, container, ItemStack::empty());
        assert!(is_menu_slot(&at(10, SlotContainer::Chest)));
        assert!(is_menu_slot(&at(43, SlotContainer::Chest)));
        assert!(!is_menu_slot(&at(9, SlotContainer::Chest)));
        assert!(!is_menu_slot(&at(17, SlotContainer::Chest)));
        assert!(!is_menu_slot(&at(49, SlotContainer::Chest)));
        assert!(!is_menu_slot(&at(10, SlotContainer::Player)));
    }

    #[test]
    fn formatting_codes_are_removed() {
        assert_eq!(strip_formatting("§6Mana Pool §lV"), "Mana Pool V");
        assert_eq!(strip_formatting("plain"), "plain");
        assert_eq!(strip_formatting("trailing§"), "trailing");
    }
}
