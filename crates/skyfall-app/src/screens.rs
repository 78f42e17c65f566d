//! Simulated container screens the host cycles through.

use skyfall_core::item::{ItemStack, Slot, SlotContainer};

pub const CHEST_SLOTS: usize = 54;
pub const HOTBAR_SLOTS: usize = 9;
/// Screen-wide id of the first hotbar slot under a double chest.
const HOTBAR_FIRST_ID: i32 = 81;

/// An open container plus the player's hotbar.
#[derive(Debug, Clone)]
pub struct Screen {
    pub title: String,
    /// Chest slots first, then the hotbar.
    pub slots: Vec<Slot>,
}

impl Screen {
    fn new(title: &str, contents: Vec<(usize, ItemStack)>) -> Self {
        let mut slots: Vec<Slot> = (0..CHEST_SLOTS)
            .map(|i| Slot::new(i, i as i32, SlotContainer::Chest, ItemStack::empty()))
            .collect();
        for (index, stack) in contents {
            if let Some(slot) = slots.get_mut(index) {
                slot.stack = stack;
            }
        }
        slots.extend(hotbar());
        Self {
            title: title.to_string(),
            slots,
        }
    }

    /// First empty slot in `container`, if any.
    pub fn first_empty(&self, container: SlotContainer) -> Option<usize> {
        self.slots
            .iter()
            .position(|s| s.container == container && s.stack.is_empty())
    }
}

fn hotbar() -> Vec<Slot> {
    let items = [
        ItemStack::new("DIAMOND_SWORD", "Aspect of the End"),
        ItemStack::new("FISHING_ROD", "Rod of the Sea"),
        ItemStack::new("ENDER_PEARL", "Ender Pearl").with_count(16),
    ];
    (0..HOTBAR_SLOTS)
        .map(|i| {
            let stack = items.get(i).cloned().unwrap_or_default();
            Slot::new(i, HOTBAR_FIRST_ID + i as i32, SlotContainer::Player, stack)
        })
        .collect()
}

fn menu_controls() -> Vec<(usize, ItemStack)> {
    vec![
        (48, ItemStack::new("ARROW", "Go Back")),
        (49, ItemStack::new("BARRIER", "Close")),
    ]
}

fn pet(name: &str, uuid: &str, active: bool) -> ItemStack {
    let action = if active {
        "Click to despawn!"
    } else {
        "Click to summon!"
    };
    ItemStack::new("PET", name)
        .with_uuid(uuid)
        .with_lore(["Combat Pet", "", action])
}

pub fn pets() -> Screen {
    let roster = [
        ("[Lvl 100] Golden Dragon", false),
        ("[Lvl 100] Ender Dragon", true),
        ("[Lvl 87] Griffin", false),
        ("[Lvl 100] Blue Whale", false),
        ("[Lvl 42] Rabbit", false),
        ("[Lvl 100] Bee", false),
        ("[Lvl 12] Ocelot", false),
        ("[Lvl 100] Tiger", false),
        ("[Lvl 65] Jellyfish", false),
        ("[Lvl 100] Black Cat", false),
    ];
    let menu = [10, 11, 12, 13, 14, 15, 16, 19, 20, 21];
    let mut contents: Vec<(usize, ItemStack)> = roster
        .iter()
        .zip(menu)
        .enumerate()
        .map(|(n, ((name, active), slot))| (slot, pet(name, &format!("pet-{n:04}"), *active)))
        .collect();
    contents.push((4, ItemStack::new("BONE", "Pets").with_lore(["View and manage your pets."])));
    contents.extend(menu_controls());
    Screen::new("Pets", contents)
}

pub fn storage() -> Screen {
    let contents = vec![
        (0, ItemStack::new("ENCHANTED_DIAMOND", "Enchanted Diamond").with_count(64)),
        (1, ItemStack::new("ENCHANTED_DIAMOND", "Enchanted Diamond").with_count(12)),
        (2, ItemStack::new("ENCHANTED_GOLD", "Enchanted Gold").with_count(40)),
        (9, ItemStack::new("ENDER_CHEST", "Ender Chest")),
        (
            10,
            ItemStack::new("PET", "[Lvl 1] Parrot")
                .with_uuid("stray-pet")
                .with_lore(["Stored pet item"]),
        ),
        (18, ItemStack::new("SUMMONING_EYE", "Summoning Eye").with_count(3)),
    ];
    Screen::new("Storage", contents)
}

pub fn attribute_menu() -> Screen {
    let shards = [
        "Mending III",
        "Vitality V",
        "Life Recovery X",
        "Fortitude",
        "Blazing Resistance II",
        "Speed I",
        "Magic Find VII",
        "Dominance IV",
    ];
    let mut contents: Vec<(usize, ItemStack)> = shards
        .iter()
        .zip([10, 11, 12, 13, 14, 15, 16, 19])
        .map(|(name, slot)| {
            (
                slot,
                ItemStack::new("ATTRIBUTE_SHARD", *name).with_lore(["Attribute Shard"]),
            )
        })
        .collect();
    // Outside the menu grid, so the level overlay leaves it alone.
    contents.push((4, ItemStack::new("BOOK", "Attribute Guide IV")));
    contents.extend(menu_controls());
    Screen::new("Attribute Menu", contents)
}

/// Every screen in the order Tab cycles through them.
pub fn all() -> Vec<Screen> {
    vec![pets(), storage(), attribute_menu()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn screens_have_chest_then_hotbar() {
        for screen in all() {
            assert_eq!(screen.slots.len(), CHEST_SLOTS + HOTBAR_SLOTS);
            assert!(screen.slots[..CHEST_SLOTS].iter().all(Slot::in_chest));
            assert!(screen.slots[CHEST_SLOTS..].iter().all(|s| !s.in_chest()));
            assert_eq!(screen.slots[CHEST_SLOTS].id, 81);
        }
    }

    #[test]
    fn pets_screen_has_exactly_one_active_pet() {
        let screen = pets();
        let active = screen
            .slots
            .iter()
            .filter(|s| s.stack.lore_contains("Click to despawn"))
            .count();
        assert_eq!(active, 1);
        assert!(screen.slots[10].stack.uuid.is_some());
    }

    #[test]
    fn first_empty_respects_container() {
        let screen = storage();
        assert_eq!(screen.first_empty(SlotContainer::Chest), Some(3));
        assert_eq!(screen.first_empty(SlotContainer::Player), Some(CHEST_SLOTS + 3));
    }
}
