use std::fmt;

/// A stack of items as the host reports it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemStack {
    pub item_id: String,
    pub count: u32,
    pub name: String,
    pub lore: Vec<String>,
    pub uuid: Option<String>,
}

impl ItemStack {
    pub fn new(item_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            item_id: item_id.into(),
            count: 1,
            name: name.into(),
            lore: Vec::new(),
            uuid: None,
        }
    }

    /// The stack occupying an empty slot or cursor.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_count(mut self, count: u32) -> Self {
        self.count = count;
        self
    }

    pub fn with_lore<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lore = lines.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_uuid(mut self, uuid: impl Into<String>) -> Self {
        self.uuid = Some(uuid.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.item_id.is_empty() || self.count == 0
    }

    /// True when any lore line contains `needle`.
    pub fn lore_contains(&self, needle: &str) -> bool {
        self.lore.iter().any(|line| line.contains(needle))
    }
}

/// Which inventory a slot belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotContainer {
    /// The opened container (chest menu, storage page, ...).
    Chest,
    /// The player's own inventory shown under the container.
    Player,
}

/// A single slot of an open screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    /// Index inside its container.
    pub index: usize,
    /// Screen-wide slot id, as used in click packets.
    pub id: i32,
    pub container: SlotContainer,
    pub stack: ItemStack,
}

impl Slot {
    pub fn new(index: usize, id: i32, container: SlotContainer, stack: ItemStack) -> Self {
        Self {
            index,
            id,
            container,
            stack,
        }
    }

    pub fn in_chest(&self) -> bool {
        self.container == SlotContainer::Chest
    }
}

/// The kind of click the host performed on a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotActionType {
    Pickup,
    QuickMove,
    Swap,
    Clone,
    Throw,
    QuickCraft,
    PickupAll,
}

impl fmt::Display for SlotActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            SlotActionType::Pickup => "PICKUP",
            SlotActionType::QuickMove => "QUICK_MOVE",
            SlotActionType::Swap => "SWAP",
            SlotActionType::Clone => "CLONE",
            SlotActionType::Throw => "THROW",
            SlotActionType::QuickCraft => "QUICK_CRAFT",
            SlotActionType::PickupAll => "PICKUP_ALL",
        };
        f.write_str(tag)
    }
}
