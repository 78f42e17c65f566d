use anyhow::Result;
use skyfall_config::ConfigHandle;
use skyfall_core::event::SlotRender;
use skyfall_core::feature::{Feature, SlotRenderable};

use crate::slots::{is_menu_slot, strip_formatting};

const ID: &str = "level_number";
const NUMERALS: [&str; 10] = ["I", "II", "III", "IV", "V", "VI", "VII", "VIII", "IX", "X"];

/// Shows the roman-numeral level of each attribute as the stack count in
/// the attribute menu.
pub struct LevelNumber {
    config: ConfigHandle,
}

impl LevelNumber {
    pub fn new(config: ConfigHandle) -> Self {
        Self { config }
    }
}

fn is_attribute_menu(title: &str) -> bool {
    title.trim().eq_ignore_ascii_case("attribute menu")
}

/// Level encoded as a trailing roman numeral (`"Mana Pool IV"` -> 4).
/// Only I through X are recognised.
pub fn trailing_level(name: &str) -> Option<u32> {
    let clean = strip_formatting(name);
    let (head, last) = clean.trim().rsplit_once(char::is_whitespace)?;
    if head.trim().is_empty() {
        return None;
    }
    NUMERALS
        .iter()
        .position(|numeral| *numeral == last)
        .map(|index| index as u32 + 1)
}

impl Feature for LevelNumber {
    fn id(&self) -> &'static str {
        ID
    }

    fn name(&self) -> &'static str {
        "Attribute Level Numbers"
    }

    fn should_load(&self) -> bool {
        self.config.read(|c| c.inventory.level_numbers)
    }

    fn as_slot_renderable(&mut self) -> Option<&mut dyn SlotRenderable> {
        Some(self)
    }
}

impl SlotRenderable for LevelNumber {
    fn on_slot_render(&mut self, event: &mut SlotRender) -> Result<()> {
        if !is_attribute_menu(&event.screen_title)
            || !is_menu_slot(&event.slot)
            || event.original.is_empty()
        {
            return Ok(());
        }
        if let Some(level) = trailing_level(&event.original.name) {
            let stack = event.replacement().clone().with_count(level);
            event.replace_with(stack);
        }
        Ok(())
    }
}
