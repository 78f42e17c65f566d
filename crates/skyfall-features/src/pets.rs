//! Favourite pets in the pets menu.
//!
//! Favourites are keyed by item uuid and stored in
//! `inventory.pet_menu.favorites`. With `favorites_only` set, every other
//! pet in the menu is hidden and clicks on it are dropped; the active pet
//! stays usable when `highlight_active` is on.

use anyhow::Result;
use skyfall_config::{ConfigHandle, PetMenuConfig};
use skyfall_core::canvas::Rgb;
use skyfall_core::event::{Event, SlotClick, SlotPreRender, SlotRender};
use skyfall_core::feature::{Feature, SlotInteractable, SlotRenderable};
use skyfall_core::item::{ItemStack, Slot};

use crate::slots::is_menu_slot;

const ID: &str = "favorite_pets";
const ACTIVE_MARKER: &str = "Click to despawn";

pub fn is_pets_menu(title: &str) -> bool {
    title.contains("Pets")
        && !title.contains("Choose Pet")
        && !title.starts_with("Pets: ")
        && title != "Offer Pets"
}

pub fn is_pet(stack: &ItemStack) -> bool {
    !stack.is_empty() && stack.item_id.eq_ignore_ascii_case("pet")
}

pub fn is_active_pet(stack: &ItemStack) -> bool {
    stack.lore_contains(ACTIVE_MARKER)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Standing {
    Active,
    Favorite,
    Other,
}

fn standing(config: &PetMenuConfig, stack: &ItemStack) -> Standing {
    if config.highlight_active && is_active_pet(stack) {
        Standing::Active
    } else if stack.uuid.as_deref().is_some_and(|uuid| config.is_favorite(uuid)) {
        Standing::Favorite
    } else {
        Standing::Other
    }
}

fn applies(slot: &Slot, stack: &ItemStack, title: &str) -> bool {
    is_pets_menu(title) && is_menu_slot(slot) && is_pet(stack)
}

/// Flip the favourite mark of the pet in `slot`.
///
/// Returns the new state, or `None` when the slot holds no pet of the pets
/// menu or the pet has no uuid.
pub fn toggle_favorite(config: &ConfigHandle, slot: &Slot, title: &str) -> Option<bool> {
    if !applies(slot, &slot.stack, title) {
        return None;
    }
    let uuid = slot.stack.uuid.as_deref()?;
    let favorite = config.update(|c| c.inventory.pet_menu.toggle_favorite(uuid));
    tracing::info!(pet = %slot.stack.name, favorite, "pet favourite toggled");
    Some(favorite)
}

pub struct FavoritePets {
    config: ConfigHandle,
}

impl FavoritePets {
    pub fn new(config: ConfigHandle) -> Self {
        Self { config }
    }

    fn filtered_out(&self, stack: &ItemStack) -> bool {
        self.config.read(|c| {
            let menu = &c.inventory.pet_menu;
            menu.favorites_only && standing(menu, stack) == Standing::Other
        })
    }
}

impl Feature for FavoritePets {
    fn id(&self) -> &'static str {
        ID
    }

    fn name(&self) -> &'static str {
        "Favorite Pets"
    }

    fn should_load(&self) -> bool {
        self.config.read(|c| {
            let menu = &c.inventory.pet_menu;
            menu.favorites_only || menu.highlight_active || !menu.favorites.is_empty()
        })
    }

    fn as_slot_renderable(&mut self) -> Option<&mut dyn SlotRenderable> {
        Some(self)
    }

    fn as_slot_interactable(&mut self) -> Option<&mut dyn SlotInteractable> {
        Some(self)
    }
}

impl SlotRenderable for FavoritePets {
    fn on_slot_pre_render(&mut self, event: &mut SlotPreRender) -> Result<()> {
        if !applies(&event.slot, &event.original, &event.screen_title) {
            return Ok(());
        }
        let color = self.config.read(|c| {
            let menu = &c.inventory.pet_menu;
            match standing(menu, &event.original) {
                Standing::Active => Some(Rgb::parse_hex(&menu.active_color).unwrap_or(Rgb::GREEN)),
                Standing::Favorite => {
                    Some(Rgb::parse_hex(&menu.highlight_color).unwrap_or(Rgb::GOLD))
                }
                Standing::Other => None,
            }
        });
        if let Some(color) = color {
            let (width, height) = event.ctx.size();
            event.ctx.fill(0, 0, width, height, color);
        }
        Ok(())
    }

    fn on_slot_render(&mut self, event: &mut SlotRender) -> Result<()> {
        if applies(&event.slot, &event.original, &event.screen_title)
            && self.filtered_out(&event.original)
        {
            event.hide();
            event.hide_tooltip();
        }
        Ok(())
    }
}

impl SlotInteractable for FavoritePets {
    fn on_slot_click(&mut self, event: &mut SlotClick) -> Result<()> {
        let Some(slot) = event.slot.as_ref() else {
            return Ok(());
        };
        if applies(slot, &slot.stack, &event.screen_title) && self.filtered_out(&slot.stack) {
            tracing::debug!(slot = slot.index, "click on hidden pet dropped");
            event.cancel();
        }
        Ok(())
    }
}
