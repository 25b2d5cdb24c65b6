use serde::Serialize;
use std::collections::BTreeMap;

use crate::room::{Item, RoomId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComboId {
    DeepSearch,
    ForceKill,
    Duplicate,
    GodMode,
    PipeDream,
    MemoryLeak,
    RootReveal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandCombo {
    pub id: ComboId,
    pub name: &'static str,
    pub inputs: [Item; 2],
    pub output: &'static str,
    pub description: &'static str,
    pub discovered: bool,
}

impl CommandCombo {
    /// Text shown when the combo fires.
    pub fn execution_text(&self) -> String {
        format!("Executed: {}\n{}", self.output, self.description)
    }
}

fn combo_key(a: Item, b: Item) -> (Item, Item) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

#[derive(Debug, Clone)]
pub struct CombinationCatalog {
    combos: BTreeMap<(Item, Item), CommandCombo>,
}

impl Default for CombinationCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl CombinationCatalog {
    pub fn new() -> Self {
        let combos = [
            (
                ComboId::DeepSearch,
                "Deep Search",
                [Item::Ls, Item::Grep],
                "ls | grep",
                "Search through hidden files and directories",
            ),
            (
                ComboId::ForceKill,
                "Force Kill",
                [Item::Sudo, Item::Kill],
                "sudo kill -9",
                "Forcefully terminate any process",
            ),
            (
                ComboId::Duplicate,
                "Duplicate",
                [Item::Cat, Item::Echo],
                "cat | tee",
                "Duplicate items in your inventory",
            ),
            (
                ComboId::GodMode,
                "God Mode",
                [Item::Chmod, Item::Sudo],
                "sudo chmod 777",
                "Temporary invincibility from corruption",
            ),
            (
                ComboId::PipeDream,
                "Pipe Dream",
                [Item::Pipe, Item::Echo],
                "echo | pipe",
                "Create a portal between rooms",
            ),
            (
                ComboId::MemoryLeak,
                "Memory Leak",
                [Item::Free, Item::Malloc],
                "malloc --unlimited",
                "Temporarily expand inventory capacity",
            ),
        ]
        .into_iter()
        .map(|(id, name, inputs, output, description)| {
            (
                combo_key(inputs[0], inputs[1]),
                CommandCombo {
                    id,
                    name,
                    inputs,
                    output,
                    description,
                    discovered: false,
                },
            )
        })
        .collect();

        CombinationCatalog { combos }
    }

    /// Look up the pair in either order; a hit is permanently marked discovered.
    pub fn try_combine(&mut self, a: Item, b: Item) -> Option<CommandCombo> {
        let combo = self.combos.get_mut(&combo_key(a, b))?;
        if !combo.discovered {
            log::info!("combo discovered: {}", combo.name);
            combo.discovered = true;
        }
        Some(combo.clone())
    }

    pub fn discovered(&self) -> Vec<CommandCombo> {
        self.combos
            .values()
            .filter(|c| c.discovered)
            .cloned()
            .collect()
    }

    /// Nudge the player when they hold all but one input of some combo.
    pub fn hint_for_partial_set(&self, held: &[Item]) -> Option<String> {
        self.combos.values().find_map(|combo| {
            let matching = combo.inputs.iter().filter(|i| held.contains(i)).count();
            if matching != combo.inputs.len() - 1 {
                return None;
            }
            combo
                .inputs
                .iter()
                .find(|i| !held.contains(i))
                .map(|missing| format!("These items might combine well with '{}'...", missing))
        })
    }

    pub fn all_combos(&self) -> Vec<String> {
        self.combos
            .values()
            .map(|c| format!("{} + {} = {}", c.inputs[0], c.inputs[1], c.name))
            .collect()
    }

    /// Room-gated combination outside the regular table: `ls` and `sudo`
    /// together inside the root vault.
    pub fn special(&self, held: &[Item], room: RoomId) -> Option<CommandCombo> {
        if room == RoomId::RootVault && held.contains(&Item::Ls) && held.contains(&Item::Sudo) {
            return Some(CommandCombo {
                id: ComboId::RootReveal,
                name: "Root Revelation",
                inputs: [Item::Ls, Item::Sudo],
                output: "sudo ls -la /",
                description: "Reveals the true nature of the system",
                discovered: true,
            });
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_does_not_matter() {
        let mut catalog = CombinationCatalog::new();
        let a = catalog.try_combine(Item::Grep, Item::Ls).expect("combo");
        let b = catalog.try_combine(Item::Ls, Item::Grep).expect("combo");
        assert_eq!(a.id, ComboId::DeepSearch);
        assert_eq!(a.id, b.id);
    }

    #[test]
    fn discovery_is_permanent() {
        let mut catalog = CombinationCatalog::new();
        assert!(catalog.discovered().is_empty());
        assert!(catalog.try_combine(Item::Ls, Item::Kill).is_none());
        assert!(catalog.discovered().is_empty());

        catalog.try_combine(Item::Malloc, Item::Free);
        catalog.try_combine(Item::Malloc, Item::Free);
        let found = catalog.discovered();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, ComboId::MemoryLeak);
        assert!(found[0].discovered);
    }

    #[test]
    fn partial_set_names_missing_item() {
        let catalog = CombinationCatalog::new();
        let hint = catalog.hint_for_partial_set(&[Item::Free]).expect("hint");
        assert!(hint.contains("'malloc'"), "{hint}");
        assert!(catalog.hint_for_partial_set(&[]).is_none());
    }

    #[test]
    fn full_set_gives_no_hint_for_that_combo() {
        let catalog = CombinationCatalog::new();
        // ls+grep complete deep-search, and neither is part of any other pair.
        let hint = catalog.hint_for_partial_set(&[Item::Ls, Item::Grep]);
        assert!(hint.is_none());
    }

    #[test]
    fn catalog_listing() {
        let catalog = CombinationCatalog::new();
        let all = catalog.all_combos();
        assert_eq!(all.len(), 6);
        assert!(all.contains(&"ls + grep = Deep Search".to_string()));
    }

    #[test]
    fn root_reveal_needs_vault() {
        let catalog = CombinationCatalog::new();
        let held = [Item::Ls, Item::Sudo];
        assert!(catalog.special(&held, RoomId::FileMaze).is_none());
        let combo = catalog.special(&held, RoomId::RootVault).expect("special");
        assert_eq!(combo.id, ComboId::RootReveal);
    }
}
