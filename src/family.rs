// FontFamily: up to 16 co-resident fonts addressable from markup.

use std::collections::HashMap;
use std::sync::Arc;

use crate::font::Font;

/// Number of font slots a family carries; the packed-glyph font index is a
/// nibble, so this cannot grow without a codec change.
pub const FAMILY_SLOTS: usize = 16;

/// A fixed array of up to 16 fonts plus a case-insensitive alias map.
///
/// Copying a family aliases the slot fonts rather than deep-copying them;
/// many labels sharing one family is the intended shape. Slot 0 is the
/// base font; unknown names resolve to it.
#[derive(Debug, Clone, Default)]
pub struct FontFamily {
    slots: [Option<Arc<Font>>; FAMILY_SLOTS],
    /// Lowercased alias → slot index. Always contains "0".."15".
    aliases: HashMap<String, u8>,
}

impl FontFamily {
    /// Build a family from named fonts, assigned to slots in order.
    /// Fonts past slot 15 are dropped with a warning.
    pub fn new<I>(fonts: I) -> FontFamily
    where
        I: IntoIterator<Item = (String, Font)>,
    {
        let mut family = FontFamily {
            slots: Default::default(),
            aliases: HashMap::new(),
        };
        for i in 0..FAMILY_SLOTS {
            family.aliases.insert(i.to_string(), i as u8);
        }
        let mut next = 0usize;
        for (name, font) in fonts {
            if next >= FAMILY_SLOTS {
                log::warn!("font family full: dropping font {name:?}");
                continue;
            }
            family.aliases.insert(name.to_lowercase(), next as u8);
            family.slots[next] = Some(Arc::new(font));
            next += 1;
        }
        family
    }

    /// Place a font in a specific slot, overwriting any occupant.
    pub fn set_slot(&mut self, index: usize, name: &str, font: Font) {
        if index >= FAMILY_SLOTS {
            log::warn!("font family slot {index} out of range");
            return;
        }
        self.aliases.insert(name.to_lowercase(), index as u8);
        self.slots[index] = Some(Arc::new(font));
    }

    /// Register an extra alias for an occupied slot.
    pub fn add_alias(&mut self, name: &str, index: u8) {
        if (index as usize) < FAMILY_SLOTS {
            self.aliases.insert(name.to_lowercase(), index);
        }
    }

    /// The font in a slot, if occupied.
    pub fn slot(&self, index: usize) -> Option<&Font> {
        self.slots
            .get(index)
            .and_then(|s| s.as_ref())
            .map(Arc::as_ref)
    }

    /// Resolve a name to its slot index; unknown names resolve to slot 0.
    pub fn index_of(&self, name: &str) -> u8 {
        self.aliases
            .get(&name.to_lowercase())
            .copied()
            .unwrap_or(0)
    }

    /// Resolve a name to its font: the named slot if occupied, else the
    /// base slot.
    pub fn get(&self, name: &str) -> Option<&Font> {
        let idx = self.index_of(name) as usize;
        self.slot(idx).or_else(|| self.slot(0))
    }

    /// Iterate over occupied slots as `(index, font)`.
    pub fn connected(&self) -> impl Iterator<Item = (usize, &Font)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|f| (i, f.as_ref())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::test_support::mono_font;

    fn family_of(names: &[&str]) -> FontFamily {
        FontFamily::new(
            names
                .iter()
                .map(|n| (n.to_string(), mono_font(8.0, 16.0))),
        )
    }

    // ── Alias resolution ────────────────────────────────────────────

    #[test]
    fn names_resolve_case_insensitively() {
        let fam = family_of(&["Serif", "Mono"]);
        assert_eq!(fam.index_of("serif"), 0);
        assert_eq!(fam.index_of("MONO"), 1);
    }

    #[test]
    fn numeric_aliases_always_exist() {
        let fam = family_of(&["Serif"]);
        assert_eq!(fam.index_of("0"), 0);
        assert_eq!(fam.index_of("15"), 15);
    }

    #[test]
    fn unknown_names_resolve_to_base_slot() {
        let fam = family_of(&["Serif", "Mono"]);
        assert_eq!(fam.index_of("nonexistent"), 0);
        assert!(fam.get("nonexistent").is_some());
    }

    #[test]
    fn empty_numeric_slot_falls_back_to_base() {
        let fam = family_of(&["Serif"]);
        // Slot 7 is unoccupied but "7" is a valid alias.
        assert!(fam.slot(7).is_none());
        assert!(fam.get("7").is_some(), "get() must fall back to slot 0");
    }

    // ── Copying ─────────────────────────────────────────────────────

    #[test]
    fn clone_aliases_slot_fonts() {
        let fam = family_of(&["Serif", "Mono"]);
        let copy = fam.clone();
        let a = fam.slot(1).unwrap() as *const _;
        let b = copy.slot(1).unwrap() as *const _;
        assert_eq!(a, b, "slots must alias, not deep-copy");
    }

    // ── Capacity ────────────────────────────────────────────────────

    #[test]
    fn seventeenth_font_is_dropped() {
        let names: Vec<String> = (0..17).map(|i| format!("f{i}")).collect();
        let fam = FontFamily::new(
            names
                .iter()
                .map(|n| (n.clone(), mono_font(8.0, 16.0))),
        );
        assert_eq!(fam.connected().count(), 16);
        assert_eq!(fam.index_of("f16"), 0, "dropped font's name is unknown");
    }
}
