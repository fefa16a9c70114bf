//! Known-Title Registry: curated profiles that bypass classification.

use std::collections::{BTreeMap, HashMap};

use heatrank_core::{Platform, TitleEntry, TitleProfile, Viewpoint};

fn entry(
    name: &str,
    platforms: &[(Platform, &str)],
    primary_platform: Platform,
    genre: &str,
    viewpoint: Viewpoint,
) -> TitleEntry {
    TitleEntry {
        name: name.to_owned(),
        platforms: platforms
            .iter()
            .map(|(p, id)| (*p, (*id).to_owned()))
            .collect::<BTreeMap<_, _>>(),
        primary_platform,
        genre: genre.to_owned(),
        viewpoint,
    }
}

fn builtin_entries() -> Vec<TitleEntry> {
    use Platform::{Battlenet, Epic, Multi, Origin, Riot, Steam, Uplay, Xbox};
    use Viewpoint::{FirstPerson, Mixed, ThirdPerson};

    vec![
        entry("Counter-Strike 2", &[(Steam, "730")], Steam, "tactical-fps", FirstPerson),
        entry("VALORANT", &[(Riot, "valorant")], Riot, "tactical-fps", FirstPerson),
        entry(
            "Apex Legends",
            &[(Steam, "1172470"), (Origin, "apex-legends"), (Epic, "apex")],
            Multi,
            "battle-royale",
            FirstPerson,
        ),
        entry(
            "Call of Duty: Modern Warfare III",
            &[(Battlenet, "cod-mw3")],
            Battlenet,
            "fps",
            FirstPerson,
        ),
        entry("Overwatch 2", &[(Battlenet, "overwatch-2")], Battlenet, "hero-shooter", FirstPerson),
        entry(
            "Tom Clancy's Rainbow Six Siege",
            &[(Steam, "359550"), (Uplay, "r6siege")],
            Multi,
            "tactical-fps",
            FirstPerson,
        ),
        entry(
            "Battlefield 2042",
            &[(Steam, "1517290"), (Origin, "bf2042"), (Epic, "battlefield-2042")],
            Multi,
            "fps",
            FirstPerson,
        ),
        entry("Fortnite", &[(Epic, "fortnite")], Epic, "battle-royale-tps", ThirdPerson),
        entry("PUBG: BATTLEGROUNDS", &[(Steam, "578080")], Steam, "battle-royale", Mixed),
        entry("Destiny 2", &[(Steam, "1085660")], Steam, "fps-mmo", FirstPerson),
        entry(
            "Gears 5",
            &[(Steam, "1097840"), (Xbox, "gears-5")],
            Multi,
            "tps",
            ThirdPerson,
        ),
    ]
}

/// Exact-name lookup over curated titles. Immutable once built.
#[derive(Debug, Clone)]
pub struct KnownTitleRegistry {
    by_name: HashMap<String, TitleEntry>,
    order: Vec<String>,
}

impl KnownTitleRegistry {
    /// The eleven curated titles.
    #[must_use]
    pub fn builtin() -> Self {
        Self::from_entries(builtin_entries())
    }

    /// Built-in titles plus `extra`; an extra entry with a built-in name replaces it.
    #[must_use]
    pub fn with_extra(extra: Vec<TitleEntry>) -> Self {
        let mut entries = builtin_entries();
        for title in extra {
            if let Some(existing) = entries.iter_mut().find(|e| e.name == title.name) {
                *existing = title;
            } else {
                entries.push(title);
            }
        }
        Self::from_entries(entries)
    }

    fn from_entries(entries: Vec<TitleEntry>) -> Self {
        let order = entries.iter().map(|e| e.name.clone()).collect();
        let by_name = entries.into_iter().map(|e| (e.name.clone(), e)).collect();
        Self { by_name, order }
    }

    /// Registry profile for `name` (confidence 100, source `registry`).
    #[must_use]
    pub fn lookup(&self, name: &str, viewer_count: u64) -> Option<TitleProfile> {
        self.by_name.get(name).map(|e| e.to_profile(viewer_count))
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&TitleEntry> {
        self.by_name.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = &TitleEntry> {
        self.order.iter().filter_map(|n| self.by_name.get(n))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

impl Default for KnownTitleRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
