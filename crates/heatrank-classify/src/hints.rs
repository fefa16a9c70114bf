//! Curated descriptions and tags used to enrich unknown candidates before
//! they are sent to a classifier.

/// Short description for titles the feeds rarely describe.
#[must_use]
pub fn description_for(name: &str) -> Option<&'static str> {
    let text = match name {
        "Counter-Strike 2" => "Tactical first-person shooter, PC",
        "VALORANT" => "Tactical FPS from Riot Games, PC",
        "Apex Legends" => "Hero battle royale with unique character abilities, PC",
        "Call of Duty: Modern Warfare III" => "Military first-person shooter, PC",
        "Overwatch 2" => "Team-based hero shooter built around objectives, PC",
        "Fortnite" => {
            "Third-person battle royale combining building and combat, PC; shooting is the main combat"
        }
        "PUBG: BATTLEGROUNDS" => "Battle royale with first- and third-person modes, PC",
        "League of Legends" => "MOBA where two teams of champions fight strategically, PC",
        "World of Warcraft" => "Fantasy MMORPG, PC",
        "Minecraft" => "Sandbox building game about creating and exploring block worlds, PC",
        "Titanfall 3" => "Sci-fi shooter mixing mechs and wall-running, PC",
        "The Finals" => "Competitive shooter centred on environmental destruction, PC",
        "XDefiant" => "Competitive shooter blending several Ubisoft universes, PC",
        "Gears 5" => "Third-person cover shooter from Microsoft, PC",
        "Splatoon 3" => "Third-person shooter from Nintendo, Switch exclusive, not on PC",
        "PUBG Mobile" => "Mobile battle royale, not on PC",
        _ => return None,
    };
    Some(text)
}

#[must_use]
pub fn tags_for(name: &str) -> &'static [&'static str] {
    match name {
        "Counter-Strike 2" => &["FPS", "Tactical", "Competitive", "PC"],
        "VALORANT" => &["FPS", "Tactical", "Hero-based", "Competitive", "PC"],
        "Apex Legends" => &["Battle Royale", "FPS", "Hero-based", "Team-based", "PC"],
        "Fortnite" => &["Battle Royale", "TPS", "Building", "Third-person", "Shooter", "PC"],
        "PUBG: BATTLEGROUNDS" => &["Battle Royale", "Shooter", "Mixed-perspective", "PC"],
        "League of Legends" => &["MOBA", "Strategy", "Team-based", "PC"],
        "World of Warcraft" => &["MMORPG", "Fantasy", "RPG", "PC"],
        "Minecraft" => &["Sandbox", "Building", "Survival", "PC"],
        "Titanfall 3" => &["FPS", "Sci-fi", "Mechs", "Parkour", "PC"],
        "The Finals" => &["FPS", "Competitive", "Destruction", "PC"],
        "XDefiant" => &["FPS", "Competitive", "Team-based", "PC"],
        "Gears 5" => &["TPS", "Cover-based", "Action", "PC"],
        "Splatoon 3" => &["TPS", "Nintendo", "Colorful", "Team-based", "Console"],
        "PUBG Mobile" => &["Battle Royale", "Mobile", "Shooter"],
        _ => &[],
    }
}
