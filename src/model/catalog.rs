use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// A fixed list of options the player picks from before a session starts.
#[derive(Debug, Clone, Copy)]
pub struct Category {
    pub name: &'static str,
    pub options: &'static [&'static str],
}

/// Story categories: these shape the quest the model generates.
pub const STORY_CATEGORIES: &[Category] = &[
    Category {
        name: "History",
        options: &[
            "🐊 A young and curious adventurer",
            "🧙‍♂️ A skilled mage with a troubled past",
            "👩‍🎨 A cunning thief seeking redemption",
            "🥷 An honorable knight on a quest",
            "😵‍💫 A wise and ancient forest spirit",
            "🧳 A lost traveler from another realm",
        ],
    },
    Category {
        name: "Trait",
        options: &[
            "💪 Strength: Allows the character to overcome physical obstacles or engage in combat",
            "🧠 Intelligence: Helps the character solve puzzles and decipher complex riddles",
            "🏃‍♀️ Agility: Enables the character to navigate treacherous terrain or evade danger",
            "💄 Charm: Allows the character to persuade or manipulate NPCs",
            "👀 Perception: Helps the character notice hidden clues or detect hidden dangers",
            "🪄 Magic: Grants the character access to powerful spells and abilities",
        ],
    },
    Category {
        name: "Location",
        options: &[
            "🕍 An ancient temple hidden deep within the forest",
            "🏙️ A mystical village populated by magical creatures",
            "⛰️ A dark and treacherous swamp filled with dangerous creatures",
            "💦 A towering waterfall cascading into a hidden cavern",
            "📚 A forgotten library guarded by enchanted books",
            "🏡 A mystical garden blooming with rare and powerful herbs",
        ],
    },
    Category {
        name: "Goal",
        options: &[
            "🔍 Find a way to break a powerful curse",
            "🔮 Uncover the truth behind a mysterious prophecy",
            "🏆 Retrieve a stolen artifact of immense power",
            "⚖️ Restore balance to the enchanted forest",
            "🌐 Discover the source of a spreading corruption",
            "💖 Save a captured loved one from an evil sorcerer",
        ],
    },
    Category {
        name: "Item",
        options: &[
            "🔑 A rusty key with an unknown purpose",
            "🗺️ A worn-out map with cryptic symbols",
            "💍 A magical pendant that glows faintly",
            "💼 A small satchel of healing herbs and potions",
            "📩 A mysterious letter with a hidden message",
            "🗡️ A silver dagger with intricate engravings",
        ],
    },
];

/// Presentation categories: forwarded to the image collaborator's prompts.
pub const STYLE_CATEGORIES: &[Category] = &[
    Category {
        name: "Style",
        options: &[
            "🧙‍♂️ Fantasy",
            "🏰 Medieval",
            "🌌 Sci-Fi",
            "🌿 Nature",
            "🏙️ Urban",
        ],
    },
    Category {
        name: "Color",
        options: &[
            "🔴 Red",
            "🟠 Orange",
            "🟡 Yellow",
            "🟢 Green",
            "🔵 Blue",
            "🟣 Purple",
        ],
    },
    Category {
        name: "Shape",
        options: &[
            "⚪ Circle",
            "⬜ Square",
            "🔺 Triangle",
            "🔻 Diamond",
            "🔘 Rectangle",
            "🔳 Hexagon",
        ],
    },
    Category {
        name: "Character",
        options: &[
            "👑 King",
            "👸 Queen",
            "🧚 Fairy",
            "🧟 Zombie",
            "🦄 Unicorn",
            "🐉 Dragon",
        ],
    },
    Category {
        name: "Background",
        options: &[
            "🌅 Sunset",
            "🏞️ Mountains",
            "🌊 Ocean",
            "🌆 Cityscape",
            "🌌 Galaxy",
            "🏝️ Beach",
        ],
    },
];

/// Inventory entries matching one of these (case-insensitive substring)
/// count as healing items for the `can_heal` gate.
pub const HEALING_KEYWORDS: &[&str] = &[
    "potion", "herb", "elixir", "salve", "bandage", "tonic", "remedy",
];

/// The player's category selections, frozen for the lifetime of a session
/// and passed to the model collaborator as fixed context on every turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionParameters {
    pub history: String,
    #[serde(rename = "trait")]
    pub character_trait: String,
    pub location: String,
    pub goal: String,
    pub item: String,

    pub style: String,
    pub color: String,
    pub shape: String,
    pub character: String,
    pub background: String,
}

impl Default for SessionParameters {
    fn default() -> Self {
        Self {
            history: STORY_CATEGORIES[0].options[0].to_string(),
            character_trait: STORY_CATEGORIES[1].options[0].to_string(),
            location: STORY_CATEGORIES[2].options[0].to_string(),
            goal: STORY_CATEGORIES[3].options[0].to_string(),
            item: STORY_CATEGORIES[4].options[0].to_string(),
            style: STYLE_CATEGORIES[0].options[0].to_string(),
            color: STYLE_CATEGORIES[1].options[0].to_string(),
            shape: STYLE_CATEGORIES[2].options[0].to_string(),
            character: STYLE_CATEGORIES[3].options[0].to_string(),
            background: STYLE_CATEGORIES[4].options[0].to_string(),
        }
    }
}

fn pick<R: Rng + ?Sized>(category: &Category, rng: &mut R) -> String {
    category
        .options
        .choose(rng)
        .copied()
        .unwrap_or_default()
        .to_string()
}

impl SessionParameters {
    /// Rolls a random selection from every catalog.
    pub fn random(rng: &mut impl Rng) -> Self {
        Self {
            history: pick(&STORY_CATEGORIES[0], rng),
            character_trait: pick(&STORY_CATEGORIES[1], rng),
            location: pick(&STORY_CATEGORIES[2], rng),
            goal: pick(&STORY_CATEGORIES[3], rng),
            item: pick(&STORY_CATEGORIES[4], rng),
            style: pick(&STYLE_CATEGORIES[0], rng),
            color: pick(&STYLE_CATEGORIES[1], rng),
            shape: pick(&STYLE_CATEGORIES[2], rng),
            character: pick(&STYLE_CATEGORIES[3], rng),
            background: pick(&STYLE_CATEGORIES[4], rng),
        }
    }
}
