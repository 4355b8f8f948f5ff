//! Card records as they arrive from a Scryfall-style `cards.json` dump.

use std::collections::BTreeMap;

use crate::color::ColorSet;
use crate::eval::CardAccessor;
use crate::types::{CardType, TypeLine};

#[cfg(feature = "serialization")]
use crate::error::LoadError;

/// Represents power or toughness values that may be variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PtValue {
    /// Fixed numeric value (e.g., 4)
    Fixed(i32),
    /// Star value, determined by some characteristic (e.g., *)
    Star,
    /// Star plus a number (e.g., 1+*)
    StarPlus(i32),
}

impl PtValue {
    /// Reads a printed stat such as `4`, `*`, `1+*`, `*+1` or `X`.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if let Ok(value) = raw.parse::<i32>() {
            return Some(PtValue::Fixed(value));
        }
        if matches!(raw, "*" | "X" | "x" | "?") {
            return Some(PtValue::Star);
        }
        if raw.contains('*') {
            let fixed = raw.replace(['*', '+'], "");
            return fixed.trim().parse::<i32>().ok().map(PtValue::StarPlus);
        }
        None
    }

    /// Returns the base numeric value, treating Star as 0.
    pub fn base_value(self) -> i32 {
        match self {
            PtValue::Fixed(n) => n,
            PtValue::Star => 0,
            PtValue::StarPlus(n) => n,
        }
    }
}

/// Numeric value of a printed stat; fractional stats (`1.5`) are kept.
pub fn stat_value(raw: &str) -> Option<f64> {
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Some(value),
        _ => PtValue::parse(raw).map(|value| f64::from(value.base_value())),
    }
}

/// Printed rarity, ordered from most to least common.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Special,
    Mythic,
    Bonus,
}

impl Rarity {
    /// Accepts full names and single-letter abbreviations, case-insensitively.
    pub fn parse(text: &str) -> Option<Self> {
        match text.to_ascii_lowercase().as_str() {
            "c" | "common" => Some(Rarity::Common),
            "u" | "uncommon" => Some(Rarity::Uncommon),
            "r" | "rare" => Some(Rarity::Rare),
            "s" | "special" => Some(Rarity::Special),
            "m" | "mythic" => Some(Rarity::Mythic),
            "b" | "bonus" => Some(Rarity::Bonus),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Rarity::Common => "common",
            Rarity::Uncommon => "uncommon",
            Rarity::Rare => "rare",
            Rarity::Special => "special",
            Rarity::Mythic => "mythic",
            Rarity::Bonus => "bonus",
        }
    }
}

/// Keywords accepted by `is:`.
pub const CARD_FLAGS: &[&str] = &[
    "reprint",
    "promo",
    "digital",
    "reserved",
    "fullart",
    "permanent",
    "spell",
    "historic",
    "vanilla",
    "commander",
    "multicolor",
    "monocolor",
    "colorless",
    "token",
    "split",
    "flip",
    "transform",
    "meld",
    "leveler",
    "adventure",
    "saga",
    "mdfc",
    "dfc",
];

/// Format names accepted by `f:`.
pub const FORMATS: &[&str] = &[
    "standard",
    "future",
    "historic",
    "timeless",
    "gladiator",
    "pioneer",
    "explorer",
    "modern",
    "legacy",
    "pauper",
    "vintage",
    "penny",
    "commander",
    "oathbreaker",
    "standardbrawl",
    "brawl",
    "alchemy",
    "paupercommander",
    "duel",
    "oldschool",
    "premodern",
    "predh",
];

/// One face of a multi-faced card.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct CardFace {
    pub name: String,
    pub type_line: String,
    pub oracle_text: String,
    pub colors: Option<ColorSet>,
    pub power: Option<String>,
    pub toughness: Option<String>,
    pub loyalty: Option<String>,
    pub defense: Option<String>,
}

/// A card as stored in the corpus.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct CardRecord {
    pub name: String,
    pub type_line: String,
    pub oracle_text: String,
    pub colors: Option<ColorSet>,
    pub color_identity: ColorSet,
    #[cfg_attr(feature = "serialization", serde(rename = "cmc"))]
    pub mana_value: f64,
    pub power: Option<String>,
    pub toughness: Option<String>,
    pub loyalty: Option<String>,
    pub defense: Option<String>,
    pub rarity: String,
    #[cfg_attr(feature = "serialization", serde(rename = "set"))]
    pub set_code: String,
    pub artist: Option<String>,
    pub layout: String,
    pub reprint: bool,
    pub promo: bool,
    pub digital: bool,
    pub reserved: bool,
    pub full_art: bool,
    pub legalities: BTreeMap<String, String>,
    #[cfg_attr(
        feature = "serialization",
        serde(skip_serializing_if = "Vec::is_empty")
    )]
    pub card_faces: Vec<CardFace>,
}

impl CardRecord {
    pub fn builder(name: impl Into<String>) -> CardRecordBuilder {
        CardRecordBuilder::new(name)
    }

    /// Fills face-level data into the top-level fields where the dump left
    /// them empty (double-faced cards keep text and stats on their faces).
    pub fn normalized(mut self) -> Self {
        if self.layout.is_empty() {
            self.layout = "normal".to_string();
        }
        if self.card_faces.is_empty() {
            return self;
        }
        if self.oracle_text.is_empty() {
            self.oracle_text = self
                .card_faces
                .iter()
                .map(|face| face.oracle_text.as_str())
                .collect::<Vec<_>>()
                .join("\n");
        }
        if self.type_line.is_empty() {
            self.type_line = self
                .card_faces
                .iter()
                .map(|face| face.type_line.as_str())
                .collect::<Vec<_>>()
                .join(" // ");
        }
        if self.colors.is_none() && self.card_faces.iter().any(|face| face.colors.is_some()) {
            self.colors = Some(
                self.card_faces
                    .iter()
                    .filter_map(|face| face.colors)
                    .fold(ColorSet::COLORLESS, ColorSet::union),
            );
        }
        let first_face = |pick: fn(&CardFace) -> &Option<String>| {
            self.card_faces.iter().find_map(|face| pick(face).clone())
        };
        let power = first_face(|face| &face.power);
        let toughness = first_face(|face| &face.toughness);
        let loyalty = first_face(|face| &face.loyalty);
        let defense = first_face(|face| &face.defense);
        self.power = self.power.take().or(power);
        self.toughness = self.toughness.take().or(toughness);
        self.loyalty = self.loyalty.take().or(loyalty);
        self.defense = self.defense.take().or(defense);
        self
    }

    fn color_count(&self) -> u32 {
        self.colors.unwrap_or_default().count()
    }

    /// `is:` keywords that depend on the parsed type line.
    fn type_flag(&self, flag: &str) -> bool {
        let types = TypeLine::parse(&self.type_line);
        match flag {
            "permanent" => types.is_permanent(),
            "spell" => !types.card_types.is_empty() && !types.has(CardType::Land),
            "historic" => {
                types.is_legendary()
                    || types.has(CardType::Artifact)
                    || self.type_line.contains("Saga")
            }
            "vanilla" => types.has(CardType::Creature) && self.oracle_text.trim().is_empty(),
            "commander" => {
                (types.is_legendary() && types.has(CardType::Creature))
                    || self
                        .oracle_text
                        .to_lowercase()
                        .contains("can be your commander")
            }
            _ => false,
        }
    }
}

impl CardAccessor for CardRecord {
    fn name(&self) -> &str {
        &self.name
    }

    fn type_line(&self) -> &str {
        &self.type_line
    }

    fn oracle_text(&self) -> &str {
        &self.oracle_text
    }

    fn colors(&self) -> Option<ColorSet> {
        self.colors
    }

    fn color_identity(&self) -> Option<ColorSet> {
        Some(self.color_identity)
    }

    fn mana_value(&self) -> Option<f64> {
        Some(self.mana_value)
    }

    fn power(&self) -> Option<f64> {
        self.power.as_deref().and_then(stat_value)
    }

    fn toughness(&self) -> Option<f64> {
        self.toughness.as_deref().and_then(stat_value)
    }

    fn loyalty(&self) -> Option<f64> {
        self.loyalty.as_deref().and_then(stat_value)
    }

    fn defense(&self) -> Option<f64> {
        self.defense.as_deref().and_then(stat_value)
    }

    fn rarity(&self) -> &str {
        &self.rarity
    }

    fn set_code(&self) -> &str {
        &self.set_code
    }

    fn artist(&self) -> Option<&str> {
        self.artist.as_deref()
    }

    fn layout(&self) -> &str {
        &self.layout
    }

    fn has_flag(&self, flag: &str) -> bool {
        match flag {
            "reprint" => self.reprint,
            "promo" => self.promo,
            "digital" => self.digital,
            "reserved" => self.reserved,
            "fullart" => self.full_art,
            "multicolor" => self.color_count() >= 2,
            "monocolor" => self.color_count() == 1,
            "colorless" => self.color_count() == 0,
            "token" => self.layout.ends_with("token") || self.type_line.contains("Token"),
            "mdfc" => self.layout == "modal_dfc",
            "dfc" => matches!(
                self.layout.as_str(),
                "transform" | "modal_dfc" | "meld" | "double_faced_token"
            ),
            "split" | "flip" | "transform" | "meld" | "leveler" | "adventure" | "saga" => {
                self.layout == flag
            }
            "permanent" | "spell" | "historic" | "vanilla" | "commander" => self.type_flag(flag),
            _ => false,
        }
    }

    fn is_legal_in(&self, format: &str) -> bool {
        self.legalities
            .get(format)
            .is_some_and(|status| status == "legal" || status == "restricted")
    }
}

/// Builder for constructing CardRecord instances.
#[derive(Debug, Default, Clone)]
pub struct CardRecordBuilder {
    record: CardRecord,
}

impl CardRecordBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            record: CardRecord {
                name: name.into(),
                layout: "normal".to_string(),
                ..Default::default()
            },
        }
    }

    pub fn type_line(mut self, type_line: impl Into<String>) -> Self {
        self.record.type_line = type_line.into();
        self
    }

    pub fn oracle_text(mut self, text: impl Into<String>) -> Self {
        self.record.oracle_text = text.into();
        self
    }

    /// Sets both colors and color identity.
    pub fn colors(mut self, colors: ColorSet) -> Self {
        self.record.colors = Some(colors);
        self.record.color_identity = colors;
        self
    }

    pub fn color_identity(mut self, identity: ColorSet) -> Self {
        self.record.color_identity = identity;
        self
    }

    pub fn mana_value(mut self, mana_value: f64) -> Self {
        self.record.mana_value = mana_value;
        self
    }

    pub fn power_toughness(mut self, power: &str, toughness: &str) -> Self {
        self.record.power = Some(power.to_string());
        self.record.toughness = Some(toughness.to_string());
        self
    }

    pub fn loyalty(mut self, loyalty: &str) -> Self {
        self.record.loyalty = Some(loyalty.to_string());
        self
    }

    pub fn rarity(mut self, rarity: Rarity) -> Self {
        self.record.rarity = rarity.as_str().to_string();
        self
    }

    pub fn set_code(mut self, set_code: impl Into<String>) -> Self {
        self.record.set_code = set_code.into();
        self
    }

    pub fn artist(mut self, artist: impl Into<String>) -> Self {
        self.record.artist = Some(artist.into());
        self
    }

    pub fn layout(mut self, layout: impl Into<String>) -> Self {
        self.record.layout = layout.into();
        self
    }

    pub fn reprint(mut self) -> Self {
        self.record.reprint = true;
        self
    }

    pub fn legal_in(mut self, format: &str) -> Self {
        self.record
            .legalities
            .insert(format.to_string(), "legal".to_string());
        self
    }

    pub fn build(self) -> CardRecord {
        self.record
    }
}

/// Parses a JSON array of card objects.
#[cfg(feature = "serialization")]
pub fn cards_from_json(text: &str) -> Result<Vec<CardRecord>, LoadError> {
    let cards: Vec<CardRecord> = serde_json::from_str(text)?;
    Ok(cards.into_iter().map(CardRecord::normalized).collect())
}

/// Loads a `cards.json` dump from disk.
#[cfg(feature = "serialization")]
pub fn load_cards(path: impl AsRef<std::path::Path>) -> Result<Vec<CardRecord>, LoadError> {
    let file = std::fs::File::open(path)?;
    let cards: Vec<CardRecord> = serde_json::from_reader(std::io::BufReader::new(file))?;
    log::debug!("loaded {} card records", cards.len());
    Ok(cards.into_iter().map(CardRecord::normalized).collect())
}
