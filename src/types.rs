#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Supertype {
    Basic,
    Legendary,
    Snow,
    World,
}

impl Supertype {
    pub fn from_word(word: &str) -> Option<Self> {
        match word.to_ascii_lowercase().as_str() {
            "basic" => Some(Supertype::Basic),
            "legendary" => Some(Supertype::Legendary),
            "snow" => Some(Supertype::Snow),
            "world" => Some(Supertype::World),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CardType {
    Land,
    Creature,
    Artifact,
    Enchantment,
    Planeswalker,
    Instant,
    Sorcery,
    Battle,
    Kindred, // Formerly Tribal
}

impl CardType {
    pub fn from_word(word: &str) -> Option<Self> {
        match word.to_ascii_lowercase().as_str() {
            "land" => Some(CardType::Land),
            "creature" => Some(CardType::Creature),
            "artifact" => Some(CardType::Artifact),
            "enchantment" => Some(CardType::Enchantment),
            "planeswalker" => Some(CardType::Planeswalker),
            "instant" => Some(CardType::Instant),
            "sorcery" => Some(CardType::Sorcery),
            "battle" => Some(CardType::Battle),
            "kindred" | "tribal" => Some(CardType::Kindred),
            _ => None,
        }
    }

    /// Returns true if cards of this type stay on the battlefield.
    pub fn is_permanent(self) -> bool {
        matches!(
            self,
            CardType::Land
                | CardType::Creature
                | CardType::Artifact
                | CardType::Enchantment
                | CardType::Planeswalker
                | CardType::Battle
        )
    }
}

/// Supertypes and card types read off a printed type line.
///
/// Subtypes (everything after the dash) are not classified; text queries
/// such as `t:elf` match them directly against the type line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeLine {
    pub supertypes: Vec<Supertype>,
    pub card_types: Vec<CardType>,
}

impl TypeLine {
    /// Parses every face of a type line such as
    /// `"Legendary Creature — Elf Druid // Land"`.
    pub fn parse(line: &str) -> Self {
        let mut parsed = TypeLine::default();
        for face in line.split("//") {
            let head = face.split(['—', '-']).next().unwrap_or(face);
            for word in head.split_whitespace() {
                if let Some(supertype) = Supertype::from_word(word) {
                    if !parsed.supertypes.contains(&supertype) {
                        parsed.supertypes.push(supertype);
                    }
                } else if let Some(card_type) = CardType::from_word(word)
                    && !parsed.card_types.contains(&card_type)
                {
                    parsed.card_types.push(card_type);
                }
            }
        }
        parsed
    }

    pub fn has(&self, card_type: CardType) -> bool {
        self.card_types.contains(&card_type)
    }

    pub fn is_legendary(&self) -> bool {
        self.supertypes.contains(&Supertype::Legendary)
    }

    pub fn is_permanent(&self) -> bool {
        self.card_types.iter().any(|card_type| card_type.is_permanent())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_legendary_creature() {
        let line = TypeLine::parse("Legendary Creature — Elf Druid");
        assert!(line.is_legendary());
        assert_eq!(line.card_types, vec![CardType::Creature]);
        assert!(line.is_permanent());
    }

    #[test]
    fn test_parse_subtypes_are_ignored() {
        // "Land" after the dash would be a subtype, never a card type.
        let line = TypeLine::parse("Artifact — Equipment");
        assert_eq!(line.card_types, vec![CardType::Artifact]);
    }

    #[test]
    fn test_parse_both_faces() {
        let line = TypeLine::parse("Sorcery // Land");
        assert!(line.has(CardType::Sorcery));
        assert!(line.has(CardType::Land));
    }

    #[test]
    fn test_tribal_is_kindred() {
        let line = TypeLine::parse("Tribal Instant — Goblin");
        assert!(line.has(CardType::Kindred));
        assert!(line.has(CardType::Instant));
        assert!(!line.is_permanent());
    }
}
