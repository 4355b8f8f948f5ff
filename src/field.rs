//! Searchable card fields and the operator dispatch table.
//!
//! Field names are resolved once at parse time. The evaluator only ever sees
//! a [`FieldId`] and a [`Dispatch`], so there is no string lookup per card.

use crate::ast::CompareOp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub enum FieldId {
    Name,
    Type,
    Oracle,
    Color,
    ColorIdentity,
    ManaValue,
    Power,
    Toughness,
    Loyalty,
    Defense,
    Rarity,
    Set,
    Artist,
    Layout,
    /// `is:` boolean card predicates.
    Is,
    /// `f:` format legality.
    Format,
    /// `has:` presence of an optional field.
    Has,
}

/// How a field's values are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free text; `:` means case-insensitive contains.
    Text,
    /// Short codes; `:` means case-insensitive equality.
    Code,
    Color,
    Numeric,
    /// Ordered rarity ladder.
    Rarity,
    /// Keyword checked against a card predicate (`is:`, `f:`, `has:`).
    Predicate,
}

/// Field spellings accepted in queries, all lowercase.
const FIELD_NAMES: &[(&str, FieldId)] = &[
    ("n", FieldId::Name),
    ("name", FieldId::Name),
    ("t", FieldId::Type),
    ("type", FieldId::Type),
    ("o", FieldId::Oracle),
    ("oracle", FieldId::Oracle),
    ("c", FieldId::Color),
    ("color", FieldId::Color),
    ("id", FieldId::ColorIdentity),
    ("ci", FieldId::ColorIdentity),
    ("identity", FieldId::ColorIdentity),
    ("mv", FieldId::ManaValue),
    ("cmc", FieldId::ManaValue),
    ("pow", FieldId::Power),
    ("power", FieldId::Power),
    ("tou", FieldId::Toughness),
    ("toughness", FieldId::Toughness),
    ("loy", FieldId::Loyalty),
    ("loyalty", FieldId::Loyalty),
    ("def", FieldId::Defense),
    ("defense", FieldId::Defense),
    ("r", FieldId::Rarity),
    ("rarity", FieldId::Rarity),
    ("s", FieldId::Set),
    ("set", FieldId::Set),
    ("e", FieldId::Set),
    ("a", FieldId::Artist),
    ("artist", FieldId::Artist),
    ("layout", FieldId::Layout),
    ("is", FieldId::Is),
    ("f", FieldId::Format),
    ("format", FieldId::Format),
    ("has", FieldId::Has),
];

impl FieldId {
    /// Resolves a field spelling, case-insensitively.
    pub fn resolve(name: &str) -> Option<Self> {
        FIELD_NAMES
            .iter()
            .find(|(spelling, _)| spelling.eq_ignore_ascii_case(name))
            .map(|(_, field)| *field)
    }

    /// The canonical spelling used when rendering queries.
    pub const fn code(self) -> &'static str {
        match self {
            FieldId::Name => "name",
            FieldId::Type => "t",
            FieldId::Oracle => "o",
            FieldId::Color => "c",
            FieldId::ColorIdentity => "id",
            FieldId::ManaValue => "mv",
            FieldId::Power => "pow",
            FieldId::Toughness => "tou",
            FieldId::Loyalty => "loy",
            FieldId::Defense => "def",
            FieldId::Rarity => "r",
            FieldId::Set => "set",
            FieldId::Artist => "a",
            FieldId::Layout => "layout",
            FieldId::Is => "is",
            FieldId::Format => "f",
            FieldId::Has => "has",
        }
    }

    pub const fn kind(self) -> FieldKind {
        match self {
            FieldId::Name | FieldId::Type | FieldId::Oracle | FieldId::Artist => FieldKind::Text,
            FieldId::Set | FieldId::Layout => FieldKind::Code,
            FieldId::Color | FieldId::ColorIdentity => FieldKind::Color,
            FieldId::ManaValue
            | FieldId::Power
            | FieldId::Toughness
            | FieldId::Loyalty
            | FieldId::Defense => FieldKind::Numeric,
            FieldId::Rarity => FieldKind::Rarity,
            FieldId::Is | FieldId::Format | FieldId::Has => FieldKind::Predicate,
        }
    }

    /// Optional fields a card may lack, checked by `has:`.
    pub const fn is_optional(self) -> bool {
        matches!(
            self,
            FieldId::Power
                | FieldId::Toughness
                | FieldId::Loyalty
                | FieldId::Defense
                | FieldId::Artist
        )
    }
}

/// The comparison a `field op value` clause performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Case-insensitive substring (or regex search).
    Contains,
    /// Case-insensitive equality (or regex search).
    Equals,
    /// Negation of [`Dispatch::Equals`].
    NotEquals,
    /// Numeric or rarity ordering. Never carries [`CompareOp::Colon`].
    Ordered(CompareOp),
    /// Delegates to [`crate::color::compare_colors`].
    ColorRelation(CompareOp),
    /// Keyword predicate, optionally negated (`is!=reprint`).
    Predicate { negated: bool },
}

/// The dispatch table: which comparison a field/operator pair performs,
/// or `None` when the operator means nothing for that field.
pub const fn dispatch(field: FieldId, op: CompareOp) -> Option<Dispatch> {
    use CompareOp::*;

    match (field.kind(), op) {
        (FieldKind::Text, Colon) => Some(Dispatch::Contains),
        (FieldKind::Text | FieldKind::Code, Eq) | (FieldKind::Code, Colon) => {
            Some(Dispatch::Equals)
        }
        (FieldKind::Text | FieldKind::Code, Ne) => Some(Dispatch::NotEquals),
        (FieldKind::Text | FieldKind::Code, Lt | Le | Gt | Ge) => None,
        (FieldKind::Numeric | FieldKind::Rarity, Colon) => Some(Dispatch::Ordered(Eq)),
        (FieldKind::Numeric | FieldKind::Rarity, op) => Some(Dispatch::Ordered(op)),
        (FieldKind::Color, op) => Some(Dispatch::ColorRelation(op)),
        (FieldKind::Predicate, Colon | Eq) => Some(Dispatch::Predicate { negated: false }),
        (FieldKind::Predicate, Ne) => Some(Dispatch::Predicate { negated: true }),
        (FieldKind::Predicate, Lt | Le | Gt | Ge) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("t", FieldId::Type)]
    #[case("TYPE", FieldId::Type)]
    #[case("o", FieldId::Oracle)]
    #[case("id", FieldId::ColorIdentity)]
    #[case("ci", FieldId::ColorIdentity)]
    #[case("cmc", FieldId::ManaValue)]
    #[case("s", FieldId::Set)]
    #[case("f", FieldId::Format)]
    #[case("a", FieldId::Artist)]
    fn resolves_field_spellings(#[case] name: &str, #[case] expected: FieldId) {
        assert_eq!(FieldId::resolve(name), Some(expected));
    }

    #[test]
    fn unknown_fields_do_not_resolve() {
        assert_eq!(FieldId::resolve("flavor"), None);
        assert_eq!(FieldId::resolve(""), None);
    }

    #[test]
    fn canonical_codes_resolve_to_themselves() {
        for (_, field) in FIELD_NAMES {
            assert_eq!(FieldId::resolve(field.code()), Some(*field));
        }
    }

    #[rstest]
    #[case(FieldId::Oracle, CompareOp::Colon, Some(Dispatch::Contains))]
    #[case(FieldId::Oracle, CompareOp::Eq, Some(Dispatch::Equals))]
    #[case(FieldId::Oracle, CompareOp::Lt, None)]
    #[case(FieldId::Set, CompareOp::Colon, Some(Dispatch::Equals))]
    #[case(FieldId::ManaValue, CompareOp::Colon, Some(Dispatch::Ordered(CompareOp::Eq)))]
    #[case(FieldId::Power, CompareOp::Gt, Some(Dispatch::Ordered(CompareOp::Gt)))]
    #[case(FieldId::Color, CompareOp::Colon, Some(Dispatch::ColorRelation(CompareOp::Colon)))]
    #[case(FieldId::Is, CompareOp::Colon, Some(Dispatch::Predicate { negated: false }))]
    #[case(FieldId::Is, CompareOp::Ne, Some(Dispatch::Predicate { negated: true }))]
    #[case(FieldId::Format, CompareOp::Ge, None)]
    fn dispatch_table(
        #[case] field: FieldId,
        #[case] op: CompareOp,
        #[case] expected: Option<Dispatch>,
    ) {
        assert_eq!(dispatch(field, op), expected);
    }
}
