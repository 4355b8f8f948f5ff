//! Colors, color sets, and the set algebra behind `c:` and `id:` queries.
//!
//! Parsing is deliberately forgiving: anything that is not a color letter or a
//! known color name is dropped, so a typo in the color portion of a query
//! narrows nothing instead of failing the whole query.

use std::fmt;

use crate::ast::CompareOp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub enum Color {
    #[cfg_attr(feature = "serialization", serde(rename = "W"))]
    White,
    #[cfg_attr(feature = "serialization", serde(rename = "U"))]
    Blue,
    #[cfg_attr(feature = "serialization", serde(rename = "B"))]
    Black,
    #[cfg_attr(feature = "serialization", serde(rename = "R"))]
    Red,
    #[cfg_attr(feature = "serialization", serde(rename = "G"))]
    Green,
}

impl Color {
    /// Canonical display order (W, U, B, R, G).
    pub const ALL: [Color; 5] = [
        Color::White,
        Color::Blue,
        Color::Black,
        Color::Red,
        Color::Green,
    ];

    /// The one-letter mana symbol for this color.
    pub const fn symbol(self) -> char {
        match self {
            Color::White => 'W',
            Color::Blue => 'U',
            Color::Black => 'B',
            Color::Red => 'R',
            Color::Green => 'G',
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Color::White => "White",
            Color::Blue => "Blue",
            Color::Black => "Black",
            Color::Red => "Red",
            Color::Green => "Green",
        }
    }

    /// Reads a single color letter, case-insensitively.
    ///
    /// `c` (colorless) is not a color and yields `None`.
    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol.to_ascii_lowercase() {
            'w' => Some(Color::White),
            'u' => Some(Color::Blue),
            'b' => Some(Color::Black),
            'r' => Some(Color::Red),
            'g' => Some(Color::Green),
            _ => None,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A set of colors represented as bitflags for efficient operations.
///
/// Colorless is the empty set; there is no colorless member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ColorSet(u8);

impl ColorSet {
    pub const COLORLESS: Self = Self(0);
    pub const WHITE: Self = Self(1 << 0);
    pub const BLUE: Self = Self(1 << 1);
    pub const BLACK: Self = Self(1 << 2);
    pub const RED: Self = Self(1 << 3);
    pub const GREEN: Self = Self(1 << 4);
    pub const ALL: Self = Self(0b1_1111);

    /// Creates a new empty ColorSet.
    pub const fn new() -> Self {
        Self(0)
    }

    /// Creates a ColorSet from a single color.
    pub const fn from_color(color: Color) -> Self {
        match color {
            Color::White => Self::WHITE,
            Color::Blue => Self::BLUE,
            Color::Black => Self::BLACK,
            Color::Red => Self::RED,
            Color::Green => Self::GREEN,
        }
    }

    /// Rebuilds a set from its raw bit pattern, ignoring bits above green.
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & Self::ALL.0)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Returns true if this set contains no colors.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns true if this set contains the given color.
    pub const fn contains(self, color: Color) -> bool {
        self.0 & Self::from_color(color).0 != 0
    }

    /// Returns true if this set contains all colors in the other set.
    pub const fn contains_all(self, other: ColorSet) -> bool {
        self.0 & other.0 == other.0
    }

    /// Every color in `self` is also in `other`.
    pub const fn is_subset(self, other: ColorSet) -> bool {
        other.contains_all(self)
    }

    pub const fn is_superset(self, other: ColorSet) -> bool {
        self.contains_all(other)
    }

    pub const fn is_strict_subset(self, other: ColorSet) -> bool {
        self.is_subset(other) && self.0 != other.0
    }

    pub const fn is_strict_superset(self, other: ColorSet) -> bool {
        self.is_superset(other) && self.0 != other.0
    }

    /// Returns the union of two color sets.
    pub const fn union(self, other: ColorSet) -> Self {
        Self(self.0 | other.0)
    }

    /// Returns the intersection of two color sets.
    pub const fn intersection(self, other: ColorSet) -> Self {
        Self(self.0 & other.0)
    }

    /// The colors of the five that are not in this set.
    pub const fn complement(self) -> Self {
        Self(!self.0 & Self::ALL.0)
    }

    /// Returns the number of colors in this set.
    pub const fn count(self) -> u32 {
        self.0.count_ones()
    }

    /// Adds a color to this set, returning the new set.
    pub const fn with(self, color: Color) -> Self {
        self.union(Self::from_color(color))
    }

    /// Removes a color from this set, returning the new set.
    pub const fn without(self, color: Color) -> Self {
        Self(self.0 & !Self::from_color(color).0)
    }

    /// Iterates members in canonical W, U, B, R, G order.
    pub fn iter(self) -> impl Iterator<Item = Color> {
        Color::ALL
            .into_iter()
            .filter(move |color| self.contains(*color))
    }

    /// Mana symbols in canonical order, e.g. `"WUG"`. Empty for colorless.
    pub fn symbols(self) -> String {
        self.iter().map(Color::symbol).collect()
    }
}

impl From<Color> for ColorSet {
    fn from(color: Color) -> Self {
        Self::from_color(color)
    }
}

impl FromIterator<Color> for ColorSet {
    fn from_iter<T: IntoIterator<Item = Color>>(iter: T) -> Self {
        iter.into_iter()
            .fold(ColorSet::COLORLESS, |set, color| set.with(color))
    }
}

impl fmt::Display for ColorSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            f.write_str("C")
        } else {
            f.write_str(&self.symbols())
        }
    }
}

#[cfg(feature = "serialization")]
impl serde::Serialize for ColorSet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter().map(|color| color.symbol().to_string()))
    }
}

/// Accepts a list of symbols or names (`["W", "U"]`), leniently, so card
/// dumps that carry stray entries still load.
#[cfg(feature = "serialization")]
impl<'de> serde::Deserialize<'de> for ColorSet {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entries = Vec::<String>::deserialize(deserializer)?;
        Ok(entries
            .iter()
            .fold(ColorSet::COLORLESS, |set, entry| {
                set.union(parse_colors(entry))
            }))
    }
}

const fn pair(a: ColorSet, b: ColorSet) -> ColorSet {
    a.union(b)
}

const fn triple(a: ColorSet, b: ColorSet, c: ColorSet) -> ColorSet {
    a.union(b).union(c)
}

/// Guild, shard and wedge names keyed by their color set.
///
/// Lookups compare whole sets, so the order colors were written or collected
/// in never affects the result.
const NAMED_SETS: [(&str, ColorSet); 20] = [
    ("Azorius", pair(ColorSet::WHITE, ColorSet::BLUE)),
    ("Orzhov", pair(ColorSet::WHITE, ColorSet::BLACK)),
    ("Boros", pair(ColorSet::WHITE, ColorSet::RED)),
    ("Selesnya", pair(ColorSet::WHITE, ColorSet::GREEN)),
    ("Dimir", pair(ColorSet::BLUE, ColorSet::BLACK)),
    ("Izzet", pair(ColorSet::BLUE, ColorSet::RED)),
    ("Simic", pair(ColorSet::BLUE, ColorSet::GREEN)),
    ("Rakdos", pair(ColorSet::BLACK, ColorSet::RED)),
    ("Golgari", pair(ColorSet::BLACK, ColorSet::GREEN)),
    ("Gruul", pair(ColorSet::RED, ColorSet::GREEN)),
    // Shards (allied).
    ("Bant", triple(ColorSet::WHITE, ColorSet::BLUE, ColorSet::GREEN)),
    ("Esper", triple(ColorSet::WHITE, ColorSet::BLUE, ColorSet::BLACK)),
    ("Grixis", triple(ColorSet::BLUE, ColorSet::BLACK, ColorSet::RED)),
    ("Jund", triple(ColorSet::BLACK, ColorSet::RED, ColorSet::GREEN)),
    ("Naya", triple(ColorSet::WHITE, ColorSet::RED, ColorSet::GREEN)),
    // Wedges (enemy).
    ("Abzan", triple(ColorSet::WHITE, ColorSet::BLACK, ColorSet::GREEN)),
    ("Jeskai", triple(ColorSet::WHITE, ColorSet::BLUE, ColorSet::RED)),
    ("Sultai", triple(ColorSet::BLUE, ColorSet::BLACK, ColorSet::GREEN)),
    ("Mardu", triple(ColorSet::WHITE, ColorSet::BLACK, ColorSet::RED)),
    ("Temur", triple(ColorSet::BLUE, ColorSet::RED, ColorSet::GREEN)),
];

fn named_color_set(word: &str) -> Option<ColorSet> {
    if word.eq_ignore_ascii_case("colorless") {
        return Some(ColorSet::COLORLESS);
    }
    if let Some(color) = Color::ALL
        .into_iter()
        .find(|color| color.name().eq_ignore_ascii_case(word))
    {
        return Some(color.into());
    }
    NAMED_SETS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(word))
        .map(|(_, set)| *set)
}

/// Parses user-typed color text into a set.
///
/// Accepts letters (`w`, `ub`, `wubrg`), full names (`white`), guild, shard
/// and wedge names (`azorius`, `jund`), and comma-separated lists of these.
/// Unknown characters are dropped; `c` and `colorless` contribute nothing.
pub fn parse_colors(input: &str) -> ColorSet {
    input
        .split(|ch: char| ch == ',' || ch.is_whitespace())
        .filter(|part| !part.is_empty())
        .fold(ColorSet::COLORLESS, |set, part| {
            let parsed = named_color_set(part)
                .unwrap_or_else(|| part.chars().filter_map(Color::from_symbol).collect());
            set.union(parsed)
        })
}

pub fn is_subset(a: ColorSet, b: ColorSet) -> bool {
    a.is_subset(b)
}

pub fn is_superset(a: ColorSet, b: ColorSet) -> bool {
    a.is_superset(b)
}

pub fn sets_equal(a: ColorSet, b: ColorSet) -> bool {
    a == b
}

pub fn is_strict_subset(a: ColorSet, b: ColorSet) -> bool {
    a.is_strict_subset(b)
}

pub fn is_strict_superset(a: ColorSet, b: ColorSet) -> bool {
    a.is_strict_superset(b)
}

/// Compares a card's colors against a queried set.
///
/// A card without colors (`None`) is treated as colorless.
///
/// | operator | holds when |
/// |---|---|
/// | `<=` | card ⊆ query (fits in these colors) |
/// | `:` `>=` | card ⊇ query |
/// | `=` / `!=` | exact set (in)equality |
/// | `<` / `>` | strict subset / superset |
pub fn compare_colors(card_colors: Option<ColorSet>, query: ColorSet, op: CompareOp) -> bool {
    let card = card_colors.unwrap_or_default();
    match op {
        CompareOp::Le => card.is_subset(query),
        CompareOp::Colon | CompareOp::Ge => card.is_superset(query),
        CompareOp::Eq => card == query,
        CompareOp::Ne => card != query,
        CompareOp::Lt => card.is_strict_subset(query),
        CompareOp::Gt => card.is_strict_superset(query),
    }
}

/// Canonical display name for a color identity, e.g. `"Azorius (WU)"`.
pub fn color_identity_label(colors: ColorSet) -> String {
    match colors.count() {
        0 => "Colorless".to_string(),
        1 => colors
            .iter()
            .next()
            .map(|color| color.name().to_string())
            .unwrap_or_default(),
        2 | 3 => match NAMED_SETS.iter().find(|(_, set)| *set == colors) {
            Some((name, _)) => format!("{name} ({})", colors.symbols()),
            None => colors.symbols(),
        },
        4 => {
            let missing = colors
                .complement()
                .iter()
                .next()
                .map(Color::name)
                .unwrap_or_default();
            format!("Non-{missing} ({})", colors.symbols())
        }
        _ => format!("Five-Color ({})", colors.symbols()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn every_set() -> impl Iterator<Item = ColorSet> {
        (0u8..32).map(ColorSet::from_bits)
    }

    #[test]
    fn test_color_set_empty() {
        let set = ColorSet::new();
        assert!(set.is_empty());
        assert_eq!(set.count(), 0);
        assert_eq!(set.to_string(), "C");
    }

    #[test]
    fn test_color_set_iterates_in_canonical_order() {
        let set: ColorSet = [Color::Green, Color::White, Color::Black]
            .into_iter()
            .collect();
        assert_eq!(set.symbols(), "WBG");
    }

    #[test]
    fn test_color_set_with_without() {
        let set = ColorSet::new().with(Color::Green).with(Color::White);
        assert_eq!(set.count(), 2);

        let set = set.without(Color::Green);
        assert!(set.contains(Color::White));
        assert!(!set.contains(Color::Green));
        assert_eq!(set.count(), 1);
    }

    #[rstest]
    #[case("W", "W")]
    #[case("wubrg", "WUBRG")]
    #[case("wx", "W")]
    #[case("123", "")]
    #[case("c", "")]
    #[case("colorless", "")]
    #[case("bg", "BG")]
    #[case("GB", "BG")]
    #[case("black", "B")]
    #[case("Blue", "U")]
    #[case("white,blue", "WU")]
    #[case("azorius", "WU")]
    #[case("JUND", "BRG")]
    #[case("temur", "URG")]
    #[case("", "")]
    fn test_parse_colors(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(parse_colors(input).symbols(), expected);
    }

    #[test]
    fn test_subset_laws_hold_for_every_set() {
        for a in every_set() {
            assert!(is_subset(a, a));
            assert!(is_subset(ColorSet::COLORLESS, a));
            assert!(!is_strict_subset(a, a));
            for b in every_set() {
                assert_eq!(sets_equal(a, b), is_subset(a, b) && is_subset(b, a));
                assert_eq!(is_superset(a, b), is_subset(b, a));
                assert_eq!(is_strict_superset(a, b), is_strict_subset(b, a));
            }
        }
    }

    #[rstest]
    #[case("", "bg", CompareOp::Le, true)]
    #[case("r", "bg", CompareOp::Le, false)]
    #[case("urg", "ur", CompareOp::Colon, true)]
    #[case("urg", "ur", CompareOp::Ge, true)]
    #[case("ur", "ur", CompareOp::Eq, true)]
    #[case("urg", "ur", CompareOp::Eq, false)]
    #[case("urg", "ur", CompareOp::Ne, true)]
    #[case("u", "ur", CompareOp::Lt, true)]
    #[case("ur", "ur", CompareOp::Lt, false)]
    #[case("urg", "ur", CompareOp::Gt, true)]
    #[case("", "", CompareOp::Eq, true)]
    #[case("", "w", CompareOp::Eq, false)]
    fn test_compare_colors(
        #[case] card: &str,
        #[case] query: &str,
        #[case] op: CompareOp,
        #[case] expected: bool,
    ) {
        assert_eq!(
            compare_colors(Some(parse_colors(card)), parse_colors(query), op),
            expected
        );
    }

    #[test]
    fn test_compare_colors_treats_missing_as_colorless() {
        let bg = parse_colors("bg");
        assert!(compare_colors(None, bg, CompareOp::Le));
        assert!(!compare_colors(None, bg, CompareOp::Eq));
        assert!(compare_colors(None, ColorSet::COLORLESS, CompareOp::Eq));
    }

    #[rstest]
    #[case(&[Color::White, Color::Blue], "Azorius (WU)")]
    #[case(&[Color::Blue, Color::White], "Azorius (WU)")]
    #[case(&[Color::Green, Color::Red, Color::Black], "Jund (BRG)")]
    #[case(&[Color::Green, Color::White, Color::Blue], "Bant (WUG)")]
    #[case(&[Color::Red, Color::Blue, Color::Green], "Temur (URG)")]
    #[case(&[], "Colorless")]
    #[case(&[Color::Red], "Red")]
    #[case(&[Color::White, Color::Blue, Color::Black, Color::Red], "Non-Green (WUBR)")]
    #[case(&[Color::Green, Color::Red, Color::Black, Color::Blue], "Non-White (UBRG)")]
    #[case(
        &[Color::White, Color::Blue, Color::Black, Color::Red, Color::Green],
        "Five-Color (WUBRG)"
    )]
    fn test_color_identity_label(#[case] colors: &[Color], #[case] expected: &str) {
        let set: ColorSet = colors.iter().copied().collect();
        assert_eq!(color_identity_label(set), expected);
    }

    #[test]
    fn test_every_two_and_three_color_set_has_a_name() {
        for set in every_set().filter(|set| matches!(set.count(), 2 | 3)) {
            let label = color_identity_label(set);
            assert!(label.contains('('), "unnamed set {set}: {label}");
        }
    }
}
