//! Query evaluation against a single card.

use crate::ast::{CompareOp, Query, RegexLiteral, STACK_GROWTH, STACK_RED_ZONE, Value};
use crate::card::Rarity;
use crate::color::{ColorSet, compare_colors};
use crate::field::{Dispatch, FieldId, dispatch};

/// Read access to the searchable properties of one card.
///
/// Implementors may compute fields lazily; evaluation short-circuits, so
/// a field is only read when the query reaches it.
pub trait CardAccessor {
    fn name(&self) -> &str;
    fn type_line(&self) -> &str;
    fn oracle_text(&self) -> &str;
    /// `None` is read as colorless.
    fn colors(&self) -> Option<ColorSet>;
    fn color_identity(&self) -> Option<ColorSet>;
    fn mana_value(&self) -> Option<f64>;
    fn power(&self) -> Option<f64>;
    fn toughness(&self) -> Option<f64>;
    fn loyalty(&self) -> Option<f64>;
    fn rarity(&self) -> &str;
    fn set_code(&self) -> &str;
    /// Answers an `is:` keyword such as `reprint` or `permanent`.
    fn has_flag(&self, flag: &str) -> bool;

    fn defense(&self) -> Option<f64> {
        None
    }

    fn artist(&self) -> Option<&str> {
        None
    }

    fn layout(&self) -> &str {
        "normal"
    }

    fn is_legal_in(&self, _format: &str) -> bool {
        false
    }
}

impl Query {
    /// Shorthand for [`evaluate`].
    pub fn matches<C: CardAccessor + ?Sized>(&self, card: &C) -> bool {
        evaluate(self, card)
    }
}

/// Returns whether `card` satisfies `query`.
///
/// Never fails: a field the card lacks simply does not match.
pub fn evaluate<C: CardAccessor + ?Sized>(query: &Query, card: &C) -> bool {
    stacker::maybe_grow(STACK_RED_ZONE, STACK_GROWTH, || match query {
        Query::And(clauses) => clauses.iter().all(|clause| evaluate(clause, card)),
        Query::Or(clauses) => clauses.iter().any(|clause| evaluate(clause, card)),
        Query::Not(inner) => !evaluate(inner, card),
        Query::Comparison { field, op, value } => compare(*field, *op, value, card),
        Query::BareTerm { text } => contains_ignore_case(card.name(), text),
        Query::BareRegex { regex } => regex_matches(regex, card.name()),
    })
}

fn compare<C: CardAccessor + ?Sized>(
    field: FieldId,
    op: CompareOp,
    value: &Value,
    card: &C,
) -> bool {
    let Some(rule) = dispatch(field, op) else {
        log::debug!("no dispatch for {}{op}; treating as no match", field.code());
        return false;
    };

    match rule {
        Dispatch::Contains => text_of(field, card).is_some_and(|text| text_contains(text, value)),
        Dispatch::Equals => text_of(field, card).is_some_and(|text| text_equals(text, value)),
        Dispatch::NotEquals => {
            text_of(field, card).is_some_and(|text| !text_equals(text, value))
        }
        Dispatch::Ordered(op) => ordered(field, op, value, card),
        Dispatch::ColorRelation(op) => {
            let Value::ColorSetLiteral(query) = value else {
                return false;
            };
            let colors = match field {
                FieldId::ColorIdentity => card.color_identity(),
                _ => card.colors(),
            };
            compare_colors(colors, *query, op)
        }
        Dispatch::Predicate { negated } => {
            let Value::Keyword(keyword) = value else {
                return false;
            };
            predicate(field, keyword, card) != negated
        }
    }
}

fn text_of<C: CardAccessor + ?Sized>(field: FieldId, card: &C) -> Option<&str> {
    match field {
        FieldId::Name => Some(card.name()),
        FieldId::Type => Some(card.type_line()),
        FieldId::Oracle => Some(card.oracle_text()),
        FieldId::Artist => card.artist(),
        FieldId::Set => Some(card.set_code()),
        FieldId::Layout => Some(card.layout()),
        _ => None,
    }
}

fn text_contains(text: &str, value: &Value) -> bool {
    match value {
        Value::Text(needle) | Value::Keyword(needle) => contains_ignore_case(text, needle),
        Value::Regex(regex) => regex_matches(regex, text),
        _ => false,
    }
}

fn text_equals(text: &str, value: &Value) -> bool {
    match value {
        Value::Text(expected) | Value::Keyword(expected) => {
            text.to_lowercase() == expected.to_lowercase()
        }
        Value::Regex(regex) => regex_matches(regex, text),
        _ => false,
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// The single regex path shared by field-scoped and bare-name regexes.
fn regex_matches(regex: &RegexLiteral, text: &str) -> bool {
    regex.is_match(text)
}

fn ordered<C: CardAccessor + ?Sized>(
    field: FieldId,
    op: CompareOp,
    value: &Value,
    card: &C,
) -> bool {
    match (field, value) {
        (FieldId::Rarity, Value::Keyword(wanted)) => {
            match (Rarity::parse(card.rarity()), Rarity::parse(wanted)) {
                (Some(have), Some(wanted)) => holds(op, have.cmp(&wanted)),
                _ => false,
            }
        }
        (_, Value::Number(wanted)) => {
            let have = match field {
                FieldId::ManaValue => card.mana_value(),
                FieldId::Power => card.power(),
                FieldId::Toughness => card.toughness(),
                FieldId::Loyalty => card.loyalty(),
                FieldId::Defense => card.defense(),
                _ => None,
            };
            have.and_then(|have| have.partial_cmp(wanted))
                .is_some_and(|ordering| holds(op, ordering))
        }
        _ => false,
    }
}

fn holds(op: CompareOp, ordering: std::cmp::Ordering) -> bool {
    use std::cmp::Ordering::*;

    match op {
        CompareOp::Colon | CompareOp::Eq => ordering == Equal,
        CompareOp::Ne => ordering != Equal,
        CompareOp::Lt => ordering == Less,
        CompareOp::Le => ordering != Greater,
        CompareOp::Gt => ordering == Greater,
        CompareOp::Ge => ordering != Less,
    }
}

fn predicate<C: CardAccessor + ?Sized>(field: FieldId, keyword: &str, card: &C) -> bool {
    match field {
        FieldId::Is => card.has_flag(keyword),
        FieldId::Format => card.is_legal_in(keyword),
        FieldId::Has => match FieldId::resolve(keyword) {
            Some(FieldId::Power) => card.power().is_some(),
            Some(FieldId::Toughness) => card.toughness().is_some(),
            Some(FieldId::Loyalty) => card.loyalty().is_some(),
            Some(FieldId::Defense) => card.defense().is_some(),
            Some(FieldId::Artist) => card.artist().is_some(),
            _ => false,
        },
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::CardRecord;
    use crate::color::parse_colors;
    use crate::parser::parse;
    use rstest::rstest;
    use std::cell::Cell;

    fn goblin() -> CardRecord {
        CardRecord::builder("Goblin Guide")
            .type_line("Creature — Goblin Scout")
            .oracle_text("Haste\nWhenever Goblin Guide attacks, defending player reveals the top card of their library.")
            .colors(parse_colors("r"))
            .mana_value(1.0)
            .power_toughness("2", "2")
            .rarity(Rarity::Rare)
            .set_code("zen")
            .artist("Warren Mahy")
            .legal_in("modern")
            .build()
    }

    fn jace() -> CardRecord {
        CardRecord::builder("Jace, the Mind Sculptor")
            .type_line("Legendary Planeswalker — Jace")
            .oracle_text("+2: Look at the top card of target player's library.")
            .colors(parse_colors("u"))
            .mana_value(4.0)
            .loyalty("3")
            .rarity(Rarity::Mythic)
            .set_code("wwk")
            .reprint()
            .build()
    }

    fn matches(query: &str, card: &CardRecord) -> bool {
        parse(query)
            .unwrap_or_else(|err| panic!("{query:?} should parse: {err}"))
            .matches(card)
    }

    #[rstest]
    #[case("goblin", true)]
    #[case("GUIDE", true)]
    #[case("elf", false)]
    #[case("o:haste", true)]
    #[case("o:\"defending player\"", true)]
    #[case("t:goblin", true)]
    #[case("t=creature", false)]
    #[case("name=\"goblin guide\"", true)]
    #[case("name!=\"goblin guide\"", false)]
    #[case("!\"Goblin Guide\"", true)]
    #[case("!goblin", false)]
    #[case("set:ZEN", true)]
    #[case("a:mahy", true)]
    #[case("mv=1", true)]
    #[case("mv:1", true)]
    #[case("pow>=2", true)]
    #[case("tou<2", false)]
    #[case("loy>0", false)]
    #[case("r>=rare", true)]
    #[case("r<rare", false)]
    #[case("r:r", true)]
    #[case("f:modern", true)]
    #[case("f:legacy", false)]
    #[case("has:power", true)]
    #[case("has:loyalty", false)]
    #[case("-has:loyalty", true)]
    #[case("is:permanent", true)]
    #[case("is!=reprint", true)]
    #[case("c:r", true)]
    #[case("c<=wubrg", true)]
    #[case("id=r", true)]
    #[case("/^Gob/", true)]
    #[case("/^gob/", false)]
    #[case("/^GUIDE/i", false)]
    #[case("/guide$/i", true)]
    #[case("o:/when\\w+ .* attacks/i", true)]
    #[case("layout:normal", true)]
    fn evaluates_against_goblin(#[case] query: &str, #[case] expected: bool) {
        assert_eq!(matches(query, &goblin()), expected, "query {query:?}");
    }

    #[rstest]
    #[case("loy>=3", true)]
    #[case("has:loyalty", true)]
    #[case("pow>=0", false)]
    #[case("-pow>=0", true)]
    #[case("is:reprint", true)]
    #[case("t:legendary t:planeswalker", true)]
    #[case("goblin OR jace", true)]
    #[case("-(goblin OR jace)", false)]
    #[case("r=mythic", true)]
    fn evaluates_against_jace(#[case] query: &str, #[case] expected: bool) {
        assert_eq!(matches(query, &jace()), expected, "query {query:?}");
    }

    #[test]
    fn bare_and_field_regex_agree() {
        let card = goblin();
        for pattern in ["/goblin/i", "/^Goblin Guide$/", "/z/"] {
            let bare = matches(pattern, &card);
            let field = matches(&format!("name:{pattern}"), &card);
            assert_eq!(bare, field, "pattern {pattern}");
        }
    }

    /// Counts accessor reads to observe short-circuiting.
    struct CountingCard {
        name_reads: Cell<usize>,
    }

    impl CardAccessor for CountingCard {
        fn name(&self) -> &str {
            self.name_reads.set(self.name_reads.get() + 1);
            "Counter"
        }
        fn type_line(&self) -> &str {
            "Artifact"
        }
        fn oracle_text(&self) -> &str {
            ""
        }
        fn colors(&self) -> Option<ColorSet> {
            None
        }
        fn color_identity(&self) -> Option<ColorSet> {
            None
        }
        fn mana_value(&self) -> Option<f64> {
            Some(0.0)
        }
        fn power(&self) -> Option<f64> {
            None
        }
        fn toughness(&self) -> Option<f64> {
            None
        }
        fn loyalty(&self) -> Option<f64> {
            None
        }
        fn rarity(&self) -> &str {
            "common"
        }
        fn set_code(&self) -> &str {
            "tst"
        }
        fn has_flag(&self, _flag: &str) -> bool {
            false
        }
    }

    #[test]
    fn and_short_circuits_on_false() {
        let card = CountingCard {
            name_reads: Cell::new(0),
        };
        let query = parse("t:creature counter").expect("query should parse");
        assert!(!query.matches(&card));
        assert_eq!(card.name_reads.get(), 0);
    }

    #[test]
    fn or_short_circuits_on_true() {
        let card = CountingCard {
            name_reads: Cell::new(0),
        };
        let query = parse("t:artifact OR counter").expect("query should parse");
        assert!(query.matches(&card));
        assert_eq!(card.name_reads.get(), 0);
    }

    #[test]
    fn missing_colors_read_as_colorless() {
        let card = CountingCard {
            name_reads: Cell::new(0),
        };
        assert!(parse("c<=bg").expect("query should parse").matches(&card));
        assert!(parse("c=c").expect("query should parse").matches(&card));
        assert!(!parse("c=b").expect("query should parse").matches(&card));
        assert!(!parse("f:modern").expect("query should parse").matches(&card));
    }

    #[test]
    fn evaluation_is_repeatable() {
        let query = parse("t:creature (c:r OR c:g) mv<=2").expect("query should parse");
        let card = goblin();
        let first = query.matches(&card);
        assert_eq!(first, query.matches(&card));
        assert!(first);
    }
}
