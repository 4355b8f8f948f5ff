use cardql::{
    CardRecord, ColorSet, CompareOp, FieldId, ParseErrorKind, Query, Rarity, Value, parse,
    parse_colors,
};

fn card(name: &str, colors: &str, mana_value: f64) -> CardRecord {
    CardRecord::builder(name)
        .type_line("Creature — Human Wizard")
        .colors(parse_colors(colors))
        .mana_value(mana_value)
        .rarity(Rarity::Uncommon)
        .build()
}

#[test]
fn smoke_commander_color_search() {
    let query = parse("c<=wu t:creature mv<=3").expect("smoke query should parse");

    assert!(query.matches(&card("Azorius Wizard", "wu", 2.0)));
    assert!(!query.matches(&card("Red Wizard", "r", 2.0)));
    assert!(!query.matches(&card("Big Azorius Wizard", "uw", 4.0)));
    assert!(query.matches(&card("Colorless Wizard", "", 1.0)));
}

#[test]
fn smoke_two_comparisons_join_with_and() {
    assert_eq!(
        parse("t:creature o:flying").expect("smoke query should parse"),
        Query::and(
            Query::comparison(FieldId::Type, CompareOp::Colon, Value::Text("creature".into())),
            Query::comparison(FieldId::Oracle, CompareOp::Colon, Value::Text("flying".into())),
        )
    );
}

#[test]
fn smoke_or_is_loosest() {
    assert_eq!(
        parse("a OR b c").expect("smoke query should parse"),
        Query::or(
            Query::bare("a"),
            Query::and(Query::bare("b"), Query::bare("c"))
        )
    );
}

#[test]
fn smoke_negated_type() {
    assert_eq!(
        parse("-t:land").expect("smoke query should parse"),
        Query::negate(Query::comparison(
            FieldId::Type,
            CompareOp::Colon,
            Value::Text("land".into())
        ))
    );
}

#[test]
fn smoke_unclosed_group_is_unbalanced() {
    let err = parse("(a").expect_err("unclosed group should fail");
    assert_eq!(err.kind, ParseErrorKind::UnbalancedParens);
    assert_eq!(err.caret("(a"), "(a\n^ unclosed '('");
}

#[test]
fn smoke_unknown_field_is_reported() {
    let err = parse("t:goblin flavor:\"lots of goblins\"").expect_err("unknown field should fail");
    assert_eq!(err.kind, ParseErrorKind::UnknownField);
    assert_eq!(err.offset, 9);
}

#[test]
fn smoke_identity_and_color_are_distinct() {
    let query = parse("id:g -c:g").expect("smoke query should parse");
    let hybrid_land = CardRecord::builder("Gruul Turf")
        .type_line("Land")
        .color_identity(ColorSet::RED.union(ColorSet::GREEN))
        .build();
    assert!(query.matches(&hybrid_land));
}

#[test]
fn smoke_parse_and_evaluate_are_repeatable() {
    let input = "(t:creature OR t:artifact) c<=wu -is:reprint";
    let first = parse(input).expect("smoke query should parse");
    let second = parse(input).expect("smoke query should parse");
    assert_eq!(first, second);

    let wizard = card("Azorius Wizard", "wu", 2.0);
    assert_eq!(first.matches(&wizard), second.matches(&wizard));
}

#[test]
fn smoke_display_reparses() {
    for input in [
        "c<=wu t:creature mv<=3",
        "(a OR b) -(c d)",
        "o:\"enters the battlefield\" r>=rare",
        "name:/^Goblin/i OR !\"Lightning Bolt\"",
    ] {
        let query = parse(input).expect("smoke query should parse");
        let rendered = query.to_string();
        assert_eq!(
            parse(&rendered).expect("rendered query should parse"),
            query,
            "{input:?} rendered as {rendered:?}"
        );
    }
}

#[test]
fn smoke_long_negation_chain() {
    let wizard = card("Azorius Wizard", "wu", 2.0);
    for (depth, expected) in [(200_000, true), (199_999, false)] {
        let input = format!("{}wizard", "-".repeat(depth));
        let query = parse(&input).expect("smoke query should parse");
        assert_eq!(query.matches(&wizard), expected, "depth {depth}");
        assert_eq!(query.to_string(), input);
        assert!(format!("{query:?}").ends_with("}))"));
        assert_eq!(query.clone(), query);
    }
}

#[test]
fn smoke_long_juxtaposition() {
    let input = vec!["wizard"; 100_000].join(" ");
    let query = parse(&input).expect("smoke query should parse");
    assert!(query.matches(&card("Azorius Wizard", "wu", 2.0)));
    assert!(!query.matches(&card("Red Goblin", "r", 1.0)));
    assert_eq!(query.to_string(), input);
}
