mod common;

use common::{compile, compile_with, eval, movie, movie_schema, Record};
use proptest::prelude::*;
use serde_json::{json, Value as Json};
use sombra_where::config::CompilerConfig;
use sombra_where::cypher::Predicate;

#[derive(Debug, Clone)]
enum Leaf {
    Year { suffix: &'static str, year: i64 },
    YearIn(Vec<i64>),
    Title { suffix: &'static str, text: String },
    Rating { suffix: &'static str, rating: f64 },
}

impl Leaf {
    fn to_filter(&self) -> Json {
        match self {
            Leaf::Year { suffix, year } => json!({ format!("releasedIn{suffix}"): year }),
            Leaf::YearIn(years) => json!({ "releasedIn_IN": years }),
            Leaf::Title { suffix, text } => json!({ format!("title{suffix}"): text }),
            Leaf::Rating { suffix, rating } => json!({ format!("averageRating{suffix}"): rating }),
        }
    }
}

fn arb_ordering() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec!["", "_NOT", "_LT", "_LTE", "_GT", "_GTE"])
}

fn arb_leaf() -> impl Strategy<Value = Leaf> {
    prop_oneof![
        (arb_ordering(), 1900i64..2030).prop_map(|(suffix, year)| Leaf::Year { suffix, year }),
        prop::collection::vec(1900i64..2030, 0..5).prop_map(Leaf::YearIn),
        (
            prop::sample::select(vec!["", "_NOT", "_CONTAINS", "_STARTS_WITH", "_NOT_ENDS_WITH"]),
            "[a-z]{1,8}"
        )
            .prop_map(|(suffix, text)| Leaf::Title { suffix, text }),
        (arb_ordering(), 0.0f64..10.0).prop_map(|(suffix, rating)| Leaf::Rating { suffix, rating }),
    ]
}

fn arb_filter() -> impl Strategy<Value = (bool, Vec<Leaf>)> {
    (any::<bool>(), prop::collection::vec(arb_leaf(), 0..8))
}

fn build_filter(disjunctive: bool, leaves: &[Leaf]) -> Json {
    let key = if disjunctive { "OR" } else { "AND" };
    let items: Vec<Json> = leaves.iter().map(Leaf::to_filter).collect();
    json!({ key: items })
}

fn has_nested_same_combinator(predicate: &Predicate) -> bool {
    match predicate {
        Predicate::And(terms) => terms
            .iter()
            .any(|t| matches!(t, Predicate::And(_)) || has_nested_same_combinator(t)),
        Predicate::Or(terms) => terms
            .iter()
            .any(|t| matches!(t, Predicate::Or(_)) || has_nested_same_combinator(t)),
        Predicate::Not(inner) => has_nested_same_combinator(inner),
        _ => false,
    }
}

fn nested_and(levels: usize) -> Json {
    let mut input = json!({"title": "x"});
    for _ in 0..levels {
        input = json!({"AND": [input]});
    }
    input
}

proptest! {
    #[test]
    fn prop_compilation_is_deterministic((disjunctive, leaves) in arb_filter()) {
        let input = build_filter(disjunctive, &leaves);
        let first = compile("Movie", input.clone()).unwrap();
        let second = compile("Movie", input).unwrap();
        prop_assert_eq!(first.predicate, second.predicate);
        prop_assert_eq!(first.params, second.params);
    }

    #[test]
    fn prop_every_leaf_binds_one_parameter((disjunctive, leaves) in arb_filter()) {
        let compiled = compile("Movie", build_filter(disjunctive, &leaves)).unwrap();
        prop_assert_eq!(compiled.params.len(), leaves.len());
        prop_assert_eq!(compiled.predicate.is_none(), leaves.is_empty());
        for idx in 0..leaves.len() {
            let name = format!("param{idx}");
            prop_assert!(compiled.params.get(&name).is_some());
        }
    }

    #[test]
    fn prop_combinators_are_flat(
        outer in arb_filter(),
        inner in arb_filter(),
    ) {
        let input = json!({
            "AND": [build_filter(outer.0, &outer.1), build_filter(inner.0, &inner.1)]
        });
        let compiled = compile("Movie", input).unwrap();
        if let Some(predicate) = &compiled.predicate {
            prop_assert!(!has_nested_same_combinator(predicate), "{}", predicate);
        }
    }

    #[test]
    fn prop_keys_outside_the_grammar_are_rejected(
        key in "[a-z]{1,5}[-! /][a-z]{1,5}",
    ) {
        let err = compile("Movie", json!({ key.clone(): 1 })).err().unwrap();
        prop_assert_eq!(err.code(), "MalformedFilterKey");
        prop_assert_eq!(err.path(), key);
    }

    #[test]
    fn prop_year_ordering_matches_direct_comparison(
        years in prop::collection::vec(1900i64..2030, 1..20),
        bound in 1900i64..2030,
    ) {
        let records: Vec<Record> = years
            .iter()
            .enumerate()
            .map(|(idx, year)| movie(&format!("movie{idx}"), "releasedIn", *year))
            .collect();
        let compiled = compile("Movie", json!({"releasedIn_LT": bound})).unwrap();
        let predicate = compiled.predicate.as_ref().unwrap();
        for (record, year) in records.iter().zip(&years) {
            prop_assert_eq!(eval(predicate, &compiled.params, record), *year < bound);
        }
    }

    #[test]
    fn prop_depth_limit_is_exact(levels in 0usize..12, max_depth in 0usize..12) {
        let config = CompilerConfig {
            max_depth,
            ..CompilerConfig::default()
        };
        let result = compile_with(&movie_schema(), &config, "Movie", nested_and(levels));
        match result {
            Ok(compiled) => {
                prop_assert!(levels <= max_depth);
                prop_assert_eq!(compiled.rendered(), "this.title = $param0");
            }
            Err(err) => {
                prop_assert!(levels > max_depth);
                prop_assert_eq!(err.code(), "FilterTooDeep");
            }
        }
    }
}
