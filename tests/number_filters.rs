//! Ordering filters on Int, Float and BigInt fields, evaluated against
//! in-memory records.

mod common;

use common::{compile, matching_titles, movie, Record};
use serde_json::json;
use sombra_where::cypher::Value;

fn sorted(mut titles: Vec<String>) -> Vec<String> {
    titles.sort();
    titles
}

fn int_movies(values: &[(&str, i64)]) -> Vec<Record> {
    values
        .iter()
        .map(|(title, year)| movie(title, "releasedIn", *year))
        .collect()
}

fn float_movies(values: &[(&str, f64)]) -> Vec<Record> {
    values
        .iter()
        .map(|(title, rating)| movie(title, "averageRating", *rating))
        .collect()
}

#[test]
fn int_lt_matches_only_smaller_values() {
    let movies = int_movies(&[("movie1", 2000), ("movie2", 1999)]);
    assert_eq!(
        matching_titles(json!({"releasedIn_LT": 2000}), &movies),
        vec!["movie2"]
    );
}

#[test]
fn int_lte_includes_the_bound() {
    let movies = int_movies(&[("movie1", 2000), ("movie2", 1999), ("movie3", 2999)]);
    assert_eq!(
        sorted(matching_titles(json!({"releasedIn_LTE": 2000}), &movies)),
        vec!["movie1", "movie2"]
    );
}

#[test]
fn int_gt_and_gte() {
    let movies = int_movies(&[("movie1", 2020), ("movie2", 2000)]);
    assert_eq!(
        matching_titles(json!({"releasedIn_GT": 2000}), &movies),
        vec!["movie1"]
    );

    let movies = int_movies(&[("movie1", 1920), ("movie2", 2000), ("movie3", 2030)]);
    assert_eq!(
        sorted(matching_titles(json!({"releasedIn_GTE": 2000}), &movies)),
        vec!["movie2", "movie3"]
    );
}

#[test]
fn float_filters_accept_integer_literals() {
    let movies = float_movies(&[("movie1", 8.0), ("movie2", 5.0)]);
    assert_eq!(
        matching_titles(json!({"averageRating_LT": 8}), &movies),
        vec!["movie2"]
    );

    let movies = float_movies(&[("movie1", 6.7), ("movie2", 7.0), ("movie3", 7.1)]);
    assert_eq!(
        sorted(matching_titles(json!({"averageRating_LTE": 7}), &movies)),
        vec!["movie1", "movie2"]
    );
}

#[test]
fn float_gt_and_gte() {
    let movies = float_movies(&[("movie1", 8.0), ("movie2", 7.9)]);
    assert_eq!(
        matching_titles(json!({"averageRating_GT": 7.9}), &movies),
        vec!["movie1"]
    );

    let movies = float_movies(&[("movie1", 4.1), ("movie2", 5.3), ("movie3", 6.2)]);
    assert_eq!(
        sorted(matching_titles(json!({"averageRating_GTE": 5}), &movies)),
        vec!["movie2", "movie3"]
    );

    let movies = float_movies(&[("movie1", 4.1), ("movie2", 5.0), ("movie3", 6.2)]);
    assert_eq!(
        sorted(matching_titles(json!({"averageRating_GTE": 4.2}), &movies)),
        vec!["movie2", "movie3"]
    );
}

const BIG_S: i64 = 9_223_372_036_854_775_608;
const BIG_M: i64 = 9_223_372_036_854_775_708;
const BIG_L: i64 = 9_223_372_036_854_775_807;

fn big_movies(values: &[(&str, i64)]) -> Vec<Record> {
    values
        .iter()
        .map(|(title, size)| movie(title, "fileSize", *size))
        .collect()
}

#[test]
fn bigint_ordering_is_exact() {
    let movies = big_movies(&[("movie1", BIG_M), ("movie2", BIG_S)]);
    assert_eq!(
        matching_titles(json!({"fileSize_LT": "9223372036854775708"}), &movies),
        vec!["movie2"]
    );

    let movies = big_movies(&[("movie1", BIG_S), ("movie2", BIG_M), ("movie3", BIG_L)]);
    assert_eq!(
        sorted(matching_titles(json!({"fileSize_LTE": "9223372036854775708"}), &movies)),
        vec!["movie1", "movie2"]
    );
    assert_eq!(
        sorted(matching_titles(json!({"fileSize_GTE": "9223372036854775708"}), &movies)),
        vec!["movie2", "movie3"]
    );
}

#[test]
fn bigint_numbers_bind_as_integers() {
    let movies = big_movies(&[("movie1", BIG_L), ("movie2", BIG_M)]);
    assert_eq!(
        matching_titles(json!({"fileSize_GT": BIG_M}), &movies),
        vec!["movie1"]
    );
    let compiled = compile("Movie", json!({"fileSize_GT": BIG_M})).unwrap();
    assert_eq!(compiled.param("param0"), &Value::Int(BIG_M));
}

#[test]
fn bigint_rejects_non_integers() {
    let err = compile("Movie", json!({"fileSize_LT": "big"})).err().unwrap();
    assert_eq!(err.code(), "InvalidValue");
    assert_eq!(err.path(), "fileSize_LT");
}

#[test]
fn combined_filters_are_conjunctive() {
    let movies = vec![
        common::record([
            ("title", Value::from("old")),
            ("releasedIn", Value::Int(1990)),
            ("averageRating", Value::Float(9.0)),
        ]),
        common::record([
            ("title", Value::from("new")),
            ("releasedIn", Value::Int(2010)),
            ("averageRating", Value::Float(9.0)),
        ]),
        common::record([
            ("title", Value::from("bad")),
            ("releasedIn", Value::Int(2010)),
            ("averageRating", Value::Float(3.0)),
        ]),
    ];
    assert_eq!(
        matching_titles(
            json!({"releasedIn_GT": 2000, "averageRating_GTE": 5}),
            &movies
        ),
        vec!["new"]
    );
}

#[test]
fn missing_properties_never_match_comparisons() {
    let movies = vec![movie("unrated", "releasedIn", 2000_i64)];
    assert!(matching_titles(json!({"averageRating_LT": 10}), &movies).is_empty());
    assert_eq!(
        matching_titles(json!({"averageRating": null}), &movies),
        vec!["unrated"]
    );
}
