//! Integration tests for rhtmx-route
//!
//! Tests are organized by feature area:
//! - Construction and options
//! - Matching (anchoring, trailing slash, query strings, defaults)
//! - Static data gating
//! - Filters
//! - Building (optional segments, defaults, query strings)
//! - Round trips

use pretty_assertions::assert_eq;
use rhtmx_route::*;
use rstest::rstest;
use serde_json::{json, Value};
use std::collections::BTreeMap;

fn params(pairs: &[(&str, &str)]) -> Params {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

fn build_params(pairs: &[(&str, Value)]) -> BuildParams {
    pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn test_route_from_pattern_string() {
    let route = Route::new("/about").unwrap();
    assert_eq!(route.pattern(), "/about");
    assert_eq!(route.name(), None);
    assert!(route.data().is_empty());
}

#[test]
fn test_route_name_is_folded_into_data() {
    let route = Route::new(RouteConfig::new("/foo").with_name("foo").with_data("method", "GET")).unwrap();

    assert_eq!(route.name(), Some("foo"));
    assert_eq!(route.data()["name"], json!("foo"));
    assert_eq!(route.data()["method"], json!("GET"));
}

#[test]
fn test_name_and_data_are_stable_across_calls() {
    let route = Route::new(RouteConfig::new("/foo").with_name("foo")).unwrap();

    for _ in 0..3 {
        assert_eq!(route.name(), Some("foo"));
    }
    assert!(std::ptr::eq(route.data(), route.data()));
}

#[test]
fn test_name_from_data_only() {
    let route = Route::new(RouteConfig::new("/foo").with_data("name", "bar")).unwrap();
    assert_eq!(route.name(), Some("bar"));
}

#[rstest]
#[case(json!(null))]
#[case(json!(42))]
#[case(json!(true))]
#[case(json!(["/foo"]))]
fn test_from_value_rejects_non_options(#[case] options: Value) {
    assert!(matches!(Route::from_value(options), Err(RouteError::MissingOptions)));
}

#[rstest]
#[case(json!({}))]
#[case(json!({ "name": "foo" }))]
#[case(json!({ "pattern": 5 }))]
#[case(json!({ "pattern": null }))]
fn test_from_value_requires_textual_pattern(#[case] options: Value) {
    assert!(matches!(Route::from_value(options), Err(RouteError::MissingPattern)));
}

#[test]
fn test_from_value_rejects_malformed_fields() {
    let result = Route::from_value(json!({ "pattern": "/foo", "defaults": { "n": 1 } }));
    assert!(matches!(result, Err(RouteError::InvalidConfig(_))));
}

#[test]
fn test_from_value_accepts_string_and_object() {
    let route = Route::from_value(json!("/foo")).unwrap();
    assert!(route.matches("/foo").is_some());

    let route = Route::from_value(json!({
        "pattern": "/page(/<n>)",
        "name": "page",
        "conditions": { "n": "\\d+" },
        "defaults": { "n": "1" },
        "data": { "method": "GET" },
        "trailingSlashOptional": false
    }))
    .unwrap();

    assert_eq!(route.name(), Some("page"));
    assert_eq!(route.matches("/page/7"), Some(params(&[("n", "7")])));
    assert_eq!(route.matches("/page/x"), None);
    assert_eq!(route.matches("/page/"), None);
}

#[test]
fn test_invalid_condition_fails_construction() {
    let result = Route::new(RouteConfig::new("/<id>").with_condition("id", "(unclosed"));
    let err = result.unwrap_err();

    assert!(matches!(err, RouteError::InvalidRegex { .. }));
    assert!(err.to_string().contains("/<id>"));
}

#[test]
fn test_route_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Route>();
    assert_send_sync::<Router>();
}

#[test]
fn test_route_shared_across_threads() {
    let route = std::sync::Arc::new(Route::new("/users/<id>").unwrap());

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let route = route.clone();
            std::thread::spawn(move || route.matches(format!("/users/{}", i)).map(|p| p["id"].clone()))
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.join().unwrap(), Some(i.to_string()));
    }
}

// ============================================================================
// Matching
// ============================================================================

#[test]
fn test_match_static() {
    let route = Route::new("/about").unwrap();
    assert_eq!(route.matches("/about"), Some(Params::new()));
    assert_eq!(route.matches("/other"), None);
}

#[test]
fn test_match_dynamic() {
    let route = Route::new("/users/<id>/posts/<post_id>").unwrap();
    assert_eq!(
        route.matches("/users/7/posts/hello-world"),
        Some(params(&[("id", "7"), ("post_id", "hello-world")]))
    );
}

#[rstest]
#[case("/foo/bar")]
#[case("/fo")]
#[case("x/foo")]
#[case("/foox")]
#[case("")]
fn test_match_is_anchored(#[case] path: &str) {
    let route = Route::new("/foo").unwrap();
    assert_eq!(route.matches(path), None);
}

#[rstest]
#[case("abc")]
#[case("a-b")]
#[case("a.b")]
#[case("a~b")]
#[case("A_1")]
fn test_default_charset_accepts(#[case] value: &str) {
    let route = Route::new("/v/<value>").unwrap();
    assert_eq!(route.matches(format!("/v/{}", value)), Some(params(&[("value", value)])));
}

#[rstest]
#[case("a b")]
#[case("a%20b")]
#[case("a/b")]
#[case("a+b")]
fn test_default_charset_rejects(#[case] value: &str) {
    let route = Route::new("/v/<value>").unwrap();
    assert_eq!(route.matches(format!("/v/{}", value)), None);
}

#[test]
fn test_match_optional_segment() {
    let route = Route::new("/page(/<n>)").unwrap();
    assert_eq!(route.matches("/page"), Some(Params::new()));
    assert_eq!(route.matches("/page/2"), Some(params(&[("n", "2")])));
}

#[test]
fn test_match_nested_optional_segments() {
    let route = Route::new("/a(/b(/<c>))").unwrap();
    assert_eq!(route.matches("/a"), Some(Params::new()));
    assert_eq!(route.matches("/a/b"), Some(Params::new()));
    assert_eq!(route.matches("/a/b/x"), Some(params(&[("c", "x")])));
    assert_eq!(route.matches("/a/x"), None);
}

#[test]
fn test_match_static_optional_segment() {
    let route = Route::new("/foo(/bar)").unwrap();
    assert!(route.matches("/foo").is_some());
    assert!(route.matches("/foo/bar").is_some());
}

#[test]
fn test_match_fills_defaults() {
    let route = Route::new(
        RouteConfig::new("/page(/<n>)").with_default("n", "1").with_default("view", "list"),
    )
    .unwrap();

    assert_eq!(route.matches("/page"), Some(params(&[("n", "1"), ("view", "list")])));
    assert_eq!(route.matches("/page/4"), Some(params(&[("n", "4"), ("view", "list")])));
    assert_eq!(
        route.matches("/page?view=grid"),
        Some(params(&[("n", "1"), ("view", "grid")]))
    );
}

#[test]
fn test_match_with_pattern_condition() {
    let route = Route::new(RouteConfig::new("/user/<id>").with_condition("id", r"\d+")).unwrap();
    assert_eq!(route.matches("/user/42"), Some(params(&[("id", "42")])));
    assert_eq!(route.matches("/user/abc"), None);
}

#[test]
fn test_capturing_condition_does_not_shift_later_params() {
    let route = Route::new(RouteConfig::new("/<lang>/<id>").with_condition("lang", "(en|ru)")).unwrap();
    assert_eq!(route.matches("/en/42"), Some(params(&[("lang", "en"), ("id", "42")])));
    assert_eq!(route.matches("/de/42"), None);
}

#[test]
fn test_digit_condition_rejects_non_ascii_digits() {
    let route = Route::new(RouteConfig::new("/user/<id>").with_condition("id", r"\d+")).unwrap();
    assert_eq!(route.matches("/user/\u{661}\u{662}"), None);
}

#[test]
fn test_match_with_allowed_values() {
    let route = Route::new(RouteConfig::new("/<lang>/home").with_condition("lang", ["en", "ru"])).unwrap();
    assert_eq!(route.matches("/en/home"), Some(params(&[("lang", "en")])));
    assert_eq!(route.matches("/ru/home"), Some(params(&[("lang", "ru")])));
    assert_eq!(route.matches("/de/home"), None);
}

#[test]
fn test_allowed_values_are_literal() {
    let route = Route::new(RouteConfig::new("/f/<ext>").with_condition("ext", ["tar.gz"])).unwrap();
    assert!(route.matches("/f/tar.gz").is_some());
    assert!(route.matches("/f/tarxgz").is_none());
}

#[test]
fn test_literals_with_regex_metacharacters() {
    let route = Route::new("/files/<name>.json").unwrap();
    // `.` in the value charset makes the name greedy but the literal `.json` still anchors
    assert_eq!(route.matches("/files/data.json"), Some(params(&[("name", "data")])));
    assert_eq!(route.matches("/files/dataxjson"), None);

    let route = Route::new("/c++/[<id>]").unwrap();
    assert_eq!(route.matches("/c++/[5]"), Some(params(&[("id", "5")])));
}

#[test]
fn test_malformed_brackets_match_literally() {
    let route = Route::new("/a<b").unwrap();
    assert!(route.matches("/a<b").is_some());

    let route = Route::new("/x)y").unwrap();
    assert!(route.matches("/x)y").is_some());
}

// ============================================================================
// Trailing Slash
// ============================================================================

#[rstest]
#[case("/foo", true)]
#[case("/foo/", true)]
#[case("/foo//", false)]
#[case("/foo/?a=1", true)]
fn test_trailing_slash_optional_by_default(#[case] path: &str, #[case] expected: bool) {
    let route = Route::new("/foo").unwrap();
    assert_eq!(route.matches(path).is_some(), expected);
}

#[test]
fn test_trailing_slash_not_reported_as_param() {
    let route = Route::new("/foo").unwrap();
    assert_eq!(route.matches("/foo/"), Some(Params::new()));
}

#[test]
fn test_trailing_slash_can_be_disabled() {
    let route = Route::new(RouteConfig::new("/foo").with_trailing_slash_optional(false)).unwrap();
    assert!(route.matches("/foo").is_some());
    assert!(route.matches("/foo/").is_none());
}

#[test]
fn test_doubled_trailing_slash_rejected_when_condition_allows_it() {
    let route = Route::new(RouteConfig::new("/files/<path>").with_condition("path", "[a-z/]+?")).unwrap();

    assert_eq!(route.matches("/files/a/"), Some(params(&[("path", "a")])));
    assert_eq!(route.matches("/files/a//"), None);
}

// ============================================================================
// Query Strings
// ============================================================================

#[test]
fn test_query_params_are_merged() {
    let route = Route::new("/item/<id>").unwrap();
    assert_eq!(
        route.matches("/item/5?sort=asc"),
        Some(params(&[("id", "5"), ("sort", "asc")]))
    );
}

#[test]
fn test_query_params_are_decoded() {
    let route = Route::new("/search").unwrap();
    assert_eq!(
        route.matches("/search?q=hello%20world&tag=a+b"),
        Some(params(&[("q", "hello world"), ("tag", "a b")]))
    );
}

#[test]
fn test_path_params_win_over_query_params() {
    let route = Route::new("/item/<id>").unwrap();
    assert_eq!(route.matches("/item/5?id=9"), Some(params(&[("id", "5")])));
}

#[test]
fn test_empty_query_string() {
    let route = Route::new("/item/<id>").unwrap();
    assert_eq!(route.matches("/item/5?"), Some(params(&[("id", "5")])));
}

// ============================================================================
// Static Data Gating
// ============================================================================

#[test]
fn test_data_gates_match() {
    let route = Route::new(RouteConfig::new("/x").with_data("method", "GET")).unwrap();

    assert_eq!(route.matches(MatchRequest::new("/x").with_attribute("method", "POST")), None);
    assert_eq!(
        route.matches(MatchRequest::new("/x").with_attribute("method", "GET")),
        Some(Params::new())
    );
}

#[test]
fn test_attributes_missing_from_data_are_ignored() {
    let route = Route::new(RouteConfig::new("/x").with_data("method", "GET")).unwrap();
    let request = MatchRequest::new("/x").with_attribute("host", "example.com");
    assert!(route.matches(request).is_some());
}

#[test]
fn test_data_comparison_is_by_value() {
    let route = Route::new(RouteConfig::new("/x").with_data("version", 2)).unwrap();
    assert!(route.matches(MatchRequest::new("/x").with_attribute("version", 2)).is_some());
    assert!(route.matches(MatchRequest::new("/x").with_attribute("version", "2")).is_none());
}

#[test]
fn test_request_without_path_matches_on_data() {
    let route = Route::new(RouteConfig::new("/x(/<n>)").with_data("method", "GET").with_default("n", "1"))
        .unwrap();

    assert_eq!(
        route.matches(MatchRequest::without_path().with_attribute("method", "GET")),
        Some(Params::new())
    );
    assert_eq!(route.matches(MatchRequest::without_path().with_attribute("method", "PUT")), None);
}

#[test]
fn test_match_value() {
    let route = Route::new(RouteConfig::new("/x/<id>").with_data("method", "GET")).unwrap();

    // No request at all is a miss, even for a route without data
    assert_eq!(route.match_value(&json!(null)), None);
    assert_eq!(Route::new("/x").unwrap().match_value(&Value::Null), None);
    assert_eq!(route.match_value(&json!(17)), None);
    assert_eq!(route.match_value(&json!("/x/1")), Some(params(&[("id", "1")])));
    assert_eq!(
        route.match_value(&json!({ "path": "/x/1", "method": "GET" })),
        Some(params(&[("id", "1")]))
    );
    assert_eq!(route.match_value(&json!({ "path": "/x/1", "method": "POST" })), None);
    assert_eq!(route.match_value(&json!({ "method": "GET" })), Some(Params::new()));
}

// ============================================================================
// Filters
// ============================================================================

#[test]
fn test_post_match_filter_can_veto() {
    let route = Route::new(
        RouteConfig::new("/users/<id>").with_post_match(|p| if p["id"] == "0" { None } else { Some(p) }),
    )
    .unwrap();

    assert_eq!(route.matches("/users/0"), None);
    assert_eq!(route.matches("/users/1"), Some(params(&[("id", "1")])));
}

#[test]
fn test_post_match_filter_replaces_result() {
    let route = Route::new(RouteConfig::new("/users/<id>").with_post_match(|mut p| {
        p.insert("section".to_string(), "users".to_string());
        Some(p)
    }))
    .unwrap();

    assert_eq!(route.matches("/users/1"), Some(params(&[("id", "1"), ("section", "users")])));
}

#[test]
fn test_post_match_filter_runs_on_data_only_match() {
    let route = Route::new(RouteConfig::new("/x").with_post_match(|_| None)).unwrap();
    assert_eq!(route.matches(MatchRequest::without_path()), None);
}

#[test]
fn test_post_match_filter_not_called_on_miss() {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let route = Route::new(RouteConfig::new("/x").with_post_match(move |p| {
        counter.fetch_add(1, Ordering::SeqCst);
        Some(p)
    }))
    .unwrap();

    assert!(route.matches("/y").is_none());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(route.matches("/x").is_some());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_pre_build_filter_rewrites_params() {
    let route = Route::new(RouteConfig::new("/users/<id>").with_pre_build(|mut p| {
        if let Some(user) = p.remove("user") {
            p.insert("id".to_string(), user);
        }
        p
    }))
    .unwrap();

    assert_eq!(route.build(&build_params(&[("user", json!("alice"))])), "/users/alice");
}

// ============================================================================
// Building
// ============================================================================

#[test]
fn test_build_static() {
    let route = Route::new("/about").unwrap();
    assert_eq!(route.build(&BuildParams::new()), "/about");
}

#[test]
fn test_build_dynamic() {
    let route = Route::new("/users/<id>/posts/<post_id>").unwrap();
    assert_eq!(route.build_params(&[("id", "7"), ("post_id", "hello")]), "/users/7/posts/hello");
}

#[test]
fn test_build_missing_param_is_empty() {
    let route = Route::new("/users/<id>").unwrap();
    assert_eq!(route.build(&BuildParams::new()), "/users/");
}

#[test]
fn test_build_missing_param_uses_default() {
    let route = Route::new(RouteConfig::new("/users/<id>").with_default("id", "me")).unwrap();
    assert_eq!(route.build(&BuildParams::new()), "/users/me");
}

#[rstest]
#[case("1", "/page")]
#[case("2", "/page/2")]
fn test_build_suppresses_optional_segment_at_default(#[case] n: &str, #[case] expected: &str) {
    let route = Route::new(RouteConfig::new("/page(/<n>)").with_default("n", "1")).unwrap();
    assert_eq!(route.build_params(&[("n", n)]), expected);
}

#[test]
fn test_build_numeric_value_compared_with_default_as_text() {
    let route = Route::new(RouteConfig::new("/page(/<n>)").with_default("n", "1")).unwrap();
    assert_eq!(route.build(&build_params(&[("n", json!(1))])), "/page");
    assert_eq!(route.build(&build_params(&[("n", json!(3))])), "/page/3");
}

#[test]
fn test_build_nested_optional_segments() {
    let route = Route::new("/a(/b(/<c>))").unwrap();
    assert_eq!(route.build(&BuildParams::new()), "/a");
    assert_eq!(route.build_params(&[("c", "x")]), "/a/b/x");
}

#[test]
fn test_build_static_optional_segment_is_omitted() {
    let route = Route::new("/foo(/bar)").unwrap();
    assert_eq!(route.build(&BuildParams::new()), "/foo");
}

#[test]
fn test_build_extra_params_go_to_query_string() {
    let route = Route::new("/item/<id>").unwrap();
    let built = route.build(&build_params(&[("id", json!(5)), ("sort", json!("asc"))]));
    assert_eq!(built, "/item/5?sort=asc");
}

#[test]
fn test_build_query_string_is_encoded_and_ordered() {
    let route = Route::new("/search").unwrap();
    let built = route.build(&build_params(&[("q", json!("a b&c")), ("page", json!(2))]));
    assert_eq!(built, "/search?page=2&q=a%20b%26c");
}

#[test]
fn test_build_drops_null_values() {
    let route = Route::new("/page(/<n>)").unwrap();
    let built = route.build(&build_params(&[("n", Value::Null), ("q", Value::Null)]));
    assert_eq!(built, "/page");
}

#[test]
fn test_build_without_query_when_disabled_trailing_slash() {
    let route = Route::new(RouteConfig::new("/item/<id>").with_trailing_slash_optional(false)).unwrap();
    assert_eq!(route.build_params(&[("id", "1"), ("x", "y")]), "/item/1?x=y");
}

// ============================================================================
// Round Trips
// ============================================================================

#[rstest]
#[case("abc")]
#[case("a-b")]
#[case("a.b")]
#[case("a~b")]
#[case("Z_9")]
fn test_build_then_match_restores_value(#[case] value: &str) {
    let route = Route::new("/v/<name>").unwrap();
    let path = route.build_params(&[("name", value)]);
    let matched = route.matches(path).unwrap();
    assert_eq!(matched["name"], value);
}

#[test]
fn test_build_then_match_with_query_params() {
    let route = Route::new(RouteConfig::new("/list(/<page>)").with_default("page", "1")).unwrap();

    let mut input = BTreeMap::new();
    input.insert("page".to_string(), json!("3"));
    input.insert("filter".to_string(), json!("open issues"));

    let path = route.build(&input);
    assert_eq!(path, "/list/3?filter=open%20issues");
    assert_eq!(
        route.matches(path),
        Some(params(&[("page", "3"), ("filter", "open issues")]))
    );
}
