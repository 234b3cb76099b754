//! Route module: a single compiled pattern
//!
//! A [`Route`] parses its template once, compiles a matcher and keeps the
//! tree for building. After construction nothing inside it changes, so a
//! route can be shared freely between threads.

pub mod builder;
pub mod matcher;
pub mod pattern;

use serde_json::Value;
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::config::{PostMatchFilter, PreBuildFilter};
use crate::{query, BuildParams, Condition, Data, Params, RouteConfig, RouteError};
use matcher::Matcher;
use pattern::{OptionalGroup, PatternNode};

/// Synthetic param capturing an optional single trailing slash
pub const TRAILING_SLASH_PARAM: &str = "__rhtmx_ts";

/// Synthetic param capturing the raw query string after `?`
pub const QUERY_STRING_PARAM: &str = "__rhtmx_qs";

/// Key of `data` holding the route name
pub const NAME_KEY: &str = "name";

const TRAILING_SLASH: char = '/';
const QUERY_STRING_SEPARATOR: &str = "?";

/// Whether `name` is one of the params injected by [`Route::new`]
pub fn is_synthetic_param(name: &str) -> bool {
    name == TRAILING_SLASH_PARAM || name == QUERY_STRING_PARAM
}

// ============================================================================
// Match Input
// ============================================================================

/// What a route is matched against: an optional path plus attributes
/// (e.g. the HTTP method) compared with the route's static data
///
/// # Examples
///
/// ```
/// use rhtmx_route::MatchRequest;
///
/// let request = MatchRequest::new("/users/1").with_attribute("method", "GET");
/// assert_eq!(request.path.as_deref(), Some("/users/1"));
///
/// // A bare path converts directly
/// let request: MatchRequest = "/users/1".into();
/// assert!(request.attributes.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchRequest {
    pub path: Option<String>,
    pub attributes: HashMap<String, Value>,
}

impl MatchRequest {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: Some(path.into()), attributes: HashMap::new() }
    }

    /// A request carrying attributes only; matches on data alone
    pub fn without_path() -> Self {
        Self::default()
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Reads a request from a JSON value
    ///
    /// A string is a bare path. An object's `path` (when it is a string) is
    /// the path and every other key is an attribute. Anything else, `null`
    /// included, is no request at all.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(path) => Some(Self::new(path.clone())),
            Value::Object(fields) => {
                let path = fields.get("path").and_then(Value::as_str).map(str::to_string);
                let attributes = fields
                    .iter()
                    .filter(|(key, _)| key.as_str() != "path")
                    .map(|(key, value)| (key.clone(), value.clone()))
                    .collect();
                Some(Self { path, attributes })
            }
            _ => None,
        }
    }
}

impl From<&str> for MatchRequest {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl From<String> for MatchRequest {
    fn from(path: String) -> Self {
        Self::new(path)
    }
}

impl From<&MatchRequest> for MatchRequest {
    fn from(request: &MatchRequest) -> Self {
        request.clone()
    }
}

// ============================================================================
// Route
// ============================================================================

/// A compiled route: matches paths into params and builds paths from params
///
/// # Examples
///
/// ```
/// use rhtmx_route::Route;
/// use serde_json::json;
/// use std::collections::BTreeMap;
///
/// let route = Route::new("/item/<id>").unwrap();
///
/// let params = route.matches("/item/5?sort=asc").unwrap();
/// assert_eq!(params["id"], "5");
/// assert_eq!(params["sort"], "asc");
///
/// let params = BTreeMap::from([
///     ("id".to_string(), json!(5)),
///     ("sort".to_string(), json!("asc")),
/// ]);
/// assert_eq!(route.build(&params), "/item/5?sort=asc");
/// ```
#[derive(Clone)]
pub struct Route {
    pattern: String,
    data: Data,
    defaults: HashMap<String, String>,
    tree: Vec<PatternNode>,
    matcher: Matcher,
    post_match: Option<PostMatchFilter>,
    pre_build: Option<PreBuildFilter>,
}

impl Route {
    /// Compiles a route from a pattern string or a [`RouteConfig`]
    ///
    /// Fails only when a condition makes the match expression invalid.
    pub fn new(config: impl Into<RouteConfig>) -> Result<Self, RouteError> {
        let RouteConfig {
            pattern,
            name,
            mut conditions,
            defaults,
            mut data,
            trailing_slash_optional,
            post_match,
            pre_build,
        } = config.into();

        if let Some(name) = name {
            data.insert(NAME_KEY.to_string(), Value::String(name));
        }

        let mut tree = pattern::parse(&pattern);
        inject_synthetic_params(&mut tree, &mut conditions, trailing_slash_optional);

        let matcher = matcher::compile(&pattern, &tree, &conditions).map_err(|err| {
            tracing::warn!(pattern = %pattern, error = %err, "route failed to compile");
            err
        })?;

        tracing::debug!(
            pattern = %pattern,
            regex = %matcher.regex().as_str(),
            captures = matcher.params_map().len(),
            "compiled route"
        );

        Ok(Self { pattern, data, defaults, tree, matcher, post_match, pre_build })
    }

    /// Compiles a route from loosely typed options
    ///
    /// A string is a pattern; an object is a [`RouteConfig`].
    ///
    /// # Examples
    ///
    /// ```
    /// use rhtmx_route::{Route, RouteError};
    /// use serde_json::json;
    ///
    /// let route = Route::from_value(json!({ "pattern": "/foo", "name": "foo" })).unwrap();
    /// assert_eq!(route.name(), Some("foo"));
    ///
    /// assert!(matches!(Route::from_value(json!(null)), Err(RouteError::MissingOptions)));
    /// assert!(matches!(Route::from_value(json!({ "name": "x" })), Err(RouteError::MissingPattern)));
    /// ```
    pub fn from_value(options: Value) -> Result<Self, RouteError> {
        match &options {
            Value::String(pattern) => return Self::new(pattern.as_str()),
            Value::Object(fields) if fields.get("pattern").is_some_and(Value::is_string) => {}
            Value::Object(_) => return Err(RouteError::MissingPattern),
            _ => return Err(RouteError::MissingOptions),
        }

        let config: RouteConfig = serde_json::from_value(options)?;
        Self::new(config)
    }

    // ========================================================================
    // Matching
    // ========================================================================

    /// Matches a path or a [`MatchRequest`], returning the params on success
    ///
    /// Every request attribute that also exists in the route data must be
    /// equal to it. Without a path the route matches on data alone and
    /// yields no params. Path params win over same-named query params, and
    /// missing params are filled from the defaults.
    ///
    /// # Examples
    ///
    /// ```
    /// use rhtmx_route::{MatchRequest, Route, RouteConfig};
    ///
    /// let route = Route::new(RouteConfig::new("/x").with_data("method", "GET")).unwrap();
    ///
    /// assert!(route.matches("/x").is_some());
    /// assert!(route.matches("/x/").is_some());
    /// assert!(route.matches("/x//").is_none());
    /// assert!(route.matches(MatchRequest::new("/x").with_attribute("method", "POST")).is_none());
    /// ```
    pub fn matches(&self, request: impl Into<MatchRequest>) -> Option<Params> {
        let request = request.into();

        for (key, value) in &request.attributes {
            if self.data.get(key).is_some_and(|expected| expected != value) {
                tracing::trace!(pattern = %self.pattern, attribute = %key, "route data mismatch");
                return None;
            }
        }

        let params = match request.path.as_deref() {
            Some(path) => self.match_path(path)?,
            None => Params::new(),
        };

        self.apply_post_match(params)
    }

    /// Matches a loosely typed request; see [`MatchRequest::from_value`]
    ///
    /// `null` means there is no request and never matches.
    pub fn match_value(&self, request: &Value) -> Option<Params> {
        MatchRequest::from_value(request).and_then(|request| self.matches(request))
    }

    fn match_path(&self, path: &str) -> Option<Params> {
        let Some(captures) = self.matcher.captures(path) else {
            tracing::trace!(pattern = %self.pattern, path, "path does not match");
            return None;
        };

        let mut params = Params::new();
        let mut raw_query = None;

        for (name, value) in captures {
            match name {
                TRAILING_SLASH_PARAM => {
                    if has_doubled_trailing_slash(path) {
                        tracing::trace!(pattern = %self.pattern, path, "doubled trailing slash");
                        return None;
                    }
                }
                QUERY_STRING_PARAM => raw_query = Some(value),
                _ => {
                    params.insert(name.to_string(), value.to_string());
                }
            }
        }

        if let Some(raw_query) = raw_query {
            for (key, value) in query::parse(raw_query) {
                params.entry(key).or_insert(value);
            }
            params.remove(QUERY_STRING_PARAM);
        }

        for (key, value) in &self.defaults {
            params.entry(key.clone()).or_insert_with(|| value.clone());
        }

        Some(params)
    }

    fn apply_post_match(&self, params: Params) -> Option<Params> {
        match &self.post_match {
            Some(filter) => {
                let filtered = filter(params);
                if filtered.is_none() {
                    tracing::trace!(pattern = %self.pattern, "match vetoed by filter");
                }
                filtered
            }
            None => Some(params),
        }
    }

    // ========================================================================
    // Building
    // ========================================================================

    /// Builds a path from params
    ///
    /// `null` values are ignored. Params the pattern names fill their
    /// placeholders; all others are appended as a query string. Optional
    /// segments whose params are missing or equal to their defaults are
    /// left out.
    ///
    /// # Examples
    ///
    /// ```
    /// use rhtmx_route::{Route, RouteConfig};
    ///
    /// let route = Route::new(RouteConfig::new("/page(/<n>)").with_default("n", "1")).unwrap();
    ///
    /// assert_eq!(route.build_params(&[("n", "1")]), "/page");
    /// assert_eq!(route.build_params(&[("n", "2")]), "/page/2");
    /// assert_eq!(route.build_params(&[("n", "2"), ("q", "x y")]), "/page/2?q=x%20y");
    /// ```
    pub fn build(&self, params: &BuildParams) -> String {
        let params = match &self.pre_build {
            Some(filter) => Cow::Owned(filter(params.clone())),
            None => Cow::Borrowed(params),
        };

        let mut positional = HashMap::new();
        let mut extra = BTreeMap::new();

        for (key, value) in params.iter() {
            let Some(text) = value_to_text(value) else {
                continue;
            };
            if self.matcher.has_param(key) {
                positional.insert(key.clone(), text);
            } else {
                extra.insert(key.clone(), text);
            }
        }

        let query_string = query::stringify(&extra);
        if !query_string.is_empty() {
            positional.insert(QUERY_STRING_PARAM.to_string(), query_string);
        }

        builder::build(&self.tree, &positional, &self.defaults)
    }

    /// Convenience over [`build`](Self::build) for string-only params
    pub fn build_params(&self, params: &[(&str, &str)]) -> String {
        let params: BuildParams = params
            .iter()
            .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
            .collect();

        self.build(&params)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Static data bound to the route (includes `name` when one was given)
    pub fn data(&self) -> &Data {
        &self.data
    }

    /// Route name, read from `data["name"]`
    pub fn name(&self) -> Option<&str> {
        self.data.get(NAME_KEY).and_then(Value::as_str)
    }

    /// Pattern as written, without the synthetic trailing slash and query
    /// string segments
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Source of the compiled match expression
    pub fn regex_source(&self) -> &str {
        self.matcher.regex().as_str()
    }

    /// Capture position → param name, synthetic params included
    pub fn params_map(&self) -> &[String] {
        self.matcher.params_map()
    }

    /// Names of the params written in the pattern, in order
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.params_map().iter().map(String::as_str).filter(|name| !is_synthetic_param(name))
    }

    pub fn tree(&self) -> &[PatternNode] {
        &self.tree
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("pattern", &self.pattern)
            .field("regex", &self.regex_source())
            .field("data", &self.data)
            .field("defaults", &self.defaults)
            .finish()
    }
}

/// Appends the trailing slash and query string groups and their conditions
fn inject_synthetic_params(
    tree: &mut Vec<PatternNode>,
    conditions: &mut HashMap<String, Condition>,
    trailing_slash_optional: bool,
) {
    if trailing_slash_optional {
        tree.push(
            OptionalGroup::new(vec![PatternNode::Parameter(TRAILING_SLASH_PARAM.to_string())]).into(),
        );
        conditions.insert(
            TRAILING_SLASH_PARAM.to_string(),
            Condition::Pattern(regex::escape(&TRAILING_SLASH.to_string())),
        );
    }

    tree.push(
        OptionalGroup::new(vec![
            PatternNode::Literal(QUERY_STRING_SEPARATOR.to_string()),
            PatternNode::Parameter(QUERY_STRING_PARAM.to_string()),
        ])
        .into(),
    );
    conditions.insert(QUERY_STRING_PARAM.to_string(), Condition::Pattern(".*".to_string()));
}

/// True when the character before the last one is also a slash
fn has_doubled_trailing_slash(path: &str) -> bool {
    path.len() >= 2 && path.as_bytes()[path.len() - 2] == TRAILING_SLASH as u8
}

fn value_to_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}
