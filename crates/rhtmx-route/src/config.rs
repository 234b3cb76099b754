// File: src/config.rs
// Purpose: Route options (pattern, conditions, defaults, data, filters)

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::{BuildParams, Data, Params};

/// Called with the params of a successful match. Returning `None` vetoes
/// the match; returning `Some` replaces the result.
pub type PostMatchFilter = Arc<dyn Fn(Params) -> Option<Params> + Send + Sync>;

/// Called with the caller's params before `build` partitions them.
pub type PreBuildFilter = Arc<dyn Fn(BuildParams) -> BuildParams + Send + Sync>;

/// Per-parameter override of the default value charset
///
/// Deserializes from either a string or a list of strings:
///
/// ```
/// use rhtmx_route::Condition;
///
/// let c: Condition = serde_json::from_str(r#""\\d+""#).unwrap();
/// assert_eq!(c, Condition::Pattern(r"\d+".to_string()));
///
/// let c: Condition = serde_json::from_str(r#"["en", "ru"]"#).unwrap();
/// assert_eq!(c, Condition::OneOf(vec!["en".to_string(), "ru".to_string()]));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Condition {
    /// Raw regex source used as-is inside the capture group
    Pattern(String),
    /// Literal allowed values, compiled as an alternation
    OneOf(Vec<String>),
}

impl Condition {
    /// Regex source placed inside the parameter's capture group
    pub fn to_regex_source(&self) -> String {
        match self {
            Condition::Pattern(source) => source.clone(),
            Condition::OneOf(values) => {
                let alternatives: Vec<String> = values.iter().map(|v| regex::escape(v)).collect();
                format!("(?:{})", alternatives.join("|"))
            }
        }
    }
}

impl From<&str> for Condition {
    fn from(source: &str) -> Self {
        Condition::Pattern(source.to_string())
    }
}

impl From<String> for Condition {
    fn from(source: String) -> Self {
        Condition::Pattern(source)
    }
}

impl From<Vec<String>> for Condition {
    fn from(values: Vec<String>) -> Self {
        Condition::OneOf(values)
    }
}

impl From<Vec<&str>> for Condition {
    fn from(values: Vec<&str>) -> Self {
        Condition::OneOf(values.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Condition {
    fn from(values: [&str; N]) -> Self {
        Condition::OneOf(values.iter().map(|v| v.to_string()).collect())
    }
}

/// Options a [`Route`](crate::Route) is compiled from
///
/// Deserializable from JSON or TOML. Filters are closures and can only be
/// attached through [`with_post_match`](Self::with_post_match) and
/// [`with_pre_build`](Self::with_pre_build).
///
/// # Examples
///
/// ```
/// use rhtmx_route::RouteConfig;
///
/// let config = RouteConfig::new("/posts(/page/<page>)")
///     .with_name("posts")
///     .with_condition("page", r"\d+")
///     .with_default("page", "1")
///     .with_data("method", "GET");
///
/// assert_eq!(config.pattern, "/posts(/page/<page>)");
/// assert_eq!(config.name.as_deref(), Some("posts"));
/// ```
#[derive(Clone, Deserialize)]
pub struct RouteConfig {
    /// Template such as `/users/<id>(/<tab>)`
    pub pattern: String,

    /// Route name, folded into `data["name"]`
    #[serde(default)]
    pub name: Option<String>,

    /// Parameter name → condition
    #[serde(default)]
    pub conditions: HashMap<String, Condition>,

    /// Parameter name → fallback value
    #[serde(default)]
    pub defaults: HashMap<String, String>,

    /// Opaque payload returned by `Route::data`, also used to gate matches
    #[serde(default)]
    pub data: Data,

    /// Whether a single trailing slash is accepted (default: true)
    #[serde(
        default = "default_true",
        alias = "trailingSlashOptional",
        alias = "isTrailingSlashOptional"
    )]
    pub trailing_slash_optional: bool,

    #[serde(skip)]
    pub post_match: Option<PostMatchFilter>,

    #[serde(skip)]
    pub pre_build: Option<PreBuildFilter>,
}

fn default_true() -> bool {
    true
}

impl RouteConfig {
    /// Creates options for `pattern` with everything else at its default
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            name: None,
            conditions: HashMap::new(),
            defaults: HashMap::new(),
            data: Data::new(),
            trailing_slash_optional: true,
            post_match: None,
            pre_build: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_condition(mut self, param: impl Into<String>, condition: impl Into<Condition>) -> Self {
        self.conditions.insert(param.into(), condition.into());
        self
    }

    pub fn with_default(mut self, param: impl Into<String>, value: impl Into<String>) -> Self {
        self.defaults.insert(param.into(), value.into());
        self
    }

    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    pub fn with_trailing_slash_optional(mut self, optional: bool) -> Self {
        self.trailing_slash_optional = optional;
        self
    }

    /// Attaches a filter run on every successful match
    ///
    /// # Examples
    ///
    /// ```
    /// use rhtmx_route::{Route, RouteConfig};
    ///
    /// let route = Route::new(
    ///     RouteConfig::new("/users/<id>")
    ///         .with_post_match(|params| (params["id"] != "0").then_some(params)),
    /// )
    /// .unwrap();
    ///
    /// assert!(route.matches("/users/0").is_none());
    /// assert!(route.matches("/users/7").is_some());
    /// ```
    pub fn with_post_match<F>(mut self, filter: F) -> Self
    where
        F: Fn(Params) -> Option<Params> + Send + Sync + 'static,
    {
        self.post_match = Some(Arc::new(filter));
        self
    }

    /// Attaches a filter run on the params of every `build` call
    pub fn with_pre_build<F>(mut self, filter: F) -> Self
    where
        F: Fn(BuildParams) -> BuildParams + Send + Sync + 'static,
    {
        self.pre_build = Some(Arc::new(filter));
        self
    }
}

impl From<&str> for RouteConfig {
    fn from(pattern: &str) -> Self {
        RouteConfig::new(pattern)
    }
}

impl From<String> for RouteConfig {
    fn from(pattern: String) -> Self {
        RouteConfig::new(pattern)
    }
}

impl fmt::Debug for RouteConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteConfig")
            .field("pattern", &self.pattern)
            .field("name", &self.name)
            .field("conditions", &self.conditions)
            .field("defaults", &self.defaults)
            .field("data", &self.data)
            .field("trailing_slash_optional", &self.trailing_slash_optional)
            .field("post_match", &self.post_match.as_ref().map(|_| "<function>"))
            .field("pre_build", &self.pre_build.as_ref().map(|_| "<function>"))
            .finish()
    }
}
