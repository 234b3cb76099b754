//! Errors raised while constructing routes
//!
//! Only construction can fail. Matching reports a miss as `None` and
//! building never fails, so nothing past `Route::new` returns this type.

/// Route construction error
#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    /// Options were neither a pattern string nor an options object
    #[error("route options must be a pattern string or an options object")]
    MissingOptions,

    /// Options object without a textual `pattern`
    #[error("route options must specify the pattern of the route as a string")]
    MissingPattern,

    /// Options object with fields of the wrong shape
    #[error("invalid route options: {0}")]
    InvalidConfig(#[from] serde_json::Error),

    /// The generated match expression was rejected by the regex engine,
    /// almost always because of a malformed condition
    #[error("route `{pattern}` compiles to an invalid expression `{regex}`: {source}")]
    InvalidRegex {
        pattern: String,
        regex: String,
        #[source]
        source: regex::Error,
    },

    /// A route table could not be read
    #[error("invalid route table: {0}")]
    InvalidToml(#[from] toml::de::Error),
}
