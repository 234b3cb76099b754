//! # RHTMX Route
//!
//! Compiled URL patterns that work in both directions:
//! - **Match** a path into named params (`/users/42` → `{id: "42"}`)
//! - **Build** a path from named params (`{id: "42"}` → `/users/42`)
//!
//! ## Pattern Syntax
//!
//! | Construct | Syntax | Meaning |
//! |---|---|---|
//! | Literal | any text | Matched and emitted verbatim |
//! | Parameter | `<name>` | Named capture, `name` is `[A-Za-z_][A-Za-z0-9_-]*` |
//! | Optional segment | `( ... )` | Nestable, matched or emitted only when it applies |
//!
//! Parameter values default to `[A-Za-z0-9_.~-]+`; a per-param
//! [`Condition`] replaces that with a regex or a list of allowed values.
//!
//! Every route also accepts one trailing slash (unless disabled) and a
//! query string. Query params are merged into the match result, and params
//! the pattern does not name are written to the query string when
//! building.
//!
//! ## Example
//!
//! ```
//! use rhtmx_route::{Route, RouteConfig};
//!
//! let route = Route::new(
//!     RouteConfig::new("/<lang>/news(/page/<page>)")
//!         .with_name("news")
//!         .with_condition("lang", ["en", "ru"])
//!         .with_condition("page", r"\d+")
//!         .with_default("page", "1"),
//! )
//! .unwrap();
//!
//! let params = route.matches("/en/news/page/3?sort=date").unwrap();
//! assert_eq!(params["lang"], "en");
//! assert_eq!(params["page"], "3");
//! assert_eq!(params["sort"], "date");
//!
//! assert_eq!(route.build_params(&[("lang", "ru"), ("page", "1")]), "/ru/news");
//! assert_eq!(route.build_params(&[("lang", "ru"), ("page", "2")]), "/ru/news/page/2");
//! ```

use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

// ============================================================================
// Module Declarations
// ============================================================================

mod config;
mod error;
pub mod query;
pub mod route;
mod router;

pub use config::{Condition, PostMatchFilter, PreBuildFilter, RouteConfig};
pub use error::RouteError;
pub use route::pattern::{OptionalGroup, PatternNode};
pub use route::{MatchRequest, Route, QUERY_STRING_PARAM, TRAILING_SLASH_PARAM};
pub use router::{RouteMatch, Router};

// ============================================================================
// Core Types
// ============================================================================

/// Params produced by a successful match
pub type Params = HashMap<String, String>;

/// Params accepted by `build`; `null` values are ignored
pub type BuildParams = BTreeMap<String, Value>;

/// Static data bound to a route
pub type Data = HashMap<String, Value>;
