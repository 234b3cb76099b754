/// Match compilation
///
/// Walks a parsed template once and produces an anchored regular
/// expression plus the positional map from capture group to parameter name.

use regex::{Captures, Regex, RegexBuilder};
use std::collections::HashMap;

use super::pattern::PatternNode;
use super::is_synthetic_param;
use crate::{Condition, RouteError};

/// Value charset of a parameter without a condition
pub const DEFAULT_VALUE_SOURCE: &str = r"[A-Za-z0-9_.~\-]+";

/// Compiled matching half of a route
#[derive(Debug, Clone)]
pub struct Matcher {
    regex: Regex,
    /// Param names in document order
    params_map: Vec<String>,
    /// Capture group index of each entry in `params_map`
    groups: Vec<usize>,
}

impl Matcher {
    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    pub fn params_map(&self) -> &[String] {
        &self.params_map
    }

    pub fn has_param(&self, name: &str) -> bool {
        self.params_map.iter().any(|p| p == name)
    }

    /// Runs the expression against the whole `path`, returning each
    /// parameter that captured a non-empty value, in capture order
    pub fn captures<'p>(&self, path: &'p str) -> Option<Vec<(&str, &'p str)>> {
        let caps = self.regex.captures(path)?;
        Some(self.non_empty(&caps))
    }

    fn non_empty<'p>(&self, caps: &Captures<'p>) -> Vec<(&str, &'p str)> {
        self.params_map
            .iter()
            .zip(&self.groups)
            .filter_map(|(name, &group)| {
                caps.get(group)
                    .map(|m| m.as_str())
                    .filter(|value| !value.is_empty())
                    .map(|value| (name.as_str(), value))
            })
            .collect()
    }
}

/// Compiles a template tree into a [`Matcher`]
///
/// Literals are regex-escaped, parameters become capture groups holding
/// their condition (or [`DEFAULT_VALUE_SOURCE`]), optional groups become
/// `(?:...)?`. The whole expression is anchored at both ends.
///
/// Regex conditions are compiled with ASCII-only classes (`\d` is
/// `[0-9]`) unless they need Unicode mode, e.g. for `.` or a non-ASCII
/// literal. Capture groups inside a condition are allowed and do not
/// shift later parameters.
///
/// # Examples
///
/// ```
/// use rhtmx_route::route::matcher::compile;
/// use rhtmx_route::route::pattern::parse;
/// use std::collections::HashMap;
///
/// let matcher = compile("/page(/<n>)", &parse("/page(/<n>)"), &HashMap::new()).unwrap();
/// assert_eq!(matcher.regex().as_str(), r"^/page(?:/([A-Za-z0-9_.~\-]+))?$");
/// assert_eq!(matcher.params_map(), ["n"]);
/// ```
pub fn compile(
    pattern: &str,
    tree: &[PatternNode],
    conditions: &HashMap<String, Condition>,
) -> Result<Matcher, RouteError> {
    let mut compiler = MatchCompiler {
        pattern,
        conditions,
        source: String::from("^"),
        params_map: Vec::new(),
        groups: Vec::new(),
        next_group: 1,
    };
    compiler.write_nodes(tree)?;
    compiler.source.push('$');

    let MatchCompiler { source, params_map, groups, .. } = compiler;
    let regex = Regex::new(&source).map_err(|err| invalid_regex(pattern, &source, err))?;

    Ok(Matcher { regex, params_map, groups })
}

fn invalid_regex(pattern: &str, regex: &str, source: regex::Error) -> RouteError {
    RouteError::InvalidRegex { pattern: pattern.to_string(), regex: regex.to_string(), source }
}

struct MatchCompiler<'c> {
    pattern: &'c str,
    conditions: &'c HashMap<String, Condition>,
    source: String,
    params_map: Vec<String>,
    groups: Vec<usize>,
    next_group: usize,
}

impl MatchCompiler<'_> {
    fn write_nodes(&mut self, nodes: &[PatternNode]) -> Result<(), RouteError> {
        for node in nodes {
            match node {
                PatternNode::Literal(text) => self.source.push_str(&regex::escape(text)),
                PatternNode::Parameter(name) => {
                    let (value_source, inner_groups) = self.value_source(name)?;
                    self.params_map.push(name.clone());
                    self.groups.push(self.next_group);
                    self.next_group += 1 + inner_groups;
                    self.source.push('(');
                    self.source.push_str(&value_source);
                    self.source.push(')');
                }
                PatternNode::Optional(group) => {
                    self.source.push_str("(?:");
                    self.write_nodes(&group.children)?;
                    self.source.push_str(")?");
                }
            }
        }
        Ok(())
    }

    /// Source placed inside the param's capture group, and the number of
    /// capture groups that source opens itself
    fn value_source(&self, name: &str) -> Result<(String, usize), RouteError> {
        let source = match self.conditions.get(name) {
            None => return Ok((DEFAULT_VALUE_SOURCE.to_string(), 0)),
            Some(condition @ Condition::OneOf(_)) => return Ok((condition.to_regex_source(), 0)),
            Some(condition) => condition.to_regex_source(),
        };

        if !is_synthetic_param(name) {
            if let Ok(ascii) = RegexBuilder::new(&source).unicode(false).build() {
                return Ok((format!("(?-u:{source})"), ascii.captures_len() - 1));
            }
        }

        let standalone = Regex::new(&source).map_err(|err| invalid_regex(self.pattern, &source, err))?;
        Ok((source, standalone.captures_len() - 1))
    }
}
