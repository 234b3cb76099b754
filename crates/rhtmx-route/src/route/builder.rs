/// Path building
///
/// Evaluates a parsed template against a parameter map to produce a path.
/// The same tree the matcher was compiled from is walked directly; nothing
/// is generated ahead of time.

use std::collections::HashMap;

use super::pattern::{OptionalGroup, PatternNode};

/// Renders `tree` with `params`, falling back to `defaults`
///
/// - Literals are emitted unconditionally.
/// - A parameter emits its value, else its default, else nothing.
/// - An optional group is emitted only when one of its dependent params
///   is supplied with a value other than that param's default.
///
/// # Examples
///
/// ```
/// use rhtmx_route::route::builder::build;
/// use rhtmx_route::route::pattern::parse;
/// use std::collections::HashMap;
///
/// let tree = parse("/page(/<n>)");
/// let defaults = HashMap::from([("n".to_string(), "1".to_string())]);
///
/// let params = HashMap::from([("n".to_string(), "1".to_string())]);
/// assert_eq!(build(&tree, &params, &defaults), "/page");
///
/// let params = HashMap::from([("n".to_string(), "2".to_string())]);
/// assert_eq!(build(&tree, &params, &defaults), "/page/2");
/// ```
pub fn build(
    tree: &[PatternNode],
    params: &HashMap<String, String>,
    defaults: &HashMap<String, String>,
) -> String {
    let mut out = String::new();
    write_nodes(&mut out, tree, params, defaults);
    out
}

fn write_nodes(
    out: &mut String,
    nodes: &[PatternNode],
    params: &HashMap<String, String>,
    defaults: &HashMap<String, String>,
) {
    for node in nodes {
        match node {
            PatternNode::Literal(text) => out.push_str(text),
            PatternNode::Parameter(name) => {
                if let Some(value) = params.get(name).or_else(|| defaults.get(name)) {
                    out.push_str(value);
                }
            }
            PatternNode::Optional(group) => {
                if is_group_emitted(group, params, defaults) {
                    write_nodes(out, &group.children, params, defaults);
                }
            }
        }
    }
}

fn is_group_emitted(
    group: &OptionalGroup,
    params: &HashMap<String, String>,
    defaults: &HashMap<String, String>,
) -> bool {
    group.dependent_params.iter().any(|name| match params.get(name) {
        Some(value) => defaults.get(name) != Some(value),
        None => false,
    })
}
