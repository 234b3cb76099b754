/// Pattern parsing for route templates
///
/// Turns a template such as `/users/<id>(/posts(/<page>))` into an ordered
/// tree of [`PatternNode`]s. Parsing is lenient and never fails: brackets
/// that do not form a parameter or a closed group stay in the tree as
/// literal text.

use once_cell::sync::Lazy;
use regex::Regex;

const GROUP_OPEN: char = '(';
const GROUP_CLOSE: char = ')';
const PARAM_OPEN: char = '<';
const PARAM_CLOSE: char = '>';

/// Tokens of a group-free piece of template, in priority order: a complete
/// `<name>`, a run without angle brackets, a stray bracket.
static TOKEN_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<[A-Za-z_][A-Za-z0-9_\-]*>|[^<>]+|<|>").unwrap());

/// One node of a parsed route template
///
/// # Examples
///
/// ```
/// use rhtmx_route::route::pattern::{parse, PatternNode};
///
/// let tree = parse("/users/<id>");
/// assert_eq!(
///     tree,
///     vec![
///         PatternNode::Literal("/users/".to_string()),
///         PatternNode::Parameter("id".to_string()),
///     ]
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternNode {
    /// Text matched and emitted verbatim
    Literal(String),
    /// Named capture, `<name>` in the template
    Parameter(String),
    /// `( ... )` in the template
    Optional(OptionalGroup),
}

/// A `( ... )` segment and the parameters that decide whether it is emitted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionalGroup {
    pub children: Vec<PatternNode>,
    /// Names of every parameter inside the group, nested groups included,
    /// in template order without duplicates
    pub dependent_params: Vec<String>,
}

impl OptionalGroup {
    pub fn new(children: Vec<PatternNode>) -> Self {
        let mut dependent_params = Vec::new();
        collect_params(&children, &mut dependent_params);
        Self { children, dependent_params }
    }
}

impl From<OptionalGroup> for PatternNode {
    fn from(group: OptionalGroup) -> Self {
        PatternNode::Optional(group)
    }
}

fn collect_params(nodes: &[PatternNode], out: &mut Vec<String>) {
    for node in nodes {
        match node {
            PatternNode::Parameter(name) => push_unique(out, name),
            PatternNode::Optional(group) => {
                group.dependent_params.iter().for_each(|name| push_unique(out, name))
            }
            PatternNode::Literal(_) => {}
        }
    }
}

fn push_unique(out: &mut Vec<String>, name: &str) {
    if !out.iter().any(|existing| existing == name) {
        out.push(name.to_string());
    }
}

/// Parses a route template into a tree of nodes (pure function)
///
/// Single left-to-right scan. Parentheses only delimit optional groups:
/// the body of a top-level group is collected verbatim (inner parentheses
/// included) and parsed recursively once its closing parenthesis is found.
/// A group left open at the end of the template keeps its `(` as literal
/// text; a `)` outside any group is literal text too.
///
/// # Examples
///
/// ```
/// use rhtmx_route::route::pattern::{parse, PatternNode};
///
/// let tree = parse("/a(/b(/<c>))");
/// assert_eq!(tree.len(), 2);
///
/// let PatternNode::Optional(outer) = &tree[1] else { panic!("expected a group") };
/// assert_eq!(outer.dependent_params, vec!["c"]);
///
/// // Malformed brackets degrade to literal text
/// assert_eq!(parse("/a<b"), vec![
///     PatternNode::Literal("/a".to_string()),
///     PatternNode::Literal("<".to_string()),
///     PatternNode::Literal("b".to_string()),
/// ]);
/// ```
pub fn parse(text: &str) -> Vec<PatternNode> {
    let mut nodes = Vec::new();
    let mut buffer = String::new();
    let mut in_group = false;
    let mut depth = 0usize;

    for ch in text.chars() {
        match ch {
            GROUP_OPEN if in_group => {
                depth += 1;
                buffer.push(ch);
            }
            GROUP_OPEN => {
                tokenize_into(&buffer, &mut nodes);
                buffer.clear();
                in_group = true;
                depth = 0;
            }
            GROUP_CLOSE if in_group && depth == 0 => {
                nodes.push(OptionalGroup::new(parse(&buffer)).into());
                buffer.clear();
                in_group = false;
            }
            GROUP_CLOSE if in_group => {
                depth -= 1;
                buffer.push(ch);
            }
            _ => buffer.push(ch),
        }
    }

    if in_group {
        buffer.insert(0, GROUP_OPEN);
    }
    tokenize_into(&buffer, &mut nodes);

    nodes
}

/// Splits a group-free piece of template into literal and parameter nodes
fn tokenize_into(text: &str, nodes: &mut Vec<PatternNode>) {
    for token in TOKEN_REGEX.find_iter(text).map(|m| m.as_str()) {
        let node = token
            .strip_prefix(PARAM_OPEN)
            .and_then(|rest| rest.strip_suffix(PARAM_CLOSE))
            .map(|name| PatternNode::Parameter(name.to_string()))
            .unwrap_or_else(|| PatternNode::Literal(token.to_string()));
        nodes.push(node);
    }
}
