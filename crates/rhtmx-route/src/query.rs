// File: src/query.rs
// Purpose: Query string codec (`k=v&k2=v2`) used for params outside the pattern

use std::collections::{BTreeMap, HashMap};

/// Decodes `key=value&key2=value2` into a map
///
/// `+` decodes to a space, everything else is percent-decoded. A piece
/// without `=` maps to the empty string, empty pieces are skipped and on a
/// repeated key the first occurrence wins. Text that does not decode to
/// UTF-8 is kept as written.
///
/// # Examples
///
/// ```
/// use rhtmx_route::query;
///
/// let params = query::parse("q=hello%20world&tag=a+b&flag");
/// assert_eq!(params["q"], "hello world");
/// assert_eq!(params["tag"], "a b");
/// assert_eq!(params["flag"], "");
/// ```
pub fn parse(text: &str) -> HashMap<String, String> {
    let mut params = HashMap::new();

    for pair in text.split('&').filter(|pair| !pair.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        params.entry(decode(key)).or_insert_with(|| decode(value));
    }

    params
}

/// Encodes a map as `key=value&key2=value2` in key order
///
/// # Examples
///
/// ```
/// use rhtmx_route::query;
/// use std::collections::BTreeMap;
///
/// let mut params = BTreeMap::new();
/// params.insert("sort".to_string(), "asc".to_string());
/// params.insert("q".to_string(), "a&b c".to_string());
///
/// assert_eq!(query::stringify(&params), "q=a%26b%20c&sort=asc");
/// ```
pub fn stringify(params: &BTreeMap<String, String>) -> String {
    params
        .iter()
        .map(|(key, value)| format!("{}={}", urlencoding::encode(key), urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}

fn decode(text: &str) -> String {
    let text = text.replace('+', " ");
    match urlencoding::decode(&text) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => text,
    }
}
