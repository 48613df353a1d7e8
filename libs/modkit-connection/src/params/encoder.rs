use super::{ParamValue, Params};
use serde::Deserialize;

/// Strategy for turning [`Params`] into a query string and back.
///
/// Implementations must be stateless: a single encoder is shared by every
/// request resolved on a connection.
pub trait ParamsEncoder: Send + Sync {
    /// Encode `params` into a query string (without the leading `?`)
    fn encode(&self, params: &Params) -> String;

    /// Decode a query string (without the leading `?`).
    ///
    /// Decoding is lenient: malformed percent escapes are kept verbatim.
    fn decode(&self, query: &str) -> Params;
}

/// Selects which [`ParamsEncoder`] a connection uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamsEncoding {
    /// Bracket notation: `a[b]=c`, `a[]=1&a[]=2`
    #[default]
    Nested,
    /// Repeated keys without brackets: `a=1&a=2`
    Flat,
}

impl ParamsEncoding {
    #[must_use]
    pub fn encoder(self) -> &'static dyn ParamsEncoder {
        match self {
            Self::Nested => &NestedParamsEncoder,
            Self::Flat => &FlatParamsEncoder,
        }
    }
}

/// Form-style escaping: unreserved characters stay as-is, space becomes `+`.
fn escape(s: &str) -> String {
    urlencoding::encode(s).replace("%20", "+")
}

fn unescape(s: &str) -> String {
    let spaced = s.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => spaced,
    }
}

fn split_pairs(query: &str) -> impl Iterator<Item = (String, Option<String>)> + '_ {
    query.split('&').filter(|s| !s.is_empty()).map(|pair| {
        let mut parts = pair.splitn(2, '=');
        let key = unescape(parts.next().unwrap_or_default());
        let value = parts.next().map(unescape);
        (key, value)
    })
}

/// Deepest bracket nesting decoded structurally (`a[b][c]` has depth 2).
pub const MAX_NESTING_DEPTH: usize = 100;

/// Bracket-notation encoder (the default).
#[derive(Debug, Clone, Copy, Default)]
pub struct NestedParamsEncoder;

impl NestedParamsEncoder {
    fn encode_value(out: &mut Vec<String>, key: &str, value: &ParamValue) {
        match value {
            ParamValue::Scalar(s) => out.push(format!("{}={}", escape(key), escape(s))),
            ParamValue::List(items) => {
                let child = format!("{key}[]");
                if items.is_empty() {
                    out.push(escape(&child));
                }
                for item in items {
                    Self::encode_value(out, &child, item);
                }
            }
            ParamValue::Map(map) => {
                if map.is_empty() {
                    out.push(escape(key));
                }
                for (sub, item) in map.iter() {
                    Self::encode_value(out, &format!("{key}[{sub}]"), item);
                }
            }
        }
    }

    /// Split `a[b][]` into `("a", ["b", ""])`.
    ///
    /// Keys that are not well-formed bracket paths are returned whole. Past
    /// [`MAX_NESTING_DEPTH`] segments the remainder of the key is kept as one
    /// literal subkey.
    fn split_key(key: &str) -> (&str, Vec<&str>) {
        let Some(open) = key.find('[') else {
            return (key, Vec::new());
        };
        if open == 0 {
            return (key, Vec::new());
        }

        let mut subkeys = Vec::new();
        let mut rest = &key[open..];
        while let Some(stripped) = rest.strip_prefix('[') {
            if subkeys.len() == MAX_NESTING_DEPTH {
                subkeys.push(rest);
                rest = "";
                break;
            }
            let Some(close) = stripped.find(']') else {
                return (key, Vec::new());
            };
            subkeys.push(&stripped[..close]);
            rest = &stripped[close + 1..];
        }
        if !rest.is_empty() {
            return (key, Vec::new());
        }
        (&key[..open], subkeys)
    }

    fn assign(slot: Option<ParamValue>, subkeys: &[&str], value: String) -> ParamValue {
        match subkeys.split_first() {
            None => ParamValue::Scalar(value),
            Some((&"", rest)) => {
                let mut items = match slot {
                    Some(ParamValue::List(items)) => items,
                    _ => Vec::new(),
                };
                match rest.first() {
                    None => items.push(ParamValue::Scalar(value)),
                    Some(next) => {
                        // a[][x]=1&a[][y]=2 builds one map until a key repeats
                        let reuse = matches!(
                            items.last(),
                            Some(ParamValue::Map(m)) if !m.contains_key(next)
                        );
                        let last = if reuse { items.pop() } else { None };
                        items.push(Self::assign(last, rest, value));
                    }
                }
                ParamValue::List(items)
            }
            Some((sub, rest)) => {
                let mut map = match slot {
                    Some(ParamValue::Map(map)) => map,
                    _ => Params::new(),
                };
                map.upsert_with(sub, |current| Self::assign(current, rest, value));
                ParamValue::Map(map)
            }
        }
    }
}

impl ParamsEncoder for NestedParamsEncoder {
    fn encode(&self, params: &Params) -> String {
        let mut out = Vec::with_capacity(params.len());
        for (key, value) in params.iter() {
            Self::encode_value(&mut out, key, value);
        }
        out.join("&")
    }

    fn decode(&self, query: &str) -> Params {
        let mut params = Params::new();
        for (key, value) in split_pairs(query) {
            let (base, subkeys) = Self::split_key(&key);
            match value {
                Some(value) => {
                    params.upsert_with(base, |slot| Self::assign(slot, &subkeys, value));
                }
                // bare `a[]` is an empty list, bare `a` an empty scalar
                None if subkeys == [""] => {
                    params.upsert_with(base, |slot| match slot {
                        Some(list @ ParamValue::List(_)) => list,
                        _ => ParamValue::List(Vec::new()),
                    });
                }
                None => {
                    params.upsert_with(base, |slot| Self::assign(slot, &subkeys, String::new()));
                }
            }
        }
        params
    }
}

/// Repeated-key encoder for targets that do not understand bracket notation.
///
/// Mappings have no flat representation; they are written as their string
/// form (`{k=v}`).
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatParamsEncoder;

impl ParamsEncoder for FlatParamsEncoder {
    fn encode(&self, params: &Params) -> String {
        let mut out = Vec::with_capacity(params.len());
        for (key, value) in params.iter() {
            let key = escape(key);
            match value {
                ParamValue::Scalar(s) => out.push(format!("{key}={}", escape(s))),
                ParamValue::List(items) if items.is_empty() => out.push(format!("{key}=")),
                ParamValue::List(items) => {
                    for item in items {
                        out.push(format!("{key}={}", escape(&item.to_string())));
                    }
                }
                ParamValue::Map(_) => out.push(format!("{key}={}", escape(&value.to_string()))),
            }
        }
        out.join("&")
    }

    fn decode(&self, query: &str) -> Params {
        let mut params = Params::new();
        for (key, value) in split_pairs(query) {
            let value = ParamValue::Scalar(value.unwrap_or_default());
            params.upsert_with(&key, |slot| match slot {
                None => value,
                Some(ParamValue::List(mut items)) => {
                    items.push(value);
                    ParamValue::List(items)
                }
                Some(previous) => ParamValue::List(vec![previous, value]),
            });
        }
        params
    }
}
