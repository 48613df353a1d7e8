//! `Authorization` header formatting

use base64::{Engine as _, engine::general_purpose};

/// `Basic <base64(user:password)>`
#[must_use]
pub fn basic_auth_header(user: &str, password: &str) -> String {
    let credentials = format!("{user}:{password}");
    format!("Basic {}", general_purpose::STANDARD.encode(credentials.as_bytes()))
}

/// `Token k1="v1", k2="v2", token="<token>"`
///
/// Options are rendered in the order given and the token parameter is
/// appended last. An option named `token` is ignored in favour of `token`.
#[must_use]
pub fn token_auth_header<K, V>(token: &str, options: &[(K, V)]) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let params = options
        .iter()
        .map(|(k, v)| (k.as_ref(), v.as_ref()))
        .filter(|(k, _)| *k != "token")
        .chain(std::iter::once(("token", token)));
    auth_params_header("Token", params)
}

/// `<scheme> k1="v1", k2="v2"` with values quoted and escaped
pub(crate) fn auth_params_header<'a>(
    scheme: &str,
    params: impl Iterator<Item = (&'a str, &'a str)>,
) -> String {
    let rendered: Vec<String> = params
        .map(|(k, v)| format!("{k}={}", quote(v)))
        .collect();
    format!("{scheme} {}", rendered.join(", "))
}

fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        if matches!(c, '"' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_basic_auth() {
        assert_eq!(
            basic_auth_header("Aladdin", "open sesame"),
            "Basic QWxhZGRpbjpvcGVuIHNlc2FtZQ=="
        );
    }

    #[test]
    fn test_token_auth_with_options() {
        assert_eq!(
            token_auth_header("abcdef", &[("nonce", "abc")]),
            r#"Token nonce="abc", token="abcdef""#
        );
    }

    #[test]
    fn test_token_auth_without_options() {
        let none: &[(&str, &str)] = &[];
        assert_eq!(token_auth_header("abcdef", none), r#"Token token="abcdef""#);
    }

    #[test]
    fn test_token_auth_escapes_and_dedupes() {
        assert_eq!(
            token_auth_header("t", &[("realm", r#"a"b\c"#), ("token", "ignored")]),
            r#"Token realm="a\"b\\c", token="t""#
        );
    }
}
