use tiny_http::Request;

/// Decodes a percent-encoded form value (`%XX`, `+` as space). Invalid
/// escapes are kept literally; the result is decoded as lossy UTF-8.
pub fn url_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' if i + 2 < bytes.len() => {
                match (hex(bytes[i + 1]), hex(bytes[i + 2])) {
                    (Some(h), Some(l)) => {
                        out.push((h << 4) | l);
                        i += 3;
                    }
                    _ => {
                        out.push(b'%');
                        i += 1;
                    }
                }
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex(b: u8) -> Option<u8> {
    (b as char).to_digit(16).map(|d| d as u8)
}

/// Parses `key=value&key2=value2` into a `Vec` of `(key, value)` pairs.
pub fn parse_form(body: &str) -> Vec<(String, String)> {
    body.split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
            (url_decode(k), url_decode(v))
        })
        .collect()
}

/// Looks up a key in parsed form pairs, returning the value if found.
pub fn form_get<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
}

/// Reads and parses an urlencoded request body.
pub fn read_form(request: &mut Request) -> Vec<(String, String)> {
    let mut body = String::new();
    let _ = request.as_reader().read_to_string(&mut body);
    parse_form(&body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_escapes_and_plus() {
        assert_eq!(url_decode("3%2C+2%2C+1"), "3, 2, 1");
        assert_eq!(url_decode("100%"), "100%");
        assert_eq!(url_decode("%zz"), "%zz");
    }

    #[test]
    fn parses_pairs() {
        let pairs = parse_form("layers=3%2C2&learning_rate=0.2&empty=");
        assert_eq!(form_get(&pairs, "layers"), Some("3,2"));
        assert_eq!(form_get(&pairs, "learning_rate"), Some("0.2"));
        assert_eq!(form_get(&pairs, "empty"), Some(""));
        assert_eq!(form_get(&pairs, "missing"), None);
    }
}
