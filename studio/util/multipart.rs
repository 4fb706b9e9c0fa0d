use tiny_http::Request;

/// One uploaded file from a multipart/form-data body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    /// MIME type the browser declared for the part, if any.
    pub content_type: Option<String>,
    pub data:         Vec<u8>,
}

/// Returns the index of the first occurrence of `needle` in `haystack`.
pub fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Splits `haystack` on every occurrence of `needle`, returning the pieces
/// between occurrences (excluding the needle itself).
pub fn split_on<'a>(haystack: &'a [u8], needle: &[u8]) -> Vec<&'a [u8]> {
    let mut result = Vec::new();
    let mut start = 0;
    while start <= haystack.len() {
        if let Some(pos) = find_subsequence(&haystack[start..], needle) {
            result.push(&haystack[start..start + pos]);
            start += pos + needle.len();
        } else {
            result.push(&haystack[start..]);
            break;
        }
    }
    result
}

/// Extracts the boundary token from a Content-Type header value like
/// `multipart/form-data; boundary=----WebKitFormBoundaryXXX`.
pub fn extract_boundary(content_type: &str) -> Option<String> {
    content_type
        .split(';')
        .map(|s| s.trim())
        .find_map(|s| s.strip_prefix("boundary="))
        .map(|s| s.trim_matches('"').to_owned())
}

/// Extracts the named file part, with its declared Content-Type.
pub fn extract_file_part(body: &[u8], boundary: &str, field_name: &str) -> Option<FilePart> {
    let delimiter = format!("--{}", boundary);
    let name_attr = format!("name=\"{}\"", field_name);

    for part in split_on(body, delimiter.as_bytes()) {
        let sep = b"\r\n\r\n";
        let Some(sep_pos) = find_subsequence(part, sep) else {
            continue;
        };
        let headers = String::from_utf8_lossy(&part[..sep_pos]);
        if !headers.contains(&name_attr) || !headers.contains("filename=") {
            continue;
        }
        let content_type = headers.lines().find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.trim()
                .eq_ignore_ascii_case("content-type")
                .then(|| value.trim().to_owned())
        });
        let raw = &part[sep_pos + sep.len()..];
        let data = raw.strip_suffix(b"\r\n").unwrap_or(raw).to_vec();
        return Some(FilePart { content_type, data });
    }
    None
}

/// Reads a multipart request and pulls out the named file part.
pub fn read_file_part(request: &mut Request, field_name: &str) -> Option<FilePart> {
    let content_type = request
        .headers()
        .iter()
        .find(|h| h.field.equiv("Content-Type"))
        .map(|h| h.value.as_str().to_owned())?;
    let boundary = extract_boundary(&content_type)?;

    let mut body = Vec::new();
    request.as_reader().read_to_end(&mut body).ok()?;
    extract_file_part(&body, &boundary, field_name)
}
