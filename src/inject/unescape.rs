//! HTML entity unescaping for rendered manifests.
//!
//! Data files authored by hand or exported from other tools often carry
//! entity-escaped text (`&quot;`, `&amp;`). Rendered manifests must contain
//! the literal characters, so the final render pass decodes the common named
//! entities and numeric references. Anything unrecognized is left as-is.

/// Decode `&name;`, `&#NN;` and `&#xHH;` references in `input`.
pub fn unescape_entities(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let candidate = &rest[start..];
        match decode_entity(candidate) {
            Some((decoded, consumed)) => {
                out.push_str(&decoded);
                rest = &candidate[consumed..];
            }
            None => {
                out.push('&');
                rest = &candidate[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Decode a single reference at the start of `s` (which begins with `&`).
/// Returns the decoded text and the byte length consumed, or None when the
/// text is not a recognized reference.
fn decode_entity(s: &str) -> Option<(String, usize)> {
    // Entities are short; cap the scan so a lone '&' in a large literal run
    // does not walk the rest of the input. Byte search keeps the cap safe
    // inside multibyte characters.
    let end = s.as_bytes()[..s.len().min(12)]
        .iter()
        .position(|&b| b == b';')?;
    let body = &s[1..end];
    let decoded = match body {
        "amp" => '&'.to_string(),
        "lt" => '<'.to_string(),
        "gt" => '>'.to_string(),
        "quot" => '"'.to_string(),
        "apos" => '\''.to_string(),
        _ => {
            let code = body.strip_prefix('#')?;
            let number = match code.strip_prefix('x').or_else(|| code.strip_prefix('X')) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => code.parse::<u32>().ok()?,
            };
            char::from_u32(number)?.to_string()
        }
    };
    Some((decoded, end + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_entities_decode() {
        assert_eq!(unescape_entities("&lt;b&gt;"), "<b>");
        assert_eq!(unescape_entities("a &amp; b"), "a & b");
        assert_eq!(unescape_entities("&quot;x&quot;"), "\"x\"");
        assert_eq!(unescape_entities("&apos;y&apos;"), "'y'");
    }

    #[test]
    fn numeric_references_decode() {
        assert_eq!(unescape_entities("&#34;x&#34;"), "\"x\"");
        assert_eq!(unescape_entities("&#x27;"), "'");
        assert_eq!(unescape_entities("&#X41;"), "A");
    }

    #[test]
    fn unknown_and_bare_ampersands_pass_through() {
        assert_eq!(unescape_entities("a & b"), "a & b");
        assert_eq!(unescape_entities("&unknown;"), "&unknown;");
        assert_eq!(unescape_entities("&ampnosemi"), "&ampnosemi");
    }

    #[test]
    fn invalid_codepoint_passes_through() {
        assert_eq!(unescape_entities("&#xD800;"), "&#xD800;");
    }

    #[test]
    fn text_without_entities_is_unchanged() {
        let yaml = "kind: Service\nmetadata:\n  name: api\n";
        assert_eq!(unescape_entities(yaml), yaml);
    }

    #[test]
    fn multibyte_text_after_ampersand_is_safe() {
        assert_eq!(unescape_entities("&ααααααα"), "&ααααααα");
        assert_eq!(unescape_entities("数&amp;据"), "数&据");
    }
}
