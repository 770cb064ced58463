//! Entity decoding for the tokenizer and escaping for the serializer.

use memchr::{memchr, memchr3};

const NAMED: &[(&[u8], char)] = &[
    (b"&amp;", '&'),
    (b"&lt;", '<'),
    (b"&gt;", '>'),
    (b"&quot;", '"'),
    (b"&apos;", '\''),
    (b"&#39;", '\''),
    (b"&nbsp;", '\u{00A0}'),
];

const MAX_HEX_DIGITS: usize = 6; // 0x10FFFF
const MAX_DEC_DIGITS: usize = 7; // 1114111

/// Decode a narrow subset of HTML entities.
///
/// - Named: `&amp;`, `&lt;`, `&gt;`, `&quot;`, `&apos;`, `&nbsp;`.
/// - Numeric, only when semicolon-terminated and a valid scalar: `&#123;`, `&#x1F4A9;`.
/// - Anything else passes through unchanged.
pub(crate) fn decode_entities(s: &str) -> String {
    let bytes = s.as_bytes();
    let Some(first) = memchr(b'&', bytes) else {
        return s.to_string();
    };

    let mut out = String::with_capacity(s.len());
    out.push_str(&s[..first]);
    let mut i = first;

    while i < bytes.len() {
        let Some(rel) = memchr(b'&', &bytes[i..]) else {
            out.push_str(&s[i..]);
            break;
        };
        out.push_str(&s[i..i + rel]);
        i += rel;

        if let Some((pattern, ch)) = NAMED
            .iter()
            .find(|(pattern, _)| bytes[i..].starts_with(pattern))
        {
            out.push(*ch);
            i += pattern.len();
            continue;
        }

        if let Some((ch, consumed)) = decode_numeric(&bytes[i..]) {
            out.push(ch);
            i += consumed;
            continue;
        }

        out.push('&');
        i += 1;
    }

    out
}

/// Returns the decoded scalar and the byte length of the entity, including `&` and `;`.
fn decode_numeric(bytes: &[u8]) -> Option<(char, usize)> {
    if bytes.len() < 4 || bytes[1] != b'#' {
        return None;
    }
    let (radix, start, max_digits) = match bytes[2] {
        b'x' | b'X' => (16, 3, MAX_HEX_DIGITS),
        _ => (10, 2, MAX_DEC_DIGITS),
    };
    let mut end = start;
    while end < bytes.len() && end - start <= max_digits {
        let b = bytes[end];
        if b == b';' {
            break;
        }
        let ok = if radix == 16 {
            b.is_ascii_hexdigit()
        } else {
            b.is_ascii_digit()
        };
        if !ok {
            return None;
        }
        end += 1;
    }
    if end == start || end >= bytes.len() || bytes[end] != b';' {
        return None;
    }
    let digits = std::str::from_utf8(&bytes[start..end]).ok()?;
    let ch = u32::from_str_radix(digits, radix).ok().and_then(char::from_u32)?;
    Some((ch, end + 1))
}

pub(crate) fn escape_text(s: &str, out: &mut String) {
    let bytes = s.as_bytes();
    let mut copy_start = 0;
    let mut i = 0;
    while let Some(rel) = memchr3(b'&', b'<', b'>', &bytes[i..]) {
        let at = i + rel;
        out.push_str(&s[copy_start..at]);
        out.push_str(match bytes[at] {
            b'&' => "&amp;",
            b'<' => "&lt;",
            _ => "&gt;",
        });
        i = at + 1;
        copy_start = i;
    }
    out.push_str(&s[copy_start..]);
}

pub(crate) fn escape_attr(s: &str, out: &mut String) {
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\u{00A0}' => out.push_str("&nbsp;"),
            _ => out.push(ch),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_entities_preserves_utf8() {
        assert_eq!(decode_entities("120×32 café"), "120×32 café");
    }

    #[test]
    fn decode_entities_decodes_named_and_numeric() {
        assert_eq!(decode_entities("a &amp; b"), "a & b");
        assert_eq!(decode_entities("&lt;tag&gt;"), "<tag>");
        assert_eq!(decode_entities("&#65;&#x42;"), "AB");
    }

    #[test]
    fn decode_entities_leaves_malformed_sequences() {
        assert_eq!(decode_entities("&unknown; &#xZZ; &#12"), "&unknown; &#xZZ; &#12");
        assert_eq!(decode_entities("fish & chips"), "fish & chips");
        assert_eq!(decode_entities("&#99999999;"), "&#99999999;");
    }

    #[test]
    fn escape_text_round_trips_through_decode() {
        let mut out = String::new();
        escape_text("a < b && c > d", &mut out);
        assert_eq!(out, "a &lt; b &amp;&amp; c &gt; d");
        assert_eq!(decode_entities(&out), "a < b && c > d");
    }

    #[test]
    fn escape_attr_quotes() {
        let mut out = String::new();
        escape_attr(r#"say "hi" & go"#, &mut out);
        assert_eq!(out, "say &quot;hi&quot; &amp; go");
    }
}
