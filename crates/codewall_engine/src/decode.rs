use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedText {
    pub text: String,
    pub encoding_label: String,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("failed to decode bytes with {encoding}: {message}")]
    DecodeFailure { encoding: String, message: String },
}

/// Decode a plain-text body into UTF-8 using:
/// BOM -> Content-Type charset -> valid UTF-8 -> chardetng fallback.
pub fn decode_text(bytes: &[u8], content_type: Option<&str>) -> Result<DecodedText, DecodeError> {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        return decode_with(&bytes[bom_len..], encoding);
    }

    if let Some(label) = content_type.and_then(extract_charset) {
        if let Some(enc) = Encoding::for_label(label.as_bytes()) {
            return decode_with(bytes, enc);
        }
    }

    if std::str::from_utf8(bytes).is_ok() {
        return decode_with(bytes, UTF_8);
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let enc = detector.guess(None, true);
    decode_with(bytes, enc)
}

fn extract_charset(content_type: &str) -> Option<String> {
    content_type
        .split(';')
        .filter_map(|part| {
            let (key, value) = part.split_once('=')?;
            if key.trim().eq_ignore_ascii_case("charset") {
                Some(value.trim_matches([' ', '"', '\''].as_ref()).to_string())
            } else {
                None
            }
        })
        .next()
}

fn decode_with(bytes: &[u8], enc: &'static Encoding) -> Result<DecodedText, DecodeError> {
    let (text, had_errors) = enc.decode_without_bom_handling(bytes);
    if had_errors {
        return Err(DecodeError::DecodeFailure {
            encoding: enc.name().to_string(),
            message: "malformed byte sequence".into(),
        });
    }
    Ok(DecodedText {
        text: text.into_owned(),
        encoding_label: enc.name().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bom_wins_and_is_stripped() {
        let bytes = b"\xEF\xBB\xBFhello";
        let decoded = decode_text(bytes, Some("text/plain; charset=windows-1252")).unwrap();
        assert_eq!(decoded.text, "hello");
        assert_eq!(decoded.encoding_label, "UTF-8");
    }

    #[test]
    fn charset_parameter_is_honoured() {
        let bytes = b"caf\xE9";
        let decoded = decode_text(bytes, Some("text/plain; Charset=\"ISO-8859-1\"")).unwrap();
        assert_eq!(decoded.text, "café");
        assert_eq!(decoded.encoding_label, "windows-1252");
    }

    #[test]
    fn plain_utf8_without_charset() {
        let decoded = decode_text("naïve ∑".as_bytes(), Some("text/plain")).unwrap();
        assert_eq!(decoded.text, "naïve ∑");
        assert_eq!(decoded.encoding_label, "UTF-8");
    }

    #[test]
    fn malformed_utf8_with_declared_charset_fails() {
        let err = decode_text(b"abc\xC3\x28", Some("text/plain; charset=utf-8"));
        assert!(matches!(err, Err(DecodeError::DecodeFailure { .. })));
    }
}
