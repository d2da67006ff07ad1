//! XML formatting

use quick_xml::events::Event;
use quick_xml::{Reader, Writer};

use crate::errors::CurlError;

/// Spaces per nesting level
pub const XML_INDENT: usize = 4;

/// Re-indent an XML document.
///
/// Whitespace-only text between elements is dropped, self-closing tags stay
/// self-closing. The result ends with a newline.
pub fn format_xml(body: &[u8]) -> Result<String, CurlError> {
    let xml = String::from_utf8_lossy(body);
    let mut reader = Reader::from_str(&xml);
    reader.config_mut().trim_text(true);
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', XML_INDENT);

    loop {
        match reader.read_event() {
            Ok(Event::Eof) => break,
            Ok(event) => writer
                .write_event(event)
                .map_err(|e| CurlError::Decode(format!("write xml error: {}", e)))?,
            Err(e) => {
                return Err(CurlError::Decode(format!(
                    "invalid xml at position {}: {}",
                    reader.error_position(),
                    e
                )))
            }
        }
    }

    let mut out = writer.into_inner();
    out.push(b'\n');
    String::from_utf8(out).map_err(|e| CurlError::Decode(format!("UTF-8 error: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_elements() {
        let out = format_xml(b"<a><b>text</b><c/></a>").unwrap();
        assert_eq!(out, "<a>\n    <b>text</b>\n    <c/>\n</a>\n");
    }

    #[test]
    fn test_declaration_and_whitespace() {
        let out = format_xml(b"<?xml version=\"1.0\"?>\n  <r>\n\n<i k=\"v\">1</i>  </r>").unwrap();
        assert_eq!(out, "<?xml version=\"1.0\"?>\n<r>\n    <i k=\"v\">1</i>\n</r>\n");
    }

    #[test]
    fn test_mismatched_tags() {
        assert!(matches!(format_xml(b"<a></b>"), Err(CurlError::Decode(_))));
    }
}
