//! Decoding of SIE files into text.
//!
//! SIE 4 files are declared `#FORMAT PC8`, i.e. IBM code page 437, but many
//! producers write UTF-8 nowadays. [`decode`] accepts both.

use oem_cp::code_table::DECODING_TABLE_CP437;
use oem_cp::decode_string_complete_table;
use std::borrow::Cow;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Decodes the bytes of a SIE file. Input with a UTF-8 byte order mark, or
/// input that is valid UTF-8, is taken as UTF-8; anything else as PC8.
pub fn decode(bytes: &[u8]) -> Cow<'_, str> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => Cow::Owned(decode_pc8(bytes)),
    }
}

/// Decodes code page 437.
pub fn decode_pc8(bytes: &[u8]) -> String {
    decode_string_complete_table(bytes, &DECODING_TABLE_CP437)
}
