//! Table name to ACPI signature conversion.

/// Convert a table name such as `"xsdt"` to its packed 32-bit signature.
///
/// At most four characters are used; shorter names are zero padded. ASCII
/// lowercase letters are upper-cased and every other character is kept as
/// its low byte. The four bytes are packed in native byte order, matching a
/// signature read straight out of table memory.
pub fn signature_from_name(name: &str) -> u32 {
    let mut bytes = [0u8; 4];

    for (slot, unit) in bytes
        .iter_mut()
        .zip(name.encode_utf16().take_while(|&unit| unit != 0))
    {
        // Non-ASCII units keep only their low byte.
        *slot = if (u16::from(b'a')..=u16::from(b'z')).contains(&unit) {
            (unit as u8).to_ascii_uppercase()
        } else {
            unit as u8
        };
    }

    u32::from_ne_bytes(bytes)
}

/// Render a packed signature back to text, replacing unprintable bytes.
pub fn signature_to_string(signature: u32) -> String {
    signature
        .to_ne_bytes()
        .iter()
        .take_while(|&&b| b != 0)
        .map(|&b| if b.is_ascii_graphic() { b as char } else { '?' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_case_is_normalised() {
        assert_eq!(signature_from_name("xsdt"), signature_from_name("XSDT"));
        assert_eq!(signature_from_name("ApIc"), u32::from_ne_bytes(*b"APIC"));
    }

    #[test]
    fn test_short_names_are_zero_padded() {
        assert_eq!(signature_from_name("ab"), u32::from_ne_bytes([b'A', b'B', 0, 0]));
        assert_ne!(signature_from_name("ab"), signature_from_name("abcd"));
        assert_ne!(signature_from_name("ab"), signature_from_name("ab  "));
        assert_eq!(signature_from_name(""), 0);
    }

    #[test]
    fn test_only_first_four_characters_used() {
        assert_eq!(signature_from_name("facpx"), signature_from_name("FACP"));
    }

    #[test]
    fn test_non_letters_unchanged() {
        assert_eq!(signature_from_name("ss_1"), u32::from_ne_bytes(*b"SS_1"));
        // Only a-z is folded; bytes above ASCII keep their value.
        assert_eq!(
            signature_from_name("\u{e9}"),
            u32::from_ne_bytes([0xE9, 0, 0, 0])
        );
    }

    #[test]
    fn test_embedded_nul_terminates() {
        assert_eq!(signature_from_name("ab\0d"), signature_from_name("ab"));
    }

    #[test]
    fn test_signature_to_string() {
        assert_eq!(signature_to_string(signature_from_name("dbg2")), "DBG2");
        assert_eq!(signature_to_string(signature_from_name("io")), "IO");
    }

    proptest! {
        #[test]
        fn prop_case_insensitive(name in "[a-zA-Z0-9]{0,4}") {
            prop_assert_eq!(
                signature_from_name(&name.to_lowercase()),
                signature_from_name(&name.to_uppercase())
            );
        }
    }
}
