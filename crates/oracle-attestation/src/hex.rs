use crate::Error;

/// Strips a leading `0x` or `0X` from `value`, if any
pub fn remove_0x_if_present(value: &str) -> &str {
    match value.get(0..2) {
        Some(prefix) if prefix.eq_ignore_ascii_case("0x") => &value[2..],
        _ => value,
    }
}

/// Decodes a hex string, with or without `0x` prefix, into bytes
pub fn decode_hex(value: &str) -> Result<Vec<u8>, Error> {
    ::hex::decode(remove_0x_if_present(value)).map_err(|e| Error::MalformedMessage(format!("invalid hex: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_is_removed_case_insensitively() {
        assert_eq!(remove_0x_if_present("0xAB"), "AB");
        assert_eq!(remove_0x_if_present("0XAB"), "AB");
        assert_eq!(remove_0x_if_present("AB"), "AB");
    }

    #[test]
    fn short_values_are_left_untouched() {
        assert_eq!(remove_0x_if_present(""), "");
        assert_eq!(remove_0x_if_present("0"), "0");
        assert_eq!(remove_0x_if_present("0x"), "");
    }

    #[test]
    fn prefix_is_only_removed_once() {
        assert_eq!(remove_0x_if_present("0x0xAB"), "0xAB");
    }

    #[test]
    fn hex_is_decoded_with_or_without_prefix() {
        assert_eq!(decode_hex("0x0a0B").unwrap(), vec![0x0a, 0x0b]);
        assert_eq!(decode_hex("0a0b").unwrap(), vec![0x0a, 0x0b]);
    }

    #[test]
    fn invalid_hex_is_a_malformed_message() {
        assert!(matches!(decode_hex("0xzz"), Err(Error::MalformedMessage(_))));
        assert!(matches!(decode_hex("abc"), Err(Error::MalformedMessage(_))));
    }
}
