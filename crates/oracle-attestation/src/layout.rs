//! Byte layout of the attestations published by open-oracle reporters.
//!
//! A message is the ABI encoding of `(string kind, uint64 timestamp, string key, uint64 value)`
//! and the signature is `r || s || v`, each component being a 32 bytes word. Only the bytes
//! listed in [`MESSAGE`] and [`SIGNATURE`] are ever read.

use starknet::core::types::U256;

use crate::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endianness {
    Little,
    Big,
}

/// A fixed-width unsigned integer located at a fixed offset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub offset: usize,
    pub length: usize,
    pub endianness: Endianness,
}

impl Field {
    pub const fn end(&self) -> usize {
        self.offset + self.length
    }

    /// Returns the raw bytes of the field, failing if `bytes` is too short to contain it
    pub fn slice<'a>(&self, bytes: &'a [u8]) -> Result<&'a [u8], Error> {
        bytes.get(self.offset..self.end()).ok_or_else(|| {
            Error::MalformedMessage(format!(
                "field {} requires {} bytes but only {} are available",
                self.name,
                self.end(),
                bytes.len()
            ))
        })
    }

    /// Reads an 8 bytes field
    pub fn read_u64(&self, bytes: &[u8]) -> Result<u64, Error> {
        let word: [u8; 8] = self
            .slice(bytes)?
            .try_into()
            .map_err(|_| Error::MalformedMessage(format!("field {} is not 8 bytes wide", self.name)))?;

        Ok(match self.endianness {
            Endianness::Little => u64::from_le_bytes(word),
            Endianness::Big => u64::from_be_bytes(word),
        })
    }

    /// Reads a 32 bytes field
    pub fn read_u256(&self, bytes: &[u8]) -> Result<U256, Error> {
        let word: [u8; 32] = self
            .slice(bytes)?
            .try_into()
            .map_err(|_| Error::MalformedMessage(format!("field {} is not 32 bytes wide", self.name)))?;

        let mut first = [0u8; 16];
        let mut second = [0u8; 16];
        first.copy_from_slice(&word[..16]);
        second.copy_from_slice(&word[16..]);

        Ok(match self.endianness {
            Endianness::Big => U256::from_words(u128::from_be_bytes(second), u128::from_be_bytes(first)),
            Endianness::Little => U256::from_words(u128::from_le_bytes(first), u128::from_le_bytes(second)),
        })
    }
}

/// An ordered set of fields read from the same buffer
#[derive(Debug, Clone, Copy)]
pub struct Layout {
    pub fields: &'static [Field],
}

impl Layout {
    /// Minimum number of bytes a buffer must hold for every field to be readable
    pub const fn required_length(&self) -> usize {
        let mut length = 0;
        let mut i = 0;
        while i < self.fields.len() {
            if self.fields[i].end() > length {
                length = self.fields[i].end();
            }
            i += 1;
        }

        length
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|x| x.name == name)
    }
}

pub const TIMESTAMP: Field = Field {
    name: "timestamp",
    offset: 56,
    length: 8,
    endianness: Endianness::Little,
};

pub const PRICE: Field = Field {
    name: "price",
    offset: 120,
    length: 8,
    endianness: Endianness::Little,
};

pub const TICKER_LENGTH: Field = Field {
    name: "ticker_length",
    offset: 216,
    length: 8,
    endianness: Endianness::Little,
};

pub const TICKER_NAME: Field = Field {
    name: "ticker_name",
    offset: 224,
    length: 8,
    endianness: Endianness::Little,
};

pub const SIGNATURE_R: Field = Field {
    name: "r",
    offset: 0,
    length: 32,
    endianness: Endianness::Big,
};

pub const SIGNATURE_S: Field = Field {
    name: "s",
    offset: 32,
    length: 32,
    endianness: Endianness::Big,
};

pub const SIGNATURE_V: Field = Field {
    name: "v",
    offset: 64,
    length: 32,
    endianness: Endianness::Big,
};

pub const MESSAGE: Layout = Layout {
    fields: &[TIMESTAMP, PRICE, TICKER_LENGTH, TICKER_NAME],
};

pub const SIGNATURE: Layout = Layout {
    fields: &[SIGNATURE_R, SIGNATURE_S, SIGNATURE_V],
};

/// Length of a message in bytes below which decoding fails
pub const MESSAGE_LENGTH: usize = MESSAGE.required_length();

/// Exact length of a signature in bytes
pub const SIGNATURE_LENGTH: usize = SIGNATURE.required_length();

/// The ticker of the ABI-encoded `key` string: its length is the 32 bytes big-endian word
/// ending at the [`TICKER_LENGTH`] field and its text starts at [`TICKER_NAME`].
/// Returns `None` if the message does not contain a valid UTF-8 ticker.
pub fn ticker_symbol(message: &[u8]) -> Option<String> {
    let length_word = message.get(TICKER_NAME.offset - 32..TICKER_NAME.offset)?;
    if length_word[..24].iter().any(|x| *x != 0) {
        return None;
    }

    let length = u64::from_be_bytes(length_word[24..].try_into().ok()?) as usize;
    let text = message.get(TICKER_NAME.offset..TICKER_NAME.offset.checked_add(length)?)?;

    std::str::from_utf8(text).ok().map(|x| x.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    #[test]
    fn layouts_have_expected_lengths() {
        assert_eq!(MESSAGE_LENGTH, 232);
        assert_eq!(SIGNATURE_LENGTH, 96);
    }

    #[test]
    fn fields_do_not_overlap() {
        for layout in [MESSAGE, SIGNATURE] {
            let mut fields = layout.fields.to_vec();
            fields.sort_by_key(|x| x.offset);

            for pair in fields.windows(2) {
                assert!(pair[0].end() <= pair[1].offset, "{} overlaps {}", pair[0].name, pair[1].name);
            }
        }
    }

    #[test]
    fn fields_are_found_by_name() {
        assert_eq!(MESSAGE.field("price"), Some(&PRICE));
        assert_eq!(SIGNATURE.field("v"), Some(&SIGNATURE_V));
        assert_eq!(MESSAGE.field("r"), None);
    }

    #[test]
    fn u64_fields_respect_endianness() {
        let mut bytes = vec![0u8; 64];
        bytes[56..64].copy_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8]);

        assert_eq!(TIMESTAMP.read_u64(&bytes).unwrap(), 0x0807060504030201);

        let big = Field {
            endianness: Endianness::Big,
            ..TIMESTAMP
        };
        assert_eq!(big.read_u64(&bytes).unwrap(), 0x0102030405060708);
    }

    #[test]
    fn u256_fields_are_read_big_endian() {
        let mut bytes = [0u8; 96];
        bytes[15] = 1; // lowest byte of the high word
        bytes[31] = 2; // lowest byte of the low word

        let value = SIGNATURE_R.read_u256(&bytes).unwrap();

        assert_eq!(value.high(), 1);
        assert_eq!(value.low(), 2);
    }

    #[test]
    fn reading_past_the_end_fails() {
        let bytes = vec![0u8; 100];

        assert!(matches!(TICKER_NAME.read_u64(&bytes), Err(Error::MalformedMessage(_))));
        assert!(matches!(SIGNATURE_V.read_u256(&bytes[..95]), Err(Error::MalformedMessage(_))));
    }

    #[test]
    fn ticker_symbol_is_read_from_abi_string() {
        let message = testing::message(1_700_000_000, "ETH", 2_000_000_000);

        assert_eq!(ticker_symbol(&message), Some("ETH".to_string()));
    }

    #[test]
    fn ticker_symbol_of_truncated_message_is_none() {
        let message = testing::message(1_700_000_000, "ETH", 2_000_000_000);

        assert_eq!(ticker_symbol(&message[..200]), None);
    }
}
