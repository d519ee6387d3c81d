use starknet::core::types::U256;

use crate::RawAttestation;

/// OKX reporter address
pub const ATTESTER: &str = "85615b076615317c80f14cbad6501eec031cd51c";

fn word(value: u64) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[24..].copy_from_slice(&value.to_be_bytes());
    word
}

fn string(value: &str) -> Vec<u8> {
    let mut bytes = word(value.len() as u64).to_vec();
    let padded = value.len().div_ceil(32).max(1) * 32;

    let mut text = value.as_bytes().to_vec();
    text.resize(padded, 0);
    bytes.extend(text);

    bytes
}

/// ABI encoding of `("prices", timestamp, ticker, price)` as signed by open-oracle reporters
pub fn message(timestamp: u64, ticker: &str, price: u64) -> Vec<u8> {
    let kind = string("prices");

    let mut message = vec![];
    message.extend(word(0x80));
    message.extend(word(timestamp));
    message.extend(word(0x80 + kind.len() as u64));
    message.extend(word(price));
    message.extend(kind);
    message.extend(string(ticker));

    message
}

/// `r || s || v` encoding of a signature
pub fn signature(r: U256, s: U256, v: u8) -> Vec<u8> {
    let mut signature = vec![];
    for value in [r, s] {
        signature.extend(value.high().to_be_bytes());
        signature.extend(value.low().to_be_bytes());
    }
    signature.extend(word(v as u64));

    signature
}

/// A well-formed attestation of `price` for `ticker`
pub fn attestation(ticker: &str, timestamp: u64, price: u64) -> RawAttestation {
    RawAttestation {
        message_bytes: message(timestamp, ticker, price),
        signature_bytes: signature(U256::from_words(0xaaaa, 0xbbbb), U256::from_words(0xcccc, 0xdddd), 27),
        attester_address_hex: ATTESTER.to_string(),
    }
}
