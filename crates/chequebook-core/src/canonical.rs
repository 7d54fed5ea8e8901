//! Canonical binary encoding of a cheque for signing.
//!
//! The encoding is fixed-width so that it has exactly one byte
//! representation per cheque:
//!
//! ```text
//! CHEQUE_DOMAIN || chequebook (20) || beneficiary (20) || cumulative_payout (32, big-endian)
//! ```
//!
//! The domain prefix keeps cheque signatures from being replayed as
//! signatures over any other message type signed by the same key.

use crate::cheque::Cheque;

/// Domain separator prepended to every cheque encoding.
pub const CHEQUE_DOMAIN: &[u8] = b"chequebook.cheque/v1\0";

/// Total length of an encoded cheque.
pub const CHEQUE_BYTES_LEN: usize = CHEQUE_DOMAIN.len() + 20 + 20 + 32;

/// Encode a cheque to its canonical bytes.
pub fn cheque_bytes(cheque: &Cheque) -> Vec<u8> {
    let mut buf = Vec::with_capacity(CHEQUE_BYTES_LEN);
    buf.extend_from_slice(CHEQUE_DOMAIN);
    buf.extend_from_slice(cheque.chequebook.as_bytes());
    buf.extend_from_slice(cheque.beneficiary.as_bytes());
    buf.extend_from_slice(&cheque.cumulative_payout.to_be_word());
    buf
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use crate::types::{Address, Amount};

    fn cheque(payout: u128) -> Cheque {
        Cheque::new(
            Address::from_bytes([0x11; 20]),
            Address::from_bytes([0x22; 20]),
            Amount::new(payout),
        )
    }

    #[test]
    fn test_layout() {
        let bytes = cheque_bytes(&cheque(0x0a0b));
        assert_eq!(bytes.len(), CHEQUE_BYTES_LEN);

        let body = &bytes[CHEQUE_DOMAIN.len()..];
        assert_eq!(&body[..20], &[0x11; 20]);
        assert_eq!(&body[20..40], &[0x22; 20]);
        assert_eq!(&body[40..70], &[0u8; 30]);
        assert_eq!(&body[70..], &[0x0a, 0x0b]);
    }

    #[test]
    fn test_payout_changes_encoding() {
        assert_ne!(cheque_bytes(&cheque(1)), cheque_bytes(&cheque(2)));
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(cheque_bytes(&cheque(99)), cheque_bytes(&cheque(99)));
    }

    fn arb_cheque() -> impl Strategy<Value = Cheque> {
        (
            prop::array::uniform20(any::<u8>()),
            prop::array::uniform20(any::<u8>()),
            any::<u128>(),
        )
            .prop_map(|(chequebook, beneficiary, payout)| {
                Cheque::new(
                    Address::from_bytes(chequebook),
                    Address::from_bytes(beneficiary),
                    Amount::new(payout),
                )
            })
    }

    proptest! {
        #[test]
        fn prop_distinct_cheques_encode_distinctly(a in arb_cheque(), b in arb_cheque()) {
            prop_assert_eq!(cheque_bytes(&a).len(), CHEQUE_BYTES_LEN);
            prop_assert_eq!(a == b, cheque_bytes(&a) == cheque_bytes(&b));
        }
    }
}
