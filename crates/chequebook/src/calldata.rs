//! ABI call data for the two contract calls the chequebook makes.
//!
//! Both calls take only static arguments, so the encoding is the 4-byte
//! selector followed by one 32-byte word per argument.

use bytes::{BufMut, Bytes, BytesMut};
use chequebook_core::{Address, Amount};

/// `transfer(address,uint256)` on the ERC-20 token.
pub const ERC20_TRANSFER_SELECTOR: [u8; 4] = [0xa9, 0x05, 0x9c, 0xbb];

/// `withdraw(uint256)` on the chequebook contract.
pub const CHEQUEBOOK_WITHDRAW_SELECTOR: [u8; 4] = [0x2e, 0x1a, 0x7d, 0x4d];

const WORD: usize = 32;

/// Call data moving `amount` tokens from the caller to `to`.
pub fn erc20_transfer(to: &Address, amount: Amount) -> Bytes {
    let mut buf = BytesMut::with_capacity(4 + 2 * WORD);
    buf.put_slice(&ERC20_TRANSFER_SELECTOR);
    buf.put_slice(&address_word(to));
    buf.put_slice(&amount.to_be_word());
    buf.freeze()
}

/// Call data withdrawing `amount` tokens from the chequebook to its owner.
pub fn chequebook_withdraw(amount: Amount) -> Bytes {
    let mut buf = BytesMut::with_capacity(4 + WORD);
    buf.put_slice(&CHEQUEBOOK_WITHDRAW_SELECTOR);
    buf.put_slice(&amount.to_be_word());
    buf.freeze()
}

fn address_word(address: &Address) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[WORD - 20..].copy_from_slice(address.as_bytes());
    word
}
