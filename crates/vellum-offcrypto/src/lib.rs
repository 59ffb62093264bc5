//! RC4 stream decryption for password-protected legacy binary documents.
//!
//! Word 97-era binary documents protect their streams with RC4, rekeyed per
//! fixed-size block: a per-block 40-bit key is derived by MD5-hashing a
//! fixed 64-byte buffer built from the first 5 bytes of the document-secret
//! digest and the little-endian block index. Deriving the password digest
//! itself (and locating block boundaries) is the surrounding container
//! reader's job; this crate only reproduces the cipher and the key schedule,
//! bit-for-bit.
//!
//! One [`Rc4`] value is one key schedule: callers stream a logical block
//! through it across as many `apply_keystream` calls as they like, and derive
//! a fresh state per block (which is what makes blocks independently, and if
//! desired concurrently, decryptable). [`decrypt_in_place`] wraps the
//! rekey-per-block walk for callers holding a contiguous range of an
//! encrypted stream.

mod block;
mod rc4;

pub use block::{
    decrypt_in_place, derive_block_key, rc4_for_block, CryptoError, BLOCK_KEY_LEN,
    SECRET_PREFIX_LEN,
};
pub use rc4::Rc4;
