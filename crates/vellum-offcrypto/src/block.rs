use md5::{Digest as _, Md5};
use thiserror::Error;
use zeroize::{Zeroize as _, Zeroizing};

use crate::rc4::Rc4;

/// Number of bytes of the document-secret digest consumed by key derivation.
pub const SECRET_PREFIX_LEN: usize = 5;
/// Length in bytes of a derived per-block RC4 key (40-bit).
pub const BLOCK_KEY_LEN: usize = 5;

/// Errors from per-block key derivation. These are caller precondition
/// violations, not data corruption; nothing here is recoverable by retrying.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// The supplied document-secret digest has fewer than
    /// [`SECRET_PREFIX_LEN`] bytes. Callers normally pass the full 16-byte
    /// digest produced by the password step.
    #[error(
        "document secret digest too short: need at least {SECRET_PREFIX_LEN} bytes, got {got}"
    )]
    SecretTooShort { got: usize },
    /// A zero block size cannot address any stream byte.
    #[error("encryption block size must be non-zero")]
    ZeroBlockSize,
}

/// Derive the 40-bit RC4 key for one encryption block.
///
/// The digest input is a fixed 64-byte buffer whose layout is an external
/// wire contract (the padding constants `0x80`/`0x48` included) and must not
/// be rearranged or re-derived:
///
/// | bytes | content |
/// |---|---|
/// | 0-4 | first 5 bytes of the document-secret digest |
/// | 5-8 | block index, little-endian u32 |
/// | 9 | `0x80` |
/// | 10-55 | zero |
/// | 56 | `0x48` |
/// | 57-63 | zero |
///
/// The key is the first [`BLOCK_KEY_LEN`] bytes of the MD5 digest of that
/// buffer. Derivation is pure: identical `(secret, block)` inputs always
/// produce the identical key.
pub fn derive_block_key(
    secret_digest: &[u8],
    block: u32,
) -> Result<[u8; BLOCK_KEY_LEN], CryptoError> {
    let prefix = secret_digest
        .get(..SECRET_PREFIX_LEN)
        .ok_or(CryptoError::SecretTooShort {
            got: secret_digest.len(),
        })?;

    let mut buf = Zeroizing::new([0u8; 64]);
    buf[..SECRET_PREFIX_LEN].copy_from_slice(prefix);
    buf[5..9].copy_from_slice(&block.to_le_bytes());
    buf[9] = 0x80;
    buf[56] = 0x48;

    let mut digest = Md5::digest(&buf[..]);
    let mut key = [0u8; BLOCK_KEY_LEN];
    key.copy_from_slice(&digest[..BLOCK_KEY_LEN]);
    digest.as_mut_slice().zeroize();
    Ok(key)
}

/// Derive the key for `block` and return a freshly scheduled cipher state
/// for it.
pub fn rc4_for_block(secret_digest: &[u8], block: u32) -> Result<Rc4, CryptoError> {
    let key = Zeroizing::new(derive_block_key(secret_digest, block)?);
    Ok(Rc4::new(&key[..]))
}

/// Decrypt (or encrypt: RC4 is its own inverse) a contiguous range of a
/// block-encrypted stream, in place.
///
/// `stream_position` is the absolute offset of `buf[0]` within the logical
/// stream; `block_size` is the container format's rekey interval (Word 97
/// uses 512). The cipher is rekeyed at every block boundary crossed, with
/// keystream discarded to reach a mid-block starting offset, so callers can
/// decrypt any sub-range without touching the rest of the stream.
pub fn decrypt_in_place(
    secret_digest: &[u8],
    buf: &mut [u8],
    stream_position: u64,
    block_size: usize,
) -> Result<(), CryptoError> {
    if block_size == 0 {
        return Err(CryptoError::ZeroBlockSize);
    }
    // Validate the secret before doing any work, so a short digest fails even
    // for an empty buffer.
    if secret_digest.len() < SECRET_PREFIX_LEN {
        return Err(CryptoError::SecretTooShort {
            got: secret_digest.len(),
        });
    }

    let mut in_block = (stream_position % block_size as u64) as usize;
    // Block indices are 32-bit on the wire; streams long enough to overflow
    // this do not exist in the legacy formats.
    let mut block = (stream_position / block_size as u64) as u32;
    let mut pos = 0usize;
    while pos < buf.len() {
        let take = (buf.len() - pos).min(block_size - in_block);
        let mut rc4 = rc4_for_block(secret_digest, block)?;
        rc4.skip(in_block);
        rc4.apply_keystream(&mut buf[pos..pos + take]);
        in_block = 0;
        pos += take;
        block += 1;
    }
    Ok(())
}
