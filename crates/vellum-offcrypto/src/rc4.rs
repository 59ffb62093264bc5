/// RC4 stream cipher (KSA + PRGA), implemented directly.
///
/// The legacy document schemes this crate targets predate the modern cipher
/// crates' trait plumbing, and the whole algorithm is a few lines; keeping it
/// self-contained avoids pulling a cipher stack in for a 40-bit legacy
/// format.
///
/// One `Rc4` value holds the schedule for exactly one key. The state
/// advances on every keystream byte, so a single value can decrypt one
/// logical stream across multiple `apply_keystream` calls; `&mut self` makes
/// exclusive ownership per stream a compile-time rule rather than a
/// convention.
#[derive(Clone, Debug)]
pub struct Rc4 {
    s: [u8; 256],
    i: u8,
    j: u8,
}

impl Rc4 {
    /// Build the key schedule for `key`. The key must be non-empty; RC4 has
    /// no other constraint on key length.
    pub fn new(key: &[u8]) -> Self {
        assert!(!key.is_empty(), "RC4 key must be non-empty");

        let mut s = [0u8; 256];
        for (i, v) in s.iter_mut().enumerate() {
            *v = i as u8;
        }

        let mut j: u8 = 0;
        for i in 0..256usize {
            j = j.wrapping_add(s[i]).wrapping_add(key[i % key.len()]);
            s.swap(i, j as usize);
        }

        Self { s, i: 0, j: 0 }
    }

    /// XOR the keystream into `data` in place, advancing the cipher state.
    ///
    /// Successive calls continue the same keystream, so chunked processing
    /// of one stream is equivalent to a single call over the concatenation.
    pub fn apply_keystream(&mut self, data: &mut [u8]) {
        for b in data {
            self.i = self.i.wrapping_add(1);
            self.j = self.j.wrapping_add(self.s[self.i as usize]);
            self.s.swap(self.i as usize, self.j as usize);
            let idx = self.s[self.i as usize].wrapping_add(self.s[self.j as usize]);
            *b ^= self.s[idx as usize];
        }
    }

    /// Advance the state by `n` keystream bytes without producing output.
    ///
    /// Used to reach an offset inside a rekeyed block when decryption starts
    /// mid-block.
    pub fn skip(&mut self, mut n: usize) {
        let mut scratch = [0u8; 64];
        while n > 0 {
            let take = n.min(scratch.len());
            self.apply_keystream(&mut scratch[..take]);
            n -= take;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn known_keystream_for_40_bit_key() {
        // RFC 6229 vector: key 0x0102030405, first 16 keystream bytes.
        let mut buf = [0u8; 16];
        let mut rc4 = Rc4::new(&[0x01, 0x02, 0x03, 0x04, 0x05]);
        rc4.apply_keystream(&mut buf);
        assert_eq!(
            buf,
            [
                0xB2, 0x39, 0x63, 0x05, 0xF0, 0x3D, 0xC0, 0x27, 0xCC, 0xC3, 0x52, 0x4A, 0x0A,
                0x11, 0x18, 0xA8
            ]
        );
    }

    #[test]
    fn ksa_permutation_is_a_bijection() {
        let keys: [&[u8]; 3] = [
            b"k",
            b"\x01\x02\x03\x04\x05",
            b"a longer key with some entropy",
        ];
        for key in keys {
            let rc4 = Rc4::new(key);
            let mut seen = [false; 256];
            for &v in &rc4.s {
                assert!(!seen[v as usize], "duplicate state byte {v}");
                seen[v as usize] = true;
            }
        }
    }

    #[test]
    fn chunked_keystream_matches_single_call() {
        let key = b"\xDE\xAD\xBE\xEF\x05";
        let mut whole = [0x5Au8; 100];
        Rc4::new(key).apply_keystream(&mut whole);

        let mut chunked = [0x5Au8; 100];
        let mut rc4 = Rc4::new(key);
        let (a, rest) = chunked.split_at_mut(7);
        let (b, c) = rest.split_at_mut(50);
        rc4.apply_keystream(a);
        rc4.apply_keystream(b);
        rc4.apply_keystream(c);
        assert_eq!(whole, chunked);
    }

    #[test]
    fn skip_matches_discarded_keystream() {
        let key = b"\x01\x02\x03\x04\x05";
        let mut reference = Rc4::new(key);
        let mut discard = [0u8; 333];
        reference.apply_keystream(&mut discard);

        let mut skipped = Rc4::new(key);
        skipped.skip(333);

        let mut a = [0u8; 32];
        let mut b = [0u8; 32];
        reference.apply_keystream(&mut a);
        skipped.apply_keystream(&mut b);
        assert_eq!(a, b);
    }

    proptest! {
        // Encrypt then decrypt with two independently-initialized states from
        // the same key recovers the plaintext.
        #[test]
        fn involution(
            key in prop::collection::vec(any::<u8>(), 1..32),
            plaintext in prop::collection::vec(any::<u8>(), 0..512),
        ) {
            let mut buf = plaintext.clone();
            Rc4::new(&key).apply_keystream(&mut buf);
            Rc4::new(&key).apply_keystream(&mut buf);
            prop_assert_eq!(buf, plaintext);
        }

        #[test]
        fn ksa_is_bijective_for_any_key(key in prop::collection::vec(any::<u8>(), 1..64)) {
            let rc4 = Rc4::new(&key);
            let mut seen = [false; 256];
            for &v in &rc4.s {
                prop_assert!(!seen[v as usize]);
                seen[v as usize] = true;
            }
        }
    }
}
