//! Content fingerprints for matched spans.
//!
//! Provides [`Fingerprint`], a fast non-cryptographic 64-bit hash computed over
//! UTF-16 code units. Two independent 32-bit multiply-xorshift lanes are mixed
//! at the end, so the result is stable across processes and platforms.

/// Deterministic 64-bit fingerprint of a rule name and matched text.
///
/// Collisions are not impossible: two colliding spans would share a block
/// table slot. The probability is negligible for realistic document sizes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Fingerprint(u64);

impl Fingerprint {
    /// Fingerprint a span matched by `rule`.
    #[must_use]
    pub fn of(rule: &str, text: &str) -> Self {
        let mut hasher = Hasher::new(0);
        hasher.update(rule);
        hasher.update("\0");
        hasher.update(text);
        Self(hasher.finish())
    }

    /// Fingerprint plain text without rule identity (used for generated anchor ids).
    #[must_use]
    pub fn of_text(text: &str) -> Self {
        let mut hasher = Hasher::new(0);
        hasher.update(text);
        Self(hasher.finish())
    }

    /// Raw 64-bit value.
    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }

    /// Fixed-width lowercase hexadecimal form (16 characters).
    #[must_use]
    pub fn to_hex(self) -> String {
        hex::encode(self.0.to_be_bytes())
    }
}

/// Two-lane streaming hasher.
struct Hasher {
    h1: u32,
    h2: u32,
}

impl Hasher {
    fn new(seed: u32) -> Self {
        Self {
            h1: 0xdead_beef ^ seed,
            h2: 0x41c6_ce57 ^ seed,
        }
    }

    fn update(&mut self, text: &str) {
        for unit in text.encode_utf16() {
            let ch = u32::from(unit);
            self.h1 = (self.h1 ^ ch).wrapping_mul(2_654_435_761);
            self.h2 = (self.h2 ^ ch).wrapping_mul(1_597_334_677);
        }
    }

    fn finish(self) -> u64 {
        let Self { mut h1, mut h2 } = self;
        h1 = (h1 ^ (h1 >> 16)).wrapping_mul(2_246_822_507)
            ^ (h2 ^ (h2 >> 13)).wrapping_mul(3_266_489_909);
        h2 = (h2 ^ (h2 >> 16)).wrapping_mul(2_246_822_507)
            ^ (h1 ^ (h1 >> 13)).wrapping_mul(3_266_489_909);
        (u64::from(h2) << 32) | u64::from(h1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_values() {
        assert_eq!(Fingerprint::of_text("").to_hex(), "488bdcb81aee8d83");
        assert_eq!(Fingerprint::of_text("Title").to_hex(), "6ccdecefd558c355");
        assert_eq!(Fingerprint::of_text("Hello World").to_hex(), "ef1757d68c589fbb");
    }

    #[test]
    fn test_rule_identity_is_part_of_the_hash() {
        assert_eq!(Fingerprint::of("strong", "**a**").to_hex(), "d35ceab4106f448f");
        assert_ne!(Fingerprint::of("strong", "**a**"), Fingerprint::of("em", "**a**"));
    }

    #[test]
    fn test_hex_is_fixed_width() {
        let hex = Fingerprint::of_text("a").to_hex();
        assert_eq!(hex, "501c2ba782c97901");
        assert_eq!(hex.len(), 16);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_hashes_utf16_units() {
        // Astral characters contribute two code units.
        assert_ne!(Fingerprint::of_text("\u{1F600}"), Fingerprint::of_text("\u{F600}"));
        assert_eq!(Fingerprint::of_text("é").value(), Fingerprint::of_text("é").value());
    }
}
