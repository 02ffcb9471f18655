//! Random password generation for `-g LEN`.

use rand::Rng;

use crate::errors::{GpamError, Result};

/// Letters, digits, and ASCII punctuation.
const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz\
ABCDEFGHIJKLMNOPQRSTUVWXYZ\
0123456789\
!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~";

/// Upper bound on generated length; anything longer is almost certainly a typo.
pub const MAX_LENGTH: usize = 4096;

/// Generate a random password of `length` characters drawn from [`ALPHABET`].
pub fn generate(length: usize) -> Result<String> {
    if length == 0 || length > MAX_LENGTH {
        return Err(GpamError::InvalidUsage(format!(
            "password length must be between 1 and {MAX_LENGTH}, got {length}"
        )));
    }

    let mut rng = rand::rng();
    let password = (0..length)
        .map(|_| char::from(ALPHABET[rng.random_range(0..ALPHABET.len())]))
        .collect();
    Ok(password)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_requested_length() {
        let pw = generate(24).unwrap();
        assert_eq!(pw.chars().count(), 24);
    }

    #[test]
    fn uses_only_alphabet_characters() {
        let pw = generate(512).unwrap();
        assert!(pw.bytes().all(|b| ALPHABET.contains(&b)));
    }

    #[test]
    fn alphabet_covers_letters_digits_and_punctuation() {
        assert_eq!(ALPHABET.len(), 26 + 26 + 10 + 32);
        assert!(ALPHABET.iter().all(|b| b.is_ascii_graphic()));
    }

    #[test]
    fn rejects_zero_and_huge_lengths() {
        assert!(matches!(generate(0), Err(GpamError::InvalidUsage(_))));
        assert!(generate(MAX_LENGTH + 1).is_err());
    }

    #[test]
    fn consecutive_passwords_differ() {
        assert_ne!(generate(32).unwrap(), generate(32).unwrap());
    }
}
