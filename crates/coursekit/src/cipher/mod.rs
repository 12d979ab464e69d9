//! Two-key letter cipher.
//!
//! Each ASCII letter is shifted by an amount that depends on its case and on
//! which half of the alphabet it falls in:
//!
//! | class | plaintext | shift                     |
//! |-------|-----------|---------------------------|
//! | `L1`  | `a..=m`   | forward `s1 * s2`         |
//! | `L2`  | `n..=z`   | backward `s1 + s2`        |
//! | `U1`  | `A..=M`   | backward `s1`             |
//! | `U2`  | `N..=Z`   | forward `s2 * s2`         |
//! | `O`   | other     | unchanged                 |
//!
//! The halves can collide after shifting, so the mapping is not always
//! invertible from the ciphertext alone. Encryption therefore also returns
//! the class of every input character; with those classes decryption is
//! exact. Without them, [`brute_force_decrypt`] recovers what it can and
//! reports the positions it had to guess.
//!
//! # Example
//!
//! ```
//! use coursekit::cipher::{decrypt_with_classes, encrypt, Shifts};
//!
//! let shifts = Shifts::new(3, 5);
//! let encrypted = encrypt("Hello, World!", shifts);
//! let plain = decrypt_with_classes(&encrypted.text, &encrypted.classes, shifts).unwrap();
//! assert_eq!(plain, "Hello, World!");
//! ```

pub mod files;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{Error, Result};

pub use files::{
    decrypt_file, encrypt_file, render_decrypt_report, render_verification, run_pipeline,
    verify_files, CipherPaths, DecryptMethod, DecryptReport, Verification,
};

const ALPHABET_LEN: i64 = 26;

/// The pair of cipher keys, reduced modulo 26.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shifts {
    s1: u8,
    s2: u8,
}

impl Shifts {
    /// Build keys from arbitrary integers. Negative keys wrap.
    #[must_use]
    pub fn new(shift1: i64, shift2: i64) -> Self {
        Self {
            s1: reduce(shift1),
            s2: reduce(shift2),
        }
    }

    /// First key, in `0..26`.
    #[must_use]
    pub fn shift1(self) -> u8 {
        self.s1
    }

    /// Second key, in `0..26`.
    #[must_use]
    pub fn shift2(self) -> u8 {
        self.s2
    }

    /// Signed shift applied to a plaintext character of the given class.
    #[must_use]
    pub fn offset(self, class: CharClass) -> i64 {
        let (s1, s2) = (i64::from(self.s1), i64::from(self.s2));
        match class {
            CharClass::L1 => (s1 * s2) % ALPHABET_LEN,
            CharClass::L2 => -((s1 + s2) % ALPHABET_LEN),
            CharClass::U1 => -s1,
            CharClass::U2 => (s2 * s2) % ALPHABET_LEN,
            CharClass::O => 0,
        }
    }
}

fn reduce(shift: i64) -> u8 {
    // rem_euclid keeps the value in 0..26
    u8::try_from(shift.rem_euclid(ALPHABET_LEN)).unwrap_or_default()
}

/// Class of a plaintext character, recorded alongside the ciphertext.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CharClass {
    /// Lowercase `a..=m`.
    L1,
    /// Lowercase `n..=z`.
    L2,
    /// Uppercase `A..=M`.
    U1,
    /// Uppercase `N..=Z`.
    U2,
    /// Anything else; passed through.
    O,
}

impl CharClass {
    /// Classify a plaintext character.
    #[must_use]
    pub fn of(c: char) -> Self {
        match c {
            'a'..='m' => Self::L1,
            'n'..='z' => Self::L2,
            'A'..='M' => Self::U1,
            'N'..='Z' => Self::U2,
            _ => Self::O,
        }
    }

    /// Short code used in the metadata file.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::L1 => "L1",
            Self::L2 => "L2",
            Self::U1 => "U1",
            Self::U2 => "U2",
            Self::O => "O",
        }
    }
}

impl std::fmt::Display for CharClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Ciphertext plus the class of every original character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encrypted {
    /// The ciphertext.
    pub text: String,
    /// One class per character of the plaintext.
    pub classes: Vec<CharClass>,
}

/// A ciphertext position brute force could not resolve uniquely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ambiguity {
    /// Character index into the ciphertext.
    pub position: usize,
    /// The ciphertext character.
    pub cipher_char: char,
    /// Every plaintext letter that encrypts to `cipher_char`, alphabetical.
    pub candidates: Vec<char>,
}

/// Shift an ASCII letter within its case, wrapping around.
///
/// Anything that is not an ASCII letter comes back unchanged.
#[must_use]
pub fn shift_char(c: char, shift: i64) -> char {
    let base = match c {
        'a'..='z' => b'a',
        'A'..='Z' => b'A',
        _ => return c,
    };
    let idx = (i64::from(c as u8 - base) + shift).rem_euclid(ALPHABET_LEN);
    // idx is in 0..26
    char::from(base + u8::try_from(idx).unwrap_or_default())
}

/// Encrypt a single character, returning it with its class.
#[must_use]
pub fn encrypt_char(c: char, shifts: Shifts) -> (char, CharClass) {
    let class = CharClass::of(c);
    (shift_char(c, shifts.offset(class)), class)
}

/// Undo [`encrypt_char`] given the recorded class.
#[must_use]
pub fn decrypt_char(c: char, class: CharClass, shifts: Shifts) -> char {
    shift_char(c, -shifts.offset(class))
}

/// Encrypt a whole text.
#[must_use]
pub fn encrypt(text: &str, shifts: Shifts) -> Encrypted {
    let (text, classes): (String, Vec<CharClass>) =
        text.chars().map(|c| encrypt_char(c, shifts)).unzip();
    debug!(chars = classes.len(), "Encrypted text");
    Encrypted { text, classes }
}

/// Decrypt using per-character class metadata.
///
/// # Errors
///
/// Returns [`Error::MetadataLength`] if `classes` does not have exactly one
/// entry per character of `text`.
pub fn decrypt_with_classes(text: &str, classes: &[CharClass], shifts: Shifts) -> Result<String> {
    let expected = text.chars().count();
    if expected != classes.len() {
        return Err(Error::MetadataLength {
            expected,
            found: classes.len(),
        });
    }

    Ok(text
        .chars()
        .zip(classes)
        .map(|(c, &class)| decrypt_char(c, class, shifts))
        .collect())
}

/// Decrypt without metadata by trying every plaintext letter.
///
/// Unique candidates are used as is. Otherwise the first candidate is taken
/// (or the cipher letter kept, when there are none) and the position is
/// reported.
#[must_use]
pub fn brute_force_decrypt(text: &str, shifts: Shifts) -> (String, Vec<Ambiguity>) {
    let mut plain = String::with_capacity(text.len());
    let mut ambiguities = Vec::new();

    for (position, c) in text.chars().enumerate() {
        let alphabet = match c {
            'a'..='z' => 'a'..='z',
            'A'..='Z' => 'A'..='Z',
            _ => {
                plain.push(c);
                continue;
            }
        };

        let candidates: Vec<char> = alphabet
            .filter(|&p| encrypt_char(p, shifts).0 == c)
            .collect();

        if let [only] = candidates.as_slice() {
            plain.push(*only);
        } else {
            trace!(position, cipher = %c, candidates = candidates.len(), "Ambiguous position");
            plain.push(candidates.first().copied().unwrap_or(c));
            ambiguities.push(Ambiguity {
                position,
                cipher_char: c,
                candidates,
            });
        }
    }

    debug!(ambiguous = ambiguities.len(), "Brute-force decryption finished");
    (plain, ambiguities)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_shifts_reduce_modulo() {
        let shifts = Shifts::new(27, -1);
        assert_eq!(shifts.shift1(), 1);
        assert_eq!(shifts.shift2(), 25);
    }

    #[test]
    fn test_shift_char_wraps() {
        assert_eq!(shift_char('z', 1), 'a');
        assert_eq!(shift_char('a', -1), 'z');
        assert_eq!(shift_char('A', 27), 'B');
        assert_eq!(shift_char('M', -40), 'Y');
    }

    #[test]
    fn test_shift_char_passes_non_letters() {
        for c in [' ', '7', '!', '\n', 'é', 'Ω'] {
            assert_eq!(shift_char(c, 5), c);
        }
    }

    #[test]
    fn test_classify() {
        assert_eq!(CharClass::of('a'), CharClass::L1);
        assert_eq!(CharClass::of('m'), CharClass::L1);
        assert_eq!(CharClass::of('n'), CharClass::L2);
        assert_eq!(CharClass::of('z'), CharClass::L2);
        assert_eq!(CharClass::of('A'), CharClass::U1);
        assert_eq!(CharClass::of('M'), CharClass::U1);
        assert_eq!(CharClass::of('N'), CharClass::U2);
        assert_eq!(CharClass::of('Z'), CharClass::U2);
        assert_eq!(CharClass::of('-'), CharClass::O);
    }

    #[test]
    fn test_encrypt_rules() {
        // s1 = 2, s2 = 3
        let shifts = Shifts::new(2, 3);
        assert_eq!(encrypt_char('a', shifts), ('g', CharClass::L1)); // +6
        assert_eq!(encrypt_char('n', shifts), ('i', CharClass::L2)); // -5
        assert_eq!(encrypt_char('A', shifts), ('Y', CharClass::U1)); // -2
        assert_eq!(encrypt_char('N', shifts), ('W', CharClass::U2)); // +9
        assert_eq!(encrypt_char('?', shifts), ('?', CharClass::O));
    }

    #[test]
    fn test_encrypt_known_text() {
        let encrypted = encrypt("Hello, World!", Shifts::new(2, 3));
        assert_eq!(encrypted.text, "Fkrrj, Fjmrj!");
        assert_eq!(encrypted.classes.len(), 13);
        assert_eq!(encrypted.classes[0], CharClass::U1);
        assert_eq!(encrypted.classes[5], CharClass::O);
    }

    #[test]
    fn test_decrypt_with_classes_length_mismatch() {
        let err = decrypt_with_classes("abc", &[CharClass::L1], Shifts::new(1, 1)).unwrap_err();
        assert!(matches!(
            err,
            Error::MetadataLength {
                expected: 3,
                found: 1
            }
        ));
    }

    #[test]
    fn test_class_serializes_as_code() {
        let json = serde_json::to_string(&vec![CharClass::L1, CharClass::O]).unwrap();
        assert_eq!(json, r#"["L1","O"]"#);
        let back: Vec<CharClass> = serde_json::from_str(r#"["U2","L2"]"#).unwrap();
        assert_eq!(back, vec![CharClass::U2, CharClass::L2]);
        assert_eq!(CharClass::U1.to_string(), "U1");
    }

    #[test]
    fn test_brute_force_unique() {
        // With both keys zero every letter maps to itself.
        let (plain, ambiguities) = brute_force_decrypt("Plain Text", Shifts::new(0, 0));
        assert_eq!(plain, "Plain Text");
        assert!(ambiguities.is_empty());
    }

    #[test]
    fn test_brute_force_reports_collisions() {
        // s1 = 1, s2 = 0: 'a' -> 'a' (L1, +0) and 'n' -> 'm' (L2, -1),
        // while 'm' -> 'm' (L1, +0). So 'm' has two preimages and 'z' none.
        let shifts = Shifts::new(1, 0);
        let (plain, ambiguities) = brute_force_decrypt("mz", shifts);

        assert_eq!(ambiguities.len(), 2);
        assert_eq!(ambiguities[0].position, 0);
        assert_eq!(ambiguities[0].candidates, vec!['m', 'n']);
        assert_eq!(ambiguities[1].cipher_char, 'z');
        assert!(ambiguities[1].candidates.is_empty());
        assert_eq!(plain, "mz");
    }

    proptest! {
        /// Property: decryption with metadata inverts encryption
        #[test]
        fn prop_round_trip_with_classes(
            text in ".{0,200}",
            s1 in any::<i64>(),
            s2 in any::<i64>()
        ) {
            let shifts = Shifts::new(s1, s2);
            let encrypted = encrypt(&text, shifts);
            prop_assert_eq!(encrypted.classes.len(), text.chars().count());
            let plain = decrypt_with_classes(&encrypted.text, &encrypted.classes, shifts).unwrap();
            prop_assert_eq!(plain, text);
        }

        /// Property: non-letters survive encryption untouched
        #[test]
        fn prop_non_letters_unchanged(text in "[^a-zA-Z]{0,100}", s1 in -100i64..100, s2 in -100i64..100) {
            let encrypted = encrypt(&text, Shifts::new(s1, s2));
            prop_assert_eq!(encrypted.text, text);
        }

        /// Property: brute force is exact whenever it reports no ambiguity
        #[test]
        fn prop_brute_force_exact_without_ambiguity(
            text in "[a-zA-Z ,.]{0,80}",
            s1 in 0i64..26,
            s2 in 0i64..26
        ) {
            let shifts = Shifts::new(s1, s2);
            let encrypted = encrypt(&text, shifts);
            let (plain, ambiguities) = brute_force_decrypt(&encrypted.text, shifts);
            if ambiguities.is_empty() {
                prop_assert_eq!(plain, text);
            }
        }
    }
}
