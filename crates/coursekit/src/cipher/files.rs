//! File-level cipher operations: encrypt, decrypt and verify.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::{brute_force_decrypt, decrypt_with_classes, encrypt, Ambiguity, CharClass, Shifts};
use crate::error::{Error, Result};

/// Maximum number of diff lines kept in a [`Verification::Mismatch`].
pub const DIFF_PREVIEW_LIMIT: usize = 200;

/// Ambiguous positions listed by [`render_decrypt_report`] before the rest
/// are summarized.
pub const AMBIGUITY_PREVIEW_LIMIT: usize = 20;

/// The four files the cipher pipeline works with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CipherPaths {
    /// Plaintext input.
    pub raw: PathBuf,
    /// Ciphertext output.
    pub encrypted: PathBuf,
    /// Class metadata (JSON array of codes).
    pub meta: PathBuf,
    /// Decrypted output.
    pub decrypted: PathBuf,
}

/// How a file was decrypted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecryptMethod {
    /// Exact, using the class metadata.
    Metadata,
    /// Best effort, because the metadata was missing or unusable.
    BruteForce,
}

/// Outcome of [`decrypt_file`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecryptReport {
    /// Which strategy produced the plaintext.
    pub method: DecryptMethod,
    /// Positions brute force had to guess. Always empty for metadata.
    pub ambiguities: Vec<Ambiguity>,
}

/// Outcome of [`verify_files`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    /// The files are identical.
    Match,
    /// The files differ.
    Mismatch {
        /// Number of line positions that differ.
        differing: usize,
        /// `--- original` / `+++ decrypted` headers, then preview lines
        /// `-N: original` / `+N: decrypted`.
        diff: Vec<String>,
        /// Whether the preview body was cut at [`DIFF_PREVIEW_LIMIT`].
        truncated: bool,
    },
}

impl Verification {
    /// Whether the decrypted text matched.
    #[must_use]
    pub fn is_match(&self) -> bool {
        matches!(self, Self::Match)
    }

    /// Turn a mismatch into [`Error::VerificationFailed`] against `original`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::VerificationFailed`] for [`Verification::Mismatch`].
    pub fn check(&self, original: &Path) -> Result<()> {
        match self {
            Self::Match => Ok(()),
            Self::Mismatch { differing, .. } => Err(Error::VerificationFailed {
                original: original.to_path_buf(),
                differing: *differing,
            }),
        }
    }
}

/// Human-readable summary of a [`DecryptReport`].
///
/// Empty for an exact metadata decryption. Lists at most
/// [`AMBIGUITY_PREVIEW_LIMIT`] ambiguous positions.
#[must_use]
pub fn render_decrypt_report(report: &DecryptReport) -> String {
    let mut out = String::new();
    if report.method == DecryptMethod::BruteForce {
        out.push_str("Metadata unavailable; used brute-force decryption.\n");
    }
    if report.ambiguities.is_empty() {
        return out;
    }

    let _ = writeln!(
        out,
        "Brute-force decryption produced {} ambiguous positions (index, cipher, candidates):",
        report.ambiguities.len()
    );
    for a in report.ambiguities.iter().take(AMBIGUITY_PREVIEW_LIMIT) {
        let _ = writeln!(out, "  {}: '{}' -> {:?}", a.position, a.cipher_char, a.candidates);
    }
    if report.ambiguities.len() > AMBIGUITY_PREVIEW_LIMIT {
        let _ = writeln!(
            out,
            "  ... and {} more ambiguous positions.",
            report.ambiguities.len() - AMBIGUITY_PREVIEW_LIMIT
        );
    }
    out
}

/// Human-readable outcome of [`verify_files`], including the diff preview.
#[must_use]
pub fn render_verification(verification: &Verification) -> String {
    match verification {
        Verification::Match => {
            "Decryption successful! Decrypted text matches the original.\n".to_string()
        }
        Verification::Mismatch {
            diff,
            truncated,
            ..
        } => {
            let mut out =
                String::from("Decryption failed: decrypted text does not match original.\n\n");
            for line in diff {
                out.push_str(line);
                out.push('\n');
            }
            if *truncated {
                out.push_str("... (diff truncated) ...\n");
            }
            out
        }
    }
}

fn read_existing(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(Error::not_found(path));
    }
    Ok(fs::read_to_string(path)?)
}

/// Encrypt `raw` into `encrypted` and write the class metadata to `meta`.
///
/// # Errors
///
/// Returns an error if `raw` does not exist or any file I/O fails.
pub fn encrypt_file(raw: &Path, encrypted: &Path, meta: &Path, shifts: Shifts) -> Result<()> {
    let text = read_existing(raw)?;
    let result = encrypt(&text, shifts);

    fs::write(encrypted, &result.text)?;
    fs::write(meta, serde_json::to_string(&result.classes)?)?;

    info!(
        encrypted = %encrypted.display(),
        meta = %meta.display(),
        chars = result.classes.len(),
        "Encryption written"
    );
    Ok(())
}

/// Load class metadata, returning `None` (with a warning) if it is unusable.
fn load_classes(meta: &Path, expected: usize) -> Option<Vec<CharClass>> {
    if !meta.exists() {
        warn!(meta = %meta.display(), "Metadata file not found, falling back to brute force");
        return None;
    }

    let classes: Vec<CharClass> = match fs::read_to_string(meta)
        .map_err(Error::from)
        .and_then(|raw| serde_json::from_str(&raw).map_err(Error::from))
    {
        Ok(classes) => classes,
        Err(e) => {
            warn!(meta = %meta.display(), error = %e, "Unreadable metadata, falling back to brute force");
            return None;
        }
    };

    if classes.len() != expected {
        warn!(
            expected,
            found = classes.len(),
            "Metadata length mismatch, falling back to brute force"
        );
        return None;
    }

    Some(classes)
}

/// Decrypt `encrypted` into `decrypted`.
///
/// Uses the metadata in `meta` when it is present and consistent with the
/// ciphertext; otherwise falls back to [`brute_force_decrypt`].
///
/// # Errors
///
/// Returns an error if `encrypted` does not exist or any file I/O fails.
pub fn decrypt_file(
    encrypted: &Path,
    decrypted: &Path,
    meta: &Path,
    shifts: Shifts,
) -> Result<DecryptReport> {
    let text = read_existing(encrypted)?;

    let (plain, report) = match load_classes(meta, text.chars().count()) {
        Some(classes) => (
            decrypt_with_classes(&text, &classes, shifts)?,
            DecryptReport {
                method: DecryptMethod::Metadata,
                ambiguities: Vec::new(),
            },
        ),
        None => {
            let (plain, ambiguities) = brute_force_decrypt(&text, shifts);
            if !ambiguities.is_empty() {
                warn!(
                    count = ambiguities.len(),
                    "Brute-force decryption produced ambiguous positions"
                );
            }
            (
                plain,
                DecryptReport {
                    method: DecryptMethod::BruteForce,
                    ambiguities,
                },
            )
        }
    };

    fs::write(decrypted, plain)?;
    info!(decrypted = %decrypted.display(), method = ?report.method, "Decryption written");
    Ok(report)
}

/// Compare the original plaintext with the decrypted output.
///
/// # Errors
///
/// Returns an error if either file does not exist or cannot be read.
pub fn verify_files(raw: &Path, decrypted: &Path) -> Result<Verification> {
    let original = read_existing(raw)?;
    let candidate = read_existing(decrypted)?;

    if original == candidate {
        debug!("Decrypted text matches original");
        return Ok(Verification::Match);
    }

    Ok(line_diff(
        &original,
        &candidate,
        &raw.display().to_string(),
        &decrypted.display().to_string(),
    ))
}

/// Line-by-line comparison, headed `--- from` / `+++ to`. Lines are paired by
/// position, so an inserted line shows up as every following line differing.
fn line_diff(original: &str, candidate: &str, from: &str, to: &str) -> Verification {
    let left: Vec<&str> = original.split_inclusive('\n').collect();
    let right: Vec<&str> = candidate.split_inclusive('\n').collect();

    let mut diff = Vec::new();
    let mut differing = 0;

    for i in 0..left.len().max(right.len()) {
        let (l, r) = (left.get(i), right.get(i));
        if l == r {
            continue;
        }
        differing += 1;
        if let Some(l) = l {
            diff.push(format!("-{}: {}", i + 1, l.trim_end_matches('\n')));
        }
        if let Some(r) = r {
            diff.push(format!("+{}: {}", i + 1, r.trim_end_matches('\n')));
        }
    }

    let truncated = diff.len() > DIFF_PREVIEW_LIMIT;
    diff.truncate(DIFF_PREVIEW_LIMIT);

    let mut headed = vec![format!("--- {from}"), format!("+++ {to}")];
    headed.append(&mut diff);

    Verification::Mismatch {
        differing,
        diff: headed,
        truncated,
    }
}

/// Encrypt, decrypt and verify in one go.
///
/// # Errors
///
/// Returns the first error from any of the three steps.
pub fn run_pipeline(paths: &CipherPaths, shifts: Shifts) -> Result<(DecryptReport, Verification)> {
    encrypt_file(&paths.raw, &paths.encrypted, &paths.meta, shifts)?;
    let report = decrypt_file(&paths.encrypted, &paths.decrypted, &paths.meta, shifts)?;
    let verification = verify_files(&paths.raw, &paths.decrypted)?;
    Ok((report, verification))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::init_test_logging;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "coursekit-cipher-{name}-{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn paths_in(dir: &Path) -> CipherPaths {
        CipherPaths {
            raw: dir.join("raw_text.txt"),
            encrypted: dir.join("encrypted_text.txt"),
            meta: dir.join("encrypted_text_meta.json"),
            decrypted: dir.join("decrypted_text.txt"),
        }
    }

    const SAMPLE: &str = "The Quick Brown Fox\njumps over the lazy dog.\nÜnïcödé stays put!\n";

    #[test]
    fn test_pipeline_round_trip() {
        let dir = scratch_dir("pipeline");
        let paths = paths_in(&dir);
        fs::write(&paths.raw, SAMPLE).unwrap();

        let (report, verification) = run_pipeline(&paths, Shifts::new(7, 11)).unwrap();

        assert_eq!(report.method, DecryptMethod::Metadata);
        assert!(report.ambiguities.is_empty());
        assert!(verification.is_match());
        assert_eq!(fs::read_to_string(&paths.decrypted).unwrap(), SAMPLE);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_metadata_file_format() {
        let dir = scratch_dir("meta");
        let paths = paths_in(&dir);
        fs::write(&paths.raw, "aZ!").unwrap();

        encrypt_file(&paths.raw, &paths.encrypted, &paths.meta, Shifts::new(1, 2)).unwrap();

        let meta = fs::read_to_string(&paths.meta).unwrap();
        assert_eq!(meta, r#"["L1","U2","O"]"#);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_encrypt_missing_input() {
        let dir = scratch_dir("missing");
        let paths = paths_in(&dir);

        let err = encrypt_file(&paths.raw, &paths.encrypted, &paths.meta, Shifts::new(1, 1))
            .unwrap_err();
        assert!(err.is_not_found());

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_decrypt_without_metadata_falls_back() {
        init_test_logging();
        let dir = scratch_dir("fallback");
        let paths = paths_in(&dir);
        // Both keys zero: identity mapping, so brute force is exact.
        fs::write(&paths.encrypted, "Hello there").unwrap();

        let report =
            decrypt_file(&paths.encrypted, &paths.decrypted, &paths.meta, Shifts::new(0, 0))
                .unwrap();

        assert_eq!(report.method, DecryptMethod::BruteForce);
        assert!(report.ambiguities.is_empty());
        assert_eq!(fs::read_to_string(&paths.decrypted).unwrap(), "Hello there");

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_decrypt_with_mismatched_metadata_falls_back() {
        init_test_logging();
        let dir = scratch_dir("mismatch");
        let paths = paths_in(&dir);
        fs::write(&paths.encrypted, "abc").unwrap();
        fs::write(&paths.meta, r#"["L1"]"#).unwrap();

        let report =
            decrypt_file(&paths.encrypted, &paths.decrypted, &paths.meta, Shifts::new(0, 0))
                .unwrap();
        assert_eq!(report.method, DecryptMethod::BruteForce);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_decrypt_with_garbage_metadata_falls_back() {
        let dir = scratch_dir("garbage");
        let paths = paths_in(&dir);
        fs::write(&paths.encrypted, "ab").unwrap();
        fs::write(&paths.meta, r#"{"not": "a list"}"#).unwrap();

        let report =
            decrypt_file(&paths.encrypted, &paths.decrypted, &paths.meta, Shifts::new(0, 0))
                .unwrap();
        assert_eq!(report.method, DecryptMethod::BruteForce);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_decrypt_missing_ciphertext() {
        let dir = scratch_dir("nocipher");
        let paths = paths_in(&dir);

        let err = decrypt_file(&paths.encrypted, &paths.decrypted, &paths.meta, Shifts::new(1, 1))
            .unwrap_err();
        assert!(err.is_not_found());

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_verify_reports_differences() {
        let dir = scratch_dir("verify");
        let paths = paths_in(&dir);
        fs::write(&paths.raw, "same\nleft\nsame\n").unwrap();
        fs::write(&paths.decrypted, "same\nright\nsame\nextra\n").unwrap();

        let verification = verify_files(&paths.raw, &paths.decrypted).unwrap();
        match verification {
            Verification::Mismatch {
                differing,
                diff,
                truncated,
            } => {
                assert_eq!(differing, 2);
                assert_eq!(
                    diff,
                    vec![
                        format!("--- {}", paths.raw.display()),
                        format!("+++ {}", paths.decrypted.display()),
                        "-2: left".to_string(),
                        "+2: right".to_string(),
                        "+4: extra".to_string(),
                    ]
                );
                assert!(!truncated);
            }
            Verification::Match => panic!("expected a mismatch"),
        }

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_verification_check() {
        assert!(Verification::Match.check(Path::new("raw_text.txt")).is_ok());

        let mismatch = line_diff("a\nb\n", "a\nc\n", "raw", "dec");
        let err = mismatch.check(Path::new("raw_text.txt")).unwrap_err();
        assert!(err.is_verification_failure());
        assert!(err.to_string().contains("1 differing"));
    }

    #[test]
    fn test_render_verification() {
        assert_eq!(
            render_verification(&Verification::Match),
            "Decryption successful! Decrypted text matches the original.\n"
        );

        let mismatch = line_diff("same\nleft\n", "same\nright\n", "raw.txt", "dec.txt");
        assert_eq!(
            render_verification(&mismatch),
            "Decryption failed: decrypted text does not match original.\n\n\
             --- raw.txt\n+++ dec.txt\n-2: left\n+2: right\n"
        );
    }

    fn ambiguities(count: usize) -> Vec<Ambiguity> {
        (0..count)
            .map(|position| Ambiguity {
                position,
                cipher_char: 'm',
                candidates: vec!['m', 'n'],
            })
            .collect()
    }

    #[test]
    fn test_render_decrypt_report_without_ambiguities() {
        let exact = DecryptReport {
            method: DecryptMethod::Metadata,
            ambiguities: Vec::new(),
        };
        assert_eq!(render_decrypt_report(&exact), "");

        let fallback = DecryptReport {
            method: DecryptMethod::BruteForce,
            ambiguities: Vec::new(),
        };
        assert_eq!(
            render_decrypt_report(&fallback),
            "Metadata unavailable; used brute-force decryption.\n"
        );
    }

    #[test]
    fn test_render_decrypt_report_lists_up_to_limit() {
        let report = DecryptReport {
            method: DecryptMethod::BruteForce,
            ambiguities: ambiguities(AMBIGUITY_PREVIEW_LIMIT),
        };
        let text = render_decrypt_report(&report);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 2 + AMBIGUITY_PREVIEW_LIMIT);
        assert_eq!(
            lines[1],
            "Brute-force decryption produced 20 ambiguous positions (index, cipher, candidates):"
        );
        assert_eq!(lines[2], "  0: 'm' -> ['m', 'n']");
        assert_eq!(lines[21], "  19: 'm' -> ['m', 'n']");
        assert!(!text.contains("more ambiguous"));
    }

    #[test]
    fn test_render_decrypt_report_summarizes_rest() {
        let report = DecryptReport {
            method: DecryptMethod::BruteForce,
            ambiguities: ambiguities(25),
        };
        let text = render_decrypt_report(&report);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 2 + AMBIGUITY_PREVIEW_LIMIT + 1);
        assert!(!text.contains("  20: "));
        assert_eq!(
            lines.last().copied(),
            Some("  ... and 5 more ambiguous positions.")
        );
    }

    #[test]
    fn test_brute_force_decrypt_file_reports_ambiguities() {
        init_test_logging();
        let dir = scratch_dir("ambiguous");
        let paths = paths_in(&dir);
        // With keys (1, 0) both 'm' and 'n' encrypt to 'm', and nothing
        // encrypts to 'z'.
        fs::write(&paths.encrypted, "mz").unwrap();

        let report =
            decrypt_file(&paths.encrypted, &paths.decrypted, &paths.meta, Shifts::new(1, 0))
                .unwrap();

        assert_eq!(report.method, DecryptMethod::BruteForce);
        assert_eq!(
            report.ambiguities,
            vec![
                Ambiguity {
                    position: 0,
                    cipher_char: 'm',
                    candidates: vec!['m', 'n'],
                },
                Ambiguity {
                    position: 1,
                    cipher_char: 'z',
                    candidates: Vec::new(),
                },
            ]
        );
        assert_eq!(fs::read_to_string(&paths.decrypted).unwrap(), "mz");
        assert_eq!(
            render_decrypt_report(&report),
            "Metadata unavailable; used brute-force decryption.\n\
             Brute-force decryption produced 2 ambiguous positions (index, cipher, candidates):\n  \
             0: 'm' -> ['m', 'n']\n  \
             1: 'z' -> []\n"
        );

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_diff_preview_is_capped() {
        let original: String = (0..300).map(|i| format!("line {i}\n")).collect();
        let candidate: String = (0..300).map(|i| format!("LINE {i}\n")).collect();

        match line_diff(&original, &candidate, "raw", "dec") {
            Verification::Mismatch {
                differing,
                diff,
                truncated,
            } => {
                assert_eq!(differing, 300);
                assert_eq!(diff.len(), DIFF_PREVIEW_LIMIT + 2);
                assert_eq!(diff[0], "--- raw");
                assert!(truncated);
            }
            Verification::Match => panic!("expected a mismatch"),
        }
    }
}
