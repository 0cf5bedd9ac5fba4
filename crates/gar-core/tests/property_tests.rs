//! Property-based tests for the encryption stream and the path guard.
//!
//! These tests use proptest to generate arbitrary inputs and verify
//! security properties hold across a wide range of cases.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use gar_core::Password;
use gar_core::crypto::DecryptingReader;
use gar_core::crypto::EncryptingWriter;
use gar_core::security::PathGuard;
use gar_core::types::DestDir;
use proptest::prelude::*;
use std::io::Read;
use std::io::Write;
use tempfile::TempDir;

fn create_test_dest() -> (TempDir, PathGuard) {
    let temp = TempDir::new().expect("failed to create temp dir");
    let dest = DestDir::new(temp.path()).expect("failed to create dest");
    (temp, PathGuard::new(dest))
}

fn seal(password: &Password, writes: &[Vec<u8>]) -> Vec<u8> {
    let mut writer = EncryptingWriter::new(Vec::new(), password).unwrap();
    for chunk in writes {
        writer.write_all(chunk).unwrap();
    }
    writer.finish().unwrap()
}

proptest! {
    // Key derivation is deliberately slow; keep the case count modest.
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// Any sequence of writes decrypts back to its concatenation.
    #[test]
    fn prop_encryption_round_trip(
        writes in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..70_000), 0..4)
    ) {
        let password = Password::new("prop-secret");
        let sealed = seal(&password, &writes);

        let mut reader = DecryptingReader::new(&sealed[..], &password).unwrap();
        let mut plain = Vec::new();
        reader.read_to_end(&mut plain).unwrap();

        prop_assert_eq!(plain, writes.concat());
    }

    /// A different password never yields a single plaintext byte.
    #[test]
    fn prop_wrong_password_leaks_nothing(
        payload in prop::collection::vec(any::<u8>(), 1..5_000),
        wrong in "[a-z]{1,12}"
    ) {
        prop_assume!(wrong != "right");
        let sealed = seal(&Password::new("right"), &[payload]);

        let mut reader = DecryptingReader::new(&sealed[..], &Password::new(wrong)).unwrap();
        let mut buf = [0u8; 256];
        prop_assert!(reader.read(&mut buf).is_err());
    }
}

proptest! {
    /// Names with a `..` segment are always rejected.
    #[test]
    fn prop_parent_traversal_rejected(
        prefix in "([a-z]+/){0,5}",
        suffix in "([a-z]+/?){0,5}"
    ) {
        let (_temp, guard) = create_test_dest();
        let name = format!("{prefix}../{suffix}");
        prop_assert!(guard.resolve(&name).is_err());
    }

    /// Whatever the name, an accepted path lies inside the root.
    #[test]
    fn prop_resolved_path_stays_inside(
        parts in prop::collection::vec(prop_oneof![
            "[a-zA-Z0-9_-]{1,8}",
            Just(".".to_string()),
            Just("..".to_string()),
            Just(String::new()),
        ], 1..6),
        absolute in any::<bool>()
    ) {
        let (_temp, guard) = create_test_dest();
        let joined = parts.join("/");
        let name = if absolute { format!("/{joined}") } else { joined };

        if let Ok(resolved) = guard.resolve(&name) {
            prop_assert!(resolved.starts_with(guard.root().as_path()));
            prop_assert!(!name.starts_with('/'));
            prop_assert!(!parts.iter().any(|p| p == ".."));
        }
    }

    /// Plain relative names are accepted.
    #[test]
    fn prop_valid_relative_paths_accepted(
        components in prop::collection::vec("[a-zA-Z0-9_-]{1,20}", 1..5)
    ) {
        let (_temp, guard) = create_test_dest();
        prop_assert!(guard.resolve(&components.join("/")).is_ok());
    }
}
