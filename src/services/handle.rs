// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Channel handle generation.

use sha2::{Digest, Sha256};

/// Derive a public channel handle from the name claims.
///
/// Deterministic: the same name pair always yields the same handle. The
/// four-character suffix is taken from a hash of the normalized names so
/// handles stay distinguishable without a store round-trip.
pub fn generate_channel_handle(given_name: &str, family_name: &str) -> String {
    let given = normalize(given_name);
    let family = normalize(family_name);

    let base = if given.is_empty() && family.is_empty() {
        "Creator".to_string()
    } else {
        format!("{given}{family}")
    };

    let digest = Sha256::digest(format!("{given} {family}").to_lowercase());
    let suffix = &hex::encode(digest)[..4];

    format!("@{base}{suffix}")
}

/// Keep alphanumerics, capitalize the first letter.
fn normalize(name: &str) -> String {
    let cleaned: String = name.chars().filter(|c| c.is_alphanumeric()).collect();
    let mut chars = cleaned.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_is_deterministic() {
        let first = generate_channel_handle("Ann", "Lee");
        let second = generate_channel_handle("Ann", "Lee");
        assert_eq!(first, second);
    }

    #[test]
    fn test_handle_shape() {
        let handle = generate_channel_handle("Ann", "Lee");
        assert!(handle.starts_with("@AnnLee"));
        assert_eq!(handle.len(), "@AnnLee".len() + 4);
    }

    #[test]
    fn test_non_alphanumerics_stripped() {
        let handle = generate_channel_handle("mary jane", "o'brien");
        assert!(handle.starts_with("@MaryjaneObrien"));
    }

    #[test]
    fn test_empty_names_fall_back() {
        let handle = generate_channel_handle("", "");
        assert!(handle.starts_with("@Creator"));
    }

    #[test]
    fn test_different_names_differ() {
        assert_ne!(
            generate_channel_handle("Ann", "Lee"),
            generate_channel_handle("Ben", "Lee")
        );
    }
}
