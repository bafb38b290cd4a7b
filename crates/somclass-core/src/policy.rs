//! Accepted character set for Somali input.
//!
//! The policy is built once and shared read-only by the validator and the
//! normalizer. [`CharacterPolicy::somali()`] returns the process-wide default.

use std::collections::HashSet;
use std::sync::LazyLock;

/// The 23 letters of the Somali Latin alphabet (no `p`, `v` or `z`).
pub const SOMALI_ALPHABET: &str = "abcdefghijklmnoqrstuwxy";

/// Punctuation accepted in input and kept by normalization.
pub const ALLOWED_PUNCTUATION: &str = ",.!?()-'";

/// Punctuation whose repeated runs are collapsed to a single character.
pub const COLLAPSIBLE_PUNCTUATION: &str = ",.!?()-";

static SOMALI_POLICY: LazyLock<CharacterPolicy> = LazyLock::new(|| {
    CharacterPolicy::new(SOMALI_ALPHABET, ALLOWED_PUNCTUATION)
});

/// Immutable set of characters a normalized text may contain.
#[derive(Debug, Clone)]
pub struct CharacterPolicy {
    /// Lowercase letters, punctuation, digits and space.
    allowed: HashSet<char>,
    alphabet: HashSet<char>,
    punctuation: HashSet<char>,
}

impl CharacterPolicy {
    /// Builds a policy from a lowercase alphabet and a punctuation set.
    ///
    /// Uppercase forms of the alphabet are accepted by [`Self::accepts`];
    /// ASCII digits and the space character are always part of the policy.
    pub fn new(alphabet: &str, punctuation: &str) -> Self {
        let alphabet: HashSet<char> = alphabet.chars().flat_map(char::to_lowercase).collect();
        let punctuation: HashSet<char> = punctuation.chars().collect();

        let mut allowed: HashSet<char> = alphabet.union(&punctuation).copied().collect();
        allowed.extend('0'..='9');
        allowed.insert(' ');

        Self {
            allowed,
            alphabet,
            punctuation,
        }
    }

    /// Returns the shared Somali policy.
    pub fn somali() -> &'static CharacterPolicy {
        &SOMALI_POLICY
    }

    /// Returns true if `c` may appear in normalized (lowercase) text.
    pub fn allows(&self, c: char) -> bool {
        self.allowed.contains(&c)
    }

    /// Returns true if `c` is a letter or punctuation mark of the policy,
    /// compared case-insensitively.
    ///
    /// Digits and whitespace are not covered here; the validator skips them
    /// before asking.
    pub fn accepts(&self, c: char) -> bool {
        if self.punctuation.contains(&c) {
            return true;
        }
        let mut lower = c.to_lowercase();
        match (lower.next(), lower.next()) {
            (Some(l), None) => self.alphabet.contains(&l),
            _ => false,
        }
    }
}

impl Default for CharacterPolicy {
    fn default() -> Self {
        Self::somali().clone()
    }
}
