#![warn(missing_docs)]
//! `blockpad-lang` - language tag helpers for `blockpad-core` blocks.
//!
//! This crate intentionally stays lightweight and does **not** resolve language modes or depend on
//! any highlighting system. A block only carries a language *name* plus an auto-detect flag; this
//! crate provides the small structs hosts use to build, compare and default those tags.

/// Language token used when nothing else is configured.
pub const DEFAULT_LANGUAGE_TOKEN: &str = "text";

/// Suffix appended to a language token when the language was auto-detected.
pub const AUTO_DETECT_SUFFIX: &str = "-a";

/// The language tag stored in a block delimiter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlockLanguage {
    /// Language name (e.g. `text`, `python`, `math`).
    pub name: String,
    /// `true` if the language was inferred rather than chosen by the user.
    pub auto: bool,
}

impl BlockLanguage {
    /// Create a language tag.
    pub fn new(name: impl Into<String>, auto: bool) -> Self {
        Self {
            name: name.into(),
            auto,
        }
    }

    /// Create a tag for a language the user picked explicitly.
    pub fn fixed(name: impl Into<String>) -> Self {
        Self::new(name, false)
    }

    /// Create a tag for an auto-detected language.
    pub fn auto_detected(name: impl Into<String>) -> Self {
        Self::new(name, true)
    }

    /// Parse a delimiter token such as `python-a` or `markdown`.
    ///
    /// A trailing [`AUTO_DETECT_SUFFIX`] sets `auto`; it is only stripped when something remains in
    /// front of it, so a bare `-a` is read as a name.
    pub fn from_token(token: &str) -> Self {
        match token.strip_suffix(AUTO_DETECT_SUFFIX) {
            Some(name) if !name.is_empty() => Self::new(name, true),
            _ => Self::new(token, false),
        }
    }

    /// Format the tag as it appears after the delimiter marker.
    pub fn token(&self) -> String {
        if self.auto {
            format!("{}{}", self.name, AUTO_DETECT_SUFFIX)
        } else {
            self.name.clone()
        }
    }

    /// Returns a copy with a different auto-detect flag, keeping the name.
    pub fn with_auto(&self, auto: bool) -> Self {
        Self::new(self.name.clone(), auto)
    }
}

impl Default for BlockLanguage {
    fn default() -> Self {
        BlockDefaults::default().language()
    }
}

impl std::fmt::Display for BlockLanguage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.token())
    }
}

/// Defaults applied to blocks that do not inherit a language.
///
/// New blocks created by "add block before/after" commands, the replacement block written when
/// the last block is deleted, and the implicit block of a document without delimiters all use
/// these values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockDefaults {
    /// Default language token (e.g. `text`).
    pub token: String,
    /// Default auto-detect flag.
    pub auto_detect: bool,
}

impl BlockDefaults {
    /// Create defaults from a token and auto-detect flag.
    pub fn new(token: impl Into<String>, auto_detect: bool) -> Self {
        Self {
            token: token.into(),
            auto_detect,
        }
    }

    /// The default language as a [`BlockLanguage`].
    pub fn language(&self) -> BlockLanguage {
        BlockLanguage::new(self.token.clone(), self.auto_detect)
    }

    /// Returns `true` if a non-empty default token is configured.
    pub fn has_token(&self) -> bool {
        !self.token.is_empty()
    }
}

impl Default for BlockDefaults {
    fn default() -> Self {
        Self::new(DEFAULT_LANGUAGE_TOKEN, true)
    }
}
