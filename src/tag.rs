use crate::error::{Error, RegistryKind, Result};

/// An OpenType language system tag, right-padded with spaces to four bytes.
///
/// Ordering is bytewise on the padded form, which matches ordering the unpadded strings since
/// every tag character sorts after the padding space. [`SystemTag::DEFAULT`] sorts first.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SystemTag([u8; 4]);

impl SystemTag {
    /// The "no language system" tag: the font's default language system applies.
    pub const DEFAULT: Self = Self([0; 4]);

    #[must_use]
    pub const fn new(bytes: &[u8; 4]) -> Self {
        Self(*bytes)
    }

    /// Build a tag from a literal of one to four characters, padding with spaces.
    ///
    /// This is what [`crate::systag!`] expands to; invalid literals fail at compile time there.
    ///
    /// # Panics
    /// If `tag` is empty or longer than four bytes.
    #[must_use]
    pub const fn from_literal(tag: &str) -> Self {
        match tag.as_bytes() {
            [a] => Self([*a, b' ', b' ', b' ']),
            [a, b] => Self([*a, *b, b' ', b' ']),
            [a, b, c] => Self([*a, *b, *c, b' ']),
            [a, b, c, d] => Self([*a, *b, *c, *d]),
            _ => panic!("a language system tag has one to four characters"),
        }
    }

    /// Parse a tag as it appears in the registry, surrounding whitespace and quotes ignored.
    ///
    /// # Errors
    /// [`Error::MalformedRecord`] if the tag is empty, longer than four bytes, or not printable
    /// ASCII.
    pub fn parse(tag: &str) -> Result<Self> {
        let trimmed = tag.trim_matches(|c: char| c.is_ascii_whitespace() || c == '\'');
        let malformed = |reason| Error::MalformedRecord {
            registry: RegistryKind::LanguageSystem,
            tag: tag.to_owned(),
            reason,
        };
        if trimmed.is_empty() {
            return Err(malformed("empty tag"));
        }
        if trimmed.len() > 4 {
            return Err(malformed("tag is longer than four characters"));
        }
        if !trimmed.bytes().all(|b| b.is_ascii_graphic()) {
            return Err(malformed("tag is not printable ASCII"));
        }
        let mut bytes = [b' '; 4];
        for (slot, b) in bytes.iter_mut().zip(trimmed.bytes()) {
            *slot = b;
        }
        Ok(Self(bytes))
    }

    #[must_use]
    pub const fn is_default(&self) -> bool {
        matches!(self.0, [0, 0, 0, 0])
    }

    #[must_use]
    pub const fn to_bytes(self) -> [u8; 4] {
        self.0
    }

    /// The tag without its padding. Empty for [`SystemTag::DEFAULT`].
    #[must_use]
    pub fn as_str(&self) -> &str {
        if self.is_default() {
            return "";
        }
        std::str::from_utf8(&self.0).map_or("", |s| s.trim_end_matches(' '))
    }

    /// Whether the tag is exactly three uppercase ASCII letters, the shape shared with ISO 639-3
    /// codes.
    #[must_use]
    pub fn is_three_letter_code(&self) -> bool {
        let s = self.as_str();
        s.len() == 3 && s.bytes().all(|b| b.is_ascii_uppercase())
    }
}

impl std::fmt::Display for SystemTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::fmt::Debug for SystemTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_default() {
            return f.write_str("SystemTag::DEFAULT");
        }
        write!(f, "SystemTag({:?})", self.as_str())
    }
}

impl std::str::FromStr for SystemTag {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
