//! Errors raised while reconciling the registries.
//!
//! Every error is fatal for the run: the registries or the curated corrections are not in the
//! expected shape, so no partial table can be trusted.

use thiserror::Error;

use crate::SystemTag;

/// Which of the two registries a record belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RegistryKind {
    /// The BCP 47 language subtag registry.
    Subtag,
    /// The OpenType language system tag registry.
    LanguageSystem,
}

impl std::fmt::Display for RegistryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Subtag => "language subtag",
            Self::LanguageSystem => "language system tag",
        })
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// The registry was loaded without its "last updated" marker.
    #[error("{registry} registry has no header")]
    MissingHeader { registry: RegistryKind },

    /// A record does not have the shape the registry promises.
    #[error("malformed {registry} record `{tag}`: {reason}")]
    MalformedRecord {
        registry: RegistryKind,
        tag: String,
        reason: &'static str,
    },

    /// A variant is used with a language that none of its registered prefixes names.
    #[error("`{language}` is not a valid prefix of variant `{variant}`")]
    InvalidPrefix { language: String, variant: String },

    /// A correction removes a mapping that does not exist.
    #[error("no mapping to remove for `{0}`")]
    MissingMapping(String),

    /// A correction removes an individual language that its macrolanguage does not have.
    #[error("`{member}` is not an individual language of `{macrolanguage}`")]
    MissingMember {
        macrolanguage: String,
        member: String,
    },

    /// A correction or disambiguation names a tag the language system registry does not know.
    #[error("unknown language system tag `{0}`")]
    UnknownSystemTag(SystemTag),

    /// Several locale tags could claim a language system tag and nothing picks one.
    #[error("ambiguous language system tag `{tag}`: {candidates:?}")]
    AmbiguousSystemTag {
        tag: SystemTag,
        candidates: Vec<String>,
    },

    /// A curated disambiguation that the mapping either implies already or cannot honour.
    #[error("invalid disambiguation for `{tag}`: {reason}")]
    InvalidDisambiguation { tag: SystemTag, reason: &'static str },

    /// Re-parenting competing macrolanguages kept producing new conflicts.
    #[error("macrolanguage hierarchy did not settle into a forest")]
    UnsettledMacrolanguages,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
