//! Structural view of a BCP 47 locale tag.
//!
//! This is deliberately not a validating parser: the heuristics below only need to recognise
//! the tags that appear in the registries, and anything unusual ends up in the language subtag.

use unic_langid::subtags::{Region, Script};

use crate::dispatch::DispatchGroup;
use crate::rank::RankedMapping;
use crate::registry::SubtagRegistry;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocaleTag {
    tag: String,
    subtags: Vec<String>,
    language: String,
    script: Option<String>,
    region: Option<String>,
    variant: Option<String>,
    grandfathered: bool,
}

fn starts_with_digit(subtag: &str) -> bool {
    subtag.starts_with(|c: char| c.is_ascii_digit())
}

impl LocaleTag {
    /// Split `tag` into lowercase subtags and pick out its parts.
    ///
    /// A tag registered as grandfathered is kept whole as its language.
    ///
    /// ```
    /// # use ot_lang_table::{LocaleTag, SubtagRegistry};
    /// let tag = LocaleTag::parse("zh-Hant-MO", &SubtagRegistry::default());
    /// assert_eq!(tag.language(), "zh");
    /// assert_eq!(tag.script(), Some("hant"));
    /// assert_eq!(tag.region(), Some("mo"));
    /// assert_eq!(tag.variant(), None);
    /// ```
    #[must_use]
    pub fn parse(tag: &str, registry: &SubtagRegistry) -> Self {
        let lower = tag.to_ascii_lowercase();
        let subtags = lower.split('-').map(str::to_owned).collect::<Vec<_>>();
        if registry.is_grandfathered(&lower) {
            return Self {
                tag: tag.to_owned(),
                subtags,
                language: lower,
                script: None,
                region: None,
                variant: None,
                grandfathered: true,
            };
        }
        let find = |skip: usize, pred: fn(&str) -> bool| {
            subtags
                .iter()
                .skip(skip)
                .find(|s| pred(s))
                .cloned()
        };
        Self {
            tag: tag.to_owned(),
            language: subtags.first().cloned().unwrap_or_default(),
            script: find(0, |s| s.len() == 4 && !starts_with_digit(s)),
            region: find(1, |s| {
                (s.len() == 2 && !starts_with_digit(s)) || (s.len() == 3 && starts_with_digit(s))
            }),
            variant: find(0, |s| s.len() > 4 || (s.len() == 4 && starts_with_digit(s))),
            subtags,
            grandfathered: false,
        }
    }

    /// The tag as it was given, case preserved.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.tag
    }

    #[must_use]
    pub fn subtags(&self) -> &[String] {
        &self.subtags
    }

    #[must_use]
    pub fn language(&self) -> &str {
        &self.language
    }

    #[must_use]
    pub fn script(&self) -> Option<&str> {
        self.script.as_deref()
    }

    #[must_use]
    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    #[must_use]
    pub fn variant(&self) -> Option<&str> {
        self.variant.as_deref()
    }

    #[must_use]
    pub const fn is_grandfathered(&self) -> bool {
        self.grandfathered
    }

    /// The script subtag in its canonical title case, e.g. `Hant`.
    #[must_use]
    pub fn canonical_script(&self) -> Option<String> {
        let script = self.script()?;
        Some(
            script
                .parse::<Script>()
                .map_or_else(|_| script.to_owned(), |s| s.to_string()),
        )
    }

    /// The region subtag in its canonical upper case, e.g. `MO`.
    #[must_use]
    pub fn canonical_region(&self) -> Option<String> {
        let region = self.region()?;
        Some(
            region
                .parse::<Region>()
                .map_or_else(|_| region.to_ascii_uppercase(), |r| r.to_string()),
        )
    }

    /// Whether a plain row keyed by the primary subtag can stand for this tag.
    ///
    /// Only single subtags qualify, plus grandfathered tags that resolve exactly like their
    /// first subtag and do not carry an extended language subtag.
    #[must_use]
    pub fn is_simple(&self, ranked: &RankedMapping) -> bool {
        if self.subtags.len() == 1 {
            return true;
        }
        if !self.grandfathered || self.subtags.get(1).is_some_and(|s| s.len() == 3) {
            return false;
        }
        let first = self
            .subtags
            .first()
            .and_then(|s| ranked.get(s))
            .unwrap_or_default();
        first == ranked.get(&self.tag).unwrap_or_default()
    }

    /// Where the tag's test goes in a [`crate::DispatchPlan`].
    ///
    /// Tags that cannot be recognised by their first letter, `und-…` and variants with a single
    /// registered prefix, are tested before any letter bucket.
    #[must_use]
    pub fn group(&self, registry: &SubtagRegistry) -> DispatchGroup {
        let single_prefix = self
            .variant()
            .and_then(|variant| registry.prefixes(variant))
            .is_some_and(|prefixes| prefixes.len() == 1);
        if self.language == "und" || single_prefix {
            return DispatchGroup::Wildcard;
        }
        self.language
            .chars()
            .next()
            .map_or(DispatchGroup::Wildcard, DispatchGroup::Initial)
    }
}

/// The lowercased subtags joined with `-`.
impl std::fmt::Display for LocaleTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.subtags.join("-"))
    }
}
