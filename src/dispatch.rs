//! Procedural matching for locale tags that a plain row cannot represent.
//!
//! Entries are tested longest tag first, so `zh-Hant-MO` shadows `zh-Hant` which shadows the
//! `zh` row. Most entries are bucketed by the first character of the locale tag; the rest are
//! tested up front for every tag.

use std::collections::BTreeMap;

use itertools::Itertools;

use crate::error::{Error, Result};
use crate::names::DisplayNames;
use crate::rank::RankedMapping;
use crate::registry::SubtagRegistry;
use crate::{LocaleTag, SystemTag};

/// Bucket of a [`DispatchPlan`] entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DispatchGroup {
    /// Tested for every locale tag, before any bucket.
    Wildcard,
    /// Tested for locale tags starting with this character.
    Initial(char),
}

/// Test on the locale tag after its first character.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LanguageTest {
    /// The whole remainder, for grandfathered tags.
    Exact(String),
    /// The remainder starts with the literal.
    Prefix(String),
    /// The literal is the remainder or a leading run of its subtags.
    Range(String),
}

impl LanguageTest {
    #[must_use]
    pub fn matches(&self, rest: &str) -> bool {
        match self {
            Self::Exact(literal) => rest == literal,
            Self::Prefix(literal) => rest.starts_with(literal.as_str()),
            Self::Range(literal) => rest
                .strip_prefix(literal.as_str())
                .is_some_and(|after| after.is_empty() || after.starts_with('-')),
        }
    }
}

/// Whether `subtag` (with its leading `-`) occurs in `tag` and is not cut off mid-subtag.
fn subtag_matches(tag: &str, subtag: &str) -> bool {
    tag.match_indices(subtag).any(|(at, _)| {
        tag.as_bytes()
            .get(at.saturating_add(subtag.len()))
            .is_none_or(|c| !c.is_ascii_alphanumeric())
    })
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Predicate {
    pub language: Option<LanguageTest>,
    /// Subtags with their leading `-`, all of which must occur.
    pub subtags: Vec<String>,
}

impl Predicate {
    /// Evaluate against a lowercased locale tag.
    #[must_use]
    pub fn matches(&self, tag: &str) -> bool {
        let mut chars = tag.chars();
        chars.next();
        let rest = chars.as_str();
        self.language.as_ref().is_none_or(|test| test.matches(rest))
            && self.subtags.iter().all(|subtag| subtag_matches(tag, subtag))
    }

    fn for_tag(tag: &LocaleTag, group: DispatchGroup) -> Self {
        let dashed = |subtag: Option<&str>| subtag.map(|s| format!("-{s}"));
        if group == DispatchGroup::Wildcard {
            return Self {
                language: None,
                subtags: [tag.script(), tag.region(), tag.variant()]
                    .into_iter()
                    .filter_map(dashed)
                    .collect(),
            };
        }
        let mut chars = tag.language().chars();
        chars.next();
        let rest = chars.as_str();
        if tag.is_grandfathered() {
            return Self {
                language: Some(LanguageTest::Exact(rest.to_owned())),
                subtags: vec![],
            };
        }
        let mut literal = format!("{rest}-");
        let (mut script, mut region) = (tag.script(), tag.region());
        if let Some(s) = script.take() {
            literal.push_str(s);
            if let Some(r) = region.take() {
                literal.push('-');
                literal.push_str(r);
            }
        }
        let language = if literal.ends_with('-') {
            LanguageTest::Prefix(literal)
        } else {
            LanguageTest::Range(literal)
        };
        Self {
            language: Some(language),
            subtags: [script, region, tag.variant()]
                .into_iter()
                .filter_map(dashed)
                .collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DispatchEntry {
    /// The locale tag as mapped.
    pub locale: String,
    /// Names of the locale tag's parts, for comments.
    pub name: String,
    pub predicate: Predicate,
    /// Ranked candidates, best first.
    pub tags: Vec<SystemTag>,
}

/// Ordered tests for complex locale tags. See [`DispatchPlan::plan`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DispatchPlan {
    wildcard: Vec<DispatchEntry>,
    groups: BTreeMap<char, Vec<DispatchEntry>>,
}

impl DispatchPlan {
    /// Plan the complex locale tags of `ranked`.
    ///
    /// A locale tag is complex unless [`LocaleTag::is_simple`]. Those with candidates are sorted
    /// longest first, ties in lexical order, and split into groups keeping that order.
    ///
    /// # Errors
    /// [`Error::InvalidPrefix`] if a tag uses a variant with a language that none of its
    /// registered prefixes start with.
    pub fn plan(
        ranked: &RankedMapping,
        subtags: &SubtagRegistry,
        names: &DisplayNames<'_>,
    ) -> Result<Self> {
        let mut groups = ranked
            .iter()
            .filter(|(_, tags)| !tags.is_empty())
            .map(|(locale, tags)| (LocaleTag::parse(locale, subtags), tags))
            .filter(|(tag, _)| !tag.is_simple(ranked))
            .sorted_by(|(a, _), (b, _)| {
                b.as_str()
                    .len()
                    .cmp(&a.as_str().len())
                    .then_with(|| a.as_str().cmp(b.as_str()))
            })
            .map(|(tag, tags)| {
                check_prefix(&tag, subtags)?;
                let group = tag.group(subtags);
                Ok((
                    group,
                    DispatchEntry {
                        locale: tag.as_str().to_owned(),
                        name: names.locale_name(&tag),
                        predicate: Predicate::for_tag(&tag, group),
                        tags: tags.to_vec(),
                    },
                ))
            })
            .collect::<Result<Vec<_>>>()?
            .into_iter()
            .into_group_map();
        let plan = Self {
            wildcard: groups.remove(&DispatchGroup::Wildcard).unwrap_or_default(),
            groups: groups
                .into_iter()
                .filter_map(|(group, entries)| match group {
                    DispatchGroup::Initial(c) => Some((c, entries)),
                    DispatchGroup::Wildcard => None,
                })
                .collect(),
        };
        #[cfg(feature = "tracing")]
        tracing::debug!(
            wildcard = plan.wildcard.len(),
            buckets = plan.groups.len(),
            "planned complex locale tags"
        );
        Ok(plan)
    }

    /// Entries tested for every locale tag.
    #[must_use]
    pub fn wildcard(&self) -> &[DispatchEntry] {
        &self.wildcard
    }

    /// Entries tested for locale tags starting with `initial`.
    #[must_use]
    pub fn group(&self, initial: char) -> &[DispatchEntry] {
        self.groups
            .get(&initial)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Every entry in evaluation order, with its group.
    pub fn entries(&self) -> impl Iterator<Item = (DispatchGroup, &DispatchEntry)> {
        self.wildcard
            .iter()
            .map(|e| (DispatchGroup::Wildcard, e))
            .chain(self.groups.iter().flat_map(|(c, entries)| {
                entries.iter().map(|e| (DispatchGroup::Initial(*c), e))
            }))
    }

    /// Candidates of the first entry matching `tag`, if any.
    ///
    /// ```
    /// # use ot_lang_table::DispatchPlan;
    /// assert_eq!(DispatchPlan::default().resolve("zh-Hant"), None);
    /// ```
    #[must_use]
    pub fn resolve(&self, tag: &str) -> Option<&[SystemTag]> {
        let tag = tag.to_ascii_lowercase();
        let initial = tag.chars().next()?;
        self.wildcard
            .iter()
            .chain(self.group(initial))
            .find(|entry| entry.predicate.matches(&tag))
            .map(|entry| entry.tags.as_slice())
    }
}

fn check_prefix(tag: &LocaleTag, subtags: &SubtagRegistry) -> Result<()> {
    let Some(variant) = tag.variant() else {
        return Ok(());
    };
    let Some(prefixes) = subtags.prefixes(variant) else {
        return Ok(());
    };
    // Only the primary subtag of a prefix counts, so `sl-rozaj` admits `sl-biske`.
    if prefixes
        .iter()
        .any(|prefix| prefix.split('-').next() == Some(tag.language()))
    {
        return Ok(());
    }
    #[cfg(feature = "tracing")]
    tracing::error!(tag = tag.as_str(), ?prefixes, "variant used with a foreign language");
    Err(Error::InvalidPrefix {
        language: tag.language().to_owned(),
        variant: variant.to_owned(),
    })
}
