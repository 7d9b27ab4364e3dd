//! The reverse direction: one locale tag to stand for each language system tag.
//!
//! Most language system tags are preferred by a single locale tag and need no help. When
//! several locale tags prefer the same language system tag, the one that had it before
//! inheritance wins, else the only macrolanguage, else the only collection. Anything still
//! ambiguous must be settled by a curated [`Disambiguation`] entry, and curated entries that are
//! not needed are rejected so the list cannot rot.

use std::collections::BTreeMap;

use itertools::Itertools;

use crate::error::{Error, Result};
use crate::mapping::Uninherited;
use crate::rank::RankedMapping;
use crate::registry::Namespace;
use crate::table::same_tag;
use crate::{Disambiguation, Reconciler, SystemTag};

const fn invalid(tag: SystemTag, reason: &'static str) -> Error {
    Error::InvalidDisambiguation { tag, reason }
}

/// Pick the representative among several locale tags that prefer the same language system tag.
fn choose<'a>(
    primary: &[&'a str],
    reconciler: &Reconciler,
    uninherited: &Uninherited,
) -> Option<&'a str> {
    let subtags = reconciler.subtags();
    let only = |pred: &dyn Fn(&str) -> bool| {
        primary
            .iter()
            .copied()
            .filter(|locale| pred(locale))
            .exactly_one()
            .ok()
    };
    only(&|l| uninherited.contains_key(l) && !subtags.is_retired(l))
        .or_else(|| only(&|l| subtags.scope(Namespace::Language, l).is_macrolanguage()))
        .or_else(|| only(&|l| subtags.scope(Namespace::Language, l).is_collection()))
}

/// Locale tags that only a curated or derived entry can make the reverse lookup of.
///
/// The result holds an entry for each language system tag whose representative is not simply
/// the lexically first locale tag mapped to it.
///
/// # Errors
/// - [`Error::AmbiguousSystemTag`] when nothing picks a representative and `curated` is silent.
/// - [`Error::InvalidDisambiguation`] when `curated` names a tag that needs no entry, or a locale
///   tag not mapped to it.
/// - [`Error::UnknownSystemTag`] when `curated` names a tag nothing maps to.
pub fn disambiguate(
    reconciler: &Reconciler,
    ranked: &RankedMapping,
    uninherited: &Uninherited,
    curated: &Disambiguation,
) -> Result<BTreeMap<SystemTag, String>> {
    let subtags = reconciler.subtags();
    let mut resolved = BTreeMap::new();
    for (tag, locales) in reconciler.mapping().systems() {
        let curated_locale = curated.0.get(&tag);
        let primary = if tag.is_default() {
            vec![]
        } else {
            locales
                .iter()
                .filter(|l| !subtags.is_grandfathered(l) && ranked.preferred(l) == Some(tag))
                .map(String::as_str)
                .collect()
        };
        match primary.as_slice() {
            [] => {
                if curated_locale.is_some() {
                    return Err(invalid(tag, "no locale tag prefers it"));
                }
            }
            [only] => {
                if curated_locale.is_some() {
                    return Err(invalid(tag, "a single locale tag prefers it already"));
                }
                let first = locales.iter().find(|l| !subtags.is_grandfathered(l));
                if only.contains('-') || first.map(String::as_str) != Some(*only) {
                    resolved.insert(tag, (*only).to_owned());
                }
            }
            several => {
                let chosen = match (curated_locale, choose(several, reconciler, uninherited)) {
                    (Some(locale), _) if !locales.contains(locale) => {
                        return Err(invalid(tag, "the locale tag is not mapped to it"));
                    }
                    (Some(locale), _) => locale.clone(),
                    (None, Some(locale)) => locale.to_owned(),
                    (None, None) => {
                        #[cfg(feature = "tracing")]
                        tracing::error!(%tag, ?several, "ambiguous language system tag");
                        return Err(Error::AmbiguousSystemTag {
                            tag,
                            candidates: several.iter().map(|l| (*l).to_owned()).collect(),
                        });
                    }
                };
                let first_different = locales
                    .iter()
                    .find(|l| !same_tag(l, ranked.get(l).unwrap_or_default()));
                if chosen.contains('-') || first_different != Some(&chosen) {
                    resolved.insert(tag, chosen);
                }
            }
        }
    }
    if let Some(tag) = curated
        .0
        .keys()
        .find(|tag| reconciler.mapping().locale_tags(**tag).is_none())
    {
        return Err(Error::UnknownSystemTag(*tag));
    }
    Ok(resolved)
}
