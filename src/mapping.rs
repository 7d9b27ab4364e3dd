use std::borrow::Borrow;
use std::collections::{BTreeMap, BTreeSet};

use crate::SystemTag;
use crate::error::{Error, Result};

/// Locale tag → language system tags, as an unordered snapshot.
pub type Uninherited = BTreeMap<String, BTreeSet<SystemTag>>;

/// The many-to-many relation between locale tags and language system tags.
///
/// Both directions are kept and every edge has its mirror; empty entries are dropped so
/// "has a mapping" and "has an entry" mean the same thing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Mapping {
    to_locale: BTreeMap<SystemTag, BTreeSet<String>>,
    from_locale: BTreeMap<String, BTreeSet<SystemTag>>,
}

impl Mapping {
    /// Add the edge in both directions. Returns whether it is new.
    pub fn insert(&mut self, locale: &str, tag: SystemTag) -> bool {
        let added = self
            .to_locale
            .entry(tag)
            .or_default()
            .insert(locale.to_owned());
        self.from_locale
            .entry(locale.to_owned())
            .or_default()
            .insert(tag);
        added
    }

    /// Drop every edge of a language system tag.
    ///
    /// # Errors
    /// [`Error::MissingMapping`] if the tag maps to nothing.
    pub fn remove_system_tag(&mut self, tag: SystemTag) -> Result<BTreeSet<String>> {
        let locales = self
            .to_locale
            .remove(&tag)
            .ok_or_else(|| Error::MissingMapping(tag.to_string()))?;
        for locale in &locales {
            detach(&mut self.from_locale, locale, &tag);
        }
        Ok(locales)
    }

    /// Drop every edge of a locale tag.
    ///
    /// # Errors
    /// [`Error::MissingMapping`] if the locale tag maps to nothing.
    pub fn remove_locale_tag(&mut self, locale: &str) -> Result<BTreeSet<SystemTag>> {
        let tags = self
            .from_locale
            .remove(locale)
            .ok_or_else(|| Error::MissingMapping(locale.to_owned()))?;
        for tag in &tags {
            detach(&mut self.to_locale, tag, locale);
        }
        Ok(tags)
    }

    #[must_use]
    pub fn system_tags(&self, locale: &str) -> Option<&BTreeSet<SystemTag>> {
        self.from_locale.get(locale)
    }

    #[must_use]
    pub fn locale_tags(&self, tag: SystemTag) -> Option<&BTreeSet<String>> {
        self.to_locale.get(&tag)
    }

    #[must_use]
    pub fn contains_locale(&self, locale: &str) -> bool {
        self.from_locale.contains_key(locale)
    }

    /// Every locale tag with its language system tags, in locale tag order.
    pub fn locales(&self) -> impl Iterator<Item = (&str, &BTreeSet<SystemTag>)> {
        self.from_locale.iter().map(|(l, tags)| (l.as_str(), tags))
    }

    /// Every language system tag with its locale tags, in tag order.
    pub fn systems(&self) -> impl Iterator<Item = (SystemTag, &BTreeSet<String>)> {
        self.to_locale.iter().map(|(tag, locales)| (*tag, locales))
    }

    #[must_use]
    pub fn snapshot(&self) -> Uninherited {
        self.from_locale.clone()
    }

    /// Whether every edge has its mirror.
    #[must_use]
    pub fn is_mirrored(&self) -> bool {
        let forward = self.to_locale.iter().all(|(tag, locales)| {
            !locales.is_empty()
                && locales
                    .iter()
                    .all(|l| self.from_locale.get(l).is_some_and(|t| t.contains(tag)))
        });
        let backward = self.from_locale.iter().all(|(locale, tags)| {
            !tags.is_empty()
                && tags
                    .iter()
                    .all(|t| self.to_locale.get(t).is_some_and(|l| l.contains(locale)))
        });
        forward && backward
    }
}

fn detach<K, V, KQ, VQ>(map: &mut BTreeMap<K, BTreeSet<V>>, key: &KQ, value: &VQ)
where
    K: Ord + Borrow<KQ>,
    V: Ord + Borrow<VQ>,
    KQ: Ord + ?Sized,
    VQ: Ord + ?Sized,
{
    if let Some(values) = map.get_mut(key) {
        values.remove(value);
        if values.is_empty() {
            map.remove(key);
        }
    }
}
