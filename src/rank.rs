use std::collections::BTreeMap;

use itertools::Itertools;

use crate::{Corrections, Mapping, SystemRegistry, SystemTag};

/// Every locale tag with its language system tags, best first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RankedMapping(BTreeMap<String, Vec<SystemTag>>);

impl RankedMapping {
    /// Order each locale tag's candidates by rank, adjusted per locale tag, then by tag.
    ///
    /// Lower ranks come first: a tag covering fewer ISO 639 codes is more specific.
    #[must_use]
    pub fn sort(mapping: &Mapping, systems: &SystemRegistry, corrections: &Corrections) -> Self {
        Self(
            mapping
                .locales()
                .map(|(locale, tags)| {
                    let ranked = tags
                        .iter()
                        .copied()
                        .sorted_by_key(|tag| {
                            let delta = corrections.delta(locale, *tag);
                            (systems.rank(*tag).saturating_add(delta), *tag)
                        })
                        .collect();
                    (locale.to_owned(), ranked)
                })
                .collect(),
        )
    }

    #[must_use]
    pub fn get(&self, locale: &str) -> Option<&[SystemTag]> {
        self.0.get(locale).map(Vec::as_slice)
    }

    /// The best language system tag for `locale`.
    #[must_use]
    pub fn preferred(&self, locale: &str) -> Option<SystemTag> {
        self.get(locale).and_then(|tags| tags.first()).copied()
    }

    /// Locale tags in lexical order with their ranked candidates.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[SystemTag])> {
        self.0.iter().map(|(l, tags)| (l.as_str(), tags.as_slice()))
    }
}
