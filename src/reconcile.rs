use std::collections::BTreeSet;

use crate::corrections::Correction;
use crate::error::{Error, Result};
use crate::{MacrolanguageGraph, Mapping, SubtagRegistry, SystemRegistry, SystemTag};

/// Owns both registries and the mapping between them while it is being built.
///
/// All mutation goes through this type, in a fixed order: [`Reconciler::new`] loads,
/// [`Reconciler::apply`] corrects, [`crate::Inheritance`] propagates across macrolanguages,
/// [`Reconciler::fill_default_language_system`] closes the gaps.
#[derive(Clone, Debug)]
pub struct Reconciler {
    subtags: SubtagRegistry,
    systems: SystemRegistry,
    mapping: Mapping,
    graph: MacrolanguageGraph,
}

impl Reconciler {
    /// Load the mapping the language system registry declares, then the macrolanguage relation
    /// of the subtag registry.
    ///
    /// The relation is built against the loaded mapping since unmapped tags are transparent in
    /// it (see [`MacrolanguageGraph::link`]).
    #[must_use]
    pub fn new(subtags: SubtagRegistry, systems: SystemRegistry) -> Self {
        let mut mapping = Mapping::default();
        for (tag, codes) in systems.codes() {
            for code in codes {
                mapping.insert(code, tag);
            }
        }
        let mut graph = MacrolanguageGraph::default();
        for (macrolanguage, language) in subtags.macrolanguage_links() {
            graph.link(macrolanguage, language, &mapping);
        }
        Self {
            subtags,
            systems,
            mapping,
            graph,
        }
    }

    #[must_use]
    pub const fn subtags(&self) -> &SubtagRegistry {
        &self.subtags
    }

    #[must_use]
    pub const fn systems(&self) -> &SystemRegistry {
        &self.systems
    }

    #[must_use]
    pub const fn mapping(&self) -> &Mapping {
        &self.mapping
    }

    #[must_use]
    pub const fn graph(&self) -> &MacrolanguageGraph {
        &self.graph
    }

    pub(crate) const fn systems_mut(&mut self) -> &mut SystemRegistry {
        &mut self.systems
    }

    /// Reduce the macrolanguage relation to a forest against the current mapping.
    ///
    /// # Errors
    /// See [`MacrolanguageGraph::normalize`].
    pub fn normalize_macrolanguages(&mut self) -> Result<()> {
        self.graph.normalize(&self.mapping)
    }

    /// Map `locale` to `tag` as if the registry said so.
    ///
    /// When `locale` is a macrolanguage with a suffix, e.g. `zh-Hant-MO`, the same suffix is
    /// recorded as a macrolanguage over every individual language (`cmn-Hant-MO`, …) so that
    /// inheritance can reach them.
    pub fn add_mapping(&mut self, locale: &str, tag: SystemTag) {
        self.mapping.insert(locale, tag);
        if self.subtags.is_grandfathered(locale) {
            return;
        }
        let Some((macrolanguage, suffix)) = locale.split_once('-') else {
            return;
        };
        let Some(members) = self.graph.members(macrolanguage) else {
            return;
        };
        let derived = members
            .iter()
            .filter(|language| !self.subtags.is_grandfathered(language))
            .map(|language| format!("{language}-{suffix}"))
            .collect::<BTreeSet<_>>();
        self.graph.replace(locale, derived);
    }

    /// # Errors
    /// [`Error::MissingMapping`] if `tag` maps to nothing.
    pub fn remove_system_tag(&mut self, tag: SystemTag) -> Result<()> {
        self.mapping.remove_system_tag(tag).map(drop)
    }

    /// # Errors
    /// [`Error::MissingMapping`] if `locale` maps to nothing.
    pub fn remove_locale_tag(&mut self, locale: &str) -> Result<()> {
        self.mapping.remove_locale_tag(locale).map(drop)
    }

    fn known(&self, tag: SystemTag) -> Result<SystemTag> {
        if self.systems.contains(tag) {
            Ok(tag)
        } else {
            Err(Error::UnknownSystemTag(tag))
        }
    }

    /// Apply curated corrections in order.
    ///
    /// # Errors
    /// - [`Error::UnknownSystemTag`] when a step names a tag the registry lacks.
    /// - [`Error::MissingMapping`] / [`Error::MissingMember`] when a step removes something that
    ///   is not there. Both mean the correction list is out of date with the registries.
    pub fn apply<'c, I>(&mut self, corrections: I) -> Result<()>
    where
        I: IntoIterator<Item = &'c Correction>,
    {
        for correction in corrections {
            #[cfg(feature = "tracing")]
            tracing::debug!(?correction, "applying correction");
            self.apply_one(correction).inspect_err(|_err| {
                #[cfg(feature = "tracing")]
                tracing::error!(?correction, ?_err, "correction does not fit the registries");
            })?;
        }
        Ok(())
    }

    fn apply_one(&mut self, correction: &Correction) -> Result<()> {
        match correction {
            Correction::Add { locale, tag } => {
                let tag = self.known(*tag)?;
                self.add_mapping(locale, tag);
            }
            Correction::RemoveSystemTag(tag) => self.remove_system_tag(*tag)?,
            Correction::RemoveLocaleTag(locale) => self.remove_locale_tag(locale)?,
            Correction::RankAfter { tag, base } => {
                let (tag, base) = (self.known(*tag)?, self.known(*base)?);
                let rank = self.systems.rank(base).saturating_add(1);
                self.systems.set_rank(tag, rank);
            }
            Correction::BumpRank { tag, by } => {
                let tag = self.known(*tag)?;
                self.systems.bump_rank(tag, *by);
            }
            Correction::SystemName { tag, name } => {
                let tag = self.known(*tag)?;
                self.systems.set_name(tag, name.clone());
            }
            Correction::SystemNameFrom { tag, base, suffix } => {
                let tag = self.known(*tag)?;
                let name = self
                    .systems
                    .name(*base)
                    .ok_or(Error::UnknownSystemTag(*base))?;
                let name = format!("{name}{suffix}");
                self.systems.set_name(tag, name);
            }
            Correction::LocaleName { locale, name } => {
                self.subtags.set_language_name(locale, name.clone());
            }
            Correction::RetireLocale(locale) => {
                self.subtags.set_scope(locale, crate::Scope::RETIRED);
            }
            Correction::Macrolanguage {
                macrolanguage,
                members,
            } => {
                self.graph
                    .replace(macrolanguage, members.iter().cloned().collect());
            }
            Correction::AddMember {
                macrolanguage,
                member,
            } => self.graph.insert_member(macrolanguage, member),
            Correction::RemoveMember {
                macrolanguage,
                member,
            } => self.graph.remove_member(macrolanguage, member)?,
        }
        Ok(())
    }

    /// Map language subtags that share their code with an unmapped three-letter language system
    /// tag to [`SystemTag::DEFAULT`], keeping the table total over such codes.
    ///
    /// [`SystemTag::DEFAULT`] ranks behind every other tag.
    pub fn fill_default_language_system(&mut self) {
        let rank = self.systems.max_rank().saturating_add(1);
        self.systems.set_name(SystemTag::DEFAULT, "*/");
        self.systems.set_rank(SystemTag::DEFAULT, rank);
        let codes = self
            .systems
            .tags()
            .filter(SystemTag::is_three_letter_code)
            .map(|tag| tag.as_str().to_ascii_lowercase())
            .filter(|code| {
                self.subtags.contains_language(code) && !self.mapping.contains_locale(code)
            })
            .collect::<Vec<_>>();
        for code in codes {
            #[cfg(feature = "tracing")]
            tracing::debug!(code, "no language system for a code-identical language");
            self.add_mapping(&code, SystemTag::DEFAULT);
            self.graph.replace(&code, BTreeSet::new());
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::systag;
    use crate::{Inheritance, fixture};
    use pretty_assertions::assert_eq;

    fn set<const N: usize>(tags: [&str; N]) -> BTreeSet<String> {
        tags.into_iter().map(str::to_owned).collect()
    }

    #[test]
    fn loads_registry_mappings_and_macrolanguages() {
        let reconciler = fixture::loaded();
        assert_eq!(
            reconciler.mapping().system_tags("ak").cloned(),
            Some(BTreeSet::from(systag!["AKA", "TWI"]))
        );
        assert_eq!(reconciler.graph().members("ak"), Some(&set(["fat", "tw"])));
        assert_eq!(
            reconciler.graph().members("zh"),
            Some(&set(["cmn", "lzh", "yue"]))
        );
        // `kok` has no mapping yet, but nothing above it either.
        assert_eq!(reconciler.graph().members("kok"), Some(&set(["gom", "knn"])));
        assert!(reconciler.mapping().is_mirrored());
    }

    #[test]
    fn suffixed_macrolanguage_seeds_individual_languages() {
        let mut reconciler = fixture::loaded();
        reconciler.add_mapping("zh-Hant-MO", systag!("ZHH"));
        assert_eq!(
            reconciler.graph().members("zh-Hant-MO"),
            Some(&set(["cmn-Hant-MO", "lzh-Hant-MO", "yue-Hant-MO"]))
        );
        reconciler.add_mapping("en-GB-oed", systag!("ENG"));
        assert!(!reconciler.graph().is_macrolanguage("en-GB-oed"));
    }

    #[test]
    fn corrections_apply_in_order() {
        let mut reconciler = fixture::loaded();
        reconciler.apply(&fixture::corrections().steps).unwrap();
        assert_eq!(
            reconciler.mapping().system_tags("zh").cloned(),
            Some(BTreeSet::from([systag!("ZHS")]))
        );
        assert_eq!(
            reconciler.graph().members("zh-Hant"),
            Some(&set(["cmn-Hant", "lzh-Hant"]))
        );
        assert_eq!(
            reconciler.mapping().system_tags("el-polyton").cloned(),
            Some(BTreeSet::from([systag!("PGR")]))
        );
        assert_eq!(
            reconciler.mapping().system_tags("el").cloned(),
            Some(BTreeSet::from([systag!("ELL")]))
        );
        assert!(reconciler.mapping().is_mirrored());
    }

    #[test]
    fn last_rank_and_name_win() {
        let mut reconciler = fixture::loaded();
        reconciler
            .apply(&[
                Correction::rank_after(systag!("TWI"), systag!("KOK")),
                Correction::BumpRank {
                    tag: systag!("TWI"),
                    by: 3,
                },
                Correction::SystemName {
                    tag: systag!("TWI"),
                    name: "Twi".to_owned(),
                },
                Correction::SystemNameFrom {
                    tag: systag!("TWI"),
                    base: systag!("AKA"),
                    suffix: " (Twi)".to_owned(),
                },
            ])
            .unwrap();
        assert_eq!(reconciler.systems().rank(systag!("TWI")), 8);
        assert_eq!(reconciler.systems().name(systag!("TWI")), Some("Akan (Twi)"));
    }

    #[test]
    fn stale_corrections_are_fatal() {
        let mut reconciler = fixture::loaded();
        assert_eq!(
            reconciler.apply(&[Correction::add("xx", systag!("NOPE"))]),
            Err(Error::UnknownSystemTag(systag!("NOPE")))
        );
        assert_eq!(
            reconciler.apply(&[Correction::RemoveSystemTag(systag!("IPPH"))]),
            Err(Error::MissingMapping("IPPH".to_owned()))
        );
        assert!(matches!(
            reconciler.apply(&[Correction::remove_member("zh", "en")]),
            Err(Error::MissingMember { .. })
        ));
    }

    #[test]
    fn default_language_system_fills_code_identical_languages() {
        let mut reconciler = fixture::loaded();
        let mut inheritance = Inheritance::default();
        inheritance.run(&mut reconciler);
        reconciler.normalize_macrolanguages().unwrap();
        inheritance.run(&mut reconciler);
        reconciler.fill_default_language_system();
        assert_eq!(
            reconciler.mapping().system_tags("fur").cloned(),
            Some(BTreeSet::from([SystemTag::DEFAULT]))
        );
        assert_eq!(reconciler.systems().name(SystemTag::DEFAULT), Some("*/"));
        assert_eq!(
            reconciler.systems().rank(SystemTag::DEFAULT),
            reconciler
                .systems()
                .tags()
                .filter(|t| !t.is_default())
                .map(|t| reconciler.systems().rank(t))
                .max()
                .unwrap()
                + 1
        );
        assert_eq!(reconciler.graph().members("fur"), Some(&BTreeSet::new()));
        // `kok` got `KOK` from its individual languages, so it is left alone.
        assert_eq!(
            reconciler.mapping().system_tags("kok").cloned(),
            Some(BTreeSet::from([systag!("KOK")]))
        );
    }
}
