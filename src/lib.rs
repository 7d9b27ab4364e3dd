//! `ot_lang_table`: Reconcile BCP 47 subtags with OpenType language system tags
//!
//! ## Intentions
//!
//! Text shaping engines pick a font's language system from the locale of the text, but the two
//! vocabularies come from unrelated registries that disagree, overlap and lag behind each other.
//! This crate merges both registries into one deterministic mapping and derives what a shaper
//! needs from it: a table of rows for plain language subtags, an ordered plan of tests for
//! everything more specific, and a reverse pick for every language system tag.
//!
//! Get started by [`TableGenerator`] and [`systag!`].
//!
//! ## 📃 License
//!
//! `GPL-3.0-or-later`
//!
//!    Copyright (C) 2025  madonuko <mado@fyralabs.com> <madonuko@outlook.com>
//!
//!    This program is free software: you can redistribute it and/or modify
//!    it under the terms of the GNU General Public License as published by
//!    the Free Software Foundation, either version 3 of the License, or
//!    (at your option) any later version.
//!
//!    This program is distributed in the hope that it will be useful,
//!    but WITHOUT ANY WARRANTY; without even the implied warranty of
//!    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
//!    GNU General Public License for more details.
//!
//!    You should have received a copy of the GNU General Public License
//!    along with this program.  If not, see <https://www.gnu.org/licenses/>.

pub mod corrections;
pub mod disambiguation;
pub mod dispatch;
pub mod error;
pub mod inherit;
pub mod locale;
pub mod macrolanguage;
pub mod macros;
pub mod mapping;
pub mod names;
pub mod rank;
pub mod reconcile;
pub mod registry;
pub mod table;
pub mod tag;

#[cfg(test)]
mod fixture;

use std::collections::BTreeMap;

pub use corrections::{Correction, Corrections, Disambiguation};
pub use dispatch::{DispatchEntry, DispatchGroup, DispatchPlan, LanguageTest, Predicate};
pub use error::{Error, Result};
pub use inherit::Inheritance;
pub use locale::LocaleTag;
pub use macrolanguage::MacrolanguageGraph;
pub use mapping::{Mapping, Uninherited};
pub use rank::RankedMapping;
pub use reconcile::Reconciler;
pub use registry::{Scope, SubtagRegistry, SystemRegistry};
pub use table::{LangTagRow, ResolutionTable};
pub use tag::SystemTag;
pub use unic_langid::{self, LanguageIdentifier};

/// Entry point of `ot_lang_table`.
///
/// The [`Default`] generator carries the curated corrections maintained for the published
/// registries; they refer to real tags and fail loudly against anything else. Use
/// [`TableGenerator::new`] for custom or partial registries.
///
/// # Examples
/// ```
/// use ot_lang_table::registry::{ScopeKind, SubtagRecord, SystemTagRecord};
/// use ot_lang_table::{
///     Corrections, Disambiguation, SubtagRegistry, SystemRegistry, TableGenerator, systag,
/// };
///
/// let subtags = SubtagRegistry::from_records(
///     "File-Date: 2024-01-01",
///     [
///         SubtagRecord::language("sq").description("Albanian").scope(ScopeKind::Macrolanguage),
///         SubtagRecord::language("als").description("Tosk Albanian").macrolanguage("sq"),
///     ],
/// )?;
/// let systems = SystemRegistry::from_records(
///     "<meta name=\"updated_at\" content=\"2024-01-01\">",
///     [SystemTagRecord::new(systag!("SQI"), "Albanian").codes(["sqi"])],
/// )?;
/// let generator = TableGenerator::new(Corrections::empty(), Disambiguation::empty());
/// let generated = generator.generate(subtags, systems)?;
/// assert_eq!(generated.table.resolve("als"), [systag!("SQI")]);
/// assert_eq!(generated.disambiguation.get(&systag!("SQI")).map(String::as_str), Some("sq"));
/// # Ok::<(), ot_lang_table::Error>(())
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TableGenerator {
    pub corrections: Corrections,
    pub disambiguation: Disambiguation,
}

impl TableGenerator {
    #[must_use]
    pub const fn new(corrections: Corrections, disambiguation: Disambiguation) -> Self {
        Self {
            corrections,
            disambiguation,
        }
    }

    /// Merge both registries into one ranked mapping.
    ///
    /// The stages run in a fixed order: corrections, inheritance, macrolanguage normalization,
    /// inheritance again, then the default language system fill.
    ///
    /// # Errors
    /// Whatever a stage finds wrong with the registries or the corrections; see [`Error`].
    pub fn reconcile(&self, subtags: SubtagRegistry, systems: SystemRegistry) -> Result<Reconciled> {
        #[cfg(feature = "tracing")]
        tracing::info!(
            subtags = subtags.header(),
            systems = systems.header(),
            "reconciling registries"
        );
        let mut reconciler = Reconciler::new(subtags, systems);
        reconciler.apply(&self.corrections.steps)?;
        let mut inheritance = Inheritance::default();
        inheritance.run(&mut reconciler);
        reconciler.normalize_macrolanguages()?;
        inheritance.run(&mut reconciler);
        reconciler.fill_default_language_system();
        let ranked = RankedMapping::sort(
            reconciler.mapping(),
            reconciler.systems(),
            &self.corrections,
        );
        Ok(Reconciled {
            reconciler,
            ranked,
            uninherited: inheritance.into_uninherited().unwrap_or_default(),
        })
    }

    /// [`TableGenerator::reconcile`], then derive the table and check the disambiguation.
    ///
    /// # Errors
    /// See [`TableGenerator::reconcile`], [`Reconciled::table`] and
    /// [`Reconciled::disambiguation`].
    pub fn generate(&self, subtags: SubtagRegistry, systems: SystemRegistry) -> Result<Generated> {
        let reconciled = self.reconcile(subtags, systems)?;
        Ok(Generated {
            table: reconciled.table()?,
            disambiguation: reconciled.disambiguation(&self.disambiguation)?,
        })
    }
}

/// The finished mapping, ready to derive outputs from.
#[derive(Clone, Debug)]
pub struct Reconciled {
    reconciler: Reconciler,
    ranked: RankedMapping,
    uninherited: Uninherited,
}

impl Reconciled {
    #[must_use]
    pub const fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    #[must_use]
    pub const fn ranked(&self) -> &RankedMapping {
        &self.ranked
    }

    /// The mapping as corrected, before inheritance.
    #[must_use]
    pub const fn uninherited(&self) -> &Uninherited {
        &self.uninherited
    }

    /// # Errors
    /// See [`ResolutionTable::assemble`].
    pub fn table(&self) -> Result<ResolutionTable> {
        ResolutionTable::assemble(
            &self.ranked,
            self.reconciler.subtags(),
            self.reconciler.systems(),
        )
    }

    /// # Errors
    /// See [`disambiguation::disambiguate`].
    pub fn disambiguation(&self, curated: &Disambiguation) -> Result<BTreeMap<SystemTag, String>> {
        disambiguation::disambiguate(&self.reconciler, &self.ranked, &self.uninherited, curated)
    }
}

/// Everything [`TableGenerator::generate`] derives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Generated {
    pub table: ResolutionTable,
    /// The locale tag standing for each language system tag, where the table alone would not
    /// tell.
    pub disambiguation: BTreeMap<SystemTag, String>,
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::systag;
    use pretty_assertions::assert_eq;

    fn generator() -> TableGenerator {
        TableGenerator::new(fixture::corrections(), fixture::disambiguation())
    }

    #[test]
    fn reconciled_mapping_keeps_its_invariants() {
        let reconciled = generator()
            .reconcile(fixture::subtags(), fixture::systems())
            .unwrap();
        assert!(reconciled.reconciler().mapping().is_mirrored());
        assert!(reconciled.reconciler().graph().is_forest());
        assert_eq!(
            reconciled.reconciler().systems().rank(SystemTag::DEFAULT),
            11
        );
        assert_eq!(reconciled.ranked().preferred("ak"), Some(systag!("AKA")));
        assert_eq!(reconciled.ranked().get("tw"), Some(&systag!["AKA", "TWI"][..]));
        assert_eq!(reconciled.ranked().get("ikt"), Some(&[systag!("INU")][..]));
        assert!(!reconciled.uninherited().contains_key("als"));
    }

    #[test]
    fn demoted_macrolanguages_pass_their_members_on() {
        use crate::registry::{ScopeKind, SubtagRecord, SystemTagRecord};
        let language = SubtagRecord::language;
        let subtags = SubtagRegistry::from_records(
            "File-Date: 2024-01-01",
            [
                language("bgm")
                    .description("Big")
                    .scope(ScopeKind::Macrolanguage)
                    .deprecated(),
                language("aaa").description("A").macrolanguage("bgm"),
                language("bbb").description("B").macrolanguage("bgm"),
                language("xxx").description("X").macrolanguage("bgm"),
                language("yyy").description("Y"),
                language("sml")
                    .description("Small")
                    .deprecated()
                    .split_into(["xxx", "yyy"]),
            ],
        )
        .unwrap();
        let systems = SystemRegistry::from_records(
            "updated",
            [SystemTagRecord::new(systag!("BGM"), "Big").codes(["bgm"])],
        )
        .unwrap();
        let reconciled = TableGenerator::new(Corrections::empty(), Disambiguation::empty())
            .reconcile(subtags, systems)
            .unwrap();
        let graph = reconciled.reconciler().graph();
        assert!(graph.is_forest());
        assert_eq!(graph.parents("yyy").collect::<Vec<_>>(), ["bgm"]);
        assert_eq!(graph.parents("sml").collect::<Vec<_>>(), ["bgm"]);
        assert_eq!(reconciled.ranked().get("sml"), Some(&[systag!("BGM")][..]));
        assert_eq!(reconciled.ranked().get("yyy"), Some(&[systag!("BGM")][..]));
    }

    #[test]
    fn generates_end_to_end() {
        let generated = generator()
            .generate(fixture::subtags(), fixture::systems())
            .unwrap();
        assert_eq!(generated.table.resolve("cmn-Hant-HK"), [systag!("ZHT")]);
        assert_eq!(generated.table.resolve("yue"), [systag!("ZHH")]);
        assert_eq!(generated.table.resolve("als"), [systag!("SQI")]);
        assert_eq!(
            generated
                .disambiguation
                .get(&systag!("ZHH"))
                .map(String::as_str),
            Some("zh-HK")
        );
    }

    #[test]
    fn generation_is_deterministic() {
        let a = generator().generate(fixture::subtags(), fixture::systems());
        let b = generator().generate(fixture::subtags(), fixture::systems());
        assert_eq!(a, b);
    }

    #[test]
    fn curated_corrections_need_the_published_registries() {
        let result = TableGenerator::default().reconcile(fixture::subtags(), fixture::systems());
        assert_eq!(
            result.map(drop),
            Err(Error::UnknownSystemTag(systag!("MOR")))
        );
    }
}
