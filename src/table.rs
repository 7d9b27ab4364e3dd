use crate::error::Result;
use crate::names::DisplayNames;
use crate::rank::RankedMapping;
use crate::registry::{SubtagRegistry, SystemRegistry};
use crate::{DispatchPlan, LanguageIdentifier, SystemTag};

/// One row of the static table: a single language subtag and one of its candidates.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LangTagRow {
    pub language: String,
    pub tag: SystemTag,
    pub comment: String,
    /// The language subtag's only candidate is its own code upper-cased, which
    /// [`ResolutionTable::resolve`] falls back to anyway.
    pub redundant: bool,
}

/// Whether `tags` is just `language` upper-cased.
pub(crate) fn same_tag(language: &str, tags: &[SystemTag]) -> bool {
    language.len() == 3
        && matches!(tags, [only] if only.as_str().eq_ignore_ascii_case(language))
}

/// Everything a caller needs to turn a locale tag into language system tags.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolutionTable {
    rows: Vec<LangTagRow>,
    plan: DispatchPlan,
}

impl ResolutionTable {
    /// Build rows for single-subtag locale tags and plan the rest.
    ///
    /// Rows come first since their comments settle the names the plan reuses.
    ///
    /// # Errors
    /// See [`DispatchPlan::plan`].
    pub fn assemble(
        ranked: &RankedMapping,
        subtags: &SubtagRegistry,
        systems: &SystemRegistry,
    ) -> Result<Self> {
        let mut names = DisplayNames::new(subtags);
        let mut rows = vec![];
        for (language, tags) in ranked.iter() {
            if language.is_empty() || language.contains('-') {
                continue;
            }
            let redundant = same_tag(language, tags);
            for tag in tags {
                rows.push(LangTagRow {
                    language: language.to_owned(),
                    tag: *tag,
                    comment: names.row_comment(language, *tag, systems),
                    redundant,
                });
            }
        }
        let plan = DispatchPlan::plan(ranked, subtags, &names)?;
        #[cfg(feature = "tracing")]
        tracing::debug!(rows = rows.len(), "assembled resolution table");
        Ok(Self { rows, plan })
    }

    /// Rows in language subtag order, candidates of each language best first.
    #[must_use]
    pub fn rows(&self) -> &[LangTagRow] {
        &self.rows
    }

    #[must_use]
    pub const fn plan(&self) -> &DispatchPlan {
        &self.plan
    }

    /// Rows of one language subtag, compared exactly.
    #[must_use]
    pub fn rows_for(&self, language: &str) -> &[LangTagRow] {
        let start = self
            .rows
            .partition_point(|row| row.language.as_str() < language);
        let end = self
            .rows
            .partition_point(|row| row.language.as_str() <= language);
        self.rows.get(start..end).unwrap_or_default()
    }

    /// Language system tags for `locale`, best first.
    ///
    /// Tags with several subtags go through the plan first. Otherwise the primary language
    /// subtag's rows answer, and failing that a three-letter primary subtag is taken as its
    /// own language system tag.
    #[must_use]
    pub fn resolve(&self, locale: &str) -> Vec<SystemTag> {
        let locale = locale.to_ascii_lowercase();
        if locale.contains('-') {
            if let Some(tags) = self.plan.resolve(&locale) {
                return tags.to_vec();
            }
        }
        let primary = locale.split('-').next().unwrap_or_default();
        let tags = self
            .rows_for(primary)
            .iter()
            .filter(|row| !row.redundant)
            .map(|row| row.tag)
            .collect::<Vec<_>>();
        if !tags.is_empty() {
            return tags;
        }
        if primary.len() == 3 && primary.bytes().all(|b| b.is_ascii_alphabetic()) {
            return SystemTag::parse(&primary.to_ascii_uppercase())
                .map(|tag| vec![tag])
                .unwrap_or_default();
        }
        vec![]
    }

    /// [`ResolutionTable::resolve`] for a parsed identifier.
    ///
    /// ```
    /// # use ot_lang_table::{LanguageIdentifier, ResolutionTable};
    /// fn traditional_chinese(table: &ResolutionTable) -> Vec<ot_lang_table::SystemTag> {
    ///     let langid = "zh-Hant-TW".parse::<LanguageIdentifier>().unwrap();
    ///     table.resolve_langid(&langid)
    /// }
    /// ```
    #[must_use]
    pub fn resolve_langid(&self, langid: &LanguageIdentifier) -> Vec<SystemTag> {
        self.resolve(&langid.to_string())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{TableGenerator, fixture, systag};
    use pretty_assertions::assert_eq;

    fn table() -> ResolutionTable {
        TableGenerator::new(fixture::corrections(), fixture::disambiguation())
            .generate(fixture::subtags(), fixture::systems())
            .unwrap()
            .table
    }

    fn row<'a>(table: &'a ResolutionTable, language: &str, tag: SystemTag) -> &'a LangTagRow {
        table
            .rows_for(language)
            .iter()
            .find(|row| row.tag == tag)
            .unwrap()
    }

    #[test]
    fn rows_cover_single_subtags_only() {
        let table = table();
        assert!(table.rows().iter().all(|row| !row.language.contains('-')));
        assert!(
            table
                .rows()
                .windows(2)
                .all(|pair| pair.first().map(|r| &r.language) <= pair.get(1).map(|r| &r.language))
        );
        let ak = {
            let query = String::from("ak");
            table.rows_for(&query)
        };
        assert_eq!(
            ak.iter().map(|row| row.tag).collect::<Vec<_>>(),
            systag!["AKA", "TWI"]
        );
        assert!(table.rows_for("en-GB-oed").is_empty());
    }

    #[test]
    fn redundant_rows_are_flagged() {
        let table = table();
        assert!(row(&table, "kok", systag!("KOK")).redundant);
        assert!(!row(&table, "fur", SystemTag::DEFAULT).redundant);
        assert!(!row(&table, "zh", systag!("ZHS")).redundant);
    }

    #[test]
    fn row_comments() {
        let table = table();
        assert_eq!(row(&table, "ak", systag!("AKA")).comment, "Akan [macrolanguage]");
        assert_eq!(
            row(&table, "ak", systag!("TWI")).comment,
            "Akan [macrolanguage] -> Twi"
        );
        assert_eq!(
            row(&table, "zh", systag!("ZHS")).comment,
            "Chinese, Simplified [macrolanguage]"
        );
        assert_eq!(
            row(&table, "fur", SystemTag::DEFAULT).comment,
            "Friulian != Friulian"
        );
    }

    #[test]
    fn resolves_locale_tags() {
        let table = table();
        assert_eq!(table.resolve("zh-Hant-TW"), [systag!("ZHT")]);
        assert_eq!(table.resolve("zh-CN"), [systag!("ZHS")]);
        assert_eq!(table.resolve("grc-polyton"), [systag!("PGR")]);
        assert_eq!(table.resolve("ak"), systag!["AKA", "TWI"]);
        assert_eq!(table.resolve("ikt"), [systag!("INU")]);
        assert_eq!(table.resolve("kok"), [systag!("KOK")]);
        assert_eq!(table.resolve("xyz-Latn"), [systag!("XYZ")]);
        assert_eq!(table.resolve("fur"), [SystemTag::DEFAULT]);
        assert_eq!(table.resolve("en-GB-oed"), [systag!("ENG")]);
        assert!(table.resolve("x-private").is_empty());
        let langid = "zh-Hant-MO".parse::<LanguageIdentifier>().unwrap();
        assert_eq!(table.resolve_langid(&langid), [systag!("ZHH")]);
    }
}
