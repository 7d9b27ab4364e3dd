//! Human-readable names for the comments of the generated table.

use std::collections::{BTreeMap, BTreeSet};

use unicode_normalization::UnicodeNormalization;

use crate::LocaleTag;
use crate::registry::{Namespace, SubtagRegistry, SystemRegistry};
use crate::tag::SystemTag;

/// Spelling variants of a name, folded to ASCII for comparison.
///
/// Each comma- or parenthesis-separated piece counts as a variant.
///
/// ```
/// let set = ot_lang_table::names::variant_set("Nheengatú (Yeral)");
/// assert!(set.contains("Nheengatu"));
/// assert!(set.contains("Yeral"));
/// ```
#[must_use]
pub fn variant_set(name: &str) -> BTreeSet<String> {
    name.split(['\n', '(', ')', ','])
        .map(|piece| {
            piece
                .replace('\u{2019}', "'")
                .nfd()
                .filter(char::is_ascii)
                .collect::<String>()
                .trim()
                .to_owned()
        })
        .filter(|piece| !piece.is_empty())
        .collect()
}

/// Names of locale subtags, remembering which spelling matched a language system name.
///
/// When a row comment finds that one of a language's several descriptions agrees with its
/// language system name, that description becomes the language's name from then on, both for
/// later rows and for dispatch entries.
#[derive(Clone, Debug)]
pub struct DisplayNames<'a> {
    subtags: &'a SubtagRegistry,
    chosen: BTreeMap<String, String>,
}

impl<'a> DisplayNames<'a> {
    #[must_use]
    pub const fn new(subtags: &'a SubtagRegistry) -> Self {
        Self {
            subtags,
            chosen: BTreeMap::new(),
        }
    }

    /// Descriptions of a language subtag, primary first.
    #[must_use]
    pub fn language_names(&self, language: &str) -> Vec<&str> {
        if let Some(name) = self.chosen.get(language) {
            return vec![name.as_str()];
        }
        self.subtags
            .names(Namespace::Language, language)
            .map(|names| names.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    fn piece(&self, namespace: Namespace, subtag: &str) -> String {
        let name = match namespace {
            Namespace::Language => self.language_names(subtag).first().copied(),
            _ => self.subtags.primary_name(namespace, subtag),
        };
        let scope = self.subtags.scope(namespace, subtag);
        // Retired variants are set off by a space, retired languages are not.
        let gap = if namespace == Namespace::Variant && scope.retired {
            " "
        } else {
            ""
        };
        format!("{}{gap}{scope}", name.unwrap_or(subtag))
    }

    /// e.g. `Chinese [macrolanguage]; Han (Traditional variant); Macao`.
    #[must_use]
    pub fn locale_name(&self, tag: &LocaleTag) -> String {
        let mut name = self.piece(Namespace::Language, tag.language());
        let parts = [
            tag.canonical_script().map(|s| (Namespace::Script, s)),
            tag.canonical_region().map(|r| (Namespace::Region, r)),
            tag.variant().map(|v| (Namespace::Variant, v.to_owned())),
        ];
        for (namespace, subtag) in parts.into_iter().flatten() {
            name.push_str("; ");
            name.push_str(&self.piece(namespace, &subtag));
        }
        name
    }

    /// Comment for the table row mapping `language` to `tag`.
    pub fn row_comment(
        &mut self,
        language: &str,
        tag: SystemTag,
        systems: &SystemRegistry,
    ) -> String {
        let names = self.language_names(language);
        let primary = names.first().copied().unwrap_or_default().to_owned();
        let scope = self.subtags.scope(Namespace::Language, language);
        if tag.is_default() {
            let same_code = SystemTag::parse(&language.to_ascii_uppercase())
                .ok()
                .and_then(|code| systems.name(code))
                .unwrap_or_default();
            return format!("{primary}{scope} != {same_code}");
        }
        let system_name = systems.name(tag).unwrap_or_default();
        let system_variants = variant_set(system_name);
        let Some(matching) = names
            .iter()
            .find(|name| !variant_set(name).is_disjoint(&system_variants))
            .map(|name| (*name).to_owned())
        else {
            return format!("{primary}{scope} -> {system_name}");
        };
        let shown = if matching.chars().count() > system_name.chars().count() {
            matching.clone()
        } else {
            system_name.to_owned()
        };
        self.chosen.insert(language.to_owned(), matching);
        format!("{shown}{scope}")
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::registry::{SubtagRecord, SystemTagRecord};
    use crate::{fixture, systag};
    use pretty_assertions::assert_eq;

    #[test]
    fn folds_spelling_variants() {
        assert_eq!(
            variant_set("Mandinka\nMandingo (Manding), "),
            BTreeSet::from(["Mandinka", "Mandingo", "Manding"].map(str::to_owned))
        );
        assert!(variant_set("Sïlt\u{2019}e").contains("Silt'e"));
    }

    #[test]
    fn row_comments() {
        let subtags = fixture::subtags();
        let systems = fixture::systems();
        let mut names = DisplayNames::new(&subtags);
        assert_eq!(
            names.row_comment("ak", systag!("AKA"), &systems),
            "Akan [macrolanguage]"
        );
        assert_eq!(
            names.row_comment("ak", systag!("TWI"), &systems),
            "Akan [macrolanguage] -> Twi"
        );
        assert_eq!(
            names.row_comment("zh", systag!("ZHS"), &systems),
            "Chinese, Simplified [macrolanguage]"
        );
        assert_eq!(
            names.row_comment("fur", SystemTag::DEFAULT, &systems),
            "Friulian != Friulian"
        );
    }

    #[test]
    fn matching_description_is_remembered() {
        let subtags = SubtagRegistry::from_records(
            "File-Date: 2024-01-01",
            [SubtagRecord::language("mnk")
                .description("Mandinka")
                .description("Mandingo")],
        )
        .unwrap();
        let systems = SystemRegistry::from_records(
            "updated",
            [
                SystemTagRecord::new(systag!("MND"), "Mandingo").codes(["mnk"]),
                SystemTagRecord::new(systag!("MLN"), "Malinke").codes(["mnk"]),
            ],
        )
        .unwrap();
        let mut names = DisplayNames::new(&subtags);
        assert_eq!(names.language_names("mnk"), ["Mandinka", "Mandingo"]);
        assert_eq!(names.row_comment("mnk", systag!("MND"), &systems), "Mandingo");
        assert_eq!(
            names.row_comment("mnk", systag!("MLN"), &systems),
            "Mandingo -> Malinke"
        );
        let tag = LocaleTag::parse("mnk", &subtags);
        assert_eq!(names.locale_name(&tag), "Mandingo");
    }

    #[test]
    fn retired_subtags_are_marked() {
        let subtags = SubtagRegistry::from_records(
            "File-Date: 2024-01-01",
            [
                SubtagRecord::language("mo")
                    .description("Moldavian")
                    .deprecated(),
                SubtagRecord::new(crate::registry::SubtagKind::Variant, "heploc")
                    .description("Hepburn romanization, Library of Congress method")
                    .deprecated(),
            ],
        )
        .unwrap();
        let names = DisplayNames::new(&subtags);
        let tag = LocaleTag::parse("mo-heploc", &subtags);
        assert_eq!(
            names.locale_name(&tag),
            "Moldavian(retired code); Hepburn romanization, Library of Congress method (retired code)"
        );
    }

    #[test]
    fn locale_names_join_every_part() {
        let subtags = fixture::subtags();
        let names = DisplayNames::new(&subtags);
        let tag = LocaleTag::parse("zh-Hant-MO", &subtags);
        assert_eq!(
            names.locale_name(&tag),
            "Chinese [macrolanguage]; Han (Traditional variant); Macao"
        );
        let tag = LocaleTag::parse("el-polyton", &subtags);
        assert_eq!(names.locale_name(&tag), "Modern Greek (1453-); Polytonic Greek");
    }
}
