//! The two registries as the reconciler sees them.
//!
//! Documents are parsed elsewhere; this module takes the already-split records, checks them once,
//! and keeps only what reconciliation needs. Locale subtags are keyed case-insensitively within
//! their [`Namespace`], so region `MO` and language `mo` never collide.

use std::collections::{BTreeMap, BTreeSet};

use crate::SystemTag;
use crate::error::{Error, RegistryKind, Result};

/// Record type of the BCP 47 language subtag registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SubtagKind {
    Language,
    Extlang,
    Script,
    Region,
    Variant,
    Grandfathered,
    Redundant,
}

impl SubtagKind {
    #[must_use]
    pub const fn namespace(self) -> Namespace {
        match self {
            Self::Language | Self::Extlang | Self::Grandfathered | Self::Redundant => {
                Namespace::Language
            }
            Self::Script => Namespace::Script,
            Self::Region => Namespace::Region,
            Self::Variant => Namespace::Variant,
        }
    }
}

/// Lookup domain for subtag names and scopes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Namespace {
    Language,
    Script,
    Region,
    Variant,
}

/// The `Scope` field of a language subtag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    Macrolanguage,
    Collection,
    Special,
    PrivateUse,
}

/// What the registry says about a subtag beyond its names.
///
/// Only macrolanguages and collections show up in display names; retirement comes from the
/// `Deprecated` field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Scope {
    pub kind: Option<ScopeKind>,
    pub retired: bool,
}

impl Scope {
    pub const NONE: Self = Self {
        kind: None,
        retired: false,
    };
    pub const RETIRED: Self = Self {
        kind: None,
        retired: true,
    };

    #[must_use]
    pub const fn is_macrolanguage(self) -> bool {
        matches!(self.kind, Some(ScopeKind::Macrolanguage)) && !self.retired
    }

    #[must_use]
    pub const fn is_collection(self) -> bool {
        matches!(self.kind, Some(ScopeKind::Collection)) && !self.retired
    }
}

/// Renders the suffix appended to a language subtag's name, e.g. `" [macrolanguage]"` or
/// `"(retired code)"`.
impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.retired {
            f.write_str("(retired code)")?;
        }
        match self.kind {
            Some(ScopeKind::Macrolanguage) => f.write_str(" [macrolanguage]"),
            Some(ScopeKind::Collection) => f.write_str(" [collection]"),
            Some(ScopeKind::Special | ScopeKind::PrivateUse) | None => Ok(()),
        }
    }
}

/// One record of the language subtag registry, as handed over by the parser.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubtagRecord {
    pub kind: SubtagKind,
    pub tag: String,
    pub descriptions: Vec<String>,
    pub scope: Option<ScopeKind>,
    pub deprecated: bool,
    pub preferred_value: Option<String>,
    pub macrolanguage: Option<String>,
    /// Replacements named by a deprecation comment such as `see cmn, yue`.
    pub split_into: Vec<String>,
    pub prefixes: Vec<String>,
}

impl SubtagRecord {
    #[must_use]
    pub fn new(kind: SubtagKind, tag: impl Into<String>) -> Self {
        Self {
            kind,
            tag: tag.into(),
            descriptions: vec![],
            scope: None,
            deprecated: false,
            preferred_value: None,
            macrolanguage: None,
            split_into: vec![],
            prefixes: vec![],
        }
    }

    #[must_use]
    pub fn language(tag: impl Into<String>) -> Self {
        Self::new(SubtagKind::Language, tag)
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.descriptions.push(description.into());
        self
    }

    #[must_use]
    pub const fn scope(mut self, scope: ScopeKind) -> Self {
        self.scope = Some(scope);
        self
    }

    #[must_use]
    pub const fn deprecated(mut self) -> Self {
        self.deprecated = true;
        self
    }

    #[must_use]
    pub fn preferred_value(mut self, tag: impl Into<String>) -> Self {
        self.preferred_value = Some(tag.into());
        self
    }

    #[must_use]
    pub fn macrolanguage(mut self, tag: impl Into<String>) -> Self {
        self.macrolanguage = Some(tag.into());
        self
    }

    #[must_use]
    pub fn split_into<I: IntoIterator<Item = S>, S: Into<String>>(mut self, tags: I) -> Self {
        self.split_into.extend(tags.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefixes.push(prefix.into());
        self
    }

    fn malformed(&self, reason: &'static str) -> Error {
        Error::MalformedRecord {
            registry: RegistryKind::Subtag,
            tag: self.tag.clone(),
            reason,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.tag.is_empty() || self.tag.contains(char::is_whitespace) {
            return Err(self.malformed("subtag is empty or contains whitespace"));
        }
        if self.descriptions.is_empty() {
            return Err(self.malformed("no description"));
        }
        if !self.prefixes.is_empty() && self.kind != SubtagKind::Variant {
            return Err(self.malformed("only variants have prefixes"));
        }
        if !self.split_into.is_empty() && !self.deprecated {
            return Err(self.malformed("replacements listed for a subtag that is not deprecated"));
        }
        Ok(())
    }
}

type SubtagKey = (Namespace, String);

fn key(namespace: Namespace, tag: &str) -> SubtagKey {
    (namespace, tag.to_ascii_lowercase())
}

/// Strip the scope annotations the registry writes into descriptions.
fn clean_description(description: &str) -> String {
    let description = description.replace("(individual language)", "");
    let description = description.trim_end();
    let description = ["(family)", "(macrolanguage)", "languages"]
        .into_iter()
        .find_map(|suffix| description.strip_suffix(suffix))
        .unwrap_or(description);
    description.trim_end().to_owned()
}

/// The BCP 47 language subtag registry.
#[derive(Clone, Debug, Default)]
pub struct SubtagRegistry {
    header: String,
    names: BTreeMap<SubtagKey, Vec<String>>,
    scopes: BTreeMap<SubtagKey, Scope>,
    prefixes: BTreeMap<String, BTreeSet<String>>,
    grandfathered: BTreeSet<String>,
    /// `(macrolanguage, individual language)` in record order.
    macrolanguage_links: Vec<(String, String)>,
}

impl SubtagRegistry {
    /// Check and index parsed records.
    ///
    /// `header` is the registry's `File-Date` line.
    ///
    /// # Errors
    /// - [`Error::MissingHeader`] if `header` is blank.
    /// - [`Error::MalformedRecord`] for a record without a usable subtag or description, with
    ///   prefixes on a non-variant, or with replacements while not deprecated.
    pub fn from_records<I>(header: impl Into<String>, records: I) -> Result<Self>
    where
        I: IntoIterator<Item = SubtagRecord>,
    {
        let header = header.into();
        if header.trim().is_empty() {
            #[cfg(feature = "tracing")]
            tracing::error!("language subtag registry has no File-Date header");
            return Err(Error::MissingHeader {
                registry: RegistryKind::Subtag,
            });
        }
        let mut registry = Self {
            header,
            ..Self::default()
        };
        for record in records {
            record.validate()?;
            registry.insert(record);
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(
            header = registry.header,
            subtags = registry.names.len(),
            links = registry.macrolanguage_links.len(),
            "loaded language subtag registry"
        );
        Ok(registry)
    }

    fn insert(&mut self, record: SubtagRecord) {
        let namespace = record.kind.namespace();
        let k = key(namespace, &record.tag);
        self.names
            .entry(k.clone())
            .or_default()
            .extend(record.descriptions.iter().map(|d| clean_description(d)));

        match record.kind {
            SubtagKind::Variant => {
                if record.deprecated {
                    self.scopes.insert(k, Scope::RETIRED);
                }
                if !record.prefixes.is_empty() {
                    self.prefixes
                        .entry(record.tag.to_ascii_lowercase())
                        .or_default()
                        .extend(record.prefixes.iter().map(|p| p.to_ascii_lowercase()));
                }
            }
            SubtagKind::Language | SubtagKind::Grandfathered => {
                if record.kind == SubtagKind::Grandfathered {
                    self.grandfathered.insert(record.tag.to_ascii_lowercase());
                }
                let kind = record
                    .scope
                    .filter(|s| matches!(s, ScopeKind::Macrolanguage | ScopeKind::Collection));
                if kind.is_some() || record.deprecated {
                    self.scopes.insert(
                        k,
                        Scope {
                            kind,
                            retired: record.deprecated,
                        },
                    );
                }
                self.link_record(&record);
            }
            SubtagKind::Extlang
            | SubtagKind::Script
            | SubtagKind::Region
            | SubtagKind::Redundant => {}
        }
    }

    fn link_record(&mut self, record: &SubtagRecord) {
        // A subtag split into several replacements acts as their macrolanguage.
        if record.deprecated {
            for language in &record.split_into {
                self.macrolanguage_links
                    .push((record.tag.clone(), language.clone()));
            }
        }
        // A single preferred replacement is close enough to a macrolanguage of the deprecated
        // dialect or synonym.
        if let Some(preferred) = &record.preferred_value {
            self.macrolanguage_links
                .push((preferred.clone(), record.tag.clone()));
        } else if let Some(macrolanguage) = &record.macrolanguage {
            self.macrolanguage_links
                .push((macrolanguage.clone(), record.tag.clone()));
        }
    }

    #[must_use]
    pub fn header(&self) -> &str {
        &self.header
    }

    /// Whether the whole tag is registered as grandfathered, compared case-insensitively.
    #[must_use]
    pub fn is_grandfathered(&self, tag: &str) -> bool {
        self.grandfathered.contains(&tag.to_ascii_lowercase())
    }

    /// All descriptions of a subtag, primary first.
    #[must_use]
    pub fn names(&self, namespace: Namespace, tag: &str) -> Option<&[String]> {
        self.names.get(&key(namespace, tag)).map(Vec::as_slice)
    }

    #[must_use]
    pub fn primary_name(&self, namespace: Namespace, tag: &str) -> Option<&str> {
        self.names(namespace, tag)
            .and_then(<[String]>::first)
            .map(String::as_str)
    }

    #[must_use]
    pub fn scope(&self, namespace: Namespace, tag: &str) -> Scope {
        self.scopes
            .get(&key(namespace, tag))
            .copied()
            .unwrap_or_default()
    }

    #[must_use]
    pub fn is_retired(&self, tag: &str) -> bool {
        self.scope(Namespace::Language, tag).retired
    }

    /// Whether `tag` is a registered language-like subtag (language, extlang or whole tag).
    #[must_use]
    pub fn contains_language(&self, tag: &str) -> bool {
        self.names.contains_key(&key(Namespace::Language, tag))
    }

    /// The lowercased prefixes registered for a variant, if it has any.
    #[must_use]
    pub fn prefixes(&self, variant: &str) -> Option<&BTreeSet<String>> {
        self.prefixes.get(&variant.to_ascii_lowercase())
    }

    /// Every macrolanguage relation the records declare, in record order.
    pub fn macrolanguage_links(&self) -> impl Iterator<Item = (&str, &str)> {
        self.macrolanguage_links
            .iter()
            .map(|(m, l)| (m.as_str(), l.as_str()))
    }

    pub fn set_language_name(&mut self, tag: &str, name: impl Into<String>) {
        self.names
            .insert(key(Namespace::Language, tag), vec![name.into()]);
    }

    pub fn set_scope(&mut self, tag: &str, scope: Scope) {
        self.scopes.insert(key(Namespace::Language, tag), scope);
    }
}

/// One row of the OpenType language system tag registry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SystemTagRecord {
    pub tag: SystemTag,
    pub name: String,
    pub deprecated: bool,
    /// ISO 639 codes, 2 or 3 letters.
    pub codes: Vec<String>,
}

impl SystemTagRecord {
    #[must_use]
    pub fn new(tag: SystemTag, name: impl Into<String>) -> Self {
        Self {
            tag,
            name: name.into(),
            deprecated: false,
            codes: vec![],
        }
    }

    #[must_use]
    pub fn codes<I: IntoIterator<Item = S>, S: Into<String>>(mut self, codes: I) -> Self {
        self.codes.extend(codes.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub const fn deprecated(mut self) -> Self {
        self.deprecated = true;
        self
    }
}

/// Map an ISO 639-3 code to its ISO 639-1 equivalent when there is one.
///
/// ```
/// assert_eq!(ot_lang_table::registry::normalize_code("zho"), "zh");
/// assert_eq!(ot_lang_table::registry::normalize_code("hbs"), "sh");
/// assert_eq!(ot_lang_table::registry::normalize_code("cmn"), "cmn");
/// ```
#[must_use]
pub fn normalize_code(code: &str) -> String {
    let code = code.trim().to_ascii_lowercase();
    if code.len() != 3 {
        return code;
    }
    // Serbo-Croatian keeps its retired 639-1 code in BCP 47.
    if code == "hbs" {
        return "sh".to_owned();
    }
    isolang::Language::from_639_3(&code)
        .and_then(|lang| lang.to_639_1())
        .map_or(code, str::to_owned)
}

/// The OpenType language system tag registry.
#[derive(Clone, Debug, Default)]
pub struct SystemRegistry {
    header: String,
    names: BTreeMap<SystemTag, String>,
    ranks: BTreeMap<SystemTag, i32>,
    codes: BTreeMap<SystemTag, BTreeSet<String>>,
}

impl SystemRegistry {
    /// Check and index parsed rows.
    ///
    /// A tag's rank starts at twice the number of codes it covers, one more if deprecated, so
    /// broad or deprecated tags lose to specific ones. Rows without codes keep rank 0.
    ///
    /// # Errors
    /// - [`Error::MissingHeader`] if `header` is blank.
    /// - [`Error::MalformedRecord`] for a row with a blank name or a blank code.
    pub fn from_records<I>(header: impl Into<String>, records: I) -> Result<Self>
    where
        I: IntoIterator<Item = SystemTagRecord>,
    {
        let header = header.into();
        if header.trim().is_empty() {
            #[cfg(feature = "tracing")]
            tracing::error!("language system tag registry has no updated_at header");
            return Err(Error::MissingHeader {
                registry: RegistryKind::LanguageSystem,
            });
        }
        let mut registry = Self {
            header,
            ..Self::default()
        };
        for record in records {
            registry.insert(record)?;
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(
            header = registry.header,
            tags = registry.names.len(),
            "loaded language system tag registry"
        );
        Ok(registry)
    }

    fn insert(&mut self, record: SystemTagRecord) -> Result<()> {
        let malformed = |reason| Error::MalformedRecord {
            registry: RegistryKind::LanguageSystem,
            tag: record.tag.to_string(),
            reason,
        };
        let name = record.name.trim();
        if name.is_empty() {
            return Err(malformed("no name"));
        }
        if record.codes.iter().any(|c| c.trim().is_empty()) {
            return Err(malformed("blank ISO 639 code"));
        }
        let mut name = name.strip_suffix(" languages").unwrap_or(name).to_owned();
        if record.deprecated {
            name.push_str(" (deprecated)");
        }
        self.names.insert(record.tag, name);
        if record.codes.is_empty() {
            return Ok(());
        }
        let codes = self.codes.entry(record.tag).or_default();
        codes.extend(record.codes.iter().map(|c| normalize_code(c)));
        let covered = i32::try_from(codes.len()).unwrap_or(i32::MAX);
        let rank = i32::from(record.deprecated).saturating_add(covered.saturating_mul(2));
        self.ranks.insert(record.tag, rank);
        Ok(())
    }

    #[must_use]
    pub fn header(&self) -> &str {
        &self.header
    }

    #[must_use]
    pub fn contains(&self, tag: SystemTag) -> bool {
        self.names.contains_key(&tag)
    }

    /// Every registered tag, in tag order.
    pub fn tags(&self) -> impl Iterator<Item = SystemTag> + '_ {
        self.names.keys().copied()
    }

    #[must_use]
    pub fn name(&self, tag: SystemTag) -> Option<&str> {
        self.names.get(&tag).map(String::as_str)
    }

    #[must_use]
    pub fn rank(&self, tag: SystemTag) -> i32 {
        self.ranks.get(&tag).copied().unwrap_or_default()
    }

    #[must_use]
    pub fn max_rank(&self) -> i32 {
        self.ranks.values().copied().max().unwrap_or_default()
    }

    /// The normalized ISO 639 codes the registry associates with each tag.
    pub fn codes(&self) -> impl Iterator<Item = (SystemTag, &BTreeSet<String>)> {
        self.codes.iter().map(|(tag, codes)| (*tag, codes))
    }

    pub fn set_name(&mut self, tag: SystemTag, name: impl Into<String>) {
        self.names.insert(tag, name.into());
    }

    pub fn set_rank(&mut self, tag: SystemTag, rank: i32) {
        self.ranks.insert(tag, rank);
    }

    pub fn bump_rank(&mut self, tag: SystemTag, by: i32) {
        let rank = self.ranks.entry(tag).or_default();
        *rank = rank.saturating_add(by);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::systag;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_headers_are_fatal() {
        assert_eq!(
            SubtagRegistry::from_records("", []).unwrap_err(),
            Error::MissingHeader {
                registry: RegistryKind::Subtag
            }
        );
        assert_eq!(
            SystemRegistry::from_records("  ", []).unwrap_err(),
            Error::MissingHeader {
                registry: RegistryKind::LanguageSystem
            }
        );
    }

    #[test]
    fn malformed_records_are_fatal() {
        let no_description = SubtagRecord::language("xx");
        assert!(matches!(
            SubtagRegistry::from_records("File-Date: 2024-01-01", [no_description]),
            Err(Error::MalformedRecord { .. })
        ));
        let prefixed_language = SubtagRecord::language("xx").description("X").prefix("en");
        assert!(matches!(
            SubtagRegistry::from_records("File-Date: 2024-01-01", [prefixed_language]),
            Err(Error::MalformedRecord { .. })
        ));
        let blank_code = SystemTagRecord::new(systag!("XXX"), "X").codes([" "]);
        assert!(matches!(
            SystemRegistry::from_records("updated", [blank_code]),
            Err(Error::MalformedRecord { .. })
        ));
    }

    #[test]
    fn cleans_descriptions() {
        assert_eq!(clean_description("Konkani (individual language)"), "Konkani");
        assert_eq!(clean_description("Konkani (macrolanguage)"), "Konkani");
        assert_eq!(clean_description("Bantu languages"), "Bantu");
        assert_eq!(clean_description("Afro-Asiatic (family)"), "Afro-Asiatic");
    }

    #[test]
    fn keeps_namespaces_apart() {
        let registry = SubtagRegistry::from_records(
            "File-Date: 2024-01-01",
            [
                SubtagRecord::language("mo")
                    .description("Moldavian")
                    .deprecated()
                    .preferred_value("ro"),
                SubtagRecord::new(SubtagKind::Region, "MO").description("Macao"),
            ],
        )
        .unwrap();
        assert_eq!(
            registry.primary_name(Namespace::Language, "mo"),
            Some("Moldavian")
        );
        assert_eq!(registry.primary_name(Namespace::Region, "mo"), Some("Macao"));
        assert!(registry.is_retired("mo"));
        assert_eq!(
            registry.macrolanguage_links().collect::<Vec<_>>(),
            [("ro", "mo")]
        );
    }

    #[test]
    fn preferred_value_wins_over_macrolanguage() {
        let registry = SubtagRegistry::from_records(
            "File-Date: 2024-01-01",
            [
                SubtagRecord::language("cmn")
                    .description("Mandarin Chinese")
                    .macrolanguage("zh"),
                SubtagRecord::language("sh")
                    .description("Serbo-Croatian")
                    .scope(ScopeKind::Macrolanguage)
                    .deprecated()
                    .split_into(["hr", "bs", "sr"]),
                SubtagRecord::language("xyz")
                    .description("Example")
                    .deprecated()
                    .preferred_value("abc")
                    .macrolanguage("ignored"),
            ],
        )
        .unwrap();
        assert_eq!(
            registry.macrolanguage_links().collect::<Vec<_>>(),
            [
                ("zh", "cmn"),
                ("sh", "hr"),
                ("sh", "bs"),
                ("sh", "sr"),
                ("abc", "xyz")
            ]
        );
        assert_eq!(
            registry.scope(Namespace::Language, "sh").to_string(),
            "(retired code) [macrolanguage]"
        );
    }

    #[test]
    fn ranks_follow_coverage() {
        let registry = SystemRegistry::from_records(
            "updated",
            [
                SystemTagRecord::new(systag!("ZHS"), "Chinese, Simplified").codes(["zho"]),
                SystemTagRecord::new(systag!("KOK"), "Konkani").codes(["gom", "knn", "kok"]),
                SystemTagRecord::new(systag!("OLD"), "Old").deprecated().codes(["old"]),
                SystemTagRecord::new(systag!("IPPH"), "Phonetic transcription"),
                SystemTagRecord::new(systag!("BNT"), "Bantu languages").codes(["bnt"]),
            ],
        )
        .unwrap();
        assert_eq!(registry.rank(systag!("ZHS")), 2);
        assert_eq!(registry.rank(systag!("KOK")), 6);
        assert_eq!(registry.rank(systag!("OLD")), 3);
        assert_eq!(registry.rank(systag!("IPPH")), 0);
        assert_eq!(registry.name(systag!("OLD")), Some("Old (deprecated)"));
        assert_eq!(registry.name(systag!("BNT")), Some("Bantu"));
        let zhs = registry
            .codes()
            .find(|(tag, _)| *tag == systag!("ZHS"))
            .map(|(_, codes)| codes.iter().cloned().collect::<Vec<_>>());
        assert_eq!(zhs, Some(vec!["zh".to_owned()]));
    }
}
