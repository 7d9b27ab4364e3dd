//! Curated fixes applied on top of the registries.
//!
//! The two registries disagree in places and lag behind usage in others. [`Corrections`] lists
//! the adjustments in the order they must be applied; later steps may override earlier ones.
//! The [`Default`] set is the one maintained alongside the generated table.

use std::collections::BTreeMap;

use crate::{SystemTag, systag};

/// A single curated adjustment. See [`crate::Reconciler::apply`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Correction {
    /// Map a locale tag to a language system tag.
    Add { locale: String, tag: SystemTag },
    /// Drop every mapping of a language system tag.
    RemoveSystemTag(SystemTag),
    /// Drop every mapping of a locale tag.
    RemoveLocaleTag(String),
    /// Rank `tag` right behind `base`.
    RankAfter { tag: SystemTag, base: SystemTag },
    BumpRank { tag: SystemTag, by: i32 },
    SystemName { tag: SystemTag, name: String },
    /// Name `tag` after `base`, with `suffix` appended.
    SystemNameFrom {
        tag: SystemTag,
        base: SystemTag,
        suffix: String,
    },
    LocaleName { locale: String, name: String },
    /// Mark a locale subtag as retired, dropping any other scope.
    RetireLocale(String),
    /// Replace the individual languages of a macrolanguage.
    Macrolanguage {
        macrolanguage: String,
        members: Vec<String>,
    },
    AddMember {
        macrolanguage: String,
        member: String,
    },
    RemoveMember {
        macrolanguage: String,
        member: String,
    },
}

impl Correction {
    #[must_use]
    pub fn add(locale: &str, tag: SystemTag) -> Self {
        Self::Add {
            locale: locale.to_owned(),
            tag,
        }
    }

    #[must_use]
    pub const fn rank_after(tag: SystemTag, base: SystemTag) -> Self {
        Self::RankAfter { tag, base }
    }

    #[must_use]
    pub fn locale_name(locale: &str, name: &str) -> Self {
        Self::LocaleName {
            locale: locale.to_owned(),
            name: name.to_owned(),
        }
    }

    #[must_use]
    pub fn retire(locale: &str) -> Self {
        Self::RetireLocale(locale.to_owned())
    }

    #[must_use]
    pub fn macrolanguage(macrolanguage: &str, members: &[&str]) -> Self {
        Self::Macrolanguage {
            macrolanguage: macrolanguage.to_owned(),
            members: members.iter().map(|m| (*m).to_owned()).collect(),
        }
    }

    #[must_use]
    pub fn add_member(macrolanguage: &str, member: &str) -> Self {
        Self::AddMember {
            macrolanguage: macrolanguage.to_owned(),
            member: member.to_owned(),
        }
    }

    #[must_use]
    pub fn remove_member(macrolanguage: &str, member: &str) -> Self {
        Self::RemoveMember {
            macrolanguage: macrolanguage.to_owned(),
            member: member.to_owned(),
        }
    }
}

/// A rank adjustment that only applies to one locale tag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RankDelta {
    pub locale: String,
    pub tag: SystemTag,
    pub delta: i32,
}

/// Ordered corrections plus the per-locale rank adjustments used when sorting.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Corrections {
    pub steps: Vec<Correction>,
    pub rank_deltas: Vec<RankDelta>,
}

impl Corrections {
    /// No corrections at all: the registries are taken as they are.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            steps: vec![],
            rank_deltas: vec![],
        }
    }

    #[must_use]
    pub fn with(mut self, step: Correction) -> Self {
        self.steps.push(step);
        self
    }

    #[must_use]
    pub fn rank_delta(mut self, locale: &str, tag: SystemTag, delta: i32) -> Self {
        self.rank_deltas.push(RankDelta {
            locale: locale.to_owned(),
            tag,
            delta,
        });
        self
    }

    /// Rank adjustment of `tag` when sorting the candidates of `locale`.
    #[must_use]
    pub fn delta(&self, locale: &str, tag: SystemTag) -> i32 {
        self.rank_deltas
            .iter()
            .filter(|d| d.locale == locale && d.tag == tag)
            .map(|d| d.delta)
            .sum()
    }
}

const QUECHUA: &[(&str, SystemTag)] = &[
    ("qub", systag!("QWH")),
    ("qud", systag!("QVI")),
    ("qug", systag!("QVI")),
    ("qul", systag!("QUH")),
    ("qup", systag!("QVI")),
    ("qur", systag!("QWH")),
    ("qus", systag!("QUH")),
    ("quw", systag!("QVI")),
    ("qux", systag!("QWH")),
    ("qva", systag!("QWH")),
    ("qvh", systag!("QWH")),
    ("qvj", systag!("QVI")),
    ("qvl", systag!("QWH")),
    ("qvm", systag!("QWH")),
    ("qvn", systag!("QWH")),
    ("qvo", systag!("QVI")),
    ("qvp", systag!("QWH")),
    ("qvw", systag!("QWH")),
    ("qvz", systag!("QVI")),
    ("qwa", systag!("QWH")),
    ("qws", systag!("QWH")),
    ("qxa", systag!("QWH")),
    ("qxc", systag!("QWH")),
    ("qxh", systag!("QWH")),
    ("qxl", systag!("QVI")),
    ("qxn", systag!("QWH")),
    ("qxo", systag!("QWH")),
    ("qxr", systag!("QVI")),
    ("qxt", systag!("QWH")),
    ("qxw", systag!("QWH")),
];

const CHINESE: &[(&str, SystemTag)] = &[
    ("zh-Hant-MO", systag!("ZHH")),
    ("zh-Hant-MO", systag!("ZHTM")),
    ("zh-Hant-HK", systag!("ZHH")),
    ("zh-Hans", systag!("ZHS")),
    ("zh-Hant", systag!("ZHT")),
    ("zh-HK", systag!("ZHH")),
    ("zh-MO", systag!("ZHH")),
    ("zh-MO", systag!("ZHTM")),
    ("zh-TW", systag!("ZHT")),
    ("lzh", systag!("ZHT")),
    ("lzh-Hans", systag!("ZHS")),
    ("yue", systag!("ZHH")),
    ("yue-Hans", systag!("ZHS")),
];

impl Default for Corrections {
    fn default() -> Self {
        use Correction as C;

        let mut steps = vec![
            C::add("ary", systag!("MOR")),
            C::add("ath", systag!("ATH")),
            C::add("bai", systag!("BML")),
            C::rank_after(systag!("BAL"), systag!("KAR")),
            C::add("ber", systag!("BBR")),
            C::RemoveSystemTag(systag!("PGR")),
            C::add("el-polyton", systag!("PGR")),
            C::locale_name("flm", "Falam Chin"),
            C::retire("flm"),
            C::macrolanguage("flm", &["cfm"]),
            C::rank_after(systag!("FNE"), systag!("TNE")),
            C::add("und-fonipa", systag!("IPPH")),
            C::add("und-fonnapa", systag!("APPH")),
            C::add("ga-Latg", systag!("IRT")),
            C::add("hy-arevmda", systag!("HYE")),
            C::RemoveSystemTag(systag!("KGE")),
            C::add("und-Geok", systag!("KGE")),
            C::add("kht", systag!("KHN")),
            C::SystemNameFrom {
                tag: systag!("KHN"),
                base: systag!("KHT"),
                suffix: " (Microsoft fonts)".to_owned(),
            },
            C::rank_after(systag!("KHN"), systag!("KHT")),
            C::rank_after(systag!("LCR"), systag!("MCR")),
            C::SystemName {
                tag: systag!("MAL"),
                name: "Malayalam Traditional".to_owned(),
            },
            C::BumpRank {
                tag: systag!("MLR"),
                by: 1,
            },
            C::locale_name("mhv", "Arakanese"),
            C::retire("mhv"),
            // Thailand Mon is written with the Mon tag per the registry's own note.
            C::RemoveSystemTag(systag!("MONT")),
            C::add("mnw", systag!("MONT")),
            C::add("mnw-TH", systag!("MONT")),
            C::add("no", systag!("NOR")),
            C::add("oc-provenc", systag!("PRO")),
            C::RemoveSystemTag(systag!("QUZ")),
            C::add("qu", systag!("QUZ")),
        ];
        steps.extend(QUECHUA.iter().map(|(locale, tag)| C::add(locale, *tag)));
        steps.extend([
            C::add_member("ro-MD", "mo"),
            C::RemoveSystemTag(systag!("SYRE")),
            C::RemoveSystemTag(systag!("SYRJ")),
            C::RemoveSystemTag(systag!("SYRN")),
            C::add("und-Syre", systag!("SYRE")),
            C::add("und-Syrj", systag!("SYRJ")),
            C::add("und-Syrn", systag!("SYRN")),
            C::locale_name("xst", "Silt'e"),
            C::retire("xst"),
            C::macrolanguage("xst", &["stv", "wle"]),
            C::add("xwo", systag!("TOD")),
            C::RemoveSystemTag(systag!("ZHH")),
            C::RemoveSystemTag(systag!("ZHP")),
            C::RemoveSystemTag(systag!("ZHT")),
            C::RemoveSystemTag(systag!("ZHTM")),
            C::remove_member("zh", "lzh"),
            C::remove_member("zh", "yue"),
        ]);
        steps.extend(CHINESE.iter().map(|(locale, tag)| C::add(locale, *tag)));

        // Akan and Twi are registered as each other's equals; prefer the exact match.
        Self { steps, rank_deltas: vec![] }
            .rank_delta("ak", systag!("AKA"), -1)
            .rank_delta("tw", systag!("TWI"), -1)
    }
}

/// Curated answers for language system tags that several locale tags could claim.
///
/// See [`crate::disambiguation`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Disambiguation(pub BTreeMap<SystemTag, String>);

impl Disambiguation {
    #[must_use]
    pub const fn empty() -> Self {
        Self(BTreeMap::new())
    }

    #[must_use]
    pub fn with(mut self, tag: SystemTag, locale: &str) -> Self {
        self.0.insert(tag, locale.to_owned());
        self
    }
}

impl Default for Disambiguation {
    fn default() -> Self {
        Self(
            [
                ("ALT", "alt"),
                ("ARK", "rki"),
                ("ATH", "ath"),
                ("BHI", "bhb"),
                ("BLN", "bjt"),
                ("BTI", "beb"),
                ("CCHN", "cco"),
                ("CMR", "swb"),
                ("CPP", "crp"),
                ("CRR", "crx"),
                ("DUJ", "dwu"),
                ("ECR", "crj"),
                ("HAL", "cfm"),
                ("HND", "hnd"),
                ("HYE", "hyw"),
                ("KIS", "kqs"),
                ("LRC", "bqi"),
                ("NDB", "nd"),
                ("NIS", "njz"),
                ("PLG", "pce"),
                ("PRO", "pro"),
                ("QIN", "bgr"),
                ("QUH", "quh"),
                ("QVI", "qvi"),
                ("QWH", "qwh"),
                ("SIG", "stv"),
                ("SRB", "sr"),
                ("SXT", "xnj"),
                ("ZHH", "zh-HK"),
                ("ZHS", "zh-Hans"),
                ("ZHT", "zh-Hant"),
                ("ZHTM", "zh-Hant-MO"),
            ]
            .into_iter()
            .map(|(tag, locale)| (SystemTag::from_literal(tag), locale.to_owned()))
            .collect(),
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn curated_set_keeps_its_order() {
        let corrections = Corrections::default();
        let pgr_removal = corrections
            .steps
            .iter()
            .position(|s| *s == Correction::RemoveSystemTag(systag!("PGR")));
        let pgr_addition = corrections
            .steps
            .iter()
            .position(|s| *s == Correction::add("el-polyton", systag!("PGR")));
        assert!(pgr_removal < pgr_addition);

        let zh_removal = corrections
            .steps
            .iter()
            .position(|s| *s == Correction::remove_member("zh", "yue"));
        let yue_addition = corrections
            .steps
            .iter()
            .position(|s| *s == Correction::add("yue", systag!("ZHH")));
        assert!(zh_removal.is_some() && zh_removal < yue_addition);
    }

    #[test]
    fn rank_deltas_are_per_locale() {
        let corrections = Corrections::default();
        assert_eq!(corrections.delta("ak", systag!("AKA")), -1);
        assert_eq!(corrections.delta("tw", systag!("TWI")), -1);
        assert_eq!(corrections.delta("ak", systag!("TWI")), 0);
        assert_eq!(corrections.delta("fat", systag!("AKA")), 0);
    }

    #[test]
    fn curated_disambiguation() {
        let disambiguation = Disambiguation::default();
        assert_eq!(
            disambiguation.0.get(&systag!("ZHTM")).map(String::as_str),
            Some("zh-Hant-MO")
        );
        assert_eq!(disambiguation.0.len(), 32);
    }
}
