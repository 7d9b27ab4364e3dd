//! A miniature pair of registries shared by the unit tests.

use crate::registry::{ScopeKind, SubtagKind, SubtagRecord, SystemTagRecord};
use crate::{
    Correction, Corrections, Disambiguation, Reconciler, SubtagRegistry, SystemRegistry, systag,
};

pub fn subtags() -> SubtagRegistry {
    let language = SubtagRecord::language;
    SubtagRegistry::from_records(
        "File-Date: 2024-01-01",
        [
            language("en").description("English"),
            language("ak")
                .description("Akan")
                .scope(ScopeKind::Macrolanguage),
            language("tw").description("Twi").macrolanguage("ak"),
            language("fat").description("Fanti").macrolanguage("ak"),
            language("zh")
                .description("Chinese")
                .scope(ScopeKind::Macrolanguage),
            language("cmn")
                .description("Mandarin Chinese")
                .macrolanguage("zh"),
            language("yue").description("Yue Chinese").macrolanguage("zh"),
            language("lzh")
                .description("Literary Chinese")
                .macrolanguage("zh"),
            language("iu")
                .description("Inuktitut")
                .scope(ScopeKind::Macrolanguage),
            language("ike")
                .description("Eastern Canadian Inuktitut")
                .macrolanguage("iu"),
            language("ikt").description("Inuinnaqtun").macrolanguage("iu"),
            language("sq")
                .description("Albanian")
                .scope(ScopeKind::Macrolanguage),
            language("als").description("Tosk Albanian").macrolanguage("sq"),
            language("kok")
                .description("Konkani (macrolanguage)")
                .scope(ScopeKind::Macrolanguage),
            language("gom").description("Goan Konkani").macrolanguage("kok"),
            language("knn")
                .description("Konkani (individual language)")
                .macrolanguage("kok"),
            language("el").description("Modern Greek (1453-)"),
            language("und")
                .description("Undetermined")
                .scope(ScopeKind::Special),
            language("fur").description("Friulian"),
            SubtagRecord::new(SubtagKind::Script, "Hant").description("Han (Traditional variant)"),
            SubtagRecord::new(SubtagKind::Script, "Hans").description("Han (Simplified variant)"),
            SubtagRecord::new(SubtagKind::Region, "MO").description("Macao"),
            SubtagRecord::new(SubtagKind::Region, "HK").description("Hong Kong"),
            SubtagRecord::new(SubtagKind::Region, "TW")
                .description("Taiwan, Province of China"),
            SubtagRecord::new(SubtagKind::Variant, "polyton")
                .description("Polytonic Greek")
                .prefix("el"),
            SubtagRecord::new(SubtagKind::Variant, "fonipa")
                .description("International Phonetic Alphabet"),
            SubtagRecord::new(SubtagKind::Grandfathered, "en-GB-oed")
                .description("English, Oxford English Dictionary spelling"),
        ],
    )
    .unwrap()
}

pub fn systems() -> SystemRegistry {
    SystemRegistry::from_records(
        "<meta name=\"updated_at\" content=\"2024-01-01\">",
        [
            SystemTagRecord::new(systag!("ENG"), "English").codes(["eng"]),
            SystemTagRecord::new(systag!("AKA"), "Akan").codes(["aka"]),
            SystemTagRecord::new(systag!("TWI"), "Twi").codes(["twi", "aka"]),
            SystemTagRecord::new(systag!("ZHS"), "Chinese, Simplified").codes(["zho"]),
            SystemTagRecord::new(systag!("ZHT"), "Chinese, Traditional").codes(["zho"]),
            SystemTagRecord::new(systag!("ZHH"), "Chinese, Traditional, Hong Kong SAR")
                .codes(["zho"]),
            SystemTagRecord::new(systag!("INU"), "Inuktitut").codes(["iku"]),
            SystemTagRecord::new(systag!("INUK"), "Nunavik Inuktitut").codes(["ike", "iku"]),
            SystemTagRecord::new(systag!("SQI"), "Albanian").codes(["sqi"]),
            SystemTagRecord::new(systag!("KOK"), "Konkani").codes(["gom", "knn"]),
            SystemTagRecord::new(systag!("ELL"), "Greek").codes(["ell"]),
            SystemTagRecord::new(systag!("PGR"), "Polytonic Greek").codes(["ell"]),
            SystemTagRecord::new(systag!("IPPH"), "Phonetic transcription, IPA conventions"),
            SystemTagRecord::new(systag!("FUR"), "Friulian"),
        ],
    )
    .unwrap()
}

pub fn loaded() -> Reconciler {
    Reconciler::new(subtags(), systems())
}

pub fn corrections() -> Corrections {
    Corrections::empty()
        .with(Correction::RemoveSystemTag(systag!("ZHT")))
        .with(Correction::RemoveSystemTag(systag!("ZHH")))
        .with(Correction::remove_member("zh", "yue"))
        .with(Correction::add("zh-Hant-MO", systag!("ZHH")))
        .with(Correction::add("zh-Hant", systag!("ZHT")))
        .with(Correction::add("zh-HK", systag!("ZHH")))
        .with(Correction::add("yue", systag!("ZHH")))
        .with(Correction::RemoveSystemTag(systag!("PGR")))
        .with(Correction::add("el-polyton", systag!("PGR")))
        .with(Correction::add("und-fonipa", systag!("IPPH")))
        .with(Correction::add("en-GB-oed", systag!("ENG")))
        .rank_delta("ak", systag!("AKA"), -1)
        .rank_delta("tw", systag!("TWI"), -1)
}

pub fn disambiguation() -> Disambiguation {
    Disambiguation::empty().with(systag!("ZHH"), "zh-HK")
}
