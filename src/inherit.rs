//! Propagation of language system tags across macrolanguages.
//!
//! An individual language with no tag of its own usually wants its macrolanguage's, e.g. Tosk
//! Albanian (`als`) falls back to `SQI` through `sq`. The reverse holds for macrolanguages whose
//! individual languages all agree. A tag that the registry deliberately restricts to some of
//! the individual languages (`INUK` covers `ike` but not `ikt`) is blocked from spreading.

use std::collections::BTreeSet;

use crate::mapping::Uninherited;
use crate::{Reconciler, SystemTag};

/// Inheritance state kept across passes.
///
/// The first [`Inheritance::run`] snapshots the mapping as corrected but not yet inherited;
/// later passes draw their candidates from that snapshot so inherited tags never cascade
/// through a second level of macrolanguages.
#[derive(Clone, Debug, Default)]
pub struct Inheritance {
    uninherited: Option<Uninherited>,
}

impl Inheritance {
    /// The mapping as it was before the first pass, if a pass ran.
    #[must_use]
    pub const fn uninherited(&self) -> Option<&Uninherited> {
        self.uninherited.as_ref()
    }

    #[must_use]
    pub fn into_uninherited(self) -> Option<Uninherited> {
        self.uninherited
    }

    /// Run one pass over every macrolanguage, in key order.
    ///
    /// The graph is iterated as it was when the pass started; macrolanguages derived while
    /// inheriting are picked up by the next pass.
    pub fn run(&mut self, reconciler: &mut Reconciler) {
        let first = self.uninherited.is_none();
        let uninherited = &*self
            .uninherited
            .get_or_insert_with(|| reconciler.mapping().snapshot());
        #[cfg(feature = "tracing")]
        tracing::debug!(first, "inheriting across macrolanguages");

        let graph = reconciler.graph().clone();
        for (macrolanguage, languages) in graph.iter() {
            match uninherited.get(macrolanguage) {
                Some(candidates) if !candidates.is_empty() => {
                    inherit_down(reconciler, macrolanguage, languages, candidates);
                }
                _ if first => lift_unanimous(reconciler, uninherited, macrolanguage, languages),
                _ => {}
            }
        }
    }
}

/// Non-retired tags among `tags`.
fn active<'a, I>(reconciler: &Reconciler, tags: I) -> BTreeSet<&'a str>
where
    I: IntoIterator<Item = &'a String>,
{
    tags.into_iter()
        .map(String::as_str)
        .filter(|tag| !reconciler.subtags().is_retired(tag))
        .collect()
}

/// Whether `tag` already covers some, but not all, of the individual languages.
fn is_blocked(reconciler: &Reconciler, tag: SystemTag, languages: &BTreeSet<String>) -> bool {
    let Some(mapped) = reconciler.mapping().locale_tags(tag) else {
        return false;
    };
    let mapped = active(reconciler, mapped);
    let languages = active(reconciler, languages);
    let covered = mapped.intersection(&languages).count();
    covered != 0 && covered != languages.len()
}

fn inherit_down(
    reconciler: &mut Reconciler,
    macrolanguage: &str,
    languages: &BTreeSet<String>,
    candidates: &BTreeSet<SystemTag>,
) {
    let blocked = if reconciler.subtags().is_retired(macrolanguage) {
        BTreeSet::new()
    } else {
        candidates
            .iter()
            .copied()
            .filter(|tag| is_blocked(reconciler, *tag, languages))
            .collect::<BTreeSet<_>>()
    };
    #[cfg(feature = "tracing")]
    for tag in &blocked {
        tracing::warn!(
            macrolanguage,
            %tag,
            "language system tag only covers some individual languages; not inherited"
        );
    }
    let bump = i32::try_from(languages.len()).unwrap_or(i32::MAX);
    for tag in candidates.difference(&blocked).copied() {
        for language in languages {
            #[cfg(feature = "tracing")]
            tracing::trace!(macrolanguage, language, %tag, "inherited");
            reconciler.add_mapping(language, tag);
        }
        if blocked.is_empty() {
            reconciler.systems_mut().bump_rank(tag, bump);
        }
    }
}

/// Give `macrolanguage` the tags of its individual languages when they all have the same ones.
fn lift_unanimous(
    reconciler: &mut Reconciler,
    uninherited: &Uninherited,
    macrolanguage: &str,
    languages: &BTreeSet<String>,
) {
    let mut sets = languages.iter().map(|language| uninherited.get(language));
    let Some(Some(first)) = sets.next() else {
        return;
    };
    if first.is_empty() || !sets.all(|set| set == Some(first)) {
        return;
    }
    for tag in first.iter().copied() {
        #[cfg(feature = "tracing")]
        tracing::trace!(macrolanguage, %tag, "lifted from every individual language");
        reconciler.add_mapping(macrolanguage, tag);
    }
}
