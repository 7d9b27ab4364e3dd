//! Macrolanguage → individual language relation of the subtag registry.
//!
//! The registry lets a language sit under several macrolanguages (directly, through deprecation
//! replacements, or through corrections). Inheritance needs a single parent per language, so
//! [`MacrolanguageGraph::normalize`] reduces the relation to a forest before the second pass.

use std::collections::{BTreeMap, BTreeSet};

use crate::Mapping;
use crate::error::{Error, Result};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MacrolanguageGraph {
    members: BTreeMap<String, BTreeSet<String>>,
}

impl MacrolanguageGraph {
    #[must_use]
    pub fn members(&self, macrolanguage: &str) -> Option<&BTreeSet<String>> {
        self.members.get(macrolanguage)
    }

    #[must_use]
    pub fn is_macrolanguage(&self, tag: &str) -> bool {
        self.members.contains_key(tag)
    }

    /// Every macrolanguage with its members, in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.members.iter().map(|(m, l)| (m.as_str(), l))
    }

    /// The macrolanguages that list `language`, in key order.
    pub fn parents<'a>(&'a self, language: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.members
            .iter()
            .filter(move |(_, members)| members.contains(language))
            .map(|(m, _)| m.as_str())
    }

    /// Record `language` as an individual language of `macrolanguage`.
    ///
    /// Tags without a language system mapping are transparent: an unmapped `language` also brings
    /// its own members along, and an unmapped `macrolanguage` that is itself a member elsewhere
    /// hands `language` to the first such parent instead.
    pub fn link(&mut self, macrolanguage: &str, language: &str, mapping: &Mapping) {
        let mut visited = BTreeSet::new();
        self.link_inner(macrolanguage, language, mapping, &mut visited);
    }

    fn link_inner(
        &mut self,
        macrolanguage: &str,
        language: &str,
        mapping: &Mapping,
        visited: &mut BTreeSet<String>,
    ) {
        if macrolanguage == language || !visited.insert(language.to_owned()) {
            return;
        }
        if !mapping.contains_locale(language) {
            let nested = self
                .members
                .get(language)
                .map(|members| members.iter().cloned().collect::<Vec<_>>())
                .unwrap_or_default();
            for member in nested {
                self.link_inner(macrolanguage, &member, mapping, visited);
            }
        }
        if !mapping.contains_locale(macrolanguage) {
            if let Some(members) = self
                .members
                .values_mut()
                .find(|members| members.contains(macrolanguage))
            {
                members.insert(language.to_owned());
                return;
            }
        }
        self.insert_member(macrolanguage, language);
    }

    pub fn insert_member(&mut self, macrolanguage: &str, language: &str) {
        self.members
            .entry(macrolanguage.to_owned())
            .or_default()
            .insert(language.to_owned());
    }

    /// Replace the member set of `macrolanguage` outright.
    pub fn replace(&mut self, macrolanguage: &str, members: BTreeSet<String>) {
        self.members.insert(macrolanguage.to_owned(), members);
    }

    /// # Errors
    /// [`Error::MissingMember`] if `language` is not listed under `macrolanguage`.
    pub fn remove_member(&mut self, macrolanguage: &str, language: &str) -> Result<()> {
        if self
            .members
            .get_mut(macrolanguage)
            .is_some_and(|members| members.remove(language))
        {
            return Ok(());
        }
        Err(Error::MissingMember {
            macrolanguage: macrolanguage.to_owned(),
            member: language.to_owned(),
        })
    }

    fn parents_by_member(&self) -> BTreeMap<&str, Vec<&str>> {
        let mut inverted = BTreeMap::<_, Vec<_>>::new();
        for (macrolanguage, members) in &self.members {
            for member in members {
                inverted
                    .entry(member.as_str())
                    .or_default()
                    .push(macrolanguage.as_str());
            }
        }
        inverted
    }

    /// Whether every language has at most one macrolanguage.
    #[must_use]
    pub fn is_forest(&self) -> bool {
        self.parents_by_member()
            .values()
            .all(|parents| parents.len() <= 1)
    }

    fn size(&self, macrolanguage: &str) -> usize {
        self.members.get(macrolanguage).map_or(0, BTreeSet::len)
    }

    /// Whether `to` is `from` or lies below it.
    fn reaches(&self, from: &str, to: &str) -> bool {
        let mut stack = vec![from];
        let mut seen = BTreeSet::new();
        while let Some(tag) = stack.pop() {
            if tag == to {
                return true;
            }
            if seen.insert(tag) {
                stack.extend(self.members.get(tag).into_iter().flatten().map(String::as_str));
            }
        }
        false
    }

    /// Move `loser` under `survivor`.
    ///
    /// An unmapped `loser` is transparent as in [`MacrolanguageGraph::link`]: its members move
    /// along, recursively. Nothing moves where it would close a cycle.
    fn adopt(
        &mut self,
        survivor: &str,
        loser: &str,
        mapping: &Mapping,
        visited: &mut BTreeSet<String>,
    ) {
        if !visited.insert(loser.to_owned()) {
            return;
        }
        if !mapping.contains_locale(loser) {
            let nested = self
                .members
                .get(loser)
                .map(|members| members.iter().cloned().collect::<Vec<_>>())
                .unwrap_or_default();
            for member in nested {
                if self.reaches(&member, survivor) {
                    continue;
                }
                if let Some(members) = self.members.get_mut(loser) {
                    members.remove(&member);
                }
                self.adopt(survivor, &member, mapping, visited);
            }
        }
        if !self.reaches(loser, survivor) {
            self.insert_member(survivor, loser);
        }
    }

    /// Make every language have at most one macrolanguage.
    ///
    /// Among competing parents the one with the most members survives (ties go to the
    /// lexically smallest tag). The others lose the language and move under the survivor,
    /// taking their members along when they have no mapping of their own.
    ///
    /// # Errors
    /// [`Error::UnsettledMacrolanguages`] if re-parenting keeps creating new conflicts.
    pub fn normalize(&mut self, mapping: &Mapping) -> Result<()> {
        let edges = self.members.values().map(BTreeSet::len).sum::<usize>();
        let limit = edges.saturating_add(self.members.len()).saturating_mul(4);
        for _ in 0..=limit {
            let Some((language, parents)) = self
                .parents_by_member()
                .into_iter()
                .find(|(_, parents)| parents.len() > 1)
                .map(|(language, parents)| {
                    (
                        language.to_owned(),
                        parents.into_iter().map(str::to_owned).collect::<Vec<_>>(),
                    )
                })
            else {
                return Ok(());
            };
            let Some(survivor) = parents
                .iter()
                .max_by(|a, b| self.size(a).cmp(&self.size(b)).then_with(|| b.cmp(a)))
                .cloned()
            else {
                return Ok(());
            };
            #[cfg(feature = "tracing")]
            tracing::debug!(language, ?parents, survivor, "collapsing macrolanguages");
            for loser in parents.iter().filter(|p| **p != survivor) {
                self.remove_member(loser, &language)?;
                self.adopt(&survivor, loser, mapping, &mut BTreeSet::new());
            }
        }
        #[cfg(feature = "tracing")]
        tracing::error!("macrolanguage hierarchy did not settle");
        Err(Error::UnsettledMacrolanguages)
    }
}
