use std::collections::HashMap;

use log::{debug, warn};

use super::filter::AttributeFilter;
use super::model::{ApproachId, ApproachRef, CloseApproach, NearEarthObject, NeoId};

// ---------------------------------------------------------------------------
// NeoDatabase – the linked, indexed dataset
// ---------------------------------------------------------------------------

/// NEOs and their close approaches, linked together and indexed by designation and name.
///
/// Both collections are owned here and never change after construction. Links are
/// positions into those collections: each approach knows the [`NeoId`] it resolved to,
/// and each NEO lists its [`ApproachId`]s in approach collection order.
#[derive(Debug, Clone, Default)]
pub struct NeoDatabase {
    neos: Vec<NearEarthObject>,
    approaches: Vec<CloseApproach>,
    by_designation: HashMap<String, NeoId>,
    by_name: HashMap<String, NeoId>,
}

impl NeoDatabase {
    /// Build the indices and link every approach to the NEO with its designation.
    ///
    /// Duplicate designations or names resolve to the last NEO carrying them.
    /// Approaches whose designation matches no NEO stay unlinked.
    pub fn new(mut neos: Vec<NearEarthObject>, mut approaches: Vec<CloseApproach>) -> Self {
        let mut by_designation = HashMap::with_capacity(neos.len());
        let mut by_name = HashMap::new();

        for (i, neo) in neos.iter_mut().enumerate() {
            neo.approaches.clear();
            if by_designation.insert(neo.designation.clone(), NeoId(i)).is_some() {
                debug!("Duplicate designation '{}', keeping the later NEO", neo.designation);
            }
            if let Some(name) = neo.name.as_deref().filter(|n| !n.is_empty()) {
                by_name.insert(name.to_string(), NeoId(i));
            }
        }

        let mut unlinked = 0usize;
        for (i, approach) in approaches.iter_mut().enumerate() {
            approach.neo = by_designation.get(&approach.designation).copied();
            match approach.neo {
                Some(id) => neos[id.0].approaches.push(ApproachId(i)),
                None => unlinked += 1,
            }
        }

        debug!(
            "Indexed {} NEOs ({} named) and linked {} of {} close approaches",
            by_designation.len(),
            by_name.len(),
            approaches.len() - unlinked,
            approaches.len()
        );
        if unlinked > 0 {
            warn!("{unlinked} close approaches reference an unknown designation");
        }

        NeoDatabase {
            neos,
            approaches,
            by_designation,
            by_name,
        }
    }

    /// Exact-match lookup by primary designation.
    pub fn get_by_designation(&self, designation: &str) -> Option<&NearEarthObject> {
        self.by_designation.get(designation).map(|id| &self.neos[id.0])
    }

    /// Exact-match lookup by IAU name. An empty name never matches.
    pub fn get_by_name(&self, name: &str) -> Option<&NearEarthObject> {
        if name.is_empty() {
            return None;
        }
        self.by_name.get(name).map(|id| &self.neos[id.0])
    }

    pub fn neo(&self, id: NeoId) -> Option<&NearEarthObject> {
        self.neos.get(id.0)
    }

    pub fn approach(&self, id: ApproachId) -> Option<ApproachRef<'_>> {
        self.approaches.get(id.0).map(|ca| self.link(ca))
    }

    /// The NEO an approach resolved to, if any.
    pub fn neo_of(&self, approach: &CloseApproach) -> Option<&NearEarthObject> {
        approach.neo.and_then(|id| self.neos.get(id.0))
    }

    /// Approaches of the NEO with `neo`'s designation, in close-approach collection order.
    ///
    /// `neo` is resolved through this database's designation index, so an NEO from
    /// another database only yields approaches linked here.
    pub fn approaches_of<'db>(
        &'db self,
        neo: &NearEarthObject,
    ) -> impl Iterator<Item = ApproachRef<'db>> + 'db {
        let ids: &'db [ApproachId] = self
            .by_designation
            .get(&neo.designation)
            .map(|id| self.neos[id.0].approaches.as_slice())
            .unwrap_or(&[]);
        ids.iter().filter_map(move |id| self.approach(*id))
    }

    /// All NEOs in load order.
    pub fn neos(&self) -> &[NearEarthObject] {
        &self.neos
    }

    /// All approaches in load order, linked or not.
    pub fn approaches(&self) -> impl Iterator<Item = ApproachRef<'_>> + '_ {
        self.approaches.iter().map(move |ca| self.link(ca))
    }

    /// Lazily yield the approaches that satisfy every filter, in load order.
    ///
    /// An empty filter slice matches everything. Each call rescans from the start.
    pub fn query<'a>(
        &'a self,
        filters: &'a [AttributeFilter],
    ) -> impl Iterator<Item = ApproachRef<'a>> + 'a {
        self.approaches()
            .filter(move |approach| filters.iter().all(|f| f.matches(approach)))
    }

    pub fn neo_count(&self) -> usize {
        self.neos.len()
    }

    pub fn approach_count(&self) -> usize {
        self.approaches.len()
    }

    fn link<'db>(&'db self, approach: &'db CloseApproach) -> ApproachRef<'db> {
        ApproachRef::new(approach, self.neo_of(approach))
    }
}
