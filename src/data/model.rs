use std::fmt;
use std::ops::Deref;

use anyhow::Result;
use chrono::NaiveDateTime;
use serde::Serialize;

use super::time::{cd_to_datetime, datetime_to_str};

// ---------------------------------------------------------------------------
// Identifiers into the database's owning collections
// ---------------------------------------------------------------------------

/// Position of a [`NearEarthObject`] in its database's NEO collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NeoId(pub(crate) usize);

/// Position of a [`CloseApproach`] in its database's approach collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ApproachId(pub(crate) usize);

impl NeoId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl ApproachId {
    pub fn index(self) -> usize {
        self.0
    }
}

// ---------------------------------------------------------------------------
// Raw records, as produced by the loaders
// ---------------------------------------------------------------------------

/// Field values for one NEO. Missing fields take the defaults of [`NearEarthObject`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NeoRecord {
    pub designation: String,
    pub name: Option<String>,
    pub diameter: Option<f64>,
    pub hazardous: Option<bool>,
}

/// Field values for one close approach. `time` is the compact `YYYY-Mon-DD hh:mm` form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApproachRecord {
    pub designation: String,
    pub time: String,
    pub distance: Option<f64>,
    pub velocity: Option<f64>,
}

// ---------------------------------------------------------------------------
// NearEarthObject
// ---------------------------------------------------------------------------

/// A near-Earth object: primary designation (unique), optional IAU name,
/// diameter in kilometers (NaN when unknown) and the potentially-hazardous flag.
///
/// `approaches` is filled once by [`NeoDatabase`](super::database::NeoDatabase)
/// while linking and is read-only afterwards.
#[derive(Debug, Clone)]
pub struct NearEarthObject {
    pub designation: String,
    pub name: Option<String>,
    pub diameter: f64,
    pub hazardous: bool,
    pub(crate) approaches: Vec<ApproachId>,
}

impl NearEarthObject {
    pub fn new(designation: impl Into<String>) -> Self {
        Self::from(NeoRecord {
            designation: designation.into(),
            ..NeoRecord::default()
        })
    }

    /// `"{designation} ({name})"` when the NEO is named, otherwise just the designation.
    pub fn fullname(&self) -> String {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => format!("{} ({name})", self.designation),
            _ => self.designation.clone(),
        }
    }

    /// Whether the diameter is known. NaN never compares equal, so use this instead.
    pub fn has_known_diameter(&self) -> bool {
        !self.diameter.is_nan()
    }

    /// Linked approaches, in close-approach collection order.
    pub fn approach_ids(&self) -> &[ApproachId] {
        &self.approaches
    }

    pub fn serialize(&self) -> SerializedNeo {
        SerializedNeo {
            designation: self.designation.clone(),
            name: self.name.clone().unwrap_or_default(),
            diameter_km: self.diameter,
            potentially_hazardous: self.hazardous,
        }
    }
}

impl From<NeoRecord> for NearEarthObject {
    fn from(record: NeoRecord) -> Self {
        NearEarthObject {
            designation: record.designation,
            name: record.name,
            diameter: record.diameter.unwrap_or(f64::NAN),
            hazardous: record.hazardous.unwrap_or(false),
            approaches: Vec::new(),
        }
    }
}

impl fmt::Display for NearEarthObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hazard = if self.hazardous { "is" } else { "is not" };
        if self.has_known_diameter() {
            write!(
                f,
                "NEO {} has a diameter of {:.3} km and {hazard} potentially hazardous.",
                self.fullname(),
                self.diameter
            )
        } else {
            write!(
                f,
                "NEO {} has an unknown diameter and {hazard} potentially hazardous.",
                self.fullname()
            )
        }
    }
}

// ---------------------------------------------------------------------------
// CloseApproach
// ---------------------------------------------------------------------------

/// One close approach of an NEO to Earth: time (UTC), nominal distance in au
/// and relative velocity in km/s.
#[derive(Debug, Clone)]
pub struct CloseApproach {
    /// Designation of the approaching NEO. Not guaranteed to resolve.
    pub designation: String,
    pub time: NaiveDateTime,
    pub distance: f64,
    pub velocity: f64,
    pub(crate) neo: Option<NeoId>,
}

impl CloseApproach {
    pub fn new(designation: impl Into<String>, time: NaiveDateTime, distance: f64, velocity: f64) -> Self {
        CloseApproach {
            designation: designation.into(),
            time,
            distance,
            velocity,
            neo: None,
        }
    }

    /// The linked NEO, or `None` when the designation did not resolve.
    pub fn neo_id(&self) -> Option<NeoId> {
        self.neo
    }

    pub fn time_str(&self) -> String {
        datetime_to_str(&self.time)
    }
}

impl TryFrom<ApproachRecord> for CloseApproach {
    type Error = anyhow::Error;

    fn try_from(record: ApproachRecord) -> Result<Self> {
        let time = cd_to_datetime(&record.time)?;
        Ok(CloseApproach::new(
            record.designation,
            time,
            record.distance.unwrap_or(0.0),
            record.velocity.unwrap_or(0.0),
        ))
    }
}

// ---------------------------------------------------------------------------
// ApproachRef – an approach together with its resolved NEO
// ---------------------------------------------------------------------------

/// Borrowed view of a close approach and the NEO it is linked to.
///
/// Dereferences to the underlying [`CloseApproach`].
#[derive(Debug, Clone, Copy)]
pub struct ApproachRef<'db> {
    approach: &'db CloseApproach,
    neo: Option<&'db NearEarthObject>,
}

impl<'db> ApproachRef<'db> {
    pub(crate) fn new(approach: &'db CloseApproach, neo: Option<&'db NearEarthObject>) -> Self {
        ApproachRef { approach, neo }
    }

    pub fn approach(&self) -> &'db CloseApproach {
        self.approach
    }

    pub fn neo(&self) -> Option<&'db NearEarthObject> {
        self.neo
    }

    /// Full name of the linked NEO, falling back to the raw designation.
    pub fn fullname(&self) -> String {
        match self.neo {
            Some(neo) => neo.fullname(),
            None => self.approach.designation.clone(),
        }
    }

    pub fn serialize(&self) -> SerializedApproach {
        SerializedApproach {
            datetime_utc: self.approach.time_str(),
            distance_au: self.approach.distance,
            velocity_km_s: self.approach.velocity,
            neo: self.neo.map(NearEarthObject::serialize),
        }
    }
}

impl Deref for ApproachRef<'_> {
    type Target = CloseApproach;

    fn deref(&self) -> &CloseApproach {
        self.approach
    }
}

impl fmt::Display for ApproachRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "On {}, '{}' approaches Earth at a distance of {:.2} au and a velocity of {:.2} km/s.",
            self.approach.time_str(),
            self.fullname(),
            self.approach.distance,
            self.approach.velocity
        )
    }
}

// ---------------------------------------------------------------------------
// Serialized forms
// ---------------------------------------------------------------------------

/// Plain mapping of an NEO. A missing name becomes `""`; an unknown diameter stays NaN.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SerializedNeo {
    pub designation: String,
    pub name: String,
    pub diameter_km: f64,
    pub potentially_hazardous: bool,
}

/// Plain mapping of a close approach with its NEO nested (`None` when unlinked).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SerializedApproach {
    pub datetime_utc: String,
    pub distance_au: f64,
    pub velocity_km_s: f64,
    pub neo: Option<SerializedNeo>,
}
