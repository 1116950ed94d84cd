use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;

use super::model::ApproachRef;
use super::time::parse_date;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum FilterError {
    /// A criterion that no filter kind can evaluate.
    #[error("unsupported criterion: {0}")]
    UnsupportedCriterion(String),

    #[error("invalid value '{value}' for {attribute}")]
    InvalidValue { attribute: Attribute, value: String },
}

// ---------------------------------------------------------------------------
// Comparison operators and attributes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparison {
    Equal,
    GreaterOrEqual,
    LessOrEqual,
}

impl Comparison {
    /// `lhs OP rhs`. Any comparison involving NaN is false.
    pub fn compare<T: PartialOrd>(self, lhs: &T, rhs: &T) -> bool {
        match self {
            Comparison::Equal => lhs == rhs,
            Comparison::GreaterOrEqual => lhs >= rhs,
            Comparison::LessOrEqual => lhs <= rhs,
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            Comparison::Equal => "=",
            Comparison::GreaterOrEqual => ">=",
            Comparison::LessOrEqual => "<=",
        }
    }
}

/// The attribute of a close approach (or its NEO) a filter compares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    /// Calendar date of the approach time.
    Date,
    /// Nominal approach distance (au).
    Distance,
    /// Relative approach velocity (km/s).
    Velocity,
    /// Diameter of the linked NEO (km).
    Diameter,
    /// Potentially-hazardous flag of the linked NEO.
    Hazardous,
}

impl Attribute {
    pub fn as_str(self) -> &'static str {
        match self {
            Attribute::Date => "date",
            Attribute::Distance => "distance",
            Attribute::Velocity => "velocity",
            Attribute::Diameter => "diameter",
            Attribute::Hazardous => "hazardous",
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Attribute {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "date" => Ok(Attribute::Date),
            "distance" => Ok(Attribute::Distance),
            "velocity" => Ok(Attribute::Velocity),
            "diameter" => Ok(Attribute::Diameter),
            "hazardous" => Ok(Attribute::Hazardous),
            other => Err(FilterError::UnsupportedCriterion(format!("unknown attribute '{other}'"))),
        }
    }
}

/// A reference value for [`AttributeFilter::new`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CriterionValue {
    Date(NaiveDate),
    Number(f64),
    Flag(bool),
}

// ---------------------------------------------------------------------------
// AttributeFilter – one predicate over a close approach
// ---------------------------------------------------------------------------

/// Compares one attribute of an approach against a reference value.
///
/// Diameter and hazardous filters read the linked NEO; on an unlinked approach they
/// evaluate to `false`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AttributeFilter {
    Date(Comparison, NaiveDate),
    Distance(Comparison, f64),
    Velocity(Comparison, f64),
    Diameter(Comparison, f64),
    Hazardous(Comparison, bool),
}

impl AttributeFilter {
    /// Build a filter for `attribute`, checking that `value` has the attribute's type.
    pub fn new(attribute: Attribute, op: Comparison, value: CriterionValue) -> Result<Self, FilterError> {
        match (attribute, value) {
            (Attribute::Date, CriterionValue::Date(d)) => Ok(AttributeFilter::Date(op, d)),
            (Attribute::Distance, CriterionValue::Number(v)) => Ok(AttributeFilter::Distance(op, v)),
            (Attribute::Velocity, CriterionValue::Number(v)) => Ok(AttributeFilter::Velocity(op, v)),
            (Attribute::Diameter, CriterionValue::Number(v)) => Ok(AttributeFilter::Diameter(op, v)),
            (Attribute::Hazardous, CriterionValue::Flag(b)) => Ok(AttributeFilter::Hazardous(op, b)),
            (attribute, value) => Err(FilterError::UnsupportedCriterion(format!(
                "{attribute} cannot be compared with {value:?}"
            ))),
        }
    }

    pub fn attribute(&self) -> Attribute {
        match self {
            AttributeFilter::Date(..) => Attribute::Date,
            AttributeFilter::Distance(..) => Attribute::Distance,
            AttributeFilter::Velocity(..) => Attribute::Velocity,
            AttributeFilter::Diameter(..) => Attribute::Diameter,
            AttributeFilter::Hazardous(..) => Attribute::Hazardous,
        }
    }

    pub fn comparison(&self) -> Comparison {
        match *self {
            AttributeFilter::Date(op, _)
            | AttributeFilter::Distance(op, _)
            | AttributeFilter::Velocity(op, _)
            | AttributeFilter::Diameter(op, _)
            | AttributeFilter::Hazardous(op, _) => op,
        }
    }

    /// Evaluate `extract(approach) OP value`.
    pub fn matches(&self, approach: &ApproachRef<'_>) -> bool {
        match *self {
            AttributeFilter::Date(op, date) => op.compare(&approach.time.date(), &date),
            AttributeFilter::Distance(op, v) => op.compare(&approach.distance, &v),
            AttributeFilter::Velocity(op, v) => op.compare(&approach.velocity, &v),
            AttributeFilter::Diameter(op, v) => approach
                .neo()
                .is_some_and(|neo| op.compare(&neo.diameter, &v)),
            AttributeFilter::Hazardous(op, flag) => approach
                .neo()
                .is_some_and(|neo| op.compare(&neo.hazardous, &flag)),
        }
    }
}

impl fmt::Display for AttributeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (attr, op) = (self.attribute(), self.comparison().symbol());
        match self {
            AttributeFilter::Date(_, d) => write!(f, "{attr}{op}{}", d.format("%Y-%m-%d")),
            AttributeFilter::Distance(_, v)
            | AttributeFilter::Velocity(_, v)
            | AttributeFilter::Diameter(_, v) => write!(f, "{attr}{op}{v}"),
            AttributeFilter::Hazardous(_, b) => write!(f, "{attr}{op}{b}"),
        }
    }
}

/// Parses `<attribute><op><value>`, e.g. `distance<=0.1`, `date>=2020-01-01`, `hazardous=true`.
impl FromStr for AttributeFilter {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Two-character operators first so `>=` is not read as `=`.
        let (pos, op, width) = [(">=", Comparison::GreaterOrEqual), ("<=", Comparison::LessOrEqual), ("=", Comparison::Equal)]
            .iter()
            .find_map(|(sym, op)| s.find(sym).map(|pos| (pos, *op, sym.len())))
            .ok_or_else(|| FilterError::UnsupportedCriterion(format!("no =, >= or <= in '{s}'")))?;

        let attribute: Attribute = s[..pos].parse()?;
        let raw = s[pos + width..].trim();
        let invalid = || FilterError::InvalidValue {
            attribute,
            value: raw.to_string(),
        };

        let value = match attribute {
            Attribute::Date => CriterionValue::Date(parse_date(raw).map_err(|_| invalid())?),
            Attribute::Distance | Attribute::Velocity | Attribute::Diameter => {
                CriterionValue::Number(raw.parse::<f64>().map_err(|_| invalid())?)
            }
            Attribute::Hazardous => CriterionValue::Flag(raw.parse::<bool>().map_err(|_| invalid())?),
        };
        AttributeFilter::new(attribute, op, value)
    }
}

// ---------------------------------------------------------------------------
// Criteria → filters
// ---------------------------------------------------------------------------

/// User criteria for a close-approach query. Every field is optional; bounds are inclusive.
///
/// Setting `date` together with `start_date`/`end_date` is allowed and yields the
/// conjunction of all three; checking that combination is the caller's job.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Criteria {
    pub date: Option<NaiveDate>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub distance_min: Option<f64>,
    pub distance_max: Option<f64>,
    pub velocity_min: Option<f64>,
    pub velocity_max: Option<f64>,
    pub diameter_min: Option<f64>,
    pub diameter_max: Option<f64>,
    pub hazardous: Option<bool>,
}

/// One filter per present criterion; the result is their conjunction for
/// [`NeoDatabase::query`](super::database::NeoDatabase::query).
pub fn create_filters(criteria: &Criteria) -> Vec<AttributeFilter> {
    use AttributeFilter as F;
    use Comparison::{Equal, GreaterOrEqual, LessOrEqual};

    let candidates = [
        criteria.date.map(|d| F::Date(Equal, d)),
        criteria.start_date.map(|d| F::Date(GreaterOrEqual, d)),
        criteria.end_date.map(|d| F::Date(LessOrEqual, d)),
        criteria.distance_min.map(|v| F::Distance(GreaterOrEqual, v)),
        criteria.distance_max.map(|v| F::Distance(LessOrEqual, v)),
        criteria.velocity_min.map(|v| F::Velocity(GreaterOrEqual, v)),
        criteria.velocity_max.map(|v| F::Velocity(LessOrEqual, v)),
        criteria.diameter_min.map(|v| F::Diameter(GreaterOrEqual, v)),
        criteria.diameter_max.map(|v| F::Diameter(LessOrEqual, v)),
        criteria.hazardous.map(|b| F::Hazardous(Equal, b)),
    ];
    candidates.into_iter().flatten().collect()
}

/// Yield at most `n` items of `iter`. `None` and `Some(0)` both mean no limit.
pub fn limit<I: IntoIterator>(iter: I, n: Option<usize>) -> std::iter::Take<I::IntoIter> {
    let n = match n {
        None | Some(0) => usize::MAX,
        Some(n) => n,
    };
    iter.into_iter().take(n)
}
