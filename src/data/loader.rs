use std::path::Path;

use anyhow::{bail, Context, Result};
use log::info;
use serde::Deserialize;
use serde_json::Value as JsonValue;

use super::database::NeoDatabase;
use super::model::{ApproachRecord, CloseApproach, NearEarthObject, NeoRecord};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load both datasets and link them into a [`NeoDatabase`].
pub fn load_database(neo_path: &Path, cad_path: &Path) -> Result<NeoDatabase> {
    let neos = load_neos(neo_path)?;
    let approaches = load_approaches(cad_path)?;
    Ok(NeoDatabase::new(neos, approaches))
}

// ---------------------------------------------------------------------------
// NEO CSV loader
// ---------------------------------------------------------------------------

/// The columns we use from the NEO CSV; every other column is ignored.
#[derive(Debug, Deserialize)]
struct NeoRow {
    pdes: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    diameter: Option<f64>,
    #[serde(default)]
    pha: Option<String>,
}

impl From<NeoRow> for NeoRecord {
    fn from(row: NeoRow) -> Self {
        NeoRecord {
            designation: row.pdes.trim().to_string(),
            name: row
                .name
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
            diameter: row.diameter,
            hazardous: Some(row.pha.as_deref().map(str::trim) == Some("Y")),
        }
    }
}

/// Read NEOs from a CSV file with a header row.
///
/// Uses `pdes` (designation), `name` (empty → no name), `diameter` in km
/// (empty → unknown) and `pha` (`Y` → potentially hazardous).
pub fn load_neos(path: &Path) -> Result<Vec<NearEarthObject>> {
    let reader = csv::Reader::from_path(path)
        .with_context(|| format!("opening NEO CSV {}", path.display()))?;
    let neos = read_neos(reader)?;
    info!("Loaded {} NEOs from {}", neos.len(), path.display());
    Ok(neos)
}

fn read_neos<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<Vec<NearEarthObject>> {
    let mut neos = Vec::new();
    for (row_no, result) in reader.deserialize::<NeoRow>().enumerate() {
        let row = result.with_context(|| format!("NEO CSV row {row_no}"))?;
        if row.pdes.trim().is_empty() {
            bail!("NEO CSV row {row_no}: empty 'pdes'");
        }
        neos.push(NearEarthObject::from(NeoRecord::from(row)));
    }
    Ok(neos)
}

// ---------------------------------------------------------------------------
// Close-approach JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (the SBDB close-approach API layout):
///
/// ```json
/// {
///   "fields": ["des", "orbit_id", "jd", "cd", "dist", "dist_min", "dist_max", "v_rel", ...],
///   "data": [
///     ["170903", "105", "2415020.507669610", "1900-Jan-01 00:11", "0.0921795123769547", ...],
///     ...
///   ]
/// }
/// ```
#[derive(Debug, Deserialize)]
struct CadDocument {
    fields: Vec<String>,
    data: Vec<Vec<JsonValue>>,
}

/// Read close approaches from a JSON file, locating columns through `fields`.
pub fn load_approaches(path: &Path) -> Result<Vec<CloseApproach>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading close-approach JSON {}", path.display()))?;
    let approaches = parse_approaches(&text)?;
    info!("Loaded {} close approaches from {}", approaches.len(), path.display());
    Ok(approaches)
}

fn parse_approaches(text: &str) -> Result<Vec<CloseApproach>> {
    let doc: CadDocument = serde_json::from_str(text).context("parsing close-approach JSON")?;

    let index_of = |name: &str| {
        doc.fields
            .iter()
            .position(|f| f == name)
            .with_context(|| format!("close-approach JSON missing '{name}' field"))
    };
    let des_idx = index_of("des")?;
    let cd_idx = index_of("cd")?;
    let dist_idx = index_of("dist")?;
    let v_idx = index_of("v_rel")?;

    let mut approaches = Vec::with_capacity(doc.data.len());
    for (row_no, entry) in doc.data.iter().enumerate() {
        let record = ApproachRecord {
            designation: json_to_string(entry.get(des_idx))
                .with_context(|| format!("Row {row_no}: missing 'des'"))?,
            time: json_to_string(entry.get(cd_idx))
                .with_context(|| format!("Row {row_no}: missing 'cd'"))?,
            distance: json_to_f64(entry.get(dist_idx), row_no, "dist")?,
            velocity: json_to_f64(entry.get(v_idx), row_no, "v_rel")?,
        };
        let approach =
            CloseApproach::try_from(record).with_context(|| format!("Row {row_no}: bad 'cd'"))?;
        approaches.push(approach);
    }
    Ok(approaches)
}

fn json_to_string(val: Option<&JsonValue>) -> Option<String> {
    match val? {
        JsonValue::String(s) => Some(s.trim().to_string()),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Numbers arrive as JSON strings in the SBDB export; null or missing means absent.
fn json_to_f64(val: Option<&JsonValue>, row: usize, col: &str) -> Result<Option<f64>> {
    match val {
        None | Some(JsonValue::Null) => Ok(None),
        Some(JsonValue::Number(n)) => Ok(n.as_f64()),
        Some(JsonValue::String(s)) if s.trim().is_empty() => Ok(None),
        Some(JsonValue::String(s)) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .with_context(|| format!("Row {row}, {col}: '{s}' is not a number")),
        Some(other) => bail!("Row {row}, {col}: unexpected value {other}"),
    }
}
