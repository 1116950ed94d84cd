use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};
use log::info;
use serde::ser::{SerializeSeq, Serializer};
use serde::Serialize;

use crate::data::model::{ApproachRef, SerializedApproach};

// ---------------------------------------------------------------------------
// Output format selection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    Json,
}

impl OutputFormat {
    /// Pick the format from the file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        match ext.as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            other => bail!("Unsupported output extension: .{other} (expected .csv or .json)"),
        }
    }
}

/// Write approaches to `path` in the format its extension names. Returns the row count.
pub fn write_results<'db, I>(results: I, path: &Path) -> Result<usize>
where
    I: IntoIterator<Item = ApproachRef<'db>>,
{
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let writer = BufWriter::new(file);
    let written = match OutputFormat::from_path(path)? {
        OutputFormat::Csv => write_csv(results, writer)?,
        OutputFormat::Json => write_json(results, writer)?,
    };
    info!("Wrote {written} close approaches to {}", path.display());
    Ok(written)
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

/// One flat CSV row. NEO columns are empty for an unlinked approach.
#[derive(Debug, Serialize)]
struct CsvRow {
    datetime_utc: String,
    distance_au: f64,
    velocity_km_s: f64,
    designation: String,
    name: String,
    diameter_km: Option<f64>,
    potentially_hazardous: Option<bool>,
}

impl CsvRow {
    fn new(approach: &ApproachRef<'_>) -> Self {
        let SerializedApproach {
            datetime_utc,
            distance_au,
            velocity_km_s,
            neo,
        } = approach.serialize();

        match neo {
            Some(neo) => CsvRow {
                datetime_utc,
                distance_au,
                velocity_km_s,
                designation: neo.designation,
                name: neo.name,
                diameter_km: Some(neo.diameter_km).filter(|d| !d.is_nan()),
                potentially_hazardous: Some(neo.potentially_hazardous),
            },
            None => CsvRow {
                datetime_utc,
                distance_au,
                velocity_km_s,
                designation: approach.designation.clone(),
                name: String::new(),
                diameter_km: None,
                potentially_hazardous: None,
            },
        }
    }
}

/// Header: `datetime_utc,distance_au,velocity_km_s,designation,name,diameter_km,potentially_hazardous`.
pub fn write_csv<'db, I, W>(results: I, writer: W) -> Result<usize>
where
    I: IntoIterator<Item = ApproachRef<'db>>,
    W: Write,
{
    let mut csv_writer = csv::Writer::from_writer(writer);
    let mut count = 0;
    for approach in results {
        csv_writer
            .serialize(CsvRow::new(&approach))
            .with_context(|| format!("writing CSV row {count}"))?;
        count += 1;
    }
    if count == 0 {
        // serde only emits the header alongside the first record
        csv_writer.write_record([
            "datetime_utc",
            "distance_au",
            "velocity_km_s",
            "designation",
            "name",
            "diameter_km",
            "potentially_hazardous",
        ])?;
    }
    csv_writer.flush().context("flushing CSV output")?;
    Ok(count)
}

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

/// A JSON array of serialized approaches, each with its NEO nested under `neo`.
/// NaN diameters are written as `null`. Elements are written as they are pulled.
pub fn write_json<'db, I, W>(results: I, mut writer: W) -> Result<usize>
where
    I: IntoIterator<Item = ApproachRef<'db>>,
    W: Write,
{
    let mut count = 0;
    {
        let mut serializer = serde_json::Serializer::pretty(&mut writer);
        let mut seq = serializer.serialize_seq(None).context("writing JSON output")?;
        for approach in results {
            seq.serialize_element(&approach.serialize())
                .with_context(|| format!("writing JSON element {count}"))?;
            count += 1;
        }
        seq.end().context("writing JSON output")?;
    }
    writeln!(writer)?;
    writer.flush().context("flushing JSON output")?;
    Ok(count)
}
