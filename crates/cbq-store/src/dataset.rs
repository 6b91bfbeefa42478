//! cBioPortal study directory loader.
//!
//! Reads the tab-separated flat files of a study (as downloaded from
//! cBioPortal's datahub) into a [`Dataset`]. Lines starting with `#` are
//! metadata and skipped; the first remaining line is the column header.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::memory::{Dataset, ExpressionRecord, MutationRecord, PatientRecord};

pub const MUTATIONS_FILE: &str = "data_mutations.txt";
pub const CLINICAL_PATIENT_FILE: &str = "data_clinical_patient.txt";
pub const EXPRESSION_FILE: &str = "data_mrna_seq_v2_rsem.txt";

/// Placeholder values cBioPortal uses for missing clinical data.
const MISSING_VALUES: &[&str] = &["", "NA", "[Not Available]", "[Not Applicable]", "[Unknown]"];

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{file}: missing column '{column}'")]
    MissingColumn { file: String, column: String },

    #[error("{file}: no header row")]
    Empty { file: String },
}

/// Load the three tables from `dir`.
///
/// The mutation file is required; clinical and expression files are
/// optional and yield empty tables when absent.
pub async fn load_dir(dir: &Path) -> Result<Dataset, DatasetError> {
    let mutations = match read_file(&dir.join(MUTATIONS_FILE)).await? {
        Some(content) => parse_mutations(&content)?,
        None => {
            return Err(DatasetError::Io {
                path: dir.join(MUTATIONS_FILE),
                source: std::io::ErrorKind::NotFound.into(),
            });
        }
    };

    let patients = match read_file(&dir.join(CLINICAL_PATIENT_FILE)).await? {
        Some(content) => parse_patients(&content)?,
        None => {
            tracing::warn!(
                dir = %dir.display(),
                "no clinical patient file, clinical queries will be empty"
            );
            Vec::new()
        }
    };

    let expression = match read_file(&dir.join(EXPRESSION_FILE)).await? {
        Some(content) => parse_expression(&content)?,
        None => {
            tracing::warn!(
                dir = %dir.display(),
                "no mRNA expression file, expression queries will find nothing"
            );
            Vec::new()
        }
    };

    Ok(Dataset {
        mutations,
        expression,
        patients,
    })
}

/// Read a file, mapping "not found" to `None`.
async fn read_file(path: &Path) -> Result<Option<String>, DatasetError> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(DatasetError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// A parsed TSV file: header columns plus data rows.
struct Table<'a> {
    file: &'a str,
    header: Vec<&'a str>,
    rows: Vec<Vec<&'a str>>,
}

impl<'a> Table<'a> {
    fn parse(file: &'a str, content: &'a str) -> Result<Self, DatasetError> {
        let mut lines = content
            .lines()
            .filter(|l| !l.starts_with('#') && !l.trim().is_empty());
        let header = lines
            .next()
            .ok_or_else(|| DatasetError::Empty { file: file.into() })?
            .split('\t')
            .map(str::trim)
            .collect();
        let rows = lines
            .map(|l| l.split('\t').map(str::trim).collect())
            .collect();
        Ok(Self { file, header, rows })
    }

    fn column(&self, name: &str) -> Result<usize, DatasetError> {
        self.header
            .iter()
            .position(|h| *h == name)
            .ok_or_else(|| DatasetError::MissingColumn {
                file: self.file.into(),
                column: name.into(),
            })
    }
}

fn cell<'a>(row: &[&'a str], idx: usize) -> Option<&'a str> {
    row.get(idx)
        .copied()
        .filter(|v| !MISSING_VALUES.contains(v))
}

/// Patient id of a sample barcode: the trailing `-NN` sample suffix is
/// removed (`TCGA-05-4244-01` → `TCGA-05-4244`).
pub fn patient_of(sample: &str) -> &str {
    match sample.rsplit_once('-') {
        Some((patient, suffix))
            if !patient.is_empty()
                && suffix.len() == 2
                && suffix.chars().all(|c| c.is_ascii_digit()) =>
        {
            patient
        }
        _ => sample,
    }
}

pub fn parse_mutations(content: &str) -> Result<Vec<MutationRecord>, DatasetError> {
    let table = Table::parse(MUTATIONS_FILE, content)?;
    let gene = table.column("Hugo_Symbol")?;
    let kind = table.column("Variant_Classification")?;
    let sample = table.column("Tumor_Sample_Barcode")?;

    Ok(table
        .rows
        .iter()
        .filter_map(|row| {
            Some(MutationRecord {
                gene: cell(row, gene)?.to_string(),
                patient_id: patient_of(cell(row, sample)?).to_string(),
                mutation_type: cell(row, kind)?.to_string(),
            })
        })
        .collect())
}

pub fn parse_patients(content: &str) -> Result<Vec<PatientRecord>, DatasetError> {
    let table = Table::parse(CLINICAL_PATIENT_FILE, content)?;
    let id = table.column("PATIENT_ID")?;
    let age = table.column("AGE")?;
    let stage = table.column("AJCC_PATHOLOGIC_TUMOR_STAGE")?;

    Ok(table
        .rows
        .iter()
        .filter_map(|row| {
            Some(PatientRecord {
                patient_id: cell(row, id)?.to_string(),
                age_at_diagnosis: cell(row, age).and_then(|a| a.parse().ok()),
                tumor_stage: cell(row, stage).map(String::from),
            })
        })
        .collect())
}

/// Expression rows keep the value of the first sample column (the column
/// right after the gene identifier columns).
pub fn parse_expression(content: &str) -> Result<Vec<ExpressionRecord>, DatasetError> {
    let table = Table::parse(EXPRESSION_FILE, content)?;
    let gene = table.column("Hugo_Symbol")?;
    let first_sample = table
        .header
        .iter()
        .position(|h| *h != "Hugo_Symbol" && *h != "Entrez_Gene_Id")
        .ok_or_else(|| DatasetError::MissingColumn {
            file: EXPRESSION_FILE.into(),
            column: "<sample>".into(),
        })?;

    Ok(table
        .rows
        .iter()
        .filter_map(|row| {
            Some(ExpressionRecord {
                gene: cell(row, gene)?.to_string(),
                value: cell(row, first_sample)?.parse().ok()?,
            })
        })
        .collect())
}
