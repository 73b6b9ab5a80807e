//! Gene annotations: GFF3 `gene` features reduced to `Gene_ID,Function` pairs.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read, Write};
use std::path::Path;

use csv::{ReaderBuilder, WriterBuilder};
use tracing::{debug, info};

use crate::data::io::create;
use crate::data::{FUNCTION_COLUMN, GENE_ID_COLUMN};
use crate::error::{ExpressionError, Result};

/// Default number of genes kept from an annotation file.
pub const DEFAULT_SUBSET_SIZE: usize = 500;

const UNKNOWN: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub gene_id: String,
    pub function: String,
}

/// Extract the `gene` features of a GFF3 stream, keeping the first
/// `subset_size` of them in file order.
///
/// `ID` becomes the gene id and `description` the function; either falls back
/// to `Unknown` when the attribute is absent. Comment lines and lines with
/// fewer than nine tab-separated fields are skipped.
pub fn parse_gff3<R: Read>(reader: R, subset_size: usize) -> Result<Vec<Annotation>> {
    let mut annotations = Vec::new();
    for line in BufReader::new(reader).lines() {
        if annotations.len() >= subset_size {
            break;
        }
        let line = line.map_err(|e| ExpressionError::io("<gff3>", e))?;
        if line.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = line.trim().split('\t').collect();
        if fields.len() < 9 || fields[2] != "gene" {
            continue;
        }

        let attributes: HashMap<&str, &str> = fields[8]
            .split(';')
            .filter_map(|attr| attr.split_once('='))
            .collect();
        annotations.push(Annotation {
            gene_id: attributes.get("ID").copied().unwrap_or(UNKNOWN).to_string(),
            function: attributes
                .get("description")
                .copied()
                .unwrap_or(UNKNOWN)
                .to_string(),
        });
    }
    debug!(genes = annotations.len(), subset_size, "parsed GFF3 gene features");
    Ok(annotations)
}

pub fn read_gff3(path: impl AsRef<Path>, subset_size: usize) -> Result<Vec<Annotation>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| ExpressionError::io(path, e))?;
    parse_gff3(file, subset_size)
}

pub fn write_annotations_to<W: Write>(writer: W, annotations: &[Annotation]) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_writer(writer);
    wtr.write_record([GENE_ID_COLUMN, FUNCTION_COLUMN])?;
    for annotation in annotations {
        wtr.write_record([annotation.gene_id.as_str(), annotation.function.as_str()])?;
    }
    wtr.flush().map_err(|e| ExpressionError::io("<annotations>", e))
}

pub fn write_annotations(path: impl AsRef<Path>, annotations: &[Annotation]) -> Result<()> {
    let path = path.as_ref();
    write_annotations_to(create(path)?, annotations)?;
    info!(path = %path.display(), genes = annotations.len(), "saved annotation subset");
    Ok(())
}

/// Read a `Gene_ID,Function` table into a lookup map.
///
/// Later rows win when a gene id repeats.
pub fn parse_annotations<R: Read>(reader: R) -> Result<HashMap<String, String>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(reader);
    let headers = rdr.headers()?.clone();
    let gene_col = headers
        .iter()
        .position(|h| h.trim() == GENE_ID_COLUMN)
        .ok_or(ExpressionError::MissingKeyColumn {
            column: GENE_ID_COLUMN,
        })?;
    let function_col = headers
        .iter()
        .position(|h| h.trim() == FUNCTION_COLUMN)
        .ok_or(ExpressionError::MissingKeyColumn {
            column: FUNCTION_COLUMN,
        })?;

    let mut map = HashMap::new();
    for row in rdr.records() {
        let row = row?;
        if let (Some(gene_id), Some(function)) = (row.get(gene_col), row.get(function_col)) {
            map.insert(gene_id.trim().to_string(), function.trim().to_string());
        }
    }
    Ok(map)
}

pub fn read_annotations(path: impl AsRef<Path>) -> Result<HashMap<String, String>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| ExpressionError::io(path, e))?;
    parse_annotations(file)
}
