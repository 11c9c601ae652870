// crates/knave-data/src/loader.rs

//! Raw dataset loaders: CSV (label in column 0) and LIBSVM/SVMLight.
//!
//! Loaders read into a [`RawTable`] of string labels and untyped cells; the
//! numeric-vs-categorical decision belongs to the preprocessing fit, not to
//! the loader.

use anyhow::{Context as _, Result};
use knave_core::DataError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::{BufRead as _, BufReader};
use std::path::Path;

/// Supported on-disk dataset formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetFormat {
    /// Comma-separated values, ground-truth label in column 0, no header.
    Csv,
    /// LIBSVM/SVMLight sparse format: `label idx:value ...`, 1-based indices.
    Libsvm,
}

impl fmt::Display for DatasetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Csv => write!(f, "csv"),
            Self::Libsvm => write!(f, "libsvm"),
        }
    }
}

/// One raw feature cell, numeric when it parses as a float.
#[derive(Clone, Debug, PartialEq)]
pub enum RawCell {
    /// Parsed floating-point value.
    Num(f64),
    /// Anything else, kept verbatim as a categorical symbol.
    Sym(String),
}

impl RawCell {
    /// The cell's categorical representation.
    #[must_use]
    pub fn repr(&self) -> String {
        match self {
            Self::Num(v) => v.to_string(),
            Self::Sym(s) => s.clone(),
        }
    }
}

/// A loaded, untyped dataset: string labels plus rectangular cell rows.
#[derive(Clone, Debug, Default)]
pub struct RawTable {
    /// Ground-truth labels, one per row.
    pub labels: Vec<String>,
    /// Feature cells, one row per point.
    pub rows: Vec<Vec<RawCell>>,
}

impl RawTable {
    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of feature columns (0 for an empty table).
    #[must_use]
    pub fn n_columns(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    /// Extend every row with zero cells up to `width` columns (sparse
    /// formats leave trailing features implicit).
    pub fn pad_columns(&mut self, width: usize) {
        for row in &mut self.rows {
            while row.len() < width {
                row.push(RawCell::Num(0.0));
            }
        }
    }
}

/// Read a raw table in the given format.
///
/// # Errors
/// I/O failures and malformed records, with line context.
pub fn read_table(format: DatasetFormat, path: &Path) -> Result<RawTable> {
    match format {
        DatasetFormat::Csv => read_csv(path),
        DatasetFormat::Libsvm => read_libsvm(path),
    }
}

fn parse_cell(field: &str) -> RawCell {
    field
        .parse::<f64>()
        .map_or_else(|_| RawCell::Sym(field.to_string()), RawCell::Num)
}

fn read_csv(path: &Path) -> Result<RawTable> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("open {}", path.display()))?;

    let mut table = RawTable::default();
    for (i, record) in rdr.records().enumerate() {
        let record = record.with_context(|| format!("read record {}", i + 1))?;
        let mut fields = record.iter();
        let Some(label) = fields.next() else {
            return Err(DataError::Malformed {
                line: i + 1,
                reason: "empty record".into(),
            }
            .into());
        };
        let row: Vec<RawCell> = fields.map(parse_cell).collect();
        if !table.rows.is_empty() && row.len() != table.n_columns() {
            return Err(DataError::Malformed {
                line: i + 1,
                reason: format!(
                    "expected {} feature columns, found {}",
                    table.n_columns(),
                    row.len()
                ),
            }
            .into());
        }
        table.labels.push(label.to_string());
        table.rows.push(row);
    }
    Ok(table)
}

fn read_libsvm(path: &Path) -> Result<RawTable> {
    let f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let rdr = BufReader::new(f);

    let mut labels = Vec::new();
    let mut sparse_rows: Vec<Vec<(usize, f64)>> = Vec::new();
    let mut width = 0usize;

    for (i, line) in rdr.lines().enumerate() {
        let line = line.with_context(|| format!("read line {}", i + 1))?;
        let line = line.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        let mut tokens = line.split_whitespace();
        let Some(label) = tokens.next() else {
            continue;
        };

        let mut pairs = Vec::new();
        for tok in tokens {
            let (idx, val) = tok.split_once(':').ok_or_else(|| DataError::Malformed {
                line: i + 1,
                reason: format!("expected `index:value`, found `{tok}`"),
            })?;
            let idx: usize = idx.parse().map_err(|_| DataError::Malformed {
                line: i + 1,
                reason: format!("bad feature index `{idx}`"),
            })?;
            let val: f64 = val.parse().map_err(|_| DataError::Malformed {
                line: i + 1,
                reason: format!("bad feature value `{val}`"),
            })?;
            if idx == 0 {
                return Err(DataError::Malformed {
                    line: i + 1,
                    reason: "feature indices are 1-based".into(),
                }
                .into());
            }
            width = width.max(idx);
            pairs.push((idx - 1, val));
        }
        labels.push(label.to_string());
        sparse_rows.push(pairs);
    }

    let rows = sparse_rows
        .into_iter()
        .map(|pairs| {
            let mut row = vec![RawCell::Num(0.0); width];
            for (j, v) in pairs {
                row[j] = RawCell::Num(v);
            }
            row
        })
        .collect();
    Ok(RawTable { labels, rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    fn tmp_path(name: &str, ext: &str) -> std::path::PathBuf {
        let mut p = std::env::temp_dir();
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        p.push(format!("knave_data_{name}_{nanos}.{ext}"));
        p
    }

    fn write_tmp(name: &str, ext: &str, contents: &str) -> std::path::PathBuf {
        let p = tmp_path(name, ext);
        let mut f = File::create(&p).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        p
    }

    #[test]
    fn csv_label_in_column_zero() {
        let p = write_tmp("basic", "csv", "A,0.1,red\nB,0.9,blue\n");
        let t = read_table(DatasetFormat::Csv, &p).unwrap();
        assert_eq!(t.labels, vec!["A", "B"]);
        assert_eq!(t.n_columns(), 2);
        assert_eq!(t.rows[0][0], RawCell::Num(0.1));
        assert_eq!(t.rows[0][1], RawCell::Sym("red".into()));
        let _ = std::fs::remove_file(p);
    }

    #[test]
    fn csv_ragged_rows_are_rejected() {
        let p = write_tmp("ragged", "csv", "A,0.1,0.2\nB,0.9\n");
        let err = read_table(DatasetFormat::Csv, &p).unwrap_err();
        assert!(err.to_string().to_lowercase().contains("record") || format!("{err:#}").contains("2"));
        let _ = std::fs::remove_file(p);
    }

    #[test]
    fn libsvm_sparse_densifies_with_zeros() {
        let p = write_tmp("sparse", "libsvm", "1 1:0.5 3:0.25\n-1 2:1.0\n");
        let t = read_table(DatasetFormat::Libsvm, &p).unwrap();
        assert_eq!(t.labels, vec!["1", "-1"]);
        assert_eq!(t.n_columns(), 3);
        assert_eq!(t.rows[0], vec![RawCell::Num(0.5), RawCell::Num(0.0), RawCell::Num(0.25)]);
        assert_eq!(t.rows[1], vec![RawCell::Num(0.0), RawCell::Num(1.0), RawCell::Num(0.0)]);
        let _ = std::fs::remove_file(p);
    }

    #[test]
    fn libsvm_rejects_zero_based_indices() {
        let p = write_tmp("zerobased", "libsvm", "1 0:0.5\n");
        assert!(read_table(DatasetFormat::Libsvm, &p).is_err());
        let _ = std::fs::remove_file(p);
    }

    #[test]
    fn libsvm_skips_comments_and_blank_lines() {
        let p = write_tmp("comments", "libsvm", "# header\n\n1 1:2.0 # trailing\n");
        let t = read_table(DatasetFormat::Libsvm, &p).unwrap();
        assert_eq!(t.len(), 1);
        assert_eq!(t.rows[0], vec![RawCell::Num(2.0)]);
        let _ = std::fs::remove_file(p);
    }

    #[test]
    fn pad_columns_extends_short_rows() {
        let mut t = RawTable {
            labels: vec!["A".into()],
            rows: vec![vec![RawCell::Num(1.0)]],
        };
        t.pad_columns(3);
        assert_eq!(t.n_columns(), 3);
        assert_eq!(t.rows[0][2], RawCell::Num(0.0));
    }
}
