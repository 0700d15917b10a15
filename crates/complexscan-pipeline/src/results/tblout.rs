//! Decoder for hmmsearch `--tblout` per-sequence tables
//!
//! The table is whitespace separated with a fixed schema: 18 fixed columns
//! followed by a free-text description that may itself contain spaces.
//! Lines that do not carry at least the fixed columns plus one description
//! token are reported as malformed instead of being mapped onto the wrong
//! fields.

use complexscan_common::{Result, ScanError};
use regex::Regex;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::LazyLock;
use tracing::warn;

/// Leading lines dropped before any parsing
pub const HEADER_LINES: usize = 3;

/// Column where the description starts
pub const DESCRIPTION_COLUMN: usize = 18;

/// Minimum number of whitespace-separated columns on a hit line
pub const MIN_COLUMNS: usize = DESCRIPTION_COLUMN + 1;

const TARGET_COLUMN: usize = 0;
const QUERY_COLUMN: usize = 2;
const EVALUE_COLUMN: usize = 4;
const SCORE_COLUMN: usize = 5;
const BIAS_COLUMN: usize = 6;

/// Trailing `_<digits>` on a protein identifier
static PROTEIN_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"_[0-9]+$").unwrap_or_else(|e| panic!("invalid accession pattern: {e}"))
});

/// One hit line as found in the table
#[derive(Debug, Clone, PartialEq)]
pub struct RawHit {
    /// Protein identifier with the trailing `_<digits>` removed
    pub accession: String,
    /// Protein identifier as written
    pub protein_accession: String,
    /// Query profile name
    pub profile: String,
    pub evalue: f64,
    pub bit_score: f64,
    pub bias: f64,
    pub description: String,
}

/// A line that could not be decoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedLine {
    /// 1-based line number in the file
    pub line: usize,
    pub reason: String,
}

/// Everything decoded from one table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedTable {
    pub hits: Vec<RawHit>,
    pub malformed: Vec<MalformedLine>,
}

/// Strip the trailing `_<digits>` from a protein identifier
pub fn base_accession(protein_accession: &str) -> String {
    PROTEIN_SUFFIX.replace(protein_accession, "").into_owned()
}

fn parse_float(cols: &[&str], index: usize, name: &str) -> std::result::Result<f64, String> {
    cols[index]
        .parse::<f64>()
        .map_err(|_| format!("{} column holds '{}', not a number", name, cols[index]))
}

/// Decode one non-comment line
pub fn parse_line(line: &str) -> std::result::Result<RawHit, String> {
    let cols: Vec<&str> = line.split_whitespace().collect();
    if cols.len() < MIN_COLUMNS {
        return Err(format!(
            "{} columns, expected at least {}",
            cols.len(),
            MIN_COLUMNS
        ));
    }

    let protein_accession = cols[TARGET_COLUMN].to_string();
    Ok(RawHit {
        accession: base_accession(&protein_accession),
        protein_accession,
        profile: cols[QUERY_COLUMN].to_string(),
        evalue: parse_float(&cols, EVALUE_COLUMN, "e-value")?,
        bit_score: parse_float(&cols, SCORE_COLUMN, "score")?,
        bias: parse_float(&cols, BIAS_COLUMN, "bias")?,
        description: cols[DESCRIPTION_COLUMN..].join(" "),
    })
}

/// Decode a whole table
///
/// The first [`HEADER_LINES`] lines are skipped unconditionally, then blank
/// lines and `#` comments.
pub fn parse_tblout<R: BufRead>(reader: R) -> Result<ParsedTable> {
    let mut table = ParsedTable::default();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if index < HEADER_LINES {
            continue;
        }
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        match parse_line(trimmed) {
            Ok(hit) => table.hits.push(hit),
            Err(reason) => table.malformed.push(MalformedLine {
                line: index + 1,
                reason,
            }),
        }
    }
    Ok(table)
}

/// Decode a table file, logging malformed lines and empty results
///
/// An unreadable file, including one with bytes that are not UTF-8, is a
/// [`ScanError::Parse`] naming the file.
pub fn parse_file(path: &Path) -> Result<ParsedTable> {
    let table = File::open(path)
        .map(BufReader::new)
        .map_err(ScanError::from)
        .and_then(parse_tblout)
        .map_err(|e| ScanError::Parse(format!("{}: {}", path.display(), e)))?;

    for bad in &table.malformed {
        warn!(
            file = %path.display(),
            line = bad.line,
            reason = %bad.reason,
            "⚠️ Malformed result line skipped"
        );
    }
    if table.hits.is_empty() {
        warn!(file = %path.display(), "⚠️ No valid hits found");
    }
    Ok(table)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const HIT: &str = "NC_000913.3_2345 - NUOA_85_mafft - 1.2e-50 170.3 0.1 \
        1.4e-50 170.1 0.1 1.0 1 0 0 1 1 1 1 # 2403 # 2843 # -1 # ID=1_2345;partial=00";

    fn table(body: &str) -> String {
        format!(
            "#                                                               --- full sequence ----\n\
             # target name        accession  query name           accession    E-value  score  bias\n\
             #------------------- ---------- -------------------- ---------- --------- ------ -----\n\
             {body}\n\
             #\n\
             # Program:         hmmsearch\n"
        )
    }

    #[test]
    fn test_parse_line_maps_columns() {
        let hit = parse_line(HIT).unwrap();
        assert_eq!(hit.protein_accession, "NC_000913.3_2345");
        assert_eq!(hit.accession, "NC_000913.3");
        assert_eq!(hit.profile, "NUOA_85_mafft");
        assert_eq!(hit.evalue, 1.2e-50);
        assert_eq!(hit.bit_score, 170.3);
        assert_eq!(hit.bias, 0.1);
        assert_eq!(
            hit.description,
            "# 2403 # 2843 # -1 # ID=1_2345;partial=00"
        );
    }

    #[test]
    fn test_base_accession_only_strips_trailing_digits() {
        assert_eq!(base_accession("contig_12_7"), "contig_12");
        assert_eq!(base_accession("WP_012345678.1"), "WP_012345678.1");
        assert_eq!(base_accession("abc_"), "abc_");
    }

    #[test]
    fn test_short_line_is_malformed_not_shifted() {
        let err = parse_line("seq1 - NUOA_85_mafft - 1e-5 20.0 0.1").unwrap_err();
        assert!(err.contains("7 columns"));
    }

    #[test]
    fn test_non_numeric_evalue_is_malformed() {
        let line = HIT.replace("1.2e-50", "abc");
        assert!(parse_line(&line).unwrap_err().contains("e-value"));
    }

    #[test]
    fn test_parse_table_skips_header_and_comments() {
        let body = format!("{HIT}\n\nshort line\n{HIT}");
        let parsed = parse_tblout(Cursor::new(table(&body))).unwrap();
        assert_eq!(parsed.hits.len(), 2);
        assert_eq!(parsed.malformed.len(), 1);
        assert_eq!(parsed.malformed[0].line, 6);
    }

    #[test]
    fn test_header_lines_are_skipped_even_without_marker() {
        let text = format!("{HIT}\n{HIT}\n{HIT}\n{HIT}\n");
        let parsed = parse_tblout(Cursor::new(text)).unwrap();
        assert_eq!(parsed.hits.len(), 1);
    }

    #[test]
    fn test_empty_table() {
        let parsed = parse_tblout(Cursor::new(table("#"))).unwrap();
        assert!(parsed.hits.is_empty());
        assert!(parsed.malformed.is_empty());
    }

    #[test]
    fn test_non_utf8_file_is_parse_error_naming_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("g2_results.txt");
        let mut bytes = table(HIT).into_bytes();
        bytes.extend_from_slice(b"ctg_1 - NUOA_85_mafft - caf\xe9\n");
        std::fs::write(&path, bytes).unwrap();

        match parse_file(&path).unwrap_err() {
            ScanError::Parse(msg) => assert!(msg.contains("g2_results.txt")),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
