//! Turn raw hits into the final table rows
//!
//! Rows are ordered by e-value (stable, so ties keep file order), reduced to
//! one row per (accession, protein accession), and enriched with the subunit
//! taken from the profile name, alignment coordinates taken from the
//! description, and log10 of the e-value.

use super::tblout::RawHit;
use complexscan_common::{Result, ScanError};
use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::LazyLock;

/// `# <start> # <end>` as written by Prodigal into translated CDS headers
static COORDINATES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"#\s*(\d+)\s*#\s*(\d+)\s*")
        .unwrap_or_else(|e| panic!("invalid coordinate pattern: {e}"))
});

/// Fields a profile name must split into: subunit, threshold, parameter tag
pub const PROFILE_NAME_FIELDS: usize = 3;

/// One row of `processed_hmmer_results.csv`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    #[serde(rename = "Accession")]
    pub accession: String,
    #[serde(rename = "ProteinAccession")]
    pub protein_accession: String,
    #[serde(rename = "evalue")]
    pub evalue: f64,
    #[serde(rename = "BitScore")]
    pub bit_score: f64,
    #[serde(rename = "Bias")]
    pub bias: f64,
    #[serde(rename = "SequenceDesc")]
    pub description: String,
    #[serde(rename = "Subunit")]
    pub subunit: String,
    #[serde(rename = "Start")]
    pub start: u64,
    #[serde(rename = "End")]
    pub end: u64,
    /// NaN when the e-value is not positive
    #[serde(rename = "log10evalue")]
    pub log10_evalue: f64,
}

/// Start and end from a description, `(0, 0)` when absent
pub fn extract_coordinates(description: &str) -> (u64, u64) {
    COORDINATES
        .captures(description)
        .and_then(|caps| {
            let start = caps.get(1)?.as_str().parse().ok()?;
            let end = caps.get(2)?.as_str().parse().ok()?;
            Some((start, end))
        })
        .unwrap_or((0, 0))
}

/// Subunit field of a `<SUBUNIT>_<pct>_<tag>` profile name
///
/// Any other number of fields is an integrity fault.
pub fn profile_subunit(profile: &str) -> Result<&str> {
    let parts: Vec<&str> = profile.split('_').collect();
    if parts.len() != PROFILE_NAME_FIELDS {
        return Err(ScanError::Integrity {
            name: profile.to_string(),
            parts: parts.len(),
        });
    }
    Ok(parts[0])
}

pub fn log10_evalue(evalue: f64) -> f64 {
    if evalue > 0.0 {
        evalue.log10()
    } else {
        f64::NAN
    }
}

/// Sort, deduplicate and enrich hits concatenated in file order
pub fn normalize(mut hits: Vec<RawHit>) -> Result<Vec<SearchHit>> {
    hits.sort_by(|a, b| a.evalue.total_cmp(&b.evalue));

    let mut seen = HashSet::new();
    let mut rows = Vec::with_capacity(hits.len());
    for hit in hits {
        if !seen.insert((hit.accession.clone(), hit.protein_accession.clone())) {
            continue;
        }

        let subunit = profile_subunit(&hit.profile)?.to_string();
        let (start, end) = extract_coordinates(&hit.description);
        rows.push(SearchHit {
            log10_evalue: log10_evalue(hit.evalue),
            accession: hit.accession,
            protein_accession: hit.protein_accession,
            evalue: hit.evalue,
            bit_score: hit.bit_score,
            bias: hit.bias,
            description: hit.description,
            subunit,
            start,
            end,
        });
    }
    Ok(rows)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn raw(protein: &str, profile: &str, evalue: f64, description: &str) -> RawHit {
        RawHit {
            accession: super::super::tblout::base_accession(protein),
            protein_accession: protein.to_string(),
            profile: profile.to_string(),
            evalue,
            bit_score: 50.0,
            bias: 0.1,
            description: description.to_string(),
        }
    }

    #[test]
    fn test_coordinates() {
        assert_eq!(extract_coordinates("# 10 # 250 # 1 # ID=1_1"), (10, 250));
        assert_eq!(extract_coordinates("#10#250#"), (10, 250));
        assert_eq!(extract_coordinates("NADH dehydrogenase subunit A"), (0, 0));
        assert_eq!(extract_coordinates(""), (0, 0));
    }

    #[test]
    fn test_log10_evalue() {
        assert!((log10_evalue(1e-10) + 10.0).abs() < 1e-9);
        assert!(log10_evalue(0.0).is_nan());
        assert!(log10_evalue(-1.0).is_nan());
    }

    #[test]
    fn test_profile_name_must_have_three_fields() {
        assert_eq!(profile_subunit("NUOA_85_mafft").unwrap(), "NUOA");
        assert!(matches!(
            profile_subunit("NUOA_85"),
            Err(ScanError::Integrity { parts: 2, .. })
        ));
        assert!(matches!(
            profile_subunit("NUOA_85_mafft_x"),
            Err(ScanError::Integrity { parts: 4, .. })
        ));
    }

    #[test]
    fn test_duplicate_pair_keeps_lowest_evalue() {
        let rows = normalize(vec![
            raw("ctg_1", "NUOA_85_mafft", 1e-5, "a"),
            raw("ctg_1", "NUOB_85_mafft", 1e-20, "b"),
        ])
        .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].subunit, "NUOB");
        assert_eq!(rows[0].evalue, 1e-20);
    }

    #[test]
    fn test_ties_keep_concatenation_order() {
        let rows = normalize(vec![
            raw("ctg_2", "NUOA_85_mafft", 1e-5, ""),
            raw("ctg_1", "NUOA_85_mafft", 1e-5, ""),
            raw("ctg_3", "NUOA_85_mafft", 1e-9, ""),
        ])
        .unwrap();
        let order: Vec<&str> = rows.iter().map(|r| r.protein_accession.as_str()).collect();
        assert_eq!(order, ["ctg_3", "ctg_2", "ctg_1"]);
    }

    #[test]
    fn test_integrity_fault_aborts() {
        let err = normalize(vec![raw("ctg_1", "NUOA_85", 1e-5, "")]).unwrap_err();
        assert!(matches!(err, ScanError::Integrity { .. }));
    }

    #[test]
    fn test_zero_evalue_row_survives_with_nan() {
        let rows = normalize(vec![raw("ctg_1", "NUOA_85_mafft", 0.0, "# 5 # 9 #")]).unwrap();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].log10_evalue.is_nan());
        assert_eq!((rows[0].start, rows[0].end), (5, 9));
    }
}
