//! Subunit identity
//!
//! Upstream gene annotation is noisy: the same subunit shows up as `nuoA`,
//! `NuoA1`, `nuo-a [h` and so on. This module cleans raw gene symbols,
//! derives the canonical subunit label, and provides [`SubunitId`], the key
//! that names every per-subunit file and directory in the pipeline.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::LazyLock;

/// Description phrasing used for the fused NuoC/NuoD subunit
static FUSED_CD_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)subunit C,D|subunit C/D|chain C,D|chain C/D|chain CD|NADH.*fused CD subunit",
    )
    .unwrap_or_else(|e| panic!("invalid fused subunit pattern: {e}"))
});

/// Canonical subunit key, e.g. `NUOA`
///
/// Always uppercase ASCII alphanumerics, never contains an underscore, so it
/// can be embedded as the first field of `_`-delimited file names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubunitId(String);

impl SubunitId {
    /// Build from a label such as `NuoA` or `nuoa`
    ///
    /// Returns `None` when nothing alphanumeric remains.
    pub fn new(label: &str) -> Option<Self> {
        let code: String = label
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_uppercase())
            .collect();
        (!code.is_empty()).then_some(Self(code))
    }

    /// Subunit named by a sequence file's leading token
    ///
    /// `nuoa_cds.faa` and `nuoa_bacteria_ipr010218_interpro.faa` both map to
    /// `NUOA`.
    pub fn from_file_name(path: impl AsRef<Path>) -> Option<Self> {
        let name = path.as_ref().file_name()?.to_str()?;
        let token = name.split('_').next()?;
        let token = token.split('.').next()?;
        Self::new(token)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubunitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Cleaning and labelling rules for one gene family
#[derive(Debug, Clone)]
pub struct SubunitFamily {
    /// Lowercase gene prefix stripped from symbols (`nuo`)
    pub gene_prefix: String,
    /// Prefix of derived labels (`Nuo`)
    pub label_prefix: String,
    /// Labels that are ambiguous, fused, or uninformative
    pub excluded: Vec<String>,
    /// Label that is promoted to `fused_label` when its description matches
    pub fusion_candidate: String,
    pub fused_label: String,
}

impl Default for SubunitFamily {
    fn default() -> Self {
        Self::nuo()
    }
}

impl SubunitFamily {
    /// NADH:quinone oxidoreductase (complex I) subunits
    pub fn nuo() -> Self {
        Self {
            gene_prefix: "nuo".to_string(),
            label_prefix: "Nuo".to_string(),
            excluded: ["NuoBC", "Nuo", "NuoII", "NuoLM", "NuoP"]
                .into_iter()
                .map(String::from)
                .collect(),
            fusion_candidate: "NuoC".to_string(),
            fused_label: "NuoCD".to_string(),
        }
    }

    /// Normalize a raw gene symbol
    ///
    /// Lowercases, removes organelle/tag markers (`[h`, `[c`) and the family
    /// prefix, drops `-`, `_`, `/`, trims, and uppercases. Removal repeats
    /// until nothing changes, which makes cleaning idempotent.
    pub fn clean_gene_symbol(&self, raw: &str) -> String {
        let mut current = raw.to_string();
        loop {
            let next = self.clean_once(&current);
            if next == current {
                return next;
            }
            current = next;
        }
    }

    fn clean_once(&self, symbol: &str) -> String {
        let mut s = symbol.to_ascii_lowercase();
        for marker in ["[h", "[c", self.gene_prefix.as_str()] {
            if !marker.is_empty() {
                s = s.replace(marker, "");
            }
        }
        s.retain(|c| !matches!(c, '-' | '_' | '/'));
        s.trim().to_ascii_uppercase()
    }

    /// Derive the subunit label for a gene symbol
    ///
    /// A missing symbol is treated as `NONE`. Digits are dropped from the
    /// cleaned symbol. Returns `None` for excluded labels. The fusion
    /// candidate becomes the fused label when `protein_description` uses
    /// known fusion phrasing; this is a best-effort heuristic.
    pub fn derive_label(
        &self,
        raw_symbol: Option<&str>,
        protein_description: Option<&str>,
    ) -> Option<String> {
        let cleaned = self.clean_gene_symbol(raw_symbol.unwrap_or("NONE"));
        let suffix: String = cleaned.chars().filter(|c| !c.is_ascii_digit()).collect();
        let label = format!("{}{}", self.label_prefix, suffix);

        if self.excluded.iter().any(|e| *e == label) {
            return None;
        }

        if label == self.fusion_candidate
            && protein_description.is_some_and(|d| FUSED_CD_PATTERN.is_match(d))
        {
            return Some(self.fused_label.clone());
        }

        Some(label)
    }

    /// Derive the canonical [`SubunitId`] for a gene symbol
    pub fn derive_subunit(
        &self,
        raw_symbol: Option<&str>,
        protein_description: Option<&str>,
    ) -> Option<SubunitId> {
        self.derive_label(raw_symbol, protein_description)
            .and_then(|label| SubunitId::new(&label))
    }
}
