//! `complexscan subunit` command implementation

use crate::error::Result;
use colored::Colorize;
use complexscan_pipeline::SubunitFamily;

/// Describe how a gene symbol is cleaned and labelled
pub fn describe(symbol: &str, description: Option<&str>) -> (String, Option<String>) {
    let family = SubunitFamily::nuo();
    let cleaned = family.clean_gene_symbol(symbol);
    let label = family.derive_label(Some(symbol), description);
    (cleaned, label)
}

/// Print the cleaned symbol and derived subunit label
pub async fn run(symbol: &str, description: Option<&str>) -> Result<()> {
    let (cleaned, label) = describe(symbol, description);

    println!("Symbol:   {}", symbol);
    println!("Cleaned:  {}", cleaned);
    match label {
        Some(label) => println!("Subunit:  {}", label.green()),
        None => println!("Subunit:  {}", "excluded".yellow()),
    }

    Ok(())
}
