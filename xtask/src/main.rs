//! Build automation tasks for complexscan
//!
//! Currently generates the CLI reference from the clap definitions.

use clap::Parser;
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Build automation tasks for complexscan", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Generate the CLI reference in Markdown
    GenerateCliDocs {
        /// Output directory for generated documentation
        #[arg(short, long, default_value = "docs")]
        output_dir: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::GenerateCliDocs { output_dir } => generate_cli_docs(&output_dir)?,
    }

    Ok(())
}

fn generate_cli_docs(output_dir: &str) -> anyhow::Result<()> {
    println!("Generating CLI documentation...");

    let markdown = clap_markdown::help_markdown::<complexscan_cli::Cli>();

    let content = format!(
        r#"# complexscan CLI Reference

Generated from the CLI source code on {}.

## Overview

complexscan builds profile HMMs for the subunits of a protein complex and
searches them against a set of proteomes. Each stage reads the previous
stage's files and skips work whose output already exists.

```bash
complexscan build              # aggregate, cluster, align, hmmbuild
complexscan search             # hmmsearch every profile against every proteome
complexscan process            # one deduplicated CSV of all hits
complexscan status             # what each stage has produced
```

## Configuration

Settings are read from `complexscan.toml` in the working directory (or
`--config`), then from the environment, then from flags.

```toml
base_dir = "/data/complex-i"

[tools]
threads = 16
cooldown_secs = 300
laptop_cpu_cap = 4
```

## Environment Variables

- `COMPLEXSCAN_BASE_DIR` - project root holding `data/` and `logs/`
- `COMPLEXSCAN_THREADS` - threads for clustering, alignment and hmmbuild
- `COMPLEXSCAN_COOLDOWN_SECS` - pause between profiles during search
- `LOG_LEVEL`, `LOG_FORMAT`, `LOG_DIR` - logging overrides
- `RUST_LOG` - additional tracing filter directives

## Commands

{}

---

*To update, run `cargo xtask generate-cli-docs`.*
"#,
        chrono::Utc::now().format("%Y-%m-%d"),
        markdown
    );

    let output_path = PathBuf::from(output_dir);
    fs::create_dir_all(&output_path)?;

    let file_path = output_path.join("cli-reference.md");
    fs::write(&file_path, content)?;

    println!("✅ Generated CLI documentation at: {}", file_path.display());

    Ok(())
}
