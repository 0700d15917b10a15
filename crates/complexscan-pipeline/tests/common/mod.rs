//! Shared fakes for pipeline integration tests
//!
//! `FakeTools` stands in for mmseqs, mafft, hmmbuild and hmmsearch: it
//! records every invocation and writes the output files each tool would.

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use async_trait::async_trait;
use complexscan_common::Result;
use complexscan_pipeline::executor::{CommandFailure, CommandRunner, ToolCommand};
use complexscan_pipeline::power::{HostClass, HostPower};
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// E-value a fake search reports for a profile, keyed by subunit
pub fn fake_evalue(profile_name: &str) -> &'static str {
    match profile_name.split('_').next() {
        Some("NUOA") => "1.5e-40",
        Some("NUOB") => "3.0e-12",
        _ => "1.0e-3",
    }
}

/// One tblout hit line with 18 fixed columns and a Prodigal-style description
pub fn tblout_line(protein: &str, profile: &str, evalue: &str, start: u32, end: u32) -> String {
    format!(
        "{protein:<20} - {profile:<20} - {evalue} 120.5 0.3 {evalue} 120.1 0.3 1.0 1 0 0 1 1 1 1 \
         # {start} # {end} # 1 # ID=1_1;partial=00\n"
    )
}

/// A complete tblout file around `body`
pub fn tblout(body: &str) -> String {
    format!(
        "#                                                               --- full sequence ----\n\
         # target name        accession  query name           accession    E-value  score  bias\n\
         #------------------- ---------- -------------------- ---------- --------- ------ -----\n\
         {body}\
         #\n\
         # Program:         hmmsearch\n\
         # [ok]\n"
    )
}

fn stem(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[derive(Default)]
pub struct FakeTools {
    calls: Mutex<Vec<ToolCommand>>,
}

impl FakeTools {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<ToolCommand> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, program: &str) -> usize {
        self.calls().iter().filter(|c| c.program == program).count()
    }
}

#[async_trait]
impl CommandRunner for FakeTools {
    async fn run(&self, command: &ToolCommand) -> std::result::Result<String, CommandFailure> {
        self.calls.lock().unwrap().push(command.clone());
        let args = &command.args;

        match command.program.as_str() {
            "mmseqs" => {
                if args[0] == "convert2fasta" {
                    fs::write(&args[2], ">rep1\nMKVLAAG\n>rep2\nMKVLSAG\n").unwrap();
                }
                Ok(String::new())
            },
            "mafft" => Ok(">rep1\nMKVLAAG\n>rep2\nMKVLSAG\n".to_string()),
            "hmmbuild" => {
                let name_pos = args.iter().position(|a| a == "-n").unwrap();
                let output = &args[args.len() - 2];
                fs::write(output, format!("HMMER3/f [3.4]\nNAME  {}\n//\n", args[name_pos + 1]))
                    .unwrap();
                Ok(String::new())
            },
            "hmmsearch" => {
                let pos = args.iter().position(|a| a == "--tblout").unwrap();
                let result = &args[pos + 1];
                let profile = stem(&args[pos + 2]);
                let proteome = stem(&args[pos + 3]);
                let line = tblout_line(
                    &format!("{proteome}_1"),
                    &profile,
                    fake_evalue(&profile),
                    10,
                    250,
                );
                fs::write(result, tblout(&line)).unwrap();
                Ok(String::new())
            },
            other => Err(CommandFailure::Exit {
                status: "exit status: 127".to_string(),
                stderr: format!("{other}: command not found"),
            }),
        }
    }
}

pub struct FakeHost {
    pub class: HostClass,
    pub mains: bool,
    shut_down: AtomicBool,
}

impl FakeHost {
    pub fn new(class: HostClass, mains: bool) -> Self {
        Self {
            class,
            mains,
            shut_down: AtomicBool::new(false),
        }
    }

    pub fn was_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::SeqCst)
    }
}

impl HostPower for FakeHost {
    fn host_class(&self) -> HostClass {
        self.class
    }

    fn on_mains_power(&self) -> bool {
        self.mains
    }

    fn shut_down(&self) -> Result<()> {
        self.shut_down.store(true, Ordering::SeqCst);
        Ok(())
    }
}
