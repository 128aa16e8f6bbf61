//! Golden-file runner: compiles every `fixtures/*.json` and diffs the result
//! against the sibling `.ts` file.
//!
//! ```text
//! cargo run -p dev-test-runner -- [--bless] [FILTER_REGEX]
//! ```
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use colored::Colorize;
use regex::Regex;
use serde::Deserialize;

use decoder_gen::descriptor::SourceModule;
use decoder_gen::CompileConfig;

#[derive(Debug, Deserialize)]
struct Fixture {
    #[serde(default)]
    config: CompileConfig,
    module: SourceModule,
}

enum Outcome {
    Pass,
    Blessed,
    Fail { expected: String, actual: String },
}

struct Options {
    bless: bool,
    filter: Option<Regex>,
}

impl Options {
    fn from_args() -> anyhow::Result<Self> {
        let mut bless = false;
        let mut filter = None;
        for arg in std::env::args().skip(1) {
            match arg.as_str() {
                "--bless" => bless = true,
                pattern if filter.is_none() => {
                    filter = Some(Regex::new(pattern).with_context(|| format!("bad filter {pattern:?}"))?);
                }
                extra => bail!("unexpected argument {extra:?}"),
            }
        }
        Ok(Options { bless, filter })
    }
}

fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("..").join("fixtures")
}

fn run_fixture(path: &Path, bless: bool) -> anyhow::Result<Outcome> {
    let source = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let fixture: Fixture = serde_json::from_str(&source).with_context(|| format!("parsing {}", path.display()))?;
    let generated = decoder_gen::assemble(&fixture.module, &fixture.config);
    let actual = decoder_gen::printer::render_module(&generated);

    let golden = path.with_extension("ts");
    if bless {
        std::fs::write(&golden, &actual).with_context(|| format!("writing {}", golden.display()))?;
        return Ok(Outcome::Blessed);
    }
    let expected = std::fs::read_to_string(&golden).unwrap_or_default();
    if expected == actual {
        Ok(Outcome::Pass)
    } else {
        Ok(Outcome::Fail { expected, actual })
    }
}

fn main() -> anyhow::Result<()> {
    let options = Options::from_args()?;

    let mut paths: Vec<PathBuf> = std::fs::read_dir(fixtures_dir())
        .context("listing fixtures")?
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();

    let mut failures = 0usize;
    for path in &paths {
        let name = path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
        if let Some(filter) = &options.filter {
            if !filter.is_match(&name) {
                continue;
            }
        }
        match run_fixture(path, options.bless)? {
            Outcome::Pass => println!("{} {name}", "ok".green().bold()),
            Outcome::Blessed => println!("{} {name}", "blessed".yellow().bold()),
            Outcome::Fail { expected, actual } => {
                failures += 1;
                println!("{} {name}", "FAIL".red().bold());
                println!("{}", "--- expected".dimmed());
                print!("{expected}");
                println!("{}", "+++ actual".dimmed());
                print!("{actual}");
            }
        }
    }

    if failures > 0 {
        bail!("{failures} fixture(s) failed");
    }
    Ok(())
}
