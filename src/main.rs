//! mapscript: hyperdimensional script encoding.
//!
//! This is the CLI binary entry point.

use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use mapscript::codec::{DecodedScript, Decoder, Encoder};
use mapscript::config::CodecConfig;
use mapscript::memory::{MemoryBank, MemoryCategory};
use mapscript::script::model::significance_name;
use mapscript::script::Script;
use mapscript::scoring::{DecodingStats, FidelityReport, SweepConfig};

/// Encode scripts into vector memories and decode them back.
#[derive(Parser, Debug)]
#[command(name = "mapscript", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// JSON file with codec settings; flags override it.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Vector dimension.
    #[arg(long, global = true)]
    dim: Option<usize>,

    /// Seed for vector generation.
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Cap on every step and role decode loop.
    #[arg(long, global = true)]
    max_iterations: Option<usize>,

    /// Similarity cutoff for filler synsets.
    #[arg(long, global = true)]
    filler_threshold: Option<f64>,

    /// Similarity cutoff for synset words.
    #[arg(long, global = true)]
    word_threshold: Option<f64>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Encode a script (or a JSON array of scripts) into a bank file.
    Encode {
        #[arg(short, long)]
        input: PathBuf,

        /// Bank file; extended if it already exists.
        #[arg(short, long)]
        bank: PathBuf,
    },

    /// Decode a script from a bank file.
    Decode {
        #[arg(short, long)]
        bank: PathBuf,

        /// Script name, or a single significance such as `Dinner:0`.
        #[arg(short, long)]
        name: String,

        /// Continue from noisy unbound vectors instead of clean-up results.
        #[arg(long)]
        noise: bool,

        #[arg(long)]
        json: bool,
    },

    /// Encode, decode and score scripts in memory.
    Roundtrip {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(long)]
        noise: bool,

        #[arg(long)]
        json: bool,
    },

    /// Average decoding fidelity over random scripts.
    Stats {
        /// Step counts: `N` or the inclusive range `A..=B`.
        #[arg(long, default_value = "3")]
        steps: String,

        /// Roles per step: `N` or the inclusive range `A..=B`.
        #[arg(long, default_value = "2")]
        roles: String,

        /// Fillers per role: `N` or the inclusive range `A..=B`.
        #[arg(long, default_value = "1..=3")]
        bundle: String,

        /// Scripts per grid cell.
        #[arg(long, default_value_t = 10)]
        iterations: usize,

        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = resolve_config(&cli)?;
    tracing::debug!(?config, "codec configuration");

    match &cli.command {
        Command::Encode { input, bank } => encode(&config, input, bank),
        Command::Decode {
            bank,
            name,
            noise,
            json,
        } => decode(bank, name, *noise, *json),
        Command::Roundtrip { input, noise, json } => roundtrip(&config, input, *noise, *json),
        Command::Stats {
            steps,
            roles,
            bundle,
            iterations,
            json,
        } => {
            let sweep = SweepConfig {
                steps: parse_range(steps).context("--steps")?,
                roles: parse_range(roles).context("--roles")?,
                bundle: parse_range(bundle).context("--bundle")?,
                iterations: *iterations,
                seed: config.seed.unwrap_or(0),
            };
            stats(&config, &sweep, *json)
        }
    }
}

fn resolve_config(cli: &Cli) -> Result<CodecConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            CodecConfig::from_json(&text)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => CodecConfig::default(),
    };
    if let Some(dim) = cli.dim {
        config.dim = dim;
    }
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    if let Some(n) = cli.max_iterations {
        config.max_iterations = n;
    }
    if let Some(t) = cli.filler_threshold {
        config.filler_threshold = t;
    }
    if let Some(t) = cli.word_threshold {
        config.word_threshold = t;
    }
    config.validate()?;
    Ok(config)
}

fn read_scripts(path: &Path) -> Result<Vec<Script>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading scripts {}", path.display()))?;
    let scripts = match serde_json::from_str::<Vec<Script>>(&text) {
        Ok(scripts) => scripts,
        Err(_) => vec![serde_json::from_str::<Script>(&text)
            .with_context(|| format!("parsing scripts {}", path.display()))?],
    };
    for script in &scripts {
        script.validate()?;
    }
    Ok(scripts)
}

fn encode(config: &CodecConfig, input: &Path, bank_path: &Path) -> Result<()> {
    let scripts = read_scripts(input)?;
    let mut bank = if bank_path.exists() {
        tracing::info!(bank = %bank_path.display(), "extending existing bank");
        let bank = MemoryBank::load(bank_path)
            .with_context(|| format!("loading bank {}", bank_path.display()))?;
        let ignored = config.differences(bank.config());
        if !ignored.is_empty() {
            tracing::warn!(
                bank = %bank_path.display(),
                fields = ?ignored,
                "existing bank keeps its stored settings; requested values ignored"
            );
        }
        bank
    } else {
        MemoryBank::new(config)?
    };

    let mut encoder = Encoder::new(&mut bank);
    for script in &scripts {
        encoder.encode_script(script)?;
    }

    bank.save(bank_path)
        .with_context(|| format!("writing bank {}", bank_path.display()))?;
    for (category, len) in bank.sizes() {
        tracing::info!(memory = category.label(), entries = len);
    }
    println!("encoded {} script(s) into {}", scripts.len(), bank_path.display());
    Ok(())
}

fn decode(bank_path: &Path, name: &str, noise: bool, json: bool) -> Result<()> {
    let bank = MemoryBank::load(bank_path)
        .with_context(|| format!("loading bank {}", bank_path.display()))?;
    let decoder = Decoder::new(&bank);
    let decoded = if bank.memory(MemoryCategory::Scripts).contains(name) {
        vec![decoder.decode_script(name, noise)?]
    } else {
        decoder.decode_all(name, noise)?
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&decoded)?);
    } else {
        for script in &decoded {
            print_decoded(script);
        }
    }
    Ok(())
}

fn roundtrip(config: &CodecConfig, input: &Path, noise: bool, json: bool) -> Result<()> {
    let scripts = read_scripts(input)?;
    let mut bank = MemoryBank::new(config)?;
    {
        let mut encoder = Encoder::new(&mut bank);
        for script in &scripts {
            encoder.encode_script(script)?;
        }
    }

    let decoder = Decoder::new(&bank);
    let mut reports = Vec::new();
    for script in &scripts {
        for (i, reference) in script.significances.iter().enumerate() {
            let name = significance_name(&script.name, i);
            let decoded = decoder.decode_script(&name, noise)?;
            let report = FidelityReport::compute(reference, &decoded.to_significance());
            if !json {
                print_decoded(&decoded);
                println!(
                    "  fidelity: overall {:.3}  action {:.3}  role {:.3}  filler {:.3}",
                    report.overall, report.action_match, report.role_match, report.filler_match
                );
            }
            reports.push((name, report));
        }
    }
    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    }
    Ok(())
}

fn stats(config: &CodecConfig, sweep: &SweepConfig, json: bool) -> Result<()> {
    let stats = DecodingStats::sweep(config, sweep)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        print!("{}", stats.to_table());
    }
    Ok(())
}

fn print_decoded(script: &DecodedScript) {
    println!(
        "{} ({} steps, {:?}, confidence {:.3})",
        script.name,
        script.steps.len(),
        script.completion,
        script.confidence
    );
    for step in &script.steps {
        println!(
            "  {} [{:.3}] {}",
            step.name, step.similarity, step.action.key
        );
        for role in &step.roles {
            let fillers: Vec<&str> = role.fillers.iter().map(|f| f.key.as_str()).collect();
            println!(
                "    {:<12} [{:.3}] {}",
                role.label.as_str(),
                role.similarity,
                fillers.join(" | ")
            );
        }
    }
}

/// `A..=B` or a single `A`. Half-open `A..B` is rejected.
fn parse_range(text: &str) -> Result<RangeInclusive<usize>> {
    let (lo, hi) = match text.split_once("..") {
        Some((lo, hi)) => match hi.strip_prefix('=') {
            Some(hi) => (lo, hi),
            None => bail!("range '{}' must be inclusive, e.g. '{}..={}'", text, lo, hi),
        },
        None => (text, text),
    };
    let lo: usize = lo.trim().parse().with_context(|| format!("bad range '{}'", text))?;
    let hi: usize = hi.trim().parse().with_context(|| format!("bad range '{}'", text))?;
    if lo > hi {
        bail!("empty range '{}'", text);
    }
    Ok(lo..=hi)
}
