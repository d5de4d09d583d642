//! Command-line interface for copysentry.
//!
//! Provides commands for running the full scan pipeline against a URL,
//! capturing page snapshots, verifying stored evidence, and rendering
//! notices from saved evidence files.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use uuid::Uuid;

use crate::capture::{FsSnapshotStore, PageCapturer};
use crate::classifier::LearnedExamples;
use crate::config;
use crate::domain::{CandidateResult, ContactInfo, NoticeTone, NoticeType, Product};
use crate::evidence::{spans, EvidenceExtractor};
use crate::gateway::HttpGateway;
use crate::notice;
use crate::pipeline::InfringementPipeline;

/// copysentry - Evidence verification and notice-assembly pipeline
#[derive(Parser, Debug)]
#[command(name = "copysentry")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the full pipeline against a candidate URL
    Scan {
        /// Candidate URL to scan
        url: String,

        /// Product profile (YAML)
        #[arg(short, long)]
        product: PathBuf,

        /// Platform label for the candidate (e.g. "forum", "marketplace")
        #[arg(long, default_value = "web")]
        platform: String,

        /// Contact info for the notice signature block (YAML)
        #[arg(short, long)]
        contact: PathBuf,

        /// Learned examples from prior human verification (JSON)
        #[arg(short, long)]
        examples: Option<PathBuf>,

        /// Notice tone
        #[arg(long, value_enum, default_value = "default")]
        tone: ToneArg,

        /// Skip Internet Archive submission
        #[arg(long)]
        no_archive: bool,
    },

    /// Capture a snapshot of a URL without classification
    Capture {
        /// URL to capture
        url: String,

        /// Skip Internet Archive submission
        #[arg(long)]
        no_archive: bool,
    },

    /// Verify a stored page against its recorded hash
    Verify {
        /// Path to the stored raw HTML
        file: PathBuf,

        /// Recorded hash ("sha256:<hex>")
        hash: String,
    },

    /// Render a notice from a saved pipeline outcome (JSON)
    Notice {
        /// Saved outcome file produced by `scan`
        outcome: PathBuf,

        /// Contact info for the signature block (YAML)
        #[arg(short, long)]
        contact: PathBuf,

        /// Notice tone
        #[arg(long, value_enum, default_value = "default")]
        tone: ToneArg,

        /// Render a cease-and-desist instead of a DMCA takedown
        #[arg(long)]
        cease_and_desist: bool,
    },

    /// Show resolved configuration (debug)
    Config,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ToneArg {
    FormalLegal,
    Urgent,
    FriendlyFirm,
    Default,
}

impl From<ToneArg> for NoticeTone {
    fn from(tone: ToneArg) -> Self {
        match tone {
            ToneArg::FormalLegal => NoticeTone::FormalLegal,
            ToneArg::Urgent => NoticeTone::Urgent,
            ToneArg::FriendlyFirm => NoticeTone::FriendlyFirm,
            ToneArg::Default => NoticeTone::Default,
        }
    }
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Scan {
                url,
                product,
                platform,
                contact,
                examples,
                tone,
                no_archive,
            } => scan(url, product, platform, contact, examples, tone, no_archive).await,
            Commands::Capture { url, no_archive } => capture(url, no_archive).await,
            Commands::Verify { file, hash } => verify(file, hash).await,
            Commands::Notice {
                outcome,
                contact,
                tone,
                cease_and_desist,
            } => render_notice(outcome, contact, tone, cease_and_desist),
            Commands::Config => show_config(),
        }
    }
}

fn load_product(path: &PathBuf) -> Result<Product> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read product profile: {}", path.display()))?;
    Product::from_yaml(&content)
}

fn load_contact(path: &PathBuf) -> Result<ContactInfo> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read contact file: {}", path.display()))?;
    serde_yaml::from_str(&content).context("Failed to parse contact YAML")
}

fn load_examples(path: Option<&PathBuf>) -> Result<LearnedExamples> {
    match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read examples file: {}", path.display()))?;
            serde_json::from_str(&content).context("Failed to parse examples JSON")
        }
        None => Ok(LearnedExamples::default()),
    }
}

async fn scan(
    url: String,
    product_path: PathBuf,
    platform: String,
    contact_path: PathBuf,
    examples_path: Option<PathBuf>,
    tone: ToneArg,
    no_archive: bool,
) -> Result<()> {
    let cfg = config::config()?;
    let product = load_product(&product_path)?;
    let contact = load_contact(&contact_path)?;
    let examples = load_examples(examples_path.as_ref())?;

    let api_key = config::api_key()?;
    let gateway = match &cfg.gateway.endpoint {
        Some(endpoint) => HttpGateway::with_endpoint(api_key, endpoint),
        None => HttpGateway::new(api_key),
    };

    let capturer = PageCapturer::new(cfg.capture.clone())
        .with_store(Arc::new(FsSnapshotStore::new(cfg.store.clone())))
        .with_archive_enabled(!no_archive);

    let pipeline = InfringementPipeline::new(Arc::new(gateway), cfg.classifier.clone(), capturer)
        .with_tone(tone.into());

    let candidate = CandidateResult {
        platform,
        source_url: url,
        risk_level: Default::default(),
        audience_estimate: None,
    };

    let outcome = pipeline.run(candidate, &product, &examples, &contact).await;

    println!("{}", serde_json::to_string_pretty(&outcome)?);

    if let Some(text) = &outcome.notice_text {
        eprintln!("\n--- Rendered notice ---\n");
        eprintln!("{}", text);
    }

    Ok(())
}

async fn capture(url: String, no_archive: bool) -> Result<()> {
    let cfg = config::config()?;

    let capturer = PageCapturer::new(cfg.capture.clone())
        .with_store(Arc::new(FsSnapshotStore::new(cfg.store.clone())))
        .with_archive_enabled(!no_archive);

    let snapshot = capturer.capture(&url, Uuid::new_v4(), Uuid::new_v4()).await;
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

async fn verify(file: PathBuf, hash: String) -> Result<()> {
    let bytes = tokio::fs::read(&file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let extractor = EvidenceExtractor::fallback_only();
    if extractor.verify(&bytes, &hash) {
        println!("OK: content matches recorded hash");
        Ok(())
    } else {
        println!(
            "MISMATCH: recorded {} but content hashes to {}",
            hash,
            spans::compute_hash(&bytes)
        );
        std::process::exit(1);
    }
}

fn render_notice(
    outcome_path: PathBuf,
    contact_path: PathBuf,
    tone: ToneArg,
    cease_and_desist: bool,
) -> Result<()> {
    let content = std::fs::read_to_string(&outcome_path)
        .with_context(|| format!("Failed to read outcome file: {}", outcome_path.display()))?;
    let outcome: crate::pipeline::PipelineOutcome =
        serde_json::from_str(&content).context("Failed to parse outcome JSON")?;

    let contact = load_contact(&contact_path)?;

    // Rebuild comparison items from the saved audit trail. An outcome with
    // no comparisons has nothing to put in the work/infringement block, so
    // refuse rather than render a hollow legal document.
    let items: Vec<_> = outcome.comparisons.iter().map(|(i, _)| i.clone()).collect();
    if items.is_empty() {
        anyhow::bail!(
            "outcome for {} contains no comparison items; re-run `scan` to rebuild evidence",
            outcome.candidate.source_url
        );
    }

    let notice_type = if cease_and_desist {
        NoticeType::CeaseAndDesist
    } else {
        NoticeType::DmcaTakedown
    };

    println!("{}", notice::render(notice_type, &items, &contact, tone.into()));
    Ok(())
}

fn show_config() -> Result<()> {
    let cfg = config::config()?;

    println!("home:  {}", cfg.home.display());
    println!("store: {}", cfg.store.display());
    match &cfg.config_file {
        Some(path) => println!("config file: {}", path.display()),
        None => println!("config file: (none found, using defaults)"),
    }
    println!("gateway model: {}", cfg.gateway.model);
    println!(
        "classifier: min_confidence={} batch_size={} policy={:?}",
        cfg.classifier.min_confidence, cfg.classifier.batch_size, cfg.classifier.failure_policy
    );
    println!(
        "capture: timeout={:?} max_text_chars={} max_links={}",
        cfg.capture.fetch_timeout, cfg.capture.max_text_chars, cfg.capture.max_links
    );

    Ok(())
}
