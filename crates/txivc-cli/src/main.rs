// crates/txivc-cli/src/main.rs

#![forbid(unsafe_code)]
#![deny(
    rust_2018_idioms,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo
)]

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use txivc_backend::TranscriptBackend;
use txivc_chain::{slice_tx, ChainConfig, ChainContext, Link, ProofChain, Verifier};
use txivc_core::api::{decode_raw_tx, ProofResponse, VerifyRequest};
use txivc_core::io::write_json;
use txivc_core::CircuitKind;

type Ctx = Arc<ChainContext<TranscriptBackend>>;

#[derive(Parser, Debug)]
#[command(
    name = "txivc",
    about = "TXIVC reference CLI",
    long_about = "TXIVC reference CLI.\n\nProve a genesis transaction, extend the proof to a child \
                  transaction that spends it, and verify either proof.",
    version = env!("CARGO_PKG_VERSION"),
    disable_help_subcommand = true
)]
struct Cli {
    /// TOML configuration file (defaults apply when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Artifact directory; overrides config and TXIVC_ARTIFACT_DIR
    #[arg(long, global = true)]
    artifact_dir: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Compile and set up both circuits if no key pairs are persisted yet
    Setup,

    /// Print the identifier (double SHA-256) of a raw transaction
    Txid {
        /// Hex-encoded raw transaction
        #[arg(long)]
        raw_tx: String,
    },

    /// Split a raw transaction around the previous-tx id of one input
    Slice {
        /// Hex-encoded raw transaction
        #[arg(long)]
        raw_tx: String,

        /// Input whose previous-tx id to cut out
        #[arg(long, default_value_t = 0)]
        input_index: u64,
    },

    /// Prove a genesis transaction with the base circuit
    ProveBase {
        /// Hex-encoded raw transaction
        #[arg(long)]
        raw_tx: String,

        /// Write the proof response (JSON) here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Prove a child transaction on top of its predecessor's base proof
    ProveNormal {
        /// Hex-encoded raw child transaction
        #[arg(long)]
        raw_tx: String,

        /// Input of the child that spends the predecessor
        #[arg(long, default_value_t = 0)]
        input_index: u64,

        /// Predecessor proof: a `prove-base` response file or bare proof text
        #[arg(long)]
        proof: PathBuf,

        /// The predecessor proof is itself a normal proof
        #[arg(long, default_value_t = false)]
        parent_normal: bool,

        /// Write the proof response (JSON) here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Verify a proof against a transaction identifier
    Verify {
        /// Circuit the proof claims to come from
        #[arg(value_enum, long)]
        kind: KindOpt,

        /// Hex-encoded transaction identifier
        #[arg(long)]
        txn_id: String,

        /// Proof: a `prove-*` response file or bare proof text
        #[arg(long)]
        proof: PathBuf,
    },
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, ValueEnum)]
enum KindOpt {
    /// Base (genesis) circuit
    Base,
    /// Normal (inductive) circuit
    Normal,
}

impl From<KindOpt> for CircuitKind {
    fn from(k: KindOpt) -> Self {
        match k {
            KindOpt::Base => Self::Base,
            KindOpt::Normal => Self::Normal,
        }
    }
}

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let cfg = || load_config(cli.config.as_deref(), cli.artifact_dir.clone());
    match cli.cmd {
        Cmd::Setup => setup(&cfg()?),

        Cmd::Txid { ref raw_tx } => txid(raw_tx),

        Cmd::Slice {
            ref raw_tx,
            input_index,
        } => slice(raw_tx, input_index),

        Cmd::ProveBase { ref raw_tx, ref out } => {
            prove_base(&context(&cfg()?)?, raw_tx, out.as_deref())
        }

        Cmd::ProveNormal {
            ref raw_tx,
            input_index,
            ref proof,
            parent_normal,
            ref out,
        } => prove_normal(
            &context(&cfg()?)?,
            raw_tx,
            input_index,
            proof,
            !parent_normal,
            out.as_deref(),
        ),

        Cmd::Verify {
            kind,
            ref txn_id,
            ref proof,
        } => verify(&context(&cfg()?)?, kind.into(), txn_id, proof),
    }
}

/// Initialize tracing with an env-driven filter (default INFO).
fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .with_writer(std::io::stderr)
        .compact();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

fn load_config(path: Option<&Path>, artifact_dir: Option<PathBuf>) -> Result<ChainConfig> {
    let mut cfg = ChainConfig::load(path).context("loading configuration")?;
    if let Some(dir) = artifact_dir {
        cfg.artifact_dir = dir;
    }
    Ok(cfg)
}

fn context(cfg: &ChainConfig) -> Result<Ctx> {
    let ctx = ChainContext::from_config(Arc::new(TranscriptBackend::new()), cfg)
        .with_context(|| format!("opening artifacts in {}", cfg.artifact_dir.display()))?;
    Ok(Arc::new(ctx))
}

fn setup(cfg: &ChainConfig) -> Result<()> {
    info!(dir=%cfg.artifact_dir.display(), params=?cfg.params(), "setting up circuits");
    let ctx = context(cfg)?;
    println!("base   : {}", ctx.base().key);
    println!("normal : {}", ctx.normal().key);
    println!("artifacts in {}", cfg.artifact_dir.display());
    Ok(())
}

fn txid(raw_tx: &str) -> Result<()> {
    let raw = decode_raw_tx(raw_tx)?;
    println!("{}", txivc_crypto::tx_id(&raw));
    Ok(())
}

#[derive(Serialize)]
struct SliceOut {
    prefix: String,
    linked_id: String,
    postfix: String,
    prefix_bytes: usize,
    postfix_bytes: usize,
}

fn slice(raw_tx: &str, input_index: u64) -> Result<()> {
    let raw = decode_raw_tx(raw_tx)?;
    let s = slice_tx(&raw, input_index)
        .with_context(|| format!("slicing input {input_index}"))?;
    let out = SliceOut {
        prefix: hex::encode(&s.prefix),
        linked_id: s.linked_id.to_hex(),
        postfix: hex::encode(&s.postfix),
        prefix_bytes: s.prefix.len(),
        postfix_bytes: s.postfix.len(),
    };
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

fn prove_base(ctx: &Ctx, raw_tx: &str, out: Option<&Path>) -> Result<()> {
    let raw = decode_raw_tx(raw_tx)?;
    info!(bytes = raw.len(), "proving base transaction");
    let proved = ProofChain::new(Arc::clone(ctx))
        .prove(Link::Base { raw: &raw })
        .context("base proof failed")?;
    emit(&ProofResponse::from(proved), out)
}

fn prove_normal(
    ctx: &Ctx,
    raw_tx: &str,
    input_index: u64,
    proof: &Path,
    predecessor_is_base: bool,
    out: Option<&Path>,
) -> Result<()> {
    let raw = decode_raw_tx(raw_tx)?;
    let predecessor = read_proof_text(proof)?;
    info!(bytes = raw.len(), input_index, proof=%proof.display(), "proving child transaction");
    let proved = ProofChain::new(Arc::clone(ctx))
        .prove(Link::Inductive {
            raw: &raw,
            input_index,
            predecessor_proof: &predecessor,
            predecessor_is_base,
        })
        .context("normal proof failed")?;
    emit(&ProofResponse::from(proved), out)
}

fn verify(ctx: &Ctx, kind: CircuitKind, txn_id: &str, proof: &Path) -> Result<()> {
    let req = VerifyRequest {
        txn_id: txn_id.to_owned(),
        proof: read_proof_text(proof)?,
        kind,
    };
    info!(%kind, txn_id, proof=%proof.display(), "verifying proof");
    let res = Verifier::new(Arc::clone(ctx)).handle(&req)?;
    println!("{}", serde_json::to_string_pretty(&res)?);
    if !res.verified {
        bail!("{kind} proof does not verify for {}", res.txnid);
    }
    Ok(())
}

/// Accept either a saved [`ProofResponse`] or the bare proof text.
fn read_proof_text(path: &Path) -> Result<String> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading proof from {}", path.display()))?;
    Ok(proof_text(&text))
}

fn proof_text(text: &str) -> String {
    serde_json::from_str::<ProofResponse>(text)
        .map_or_else(|_| text.trim().to_owned(), |r| r.proof)
}

fn emit(resp: &ProofResponse, out: Option<&Path>) -> Result<()> {
    match out {
        Some(path) => {
            write_json(path, resp).with_context(|| format!("writing {}", path.display()))?;
            println!("{} → {}", resp.txn_id, path.display());
        }
        None => println!("{}", serde_json::to_string_pretty(resp)?),
    }
    Ok(())
}
