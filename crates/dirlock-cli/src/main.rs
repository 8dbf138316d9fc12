//! dirlock: per-directory obfuscation vault CLI
//!
//! Commands:
//!   encrypt <dir>            - transform every non-ignored entry in place
//!   decrypt <dir>            - restore entries after a password check
//!   hash <text>              - compute a digest under a chosen algorithm
//!   verify <text> <digest>   - check a digest, probing all algorithms if none given
//!
//! The password comes from --password, the DIRLOCK_PASSWORD environment
//! variable, or an interactive prompt, in that order.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use secrecy::SecretString;

use dirlock_core::BatchReport;
use dirlock_crypto::HashAlgorithm;
use dirlock_vault::batch::{self, ProgressFn};

// ── CLI structure ──────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "dirlock",
    version,
    about = "Reversible directory obfuscation vault",
    long_about = "dirlock: encrypt/decrypt directory entries with a keyed additive cipher.\n\
                  This is obfuscation, not cryptography — do not rely on it for secrecy."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Encrypt every entry of a directory (subdirectories are skipped)
    Encrypt {
        /// Target directory
        directory: PathBuf,
        /// Entry names to leave untouched (repeatable)
        #[arg(long, short = 'i')]
        ignore: Vec<String>,
        /// Password (prompted for when absent)
        #[arg(long, short = 'p', env = "DIRLOCK_PASSWORD")]
        password: Option<String>,
    },

    /// Decrypt a previously encrypted directory
    Decrypt {
        /// Target directory
        directory: PathBuf,
        /// Remove the config file after a fully successful decrypt
        #[arg(long)]
        remove_config: bool,
        /// Alternate config file to use instead of the directory's own
        #[arg(long)]
        config: Option<PathBuf>,
        /// Password (prompted for when absent)
        #[arg(long, short = 'p', env = "DIRLOCK_PASSWORD")]
        password: Option<String>,
    },

    /// Compute a hex digest of a text
    Hash {
        /// Text to digest
        text: String,
        /// Algorithm: md5, sha1, sha224, sha256, sha384, sha512 or shift64
        #[arg(long, short = 'a', default_value = "md5")]
        algorithm: String,
    },

    /// Check a digest against a text
    Verify {
        /// Text the digest should match
        text: String,
        /// Digest in hex
        digest: String,
        /// Algorithm to use; when omitted every supported one is tried
        #[arg(long, short = 'a')]
        algorithm: Option<String>,
    },
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Encrypt {
            directory,
            ignore,
            password,
        } => cmd_encrypt(&directory, &ignore, password),
        Commands::Decrypt {
            directory,
            remove_config,
            config,
            password,
        } => cmd_decrypt(&directory, remove_config, config.as_deref(), password),
        Commands::Hash { text, algorithm } => cmd_hash(&text, &algorithm),
        Commands::Verify {
            text,
            digest,
            algorithm,
        } => cmd_verify(&text, &digest, algorithm.as_deref()),
    }
}

// ── Commands ──────────────────────────────────────────────────────────────────

fn cmd_encrypt(directory: &Path, ignore: &[String], password: Option<String>) -> Result<()> {
    let password = resolve_password(password)?;
    let pb = make_progress_bar("encrypt");
    let progress = progress_fn(&pb);

    let report = batch::encrypt(directory, &password, ignore, Some(&progress))
        .with_context(|| format!("encrypting {}", directory.display()))?;

    pb.finish_and_clear();
    print_summary("Encrypted", &report);
    if !report.failed.is_empty() {
        println!("Failed entries were added to the ignore list.");
    }
    Ok(())
}

fn cmd_decrypt(
    directory: &Path,
    remove_config: bool,
    alternate_config: Option<&Path>,
    password: Option<String>,
) -> Result<()> {
    let password = resolve_password(password)?;
    let pb = make_progress_bar("decrypt");
    let progress = progress_fn(&pb);

    let report = match alternate_config {
        Some(path) => {
            let config = dirlock_vault::store::load_from_path(path)
                .with_context(|| format!("loading alternate config: {}", path.display()))?;
            batch::decrypt_with_config(directory, &password, &config, remove_config, Some(&progress))
        }
        None => batch::decrypt(directory, &password, remove_config, Some(&progress)),
    }
    .with_context(|| format!("decrypting {}", directory.display()))?;

    pb.finish_and_clear();
    print_summary("Decrypted", &report);
    Ok(())
}

fn cmd_hash(text: &str, algorithm: &str) -> Result<()> {
    let algorithm = HashAlgorithm::from_str(algorithm)?;
    println!("{}", dirlock_crypto::make_digest(text, algorithm));
    Ok(())
}

fn cmd_verify(text: &str, digest: &str, algorithm: Option<&str>) -> Result<()> {
    let algorithm = algorithm.map(HashAlgorithm::from_str).transpose()?;
    if dirlock_crypto::verify_digest(text, digest, algorithm) {
        println!("match");
        Ok(())
    } else {
        println!("no match");
        std::process::exit(1);
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn resolve_password(flag: Option<String>) -> Result<SecretString> {
    let plain = match flag {
        Some(p) => p,
        None => rpassword::prompt_password("Password: ").context("reading password")?,
    };
    Ok(SecretString::from(plain))
}

fn make_progress_bar(prefix: &str) -> ProgressBar {
    let pb = ProgressBar::no_length();
    pb.set_style(
        ProgressStyle::with_template("{prefix:.bold} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("=>-"),
    );
    pb.set_prefix(prefix.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn progress_fn(pb: &ProgressBar) -> ProgressFn {
    let pb = pb.clone();
    Box::new(move |done, total, msg| {
        pb.set_length(total);
        pb.set_position(done);
        pb.set_message(msg.to_string());
    })
}

fn print_summary(verb: &str, report: &BatchReport) {
    println!(
        "{verb} {} entries: {} succeeded, {} skipped, {} failed",
        report.total(),
        report.succeeded.len(),
        report.skipped.len(),
        report.failed.len(),
    );
    for name in &report.skipped {
        println!("  skipped  {name}");
    }
    for failure in &report.failed {
        println!("  failed   {} ({})", failure.name, failure.reason);
    }
}
