//! idtoken-cache CLI - inspect and clear cached id tokens
//!
//! Operates on the same OS keychain entries the database client uses, so an
//! operator can check whether a token is cached or force a fresh login.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;

use idtoken_cache::{extract_host, CacheConfig, CacheSlot, CacheState, CredentialCache, IdToken};

/// Id token cache - manage cached database login tokens
#[derive(Parser, Debug)]
#[command(name = "idtoken-cache")]
#[command(version)]
#[command(about = "Inspect and manage cached database id tokens")]
struct Args {
    /// Config file (defaults to the per-user config location)
    #[arg(long, global = true, env = "IDTOKEN_CACHE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show which secure storage backend is in use
    Status,

    /// Check for a cached token
    Get {
        /// Full server URL, e.g. https://acct.example.com:443/
        #[arg(long)]
        url: String,
        #[arg(long)]
        user: String,
        /// Print the token itself instead of just reporting presence
        #[arg(long)]
        reveal: bool,
    },

    /// Cache a token
    Set {
        #[arg(long)]
        url: String,
        #[arg(long)]
        user: String,
        /// Read the token from this environment variable instead of prompting
        #[arg(long)]
        token_env: Option<String>,
    },

    /// Remove a cached token
    Delete {
        /// Host name, or a full server URL that will be reduced to its host
        #[arg(long)]
        host: String,
        #[arg(long)]
        user: String,
    },

    /// Print the effective configuration
    Config {
        /// Write the default configuration file if none exists
        #[arg(long)]
        init: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let slot = CacheSlot::new();

    match args.command {
        Command::Status => {
            let cache = open_cache(args.config.as_deref(), &slot)?;
            match cache.state() {
                CacheState::Active => {
                    println!("active: {}", cache.backend_name().unwrap_or("unknown"));
                }
                CacheState::Inert => println!("inert: id tokens are not cached on this system"),
            }
        }
        Command::Get { url, user, reveal } => {
            let cache = open_cache(args.config.as_deref(), &slot)?;
            match cache.get(&url, &user)? {
                Some(token) if reveal => println!("{}", token.expose()),
                Some(_) => println!("cached token found for {} at {}", user, extract_host(&url)?),
                None => {
                    println!("no cached token");
                    std::process::exit(1);
                }
            }
        }
        Command::Set { url, user, token_env } => {
            let cache = open_cache(args.config.as_deref(), &slot)?;
            if cache.state() == CacheState::Inert {
                return Err("Secure local storage is not available on this system".into());
            }
            let token = match token_env {
                Some(var) => std::env::var(&var)
                    .map_err(|e| format!("Failed to read {}: {}", var, e))?,
                None => rpassword::prompt_password("Id token: ")?,
            };
            let token = non_empty_token(token)?;
            cache.set(&url, &user, &token)?;
            info!("Cached id token for {}", user);
        }
        Command::Delete { host, user } => {
            let cache = open_cache(args.config.as_deref(), &slot)?;
            let host = delete_target_host(host)?;
            cache.delete_id_token_cache(&host, &user);
            info!("Removed cached id token for {} at {}", user, host);
        }
        Command::Config { init } => {
            let path = match &args.config {
                Some(path) => path.clone(),
                None => CacheConfig::default_path()?,
            };
            show_config(&path, init)?;
        }
    }

    Ok(())
}

/// The cache silently skips empty tokens, so refuse them up front
fn non_empty_token(raw: String) -> Result<IdToken, Box<dyn std::error::Error>> {
    let token = IdToken::new(raw.trim_end_matches(['\r', '\n']));
    if token.is_empty() {
        return Err("Empty id token given; nothing was cached".into());
    }
    Ok(token)
}

/// Accept either a bare host or a full server URL; the cache wants the bare host
fn delete_target_host(host: String) -> idtoken_cache::Result<String> {
    if host.contains("://") {
        extract_host(&host)
    } else {
        Ok(host.trim().to_string())
    }
}

/// The process-wide cache, or a cache built from an explicit config file
fn open_cache<'a>(
    config: Option<&Path>,
    slot: &'a CacheSlot,
) -> Result<&'a CredentialCache, Box<dyn std::error::Error>> {
    let Some(path) = config else {
        return Ok(CredentialCache::global());
    };

    let config = CacheConfig::load(path)
        .map_err(|e| format!("Failed to load config {}: {}", path.display(), e))?
        .with_env_overrides();
    Ok(slot.get_or_detect(&config))
}

fn show_config(path: &Path, init: bool) -> Result<(), Box<dyn std::error::Error>> {
    if init && !path.exists() {
        CacheConfig::default().save(path)?;
        info!("Wrote default config to {:?}", path);
    }

    let config = CacheConfig::load(path)?.with_env_overrides();
    println!("# {}", path.display());
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}
