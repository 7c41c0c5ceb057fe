//! # Mint Subcommand
//!
//! Operator-side commands of a single mint: identity secret generation,
//! signing a key replacement for governance, and maintaining the key list.
//!
//! The key list exists twice. The private copy under the mint home keeps
//! every signing key's private half (mode 0600); the public copy under the
//! federation's `mints/` directory is the same list with those halves
//! pruned. The private copy is always written first.

use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};

use dbcfed_netconf::store::{self, FileMode};
use dbcfed_netconf::{IdentityKey, KeyReplacement, Mint};

use crate::Session;

/// Arguments for the `dbcfed mint` subcommand.
#[derive(Args, Debug)]
pub struct MintArgs {
    #[command(subcommand)]
    pub command: MintCommand,
}

/// Mint subcommands.
#[derive(Subcommand, Debug)]
pub enum MintCommand {
    /// Generate a new identity key and store its secret.
    Keygen {
        /// Name of the secret file under secrets/ (without extension).
        #[arg(long, default_value = "identity")]
        name: String,
    },

    /// Print the mint ID of an identity secret.
    Identity {
        /// Secret to use (default: the only one present).
        #[arg(short = 's', long)]
        secret: Option<String>,
    },

    /// Sign the replacement of this mint's identity by NEW_ID.
    SignReplacement {
        /// Successor identity.
        #[arg(value_name = "NEW_ID")]
        new_id: String,
        /// Secret of the identity being replaced (default: the only one present).
        #[arg(short = 's', long)]
        secret: Option<String>,
    },

    /// Signing key list management.
    Keylist {
        #[command(subcommand)]
        command: KeylistCommand,
    },
}

/// `dbcfed mint keylist` subcommands.
#[derive(Subcommand, Debug)]
pub enum KeylistCommand {
    /// Create the private and public key lists for every network epoch.
    Create {
        /// Description of the mint (name).
        #[arg(long)]
        desc: String,
        /// Secret to use (default: the only one present).
        #[arg(short = 's', long)]
        secret: Option<String>,
        /// URLs the mint can be reached at.
        #[arg(value_name = "URL", required = true)]
        urls: Vec<String>,
    },
    /// Key and sign the network epochs added since the last run.
    Extend {
        /// Secret to use (default: the only one present).
        #[arg(short = 's', long)]
        secret: Option<String>,
    },
}

/// Execute the mint subcommand.
pub fn run_mint(args: &MintArgs, session: &Session) -> Result<u8> {
    let home = session.mint_home()?;
    match &args.command {
        MintCommand::Keygen { name } => cmd_keygen(home, name),
        MintCommand::Identity { secret } => cmd_identity(home, secret.as_deref()),
        MintCommand::SignReplacement { new_id, secret } => {
            cmd_sign_replacement(home, secret.as_deref(), new_id)
        }
        MintCommand::Keylist { command } => match command {
            KeylistCommand::Create { desc, secret, urls } => {
                cmd_keylist_create(session, home, secret.as_deref(), desc, urls)
            }
            KeylistCommand::Extend { secret } => {
                cmd_keylist_extend(session, home, secret.as_deref())
            }
        },
    }
}

fn load_identity(home: &Path, secret: Option<&str>) -> Result<IdentityKey> {
    store::load_secret(home, secret).context("failed to load identity secret")
}

/// Generate an identity key and write its seed to `secrets/<name>.key`.
fn cmd_keygen(home: &Path, name: &str) -> Result<u8> {
    let key = IdentityKey::generate();
    let path = store::save_secret(home, name, &key).context("failed to store identity secret")?;

    println!("OK: generated identity key");
    println!("  Secret: {}", path.display());
    println!("  Mint ID: {}", key.marshal_id());
    Ok(0)
}

fn cmd_identity(home: &Path, secret: Option<&str>) -> Result<u8> {
    let key = load_identity(home, secret)?;
    println!("{}", key.marshal_id());
    Ok(0)
}

/// Print the signature governance needs for `gov mint replace`.
fn cmd_sign_replacement(home: &Path, secret: Option<&str>, new_id: &str) -> Result<u8> {
    let old_key = load_identity(home, secret)?;
    let new_key =
        IdentityKey::parse(new_id).with_context(|| format!("invalid mint ID: {new_id}"))?;
    if new_key == old_key {
        bail!("cannot replace a mint by itself");
    }
    let replacement = KeyReplacement::create(&new_key, &old_key)?;
    println!("{}", replacement.signature.to_hex());
    Ok(0)
}

/// Validate the list, save it privately, prune it, save the public copy.
fn save_pair(mut mint: Mint, private_path: &Path, public_path: &Path) -> Result<()> {
    mint.validate()
        .with_context(|| format!("refusing to write invalid key list for {}", mint.id()))?;
    mint.save(private_path, FileMode::Private)
        .with_context(|| format!("failed to write key list: {}", private_path.display()))?;
    mint.prune_priv_keys();
    mint.save(public_path, FileMode::Public)
        .with_context(|| format!("failed to write key list: {}", public_path.display()))
}

fn cmd_keylist_create(
    session: &Session,
    home: &Path,
    secret: Option<&str>,
    desc: &str,
    urls: &[String],
) -> Result<u8> {
    if desc.trim().is_empty() {
        bail!("mint description must not be empty");
    }
    let network = session.load_network()?;
    let key = load_identity(home, secret)?;
    let id = key.marshal_id();

    let private_path = store::privkeylist_path(home, &id);
    let public_path = store::mint_path(&session.dir, &id);
    for path in [&private_path, &public_path] {
        if store::exists(path) {
            bail!("key list exists already: {}", path.display());
        }
    }

    let mint = Mint::new(desc, &key, urls.to_vec(), &network)
        .with_context(|| format!("cannot create key list for {id}"))?;
    let epochs = mint.epochs.len();
    save_pair(mint, &private_path, &public_path)?;

    println!("OK: created key list for {id}");
    println!("  Epochs: {epochs}");
    println!("  Private: {}", private_path.display());
    println!("  Public:  {}", public_path.display());
    Ok(0)
}

fn load_valid(path: &Path) -> Result<Mint> {
    let mint =
        Mint::load(path).with_context(|| format!("failed to load key list: {}", path.display()))?;
    mint.validate()
        .with_context(|| format!("invalid key list: {}", path.display()))?;
    Ok(mint)
}

fn cmd_keylist_extend(session: &Session, home: &Path, secret: Option<&str>) -> Result<u8> {
    let network = session.load_network()?;
    let key = load_identity(home, secret)?;
    let id = key.marshal_id();

    let private_path = store::privkeylist_path(home, &id);
    let public_path = store::mint_path(&session.dir, &id);
    let mut mint = load_valid(&private_path)?;
    let public = load_valid(&public_path)?;
    if public.identity_key != mint.identity_key || public.epochs.len() != mint.epochs.len() {
        bail!(
            "key lists disagree: {} and {}",
            private_path.display(),
            public_path.display()
        );
    }

    let added = mint
        .extend(&key, &network)
        .with_context(|| format!("cannot extend key list for {id}"))?;
    if added == 0 {
        println!("OK: key list for {id} is up to date");
        return Ok(0);
    }
    save_pair(mint, &private_path, &public_path)?;

    println!("OK: extended key list for {id} by {added} epoch(s)");
    Ok(0)
}
