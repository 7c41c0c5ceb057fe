//! # Governance Subcommand
//!
//! Edits to `federation.json`, run by the federation's governance operator.
//!
//! `start` creates the file; `epoch add` appends the next epoch. Every other
//! mutating command edits the future epoch only, so it first requires that
//! the last epoch has not started signing yet.

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};

use dbcfed_core::{MintId, Timestamp};
use dbcfed_crypto::Ed25519Signature;
use dbcfed_netconf::{
    store, DbcType, EpochWindow, IdentityKey, KeyReplacement, NetconfError, Network,
};

use crate::Session;

/// Arguments for the `dbcfed gov` subcommand.
#[derive(Args, Debug)]
pub struct GovArgs {
    #[command(subcommand)]
    pub command: GovCommand,
}

/// Governance subcommands.
#[derive(Subcommand, Debug)]
pub enum GovCommand {
    /// Create federation.json with a seed epoch.
    Start {
        /// Quorum M (default from config).
        #[arg(short = 'm', long)]
        quorum: Option<u64>,
        /// Number of mints N (default from config).
        #[arg(short = 'n', long)]
        mint_count: Option<u64>,
        /// Start of the first signing window, RFC 3339 UTC (default: now).
        #[arg(long)]
        sign_start: Option<String>,
        /// DBC type valid from genesis. Repeatable.
        #[arg(long = "dbctype", value_name = "CURRENCY/AMOUNT")]
        dbc_types: Vec<DbcType>,
        /// Identity keys of the founding mints.
        #[arg(value_name = "MINT_ID", required = true)]
        mints: Vec<String>,
    },

    /// Print the validated network and its current epoch.
    Status,

    /// Epoch management.
    Epoch {
        #[command(subcommand)]
        command: EpochCommand,
    },

    /// Membership changes in the future epoch.
    Mint {
        #[command(subcommand)]
        command: GovMintCommand,
    },

    /// DBC type changes in the future epoch.
    Dbctype {
        #[command(subcommand)]
        command: DbcTypeCommand,
    },
}

/// `dbcfed gov epoch` subcommands.
#[derive(Subcommand, Debug)]
pub enum EpochCommand {
    /// Append an epoch starting where the last one stops signing.
    Add {
        /// Signing period in days (default from config).
        #[arg(long)]
        signing_period_days: Option<u32>,
        /// Validation period in days (default from config).
        #[arg(long)]
        validation_period_days: Option<u32>,
    },
    /// Set the quorum (and optionally the mint count) of the future epoch.
    SetQuorum {
        /// Quorum M.
        #[arg(short = 'm', long)]
        quorum: u64,
        /// Number of mints N.
        #[arg(short = 'n', long)]
        mint_count: Option<u64>,
    },
}

/// `dbcfed gov mint` subcommands.
#[derive(Subcommand, Debug)]
pub enum GovMintCommand {
    /// Add a mint to the future epoch.
    Add {
        #[arg(value_name = "MINT_ID")]
        id: String,
    },
    /// Remove a mint in the future epoch.
    Remove {
        #[arg(value_name = "MINT_ID")]
        id: String,
    },
    /// Replace OLD_ID by NEW_ID. The signature is by OLD_ID over NEW_ID.
    Replace {
        #[arg(value_name = "NEW_ID")]
        new_id: String,
        #[arg(value_name = "OLD_ID")]
        old_id: String,
        /// Hex signature from `dbcfed mint sign-replacement`.
        #[arg(value_name = "SIGNATURE")]
        signature: String,
    },
    /// List the mints at the end of history.
    List {
        /// List every mint ever named instead.
        #[arg(long)]
        all: bool,
    },
}

/// `dbcfed gov dbctype` subcommands.
#[derive(Subcommand, Debug)]
pub enum DbcTypeCommand {
    /// Add a DBC type to the future epoch.
    Add {
        #[arg(value_name = "CURRENCY/AMOUNT")]
        dbc_type: DbcType,
    },
    /// Remove a DBC type in the future epoch.
    Remove {
        #[arg(value_name = "CURRENCY/AMOUNT")]
        dbc_type: DbcType,
    },
    /// List the DBC types at the end of history.
    List,
}

/// Execute the gov subcommand.
pub fn run_gov(args: &GovArgs, session: &Session) -> Result<u8> {
    match &args.command {
        GovCommand::Start {
            quorum,
            mint_count,
            sign_start,
            dbc_types,
            mints,
        } => cmd_start(
            session,
            *quorum,
            *mint_count,
            sign_start.as_deref(),
            mints,
            dbc_types,
        ),
        GovCommand::Status => cmd_status(session),
        GovCommand::Epoch { command } => match command {
            EpochCommand::Add {
                signing_period_days,
                validation_period_days,
            } => cmd_epoch_add(session, *signing_period_days, *validation_period_days),
            EpochCommand::SetQuorum { quorum, mint_count } => {
                cmd_set_quorum(session, *quorum, *mint_count)
            }
        },
        GovCommand::Mint { command } => match command {
            GovMintCommand::Add { id } => cmd_mint_add(session, id),
            GovMintCommand::Remove { id } => cmd_mint_remove(session, id),
            GovMintCommand::Replace {
                new_id,
                old_id,
                signature,
            } => cmd_mint_replace(session, new_id, old_id, signature),
            GovMintCommand::List { all } => cmd_mint_list(session, *all),
        },
        GovCommand::Dbctype { command } => match command {
            DbcTypeCommand::Add { dbc_type } => cmd_dbctype_add(session, dbc_type.clone()),
            DbcTypeCommand::Remove { dbc_type } => cmd_dbctype_remove(session, dbc_type.clone()),
            DbcTypeCommand::List => cmd_dbctype_list(session),
        },
    }
}

/// Load, require a future epoch, apply `edit`, persist.
///
/// `edit` runs the governance transaction, which validates before and
/// after. Nothing is written if any step fails.
fn edit<F>(session: &Session, what: &str, edit: F) -> Result<u8>
where
    F: FnOnce(&Network, Timestamp) -> Result<Network, NetconfError>,
{
    let network = session.load_network()?;
    network
        .has_future(session.now)
        .context("no future epoch to edit (run `dbcfed gov epoch add` first)")?;
    let next = edit(&network, session.now).with_context(|| format!("cannot {what}"))?;
    save(session, &next)?;
    println!("OK: {what}");
    Ok(0)
}

fn save(session: &Session, network: &Network) -> Result<()> {
    let path = session.network_path();
    network
        .save(&path)
        .with_context(|| format!("failed to write network: {}", path.display()))
}

fn parse_identity(id: &str) -> Result<IdentityKey> {
    IdentityKey::parse(id).with_context(|| format!("invalid mint ID: {id}"))
}

/// Create the network file with a seed epoch.
fn cmd_start(
    session: &Session,
    quorum: Option<u64>,
    mint_count: Option<u64>,
    sign_start: Option<&str>,
    mints: &[String],
    dbc_types: &[DbcType],
) -> Result<u8> {
    let path = session.network_path();
    if store::exists(&path) {
        bail!("network file exists already: {}", path.display());
    }
    let config = &session.config;
    let m = quorum.unwrap_or(config.default_quorum);
    let n = mint_count.unwrap_or(config.default_mint_count);
    let sign_start = match sign_start {
        Some(s) => Timestamp::parse(s).with_context(|| format!("invalid sign start: {s}"))?,
        None => session.now,
    };
    let window = EpochWindow::starting_at(
        sign_start,
        config.signing_period(),
        config.validation_period(),
    )?;
    let keys = mints
        .iter()
        .map(|id| parse_identity(id))
        .collect::<Result<Vec<_>>>()?;

    let network = Network::start(m, n, window, keys, dbc_types.to_vec())
        .context("invalid genesis epoch")?;
    save(session, &network)?;

    println!("OK: started network");
    println!("  Quorum: {m} of {n}");
    println!("  Mints: {}", mints.len());
    println!("  Signing: {} .. {}", window.sign_start, window.sign_end);
    Ok(0)
}

/// Print the network plus where "now" falls in it.
fn cmd_status(session: &Session) -> Result<u8> {
    let network = session.load_network()?;
    let json = serde_json::to_string_pretty(&network).context("failed to serialize network")?;
    println!("{json}");

    match network.current_epoch(session.now) {
        Ok(i) => {
            let e = &network.epochs[i];
            println!(
                "current epoch: {i} (M={}, N={}, signing until {})",
                e.quorum, e.mint_count, e.window.sign_end
            );
        }
        Err(e) => println!("current epoch: none ({e})"),
    }
    if network.has_future(session.now).is_ok() {
        println!("future epoch: {}", network.epochs.len() - 1);
    } else {
        println!("future epoch: none");
    }
    Ok(0)
}

fn cmd_epoch_add(
    session: &Session,
    signing_period_days: Option<u32>,
    validation_period_days: Option<u32>,
) -> Result<u8> {
    let network = session.load_network()?;
    let mut config = session.config.clone();
    if let Some(days) = signing_period_days {
        config.signing_period_days = days;
    }
    if let Some(days) = validation_period_days {
        config.validation_period_days = days;
    }
    let next = network
        .add_epoch(config.signing_period(), config.validation_period())
        .context("cannot add epoch")?;
    save(session, &next)?;

    let index = next.epochs.len() - 1;
    let window = next.epochs[index].window;
    println!("OK: added epoch {index}");
    println!("  Signing: {} .. {}", window.sign_start, window.sign_end);
    println!("  Validate until: {}", window.validate_end);
    Ok(0)
}

fn cmd_set_quorum(session: &Session, quorum: u64, mint_count: Option<u64>) -> Result<u8> {
    edit(session, &format!("set quorum M={quorum}"), |net, now| {
        net.change_quorum(now, quorum, mint_count)
    })
}

fn cmd_mint_add(session: &Session, id: &str) -> Result<u8> {
    let key = parse_identity(id)?;
    edit(session, &format!("add mint {id}"), |net, now| {
        net.add_mint(now, &key)
    })
}

fn cmd_mint_remove(session: &Session, id: &str) -> Result<u8> {
    let id = parse_identity(id)?.marshal_id();
    edit(session, &format!("remove mint {id}"), |net, now| {
        net.remove_mint(now, &id)
    })
}

fn cmd_mint_replace(session: &Session, new_id: &str, old_id: &str, signature: &str) -> Result<u8> {
    let new_key = parse_identity(new_id)?;
    let old_key = parse_identity(old_id)?;
    let signature =
        Ed25519Signature::from_hex(signature.trim()).context("invalid replacement signature")?;
    let replacement = KeyReplacement::from_parts(new_key, old_key, signature);
    edit(session, &format!("replace mint {old_id} by {new_id}"), |net, now| {
        net.replace_mint(now, replacement)
    })
}

fn cmd_mint_list(session: &Session, all: bool) -> Result<u8> {
    let network = session.load_network()?;
    let ids: Vec<MintId> = if all {
        network.all_mints().into_iter().collect()
    } else {
        network.mints()?.into_iter().collect()
    };
    for id in ids {
        println!("{id}");
    }
    Ok(0)
}

fn cmd_dbctype_add(session: &Session, dbc_type: DbcType) -> Result<u8> {
    edit(session, &format!("add DBC type {dbc_type}"), |net, now| {
        net.add_dbc_type(now, dbc_type)
    })
}

fn cmd_dbctype_remove(session: &Session, dbc_type: DbcType) -> Result<u8> {
    edit(session, &format!("remove DBC type {dbc_type}"), |net, now| {
        net.remove_dbc_type(now, dbc_type)
    })
}

fn cmd_dbctype_list(session: &Session) -> Result<u8> {
    let network = session.load_network()?;
    for t in network.dbc_types()? {
        println!("{}\t{}", t.currency, t.amount);
    }
    Ok(0)
}

#[cfg(test)]
pub(crate) mod tests {
    use std::path::Path;

    use super::*;
    use crate::testutil::{session, GENESIS};

    fn eur(units: u64) -> DbcType {
        DbcType::new("EUR", units * 100_000_000)
    }

    /// Start a 2-of-3 network with EUR/1 and EUR/2. Returns the founders
    /// with their private halves.
    pub(crate) fn started(s: &Session) -> Vec<IdentityKey> {
        let keys: Vec<IdentityKey> = (0..3).map(|_| IdentityKey::generate()).collect();
        let ids: Vec<String> = keys.iter().map(|k| k.marshal_id().to_string()).collect();
        let code = cmd_start(s, Some(2), Some(3), Some(GENESIS), &ids, &[eur(1), eur(2)]).unwrap();
        assert_eq!(code, 0);
        keys
    }

    fn network(dir: &Path) -> Network {
        Network::load(&store::network_path(dir)).unwrap()
    }

    #[test]
    fn start_creates_network() {
        let dir = tempfile::tempdir().unwrap();
        let home = tempfile::tempdir().unwrap();
        let s = session(dir.path(), home.path());
        let keys = started(&s);

        let net = network(dir.path());
        net.validate().unwrap();
        assert_eq!(net.epochs.len(), 1);
        assert_eq!(net.epochs[0].quorum, 2);
        assert_eq!(net.mints().unwrap().len(), 3);
        assert!(net.mints().unwrap().contains(&keys[0].marshal_id()));
        assert_eq!(net.dbc_types().unwrap(), vec![eur(1), eur(2)]);
    }

    #[test]
    fn start_refuses_existing_network() {
        let dir = tempfile::tempdir().unwrap();
        let home = tempfile::tempdir().unwrap();
        let s = session(dir.path(), home.path());
        started(&s);
        let id = IdentityKey::generate().marshal_id().to_string();
        let err = cmd_start(&s, None, None, Some(GENESIS), &[id], &[]).unwrap_err();
        assert!(format!("{err}").contains("exists already"));
    }

    #[test]
    fn start_with_invalid_quorum_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let home = tempfile::tempdir().unwrap();
        let s = session(dir.path(), home.path());
        let id = IdentityKey::generate().marshal_id().to_string();
        assert!(cmd_start(&s, Some(1), Some(3), Some(GENESIS), &[id], &[]).is_err());
        assert!(!store::network_path(dir.path()).exists());
    }

    #[test]
    fn start_rejects_bad_mint_id() {
        let dir = tempfile::tempdir().unwrap();
        let home = tempfile::tempdir().unwrap();
        let s = session(dir.path(), home.path());
        let err = cmd_start(&s, None, None, None, &["rsa-AAAA".to_string()], &[]).unwrap_err();
        assert!(format!("{err}").contains("invalid mint ID"));
    }

    #[test]
    fn edit_without_future_epoch_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let home = tempfile::tempdir().unwrap();
        let s = session(dir.path(), home.path());
        started(&s);
        let path = store::network_path(dir.path());
        let before = std::fs::read(&path).unwrap();

        let id = IdentityKey::generate().marshal_id().to_string();
        let err = cmd_mint_add(&s, &id).unwrap_err();
        assert!(format!("{err:#}").contains("no future epoch"));
        assert_eq!(std::fs::read(&path).unwrap(), before);
    }

    #[test]
    fn epoch_add_opens_future_epoch_for_edits() {
        let dir = tempfile::tempdir().unwrap();
        let home = tempfile::tempdir().unwrap();
        let s = session(dir.path(), home.path());
        let keys = started(&s);

        assert_eq!(cmd_epoch_add(&s, None, Some(60)).unwrap(), 0);
        let newcomer = IdentityKey::generate();
        cmd_mint_add(&s, newcomer.marshal_id().as_str()).unwrap();
        cmd_mint_remove(&s, keys[0].marshal_id().as_str()).unwrap();
        cmd_dbctype_add(&s, eur(5)).unwrap();
        cmd_dbctype_remove(&s, eur(2)).unwrap();
        cmd_set_quorum(&s, 3, Some(4)).unwrap();

        let net = network(dir.path());
        let e1 = &net.epochs[1];
        assert_eq!(e1.window.sign_start, net.epochs[0].window.sign_end);
        assert_eq!((e1.quorum, e1.mint_count), (3, 4));
        let mints = net.mints().unwrap();
        assert!(mints.contains(&newcomer.marshal_id()));
        assert!(!mints.contains(&keys[0].marshal_id()));
        assert_eq!(net.dbc_types().unwrap(), vec![eur(1), eur(5)]);
        assert!(net.all_mints().contains(&keys[0].marshal_id()));
    }

    #[test]
    fn invalid_edit_is_not_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let home = tempfile::tempdir().unwrap();
        let s = session(dir.path(), home.path());
        started(&s);
        cmd_epoch_add(&s, None, None).unwrap();
        let path = store::network_path(dir.path());
        let before = std::fs::read(&path).unwrap();

        assert!(cmd_dbctype_remove(&s, DbcType::new("USD", 1)).is_err());
        assert!(cmd_set_quorum(&s, 1, None).is_err());
        assert_eq!(std::fs::read(&path).unwrap(), before);
    }

    #[test]
    fn replace_with_valid_signature() {
        let dir = tempfile::tempdir().unwrap();
        let home = tempfile::tempdir().unwrap();
        let s = session(dir.path(), home.path());
        let keys = started(&s);
        cmd_epoch_add(&s, None, None).unwrap();

        let successor = IdentityKey::generate();
        let proof = KeyReplacement::create(&successor, &keys[1]).unwrap();
        let (new_id, old_id) = (successor.marshal_id(), keys[1].marshal_id());
        cmd_mint_replace(&s, new_id.as_str(), old_id.as_str(), &proof.signature.to_hex())
            .unwrap();

        let mints = network(dir.path()).mints().unwrap();
        assert!(mints.contains(&new_id));
        assert!(!mints.contains(&old_id));
    }

    #[test]
    fn replace_with_foreign_signature_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let home = tempfile::tempdir().unwrap();
        let s = session(dir.path(), home.path());
        let keys = started(&s);
        cmd_epoch_add(&s, None, None).unwrap();

        let successor = IdentityKey::generate();
        let forged = KeyReplacement::create(&successor, &keys[2]).unwrap();
        let err = cmd_mint_replace(
            &s,
            successor.marshal_id().as_str(),
            keys[1].marshal_id().as_str(),
            &forged.signature.to_hex(),
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("does not verify"));
    }

    #[test]
    fn listings_and_status() {
        let dir = tempfile::tempdir().unwrap();
        let home = tempfile::tempdir().unwrap();
        let s = session(dir.path(), home.path());
        started(&s);
        assert_eq!(cmd_status(&s).unwrap(), 0);
        assert_eq!(cmd_mint_list(&s, false).unwrap(), 0);
        assert_eq!(cmd_mint_list(&s, true).unwrap(), 0);
        assert_eq!(cmd_dbctype_list(&s).unwrap(), 0);
    }

    #[test]
    fn status_on_missing_network_fails() {
        let dir = tempfile::tempdir().unwrap();
        let home = tempfile::tempdir().unwrap();
        let s = session(dir.path(), home.path());
        assert!(cmd_status(&s).is_err());
    }
}
