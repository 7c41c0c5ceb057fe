//! # Engine Subcommand
//!
//! Checks a federation directory the way a signing engine loads it: the
//! network must validate, and enough mints must have published valid key
//! lists for the current epoch to reach quorum.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use dbcfed_netconf::{Federation, Roster};

use crate::Session;

/// Arguments for the `dbcfed engine` subcommand.
#[derive(Args, Debug)]
pub struct EngineArgs {
    #[command(subcommand)]
    pub command: EngineCommand,
}

/// Engine subcommands.
#[derive(Subcommand, Debug)]
pub enum EngineCommand {
    /// Validate the federation configuration in the federation directory.
    Validateconf {
        /// Look for every mint ever named, not only current members.
        #[arg(long)]
        all_mints: bool,
    },
}

/// Execute the engine subcommand.
pub fn run_engine(args: &EngineArgs, session: &Session) -> Result<u8> {
    match &args.command {
        EngineCommand::Validateconf { all_mints } => {
            let roster = if *all_mints {
                Roster::All
            } else {
                Roster::Current
            };
            cmd_validateconf(session, roster)
        }
    }
}

fn cmd_validateconf(session: &Session, roster: Roster) -> Result<u8> {
    let federation = Federation::load(&session.dir, session.now, roster).with_context(|| {
        format!("invalid federation configuration in {}", session.dir.display())
    })?;

    for w in &federation.warnings {
        println!("WARN: {}: {}", w.id, w.error);
    }
    for (i, count) in federation.epoch_mint_counts().into_iter().enumerate() {
        let epoch = &federation.network.epochs[i];
        println!(
            "epoch {i}: {count} of {} mints published keys (quorum {})",
            epoch.mint_count, epoch.quorum
        );
    }
    println!("OK: federation configuration is valid");
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gov::tests::started;
    use crate::testutil::session;
    use dbcfed_netconf::store::{self, FileMode};
    use dbcfed_netconf::{IdentityKey, Mint, NetconfError, Network};

    fn publish(s: &Session, key: &IdentityKey) {
        let network = Network::load(&s.network_path()).unwrap();
        let mut mint = Mint::new("m", key, vec!["https://m".into()], &network).unwrap();
        mint.prune_priv_keys();
        mint.save(&store::mint_path(&s.dir, &mint.id()), FileMode::Public)
            .unwrap();
    }

    #[test]
    fn validateconf_with_quorum() {
        let dir = tempfile::tempdir().unwrap();
        let home = tempfile::tempdir().unwrap();
        let s = session(dir.path(), home.path());
        let keys = started(&s);
        publish(&s, &keys[0]);
        publish(&s, &keys[1]);
        assert_eq!(cmd_validateconf(&s, Roster::Current).unwrap(), 0);
        assert_eq!(cmd_validateconf(&s, Roster::All).unwrap(), 0);
    }

    #[test]
    fn validateconf_without_quorum_fails() {
        let dir = tempfile::tempdir().unwrap();
        let home = tempfile::tempdir().unwrap();
        let s = session(dir.path(), home.path());
        let keys = started(&s);
        publish(&s, &keys[0]);
        let err = cmd_validateconf(&s, Roster::Current).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<NetconfError>(),
            Some(NetconfError::QuorumNotReached { .. })
        ));
    }

    #[test]
    fn validateconf_on_empty_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let home = tempfile::tempdir().unwrap();
        let s = session(dir.path(), home.path());
        assert!(cmd_validateconf(&s, Roster::Current).is_err());
    }
}
