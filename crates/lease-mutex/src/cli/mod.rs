pub mod handlers;

use std::path::PathBuf;

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use lease_mutex_core::config::{
    PartialClientConfig, PartialConfig, PartialLockConfig, PartialStoreConfig,
};

pub fn build_cli() -> Command {
    Command::new("lease-mutex")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Lease-based distributed mutex over SQLite")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .value_name("PATH")
                .value_parser(value_parser!(PathBuf))
                .help("Config file to use instead of the global and project files"),
        )
        .arg(
            Arg::new("database-url")
                .long("database-url")
                .global(true)
                .value_name("URL")
                .help("Store connection URL, e.g. sqlite:locks.db?mode=rwc"),
        )
        .arg(
            Arg::new("timeout-ms")
                .long("timeout-ms")
                .global(true)
                .value_name("MS")
                .value_parser(value_parser!(u64).range(1..))
                .help("Deadline for each store call"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::Count)
                .help("Log protocol decisions to stderr (-vv for everything)"),
        )
        .subcommand(cmd_init())
        .subcommand(cmd_acquire())
        .subcommand(cmd_release())
        .subcommand(cmd_status())
        .subcommand(cmd_console())
}

fn arg_lock() -> Arg {
    Arg::new("lock")
        .long("lock")
        .short('l')
        .value_name("NAME")
        .help("Lock name [default: default-mutex]")
}

fn arg_owner() -> Arg {
    Arg::new("owner")
        .long("owner")
        .short('o')
        .value_name("OWNER")
        .help("Owner identity [default: <hostname>-<pid>]")
}

fn arg_lease() -> Arg {
    Arg::new("lease-ms")
        .long("lease-ms")
        .value_name("MS")
        .value_parser(value_parser!(u64).range(1..))
        .help("Lease length in milliseconds")
}

fn cmd_init() -> Command {
    Command::new("init")
        .about("Create the lock table and seed unheld lock records")
        .arg(
            Arg::new("lock")
                .long("lock")
                .short('l')
                .value_name("NAME")
                .action(ArgAction::Append)
                .help("Lock to seed (repeatable) [default: configured lock and seed list]"),
        )
}

fn cmd_acquire() -> Command {
    Command::new("acquire")
        .about("Try to take a lock")
        .arg(arg_lock())
        .arg(arg_owner())
        .arg(arg_lease())
        .arg(
            Arg::new("wait-ms")
                .long("wait-ms")
                .short('w')
                .value_name("MS")
                .value_parser(value_parser!(u64))
                .default_value("0")
                .help("Keep retrying for this long while the lock is held"),
        )
}

fn cmd_release() -> Command {
    Command::new("release")
        .about("Give up a lock held by this owner")
        .arg(arg_lock())
        .arg(arg_owner())
}

fn cmd_status() -> Command {
    Command::new("status")
        .about("Show the stored record for a lock")
        .arg(arg_lock())
        .arg(
            Arg::new("json")
                .long("json")
                .action(ArgAction::SetTrue)
                .help("Print the record as JSON"),
        )
}

fn cmd_console() -> Command {
    Command::new("console")
        .about("Interactive loop for driving a lock by hand")
        .arg(arg_lock())
        .arg(arg_owner())
        .arg(arg_lease())
}

/// Optional flag that only some subcommands define.
fn flag<T: Clone + Send + Sync + 'static>(matches: &ArgMatches, id: &str) -> Option<T> {
    matches.try_get_one::<T>(id).ok().flatten().cloned()
}

/// Config layer made of the flags given on the command line.
pub fn overrides(matches: &ArgMatches) -> PartialConfig {
    let sub = matches.subcommand().map_or(matches, |(_, sub)| sub);
    let lock_name = match matches.subcommand_name() {
        Some("init") => None,
        _ => flag::<String>(sub, "lock"),
    };

    PartialConfig {
        store: PartialStoreConfig {
            database_url: flag(sub, "database-url"),
            ..PartialStoreConfig::default()
        },
        lock: PartialLockConfig {
            name: lock_name,
            lease_ms: flag(sub, "lease-ms"),
            owner: flag(sub, "owner"),
            seed: None,
        },
        client: PartialClientConfig {
            timeout_ms: flag(sub, "timeout-ms"),
            poll_interval_ms: None,
        },
    }
}

/// `--config`, wherever it was given.
pub fn config_path(matches: &ArgMatches) -> Option<PathBuf> {
    let sub = matches.subcommand().map_or(matches, |(_, sub)| sub);
    flag(sub, "config")
}

/// Number of `-v` flags.
pub fn verbosity(matches: &ArgMatches) -> u8 {
    let sub = matches.subcommand().map_or(matches, |(_, sub)| sub);
    flag(sub, "verbose").unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_consistent() {
        build_cli().debug_assert();
    }

    #[test]
    fn test_flags_become_overrides() {
        let matches = build_cli().get_matches_from([
            "lease-mutex",
            "--database-url",
            "sqlite::memory:",
            "acquire",
            "--lock",
            "reports",
            "--owner",
            "worker-1",
            "--lease-ms",
            "2500",
            "--timeout-ms",
            "300",
        ]);
        let layer = overrides(&matches);
        assert_eq!(layer.store.database_url.as_deref(), Some("sqlite::memory:"));
        assert_eq!(layer.lock.name.as_deref(), Some("reports"));
        assert_eq!(layer.lock.owner.as_deref(), Some("worker-1"));
        assert_eq!(layer.lock.lease_ms, Some(2500));
        assert_eq!(layer.client.timeout_ms, Some(300));
    }

    #[test]
    fn test_absent_flags_leave_layer_empty() {
        let matches = build_cli().get_matches_from(["lease-mutex", "status"]);
        assert_eq!(overrides(&matches), PartialConfig::default());
        assert_eq!(verbosity(&matches), 0);
        assert!(config_path(&matches).is_none());
    }

    #[test]
    fn test_init_locks_do_not_rename_configured_lock() {
        let matches =
            build_cli().get_matches_from(["lease-mutex", "init", "--lock", "a", "--lock", "b"]);
        assert!(overrides(&matches).lock.name.is_none());
    }

    #[test]
    fn test_verbosity_counts_after_subcommand() {
        let matches = build_cli().get_matches_from(["lease-mutex", "status", "-vv"]);
        assert_eq!(verbosity(&matches), 2);
    }

    #[test]
    fn test_zero_lease_rejected_by_parser() {
        let result =
            build_cli().try_get_matches_from(["lease-mutex", "acquire", "--lease-ms", "0"]);
        assert!(result.is_err());
    }
}
