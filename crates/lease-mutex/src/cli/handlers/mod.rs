use anyhow::Result;
use clap::ArgMatches;
use lease_mutex_core::{config::load_config, Cancellation};

use crate::{
    cli::{config_path, overrides},
    commands::{acquire, console, init, release, status},
    Context,
};

/// Resolve configuration, open the store and run the chosen subcommand.
///
/// # Errors
///
/// Returns the command's error; the caller maps it to an exit code.
pub async fn dispatch(matches: &ArgMatches, interrupt: Cancellation) -> Result<()> {
    let config = load_config(config_path(matches).as_deref(), overrides(matches))?;
    let ctx = Context::open(config, interrupt).await?;

    match matches.subcommand() {
        Some(("init", sub_m)) => {
            let locks: Vec<String> = sub_m
                .get_many::<String>("lock")
                .map(|values| values.cloned().collect())
                .unwrap_or_default();
            init::run(&ctx, &locks).await
        }
        Some(("acquire", sub_m)) => {
            let wait_ms = sub_m.get_one::<u64>("wait-ms").copied().unwrap_or(0);
            acquire::run(&ctx, std::time::Duration::from_millis(wait_ms)).await
        }
        Some(("release", _)) => release::run(&ctx).await,
        Some(("status", sub_m)) => status::run(&ctx, sub_m.get_flag("json")).await,
        Some(("console", _)) => console::run(&ctx).await,
        _ => anyhow::bail!("Unknown command. Run 'lease-mutex --help' for usage."),
    }
}

/// Error message plus its cause when the cause adds information.
pub fn format_error(err: &anyhow::Error) -> String {
    let msg = err.to_string();
    if let Some(source) = err.source() {
        let source_msg = source.to_string();
        if !msg.contains(&source_msg) && !source_msg.is_empty() {
            return format!("{msg}\nCause: {source_msg}");
        }
    }
    msg
}

/// Process exit code for a failed command.
pub fn exit_code(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<lease_mutex_core::Error>()
        .map(lease_mutex_core::Error::exit_code)
        .or_else(|| err.downcast_ref::<crate::Error>().map(crate::Error::exit_code))
        .unwrap_or(1)
}
