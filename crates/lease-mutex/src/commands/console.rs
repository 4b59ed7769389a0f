//! Interactive console
//!
//! Reads one command per line and drives the configured lock with it:
//!
//! ```text
//! acquire [ms]   take the lock, optionally with a custom lease
//! release        give it up
//! status         show the stored record
//! owner <name>   act as a different owner from now on
//! help           list commands
//! quit           leave
//! ```
//!
//! Busy locks and store errors are reported and the loop continues. Ctrl-C
//! ends the session.

use std::{io::Write, time::Duration};

use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use crate::{commands::status::describe, Context};

const HELP: &str = "\
commands:
  acquire [ms]   take the lock (lease defaults to the configured one)
  release        give up the lock
  status         show the stored record
  owner <name>   switch the acting owner
  help           show this list
  quit           leave the console";

enum Step {
    Continue,
    Quit,
}

/// Run the console on stdin and stdout.
///
/// # Errors
///
/// Returns an error if stdin or stdout fail, or a call was cancelled
pub async fn run(ctx: &Context) -> Result<()> {
    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();
    session(ctx, stdin, &mut stdout).await
}

/// Run the console on arbitrary input and output.
///
/// # Errors
///
/// Returns an error if reading or writing fails, or a call was cancelled
pub async fn session<R, W>(ctx: &Context, input: R, out: &mut W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut owner = ctx.config.owner();
    let mut lines = input.lines();

    writeln!(
        out,
        "lock '{}' as {owner}; type 'help' for commands",
        ctx.config.lock.name
    )?;

    loop {
        write!(out, "> ")?;
        out.flush()?;

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = ctx.interrupt.cancelled() => None,
        };
        let Some(line) = line else {
            writeln!(out)?;
            return Ok(());
        };

        match execute(ctx, &mut owner, line.trim(), out).await? {
            Step::Continue => {}
            Step::Quit => return Ok(()),
        }
    }
}

async fn execute<W: Write>(
    ctx: &Context,
    owner: &mut String,
    line: &str,
    out: &mut W,
) -> Result<Step> {
    let lock = ctx.config.lock.name.as_str();
    let words: Vec<&str> = line.split_whitespace().collect();

    match words.as_slice() {
        [] => {}
        ["acquire", lease @ ..] if lease.len() <= 1 => {
            let lease = match lease.first().map(|ms| ms.parse::<u64>()) {
                None => ctx.config.lease(),
                Some(Ok(ms)) => Duration::from_millis(ms),
                Some(Err(e)) => {
                    writeln!(out, "invalid lease: {e}")?;
                    return Ok(Step::Continue);
                }
            };
            match ctx.mutex.acquire(owner, lock, lease, &ctx.call()).await {
                Ok(true) => writeln!(out, "acquired for {} ms", lease.as_millis())?,
                Ok(false) => writeln!(out, "busy")?,
                Err(e) => report(out, e)?,
            }
        }
        ["release"] => match ctx.mutex.release(owner, lock, &ctx.call()).await {
            Ok(true) => writeln!(out, "released")?,
            Ok(false) => writeln!(out, "not held by {owner}")?,
            Err(e) => report(out, e)?,
        },
        ["status"] => match ctx.mutex.inspect(lock, &ctx.call()).await {
            Ok(status) => writeln!(out, "{}", describe(&status))?,
            Err(e) => report(out, e)?,
        },
        ["owner", name] => {
            (*name).clone_into(owner);
            writeln!(out, "acting as {owner}")?;
        }
        ["help"] => writeln!(out, "{HELP}")?,
        ["quit" | "exit"] => return Ok(Step::Quit),
        _ => writeln!(out, "unknown command '{line}'; type 'help'")?,
    }
    Ok(Step::Continue)
}

/// Print a protocol error, ending the session only if Ctrl-C caused it.
fn report<W: Write>(out: &mut W, err: lease_mutex_core::Error) -> Result<()> {
    if matches!(
        err,
        lease_mutex_core::Error::Cancelled {
            reason: lease_mutex_core::CancelReason::Requested,
            ..
        }
    ) {
        return Err(err.into());
    }
    writeln!(out, "error: {err}")?;
    Ok(())
}
