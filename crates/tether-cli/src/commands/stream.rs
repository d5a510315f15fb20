//! Stream command implementation.

use anyhow::{Context, Result};
use clap::Args;
use futures_util::StreamExt;
use serde_json::Value;

use super::{ConnectArgs, parse_body};
use crate::output;

#[derive(Args, Debug)]
pub struct StreamArgs {
    /// Method to call (e.g. robot.v1.RobotService/StreamStatus)
    pub method: String,

    /// Request message as JSON (defaults to {})
    pub body: Option<String>,

    /// Stop after this many messages
    #[arg(long)]
    pub limit: Option<usize>,

    #[command(flatten)]
    pub connect: ConnectArgs,
}

pub async fn run(args: StreamArgs) -> Result<()> {
    let body = parse_body(args.body.as_deref())?;
    let transport = args.connect.connect().await?;

    let mut messages = transport
        .server_stream::<_, Value>(&args.method, &body)
        .await
        .with_context(|| format!("{} failed", args.method))?;

    output::note("Streaming. Press Ctrl+C to stop.");

    let mut received = 0;
    while args.limit.is_none_or(|limit| received < limit) {
        let Some(item) = messages.next().await else {
            break;
        };
        let message =
            item.with_context(|| format!("{} failed after {} messages", args.method, received))?;
        output::json(&message)?;
        received += 1;
    }

    output::note(&format!("{received} messages"));
    Ok(())
}
