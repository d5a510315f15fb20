//! Call command implementation.

use anyhow::{Context, Result};
use clap::Args;
use serde_json::Value;

use super::{ConnectArgs, parse_body};
use crate::output;

#[derive(Args, Debug)]
pub struct CallArgs {
    /// Method to call (e.g. robot.v1.RobotService/GetStatus)
    pub method: String,

    /// Request message as JSON (defaults to {})
    pub body: Option<String>,

    /// Print the response on one line
    #[arg(long)]
    pub compact: bool,

    #[command(flatten)]
    pub connect: ConnectArgs,
}

pub async fn run(args: CallArgs) -> Result<()> {
    let body = parse_body(args.body.as_deref())?;
    let transport = args.connect.connect().await?;

    let response: Value = transport
        .unary(&args.method, &body)
        .await
        .with_context(|| format!("{} failed", args.method))?;

    if args.compact {
        output::json(&response)
    } else {
        output::json_pretty(&response)
    }
}
