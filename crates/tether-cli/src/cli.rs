//! CLI argument definitions.

use clap::{Parser, Subcommand};

use crate::commands::call::CallArgs;
use crate::commands::stream::StreamArgs;

/// Call authenticated Connect services from the command line.
#[derive(Parser, Debug)]
#[command(name = "tether")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Make one unary call and print the response
    Call(CallArgs),

    /// Make a server-streaming call and print each message
    Stream(StreamArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_stream_limit() {
        let cli = Cli::try_parse_from([
            "tether",
            "stream",
            "robot.v1.RobotService/StreamStatus",
            "--host",
            "localhost:8080",
            "--payload",
            "secret",
            "--limit",
            "3",
        ])
        .unwrap();

        let Commands::Stream(args) = cli.command else {
            panic!("expected the stream command");
        };
        assert_eq!(args.limit, Some(3));
        assert_eq!(args.body, None);
    }
}
