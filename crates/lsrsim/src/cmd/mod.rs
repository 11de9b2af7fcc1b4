use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod decode;
pub mod encode;
pub mod run;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a topology and print per-node results.
    Run(RunArgs),
    /// Encode a packet (or label frame) to wire text.
    Encode(EncodeArgs),
    /// Decode wire text back into fields.
    Decode(DecodeArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Run(args) => run::run(args, format),
        Command::Encode(args) => encode::run(args, format),
        Command::Decode(args) => decode::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Topology JSON file.
    pub topology: PathBuf,
    /// How long to run before stopping every node (e.g. 2s, 500ms).
    #[arg(long, short = 'd', default_value = "2s")]
    pub duration: String,
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Packet priority, 0-9.
    #[arg(long, short = 'p', default_value = "0", value_parser = clap::value_parser!(u8).range(0..=9))]
    pub priority: u8,
    /// Destination address, up to 5 alphanumeric characters.
    #[arg(long, short = 'D')]
    pub destination: String,
    /// Payload text.
    #[arg(long, default_value = "")]
    pub payload: String,
    /// Wrap the packet in a label frame with this label (0-99).
    #[arg(long, short = 'l')]
    pub label: Option<u32>,
    /// Prefix the link-layer tag.
    #[arg(long)]
    pub link: bool,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Wire text to decode.
    pub wire: String,
    /// Input is a label frame.
    #[arg(long, conflicts_with = "link")]
    pub label: bool,
    /// Input carries a link-layer tag.
    #[arg(long)]
    pub link: bool,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
