//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "dolbones")]
#[command(about = "Inspect Melee fighter skeletons in a running Slippi Dolphin")]
pub struct Args {
    /// TOML settings file
    #[arg(short, long, global = true, default_value = "dolbones.toml", env = "DOLBONES_CONFIG")]
    pub config: PathBuf,

    /// Attach to this process instead of searching by name
    #[arg(long, global = true)]
    pub pid: Option<u32>,

    /// Log reads and pointer walks
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show the fighter in a player slot and its bone table
    Fighter {
        /// Player slot (0-5); defaults to the configured slot
        #[arg(short, long)]
        slot: Option<u32>,
        #[arg(long)]
        json: bool,
    },

    /// Walk a fighter's joint tree
    Skeleton {
        #[arg(short, long)]
        slot: Option<u32>,
        #[arg(long)]
        max_nodes: Option<usize>,
        #[arg(long)]
        max_depth: Option<usize>,
        #[arg(long)]
        json: bool,
    },

    /// Decode one joint object
    Jobj {
        /// Guest address (hex)
        address: String,
        #[arg(long)]
        json: bool,
    },

    /// Read and unpack a value
    Read {
        /// Guest address (hex)
        address: String,
        /// Big-endian struct layout, e.g. ">IIB7x"
        #[arg(default_value = ">I")]
        layout: String,
        /// Read a float array of this shape instead, e.g. "3,4"
        #[arg(long, value_delimiter = ',', conflicts_with = "layout")]
        floats: Option<Vec<usize>>,
    },

    /// Dump raw guest memory
    Hexdump {
        /// Guest address (hex)
        address: String,
        /// Number of bytes (hex or decimal)
        #[arg(short = 'n', long, default_value = "0x100", value_parser = parse_size)]
        size: usize,
    },

    /// Print debug-draw commands for a fighter's skeleton as JSON
    Draw {
        #[arg(short, long)]
        slot: Option<u32>,
    },

    /// Compare live joints against an emulator bone-transform log
    Validate {
        log: PathBuf,
        #[arg(short, long)]
        slot: Option<u32>,
    },

    /// List the records of a replay file
    Replay {
        file: PathBuf,
        /// Stop after this many records
        #[arg(long)]
        head: Option<usize>,
        #[arg(long)]
        json: bool,
    },
}

fn parse_size(s: &str) -> Result<usize, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => usize::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid size '{}': {}", s, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_args_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("0x40"), Ok(0x40));
        assert_eq!(parse_size("64"), Ok(64));
        assert!(parse_size("0xZZ").is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = Args::try_parse_from(["dolbones", "fighter", "--pid", "42", "-vv"]).unwrap();
        assert_eq!(args.pid, Some(42));
        assert_eq!(args.verbose, 2);
        assert!(matches!(args.command, Command::Fighter { slot: None, json: false }));
    }

    #[test]
    fn test_read_floats() {
        let args = Args::try_parse_from(["dolbones", "read", "80453080", "--floats", "3,4"]).unwrap();
        match args.command {
            Command::Read { floats, .. } => assert_eq!(floats, Some(vec![3, 4])),
            _ => panic!("expected read"),
        }
    }
}
