use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "mcm",
    about = "Inspect and edit NBT files, region files and world locks",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// World/region settings (TOML)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print a whole NBT file
    Dump(FileArgs),
    /// Print the tag at a slash-separated path
    Get(GetArgs),
    /// Overwrite a number or string at a path, keeping its type
    Set(SetArgs),
    /// Inspect or edit a region file
    Region(RegionArgs),
    /// Take a world's session lock
    Lock(LockArgs),
}

#[derive(Args)]
pub struct FileArgs {
    pub file: PathBuf,
    /// The file is raw NBT rather than gzip
    #[arg(long)]
    pub uncompressed: bool,
}

#[derive(Args)]
pub struct GetArgs {
    #[command(flatten)]
    pub file: FileArgs,
    /// e.g. `Data/Player/Pos/0`
    pub path: String,
}

#[derive(Args)]
pub struct SetArgs {
    #[command(flatten)]
    pub file: FileArgs,
    pub path: String,
    pub value: String,
}

#[derive(Args)]
pub struct RegionArgs {
    #[command(subcommand)]
    pub action: RegionAction,
}

#[derive(Subcommand)]
pub enum RegionAction {
    /// List occupied slots
    Info { file: PathBuf },
    /// Print the chunk in a slot
    Dump {
        file: PathBuf,
        #[arg(allow_negative_numbers = true)]
        x: i32,
        #[arg(allow_negative_numbers = true)]
        z: i32,
    },
    /// Empty a slot (its sectors stay in the file)
    Clear {
        file: PathBuf,
        #[arg(allow_negative_numbers = true)]
        x: i32,
        #[arg(allow_negative_numbers = true)]
        z: i32,
    },
}

#[derive(Args)]
pub struct LockArgs {
    /// World directory or level.dat
    pub world: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_dump() {
        let cli = Cli::try_parse_from(["mcm", "dump", "level.dat"]).unwrap();
        if let Command::Dump(args) = cli.command {
            assert_eq!(args.file, PathBuf::from("level.dat"));
            assert!(!args.uncompressed);
        } else {
            panic!("wrong command");
        }
        assert_eq!(cli.format, OutputFormat::Text);
    }

    #[test]
    fn parse_get_uncompressed_json() {
        let cli = Cli::try_parse_from([
            "mcm", "--format", "json", "get", "--uncompressed", "a.nbt", "Data/Time",
        ])
        .unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        if let Command::Get(args) = cli.command {
            assert!(args.file.uncompressed);
            assert_eq!(args.path, "Data/Time");
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_set() {
        let cli = Cli::try_parse_from(["mcm", "set", "level.dat", "Data/Time", "6000", "-v"]).unwrap();
        assert!(cli.verbose);
        if let Command::Set(args) = cli.command {
            assert_eq!(args.value, "6000");
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_region_negative_coords() {
        let cli = Cli::try_parse_from(["mcm", "region", "dump", "r.-1.0.mca", "-3", "-32"]).unwrap();
        match cli.command {
            Command::Region(RegionArgs {
                action: RegionAction::Dump { x, z, .. },
            }) => assert_eq!((x, z), (-3, -32)),
            _ => panic!("wrong command"),
        }
    }

    #[test]
    fn parse_region_clear() {
        let cli = Cli::try_parse_from(["mcm", "region", "clear", "r.0.0.mca", "4", "5"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Region(RegionArgs {
                action: RegionAction::Clear { x: 4, z: 5, .. }
            })
        ));
    }

    #[test]
    fn parse_lock_with_config() {
        let cli = Cli::try_parse_from(["mcm", "lock", "saves/world", "--config", "mcm.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("mcm.toml")));
        assert!(matches!(cli.command, Command::Lock(_)));
    }

    #[test]
    fn missing_args_rejected() {
        assert!(Cli::try_parse_from(["mcm", "get", "file.dat"]).is_err());
        assert!(Cli::try_parse_from(["mcm", "region", "dump", "r.mca", "1"]).is_err());
    }
}
