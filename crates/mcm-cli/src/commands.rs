use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use mcm_nbt::{codec, NbtMapped, Tag};
use mcm_region::{FileRegion, Region};
use mcm_world::{World, WorldConfig};

use crate::cli::*;
use crate::path;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => WorldConfig::load(path)?,
        None => WorldConfig::default(),
    };
    match cli.command {
        Command::Dump(args) => cmd_dump(&args, cli.format),
        Command::Get(args) => cmd_get(&args, cli.format),
        Command::Set(args) => cmd_set(&args),
        Command::Region(args) => cmd_region(args.action, &config, cli.format),
        Command::Lock(args) => cmd_lock(&args, config, cli.format),
    }
}

fn read_file(args: &FileArgs) -> anyhow::Result<Tag> {
    let file = File::open(&args.file)
        .with_context(|| format!("cannot open {}", args.file.display()))?;
    let reader = BufReader::new(file);
    let tag = if args.uncompressed {
        codec::decode(reader)
    } else {
        codec::decode_compressed(reader)
    };
    tag.with_context(|| format!("cannot decode {}", args.file.display()))
}

fn write_file(args: &FileArgs, tag: &Tag) -> anyhow::Result<()> {
    let mut out = BufWriter::new(File::create(&args.file)?);
    if args.uncompressed {
        codec::encode(tag, &mut out)?;
    } else {
        codec::encode_compressed(tag, &mut out)?;
    }
    out.flush()?;
    Ok(())
}

fn print_tag(tag: &Tag, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => println!("{tag}"),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&path::to_json(tag.value()))?),
    }
    Ok(())
}

fn cmd_dump(args: &FileArgs, format: OutputFormat) -> anyhow::Result<()> {
    let tag = read_file(args)?;
    print_tag(&tag, format)
}

fn cmd_get(args: &GetArgs, format: OutputFormat) -> anyhow::Result<()> {
    let tag = read_file(&args.file)?;
    let value = path::lookup(tag.value(), &args.path)?;
    match format {
        OutputFormat::Text => println!("{value}"),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&path::to_json(value))?),
    }
    Ok(())
}

fn cmd_set(args: &SetArgs) -> anyhow::Result<()> {
    let mut tag = read_file(&args.file)?;
    let previous = path::assign(tag.value_mut(), &args.path, &args.value)?;
    write_file(&args.file, &tag)?;
    println!(
        "{} {}: {} -> {}",
        "✓".green().bold(),
        args.path.bold(),
        previous.to_string().dimmed(),
        args.value.yellow()
    );
    Ok(())
}

fn cmd_region(action: RegionAction, config: &WorldConfig, format: OutputFormat) -> anyhow::Result<()> {
    match action {
        RegionAction::Info { file } => region_info(&file, config, format),
        RegionAction::Dump { file, x, z } => {
            let region = open_region(&file, config)?;
            match region.get_chunk(x, z)? {
                Some(chunk) => print_tag(&chunk.to_nbt(chunk.name())?, format),
                None => {
                    match format {
                        OutputFormat::Text => println!("No chunk at ({x}, {z})."),
                        OutputFormat::Json => println!("null"),
                    }
                    Ok(())
                }
            }
        }
        RegionAction::Clear { file, x, z } => {
            let region = open_region(&file, config)?;
            region.set_chunk(x, z, None)?;
            println!("{} Cleared chunk ({x}, {z}) in {}", "✓".green().bold(), file.display());
            Ok(())
        }
    }
}

fn open_region(file: &Path, config: &WorldConfig) -> anyhow::Result<FileRegion> {
    anyhow::ensure!(file.is_file(), "no region file at {}", file.display());
    Ok(FileRegion::open_with(file, config.region.clone())?)
}

fn region_info(file: &Path, config: &WorldConfig, format: OutputFormat) -> anyhow::Result<()> {
    let region = open_region(file, config)?;
    let slots = region.occupied()?;
    match format {
        OutputFormat::Text => {
            println!(
                "{} ({} bytes, {} chunks)",
                file.display().to_string().bold(),
                region.file_len()?,
                slots.len()
            );
            for slot in &slots {
                println!(
                    "  {:>4} ({:>2}, {:>2})  sector {:>5} x{:<3} timestamp {}",
                    slot.index.to_string().cyan(),
                    slot.x,
                    slot.z,
                    slot.location.offset,
                    slot.location.sectors,
                    slot.timestamp
                );
            }
        }
        OutputFormat::Json => {
            let entries: Vec<_> = slots
                .iter()
                .map(|s| {
                    serde_json::json!({
                        "index": s.index,
                        "x": s.x,
                        "z": s.z,
                        "offset": s.location.offset,
                        "sectors": s.location.sectors,
                        "timestamp": s.timestamp,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
    }
    Ok(())
}

fn cmd_lock(args: &LockArgs, config: WorldConfig, format: OutputFormat) -> anyhow::Result<()> {
    let world = World::open_with(&args.world, config)?;
    let lock = world.lock()?;
    match format {
        OutputFormat::Text => println!(
            "{} Locked {} ({})",
            "✓".green().bold(),
            world.dir().display().to_string().bold(),
            lock.timestamp().to_string().yellow()
        ),
        OutputFormat::Json => println!(
            "{}",
            serde_json::json!({ "world": world.dir(), "timestamp": lock.timestamp() })
        ),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcm_nbt::{Compound, Value};
    use mcm_region::Chunk;
    use std::path::PathBuf;

    fn level_file(dir: &Path, uncompressed: bool) -> FileArgs {
        let mut data = Compound::new();
        data.insert("Time", 100i64).unwrap();
        let mut root = Compound::new();
        root.insert("Data", data).unwrap();
        let args = FileArgs {
            file: dir.join("level.dat"),
            uncompressed,
        };
        write_file(&args, &Tag::named("", root)).unwrap();
        args
    }

    #[test]
    fn set_rewrites_file_in_same_encoding() {
        let dir = tempfile::tempdir().unwrap();
        for uncompressed in [false, true] {
            let file = level_file(dir.path(), uncompressed);
            let args = SetArgs {
                file: FileArgs {
                    file: file.file.clone(),
                    uncompressed,
                },
                path: "Data/Time".into(),
                value: "6000".into(),
            };
            cmd_set(&args).unwrap();
            let tag = read_file(&file).unwrap();
            assert_eq!(
                path::lookup(tag.value(), "Data/Time").unwrap(),
                &Value::Long(6000)
            );
        }
    }

    #[test]
    fn wrong_encoding_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let file = level_file(dir.path(), true);
        let gz = FileArgs {
            file: file.file.clone(),
            uncompressed: false,
        };
        assert!(read_file(&gz).is_err());
    }

    #[test]
    fn region_clear_empties_slot() {
        let dir = tempfile::tempdir().unwrap();
        let file: PathBuf = dir.path().join("r.0.0.mca");
        let region = FileRegion::open(&file).unwrap();
        let mut data = Compound::new();
        data.insert("x", 1i32).unwrap();
        region.set_chunk(2, 3, Some(&Chunk::new(data))).unwrap();

        let config = WorldConfig::default();
        cmd_region(
            RegionAction::Clear {
                file: file.clone(),
                x: 2,
                z: 3,
            },
            &config,
            OutputFormat::Text,
        )
        .unwrap();
        assert!(!region.chunk_exists(2, 3).unwrap());
    }

    #[test]
    fn region_commands_need_an_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("r.9.9.mca");
        let err = region_info(&missing, &WorldConfig::default(), OutputFormat::Json).unwrap_err();
        assert!(err.to_string().contains("no region file"));
        assert!(!missing.exists());
    }

    #[test]
    fn lock_writes_session_file() {
        let dir = tempfile::tempdir().unwrap();
        let args = LockArgs {
            world: dir.path().to_path_buf(),
        };
        cmd_lock(&args, WorldConfig::default(), OutputFormat::Json).unwrap();
        assert!(dir.path().join("session.lock").is_file());
    }
}
