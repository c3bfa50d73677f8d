use std::{
    fs::File,
    io::{BufReader, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use ui_transition::{
    ByteBuffer, ByteWriter, TransitionInfo, decode_transition, decode_transition_list,
    encode_transition,
};

#[derive(Parser, Debug)]
#[command(name = "transition-dump", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode a binary transition block and print it as JSON.
    Decode(DecodeArgs),
    /// Encode JSON timelines back into the binary layout.
    Encode(EncodeArgs),
}

#[derive(Parser, Debug)]
struct DecodeArgs {
    /// Input binary block.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Package format version the block was written with.
    #[arg(long, default_value_t = 2)]
    format: u8,

    /// Byte offset of the block within the input.
    #[arg(long, default_value_t = 0)]
    offset: usize,

    /// The block holds one transition rather than a counted list.
    #[arg(long)]
    single: bool,

    /// Child ids in index order; items addressing index N get the Nth id.
    #[arg(long = "child")]
    children: Vec<String>,

    /// Output JSON path; stdout when omitted.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct EncodeArgs {
    /// Input JSON: an array of timelines, or one timeline with `--single`.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Write one transition rather than a counted list.
    #[arg(long)]
    single: bool,

    /// Child ids in index order, used to turn target ids back into indices.
    #[arg(long = "child")]
    children: Vec<String>,

    /// Output binary path.
    #[arg(long)]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Decode(args) => cmd_decode(args),
        Command::Encode(args) => cmd_encode(args),
    }
}

fn cmd_decode(args: DecodeArgs) -> anyhow::Result<()> {
    let bytes = std::fs::read(&args.in_path)
        .with_context(|| format!("read transition block '{}'", args.in_path.display()))?;
    if args.offset > bytes.len() {
        anyhow::bail!(
            "offset {} is past the end of '{}' ({} bytes)",
            args.offset,
            args.in_path.display(),
            bytes.len()
        );
    }

    let mut buffer = ByteBuffer::with_version(&bytes, args.format);
    buffer.set_position(args.offset);
    let children = args.children.as_slice();
    let json = if args.single {
        let info = decode_transition(&mut buffer, children);
        serde_json::to_string_pretty(&info).context("serialize transition")?
    } else {
        let infos = decode_transition_list(&mut buffer, children);
        serde_json::to_string_pretty(&infos).context("serialize transitions")?
    };

    match &args.out {
        Some(path) => {
            ensure_parent(path)?;
            std::fs::write(path, json).with_context(|| format!("write '{}'", path.display()))?;
            eprintln!("wrote {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{json}").context("write stdout")?;
        }
    }
    Ok(())
}

fn cmd_encode(args: EncodeArgs) -> anyhow::Result<()> {
    let f = File::open(&args.in_path)
        .with_context(|| format!("open timeline JSON '{}'", args.in_path.display()))?;
    let r = BufReader::new(f);
    let infos: Vec<TransitionInfo> = if args.single {
        let info: TransitionInfo =
            serde_json::from_reader(r).with_context(|| "parse timeline JSON")?;
        vec![info]
    } else {
        serde_json::from_reader(r).with_context(|| "parse timeline JSON")?
    };

    let children = &args.children;
    let target_index = |id: &str| -> Option<i16> {
        let i = children.iter().position(|c| c == id)?;
        i16::try_from(i).ok()
    };

    let mut w = ByteWriter::new();
    if args.single {
        for info in &infos {
            encode_transition(&mut w, info, &target_index);
        }
    } else {
        let count = i16::try_from(infos.len()).context("too many transitions for one block")?;
        w.write_i16(count);
        for info in &infos {
            let mut body = ByteWriter::new();
            encode_transition(&mut body, info, &target_index);
            if i16::try_from(body.len()).is_err() {
                anyhow::bail!("transition '{}' does not fit in one block", info.name());
            }
            w.write_block(body.as_bytes());
        }
    }

    ensure_parent(&args.out)?;
    std::fs::write(&args.out, w.as_bytes())
        .with_context(|| format!("write '{}'", args.out.display()))?;
    eprintln!("wrote {} ({} bytes)", args.out.display(), w.len());
    Ok(())
}

fn ensure_parent(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}
