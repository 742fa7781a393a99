use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use tracing::{debug, info};

use ebml_scan::{value, ByteSource, Children, ElementHeader, ReadLimits};
use mkv_tags::{
    ids::{self, DataType},
    SimpleTag, TagCollection, TagValue,
};

/// Strings longer than this are not printed in tree dumps.
const MAX_DUMPED_STRING: u64 = 256;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input Matroska or WebM file
    input: std::path::PathBuf,

    /// Print the element tree instead of the tags
    #[arg(long)]
    dump: bool,

    /// Deepest nesting level printed with `--dump` (1 to 64)
    #[arg(long, default_value_t = 8, value_parser = clap::value_parser!(u8).range(1..=64))]
    max_depth: u8,

    /// Largest string or binary value read into memory, in bytes
    #[arg(long, env = "MKV_TAGS_MAX_PAYLOAD_SIZE", default_value_t = ReadLimits::default().max_payload_size)]
    max_payload_size: u64,
}

/// Log to stderr, filtered by `RUST_LOG` (default "warn").
fn init_logging() -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_line_number(true)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))?;
    Ok(())
}

fn write_simple_tag<W: Write>(out: &mut W, st: &SimpleTag, depth: usize) -> Result<()> {
    let value = match &st.value {
        Some(TagValue::String(s)) => s.clone(),
        Some(TagValue::Binary(b)) => format!("<{} bytes>", b.len()),
        None => String::new(),
    };
    let default = if st.default { "" } else { " (not default)" };
    writeln!(
        out,
        "{:indent$}{} [{}]{default}: {value}",
        "",
        st.name,
        st.language,
        indent = 2 + depth * 2
    )?;
    for child in st.children.iter() {
        write_simple_tag(out, child, depth + 1)?;
    }
    Ok(())
}

fn write_tags<W: Write>(out: &mut W, tags: &TagCollection) -> Result<()> {
    for tag in tags.tags() {
        let targets = &tag.targets;
        match &targets.target_type {
            Some(name) => writeln!(out, "target {} ({name})", targets.type_value)?,
            None => writeln!(out, "target {}", targets.type_value)?,
        }
        for uid in targets.track_uids.iter() {
            writeln!(out, "  track uid {uid}")?;
        }
        for st in tag.simple_tags.iter() {
            write_simple_tag(out, st, 0)?;
        }
    }
    Ok(())
}

fn format_value<S: ByteSource + ?Sized>(
    src: &mut S,
    data_type: DataType,
    size: u64,
    limits: &ReadLimits,
) -> String {
    let value = match data_type {
        DataType::Unsigned => value::read_unsigned(src, size).map(|v| v.to_string()),
        DataType::Signed => value::read_signed(src, size).map(|v| v.to_string()),
        DataType::Float => value::read_float(src, size).map(|v| v.to_string()),
        DataType::Date => value::read_date(src, size).map(|v| v.to_rfc3339()),
        DataType::String | DataType::Utf8 if size <= MAX_DUMPED_STRING => {
            value::read_string(src, size, limits).map(|v| format!("{v:?}"))
        }
        DataType::String | DataType::Utf8 | DataType::Binary | DataType::Master => {
            Ok(format!("<{size} bytes>"))
        }
    };
    value.unwrap_or_else(|e| format!("<{e}>"))
}

/// Print every element between the current position and `end`, descending
/// into master elements up to `max_depth`.
fn dump_tree<S: ByteSource + ?Sized, W: Write>(
    src: &mut S,
    out: &mut W,
    end: u64,
    depth: usize,
    max_depth: usize,
    limits: &ReadLimits,
) -> Result<()> {
    let mut children = Children::<ElementHeader>::new(end);
    while let Some(header) = children.next_child(src) {
        let name = ids::name(header.id).unwrap_or("Unknown");
        let size = header
            .size
            .known()
            .map_or_else(|| "unknown".to_string(), |size| size.to_string());
        write!(
            out,
            "{:indent$}+ {name} ({:#x}) at {} size {size}",
            "",
            header.id,
            header.position,
            indent = depth * 2
        )?;
        if ids::is_master(header.id) {
            writeln!(out)?;
            if depth + 1 < max_depth {
                dump_tree(
                    src,
                    out,
                    header.data_end(children.end()),
                    depth + 1,
                    max_depth,
                    limits,
                )?;
            }
        } else if let Some(data_type) = ids::data_type(header.id) {
            let size = header.data_size(children.end());
            writeln!(out, ": {}", format_value(src, data_type, size, limits))?;
        } else {
            writeln!(out)?;
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    init_logging()?;
    let cli = Cli::parse();
    debug!("{cli:?}");

    let limits = ReadLimits {
        max_payload_size: cli.max_payload_size,
    };
    let fd = std::fs::File::open(&cli.input)
        .with_context(|| format!("opening {}", cli.input.display()))?;
    let mut rdr = std::io::BufReader::new(fd);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    if cli.dump {
        return dump_tree(
            &mut rdr,
            &mut out,
            u64::MAX,
            0,
            cli.max_depth.into(),
            &limits,
        );
    }

    match mkv_tags::read_tags_with_limits(&mut rdr, &limits)
        .with_context(|| format!("reading tags from {}", cli.input.display()))?
    {
        Some(tags) => write_tags(&mut out, &tags)?,
        None => info!("{} has no tags", cli.input.display()),
    }
    Ok(())
}
