mod playground;
mod renderer;

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result, bail};
use slidesync_core::DeviceProfile;
use tracing_subscriber::EnvFilter;

use crate::playground::{Playground, TerminalHost, markup};

const USAGE: &str = "\
Usage: slidesync [options.json] [--slides N] [--constrained] [--fail-engine] [--log FILE]

  options.json   data-options blob for the carousel (defaults if omitted)
  --slides N     number of slides (default 3)
  --constrained  classify the device as a low-end phone
  --fail-engine  make content track construction fail
  --log FILE     write diagnostics to FILE (filter with RUST_LOG)";

struct Args {
    options: Option<PathBuf>,
    slides: usize,
    constrained: bool,
    fail_engine: bool,
    log: Option<PathBuf>,
}

fn parse_args() -> Result<Args> {
    let mut args = Args {
        options: None,
        slides: 3,
        constrained: false,
        fail_engine: false,
        log: None,
    };
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--slides" => {
                args.slides = it
                    .next()
                    .context("--slides needs a value")?
                    .parse()
                    .context("--slides must be a number")?;
            }
            "--constrained" => args.constrained = true,
            "--fail-engine" => args.fail_engine = true,
            "--log" => args.log = Some(it.next().context("--log needs a path")?.into()),
            "-h" | "--help" => bail!("{USAGE}"),
            flag if flag.starts_with('-') => bail!("unknown flag {flag}\n\n{USAGE}"),
            path => args.options = Some(PathBuf::from(path)),
        }
    }
    Ok(args)
}

/// Diagnostics go to a file; the terminal belongs to the UI.
fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("slidesync_core=debug,slidesync_tui=debug"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let args = parse_args()?;
    if let Some(path) = &args.log {
        init_logging(path)?;
    }

    let options = args
        .options
        .as_ref()
        .map(|path| {
            std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
        })
        .transpose()?;

    let (cols, _) = crossterm::terminal::size()?;
    let width_px = renderer::page_width(cols);
    // The terminal is narrow for a page; classify as a desktop unless asked.
    let device = if args.constrained {
        DeviceProfile {
            viewport_width: 390.0,
            hardware_concurrency: Some(2),
            ..DeviceProfile::default()
        }
    } else {
        DeviceProfile::default()
    };
    let host = TerminalHost {
        width_px,
        overflow_px: 0.0,
        fail_content: args.fail_engine,
    };

    let mut playground = Playground::new(markup(options, args.slides), &device, host, 0)?;
    renderer::run(&mut playground)
}
