use std::path::PathBuf;
use std::process::exit;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use jstats::config::{Config, NullPolicy, Profile};
use jstats::jsonpath::PathStyle;
use jstats::Output;

/// Collect statistics about the keys and values in json and json lines files.
///
/// Reads stdin when no inputs are given. Directories are scanned recursively.
#[derive(Debug, Parser)]
#[command(name = "jstats", version)]
struct Args {
  /// files or directories to scan
  inputs : Vec<PathBuf>,

  /// yaml file with defaults for any of the options below
  #[arg(long)]
  config : Option<PathBuf>,

  #[arg(long, value_enum)]
  profile : Option<Profile>,

  /// path segment convention, defaults per profile
  #[arg(long, value_enum)]
  style : Option<PathStyle>,

  /// label every path starts with
  #[arg(long)]
  root : Option<String>,

  /// ignore json null, or fail the run on it. Defaults per profile
  #[arg(long, value_enum)]
  nulls : Option<NullPolicy>,

  /// distinct values enumerated per path in a summary
  #[arg(long)]
  max_enum : Option<usize>,

  /// distinct values collected per path before the path is ignored
  #[arg(long)]
  path_cap : Option<usize>,

  /// scan threads, defaults to the number of cpus
  #[arg(long, short = 'j')]
  workers : Option<usize>,

  /// regex that file names in directories must match
  #[arg(long)]
  pattern : Option<String>,

  /// write here instead of stdout
  #[arg(long, short)]
  out : Option<PathBuf>,

  /// only list the paths
  #[arg(long)]
  paths : bool,

  /// more logging, repeat for more
  #[arg(short, long, action = clap::ArgAction::Count)]
  verbose : u8,
}

impl Args {
  /// Command line wins over the config file.
  fn config(&self) -> jstats::Result<Config> {
    let mut config = match &self.config {
      Some(path) => Config::load(path)?,
      None => Config::default(),
    };
    if let Some(profile) = self.profile { config.profile = profile }
    if self.style.is_some() { config.style = self.style }
    if self.root.is_some() { config.root = self.root.clone() }
    if self.nulls.is_some() { config.nulls = self.nulls }
    if self.max_enum.is_some() { config.max_enum = self.max_enum }
    if self.path_cap.is_some() { config.path_cap = self.path_cap }
    if self.workers.is_some() { config.workers = self.workers }
    if self.pattern.is_some() { config.pattern = self.pattern.clone() }
    Ok(config)
  }
}

fn init_logging(verbose : u8) {
  let default = match verbose {
    0 => "warn",
    1 => "info",
    _ => "debug",
  };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .init();
}

fn run(args : &Args) -> jstats::Result<()> {
  let config = args.config()?;
  let output = if args.paths { Output::Paths } else { Output::Rows };
  let lines = jstats::profile(&config, &args.inputs, output)?;

  // only touch the output once there is something complete to write
  match &args.out {
    Some(path) => {
      let file = std::fs::File::create(path).map_err(|source| jstats::Error::Io{ path: path.clone(), source })?;
      jstats::report::write_rows(&lines, &mut std::io::BufWriter::new(file))
    }
    None => jstats::report::write_rows(&lines, &mut std::io::stdout().lock()),
  }
}

fn main() {
  let args = Args::parse();
  init_logging(args.verbose);

  if let Err(err) = run(&args) {
    tracing::error!(%err, "run failed");
    eprintln!("jstats: {err}");
    exit(1)
  }
}
