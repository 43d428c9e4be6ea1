use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "mkiso", version, about = "Build an ISO 9660 + Joliet image from a directory tree")]
pub struct Args {
  /// Source directory to image
  #[arg(short = 'i', value_name = "DIR")]
  pub input: PathBuf,

  /// Output image path
  #[arg(short = 'o', value_name = "PATH", default_value = "output.iso")]
  pub output: PathBuf,

  /// Comma-separated file names to mark hidden
  #[arg(short = 'H', value_name = "NAMES", value_delimiter = ',')]
  pub hide: Vec<String>,
}

pub fn parse() -> Args {
  Args::parse()
}
