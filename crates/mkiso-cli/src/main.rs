use mkiso::{IsoBuilder, Options};

mod cli;

fn run(args: &cli::Args) -> mkiso::Result<()> {
  let mut builder = IsoBuilder::new(&args.input, &args.output, Options::default());
  builder.scan()?;

  let hide: Vec<&str> = args
    .hide
    .iter()
    .map(|name| name.trim())
    .filter(|name| !name.is_empty())
    .collect();
  builder.mark_hidden(hide);

  builder.build()
}

fn main() {
  pretty_env_logger::init();

  let args = cli::parse();
  if let Err(err) = run(&args) {
    eprintln!("mkiso: {err}");
    std::process::exit(1);
  }
  println!("wrote {}", args.output.display());
}
