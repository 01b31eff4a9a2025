use clap::Parser;
use log::info;
use pal_thumbnailer::{Palette, Result, SwatchImageEncoder};
use std::fs::{self, File};
use std::io::{self, BufReader, Write};
use std::path::PathBuf;
use std::process;

#[derive(Parser, Debug)]
#[command(
    name = "pal-thumbnailer",
    version,
    about = "Render a JASC-PAL palette as a PNG swatch thumbnail"
)]
struct Cli {
    /// Width and height of the thumbnail in pixels
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
    size: u32,
    /// Palette file to read (default: stdin)
    #[arg(short, long)]
    input: Option<PathBuf>,
    /// PNG file to write (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() {
    env_logger::init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // --help and --version are not failures
            let code = if err.use_stderr() { 1 } else { 0 };
            let _ = err.print();
            process::exit(code);
        }
    };

    if let Err(e) = run(&cli) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let palette = match &cli.input {
        Some(path) => {
            info!("reading palette from {}", path.display());
            Palette::from_jasc_reader(BufReader::new(File::open(path)?))?
        }
        None => Palette::from_jasc_reader(io::stdin().lock())?,
    };

    let png = SwatchImageEncoder::new(&palette).with_dimension(cli.size).encode()?;

    match &cli.output {
        Some(path) => {
            info!("writing {} bytes to {}", png.len(), path.display());
            fs::write(path, &png)?;
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(&png)?;
            stdout.flush()?;
        }
    }
    Ok(())
}
