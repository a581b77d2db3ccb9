//! vero-render - rasterize one character of a TrueType font to PNG or BMP

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use vero_type::{Font, RenderConfig, VeroTypeError, image::ExportError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Png,
    Bmp,
}

impl Format {
    fn extension(self) -> &'static str {
        match self {
            Format::Png => "png",
            Format::Bmp => "bmp",
        }
    }
}

/// Render a single glyph of a TrueType font to an image file
#[derive(Parser, Debug)]
#[command(name = "vero-render")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Font file (.ttf, .otf or .ttc)
    font: PathBuf,

    /// Character to render
    character: char,

    /// Em height in pixels
    #[arg(short, long, default_value_t = RenderConfig::DEFAULT_PIXEL_HEIGHT)]
    size: f32,

    /// Render a signed distance field instead of coverage
    #[arg(long)]
    sdf: bool,

    /// Distance field spread in pixels
    #[arg(long, default_value_t = 4)]
    spread: u32,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Png)]
    format: Format,

    /// Foreground color as RRGGBB
    #[arg(short, long, value_parser = parse_color, default_value = "FFFFFF")]
    color: [u8; 3],

    /// Face index inside a font collection
    #[arg(long, default_value_t = 0)]
    face: u32,

    /// Output path, defaults to glyph.<format>
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn render_config(&self) -> RenderConfig {
        let config = RenderConfig::default()
            .with_pixel_height(self.size)
            .with_color(self.color);

        if self.sdf { config.with_sdf(self.spread) } else { config }
    }
}

fn parse_color(value: &str) -> Result<[u8; 3], String> {
    let hex = value.trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return Err(format!("expected RRGGBB, got '{value}'"));
    }

    let channel = |i: usize| {
        u8::from_str_radix(&hex[i..i + 2], 16).map_err(|err| format!("invalid color '{value}': {err}"))
    };
    Ok([channel(0)?, channel(2)?, channel(4)?])
}

/// Initialize logging based on verbosity flag.
fn init_logger(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };

    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();
}

fn run(cli: &Cli) -> Result<PathBuf, VeroTypeError> {
    let data = std::fs::read(&cli.font)?;
    let font = Font::from_collection(data, cli.face)?;
    let image = font.render_char(cli.character, &cli.render_config())?;

    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("glyph.{}", cli.format.extension())));

    match cli.format {
        Format::Png => image.write_png(&output)?,
        Format::Bmp => image.write_bmp(&output)?,
    }

    Ok(output)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    match run(&cli) {
        Ok(output) => {
            println!("{}", output.display());
            ExitCode::SUCCESS
        }
        Err(VeroTypeError::ExportError(ExportError::EmptyImage { .. })) => {
            eprintln!("error: {:?} has no visible outline at this size", cli.character);
            ExitCode::FAILURE
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
