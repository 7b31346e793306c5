//! # Rollprint CLI
//!
//! Command-line interface for printing JSON receipt documents.
//!
//! ## Usage
//!
//! ```bash
//! # Preview a receipt as PNG
//! rollprint render receipt.json --png receipt.png
//!
//! # Preview exactly what the printer receives (thresholded, byte-aligned)
//! rollprint render receipt.json --raster-png printed.png
//!
//! # Write the raw ESC/POS job to a file
//! rollprint render receipt.json --output job.bin
//!
//! # Print on a Linux device file
//! rollprint print receipt.json --printer /dev/usb/lp0 --paper 80mm
//!
//! # Print on macOS over USB
//! rollprint print receipt.json --platform macos --usb 0416:5011
//!
//! # Take defaults from a config file, override the padding
//! rollprint print receipt.json --config printer.json --padding 12
//! ```

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};

use rollprint::{
    PrintError, Printer, PrinterConfig, document,
    printer::{PaperWidth, Platform, UsbDevice},
    protocol::raster,
    transport::Capture,
};

/// Rollprint - receipt layout and ESC/POS raster printing
#[derive(Parser, Debug)]
#[command(name = "rollprint")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log layout and transport details
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Lay out a receipt without printing it
    Render {
        /// JSON receipt document
        document: PathBuf,

        /// Save the composed receipt as PNG
        #[arg(long, value_name = "FILE")]
        png: Option<PathBuf>,

        /// Save the thresholded, byte-aligned bitmap as PNG
        #[arg(long, value_name = "FILE")]
        raster_png: Option<PathBuf>,

        /// Write the ESC/POS job bytes to a file
        #[arg(long, short, value_name = "FILE")]
        output: Option<PathBuf>,

        #[command(flatten)]
        printer: PrinterArgs,
    },

    /// Print a receipt
    Print {
        /// JSON receipt document
        document: PathBuf,

        #[command(flatten)]
        printer: PrinterArgs,
    },
}

#[derive(Args, Debug)]
struct PrinterArgs {
    /// JSON printer config file (flags below override it)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Device path (Linux) or printer queue name (Windows)
    #[arg(long)]
    printer: Option<String>,

    /// Paper width: 58mm or 80mm
    #[arg(long)]
    paper: Option<PaperWidth>,

    /// Default TrueType/OpenType font (built-in bitmap font when unset)
    #[arg(long, value_name = "FILE")]
    font: Option<PathBuf>,

    /// Horizontal padding in dots
    #[arg(long)]
    padding: Option<u32>,

    /// Platform: windows, linux or macos (detected when unset)
    #[arg(long)]
    platform: Option<Platform>,

    /// USB vendor and product id, hex, as VID:PID
    #[arg(long, value_name = "VID:PID", value_parser = parse_usb)]
    usb: Option<UsbDevice>,
}

impl PrinterArgs {
    fn to_config(&self) -> Result<PrinterConfig, PrintError> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => PrinterConfig::default(),
        };
        if let Some(printer) = &self.printer {
            config.printer_name = printer.clone();
        }
        if let Some(paper) = self.paper {
            config.paper_width = paper;
        }
        if let Some(font) = &self.font {
            config.default_font = Some(font.clone());
        }
        if let Some(padding) = self.padding {
            config.padding_x = padding;
        }
        if let Some(platform) = self.platform {
            config.platform = Some(platform);
        }
        if let Some(usb) = self.usb {
            config.usb = Some(usb);
        }
        Ok(config)
    }
}

fn load_config(path: &Path) -> Result<PrinterConfig, PrintError> {
    let json = std::fs::read_to_string(path)
        .map_err(|e| PrintError::Config(format!("Failed to read {}: {}", path.display(), e)))?;
    serde_json::from_str(&json)
        .map_err(|e| PrintError::Config(format!("{}: {}", path.display(), e)))
}

fn parse_usb(s: &str) -> Result<UsbDevice, String> {
    let (vid, pid) = s
        .split_once(':')
        .ok_or_else(|| format!("expected VID:PID, got '{}'", s))?;
    let parse = |hex: &str| {
        u16::from_str_radix(hex.trim_start_matches("0x"), 16)
            .map_err(|e| format!("invalid USB id '{}': {}", hex, e))
    };
    Ok(UsbDevice::new(parse(vid)?, parse(pid)?))
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

fn main() {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(command: Commands) -> Result<(), PrintError> {
    match command {
        Commands::Render {
            document,
            png,
            raster_png,
            output,
            printer,
        } => {
            let config = printer.to_config()?;
            let mut session = Printer::with_transport(config, Box::new(Capture::new()))?;
            apply_document(&mut session, &document)?;

            let canvas = session.render()?;
            println!(
                "Rendered {} ({}x{} dots)",
                document.display(),
                canvas.width(),
                canvas.height()
            );

            if let Some(path) = png {
                canvas.save_png(&path)?;
                println!("Saved to {}", path.display());
            }
            if let Some(path) = raster_png {
                raster::preview(&canvas).save_png(&path)?;
                println!("Saved to {}", path.display());
            }
            if let Some(path) = output {
                let job = raster::job(&canvas);
                std::fs::write(&path, &job)?;
                println!("Wrote {} bytes to {}", job.len(), path.display());
            }
        }

        Commands::Print { document, printer } => {
            let config = printer.to_config()?;
            let mut session = Printer::new(config)?;
            apply_document(&mut session, &document)?;

            println!("Printing {}...", document.display());
            session.print()?;
            println!("Printed successfully!");
        }
    }

    Ok(())
}

fn apply_document(session: &mut Printer, path: &Path) -> Result<(), PrintError> {
    let doc = document::load(path)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    doc.apply(session, base_dir)
}
