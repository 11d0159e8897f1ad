use clap::{Args, Parser, Subcommand};
use log::{LevelFilter, warn};
use photo_sheet::source::exporter_for_path;
use photo_sheet::{
    Color, GuideMode, LayoutConfig, PaperSpec, PhotoEntry, PhotoSpec, RasterDecoder,
    RenderOptions, SheetConfig, SheetError, SheetJob, SourceImage,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "photo-sheet")]
#[command(about = "Pack photos onto a printable sheet and render it at print resolution")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log output (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the grid and capacity for a sheet as JSON
    Layout {
        #[command(flatten)]
        sheet: SheetArgs,

        /// Photos as PATH[:COUNT]; files are not read
        photos: Vec<String>,
    },

    /// Render a sheet to a PNG or JPEG file
    Render {
        #[command(flatten)]
        sheet: SheetArgs,

        /// Output file (.png, .jpg)
        #[arg(short, long)]
        output: PathBuf,

        /// Photos as PATH[:COUNT]
        #[arg(required = true)]
        photos: Vec<String>,
    },
}

#[derive(Args)]
struct SheetArgs {
    /// JSON sheet configuration; flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Paper preset (A3, A4, A5, A6, Letter, Legal) or WxH in mm
    #[arg(long)]
    paper: Option<PaperSpec>,

    /// Photo preset in cm (2x3, 3x4, 4x6, 2.5x3.5, 3.5x4.5) or WxHmm
    #[arg(long)]
    photo: Option<PhotoSpec>,

    /// Margin around the sheet, mm
    #[arg(long)]
    margin: Option<f64>,

    /// Spacing between photos, mm
    #[arg(long)]
    gutter: Option<f64>,

    /// Border around each photo, mm
    #[arg(long)]
    border: Option<f64>,

    /// Border color as #rrggbb
    #[arg(long)]
    border_color: Option<Color>,

    /// Cut guides: none, cutter or scissor
    #[arg(long)]
    guides: Option<GuideMode>,

    /// Output resolution
    #[arg(long)]
    dpi: Option<f64>,
}

impl SheetArgs {
    /// Merge the config file (if any) with command-line overrides
    fn resolve(&self) -> Result<(LayoutConfig, RenderOptions), SheetError> {
        let file = match &self.config {
            Some(path) => SheetConfig::load(path)?,
            None => SheetConfig::default(),
        };
        let mut layout = file.layout_config()?;
        if let Some(paper) = self.paper {
            layout.paper = paper;
        }
        if let Some(photo) = self.photo {
            layout.photo = photo;
        }
        if let Some(margin) = self.margin {
            layout.margin_mm = margin;
        }
        if let Some(gutter) = self.gutter {
            layout.gutter_mm = gutter;
        }
        if let Some(border) = self.border {
            layout.border_mm = border;
        }
        if let Some(color) = self.border_color {
            layout.border_color = color;
        }
        if let Some(guides) = self.guides {
            layout.guide_mode = guides;
        }
        let options = RenderOptions {
            dpi: self.dpi.unwrap_or(file.dpi),
            ..RenderOptions::default()
        };
        Ok((layout, options))
    }
}

/// Split "photo.jpg:3" into a path and copy count. A suffix that is not an
/// integer is treated as part of the path.
fn parse_photo_arg(arg: &str) -> (&str, i64) {
    match arg.rsplit_once(':') {
        Some((path, count)) if !path.is_empty() => match count.parse::<i64>() {
            Ok(n) => (path, n),
            Err(_) => (arg, 1),
        },
        _ => (arg, 1),
    }
}

fn exit_with(code: i32, message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", message);
    process::exit(code);
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    env_logger::Builder::new().filter_level(level).parse_default_env().init();

    match cli.command {
        Commands::Layout { sheet, photos } => {
            let (layout, options) = sheet.resolve().unwrap_or_else(|e| exit_with(1, e));
            let entries: Vec<PhotoEntry> = photos
                .iter()
                .map(|arg| {
                    let (path, count) = parse_photo_arg(arg);
                    PhotoEntry::new(Arc::new(SourceImage::unreadable(path, 0, 0)), count)
                })
                .collect();
            let job = SheetJob::new(&layout, &entries, options);
            match serde_json::to_string_pretty(&job.summary()) {
                Ok(json) => println!("{}", json),
                Err(e) => exit_with(1, e),
            }
        }

        Commands::Render {
            sheet,
            output,
            photos,
        } => {
            let (layout, options) = sheet.resolve().unwrap_or_else(|e| exit_with(1, e));
            let exporter = exporter_for_path(&output).unwrap_or_else(|| {
                exit_with(
                    1,
                    format!("unsupported output format '{}'", output.display()),
                )
            });

            let decoder = RasterDecoder;
            let mut entries = Vec::with_capacity(photos.len());
            for arg in &photos {
                let (path, count) = parse_photo_arg(arg);
                let image = decoder
                    .decode_file(Path::new(path))
                    .unwrap_or_else(|e| exit_with(2, e));
                entries.push(PhotoEntry::new(Arc::new(image), count));
            }

            let job = SheetJob::new(&layout, &entries, options);
            let summary = job.summary();
            if summary.would_truncate {
                warn!(
                    "{} photos requested, only {} fit ({} x {})",
                    summary.total_requested, summary.capacity, summary.cols, summary.rows
                );
            }

            let target = job.render().unwrap_or_else(|e| exit_with(3, e));
            let bytes = exporter.export(&target).unwrap_or_else(|e| exit_with(3, e));

            match fs::write(&output, &bytes) {
                Ok(_) => {
                    println!(
                        "Rendered {} photos ({}x{} px, {} dpi) to '{}'",
                        job.slots().len(),
                        target.width(),
                        target.height(),
                        target.dpi(),
                        output.display()
                    );
                }
                Err(e) => exit_with(4, format!("writing '{}': {}", output.display(), e)),
            }
        }
    }
}
