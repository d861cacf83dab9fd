mod prompt;

pub use prompt::PromptSelector;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use mscope_core::{
    annotate_line, annotate_rectangle_long_axis, apply, choose_calibration, draw_scale_bar,
    CalibrationRegistry, Error, ImageHost, ImageId, Outcome, Point, PolygonKind, PresetSelector,
    Roi, RoiError, Selection,
};
use mscope_host::Session;
use mscope_render::RasterCanvas;
use mscope_settings::{Settings, SettingsStore};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
#[command(name = "mscope")]
#[command(about = "Microscope calibration and measurement tools")]
pub struct Cli {
    /// Settings file to use instead of the per-user default.
    #[arg(long, global = true, value_name = "FILE")]
    settings: Option<PathBuf>,
    /// Log debug output to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List the configured calibrations.
    List,
    /// Choose a calibration, apply it to the last image given and save it.
    Calibrate {
        #[arg(value_name = "IMAGE", required = true)]
        images: Vec<PathBuf>,
        /// Calibration number (1-based); asks on stdin when omitted.
        #[arg(long)]
        index: Option<usize>,
        /// Apply the scale to all open images.
        #[arg(long)]
        all: bool,
        /// Draw a scale bar on the image and write it out.
        #[arg(long)]
        scale_bar: bool,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Draw a calibrated measurement line.
    DrawLine(DrawArgs),
    /// Draw the long axis of a rectangle.
    DrawRectangle(DrawArgs),
    /// Print where settings are read from.
    SettingsPath,
    /// Write the built-in settings to the settings file.
    InitSettings {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
    /// Print CLI version.
    Version,
}

#[derive(Debug, Args)]
struct DrawArgs {
    #[arg(value_name = "IMAGE")]
    image: PathBuf,
    /// Selection vertex as X,Y; repeat for each point.
    #[arg(long = "point", value_name = "X,Y", value_parser = parse_point)]
    points: Vec<Point>,
    /// Calibration number (1-based) to apply first; otherwise the saved one.
    #[arg(long)]
    calibration: Option<usize>,
    #[arg(long)]
    output: Option<PathBuf>,
}

pub fn run<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);
    init_logging(cli.verbose);

    let store = SettingsStore::discover(cli.settings).context("failed to locate settings")?;

    match cli.command {
        Commands::List => run_list(&store),
        Commands::Calibrate { images, index, all, scale_bar, output } => {
            run_calibrate(&store, &images, index, all, scale_bar, output.as_deref())
        }
        Commands::DrawLine(args) => run_draw(&store, &args, Mode::Line),
        Commands::DrawRectangle(args) => run_draw(&store, &args, Mode::Rectangle),
        Commands::SettingsPath => {
            println!("{}", store.path().display());
            if !store.path().exists() {
                eprintln!("file not present; built-in settings are in use");
            }
            Ok(())
        }
        Commands::InitSettings { force } => {
            store.init(force).context("failed to write settings")?;
            println!("{}", store.path().display());
            Ok(())
        }
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn init_logging(verbose: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    // already initialised when run more than once in a process
    let _ = builder.try_init();
}

fn load(store: &SettingsStore) -> Result<(Settings, CalibrationRegistry)> {
    let settings = store
        .load()
        .with_context(|| format!("failed to load settings from {}", store.path().display()))?;
    let registry = settings.registry().context("invalid calibrations in settings")?;
    Ok((settings, registry))
}

fn run_list(store: &SettingsStore) -> Result<()> {
    let (_, registry) = load(store)?;
    for (i, label) in registry.labels().iter().enumerate() {
        println!("{}. {label}", i + 1);
    }
    Ok(())
}

/// 1-based number from the command line to a registry index
fn registry_index(number: usize, registry: &CalibrationRegistry) -> Result<usize, Error> {
    number
        .checked_sub(1)
        .filter(|&index| index < registry.len())
        .ok_or(Error::InvalidSelection { index: number, len: registry.len() })
}

fn open_image(session: &mut Session, path: &Path) -> Result<ImageId> {
    session.open(path.to_path_buf()).with_context(|| format!("failed to open {}", path.display()))
}

fn run_calibrate(
    store: &SettingsStore,
    images: &[PathBuf],
    index: Option<usize>,
    all: bool,
    scale_bar: bool,
    output: Option<&Path>,
) -> Result<()> {
    let (settings, registry) = load(store)?;

    let mut session = Session::new();
    let mut last = None;
    for path in images {
        last = Some((open_image(&mut session, path)?, path));
    }
    let Some((current, current_path)) = last else {
        anyhow::bail!("no image given");
    };

    let footer = format!("Settings: {}", store.path().display());
    let outcome = match index {
        Some(number) => {
            let selection = Selection {
                index: registry_index(number, &registry)?,
                apply_globally: all,
                add_scale_bar: scale_bar,
            };
            choose_calibration(
                &mut session,
                &registry,
                &mut PresetSelector::new(selection),
                Some(&footer),
            )?
        }
        None => {
            let stdin = std::io::stdin();
            let mut selector = PromptSelector::new(stdin.lock(), std::io::stderr(), all, scale_bar);
            choose_calibration(&mut session, &registry, &mut selector, Some(&footer))?
        }
    };

    let Outcome::Applied { applied, scale_bar, .. } = outcome else {
        eprintln!("cancelled");
        return Ok(());
    };

    println!(
        "{}: {} {} per pixel",
        applied.entry.display_name, applied.calibration.pixel_width, applied.calibration.unit
    );
    for id in &applied.refreshed {
        println!("refreshed {}", session.image_info(*id)?.title);
        if let Some(record) = session.persist_calibration(*id)? {
            log::info!("calibration saved to {}", record.display());
        }
    }

    if scale_bar && session.scale_bar_requested(current)? {
        let calibration = session.calibration(current)?;
        let drawn = {
            let mut canvas = RasterCanvas::new(session.pixels_mut(current)?);
            draw_scale_bar(&mut canvas, &calibration, &settings.style)
        };
        match drawn {
            Some(bar) => println!("scale bar {}", bar.label),
            None => eprintln!("image too small for a scale bar"),
        }
        save(&session, current, current_path, output)?;
    }

    Ok(())
}

#[derive(Debug, Clone, Copy)]
enum Mode {
    Line,
    Rectangle,
}

/// Selection built from command-line points: two make a straight line
fn roi_from_points(points: &[Point], mode: Mode) -> Option<Roi> {
    match points {
        [] => None,
        [p1, p2] => Some(Roi::Line(mscope_core::Line::new(*p1, *p2))),
        _ => {
            let kind = match mode {
                Mode::Line => PolygonKind::Polygon,
                Mode::Rectangle => PolygonKind::Rectangle,
            };
            Some(Roi::Polygon { kind, vertices: points.to_vec() })
        }
    }
}

fn run_draw(store: &SettingsStore, args: &DrawArgs, mode: Mode) -> Result<()> {
    let (settings, registry) = load(store)?;

    let mut session = Session::new();
    let id = open_image(&mut session, &args.image)?;
    session.set_roi(id, roi_from_points(&args.points, mode))?;

    if let Some(number) = args.calibration {
        let source = registry
            .get(registry_index(number, &registry)?)
            .context("calibration disappeared from registry")?;
        apply(&mut session, id, source, false)?;
    }

    let roi = session.roi(id)?;
    let calibration = session.calibration(id)?;
    let label = {
        let mut canvas = RasterCanvas::new(session.pixels_mut(id)?);
        let drawn = match mode {
            Mode::Line => annotate_line(&mut canvas, roi.as_ref(), &calibration, &settings.style)
                .map(|m| m.label),
            Mode::Rectangle => annotate_rectangle_long_axis(
                &mut canvas,
                roi.as_ref(),
                &calibration,
                &settings.style,
            )
            .map(|m| m.label),
        };
        drawn.map_err(|err: RoiError| anyhow::anyhow!(err.user_message()))?
    };

    println!("{label}");
    save(&session, id, &args.image, args.output.as_deref())
}

fn save(session: &Session, id: ImageId, input: &Path, output: Option<&Path>) -> Result<()> {
    let output = output.map(ToOwned::to_owned).unwrap_or_else(|| default_output(input));
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    session
        .save(id, &output)
        .with_context(|| format!("failed to write image to {}", output.display()))?;
    println!("{}", output.display());
    Ok(())
}

fn default_output(file: &Path) -> PathBuf {
    let stem = file.file_stem().and_then(|name| name.to_str()).unwrap_or("image");
    let ext = file.extension().and_then(|ext| ext.to_str()).unwrap_or("png");

    file.with_file_name(format!("{stem}-annotated.{ext}"))
}

fn parse_point(value: &str) -> Result<Point, String> {
    let (x, y) = value.split_once(',').ok_or_else(|| format!("expected X,Y, got {value:?}"))?;
    let coord = |s: &str| s.trim().parse::<f64>().map_err(|err| format!("{s:?}: {err}"));
    Ok(Point::new(coord(x)?, coord(y)?))
}
