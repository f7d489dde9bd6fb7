mod args;
#[cfg(feature = "opencv")]
mod camera;
mod error;
mod output;
mod replay;

use args::{BoardArgs, CalibrateArgs, Cli, Command, GenerateArgs};
use camcal_charuco::{BoardRenderer, CharucoBoardDetector};
use camcal_core::{
    run_loop, CalibrationSession, Console, FrameSource, KeyMap, Reporter, TextReporter,
};
use camcal_solve::PlanarCalibrator;
use clap::Parser;
use error::{CliError, CliResult};
use output::JsonResultWriter;
use replay::{FrameDump, ImageDirSource, ScriptedConsole};

fn main() {
    if let Err(err) = try_main() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn try_main() -> CliResult<()> {
    let cli = Cli::parse();
    init_logging(&cli);

    match &cli.command {
        Command::Calibrate(args) => run_calibrate(&cli.board, args),
        Command::Generate(args) => run_generate(&cli.board, args),
    }
}

#[cfg(feature = "tracing")]
fn init_logging(cli: &Cli) {
    if cli.verbose == 0 {
        camcal_core::init_tracing(cli.log_json);
        return;
    }
    init_log_crate(cli.verbose);
}

#[cfg(not(feature = "tracing"))]
fn init_logging(cli: &Cli) {
    if cli.log_json {
        eprintln!("warning: --log-json needs the `tracing` feature; using plain logs");
    }
    init_log_crate(cli.verbose);
}

fn init_log_crate(verbose: u8) {
    if let Err(err) = camcal_core::init_with_level(camcal_core::level_from_verbosity(verbose)) {
        eprintln!("warning: logger already installed: {err}");
    }
}

fn run_calibrate(board_args: &BoardArgs, args: &CalibrateArgs) -> CliResult<()> {
    let board = board_args.resolve()?;
    log::info!(
        "board {}x{} squares, square {:.4} m, marker {:.4} m, {}",
        board.squares_x(),
        board.squares_y(),
        board.square_len(),
        board.marker_len(),
        board.dictionary()
    );

    let detector = CharucoBoardDetector::new(&board)?;
    let calibrator = PlanarCalibrator::new(board);

    let mut text = TextReporter::stdout();
    let mut json;
    let reporter: &mut dyn Reporter = match &args.output {
        Some(path) => {
            json = JsonResultWriter::new(TextReporter::stdout(), path);
            &mut json
        }
        None => &mut text,
    };
    let mut session = CalibrationSession::with_params(calibrator, reporter, args.session_params());

    let mut source = open_source(args)?;
    let mut window = open_console(args)?;
    let mut dump;
    let console: &mut dyn Console = match &args.save_frames {
        Some(dir) => {
            dump = FrameDump::new(&mut *window, dir)?;
            &mut dump
        }
        None => &mut *window,
    };

    let summary = run_loop(
        &mut session,
        &mut *source,
        &detector,
        console,
        &KeyMap::default(),
    )?;
    log::info!(
        "processed {} frames, kept {} samples",
        summary.frames,
        summary.samples
    );
    Ok(())
}

fn open_source(args: &CalibrateArgs) -> CliResult<Box<dyn FrameSource>> {
    if let Some(dir) = &args.frames {
        return Ok(Box::new(ImageDirSource::open(dir)?));
    }
    open_camera(args)
}

#[cfg(feature = "opencv")]
fn open_camera(args: &CalibrateArgs) -> CliResult<Box<dyn FrameSource>> {
    Ok(Box::new(camera::CameraSource::open(
        args.device,
        args.width,
        args.height,
    )?))
}

#[cfg(not(feature = "opencv"))]
fn open_camera(_args: &CalibrateArgs) -> CliResult<Box<dyn FrameSource>> {
    Err(CliError::Unsupported(
        "live capture needs the `opencv` feature; pass --frames <dir> to replay images",
    ))
}

fn open_console(args: &CalibrateArgs) -> CliResult<Box<dyn Console>> {
    if let Some(script) = &args.keys {
        return Ok(Box::new(ScriptedConsole::new(script)));
    }
    open_window()
}

#[cfg(feature = "opencv")]
fn open_window() -> CliResult<Box<dyn Console>> {
    Ok(Box::new(camera::Window::open(camera::WINDOW_TITLE)?))
}

#[cfg(not(feature = "opencv"))]
fn open_window() -> CliResult<Box<dyn Console>> {
    Err(CliError::Unsupported(
        "the preview window needs the `opencv` feature; pass --keys <script> to run headless",
    ))
}

fn run_generate(board_args: &BoardArgs, args: &GenerateArgs) -> CliResult<()> {
    let board = board_args.resolve()?;
    let img = BoardRenderer.generate_image(&board, args.px, args.py)?;
    img.save(&args.out).map_err(|source| CliError::Image {
        path: args.out.display().to_string(),
        source,
    })?;
    println!(
        "wrote {}x{} board to {}",
        img.width(),
        img.height(),
        args.out.display()
    );

    if args.show {
        show_board(&img)?;
    }
    Ok(())
}

#[cfg(feature = "opencv")]
fn show_board(img: &image::GrayImage) -> CliResult<()> {
    let mut window = camera::Window::open("ChArUco board")?;
    window.show_gray(img)?;
    window.wait_any_key()?;
    Ok(())
}

#[cfg(not(feature = "opencv"))]
fn show_board(_img: &image::GrayImage) -> CliResult<()> {
    Err(CliError::Unsupported("--show needs the `opencv` feature"))
}
