use camcal_core::{BoardConfig, ConfigError, SessionParams, DEFAULT_DICTIONARY, INCH};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "camcal")]
#[command(about = "ChArUco camera calibration assistant")]
#[command(version)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Emit logs as JSON lines (requires the `tracing` feature).
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(flatten)]
    pub board: BoardArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Detect the board in a live or replayed feed and calibrate on demand.
    ///
    /// Keys: a/s capture the next frame, c calibrate, q/x quit.
    Calibrate(CalibrateArgs),

    /// Write a printable board image.
    Generate(GenerateArgs),
}

/// Board geometry. A `--board` file wins over the individual flags.
#[derive(Debug, Clone, Args)]
pub struct BoardArgs {
    /// JSON board configuration.
    #[arg(long, global = true)]
    pub board: Option<PathBuf>,

    /// Squares along x.
    #[arg(long, global = true, default_value_t = 8)]
    pub squares_x: u32,

    /// Squares along y.
    #[arg(long, global = true, default_value_t = 6)]
    pub squares_y: u32,

    /// Square side in meters.
    #[arg(long, global = true, default_value_t = 1.25 * INCH)]
    pub square_len: f64,

    /// Marker side in meters.
    #[arg(long, global = true, default_value_t = INCH)]
    pub marker_len: f64,

    /// Marker dictionary name.
    #[arg(long, global = true, default_value = DEFAULT_DICTIONARY)]
    pub dictionary: String,
}

impl BoardArgs {
    pub fn resolve(&self) -> Result<BoardConfig, ConfigError> {
        match &self.board {
            Some(path) => BoardConfig::load_json(path),
            None => BoardConfig::new(
                self.squares_x,
                self.squares_y,
                self.square_len,
                self.marker_len,
                self.dictionary.clone(),
            ),
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct CalibrateArgs {
    /// Camera index (OpenCV backend).
    #[arg(long, default_value_t = 0)]
    pub device: i32,

    /// Requested capture width (OpenCV backend).
    #[arg(long)]
    pub width: Option<u32>,

    /// Requested capture height (OpenCV backend).
    #[arg(long)]
    pub height: Option<u32>,

    /// Replay images from this directory (cycled) instead of a camera.
    #[arg(long)]
    pub frames: Option<PathBuf>,

    /// Scripted keys, one per frame: `.` is no key, whitespace is ignored,
    /// an exhausted script quits. Replaces the preview window.
    #[arg(long)]
    pub keys: Option<String>,

    /// Save every annotated frame as PNG into this directory.
    #[arg(long)]
    pub save_frames: Option<PathBuf>,

    /// Also write each successful calibration as JSON.
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Markers an armed frame must show to be kept.
    #[arg(long, default_value_t = 4)]
    pub min_markers: usize,

    /// Samples needed before calibrating.
    #[arg(long, default_value_t = 5)]
    pub min_samples: usize,
}

impl CalibrateArgs {
    pub fn session_params(&self) -> SessionParams {
        SessionParams {
            min_markers: self.min_markers,
            min_samples: self.min_samples,
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct GenerateArgs {
    /// Output image path.
    #[arg(long, default_value = "ChArUco_img.png")]
    pub out: PathBuf,

    /// Image width in pixels; 0 = 100 px per square.
    #[arg(long, default_value_t = 0)]
    pub px: u32,

    /// Image height in pixels; 0 = 100 px per square.
    #[arg(long, default_value_t = 0)]
    pub py: u32,

    /// Show the image until a key is pressed (OpenCV backend).
    #[arg(long)]
    pub show: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_match_reference_board() {
        let cli = Cli::try_parse_from(["camcal", "generate"]).expect("parse");
        let board = cli.board.resolve().expect("board");
        assert_eq!(board, BoardConfig::default());
        match cli.command {
            Command::Generate(g) => {
                assert_eq!(g.out, PathBuf::from("ChArUco_img.png"));
                assert_eq!((g.px, g.py), (0, 0));
                assert!(!g.show);
            }
            Command::Calibrate(_) => panic!("wrong subcommand"),
        }
    }

    #[test]
    fn board_flags_are_validated() {
        let cli = Cli::try_parse_from([
            "camcal",
            "--square-len",
            "0.02",
            "--marker-len",
            "0.03",
            "generate",
        ])
        .expect("parse");
        assert!(matches!(
            cli.board.resolve(),
            Err(ConfigError::MarkerNotSmaller { .. })
        ));
    }

    #[test]
    fn calibrate_thresholds() {
        let cli = Cli::try_parse_from([
            "camcal",
            "-vv",
            "calibrate",
            "--frames",
            "imgs",
            "--keys",
            "a.c q",
            "--min-samples",
            "3",
        ])
        .expect("parse");
        assert_eq!(cli.verbose, 2);
        let Command::Calibrate(args) = cli.command else {
            panic!("wrong subcommand");
        };
        let params = args.session_params();
        assert_eq!(params.min_markers, 4);
        assert_eq!(params.min_samples, 3);
        assert_eq!(args.keys.as_deref(), Some("a.c q"));
    }
}
