use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "neurostat", about = "Statistics and filter analysis for multichannel neural recordings")]
pub struct Cli {
    /// Config file (defaults to ./neurostat.toml or ~/.config/neurostat/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Channels per frame
    #[arg(long, global = true)]
    pub channels: Option<usize>,

    /// Sample rate in Hz
    #[arg(long, global = true)]
    pub sample_rate: Option<f64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compare a raw recording with its filtered counterpart
    Compare {
        input: PathBuf,
        output: PathBuf,

        /// Frames to keep from the start of each recording
        #[arg(long)]
        max_frames: Option<usize>,

        /// Channels to summarize individually (repeatable)
        #[arg(long = "channel")]
        report_channels: Vec<usize>,

        /// Channel used for the spectral peak
        #[arg(long)]
        spectrum_channel: Option<usize>,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Characterize the configured filter coefficients
    Response {
        /// Points on the frequency grid
        #[arg(long)]
        points: Option<usize>,

        /// Passband threshold in dB
        #[arg(long, allow_hyphen_values = true)]
        threshold_db: Option<f64>,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Run the configured filter over every channel of a recording
    Apply {
        input: PathBuf,
        output: PathBuf,

        /// Real-time budget per frame in microseconds
        #[arg(long)]
        budget_us: Option<f64>,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Print the first frames of a recording
    Inspect {
        file: PathBuf,

        /// Frames to print
        #[arg(long)]
        frames: Option<usize>,

        /// Channels to print per frame
        #[arg(long, default_value_t = 8)]
        show_channels: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_compare_with_repeated_channels() {
        let cli = Cli::try_parse_from([
            "neurostat", "--channels", "64", "compare", "in.dat", "out.dat", "--channel", "3",
            "--channel", "7", "--json",
        ])
        .unwrap();
        assert_eq!(cli.channels, Some(64));
        match cli.command {
            Command::Compare { report_channels, json, .. } => {
                assert_eq!(report_channels, vec![3, 7]);
                assert!(json);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn negative_threshold_is_accepted() {
        let cli = Cli::try_parse_from(["neurostat", "response", "--threshold-db", "-6"]).unwrap();
        match cli.command {
            Command::Response { threshold_db, .. } => assert_eq!(threshold_db, Some(-6.0)),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
