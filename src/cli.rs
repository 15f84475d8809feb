use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::proof::CaptureSource;

#[derive(Parser)]
#[command(name = "dvtrusted")]
#[command(author, version, about = "Terminal host for the DV Trusted rewards Mini App", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Launch parameters the Mini App page would receive from Telegram.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct LaunchArgs {
    /// Raw Telegram.WebApp.initData query string
    #[arg(long)]
    pub init_data: Option<String>,

    /// Page URL the app was opened with (may carry ?ref=<code>)
    #[arg(long)]
    pub entry_url: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load the session and print the dashboard
    Bootstrap {
        #[command(flatten)]
        launch: LaunchArgs,
    },

    /// Run the channel verification check
    Verify,

    /// Submit a proof photo for a task
    Submit {
        #[command(flatten)]
        launch: LaunchArgs,

        /// Task identifier
        #[arg(short, long)]
        task: String,

        /// Task title shown on the upload surface
        #[arg(long, default_value = "Task")]
        title: String,

        /// Photo to submit
        #[arg(short, long)]
        file: PathBuf,

        /// Where the photo comes from
        #[arg(long, value_enum, default_value_t = SourceArg::Gallery)]
        source: SourceArg,
    },

    /// Print the download URL of an uploaded proof photo
    PhotoUrl {
        /// Bot API file_id
        file_id: String,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum SourceArg {
    Camera,
    Gallery,
}

impl From<SourceArg> for CaptureSource {
    fn from(arg: SourceArg) -> Self {
        match arg {
            SourceArg::Camera => CaptureSource::Camera,
            SourceArg::Gallery => CaptureSource::Gallery,
        }
    }
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
