use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "flowtag", version, about)]
pub struct Opts {
    /// Path of the flow log to scan, one Version 2 record per line.
    pub flow_log: PathBuf,

    /// Path of the CSV lookup table mapping `dstport,protocol` to a tag.
    pub lookup: PathBuf,

    /// Path the report is written to.
    pub output: PathBuf,

    /// Reduce detail of log messages. Repeat to reduce further.
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub quiet: u8,

    /// Enable more detailed log messages. Repeat to enable more.
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Opts {
    pub fn get_matches() -> Self {
        Opts::parse()
    }

    pub const fn log_level(&self) -> &'static str {
        match self.quiet {
            0 => match self.verbose {
                0 => "info",
                1 => "debug",
                2..=255 => "trace",
            },
            1 => "warn",
            2 => "error",
            3..=255 => "off",
        }
    }
}
