//! Application bootstrap and the single pass over the inputs.

use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Write},
    path::PathBuf,
};

use snafu::{ResultExt, Snafu};
use tracing::{debug, error, info};

use crate::{
    aggregate::Aggregate,
    cli::Opts,
    enrichment::{self, LookupTable},
    flow, report, trace,
};

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("{source}"))]
    Lookup { source: enrichment::LoadError },

    #[snafu(display("unable to open flow log {}: {source}", path.display()))]
    OpenFlowLog {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("unable to read flow log {}: {source}", path.display()))]
    ReadFlowLog {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("flow log {}: {source}", path.display()))]
    Record {
        path: PathBuf,
        source: flow::RecordError,
    },

    #[snafu(display("unable to write report {}: {source}", path.display()))]
    WriteReport {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl Error {
    /// Exit code reported to the shell for this failure.
    pub fn exit_code(&self) -> exitcode::ExitCode {
        match self {
            Self::Lookup { source } => source.exit_code(),
            Self::Record { .. } => exitcode::DATAERR,
            Self::OpenFlowLog { .. } | Self::ReadFlowLog { .. } | Self::WriteReport { .. } => {
                exitcode::IOERR
            }
        }
    }
}

pub struct Application {
    opts: Opts,
}

impl Application {
    /// Parses the command line and initializes logging. Usage errors are
    /// reported by clap itself, on stderr, with a non-zero exit.
    pub fn prepare() -> Self {
        let opts = Opts::get_matches();
        trace::init(opts.log_level());

        Self { opts }
    }

    pub fn run(self) -> exitcode::ExitCode {
        match execute(&self.opts) {
            Ok(()) => exitcode::OK,
            Err(error) => {
                error!(message = "Run failed.", %error);
                error.exit_code()
            }
        }
    }
}

/// The whole pipeline: load the lookup table, fold every flow-log line into
/// the aggregate, then write the report. Any error aborts before the report
/// file is created, so a failed run never leaves partial counts behind.
fn execute(opts: &Opts) -> Result<(), Error> {
    let table = LookupTable::load(&opts.lookup).context(LookupSnafu)?;
    info!(
        message = "Loaded lookup table.",
        path = %opts.lookup.display(),
        entries = table.len(),
    );

    let flow_log = File::open(&opts.flow_log).context(OpenFlowLogSnafu {
        path: &opts.flow_log,
    })?;
    let mut aggregate = Aggregate::new();
    for (idx, line) in BufReader::new(flow_log).lines().enumerate() {
        let line = line.context(ReadFlowLogSnafu {
            path: &opts.flow_log,
        })?;
        let key = flow::normalize(&line, idx + 1).context(RecordSnafu {
            path: &opts.flow_log,
        })?;
        aggregate.record(key, &table);
    }
    debug!(
        message = "Flow log scan complete.",
        records = aggregate.records(),
    );

    let output = File::create(&opts.output).context(WriteReportSnafu { path: &opts.output })?;
    let mut writer = BufWriter::new(output);
    report::write_report(&mut writer, &aggregate)
        .context(WriteReportSnafu { path: &opts.output })?;
    writer
        .flush()
        .context(WriteReportSnafu { path: &opts.output })?;

    info!(
        message = "Processing complete.",
        records = aggregate.records(),
        output = %opts.output.display(),
    );

    Ok(())
}
