//! Flow-log record normalization.
//!
//! One record per line, whitespace-delimited, in the AWS VPC flow log
//! Version 2 layout. Only the destination port (field 7) and the protocol
//! number (field 8) are consumed; trailing fields are accepted and ignored.

use std::fmt;

use snafu::{ResultExt, Snafu, ensure};

/// Minimum field count of a Version 2 record.
const MIN_FIELDS: usize = 14;

/// Zero-based field index of the destination port.
const DST_PORT_FIELD: usize = 6;

/// Zero-based field index of the protocol number.
const PROTOCOL_FIELD: usize = 7;

#[derive(Debug, Snafu)]
pub enum RecordError {
    #[snafu(display("line {line}: expected at least {MIN_FIELDS} fields, found {found}"))]
    FieldCount { line: usize, found: usize },

    #[snafu(display("line {line}: destination port {value:?} is not a valid port number"))]
    DestinationPort {
        line: usize,
        value: String,
        source: std::num::ParseIntError,
    },

    #[snafu(display("line {line}: protocol {value:?} is not a valid protocol number"))]
    ProtocolNumber {
        line: usize,
        value: String,
        source: std::num::ParseIntError,
    },
}

/// Identity of a flow for this tool: destination port plus lowercase
/// protocol name. The same key indexes the lookup table and the pair counts,
/// and lowercasing at construction is what makes matching case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FlowKey {
    pub port: u16,
    pub protocol: String,
}

impl FlowKey {
    pub fn new(port: u16, protocol: &str) -> Self {
        Self {
            port,
            protocol: protocol.to_ascii_lowercase(),
        }
    }
}

impl fmt::Display for FlowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.port, self.protocol)
    }
}

/// Splits a record into its whitespace-separated fields.
pub fn parse(input: &str) -> Vec<&str> {
    input.split_whitespace().collect()
}

/// Maps an IANA protocol number to the lowercase name used for matching.
/// Numbers outside the table fall back to their decimal form.
pub fn protocol_name(number: u8) -> String {
    match number {
        1 => "icmp".to_string(),
        6 => "tcp".to_string(),
        17 => "udp".to_string(),
        other => other.to_string(),
    }
}

/// Normalizes one raw line into a [`FlowKey`]. `line` is 1-based and only
/// used in errors. Blank lines have zero fields and fail the field-count
/// check like any other short record.
pub fn normalize(input: &str, line: usize) -> Result<FlowKey, RecordError> {
    let fields = parse(input);
    ensure!(
        fields.len() >= MIN_FIELDS,
        FieldCountSnafu {
            line,
            found: fields.len()
        }
    );

    let port = fields[DST_PORT_FIELD]
        .parse::<u16>()
        .context(DestinationPortSnafu {
            line,
            value: fields[DST_PORT_FIELD],
        })?;
    let number = fields[PROTOCOL_FIELD]
        .parse::<u8>()
        .context(ProtocolNumberSnafu {
            line,
            value: fields[PROTOCOL_FIELD],
        })?;

    Ok(FlowKey::new(port, &protocol_name(number)))
}
