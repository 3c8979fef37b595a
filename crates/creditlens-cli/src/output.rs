use serde::Serialize;
use serde_json::Value;

use crate::error::CliError;
use crate::metadata::Metadata;

/// Every command prints exactly one of these on stdout.
#[derive(Debug, Clone, Serialize)]
pub struct Envelope {
    pub meta: Metadata,
    pub data: Value,
}

pub fn render(envelope: &Envelope, pretty: bool) -> Result<(), CliError> {
    let payload = if pretty {
        serde_json::to_string_pretty(envelope)?
    } else {
        serde_json::to_string(envelope)?
    };
    println!("{payload}");
    Ok(())
}
