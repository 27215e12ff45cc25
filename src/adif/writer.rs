// ADIF Writer
// Renders the contest log as an ADIF 2.2 document for submission.
//
// Every field is emitted as <NAME:LEN>VALUE on its own CRLF-terminated line.
// Output is restricted to 7-bit ASCII; anything else is refused rather than
// transliterated.

use std::fmt::Write as _;

use crate::adif::bands::parse_hz;
use crate::commands::time_utils::{adif_date, adif_time};
use crate::db::Contact;
use crate::error::{Error, Result};

pub const ADIF_VERSION: &str = "2.2.0";
pub const MODE: &str = "CW";
pub const RST: &str = "599";
pub const COMMENT: &str = "K1USN SST";
pub const CONTEST_ID: &str = "K1USN-SST";

const EOL: &str = "\r\n";

/// Render a complete ADIF document, contacts in the order given
pub fn write_adif(contacts: &[Contact], my_exchange: &str) -> Result<String> {
    let mut out = String::new();
    push_field(&mut out, "ADIF_VER", ADIF_VERSION, "header")?;
    out.push_str("<EOH>");
    out.push_str(EOL);

    for contact in contacts {
        write_record(&mut out, contact, my_exchange)?;
    }
    Ok(out)
}

fn write_record(out: &mut String, contact: &Contact, my_exchange: &str) -> Result<()> {
    let ctx = format!("contact {}", contact.id);

    let date = adif_date(&contact.date_time)
        .map_err(|e| Error::Export(format!("{}: {}", ctx, e)))?;
    let time = adif_time(&contact.date_time)
        .map_err(|e| Error::Export(format!("{}: {}", ctx, e)))?;

    // QSO_DATE carries the ADIF date type indicator
    check_ascii(&date, &ctx)?;
    let _ = write!(out, "<QSO_DATE:{}:d>{}{}", date.len(), date, EOL);
    push_field(out, "TIME_ON", &time, &ctx)?;
    push_field(out, "CALL", &contact.callsign, &ctx)?;
    push_field(out, "MODE", MODE, &ctx)?;
    push_field(out, "BAND", &format!("{}M", contact.band), &ctx)?;
    push_field(out, "FREQ", &freq_mhz(&contact.frequency, &ctx)?, &ctx)?;
    push_field(out, "RST_SENT", RST, &ctx)?;
    push_field(out, "RST_RCVD", RST, &ctx)?;
    push_field(out, "STX_STRING", my_exchange, &ctx)?;
    push_field(out, "SRX_STRING", &contact.exchange(), &ctx)?;
    if !contact.qualifier.is_empty() {
        push_field(out, "STATE", &contact.qualifier, &ctx)?;
    }
    if contact.grid.len() > 1 {
        push_field(out, "GRIDSQUARE", &contact.grid, &ctx)?;
    }
    if contact.opname.len() > 1 {
        push_field(out, "NAME", &contact.opname, &ctx)?;
    }
    push_field(out, "COMMENT", COMMENT, &ctx)?;
    push_field(out, "CONTEST_ID", CONTEST_ID, &ctx)?;
    out.push_str("<EOR>");
    out.push_str(EOL);
    Ok(())
}

fn push_field(out: &mut String, name: &str, value: &str, ctx: &str) -> Result<()> {
    check_ascii(value, ctx)?;
    let _ = write!(out, "<{}:{}>{}{}", name, value.len(), value, EOL);
    Ok(())
}

fn check_ascii(value: &str, ctx: &str) -> Result<()> {
    if value.is_ascii() {
        Ok(())
    } else {
        Err(Error::Export(format!(
            "{}: '{}' contains characters outside 7-bit ASCII",
            ctx, value
        )))
    }
}

/// Hz reading rendered in MHz, always with a fractional part
/// (`7030000` -> `7.03`, `14000000` -> `14.0`). Fractional Hz are dropped.
fn freq_mhz(frequency: &str, ctx: &str) -> Result<String> {
    let hz = parse_hz(frequency).ok_or_else(|| {
        Error::Export(format!("{}: frequency '{}' is not a number of Hz", ctx, frequency))
    })?;
    let mhz = hz as f64 / 1_000_000.0;
    let text = mhz.to_string();
    if text.contains('.') {
        Ok(text)
    } else {
        Ok(format!("{}.0", text))
    }
}
