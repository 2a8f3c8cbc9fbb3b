//! Pull the interesting part out of a decoded reply
use std::fmt;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{ser::PrettyFormatter, Serializer, Value};
use tracing::warn;

use crate::{
    commands::Action,
    datatypes::{DeviceTime, ErrCode, ScanInfo, SectionResult, SysInfo},
    error::Result,
};

#[derive(Debug, Clone, PartialEq)]
pub enum ParsedResult {
    /// Reply to a setter: on, off, ledon, ledoff, reboot
    Ack(SectionResult),
    Relay(SysInfo),
    Time(DeviceTime),
    Networks(ScanInfo),
    Json(Value),
}

pub fn parse(action: Action, json: &str) -> ParsedResult {
    parse_value(action, decode(json))
}

pub fn parse_value(action: Action, value: Value) -> ParsedResult {
    match action {
        Action::On | Action::Off => {
            ParsedResult::Ack(section(&value, "/system/set_relay_state"))
        }
        Action::LedOn | Action::LedOff => {
            ParsedResult::Ack(section(&value, "/system/set_led_off"))
        }
        Action::Reboot => {
            ParsedResult::Ack(section(&value, "/system/reboot"))
        }
        Action::Status => ParsedResult::Relay(section(&value, "/system/get_sysinfo")),
        Action::GetTime => ParsedResult::Time(section(&value, "/time/get_time")),
        Action::WifiScan => ParsedResult::Networks(section(&value, "/netif/get_scaninfo")),
        Action::Info
        | Action::CloudInfo
        | Action::GetAction
        | Action::GetRules
        | Action::GetAway => ParsedResult::Json(value),
    }
}

pub fn try_decode(json: &str) -> Result<Value> {
    Ok(serde_json::from_str(json)?)
}

/// Parse reply text, falling back to `null` when it isn't JSON.
pub fn decode(json: &str) -> Value {
    match try_decode(json) {
        Ok(value) => value,
        Err(err) => {
            warn!(%err, "cannot decode reply");
            Value::Null
        }
    }
}

// Missing or mistyped sections become their default
fn section<T: DeserializeOwned + Default>(value: &Value, pointer: &str) -> T {
    match value.pointer(pointer) {
        Some(found) => serde_json::from_value(found.clone()).unwrap_or_else(|err| {
            warn!(%err, pointer, "unexpected reply section");
            T::default()
        }),
        None => {
            warn!(pointer, "reply section missing");
            T::default()
        }
    }
}

/// Pretty print JSON with a single space of indentation.
pub fn pretty(value: &Value) -> String {
    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b" "));
    match value.serialize(&mut ser) {
        Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
        Err(_) => value.to_string(),
    }
}

fn write_err_code(f: &mut fmt::Formatter, err_code: ErrCode) -> fmt::Result {
    write!(f, "Error code: {}", err_code)
}

impl fmt::Display for ParsedResult {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ParsedResult::Ack(result) if result.err_code == 0 => f.write_str("OK"),
            ParsedResult::Ack(result) => {
                write_err_code(f, result.err_code)?;
                match &result.err_msg {
                    Some(msg) => write!(f, " ({})", msg),
                    None => Ok(()),
                }
            }
            ParsedResult::Relay(sysinfo) if sysinfo.relay_state > 0 => f.write_str("ON"),
            ParsedResult::Relay(_) => f.write_str("OFF"),
            ParsedResult::Time(time) if time.err_code == 0 => write!(
                f,
                "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
                time.year, time.month, time.mday, time.hour, time.min, time.sec
            ),
            ParsedResult::Time(time) => write_err_code(f, time.err_code),
            ParsedResult::Networks(scan) if scan.err_code == 0 => {
                let ssids = scan
                    .ap_list
                    .iter()
                    .map(|ap| ap.ssid.as_str())
                    .collect::<Vec<_>>();
                f.write_str(&ssids.join("\n"))
            }
            ParsedResult::Networks(scan) => write_err_code(f, scan.err_code),
            ParsedResult::Json(value) => f.write_str(&pretty(value)),
        }
    }
}
