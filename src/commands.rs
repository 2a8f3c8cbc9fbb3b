//! The fixed set of commands a plug understands
//!
//! further commands listed here:
//! https://github.com/softScheck/tplink-smartplug/blob/master/tplink-smarthome-commands.txt
use std::{fmt, str::FromStr};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    On,
    Off,
    Info,
    Status,
    WifiScan,
    GetAction,
    GetRules,
    GetAway,
    Reboot,
    LedOn,
    LedOff,
    CloudInfo,
    GetTime,
}

// name, action, request body; ordered like the variants of `Action`
static CATALOG: [(&str, Action, &str); 13] = [
    ("on", Action::On, r#"{"system":{"set_relay_state":{"state":1}}}"#),
    ("off", Action::Off, r#"{"system":{"set_relay_state":{"state":0}}}"#),
    ("info", Action::Info, r#"{"system":{"get_sysinfo":{}}}"#),
    ("status", Action::Status, r#"{"system":{"get_sysinfo":{}}}"#),
    ("wifiscan", Action::WifiScan, r#"{"netif":{"get_scaninfo":{"refresh":1}}}"#),
    ("getaction", Action::GetAction, r#"{"schedule":{"get_next_action":null}}"#),
    ("getrules", Action::GetRules, r#"{"schedule":{"get_rules":null}}"#),
    ("getaway", Action::GetAway, r#"{"anti_theft":{"get_rules":null}}"#),
    ("reboot", Action::Reboot, r#"{"system":{"reboot":{"delay":1}}}"#),
    ("ledon", Action::LedOn, r#"{"system":{"set_led_off":{"off":0}}}"#),
    ("ledoff", Action::LedOff, r#"{"system":{"set_led_off":{"off":1}}}"#),
    ("cloudinfo", Action::CloudInfo, r#"{"cnCloud":{"get_info":{}}}"#),
    ("gettime", Action::GetTime, r#"{"time":{"get_time":{}}}"#),
];

impl Action {
    pub fn all() -> impl Iterator<Item = Action> {
        CATALOG.iter().map(|(_, action, _)| *action)
    }

    pub fn name(self) -> &'static str {
        Self::entry(self).0
    }

    /// JSON request body sent to the device for this action
    pub fn template(self) -> &'static str {
        Self::entry(self).2
    }

    fn entry(self) -> &'static (&'static str, Action, &'static str) {
        &CATALOG[self as usize]
    }
}

/// Find an action by name, ignoring case.
pub fn lookup(name: &str) -> Result<Action> {
    CATALOG
        .iter()
        .find(|(entry, _, _)| entry.eq_ignore_ascii_case(name.trim()))
        .map(|(_, action, _)| *action)
        .ok_or_else(|| Error::UnknownAction(name.to_owned()))
}

/// Comma separated list of every action name, for help text.
pub fn names() -> String {
    CATALOG
        .iter()
        .map(|(name, _, _)| *name)
        .collect::<Vec<_>>()
        .join(", ")
}

impl FromStr for Action {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        lookup(s)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}
