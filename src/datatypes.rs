//! Views over the sections of a plug's reply
//!
//! Every field defaults so a partial or unexpected reply still yields a value.

pub type ErrCode = i32;

/// The `{"err_code": .., "err_msg": ..}` object most setters answer with.
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct SectionResult {
    pub err_code: ErrCode,
    pub err_msg: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct SysInfo {
    pub relay_state: u8,
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct DeviceTime {
    pub year: u16,
    pub month: u8,
    pub mday: u8,
    pub hour: u8,
    pub min: u8,
    pub sec: u8,
    pub err_code: ErrCode,
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct ScanInfo {
    pub ap_list: Vec<AccessPoint>,
    pub err_code: ErrCode,
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct AccessPoint {
    pub ssid: String,
}
