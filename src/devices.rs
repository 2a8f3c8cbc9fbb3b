use std::{
    fmt,
    net::{IpAddr, SocketAddr},
};

pub const DEFAULT_PORT: u16 = 9999;

/// A named plug and the `host:port` it listens on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    pub name: String,
    pub addr: String,
}

impl Device {
    /// `addr` may omit the port, in which case the plug's default port is used.
    pub fn new(name: &str, addr: &str) -> Device {
        Device {
            name: name.to_owned(),
            addr: with_default_port(addr.trim()),
        }
    }
}

fn with_default_port(addr: &str) -> String {
    if addr.parse::<SocketAddr>().is_ok() {
        return addr.to_owned();
    }

    let bare = addr.trim_start_matches('[').trim_end_matches(']');
    if let Ok(ip) = bare.parse::<IpAddr>() {
        return SocketAddr::new(ip, DEFAULT_PORT).to_string();
    }

    match addr.rsplit_once(':') {
        Some((_, port)) if port.parse::<u16>().is_ok() => addr.to_owned(),
        _ => format!("{}:{}", addr, DEFAULT_PORT),
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_port_added() {
        assert_eq!("192.168.10.44:9999", Device::new("plug", "192.168.10.44").addr);
        assert_eq!("plug.lan:9999", Device::new("plug", "plug.lan").addr);
        assert_eq!("plug.lan:9999", Device::new("plug", " plug.lan ").addr);
    }

    #[test]
    fn explicit_port_kept() {
        assert_eq!("192.168.10.44:8080", Device::new("plug", "192.168.10.44:8080").addr);
        assert_eq!("[::1]:9999", Device::new("plug", "[::1]:9999").addr);
        assert_eq!("plug.lan:10000", Device::new("plug", "plug.lan:10000").addr);
    }

    #[test]
    fn bare_ipv6_gets_brackets() {
        assert_eq!("[fe80::1]:9999", Device::new("plug", "fe80::1").addr);
        assert_eq!("[::1]:9999", Device::new("plug", "[::1]").addr);
    }

    #[test]
    fn display() {
        assert_eq!(
            "kitchen (10.0.0.2:9999)",
            Device::new("kitchen", "10.0.0.2").to_string()
        );
    }
}
