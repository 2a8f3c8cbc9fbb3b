use std::{
    fmt,
    io::{Read, Write},
    net::{Shutdown, TcpStream},
};

use byteorder::{BigEndian, ByteOrder, WriteBytesExt};
use tracing::{debug, warn};

use crate::error::{Error, Result};

#[cfg(test)]
use std::{cell::RefCell, collections::HashMap, io};

/// Size of the single read performed per request. Longer replies are cut off.
pub const READ_BUFFER_SIZE: usize = 1024;

const INITIAL_KEY: u8 = 0xAB;

// Autokey XOR, the next key is the byte just written to the wire
// see: https://www.softscheck.com/en/reverse-engineering-tp-link-hs110/
pub fn encrypt(plain: &[u8]) -> Vec<u8> {
    let mut key = INITIAL_KEY;
    let mut cipher = Vec::with_capacity(plain.len());

    for byte in plain {
        key ^= byte;
        cipher.push(key);
    }

    cipher
}

// The next key is the ciphertext byte just consumed, not the plaintext
pub fn decrypt(cipher: &[u8]) -> Vec<u8> {
    let mut key = INITIAL_KEY;
    let mut plain = Vec::with_capacity(cipher.len());

    for &byte in cipher {
        plain.push(byte ^ key);
        key = byte;
    }

    plain
}

/// Prefix `payload` with its length as a big-endian u32.
pub fn frame(payload: &[u8]) -> Vec<u8> {
    let mut framed = Vec::with_capacity(payload.len() + 4);
    // writing into a Vec cannot fail
    let _ = framed.write_u32::<BigEndian>(payload.len() as u32);
    framed.extend_from_slice(payload);
    framed
}

/// Build the bytes sent to a device for a JSON command.
pub fn request(json: &str) -> Vec<u8> {
    frame(&encrypt(json.as_bytes()))
}

/// Cut decoded text back to the last closing brace.
///
/// Devices pad their replies with stale bytes, so the length prefix can't be
/// trusted. Text without any brace is returned as is.
pub fn repair(text: &str) -> &str {
    match text.rfind('}') {
        Some(pos) => &text[..=pos],
        None => text,
    }
}

/// Turn a raw reply into JSON text: skip the length prefix, decrypt, repair.
pub fn unframe(reply: &[u8]) -> String {
    if reply.len() < 4 {
        warn!(len = reply.len(), "reply shorter than its length prefix");
        return String::new();
    }

    debug!(
        advertised = BigEndian::read_u32(&reply[0..4]),
        received = reply.len() - 4,
        raw = %Hex(reply),
        "reply length prefix"
    );

    let plain = decrypt(&reply[4..]);
    repair(&String::from_utf8_lossy(&plain)).to_owned()
}

/// Lowercase hex rendering of raw bytes for logs
pub struct Hex<'a>(pub &'a [u8]);

impl fmt::Display for Hex<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

pub trait Protocol {
    /// Deliver a framed request to `addr` and return whatever the device replied.
    fn send(&self, addr: &str, request: &[u8]) -> Result<Vec<u8>>;
}

pub struct DefaultProtocol;

impl DefaultProtocol {
    pub fn new() -> DefaultProtocol {
        DefaultProtocol {}
    }
}

impl Default for DefaultProtocol {
    fn default() -> Self {
        Self::new()
    }
}

impl Protocol for DefaultProtocol {
    fn send(&self, addr: &str, request: &[u8]) -> Result<Vec<u8>> {
        let mut stream = TcpStream::connect(addr).map_err(|source| Error::Connect {
            addr: addr.to_owned(),
            source,
        })?;

        let reply = exchange(&mut stream, addr, request);

        // dropping the stream closes it as well, this just makes it explicit
        if let Err(err) = stream.shutdown(Shutdown::Both) {
            debug!(%addr, %err, "shutdown failed");
        }

        Ok(reply)
    }
}

// One write, one read. Failures are logged and the bytes received so far kept.
fn exchange<S: Read + Write>(stream: &mut S, addr: &str, request: &[u8]) -> Vec<u8> {
    if let Err(err) = stream.write_all(request) {
        warn!(%addr, %err, "cannot write to device");
    }

    let mut buffer = [0_u8; READ_BUFFER_SIZE];
    let read = match stream.read(&mut buffer) {
        Ok(read) => read,
        Err(err) => {
            warn!(%addr, %err, "cannot read from device");
            0
        }
    };
    debug!(%addr, read, "reply received");

    buffer[..read].to_vec()
}

#[cfg(test)]
pub struct ProtocolMock {
    replies: HashMap<String, Vec<u8>>,
    pub requests: RefCell<Vec<(String, Vec<u8>)>>,
}

#[cfg(test)]
impl ProtocolMock {
    pub fn new() -> ProtocolMock {
        ProtocolMock {
            replies: HashMap::new(),
            requests: RefCell::new(vec![]),
        }
    }

    /// Reply to `addr` with `json` framed and encrypted like a device would.
    pub fn set_reply(&mut self, addr: &str, json: &str) {
        self.replies.insert(addr.to_owned(), request(json));
    }

    pub fn set_raw_reply(&mut self, addr: &str, reply: Vec<u8>) {
        self.replies.insert(addr.to_owned(), reply);
    }
}

#[cfg(test)]
impl Protocol for ProtocolMock {
    fn send(&self, addr: &str, request: &[u8]) -> Result<Vec<u8>> {
        self.requests
            .borrow_mut()
            .push((addr.to_owned(), request.to_vec()));
        match self.replies.get(addr) {
            Some(reply) => Ok(reply.clone()),
            None => Err(Error::Connect {
                addr: addr.to_owned(),
                source: io::Error::from(io::ErrorKind::ConnectionRefused),
            }),
        }
    }
}
