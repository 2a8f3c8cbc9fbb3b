//! Send one action to a list of devices, one after the other
use std::io::Write;

use tracing::{info, warn};

use crate::{
    commands::Action,
    devices::Device,
    error::Result,
    protocol::{self, DefaultProtocol, Protocol},
    response::{self, ParsedResult},
};

#[derive(Debug, Clone, Copy, Default)]
pub struct Options {
    /// Also print every decoded reply in full
    pub debug: bool,
}

pub struct Dispatcher {
    protocol: Box<dyn Protocol>,
    options: Options,
}

/// What happened to a single device during a run
#[derive(Debug)]
pub struct Outcome {
    pub device: Device,
    pub result: Result<ParsedResult>,
}

impl Dispatcher {
    pub fn new(options: Options) -> Dispatcher {
        Dispatcher::with_protocol(Box::new(DefaultProtocol::new()), options)
    }

    pub fn with_protocol(protocol: Box<dyn Protocol>, options: Options) -> Dispatcher {
        Dispatcher { protocol, options }
    }

    /// Run `action` against every device, writing human readable output to `out`.
    ///
    /// A device that cannot be reached is reported and skipped. Only a failure
    /// to write to `out` ends the run early.
    pub fn run<W: Write>(
        &self,
        action: Action,
        devices: &[Device],
        out: &mut W,
    ) -> Result<Vec<Outcome>> {
        let batch = devices.len() > 1;

        if batch {
            writeln!(out, "Devices:")?;
            for device in devices {
                writeln!(out, "  {}", device)?;
            }
        }

        let mut outcomes = Vec::with_capacity(devices.len());
        for device in devices {
            if batch {
                writeln!(out)?;
                writeln!(out, "== {} ==", device)?;
            }

            let result = self.send(action, device, out);
            match &result {
                Ok(parsed) => writeln!(out, "{}", parsed)?,
                Err(err) => {
                    warn!(device = %device.name, %err, "skipping device");
                    writeln!(out, "{}", err)?;
                }
            }

            outcomes.push(Outcome {
                device: device.clone(),
                result,
            });
        }

        Ok(outcomes)
    }

    fn send<W: Write>(
        &self,
        action: Action,
        device: &Device,
        out: &mut W,
    ) -> Result<ParsedResult> {
        info!(device = %device.name, addr = %device.addr, %action, "sending");

        let request = protocol::request(action.template());
        let reply = self.protocol.send(&device.addr, &request)?;
        let value = response::decode(&protocol::unframe(&reply));

        if self.options.debug {
            writeln!(out, "{}", response::pretty(&value))?;
        }

        Ok(response::parse_value(action, value))
    }
}

/// Zero when at least one device answered.
pub fn exit_code(outcomes: &[Outcome]) -> i32 {
    if outcomes.iter().any(|outcome| outcome.result.is_ok()) {
        0
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::Error, protocol::ProtocolMock};
    use std::{cell::RefCell, rc::Rc};

    const RELAY_OK: &str = r#"{"system":{"set_relay_state":{"err_code":0}}}"#;

    fn devices() -> Vec<Device> {
        vec![
            Device::new("one", "10.0.0.1"),
            Device::new("two", "10.0.0.2"),
            Device::new("three", "10.0.0.3"),
        ]
    }

    // Lets a test look at the requests after the dispatcher took ownership
    struct SharedMock(Rc<RefCell<ProtocolMock>>);

    impl Protocol for SharedMock {
        fn send(&self, addr: &str, request: &[u8]) -> Result<Vec<u8>> {
            self.0.borrow().send(addr, request)
        }
    }

    fn run(
        mock: ProtocolMock,
        action: Action,
        devices: &[Device],
        debug: bool,
    ) -> (String, Vec<Outcome>, Rc<RefCell<ProtocolMock>>) {
        let mock = Rc::new(RefCell::new(mock));
        let dispatcher =
            Dispatcher::with_protocol(Box::new(SharedMock(mock.clone())), Options { debug });
        let mut out = vec![];

        let outcomes = dispatcher.run(action, devices, &mut out).unwrap();

        (String::from_utf8(out).unwrap(), outcomes, mock)
    }

    #[test]
    fn single_device_has_no_banner() {
        // arrange
        let mut protocol = ProtocolMock::new();
        protocol.set_reply("10.0.0.1:9999", RELAY_OK);
        let devices = vec![Device::new("one", "10.0.0.1")];

        // act
        let (output, outcomes, _) = run(protocol, Action::On, &devices, false);

        // assert
        assert_eq!("OK\n", output);
        assert_eq!(0, exit_code(&outcomes));
    }

    #[test]
    fn sends_catalog_request() {
        let mut protocol = ProtocolMock::new();
        protocol.set_reply("10.0.0.1:9999", RELAY_OK);
        let devices = vec![Device::new("one", "10.0.0.1")];

        let (_, _, mock) = run(protocol, Action::Off, &devices, false);

        let mock = mock.borrow();
        let requests = mock.requests.borrow();
        assert_eq!(1, requests.len());
        assert_eq!("10.0.0.1:9999", requests[0].0);
        assert_eq!(protocol::request(Action::Off.template()), requests[0].1);
    }

    #[test]
    fn batch_continues_past_unreachable_device() {
        // arrange
        let mut protocol = ProtocolMock::new();
        protocol.set_reply("10.0.0.1:9999", RELAY_OK);
        protocol.set_reply(
            "10.0.0.3:9999",
            r#"{"system":{"set_relay_state":{"err_code":-1}}}"#,
        );

        // act
        let (output, outcomes, mock) = run(protocol, Action::On, &devices(), false);

        // assert
        assert_eq!(3, mock.borrow().requests.borrow().len());
        assert_eq!(3, outcomes.len());
        assert_eq!("OK", outcomes[0].result.as_ref().unwrap().to_string());
        assert!(matches!(outcomes[1].result, Err(Error::Connect { .. })));
        assert_eq!(
            "Error code: -1",
            outcomes[2].result.as_ref().unwrap().to_string()
        );
        assert_eq!(0, exit_code(&outcomes));

        assert!(output.starts_with(
            "Devices:\n  one (10.0.0.1:9999)\n  two (10.0.0.2:9999)\n  three (10.0.0.3:9999)\n"
        ));
        assert!(output.contains("== one (10.0.0.1:9999) ==\nOK\n"));
        assert!(output
            .contains("== two (10.0.0.2:9999) ==\nCannot connect to device at 10.0.0.2:9999"));
        assert!(output.contains("== three (10.0.0.3:9999) ==\nError code: -1\n"));
    }

    #[test]
    fn every_device_unreachable() {
        let (_, outcomes, _) = run(ProtocolMock::new(), Action::Status, &devices(), false);

        assert!(outcomes.iter().all(|outcome| outcome.result.is_err()));
        assert_eq!(1, exit_code(&outcomes));
    }

    #[test]
    fn debug_prints_full_reply() {
        let mut protocol = ProtocolMock::new();
        protocol.set_reply(
            "10.0.0.1:9999",
            r#"{"system":{"get_sysinfo":{"relay_state":1}}}"#,
        );
        let devices = vec![Device::new("one", "10.0.0.1")];

        let (output, _, _) = run(protocol, Action::Status, &devices, true);

        assert_eq!(
            "{\n \"system\": {\n  \"get_sysinfo\": {\n   \"relay_state\": 1\n  }\n }\n}\nON\n",
            output
        );
    }

    #[test]
    fn padded_reply_is_repaired() {
        let mut padded = protocol::frame(&protocol::encrypt(
            br#"{"time":{"get_time":{"year":2021,"month":12,"mday":31,"hour":23,"min":59,"sec":58,"err_code":0}}}"#,
        ));
        padded.extend_from_slice(&[0xAB, 0xAB, 0x00, 0x11]);
        let mut protocol = ProtocolMock::new();
        protocol.set_raw_reply("10.0.0.1:9999", padded);
        let devices = vec![Device::new("one", "10.0.0.1")];

        let (output, _, _) = run(protocol, Action::GetTime, &devices, false);

        assert_eq!("2021-12-31 23:59:58\n", output);
    }

    #[test]
    fn empty_reply_defaults() {
        let mut protocol = ProtocolMock::new();
        protocol.set_raw_reply("10.0.0.1:9999", vec![]);
        let devices = vec![Device::new("one", "10.0.0.1")];

        let (output, outcomes, _) = run(protocol, Action::Status, &devices, false);

        assert_eq!("OFF\n", output);
        assert!(outcomes[0].result.is_ok());
    }
}
