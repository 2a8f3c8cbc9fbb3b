extern crate byteorder;

#[macro_use]
extern crate serde_derive;

pub mod commands;
pub mod config;
pub mod datatypes;
pub mod devices;
pub mod dispatch;
pub mod error;
pub mod protocol;
pub mod response;

pub use crate::{
    commands::{lookup, Action},
    config::Config,
    devices::Device,
    dispatch::{Dispatcher, Options},
    error::{Error, Result},
};
