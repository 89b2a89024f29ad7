//! VE.Direct Serial Protocol
//!
//! This crate provides types and utilities for decoding the VE.Direct serial
//! protocol spoken by solar charge controllers and battery monitors. The
//! protocol interleaves two framings on one wire:
//!
//! - **Text mode**: human-readable `TAG<TAB>VALUE` lines, broadcast once per
//!   second and grouped into blocks ended by a checksum line
//! - **HEX mode**: binary frames sent as `:` followed by hex digit pairs,
//!   carrying register get/set traffic and asynchronous updates
//!
//! # Example
//!
//! ```rust,ignore
//! use vedirect_protocol::{lookup_register, HexFrame};
//!
//! let frame = HexFrame::decode(&decoded_bytes)?;
//! if let Some(def) = lookup_register(frame.register_id) {
//!     let value = def.decode_value(frame.payload)?;
//! }
//! ```

mod constants;
mod error;
mod frame;
mod history;
mod parameters;
mod registers;

pub use constants::*;
pub use error::*;
pub use frame::*;
pub use history::*;
pub use parameters::*;
pub use registers::*;
