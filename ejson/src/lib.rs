// SPDX-License-Identifier: Apache-2.0

//! Event driven parser for extended JSON.
//!
//! Besides plain JSON the grammar accepts `0x` hex integers, `(flag,flag)` lists
//! after member names and string values, and `%...%` base64 data blocks which are
//! decoded on the fly. Parsing never recurses and never allocates on its own: the
//! nesting state lives on a [`FrameStack`] chosen by the caller.
//!
//! ```
//! use ejson::{Driver, JsonStr, Value};
//!
//! #[derive(Default)]
//! struct Names(Vec<String>);
//!
//! impl<'a> Driver<'a> for Names {
//!     fn set_name(&mut self, name: JsonStr<'a>) {
//!         self.0.push(name.unescaped().unwrap().into_owned());
//!     }
//! }
//!
//! let mut names = Names::default();
//! ejson::parse(&mut names, br#"{"id"(key): 0x2A, "blob": %AQID%}"#).unwrap();
//! assert_eq!(names.0, ["id", "blob"]);
//! ```

#![cfg_attr(not(test), no_std)]

#[cfg(feature = "alloc")]
extern crate alloc;

mod parse_error;
pub use parse_error::{status, ErrorKind, ParseError};

mod escape_processor;
pub use escape_processor::{unescape, unescape_in_place, EscapeError, REPLACEMENT_CHARACTER};

mod frame_stack;
#[cfg(feature = "alloc")]
pub use frame_stack::VecStack;
pub use frame_stack::{
    AllocatorStack, FixedStack, Frame, FrameStack, NoStack, StackAllocator, INITIAL_CAPACITY,
};

mod base64_decoder;
pub use base64_decoder::{Base64Decoder, Base64Error, DATA_CHUNK_SIZE};

mod driver;
pub use driver::{Driver, JsonStr, NullDriver, Value, ValueKind};

mod scanner;

mod number_parser;

mod parser;
#[cfg(feature = "alloc")]
pub use parser::parse;
pub use parser::{parse_full, parse_with_stack, Parser};
