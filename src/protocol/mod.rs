//! Protocol Module
//!
//! Defines the RESP-style wire protocol for client-server communication.
//!
//! ## Frame Grammar
//!
//! Every frame begins with a one-byte type tag; headers end with `\r\n`:
//!
//! ```text
//! +<text>\r\n                      simple string
//! -<message>\r\n                   error
//! :<number>\r\n                    integer
//! $<len>\r\n<len bytes>\r\n        bulk string
//! $-1\r\n                          null
//! *<count>\r\n<count frames>       array
//! ```
//!
//! A well-formed request is always an array of bulk strings; the first
//! element, upper-cased, selects the command.
//!
//! Replies reuse the same grammar. Integers are not separately length-framed
//! in this protocol variant: an integer reply is emitted as a bulk string of
//! its decimal text.

mod value;
mod codec;

pub use value::Value;
pub use codec::{decode, encode, read_value, write_value};
