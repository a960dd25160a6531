//! `mboxfrom` — recognize mbox `From ` separator lines.
//!
//! The [`parser`] module is the pure core: it decides whether a line starts
//! a message and extracts the envelope sender and delivery time. The other
//! modules wrap it for scanning whole mailboxes from the command line.
//!
//! ```
//! use mboxfrom::parser::is_from;
//!
//! let mut sender = [0u8; 64];
//! let mut time = 0i64;
//! assert!(is_from(
//!     b"From jdoe@example.com Thu Jan  1 00:00:00 1998",
//!     Some(&mut sender),
//!     Some(&mut time),
//! ));
//! assert_eq!(&sender[..17], b"jdoe@example.com\0");
//! assert_eq!(time, 883_612_800);
//! ```

pub mod config;
pub mod error;
pub mod parser;
pub mod scan;
