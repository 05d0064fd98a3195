//! # Seastorm
//!
//! Reconstructs a causally consistent, globally ordered message trace from
//! independent per-process event logs, ready to be drawn as a message
//! sequence diagram.
//!
//! ```
//! use seastorm::domain::trace::{ProcessMap, ordering_from_logs};
//!
//! let logs: ProcessMap = [("A", "send,1,B,Kg=="), ("B", "receive,2,1,A")]
//!     .into_iter()
//!     .map(|(id, log)| (id.to_string(), log.to_string()))
//!     .collect();
//!
//! let ordering = ordering_from_logs(&logs, None).unwrap();
//! assert_eq!(ordering.counterpart(0), Some(1));
//! assert_eq!(ordering.events[1].data(), Some("*"));
//! ```

mod app;
pub mod core;
pub mod domain;
pub mod utils;
