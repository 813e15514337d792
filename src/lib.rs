//! Msgsync — unified messaging-history aggregation.
//!
//! One-shot ETL over a Twilio-style platform: pulls a customer's history
//! from the Programmable Messaging and Conversations APIs, folds both
//! shapes into one grouped-by-counterpart structure, and republishes it
//! into a Sync list under a deterministic name.
//!
//! See `DESIGN.md` for full architecture documentation.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod credentials;
pub mod logging;
pub mod pipeline;
pub mod platform;
