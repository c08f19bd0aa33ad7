//! Remote-call surface toward peer devices.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                     RPC surface                          │
//! │                                                          │
//! │  ┌────────────┐   ┌────────────┐   ┌────────────────┐   │
//! │  │ capability │◀──│  transfer  │──▶│    chunked     │   │
//! │  │ (contracts)│   │ (fileData) │   │ (encode/reasm) │   │
//! │  └────────────┘   └────────────┘   └────────────────┘   │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod capability;
pub mod chunked;
pub mod transfer;
