//! # chainrelay-evm
//!
//! EVM-family event parsers. Each sub-family (Aave-style governance,
//! Compound-style governance, ERC20, ERC721) owns its own closed `EventKind`
//! enumeration and its own `EventParser` implementation. Aave's
//! `proposal-executed` is a distinct kind from Compound's, and no enumeration
//! is shared across families.

pub mod aave;
pub mod compound;
pub mod erc20;
pub mod erc721;

mod fields;

pub use aave::{AaveEventKind, AaveParser};
pub use compound::{CompoundEventKind, CompoundParser};
pub use erc20::{Erc20EventKind, Erc20Parser};
pub use erc721::{Erc721EventKind, Erc721Parser};
