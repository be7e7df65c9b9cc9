//! Network family identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Top-level network family.
/// Determines which parser is dispatched for a raw event, and is persisted
/// verbatim in the `network` column of every stored chain event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Substrate,
    Aave,
    Compound,
    Cosmos,
    Erc20,
    Erc721,
}

impl Network {
    /// Wire/database string form. Case-sensitive; handlers match against
    /// exactly this spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Substrate => "substrate",
            Network::Aave => "aave",
            Network::Compound => "compound",
            Network::Cosmos => "cosmos",
            Network::Erc20 => "erc20",
            Network::Erc721 => "erc721",
        }
    }

    /// All supported families, in dispatch order.
    pub fn all() -> &'static [Network] {
        &[
            Network::Substrate,
            Network::Aave,
            Network::Compound,
            Network::Cosmos,
            Network::Erc20,
            Network::Erc721,
        ]
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "substrate" => Ok(Network::Substrate),
            "aave" => Ok(Network::Aave),
            "compound" => Ok(Network::Compound),
            "cosmos" => Ok(Network::Cosmos),
            "erc20" => Ok(Network::Erc20),
            "erc721" => Ok(Network::Erc721),
            other => Err(format!("unknown network family: {other}")),
        }
    }
}
