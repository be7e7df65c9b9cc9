//! `chainrelay parse-event`: run one raw event through its family parser
//! and print the normalized form. Useful for checking payload shapes without
//! a live connection.

use std::io::Read;

use anyhow::{anyhow, bail, Context, Result};
use serde_json::Value;

use chainrelay_core::{EventParser, Network, ParseOutcome, RawEvent};
use chainrelay_cosmos::CosmosParser;
use chainrelay_evm::{AaveParser, CompoundParser, Erc20Parser, Erc721Parser};
use chainrelay_substrate::SubstrateParser;

pub fn run(network: &str, file: Option<&str>) -> Result<()> {
    let network: Network = network.parse().map_err(|e: String| anyhow!(e))?;

    let text = match file {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("read '{path}'"))?
        }
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf).context("read stdin")?;
            buf
        }
    };
    let input: Value = serde_json::from_str(&text).context("parse input JSON")?;

    let name = input
        .get("name")
        .and_then(Value::as_str)
        .context("input needs a string `name` field")?
        .to_string();
    let raw = RawEvent {
        network,
        chain: input
            .get("chain")
            .and_then(Value::as_str)
            .unwrap_or("cli")
            .to_string(),
        name,
        payload: input.get("payload").cloned().unwrap_or(Value::Null),
        block_number: input.get("blockNumber").and_then(Value::as_u64).unwrap_or(0),
    };

    let parser: Box<dyn EventParser> = match network {
        Network::Substrate => Box::new(SubstrateParser::new()),
        Network::Aave => Box::new(AaveParser::new()),
        Network::Compound => Box::new(CompoundParser::new()),
        Network::Cosmos => Box::new(CosmosParser::new()),
        Network::Erc20 => Box::new(Erc20Parser::new()),
        Network::Erc721 => Box::new(Erc721Parser::new()),
    };

    match parser.parse(&raw)? {
        ParseOutcome::Event(normalized) => {
            println!("{}", serde_json::to_string_pretty(&normalized)?);
            Ok(())
        }
        ParseOutcome::Unknown => {
            bail!("unrecognized event '{}' for network {network}", raw.name)
        }
    }
}
