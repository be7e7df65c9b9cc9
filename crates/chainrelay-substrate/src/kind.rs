//! The closed set of recognized Substrate events.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SubstrateEventKind {
    Slash,
    Reward,
    Bonded,
    Unbonded,
    BalanceTransfer,
    Offence,
    DemocracyProposed,
    DemocracySeconded,
    DemocracyTabled,
    DemocracyStarted,
    DemocracyVoted,
    DemocracyPassed,
    DemocracyNotPassed,
    DemocracyCancelled,
    DemocracyExecuted,
    PreimageNoted,
    PreimageUsed,
    PreimageInvalid,
    PreimageReaped,
    TreasuryProposed,
    TreasuryAwarded,
    TreasuryRejected,
}

impl SubstrateEventKind {
    pub fn as_str(&self) -> &'static str {
        use SubstrateEventKind as K;
        match self {
            K::Slash => "slash",
            K::Reward => "reward",
            K::Bonded => "bonded",
            K::Unbonded => "unbonded",
            K::BalanceTransfer => "balance-transfer",
            K::Offence => "offence",
            K::DemocracyProposed => "democracy-proposed",
            K::DemocracySeconded => "democracy-seconded",
            K::DemocracyTabled => "democracy-tabled",
            K::DemocracyStarted => "democracy-started",
            K::DemocracyVoted => "democracy-voted",
            K::DemocracyPassed => "democracy-passed",
            K::DemocracyNotPassed => "democracy-not-passed",
            K::DemocracyCancelled => "democracy-cancelled",
            K::DemocracyExecuted => "democracy-executed",
            K::PreimageNoted => "preimage-noted",
            K::PreimageUsed => "preimage-used",
            K::PreimageInvalid => "preimage-invalid",
            K::PreimageReaped => "preimage-reaped",
            K::TreasuryProposed => "treasury-proposed",
            K::TreasuryAwarded => "treasury-awarded",
            K::TreasuryRejected => "treasury-rejected",
        }
    }

    /// Map a `section.Method` raw event name onto the closed set.
    /// Newer runtimes renamed a few staking events; both spellings map to
    /// the same kind.
    pub fn from_event_name(name: &str) -> Option<Self> {
        use SubstrateEventKind as K;
        match name {
            "staking.Slash" | "staking.Slashed" => Some(K::Slash),
            "staking.Reward" | "staking.Rewarded" => Some(K::Reward),
            "staking.Bonded" => Some(K::Bonded),
            "staking.Unbonded" => Some(K::Unbonded),
            "balances.Transfer" => Some(K::BalanceTransfer),
            "offences.Offence" => Some(K::Offence),
            "democracy.Proposed" => Some(K::DemocracyProposed),
            "democracy.Seconded" => Some(K::DemocracySeconded),
            "democracy.Tabled" => Some(K::DemocracyTabled),
            "democracy.Started" => Some(K::DemocracyStarted),
            "democracy.Voted" => Some(K::DemocracyVoted),
            "democracy.Passed" => Some(K::DemocracyPassed),
            "democracy.NotPassed" => Some(K::DemocracyNotPassed),
            "democracy.Cancelled" => Some(K::DemocracyCancelled),
            "democracy.Executed" => Some(K::DemocracyExecuted),
            "democracy.PreimageNoted" | "preimage.Noted" => Some(K::PreimageNoted),
            "democracy.PreimageUsed" | "preimage.Used" => Some(K::PreimageUsed),
            "democracy.PreimageInvalid" => Some(K::PreimageInvalid),
            "democracy.PreimageReaped" => Some(K::PreimageReaped),
            "treasury.Proposed" => Some(K::TreasuryProposed),
            "treasury.Awarded" => Some(K::TreasuryAwarded),
            "treasury.Rejected" => Some(K::TreasuryRejected),
            _ => None,
        }
    }
}
