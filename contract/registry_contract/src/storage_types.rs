use soroban_sdk::{contracterror, contracttype};

#[derive(Clone)]
#[contracttype]
pub enum DataKey {
    Owner,
    VotingToken,
    CampaignContract,
    FundingToken,
    CreationFee,
    Instances,
    Busy,
}

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum RegistryError {
    AlreadyInitialized = 1,
    NotInitialized = 2,
    NotOwner = 3,
    EmptyContentRef = 4,
    InvalidGoal = 5,
    FeeTooSmall = 6,
    InvalidFee = 7,
    NoFundsToWithdraw = 8,
    ReentrancyDetected = 9,
}

// Constants
pub const MAX_CREATION_FEE: i128 = 1_000_000_000; // 100 XLM in stroops
pub const TTL_INSTANCE: u32 = 17280 * 30; // 30 days
pub const TTL_PERSISTENT: u32 = 17280 * 90; // 90 days
