use soroban_sdk::{contracterror, contracttype, Address, String};

// Storage keys for instance data
#[derive(Clone)]
#[contracttype]
pub enum DataKey {
    Config,
    NextCampaignId,
    TotalCampaigns,
}

// Storage keys for persistent data
#[derive(Clone)]
#[contracttype]
pub enum PersistentKey {
    Campaign(CampaignId),
    Milestone(CampaignId, MilestoneOrdinal),
    Donation(CampaignId, Address),
    Vote(CampaignId, MilestoneOrdinal, Address),
}

pub type CampaignId = u64;
pub type MilestoneOrdinal = u32;

// Hub-wide configuration, written once at initialization
#[derive(Clone)]
#[contracttype]
pub struct LedgerConfig {
    pub registry: Address,
    pub voting_token: Address,
    pub funding_token: Address,
    // Policy switch: a milestone whose window elapsed with zero cast votes
    // counts as approved when set.
    pub approve_on_silence: bool,
}

// Campaign lifecycle
#[derive(Clone, Debug, PartialEq)]
#[contracttype]
pub enum CampaignStatus {
    Active,
    Ended,
}

// One campaign instance. The four flow counters satisfy
// balance + released_to_owner + refunded_to_donors + tax_paid == total_donated.
#[derive(Clone, Debug, PartialEq)]
#[contracttype]
pub struct Campaign {
    pub id: CampaignId,
    pub owner: Address,
    pub content_ref: String,
    pub category: String,
    pub title: String,
    pub goal: i128,
    pub deadline: u64,
    pub status: CampaignStatus,
    pub created_at: u64,
    pub balance: i128,
    pub total_donated: i128,
    pub released_to_owner: i128,
    pub refunded_to_donors: i128,
    pub tax_paid: i128,
    pub milestone_count: MilestoneOrdinal,
    pub withdrawn_count: MilestoneOrdinal,
    pub approved_count: MilestoneOrdinal,
}

// Owner-declared progress checkpoint; the voting deadline is fixed at creation
#[derive(Clone)]
#[contracttype]
pub struct Milestone {
    pub ordinal: MilestoneOrdinal,
    pub content_ref: String,
    pub created_at: u64,
    pub voting_deadline: u64,
    pub votes_for: i128,
    pub votes_against: i128,
    pub voter_count: u32,
    pub withdrawn: bool,
}

#[derive(Clone)]
#[contracttype]
pub struct DonationRecord {
    pub principal: i128,
}

#[derive(Clone)]
#[contracttype]
pub struct VoteRecord {
    pub support: bool,
    pub weight: i128,
}

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum CampaignError {
    AlreadyInitialized = 1,
    NotInitialized = 2,
    CampaignNotFound = 3,
    MilestoneNotFound = 4,
    NotOwner = 5,
    NotEligible = 6,
    CampaignEnded = 7,
    InvalidAmount = 8,
    MilestoneLimitReached = 9,
    AlreadyVoted = 10,
    VotingClosed = 11,
    NoWithdrawableMilestone = 12,
    WithdrawalWindowClosed = 13,
    NoDonationFound = 14,
    DurationNotIncreased = 15,
    ReentrancyDetected = 16,
    InsufficientBalance = 17,
}

// Constants
pub const MAX_MILESTONES: MilestoneOrdinal = 3;
pub const MILESTONE_VOTING_PERIOD: u64 = 14 * 86400; // 14 days
pub const BASIS_POINTS: i128 = 10_000;
pub const WITHDRAWAL_TAX_BPS: i128 = 1_000; // 10%
pub const TTL_INSTANCE: u32 = 17280 * 30; // 30 days
pub const TTL_PERSISTENT: u32 = 17280 * 90; // 90 days
