#![no_std]

mod events;
mod guard;
mod storage_types;


use guard::ReentrancyGuard;
pub use storage_types::{
    Campaign, CampaignError, CampaignId, CampaignStatus, Milestone, MilestoneOrdinal, VoteRecord,
};
use storage_types::{
    DataKey, DonationRecord, LedgerConfig, PersistentKey, BASIS_POINTS, MAX_MILESTONES,
    MILESTONE_VOTING_PERIOD, TTL_INSTANCE, TTL_PERSISTENT, WITHDRAWAL_TAX_BPS,
};

use soroban_sdk::{contract, contractimpl, panic_with_error, token, Address, Env, String};

#[cfg(target_arch = "wasm32")]
mod voting_token_import {
    soroban_sdk::contractimport!(
        file = "../../target/wasm32-unknown-unknown/release/voting_token.wasm"
    );
    pub use Client as VotingTokenClient;
}

#[cfg(target_arch = "wasm32")]
use voting_token_import::VotingTokenClient;

#[cfg(not(target_arch = "wasm32"))]
use voting_token::VotingTokenClient;

/// Milestone-gated crowdfunding escrow ledger.
///
/// One deployed hub holds every campaign as an isolated record keyed by
/// `CampaignId`. Records are created only through the registry (the factory
/// path); donors fund campaigns in the configured funding token and receive
/// voting weight one-to-one from the voting token; the owner unlocks funds
/// milestone by milestone against donor votes; donors may exit early at a
/// tax, paid to the registry treasury.
#[contract]
pub struct CampaignContract;

#[contractimpl]
impl CampaignContract {
    /// One-time binding of the hub to its registry and token addresses.
    pub fn initialize(
        e: Env,
        registry: Address,
        voting_token: Address,
        funding_token: Address,
        approve_on_silence: bool,
    ) {
        if e.storage().instance().has(&DataKey::Config) {
            panic_with_error!(&e, CampaignError::AlreadyInitialized);
        }

        let config = LedgerConfig {
            registry,
            voting_token,
            funding_token,
            approve_on_silence,
        };
        e.storage().instance().set(&DataKey::Config, &config);
        e.storage().instance().set(&DataKey::NextCampaignId, &1u64);
        e.storage().instance().set(&DataKey::TotalCampaigns, &0u64);

        extend_instance(&e);
    }

    /// Create a campaign record. Only the registry may take this path;
    /// a direct call cannot carry the registry's authorization.
    pub fn init_campaign(
        e: Env,
        owner: Address,
        content_ref: String,
        category: String,
        title: String,
        goal: i128,
        deadline: u64,
    ) -> CampaignId {
        let config = read_config(&e);
        config.registry.require_auth();

        let campaign_id: CampaignId = e.storage().instance().get(&DataKey::NextCampaignId).unwrap();

        let campaign = Campaign {
            id: campaign_id,
            owner,
            content_ref,
            category,
            title,
            goal,
            deadline,
            status: CampaignStatus::Active,
            created_at: e.ledger().timestamp(),
            balance: 0,
            total_donated: 0,
            released_to_owner: 0,
            refunded_to_donors: 0,
            tax_paid: 0,
            milestone_count: 0,
            withdrawn_count: 0,
            approved_count: 0,
        };
        write_campaign(&e, &campaign);

        e.storage().instance().set(&DataKey::NextCampaignId, &(campaign_id + 1));
        let total: u64 = e.storage().instance().get(&DataKey::TotalCampaigns).unwrap();
        e.storage().instance().set(&DataKey::TotalCampaigns, &(total + 1));
        extend_instance(&e);

        campaign_id
    }

    /// Deposit funds into an active campaign and receive voting weight.
    pub fn donate(e: Env, donor: Address, campaign_id: CampaignId, amount: i128) {
        donor.require_auth();
        let config = read_config(&e);
        let _guard = ReentrancyGuard::acquire(&e, campaign_id);

        let mut campaign = read_campaign(&e, campaign_id);
        if !accepts_donations(&e, &campaign) {
            panic_with_error!(&e, CampaignError::CampaignEnded);
        }
        if amount <= 0 {
            panic_with_error!(&e, CampaignError::InvalidAmount);
        }

        // Effects before interactions
        let donation_key = PersistentKey::Donation(campaign_id, donor.clone());
        let mut record: DonationRecord = e
            .storage()
            .persistent()
            .get(&donation_key)
            .unwrap_or(DonationRecord { principal: 0 });
        record.principal += amount;
        e.storage().persistent().set(&donation_key, &record);
        extend_persistent(&e, &donation_key);

        campaign.balance += amount;
        campaign.total_donated += amount;
        write_campaign(&e, &campaign);

        let funding = token::Client::new(&e, &config.funding_token);
        funding.transfer(&donor, &e.current_contract_address(), &amount);

        // A mint past the voting-token capacity aborts the whole donation
        let voting = VotingTokenClient::new(&e, &config.voting_token);
        voting.mint(&e.current_contract_address(), &donor, &amount);

        events::emit_donation_received(
            &e,
            events::DonationReceivedEvent {
                campaign_id,
                donor,
                amount,
            },
        );
    }

    /// Append a milestone with a fixed 14-day voting window.
    pub fn create_milestone(
        e: Env,
        caller: Address,
        campaign_id: CampaignId,
        content_ref: String,
    ) -> MilestoneOrdinal {
        caller.require_auth();
        require_initialized(&e);

        let mut campaign = read_campaign(&e, campaign_id);
        if caller != campaign.owner {
            panic_with_error!(&e, CampaignError::NotOwner);
        }
        if campaign.milestone_count >= MAX_MILESTONES {
            panic_with_error!(&e, CampaignError::MilestoneLimitReached);
        }

        let ordinal = campaign.milestone_count + 1;
        let now = e.ledger().timestamp();
        let milestone = Milestone {
            ordinal,
            content_ref,
            created_at: now,
            voting_deadline: now + MILESTONE_VOTING_PERIOD,
            votes_for: 0,
            votes_against: 0,
            voter_count: 0,
            withdrawn: false,
        };
        write_milestone(&e, campaign_id, &milestone);

        campaign.milestone_count = ordinal;
        write_campaign(&e, &campaign);

        events::emit_milestone_created(
            &e,
            events::MilestoneCreatedEvent {
                campaign_id,
                milestone_ordinal: ordinal,
                voting_deadline: milestone.voting_deadline,
            },
        );

        ordinal
    }

    /// Cast a weighted vote; weight is the voter's current token balance.
    pub fn vote_on_milestone(
        e: Env,
        voter: Address,
        campaign_id: CampaignId,
        milestone_ordinal: MilestoneOrdinal,
        approve: bool,
    ) {
        voter.require_auth();
        let config = read_config(&e);

        let campaign = read_campaign(&e, campaign_id);
        if milestone_ordinal == 0 || milestone_ordinal > campaign.milestone_count {
            panic_with_error!(&e, CampaignError::MilestoneNotFound);
        }
        let mut milestone = read_milestone(&e, campaign_id, milestone_ordinal);

        let principal = read_donation(&e, campaign_id, &voter);
        let weight = VotingTokenClient::new(&e, &config.voting_token).balance(&voter);
        if principal <= 0 || weight <= 0 {
            panic_with_error!(&e, CampaignError::NotEligible);
        }
        if e.ledger().timestamp() > milestone.voting_deadline {
            panic_with_error!(&e, CampaignError::VotingClosed);
        }

        let vote_key = PersistentKey::Vote(campaign_id, milestone_ordinal, voter.clone());
        if e.storage().persistent().has(&vote_key) {
            panic_with_error!(&e, CampaignError::AlreadyVoted);
        }

        if approve {
            milestone.votes_for += weight;
        } else {
            milestone.votes_against += weight;
        }
        milestone.voter_count += 1;
        write_milestone(&e, campaign_id, &milestone);

        let record = VoteRecord {
            support: approve,
            weight,
        };
        e.storage().persistent().set(&vote_key, &record);
        extend_persistent(&e, &vote_key);

        events::emit_vote_cast(
            &e,
            events::VoteCastEvent {
                campaign_id,
                milestone_ordinal,
                voter,
                support: approve,
                weight,
            },
        );
    }

    /// Release the scheduled fraction of remaining funds for the next
    /// milestone in creation order, once its window has elapsed and the
    /// vote passed.
    pub fn withdraw_milestone(e: Env, caller: Address, campaign_id: CampaignId) -> i128 {
        caller.require_auth();
        let config = read_config(&e);
        let _guard = ReentrancyGuard::acquire(&e, campaign_id);

        let mut campaign = read_campaign(&e, campaign_id);
        if caller != campaign.owner {
            panic_with_error!(&e, CampaignError::NotOwner);
        }
        if campaign.withdrawn_count >= campaign.milestone_count {
            panic_with_error!(&e, CampaignError::NoWithdrawableMilestone);
        }

        let ordinal = campaign.withdrawn_count + 1;
        let mut milestone = read_milestone(&e, campaign_id, ordinal);
        let now = e.ledger().timestamp();
        if now <= milestone.voting_deadline && now <= campaign.deadline {
            panic_with_error!(&e, CampaignError::NoWithdrawableMilestone);
        }
        if !milestone_approved(&config, &milestone) {
            panic_with_error!(&e, CampaignError::NoWithdrawableMilestone);
        }

        let (num, den) = release_fraction(ordinal);
        let amount = campaign.balance * num / den;

        // Effects before interactions
        milestone.withdrawn = true;
        write_milestone(&e, campaign_id, &milestone);

        campaign.balance -= amount;
        campaign.released_to_owner += amount;
        campaign.withdrawn_count = ordinal;
        campaign.approved_count += 1;
        write_campaign(&e, &campaign);

        pay_out(&e, &config, &campaign.owner, amount);

        events::emit_milestone_released(
            &e,
            events::MilestoneReleasedEvent {
                campaign_id,
                milestone_ordinal: ordinal,
                approval_pct: approval_pct(&milestone),
                amount,
            },
        );

        amount
    }

    /// Exit early: refund the scheduled fraction of principal minus the
    /// 10% tax, and revoke all voting weight for the full principal.
    pub fn withdraw_donation(e: Env, donor: Address, campaign_id: CampaignId) -> i128 {
        donor.require_auth();
        let config = read_config(&e);
        let _guard = ReentrancyGuard::acquire(&e, campaign_id);

        let mut campaign = read_campaign(&e, campaign_id);
        let principal = read_donation(&e, campaign_id, &donor);
        if principal <= 0 {
            panic_with_error!(&e, CampaignError::NoDonationFound);
        }
        if campaign.approved_count >= MAX_MILESTONES {
            panic_with_error!(&e, CampaignError::WithdrawalWindowClosed);
        }

        let (num, den) = refund_fraction(campaign.approved_count);
        let gross = principal * num / den;
        let tax = gross * WITHDRAWAL_TAX_BPS / BASIS_POINTS;
        let net = gross - tax;

        // The campaign can run dry of refund coverage after the second
        // release; never dip into other campaigns' funds.
        if gross > campaign.balance {
            panic_with_error!(&e, CampaignError::InsufficientBalance);
        }

        // Effects before interactions
        e.storage()
            .persistent()
            .remove(&PersistentKey::Donation(campaign_id, donor.clone()));
        campaign.balance -= gross;
        campaign.refunded_to_donors += net;
        campaign.tax_paid += tax;
        write_campaign(&e, &campaign);

        // Burn the full original principal: all future voting rights lapse
        let voting = VotingTokenClient::new(&e, &config.voting_token);
        voting.burn(&e.current_contract_address(), &donor, &principal);

        pay_out(&e, &config, &config.registry, tax);
        pay_out(&e, &config, &donor, net);

        events::emit_donation_withdrawn(
            &e,
            events::DonationWithdrawnEvent {
                campaign_id,
                donor,
                gross,
                tax,
                net,
            },
        );

        net
    }

    /// Push the campaign deadline out. Strictly increasing only.
    pub fn extend_deadline(e: Env, caller: Address, campaign_id: CampaignId, new_deadline: u64) {
        caller.require_auth();
        require_initialized(&e);

        let mut campaign = read_campaign(&e, campaign_id);
        if caller != campaign.owner {
            panic_with_error!(&e, CampaignError::NotOwner);
        }
        if new_deadline <= campaign.deadline {
            panic_with_error!(&e, CampaignError::DurationNotIncreased);
        }

        campaign.deadline = new_deadline;
        write_campaign(&e, &campaign);
    }

    /// Explicitly end the campaign. Active → Ended is terminal.
    pub fn end_campaign(e: Env, caller: Address, campaign_id: CampaignId) {
        caller.require_auth();
        require_initialized(&e);

        let mut campaign = read_campaign(&e, campaign_id);
        if caller != campaign.owner {
            panic_with_error!(&e, CampaignError::NotOwner);
        }
        if campaign.status == CampaignStatus::Ended {
            panic_with_error!(&e, CampaignError::CampaignEnded);
        }

        campaign.status = CampaignStatus::Ended;
        write_campaign(&e, &campaign);

        events::emit_campaign_ended(
            &e,
            events::CampaignEndedEvent {
                campaign_id,
                total_raised: campaign.total_donated,
                goal_achieved: campaign.total_donated >= campaign.goal,
            },
        );
    }

    /// View functions
    pub fn get_campaign(e: Env, campaign_id: CampaignId) -> Campaign {
        read_campaign(&e, campaign_id)
    }

    pub fn get_milestone(e: Env, campaign_id: CampaignId, milestone_ordinal: MilestoneOrdinal) -> Milestone {
        read_milestone(&e, campaign_id, milestone_ordinal)
    }

    pub fn get_donation(e: Env, campaign_id: CampaignId, donor: Address) -> i128 {
        read_donation(&e, campaign_id, &donor)
    }

    pub fn get_vote(
        e: Env,
        campaign_id: CampaignId,
        milestone_ordinal: MilestoneOrdinal,
        voter: Address,
    ) -> Option<VoteRecord> {
        e.storage()
            .persistent()
            .get(&PersistentKey::Vote(campaign_id, milestone_ordinal, voter))
    }

    pub fn is_active(e: Env, campaign_id: CampaignId) -> bool {
        let campaign = read_campaign(&e, campaign_id);
        accepts_donations(&e, &campaign)
    }

    pub fn campaign_count(e: Env) -> u64 {
        e.storage()
            .instance()
            .get(&DataKey::TotalCampaigns)
            .unwrap_or_else(|| panic_with_error!(&e, CampaignError::NotInitialized))
    }

    pub fn registry(e: Env) -> Address {
        read_config(&e).registry
    }
}

// Helper functions
fn extend_instance(e: &Env) {
    e.storage().instance().extend_ttl(TTL_INSTANCE, TTL_INSTANCE);
}

fn extend_persistent(e: &Env, key: &PersistentKey) {
    e.storage().persistent().extend_ttl(key, TTL_PERSISTENT, TTL_PERSISTENT);
}

fn require_initialized(e: &Env) {
    if !e.storage().instance().has(&DataKey::Config) {
        panic_with_error!(e, CampaignError::NotInitialized);
    }
}

fn read_config(e: &Env) -> LedgerConfig {
    e.storage()
        .instance()
        .get(&DataKey::Config)
        .unwrap_or_else(|| panic_with_error!(e, CampaignError::NotInitialized))
}

fn read_campaign(e: &Env, campaign_id: CampaignId) -> Campaign {
    e.storage()
        .persistent()
        .get(&PersistentKey::Campaign(campaign_id))
        .unwrap_or_else(|| panic_with_error!(e, CampaignError::CampaignNotFound))
}

fn write_campaign(e: &Env, campaign: &Campaign) {
    let key = PersistentKey::Campaign(campaign.id);
    e.storage().persistent().set(&key, campaign);
    extend_persistent(e, &key);
}

fn read_milestone(e: &Env, campaign_id: CampaignId, ordinal: MilestoneOrdinal) -> Milestone {
    e.storage()
        .persistent()
        .get(&PersistentKey::Milestone(campaign_id, ordinal))
        .unwrap_or_else(|| panic_with_error!(e, CampaignError::MilestoneNotFound))
}

fn write_milestone(e: &Env, campaign_id: CampaignId, milestone: &Milestone) {
    let key = PersistentKey::Milestone(campaign_id, milestone.ordinal);
    e.storage().persistent().set(&key, milestone);
    extend_persistent(e, &key);
}

fn read_donation(e: &Env, campaign_id: CampaignId, donor: &Address) -> i128 {
    e.storage()
        .persistent()
        .get::<PersistentKey, DonationRecord>(&PersistentKey::Donation(campaign_id, donor.clone()))
        .map(|record| record.principal)
        .unwrap_or(0)
}

// Past-deadline campaigns reject donations even before the flag is set
fn accepts_donations(e: &Env, campaign: &Campaign) -> bool {
    campaign.status == CampaignStatus::Active && e.ledger().timestamp() <= campaign.deadline
}

// Two-thirds supermajority of cast weight, or the silence policy when
// nothing was cast.
fn milestone_approved(config: &LedgerConfig, milestone: &Milestone) -> bool {
    let total = milestone.votes_for + milestone.votes_against;
    if total == 0 {
        return config.approve_on_silence;
    }
    milestone.votes_for * 3 >= total * 2
}

fn approval_pct(milestone: &Milestone) -> u32 {
    let total = milestone.votes_for + milestone.votes_against;
    if total == 0 {
        return 100;
    }
    ((milestone.votes_for * 100) / total) as u32
}

// Release schedule: 1/3 of remaining funds, then 2/3, then everything
fn release_fraction(ordinal: MilestoneOrdinal) -> (i128, i128) {
    match ordinal {
        1 => (1, 3),
        2 => (2, 3),
        _ => (1, 1),
    }
}

// Refund schedule by approved milestone count
fn refund_fraction(approved_count: MilestoneOrdinal) -> (i128, i128) {
    match approved_count {
        0 => (1, 1),
        1 => (2, 3),
        _ => (1, 3),
    }
}

fn pay_out(e: &Env, config: &LedgerConfig, to: &Address, amount: i128) {
    if amount <= 0 {
        return;
    }
    let funding = token::Client::new(e, &config.funding_token);
    funding.transfer(&e.current_contract_address(), to, &amount);
}
