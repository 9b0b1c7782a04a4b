use soroban_sdk::{contracttype, Address, Symbol};

use crate::storage_types::{CampaignId, MilestoneOrdinal};

#[contracttype]
#[derive(Clone)]
pub struct DonationReceivedEvent {
    pub campaign_id: CampaignId,
    pub donor: Address,
    pub amount: i128,
}

#[contracttype]
#[derive(Clone)]
pub struct MilestoneCreatedEvent {
    pub campaign_id: CampaignId,
    pub milestone_ordinal: MilestoneOrdinal,
    pub voting_deadline: u64,
}

#[contracttype]
#[derive(Clone)]
pub struct VoteCastEvent {
    pub campaign_id: CampaignId,
    pub milestone_ordinal: MilestoneOrdinal,
    pub voter: Address,
    pub support: bool,
    pub weight: i128,
}

#[contracttype]
#[derive(Clone)]
pub struct MilestoneReleasedEvent {
    pub campaign_id: CampaignId,
    pub milestone_ordinal: MilestoneOrdinal,
    pub approval_pct: u32,
    pub amount: i128,
}

#[contracttype]
#[derive(Clone)]
pub struct DonationWithdrawnEvent {
    pub campaign_id: CampaignId,
    pub donor: Address,
    pub gross: i128,
    pub tax: i128,
    pub net: i128,
}

#[contracttype]
#[derive(Clone)]
pub struct CampaignEndedEvent {
    pub campaign_id: CampaignId,
    pub total_raised: i128,
    pub goal_achieved: bool,
}

pub fn emit_donation_received(env: &soroban_sdk::Env, event: DonationReceivedEvent) {
    env.events().publish(
        (Symbol::new(env, "donation_received"),),
        event,
    );
}

pub fn emit_milestone_created(env: &soroban_sdk::Env, event: MilestoneCreatedEvent) {
    env.events().publish(
        (Symbol::new(env, "milestone_created"),),
        event,
    );
}

pub fn emit_vote_cast(env: &soroban_sdk::Env, event: VoteCastEvent) {
    env.events().publish(
        (Symbol::new(env, "vote_cast"),),
        event,
    );
}

pub fn emit_milestone_released(env: &soroban_sdk::Env, event: MilestoneReleasedEvent) {
    env.events().publish(
        (Symbol::new(env, "milestone_released"),),
        event,
    );
}

pub fn emit_donation_withdrawn(env: &soroban_sdk::Env, event: DonationWithdrawnEvent) {
    env.events().publish(
        (Symbol::new(env, "donation_withdrawn"),),
        event,
    );
}

pub fn emit_campaign_ended(env: &soroban_sdk::Env, event: CampaignEndedEvent) {
    env.events().publish(
        (Symbol::new(env, "campaign_ended"),),
        event,
    );
}
