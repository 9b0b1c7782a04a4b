#![no_std]

mod storage_types;


pub use storage_types::RegistryError;
use storage_types::{DataKey, MAX_CREATION_FEE, TTL_INSTANCE, TTL_PERSISTENT};

use soroban_sdk::{
    contract, contractimpl, panic_with_error, token, Address, Env, String, Symbol, Vec,
};

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

#[cfg(target_arch = "wasm32")]
mod campaign_import {
    soroban_sdk::contractimport!(
        file = "../../target/wasm32-unknown-unknown/release/campaign_contract.wasm"
    );
    pub use Client as CampaignContractClient;
}

#[cfg(target_arch = "wasm32")]
use campaign_import::CampaignContractClient;

#[cfg(not(target_arch = "wasm32"))]
use campaign_contract::CampaignContractClient;

/// Campaign factory and fee treasury.
///
/// The registry is the only party able to mint campaign records on the
/// ledger hub, holds exclusive registration rights over the voting token
/// (it initializes the token with itself as admin, permanently), collects
/// creation fees, and receives early-withdrawal taxes.
#[contract]
pub struct CampaignRegistry;

#[contractimpl]
impl CampaignRegistry {
    /// One-time system bootstrap: bind the token and ledger hub to this
    /// registry and register the hub as the sole voting-token issuer.
    pub fn initialize(
        e: Env,
        owner: Address,
        voting_token: Address,
        campaign_contract: Address,
        funding_token: Address,
        token_capacity: i128,
        creation_fee: i128,
        approve_on_silence: bool,
    ) {
        if e.storage().instance().has(&DataKey::Owner) {
            panic_with_error!(&e, RegistryError::AlreadyInitialized);
        }
        validate_fee(&e, creation_fee);

        e.storage().instance().set(&DataKey::Owner, &owner);
        e.storage().instance().set(&DataKey::VotingToken, &voting_token);
        e.storage().instance().set(&DataKey::CampaignContract, &campaign_contract);
        e.storage().instance().set(&DataKey::FundingToken, &funding_token);
        e.storage().instance().set(&DataKey::CreationFee, &creation_fee);
        e.storage().persistent().set(&DataKey::Instances, &Vec::<u64>::new(&e));

        let token = VotingTokenClient::new(&e, &voting_token);
        token.initialize(&e.current_contract_address(), &token_capacity);

        let hub = CampaignContractClient::new(&e, &campaign_contract);
        hub.initialize(
            &e.current_contract_address(),
            &voting_token,
            &funding_token,
            &approve_on_silence,
        );

        token.register_issuer(&campaign_contract);

        extend_instance(&e);
    }

    /// Mint an isolated campaign instance. The paid fee (anything at or
    /// above the configured minimum) goes to the treasury.
    pub fn create_campaign(
        e: Env,
        creator: Address,
        content_ref: String,
        category: String,
        title: String,
        goal: i128,
        duration: u64,
        fee_payment: i128,
    ) -> u64 {
        creator.require_auth();
        require_initialized(&e);
        let _guard = BusyGuard::acquire(&e);

        if content_ref.len() == 0 {
            panic_with_error!(&e, RegistryError::EmptyContentRef);
        }
        if goal <= 0 {
            panic_with_error!(&e, RegistryError::InvalidGoal);
        }
        let creation_fee: i128 = e.storage().instance().get(&DataKey::CreationFee).unwrap();
        if fee_payment < creation_fee {
            panic_with_error!(&e, RegistryError::FeeTooSmall);
        }

        if fee_payment > 0 {
            let funding_token: Address =
                e.storage().instance().get(&DataKey::FundingToken).unwrap();
            let funding = token::Client::new(&e, &funding_token);
            funding.transfer(&creator, &e.current_contract_address(), &fee_payment);
        }

        let deadline = e.ledger().timestamp() + duration;
        let campaign_contract: Address =
            e.storage().instance().get(&DataKey::CampaignContract).unwrap();
        let hub = CampaignContractClient::new(&e, &campaign_contract);
        let campaign_id = hub.init_campaign(&creator, &content_ref, &category, &title, &goal, &deadline);

        let mut instances: Vec<u64> = e
            .storage()
            .persistent()
            .get(&DataKey::Instances)
            .unwrap_or(Vec::new(&e));
        instances.push_back(campaign_id);
        e.storage().persistent().set(&DataKey::Instances, &instances);
        extend_persistent(&e, &DataKey::Instances);
        extend_instance(&e);

        e.events().publish(
            (Symbol::new(&e, "campaign"), Symbol::new(&e, "created")),
            (campaign_id, creator, goal, deadline),
        );

        campaign_id
    }

    /// Owner-only fee adjustment, bounded by the fee cap.
    pub fn set_creation_fee(e: Env, caller: Address, new_fee: i128) {
        caller.require_auth();
        check_owner(&e, &caller);
        validate_fee(&e, new_fee);

        e.storage().instance().set(&DataKey::CreationFee, &new_fee);
        extend_instance(&e);

        e.events().publish(
            (Symbol::new(&e, "fee"), Symbol::new(&e, "updated")),
            new_fee,
        );
    }

    /// Drain the accumulated creation fees and withdrawal taxes to the owner.
    pub fn withdraw_treasury(e: Env, caller: Address) -> i128 {
        caller.require_auth();
        check_owner(&e, &caller);
        let _guard = BusyGuard::acquire(&e);

        let funding_token: Address = e.storage().instance().get(&DataKey::FundingToken).unwrap();
        let funding = token::Client::new(&e, &funding_token);
        let amount = funding.balance(&e.current_contract_address());
        if amount <= 0 {
            panic_with_error!(&e, RegistryError::NoFundsToWithdraw);
        }

        let owner: Address = e.storage().instance().get(&DataKey::Owner).unwrap();
        funding.transfer(&e.current_contract_address(), &owner, &amount);

        e.events().publish(
            (Symbol::new(&e, "treasury"), Symbol::new(&e, "withdrawn")),
            amount,
        );

        amount
    }

    /// View functions
    pub fn owner(e: Env) -> Address {
        e.storage()
            .instance()
            .get(&DataKey::Owner)
            .unwrap_or_else(|| panic_with_error!(&e, RegistryError::NotInitialized))
    }

    pub fn creation_fee(e: Env) -> i128 {
        e.storage()
            .instance()
            .get(&DataKey::CreationFee)
            .unwrap_or_else(|| panic_with_error!(&e, RegistryError::NotInitialized))
    }

    pub fn fee_treasury(e: Env) -> i128 {
        require_initialized(&e);
        let funding_token: Address = e.storage().instance().get(&DataKey::FundingToken).unwrap();
        token::Client::new(&e, &funding_token).balance(&e.current_contract_address())
    }

    pub fn instances(e: Env) -> Vec<u64> {
        e.storage()
            .persistent()
            .get(&DataKey::Instances)
            .unwrap_or(Vec::new(&e))
    }

    pub fn instance_count(e: Env) -> u32 {
        Self::instances(e).len()
    }

    pub fn voting_token(e: Env) -> Address {
        e.storage()
            .instance()
            .get(&DataKey::VotingToken)
            .unwrap_or_else(|| panic_with_error!(&e, RegistryError::NotInitialized))
    }

    pub fn campaign_contract(e: Env) -> Address {
        e.storage()
            .instance()
            .get(&DataKey::CampaignContract)
            .unwrap_or_else(|| panic_with_error!(&e, RegistryError::NotInitialized))
    }

    pub fn funding_token(e: Env) -> Address {
        e.storage()
            .instance()
            .get(&DataKey::FundingToken)
            .unwrap_or_else(|| panic_with_error!(&e, RegistryError::NotInitialized))
    }
}

// Helper functions
fn extend_instance(e: &Env) {
    e.storage().instance().extend_ttl(TTL_INSTANCE, TTL_INSTANCE);
}

fn extend_persistent(e: &Env, key: &DataKey) {
    e.storage().persistent().extend_ttl(key, TTL_PERSISTENT, TTL_PERSISTENT);
}

fn require_initialized(e: &Env) {
    if !e.storage().instance().has(&DataKey::Owner) {
        panic_with_error!(e, RegistryError::NotInitialized);
    }
}

fn check_owner(e: &Env, caller: &Address) {
    let owner: Address = e
        .storage()
        .instance()
        .get(&DataKey::Owner)
        .unwrap_or_else(|| panic_with_error!(e, RegistryError::NotInitialized));
    if *caller != owner {
        panic_with_error!(e, RegistryError::NotOwner);
    }
}

fn validate_fee(e: &Env, fee: i128) {
    if fee < 0 || fee > MAX_CREATION_FEE {
        panic_with_error!(e, RegistryError::InvalidFee);
    }
}

// Scoped non-reentrant lock around the fund-moving registry operations
struct BusyGuard {
    env: Env,
}

impl BusyGuard {
    fn acquire(e: &Env) -> Self {
        if e.storage().temporary().has(&DataKey::Busy) {
            panic_with_error!(e, RegistryError::ReentrancyDetected);
        }
        e.storage().temporary().set(&DataKey::Busy, &true);
        Self { env: e.clone() }
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.env.storage().temporary().remove(&DataKey::Busy);
    }
}
