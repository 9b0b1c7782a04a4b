#![no_std]

mod storage_types;


pub use storage_types::TokenError;
use storage_types::{
    AllowanceValue, DataKey, PersistentKey, TTL_INSTANCE, TTL_PERSISTENT,
};

use soroban_sdk::{
    contract, contractimpl, panic_with_error, Address, Env, Symbol,
};

/// Capped-supply balance ledger backing milestone votes.
///
/// Balances are an accounting signal for voting weight, not a currency:
/// they move only through `mint` and `burn`, both reserved for issuers
/// registered by the admin (the campaign registry). There is no
/// holder-to-holder transfer entry point.
#[contract]
pub struct VotingToken;

#[contractimpl]
impl VotingToken {
    /// One-time setup binding the admin (the registry) and the issuance cap.
    pub fn initialize(e: Env, admin: Address, capacity: i128) {
        if e.storage().instance().has(&DataKey::Admin) {
            panic_with_error!(&e, TokenError::AlreadyInitialized);
        }
        if capacity <= 0 {
            panic_with_error!(&e, TokenError::InvalidAmount);
        }

        e.storage().instance().set(&DataKey::Admin, &admin);
        e.storage().instance().set(&DataKey::Capacity, &capacity);
        e.storage().instance().set(&DataKey::TotalIssued, &0i128);

        extend_instance(&e);
    }

    /// Grant mint/burn rights to a campaign ledger. Admin-only, idempotent.
    pub fn register_issuer(e: Env, issuer: Address) {
        let admin = read_admin(&e);
        admin.require_auth();

        e.storage().persistent().set(&PersistentKey::Issuer(issuer.clone()), &true);
        extend_persistent(&e, &PersistentKey::Issuer(issuer.clone()));
        extend_instance(&e);

        e.events().publish(
            (Symbol::new(&e, "issuer_registered"),),
            issuer,
        );
    }

    /// Revoke mint/burn rights. Admin-only, idempotent.
    pub fn deregister_issuer(e: Env, issuer: Address) {
        let admin = read_admin(&e);
        admin.require_auth();

        e.storage().persistent().remove(&PersistentKey::Issuer(issuer.clone()));

        e.events().publish(
            (Symbol::new(&e, "issuer_deregistered"),),
            issuer,
        );
    }

    /// Credit voting weight to a donor. Caller must be a registered issuer.
    pub fn mint(e: Env, issuer: Address, to: Address, amount: i128) {
        issuer.require_auth();
        check_issuer(&e, &issuer);
        validate_amount(&e, amount);

        let capacity: i128 = e.storage().instance().get(&DataKey::Capacity).unwrap();
        let total_issued: i128 = e.storage().instance().get(&DataKey::TotalIssued).unwrap();
        if total_issued + amount > capacity {
            panic_with_error!(&e, TokenError::CapacityExceeded);
        }

        write_balance(&e, &to, read_balance(&e, &to) + amount);
        e.storage().instance().set(&DataKey::TotalIssued, &(total_issued + amount));
        extend_instance(&e);

        e.events().publish(
            (Symbol::new(&e, "mint"), issuer, to),
            amount,
        );
    }

    /// Revoke voting weight from a donor. Caller must be a registered issuer.
    pub fn burn(e: Env, issuer: Address, from: Address, amount: i128) {
        issuer.require_auth();
        check_issuer(&e, &issuer);
        validate_amount(&e, amount);

        let balance = read_balance(&e, &from);
        if balance < amount {
            panic_with_error!(&e, TokenError::InsufficientBalance);
        }

        write_balance(&e, &from, balance - amount);
        let total_issued: i128 = e.storage().instance().get(&DataKey::TotalIssued).unwrap();
        e.storage().instance().set(&DataKey::TotalIssued, &(total_issued - amount));
        extend_instance(&e);

        e.events().publish(
            (Symbol::new(&e, "burn"), issuer, from),
            amount,
        );
    }

    /// Record a spender allowance. Expired allowances read as zero.
    pub fn approve(e: Env, from: Address, spender: Address, amount: i128, expiration_ledger: u32) {
        from.require_auth();
        require_initialized(&e);

        if amount < 0 {
            panic_with_error!(&e, TokenError::InvalidAmount);
        }
        if amount > 0 && expiration_ledger < e.ledger().sequence() {
            panic_with_error!(&e, TokenError::InvalidExpiration);
        }

        let key = PersistentKey::Allowance(from.clone(), spender.clone());
        let value = AllowanceValue { amount, expiration_ledger };
        e.storage().persistent().set(&key, &value);
        extend_persistent(&e, &key);

        e.events().publish(
            (Symbol::new(&e, "approve"), from, spender),
            (amount, expiration_ledger),
        );
    }

    pub fn allowance(e: Env, from: Address, spender: Address) -> i128 {
        match e
            .storage()
            .persistent()
            .get::<PersistentKey, AllowanceValue>(&PersistentKey::Allowance(from, spender))
        {
            Some(value) if value.expiration_ledger >= e.ledger().sequence() => value.amount,
            _ => 0,
        }
    }

    pub fn balance(e: Env, id: Address) -> i128 {
        read_balance(&e, &id)
    }

    pub fn total_issued(e: Env) -> i128 {
        e.storage()
            .instance()
            .get(&DataKey::TotalIssued)
            .unwrap_or_else(|| panic_with_error!(&e, TokenError::NotInitialized))
    }

    pub fn capacity(e: Env) -> i128 {
        e.storage()
            .instance()
            .get(&DataKey::Capacity)
            .unwrap_or_else(|| panic_with_error!(&e, TokenError::NotInitialized))
    }

    pub fn is_issuer(e: Env, addr: Address) -> bool {
        e.storage().persistent().has(&PersistentKey::Issuer(addr))
    }

    pub fn admin(e: Env) -> Address {
        read_admin(&e)
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
    if !e.storage().instance().has(&DataKey::Admin) {
        panic_with_error!(e, TokenError::NotInitialized);
    }
}

fn read_admin(e: &Env) -> Address {
    e.storage()
        .instance()
        .get(&DataKey::Admin)
        .unwrap_or_else(|| panic_with_error!(e, TokenError::NotInitialized))
}

fn check_issuer(e: &Env, issuer: &Address) {
    require_initialized(e);
    if !e.storage().persistent().has(&PersistentKey::Issuer(issuer.clone())) {
        panic_with_error!(e, TokenError::NotIssuer);
    }
}

fn validate_amount(e: &Env, amount: i128) {
    if amount <= 0 {
        panic_with_error!(e, TokenError::InvalidAmount);
    }
}

fn read_balance(e: &Env, addr: &Address) -> i128 {
    e.storage()
        .persistent()
        .get(&PersistentKey::Balance(addr.clone()))
        .unwrap_or(0)
}

fn write_balance(e: &Env, addr: &Address, amount: i128) {
    let key = PersistentKey::Balance(addr.clone());
    e.storage().persistent().set(&key, &amount);
    extend_persistent(e, &key);
}
