use soroban_sdk::{contracterror, contracttype, Address};

// Storage keys for instance data
#[derive(Clone)]
#[contracttype]
pub enum DataKey {
    Admin,
    Capacity,
    TotalIssued,
}

// Storage keys for persistent data
#[derive(Clone)]
#[contracttype]
pub enum PersistentKey {
    Balance(Address),
    Issuer(Address),
    Allowance(Address, Address), // (Holder, Spender)
}

// Allowance amount plus the ledger it expires at
#[derive(Clone)]
#[contracttype]
pub struct AllowanceValue {
    pub amount: i128,
    pub expiration_ledger: u32,
}

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum TokenError {
    AlreadyInitialized = 1,
    NotInitialized = 2,
    NotIssuer = 3,
    InvalidAmount = 4,
    CapacityExceeded = 5,
    InsufficientBalance = 6,
    InvalidExpiration = 7,
}

// Constants
pub const TTL_INSTANCE: u32 = 17280 * 30; // 30 days
pub const TTL_PERSISTENT: u32 = 17280 * 90; // 90 days
