use soroban_sdk::{contracttype, Address, Env};

// Constants
pub const INDEX_SCALE: i128 = 1_000_000_000; // rebase index fixed-point, 1.0 == 1e9

/// Registration terms for one NFT collection.
///
/// Terms are freely rewritable until the first deposit lands; after that
/// `has_deposits` freezes `deposit_amount`, `otc_token` and `otc_price`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CollectionTerms {
    /// Deposit-token units backing each token of the collection
    pub deposit_amount: i128,
    /// Payment token for the OTC purchase path; `None` disables OTC deposits
    pub otc_token: Option<Address>,
    /// Unit price per token in `otc_token` units (0 when OTC is disabled)
    pub otc_price: i128,
    /// Rebase index at bulk pre-funding (0 for incremental collections)
    pub baseline_index: i128,
    /// Pre-funded token id range `1..=collection_size` (0 when incremental)
    pub collection_size: u32,
    /// Set once any capital is committed; freezes the terms above
    pub has_deposits: bool,
}

/// Accrual record for one (collection, token id) pair.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Position {
    /// Rebase index at the most recent deposit or claim
    pub deposited_index: i128,
    /// Terminal: capital has moved to the successor contract
    pub upgraded: bool,
}

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Initialized,
    Admin,
    DepositToken,
    RewardToken,
    StakingOracle,
    OtcOracle,
    UpgradeTarget,
    Collection(Address),
    Position(Address, u32), // (collection, token_id)
}

pub fn get_collection(env: &Env, collection: &Address) -> Option<CollectionTerms> {
    env.storage()
        .persistent()
        .get(&DataKey::Collection(collection.clone()))
}

pub fn set_collection(env: &Env, collection: &Address, terms: &CollectionTerms) {
    env.storage()
        .persistent()
        .set(&DataKey::Collection(collection.clone()), terms);
}

pub fn get_position(env: &Env, collection: &Address, token_id: u32) -> Option<Position> {
    env.storage()
        .persistent()
        .get(&DataKey::Position(collection.clone(), token_id))
}

pub fn set_position(env: &Env, collection: &Address, token_id: u32, position: &Position) {
    env.storage()
        .persistent()
        .set(&DataKey::Position(collection.clone(), token_id), position);
}

/// The live accrual record for a token: its explicit record if one was
/// written, otherwise the implicit record a bulk pre-funded range carries at
/// the collection baseline. `None` means no capital backs this token.
pub fn live_position(
    env: &Env,
    collection: &Address,
    terms: &CollectionTerms,
    token_id: u32,
) -> Option<Position> {
    if let Some(position) = get_position(env, collection, token_id) {
        return Some(position);
    }
    if terms.collection_size > 0 && token_id >= 1 && token_id <= terms.collection_size {
        return Some(Position {
            deposited_index: terms.baseline_index,
            upgraded: false,
        });
    }
    None
}
