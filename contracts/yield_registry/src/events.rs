use soroban_sdk::{contracttype, Address};

#[contracttype]
#[derive(Clone, Debug)]
pub struct CollectionRegisteredEvent {
    pub collection: Address,
    pub deposit_amount: i128,
    pub otc_token: Option<Address>,
    pub otc_price: i128,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct CollectionPrefundedEvent {
    pub collection: Address,
    pub deposit_amount: i128,
    pub collection_size: u32,
    pub baseline_index: i128,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct DepositedEvent {
    pub collection: Address,
    pub depositor: Address,
    pub tokens: u32,
    pub amount: i128,
    pub index: i128,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct OtcDepositedEvent {
    pub collection: Address,
    pub depositor: Address,
    pub tokens: u32,
    pub payment: i128,
    pub index: i128,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct ClaimedEvent {
    pub collection: Address,
    pub claimer: Address,
    pub tokens: u32,
    pub amount: i128,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct UpgradedEvent {
    pub collection: Address,
    pub holder: Address,
    pub tokens: u32,
    pub amount: i128,
    pub target: Address,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct UpgradeAddressSetEvent {
    pub target: Address,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct OtcOracleSetEvent {
    pub oracle: Address,
}
