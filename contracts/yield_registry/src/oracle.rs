use crate::error::Error;

use soroban_sdk::{vec, Address, Env, Symbol};

/// True when `caller` may administer `collection`: either the collection is
/// the caller's own address (a plain wallet used as a collection id), or the
/// collection contract reports the caller as its `owner()`.
pub fn is_collection_owner(env: &Env, caller: &Address, collection: &Address) -> bool {
    if caller == collection {
        return true;
    }

    match env.try_invoke_contract::<Address, soroban_sdk::Error>(
        collection,
        &Symbol::new(env, "owner"),
        vec![env],
    ) {
        Ok(Ok(owner)) => owner == *caller,
        _ => false,
    }
}

/// Resolve the current holder of `token_id`. A collection that cannot answer
/// (token never minted, owner query unsupported) maps to `NonexistentToken`.
pub fn token_owner(env: &Env, collection: &Address, token_id: u32) -> Result<Address, Error> {
    match env.try_invoke_contract::<Address, soroban_sdk::Error>(
        collection,
        &Symbol::new(env, "owner_of"),
        vec![env, token_id.into()],
    ) {
        Ok(Ok(holder)) => Ok(holder),
        _ => Err(Error::NonexistentToken),
    }
}

/// Current value of the staking rebase index, scaled by `INDEX_SCALE`.
pub fn current_index(env: &Env, staking: &Address) -> i128 {
    env.invoke_contract(staking, &Symbol::new(env, "index"), vec![env])
}

/// The OTC oracle's authoritative `(payment_token, unit_price)` record for
/// `collection`, or `None` when the oracle holds no valid record.
pub fn otc_terms(env: &Env, oracle: &Address, collection: &Address) -> Option<(Address, i128)> {
    match env.try_invoke_contract::<(Address, i128), soroban_sdk::Error>(
        oracle,
        &Symbol::new(env, "collection_terms"),
        vec![env, collection.to_val()],
    ) {
        Ok(Ok(terms)) => Some(terms),
        _ => None,
    }
}
