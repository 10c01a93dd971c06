#![no_std]

mod accrual;
mod error;
mod events;
mod oracle;
mod storage;


use accrual::accrued_yield;
use error::Error;
use events::*;
use storage::{CollectionTerms, DataKey, Position};

use soroban_sdk::{contract, contractimpl, token, Address, Env, Map, Symbol, Vec};

#[contract]
pub struct YieldRegistry;

#[contractimpl]
impl YieldRegistry {
    // ============================================
    // INITIALIZATION & ADMIN
    // ============================================

    /// Wire the registry to its collaborators
    ///
    /// # Errors
    /// - `AlreadyInitialized`: Contract already initialized
    pub fn initialize(
        env: Env,
        admin: Address,
        deposit_token: Address,
        reward_token: Address,
        staking: Address,
    ) -> Result<(), Error> {
        if env.storage().instance().has(&DataKey::Initialized) {
            return Err(Error::AlreadyInitialized);
        }

        admin.require_auth();

        env.storage().instance().set(&DataKey::Initialized, &true);
        env.storage().instance().set(&DataKey::Admin, &admin);
        env.storage()
            .instance()
            .set(&DataKey::DepositToken, &deposit_token);
        env.storage()
            .instance()
            .set(&DataKey::RewardToken, &reward_token);
        env.storage()
            .instance()
            .set(&DataKey::StakingOracle, &staking);

        Ok(())
    }

    /// Point the registry at the OTC oracle used to validate OTC terms.
    /// May be called again by the admin to replace an earlier oracle.
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `Unauthorized`: Caller is not admin
    pub fn set_otc_oracle(env: Env, oracle: Address) -> Result<(), Error> {
        let admin: Address = env
            .storage()
            .instance()
            .get(&DataKey::Admin)
            .ok_or(Error::NotInitialized)?;
        admin.require_auth();

        env.storage().instance().set(&DataKey::OtcOracle, &oracle);

        env.events().publish(
            (Symbol::new(&env, "otc_oracle_set"),),
            OtcOracleSetEvent { oracle },
        );

        Ok(())
    }

    /// Set the successor contract that `upgrade` routes capital to.
    /// Overwriting an earlier destination is allowed.
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `Unauthorized`: Caller is not admin
    pub fn set_upgrade_address(env: Env, target: Address) -> Result<(), Error> {
        let admin: Address = env
            .storage()
            .instance()
            .get(&DataKey::Admin)
            .ok_or(Error::NotInitialized)?;
        admin.require_auth();

        env.storage()
            .instance()
            .set(&DataKey::UpgradeTarget, &target);

        env.events().publish(
            (Symbol::new(&env, "upgrade_set"),),
            UpgradeAddressSetEvent { target },
        );

        Ok(())
    }

    // ============================================
    // COLLECTION REGISTRATION
    // ============================================

    /// Register a collection for direct deposits
    ///
    /// Re-registration overwrites the terms (and clears any OTC terms) as
    /// long as no deposit has been made yet.
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `Unauthorized`: Caller is not the collection owner
    /// - `InvalidAmount`: deposit_amount must be positive
    /// - `Immutable`: Deposits exist, terms are frozen
    pub fn register_collection(
        env: Env,
        caller: Address,
        collection: Address,
        deposit_amount: i128,
    ) -> Result<(), Error> {
        Self::require_initialized(&env)?;
        caller.require_auth();

        if !oracle::is_collection_owner(&env, &caller, &collection) {
            return Err(Error::Unauthorized);
        }
        if deposit_amount <= 0 {
            return Err(Error::InvalidAmount);
        }
        if let Some(existing) = storage::get_collection(&env, &collection) {
            if existing.has_deposits {
                return Err(Error::Immutable);
            }
        }

        let terms = CollectionTerms {
            deposit_amount,
            otc_token: None,
            otc_price: 0,
            baseline_index: 0,
            collection_size: 0,
            has_deposits: false,
        };
        storage::set_collection(&env, &collection, &terms);

        env.events().publish(
            (Symbol::new(&env, "registered"), collection.clone()),
            CollectionRegisteredEvent {
                collection,
                deposit_amount,
                otc_token: None,
                otc_price: 0,
            },
        );

        Ok(())
    }

    /// Register a collection with an OTC purchase path
    ///
    /// The supplied terms must match the OTC oracle's record exactly; the
    /// oracle is the authority on what a collection's OTC sale looks like.
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `Unauthorized`: Caller is not the collection owner
    /// - `InvalidAmount`: deposit_amount must be positive
    /// - `InvalidPrice`: otc_price must be positive
    /// - `Immutable`: Deposits exist, terms are frozen
    /// - `OtcMismatch`: Terms differ from the OTC oracle's record
    pub fn register_collection_with_otc(
        env: Env,
        caller: Address,
        collection: Address,
        otc_token: Address,
        otc_price: i128,
        deposit_amount: i128,
    ) -> Result<(), Error> {
        Self::require_initialized(&env)?;
        caller.require_auth();

        if !oracle::is_collection_owner(&env, &caller, &collection) {
            return Err(Error::Unauthorized);
        }
        if deposit_amount <= 0 {
            return Err(Error::InvalidAmount);
        }
        if otc_price <= 0 {
            return Err(Error::InvalidPrice);
        }
        if let Some(existing) = storage::get_collection(&env, &collection) {
            if existing.has_deposits {
                return Err(Error::Immutable);
            }
        }
        Self::validate_otc_terms(&env, &collection, &otc_token, otc_price)?;

        let terms = CollectionTerms {
            deposit_amount,
            otc_token: Some(otc_token.clone()),
            otc_price,
            baseline_index: 0,
            collection_size: 0,
            has_deposits: false,
        };
        storage::set_collection(&env, &collection, &terms);

        env.events().publish(
            (Symbol::new(&env, "registered"), collection.clone()),
            CollectionRegisteredEvent {
                collection,
                deposit_amount,
                otc_token: Some(otc_token),
                otc_price,
            },
        );

        Ok(())
    }

    /// Register a collection and pre-fund every token id in
    /// `1..=collection_size` in one shot
    ///
    /// Pulls `deposit_amount × collection_size` deposit-token units from the
    /// caller and records the current rebase index as the accrual baseline
    /// for the whole range. Unlike `register_collection`, this path cannot
    /// be repeated or re-registered over.
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `Unauthorized`: Caller is not the collection owner
    /// - `InvalidAmount`: deposit_amount must be positive
    /// - `InvalidSize`: collection_size must be positive
    /// - `AlreadyRegistered`: Collection already has an entry
    pub fn register_collection_and_deposit(
        env: Env,
        caller: Address,
        collection: Address,
        deposit_amount: i128,
        collection_size: u32,
    ) -> Result<(), Error> {
        Self::require_initialized(&env)?;
        caller.require_auth();

        if !oracle::is_collection_owner(&env, &caller, &collection) {
            return Err(Error::Unauthorized);
        }
        if deposit_amount <= 0 {
            return Err(Error::InvalidAmount);
        }
        if collection_size == 0 {
            return Err(Error::InvalidSize);
        }
        if storage::get_collection(&env, &collection).is_some() {
            return Err(Error::AlreadyRegistered);
        }

        let total = deposit_amount
            .checked_mul(collection_size as i128)
            .ok_or(Error::InvalidAmount)?;

        let deposit_token: Address = env
            .storage()
            .instance()
            .get(&DataKey::DepositToken)
            .ok_or(Error::NotInitialized)?;
        token::Client::new(&env, &deposit_token).transfer(
            &caller,
            &env.current_contract_address(),
            &total,
        );

        let baseline_index = Self::staking_index(&env)?;
        let terms = CollectionTerms {
            deposit_amount,
            otc_token: None,
            otc_price: 0,
            baseline_index,
            collection_size,
            has_deposits: true,
        };
        storage::set_collection(&env, &collection, &terms);

        env.events().publish(
            (Symbol::new(&env, "prefunded"), collection.clone()),
            CollectionPrefundedEvent {
                collection,
                deposit_amount,
                collection_size,
                baseline_index,
            },
        );

        Ok(())
    }

    /// One-shot OTC variant of `register_collection_and_deposit`
    ///
    /// The pre-funding is paid in the OTC payment token instead of the
    /// deposit token: the caller authorizes `payment` and the registry pulls
    /// exactly `otc_price × collection_size`. OTC terms are validated against
    /// the oracle before any funds move.
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `Unauthorized`: Caller is not the collection owner
    /// - `InvalidAmount`: deposit_amount must be positive
    /// - `InvalidSize`: collection_size must be positive
    /// - `InvalidPrice`: otc_price must be positive
    /// - `AlreadyRegistered`: Collection already has an entry
    /// - `OtcMismatch`: Terms differ from the OTC oracle's record
    /// - `InsufficientOtcFunds`: payment below price × collection_size
    pub fn register_collection_and_deposit_with_otc(
        env: Env,
        caller: Address,
        collection: Address,
        deposit_amount: i128,
        collection_size: u32,
        otc_token: Address,
        otc_price: i128,
        payment: i128,
    ) -> Result<(), Error> {
        Self::require_initialized(&env)?;
        caller.require_auth();

        if !oracle::is_collection_owner(&env, &caller, &collection) {
            return Err(Error::Unauthorized);
        }
        if deposit_amount <= 0 {
            return Err(Error::InvalidAmount);
        }
        if collection_size == 0 {
            return Err(Error::InvalidSize);
        }
        if otc_price <= 0 {
            return Err(Error::InvalidPrice);
        }
        if storage::get_collection(&env, &collection).is_some() {
            return Err(Error::AlreadyRegistered);
        }
        Self::validate_otc_terms(&env, &collection, &otc_token, otc_price)?;

        let required = otc_price
            .checked_mul(collection_size as i128)
            .ok_or(Error::InvalidPrice)?;
        if payment < required {
            return Err(Error::InsufficientOtcFunds);
        }
        token::Client::new(&env, &otc_token).transfer(
            &caller,
            &env.current_contract_address(),
            &required,
        );

        let baseline_index = Self::staking_index(&env)?;
        let terms = CollectionTerms {
            deposit_amount,
            otc_token: Some(otc_token.clone()),
            otc_price,
            baseline_index,
            collection_size,
            has_deposits: true,
        };
        storage::set_collection(&env, &collection, &terms);

        env.events().publish(
            (Symbol::new(&env, "prefunded"), collection.clone()),
            CollectionPrefundedEvent {
                collection,
                deposit_amount,
                collection_size,
                baseline_index,
            },
        );

        Ok(())
    }

    // ============================================
    // DEPOSITS
    // ============================================

    /// Deposit the collection's required amount for each listed token
    ///
    /// All-or-nothing across `token_ids`: one bad id fails the whole batch.
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `CollectionNotRegistered`: No entry for this collection
    /// - `NonexistentToken`: A token id the collection cannot resolve
    /// - `NotOwner`: A token the caller does not hold
    /// - `SomeAlreadyUpgraded`: A token whose position was migrated
    /// - `AlreadyDeposited`: A token that already holds a deposit
    pub fn deposit(
        env: Env,
        caller: Address,
        collection: Address,
        token_ids: Vec<u32>,
    ) -> Result<(), Error> {
        Self::require_initialized(&env)?;
        caller.require_auth();

        let mut terms = storage::get_collection(&env, &collection)
            .ok_or(Error::CollectionNotRegistered)?;
        Self::validate_new_positions(&env, &caller, &collection, &terms, &token_ids)?;

        let total = terms
            .deposit_amount
            .checked_mul(token_ids.len() as i128)
            .ok_or(Error::InvalidAmount)?;
        if total > 0 {
            let deposit_token: Address = env
                .storage()
                .instance()
                .get(&DataKey::DepositToken)
                .ok_or(Error::NotInitialized)?;
            token::Client::new(&env, &deposit_token).transfer(
                &caller,
                &env.current_contract_address(),
                &total,
            );
        }

        let index = Self::staking_index(&env)?;
        for token_id in token_ids.iter() {
            storage::set_position(
                &env,
                &collection,
                token_id,
                &Position {
                    deposited_index: index,
                    upgraded: false,
                },
            );
        }
        if !terms.has_deposits && !token_ids.is_empty() {
            terms.has_deposits = true;
            storage::set_collection(&env, &collection, &terms);
        }

        env.events().publish(
            (Symbol::new(&env, "deposited"), collection.clone()),
            DepositedEvent {
                collection,
                depositor: caller,
                tokens: token_ids.len(),
                amount: total,
                index,
            },
        );

        Ok(())
    }

    /// Deposit for each listed token by paying the collection's OTC price
    /// in the OTC payment token
    ///
    /// `payment` is the amount the caller is putting up; the registry
    /// requires it to cover `otc_price × token count` and pulls exactly that
    /// much. Collections registered without OTC terms cannot use this path.
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `CollectionNotRegistered`: No entry, or no OTC terms registered
    /// - `NonexistentToken`: A token id the collection cannot resolve
    /// - `NotOwner`: A token the caller does not hold
    /// - `SomeAlreadyUpgraded`: A token whose position was migrated
    /// - `AlreadyDeposited`: A token that already holds a deposit
    /// - `InsufficientOtcFunds`: payment below price × token count
    pub fn deposit_with_otc(
        env: Env,
        caller: Address,
        collection: Address,
        token_ids: Vec<u32>,
        payment: i128,
    ) -> Result<(), Error> {
        Self::require_initialized(&env)?;
        caller.require_auth();

        let mut terms = storage::get_collection(&env, &collection)
            .ok_or(Error::CollectionNotRegistered)?;
        let otc_token = terms
            .otc_token
            .clone()
            .ok_or(Error::CollectionNotRegistered)?;
        Self::validate_new_positions(&env, &caller, &collection, &terms, &token_ids)?;

        let required = terms
            .otc_price
            .checked_mul(token_ids.len() as i128)
            .ok_or(Error::InvalidPrice)?;
        if payment < required {
            return Err(Error::InsufficientOtcFunds);
        }
        if required > 0 {
            token::Client::new(&env, &otc_token).transfer(
                &caller,
                &env.current_contract_address(),
                &required,
            );
        }

        let index = Self::staking_index(&env)?;
        for token_id in token_ids.iter() {
            storage::set_position(
                &env,
                &collection,
                token_id,
                &Position {
                    deposited_index: index,
                    upgraded: false,
                },
            );
        }
        if !terms.has_deposits && !token_ids.is_empty() {
            terms.has_deposits = true;
            storage::set_collection(&env, &collection, &terms);
        }

        env.events().publish(
            (Symbol::new(&env, "otc_deposited"), collection.clone()),
            OtcDepositedEvent {
                collection,
                depositor: caller,
                tokens: token_ids.len(),
                payment: required,
                index,
            },
        );

        Ok(())
    }

    // ============================================
    // ACCRUAL & CLAIMS
    // ============================================

    /// Yield claimable by the holder of `token_id` right now
    ///
    /// Never fails: unregistered collections, unknown tokens and migrated
    /// positions all read as 0, so anyone can poll freely.
    pub fn claimable_balance(env: Env, collection: Address, token_id: u32) -> i128 {
        let terms = match storage::get_collection(&env, &collection) {
            Some(terms) => terms,
            None => return 0,
        };
        let position = match storage::live_position(&env, &collection, &terms, token_id) {
            Some(position) => position,
            None => return 0,
        };
        if position.upgraded {
            return 0;
        }
        let staking: Address = match env.storage().instance().get(&DataKey::StakingOracle) {
            Some(staking) => staking,
            None => return 0,
        };

        accrued_yield(
            terms.deposit_amount,
            position.deposited_index,
            oracle::current_index(&env, &staking),
        )
    }

    /// Pay out accrued yield for each listed token and reset its baseline
    /// to the current index
    ///
    /// Idempotent: a second claim with no index growth in between pays 0 and
    /// succeeds. All-or-nothing across `token_ids`; tokens with nothing
    /// deposited contribute 0. Returns the reward amount transferred.
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `CollectionNotRegistered`: No entry for this collection
    /// - `NonexistentToken`: A token id the collection cannot resolve
    /// - `NotOwner`: A token the caller does not hold
    /// - `SomeAlreadyUpgraded`: Batch contains a migrated token
    pub fn claim(
        env: Env,
        caller: Address,
        collection: Address,
        token_ids: Vec<u32>,
    ) -> Result<i128, Error> {
        Self::require_initialized(&env)?;
        caller.require_auth();

        let terms = storage::get_collection(&env, &collection)
            .ok_or(Error::CollectionNotRegistered)?;
        let index = Self::staking_index(&env)?;

        let mut total: i128 = 0;
        let mut settled: Map<u32, Position> = Map::new(&env);
        for token_id in token_ids.iter() {
            let holder = oracle::token_owner(&env, &collection, token_id)?;
            if holder != caller {
                return Err(Error::NotOwner);
            }
            if settled.contains_key(token_id) {
                continue; // repeated id, already settled at the current index
            }
            let position = match storage::live_position(&env, &collection, &terms, token_id) {
                Some(position) => position,
                None => continue, // nothing deposited, nothing to pay
            };
            if position.upgraded {
                return Err(Error::SomeAlreadyUpgraded);
            }

            let amount = accrued_yield(terms.deposit_amount, position.deposited_index, index);
            total = total.checked_add(amount).ok_or(Error::InvalidAmount)?;
            settled.set(
                token_id,
                Position {
                    deposited_index: index,
                    upgraded: false,
                },
            );
        }

        for (token_id, position) in settled.iter() {
            storage::set_position(&env, &collection, token_id, &position);
        }
        if total > 0 {
            let reward_token: Address = env
                .storage()
                .instance()
                .get(&DataKey::RewardToken)
                .ok_or(Error::NotInitialized)?;
            token::Client::new(&env, &reward_token).transfer(
                &env.current_contract_address(),
                &caller,
                &total,
            );
        }

        env.events().publish(
            (Symbol::new(&env, "claimed"), collection.clone()),
            ClaimedEvent {
                collection,
                claimer: caller,
                tokens: token_ids.len(),
                amount: total,
            },
        );

        Ok(total)
    }

    // ============================================
    // MIGRATION
    // ============================================

    /// Move each listed token's deposited capital to the successor contract
    /// and close the position for good
    ///
    /// Only settled positions migrate: any pending yield must be claimed
    /// first. If any listed token already migrated, the whole batch fails.
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `CollectionNotRegistered`: No entry for this collection
    /// - `UpgradeUnavailable`: No destination configured
    /// - `NonexistentToken`: A token id the collection cannot resolve
    /// - `NotOwner`: A token the caller does not hold
    /// - `NothingDeposited`: A token with no capital behind it
    /// - `SomeAlreadyUpgraded`: Batch contains a migrated token
    /// - `MustClaimFirst`: A token still has claimable yield
    pub fn upgrade(
        env: Env,
        caller: Address,
        collection: Address,
        token_ids: Vec<u32>,
    ) -> Result<(), Error> {
        Self::require_initialized(&env)?;
        caller.require_auth();

        let terms = storage::get_collection(&env, &collection)
            .ok_or(Error::CollectionNotRegistered)?;
        let target: Address = env
            .storage()
            .instance()
            .get(&DataKey::UpgradeTarget)
            .ok_or(Error::UpgradeUnavailable)?;
        let index = Self::staking_index(&env)?;

        let mut moved: i128 = 0;
        let mut closed: Map<u32, Position> = Map::new(&env);
        for token_id in token_ids.iter() {
            let holder = oracle::token_owner(&env, &collection, token_id)?;
            if holder != caller {
                return Err(Error::NotOwner);
            }
            if closed.contains_key(token_id) {
                return Err(Error::SomeAlreadyUpgraded);
            }
            let position = storage::live_position(&env, &collection, &terms, token_id)
                .ok_or(Error::NothingDeposited)?;
            if position.upgraded {
                return Err(Error::SomeAlreadyUpgraded);
            }
            if accrued_yield(terms.deposit_amount, position.deposited_index, index) != 0 {
                return Err(Error::MustClaimFirst);
            }

            moved = moved
                .checked_add(terms.deposit_amount)
                .ok_or(Error::InvalidAmount)?;
            closed.set(
                token_id,
                Position {
                    deposited_index: position.deposited_index,
                    upgraded: true,
                },
            );
        }

        for (token_id, position) in closed.iter() {
            storage::set_position(&env, &collection, token_id, &position);
        }
        if moved > 0 {
            let deposit_token: Address = env
                .storage()
                .instance()
                .get(&DataKey::DepositToken)
                .ok_or(Error::NotInitialized)?;
            token::Client::new(&env, &deposit_token).transfer(
                &env.current_contract_address(),
                &target,
                &moved,
            );
        }

        env.events().publish(
            (Symbol::new(&env, "upgraded"), collection.clone()),
            UpgradedEvent {
                collection,
                holder: caller,
                tokens: token_ids.len(),
                amount: moved,
                target,
            },
        );

        Ok(())
    }

    // ============================================
    // VIEW FUNCTIONS
    // ============================================

    /// Whether this token's position has been migrated to the successor
    pub fn upgrade_status(env: Env, collection: Address, token_id: u32) -> bool {
        storage::get_position(&env, &collection, token_id)
            .map(|position| position.upgraded)
            .unwrap_or(false)
    }

    /// Get a collection's registration terms
    pub fn get_collection(env: Env, collection: Address) -> Result<CollectionTerms, Error> {
        storage::get_collection(&env, &collection).ok_or(Error::CollectionNotRegistered)
    }

    /// Get the configured migration destination, if any
    pub fn get_upgrade_address(env: Env) -> Option<Address> {
        env.storage().instance().get(&DataKey::UpgradeTarget)
    }

    // ============================================
    // INTERNAL HELPERS
    // ============================================

    fn require_initialized(env: &Env) -> Result<(), Error> {
        if !env.storage().instance().has(&DataKey::Initialized) {
            return Err(Error::NotInitialized);
        }
        Ok(())
    }

    fn staking_index(env: &Env) -> Result<i128, Error> {
        let staking: Address = env
            .storage()
            .instance()
            .get(&DataKey::StakingOracle)
            .ok_or(Error::NotInitialized)?;
        Ok(oracle::current_index(env, &staking))
    }

    fn validate_otc_terms(
        env: &Env,
        collection: &Address,
        otc_token: &Address,
        otc_price: i128,
    ) -> Result<(), Error> {
        let oracle_addr: Address = env
            .storage()
            .instance()
            .get(&DataKey::OtcOracle)
            .ok_or(Error::OtcMismatch)?;

        match oracle::otc_terms(env, &oracle_addr, collection) {
            Some((token, price)) if token == *otc_token && price == otc_price => Ok(()),
            _ => Err(Error::OtcMismatch),
        }
    }

    /// Check that every id in `token_ids` is held by `caller` and free to
    /// take a fresh deposit. Duplicated ids within the batch count as
    /// already deposited.
    fn validate_new_positions(
        env: &Env,
        caller: &Address,
        collection: &Address,
        terms: &CollectionTerms,
        token_ids: &Vec<u32>,
    ) -> Result<(), Error> {
        let mut seen: Map<u32, bool> = Map::new(env);
        for token_id in token_ids.iter() {
            let holder = oracle::token_owner(env, collection, token_id)?;
            if holder != *caller {
                return Err(Error::NotOwner);
            }
            if seen.contains_key(token_id) {
                return Err(Error::AlreadyDeposited);
            }
            match storage::live_position(env, collection, terms, token_id) {
                Some(position) if position.upgraded => return Err(Error::SomeAlreadyUpgraded),
                Some(_) => return Err(Error::AlreadyDeposited),
                None => {}
            }
            seen.set(token_id, true);
        }
        Ok(())
    }
}
