#![no_std]

pub mod authorization;
pub mod bonus;
pub mod events;
pub mod pause;
pub mod rewards;
pub mod slots;

use soroban_sdk::{
    contract, contractimpl, contracttype, log, symbol_short, token, Address, BytesN, Env, Symbol,
    Vec,
};

use authorization::{AuthSignature, DepositAuthorization, Ed25519Authorizer, WithdrawAuthorization};
use bonus::{BonusTable, ThresholdTier, TimelockTier};
use events::{DepositEvent, WithdrawEvent};
use rewards::RewardState;
use slots::{SlotState, StakeSlot, MAX_SLOTS, UNLOCKED_SLOT};

// ── Storage key constants ────────────────────────────────────────────────────

const CONTROLLER: Symbol = symbol_short!("CTRL");
const PENDING_CONTROLLER: Symbol = symbol_short!("PEND_CTL");
const INITIALIZED: Symbol = symbol_short!("INIT");
const STAKE_TOKEN: Symbol = symbol_short!("STK_TOK");
const REWARD_TOKEN: Symbol = symbol_short!("RWD_TOK");
const CUSTODIAN: Symbol = symbol_short!("CUSTODN");
const SIGNER: Symbol = symbol_short!("SIGNER");
const REWARD_STATE: Symbol = symbol_short!("RWD_ST");
const TOTAL_STAKED: Symbol = symbol_short!("TOT_STK");
const BONUS_TABLE: Symbol = symbol_short!("BONUS");

const INSTANCE_LIFETIME_THRESHOLD: u32 = 100_800; // ~7 days
const INSTANCE_BUMP_AMOUNT: u32 = 518_400; // ~30 days

// ── Contract errors ──────────────────────────────────────────────────────────

/// Error codes, grouped by range:
///
/// | Range   | Purpose                          |
/// |---------|----------------------------------|
/// | 1 – 9   | Lifecycle / initialisation       |
/// | 10 – 19 | Controller guard                 |
/// | 20 – 29 | Validation / input               |
/// | 30 – 39 | Signed authorization             |
/// | 40 – 49 | Ledger and contract state        |
#[soroban_sdk::contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ContractError {
    NotInitialized = 1,
    AlreadyInitialized = 2,

    /// Caller is not the controller (or not the pending controller).
    Unauthorized = 10,

    /// Zero or negative amount, or a negative emission rate.
    InvalidAmount = 20,
    InvalidInput = 21,
    /// Parallel tier/bps vectors differ in length.
    LengthMismatch = 22,
    SlotLimitExceeded = 23,
    SlotNotFound = 24,

    SignatureExpired = 30,
    SignatureReplayed = 31,
    /// Signature is valid but not from the configured signer.
    UnauthorizedSigner = 32,

    SlotLocked = 40,
    InsufficientPrincipal = 41,
    Paused = 42,
    /// Normal operations are suspended while emergency mode is on.
    EmergencyActive = 43,
    /// `emergency_withdraw` called outside emergency mode.
    EmergencyRequired = 44,
    SlotNotEditable = 45,
}

// ── Public-facing types ──────────────────────────────────────────────────────

/// Claimable reward for one slot, bonus included.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SlotPending {
    pub amount: i128,
    pub locked: bool,
}

/// Ledger sequence used as the contract's logical clock.
pub(crate) fn logical_now(env: &Env) -> u64 {
    u64::from(env.ledger().sequence())
}

// ── Contract ─────────────────────────────────────────────────────────────────

#[contract]
pub struct StakeLedgerContract;

#[contractimpl]
impl StakeLedgerContract {
    // ── Initialisation ──────────────────────────────────────────────────────

    /// Bootstrap the contract.
    ///
    /// * `stake_token`   – token participants lock as principal.
    /// * `reward_token`  – token paid out as reward (may equal `stake_token`).
    /// * `custodian`     – holder of the reward supply; must grant this
    ///                     contract an allowance on `reward_token`.
    /// * `signer`        – ed25519 key of the off-chain authorization oracle.
    /// * `emission_rate` – reward units emitted per ledger across all stakers.
    pub fn initialize(
        env: Env,
        controller: Address,
        stake_token: Address,
        reward_token: Address,
        custodian: Address,
        signer: BytesN<32>,
        emission_rate: i128,
    ) -> Result<(), ContractError> {
        if env.storage().instance().has(&INITIALIZED) {
            return Err(ContractError::AlreadyInitialized);
        }
        if emission_rate < 0 {
            return Err(ContractError::InvalidAmount);
        }

        let now = logical_now(&env);
        env.storage().instance().set(&CONTROLLER, &controller);
        env.storage().instance().set(&INITIALIZED, &true);
        env.storage().instance().set(&STAKE_TOKEN, &stake_token);
        env.storage().instance().set(&REWARD_TOKEN, &reward_token);
        env.storage().instance().set(&CUSTODIAN, &custodian);
        env.storage().instance().set(&SIGNER, &signer);
        env.storage()
            .instance()
            .set(&REWARD_STATE, &RewardState::new(emission_rate, now));
        env.storage()
            .instance()
            .set(&BONUS_TABLE, &BonusTable::empty(&env));
        // TOTAL_STAKED and the pause flags start absent; reads default them.
        Self::extend_instance(&env);

        events::publish_initialized(
            &env,
            controller,
            stake_token,
            reward_token,
            custodian,
            signer,
            emission_rate,
        );

        Ok(())
    }

    // ── Staking ─────────────────────────────────────────────────────────────

    /// Deposit exactly what `auth` approves.
    ///
    /// A zero lock tops up slot 0. Any other lock opens a new slot and the
    /// new index is returned.
    ///
    /// Topping up slot 0 resets its reward debt against the combined
    /// principal, so reward accrued on the old balance and not yet claimed
    /// is forfeited. Claim first to keep it.
    ///
    /// Slots are never removed. Emptied slots and the slot-0 placeholder
    /// still count towards `MAX_SLOTS`, so once nine locked slots have been
    /// opened no further locked deposit is accepted, even if all of them
    /// were withdrawn.
    pub fn deposit(
        env: Env,
        staker: Address,
        auth: DepositAuthorization,
        signature: AuthSignature,
    ) -> Result<u32, ContractError> {
        Self::require_initialized(&env)?;
        staker.require_auth();

        let amount = auth.amount;
        if amount <= 0 {
            return Err(ContractError::InvalidAmount);
        }
        pause::require_operational(&env)?;

        let mut slot_list = slots::load(&env, &staker);
        if auth.lock_duration > 0 && slot_list.len() >= MAX_SLOTS {
            return Err(ContractError::SlotLimitExceeded);
        }

        // 1. Flush the accumulator so the new principal earns nothing retroactively.
        let state = Self::sync_rewards(&env)?;

        // 2. Consume the authorization.
        let digest = authorization::deposit_digest(&env, &staker, &auth);
        let signer = authorization::verify(
            &env,
            &Ed25519Authorizer,
            &digest,
            auth.issued_at,
            &signature,
        )?;
        if signer != Self::trusted_signer(&env)? {
            return Err(ContractError::UnauthorizedSigner);
        }

        // 3. Pull principal into custody.
        token::Client::new(&env, &Self::stake_token(&env)?).transfer(
            &staker,
            &env.current_contract_address(),
            &amount,
        );

        // 4. Book it.
        let now = logical_now(&env);
        let acc = state.acc_reward_per_share;
        if slot_list.is_empty() {
            slot_list.push_back(StakeSlot::placeholder());
        }

        let slot_index = if auth.lock_duration == 0 {
            let mut slot = slot_list
                .get(UNLOCKED_SLOT)
                .unwrap_or_else(StakeSlot::placeholder);
            if !slot.occupied {
                slot.occupied = true;
                slot.deposited_at = now;
            }
            slot.principal = slot.principal.saturating_add(amount);
            slot.checkpoint(acc);
            slot.threshold_tier = auth.threshold_tier;
            slot.timelock_tier = auth.timelock_tier;
            slot_list.set(UNLOCKED_SLOT, slot);
            UNLOCKED_SLOT
        } else {
            slot_list.push_back(StakeSlot {
                principal: amount,
                reward_debt: rewards::entitlement(amount, acc),
                deposited_at: now,
                lock_duration: auth.lock_duration,
                threshold_tier: auth.threshold_tier,
                timelock_tier: auth.timelock_tier,
                editable: false,
                occupied: true,
            });
            slot_list.len() - 1
        };
        slots::store(&env, &staker, &slot_list);

        let new_total = Self::get_total_staked(env.clone()).saturating_add(amount);
        env.storage().instance().set(&TOTAL_STAKED, &new_total);

        events::publish_deposit(
            &env,
            DepositEvent {
                staker,
                slot_index,
                amount,
                lock_duration: auth.lock_duration,
                threshold_tier: auth.threshold_tier,
                timelock_tier: auth.timelock_tier,
                new_total_staked: new_total,
                ledger: now,
            },
        );

        Ok(slot_index)
    }

    /// Withdraw principal from an unlocked slot.
    ///
    /// All slots are claimed first so no pending reward is lost. If the
    /// authorization verifies but was signed by someone other than the
    /// trusted signer, the withdrawal still goes through and the slot's
    /// threshold tier drops to `None`: custody of principal never depends
    /// on the signing service, only the bonus does.
    pub fn withdraw(
        env: Env,
        staker: Address,
        auth: WithdrawAuthorization,
        signature: AuthSignature,
    ) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        staker.require_auth();

        let amount = auth.amount;
        if amount <= 0 {
            return Err(ContractError::InvalidAmount);
        }
        pause::require_operational(&env)?;

        let index = auth.slot_index;
        let mut slot_list = slots::load(&env, &staker);
        let slot = slots::get_occupied(&slot_list, index).ok_or(ContractError::SlotNotFound)?;
        if slot.is_locked(logical_now(&env)) {
            return Err(ContractError::SlotLocked);
        }
        if amount > slot.principal {
            return Err(ContractError::InsufficientPrincipal);
        }

        let state = Self::sync_rewards(&env)?;

        let digest = authorization::withdraw_digest(&env, &staker, &auth);
        let signer = authorization::verify(
            &env,
            &Ed25519Authorizer,
            &digest,
            auth.issued_at,
            &signature,
        )?;
        let tier_downgraded = signer != Self::trusted_signer(&env)?;
        if tier_downgraded {
            log!(
                &env,
                "withdraw authorization from untrusted signer, dropping threshold tier",
                staker,
                index
            );
        }

        // Full claim before principal moves.
        Self::claim_slots(&env, &staker, &mut slot_list, &state)?;

        let mut slot = slot_list.get(index).ok_or(ContractError::SlotNotFound)?;
        slot.principal = slot.principal.saturating_sub(amount);
        slot.checkpoint(state.acc_reward_per_share);
        slot.threshold_tier = if tier_downgraded {
            ThresholdTier::None
        } else {
            auth.threshold_tier
        };
        let threshold_tier = slot.threshold_tier;
        slot_list.set(index, slot);
        slots::store(&env, &staker, &slot_list);

        let new_total = Self::get_total_staked(env.clone()).saturating_sub(amount);
        env.storage().instance().set(&TOTAL_STAKED, &new_total);

        token::Client::new(&env, &Self::stake_token(&env)?).transfer(
            &env.current_contract_address(),
            &staker,
            &amount,
        );

        events::publish_withdraw(
            &env,
            WithdrawEvent {
                staker,
                slot_index: index,
                amount,
                threshold_tier,
                tier_downgraded,
                new_total_staked: new_total,
                ledger: logical_now(&env),
            },
        );

        Ok(())
    }

    /// Exit every slot without authorization while emergency mode is on.
    ///
    /// Principal is returned in full; pending rewards are abandoned.
    pub fn emergency_withdraw(env: Env, staker: Address) -> Result<i128, ContractError> {
        Self::require_initialized(&env)?;
        staker.require_auth();
        pause::require_emergency(&env)?;

        Self::sync_rewards(&env)?;

        let mut slot_list = slots::load(&env, &staker);
        let mut returned = 0i128;
        let mut cleared = 0u32;
        for i in 0..slot_list.len() {
            if let Some(mut slot) = slot_list.get(i) {
                if slot.principal > 0 {
                    cleared = cleared.saturating_add(1);
                }
                returned = returned.saturating_add(slot.principal);
                slot.principal = 0;
                slot.reward_debt = 0;
                slot_list.set(i, slot);
            }
        }
        slots::store(&env, &staker, &slot_list);

        let new_total = Self::get_total_staked(env.clone()).saturating_sub(returned);
        env.storage().instance().set(&TOTAL_STAKED, &new_total);

        if returned > 0 {
            token::Client::new(&env, &Self::stake_token(&env)?).transfer(
                &env.current_contract_address(),
                &staker,
                &returned,
            );
        }

        log!(&env, "emergency withdrawal", staker, returned);
        events::publish_emergency_withdraw(&env, staker, returned, cleared, new_total);

        Ok(returned)
    }

    // ── Rewards ─────────────────────────────────────────────────────────────

    /// Claim bonus-adjusted rewards on every unlocked slot.
    ///
    /// Locked slots keep their debt and are paid once they unlock. Rewards
    /// are drawn from the custodian's allowance. Returns the total paid,
    /// `0` when nothing is due.
    pub fn claim(env: Env, staker: Address) -> Result<i128, ContractError> {
        Self::require_initialized(&env)?;
        staker.require_auth();
        pause::require_operational(&env)?;

        let state = Self::sync_rewards(&env)?;

        let mut slot_list = slots::load(&env, &staker);
        let paid = Self::claim_slots(&env, &staker, &mut slot_list, &state)?;
        slots::store(&env, &staker, &slot_list);

        Ok(paid)
    }

    /// Let the controller overwrite one of the caller's slots, or revoke that.
    pub fn set_slot_editable(
        env: Env,
        staker: Address,
        slot_index: u32,
        editable: bool,
    ) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        staker.require_auth();

        let mut slot_list = slots::load(&env, &staker);
        let mut slot =
            slots::get_occupied(&slot_list, slot_index).ok_or(ContractError::SlotNotFound)?;
        slot.editable = editable;
        slot_list.set(slot_index, slot);
        slots::store(&env, &staker, &slot_list);

        events::publish_slot_editable(&env, staker, slot_index, editable);

        Ok(())
    }

    // ── View functions ───────────────────────────────────────────────────────

    pub fn get_slots(env: Env, staker: Address) -> Vec<StakeSlot> {
        slots::load(&env, &staker)
    }

    pub fn get_slot(env: Env, staker: Address, slot_index: u32) -> Result<StakeSlot, ContractError> {
        slots::get_occupied(&slots::load(&env, &staker), slot_index)
            .ok_or(ContractError::SlotNotFound)
    }

    /// Real-time claimable amount for one slot, without mutating state.
    ///
    /// For a locked slot this is what would be paid once it unlocks, had no
    /// further time passed.
    pub fn pending(
        env: Env,
        staker: Address,
        slot_index: u32,
    ) -> Result<SlotPending, ContractError> {
        let slot = Self::get_slot(env.clone(), staker, slot_index)?;
        let state = Self::get_reward_state(env.clone())?;
        let table = Self::get_bonus_table(env.clone())?;

        let base = rewards::pending_base(slot.principal, state.acc_reward_per_share, slot.reward_debt);
        let bps = bonus::resolve_bonus_bps(&table, slot.threshold_tier, slot.timelock_tier);

        Ok(SlotPending {
            amount: bonus::apply_bonus(base, bps),
            locked: slot.is_locked(logical_now(&env)),
        })
    }

    /// Sum of principal across all of a participant's slots.
    pub fn get_total_principal(env: Env, staker: Address) -> i128 {
        slots::total_principal(&slots::load(&env, &staker))
    }

    /// Sum of all principal held by the contract.
    pub fn get_total_staked(env: Env) -> i128 {
        env.storage().instance().get(&TOTAL_STAKED).unwrap_or(0)
    }

    /// Accumulator snapshot as it would read if resynced now.
    pub fn get_reward_state(env: Env) -> Result<RewardState, ContractError> {
        let stored = Self::stored_reward_state(&env)?;
        Ok(rewards::resync(
            &stored,
            logical_now(&env),
            Self::get_total_staked(env.clone()),
        ))
    }

    pub fn get_emission_rate(env: Env) -> Result<i128, ContractError> {
        Ok(Self::stored_reward_state(&env)?.emission_rate)
    }

    pub fn get_bonus_table(env: Env) -> Result<BonusTable, ContractError> {
        env.storage()
            .instance()
            .get(&BONUS_TABLE)
            .ok_or(ContractError::NotInitialized)
    }

    pub fn is_paused(env: Env) -> bool {
        pause::is_paused(&env)
    }

    pub fn is_emergency(env: Env) -> bool {
        pause::is_emergency(&env)
    }

    pub fn get_signer(env: Env) -> Result<BytesN<32>, ContractError> {
        Self::trusted_signer(&env)
    }

    pub fn get_custodian(env: Env) -> Result<Address, ContractError> {
        env.storage()
            .instance()
            .get(&CUSTODIAN)
            .ok_or(ContractError::NotInitialized)
    }

    /// Whether an authorization digest has already been consumed.
    pub fn is_digest_used(env: Env, digest: BytesN<32>) -> bool {
        authorization::is_used(&env, &digest)
    }

    /// Digest the oracle must sign to approve `auth` for `staker`.
    pub fn deposit_digest(
        env: Env,
        staker: Address,
        auth: DepositAuthorization,
    ) -> BytesN<32> {
        authorization::deposit_digest(&env, &staker, &auth)
    }

    /// Digest the oracle must sign to approve `auth` for `staker`.
    pub fn withdraw_digest(
        env: Env,
        staker: Address,
        auth: WithdrawAuthorization,
    ) -> BytesN<32> {
        authorization::withdraw_digest(&env, &staker, &auth)
    }

    pub fn is_initialized(env: Env) -> bool {
        env.storage().instance().has(&INITIALIZED)
    }

    pub fn get_controller(env: Env) -> Result<Address, ContractError> {
        env.storage()
            .instance()
            .get(&CONTROLLER)
            .ok_or(ContractError::NotInitialized)
    }

    // ── Controller transfer (two-step) ─────────────────────────────────────

    /// Propose a new controller. The proposed address must call
    /// `accept_controller` to complete the transfer.
    pub fn propose_controller(
        env: Env,
        current: Address,
        proposed: Address,
    ) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        current.require_auth();
        Self::require_controller(&env, &current)?;

        env.storage().instance().set(&PENDING_CONTROLLER, &proposed);

        events::publish_controller_transfer_proposed(&env, current, proposed);

        Ok(())
    }

    /// Accept the pending transfer. Only the proposed controller can call this.
    pub fn accept_controller(env: Env, proposed: Address) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        proposed.require_auth();

        let pending: Address = env
            .storage()
            .instance()
            .get(&PENDING_CONTROLLER)
            .ok_or(ContractError::InvalidInput)?;

        if proposed != pending {
            return Err(ContractError::Unauthorized);
        }

        let old = Self::get_controller(env.clone())?;
        env.storage().instance().set(&CONTROLLER, &proposed);
        env.storage().instance().remove(&PENDING_CONTROLLER);

        events::publish_controller_transfer_accepted(&env, old, proposed);

        Ok(())
    }

    pub fn cancel_controller_transfer(env: Env, current: Address) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        current.require_auth();
        Self::require_controller(&env, &current)?;

        let pending: Address = env
            .storage()
            .instance()
            .get(&PENDING_CONTROLLER)
            .ok_or(ContractError::InvalidInput)?;

        env.storage().instance().remove(&PENDING_CONTROLLER);

        events::publish_controller_transfer_cancelled(&env, current, pending);

        Ok(())
    }

    pub fn get_pending_controller(env: Env) -> Option<Address> {
        env.storage().instance().get(&PENDING_CONTROLLER)
    }

    // ── Control plane ────────────────────────────────────────────────────────

    /// Change the emission rate.
    ///
    /// The accumulator is flushed at the old rate first, so the change only
    /// affects ledgers after this one.
    pub fn set_emission_rate(env: Env, caller: Address, new_rate: i128) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        Self::require_controller(&env, &caller)?;

        if new_rate < 0 {
            return Err(ContractError::InvalidAmount);
        }

        let mut state = Self::sync_rewards(&env)?;
        state.emission_rate = new_rate;
        env.storage().instance().set(&REWARD_STATE, &state);

        events::publish_emission_rate_set(&env, new_rate);

        Ok(())
    }

    /// Advance the accumulator to the current ledger. Idempotent.
    pub fn resync(env: Env, caller: Address) -> Result<RewardState, ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        Self::require_controller(&env, &caller)?;

        let state = Self::sync_rewards(&env)?;
        events::publish_resynced(&env, state.acc_reward_per_share);

        Ok(state)
    }

    pub fn set_paused(env: Env, caller: Address, paused: bool) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        Self::require_controller(&env, &caller)?;

        pause::set_paused(&env, paused);
        events::publish_paused_set(&env, paused);

        Ok(())
    }

    pub fn set_emergency(env: Env, caller: Address, emergency: bool) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        Self::require_controller(&env, &caller)?;

        pause::set_emergency(&env, emergency);
        events::publish_emergency_set(&env, emergency);

        Ok(())
    }

    /// Rotate the oracle key. Authorizations signed by the old key stop
    /// being accepted immediately.
    pub fn set_signer(env: Env, caller: Address, signer: BytesN<32>) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        Self::require_controller(&env, &caller)?;

        env.storage().instance().set(&SIGNER, &signer);
        events::publish_signer_set(&env, signer);

        Ok(())
    }

    pub fn set_custodian(env: Env, caller: Address, custodian: Address) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        Self::require_controller(&env, &caller)?;

        env.storage().instance().set(&CUSTODIAN, &custodian);
        events::publish_custodian_set(&env, custodian);

        Ok(())
    }

    /// Assign basis-point bonuses to threshold tiers, pairwise.
    ///
    /// Changes apply to every future claim, existing slots included.
    pub fn set_threshold_bonuses(
        env: Env,
        caller: Address,
        tiers: Vec<ThresholdTier>,
        bps: Vec<u32>,
    ) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        Self::require_controller(&env, &caller)?;

        if tiers.len() != bps.len() {
            return Err(ContractError::LengthMismatch);
        }

        let mut table = Self::get_bonus_table(env.clone())?;
        for (tier, value) in tiers.iter().zip(bps.iter()) {
            if tier == ThresholdTier::None {
                return Err(ContractError::InvalidInput);
            }
            table.set_threshold(tier, value);
        }
        env.storage().instance().set(&BONUS_TABLE, &table);

        events::publish_bonus_table_set(&env);

        Ok(())
    }

    /// Assign basis-point bonuses to timelock tiers, pairwise.
    pub fn set_timelock_bonuses(
        env: Env,
        caller: Address,
        tiers: Vec<TimelockTier>,
        bps: Vec<u32>,
    ) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        Self::require_controller(&env, &caller)?;

        if tiers.len() != bps.len() {
            return Err(ContractError::LengthMismatch);
        }

        let mut table = Self::get_bonus_table(env.clone())?;
        for (tier, value) in tiers.iter().zip(bps.iter()) {
            if tier == TimelockTier::None {
                return Err(ContractError::InvalidInput);
            }
            table.set_timelock(tier, value);
        }
        env.storage().instance().set(&BONUS_TABLE, &table);

        events::publish_bonus_table_set(&env);

        Ok(())
    }

    /// Overwrite lock and tiers of a slot the participant marked editable.
    ///
    /// Principal and reward debt are never touched. Slot 0 stays unlocked.
    pub fn edit_stake(
        env: Env,
        caller: Address,
        staker: Address,
        slot_index: u32,
        lock_duration: u64,
        threshold_tier: ThresholdTier,
        timelock_tier: TimelockTier,
    ) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        Self::require_controller(&env, &caller)?;

        let mut slot_list = slots::load(&env, &staker);
        let mut slot =
            slots::get_occupied(&slot_list, slot_index).ok_or(ContractError::SlotNotFound)?;
        if !slot.editable {
            return Err(ContractError::SlotNotEditable);
        }
        if slot_index == UNLOCKED_SLOT && lock_duration != 0 {
            return Err(ContractError::InvalidInput);
        }

        slot.lock_duration = lock_duration;
        slot.threshold_tier = threshold_tier;
        slot.timelock_tier = timelock_tier;
        slot_list.set(slot_index, slot);
        slots::store(&env, &staker, &slot_list);

        events::publish_stake_edited(
            &env,
            staker,
            slot_index,
            lock_duration,
            threshold_tier,
            timelock_tier,
        );

        Ok(())
    }

    // ── Internal helpers ─────────────────────────────────────────────────────

    fn require_initialized(env: &Env) -> Result<(), ContractError> {
        if !env.storage().instance().has(&INITIALIZED) {
            return Err(ContractError::NotInitialized);
        }
        Ok(())
    }

    fn require_controller(env: &Env, caller: &Address) -> Result<(), ContractError> {
        let controller: Address = env
            .storage()
            .instance()
            .get(&CONTROLLER)
            .ok_or(ContractError::NotInitialized)?;
        if *caller != controller {
            return Err(ContractError::Unauthorized);
        }
        Ok(())
    }

    fn extend_instance(env: &Env) {
        env.storage()
            .instance()
            .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
    }

    fn trusted_signer(env: &Env) -> Result<BytesN<32>, ContractError> {
        env.storage()
            .instance()
            .get(&SIGNER)
            .ok_or(ContractError::NotInitialized)
    }

    fn stake_token(env: &Env) -> Result<Address, ContractError> {
        env.storage()
            .instance()
            .get(&STAKE_TOKEN)
            .ok_or(ContractError::NotInitialized)
    }

    fn stored_reward_state(env: &Env) -> Result<RewardState, ContractError> {
        env.storage()
            .instance()
            .get(&REWARD_STATE)
            .ok_or(ContractError::NotInitialized)
    }

    /// Advance and persist the global accumulator. Every participant-facing
    /// mutation starts here.
    fn sync_rewards(env: &Env) -> Result<RewardState, ContractError> {
        let stored = Self::stored_reward_state(env)?;
        let total = Self::get_total_staked(env.clone());
        let state = rewards::resync(&stored, logical_now(env), total);

        env.storage().instance().set(&REWARD_STATE, &state);
        Self::extend_instance(env);

        Ok(state)
    }

    /// Pay out every claimable slot in `slot_list` and advance their debt.
    ///
    /// Locked slots are left untouched. Emptied slots only have stale debt
    /// cleared. The caller persists `slot_list`.
    fn claim_slots(
        env: &Env,
        staker: &Address,
        slot_list: &mut Vec<StakeSlot>,
        state: &RewardState,
    ) -> Result<i128, ContractError> {
        let now = logical_now(env);
        let acc = state.acc_reward_per_share;
        let table = Self::get_bonus_table(env.clone())?;
        let mut total = 0i128;

        for i in 0..slot_list.len() {
            let Some(mut slot) = slot_list.get(i) else {
                continue;
            };
            match slot.state(now) {
                SlotState::Locked => continue,
                SlotState::Empty => {
                    if slot.reward_debt == 0 {
                        continue;
                    }
                    slot.reward_debt = 0;
                }
                SlotState::Unlocked => {
                    let base = rewards::pending_base(slot.principal, acc, slot.reward_debt);
                    if base > 0 {
                        let bps =
                            bonus::resolve_bonus_bps(&table, slot.threshold_tier, slot.timelock_tier);
                        let payout = bonus::apply_bonus(base, bps);
                        total = total.saturating_add(payout);
                        events::publish_claim(env, staker.clone(), i, base, bps, payout);
                    }
                    slot.checkpoint(acc);
                }
            }
            slot_list.set(i, slot);
        }

        if total > 0 {
            let reward_token: Address = env
                .storage()
                .instance()
                .get(&REWARD_TOKEN)
                .ok_or(ContractError::NotInitialized)?;
            let custodian = Self::get_custodian(env.clone())?;
            token::Client::new(env, &reward_token).transfer_from(
                &env.current_contract_address(),
                &custodian,
                staker,
                &total,
            );
        }

        Ok(total)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test_helpers;


#[cfg(test)]
mod test_authorization;
