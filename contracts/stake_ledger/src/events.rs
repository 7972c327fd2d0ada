#![allow(deprecated)] // events().publish migration tracked separately

use soroban_sdk::{symbol_short, Address, BytesN, Env};

use crate::bonus::{ThresholdTier, TimelockTier};
use crate::logical_now;

// ── Event payloads ──────────────────────────────────────────────────────────

/// Fired once when the contract is bootstrapped.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InitializedEvent {
    pub controller: Address,
    pub stake_token: Address,
    pub reward_token: Address,
    pub custodian: Address,
    pub signer: BytesN<32>,
    pub emission_rate: i128,
    pub ledger: u64,
}

/// Fired when principal enters a slot.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DepositEvent {
    pub staker: Address,
    pub slot_index: u32,
    pub amount: i128,
    pub lock_duration: u64,
    pub threshold_tier: ThresholdTier,
    pub timelock_tier: TimelockTier,
    pub new_total_staked: i128,
    pub ledger: u64,
}

/// Fired when principal leaves a slot through an authorized withdrawal.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WithdrawEvent {
    pub staker: Address,
    pub slot_index: u32,
    pub amount: i128,
    pub threshold_tier: ThresholdTier,
    pub tier_downgraded: bool,
    pub new_total_staked: i128,
    pub ledger: u64,
}

/// Fired per slot that paid out during a claim.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClaimEvent {
    pub staker: Address,
    pub slot_index: u32,
    pub base_reward: i128,
    pub bonus_bps: u32,
    pub payout: i128,
    pub ledger: u64,
}

/// Fired when a participant exits through the emergency path.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EmergencyWithdrawEvent {
    pub staker: Address,
    pub amount: i128,
    pub slots_cleared: u32,
    pub new_total_staked: i128,
    pub ledger: u64,
}

/// Fired when the controller changes the emission rate.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EmissionRateSetEvent {
    pub new_rate: i128,
    pub ledger: u64,
}

/// Fired when the pause or emergency flag flips.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FlagSetEvent {
    pub value: bool,
    pub ledger: u64,
}

/// Fired when the trusted signer key rotates.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SignerSetEvent {
    pub signer: BytesN<32>,
    pub ledger: u64,
}

/// Fired when the reward custodian rotates.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CustodianSetEvent {
    pub custodian: Address,
    pub ledger: u64,
}

/// Fired when the controller overwrites an editable slot.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StakeEditedEvent {
    pub staker: Address,
    pub slot_index: u32,
    pub lock_duration: u64,
    pub threshold_tier: ThresholdTier,
    pub timelock_tier: TimelockTier,
    pub ledger: u64,
}

/// Fired when a participant grants or revokes edit rights on a slot.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SlotEditableEvent {
    pub staker: Address,
    pub slot_index: u32,
    pub editable: bool,
    pub ledger: u64,
}

/// Fired when a controller transfer is proposed.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ControllerTransferProposedEvent {
    pub current_controller: Address,
    pub proposed_controller: Address,
    pub ledger: u64,
}

/// Fired when a controller transfer is accepted.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ControllerTransferAcceptedEvent {
    pub old_controller: Address,
    pub new_controller: Address,
    pub ledger: u64,
}

/// Fired when a pending controller transfer is cancelled.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ControllerTransferCancelledEvent {
    pub controller: Address,
    pub cancelled_proposed: Address,
    pub ledger: u64,
}

// ── Publishers ──────────────────────────────────────────────────────────────

pub fn publish_initialized(
    env: &Env,
    controller: Address,
    stake_token: Address,
    reward_token: Address,
    custodian: Address,
    signer: BytesN<32>,
    emission_rate: i128,
) {
    env.events().publish(
        (symbol_short!("INIT"),),
        InitializedEvent {
            controller,
            stake_token,
            reward_token,
            custodian,
            signer,
            emission_rate,
            ledger: logical_now(env),
        },
    );
}

pub fn publish_deposit(env: &Env, event: DepositEvent) {
    env.events()
        .publish((symbol_short!("DEPOSIT"), event.staker.clone()), event);
}

pub fn publish_withdraw(env: &Env, event: WithdrawEvent) {
    env.events()
        .publish((symbol_short!("WITHDRAW"), event.staker.clone()), event);
}

pub fn publish_claim(
    env: &Env,
    staker: Address,
    slot_index: u32,
    base_reward: i128,
    bonus_bps: u32,
    payout: i128,
) {
    env.events().publish(
        (symbol_short!("CLAIM"), staker.clone()),
        ClaimEvent {
            staker,
            slot_index,
            base_reward,
            bonus_bps,
            payout,
            ledger: logical_now(env),
        },
    );
}

pub fn publish_emergency_withdraw(
    env: &Env,
    staker: Address,
    amount: i128,
    slots_cleared: u32,
    new_total_staked: i128,
) {
    env.events().publish(
        (symbol_short!("EMRG_WD"), staker.clone()),
        EmergencyWithdrawEvent {
            staker,
            amount,
            slots_cleared,
            new_total_staked,
            ledger: logical_now(env),
        },
    );
}

pub fn publish_emission_rate_set(env: &Env, new_rate: i128) {
    env.events().publish(
        (symbol_short!("RATE_SET"),),
        EmissionRateSetEvent {
            new_rate,
            ledger: logical_now(env),
        },
    );
}

pub fn publish_paused_set(env: &Env, value: bool) {
    env.events().publish(
        (symbol_short!("PAUSED"),),
        FlagSetEvent {
            value,
            ledger: logical_now(env),
        },
    );
}

pub fn publish_emergency_set(env: &Env, value: bool) {
    env.events().publish(
        (symbol_short!("EMRG_SET"),),
        FlagSetEvent {
            value,
            ledger: logical_now(env),
        },
    );
}

pub fn publish_signer_set(env: &Env, signer: BytesN<32>) {
    env.events().publish(
        (symbol_short!("SIGNER"),),
        SignerSetEvent {
            signer,
            ledger: logical_now(env),
        },
    );
}

pub fn publish_custodian_set(env: &Env, custodian: Address) {
    env.events().publish(
        (symbol_short!("CUSTODN"),),
        CustodianSetEvent {
            custodian,
            ledger: logical_now(env),
        },
    );
}

pub fn publish_bonus_table_set(env: &Env) {
    env.events()
        .publish((symbol_short!("BONUS"),), (logical_now(env),));
}

pub fn publish_resynced(env: &Env, acc_reward_per_share: i128) {
    env.events().publish(
        (symbol_short!("RESYNC"),),
        (acc_reward_per_share, logical_now(env)),
    );
}

pub fn publish_stake_edited(
    env: &Env,
    staker: Address,
    slot_index: u32,
    lock_duration: u64,
    threshold_tier: ThresholdTier,
    timelock_tier: TimelockTier,
) {
    env.events().publish(
        (symbol_short!("EDITED"), staker.clone()),
        StakeEditedEvent {
            staker,
            slot_index,
            lock_duration,
            threshold_tier,
            timelock_tier,
            ledger: logical_now(env),
        },
    );
}

pub fn publish_slot_editable(env: &Env, staker: Address, slot_index: u32, editable: bool) {
    env.events().publish(
        (symbol_short!("EDITABLE"), staker.clone()),
        SlotEditableEvent {
            staker,
            slot_index,
            editable,
            ledger: logical_now(env),
        },
    );
}

pub fn publish_controller_transfer_proposed(
    env: &Env,
    current_controller: Address,
    proposed_controller: Address,
) {
    env.events().publish(
        (symbol_short!("CTL_PROP"), current_controller.clone()),
        ControllerTransferProposedEvent {
            current_controller,
            proposed_controller,
            ledger: logical_now(env),
        },
    );
}

pub fn publish_controller_transfer_accepted(
    env: &Env,
    old_controller: Address,
    new_controller: Address,
) {
    env.events().publish(
        (symbol_short!("CTL_ACPT"), new_controller.clone()),
        ControllerTransferAcceptedEvent {
            old_controller,
            new_controller,
            ledger: logical_now(env),
        },
    );
}

pub fn publish_controller_transfer_cancelled(
    env: &Env,
    controller: Address,
    cancelled_proposed: Address,
) {
    env.events().publish(
        (symbol_short!("CTL_CNCL"), controller.clone()),
        ControllerTransferCancelledEvent {
            controller,
            cancelled_proposed,
            ledger: logical_now(env),
        },
    );
}
