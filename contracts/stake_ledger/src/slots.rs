use soroban_sdk::{contracttype, symbol_short, Address, Env, Symbol, Vec};

use crate::bonus::{ThresholdTier, TimelockTier};
use crate::rewards;

/// Upper bound on slots per participant, slot 0 included.
pub const MAX_SLOTS: u32 = 10;

/// Index reserved for the participant's unlocked balance.
pub const UNLOCKED_SLOT: u32 = 0;

const USER_SLOTS: Symbol = symbol_short!("SLOTS");

const PERSISTENT_LIFETIME_THRESHOLD: u32 = 518_400; // ~30 days
const PERSISTENT_BUMP_AMOUNT: u32 = 3_110_400; // ~180 days

// ── Types ────────────────────────────────────────────────────────────────────

/// One independent stake position.
///
/// `occupied` is false only for the slot-0 placeholder written when a
/// participant opens a locked slot before ever making an unlocked deposit.
/// Withdrawn slots stay occupied with zero principal so that indices held
/// by off-chain tooling remain valid.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StakeSlot {
    pub principal: i128,
    pub reward_debt: i128,
    pub deposited_at: u64,
    pub lock_duration: u64,
    pub threshold_tier: ThresholdTier,
    pub timelock_tier: TimelockTier,
    pub editable: bool,
    pub occupied: bool,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SlotState {
    Locked,
    Unlocked,
    Empty,
}

impl StakeSlot {
    pub fn placeholder() -> Self {
        Self {
            principal: 0,
            reward_debt: 0,
            deposited_at: 0,
            lock_duration: 0,
            threshold_tier: ThresholdTier::None,
            timelock_tier: TimelockTier::None,
            editable: false,
            occupied: false,
        }
    }

    pub fn unlocks_at(&self) -> u64 {
        self.deposited_at.saturating_add(self.lock_duration)
    }

    pub fn is_locked(&self, now: u64) -> bool {
        now < self.unlocks_at()
    }

    /// Empty wins over Locked: a zeroed slot has nothing left to defer.
    pub fn state(&self, now: u64) -> SlotState {
        if self.principal == 0 {
            SlotState::Empty
        } else if self.is_locked(now) {
            SlotState::Locked
        } else {
            SlotState::Unlocked
        }
    }

    /// Move the debt snapshot up to the principal's full entitlement.
    pub fn checkpoint(&mut self, acc_reward_per_share: i128) {
        self.reward_debt = rewards::entitlement(self.principal, acc_reward_per_share);
    }
}

// ── Storage ──────────────────────────────────────────────────────────────────

fn slots_key(staker: &Address) -> (Symbol, Address) {
    (USER_SLOTS, staker.clone())
}

pub fn load(env: &Env, staker: &Address) -> Vec<StakeSlot> {
    let key = slots_key(staker);
    let slots: Option<Vec<StakeSlot>> = env.storage().persistent().get(&key);
    match slots {
        Some(slots) => {
            env.storage()
                .persistent()
                .extend_ttl(&key, PERSISTENT_LIFETIME_THRESHOLD, PERSISTENT_BUMP_AMOUNT);
            slots
        }
        None => Vec::new(env),
    }
}

pub fn store(env: &Env, staker: &Address, slots: &Vec<StakeSlot>) {
    let key = slots_key(staker);
    env.storage().persistent().set(&key, slots);
    env.storage()
        .persistent()
        .extend_ttl(&key, PERSISTENT_LIFETIME_THRESHOLD, PERSISTENT_BUMP_AMOUNT);
}

/// Sum of principal across every slot, locked or not.
pub fn total_principal(slots: &Vec<StakeSlot>) -> i128 {
    slots
        .iter()
        .fold(0i128, |acc, slot| acc.saturating_add(slot.principal))
}

/// Fetch an occupied slot, treating placeholders as absent.
pub fn get_occupied(slots: &Vec<StakeSlot>, index: u32) -> Option<StakeSlot> {
    slots.get(index).filter(|slot| slot.occupied)
}
