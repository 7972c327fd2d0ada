use soroban_sdk::contracttype;

/// Fixed-point scaling factor.
///
/// Reward-per-share values are multiplied by this constant before storage
/// so that sub-unit accruals survive integer division. 10^12 leaves ample
/// headroom in `i128` for stake amounts up to 10^18.
pub const SCALE: i128 = 1_000_000_000_000;

/// Global accumulator snapshot, stored once in instance storage.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RewardState {
    /// Reward units emitted per ledger sequence across all stakers.
    pub emission_rate: i128,
    /// Ledger sequence at which the accumulator was last advanced.
    pub last_synced_at: u64,
    /// Cumulative reward per unit of principal, scaled by [`SCALE`].
    pub acc_reward_per_share: i128,
}

impl RewardState {
    pub fn new(emission_rate: i128, now: u64) -> Self {
        Self {
            emission_rate,
            last_synced_at: now,
            acc_reward_per_share: 0,
        }
    }
}

// ── Core reward engine ──────────────────────────────────────────────────────

/// Advance the accumulator to `now`.
///
/// ```text
/// Δacc = (now − last_synced_at) × emission_rate × SCALE / total_principal
/// ```
///
/// Time that does not move forward leaves the state untouched, so calling
/// this twice within one ledger is a no-op. With nothing staked only the
/// sync point moves: emissions during an empty pool are not distributed.
#[allow(clippy::arithmetic_side_effects)]
pub fn resync(state: &RewardState, now: u64, total_principal: i128) -> RewardState {
    if now <= state.last_synced_at {
        return state.clone();
    }

    if total_principal <= 0 {
        return RewardState {
            last_synced_at: now,
            ..state.clone()
        };
    }

    let elapsed = (now - state.last_synced_at) as i128;
    let delta = elapsed
        .saturating_mul(state.emission_rate)
        .saturating_mul(SCALE)
        / total_principal;

    RewardState {
        emission_rate: state.emission_rate,
        last_synced_at: now,
        acc_reward_per_share: state.acc_reward_per_share.saturating_add(delta),
    }
}

/// Principal's full entitlement at the given accumulator value.
///
/// This is also the value a slot's reward debt is reset to after every
/// interaction.
#[allow(clippy::arithmetic_side_effects)]
pub fn entitlement(principal: i128, acc_reward_per_share: i128) -> i128 {
    principal.saturating_mul(acc_reward_per_share) / SCALE
}

/// Reward accrued since the slot's last snapshot, before any bonus.
///
/// Clamped at zero: a debt above the entitlement (only possible for an
/// emptied slot with stale debt) never produces a negative payout.
pub fn pending_base(principal: i128, acc_reward_per_share: i128, reward_debt: i128) -> i128 {
    entitlement(principal, acc_reward_per_share)
        .saturating_sub(reward_debt)
        .max(0)
}

// ── Unit tests ──────────────────────────────────────────────────────────────
// Pure math, no Soroban environment required.
