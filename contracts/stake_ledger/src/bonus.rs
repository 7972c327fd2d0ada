use soroban_sdk::{contracttype, vec, Env, Vec};

/// Basis-point denominator: 10_000 bps = 100 %.
pub const BPS_DENOMINATOR: i128 = 10_000;

// ── Tier enums ───────────────────────────────────────────────────────────────

/// Stake-size classification assigned by the off-chain oracle.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ThresholdTier {
    None = 0,
    Silver = 1,
    Gold = 2,
    Diamond = 3,
}

impl ThresholdTier {
    pub const COUNT: u32 = 4;

    pub fn index(&self) -> u32 {
        match self {
            ThresholdTier::None => 0,
            ThresholdTier::Silver => 1,
            ThresholdTier::Gold => 2,
            ThresholdTier::Diamond => 3,
        }
    }
}

/// Lock-length classification assigned by the off-chain oracle.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum TimelockTier {
    None = 0,
    Short = 1,
    Long = 2,
}

impl TimelockTier {
    pub const COUNT: u32 = 3;

    pub fn index(&self) -> u32 {
        match self {
            TimelockTier::None => 0,
            TimelockTier::Short => 1,
            TimelockTier::Long => 2,
        }
    }
}

// ── Bonus table ──────────────────────────────────────────────────────────────

/// Basis-point bonus per tier, indexed by the tier's discriminant.
///
/// The `None` entry of each table is pinned to zero; the control plane
/// refuses to assign it.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BonusTable {
    pub threshold: Vec<u32>,
    pub timelock: Vec<u32>,
}

impl BonusTable {
    /// All tiers at zero bonus.
    pub fn empty(env: &Env) -> Self {
        Self {
            threshold: vec![env, 0, 0, 0, 0],
            timelock: vec![env, 0, 0, 0],
        }
    }

    pub fn set_threshold(&mut self, tier: ThresholdTier, bps: u32) {
        self.threshold.set(tier.index(), bps);
    }

    pub fn set_timelock(&mut self, tier: TimelockTier, bps: u32) {
        self.timelock.set(tier.index(), bps);
    }
}

/// Combined bonus for a slot's tier pair. The two tables are additive.
pub fn resolve_bonus_bps(
    table: &BonusTable,
    threshold: ThresholdTier,
    timelock: TimelockTier,
) -> u32 {
    let t = table.threshold.get(threshold.index()).unwrap_or(0);
    let l = table.timelock.get(timelock.index()).unwrap_or(0);
    t.saturating_add(l)
}

/// `base + base × bps / 10_000`, truncating the bonus part.
#[allow(clippy::arithmetic_side_effects)]
pub fn apply_bonus(base: i128, bps: u32) -> i128 {
    let bonus = base.saturating_mul(bps as i128) / BPS_DENOMINATOR;
    base.saturating_add(bonus)
}
