extern crate std;

use core::cell::Cell;

use ed25519_dalek::{Signer, SigningKey};
use soroban_sdk::{
    testutils::{Address as _, Ledger as _},
    token::{Client as TokenClient, StellarAssetClient},
    Address, BytesN, Env,
};

use crate::authorization::{AuthSignature, DepositAuthorization, WithdrawAuthorization};
use crate::bonus::{ThresholdTier, TimelockTier};
use crate::{StakeLedgerContract, StakeLedgerContractClient};

/// Reward tokens minted to the custodian and approved for the contract.
pub const REWARD_SUPPLY: i128 = 1_000_000_000;

const ALLOWANCE_EXPIRY: u32 = 200_000;

pub const ORACLE_SECRET: [u8; 32] = [7u8; 32];
pub const ROGUE_SECRET: [u8; 32] = [99u8; 32];

/// A deployed, initialized ledger plus the keys and tokens around it.
pub struct TestLedger {
    pub env: Env,
    pub client: StakeLedgerContractClient<'static>,
    pub contract_id: Address,
    pub controller: Address,
    pub stake_token: Address,
    pub reward_token: Address,
    pub custodian: Address,
    pub oracle: SigningKey,
    salt: Cell<u32>,
}

/// Provisions:
/// - two SAC tokens (stake + reward)
/// - a deployed and initialized `StakeLedgerContract`
/// - a custodian holding `REWARD_SUPPLY` reward tokens, approved for the contract
pub fn setup(emission_rate: i128) -> TestLedger {
    let env = Env::default();
    env.mock_all_auths();

    let stake_token = env
        .register_stellar_asset_contract_v2(Address::generate(&env))
        .address();
    let reward_token = env
        .register_stellar_asset_contract_v2(Address::generate(&env))
        .address();

    let contract_id = env.register(StakeLedgerContract, ());
    let client = StakeLedgerContractClient::new(&env, &contract_id);

    let controller = Address::generate(&env);
    let custodian = Address::generate(&env);
    let oracle = SigningKey::from_bytes(&ORACLE_SECRET);

    client.initialize(
        &controller,
        &stake_token,
        &reward_token,
        &custodian,
        &public_key(&env, &oracle),
        &emission_rate,
    );

    fund_custodian(&env, &reward_token, &custodian, &contract_id);

    TestLedger {
        env,
        client,
        contract_id,
        controller,
        stake_token,
        reward_token,
        custodian,
        oracle,
        salt: Cell::new(0),
    }
}

pub fn public_key(env: &Env, key: &SigningKey) -> BytesN<32> {
    BytesN::from_array(env, &key.verifying_key().to_bytes())
}

pub fn fund_custodian(env: &Env, reward_token: &Address, custodian: &Address, spender: &Address) {
    StellarAssetClient::new(env, reward_token).mint(custodian, &REWARD_SUPPLY);
    TokenClient::new(env, reward_token).approve(
        custodian,
        spender,
        &REWARD_SUPPLY,
        &ALLOWANCE_EXPIRY,
    );
}

impl TestLedger {
    pub fn set_ledger(&self, sequence: u32) {
        self.env.ledger().set_sequence_number(sequence);
    }

    pub fn now(&self) -> u64 {
        u64::from(self.env.ledger().sequence())
    }

    /// New participant holding `balance` stake tokens.
    pub fn staker(&self, balance: i128) -> Address {
        let staker = Address::generate(&self.env);
        if balance > 0 {
            self.mint_stake(&staker, balance);
        }
        staker
    }

    pub fn mint_stake(&self, who: &Address, amount: i128) {
        StellarAssetClient::new(&self.env, &self.stake_token).mint(who, &amount);
    }

    pub fn stake_balance(&self, who: &Address) -> i128 {
        TokenClient::new(&self.env, &self.stake_token).balance(who)
    }

    pub fn reward_balance(&self, who: &Address) -> i128 {
        TokenClient::new(&self.env, &self.reward_token).balance(who)
    }

    fn next_salt(&self) -> BytesN<32> {
        let n = self.salt.get().wrapping_add(1);
        self.salt.set(n);
        let mut bytes = [0u8; 32];
        bytes[..4].copy_from_slice(&n.to_be_bytes());
        BytesN::from_array(&self.env, &bytes)
    }

    // ── Authorizations ───────────────────────────────────────────────────────

    pub fn deposit_auth(
        &self,
        amount: i128,
        lock_duration: u64,
        threshold_tier: ThresholdTier,
        timelock_tier: TimelockTier,
    ) -> DepositAuthorization {
        DepositAuthorization {
            amount,
            lock_duration,
            threshold_tier,
            timelock_tier,
            issued_at: self.now(),
            salt: self.next_salt(),
        }
    }

    pub fn withdraw_auth(
        &self,
        slot_index: u32,
        amount: i128,
        threshold_tier: ThresholdTier,
    ) -> WithdrawAuthorization {
        WithdrawAuthorization {
            slot_index,
            amount,
            threshold_tier,
            issued_at: self.now(),
            salt: self.next_salt(),
        }
    }

    pub fn sign_deposit_with(
        &self,
        key: &SigningKey,
        staker: &Address,
        auth: &DepositAuthorization,
    ) -> AuthSignature {
        let digest = self.client.deposit_digest(staker, auth);
        self.sign_digest(key, &digest)
    }

    pub fn sign_withdraw_with(
        &self,
        key: &SigningKey,
        staker: &Address,
        auth: &WithdrawAuthorization,
    ) -> AuthSignature {
        let digest = self.client.withdraw_digest(staker, auth);
        self.sign_digest(key, &digest)
    }

    pub fn sign_deposit(&self, staker: &Address, auth: &DepositAuthorization) -> AuthSignature {
        self.sign_deposit_with(&self.oracle, staker, auth)
    }

    pub fn sign_withdraw(&self, staker: &Address, auth: &WithdrawAuthorization) -> AuthSignature {
        self.sign_withdraw_with(&self.oracle, staker, auth)
    }

    fn sign_digest(&self, key: &SigningKey, digest: &BytesN<32>) -> AuthSignature {
        let signature = key.sign(&digest.to_array());
        AuthSignature {
            signer: public_key(&self.env, key),
            signature: BytesN::from_array(&self.env, &signature.to_bytes()),
        }
    }

    // ── Shortcuts ────────────────────────────────────────────────────────────

    /// Oracle-signed deposit without bonus tiers. Returns the slot index.
    pub fn deposit(&self, staker: &Address, amount: i128, lock_duration: u64) -> u32 {
        self.deposit_tiered(
            staker,
            amount,
            lock_duration,
            ThresholdTier::None,
            TimelockTier::None,
        )
    }

    pub fn deposit_tiered(
        &self,
        staker: &Address,
        amount: i128,
        lock_duration: u64,
        threshold_tier: ThresholdTier,
        timelock_tier: TimelockTier,
    ) -> u32 {
        let auth = self.deposit_auth(amount, lock_duration, threshold_tier, timelock_tier);
        let signature = self.sign_deposit(staker, &auth);
        self.client.deposit(staker, &auth, &signature)
    }

    /// Oracle-signed withdrawal that leaves the slot at `ThresholdTier::None`.
    pub fn withdraw(&self, staker: &Address, slot_index: u32, amount: i128) {
        let auth = self.withdraw_auth(slot_index, amount, ThresholdTier::None);
        let signature = self.sign_withdraw(staker, &auth);
        self.client.withdraw(staker, &auth, &signature);
    }
}
