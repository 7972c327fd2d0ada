#![no_main]

use arbitrary::Arbitrary;
use ed25519_dalek::{Signer, SigningKey};
use libfuzzer_sys::fuzz_target;
use soroban_sdk::{
    testutils::{Address as _, Ledger as _},
    token::{Client as TokenClient, StellarAssetClient},
    Address, BytesN, Env,
};
use stake_ledger::authorization::{AuthSignature, DepositAuthorization, WithdrawAuthorization};
use stake_ledger::bonus::{ThresholdTier, TimelockTier};
use stake_ledger::{StakeLedgerContract, StakeLedgerContractClient};

#[derive(Arbitrary, Debug)]
pub enum FuzzAction {
    Deposit { amount: u32, lock: u16, tier: u8 },
    Withdraw { slot: u8, amount: u32 },
    Claim,
    Advance { ledgers: u8 },
    ToggleEmergency,
    EmergencyWithdraw,
}

fn threshold_tier(seed: u8) -> ThresholdTier {
    match seed % 4 {
        0 => ThresholdTier::None,
        1 => ThresholdTier::Silver,
        2 => ThresholdTier::Gold,
        _ => ThresholdTier::Diamond,
    }
}

fn sign(env: &Env, key: &SigningKey, digest: &BytesN<32>) -> AuthSignature {
    AuthSignature {
        signer: BytesN::from_array(env, &key.verifying_key().to_bytes()),
        signature: BytesN::from_array(env, &key.sign(&digest.to_array()).to_bytes()),
    }
}

fn salt(env: &Env, n: u32) -> BytesN<32> {
    let mut bytes = [0u8; 32];
    bytes[..4].copy_from_slice(&n.to_be_bytes());
    BytesN::from_array(env, &bytes)
}

fuzz_target!(|actions: Vec<FuzzAction>| {
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
    let oracle = SigningKey::from_bytes(&[7u8; 32]);

    client.initialize(
        &controller,
        &stake_token,
        &reward_token,
        &custodian,
        &BytesN::from_array(&env, &oracle.verifying_key().to_bytes()),
        &1_000,
    );
    StellarAssetClient::new(&env, &reward_token).mint(&custodian, &i128::from(u64::MAX));
    TokenClient::new(&env, &reward_token).approve(
        &custodian,
        &contract_id,
        &i128::from(u64::MAX),
        &200_000,
    );

    let stakers: Vec<Address> = (0..3)
        .map(|_| {
            let staker = Address::generate(&env);
            StellarAssetClient::new(&env, &stake_token).mint(&staker, &i128::from(u64::MAX));
            staker
        })
        .collect();
    let stake = TokenClient::new(&env, &stake_token);

    let mut nonce = 0u32;
    for (i, action) in actions.into_iter().enumerate() {
        let staker = &stakers[i % stakers.len()];
        let now = u64::from(env.ledger().sequence());
        nonce += 1;
        match action {
            FuzzAction::Deposit { amount, lock, tier } => {
                let auth = DepositAuthorization {
                    amount: i128::from(amount),
                    lock_duration: u64::from(lock),
                    threshold_tier: threshold_tier(tier),
                    timelock_tier: TimelockTier::None,
                    issued_at: now,
                    salt: salt(&env, nonce),
                };
                let signature = sign(&env, &oracle, &client.deposit_digest(staker, &auth));
                let _ = client.try_deposit(staker, &auth, &signature);
            }
            FuzzAction::Withdraw { slot, amount } => {
                let auth = WithdrawAuthorization {
                    slot_index: u32::from(slot % 12),
                    amount: i128::from(amount),
                    threshold_tier: ThresholdTier::None,
                    issued_at: now,
                    salt: salt(&env, nonce),
                };
                let signature = sign(&env, &oracle, &client.withdraw_digest(staker, &auth));
                let _ = client.try_withdraw(staker, &auth, &signature);
            }
            FuzzAction::Claim => {
                let _ = client.try_claim(staker);
            }
            FuzzAction::Advance { ledgers } => {
                env.ledger()
                    .set_sequence_number(env.ledger().sequence() + u32::from(ledgers));
            }
            FuzzAction::ToggleEmergency => {
                let on = !client.is_emergency();
                client.set_emergency(&controller, &on);
            }
            FuzzAction::EmergencyWithdraw => {
                let _ = client.try_emergency_withdraw(staker);
            }
        }

        let booked: i128 = stakers.iter().map(|s| client.get_total_principal(s)).sum();
        assert_eq!(client.get_total_staked(), booked);
        assert_eq!(stake.balance(&contract_id), booked);
    }
});
