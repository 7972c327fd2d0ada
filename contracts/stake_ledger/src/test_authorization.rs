extern crate std;

use ed25519_dalek::SigningKey;

use crate::authorization::AUTH_WINDOW;
use crate::bonus::{ThresholdTier, TimelockTier};
use crate::test_helpers::{public_key, setup, ROGUE_SECRET};
use crate::ContractError;

// ── Deposit authorizations ────────────────────────────────────────────────────

#[test]
fn test_deposit_authorization_is_single_use() {
    let t = setup(100);
    let staker = t.staker(2_000);

    let auth = t.deposit_auth(1_000, 0, ThresholdTier::None, TimelockTier::None);
    let signature = t.sign_deposit(&staker, &auth);
    t.client.deposit(&staker, &auth, &signature);

    let result = t.client.try_deposit(&staker, &auth, &signature);
    match result {
        Err(Ok(e)) => assert_eq!(e, ContractError::SignatureReplayed),
        _ => unreachable!("Expected SignatureReplayed error"),
    }
    assert_eq!(t.client.get_total_principal(&staker), 1_000);
}

#[test]
fn test_same_terms_with_fresh_salt_succeed() {
    let t = setup(100);
    let staker = t.staker(2_000);

    let first = t.deposit_auth(1_000, 0, ThresholdTier::None, TimelockTier::None);
    let second = t.deposit_auth(1_000, 0, ThresholdTier::None, TimelockTier::None);
    assert_ne!(first.salt, second.salt);

    let sig = t.sign_deposit(&staker, &first);
    t.client.deposit(&staker, &first, &sig);
    let sig = t.sign_deposit(&staker, &second);
    t.client.deposit(&staker, &second, &sig);

    assert_eq!(t.client.get_total_principal(&staker), 2_000);
}

#[test]
fn test_deposit_authorization_expiry_boundary() {
    let t = setup(100);
    let staker = t.staker(2_000);

    // Both issued at ledger 0.
    let last_valid = t.deposit_auth(1_000, 0, ThresholdTier::None, TimelockTier::None);
    let too_late = t.deposit_auth(1_000, 0, ThresholdTier::None, TimelockTier::None);
    let sig_valid = t.sign_deposit(&staker, &last_valid);
    let sig_late = t.sign_deposit(&staker, &too_late);

    t.set_ledger((AUTH_WINDOW - 1) as u32);
    t.client.deposit(&staker, &last_valid, &sig_valid);

    t.set_ledger(AUTH_WINDOW as u32);
    match t.client.try_deposit(&staker, &too_late, &sig_late) {
        Err(Ok(e)) => assert_eq!(e, ContractError::SignatureExpired),
        _ => unreachable!("Expected SignatureExpired error"),
    }
    assert_eq!(t.client.get_total_principal(&staker), 1_000);
}

#[test]
fn test_deposit_from_untrusted_signer_rejected() {
    let t = setup(100);
    let staker = t.staker(1_000);
    let rogue = SigningKey::from_bytes(&ROGUE_SECRET);

    let auth = t.deposit_auth(1_000, 0, ThresholdTier::Diamond, TimelockTier::None);
    let forged = t.sign_deposit_with(&rogue, &staker, &auth);

    assert_eq!(
        t.client
            .try_deposit(&staker, &auth, &forged)
            .unwrap_err()
            .unwrap(),
        ContractError::UnauthorizedSigner
    );

    // The failed call left no trace: no principal, digest still unused.
    let digest = t.client.deposit_digest(&staker, &auth);
    assert!(!t.client.is_digest_used(&digest));
    assert_eq!(t.client.get_total_staked(), 0);
    assert_eq!(t.stake_balance(&staker), 1_000);

    // The same terms signed by the oracle still go through.
    let signature = t.sign_deposit(&staker, &auth);
    t.client.deposit(&staker, &auth, &signature);
    assert_eq!(
        t.client.get_slot(&staker, &0).threshold_tier,
        ThresholdTier::Diamond
    );
}

#[test]
#[should_panic(expected = "HostError")]
fn test_tampered_deposit_amount_fails_verification() {
    let t = setup(100);
    let staker = t.staker(10_000);

    let mut auth = t.deposit_auth(100, 0, ThresholdTier::None, TimelockTier::None);
    let signature = t.sign_deposit(&staker, &auth);
    auth.amount = 10_000;

    t.client.deposit(&staker, &auth, &signature);
}

#[test]
#[should_panic(expected = "HostError")]
fn test_deposit_authorization_is_bound_to_staker() {
    let t = setup(100);
    let alice = t.staker(1_000);
    let bob = t.staker(1_000);

    let auth = t.deposit_auth(1_000, 0, ThresholdTier::Gold, TimelockTier::None);
    let signature = t.sign_deposit(&alice, &auth);

    t.client.deposit(&bob, &auth, &signature);
}

#[test]
#[should_panic(expected = "HostError")]
fn test_withdraw_signature_not_accepted_for_deposit() {
    let t = setup(100);
    let staker = t.staker(1_000);

    let withdraw = t.withdraw_auth(0, 1_000, ThresholdTier::None);
    let signature = t.sign_withdraw(&staker, &withdraw);

    let mut deposit = t.deposit_auth(1_000, 0, ThresholdTier::None, TimelockTier::None);
    deposit.salt = withdraw.salt.clone();

    t.client.deposit(&staker, &deposit, &signature);
}

// ── Withdraw authorizations ───────────────────────────────────────────────────

#[test]
fn test_withdraw_authorization_is_single_use() {
    let t = setup(100);
    let staker = t.staker(1_000);
    t.deposit(&staker, 1_000, 0);

    let auth = t.withdraw_auth(0, 300, ThresholdTier::None);
    let signature = t.sign_withdraw(&staker, &auth);
    t.client.withdraw(&staker, &auth, &signature);

    assert_eq!(
        t.client
            .try_withdraw(&staker, &auth, &signature)
            .unwrap_err()
            .unwrap(),
        ContractError::SignatureReplayed
    );
    assert_eq!(t.client.get_slot(&staker, &0).principal, 700);
}

#[test]
fn test_withdraw_authorization_expires() {
    let t = setup(100);
    let staker = t.staker(1_000);
    t.deposit(&staker, 1_000, 0);

    let auth = t.withdraw_auth(0, 1_000, ThresholdTier::None);
    let signature = t.sign_withdraw(&staker, &auth);

    t.set_ledger(AUTH_WINDOW as u32);
    assert_eq!(
        t.client
            .try_withdraw(&staker, &auth, &signature)
            .unwrap_err()
            .unwrap(),
        ContractError::SignatureExpired
    );
    assert_eq!(t.stake_balance(&staker), 0);
}

#[test]
fn test_withdraw_from_untrusted_signer_drops_tier() {
    let t = setup(100);
    let staker = t.staker(1_000);
    let rogue = SigningKey::from_bytes(&ROGUE_SECRET);

    t.deposit_tiered(&staker, 1_000, 0, ThresholdTier::Gold, TimelockTier::None);

    let auth = t.withdraw_auth(0, 400, ThresholdTier::Diamond);
    let signature = t.sign_withdraw_with(&rogue, &staker, &auth);
    t.client.withdraw(&staker, &auth, &signature);

    // Principal still moves; the requested tier is ignored.
    let slot = t.client.get_slot(&staker, &0);
    assert_eq!(slot.principal, 600);
    assert_eq!(slot.threshold_tier, ThresholdTier::None);
    assert_eq!(t.stake_balance(&staker), 400);

    let digest = t.client.withdraw_digest(&staker, &auth);
    assert!(t.client.is_digest_used(&digest));
}

#[test]
fn test_untrusted_withdraw_claims_at_old_tier() {
    let t = setup(100);
    t.client.set_threshold_bonuses(
        &t.controller,
        &soroban_sdk::vec![&t.env, ThresholdTier::Gold],
        &soroban_sdk::vec![&t.env, 5_000u32],
    );
    let staker = t.staker(1_000);
    let rogue = SigningKey::from_bytes(&ROGUE_SECRET);

    t.deposit_tiered(&staker, 1_000, 0, ThresholdTier::Gold, TimelockTier::None);
    t.set_ledger(10);

    let auth = t.withdraw_auth(0, 1_000, ThresholdTier::Gold);
    let signature = t.sign_withdraw_with(&rogue, &staker, &auth);
    t.client.withdraw(&staker, &auth, &signature);

    // Accrued reward is paid under Gold before the downgrade lands.
    assert_eq!(t.reward_balance(&staker), 1_500);
}

// ── Signer rotation ───────────────────────────────────────────────────────────

#[test]
fn test_signer_rotation_switches_trusted_key() {
    let t = setup(100);
    let staker = t.staker(2_000);
    let rogue = SigningKey::from_bytes(&ROGUE_SECRET);

    t.client
        .set_signer(&t.controller, &public_key(&t.env, &rogue));
    assert_eq!(t.client.get_signer(), public_key(&t.env, &rogue));

    let auth = t.deposit_auth(1_000, 0, ThresholdTier::None, TimelockTier::None);
    let old_key_sig = t.sign_deposit(&staker, &auth);
    assert_eq!(
        t.client
            .try_deposit(&staker, &auth, &old_key_sig)
            .unwrap_err()
            .unwrap(),
        ContractError::UnauthorizedSigner
    );

    let new_key_sig = t.sign_deposit_with(&rogue, &staker, &auth);
    t.client.deposit(&staker, &auth, &new_key_sig);
    assert_eq!(t.client.get_total_principal(&staker), 1_000);
}
