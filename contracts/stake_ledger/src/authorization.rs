//! # Signed authorizations
//!
//! Deposits and withdrawals carry an authorization issued off-chain by a
//! trusted signer, because tier assignment is decided by an oracle that
//! sees more than the contract does.
//!
//! Every authorization is hashed into a domain-separated digest:
//!
//! ```text
//! domain  = keccak(keccak(DOMAIN_TYPE) || keccak(name) || keccak(version)
//!                  || network_id || keccak(contract_xdr))
//! struct  = keccak(keccak(TYPE_STRING) || keccak(staker_xdr) || fields…)
//! digest  = keccak(0x19 || 0x01 || domain || struct)
//! ```
//!
//! Fields are appended at fixed big-endian widths, and each message kind has
//! its own type string, so a deposit signature can never be presented as a
//! withdrawal (or to another deployment, or on another network).
//!
//! A digest is consumed on first successful verification and never freed.

use soroban_sdk::{contracttype, symbol_short, xdr::ToXdr, Address, Bytes, BytesN, Env, Symbol};

use crate::bonus::{ThresholdTier, TimelockTier};
use crate::{logical_now, ContractError};

/// Ledgers an authorization stays valid after `issued_at`.
pub const AUTH_WINDOW: u64 = 600;

const DOMAIN_NAME: &[u8] = b"StakeLedger";
const DOMAIN_VERSION: &[u8] = b"1";
const DOMAIN_TYPE: &[u8] =
    b"Domain(string name,string version,bytes32 networkId,address verifyingContract)";
const DEPOSIT_TYPE: &[u8] = b"DepositAuthorization(address staker,int128 amount,uint64 lockDuration,uint32 thresholdTier,uint32 timelockTier,uint64 issuedAt,bytes32 salt)";
const WITHDRAW_TYPE: &[u8] = b"WithdrawAuthorization(address staker,uint32 slotIndex,int128 amount,uint32 thresholdTier,uint64 issuedAt,bytes32 salt)";

const USED_SIG: Symbol = symbol_short!("USED_SIG");

const PERSISTENT_LIFETIME_THRESHOLD: u32 = 518_400; // ~30 days
const PERSISTENT_BUMP_AMOUNT: u32 = 3_110_400; // ~180 days

// ── Messages ─────────────────────────────────────────────────────────────────

/// Oracle approval for one deposit. The deposit executes exactly these
/// values; nothing is taken from the call arguments.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DepositAuthorization {
    pub amount: i128,
    pub lock_duration: u64,
    pub threshold_tier: ThresholdTier,
    pub timelock_tier: TimelockTier,
    pub issued_at: u64,
    pub salt: BytesN<32>,
}

/// Oracle approval for one withdrawal. `threshold_tier` is the tier the
/// slot keeps after the withdrawal.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WithdrawAuthorization {
    pub slot_index: u32,
    pub amount: i128,
    pub threshold_tier: ThresholdTier,
    pub issued_at: u64,
    pub salt: BytesN<32>,
}

/// Ed25519 signature plus the public key it claims to be from.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AuthSignature {
    pub signer: BytesN<32>,
    pub signature: BytesN<64>,
}

// ── Signer recovery ──────────────────────────────────────────────────────────

/// Resolves the identity that produced `signature` over `digest`.
///
/// Implementations must not return a sentinel for a bad signature; they
/// fail the invocation instead.
pub trait Authorizer {
    fn recover(&self, env: &Env, digest: &BytesN<32>, signature: &AuthSignature) -> BytesN<32>;
}

/// Production authorizer backed by the host's ed25519 verification.
///
/// A signature that does not verify under its claimed key traps the host
/// with a crypto error, aborting the whole invocation.
pub struct Ed25519Authorizer;

impl Authorizer for Ed25519Authorizer {
    fn recover(&self, env: &Env, digest: &BytesN<32>, signature: &AuthSignature) -> BytesN<32> {
        let message = Bytes::from_array(env, &digest.to_array());
        env.crypto()
            .ed25519_verify(&signature.signer, &message, &signature.signature);
        signature.signer.clone()
    }
}

// ── Digests ──────────────────────────────────────────────────────────────────

fn keccak(env: &Env, data: &Bytes) -> BytesN<32> {
    env.crypto().keccak256(data).into()
}

fn keccak_slice(env: &Env, data: &[u8]) -> BytesN<32> {
    keccak(env, &Bytes::from_slice(env, data))
}

fn append32(env: &Env, buf: &mut Bytes, word: &BytesN<32>) {
    buf.append(&Bytes::from_array(env, &word.to_array()));
}

pub fn domain_separator(env: &Env) -> BytesN<32> {
    let mut buf = Bytes::new(env);
    append32(env, &mut buf, &keccak_slice(env, DOMAIN_TYPE));
    append32(env, &mut buf, &keccak_slice(env, DOMAIN_NAME));
    append32(env, &mut buf, &keccak_slice(env, DOMAIN_VERSION));
    append32(env, &mut buf, &env.ledger().network_id());
    let contract = env.current_contract_address().to_xdr(env);
    append32(env, &mut buf, &keccak(env, &contract));
    keccak(env, &buf)
}

fn typed_digest(env: &Env, struct_hash: &BytesN<32>) -> BytesN<32> {
    let mut buf = Bytes::from_slice(env, &[0x19, 0x01]);
    append32(env, &mut buf, &domain_separator(env));
    append32(env, &mut buf, struct_hash);
    keccak(env, &buf)
}

pub fn deposit_digest(env: &Env, staker: &Address, auth: &DepositAuthorization) -> BytesN<32> {
    let mut buf = Bytes::new(env);
    append32(env, &mut buf, &keccak_slice(env, DEPOSIT_TYPE));
    append32(env, &mut buf, &keccak(env, &staker.clone().to_xdr(env)));
    buf.append(&Bytes::from_array(env, &auth.amount.to_be_bytes()));
    buf.append(&Bytes::from_array(env, &auth.lock_duration.to_be_bytes()));
    buf.append(&Bytes::from_array(env, &auth.threshold_tier.index().to_be_bytes()));
    buf.append(&Bytes::from_array(env, &auth.timelock_tier.index().to_be_bytes()));
    buf.append(&Bytes::from_array(env, &auth.issued_at.to_be_bytes()));
    append32(env, &mut buf, &auth.salt);
    typed_digest(env, &keccak(env, &buf))
}

pub fn withdraw_digest(env: &Env, staker: &Address, auth: &WithdrawAuthorization) -> BytesN<32> {
    let mut buf = Bytes::new(env);
    append32(env, &mut buf, &keccak_slice(env, WITHDRAW_TYPE));
    append32(env, &mut buf, &keccak(env, &staker.clone().to_xdr(env)));
    buf.append(&Bytes::from_array(env, &auth.slot_index.to_be_bytes()));
    buf.append(&Bytes::from_array(env, &auth.amount.to_be_bytes()));
    buf.append(&Bytes::from_array(env, &auth.threshold_tier.index().to_be_bytes()));
    buf.append(&Bytes::from_array(env, &auth.issued_at.to_be_bytes()));
    append32(env, &mut buf, &auth.salt);
    typed_digest(env, &keccak(env, &buf))
}

// ── Replay set ───────────────────────────────────────────────────────────────

fn used_key(digest: &BytesN<32>) -> (Symbol, BytesN<32>) {
    (USED_SIG, digest.clone())
}

pub fn is_used(env: &Env, digest: &BytesN<32>) -> bool {
    env.storage().persistent().has(&used_key(digest))
}

fn mark_used(env: &Env, digest: &BytesN<32>) {
    let key = used_key(digest);
    env.storage().persistent().set(&key, &true);
    env.storage()
        .persistent()
        .extend_ttl(&key, PERSISTENT_LIFETIME_THRESHOLD, PERSISTENT_BUMP_AMOUNT);
}

// ── Verification ─────────────────────────────────────────────────────────────

/// Recover the signer of `digest`, enforce the validity window and
/// single use, then consume the digest.
///
/// The returned identity is *not* compared against the configured signer
/// here; withdrawals treat a mismatch differently from deposits.
pub fn verify<A: Authorizer>(
    env: &Env,
    authorizer: &A,
    digest: &BytesN<32>,
    issued_at: u64,
    signature: &AuthSignature,
) -> Result<BytesN<32>, ContractError> {
    let signer = authorizer.recover(env, digest, signature);

    if issued_at.saturating_add(AUTH_WINDOW) <= logical_now(env) {
        return Err(ContractError::SignatureExpired);
    }
    if is_used(env, digest) {
        return Err(ContractError::SignatureReplayed);
    }

    mark_used(env, digest);
    Ok(signer)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
