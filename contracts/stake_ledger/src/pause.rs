use soroban_sdk::{log, symbol_short, Env, Symbol};

use crate::ContractError;

const PAUSED: Symbol = symbol_short!("PAUSED");
const EMERGENCY: Symbol = symbol_short!("EMRGNCY");

pub fn is_paused(env: &Env) -> bool {
    env.storage().instance().get(&PAUSED).unwrap_or(false)
}

pub fn is_emergency(env: &Env) -> bool {
    env.storage().instance().get(&EMERGENCY).unwrap_or(false)
}

pub fn set_paused(env: &Env, paused: bool) {
    env.storage().instance().set(&PAUSED, &paused);
}

pub fn set_emergency(env: &Env, emergency: bool) {
    if emergency {
        log!(env, "emergency mode engaged");
    }
    env.storage().instance().set(&EMERGENCY, &emergency);
}

/// Normal operation: neither flag may be raised.
///
/// Applies to deposit, withdraw and claim alike.
pub fn require_operational(env: &Env) -> Result<(), ContractError> {
    if is_paused(env) {
        return Err(ContractError::Paused);
    }
    if is_emergency(env) {
        return Err(ContractError::EmergencyActive);
    }
    Ok(())
}

/// Emergency exit is only open while the controller has raised the flag.
pub fn require_emergency(env: &Env) -> Result<(), ContractError> {
    if !is_emergency(env) {
        return Err(ContractError::EmergencyRequired);
    }
    Ok(())
}
