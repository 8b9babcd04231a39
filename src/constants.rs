//! Constants and unit conversion for bridge-pinger

use alloy::primitives::{address, Address, U256};
use std::time::Duration;

/// Native ETH has 18 decimals
pub const ETHER_DECIMALS: u8 = 18;

/// Bridge contract on Optimism Sepolia that receives every transfer
pub const BRIDGE_CONTRACT: Address = address!("F221750e52aA080835d2957F2Eed0d5d7dDD8C38");

/// Block explorer used for transaction links
pub const DEFAULT_EXPLORER_URL: &str = "https://sepolia-optimistic.etherscan.io";

/// Stop once the balance is at or below this many ETH
pub const BALANCE_THRESHOLD: f64 = 0.1;

/// ETH sent per transaction
pub const TRANSFER_AMOUNT: f64 = 0.1;

/// Pause between cycles
pub const CYCLE_INTERVAL: Duration = Duration::from_secs(30);

/// Gas limit = estimate * GAS_MARGIN_NUMERATOR / GAS_MARGIN_DENOMINATOR (1.2x, truncated)
pub const GAS_MARGIN_NUMERATOR: u64 = 6;
pub const GAS_MARGIN_DENOMINATOR: u64 = 5;

/// Per-request HTTP timeout for RPC calls
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Interval between receipt polls
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Scale a floating point value to U256 with specified decimals
pub fn scale_to_decimals(value: f64, decimals: u8) -> U256 {
    let multiplier = 10u64.pow(decimals as u32);
    let scaled = (value * multiplier as f64) as u128;
    U256::from(scaled)
}

/// Unscale a U256 value to floating point with specified decimals
pub fn unscale_from_decimals(value: U256, decimals: u8) -> f64 {
    let divisor = 10u64.pow(decimals as u32) as f64;
    let value_u128: u128 = value.try_into().unwrap_or(u128::MAX);
    value_u128 as f64 / divisor
}

/// Convert ETH to wei
pub fn scale_ether(amount: f64) -> U256 {
    scale_to_decimals(amount, ETHER_DECIMALS)
}

/// Convert wei to ETH
pub fn unscale_ether(wei: U256) -> f64 {
    unscale_from_decimals(wei, ETHER_DECIMALS)
}

/// Apply the fixed 1.2x safety margin to a gas estimate, rounding down
pub fn gas_limit_with_margin(estimate: u64) -> u64 {
    let scaled = estimate as u128 * GAS_MARGIN_NUMERATOR as u128 / GAS_MARGIN_DENOMINATOR as u128;
    u64::try_from(scaled).unwrap_or(u64::MAX)
}
