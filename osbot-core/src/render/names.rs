//! Counterparty display names.

use async_trait::async_trait;

/// The all-zero address; transfers from it are mints.
pub const NULL_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

/// Resolves a wallet address into something readable.
///
/// Implementations never fail: when no name can be found they fall back to
/// [`short_address`].
#[async_trait]
pub trait AccountNames: Send + Sync {
    async fn display_name(&self, address: &str) -> String;
}

/// Names every account by its shortened address, without any lookup.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShortAddresses;

#[async_trait]
impl AccountNames for ShortAddresses {
    async fn display_name(&self, address: &str) -> String {
        short_address(address)
    }
}

/// `0x1234…abcd`: the first six and last four characters. Short inputs are
/// returned unchanged.
pub fn short_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 12 {
        return address.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}…{tail}")
}

pub fn is_null_address(address: &str) -> bool {
    address.eq_ignore_ascii_case(NULL_ADDRESS)
}
