//! Minimal fungible token holding the stakers' balances and the staked pool.

use std::collections::HashMap;

use stakegov_shared_types::{Address, Amount};

use crate::error::{require, ContractResult};

#[derive(Debug, Clone, Default)]
pub struct Token {
    balances: HashMap<Address, Amount>,
    total_supply: Amount,
}

impl Token {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mint(&mut self, to: Address, amount: Amount) {
        *self.balances.entry(to).or_default() += amount;
        self.total_supply += amount;
    }

    pub fn transfer(&mut self, from: Address, to: Address, amount: Amount) -> ContractResult<()> {
        let balance = self.balance_of(from);
        require(balance >= amount, "ERC20: transfer amount exceeds balance")?;
        self.balances.insert(from, balance - amount);
        *self.balances.entry(to).or_default() += amount;
        Ok(())
    }

    pub fn balance_of(&self, holder: Address) -> Amount {
        self.balances.get(&holder).copied().unwrap_or_default()
    }

    pub fn total_supply(&self) -> Amount {
        self.total_supply
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ContractError;

    #[test]
    fn test_transfer_moves_balance() {
        let mut token = Token::new();
        let (a, b) = (Address::derive("a"), Address::derive("b"));
        token.mint(a, Amount::from(100u64));
        token.transfer(a, b, Amount::from(40u64)).unwrap();
        assert_eq!(token.balance_of(a), Amount::from(60u64));
        assert_eq!(token.balance_of(b), Amount::from(40u64));
        assert_eq!(token.total_supply(), Amount::from(100u64));
        assert_eq!(
            token.transfer(b, a, Amount::from(41u64)),
            Err(ContractError::Revert("ERC20: transfer amount exceeds balance"))
        );
    }
}
