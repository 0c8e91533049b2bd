use super::{validate, CallBuilder, ContractSet};
use core_logic::ValidationError;
use ethers::abi::{self, Token};
use ethers::prelude::*;

/// Creation fee the token factory bytecode expects, 0.000037 native.
pub const CREATION_FEE_WEI: u64 = 0x21a6bbdb5000;
pub const DEPLOY_GAS_LIMIT: u64 = 1_500_000;

/// ERC-20 deployment: bytecode ++ abi(name, symbol, supply * 10^18).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployToken {
    pub name: String,
    pub symbol: String,
    pub supply: u64,
}

impl CallBuilder for DeployToken {
    fn name(&self) -> &str {
        "deployToken"
    }

    fn build(&self, contracts: &ContractSet) -> Result<Eip1559TransactionRequest, ValidationError> {
        validate::token_name(&self.name)?;
        validate::symbol(&self.symbol)?;
        if self.supply < 1 {
            return Err(ValidationError::InvalidAmount {
                field: "supply".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        let bytecode = contracts.require_token_bytecode()?;

        let supply = U256::from(self.supply)
            .checked_mul(U256::exp10(18))
            .ok_or_else(|| ValidationError::InvalidAmount {
                field: "supply".to_string(),
                reason: "overflows uint256".to_string(),
            })?;

        let mut data = bytecode.to_vec();
        data.extend(abi::encode(&[
            Token::String(self.name.clone()),
            Token::String(self.symbol.clone()),
            Token::Uint(supply),
        ]));

        Ok(Eip1559TransactionRequest::new()
            .data(Bytes::from(data))
            .value(U256::from(CREATION_FEE_WEI))
            .gas(DEPLOY_GAS_LIMIT))
    }
}
