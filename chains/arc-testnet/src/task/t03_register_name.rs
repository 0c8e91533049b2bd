use super::{validate, CallBuilder, ContractSet};
use core_logic::ValidationError;
use ethers::abi::{self, ParamType, Token};
use ethers::prelude::*;

/// `register(string,address)` with the zero address as resolver and a
/// registration fee of exactly one native unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterName {
    pub name: String,
}

impl CallBuilder for RegisterName {
    fn name(&self) -> &str {
        "registerName"
    }

    fn build(&self, contracts: &ContractSet) -> Result<Eip1559TransactionRequest, ValidationError> {
        validate::name(&self.name)?;
        let registry = contracts.require_name_registry()?;

        let mut data =
            abi::short_signature("register", &[ParamType::String, ParamType::Address]).to_vec();
        data.extend(abi::encode(&[
            Token::String(self.name.clone()),
            Token::Address(Address::zero()),
        ]));

        Ok(Eip1559TransactionRequest::new()
            .to(registry)
            .data(Bytes::from(data))
            .value(U256::exp10(18)))
    }
}
