use super::{CallBuilder, ContractSet};
use core_logic::ValidationError;
use ethers::abi::{self, ParamType, Token};
use ethers::prelude::*;

/// `mint(uint256)` on the configured NFT contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintNft {
    pub amount: u64,
}

impl CallBuilder for MintNft {
    fn name(&self) -> &str {
        "mint"
    }

    fn build(&self, contracts: &ContractSet) -> Result<Eip1559TransactionRequest, ValidationError> {
        if self.amount < 1 {
            return Err(ValidationError::InvalidAmount {
                field: "amount".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        let contract = contracts.require_nft_contract()?;

        let mut data = abi::short_signature("mint", &[ParamType::Uint(256)]).to_vec();
        data.extend(abi::encode(&[Token::Uint(U256::from(self.amount))]));

        Ok(Eip1559TransactionRequest::new()
            .to(contract)
            .data(Bytes::from(data)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mint_calldata() {
        let contracts = ContractSet {
            nft_contract: Some(Address::repeat_byte(0x11)),
            ..Default::default()
        };
        let tx = MintNft { amount: 2 }.build(&contracts).unwrap();
        let data = tx.data.unwrap();

        // keccak("mint(uint256)")[..4]
        assert_eq!(&data[..4], &[0xa0, 0x71, 0x2d, 0x68]);
        assert_eq!(data.len(), 36);
        assert_eq!(data[35], 2);
        assert_eq!(tx.to, Some(NameOrAddress::Address(Address::repeat_byte(0x11))));
    }

    #[test]
    fn test_zero_amount_rejected() {
        let contracts = ContractSet {
            nft_contract: Some(Address::repeat_byte(0x11)),
            ..Default::default()
        };
        assert!(MintNft { amount: 0 }.build(&contracts).is_err());
    }

    #[test]
    fn test_missing_contract_rejected() {
        let err = MintNft { amount: 1 }.build(&ContractSet::default()).unwrap_err();
        assert!(matches!(err, ValidationError::MissingContract { .. }));
    }
}
