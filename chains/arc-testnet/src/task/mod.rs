use core_logic::{OperationKind, ValidationError};
use ethers::prelude::*;
use ethers::types::transaction::eip2718::TypedTransaction;

pub mod random;
pub mod t01_mint_nft;
pub mod t02_deploy_token;
pub mod t03_register_name;
pub mod t04_transfer;
pub mod validate;

pub use self::t01_mint_nft::MintNft;
pub use self::t02_deploy_token::DeployToken;
pub use self::t03_register_name::RegisterName;
pub use self::t04_transfer::Transfer;

/// Turns operation parameters into an unsigned call. Implementations are
/// pure: no I/O, and every validation failure is reported before a
/// connection is ever resolved.
pub trait CallBuilder {
    fn name(&self) -> &str;
    fn build(&self, contracts: &ContractSet) -> Result<Eip1559TransactionRequest, ValidationError>;
}

/// Contract targets the builders need. Unset entries make the dependent
/// operation fail validation.
#[derive(Debug, Clone, Default)]
pub struct ContractSet {
    pub nft_contract: Option<Address>,
    pub name_registry: Option<Address>,
    pub token_bytecode: Option<Bytes>,
}

impl ContractSet {
    pub fn require_nft_contract(&self) -> Result<Address, ValidationError> {
        self.nft_contract.ok_or_else(|| ValidationError::MissingContract {
            field: "nft_contract".to_string(),
        })
    }

    pub fn require_name_registry(&self) -> Result<Address, ValidationError> {
        self.name_registry.ok_or_else(|| ValidationError::MissingContract {
            field: "name_registry".to_string(),
        })
    }

    pub fn require_token_bytecode(&self) -> Result<&Bytes, ValidationError> {
        self.token_bytecode
            .as_ref()
            .ok_or_else(|| ValidationError::MissingContract {
                field: "token_bytecode_file".to_string(),
            })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum OperationRequest {
    Mint(MintNft),
    DeployToken(DeployToken),
    RegisterName(RegisterName),
    Transfer(Transfer),
}

impl OperationRequest {
    pub fn mint(amount: u64) -> Self {
        Self::Mint(MintNft { amount })
    }

    pub fn deploy_token(name: impl Into<String>, symbol: impl Into<String>, supply: u64) -> Self {
        Self::DeployToken(DeployToken {
            name: name.into(),
            symbol: symbol.into(),
            supply,
        })
    }

    pub fn register_name(name: impl Into<String>) -> Self {
        Self::RegisterName(RegisterName { name: name.into() })
    }

    pub fn transfer(to: impl Into<String>, value: f64, data: Option<Bytes>) -> Self {
        Self::Transfer(Transfer {
            to: to.into(),
            value,
            data,
        })
    }

    pub fn kind(&self) -> OperationKind {
        match self {
            Self::Mint(_) => OperationKind::Mint,
            Self::DeployToken(_) => OperationKind::DeployToken,
            Self::RegisterName(_) => OperationKind::RegisterName,
            Self::Transfer(_) => OperationKind::Transfer,
        }
    }

    /// How many counter units a confirmation of this request is worth.
    pub fn units(&self) -> u64 {
        match self {
            Self::Mint(call) => call.amount,
            _ => 1,
        }
    }

    fn builder(&self) -> &dyn CallBuilder {
        match self {
            Self::Mint(call) => call,
            Self::DeployToken(call) => call,
            Self::RegisterName(call) => call,
            Self::Transfer(call) => call,
        }
    }

    pub fn name(&self) -> &str {
        self.builder().name()
    }
}

/// Dispatches requests to their builders against one contract set.
#[derive(Debug, Clone, Default)]
pub struct OperationCatalog {
    contracts: ContractSet,
}

impl OperationCatalog {
    pub fn new(contracts: ContractSet) -> Self {
        Self { contracts }
    }

    pub fn build(&self, request: &OperationRequest) -> Result<TypedTransaction, ValidationError> {
        let tx = request.builder().build(&self.contracts)?;
        Ok(tx.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_dispatches_by_kind() {
        let catalog = OperationCatalog::new(ContractSet {
            nft_contract: Some(Address::repeat_byte(1)),
            name_registry: Some(Address::repeat_byte(2)),
            token_bytecode: None,
        });

        let mint = catalog.build(&OperationRequest::mint(1)).unwrap();
        assert_eq!(mint.to_addr(), Some(&Address::repeat_byte(1)));

        let register = catalog
            .build(&OperationRequest::register_name("arclab1234"))
            .unwrap();
        assert_eq!(register.to_addr(), Some(&Address::repeat_byte(2)));

        assert!(matches!(
            catalog.build(&OperationRequest::deploy_token("Token", "TK", 1)),
            Err(ValidationError::MissingContract { .. })
        ));
    }

    #[test]
    fn test_units_and_kind() {
        let request = OperationRequest::mint(5);
        assert_eq!(request.units(), 5);
        assert_eq!(request.kind(), OperationKind::Mint);
        assert_eq!(request.name(), "mint");
        assert_eq!(OperationRequest::register_name("abc").units(), 1);
    }
}
