use super::{validate, CallBuilder, ContractSet};
use core_logic::ValidationError;
use ethers::prelude::*;

/// Plain value transfer. `value` is in whole native units.
#[derive(Debug, Clone, PartialEq)]
pub struct Transfer {
    pub to: String,
    pub value: f64,
    pub data: Option<Bytes>,
}

impl CallBuilder for Transfer {
    fn name(&self) -> &str {
        "transfer"
    }

    fn build(&self, _contracts: &ContractSet) -> Result<Eip1559TransactionRequest, ValidationError> {
        let to = validate::address(&self.to)?;
        let value = validate::to_base_units("value", self.value)?;

        let mut tx = Eip1559TransactionRequest::new().to(to).value(value);
        if let Some(data) = &self.data {
            tx = tx.data(data.clone());
        }
        Ok(tx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transfer_converts_value() {
        let call = Transfer {
            to: "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed".to_string(),
            value: 0.25,
            data: Some(Bytes::from(vec![0xde, 0xad])),
        };
        let tx = call.build(&ContractSet::default()).unwrap();

        assert_eq!(tx.value, Some(U256::exp10(16) * 25));
        assert_eq!(tx.data.unwrap().to_vec(), vec![0xde, 0xad]);
    }

    #[test]
    fn test_negative_value_rejected() {
        let call = Transfer {
            to: "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed".to_string(),
            value: -0.1,
            data: None,
        };
        assert!(matches!(
            call.build(&ContractSet::default()),
            Err(ValidationError::InvalidAmount { .. })
        ));
    }
}
