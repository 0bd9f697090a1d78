//! Declarative access-control conditions evaluated by the decryption
//! service.
//!
//! The wire schema (`conditionType`, `contractAddress`,
//! `standardContractType`, `chain`, `method`, `parameters`,
//! `returnValueTest`) is fixed by the external service and must be
//! reproduced key-for-key for interoperability.

use serde::{Deserialize, Serialize};

/// A single declarative predicate over the requester's wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessControlCondition {
    pub condition_type: String,
    pub contract_address: String,
    pub standard_contract_type: String,
    pub chain: String,
    pub method: String,
    pub parameters: Vec<String>,
    pub return_value_test: ReturnValueTest,
}

/// Comparison the service applies to the evaluated parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnValueTest {
    pub comparator: String,
    pub value: String,
}

impl AccessControlCondition {
    /// Condition requiring the requester's wallet address to equal
    /// `address`, evaluated on the named chain.
    ///
    /// This is the single condition the bid-signature flow uses: the
    /// special `:userAddress` parameter resolves to the address proven by
    /// the attached authorization signature.
    pub fn wallet_is(address: &str, chain_name: &str) -> Self {
        Self {
            condition_type: "evmBasic".to_string(),
            contract_address: String::new(),
            standard_contract_type: String::new(),
            chain: chain_name.to_string(),
            method: String::new(),
            parameters: vec![":userAddress".to_string()],
            return_value_test: ReturnValueTest {
                comparator: "=".to_string(),
                value: address.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const TEST_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

    #[test]
    fn test_wallet_is_serializes_to_service_schema() {
        let condition = AccessControlCondition::wallet_is(TEST_ADDRESS, "xdai");

        let value = serde_json::to_value(&condition).unwrap();
        assert_eq!(
            value,
            json!({
                "conditionType": "evmBasic",
                "contractAddress": "",
                "standardContractType": "",
                "chain": "xdai",
                "method": "",
                "parameters": [":userAddress"],
                "returnValueTest": {
                    "comparator": "=",
                    "value": TEST_ADDRESS,
                },
            })
        );
    }

    #[test]
    fn test_wallet_is_binds_the_requesting_address() {
        let condition = AccessControlCondition::wallet_is(TEST_ADDRESS, "polygon");
        assert_eq!(condition.return_value_test.value, TEST_ADDRESS);
        assert_eq!(condition.return_value_test.comparator, "=");
        assert_eq!(condition.chain, "polygon");
    }

    #[test]
    fn test_round_trips_through_json() {
        let condition = AccessControlCondition::wallet_is(TEST_ADDRESS, "ethereum");
        let json = serde_json::to_string(&condition).unwrap();
        let parsed: AccessControlCondition = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, condition);
    }
}
