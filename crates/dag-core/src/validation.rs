//! Transaction verification against a network/chain context.
//!
//! [`verify_transaction`] performs the structural and signature checks a
//! node would run without access to its UTXO database. [`verify_spends`]
//! adds the ownership checks that need the consumed UTXOs, which a wallet
//! has at hand when it builds a transaction.

use std::collections::{HashMap, HashSet};

use crate::crypto;
use crate::error::ValidationError;
use crate::types::{Hash256, Transaction, TxOutput, Utxo, UtxoId};

/// The chain a transaction must be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifyContext {
    pub network_id: u32,
    pub chain_id: Hash256,
    /// Minimum amount by which inputs must exceed outputs.
    pub fee: u64,
}

/// Verify chain binding, structure, value conservation and signatures.
pub fn verify_transaction(tx: &Transaction, ctx: &VerifyContext) -> Result<(), ValidationError> {
    if tx.network_id != ctx.network_id {
        return Err(ValidationError::NetworkMismatch {
            expected: ctx.network_id,
            got: tx.network_id,
        });
    }
    if tx.chain_id != ctx.chain_id {
        return Err(ValidationError::ChainMismatch);
    }
    if tx.inputs.is_empty() {
        return Err(ValidationError::NoInputs);
    }
    if tx.outputs.is_empty() {
        return Err(ValidationError::NoOutputs);
    }

    let mut seen = HashSet::with_capacity(tx.inputs.len());
    for id in tx.input_ids() {
        if !seen.insert(id) {
            return Err(ValidationError::DuplicateInput(id.to_string()));
        }
    }

    for (index, output) in tx.outputs.iter().enumerate() {
        check_output(index, output)?;
    }

    let inputs = tx
        .total_input_amount()
        .ok_or(ValidationError::AmountOverflow)?;
    let outputs = tx
        .total_output_amount()
        .ok_or(ValidationError::AmountOverflow)?;
    let required = outputs
        .checked_add(ctx.fee)
        .ok_or(ValidationError::AmountOverflow)?;
    if inputs < required {
        return Err(ValidationError::InsufficientInputs {
            inputs,
            outputs,
            fee: ctx.fee,
        });
    }

    for (index, input) in tx.inputs.iter().enumerate() {
        if input.credentials.is_empty() {
            return Err(ValidationError::MissingCredentials(index));
        }
        crypto::verify_input(tx, index)
            .map_err(|source| ValidationError::BadCredential { index, source })?;
    }

    Ok(())
}

/// Require `sum(inputs) == sum(outputs) + fee` exactly.
///
/// [`verify_transaction`] only requires inputs to cover outputs plus fee;
/// a wallet-built transaction must not burn anything beyond the fee.
pub fn verify_exact_fee(tx: &Transaction, ctx: &VerifyContext) -> Result<(), ValidationError> {
    let inputs = tx
        .total_input_amount()
        .ok_or(ValidationError::AmountOverflow)?;
    let outputs = tx
        .total_output_amount()
        .ok_or(ValidationError::AmountOverflow)?;
    let required = outputs
        .checked_add(ctx.fee)
        .ok_or(ValidationError::AmountOverflow)?;
    match inputs.cmp(&required) {
        std::cmp::Ordering::Equal => Ok(()),
        std::cmp::Ordering::Less => Err(ValidationError::InsufficientInputs {
            inputs,
            outputs,
            fee: ctx.fee,
        }),
        std::cmp::Ordering::Greater => Err(ValidationError::ExcessInputs {
            inputs,
            outputs,
            fee: ctx.fee,
        }),
    }
}

/// Verify that every input spends a known UTXO with matching amount and is
/// signed by at least `threshold` distinct owners of that UTXO.
///
/// Signatures themselves are checked by [`verify_transaction`].
pub fn verify_spends(tx: &Transaction, spent: &[Utxo]) -> Result<(), ValidationError> {
    let by_id: HashMap<UtxoId, &Utxo> = spent.iter().map(|u| (u.id(), u)).collect();

    for (index, input) in tx.inputs.iter().enumerate() {
        let utxo = by_id
            .get(&input.utxo_id())
            .ok_or(ValidationError::UnknownUtxo(index))?;
        if utxo.amount() != input.amount {
            return Err(ValidationError::AmountMismatch {
                index,
                expected: utxo.amount(),
                got: input.amount,
            });
        }

        let signers = crypto::verify_input(tx, index)
            .map_err(|source| ValidationError::BadCredential { index, source })?;
        let mut distinct = HashSet::with_capacity(signers.len());
        for signer in signers {
            if !utxo.output.addresses.contains(&signer) {
                return Err(ValidationError::ForeignSigner(index));
            }
            distinct.insert(signer);
        }
        if distinct.len() < utxo.output.threshold as usize {
            return Err(ValidationError::ThresholdNotMet {
                index,
                threshold: utxo.output.threshold,
                got: distinct.len(),
            });
        }
    }
    Ok(())
}

fn check_output(index: usize, output: &TxOutput) -> Result<(), ValidationError> {
    if output.amount == 0 {
        return Err(ValidationError::ZeroAmountOutput(index));
    }
    if output.threshold == 0 || output.threshold as usize > output.addresses.len() {
        return Err(ValidationError::InvalidThreshold {
            index,
            threshold: output.threshold,
            addresses: output.addresses.len(),
        });
    }
    if !output.addresses.windows(2).all(|w| w[0] < w[1]) {
        return Err(ValidationError::UnsortedAddresses(index));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{KeyPair, sign_input};
    use crate::error::CryptoError;
    use crate::types::{ShortId, TxInput};

    const FEE: u64 = 1;

    fn ctx() -> VerifyContext {
        VerifyContext {
            network_id: 5,
            chain_id: Hash256([7; 32]),
            fee: FEE,
        }
    }

    fn owned_utxo(kp: &KeyPair, tx: u8, amount: u64) -> Utxo {
        Utxo {
            tx_id: Hash256([tx; 32]),
            output_index: 0,
            output: TxOutput {
                amount,
                lock_time: 0,
                threshold: 1,
                addresses: vec![kp.short_id()],
            },
        }
    }

    fn spend(kp: &KeyPair, utxo: &Utxo, out_amount: u64) -> Transaction {
        let mut tx = Transaction {
            network_id: 5,
            chain_id: Hash256([7; 32]),
            inputs: vec![TxInput {
                tx_id: utxo.tx_id,
                output_index: utxo.output_index,
                amount: utxo.amount(),
                credentials: vec![],
            }],
            outputs: vec![TxOutput {
                amount: out_amount,
                lock_time: 0,
                threshold: 1,
                addresses: vec![ShortId([1; 20])],
            }],
        };
        sign_input(&mut tx, 0, &[kp]).unwrap();
        tx
    }

    #[test]
    fn well_formed_spend_verifies() {
        let kp = KeyPair::from_secret_bytes([1; 32]);
        let utxo = owned_utxo(&kp, 1, 100);
        let tx = spend(&kp, &utxo, 99);
        verify_transaction(&tx, &ctx()).unwrap();
        verify_spends(&tx, &[utxo]).unwrap();
    }

    #[test]
    fn wrong_network_rejected() {
        let kp = KeyPair::from_secret_bytes([1; 32]);
        let tx = spend(&kp, &owned_utxo(&kp, 1, 100), 99);
        let other = VerifyContext { network_id: 6, ..ctx() };
        assert_eq!(
            verify_transaction(&tx, &other),
            Err(ValidationError::NetworkMismatch { expected: 6, got: 5 })
        );
    }

    #[test]
    fn wrong_chain_rejected() {
        let kp = KeyPair::from_secret_bytes([1; 32]);
        let tx = spend(&kp, &owned_utxo(&kp, 1, 100), 99);
        let other = VerifyContext { chain_id: Hash256::ZERO, ..ctx() };
        assert_eq!(verify_transaction(&tx, &other), Err(ValidationError::ChainMismatch));
    }

    #[test]
    fn fee_must_be_covered() {
        let kp = KeyPair::from_secret_bytes([1; 32]);
        let tx = spend(&kp, &owned_utxo(&kp, 1, 100), 100);
        assert_eq!(
            verify_transaction(&tx, &ctx()),
            Err(ValidationError::InsufficientInputs { inputs: 100, outputs: 100, fee: FEE })
        );
    }

    #[test]
    fn exact_fee_rejects_overpayment() {
        let kp = KeyPair::from_secret_bytes([1; 32]);
        let exact = spend(&kp, &owned_utxo(&kp, 1, 100), 99);
        verify_exact_fee(&exact, &ctx()).unwrap();

        let overpaid = spend(&kp, &owned_utxo(&kp, 1, 100), 90);
        verify_transaction(&overpaid, &ctx()).unwrap();
        assert_eq!(
            verify_exact_fee(&overpaid, &ctx()),
            Err(ValidationError::ExcessInputs { inputs: 100, outputs: 90, fee: FEE })
        );
        let underpaid = spend(&kp, &owned_utxo(&kp, 1, 100), 100);
        assert!(matches!(
            verify_exact_fee(&underpaid, &ctx()),
            Err(ValidationError::InsufficientInputs { .. })
        ));
    }

    #[test]
    fn duplicate_inputs_rejected() {
        let kp = KeyPair::from_secret_bytes([1; 32]);
        let utxo = owned_utxo(&kp, 1, 100);
        let mut tx = spend(&kp, &utxo, 99);
        tx.inputs.push(tx.inputs[0].clone());
        assert!(matches!(
            verify_transaction(&tx, &ctx()),
            Err(ValidationError::DuplicateInput(_))
        ));
    }

    #[test]
    fn unsigned_input_rejected() {
        let kp = KeyPair::from_secret_bytes([1; 32]);
        let mut tx = spend(&kp, &owned_utxo(&kp, 1, 100), 99);
        tx.inputs[0].credentials.clear();
        assert_eq!(
            verify_transaction(&tx, &ctx()),
            Err(ValidationError::MissingCredentials(0))
        );
    }

    #[test]
    fn tampered_amount_fails_signature() {
        let kp = KeyPair::from_secret_bytes([1; 32]);
        let mut tx = spend(&kp, &owned_utxo(&kp, 1, 100), 50);
        tx.outputs[0].amount = 60;
        assert_eq!(
            verify_transaction(&tx, &ctx()),
            Err(ValidationError::BadCredential { index: 0, source: CryptoError::VerificationFailed })
        );
    }

    #[test]
    fn bad_output_threshold_rejected() {
        let kp = KeyPair::from_secret_bytes([1; 32]);
        let mut tx = spend(&kp, &owned_utxo(&kp, 1, 100), 99);
        tx.outputs[0].threshold = 2;
        assert!(matches!(
            verify_transaction(&tx, &ctx()),
            Err(ValidationError::InvalidThreshold { index: 0, threshold: 2, addresses: 1 })
        ));
    }

    #[test]
    fn foreign_signer_rejected() {
        let owner = KeyPair::from_secret_bytes([1; 32]);
        let thief = KeyPair::from_secret_bytes([2; 32]);
        let utxo = owned_utxo(&owner, 1, 100);
        let tx = spend(&thief, &utxo, 99);
        verify_transaction(&tx, &ctx()).unwrap();
        assert_eq!(verify_spends(&tx, &[utxo]), Err(ValidationError::ForeignSigner(0)));
    }

    #[test]
    fn threshold_counts_distinct_signers() {
        let a = KeyPair::from_secret_bytes([1; 32]);
        let b = KeyPair::from_secret_bytes([2; 32]);
        let mut addresses = vec![a.short_id(), b.short_id()];
        addresses.sort();
        let utxo = Utxo {
            tx_id: Hash256([3; 32]),
            output_index: 1,
            output: TxOutput { amount: 10, lock_time: 0, threshold: 2, addresses },
        };
        let mut tx = spend(&a, &utxo, 9);
        sign_input(&mut tx, 0, &[&a, &a]).unwrap();
        assert_eq!(
            verify_spends(&tx, std::slice::from_ref(&utxo)),
            Err(ValidationError::ThresholdNotMet { index: 0, threshold: 2, got: 1 })
        );
        sign_input(&mut tx, 0, &[&a, &b]).unwrap();
        verify_spends(&tx, &[utxo]).unwrap();
    }

    #[test]
    fn owner_list_order_does_not_matter() {
        let kp = KeyPair::from_secret_bytes([1; 32]);
        let mut utxo = owned_utxo(&kp, 1, 100);
        utxo.output.addresses = vec![ShortId([0xFE; 20]), ShortId([0xFD; 20]), kp.short_id()];
        let tx = spend(&kp, &utxo, 99);
        verify_spends(&tx, &[utxo]).unwrap();
    }

    #[test]
    fn unknown_utxo_rejected() {
        let kp = KeyPair::from_secret_bytes([1; 32]);
        let tx = spend(&kp, &owned_utxo(&kp, 1, 100), 99);
        assert_eq!(
            verify_spends(&tx, &[owned_utxo(&kp, 2, 100)]),
            Err(ValidationError::UnknownUtxo(0))
        );
    }
}
