/// Signing requests, plans, and the transaction builder.
///
/// A `SigningRequest` describes what the caller wants to spend; the
/// planner turns it into a `SigningPlan` whose bookkeeping always
/// satisfies `available == amount + change + fee`; the builder turns
/// the plan into an unsigned transaction.

use coinkit_script::Script;
use coinkit_transaction::{OutPoint, Transaction, TransactionInput, TransactionOutput};
use serde::{Deserialize, Serialize};

use crate::selector::{select, select_max, total_value};
use crate::SignerError;

/// An unspent output available for spending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnspentOutput {
    /// Where the output lives.
    pub outpoint: OutPoint,
    /// Amount in base units.
    pub value: u64,
    /// The locking script of the output.
    pub script: Script,
    /// Sequence to use on the input that spends this output.
    pub sequence: u32,
}

impl UnspentOutput {
    /// Create an unspent output with the default (final) sequence.
    pub fn new(outpoint: OutPoint, value: u64, script: Script) -> Self {
        UnspentOutput {
            outpoint,
            value,
            script,
            sequence: coinkit_transaction::DEFAULT_SEQUENCE,
        }
    }
}

/// What the caller wants to spend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SigningRequest {
    /// Candidate unspent outputs, in selection order.
    pub utxos: Vec<UnspentOutput>,
    /// Amount to send, in base units. Ignored when `use_max_amount`.
    pub amount: u64,
    /// Fee rate in base units per byte.
    pub byte_fee: u64,
    /// Sweep mode: spend everything worth spending into one output.
    pub use_max_amount: bool,
    /// Lock time for the built transaction.
    pub lock_time: u32,
}

/// The outcome of selection and fee bookkeeping.
///
/// Invariant: `available_amount == amount + change + fee`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigningPlan {
    /// The outputs that will be spent.
    pub selected_utxos: Vec<UnspentOutput>,
    /// Amount reaching the destination.
    pub amount: u64,
    /// Fee paid to miners.
    pub fee: u64,
    /// Amount returned to the change script. Zero means no change output.
    pub change: u64,
    /// Total value of the selected outputs.
    pub available_amount: u64,
}

/// Builds unsigned transactions from requests.
pub struct TransactionBuilder;

impl TransactionBuilder {
    /// Plan a spend: run selection and compute the amount/fee/change
    /// split.
    ///
    /// # Arguments
    /// * `request` - The spend to plan.
    ///
    /// # Returns
    /// A plan satisfying the conservation invariant, or a selection
    /// error.
    pub fn plan(request: &SigningRequest) -> Result<SigningPlan, SignerError> {
        if request.use_max_amount {
            let (selected, _, amount) = select_max(&request.utxos, request.byte_fee)?;
            let available_amount = total_value(&selected)?;
            // amount is floored at zero; whatever the floor cut off is
            // absorbed into the fee so conservation holds.
            let fee = available_amount - amount;
            return Ok(SigningPlan {
                selected_utxos: selected,
                amount,
                fee,
                change: 0,
                available_amount,
            });
        }

        let (selected, fee) = select(&request.utxos, request.amount, request.byte_fee, 2)?;
        let available_amount = total_value(&selected)?;
        // Selection guarantees available >= amount + fee; the clamp
        // guards the boundary where they are exactly equal.
        let amount = request.amount.min(available_amount - fee);
        let change = available_amount - amount - fee;
        Ok(SigningPlan {
            selected_utxos: selected,
            amount,
            fee,
            change,
            available_amount,
        })
    }

    /// Build the unsigned transaction for a plan.
    ///
    /// One input per selected output, carrying that output's sequence
    /// and an empty unlocking script. One primary output, plus a change
    /// output iff the plan has change.
    ///
    /// # Arguments
    /// * `plan` - The plan to realize.
    /// * `to_script` - Locking script for the destination.
    /// * `change_script` - Locking script for change. May be empty when
    ///   the plan has no change.
    /// * `lock_time` - Lock time for the transaction.
    ///
    /// # Returns
    /// The unsigned transaction, or `InvalidAddress` for an empty
    /// destination (or missing change) script.
    pub fn build(
        plan: &SigningPlan,
        to_script: &Script,
        change_script: &Script,
        lock_time: u32,
    ) -> Result<Transaction, SignerError> {
        if to_script.is_empty() {
            return Err(SignerError::InvalidAddress(
                "destination script is empty".to_string(),
            ));
        }
        if plan.change > 0 && change_script.is_empty() {
            return Err(SignerError::InvalidAddress(
                "change script is empty".to_string(),
            ));
        }

        let mut tx = Transaction::new();
        tx.lock_time = lock_time;
        for utxo in &plan.selected_utxos {
            tx.add_input(TransactionInput::with_sequence(utxo.outpoint, utxo.sequence));
        }
        tx.add_output(TransactionOutput::new(plan.amount, to_script.clone()));
        if plan.change > 0 {
            tx.add_output(TransactionOutput::new(plan.change, change_script.clone()));
        }
        log::debug!(
            "built transaction: {} inputs, {} outputs, amount={} change={} fee={}",
            tx.inputs.len(),
            tx.outputs.len(),
            plan.amount,
            plan.change,
            plan.fee
        );
        Ok(tx)
    }
}
