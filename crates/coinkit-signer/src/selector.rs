/// Greedy unspent-output selection.
///
/// Outputs are considered in the order the caller supplies them, which
/// makes selection deterministic for a given input list. The fee moves
/// as inputs are added, so the target is re-evaluated after every
/// addition until the running total covers amount plus fee.

use coinkit_script::ScriptTemplate;

use crate::fee::{input_size, output_size, TX_OVERHEAD_SIZE};
use crate::plan::UnspentOutput;
use crate::SignerError;

fn fee_for(selected: &[&UnspentOutput], output_count: usize, byte_fee: u64) -> u64 {
    let size = TX_OVERHEAD_SIZE
        + selected
            .iter()
            .map(|u| input_size(u.script.classify()))
            .sum::<u64>()
        + output_count as u64 * output_size(ScriptTemplate::PayToPublicKeyHash);
    size.saturating_mul(byte_fee)
}

/// Sum output values, rejecting totals that do not fit in a u64.
///
/// Values come from the caller, so the sum is not trusted to stay in
/// range the way consensus-valid amounts would.
pub(crate) fn total_value<'a, I>(utxos: I) -> Result<u64, SignerError>
where
    I: IntoIterator<Item = &'a UnspentOutput>,
{
    utxos.into_iter().try_fold(0u64, |acc, utxo| {
        acc.checked_add(utxo.value).ok_or_else(|| {
            SignerError::MalformedInput("unspent output values overflow u64".to_string())
        })
    })
}

/// Select unspent outputs to cover `target` plus the fee their spend
/// incurs.
///
/// Walks `utxos` in order, adding one at a time and re-computing the
/// fee, until the selected total reaches `target + fee` (a fixed point,
/// since each addition raises the fee).
///
/// # Arguments
/// * `utxos` - Candidate outputs, in selection order.
/// * `target` - Amount to cover, in base units. Must be positive.
/// * `byte_fee` - Fee rate in base units per byte.
/// * `output_count` - Number of outputs the transaction will create.
///
/// # Returns
/// The selected outputs and the fee for spending them, or
/// `InsufficientFunds` when even the full list cannot cover the target.
pub fn select(
    utxos: &[UnspentOutput],
    target: u64,
    byte_fee: u64,
    output_count: usize,
) -> Result<(Vec<UnspentOutput>, u64), SignerError> {
    if target == 0 {
        return Err(SignerError::MalformedInput(
            "selection target must be positive".to_string(),
        ));
    }

    let mut selected: Vec<&UnspentOutput> = Vec::new();
    let mut total = 0u64;
    for utxo in utxos {
        selected.push(utxo);
        total = total.checked_add(utxo.value).ok_or_else(|| {
            SignerError::MalformedInput("unspent output values overflow u64".to_string())
        })?;
        let fee = fee_for(&selected, output_count, byte_fee);
        if total >= target.saturating_add(fee) {
            log::debug!(
                "selected {} of {} utxos: total={} target={} fee={}",
                selected.len(),
                utxos.len(),
                total,
                target,
                fee
            );
            return Ok((selected.into_iter().cloned().collect(), fee));
        }
    }

    let fee = fee_for(&selected, output_count, byte_fee);
    Err(SignerError::InsufficientFunds {
        available: total,
        required: target.saturating_add(fee),
    })
}

/// Select every unspent output worth spending and compute the maximum
/// sendable amount.
///
/// An output qualifies when its value exceeds its own marginal input
/// cost at the given rate; anything cheaper is dust that would shrink
/// the total. The resulting transaction has a single output.
///
/// # Arguments
/// * `utxos` - Candidate outputs.
/// * `byte_fee` - Fee rate in base units per byte.
///
/// # Returns
/// `(selected, fee, amount)` with `amount` floored at zero, or
/// `InsufficientFunds` when no output is worth spending.
pub fn select_max(
    utxos: &[UnspentOutput],
    byte_fee: u64,
) -> Result<(Vec<UnspentOutput>, u64, u64), SignerError> {
    let selected: Vec<&UnspentOutput> = utxos
        .iter()
        .filter(|u| u.value > input_size(u.script.classify()).saturating_mul(byte_fee))
        .collect();

    if selected.is_empty() {
        return Err(SignerError::InsufficientFunds {
            available: total_value(utxos)?,
            required: fee_for(&[], 1, byte_fee).saturating_add(1),
        });
    }

    let total = total_value(selected.iter().copied())?;
    let fee = fee_for(&selected, 1, byte_fee);
    let amount = total.saturating_sub(fee);
    log::debug!(
        "max selection: {} of {} utxos, total={} fee={} amount={}",
        selected.len(),
        utxos.len(),
        total,
        fee,
        amount
    );
    Ok((selected.into_iter().cloned().collect(), fee, amount))
}
