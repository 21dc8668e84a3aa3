//! Pure accrual arithmetic over immutable stream snapshots.
//!
//! Every function here is a deterministic mapping from inputs to a value or
//! a new snapshot; callers own persistence and write serialization. Nothing
//! in this module logs, blocks, or retries.

use crate::errors::ProcessingError;
use crate::models::{Stream, StreamStatus};
use rust_decimal::Decimal;

/// Check the stored invariants of a snapshot before using it.
///
/// A violation means corrupted state, not bad input; it is surfaced and
/// never auto-corrected.
pub fn validate(stream: &Stream) -> Result<(), ProcessingError> {
    if stream.rate_per_block < Decimal::ZERO
        || stream.total_claimed < Decimal::ZERO
        || stream.unclaimed_balance < Decimal::ZERO
        || stream.max_cap < stream.total_claimed
        || stream.last_updated_block < stream.start_block
    {
        return Err(ProcessingError::InvalidStreamState);
    }
    Ok(())
}

/// Maximum amount claimable at `current_block`.
///
/// Accrues linearly at `rate_per_block` since `last_updated_block` while the
/// stream is `Active`, then clamps to the remaining lifetime cap. A stale
/// `current_block` (behind the last settlement) counts as zero new accrual.
pub fn compute_claimable(stream: &Stream, current_block: u64) -> Result<Decimal, ProcessingError> {
    validate(stream)?;

    let delta_blocks = current_block.saturating_sub(stream.last_updated_block);
    let newly_accrued = if stream.status == StreamStatus::Active {
        Decimal::from(delta_blocks) * stream.rate_per_block
    } else {
        Decimal::ZERO
    };

    let total_available = stream.unclaimed_balance + newly_accrued;
    let remaining_cap = (stream.max_cap - stream.total_claimed).max(Decimal::ZERO);

    Ok(total_available.min(remaining_cap))
}

/// Apply a claim of `amount` at `current_block`, returning the settled
/// snapshot.
///
/// Accrual is always settled up to `current_block` first, so the
/// newly-accrued portion not claimed is retained in `unclaimed_balance`.
/// Reaching the cap flips an `Active` stream to `Completed`.
pub fn apply_claim(
    stream: &Stream,
    current_block: u64,
    amount: Decimal,
) -> Result<Stream, ProcessingError> {
    if amount <= Decimal::ZERO {
        return Err(ProcessingError::InvalidAmount);
    }

    let claimable = compute_claimable(stream, current_block)?;
    if amount > claimable {
        return Err(ProcessingError::InsufficientAccrued);
    }

    let mut next = stream.clone();
    next.unclaimed_balance = claimable - amount;
    next.total_claimed = stream.total_claimed + amount;
    // The settlement clock never moves backwards on a stale read
    next.last_updated_block = current_block.max(stream.last_updated_block);

    if next.status == StreamStatus::Active && next.total_claimed == next.max_cap {
        next.status = StreamStatus::Completed;
    }

    Ok(next)
}

/// Create a new stream starting at `start_block` with nothing accrued.
pub fn create_stream(
    id: u64,
    issuer: String,
    owner: String,
    rate_per_block: Decimal,
    max_cap: Decimal,
    start_block: u64,
) -> Result<Stream, ProcessingError> {
    if rate_per_block < Decimal::ZERO || max_cap <= Decimal::ZERO {
        return Err(ProcessingError::InvalidStreamState);
    }

    Ok(Stream {
        id,
        issuer,
        owner,
        rate_per_block,
        start_block,
        last_updated_block: start_block,
        max_cap,
        total_claimed: Decimal::ZERO,
        unclaimed_balance: Decimal::ZERO,
        status: StreamStatus::Active,
    })
}

/// Settle accrual up to `current_block` into the stored balance.
fn settle(stream: &Stream, current_block: u64) -> Result<Stream, ProcessingError> {
    let claimable = compute_claimable(stream, current_block)?;
    let mut next = stream.clone();
    next.unclaimed_balance = claimable;
    next.last_updated_block = current_block.max(stream.last_updated_block);
    Ok(next)
}

/// Terminate a stream. The settled `unclaimed_balance` stays claimable,
/// but no further accrual is ever computed.
pub fn cancel_stream(stream: &Stream, current_block: u64) -> Result<Stream, ProcessingError> {
    if stream.status.is_terminal() {
        return Err(ProcessingError::InvalidTransition);
    }
    let mut next = settle(stream, current_block)?;
    next.status = StreamStatus::Cancelled;
    Ok(next)
}

/// Freeze accrual. The balance earned so far is settled and stays claimable.
pub fn pause_stream(stream: &Stream, current_block: u64) -> Result<Stream, ProcessingError> {
    if stream.status != StreamStatus::Active {
        return Err(ProcessingError::InvalidTransition);
    }
    let mut next = settle(stream, current_block)?;
    next.status = StreamStatus::Paused;
    Ok(next)
}

/// Restart accrual from `current_block`. The paused span earns nothing.
pub fn resume_stream(stream: &Stream, current_block: u64) -> Result<Stream, ProcessingError> {
    if stream.status != StreamStatus::Paused {
        return Err(ProcessingError::InvalidTransition);
    }
    validate(stream)?;
    let mut next = stream.clone();
    next.last_updated_block = current_block.max(stream.last_updated_block);
    next.status = StreamStatus::Active;
    Ok(next)
}
