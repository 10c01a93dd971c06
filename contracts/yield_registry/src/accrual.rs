/// Yield accrued on `deposit_amount` while the rebase index grew from
/// `deposited_index` to `current_index`.
///
/// Formula: yield = deposit_amount × current_index / deposited_index − deposit_amount
///
/// Multiplies before dividing and truncates toward zero. Returns 0 when the
/// baseline is unset, the index has not grown, or the index moved backwards,
/// so reads against incomplete positions never fail.
pub fn accrued_yield(deposit_amount: i128, deposited_index: i128, current_index: i128) -> i128 {
    if deposited_index <= 0 || current_index <= deposited_index {
        return 0;
    }

    deposit_amount
        .checked_mul(current_index)
        .and_then(|v| v.checked_div(deposited_index))
        .map(|v| v - deposit_amount)
        .unwrap_or(0)
}
