/// Hard ceiling on the request-target length accepted by the data API.
/// Composed URLs must stay strictly under this.
pub const MAX_REQUEST_TARGET_LEN: usize = 2048;

/// Split an ordered symbol list into comma-joined batch strings such that
/// `base_len` (the request target up to and including `symbols=`) plus the
/// batch stays under `ceiling`.
///
/// Every symbol lands in exactly one batch and input order is preserved.
/// A batch always accepts its first symbol, so even a symbol that cannot
/// fit under the ceiling on its own goes out (and fails) alone instead of
/// stalling the partitioning.
pub fn batch_symbols(symbols: &[String], base_len: usize, ceiling: usize) -> Vec<String> {
    let mut batches = Vec::new();
    let mut current = String::new();

    for symbol in symbols {
        if current.is_empty() {
            current.push_str(symbol);
            continue;
        }

        // +1 for the joining comma
        if base_len + current.len() + 1 + symbol.len() < ceiling {
            current.push(',');
            current.push_str(symbol);
        } else {
            batches.push(std::mem::take(&mut current));
            current.push_str(symbol);
        }
    }

    if !current.is_empty() {
        batches.push(current);
    }

    batches
}
