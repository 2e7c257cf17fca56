//! A/B split percentages for email steps with several templates.
//!
//! A distribution is a list of whole percentages parallel to the step's
//! `template_ids`. Every helper here returns a list that sums to 100.

/// Percent total every distribution adds up to
pub const TOTAL: u32 = 100;

/// Split 100 evenly over `count` variants; leftovers go to the first entries
pub fn even_split(count: usize) -> Vec<u32> {
    if count == 0 {
        return Vec::new();
    }
    let base = TOTAL / count as u32;
    let extra = (TOTAL % count as u32) as usize;
    (0..count)
        .map(|i| if i < extra { base + 1 } else { base })
        .collect()
}

/// Set entry `index` to `value` (clamped to 0..=100) and spread the rest
/// over the other entries in proportion to their current values.
///
/// Stored entries above 100 are treated as 100. When the other entries are
/// all zero the remainder is split evenly.
/// An out-of-range `index` returns the input unchanged.
pub fn rebalance(current: &[u32], index: usize, value: u32) -> Vec<u32> {
    if index >= current.len() {
        return current.to_vec();
    }
    let value = value.min(TOTAL);
    if current.len() == 1 {
        return vec![TOTAL];
    }

    let remaining = TOTAL - value;
    let others: Vec<usize> = (0..current.len()).filter(|&i| i != index).collect();
    let weight = |i: usize| u64::from(current[i].min(TOTAL));
    let others_total: u64 = others.iter().map(|&i| weight(i)).sum();

    let mut result = vec![0; current.len()];
    result[index] = value;

    if others_total == 0 {
        for (slot, share) in others.iter().zip(even_split(others.len())) {
            result[*slot] = share * remaining / TOTAL;
        }
    } else {
        for &i in &others {
            // At most `remaining`, so it fits back into u32
            result[i] = (weight(i) * u64::from(remaining) / others_total) as u32;
        }
    }

    // Integer division drops a few points; hand them to the last other entry
    let assigned: u32 = result.iter().sum();
    if let Some(&last) = others.last() {
        result[last] += TOTAL - assigned;
    }
    result
}

/// Distribution a step should carry after its template list changed
pub fn for_template_count(count: usize) -> Option<Vec<u32>> {
    (count > 1).then(|| even_split(count))
}
