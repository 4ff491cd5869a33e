//! Weighted random choice.
//!
//! Outcomes are drawn with probability proportional to their weight. The
//! functions here hold no state of their own: all randomness comes from the
//! RNG passed in, so a seeded [`ChaCha8Rng`](rand_chacha::ChaCha8Rng) gives
//! reproducible draws.
//!
//! # Example
//!
//! ```
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//! use tilewright_core::weighted::weighted_choice;
//!
//! let mut rng = ChaCha8Rng::seed_from_u64(7);
//! let pick = weighted_choice(&mut rng, &[("common", 9), ("rare", 1)]);
//! assert!(pick.is_some());
//!
//! let nothing: Option<&str> = weighted_choice(&mut rng, &[("never", 0)]);
//! assert_eq!(nothing, None);
//! ```

use rand::Rng;

/// Picks one outcome with probability proportional to its weight.
///
/// Entries are walked in slice order, so ties between cumulative ranges are
/// broken by table order. Zero-weight entries are never returned.
///
/// # Arguments
///
/// * `rng` - Random source
/// * `table` - `(outcome, weight)` pairs
///
/// # Returns
///
/// `None` when the table is empty or every weight is zero.
pub fn weighted_choice<T, R>(rng: &mut R, table: &[(T, u32)]) -> Option<T>
where
    T: Clone,
    R: Rng + ?Sized,
{
    let total: u64 = table.iter().map(|(_, weight)| u64::from(*weight)).sum();
    if total == 0 {
        return None;
    }

    let mut roll = rng.gen_range(0..total);
    for (outcome, weight) in table {
        let weight = u64::from(*weight);
        if roll < weight {
            return Some(outcome.clone());
        }
        roll -= weight;
    }

    // The roll is always below the total, so the walk above returns.
    None
}

/// Like [`weighted_choice`], but accepts signed weights.
///
/// Negative weights are clamped to zero before drawing, so they behave
/// exactly like a weight of zero ("never chosen").
pub fn weighted_choice_clamped<T, R>(rng: &mut R, table: &[(T, i64)]) -> Option<T>
where
    T: Clone,
    R: Rng + ?Sized,
{
    let clamped: Vec<(T, u32)> = table
        .iter()
        .map(|(outcome, weight)| {
            let weight = u32::try_from((*weight).max(0)).unwrap_or(u32::MAX);
            (outcome.clone(), weight)
        })
        .collect();
    weighted_choice(rng, &clamped)
}

// =============================================================================
// Tests
// =============================================================================
