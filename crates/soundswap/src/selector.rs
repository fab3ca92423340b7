//! Two-stage random selection: uniform over groups, weighted over sounds.

use rand::Rng;

use crate::catalog::SoundInstance;

/// Something with a relative selection weight.
pub trait Weighted {
    fn weight(&self) -> u32;
}

impl Weighted for SoundInstance {
    fn weight(&self) -> u32 {
        self.weight
    }
}

impl<T: Weighted + ?Sized> Weighted for &T {
    fn weight(&self) -> u32 {
        (**self).weight()
    }
}

/// How the weighted draw picks its random number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WeightDraw {
    /// Draw from `1..=total`: each entry wins exactly `weight / total`.
    #[default]
    Proportional,
    /// Draw from `0..=total`, as older packs were tuned against. A draw of 0
    /// always lands on the first entry, so it wins `(weight + 1) / (total + 1)`.
    LegacyInclusive,
}

/// Uniform pick. Every candidate counts once, whatever it contains.
pub fn pick_uniform<'a, T, R: Rng + ?Sized>(candidates: &'a [T], rng: &mut R) -> Option<&'a T> {
    if candidates.is_empty() {
        return None;
    }
    Some(&candidates[rng.gen_range(0..candidates.len())])
}

/// Weight-proportional pick walking candidates in stored order.
///
/// The draw is reduced by each weight in turn; the first candidate that takes
/// the remainder to `<= 0` wins. A zero total selects the first entry.
pub fn pick_weighted<'a, T: Weighted, R: Rng + ?Sized>(
    candidates: &'a [T],
    draw: WeightDraw,
    rng: &mut R,
) -> Option<&'a T> {
    let first = candidates.first()?;

    let total: u64 = candidates.iter().map(|c| u64::from(c.weight())).sum();
    if total == 0 {
        return Some(first);
    }

    let mut remaining = match draw {
        WeightDraw::Proportional => rng.gen_range(1..=total),
        WeightDraw::LegacyInclusive => rng.gen_range(0..=total),
    };

    for candidate in candidates {
        let weight = u64::from(candidate.weight());
        if remaining <= weight {
            return Some(candidate);
        }
        remaining -= weight;
    }

    candidates.last()
}
