//! Dice rolling
//!
//! Every random decision in the simulation goes through [`Dice`], so a seeded
//! `StdRng` reproduces a whole session and [`ScriptedDice`] can force exact
//! rolls in tests.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::Rng;

/// Source of uniform random integers.
pub trait Dice {
    /// Uniform integer in `min..=max`. Returns `min` without consuming
    /// randomness when the range holds a single value or is empty.
    fn range(&mut self, min: i32, max: i32) -> i32;

    /// Percentile roll, 1..=100
    fn percent(&mut self) -> i32 {
        self.range(1, 100)
    }

    /// True with `pct` percent probability
    fn chance(&mut self, pct: i32) -> bool {
        pct > 0 && self.percent() <= pct
    }

    /// Sum of `count` rolls of a `sides`-sided die. Dice without sides add 0.
    fn roll(&mut self, count: i32, sides: i32) -> i32 {
        if sides <= 0 {
            return 0;
        }
        (0..count.max(0)).map(|_| self.range(1, sides)).sum()
    }

    /// Fair coin flip
    fn coin(&mut self) -> bool {
        self.range(0, 1) == 1
    }

    /// Uniform index into a collection of `len` items
    fn index(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            None
        } else {
            Some(self.range(0, len as i32 - 1) as usize)
        }
    }
}

impl Dice for StdRng {
    fn range(&mut self, min: i32, max: i32) -> i32 {
        if max <= min {
            return min;
        }
        self.gen_range(min..=max)
    }
}

/// Dice that replay a fixed list of rolls, clamped into the requested range.
/// Once the script runs out every roll returns the range minimum.
#[derive(Debug, Clone, Default)]
pub struct ScriptedDice {
    rolls: VecDeque<i32>,
}

impl ScriptedDice {
    pub fn new(rolls: impl IntoIterator<Item = i32>) -> Self {
        Self {
            rolls: rolls.into_iter().collect(),
        }
    }

    /// Rolls not consumed yet
    pub fn remaining(&self) -> usize {
        self.rolls.len()
    }
}

impl Dice for ScriptedDice {
    fn range(&mut self, min: i32, max: i32) -> i32 {
        if max <= min {
            return min;
        }
        self.rolls
            .pop_front()
            .map(|roll| roll.clamp(min, max))
            .unwrap_or(min)
    }
}

/// Pick one value with probability proportional to its weight.
/// Returns `None` when the weights sum to zero.
pub fn weighted_choice<'a, T, D>(dice: &mut D, items: &'a [(T, u32)]) -> Option<&'a T>
where
    D: Dice + ?Sized,
{
    let total: u32 = items.iter().map(|(_, weight)| *weight).sum();
    if total == 0 {
        return None;
    }

    let mut roll = dice.range(1, total as i32) as u32;
    for (item, weight) in items {
        if roll <= *weight {
            return Some(item);
        }
        roll -= weight;
    }
    None
}
