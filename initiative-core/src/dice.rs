//! Dice notation parsing and rolling.
//!
//! Supports the plain `XdY` form used for hit dice and initiative, and
//! compound expressions like `2d6+1d4+3` used by damage entries in stat
//! blocks.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Most dice a single term may roll.
pub const MAX_DICE: u32 = 1000;

/// Largest die size accepted.
pub const MAX_FACES: u32 = 1_000_000;

/// Error type for dice parsing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DiceError {
    #[error("Invalid dice notation: {0}")]
    InvalidNotation(String),
    #[error("Invalid die size: {0}")]
    InvalidDieSize(u32),
    #[error("No dice specified")]
    NoDice,
    #[error("Too many dice: {0} (at most {MAX_DICE})")]
    TooManyDice(u32),
}

/// A single `XdY` term of a dice expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dice {
    pub count: u32,
    pub faces: u32,
}

impl Dice {
    pub fn new(count: u32, faces: u32) -> Self {
        Self { count, faces }
    }

    /// Parse a single `<count>d<faces>` term. An empty count means one die.
    pub fn parse(notation: &str) -> Result<Self, DiceError> {
        let term = notation.trim().to_lowercase();
        if term.is_empty() {
            return Err(DiceError::NoDice);
        }

        let d_pos = term
            .find('d')
            .ok_or_else(|| DiceError::InvalidNotation(notation.to_string()))?;
        let count_str = &term[..d_pos];
        let faces_str = &term[d_pos + 1..];

        let count: u32 = if count_str.is_empty() {
            1
        } else {
            count_str
                .parse()
                .map_err(|_| DiceError::InvalidNotation(notation.to_string()))?
        };
        let faces: u32 = faces_str
            .parse()
            .map_err(|_| DiceError::InvalidNotation(notation.to_string()))?;

        if faces == 0 || faces > MAX_FACES {
            return Err(DiceError::InvalidDieSize(faces));
        }
        if count > MAX_DICE {
            return Err(DiceError::TooManyDice(count));
        }

        Ok(Dice { count, faces })
    }

    /// Roll every die and return the individual results.
    pub fn roll_each<R: Rng>(&self, rng: &mut R) -> Vec<u32> {
        (0..self.count)
            .map(|_| rng.gen_range(1..=self.faces))
            .collect()
    }
}

impl FromStr for Dice {
    type Err = DiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Dice::parse(s)
    }
}

impl fmt::Display for Dice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d{}", self.count, self.faces)
    }
}

/// One signed dice term inside an expression.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiceComponent {
    pub dice: Dice,
    pub sign: i32,
}

/// A complete dice expression (e.g., 2d6+3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiceExpression {
    pub components: Vec<DiceComponent>,
    pub modifier: i32,
    pub original: String,
}

impl DiceExpression {
    /// Parse a dice notation string.
    pub fn parse(notation: &str) -> Result<Self, DiceError> {
        let notation = notation.trim().to_lowercase();
        if notation.is_empty() {
            return Err(DiceError::NoDice);
        }

        let mut components = Vec::new();
        let mut modifier: i32 = 0;
        let mut current = String::new();
        let mut sign: i32 = 1;

        for ch in notation.chars() {
            match ch {
                '+' | '-' => {
                    if !current.is_empty() {
                        Self::parse_component(&current, sign, &mut components, &mut modifier)?;
                        current.clear();
                    }
                    sign = if ch == '+' { 1 } else { -1 };
                }
                ' ' => continue,
                _ => current.push(ch),
            }
        }

        if !current.is_empty() {
            Self::parse_component(&current, sign, &mut components, &mut modifier)?;
        }

        if components.is_empty() && modifier == 0 {
            return Err(DiceError::NoDice);
        }

        Ok(DiceExpression {
            components,
            modifier,
            original: notation,
        })
    }

    fn parse_component(
        s: &str,
        sign: i32,
        components: &mut Vec<DiceComponent>,
        modifier: &mut i32,
    ) -> Result<(), DiceError> {
        if s.contains('d') {
            components.push(DiceComponent {
                dice: Dice::parse(s)?,
                sign,
            });
        } else {
            let value: i32 = s
                .parse()
                .map_err(|_| DiceError::InvalidNotation(s.to_string()))?;
            *modifier = modifier
                .checked_add(sign * value)
                .ok_or_else(|| DiceError::InvalidNotation(s.to_string()))?;
        }

        Ok(())
    }

    /// Roll the dice expression and return the result.
    pub fn roll(&self) -> RollResult {
        self.roll_with_rng(&mut rand::thread_rng())
    }

    /// Roll with a specific RNG (useful for testing).
    pub fn roll_with_rng<R: Rng>(&self, rng: &mut R) -> RollResult {
        let component_results: Vec<ComponentResult> = self
            .components
            .iter()
            .map(|component| {
                let rolls = component.dice.roll_each(rng);
                // Bounded by MAX_DICE * MAX_FACES, which fits in i32
                let sum: i64 = rolls.iter().map(|r| i64::from(*r)).sum();
                let subtotal = component.sign * sum as i32;
                ComponentResult {
                    dice: component.dice,
                    rolls,
                    subtotal,
                }
            })
            .collect();

        let total: i64 = component_results
            .iter()
            .map(|c| i64::from(c.subtotal))
            .sum::<i64>()
            + i64::from(self.modifier);

        RollResult {
            expression: self.clone(),
            total: total.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32,
            modifier: self.modifier,
            component_results,
        }
    }
}

impl FromStr for DiceExpression {
    type Err = DiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DiceExpression::parse(s)
    }
}

impl fmt::Display for DiceExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.original)
    }
}

/// Result of rolling a single dice component.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentResult {
    pub dice: Dice,
    pub rolls: Vec<u32>,
    pub subtotal: i32,
}

/// Complete result of a dice roll.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollResult {
    pub expression: DiceExpression,
    pub component_results: Vec<ComponentResult>,
    pub modifier: i32,
    pub total: i32,
}

impl RollResult {
    /// Format the individual dice results for display.
    pub fn dice_display(&self) -> String {
        let dice_str = self
            .component_results
            .iter()
            .map(|c| {
                format!(
                    "[{}]",
                    c.rolls
                        .iter()
                        .map(|r| r.to_string())
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            })
            .collect::<Vec<_>>()
            .join(" + ");

        if self.modifier > 0 {
            format!("{} + {}", dice_str, self.modifier)
        } else if self.modifier < 0 {
            format!("{} - {}", dice_str, self.modifier.abs())
        } else {
            dice_str
        }
    }
}

impl fmt::Display for RollResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.dice_display(), self.total)
    }
}

/// Parse `<count>d<faces>` into its two numbers.
pub fn parse(notation: &str) -> Result<(u32, u32), DiceError> {
    let dice = Dice::parse(notation)?;
    Ok((dice.count, dice.faces))
}

/// Roll a notation string and return only the total.
pub fn roll(notation: &str) -> Result<i32, DiceError> {
    roll_with_rng(notation, &mut rand::thread_rng())
}

/// Roll a notation string with a caller-supplied RNG.
pub fn roll_with_rng<R: Rng>(notation: &str, rng: &mut R) -> Result<i32, DiceError> {
    let expr = DiceExpression::parse(notation)?;
    Ok(expr.roll_with_rng(rng).total)
}

/// A single d20, as used for fresh initiative.
pub fn d20() -> i32 {
    rand::thread_rng().gen_range(1..=20)
}
