//! Money amounts in Sri Lankan rupees.

use serde::{Deserialize, Serialize};

/// Money amount in whole rupees.
///
/// LKR carries no minor unit in this system, so amounts are stored as whole
/// rupees and every derived amount (fees, advances) is rounded to the nearest
/// rupee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money {
    rupees: i64,
}

impl Money {
    /// Creates a new amount from whole rupees.
    pub fn from_rupees(rupees: i64) -> Self {
        Self { rupees }
    }

    /// Returns zero money.
    pub fn zero() -> Self {
        Self { rupees: 0 }
    }

    /// Returns the amount in rupees.
    pub fn rupees(&self) -> i64 {
        self.rupees
    }

    /// Returns true if the amount is positive.
    pub fn is_positive(&self) -> bool {
        self.rupees > 0
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.rupees == 0
    }

    /// Returns true if the amount is negative.
    pub fn is_negative(&self) -> bool {
        self.rupees < 0
    }

    /// Multiplies by a quantity.
    pub fn multiply(&self, quantity: u32) -> Money {
        Money {
            rupees: self.rupees * quantity as i64,
        }
    }

    /// Scales by a factor, rounding to the nearest whole rupee.
    ///
    /// Used for percentage-based amounts (tier discounts, express surcharges,
    /// advance fractions).
    pub fn scale(&self, factor: f64) -> Money {
        Money {
            rupees: (self.rupees as f64 * factor).round() as i64,
        }
    }

    /// Clamps a negative amount to zero.
    pub fn clamp_non_negative(&self) -> Money {
        Money {
            rupees: self.rupees.max(0),
        }
    }

    /// Returns the larger of two amounts.
    pub fn max(self, other: Money) -> Money {
        if self.rupees >= other.rupees { self } else { other }
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Rs {}", self.rupees)
    }
}

impl std::ops::Add for Money {
    type Output = Money;

    fn add(self, rhs: Self) -> Self::Output {
        Money {
            rupees: self.rupees + rhs.rupees,
        }
    }
}

impl std::ops::Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Self) -> Self::Output {
        Money {
            rupees: self.rupees - rhs.rupees,
        }
    }
}

impl std::ops::AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.rupees += rhs.rupees;
    }
}

impl std::ops::SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.rupees -= rhs.rupees;
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}
