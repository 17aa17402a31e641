//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Wrap an angle into the range (-pi, pi].
///
/// Angles produced in one control cycle never lie further than one turn outside the range, so in
/// practice a single fold of 2pi is applied. Larger inputs are folded as many times as needed.
/// Non-finite inputs have no meaningful heading and are mapped to zero.
pub fn wrap_pi<T>(angle: T) -> T
where
    T: Float
{
    if !angle.is_finite() {
        return T::zero();
    }

    let pi_t: T = (-T::one()).acos();
    let tau_t: T = pi_t + pi_t;

    let mut wrapped = angle;
    while wrapped > pi_t {
        wrapped = wrapped - tau_t;
    }
    while wrapped <= -pi_t {
        wrapped = wrapped + tau_t;
    }

    wrapped
}

/// Clamp a value between a minimum and a maximum.
pub fn clamp<T>(value: T, min: T, max: T) -> T
where
    T: Float
{
    value.max(min).min(max)
}

/// The logistic (sigmoid) function `1 / (1 + exp(-gain * (x - offset)))`.
///
/// Gives 0.5 at `x == offset`, tending to 1 for large `x` when `gain` is positive.
pub fn logistic<T>(x: T, gain: T, offset: T) -> T
where
    T: Float
{
    T::one() / (T::one() + (-gain * (x - offset)).exp())
}
