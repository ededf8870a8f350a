/// Router Module Index
///
/// Splits the gate's endpoints by what they require from the caller.

/// Routes open to any client: health, login/logout and navigation decisions. The
/// navigation endpoint does its own session handling through the guard.
pub mod public;

/// Routes that need a stored session, enforced by the `ActiveSession` middleware layer.
pub mod authenticated;
