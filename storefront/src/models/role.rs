// storefront/src/models/role.rs

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Privilege tier carried in session claims.
///
/// Ordered by privilege: `Admin < Staff < Customer`, so a *lower* role is a
/// *stronger* one. On the wire a role is its ordinal (0, 1, 2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Role {
  Admin = 0,
  Staff = 1,
  Customer = 2,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown role ordinal {0}")]
pub struct UnknownRole(pub i64);

impl Role {
  pub const fn ordinal(self) -> u8 {
    self as u8
  }

  /// Whether a principal holding `self` may use something that requires `required`.
  pub fn satisfies(self, required: Role) -> bool {
    self <= required
  }
}

impl TryFrom<u8> for Role {
  type Error = UnknownRole;

  fn try_from(value: u8) -> Result<Self, Self::Error> {
    match value {
      0 => Ok(Role::Admin),
      1 => Ok(Role::Staff),
      2 => Ok(Role::Customer),
      other => Err(UnknownRole(other.into())),
    }
  }
}

impl TryFrom<i16> for Role {
  type Error = UnknownRole;

  fn try_from(value: i16) -> Result<Self, Self::Error> {
    u8::try_from(value)
      .map_err(|_| UnknownRole(value.into()))
      .and_then(Role::try_from)
  }
}

impl From<Role> for u8 {
  fn from(role: Role) -> Self {
    role.ordinal()
  }
}

impl fmt::Display for Role {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      Role::Admin => "admin",
      Role::Staff => "staff",
      Role::Customer => "customer",
    };
    f.write_str(name)
  }
}
