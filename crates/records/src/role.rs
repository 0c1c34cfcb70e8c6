//! User roles.

use serde::{Deserialize, Serialize};

/// The four account roles the system recognises.
///
/// A user's role is fixed at registration (admins are created out-of-band)
/// and drives routing, the access guard, and which profile section the user
/// record carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Requests appointments, records daily measures.
    Patient,
    /// Approves, declines and completes appointments. Requires admin approval
    /// before gaining access.
    Doctor,
    /// Reads and records a linked patient's daily measures.
    Caregiver,
    /// Manages accounts and doctor approval.
    Admin,
}

impl Role {
    /// Wire format string, matching the serde representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Patient => "patient",
            Role::Doctor => "doctor",
            Role::Caregiver => "caregiver",
            Role::Admin => "admin",
        }
    }

    /// Parse from the wire format string.
    pub fn from_wire(s: &str) -> Option<Self> {
        match s {
            "patient" => Some(Role::Patient),
            "doctor" => Some(Role::Doctor),
            "caregiver" => Some(Role::Caregiver),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }

    /// The dashboard route prefix for this role.
    pub fn dashboard_path(self) -> &'static str {
        match self {
            Role::Patient => "/patient",
            Role::Doctor => "/doctor",
            Role::Caregiver => "/caregiver",
            Role::Admin => "/admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
