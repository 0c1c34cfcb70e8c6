//! Role-based access guard.
//!
//! Every dashboard area is gated by the same sequence of checks, evaluated
//! in fixed order on every evaluation:
//!
//! 1. unauthenticated → redirect to login
//! 2. role mismatch → redirect to the user's own dashboard
//! 3. profile incomplete → redirect to profile setup
//! 4. doctor not yet approved → redirect to the awaiting-approval page
//! 5. otherwise → authorised
//!
//! There is no partial access: any non-authorised outcome is a hard
//! redirect. Because the checks run in this order, an unapproved doctor can
//! never reach an authorised doctor area, and a user who lands on another
//! role's area is first sent home, where their own area's checks apply.

use records::Role;
use carebook_types::EmailAddress;
use carebook_uuid::ShardableUuid;

/// The identity facts the guard needs about the caller.
///
/// Derived from the stored user record on every request, so role changes,
/// profile completion and doctor approval take effect immediately.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionUser {
    pub id: ShardableUuid,
    pub email: EmailAddress,
    pub role: Role,
    pub profile_completed: bool,
    /// Doctor approval flag; `None` for other roles.
    pub approved: Option<bool>,
}

/// Outcome of an access evaluation.
///
/// `Authorized` grants access; every other variant names the redirect
/// target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessDecision {
    /// Render the requested area.
    Authorized,
    /// No session: go to the login page.
    ToLogin,
    /// Signed in under a different role: go to that role's dashboard.
    ToOwnDashboard(Role),
    /// Onboarding not finished: go to profile setup.
    ToProfileSetup,
    /// Doctor awaiting admin approval.
    ToAwaitingApproval,
}

impl AccessDecision {
    /// The page an unauthorised caller is redirected to, if any.
    pub fn redirect_path(&self) -> Option<&'static str> {
        match self {
            AccessDecision::Authorized => None,
            AccessDecision::ToLogin => Some("/login"),
            AccessDecision::ToOwnDashboard(role) => Some(role.dashboard_path()),
            AccessDecision::ToProfileSetup => Some("/setup-profile"),
            AccessDecision::ToAwaitingApproval => Some("/doctor/awaiting-approval"),
        }
    }

    pub fn is_authorized(&self) -> bool {
        matches!(self, AccessDecision::Authorized)
    }
}

/// Evaluates access to an `area` (a role's dashboard) for the caller.
///
/// Checks run in fixed order; the first failing check decides the outcome.
pub fn evaluate(user: Option<&SessionUser>, area: Role) -> AccessDecision {
    let Some(user) = user else {
        return AccessDecision::ToLogin;
    };

    if user.role != area {
        return AccessDecision::ToOwnDashboard(user.role);
    }

    if !user.profile_completed {
        return AccessDecision::ToProfileSetup;
    }

    if user.role == Role::Doctor && user.approved != Some(true) {
        return AccessDecision::ToAwaitingApproval;
    }

    AccessDecision::Authorized
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role, profile_completed: bool, approved: Option<bool>) -> SessionUser {
        SessionUser {
            id: ShardableUuid::new(),
            email: EmailAddress::new("someone@example.com").unwrap(),
            role,
            profile_completed,
            approved,
        }
    }

    #[test]
    fn no_session_goes_to_login() {
        let decision = evaluate(None, Role::Patient);
        assert_eq!(decision, AccessDecision::ToLogin);
        assert_eq!(decision.redirect_path(), Some("/login"));
    }

    #[test]
    fn role_mismatch_goes_to_own_dashboard() {
        let patient = user(Role::Patient, true, None);
        let decision = evaluate(Some(&patient), Role::Doctor);
        assert_eq!(decision, AccessDecision::ToOwnDashboard(Role::Patient));
        assert_eq!(decision.redirect_path(), Some("/patient"));
    }

    #[test]
    fn incomplete_profile_goes_to_setup() {
        let patient = user(Role::Patient, false, None);
        assert_eq!(
            evaluate(Some(&patient), Role::Patient),
            AccessDecision::ToProfileSetup
        );
    }

    #[test]
    fn unapproved_doctor_never_authorised_for_doctor_area() {
        let doctor = user(Role::Doctor, true, Some(false));
        let decision = evaluate(Some(&doctor), Role::Doctor);
        assert_eq!(decision, AccessDecision::ToAwaitingApproval);
        assert_eq!(decision.redirect_path(), Some("/doctor/awaiting-approval"));

        // Approval flag missing entirely behaves the same as false
        let doctor = user(Role::Doctor, true, None);
        assert_eq!(
            evaluate(Some(&doctor), Role::Doctor),
            AccessDecision::ToAwaitingApproval
        );
    }

    #[test]
    fn approved_doctor_is_authorised() {
        let doctor = user(Role::Doctor, true, Some(true));
        assert!(evaluate(Some(&doctor), Role::Doctor).is_authorized());
    }

    #[test]
    fn checks_run_in_fixed_order() {
        // Role mismatch wins over incomplete profile and missing approval:
        // an unapproved doctor with no profile is still sent to the doctor
        // dashboard first when requesting a patient area.
        let doctor = user(Role::Doctor, false, Some(false));
        assert_eq!(
            evaluate(Some(&doctor), Role::Patient),
            AccessDecision::ToOwnDashboard(Role::Doctor)
        );

        // Profile completion wins over approval for the doctor's own area.
        let doctor = user(Role::Doctor, false, Some(false));
        assert_eq!(
            evaluate(Some(&doctor), Role::Doctor),
            AccessDecision::ToProfileSetup
        );
    }

    #[test]
    fn patient_and_caregiver_need_no_approval() {
        let patient = user(Role::Patient, true, None);
        assert!(evaluate(Some(&patient), Role::Patient).is_authorized());

        let caregiver = user(Role::Caregiver, true, None);
        assert!(evaluate(Some(&caregiver), Role::Caregiver).is_authorized());
    }

    #[test]
    fn admin_area_requires_admin_role() {
        let admin = user(Role::Admin, true, None);
        assert!(evaluate(Some(&admin), Role::Admin).is_authorized());

        let patient = user(Role::Patient, true, None);
        assert_eq!(
            evaluate(Some(&patient), Role::Admin),
            AccessDecision::ToOwnDashboard(Role::Patient)
        );
    }
}
