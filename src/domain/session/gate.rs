//! Page gating policy.
//!
//! Pure decision function over (path, caller). The HTTP middleware resolves
//! the caller and turns decisions into redirects.

pub const LOGIN_PATH: &str = "/auth/login";
pub const DASHBOARD_PATH: &str = "/dashboard";

/// Auth pages an authenticated caller may still visit.
pub const AUTH_ALLOW_LIST: [&str; 3] = ["/auth/profile-setup", "/auth/confirm", "/auth/onboarding"];

const PROFILE_SETUP_PATH: &str = "/auth/profile-setup";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathClass {
    /// `/dashboard` and everything below it.
    Protected,
    /// `/auth/*` pages other than the allow-list.
    AuthEntry,
    /// Allow-listed auth page; `profile_setup` is true for the setup page.
    AllowListedAuth { profile_setup: bool },
    Public,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    RedirectToLogin { return_to: String },
    RedirectToDashboard,
    /// Allowed unless the member already completed onboarding.
    AllowUnlessOnboarded,
}

impl GateDecision {
    /// Redirect target, if the decision is a redirect.
    pub fn location(&self) -> Option<String> {
        match self {
            GateDecision::RedirectToLogin { return_to } => {
                Some(format!("{}?redirect={}", LOGIN_PATH, encode_return_to(return_to)))
            }
            GateDecision::RedirectToDashboard => Some(DASHBOARD_PATH.to_string()),
            GateDecision::Allow | GateDecision::AllowUnlessOnboarded => None,
        }
    }
}

/// Form-encodes a path for the `redirect` query value, leaving `/` readable.
fn encode_return_to(path: &str) -> String {
    url::form_urlencoded::byte_serialize(path.as_bytes())
        .collect::<String>()
        .replace("%2F", "/")
}

fn normalize(path: &str) -> &str {
    if path.len() > 1 {
        path.trim_end_matches('/')
    } else {
        path
    }
}

pub fn classify(path: &str) -> PathClass {
    let trimmed = normalize(path);

    if trimmed == DASHBOARD_PATH || trimmed.starts_with("/dashboard/") {
        return PathClass::Protected;
    }

    if trimmed == "/auth" || trimmed.starts_with("/auth/") {
        if AUTH_ALLOW_LIST.contains(&trimmed) {
            return PathClass::AllowListedAuth {
                profile_setup: trimmed == PROFILE_SETUP_PATH,
            };
        }
        return PathClass::AuthEntry;
    }

    PathClass::Public
}

/// Decides what to do with a request for `path`.
pub fn decide(path: &str, authenticated: bool) -> GateDecision {
    match (classify(path), authenticated) {
        (PathClass::Protected, false) => GateDecision::RedirectToLogin {
            return_to: path.to_string(),
        },
        (PathClass::AuthEntry, true) => GateDecision::RedirectToDashboard,
        (PathClass::AllowListedAuth { profile_setup: true }, true) => {
            GateDecision::AllowUnlessOnboarded
        }
        _ => GateDecision::Allow,
    }
}

/// Settles [`GateDecision::AllowUnlessOnboarded`] once the member record is read.
///
/// A missing member (profile not set up yet) or a failed lookup is allowed
/// through to the setup page.
pub fn settle_onboarding(onboarding_completed: Option<bool>) -> GateDecision {
    if onboarding_completed == Some(true) {
        GateDecision::RedirectToDashboard
    } else {
        GateDecision::Allow
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn anonymous_dashboard_redirects_to_login_with_return_path() {
        let decision = decide("/dashboard", false);
        assert_eq!(
            decision.location().as_deref(),
            Some("/auth/login?redirect=/dashboard")
        );
    }

    #[test]
    fn anonymous_nested_dashboard_keeps_full_path() {
        let decision = decide("/dashboard/billing", false);
        assert_eq!(
            decision,
            GateDecision::RedirectToLogin {
                return_to: "/dashboard/billing".to_string()
            }
        );
    }

    #[test]
    fn dashboard_prefix_lookalike_is_public() {
        assert_eq!(classify("/dashboards"), PathClass::Public);
        assert_eq!(decide("/dashboards", false), GateDecision::Allow);
    }

    #[test]
    fn authenticated_login_page_redirects_to_dashboard() {
        assert_eq!(decide("/auth/login", true), GateDecision::RedirectToDashboard);
        assert_eq!(decide("/auth/login", true).location().as_deref(), Some("/dashboard"));
    }

    #[test]
    fn anonymous_auth_pages_are_allowed() {
        assert_eq!(decide("/auth/login", false), GateDecision::Allow);
        assert_eq!(decide("/auth/profile-setup", false), GateDecision::Allow);
    }

    #[test]
    fn allow_listed_pages_pass_for_authenticated_callers() {
        assert_eq!(decide("/auth/confirm", true), GateDecision::Allow);
        assert_eq!(decide("/auth/onboarding/", true), GateDecision::Allow);
    }

    #[test]
    fn profile_setup_defers_to_onboarding_flag() {
        assert_eq!(
            decide("/auth/profile-setup", true),
            GateDecision::AllowUnlessOnboarded
        );
        assert_eq!(settle_onboarding(Some(true)), GateDecision::RedirectToDashboard);
        assert_eq!(settle_onboarding(Some(false)), GateDecision::Allow);
        assert_eq!(settle_onboarding(None), GateDecision::Allow);
    }

    #[test]
    fn authenticated_everything_else_is_allowed() {
        assert_eq!(decide("/dashboard", true), GateDecision::Allow);
        assert_eq!(decide("/api/opportunities", true), GateDecision::Allow);
        assert_eq!(decide("/", true), GateDecision::Allow);
    }

    proptest! {
        #[test]
        fn anonymous_never_reaches_dashboard(suffix in "(/[a-z0-9-]{1,12}){0,4}") {
            let path = format!("/dashboard{}", suffix);
            let decision = decide(&path, false);
            prop_assert_eq!(decision.location(), Some(format!("/auth/login?redirect={}", path)));
        }

        #[test]
        fn reserved_characters_stay_inside_the_redirect_value(
            suffix in "(/[a-z0-9&=?#%+ ]{1,12}){1,4}",
        ) {
            let path = format!("/dashboard{}", suffix);
            let location = decide(&path, false).location().unwrap();
            let query = location.strip_prefix("/auth/login?").unwrap();
            let pairs: Vec<(String, String)> = url::form_urlencoded::parse(query.as_bytes())
                .into_owned()
                .collect();
            prop_assert_eq!(pairs, vec![("redirect".to_string(), path)]);
        }

        #[test]
        fn authenticated_is_never_sent_to_login(path in "/[a-z0-9/-]{0,30}") {
            let decision = decide(&path, true);
            prop_assert!(!matches!(decision, GateDecision::RedirectToLogin { .. }), "authenticated request redirected to login: {:?}", decision);
        }

        #[test]
        fn public_paths_ignore_identity(segment in "[p-z][a-z]{0,10}") {
            let path = format!("/{}", segment);
            prop_assert_eq!(decide(&path, true), GateDecision::Allow);
            prop_assert_eq!(decide(&path, false), GateDecision::Allow);
        }
    }
}
