//! Session gate for dashboard and auth pages.

mod gate;

pub use gate::{
    classify, decide, settle_onboarding, GateDecision, PathClass, AUTH_ALLOW_LIST,
    DASHBOARD_PATH, LOGIN_PATH,
};
