//! Mock payment provider for testing.
//!
//! Configurable `PaymentProvider` for unit and integration tests. Supports
//! error injection per method and records every call, including the order
//! in which calls happened, so tests can assert on sequencing.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::ports::{
    CreateCheckoutRequest, CreateCustomerRequest, CreateSetupRequest, Customer, HostedSession,
    PaymentError, PaymentProvider, ProviderSubscription,
};

/// Mock payment provider for testing.
///
/// ```ignore
/// let mock = MockPaymentProvider::new();
/// mock.set_method_error("create_checkout_session", PaymentError::network("down"));
/// assert_eq!(mock.call_count("create_customer"), 1);
/// ```
#[derive(Default, Clone)]
pub struct MockPaymentProvider {
    inner: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    customers: HashMap<String, Customer>,
    sequence: u32,
    method_errors: HashMap<String, PaymentError>,
    call_log: Vec<MethodCall>,
}

/// Recorded method call for assertions.
#[derive(Debug, Clone)]
pub struct MethodCall {
    pub method: String,
    pub args: Vec<String>,
}

impl MockPaymentProvider {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Set an error for a specific method.
    pub fn set_method_error(&self, method: &str, error: PaymentError) {
        self.state().method_errors.insert(method.to_string(), error);
    }

    /// Clear all configured errors.
    pub fn clear_errors(&self) {
        self.state().method_errors.clear();
    }

    /// Get all recorded method calls, oldest first.
    pub fn calls(&self) -> Vec<MethodCall> {
        self.state().call_log.clone()
    }

    pub fn was_called(&self, method: &str) -> bool {
        self.state().call_log.iter().any(|c| c.method == method)
    }

    pub fn call_count(&self, method: &str) -> usize {
        self.state()
            .call_log
            .iter()
            .filter(|c| c.method == method)
            .count()
    }

    /// Customers created through this mock.
    pub fn customer_count(&self) -> usize {
        self.state().customers.len()
    }

    fn record_call(&self, method: &str, args: Vec<String>) -> Result<u32, PaymentError> {
        let mut state = self.state();
        state.call_log.push(MethodCall {
            method: method.to_string(),
            args,
        });
        if let Some(error) = state.method_errors.get(method) {
            return Err(error.clone());
        }
        state.sequence += 1;
        Ok(state.sequence)
    }
}

#[async_trait]
impl PaymentProvider for MockPaymentProvider {
    async fn create_customer(
        &self,
        request: CreateCustomerRequest,
    ) -> Result<Customer, PaymentError> {
        let seq = self.record_call(
            "create_customer",
            vec![request.member_id.to_string(), request.email.clone()],
        )?;

        let customer = Customer {
            id: format!("cus_mock_{}", seq),
            email: Some(request.email),
        };
        self.state()
            .customers
            .insert(customer.id.clone(), customer.clone());
        Ok(customer)
    }

    async fn create_checkout_session(
        &self,
        request: CreateCheckoutRequest,
    ) -> Result<HostedSession, PaymentError> {
        let seq = self.record_call(
            "create_checkout_session",
            vec![request.customer_id.clone(), request.price_id.clone()],
        )?;

        let id = format!("cs_mock_{}", seq);
        Ok(HostedSession {
            url: format!("https://checkout.stripe.test/c/pay/{}", id),
            id,
        })
    }

    async fn create_setup_session(
        &self,
        request: CreateSetupRequest,
    ) -> Result<HostedSession, PaymentError> {
        let seq = self.record_call("create_setup_session", vec![request.customer_id.clone()])?;

        let id = format!("cs_setup_mock_{}", seq);
        Ok(HostedSession {
            url: format!("https://checkout.stripe.test/c/setup/{}", id),
            id,
        })
    }

    async fn set_cancel_at_period_end(
        &self,
        subscription_id: &str,
        cancel_at_period_end: bool,
    ) -> Result<ProviderSubscription, PaymentError> {
        self.record_call(
            "set_cancel_at_period_end",
            vec![subscription_id.to_string(), cancel_at_period_end.to_string()],
        )?;

        let now = chrono::Utc::now().timestamp();
        Ok(ProviderSubscription {
            id: subscription_id.to_string(),
            status: "active".to_string(),
            cancel_at_period_end,
            canceled_at: cancel_at_period_end.then_some(now),
            current_period_end: Some(now + 30 * 24 * 60 * 60),
        })
    }
}
