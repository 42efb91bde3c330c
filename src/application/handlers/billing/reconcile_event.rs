//! BillingEventReconciler - Applies billing events to entitlement state.
//!
//! | Event | Precondition | Transition | Side effect |
//! |-------|--------------|------------|-------------|
//! | SubscriptionCreated | user bound to customer | upsert row | status write, welcome alert |
//! | SubscriptionUpdated | row exists, or user bound to customer | update or seed row | status write, update alert |
//! | SubscriptionDeleted | row exists, or user bound to customer | status = canceled | user free, premium integrations off, alert |
//! | PaymentSucceeded/Failed | user bound to customer | none | payment alert (must land) |
//! | TrialWillEnd | user bound to customer | none | trial alert (must land) |
//! | CustomerCreated | email match, no billing ref yet | bind customer | none |
//!
//! Unmet preconditions are soft misses: acknowledged, logged at `warn`,
//! never retried. Row writes and the matching user status write happen in
//! one `EntitlementStore` call; alerts follow the committed transition.
//!
//! Updates and deletes can arrive before the create for the same
//! subscription. When no row exists yet the row is seeded from the event
//! itself, and the late create is then dropped as stale.

use async_trait::async_trait;
use std::sync::Arc;

use crate::application::handlers::alerts::AlertEmitter;
use crate::domain::alert::Alert;
use crate::domain::billing::{
    BillingEvent, BillingEventHandler, BillingEventKind, CustomerObject, InvoiceObject,
    ReconcileError, ReconcileOutcome, SubscriptionObject,
};
use crate::domain::foundation::Timestamp;
use crate::domain::subscription::SubscriptionChange;
use crate::domain::user::User;
use crate::ports::{Clock, EntitlementStore, SubscriptionTransition, UserRepository};

/// Reconciles one verified billing event.
pub struct BillingEventReconciler {
    users: Arc<dyn UserRepository>,
    entitlements: Arc<dyn EntitlementStore>,
    alerts: Arc<AlertEmitter>,
    clock: Arc<dyn Clock>,
}

impl BillingEventReconciler {
    pub fn new(
        users: Arc<dyn UserRepository>,
        entitlements: Arc<dyn EntitlementStore>,
        alerts: Arc<AlertEmitter>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            entitlements,
            alerts,
            clock,
        }
    }

    async fn user_for_customer(&self, customer_id: &str) -> Result<Option<User>, ReconcileError> {
        if customer_id.trim().is_empty() {
            return Err(ReconcileError::MissingField("customer"));
        }
        Ok(self.users.find_by_billing_customer(customer_id).await?)
    }

    /// Seeds the row for an event that beat its create. `None` when the
    /// customer is blank or not bound to a user.
    async fn seed_missing_row(
        &self,
        object: &SubscriptionObject,
        change: &SubscriptionChange,
        now: Timestamp,
    ) -> Result<Option<SubscriptionTransition>, ReconcileError> {
        if object.customer.trim().is_empty() {
            return Ok(None);
        }
        let Some(user) = self.users.find_by_billing_customer(&object.customer).await? else {
            return Ok(None);
        };
        let transition = self.entitlements.create_or_update(&user.id, change, now).await?;
        Ok(Some(transition))
    }

    /// For events whose only effect is the alert. A failed append is
    /// retryable so the event stays out of the processed log.
    async fn deliver_alert(&self, alert: Alert) -> Result<(), ReconcileError> {
        self.alerts
            .deliver(alert)
            .await
            .map_err(|e| ReconcileError::Database(e.to_string()))
    }

    fn soft_miss(event: &BillingEvent, reason: String) -> ReconcileOutcome {
        tracing::warn!(
            event_id = %event.id,
            event_type = %event.event_type,
            reason = %reason,
            "Billing event soft miss"
        );
        ReconcileOutcome::soft_miss(reason)
    }

    fn stale(event: &BillingEvent, transition: &SubscriptionTransition) -> ReconcileOutcome {
        tracing::info!(
            event_id = %event.id,
            event_type = %event.event_type,
            billing_subscription_id = ?transition.current.billing_subscription_id,
            "Stale billing event skipped"
        );
        ReconcileOutcome::Stale
    }

    // ════════════════════════════════════════════════════════════════════════
    // Subscription lifecycle
    // ════════════════════════════════════════════════════════════════════════

    async fn subscription_created(
        &self,
        event: &BillingEvent,
    ) -> Result<ReconcileOutcome, ReconcileError> {
        let object: SubscriptionObject = event.object()?;
        let Some(user) = self.user_for_customer(&object.customer).await? else {
            return Ok(Self::soft_miss(
                event,
                format!("no user for customer {}", object.customer),
            ));
        };

        let now = self.clock.now();
        let change = object.to_change(event.created_at()?);
        let transition = self.entitlements.create_or_update(&user.id, &change, now).await?;
        if transition.is_stale() {
            return Ok(Self::stale(event, &transition));
        }

        let owner = transition.current.user_id;
        tracing::info!(
            event_id = %event.id,
            user_id = %owner,
            billing_subscription_id = %object.id,
            status = %change.status,
            plan = change.plan_type.as_str(),
            "Subscription created"
        );

        // An existing row means a redelivery under a new event id; the
        // welcome alert went out the first time.
        if transition.previous.is_none() {
            self.alerts
                .emit(Alert::subscription_created(
                    owner,
                    change.plan_type,
                    &change.status,
                    &object.id,
                    now,
                ))
                .await;
        }

        Ok(ReconcileOutcome::Applied)
    }

    async fn subscription_updated(
        &self,
        event: &BillingEvent,
    ) -> Result<ReconcileOutcome, ReconcileError> {
        let object: SubscriptionObject = event.object()?;
        let now = self.clock.now();
        let change = object.to_change(event.created_at()?);

        let transition = match self.entitlements.update_existing(&change, now).await? {
            Some(transition) => transition,
            None => match self.seed_missing_row(&object, &change, now).await? {
                Some(transition) => transition,
                None => {
                    return Ok(Self::soft_miss(
                        event,
                        format!("no subscription row or user for {}", object.id),
                    ))
                }
            },
        };
        if transition.is_stale() {
            return Ok(Self::stale(event, &transition));
        }

        let owner = transition.current.user_id;
        tracing::info!(
            event_id = %event.id,
            user_id = %owner,
            billing_subscription_id = %object.id,
            status = %change.status,
            cancel_at_period_end = change.cancel_at_period_end,
            seeded = transition.previous.is_none(),
            "Subscription updated"
        );

        let alert = match &transition.previous {
            Some(previous) => Alert::subscription_updated(
                owner,
                &previous.status,
                previous.cancel_at_period_end,
                &change,
                now,
            ),
            // Seeded here, so the late create will be stale and never welcome.
            None => Alert::subscription_created(
                owner,
                change.plan_type,
                &change.status,
                &object.id,
                now,
            ),
        };
        self.alerts.emit(alert).await;

        Ok(ReconcileOutcome::Applied)
    }

    async fn subscription_deleted(
        &self,
        event: &BillingEvent,
    ) -> Result<ReconcileOutcome, ReconcileError> {
        let object: SubscriptionObject = event.object()?;
        let now = self.clock.now();
        let event_at = event.created_at()?;

        let transition = match self.entitlements.cancel(&object.id, event_at, now).await? {
            Some(transition) => transition,
            None => {
                let change = object.to_change(event_at);
                let Some(seeded) = self.seed_missing_row(&object, &change, now).await? else {
                    return Ok(Self::soft_miss(
                        event,
                        format!("no subscription row or user for {}", object.id),
                    ));
                };
                if seeded.is_stale() {
                    return Ok(Self::stale(event, &seeded));
                }
                self.entitlements
                    .cancel(&object.id, event_at, now)
                    .await?
                    .ok_or_else(|| {
                        ReconcileError::Internal(format!(
                            "subscription row {} missing after seeding",
                            object.id
                        ))
                    })?
            }
        };
        if transition.is_stale() {
            return Ok(Self::stale(event, &transition));
        }

        let owner = transition.current.user_id;
        tracing::info!(
            event_id = %event.id,
            user_id = %owner,
            billing_subscription_id = %object.id,
            integrations_deactivated = transition.integrations_deactivated,
            "Subscription canceled"
        );

        self.alerts
            .emit(Alert::subscription_canceled(
                owner,
                transition.current.plan_type,
                &object.id,
                now,
            ))
            .await;

        Ok(ReconcileOutcome::Applied)
    }

    // ════════════════════════════════════════════════════════════════════════
    // Notifications
    // ════════════════════════════════════════════════════════════════════════

    async fn payment(
        &self,
        event: &BillingEvent,
        succeeded: bool,
    ) -> Result<ReconcileOutcome, ReconcileError> {
        let invoice: InvoiceObject = event.object()?;
        let Some(user) = self.user_for_customer(&invoice.customer).await? else {
            return Ok(Self::soft_miss(
                event,
                format!("no user for customer {}", invoice.customer),
            ));
        };

        let now = self.clock.now();
        let alert = if succeeded {
            Alert::payment_succeeded(user.id, invoice.amount_paid, &invoice.currency, now)
        } else {
            Alert::payment_failed(user.id, invoice.amount_due, &invoice.currency, now)
        };

        tracing::info!(
            event_id = %event.id,
            user_id = %user.id,
            succeeded,
            "Payment event recorded"
        );
        self.deliver_alert(alert).await?;

        Ok(ReconcileOutcome::Applied)
    }

    async fn trial_will_end(
        &self,
        event: &BillingEvent,
    ) -> Result<ReconcileOutcome, ReconcileError> {
        let object: SubscriptionObject = event.object()?;
        let Some(user) = self.user_for_customer(&object.customer).await? else {
            return Ok(Self::soft_miss(
                event,
                format!("no user for customer {}", object.customer),
            ));
        };
        let Some(trial_end) = object.trial_end_or_period_end() else {
            return Ok(Self::soft_miss(
                event,
                format!("no trial or period end on {}", object.id),
            ));
        };

        self.deliver_alert(Alert::trial_ending(user.id, trial_end, self.clock.now()))
            .await?;

        Ok(ReconcileOutcome::Applied)
    }

    // ════════════════════════════════════════════════════════════════════════
    // Customer binding
    // ════════════════════════════════════════════════════════════════════════

    async fn customer_created(
        &self,
        event: &BillingEvent,
    ) -> Result<ReconcileOutcome, ReconcileError> {
        let customer: CustomerObject = event.object()?;
        let Some(email) = customer.email.as_deref().map(|e| e.trim().to_lowercase()) else {
            return Ok(Self::soft_miss(
                event,
                format!("customer {} has no email", customer.id),
            ));
        };

        if let Some(bound) = self.users.find_by_billing_customer(&customer.id).await? {
            return Ok(Self::soft_miss(
                event,
                format!("customer {} already bound to user {}", customer.id, bound.id),
            ));
        }

        let Some(user) = self.users.find_by_email(&email).await? else {
            return Ok(Self::soft_miss(
                event,
                format!("no user with email for customer {}", customer.id),
            ));
        };
        if user.has_billing_customer() {
            return Ok(Self::soft_miss(
                event,
                format!("user {} already has a billing customer", user.id),
            ));
        }

        if !self
            .users
            .bind_billing_customer(&user.id, &customer.id, self.clock.now())
            .await?
        {
            return Ok(Self::soft_miss(
                event,
                format!("user {} was bound concurrently", user.id),
            ));
        }

        tracing::info!(
            event_id = %event.id,
            user_id = %user.id,
            customer_id = %customer.id,
            "Billing customer bound"
        );
        Ok(ReconcileOutcome::Applied)
    }
}

#[async_trait]
impl BillingEventHandler for BillingEventReconciler {
    async fn handle(&self, event: &BillingEvent) -> Result<ReconcileOutcome, ReconcileError> {
        match event.kind() {
            BillingEventKind::SubscriptionCreated => self.subscription_created(event).await,
            BillingEventKind::SubscriptionUpdated => self.subscription_updated(event).await,
            BillingEventKind::SubscriptionDeleted => self.subscription_deleted(event).await,
            BillingEventKind::PaymentSucceeded => self.payment(event, true).await,
            BillingEventKind::PaymentFailed => self.payment(event, false).await,
            BillingEventKind::TrialWillEnd => self.trial_will_end(event).await,
            BillingEventKind::CustomerCreated => self.customer_created(event).await,
            BillingEventKind::Unknown => {
                tracing::debug!(
                    event_id = %event.id,
                    event_type = %event.event_type,
                    "Unhandled billing event type"
                );
                Ok(ReconcileOutcome::Ignored(format!(
                    "unhandled event type {}",
                    event.event_type
                )))
            }
        }
    }
}
