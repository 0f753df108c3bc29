//! Marketplace settlement: rule-based order pricing, the commission split,
//! the reservation-backed order flow, the deferred payment ledger and the
//! fraud scoring table.

use crate::config::PricingConfig;
use crate::error::{AppError, AppResult};
use crate::models::{
    AppliedFactor, CommissionBreakdown, FactorType, FraudAssessment, FraudLogStatus, FraudSignals,
    FulfillmentType, GeoPoint, MarketplaceOrder, OrderPricing, OrderStatus, PaymentSplit,
    PricingFactorRule, SplitParty, SplitStatus,
};
use crate::repositories::{
    CommissionRepository, FactorRuleRepository, FraudLogRepository, ListingRepository, NewOrder,
    NewPaymentSplit, OrderRepository, PaymentSplitRepository,
};
use crate::services::factor_collector::FactorCollector;
use chrono::{Datelike, Duration, NaiveDateTime, Timelike, Weekday};
use rust_decimal::{Decimal, RoundingStrategy};
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

// Fraud scoring table. The point values and thresholds are a compatibility
// surface: downstream review queues assume them.
const RISK_ORDER_VELOCITY: i32 = 30; // > 10 orders by one customer in 24h
const RISK_LARGE_ORDER: i32 = 20; // order amount > 50,000
const RISK_REVIEW_VELOCITY: i32 = 40; // > 5 reviews by one user in 7 days
const RISK_UNIFORM_REVIEWS: i32 = 25; // every review is 5-star
const RISK_PRICE_SWING: i32 = 35; // listing price change > 50%
const RISK_STOCK_CHURN: i32 = 30; // > 5 stock mutations in 24h

/// Scores strictly above this require manual review
const RISK_REVIEW_THRESHOLD: i32 = 50;

/// Quote request for an order before it exists
#[derive(Debug, Clone)]
pub struct OrderQuoteRequest {
    pub supplier_id: Uuid,
    pub base_price: Decimal,
    pub delivery_fee: Decimal,
    pub customer_location: Option<GeoPoint>,
    pub delivery_distance_km: f64,
    /// Defaults to now; carried separately so quotes can be replayed
    pub order_time: Option<NaiveDateTime>,
}

/// Payment metadata supplied by the payment processor after confirmation
#[derive(Debug, Clone)]
pub struct PaymentConfirmation {
    pub amount: Decimal,
    pub method: String,
    pub reference: Option<String>,
}

/// Request to place an order against a listing
#[derive(Debug, Clone)]
pub struct PlaceOrderRequest {
    pub listing_id: Uuid,
    pub customer_id: Uuid,
    pub quantity: i32,
    pub fulfillment: FulfillmentType,
    pub customer_location: Option<GeoPoint>,
    pub delivery_distance_km: f64,
}

/// The order context a pricing rule is evaluated against
struct RuleContext {
    hour: u32,
    weekend: bool,
    distance_km: f64,
    weather_score: f64,
    traffic_score: f64,
}

pub struct MarketplaceService {
    factor_rule_repo: Arc<FactorRuleRepository>,
    commission_repo: Arc<CommissionRepository>,
    split_repo: Arc<PaymentSplitRepository>,
    fraud_repo: Arc<FraudLogRepository>,
    listing_repo: Arc<ListingRepository>,
    order_repo: Arc<OrderRepository>,
    collector: Arc<FactorCollector>,
    config: PricingConfig,
}

impl MarketplaceService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        factor_rule_repo: Arc<FactorRuleRepository>,
        commission_repo: Arc<CommissionRepository>,
        split_repo: Arc<PaymentSplitRepository>,
        fraud_repo: Arc<FraudLogRepository>,
        listing_repo: Arc<ListingRepository>,
        order_repo: Arc<OrderRepository>,
        collector: Arc<FactorCollector>,
        config: PricingConfig,
    ) -> Self {
        Self {
            factor_rule_repo,
            commission_repo,
            split_repo,
            fraud_repo,
            listing_repo,
            order_repo,
            collector,
            config,
        }
    }

    /// Apply the active pricing rules to an order's charges, then split the
    /// adjusted amounts between platform, supplier and courier.
    pub async fn calculate_order_pricing(
        &self,
        request: &OrderQuoteRequest,
    ) -> AppResult<OrderPricing> {
        let order_time = request
            .order_time
            .unwrap_or_else(|| chrono::Utc::now().naive_utc());

        let context = RuleContext {
            hour: order_time.hour(),
            weekend: matches!(order_time.weekday(), Weekday::Sat | Weekday::Sun),
            distance_km: request.delivery_distance_km,
            weather_score: self.collector.weather_factor(request.customer_location).await,
            traffic_score: self.collector.traffic_factor(request.customer_location).await,
        };

        // Rules are re-read on every quote; admin edits apply immediately
        let rules = self.factor_rule_repo.find_active().await.map_err(AppError::from)?;

        let mut total_multiplier = 1.0_f64;
        let mut applied_factors = Vec::new();

        for rule in &rules {
            if rule_applies(rule, &context) {
                total_multiplier *= rule.multiplier;
                applied_factors.push(AppliedFactor {
                    factor_type: rule.factor_type.clone(),
                    factor_name: rule.factor_name.clone(),
                    multiplier: rule.multiplier,
                });
            }
        }

        let settings = self
            .commission_repo
            .find_effective(request.supplier_id, order_time)
            .await
            .map_err(AppError::from)?;

        let (product_rate, delivery_rate) = match &settings {
            Some(s) => (s.product_commission_rate, s.delivery_commission_rate),
            None => (
                decimal_from_f64(self.config.default_product_commission_rate)?,
                decimal_from_f64(self.config.default_delivery_commission_rate)?,
            ),
        };

        let multiplier_dec = decimal_from_f64(total_multiplier)?;
        let adjusted_product_price = round_money(request.base_price * multiplier_dec);
        let adjusted_delivery_fee = round_money(request.delivery_fee * multiplier_dec);

        let commission = split_charges(
            adjusted_product_price,
            adjusted_delivery_fee,
            product_rate,
            delivery_rate,
        );

        info!(
            "Order pricing for supplier {}: multiplier={:.4}, {} rules applied",
            request.supplier_id,
            total_multiplier,
            applied_factors.len()
        );

        Ok(OrderPricing {
            adjusted_product_price,
            adjusted_delivery_fee,
            total_multiplier,
            applied_factors,
            commission,
        })
    }

    /// Place an order: validate the listing, hold stock, then insert the
    /// order with its breakdown captured at quote time.
    ///
    /// Two-phase with explicit compensation: if the order insert fails after
    /// the stock hold succeeded, the hold is released before the error
    /// surfaces.
    pub async fn place_order(&self, request: &PlaceOrderRequest) -> AppResult<MarketplaceOrder> {
        if request.quantity <= 0 {
            return Err(AppError::Validation("Order quantity must be positive".into()));
        }

        let listing = self
            .listing_repo
            .find_by_id(request.listing_id)
            .await
            .map_err(AppError::from)?
            .ok_or_else(|| AppError::NotFound(format!("Listing {} not found", request.listing_id)))?;

        if !listing.is_active {
            return Err(AppError::BusinessLogic(format!(
                "Listing {} is no longer active",
                listing.id
            )));
        }

        if !listing.fulfillment_enum().supports(request.fulfillment) {
            return Err(AppError::BusinessLogic(format!(
                "Listing {} does not offer {} fulfillment",
                listing.id,
                request.fulfillment.as_str()
            )));
        }

        let delivery_fee = match request.fulfillment {
            FulfillmentType::Delivery => listing.delivery_fee,
            FulfillmentType::Pickup => Decimal::ZERO,
        };

        let pricing = self
            .calculate_order_pricing(&OrderQuoteRequest {
                supplier_id: listing.supplier_id,
                base_price: listing.base_price * Decimal::from(request.quantity),
                delivery_fee,
                customer_location: request.customer_location,
                delivery_distance_km: request.delivery_distance_km,
                order_time: None,
            })
            .await?;

        // Phase one: hold the stock
        self.listing_repo
            .reserve_stock(listing.id, request.quantity)
            .await
            .map_err(AppError::from)?;

        let now = chrono::Utc::now().naive_utc();
        let new_order = NewOrder {
            listing_id: listing.id,
            supplier_id: listing.supplier_id,
            customer_id: request.customer_id,
            quantity: request.quantity,
            fulfillment: request.fulfillment,
            adjusted_product_price: pricing.adjusted_product_price,
            adjusted_delivery_fee: pricing.adjusted_delivery_fee,
            breakdown: pricing.commission.clone(),
            expires_at: now + Duration::hours(request.fulfillment.reservation_ttl_hours()),
        };

        // Phase two: insert the order; compensate the hold on failure
        let order = match self.order_repo.create(&new_order).await {
            Ok(order) => order,
            Err(e) => {
                if let Err(release_err) = self
                    .listing_repo
                    .release_stock(listing.id, request.quantity)
                    .await
                {
                    error!(
                        "Failed to release reservation on listing {} after order insert failure: {}",
                        listing.id, release_err
                    );
                }
                return Err(AppError::from(e));
            }
        };

        info!(
            "Order {} placed on listing {} ({} x{}, expires {})",
            order.id,
            listing.id,
            order.fulfillment,
            order.quantity,
            order.expires_at
        );

        Ok(order)
    }

    /// Confirm a pending order after payment: the stock hold becomes a sale
    pub async fn confirm_order(&self, order_id: Uuid) -> AppResult<MarketplaceOrder> {
        let order = self
            .order_repo
            .update_status(order_id, OrderStatus::Confirmed)
            .await
            .map_err(AppError::from)?;

        self.listing_repo
            .commit_stock(order.listing_id, order.quantity)
            .await
            .map_err(AppError::from)?;

        info!("Order {} confirmed", order.id);
        Ok(order)
    }

    /// Cancel a pending order and release its stock hold
    pub async fn cancel_order(&self, order_id: Uuid) -> AppResult<MarketplaceOrder> {
        let order = self
            .order_repo
            .update_status(order_id, OrderStatus::Cancelled)
            .await
            .map_err(AppError::from)?;

        self.listing_repo
            .release_stock(order.listing_id, order.quantity)
            .await
            .map_err(AppError::from)?;

        info!("Order {} cancelled", order.id);
        Ok(order)
    }

    /// Cancel pending orders whose reservation window has lapsed.
    ///
    /// Returns the number of orders expired. Intended for a periodic
    /// background task in the hosting application.
    pub async fn expire_lapsed_orders(&self, now: NaiveDateTime) -> AppResult<usize> {
        let expired = self
            .order_repo
            .find_expired(now, 100)
            .await
            .map_err(AppError::from)?;

        let mut processed = 0;
        for order in expired {
            match self.cancel_order(order.id).await {
                Ok(_) => processed += 1,
                Err(e) => warn!("Failed to expire order {}: {}", order.id, e),
            }
        }

        if processed > 0 {
            info!("Expired {} lapsed reservations", processed);
        }
        Ok(processed)
    }

    /// Write the settlement ledger for a confirmed order.
    ///
    /// The platform is paid first and immediately; supplier and courier rows
    /// are deferred past the chargeback window (+24h and +48h). Pickup
    /// orders have no courier row. Splitting the same order twice is
    /// rejected, backed by the (order_id, party) unique constraint.
    pub async fn process_payment_split(
        &self,
        order_id: Uuid,
        payment: &PaymentConfirmation,
    ) -> AppResult<Vec<PaymentSplit>> {
        let order = self
            .order_repo
            .find_by_id(order_id)
            .await
            .map_err(AppError::from)?
            .ok_or_else(|| AppError::NotFound(format!("Order {} not found", order_id)))?;

        let total_charged = order.adjusted_product_price + order.adjusted_delivery_fee;
        if payment.amount != total_charged {
            return Err(AppError::BusinessLogic(format!(
                "Payment amount {} does not match order total {} for order {}",
                payment.amount, total_charged, order_id
            )));
        }

        if self.split_repo.exists_for_order(order_id).await.map_err(AppError::from)? {
            return Err(AppError::BusinessLogic(format!(
                "Order {} has already been split",
                order_id
            )));
        }

        let breakdown = order.breakdown();
        let now = chrono::Utc::now().naive_utc();

        let mut splits = vec![
            NewPaymentSplit {
                order_id,
                party: SplitParty::Platform,
                amount: breakdown.total_commission,
                status: SplitStatus::Completed,
                scheduled_at: now,
            },
            NewPaymentSplit {
                order_id,
                party: SplitParty::Supplier,
                amount: breakdown.supplier_earning,
                status: SplitStatus::Pending,
                scheduled_at: now + Duration::hours(self.config.supplier_settlement_delay_hours),
            },
        ];

        if order.fulfillment_enum() == FulfillmentType::Delivery {
            splits.push(NewPaymentSplit {
                order_id,
                party: SplitParty::Courier,
                amount: breakdown.courier_earning,
                status: SplitStatus::Pending,
                scheduled_at: now + Duration::hours(self.config.courier_settlement_delay_hours),
            });
        }

        let inserted = self.split_repo.insert_splits(&splits).await.map_err(AppError::from)?;

        info!(
            "Payment split recorded for order {} ({} via {}): {} ledger rows",
            order_id,
            payment.amount,
            payment.method,
            inserted.len()
        );

        Ok(inserted)
    }

    /// Score a subject's activity against the fraud table and persist the
    /// assessment.
    pub async fn detect_fraud(
        &self,
        subject_id: Uuid,
        signals: &FraudSignals,
    ) -> AppResult<FraudAssessment> {
        let assessment = score_signals(signals);

        self.fraud_repo
            .create(subject_id, &assessment)
            .await
            .map_err(AppError::from)?;

        if assessment.action_required {
            warn!(
                "Fraud review required for subject {}: score {} ({:?})",
                subject_id, assessment.risk_score, assessment.reasons
            );
        }

        Ok(assessment)
    }
}

/// Evaluate one rule against an order context.
///
/// A time_of_day rule with no configured hours falls back to the standard
/// peak windows.
fn rule_applies(rule: &PricingFactorRule, context: &RuleContext) -> bool {
    let conditions = rule.conditions();

    match rule.factor_type_enum() {
        FactorType::TimeOfDay => match &conditions.peak_hours {
            Some(hours) => hours.contains(&context.hour),
            None => crate::services::factor_collector::PEAK_HOURS.contains(&context.hour),
        },
        FactorType::Distance => conditions
            .min_distance_km
            .map_or(false, |min| context.distance_km >= min),
        FactorType::Weather => conditions
            .min_weather_score
            .map_or(false, |min| context.weather_score >= min),
        FactorType::Traffic => conditions
            .min_traffic_score
            .map_or(false, |min| context.traffic_score >= min),
        FactorType::Demand => {
            if conditions.weekend_only.unwrap_or(false) {
                context.weekend
            } else {
                true
            }
        }
    }
}

/// Split a pair of adjusted charges between the three parties.
///
/// Commissions are rounded to whole currency units; earnings come from
/// subtraction so each pair sums back to its adjusted amount exactly.
pub fn split_charges(
    adjusted_product_price: Decimal,
    adjusted_delivery_fee: Decimal,
    product_rate: Decimal,
    delivery_rate: Decimal,
) -> CommissionBreakdown {
    let platform_commission = round_money(adjusted_product_price * product_rate);
    let delivery_commission = round_money(adjusted_delivery_fee * delivery_rate);

    CommissionBreakdown {
        platform_commission,
        delivery_commission,
        total_commission: platform_commission + delivery_commission,
        supplier_earning: adjusted_product_price - platform_commission,
        courier_earning: adjusted_delivery_fee - delivery_commission,
    }
}

/// The deterministic fraud scoring table.
///
/// Each matching anomaly adds its fixed points; a total strictly above 50
/// flags the subject for manual review. A score of exactly 50 does not.
pub fn score_signals(signals: &FraudSignals) -> FraudAssessment {
    let mut risk_score = 0;
    let mut reasons = Vec::new();

    if signals.orders_last_24h > 10 {
        risk_score += RISK_ORDER_VELOCITY;
        reasons.push(format!("{} orders in 24h", signals.orders_last_24h));
    }

    if signals.order_amount > Decimal::from(50_000) {
        risk_score += RISK_LARGE_ORDER;
        reasons.push(format!("order amount {}", signals.order_amount));
    }

    if signals.reviews_last_7d > 5 {
        risk_score += RISK_REVIEW_VELOCITY;
        reasons.push(format!("{} reviews in 7 days", signals.reviews_last_7d));
    }

    if signals.all_five_star_reviews {
        risk_score += RISK_UNIFORM_REVIEWS;
        reasons.push("uniform 5-star review history".to_string());
    }

    if signals.price_change_pct > 50.0 {
        risk_score += RISK_PRICE_SWING;
        reasons.push(format!("price changed {:.0}%", signals.price_change_pct));
    }

    if signals.stock_mutations_last_24h > 5 {
        risk_score += RISK_STOCK_CHURN;
        reasons.push(format!(
            "{} stock mutations in 24h",
            signals.stock_mutations_last_24h
        ));
    }

    let action_required = risk_score > RISK_REVIEW_THRESHOLD;

    FraudAssessment {
        risk_score,
        reasons,
        action_required,
        status: if action_required {
            FraudLogStatus::Pending
        } else {
            FraudLogStatus::Dismissed
        },
    }
}

fn decimal_from_f64(value: f64) -> AppResult<Decimal> {
    Decimal::from_f64_retain(value)
        .ok_or_else(|| AppError::Message(format!("Unrepresentable decimal value: {}", value)))
}

/// Round to whole currency units, half away from zero
fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fraud_score_at_boundary_is_not_flagged() {
        // 11 orders (+30) and a 60,000 order (+20) total exactly 50
        let signals = FraudSignals {
            orders_last_24h: 11,
            order_amount: Decimal::from(60_000),
            ..FraudSignals::default()
        };

        let assessment = score_signals(&signals);
        assert_eq!(assessment.risk_score, 50);
        assert!(!assessment.action_required);
        assert_eq!(assessment.status, FraudLogStatus::Dismissed);
    }

    #[test]
    fn test_fraud_score_above_boundary_is_flagged() {
        let signals = FraudSignals {
            orders_last_24h: 11,
            order_amount: Decimal::from(60_000),
            all_five_star_reviews: true,
            ..FraudSignals::default()
        };

        let assessment = score_signals(&signals);
        assert_eq!(assessment.risk_score, 75);
        assert!(assessment.action_required);
        assert_eq!(assessment.status, FraudLogStatus::Pending);
    }

    #[test]
    fn test_fraud_thresholds_are_exclusive() {
        // Exactly 10 orders, exactly 50,000, exactly 5 reviews: nothing fires
        let signals = FraudSignals {
            orders_last_24h: 10,
            order_amount: Decimal::from(50_000),
            reviews_last_7d: 5,
            price_change_pct: 50.0,
            stock_mutations_last_24h: 5,
            ..FraudSignals::default()
        };

        let assessment = score_signals(&signals);
        assert_eq!(assessment.risk_score, 0);
        assert!(assessment.reasons.is_empty());
    }

    #[test]
    fn test_fraud_all_anomalies() {
        let signals = FraudSignals {
            orders_last_24h: 20,
            order_amount: Decimal::from(100_000),
            reviews_last_7d: 9,
            all_five_star_reviews: true,
            price_change_pct: 80.0,
            stock_mutations_last_24h: 12,
        };

        let assessment = score_signals(&signals);
        assert_eq!(assessment.risk_score, 30 + 20 + 40 + 25 + 35 + 30);
        assert!(assessment.action_required);
    }

    #[test]
    fn test_split_conserves_adjusted_amounts() {
        let rates = [
            (Decimal::new(15, 2), Decimal::new(10, 2)),
            (Decimal::new(33, 2), Decimal::new(7, 2)),
            (Decimal::ZERO, Decimal::ONE),
        ];
        let amounts = [
            (Decimal::from(4863), Decimal::from(351)),
            (Decimal::from(1), Decimal::from(1)),
            (Decimal::from(99_999), Decimal::ZERO),
        ];

        for (product_rate, delivery_rate) in rates {
            for (product, delivery) in amounts {
                let b = split_charges(product, delivery, product_rate, delivery_rate);
                assert_eq!(b.supplier_earning + b.platform_commission, product);
                assert_eq!(b.courier_earning + b.delivery_commission, delivery);
                assert_eq!(
                    b.total_commission,
                    b.platform_commission + b.delivery_commission
                );
            }
        }
    }

    #[test]
    fn test_split_default_rates() {
        // 15% product and 10% delivery commission on round amounts
        let b = split_charges(
            Decimal::from(1000),
            Decimal::from(200),
            Decimal::new(15, 2),
            Decimal::new(10, 2),
        );
        assert_eq!(b.platform_commission, Decimal::from(150));
        assert_eq!(b.supplier_earning, Decimal::from(850));
        assert_eq!(b.delivery_commission, Decimal::from(20));
        assert_eq!(b.courier_earning, Decimal::from(180));
        assert_eq!(b.total_commission, Decimal::from(170));
    }

    #[test]
    fn test_round_money_half_away_from_zero() {
        assert_eq!(round_money(Decimal::new(25, 1)), Decimal::from(3)); // 2.5 -> 3
        assert_eq!(round_money(Decimal::new(24, 1)), Decimal::from(2)); // 2.4 -> 2
    }

    fn rule(factor_type: FactorType, conditions: serde_json::Value) -> PricingFactorRule {
        PricingFactorRule {
            id: Uuid::new_v4(),
            factor_type: factor_type.as_str().to_string(),
            factor_name: "test rule".to_string(),
            multiplier: 1.25,
            conditions,
            is_active: true,
            created_at: chrono::Utc::now().naive_utc(),
        }
    }

    fn context() -> RuleContext {
        RuleContext {
            hour: 18,
            weekend: false,
            distance_km: 12.0,
            weather_score: 0.6,
            traffic_score: 0.4,
        }
    }

    #[test]
    fn test_time_rule_uses_configured_hours() {
        let r = rule(FactorType::TimeOfDay, serde_json::json!({"peak_hours": [12, 13]}));
        assert!(!rule_applies(&r, &context()));

        let r = rule(FactorType::TimeOfDay, serde_json::json!({"peak_hours": [18]}));
        assert!(rule_applies(&r, &context()));
    }

    #[test]
    fn test_time_rule_defaults_to_peak_windows() {
        let r = rule(FactorType::TimeOfDay, serde_json::json!({}));
        assert!(rule_applies(&r, &context())); // 18:00 is a peak hour
    }

    #[test]
    fn test_distance_rule_threshold() {
        let r = rule(FactorType::Distance, serde_json::json!({"min_distance_km": 10.0}));
        assert!(rule_applies(&r, &context()));

        let r = rule(FactorType::Distance, serde_json::json!({"min_distance_km": 15.0}));
        assert!(!rule_applies(&r, &context()));
    }

    #[test]
    fn test_weather_and_traffic_rules() {
        let r = rule(FactorType::Weather, serde_json::json!({"min_weather_score": 0.5}));
        assert!(rule_applies(&r, &context()));

        let r = rule(FactorType::Traffic, serde_json::json!({"min_traffic_score": 0.5}));
        assert!(!rule_applies(&r, &context()));
    }

    #[test]
    fn test_weekend_demand_rule() {
        let r = rule(FactorType::Demand, serde_json::json!({"weekend_only": true}));
        assert!(!rule_applies(&r, &context()));

        let weekend = RuleContext {
            weekend: true,
            ..context()
        };
        assert!(rule_applies(&r, &weekend));

        let unconditional = rule(FactorType::Demand, serde_json::json!({}));
        assert!(rule_applies(&unconditional, &context()));
    }
}
