//! Onboarding configuration: the external inputs the cascade derives its
//! targets from.
//!
//! [`OnboardingFormData`] mirrors the JSON captured by the onboarding form.
//! [`OnboardingConfig`] is the resolved, numeric view of it that validators
//! consume.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Form data (external JSON)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingFormData {
    #[serde(default)]
    pub budget_targets: BudgetTargets,
    #[serde(default)]
    pub product_offer: ProductOffer,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BudgetTargets {
    #[serde(default)]
    pub monthly_ad_budget: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_cpl: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductOffer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offer_price: Option<f64>,
    #[serde(default)]
    pub pricing_tiers: Vec<PricingTier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pricing_model: Option<PricingModel>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PricingTier {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price: f64,
}

/// How the customer pays, which determines expected lifetime value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingModel {
    Monthly,
    Annual,
    OneTime,
    UsageBased,
    SeatBased,
    #[default]
    #[serde(other)]
    Custom,
}

impl PricingModel {
    /// Number of offer-price payments expected over a customer's lifetime.
    pub fn retention_multiplier(self) -> f64 {
        match self {
            Self::Monthly => 12.0,
            Self::Annual => 1.0,
            Self::OneTime => 1.0,
            Self::UsageBased => 6.0,
            Self::SeatBased => 12.0,
            Self::Custom => 3.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Resolved configuration
// ---------------------------------------------------------------------------

/// Funnel conversion rates used when the plan's CAC model does not state
/// its own.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FunnelDefaults {
    pub lead_to_sql_rate: f64,
    pub sql_to_customer_rate: f64,
}

impl FunnelDefaults {
    pub const DEFAULT_LEAD_TO_SQL_RATE: f64 = 0.30;
    pub const DEFAULT_SQL_TO_CUSTOMER_RATE: f64 = 0.25;
}

impl Default for FunnelDefaults {
    fn default() -> Self {
        Self {
            lead_to_sql_rate: Self::DEFAULT_LEAD_TO_SQL_RATE,
            sql_to_customer_rate: Self::DEFAULT_SQL_TO_CUSTOMER_RATE,
        }
    }
}

/// Numeric inputs the cascade derives targets from.
///
/// Use [`OnboardingConfig::from_form`] to resolve one from form data, or
/// [`OnboardingConfig::new`] plus the builder-style setters in tests.
#[derive(Debug, Clone, PartialEq)]
pub struct OnboardingConfig {
    /// Monthly ad budget stated by the customer.
    pub monthly_budget: f64,
    /// Target cost per lead, if the customer stated one.
    pub target_cpl: Option<f64>,
    /// Price of the core offer; `0.0` when unknown.
    pub offer_price: f64,
    /// Payments expected per customer lifetime.
    pub retention_multiplier: f64,
    pub funnel: FunnelDefaults,
}

impl OnboardingConfig {
    /// Create a config with the required budget.
    ///
    /// Optional fields default to: no target CPL, offer price `0.0`, the
    /// `custom` pricing model's multiplier, and [`FunnelDefaults::default`].
    pub fn new(monthly_budget: f64) -> Self {
        Self {
            monthly_budget,
            target_cpl: None,
            offer_price: 0.0,
            retention_multiplier: PricingModel::Custom.retention_multiplier(),
            funnel: FunnelDefaults::default(),
        }
    }

    /// Resolve a config from onboarding form data.
    ///
    /// The offer price is `productOffer.offerPrice` when positive, otherwise
    /// the first pricing tier with a positive price, otherwise `0.0`. A
    /// missing pricing model counts as `custom`.
    pub fn from_form(form: &OnboardingFormData) -> Self {
        let offer = &form.product_offer;
        let offer_price = offer
            .offer_price
            .filter(|p| p.is_finite() && *p > 0.0)
            .or_else(|| {
                offer
                    .pricing_tiers
                    .iter()
                    .map(|t| t.price)
                    .find(|p| p.is_finite() && *p > 0.0)
            })
            .unwrap_or(0.0);

        Self {
            monthly_budget: form.budget_targets.monthly_ad_budget,
            target_cpl: form.budget_targets.target_cpl.filter(|c| *c > 0.0),
            offer_price,
            retention_multiplier: offer.pricing_model.unwrap_or_default().retention_multiplier(),
            funnel: FunnelDefaults::default(),
        }
    }

    pub fn target_cpl(mut self, cpl: f64) -> Self {
        self.target_cpl = Some(cpl);
        self
    }

    pub fn offer_price(mut self, price: f64) -> Self {
        self.offer_price = price;
        self
    }

    pub fn pricing_model(mut self, model: PricingModel) -> Self {
        self.retention_multiplier = model.retention_multiplier();
        self
    }

    pub fn funnel(mut self, funnel: FunnelDefaults) -> Self {
        self.funnel = funnel;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retention_multipliers_match_pricing_models() {
        assert_eq!(PricingModel::Monthly.retention_multiplier(), 12.0);
        assert_eq!(PricingModel::Annual.retention_multiplier(), 1.0);
        assert_eq!(PricingModel::OneTime.retention_multiplier(), 1.0);
        assert_eq!(PricingModel::UsageBased.retention_multiplier(), 6.0);
        assert_eq!(PricingModel::SeatBased.retention_multiplier(), 12.0);
        assert_eq!(PricingModel::Custom.retention_multiplier(), 3.0);
    }

    #[test]
    fn unknown_pricing_model_is_custom() {
        let model: PricingModel = serde_json::from_str(r#""freemium""#).unwrap();
        assert_eq!(model, PricingModel::Custom);
    }

    #[test]
    fn from_form_prefers_explicit_offer_price() {
        let form: OnboardingFormData = serde_json::from_str(
            r#"{
                "budgetTargets": {"monthlyAdBudget": 15000, "targetCpl": 75},
                "productOffer": {
                    "offerPrice": 997,
                    "pricingTiers": [{"name": "Basic", "price": 49}],
                    "pricingModel": "monthly"
                }
            }"#,
        )
        .unwrap();
        let config = OnboardingConfig::from_form(&form);
        assert_eq!(config.monthly_budget, 15000.0);
        assert_eq!(config.target_cpl, Some(75.0));
        assert_eq!(config.offer_price, 997.0);
        assert_eq!(config.retention_multiplier, 12.0);
    }

    #[test]
    fn from_form_falls_back_to_first_priced_tier() {
        let form: OnboardingFormData = serde_json::from_str(
            r#"{
                "productOffer": {
                    "pricingTiers": [
                        {"name": "Free", "price": 0},
                        {"name": "Pro", "price": 199},
                        {"name": "Team", "price": 499}
                    ],
                    "pricingModel": "seat_based"
                }
            }"#,
        )
        .unwrap();
        let config = OnboardingConfig::from_form(&form);
        assert_eq!(config.offer_price, 199.0);
        assert_eq!(config.retention_multiplier, 12.0);
    }

    #[test]
    fn from_form_defaults_when_empty() {
        let config = OnboardingConfig::from_form(&OnboardingFormData::default());
        assert_eq!(config.offer_price, 0.0);
        assert_eq!(config.target_cpl, None);
        assert_eq!(config.retention_multiplier, 3.0);
        assert_eq!(config.funnel, FunnelDefaults::default());
    }

    #[test]
    fn builder_sets_optional_fields() {
        let config = OnboardingConfig::new(5000.0)
            .target_cpl(50.0)
            .offer_price(300.0)
            .pricing_model(PricingModel::UsageBased);
        assert_eq!(config.target_cpl, Some(50.0));
        assert_eq!(config.offer_price, 300.0);
        assert_eq!(config.retention_multiplier, 6.0);
    }
}
