use chrono::{DateTime, Days, Utc};

use crate::config::OffersConfig;
use crate::errors::RoofdeskError;
use crate::models::{total_estimated_cost, Offer, OfferStatus, Report};

/// Round to whole øre/cents.
pub fn round_currency(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Price a report. Cost fields are carried over, recommended-action estimates
/// are summed into `actions_cost`, and VAT is applied to the subtotal.
pub fn derive_offer(report: &Report, settings: &OffersConfig, now: DateTime<Utc>) -> Result<Offer, RoofdeskError> {
    let valid_until = u64::try_from(settings.validity_days)
        .ok()
        .and_then(|days| now.date_naive().checked_add_days(Days::new(days)))
        .ok_or_else(|| {
            RoofdeskError::Config(format!("offers.validity_days {} is out of range", settings.validity_days))
        })?;
    let costs = &report.costs;
    let actions_cost = round_currency(total_estimated_cost(&report.recommended_actions));
    let subtotal = round_currency(costs.total() + actions_cost);
    let vat_amount = round_currency(subtotal * settings.vat_rate);

    Ok(Offer {
        id: uuid::Uuid::new_v4().to_string(),
        report_id: report.id.clone(),
        branch_id: report.branch_id.clone(),
        customer_name: report.customer_name.clone(),
        customer_email: report.customer_email.clone(),
        title: offer_title(report),
        description: offer_description(report),
        labor_cost: round_currency(costs.labor_cost),
        material_cost: round_currency(costs.material_cost),
        travel_cost: round_currency(costs.travel_cost),
        overhead_cost: round_currency(costs.overhead_cost),
        actions_cost,
        subtotal,
        vat_rate: settings.vat_rate,
        vat_amount,
        total_amount: round_currency(subtotal + vat_amount),
        currency: settings.currency.clone(),
        valid_until,
        status: OfferStatus::Pending,
        created_at: now,
        responded_at: None,
    })
}

fn offer_title(report: &Report) -> String {
    let address = report
        .building_address
        .as_deref()
        .filter(|a| !a.trim().is_empty())
        .unwrap_or(&report.customer_address);
    if address.trim().is_empty() {
        format!("Roof work for {}", report.customer_name)
    } else {
        format!("Roof work at {}", address.trim())
    }
}

fn offer_description(report: &Report) -> String {
    let mut actions = report.recommended_actions.clone();
    actions.sort_by_key(|a| a.priority.rank());
    let lines: Vec<String> = actions
        .iter()
        .filter(|a| !a.description.trim().is_empty())
        .map(|a| format!("- {} ({})", a.description.trim(), a.urgency.label()))
        .collect();

    if lines.is_empty() {
        report.condition_notes.trim().to_string()
    } else {
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CostBreakdown, Priority, RecommendedAction, ReportFormData, ReportStatus, RoofType, Urgency};
    use chrono::{NaiveDate, TimeZone};

    fn report() -> Report {
        ReportFormData {
            customer_name: "Birgit Lund".into(),
            customer_address: "Skovvej 3, 7100 Vejle".into(),
            customer_email: Some("birgit@example.dk".into()),
            inspection_date: NaiveDate::from_ymd_opt(2026, 9, 1),
            roof_type: Some(RoofType::Tile),
            costs: CostBreakdown {
                labor_cost: 4200.0,
                material_cost: 3150.5,
                travel_cost: 300.0,
                overhead_cost: 0.0,
            },
            recommended_actions: vec![
                RecommendedAction {
                    id: "a1".into(),
                    priority: Priority::Low,
                    urgency: Urgency::LongTerm,
                    description: "Rens tagrender".into(),
                    estimated_cost: Some(800.0),
                },
                RecommendedAction {
                    id: "a2".into(),
                    priority: Priority::High,
                    urgency: Urgency::Immediate,
                    description: "Udskift knækkede tagsten".into(),
                    estimated_cost: Some(1200.25),
                },
                RecommendedAction {
                    id: "a3".into(),
                    priority: Priority::Medium,
                    urgency: Urgency::ShortTerm,
                    description: "Efterse inddækning".into(),
                    estimated_cost: None,
                },
            ],
            ..Default::default()
        }
        .into_report("b1", "u1", ReportStatus::Completed, Utc::now())
        .unwrap()
    }

    #[test]
    fn test_totals_are_costs_plus_vat() {
        let now = Utc.with_ymd_and_hms(2026, 9, 2, 10, 0, 0).unwrap();
        let offer = derive_offer(&report(), &OffersConfig::default(), now).unwrap();

        assert_eq!(offer.actions_cost, 2000.25);
        assert_eq!(offer.subtotal, 9650.75);
        assert_eq!(offer.vat_amount, 2412.69);
        assert_eq!(offer.total_amount, 12063.44);
        assert_eq!(offer.currency, "DKK");
        assert_eq!(offer.status, OfferStatus::Pending);
        assert_eq!(offer.valid_until, NaiveDate::from_ymd_opt(2026, 10, 2).unwrap());
    }

    #[test]
    fn test_total_identity_holds() {
        let offer = derive_offer(&report(), &OffersConfig { vat_rate: 0.2, ..Default::default() }, Utc::now()).unwrap();
        let sum = offer.labor_cost + offer.material_cost + offer.travel_cost + offer.overhead_cost + offer.actions_cost;
        assert!((offer.subtotal - sum).abs() < 0.011);
        assert!((offer.total_amount - (offer.subtotal + offer.vat_amount)).abs() < 1e-9);
    }

    #[test]
    fn test_description_orders_by_priority() {
        let offer = derive_offer(&report(), &OffersConfig::default(), Utc::now()).unwrap();
        assert!(offer.description.starts_with("- Udskift knækkede tagsten (Immediate)"));
        assert_eq!(offer.title, "Roof work at Skovvej 3, 7100 Vejle");
        assert_eq!(offer.customer_email.as_deref(), Some("birgit@example.dk"));
    }

    #[test]
    fn test_unrepresentable_validity_is_an_error() {
        let settings = OffersConfig { validity_days: 100_000_000_000, ..Default::default() };
        assert!(matches!(derive_offer(&report(), &settings, Utc::now()), Err(RoofdeskError::Config(_))));

        let settings = OffersConfig { validity_days: -1, ..Default::default() };
        assert!(derive_offer(&report(), &settings, Utc::now()).is_err());
    }

    #[test]
    fn test_round_currency() {
        assert_eq!(round_currency(10.005_1), 10.01);
        assert_eq!(round_currency(-0.0), 0.0);
        assert_eq!(round_currency(99.994), 99.99);
    }
}
