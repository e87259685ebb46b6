//! Garage analytics snapshots (read-only reporting data).

use serde::{Deserialize, Serialize};

/// Metric set computed for one reporting period.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PeriodMetrics {
    #[serde(rename = "chiffre_affaires_total")]
    pub total_revenue: f64,
    #[serde(rename = "rentabilite")]
    pub profitability: f64,
    #[serde(rename = "taux_retard")]
    pub delay_rate: f64,
    #[serde(rename = "taux_annulation")]
    pub cancellation_rate: f64,
    #[serde(rename = "perte_estimee")]
    pub estimated_loss: f64,
    #[serde(rename = "revenu_moyen_par_tache")]
    pub average_revenue_per_task: f64,
}

/// Metrics for one month or year, with the change against the previous one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsPeriod {
    pub date: String,
    #[serde(default)]
    pub processing_timestamp: String,
    #[serde(flatten)]
    pub metrics: PeriodMetrics,
    #[serde(default)]
    pub evolution: PeriodMetrics,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GarageAnalytics {
    #[serde(default)]
    pub id: String,
    #[serde(alias = "garageId")]
    pub garage_id: String,
    #[serde(default, alias = "monthlyAnalytics")]
    pub monthly_analytics: Vec<AnalyticsPeriod>,
    #[serde(default, alias = "yearlyAnalytics")]
    pub yearly_analytics: Vec<AnalyticsPeriod>,
}

impl GarageAnalytics {
    /// Most recent monthly snapshot.
    pub fn latest_month(&self) -> Option<&AnalyticsPeriod> {
        self.monthly_analytics.iter().max_by(|a, b| a.date.cmp(&b.date))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_period_uses_reporting_field_names() {
        let analytics: GarageAnalytics = serde_json::from_value(json!({
            "id": "A1",
            "garage_id": "G1",
            "monthly_analytics": [
                {
                    "date": "2026-08",
                    "processing_timestamp": "2026-09-01T00:00:00Z",
                    "chiffre_affaires_total": 1200.0,
                    "rentabilite": 0.4,
                    "taux_retard": 0.1,
                    "taux_annulation": 0.05,
                    "perte_estimee": 60.0,
                    "revenu_moyen_par_tache": 120.0,
                    "evolution": {
                        "chiffre_affaires_total": 0.1,
                        "rentabilite": 0.0,
                        "taux_retard": -0.02,
                        "taux_annulation": 0.0,
                        "perte_estimee": 5.0,
                        "revenu_moyen_par_tache": 3.0
                    }
                },
                {
                    "date": "2026-09",
                    "chiffre_affaires_total": 900.0,
                    "rentabilite": 0.3,
                    "taux_retard": 0.2,
                    "taux_annulation": 0.0,
                    "perte_estimee": 10.0,
                    "revenu_moyen_par_tache": 90.0
                }
            ]
        }))
        .unwrap();

        assert!(analytics.yearly_analytics.is_empty());
        assert_eq!(analytics.monthly_analytics[0].metrics.total_revenue, 1200.0);
        assert_eq!(analytics.monthly_analytics[0].evolution.delay_rate, -0.02);
        assert_eq!(analytics.latest_month().unwrap().date, "2026-09");
    }
}
