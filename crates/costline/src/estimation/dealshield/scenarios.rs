//! Re-runs the cost and financial pipeline under each tile combination.

use std::collections::BTreeMap;

use super::metrics::{self, ScenarioSnapshot, HEADLINE_REFS};
use super::profiles::{TileProfile, TileTarget};
use super::{DealShieldError, StressBand};
use crate::estimation::domain::{FinancingAssumptions, ProjectDescription};
use crate::estimation::engine::{CostEngine, ScenarioAdjustments};
use crate::estimation::financial::FinancialAnalyzer;
use crate::estimation::pricing::RegistryError;

pub(crate) struct ScenarioRunner<'a> {
    pub cost: &'a CostEngine,
    pub financial: &'a FinancialAnalyzer,
    pub project: &'a ProjectDescription,
    pub financing: Option<FinancingAssumptions>,
    pub profile: &'a TileProfile,
    pub band: StressBand,
    /// Rebases every scenario's cost onto a caller-supplied total.
    pub cost_rebase: f64,
    pub revenue_anchor: Option<f64>,
}

impl ScenarioRunner<'_> {
    pub fn adjustments(
        &self,
        tile_ids: &[&str],
    ) -> Result<(ScenarioAdjustments, BTreeMap<String, f64>), RegistryError> {
        let mut adjustments = ScenarioAdjustments {
            cost_factor: self.cost_rebase,
            revenue_anchor: self.revenue_anchor,
            ..ScenarioAdjustments::default()
        };
        let mut factors = BTreeMap::new();

        for tile_id in tile_ids {
            let tile = self
                .profile
                .tile(tile_id)
                .ok_or_else(|| RegistryError::UnknownTile {
                    profile_id: self.profile.id.to_string(),
                    tile_id: tile_id.to_string(),
                })?;
            let factor = tile.factor(self.band);
            match tile.target {
                TileTarget::TotalCost => adjustments.cost_factor *= factor,
                TileTarget::Revenue => adjustments.revenue_factor *= factor,
                TileTarget::OperatingExpenses => adjustments.opex_factor *= factor,
                TileTarget::Trade(trade) => {
                    *adjustments.trade_factors.entry(trade).or_insert(1.0) *= factor;
                }
            }
            factors.insert(tile.id.to_string(), factor);
        }
        Ok((adjustments, factors))
    }

    /// Price one scenario and resolve every headline and tile metric against it.
    pub fn run(
        &self,
        scenario_id: &str,
        label: &str,
        tile_ids: &[&str],
    ) -> Result<ScenarioSnapshot, DealShieldError> {
        let (adjustments, tile_factors) = self.adjustments(tile_ids)?;
        let payload = self.cost.calculate_with(self.project, &adjustments)?;
        let analysis = self
            .financial
            .analyze_investment(&payload, self.financing, &adjustments)?;
        let document = metrics::snapshot_document(&payload, &analysis);

        let mut resolved = BTreeMap::new();
        for metric_ref in HEADLINE_REFS {
            resolved.insert(metric_ref.to_string(), metrics::resolve(&document, metric_ref));
        }
        for tile in &self.profile.tiles {
            let metric_ref = tile.target.metric_ref();
            let value = metrics::resolve(&document, &metric_ref).ok_or_else(|| {
                DealShieldError::UnresolvedMetric {
                    scenario_id: scenario_id.to_string(),
                    metric_ref: metric_ref.clone(),
                }
            })?;
            resolved.insert(metric_ref, Some(value));
        }

        Ok(ScenarioSnapshot {
            scenario_id: scenario_id.to_string(),
            label: label.to_string(),
            applied_tiles: tile_ids.iter().map(|id| id.to_string()).collect(),
            tile_factors,
            metrics: resolved,
        })
    }
}
