use crate::infra::InMemoryEstimateRepository;
use clap::Args;
use costline::config::AppConfig;
use costline::error::AppError;
use costline::estimation::export;
use costline::estimation::{
    BuildingType, DealShieldControls, EstimateReport, EstimateServiceError, EstimationService,
    PricingRegistry, ProjectClassification, ProjectRequest, QualityLevel, SpaceType, StressBand,
};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct EstimateArgs {
    /// Building type, e.g. office, healthcare, mixed_use
    #[arg(long)]
    pub(crate) building_type: BuildingType,
    /// Subtype key, e.g. class_a or surgical_center
    #[arg(long)]
    pub(crate) subtype: String,
    /// Gross square footage
    #[arg(long)]
    pub(crate) square_footage: f64,
    /// Free-text location such as "Nashville, TN"
    #[arg(long)]
    pub(crate) location: String,
    /// ground_up, addition or renovation
    #[arg(long, default_value = "ground_up")]
    pub(crate) classification: ProjectClassification,
    #[arg(long, default_value_t = 1)]
    pub(crate) floors: u32,
    /// economy, standard or premium (defaults per subtype)
    #[arg(long)]
    pub(crate) quality: Option<QualityLevel>,
    /// Space mix as space=fraction pairs, e.g. office=0.7,retail=0.3
    #[arg(long, value_parser = parse_mix)]
    pub(crate) mix: Option<BTreeMap<SpaceType, f64>>,
    /// Free-text special requirements
    #[arg(long, default_value = "")]
    pub(crate) requirements: String,
    /// DealShield stress band in percent (3, 5, 7 or 10)
    #[arg(long, value_parser = parse_stress_band)]
    pub(crate) stress_band: Option<StressBand>,
    /// Run the financial analysis without financing assumptions
    #[arg(long)]
    pub(crate) no_financing: bool,
    /// Print the full report as JSON instead of the summary
    #[arg(long)]
    pub(crate) json: bool,
    /// Write line items to this CSV file
    #[arg(long)]
    pub(crate) csv: Option<PathBuf>,
}

pub(crate) fn parse_mix(raw: &str) -> Result<BTreeMap<SpaceType, f64>, String> {
    raw.split(',')
        .filter(|pair| !pair.trim().is_empty())
        .map(|pair| {
            let (space, fraction) = pair
                .split_once('=')
                .ok_or_else(|| format!("expected space=fraction, found '{pair}'"))?;
            let space: SpaceType = space.parse()?;
            let fraction: f64 = fraction
                .trim()
                .parse()
                .map_err(|err| format!("invalid fraction for {}: {err}", space.key()))?;
            Ok((space, fraction))
        })
        .collect()
}

pub(crate) fn parse_stress_band(raw: &str) -> Result<StressBand, String> {
    let pct: u8 = raw
        .trim()
        .parse()
        .map_err(|err| format!("stress band must be a whole percent ({err})"))?;
    StressBand::try_from(pct).map_err(|err| err.to_string())
}

impl EstimateArgs {
    fn request(&self) -> ProjectRequest {
        let mut request = ProjectRequest::new(
            self.building_type,
            self.subtype.clone(),
            self.square_footage,
            self.location.clone(),
        );
        request.project_classification = self.classification;
        request.num_floors = self.floors;
        request.quality = self.quality;
        request.special_requirements = self.requirements.clone();
        if let Some(mix) = &self.mix {
            request.building_mix = mix.clone();
        }
        if self.no_financing {
            request.include_financing = Some(false);
        }
        request
    }
}

pub(crate) fn run_estimate(args: EstimateArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let registry = PricingRegistry::standard().map_err(EstimateServiceError::from)?;
    let service = EstimationService::new(
        Arc::new(registry),
        config.estimator.engine_settings(),
        Arc::new(InMemoryEstimateRepository::default()),
    );

    let controls = DealShieldControls {
        stress_band: args.stress_band,
        ..DealShieldControls::default()
    };
    let report = service.run(&args.request(), &controls)?;

    if let Some(path) = &args.csv {
        let body = export::to_csv(&report.payload).map_err(EstimateServiceError::from)?;
        std::fs::write(path, body)?;
    }

    if args.json {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{json}"),
            Err(err) => println!("Report JSON unavailable: {err}"),
        }
    } else {
        for line in render_summary(&report) {
            println!("{line}");
        }
    }
    if let Some(path) = &args.csv {
        println!("\nLine items written to {}", path.display());
    }
    Ok(())
}

fn money(value: f64) -> String {
    let rounded = value.abs().round() as u64;
    let digits = rounded.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    if value < 0.0 && rounded > 0 {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}

fn percent(fraction: f64) -> String {
    format!("{:.1}%", fraction * 100.0)
}

pub(crate) fn render_summary(report: &EstimateReport) -> Vec<String> {
    let payload = &report.payload;
    let project = &payload.project;
    let mut lines = Vec::new();

    lines.push(format!(
        "{} / {} | {:.0} SF | {} | {}",
        project.building_type.label(),
        payload.resolution.subtype,
        project.square_footage,
        project.location,
        project.classification.label()
    ));
    lines.push(format!(
        "Regional multiplier {:.2} ({:?})",
        payload.regional.multiplier, payload.regional.tier
    ));

    lines.push("\nTrade breakdown".to_string());
    for result in &payload.trade_breakdowns {
        lines.push(format!(
            "  - {:<28} {:>16} | {:>8.2}/SF | {} items",
            result.trade.label(),
            money(result.subtotal),
            result.cost_per_sqft,
            result.line_items.len()
        ));
    }

    let totals = &payload.totals;
    lines.push(format!("  Subtotal             {}", money(totals.subtotal)));
    lines.push(format!(
        "  Contingency ({})  {}",
        percent(totals.contingency_percentage),
        money(totals.contingency_amount)
    ));
    lines.push(format!(
        "  Total project cost   {} ({:.2}/SF)",
        money(totals.total_project_cost),
        totals.cost_per_sqft
    ));

    let schedule = &payload.construction_schedule;
    lines.push(format!("\nSchedule: {} months", schedule.total_months));
    for phase in &schedule.phases {
        lines.push(format!(
            "  - {}: month {} to {}",
            phase.name, phase.start_month, phase.end_month
        ));
    }

    let ownership = &report.financial.ownership_analysis;
    let decision = &ownership.investment_analysis;
    lines.push("\nInvestment headline".to_string());
    lines.push(format!(
        "  - NOI {} | ROI {} | NPV {}",
        money(report.financial.revenue_analysis.net_operating_income),
        percent(ownership.return_metrics.roi),
        money(ownership.return_metrics.npv)
    ));
    lines.push(match ownership.debt_metrics.calculated_dscr {
        Some(dscr) => format!(
            "  - DSCR {:.2}x (target {:.2}x)",
            dscr, ownership.debt_metrics.target_dscr
        ),
        None => format!(
            "  - DSCR n/a: {}",
            ownership
                .debt_metrics
                .dscr_unavailable_reason
                .as_deref()
                .unwrap_or("not modeled")
        ),
    });
    lines.push(format!(
        "  - Recommendation {} (feasibility {}/100)",
        decision.recommendation.label(),
        decision.feasibility_score
    ));

    let view = &report.dealshield.dealshield_view;
    lines.push(format!(
        "\nDealShield ({}, ±{}%)",
        report.dealshield.dealshield_tile_profile,
        report.dealshield.dealshield_scenarios.stress_band_pct
    ));
    lines.push(format!(
        "  - Decision: {} [{}]",
        view.decision_status
            .value
            .map_or("unavailable", |status| status.label()),
        view.decision_reason_code.value.as_deref().unwrap_or("-")
    ));
    match view.first_break_condition.as_ref() {
        Some(condition) => lines.push(format!(
            "  - First break: {} at {:.2} ({} {:.2})",
            condition.scenario_id,
            condition.observed_value,
            condition.operator.symbol(),
            condition.threshold
        )),
        None => lines.push(format!(
            "  - No break: {}",
            view.first_break_condition
                .provenance
                .reason
                .as_deref()
                .unwrap_or("not evaluated")
        )),
    }
    if let Some(flex) = view.flex_before_break_pct.value {
        lines.push(format!("  - Flex before break: {flex:.1}%"));
    }
    for disclosure in &view.dealshield_disclosures {
        lines.push(format!("  * {disclosure}"));
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use costline::estimation::EngineSettings;

    fn report(include_financing: bool) -> EstimateReport {
        let service = EstimationService::new(
            Arc::new(PricingRegistry::standard().expect("registry")),
            EngineSettings::default(),
            Arc::new(InMemoryEstimateRepository::default()),
        );
        let mut request = ProjectRequest::new(
            BuildingType::Healthcare,
            "surgical_center",
            65_000.0,
            "Nashville, TN",
        );
        request.include_financing = Some(include_financing);
        service
            .run(&request, &DealShieldControls::default())
            .expect("report")
    }

    #[test]
    fn money_groups_thousands() {
        assert_eq!(money(1_234_567.4), "$1,234,567");
        assert_eq!(money(-950.0), "-$950");
        assert_eq!(money(0.2), "$0");
    }

    #[test]
    fn mix_pairs_parse() {
        let mix = parse_mix("office=0.7, retail=0.3").expect("mix");
        assert_eq!(mix.get(&SpaceType::Office), Some(&0.7));
        assert_eq!(mix.get(&SpaceType::Retail), Some(&0.3));
        assert!(parse_mix("office").is_err());
        assert!(parse_mix("atrium=0.2").is_err());
    }

    #[test]
    fn summary_includes_decision_and_totals() {
        let lines = render_summary(&report(true));
        assert!(lines.iter().any(|line| line.contains("Total project cost")));
        assert!(lines
            .iter()
            .any(|line| line.starts_with("\nDealShield (healthcare_surgical_center_v1")));
        assert!(lines.iter().any(|line| line.contains("DSCR") && line.contains("target")));
    }

    #[test]
    fn summary_reports_break_outcome() {
        let report = report(true);
        let lines = render_summary(&report);
        let expected = match report.dealshield.dealshield_view.first_break_condition.as_ref() {
            Some(condition) => format!("First break: {}", condition.scenario_id),
            None => "No break:".to_string(),
        };
        assert!(lines.iter().any(|line| line.contains(&expected)));
    }

    #[test]
    fn summary_explains_missing_financing() {
        let lines = render_summary(&report(false));
        assert!(lines.iter().any(|line| line.contains("DSCR n/a")));
        assert!(lines
            .iter()
            .any(|line| line.starts_with("  - No break:") && !line.ends_with("not evaluated")));
    }
}
