use crate::infra::{load_roster, InMemoryCandidateRepository};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use var_insight::error::AppError;
use var_insight::workflows::acquisition::{
    AcquisitionService, ExplanationPayload, RankingFilter, RankingRequest, RankingSnapshot,
    ScenarioRequest, ScenarioResult, ScoreTier, VarId,
};

const DEMO_TARGETS: [u64; 2] = [1, 2];

#[derive(Args, Debug, Default)]
pub(crate) struct RankArgs {
    /// CSV roster to rank. Defaults to the bundled sample roster.
    #[arg(long)]
    pub(crate) roster: Option<PathBuf>,
    /// Only print the top N candidates.
    #[arg(long)]
    pub(crate) limit: Option<usize>,
}

#[derive(Args, Debug)]
pub(crate) struct ExplainArgs {
    /// CSV roster to rank. Defaults to the bundled sample roster.
    #[arg(long)]
    pub(crate) roster: Option<PathBuf>,
    /// Candidate id to explain
    #[arg(long)]
    pub(crate) id: u64,
}

#[derive(Args, Debug)]
pub(crate) struct SimulateArgs {
    /// CSV roster holding the targets. Defaults to the bundled sample roster.
    #[arg(long)]
    pub(crate) roster: Option<PathBuf>,
    /// Comma-separated candidate ids to acquire
    #[arg(long, value_delimiter = ',', required = true)]
    pub(crate) targets: Vec<u64>,
    /// EBITDA multiple applied to the combined targets (4x to 12x)
    #[arg(long, default_value_t = 6.0)]
    pub(crate) multiple: f64,
}

type DemoService = AcquisitionService<InMemoryCandidateRepository>;

fn build_service(roster: Option<PathBuf>) -> Result<DemoService, AppError> {
    let candidates = load_roster(roster.as_deref())?;
    let repository = InMemoryCandidateRepository::with_candidates(candidates);
    Ok(AcquisitionService::new(Arc::new(repository)))
}

pub(crate) fn run_rank(args: RankArgs) -> Result<(), AppError> {
    let RankArgs { roster, limit } = args;
    let service = build_service(roster)?;

    let request = RankingRequest {
        criteria: None,
        filter: limit.map(|limit| RankingFilter {
            limit: Some(limit),
            ..RankingFilter::default()
        }),
    };
    let snapshot = service.compute_rankings(request)?;
    render_rankings(&snapshot);
    Ok(())
}

pub(crate) async fn run_explain(args: ExplainArgs) -> Result<(), AppError> {
    let ExplainArgs { roster, id } = args;
    let service = build_service(roster)?;

    let payload = service.explain(VarId(id)).await?;
    render_explanation(&payload);
    Ok(())
}

pub(crate) fn run_simulate(args: SimulateArgs) -> Result<(), AppError> {
    let SimulateArgs {
        roster,
        targets,
        multiple,
    } = args;
    let service = build_service(roster)?;

    let request = ScenarioRequest::new(targets.into_iter().map(VarId).collect(), multiple);
    let result = service.simulate(request)?;
    render_scenario(&result);
    Ok(())
}

pub(crate) async fn run_demo() -> Result<(), AppError> {
    let service = build_service(None)?;

    println!("VAR acquisition demo (bundled sample roster)");
    let snapshot = service.compute_rankings(RankingRequest::default())?;
    render_rankings(&snapshot);

    if let Some(leader) = snapshot.rankings.first() {
        println!();
        let payload = service.explain(leader.id()).await?;
        render_explanation(&payload);
    }

    println!();
    let request = ScenarioRequest::new(DEMO_TARGETS.into_iter().map(VarId).collect(), 6.0);
    match service.simulate(request) {
        Ok(result) => render_scenario(&result),
        Err(err) => println!("Scenario unavailable: {err}"),
    }

    Ok(())
}

fn render_rankings(snapshot: &RankingSnapshot) {
    println!(
        "Ranked {} of {} candidates ({})",
        snapshot.rankings.len(),
        snapshot.total_candidates,
        snapshot.computed_at.format("%Y-%m-%d %H:%M UTC")
    );
    for scored in &snapshot.rankings {
        let imputed = if scored.imputed.is_empty() {
            String::new()
        } else {
            format!(" [{} imputed]", scored.imputed.len())
        };
        println!(
            "  #{:<2} {:<28} {:>4.1}/10  {:<20} id {}{}",
            scored.rank,
            scored.var.name,
            scored.composite_score,
            scored.var.location_label(),
            scored.id(),
            imputed
        );
    }
}

fn render_explanation(payload: &ExplanationPayload) {
    println!("{} (id {})", payload.var_name, payload.var_id);
    println!("  {}", payload.summary);
    println!("  Breakdown:");
    for entry in &payload.breakdown {
        let marker = match entry.tier {
            ScoreTier::Strong => "+",
            ScoreTier::Weak => "-",
            ScoreTier::Moderate => " ",
        };
        println!(
            "   {marker} {:<18} {:>4.1} x {:.2} = {:.2}  {}",
            entry.label, entry.score, entry.weight, entry.contribution, entry.reasoning
        );
    }
    if !payload.strengths.is_empty() {
        println!("  Strengths: {}", payload.strengths.join(", "));
    }
    if !payload.concerns.is_empty() {
        println!("  Concerns: {}", payload.concerns.join(", "));
    }
}

fn render_scenario(result: &ScenarioResult) {
    println!(
        "Scenario for {} at {:.1}x EBITDA",
        result.acquirer, result.assumptions.ebitda_multiple
    );
    for contribution in &result.contributions {
        println!(
            "  - {}: revenue ${:.1}M | EBITDA ${:.2}M | valuation ${:.2}M",
            contribution.name, contribution.revenue, contribution.ebitda, contribution.valuation
        );
    }
    println!(
        "  Combined revenue ${:.1}M | combined EBITDA ${:.2}M",
        result.combined_revenue, result.combined_ebitda
    );
    println!(
        "  Valuation ${:.2}M (range ${:.2}M to ${:.2}M)",
        result.estimated_valuation, result.valuation_range.low, result.valuation_range.high
    );
    println!(
        "  Cross-sell ${:.2}M | margin gain ${:.2}M | integration cost ${:.2}M",
        result.cross_sell_revenue, result.margin_gain, result.integration_cost
    );
    println!("  Projected ROI {:.1}%", result.projected_roi);
    if !result.capability_gains.is_empty() {
        println!("  New capabilities: {}", result.capability_gains.join(", "));
    }
    if !result.vendor_overlaps.is_empty() {
        println!("  Shared vendors: {}", result.vendor_overlaps.join(", "));
    }
    if !result.missing_financials.is_empty() {
        let ids: Vec<String> = result
            .missing_financials
            .iter()
            .map(ToString::to_string)
            .collect();
        println!("  Missing financials for ids: {}", ids.join(", "));
    }
}
