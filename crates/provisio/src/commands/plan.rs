use super::build_context;
use colored::Colorize;
use provisio_core::CapabilityPlan;
use provisio_engine::Engine;

pub fn print_plan(plan: &CapabilityPlan) {
    println!("{}", "Deployment plan".blue().bold());
    println!("{}", plan.description);
    println!();
    println!("{}", format!("Resources ({}):", plan.resources.len()).bold());
    for resource in &plan.resources {
        println!("  • {} ({})", resource.name.cyan(), resource.kind);
    }
    println!();
    println!(
        "Estimated cost: {}",
        format!("${:.2}/month", plan.estimated_cost).yellow()
    );
    println!(
        "Estimated duration: ~{:.0} minutes",
        plan.estimated_duration_minutes
    );
}

pub async fn handle(
    engine: &Engine,
    name: &str,
    params: &[String],
    request: &str,
) -> anyhow::Result<()> {
    let context = build_context(name, request, params)?;
    let run = engine.start(context).await?;

    print_plan(run.plan());
    if run.needs_approval() {
        println!();
        println!(
            "{}",
            "This plan requires approval; deploy with `provisio deploy --yes`.".yellow()
        );
    }
    Ok(())
}
