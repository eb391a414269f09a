use super::{build_context, plan::print_plan};
use colored::Colorize;
use provisio_core::CancelToken;
use provisio_engine::{Engine, RollbackOutcome, RunOutcome};

fn print_outcome(outcome: &RunOutcome) {
    println!();
    if outcome.is_success() {
        println!("{}", outcome.result.message.green().bold());
        if !outcome.result.outputs.is_empty() {
            println!("{}", "Outputs:".bold());
            let mut keys: Vec<&String> = outcome.result.outputs.keys().collect();
            keys.sort();
            for key in keys {
                println!("  {} = {}", key.cyan(), outcome.result.outputs[key]);
            }
        }
        println!(
            "{} resource(s) created in {:.1}s",
            outcome.result.resources_created.len(),
            outcome.result.duration_seconds
        );
    } else {
        println!("{}", outcome.result.message.red().bold());
        if let Some(error) = &outcome.result.error {
            println!("Error: {error}");
        }
        println!(
            "{} of the planned resource(s) were created before the failure",
            outcome.result.resources_created.len()
        );
        match outcome.rollback {
            RollbackOutcome::NotAttempted => {}
            ref rollback => println!("Rollback: {rollback}"),
        }
    }
}

pub async fn handle(
    engine: &Engine,
    name: &str,
    params: &[String],
    request: &str,
    yes: bool,
) -> anyhow::Result<()> {
    println!("{}", "Starting deployment...".blue().bold());

    let context = build_context(name, request, params)?;
    let mut run = engine.start(context).await?;

    print_plan(run.plan());

    if run.needs_approval() {
        if !yes {
            println!();
            println!(
                "{}",
                "Warning: this plan requires approval before execution.".yellow()
            );
            println!("Re-run with --yes to approve and deploy");
            return Ok(());
        }
        run.approve()?;
    }

    println!();
    println!("{}", format!("Executing {name}...").blue());
    let outcome = run.execute(&CancelToken::new()).await?;
    print_outcome(&outcome);

    if !outcome.is_success() {
        anyhow::bail!("deployment failed");
    }
    Ok(())
}
