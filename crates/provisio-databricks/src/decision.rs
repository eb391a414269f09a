//! Sizing, naming and cost decisions
//!
//! Turns the context parameters (team, environment, workload type, GPU
//! flag) into concrete resource names, a Databricks SKU, a cluster shape
//! and a monthly cost estimate. Pure functions of the input, so planning
//! stays a dry-run.

use provisio_core::CapabilityContext;
use serde::{Deserialize, Serialize};

pub const VALID_ENVIRONMENTS: [&str; 3] = ["dev", "staging", "prod"];

pub const VALID_REGIONS: [&str; 9] = [
    "eastus",
    "eastus2",
    "westus",
    "westus2",
    "westus3",
    "centralus",
    "northcentralus",
    "southcentralus",
    "westcentralus",
];

pub const VALID_WORKLOAD_TYPES: [&str; 3] = ["data_engineering", "ml", "analytics"];

/// Cluster sizing portion of a decision
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterDecision {
    pub min_workers: u32,
    pub max_workers: u32,
    pub driver_instance_type: String,
    pub worker_instance_type: String,
    pub spark_version: String,
    pub autotermination_minutes: u32,
}

/// Full configuration decision for one Databricks deployment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decision {
    pub team: String,
    pub environment: String,
    pub region: String,
    pub resource_group_name: String,
    pub workspace_name: String,
    pub cluster_name: String,
    pub sku: String,
    pub enable_gpu: bool,
    pub workload_type: String,
    pub cluster: ClusterDecision,
    pub estimated_monthly_cost: f64,
}

/// Normalize a name fragment for Azure resource naming
fn sanitize(value: &str) -> String {
    value
        .trim()
        .to_lowercase()
        .replace([' ', '_'], "-")
}

fn sku_for(environment: &str) -> &'static str {
    // Production requires premium for SLA and RBAC; everything else stays
    // on standard for cost
    if environment == "prod" {
        "premium"
    } else {
        "standard"
    }
}

fn workload_size(workload_type: &str) -> &'static str {
    match workload_type {
        "ml" => "large",
        "analytics" => "small",
        _ => "medium",
    }
}

fn instance_types(enable_gpu: bool, size: &str) -> (&'static str, &'static str) {
    // (driver, worker); GPU drivers stay on CPU instances
    if enable_gpu {
        match size {
            "small" => ("Standard_DS3_v2", "Standard_NC6s_v3"),
            "large" => ("Standard_DS5_v2", "Standard_NC24s_v3"),
            _ => ("Standard_DS4_v2", "Standard_NC12s_v3"),
        }
    } else {
        match size {
            "small" => ("Standard_D4s_v5", "Standard_D4s_v5"),
            "large" => ("Standard_DS5_v2", "Standard_DS5_v2"),
            _ => ("Standard_DS4_v2", "Standard_DS4_v2"),
        }
    }
}

fn worker_range(environment: &str) -> (u32, u32) {
    match environment {
        "prod" => (1, 4),
        "staging" => (1, 3),
        _ => (1, 2),
    }
}

/// Estimate the monthly cost in USD.
///
/// Workspace base price by SKU plus compute: hourly rate times driver plus
/// average workers, assuming 12 hours a day, 22 days a month. Rough by
/// design; accuracy is out of scope.
pub fn estimate_monthly_cost(sku: &str, enable_gpu: bool, min_workers: u32, max_workers: u32) -> f64 {
    let mut cost: f64 = if sku == "premium" { 150.0 } else { 75.0 };

    if max_workers > 0 {
        let rate_per_hour = if enable_gpu { 1.14 } else { 0.19 };
        let avg_workers = f64::from(min_workers + max_workers) / 2.0;
        let hours_per_month = 12.0 * 22.0;
        cost += rate_per_hour * (1.0 + avg_workers) * hours_per_month;
    }

    (cost * 100.0).round() / 100.0
}

impl Decision {
    /// Derive the full decision from a run context.
    ///
    /// Assumes the context already passed validation; missing or malformed
    /// values fall back to the documented defaults.
    pub fn from_context(context: &CapabilityContext) -> Self {
        let team = sanitize(context.parameter_str("team").unwrap_or_default());
        let environment = context
            .parameter_str("environment")
            .unwrap_or("dev")
            .to_string();
        let region = context
            .parameter_str("region")
            .unwrap_or("eastus")
            .to_string();
        let enable_gpu = context.parameter::<bool>("enable_gpu").unwrap_or(false);
        let workload_type = context
            .parameter_str("workload_type")
            .unwrap_or("data_engineering")
            .to_string();

        let workspace_name = context
            .parameter_str("workspace_name")
            .map(sanitize)
            .unwrap_or_else(|| format!("{team}-{environment}"));
        let resource_group_name = format!("rg-{team}-{environment}");
        let cluster_name = format!("{workspace_name}-cluster");

        let sku = sku_for(&environment).to_string();
        let (min_workers, max_workers) = worker_range(&environment);
        let size = workload_size(&workload_type);
        let (driver, worker) = instance_types(enable_gpu, size);
        let spark_version = if enable_gpu {
            "13.3.x-gpu-ml-scala2.12"
        } else {
            "13.3.x-scala2.12"
        };

        let estimated_monthly_cost =
            estimate_monthly_cost(&sku, enable_gpu, min_workers, max_workers);

        Self {
            team,
            environment,
            region,
            resource_group_name,
            workspace_name,
            cluster_name,
            sku,
            enable_gpu,
            workload_type,
            cluster: ClusterDecision {
                min_workers,
                max_workers,
                driver_instance_type: driver.to_string(),
                worker_instance_type: worker.to_string(),
                spark_version: spark_version.to_string(),
                autotermination_minutes: 10,
            },
            estimated_monthly_cost,
        }
    }
}
