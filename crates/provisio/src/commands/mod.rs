pub mod deploy;
pub mod list;
pub mod plan;
pub mod show;

use provisio_core::CapabilityContext;

/// Build a run context from `key=value` CLI parameters.
///
/// Values are parsed as JSON where possible (`true`, `3`, `[1,2]`), and
/// fall back to plain strings otherwise.
pub fn build_context(
    capability: &str,
    request: &str,
    params: &[String],
) -> anyhow::Result<CapabilityContext> {
    let mut context = CapabilityContext::new(capability, request)
        .with_metadata("caller", serde_json::json!("provisio-cli"));

    for param in params {
        let (key, raw) = param
            .split_once('=')
            .ok_or_else(|| anyhow::anyhow!("invalid parameter '{param}', expected key=value"))?;
        let value = serde_json::from_str(raw)
            .unwrap_or_else(|_| serde_json::Value::String(raw.to_string()));
        context = context.with_parameter(key, value);
    }

    Ok(context)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_context_parses_json_values() {
        let context = build_context(
            "provision_databricks",
            "req",
            &[
                "team=ml".to_string(),
                "enable_gpu=true".to_string(),
                "cost_limit=500.0".to_string(),
            ],
        )
        .unwrap();

        assert_eq!(context.parameter_str("team"), Some("ml"));
        assert_eq!(context.parameter::<bool>("enable_gpu"), Some(true));
        assert_eq!(context.parameter::<f64>("cost_limit"), Some(500.0));
    }

    #[test]
    fn test_build_context_rejects_malformed_pairs() {
        assert!(build_context("cap", "req", &["no-equals-sign".to_string()]).is_err());
    }
}
