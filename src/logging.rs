use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV_VAR: &str = "GROWTHFLOW_LOG";

fn default_filter(component: &str) -> String {
    if component.is_empty() || component == "growthflow" {
        "info,growthflow=debug".to_string()
    } else {
        format!("info,growthflow=debug,{component}=debug")
    }
}

pub fn init_tracing(component: &str) {
    let filter = std::env::var(LOG_ENV_VAR)
        .ok()
        .and_then(|value| EnvFilter::try_new(value).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new(default_filter(component)));

    // Logs go to stderr so the wizard's stdout stays readable.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::CLOSE)
        .compact()
        .try_init();
}
