use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use growthflow::config::{Config, ConfigOverrides};
use growthflow::dashboard::DashboardTab;
use growthflow::domains::intake::{DigitalSetup, IntakeRecord, PrimaryGoal};
use growthflow::domains::strategy::response_schema;
use growthflow::error::{GrowthFlowError, Result};
use growthflow::logging::init_tracing;
use growthflow::prompts::GENERATION_FAILED_NOTICE;
use growthflow::providers::openai::OpenAiProvider;
use growthflow::render;
use growthflow::services::strategy::StrategyClient;
use growthflow::session::{ChatOutcome, SessionController};

#[derive(Parser, Debug)]
#[command(name = "growthflow")]
#[command(version = env!("GROWTHFLOW_BUILD_VERSION"))]
#[command(about = "AI marketing audit wizard with a live growth advisor")]
struct Cli {
    /// JSON config file; defaults to the platform config directory.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[arg(long, env = "GROWTHFLOW_API_KEY", global = true, hide_env_values = true)]
    api_key: Option<String>,

    #[arg(long, env = "GROWTHFLOW_MODEL", global = true)]
    model: Option<String>,

    #[arg(long, env = "GROWTHFLOW_BASE_URL", global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive intake form, audit dashboard and advisor chat.
    Wizard,
    /// One-shot strategy generation from an intake JSON file.
    Generate {
        #[arg(long)]
        intake: PathBuf,
        /// Print the strategy as JSON instead of the rendered dashboard.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Print the response schema sent to the model.
    Schema,
}

type InputLines = Lines<BufReader<Stdin>>;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("growthflow");
    let cli = Cli::parse();

    if let Some(Command::Schema) = cli.command {
        let schema = serde_json::to_string_pretty(&response_schema())
            .map_err(|e| GrowthFlowError::Serialization(e.to_string()))?;
        println!("{schema}");
        return Ok(());
    }

    let config = Config::load(cli.config.as_deref())?
        .apply_overrides(ConfigOverrides {
            api_key: cli.api_key,
            model: cli.model,
            base_url: cli.base_url,
        })
        .resolve_env();
    let provider = OpenAiProvider::from_config(&config)?;
    tracing::info!(model = provider.model(), "using model");
    let controller = SessionController::new(
        StrategyClient::new(Arc::new(provider)),
        config.status_interval(),
    );

    match cli.command {
        Some(Command::Generate { intake, json }) => run_generate(&controller, &intake, json).await,
        _ => run_wizard(&controller).await,
    }
}

async fn run_generate(controller: &SessionController, path: &Path, json: bool) -> Result<()> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| GrowthFlowError::Config(format!("cannot read {}: {e}", path.display())))?;
    let intake: IntakeRecord = serde_json::from_str(&raw)
        .map_err(|e| GrowthFlowError::Validation(format!("invalid intake file: {e}")))?;

    controller.begin().await?;
    let strategy = controller.submit_intake(intake.clone()).await?;
    if json {
        println!("{}", strategy.to_json()?);
    } else {
        println!("{}", render::render_dashboard(&intake, &strategy));
    }
    Ok(())
}

async fn read_line(lines: &mut InputLines) -> Result<Option<String>> {
    lines
        .next_line()
        .await
        .map_err(|e| GrowthFlowError::Runtime(format!("stdin read failed: {e}")))
}

async fn ask(lines: &mut InputLines, label: &str, previous: &str) -> Result<String> {
    if previous.is_empty() {
        println!("{label}:");
    } else {
        println!("{label} [{previous}]:");
    }
    let answer = read_line(lines)
        .await?
        .ok_or_else(|| GrowthFlowError::Runtime("input closed".to_string()))?;
    let answer = answer.trim();
    Ok(if answer.is_empty() {
        previous.to_string()
    } else {
        answer.to_string()
    })
}

async fn ask_choice<T>(lines: &mut InputLines, label: &str, options: &[T], previous: T) -> Result<T>
where
    T: Copy + std::fmt::Display + std::str::FromStr<Err = GrowthFlowError>,
{
    for (index, option) in options.iter().enumerate() {
        println!("  {}. {option}", index + 1);
    }
    loop {
        let answer = ask(lines, label, &previous.to_string()).await?;
        if let Some(option) = answer
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| options.get(i))
        {
            return Ok(*option);
        }
        match answer.parse::<T>() {
            Ok(value) => return Ok(value),
            Err(err) => println!("{err}"),
        }
    }
}

async fn collect_intake(lines: &mut InputLines, previous: IntakeRecord) -> Result<IntakeRecord> {
    println!("\nIntelligence Gathering (press Enter to keep the value in brackets)\n");
    let business_name = ask(lines, "Company identity", &previous.business_name).await?;
    let main_goal = ask_choice(lines, "Current goal", &PrimaryGoal::ALL, previous.main_goal).await?;
    let current_setup =
        ask_choice(lines, "Digital setup", &DigitalSetup::ALL, previous.current_setup).await?;
    let target_country = ask(lines, "Target region", &previous.target_country).await?;
    let url = if current_setup == DigitalSetup::NoWebsite {
        None
    } else {
        let previous_url = previous.url.clone().unwrap_or_default();
        Some(ask(lines, "Website URL", &previous_url).await?).filter(|url| !url.is_empty())
    };
    let product_type = ask(lines, "Product/service value proposition", &previous.product_type).await?;
    let target_audience = ask(lines, "Target audience", &previous.target_audience).await?;
    let budget = ask(lines, "Monthly budget", &previous.budget).await?;
    let current_problem = ask(lines, "Current bottleneck", &previous.current_problem).await?;

    Ok(IntakeRecord {
        business_name,
        product_type,
        target_audience,
        target_country,
        current_problem,
        budget,
        current_setup,
        url,
        main_goal,
    })
}

async fn run_wizard(controller: &SessionController) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("GrowthFlow AI: dominate your digital niche.");
    println!("Professional SEO audits, social storefront architectures and data-driven growth targets.");
    println!("\nPress Enter to access your AI consultant.");
    if read_line(&mut lines).await?.is_none() {
        return Ok(());
    }
    controller.begin().await?;

    let mut draft = IntakeRecord::default();
    let strategy = loop {
        draft = collect_intake(&mut lines, draft).await?;

        let mut status_rx = controller.subscribe_status();
        let printer = tokio::spawn(async move {
            loop {
                println!("  ... {}", status_rx.borrow_and_update().as_str());
                if status_rx.changed().await.is_err() {
                    break;
                }
            }
        });
        let result = controller.submit_intake(draft.clone()).await;
        printer.abort();

        match result {
            Ok(strategy) => break strategy,
            Err(GrowthFlowError::Validation(message)) => println!("\n{message}"),
            Err(err) if err.is_generation_failure() => {
                println!("\n{GENERATION_FAILED_NOTICE}");
                if let Some(previous) = controller.intake().await {
                    draft = previous;
                }
            }
            Err(err) => return Err(err),
        }
    };

    println!("{}", render::render_sidebar(&draft, &strategy));
    show_tab(controller, DashboardTab::Audit).await?;
    println!(
        "\nCommands: :audit :fixes :ads :roadmap :metrics :chat :done <task> :quit. Anything else is sent to your advisor."
    );
    if let Some(greeting) = controller.history().await.last() {
        println!("\n{}", render::render_message(greeting));
    }

    while let Some(line) = read_line(&mut lines).await? {
        let line = line.trim();
        if line == ":quit" || line == ":q" {
            break;
        }
        if line == ":metrics" {
            println!("{}", render::render_sidebar(&draft, &strategy));
            continue;
        }
        if let Some(number) = line.strip_prefix(":done ") {
            let Some(index) = number
                .trim()
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
            else {
                println!("usage: :done <task number>");
                continue;
            };
            match controller
                .with_dashboard(|view, strategy| view.toggle_task(strategy, index))
                .await
            {
                Ok(true) => println!("Task {} marked complete.", index + 1),
                Ok(false) => println!("Task {} reopened.", index + 1),
                Err(err) => println!("{err}"),
            }
            continue;
        }
        if let Some(name) = line.strip_prefix(':') {
            match name.parse::<DashboardTab>() {
                Ok(tab) => show_tab(controller, tab).await?,
                Err(err) => println!("{err}"),
            }
            continue;
        }

        match controller.send_chat_message(line).await? {
            ChatOutcome::Ignored => {}
            ChatOutcome::Replied(reply) => println!("\nAdvisor: {reply}\n"),
        }
    }
    Ok(())
}

async fn show_tab(controller: &SessionController, tab: DashboardTab) -> Result<()> {
    let history = controller.history().await;
    let text = controller
        .with_dashboard(|view, strategy| {
            view.select(tab);
            Ok(render::render_tab(tab, strategy, view, &history))
        })
        .await?;
    println!("{text}");
    Ok(())
}
