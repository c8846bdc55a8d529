//! CLI entrypoint for legal-workforce
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use workforce_application::{
    AnalyzeRequirementsUseCase, Arbiter, ArbitrateUseCase, CapabilityPool, ExecutePlanUseCase,
    ExecutionLogger, ExperienceStore, LlmArbiter, LlmConcurrencyLimiter, LlmGateway, LlmPlanner,
    LlmRequirementAnalyzer, LlmSpecialist, NoExecutionLogger, PlanTaskUseCase, Planner,
    RecordEpisodeUseCase, RequirementAnalyzer, RunWorkforceUseCase, WorkforceOutcome,
    WorkforceRequest,
};
use workforce_domain::Feedback;
use workforce_infrastructure::{
    ConfigLoader, FileConfig, FileOutputFormat, InMemoryExperienceStore, JsonlExecutionLogger,
    OpenAiGateway,
};
use workforce_presentation::{Cli, ConsoleFormatter, OutputFormat, ProgressReporter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_deref());
        return Ok(());
    }

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())
            .map_err(|e| anyhow::anyhow!("failed to load configuration: {}", e))?
    };
    config.validate().context("invalid configuration")?;

    let log_file = cli.log_file.as_ref().or(config.logging.file.as_ref());
    let _guard = init_tracing(cli.verbose, config.logging.level.as_deref(), log_file)?;

    info!("Starting legal-workforce");

    let Some(task) = cli.task.clone() else {
        bail!("A task description is required. Use --help for usage.");
    };

    if !config.output.color {
        colored::control::set_override(false);
    }

    let event_log = cli.event_log.as_ref().or(config.logging.event_log.as_ref());
    let logger: Arc<dyn ExecutionLogger> = match event_log.and_then(JsonlExecutionLogger::new) {
        Some(logger) => Arc::new(logger),
        None => Arc::new(NoExecutionLogger),
    };

    let use_case = build_workforce(&config, logger)?;

    let mut request = WorkforceRequest::new(task)
        .with_attachments(cli.attachments)
        .with_metadata("source", "cli");
    if cli.skip_check || config.requirements.skip_check {
        request = request.skip_requirement_check();
    }
    if let Some(rating) = cli.rating {
        request = request.with_feedback(Feedback::new(rating, cli.comment.clone())?);
    }

    let cancel = CancellationToken::new();
    request = request.with_cancellation(cancel.clone());
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted; cancelling outstanding tasks");
            cancel.cancel();
        }
    });

    let show_progress = !cli.quiet && config.output.show_progress;
    let outcome = if show_progress {
        let progress = ProgressReporter::new();
        use_case.submit_with_progress(request, &progress).await?
    } else {
        use_case.submit(request).await?
    };

    let format = cli.output.unwrap_or(match config.output.format {
        Some(FileOutputFormat::Answer) => OutputFormat::Answer,
        Some(FileOutputFormat::Json) => OutputFormat::Json,
        Some(FileOutputFormat::Full) | None => OutputFormat::Full,
    });

    let output = match format {
        OutputFormat::Full => ConsoleFormatter::format(&outcome),
        OutputFormat::Answer => ConsoleFormatter::format_answer(&outcome),
        OutputFormat::Json => ConsoleFormatter::format_json(&outcome),
    };
    println!("{}", output);

    if let WorkforceOutcome::Completed(report) = &outcome
        && let Some(id) = &report.episode_id
    {
        info!("Recorded episode {}", id);
    }

    Ok(())
}

fn init_tracing(
    verbose: u8,
    configured_level: Option<&str>,
    log_file: Option<&impl AsRef<Path>>,
) -> Result<Option<WorkerGuard>> {
    // Initialize logging based on verbosity level
    let filter = match verbose {
        0 => EnvFilter::new(configured_level.unwrap_or("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    let stderr_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    let Some(path) = log_file else {
        tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer)
            .init();
        return Ok(None);
    };

    let path = path.as_ref();
    let directory = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .with_context(|| format!("log file path has no file name: {}", path.display()))?;

    let appender = tracing_appender::rolling::never(directory, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(writer),
        )
        .init();
    Ok(Some(guard))
}

fn build_workforce(
    config: &FileConfig,
    logger: Arc<dyn ExecutionLogger>,
) -> Result<RunWorkforceUseCase> {
    let scheduler = config.scheduler.to_params();
    let llm = &config.llm;

    // === Dependency Injection ===
    let api_key = llm.resolve_api_key().unwrap_or_else(|| {
        warn!(
            "No API key found in ${} or llm.api_key; sending unauthenticated requests",
            llm.api_key_env
        );
        String::new()
    });
    let gateway: Arc<dyn LlmGateway> = Arc::new(
        OpenAiGateway::new(
            &llm.base_url,
            api_key,
            Duration::from_secs(llm.request_timeout_secs),
            llm.effective_pool_size(scheduler.llm_concurrency),
        )
        .context("failed to build HTTP client")?,
    );

    let defaults = llm.to_llm_config();
    let pool = config.capabilities.iter().fold(
        CapabilityPool::new(config.generalist.clone()),
        |pool, role| {
            pool.register(Arc::new(
                LlmSpecialist::new(&role.name, &role.description, Arc::clone(&gateway))
                    .with_config(role.llm_config(&defaults)),
            ))
        },
    );
    let pool = Arc::new(pool);
    info!("Registered capabilities: {}", pool.names().join(", "));

    // One limiter shared by every use case bounds all in-flight LLM calls
    let limiter = LlmConcurrencyLimiter::new(scheduler.llm_concurrency);
    let role_timeout = scheduler.task_timeout;

    let analyzer = config.requirements.use_llm.then(|| {
        Arc::new(LlmRequirementAnalyzer::new(Arc::clone(&gateway)).with_config(defaults.clone()))
            as Arc<dyn RequirementAnalyzer>
    });
    let gate = AnalyzeRequirementsUseCase::new(
        analyzer,
        limiter.clone(),
        Duration::from_secs(config.requirements.timeout_secs),
    );

    let planner = PlanTaskUseCase::new(
        Some(Arc::new(LlmPlanner::new(Arc::clone(&gateway)).with_config(llm.planner_config()))
            as Arc<dyn Planner>),
        Arc::clone(&pool),
        limiter.clone(),
        role_timeout,
    )
    .with_logger(Arc::clone(&logger));

    let arbiter = ArbitrateUseCase::new(
        Some(Arc::new(LlmArbiter::new(Arc::clone(&gateway)).with_config(llm.arbiter_config()))
            as Arc<dyn Arbiter>),
        limiter.clone(),
        role_timeout,
    )
    .with_logger(Arc::clone(&logger));

    let memory = config.memory.to_params();
    let store = memory.enabled.then(|| {
        Arc::new(InMemoryExperienceStore::new(memory.weighting)) as Arc<dyn ExperienceStore>
    });
    let recorder = RecordEpisodeUseCase::new(store, memory).with_logger(Arc::clone(&logger));

    let executor = ExecutePlanUseCase::new(pool, limiter, scheduler).with_logger(logger);

    Ok(RunWorkforceUseCase::new(
        gate, planner, executor, arbiter, recorder,
    ))
}
