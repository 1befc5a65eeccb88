use bocchi::{
    api,
    bot::discord::{self, DiscordHandler},
    cli::{output::Output, Cli, Commands},
    commands::CommandRouter,
    prompt::PromptComposer,
    tools::{DuckDuckGoSearch, SearchSummarizer},
    utils::{
        config::{resolve_secret, BotConfig},
        logging::init_tracing,
    },
    AppState, BotStats, ChatService, GeminiClient, HistoryStore, LLMClient, MessageChunker,
    Result,
};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();
    let output = if cli.no_color {
        Output::no_color()
    } else {
        Output::new()
    };

    if let Err(e) = run(cli, &output).await {
        output.error(&e.to_string());
        std::process::exit(1);
    }
}

async fn run(cli: Cli, output: &Output) -> Result<()> {
    let config = BotConfig::load(cli.config.as_deref())?;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::CheckConfig => check_config(&config, output),
        Commands::Run => serve(config, cli.log_json, output).await,
    }
}

fn check_config(config: &BotConfig, output: &Output) -> Result<()> {
    output.header("Configuration");
    output.block(&config.to_toml_string()?);

    output.header("Secrets");
    for env_name in [&config.bot.token_env, &config.gemini.api_key_env] {
        if resolve_secret(env_name).is_ok() {
            output.kv(env_name, "set");
        } else {
            output.warning(&format!("{} is not set", env_name));
        }
    }

    output.success("Configuration is valid");
    Ok(())
}

async fn serve(config: BotConfig, log_json: bool, output: &Output) -> Result<()> {
    init_tracing(&config.server.log_level, log_json);
    output.banner(&config.bot.persona.name);

    let token = resolve_secret(&config.bot.token_env)?;
    let api_key = resolve_secret(&config.gemini.api_key_env)?;

    let history = Arc::new(HistoryStore::new(config.history.limits()));
    let stats = Arc::new(BotStats::new());
    let llm: Arc<dyn LLMClient> = Arc::new(GeminiClient::new(&config.gemini, api_key)?);

    let router = CommandRouter::new(
        history.clone(),
        stats.clone(),
        config.bot.persona.clone(),
        config.bot.prefix.clone(),
    );
    let mut service = ChatService::new(
        history.clone(),
        llm.clone(),
        PromptComposer::new(config.bot.persona.clone()),
        router,
        MessageChunker::new(config.chunker.max_length),
    );
    if config.search.enabled {
        service = service.with_summarizer(SearchSummarizer::new(
            Arc::new(DuckDuckGoSearch::new()),
            llm.clone(),
            config.search.max_results,
            config.search.summary_length,
            config.chunker.max_length,
        ));
    }

    info!(
        model = llm.model_name(),
        prefix = %config.bot.prefix,
        search = config.search.enabled,
        "Starting bot"
    );

    let state = AppState {
        history,
        stats: stats.clone(),
    };
    let handler = DiscordHandler::new(Arc::new(service), stats);

    tokio::select! {
        result = api::serve(state, &config.server.host, config.server.port) => result,
        result = discord::run(&token, handler) => result,
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
            Ok(())
        }
    }
}
