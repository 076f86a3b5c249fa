use clap::{Parser, Subcommand};
use rag_chatbot_core::{
    ingest_corpus, ChatPipeline, ChunkingOptions, Completer, Embedder, GenerationOptions,
    HttpCompleter, HttpEmbedder, IndexStore, NgramEmbedder, QueryError,
    DEFAULT_EMBEDDING_DIMENSIONS,
};
use std::collections::BTreeSet;
use std::io::{BufRead, Write};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "rag-chatbot", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Index file written by ingest and read by chat
    #[arg(long, env = "RAG_INDEX_PATH", default_value = "data/index.json")]
    index: String,

    /// Embedding service URL
    #[arg(
        long,
        env = "EMBEDDINGS_URL",
        default_value = "http://localhost:8080/v1/embeddings"
    )]
    embeddings_url: String,

    /// Embedding model identifier
    #[arg(long, env = "EMBEDDINGS_MODEL", default_value = "all-MiniLM-L6-v2")]
    embeddings_model: String,

    /// Bearer token for the embedding service
    #[arg(long, env = "EMBEDDINGS_API_KEY")]
    embeddings_api_key: Option<String>,

    /// Embedding output dimensionality
    #[arg(long, env = "EMBEDDING_DIMENSIONS", default_value_t = DEFAULT_EMBEDDING_DIMENSIONS)]
    embedding_dimensions: usize,

    /// Use the local hashed n-gram embedder instead of the hosted service
    #[arg(long, default_value_t = false)]
    offline: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Ingest a folder of text documents into the index.
    Ingest {
        /// Folder containing .txt documents, scanned recursively.
        #[arg(long, default_value = "docs")]
        docs: String,
        /// Maximum chunk length in characters.
        #[arg(long, env = "CHUNK_SIZE", default_value = "400")]
        chunk_size: usize,
        /// Overlap between consecutive chunks in characters.
        #[arg(long, env = "CHUNK_OVERLAP", default_value = "50")]
        chunk_overlap: usize,
    },
    /// Chat against the ingested index in an interactive loop.
    Chat {
        /// Number of chunks to retrieve per question.
        #[arg(long, env = "RAG_TOP_K", default_value = "5")]
        top_k: usize,
        /// Generation service URL
        #[arg(
            long,
            env = "LLM_URL",
            default_value = "http://localhost:8080/v1/messages"
        )]
        llm_url: String,
        /// Generation model identifier
        #[arg(long, env = "LLM_MODEL", default_value = "claude-3-5-sonnet")]
        llm_model: String,
        /// Bearer token for the generation service
        #[arg(long, env = "LLM_API_KEY")]
        llm_api_key: Option<String>,
        /// Completion token limit
        #[arg(long, env = "LLM_MAX_TOKENS", default_value = "512")]
        max_tokens: u32,
        /// Sampling temperature
        #[arg(long, env = "LLM_TEMPERATURE", default_value = "0.2")]
        temperature: f32,
        /// Nucleus sampling cutoff
        #[arg(long, env = "LLM_TOP_P", default_value = "0.9")]
        top_p: f32,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();

    let cli = Cli::parse();

    let embedder: Box<dyn Embedder + Send + Sync> = if cli.offline {
        Box::new(NgramEmbedder {
            dimensions: cli.embedding_dimensions,
        })
    } else {
        Box::new(HttpEmbedder::new(
            &cli.embeddings_url,
            &cli.embeddings_model,
            cli.embeddings_api_key.clone(),
            cli.embedding_dimensions,
        ))
    };

    let store = IndexStore::new(&cli.index);

    match cli.command {
        Command::Ingest {
            docs,
            chunk_size,
            chunk_overlap,
        } => {
            let options = ChunkingOptions {
                chunk_size,
                chunk_overlap,
            };

            let report = ingest_corpus(std::path::Path::new(&docs), options, &embedder, &store)
                .await
                .map_err(|error| anyhow::anyhow!(error.to_string()))?;

            println!(
                "{} chunks from {} documents ingested into {} ({} dimensions)",
                report.chunks, report.documents, cli.index, report.dimensions
            );
        }
        Command::Chat {
            top_k,
            llm_url,
            llm_model,
            llm_api_key,
            max_tokens,
            temperature,
            top_p,
        } => {
            let records = store
                .load()
                .map_err(|error| anyhow::anyhow!(error.to_string()))?;

            let completer = HttpCompleter::new(
                &llm_url,
                llm_api_key,
                GenerationOptions {
                    model: llm_model,
                    max_tokens,
                    temperature,
                    top_p,
                },
            );

            let pipeline = ChatPipeline::new(records, embedder, completer, top_k);
            info!(records = pipeline.record_count(), "chat ready");

            run_chat_loop(&pipeline).await?;
        }
    }

    Ok(())
}

async fn run_chat_loop<E, C>(pipeline: &ChatPipeline<E, C>) -> anyhow::Result<()>
where
    E: Embedder + Send + Sync,
    C: Completer + Send + Sync,
{
    println!("Type your question, or 'exit' to quit.");

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    let mut line = String::new();

    loop {
        print!("You: ");
        stdout.flush()?;

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            println!();
            break;
        }

        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if question.eq_ignore_ascii_case("exit") || question.eq_ignore_ascii_case("quit") {
            println!("Goodbye!");
            break;
        }

        match pipeline.ask(question).await {
            Ok(answer) => {
                let sources: BTreeSet<&str> = answer
                    .sources
                    .iter()
                    .map(|hit| hit.chunk.source.as_str())
                    .collect();

                if sources.is_empty() {
                    warn!("answered without context");
                } else {
                    info!(sources = %sources.iter().copied().collect::<Vec<_>>().join(", "), "sources used");
                }

                println!("\nBot: {}", answer.text);
                println!("{}", "-".repeat(80));
            }
            Err(QueryError::Generation(error)) => {
                warn!(%error, "generation failed");
                println!("Bot: Sorry, something went wrong while generating the answer.");
            }
            Err(error) => return Err(anyhow::anyhow!(error.to_string())),
        }
    }

    Ok(())
}
