use std::sync::Arc;

use anyhow::Context;
use colored::Colorize;
use ldpod_pods::{
    Agent, GeneratedPodManager, IdentifierGenerator, MustacheTemplateEngine, PodManager,
    SubdomainIdentifierGenerator, SuffixIdentifierGenerator, TemplatedResourcesGenerator,
};
use ldpod_store::mapper::content_type_for_name;
use ldpod_store::{
    ConvertingStore, ExtensionBasedMapperFactory, FileResourceStore, GraphToRdfConverter,
    InMemoryResourceStore, PatchingStore, RdfToGraphConverter, RepresentationConverter,
    ResourceStore, SparqlUpdatePatcher,
};
use ldpod_types::vocab::{APPLICATION_N_TRIPLES, APPLICATION_SPARQL_UPDATE, INTERNAL_QUADS, TEXT_TURTLE};
use ldpod_types::{
    ntriples, Patch, Representation, RepresentationMetadata, RepresentationPreferences,
    ResourceError, ResourceIdentifier,
};
use serde_json::json;

use crate::cli::*;
use crate::config::{PodNaming, ServerConfig, StorageConfig};

pub async fn run_command(cli: Cli, config: ServerConfig) -> anyhow::Result<()> {
    let store = build_store(&config);
    let format = cli.format;
    match cli.command {
        Command::CreatePod(args) => cmd_create_pod(&config, store, args, format).await,
        Command::Get(args) => cmd_get(&config, store.as_ref(), args, format).await,
        Command::Put(args) => cmd_put(&config, store.as_ref(), args, format).await,
        Command::Delete(args) => cmd_delete(&config, store.as_ref(), args, format).await,
        Command::Patch(args) => cmd_patch(&config, store.as_ref(), args, format).await,
    }
}

fn converters() -> Vec<Arc<dyn RepresentationConverter>> {
    vec![Arc::new(RdfToGraphConverter), Arc::new(GraphToRdfConverter)]
}

/// Compose the decorator stack for the configured backend.
pub fn build_store(config: &ServerConfig) -> Arc<dyn ResourceStore> {
    match &config.storage {
        StorageConfig::Memory => {
            let memory = Arc::new(InMemoryResourceStore::new(&config.base_url));
            let patching = Arc::new(PatchingStore::new(memory, Arc::new(SparqlUpdatePatcher)));
            Arc::new(ConvertingStore::new(patching, converters()).with_in_type(INTERNAL_QUADS))
        }
        StorageConfig::File { root } => {
            let disk = Arc::new(FileResourceStore::new(&config.base_url, root.clone()));
            let turtle = Arc::new(ConvertingStore::new(disk, converters()).with_in_type(TEXT_TURTLE));
            let patching = Arc::new(PatchingStore::new(turtle, Arc::new(SparqlUpdatePatcher)));
            Arc::new(ConvertingStore::new(patching, converters()))
        }
    }
}

fn pod_manager(config: &ServerConfig, store: Arc<dyn ResourceStore>) -> GeneratedPodManager {
    GeneratedPodManager::new(store, id_generator(config), resources_generator(config))
}

fn id_generator(config: &ServerConfig) -> Arc<dyn IdentifierGenerator> {
    match config.pod_naming {
        PodNaming::Suffix => Arc::new(SuffixIdentifierGenerator::new(&config.base_url)),
        PodNaming::Subdomain => Arc::new(SubdomainIdentifierGenerator::new(&config.base_url)),
    }
}

fn resources_generator(config: &ServerConfig) -> Arc<TemplatedResourcesGenerator> {
    Arc::new(TemplatedResourcesGenerator::new(
        config.template_folder.clone(),
        Arc::new(ExtensionBasedMapperFactory),
        Arc::new(MustacheTemplateEngine),
    ))
}

/// An absolute URL is used as is; anything else is relative to the base URL.
pub fn resolve_target(config: &ServerConfig, path: &str) -> ResourceIdentifier {
    if path.starts_with("http://") || path.starts_with("https://") {
        ResourceIdentifier::new(path)
    } else {
        ResourceIdentifier::new(format!("{}{}", config.base_url, path.trim_start_matches('/')))
    }
}

fn failed(e: ResourceError) -> anyhow::Error {
    anyhow::anyhow!("{e} ({})", e.kind().status_code())
}

fn report(format: OutputFormat, verb: &str, identifier: &ResourceIdentifier) {
    match format {
        OutputFormat::Text => println!("{} {} {}", "✓".green().bold(), verb, identifier.path().bold()),
        OutputFormat::Json => println!("{}", json!({ "status": verb.to_lowercase(), "identifier": identifier.path() })),
    }
}

async fn cmd_create_pod(
    config: &ServerConfig,
    store: Arc<dyn ResourceStore>,
    args: CreatePodArgs,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let pod = id_generator(config).generate(&args.login);
    let web_id = args
        .web_id
        .unwrap_or_else(|| format!("{}profile/card#me", pod.path()));
    let mut agent = Agent::new(&args.login, web_id);
    if let Some(name) = args.name {
        agent = agent.with_name(name);
    }
    if let Some(email) = args.email {
        agent = agent.with_email(email);
    }

    let created = pod_manager(config, store).create_pod(&agent).await.map_err(failed)?;
    match format {
        OutputFormat::Text => {
            println!("{} Created pod {}", "✓".green().bold(), created.path().bold());
            println!("  WebID: {}", agent.web_id.cyan());
        }
        OutputFormat::Json => println!("{}", json!({ "pod": created.path(), "agent": agent })),
    }
    Ok(())
}

async fn cmd_get(
    config: &ServerConfig,
    store: &dyn ResourceStore,
    args: GetArgs,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let identifier = resolve_target(config, &args.path);
    let preferences = args
        .accept
        .as_deref()
        .map(RepresentationPreferences::parse_accept)
        .unwrap_or_default();
    let representation = store
        .get_representation(&identifier, &preferences)
        .await
        .map_err(failed)?;

    let metadata = representation.metadata.clone();
    let (content_type, body) = if representation.binary() {
        let content_type = representation.content_type().map(str::to_string);
        let bytes = representation.into_bytes().await.map_err(failed)?;
        let body = String::from_utf8(bytes.to_vec())
            .unwrap_or_else(|e| format!("<{} bytes of binary data>", e.as_bytes().len()));
        (content_type, body)
    } else {
        let triples = representation.into_triples().await.map_err(failed)?;
        (Some(APPLICATION_N_TRIPLES.to_string()), ntriples::serialize(&triples))
    };

    match format {
        OutputFormat::Text => {
            eprintln!(
                "{} {}",
                identifier.path().bold(),
                content_type.as_deref().unwrap_or("(no content type)").dimmed()
            );
            print!("{body}");
            if !body.ends_with('\n') {
                println!();
            }
        }
        OutputFormat::Json => {
            let metadata: Vec<String> = metadata.triples().iter().map(ToString::to_string).collect();
            println!(
                "{}",
                json!({
                    "identifier": identifier.path(),
                    "contentType": content_type,
                    "metadata": metadata,
                    "body": body,
                })
            );
        }
    }
    Ok(())
}

async fn cmd_put(
    config: &ServerConfig,
    store: &dyn ResourceStore,
    args: PutArgs,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let identifier = resolve_target(config, &args.path);
    let bytes = tokio::fs::read(&args.file)
        .await
        .with_context(|| format!("cannot read {}", args.file.display()))?;
    let content_type = args.content_type.unwrap_or_else(|| {
        let name = args.file.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        content_type_for_name(name).to_string()
    });

    let metadata = RepresentationMetadata::new(identifier.clone()).with_content_type(&content_type);
    store
        .set_representation(&identifier, Representation::from_bytes(metadata, bytes))
        .await
        .map_err(failed)?;
    report(format, "Stored", &identifier);
    Ok(())
}

async fn cmd_delete(
    config: &ServerConfig,
    store: &dyn ResourceStore,
    args: DeleteArgs,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let identifier = resolve_target(config, &args.path);
    store.delete_resource(&identifier).await.map_err(failed)?;
    report(format, "Deleted", &identifier);
    Ok(())
}

async fn cmd_patch(
    config: &ServerConfig,
    store: &dyn ResourceStore,
    args: PatchArgs,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let identifier = resolve_target(config, &args.path);
    let update = tokio::fs::read(&args.sparql_file)
        .await
        .with_context(|| format!("cannot read {}", args.sparql_file.display()))?;
    store
        .modify_resource(&identifier, &Patch::new(APPLICATION_SPARQL_UPDATE, update))
        .await
        .map_err(failed)?;
    report(format, "Patched", &identifier);
    Ok(())
}
