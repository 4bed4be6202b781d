//! Get command - answer one request from the cache

use crate::cache::{create_cache, lifecycle_file, RequestKey, StoredResponse};
use crate::cli::args::GetArgs;
use crate::cli::commands::serving_generation;
use crate::config::Config;
use crate::error::{OffcacheError, OffcacheResult};
use std::io::{self, Write};
use tracing::info;

/// Execute the get command
///
/// A miss is not a failure: the placeholder is printed and the command succeeds.
/// Requests are answered from the activated generation; an installed but not yet
/// activated generation is only reachable with `--generation`.
pub async fn execute(args: GetArgs, config: &Config) -> OffcacheResult<()> {
    let lifecycle = lifecycle_file(config).load().await?;
    let cache = create_cache(config);
    let request = RequestKey::new(args.method, args.url);

    let response = match serving_generation(args.generation.as_deref(), &lifecycle)? {
        Some(generation) => cache.serve(&generation, &request).await,
        None => {
            info!("No generation activated; {} misses", request);
            cache.placeholder().clone()
        }
    };

    write_response(&mut io::stdout().lock(), &response, args.include)
        .map_err(|e| OffcacheError::io("writing response to stdout", e))
}

fn write_response(
    out: &mut impl Write,
    response: &StoredResponse,
    include_head: bool,
) -> io::Result<()> {
    if include_head {
        writeln!(out, "HTTP {}", response.status)?;
        for (name, value) in &response.headers {
            writeln!(out, "{}: {}", name, value)?;
        }
        writeln!(out)?;
    }
    out.write_all(&response.body)?;
    out.flush()
}
