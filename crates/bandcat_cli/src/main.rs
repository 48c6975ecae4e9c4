//! Catalog command-line entry point.
//!
//! # Responsibility
//! - Read `BANDCAT_*` configuration and select one backend at startup.
//! - Run a single API call and print its status and JSON body.
//!
//! Exit code is `0` for 2xx responses and `1` otherwise.

use bandcat_api::{ApiResponse, CatalogApi, SongListParams};
use bandcat_core::{CatalogConfig, CatalogRepository, NewSong, SongId, SongPatch};
use clap::Parser;
use log::info;
use std::process::ExitCode;

#[derive(Debug, clap::Parser)]
#[command(name = "bandcat", version, about = "BanG Dream! band and song catalog")]
enum Command {
    /// Show the landing payload with the active storage type.
    Root,
    /// Health probe.
    Health,
    /// List all bands, or one band by exact name.
    Bands {
        #[arg(long)]
        name: Option<String>,
    },
    /// List songs filtered by band (exact) or title (fuzzy), paginated.
    Songs {
        #[arg(long)]
        band: Option<String>,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        page_index: Option<u32>,
        #[arg(long)]
        page_size: Option<u32>,
    },
    /// Show one song.
    Song { id: SongId },
    /// Create a song.
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        band: String,
        #[arg(long)]
        author: Option<String>,
        #[arg(long)]
        lyrics: Option<String>,
    },
    /// Update only the supplied fields of a song.
    Update {
        id: SongId,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        band: Option<String>,
        #[arg(long)]
        author: Option<String>,
        #[arg(long)]
        lyrics: Option<String>,
    },
    /// Delete a song.
    Delete { id: SongId },
}

fn main() -> ExitCode {
    let command = Command::parse();

    let config = match CatalogConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("configuration error: {err}");
            return ExitCode::FAILURE;
        }
    };

    if let Some(log_dir) = &config.log_dir {
        if let Err(err) = bandcat_core::init_logging(config.log_level, log_dir) {
            eprintln!("logging disabled: {err}");
        }
    }

    let repo = match config.open_backend() {
        Ok(repo) => repo,
        Err(err) => {
            eprintln!("failed to open {} storage: {err}", config.backend.as_str());
            return ExitCode::FAILURE;
        }
    };
    info!(
        "event=cli_start module=cli status=ok backend={}",
        config.backend.as_str()
    );

    let api = CatalogApi::new(repo);
    let response = run(&api, command);
    print_response(&response);

    if response.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn run<R: CatalogRepository>(api: &CatalogApi<R>, command: Command) -> ApiResponse {
    match command {
        Command::Root => api.root(),
        Command::Health => api.health(),
        Command::Bands { name } => api.get_bands(name.as_deref()),
        Command::Songs {
            band,
            title,
            page_index,
            page_size,
        } => api.list_songs(&SongListParams {
            band,
            title,
            page_index,
            page_size,
        }),
        Command::Song { id } => api.get_song(id),
        Command::Create {
            title,
            band,
            author,
            lyrics,
        } => api.create_song(&NewSong {
            title,
            author,
            lyrics,
            band,
        }),
        Command::Update {
            id,
            title,
            band,
            author,
            lyrics,
        } => api.update_song(
            id,
            &SongPatch {
                title,
                author,
                lyrics,
                band,
            },
        ),
        Command::Delete { id } => api.delete_song(id),
    }
}

fn print_response(response: &ApiResponse) {
    println!("status={}", response.status);
    if let Some(body) = &response.body {
        match serde_json::to_string_pretty(body) {
            Ok(text) => println!("{text}"),
            Err(err) => eprintln!("failed to render response body: {err}"),
        }
    }
}
