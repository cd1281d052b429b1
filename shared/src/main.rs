#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]
//! `pupfiesta` command line: Places search, stored gardens and the
//! post-authentication pipeline against live Firebase and Places endpoints.
//!
//! # Examples
//! ```sh
//! PUPFIESTA_PLACES_API_KEY=... pupfiesta parks --latitude 32.0853 --longitude 34.7818 --language he
//! ```

use std::ffi::OsString;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr, eyre};
use tokio::runtime::Builder;

use pupfiesta::domain::ports::{FirebaseRepository, GardensRepository};
use pupfiesta::domain::{DogGarden, Location, RemoteFirebaseRepository};
use pupfiesta::inbound::view_models::{
    PostAuthConfig, PostAuthPorts, PostAuthState, PostAuthViewModel,
};
use pupfiesta::outbound::firebase::{FirebaseAuthHttpGateway, FirebaseSession, FirestoreHttpStore};
use pupfiesta::outbound::location::StaticLocationProvider;
use pupfiesta::outbound::places::GooglePlacesHttpSource;
use pupfiesta::settings::PupFiestaSettings;
use pupfiesta::telemetry;
use ortho_config::OrthoConfig;

type HttpRepository = RemoteFirebaseRepository<FirebaseAuthHttpGateway, FirestoreHttpStore>;

/// `pupfiesta` command arguments.
#[derive(Debug, Parser)]
#[command(
    name = "pupfiesta",
    about = "Find dog parks and exercise the PupFiesta Firebase flows",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Search Places for dog parks near a point.
    Parks(PointArgs),
    /// Sign in and list stored dog gardens near a point.
    Gardens {
        #[command(flatten)]
        credentials: Credentials,
        #[command(flatten)]
        point: PointArgs,
    },
    /// Sign in and run the post-authentication pipeline.
    PostAuth {
        #[command(flatten)]
        credentials: Credentials,
        /// Device latitude; the configured fallback centre is used when
        /// omitted.
        #[arg(long, allow_hyphen_values = true, requires = "longitude")]
        latitude: Option<f64>,
        /// Device longitude.
        #[arg(long, allow_hyphen_values = true, requires = "latitude")]
        longitude: Option<f64>,
    },
}

#[derive(Debug, Args)]
struct Credentials {
    /// Account email.
    #[arg(long)]
    email: String,
    /// Account password.
    #[arg(long)]
    password: String,
}

#[derive(Debug, Args)]
struct PointArgs {
    /// Search centre latitude.
    #[arg(long, allow_hyphen_values = true)]
    latitude: f64,
    /// Search centre longitude.
    #[arg(long, allow_hyphen_values = true)]
    longitude: f64,
    /// Radius in metres; defaults to the configured radius.
    #[arg(long)]
    radius: Option<f64>,
    /// Result language; defaults to the configured language.
    #[arg(long)]
    language: Option<String>,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    telemetry::init();
    let cli = Cli::parse();
    let settings = PupFiestaSettings::load_from_iter([OsString::from("pupfiesta")])
        .map_err(|error| eyre!("load settings: {error}"))?;

    let runtime = Builder::new_multi_thread()
        .enable_all()
        .build()
        .wrap_err("create Tokio runtime")?;
    runtime.block_on(run(cli.command, &settings))
}

async fn run(command: Command, settings: &PupFiestaSettings) -> Result<()> {
    match command {
        Command::Parks(point) => {
            let places = places(settings)?;
            let found = places
                .search_dog_parks(
                    point.latitude,
                    point.longitude,
                    point.radius.unwrap_or_else(|| settings.search_radius_meters()),
                    point.language.as_deref().unwrap_or(settings.language()),
                )
                .await?;
            print_gardens(&found);
        }
        Command::Gardens { credentials, point } => {
            let repository = signed_in(settings, &credentials).await?;
            let found = repository
                .get_dog_gardens_near(
                    point.latitude,
                    point.longitude,
                    point.radius.unwrap_or_else(|| settings.search_radius_meters()),
                )
                .await
                .map_err(|error| eyre!(error.message().to_owned()))?;
            print_gardens(&found);
        }
        Command::PostAuth {
            credentials,
            latitude,
            longitude,
        } => {
            let device = latitude.zip(longitude).map(|(lat, lng)| Location::new(lat, lng));
            post_auth(settings, &credentials, device).await?;
        }
    }
    Ok(())
}

fn required<'a>(value: Option<&'a str>, variable: &str) -> Result<&'a str> {
    value
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| eyre!("{variable} is not set"))
}

fn places(settings: &PupFiestaSettings) -> Result<GooglePlacesHttpSource> {
    let api_key = required(settings.places_api_key.as_deref(), "PUPFIESTA_PLACES_API_KEY")?;
    GooglePlacesHttpSource::new(settings.places_url()?, api_key, settings.http_timeout())
        .wrap_err("build places client")
}

async fn signed_in(settings: &PupFiestaSettings, credentials: &Credentials) -> Result<HttpRepository> {
    let api_key = required(settings.firebase_api_key.as_deref(), "PUPFIESTA_FIREBASE_API_KEY")?;
    let project_id = required(
        settings.firebase_project_id.as_deref(),
        "PUPFIESTA_FIREBASE_PROJECT_ID",
    )?;
    let session = FirebaseSession::new();
    let auth = FirebaseAuthHttpGateway::new(
        &settings.identity_url()?,
        api_key,
        settings.http_timeout(),
        session.clone(),
    )
    .wrap_err("build identity toolkit client")?;
    let store = FirestoreHttpStore::new(
        settings.firestore_url()?,
        project_id,
        settings.http_timeout(),
        session,
    )
    .wrap_err("build firestore client")?;

    let repository = RemoteFirebaseRepository::new(Arc::new(auth), Arc::new(store));
    let user = repository
        .user_login(&credentials.email, &credentials.password)
        .await
        .map_err(|error| eyre!(error.message().to_owned()))?;
    println!("signed_in={}", user.email);
    Ok(repository)
}

async fn post_auth(
    settings: &PupFiestaSettings,
    credentials: &Credentials,
    device: Option<Location>,
) -> Result<()> {
    let repository = signed_in(settings, credentials).await?;
    let ports = PostAuthPorts {
        repository: Arc::new(repository),
        gardens: Arc::new(places(settings)?),
        location: Arc::new(StaticLocationProvider::new(device)),
    };
    let config = PostAuthConfig {
        location_timeout: settings.location_timeout(),
        search_radius_meters: settings.search_radius_meters(),
        language: settings.language().to_owned(),
        ..PostAuthConfig::default()
    };
    let view_model = PostAuthViewModel::new(ports, config);
    let mut progress = view_model.subscribe();

    view_model.run(settings.fallback_center());

    let outcome = loop {
        let state = progress.borrow_and_update().clone();
        match state {
            PostAuthState::Running(stage) => println!("stage={stage}"),
            PostAuthState::Success(_) | PostAuthState::Error(_) => break state,
            PostAuthState::Idle => {}
        }
        progress
            .changed()
            .await
            .wrap_err("post-auth pipeline stopped unexpectedly")?;
    };

    match outcome {
        PostAuthState::Success(saved) => {
            println!("saved_gardens={saved}");
            if let Some(dog) = view_model.selected_dog() {
                println!("selected_dog={} ({})", dog.name, dog.breed);
            }
            Ok(())
        }
        PostAuthState::Error(message) => Err(eyre!(message)),
        PostAuthState::Idle | PostAuthState::Running(_) => {
            Err(eyre!("post-auth pipeline ended without a result"))
        }
    }
}

fn print_gardens(gardens: &[DogGarden]) {
    println!("count={}", gardens.len());
    for garden in gardens {
        println!(
            "{}\t{}\t{:.5},{:.5}\t{}",
            garden.id,
            garden.name,
            garden.location.latitude,
            garden.location.longitude,
            garden.map_url
        );
    }
}
