mod client;
mod config;
mod error;
mod logging;
mod render;

use std::process::ExitCode;

use anyhow::{Context, Result};
use client::ClientState;
use config::WindowConfig;
use error::ClientError;
use render::EglBackend;
use tracing::{error, info};
use wayland_client::{Connection, EventQueue};

fn main() -> ExitCode {
    logging::init();

    let result = run(WindowConfig::from_env());
    if let Err(e) = &result {
        error!("{:#}", e);
    }
    exit_code(&result)
}

fn exit_code(result: &Result<()>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    }
}

fn run(config: WindowConfig) -> Result<()> {
    info!("connecting to display");
    let conn = Connection::connect_to_env()
        .map_err(ClientError::from)
        .context("no Wayland display")?;

    let mut event_queue = conn.new_event_queue();

    info!("allocating context");
    let mut state = ClientState::new(config, EglBackend::new(&conn));

    // Teardown runs on every exit path, fatal or not.
    let result = session(&conn, &mut event_queue, &mut state);
    state.teardown();
    if let Err(e) = conn.flush() {
        info!("flushing teardown requests failed: {}", e);
    }

    result.map_err(Into::into)
}

fn session(
    conn: &Connection,
    event_queue: &mut EventQueue<ClientState>,
    state: &mut ClientState,
) -> Result<(), ClientError> {
    let qh = event_queue.handle();

    info!("getting registry");
    let _registry = conn.display().get_registry(&qh, ());

    info!("waiting for events");
    roundtrip(event_queue, state)?;

    info!("checking if protocols found");
    state.globals.verify()?;

    state.create_window(&qh)?;

    info!("waiting for events");
    roundtrip(event_queue, state)?;

    info!("checking if surface configured");
    info!("initializing EGL");
    state.initialize_render()?;

    info!("entering event loop");
    while !state.is_closing() {
        event_queue.blocking_dispatch(state)?;
        state.check()?;
    }
    info!("exiting event loop");

    Ok(())
}

/// Flushes requests and waits until the server has answered all of them.
fn roundtrip(
    event_queue: &mut EventQueue<ClientState>,
    state: &mut ClientState,
) -> Result<(), ClientError> {
    event_queue.roundtrip(state)?;
    state.check()
}
