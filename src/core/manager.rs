//! Single-connection manager with a debounced liveness probe
//!
//! The manager holds at most one session. Before every query the caller goes
//! through [`ConnectionManager::acquire`], which reuses the session if it was
//! seen alive recently, pings it otherwise, and reconnects when the ping
//! fails. There is no background work and no locking: one manager per task.

use super::config::ConnectionConfig;
use super::database::{Connector, Session};
use super::error::{DatabaseError, Result};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// How long a successful ping is trusted without probing again
pub const LIVENESS_DEBOUNCE: Duration = Duration::from_secs(15);

/// Observable connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connected,
}

/// Owns one session and keeps it alive
pub struct ConnectionManager<C: Connector> {
    connector: C,
    config: ConnectionConfig,
    session: Option<C::Session>,
    last_ping: Option<Instant>,
}

impl<C: Connector> ConnectionManager<C> {
    /// Create a manager; no connection is made until first use
    pub fn new(connector: C, config: ConnectionConfig) -> Self {
        Self {
            connector,
            config,
            session: None,
            last_ping: None,
        }
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    /// Connected while a session exists and its last probe succeeded
    pub fn state(&self) -> ConnectionState {
        if self.session.is_some() && self.last_ping.is_some() {
            ConnectionState::Connected
        } else {
            ConnectionState::Disconnected
        }
    }

    /// Current session without any liveness check
    pub fn session(&self) -> Option<&C::Session> {
        self.session.as_ref()
    }

    /// Make sure a live session exists, reconnecting if needed
    ///
    /// With `force` the current session is replaced unconditionally. A
    /// session that cannot be opened, or that does not answer a ping right
    /// after opening, is a [`DatabaseError::ConnectionFailed`]. A configuration
    /// for a different backend than the connector's is rejected with
    /// [`DatabaseError::InvalidConfig`] before anything is dialed.
    pub async fn ensure_connected(&mut self, force: bool) -> Result<()> {
        if !force && self.is_alive(false).await {
            return Ok(());
        }

        if self.session.is_some() {
            info!(
                host = %self.config.host(),
                port = self.config.port(),
                force,
                "reconnecting to database"
            );
        }
        self.disconnect().await;

        let backend = self.connector.database_type();
        if backend != self.config.database_type() {
            return Err(DatabaseError::invalid_config(format!(
                "{} configuration given to a {} connector",
                self.config.database_type(),
                backend
            )));
        }

        let host = self.config.host().to_string();
        let port = self.config.port();
        let tls = self.config.tls();
        debug!(
            backend = %backend,
            url = %self.config.connection_url(),
            tls = tls.is_some(),
            "opening database session"
        );

        let session = self
            .connector
            .connect(&self.config, tls)
            .await
            .map_err(|e| {
                warn!(host = %host, port, error = %e, "database connect failed");
                DatabaseError::connection_failed_with_source(
                    host.clone(),
                    port,
                    "unable to open session",
                    Box::new(e),
                )
            })?;
        self.session = Some(session);

        if !self.is_alive(true).await {
            self.disconnect().await;
            return Err(DatabaseError::connection_failed(
                host,
                port,
                "server did not answer ping after connect",
            ));
        }

        info!(host = %host, port, "database session established");
        Ok(())
    }

    /// Debounced liveness probe
    ///
    /// Without `force`, a ping that succeeded less than [`LIVENESS_DEBOUNCE`]
    /// ago is trusted. Any failed probe clears the cached timestamp.
    pub async fn is_alive(&mut self, force: bool) -> bool {
        if !force {
            if let Some(at) = self.last_ping {
                if at.elapsed() < LIVENESS_DEBOUNCE {
                    return true;
                }
            }
        }

        let Some(session) = self.session.as_mut() else {
            self.last_ping = None;
            return false;
        };

        match session.ping().await {
            Ok(true) => {
                self.last_ping = Some(Instant::now());
                true
            }
            Ok(false) => {
                debug!("database ping answered negatively");
                self.last_ping = None;
                false
            }
            Err(e) => {
                debug!(error = %e, "database ping failed");
                self.last_ping = None;
                false
            }
        }
    }

    /// Live session for the next query
    pub async fn acquire(&mut self) -> Result<&mut C::Session> {
        self.ensure_connected(false).await?;
        self.session
            .as_mut()
            .ok_or_else(|| DatabaseError::connection("no live session after connect"))
    }

    /// Close and drop the current session
    pub async fn disconnect(&mut self) {
        self.last_ping = None;
        if let Some(mut session) = self.session.take() {
            if let Err(e) = session.close().await {
                debug!(error = %e, "error while closing stale session");
            }
        }
    }
}
