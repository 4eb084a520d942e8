//! Postgres operations for signals, rejection audits, and positions

use crate::config;
use crate::db::SignalStore;
use crate::errors::BoxError;
use crate::models::position::{CloseReason, Direction, Position, PositionStatus};
use crate::models::signal::{RejectReason, RejectedSignal, Signal, SignalDirection};
use crate::positions::store::PositionStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio_postgres::{Client, NoTls, Row};
use uuid::Uuid;

fn db_err(context: &str, e: impl std::fmt::Display) -> BoxError {
    Box::new(std::io::Error::other(format!("{}: {}", context, e)))
}

pub struct PgStore {
    client: Arc<RwLock<Option<Client>>>,
}

impl PgStore {
    pub async fn new() -> Result<Self, BoxError> {
        let database_url = config::get_database_url();
        let (client, connection) = tokio_postgres::connect(&database_url, NoTls)
            .await
            .map_err(|e| {
                Box::new(std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    format!("Failed to connect to Postgres: {}", e),
                )) as BoxError
            })?;

        // Spawn connection task
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!(error = %e, "Postgres connection error");
            }
        });

        let db = Self {
            client: Arc::new(RwLock::new(Some(client))),
        };
        db.init_schema().await?;
        Ok(db)
    }

    async fn init_schema(&self) -> Result<(), BoxError> {
        let client = self.client.read().await;
        if let Some(ref c) = *client {
            c.execute(
                "CREATE TABLE IF NOT EXISTS signals (
                    id UUID PRIMARY KEY,
                    symbol TEXT NOT NULL,
                    direction TEXT NOT NULL,
                    source TEXT NOT NULL,
                    confidence DOUBLE PRECISION NOT NULL,
                    entry_price DOUBLE PRECISION NOT NULL,
                    stop_loss DOUBLE PRECISION NOT NULL,
                    take_profit DOUBLE PRECISION NOT NULL,
                    timeframe TEXT NOT NULL,
                    created_at TIMESTAMPTZ NOT NULL,
                    reasons_json TEXT NOT NULL
                )",
                &[],
            )
            .await
            .map_err(|e| db_err("Failed to create signals table", e))?;

            c.execute(
                "CREATE TABLE IF NOT EXISTS rejected_signals (
                    signal_id UUID NOT NULL,
                    symbol TEXT NOT NULL,
                    reason TEXT NOT NULL,
                    confidence DOUBLE PRECISION NOT NULL,
                    age_ms BIGINT NOT NULL,
                    rejected_at TIMESTAMPTZ NOT NULL
                )",
                &[],
            )
            .await
            .map_err(|e| db_err("Failed to create rejected_signals table", e))?;

            c.execute(
                "CREATE TABLE IF NOT EXISTS positions (
                    id UUID PRIMARY KEY,
                    user_id BIGINT NOT NULL,
                    symbol TEXT NOT NULL,
                    direction TEXT NOT NULL,
                    entry_price DOUBLE PRECISION NOT NULL,
                    current_price DOUBLE PRECISION NOT NULL,
                    quantity DOUBLE PRECISION NOT NULL,
                    leverage DOUBLE PRECISION NOT NULL,
                    stop_loss DOUBLE PRECISION NOT NULL,
                    take_profit DOUBLE PRECISION NOT NULL,
                    status TEXT NOT NULL,
                    opened_at TIMESTAMPTZ NOT NULL,
                    closed_at TIMESTAMPTZ,
                    close_reason TEXT,
                    realized_pnl DOUBLE PRECISION
                )",
                &[],
            )
            .await
            .map_err(|e| db_err("Failed to create positions table", e))?;
        }
        Ok(())
    }

    pub async fn is_available(&self) -> bool {
        let client = self.client.read().await;
        client.is_some()
    }

    fn row_to_position(row: &Row) -> Result<Position, BoxError> {
        let direction_str: String = row.get(3);
        let status_str: String = row.get(10);
        let close_reason_str: Option<String> = row.get(13);
        let close_reason = match close_reason_str {
            Some(s) => Some(CloseReason::from_str(&s).map_err(BoxError::from)?),
            None => None,
        };
        Ok(Position {
            id: row.get(0),
            user_id: row.get(1),
            symbol: row.get(2),
            direction: Direction::from_str(&direction_str).map_err(BoxError::from)?,
            entry_price: row.get(4),
            current_price: row.get(5),
            quantity: row.get(6),
            leverage: row.get(7),
            stop_loss: row.get(8),
            take_profit: row.get(9),
            status: PositionStatus::from_str(&status_str).map_err(BoxError::from)?,
            opened_at: row.get(11),
            closed_at: row.get(12),
            close_reason,
            realized_pnl: row.get(14),
        })
    }
}

const POSITION_COLUMNS: &str = "id, user_id, symbol, direction, entry_price, current_price, \
     quantity, leverage, stop_loss, take_profit, status, opened_at, closed_at, close_reason, \
     realized_pnl";

#[async_trait]
impl SignalStore for PgStore {
    async fn insert_signal(&self, signal: &Signal) -> Result<(), BoxError> {
        let client = self.client.read().await;
        if let Some(ref c) = *client {
            let reasons_json = serde_json::to_string(&signal.reasons)
                .map_err(|e| db_err("Failed to serialize signal reasons", e))?;
            let direction = match signal.direction {
                SignalDirection::Buy => "buy",
                SignalDirection::Sell => "sell",
            };
            c.execute(
                "INSERT INTO signals (id, symbol, direction, source, confidence, entry_price, \
                 stop_loss, take_profit, timeframe, created_at, reasons_json)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
                 ON CONFLICT (id) DO NOTHING",
                &[
                    &signal.id,
                    &signal.symbol,
                    &direction,
                    &signal.source,
                    &signal.confidence,
                    &signal.entry_price,
                    &signal.stop_loss,
                    &signal.take_profit,
                    &signal.timeframe,
                    &signal.created_at,
                    &reasons_json,
                ],
            )
            .await
            .map_err(|e| db_err("Failed to store signal", e))?;
        }
        Ok(())
    }

    async fn insert_rejected(&self, rejected: &RejectedSignal) -> Result<(), BoxError> {
        let client = self.client.read().await;
        if let Some(ref c) = *client {
            let reason: &str = match rejected.reason {
                RejectReason::Stale => "stale",
                RejectReason::LowConfidence => "low_confidence",
                RejectReason::BadSymbol => "bad_symbol",
                RejectReason::UnreliableSource => "unreliable_source",
            };
            c.execute(
                "INSERT INTO rejected_signals (signal_id, symbol, reason, confidence, age_ms, \
                 rejected_at)
                 VALUES ($1, $2, $3, $4, $5, $6)",
                &[
                    &rejected.signal_id,
                    &rejected.symbol,
                    &reason,
                    &rejected.confidence,
                    &rejected.age_ms,
                    &rejected.rejected_at,
                ],
            )
            .await
            .map_err(|e| db_err("Failed to store rejection record", e))?;
        }
        Ok(())
    }
}

#[async_trait]
impl PositionStore for PgStore {
    async fn insert(&self, position: &Position) -> Result<(), BoxError> {
        let client = self.client.read().await;
        if let Some(ref c) = *client {
            c.execute(
                "INSERT INTO positions (id, user_id, symbol, direction, entry_price, \
                 current_price, quantity, leverage, stop_loss, take_profit, status, opened_at)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
                &[
                    &position.id,
                    &position.user_id,
                    &position.symbol,
                    &position.direction.as_str(),
                    &position.entry_price,
                    &position.current_price,
                    &position.quantity,
                    &position.leverage,
                    &position.stop_loss,
                    &position.take_profit,
                    &position.status.as_str(),
                    &position.opened_at,
                ],
            )
            .await
            .map_err(|e| db_err("Failed to store position", e))?;
        }
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Position>, BoxError> {
        let client = self.client.read().await;
        if let Some(ref c) = *client {
            let rows = c
                .query(
                    &format!("SELECT {} FROM positions WHERE id = $1", POSITION_COLUMNS),
                    &[&id],
                )
                .await
                .map_err(|e| db_err("Failed to query position", e))?;
            return match rows.first() {
                Some(row) => Ok(Some(Self::row_to_position(row)?)),
                None => Ok(None),
            };
        }
        Ok(None)
    }

    async fn list_open(&self) -> Result<Vec<Position>, BoxError> {
        let client = self.client.read().await;
        if let Some(ref c) = *client {
            let rows = c
                .query(
                    &format!(
                        "SELECT {} FROM positions WHERE status = 'open' ORDER BY opened_at",
                        POSITION_COLUMNS
                    ),
                    &[],
                )
                .await
                .map_err(|e| db_err("Failed to query open positions", e))?;
            return rows.iter().map(Self::row_to_position).collect();
        }
        Ok(Vec::new())
    }

    async fn list_open_by_direction(
        &self,
        direction: Direction,
    ) -> Result<Vec<Position>, BoxError> {
        let client = self.client.read().await;
        if let Some(ref c) = *client {
            let rows = c
                .query(
                    &format!(
                        "SELECT {} FROM positions WHERE status = 'open' AND direction = $1 \
                         ORDER BY opened_at",
                        POSITION_COLUMNS
                    ),
                    &[&direction.as_str()],
                )
                .await
                .map_err(|e| db_err("Failed to query open positions by direction", e))?;
            return rows.iter().map(Self::row_to_position).collect();
        }
        Ok(Vec::new())
    }

    async fn update_mark(&self, id: Uuid, current_price: f64) -> Result<(), BoxError> {
        let client = self.client.read().await;
        if let Some(ref c) = *client {
            c.execute(
                "UPDATE positions SET current_price = $1 WHERE id = $2",
                &[&current_price, &id],
            )
            .await
            .map_err(|e| db_err("Failed to update mark price", e))?;
        }
        Ok(())
    }

    async fn transition(
        &self,
        id: Uuid,
        from: PositionStatus,
        to: PositionStatus,
    ) -> Result<bool, BoxError> {
        let client = self.client.read().await;
        if let Some(ref c) = *client {
            // The status predicate makes this a compare-and-swap: only one
            // of two racing transitions sees a row.
            let rows_affected = c
                .execute(
                    "UPDATE positions SET status = $1 WHERE id = $2 AND status = $3",
                    &[&to.as_str(), &id, &from.as_str()],
                )
                .await
                .map_err(|e| db_err("Failed to transition position status", e))?;
            return Ok(rows_affected > 0);
        }
        Ok(false)
    }

    async fn finalize_close(
        &self,
        id: Uuid,
        reason: CloseReason,
        exit_price: f64,
        realized_pnl: f64,
        closed_at: DateTime<Utc>,
    ) -> Result<bool, BoxError> {
        let client = self.client.read().await;
        if let Some(ref c) = *client {
            let rows_affected = c
                .execute(
                    "UPDATE positions
                     SET status = 'closed', close_reason = $1, current_price = $2, \
                         realized_pnl = $3, closed_at = $4
                     WHERE id = $5 AND status = 'closing'",
                    &[&reason.as_str(), &exit_price, &realized_pnl, &closed_at, &id],
                )
                .await
                .map_err(|e| db_err("Failed to finalize close", e))?;
            return Ok(rows_affected > 0);
        }
        Ok(false)
    }
}
