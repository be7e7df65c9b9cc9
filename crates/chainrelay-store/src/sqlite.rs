//! SQLite backend.
//!
//! A single shared connection behind `Arc<Mutex<Connection>>`, WAL mode for
//! read concurrency, schema created on first open. Uniqueness constraints
//! carry the pipeline invariants: a unique index on `chain_events.hash` and a
//! partial unique index on `(subscription_id, chain_event_id)`.

use std::path::Path;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chainrelay_core::{
    ChainEvent, EventInsert, EventStore, Network, NewChainEvent, Notification,
    NotificationCategory, StoreError, Subscription,
};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::records::{
    Endpoint, ListenerConfig, NewListenerConfig, NewNotification, NewOutboxMessage,
    NotificationInsert, OutboxMessage, WebhookEndpoint,
};
use crate::traits::{
    ListenerConfigStore, NotificationStore, OutboxStore, SubscriptionStore, WebhookStore,
};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS chain_events (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    network      TEXT    NOT NULL,
    block_number INTEGER NOT NULL,
    kind         TEXT    NOT NULL,
    data         TEXT    NOT NULL,
    hash         TEXT    NOT NULL,
    entity_key   TEXT
);
CREATE UNIQUE INDEX IF NOT EXISTS chain_events_hash ON chain_events (hash);

CREATE TABLE IF NOT EXISTS outbox (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    event_id    INTEGER NOT NULL,
    exchange    TEXT    NOT NULL,
    routing_key TEXT    NOT NULL,
    enqueued_at TEXT    NOT NULL,
    attempts    INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS subscriptions (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    category      TEXT    NOT NULL,
    object_id     TEXT    NOT NULL,
    subscriber_id INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS subscriptions_lookup
    ON subscriptions (category, object_id);

CREATE TABLE IF NOT EXISTS notifications (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    subscription_id INTEGER NOT NULL,
    data            TEXT    NOT NULL,
    is_read         INTEGER NOT NULL DEFAULT 0,
    created_at      TEXT    NOT NULL,
    chain_event_id  INTEGER
);
CREATE UNIQUE INDEX IF NOT EXISTS notifications_pair
    ON notifications (subscription_id, chain_event_id)
    WHERE chain_event_id IS NOT NULL;

CREATE TABLE IF NOT EXISTS webhooks (
    id       INTEGER PRIMARY KEY AUTOINCREMENT,
    category TEXT NOT NULL,
    url      TEXT NOT NULL,
    secret   TEXT
);
CREATE INDEX IF NOT EXISTS webhooks_category ON webhooks (category);

CREATE TABLE IF NOT EXISTS chain_endpoints (
    id  INTEGER PRIMARY KEY AUTOINCREMENT,
    url TEXT    NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS listeners (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    chain_id         TEXT    NOT NULL,
    spec             TEXT    NOT NULL,
    contract_address TEXT,
    network          TEXT    NOT NULL,
    base             TEXT    NOT NULL,
    url_id           INTEGER NOT NULL REFERENCES chain_endpoints (id),
    verbose_logging  INTEGER NOT NULL DEFAULT 0,
    active           INTEGER NOT NULL DEFAULT 0
);
";

/// SQLite-backed store implementing every storage trait.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) a database at the given path. Runs the schema and
    /// enables WAL mode on first open.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let conn = Connection::open(path.as_ref()).map_err(db_err)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")
            .map_err(db_err)?;
        conn.execute_batch(SCHEMA).map_err(db_err)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory database (useful for tests).
    pub fn in_memory() -> Result<Self, StoreError> {
        Self::open(":memory:")
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn db_err(e: rusqlite::Error) -> StoreError {
    StoreError::Database(e.to_string())
}

fn parse_network(s: &str) -> Result<Network, StoreError> {
    Network::from_str(s).map_err(StoreError::Database)
}

fn parse_category(s: &str) -> Result<NotificationCategory, StoreError> {
    NotificationCategory::from_str(s).map_err(StoreError::Database)
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| StoreError::Database(format!("bad timestamp '{s}': {e}")))
}

fn event_from_row(row: &Row<'_>) -> rusqlite::Result<(i64, String, u64, String, String, String, Option<String>)> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
    ))
}

fn build_event(
    (id, network, block_number, kind, data, hash, entity_key): (
        i64,
        String,
        u64,
        String,
        String,
        String,
        Option<String>,
    ),
) -> Result<ChainEvent, StoreError> {
    Ok(ChainEvent {
        id,
        network: parse_network(&network)?,
        block_number,
        kind,
        data: serde_json::from_str(&data)?,
        hash,
        entity_key,
    })
}

const EVENT_COLS: &str = "id, network, block_number, kind, data, hash, entity_key";

#[async_trait]
impl EventStore for SqliteStore {
    async fn insert_event(&self, event: NewChainEvent) -> Result<EventInsert, StoreError> {
        let data = serde_json::to_string(&event.data)?;
        let conn = self.lock();
        let changed = conn
            .execute(
                "INSERT INTO chain_events (network, block_number, kind, data, hash, entity_key)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT (hash) DO NOTHING",
                params![
                    event.network.as_str(),
                    event.block_number,
                    &event.kind,
                    &data,
                    &event.hash,
                    &event.entity_key,
                ],
            )
            .map_err(db_err)?;
        if changed == 0 {
            return Ok(EventInsert::Duplicate);
        }
        let id = conn.last_insert_rowid();
        Ok(EventInsert::Inserted(ChainEvent {
            id,
            network: event.network,
            block_number: event.block_number,
            kind: event.kind,
            data: event.data,
            hash: event.hash,
            entity_key: event.entity_key,
        }))
    }

    async fn event_by_hash(&self, hash: &str) -> Result<Option<ChainEvent>, StoreError> {
        let conn = self.lock();
        let row = conn
            .query_row(
                &format!("SELECT {EVENT_COLS} FROM chain_events WHERE hash = ?1"),
                params![hash],
                event_from_row,
            )
            .optional()
            .map_err(db_err)?;
        row.map(build_event).transpose()
    }

    async fn event_by_id(&self, id: i64) -> Result<Option<ChainEvent>, StoreError> {
        let conn = self.lock();
        let row = conn
            .query_row(
                &format!("SELECT {EVENT_COLS} FROM chain_events WHERE id = ?1"),
                params![id],
                event_from_row,
            )
            .optional()
            .map_err(db_err)?;
        row.map(build_event).transpose()
    }
}

#[async_trait]
impl OutboxStore for SqliteStore {
    async fn enqueue(&self, msg: NewOutboxMessage) -> Result<OutboxMessage, StoreError> {
        let enqueued_at = Utc::now();
        let conn = self.lock();
        conn.execute(
            "INSERT INTO outbox (event_id, exchange, routing_key, enqueued_at, attempts)
             VALUES (?1, ?2, ?3, ?4, 0)",
            params![
                msg.event_id,
                &msg.exchange,
                &msg.routing_key,
                enqueued_at.to_rfc3339(),
            ],
        )
        .map_err(db_err)?;
        Ok(OutboxMessage {
            id: conn.last_insert_rowid(),
            event_id: msg.event_id,
            exchange: msg.exchange,
            routing_key: msg.routing_key,
            enqueued_at,
            attempts: 0,
        })
    }

    async fn load_all(&self) -> Result<Vec<OutboxMessage>, StoreError> {
        let conn = self.lock();
        let mut stmt = conn
            .prepare(
                "SELECT id, event_id, exchange, routing_key, enqueued_at, attempts
                 FROM outbox ORDER BY id ASC",
            )
            .map_err(db_err)?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, u32>(5)?,
                ))
            })
            .map_err(db_err)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(db_err)?;
        rows.into_iter()
            .map(|(id, event_id, exchange, routing_key, enqueued_at, attempts)| {
                Ok(OutboxMessage {
                    id,
                    event_id,
                    exchange,
                    routing_key,
                    enqueued_at: parse_timestamp(&enqueued_at)?,
                    attempts,
                })
            })
            .collect()
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        self.lock()
            .execute("DELETE FROM outbox WHERE id = ?1", params![id])
            .map_err(db_err)?;
        Ok(())
    }

    async fn bump_attempts(&self, id: i64) -> Result<(), StoreError> {
        self.lock()
            .execute(
                "UPDATE outbox SET attempts = attempts + 1 WHERE id = ?1",
                params![id],
            )
            .map_err(db_err)?;
        Ok(())
    }
}

#[async_trait]
impl SubscriptionStore for SqliteStore {
    async fn matching(
        &self,
        category: NotificationCategory,
        object_id: &str,
    ) -> Result<Vec<Subscription>, StoreError> {
        let conn = self.lock();
        let mut stmt = conn
            .prepare(
                "SELECT id, category, object_id, subscriber_id FROM subscriptions
                 WHERE category = ?1 AND object_id = ?2",
            )
            .map_err(db_err)?;
        let rows = stmt
            .query_map(params![category.as_str(), object_id], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, i64>(3)?,
                ))
            })
            .map_err(db_err)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(db_err)?;
        rows.into_iter()
            .map(|(id, category, object_id, subscriber_id)| {
                Ok(Subscription {
                    id,
                    category: parse_category(&category)?,
                    object_id,
                    subscriber_id,
                })
            })
            .collect()
    }

    async fn insert_subscription(
        &self,
        category: NotificationCategory,
        object_id: &str,
        subscriber_id: i64,
    ) -> Result<Subscription, StoreError> {
        let conn = self.lock();
        conn.execute(
            "INSERT INTO subscriptions (category, object_id, subscriber_id)
             VALUES (?1, ?2, ?3)",
            params![category.as_str(), object_id, subscriber_id],
        )
        .map_err(db_err)?;
        Ok(Subscription {
            id: conn.last_insert_rowid(),
            category,
            object_id: object_id.to_string(),
            subscriber_id,
        })
    }
}

#[async_trait]
impl NotificationStore for SqliteStore {
    async fn insert_once(&self, new: NewNotification) -> Result<NotificationInsert, StoreError> {
        let data = serde_json::to_string(&new.data)?;
        let created_at = Utc::now();
        let conn = self.lock();

        let subscription = conn
            .query_row(
                "SELECT id, category, object_id, subscriber_id FROM subscriptions
                 WHERE id = ?1",
                params![new.subscription_id],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, i64>(3)?,
                    ))
                },
            )
            .optional()
            .map_err(db_err)?
            .ok_or_else(|| StoreError::NotFound {
                what: format!("subscription {}", new.subscription_id),
            })?;

        let changed = conn
            .execute(
                "INSERT INTO notifications
                    (subscription_id, data, is_read, created_at, chain_event_id)
                 VALUES (?1, ?2, 0, ?3, ?4)
                 ON CONFLICT DO NOTHING",
                params![
                    new.subscription_id,
                    &data,
                    created_at.to_rfc3339(),
                    new.chain_event_id,
                ],
            )
            .map_err(db_err)?;
        if changed == 0 {
            return Ok(NotificationInsert::Duplicate);
        }

        let (sub_id, category, object_id, subscriber_id) = subscription;
        Ok(NotificationInsert::Inserted(Notification {
            id: conn.last_insert_rowid(),
            data: new.data,
            is_read: false,
            created_at,
            subscription: Subscription {
                id: sub_id,
                category: parse_category(&category)?,
                object_id,
                subscriber_id,
            },
            chain_event_id: new.chain_event_id,
        }))
    }

    async fn for_subscriber(&self, subscriber_id: i64) -> Result<Vec<Notification>, StoreError> {
        let conn = self.lock();
        let mut stmt = conn
            .prepare(
                "SELECT n.id, n.data, n.is_read, n.created_at, n.chain_event_id,
                        s.id, s.category, s.object_id, s.subscriber_id
                 FROM notifications n JOIN subscriptions s ON n.subscription_id = s.id
                 WHERE s.subscriber_id = ?1
                 ORDER BY n.id ASC",
            )
            .map_err(db_err)?;
        let rows = stmt
            .query_map(params![subscriber_id], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, bool>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, Option<i64>>(4)?,
                    row.get::<_, i64>(5)?,
                    row.get::<_, String>(6)?,
                    row.get::<_, String>(7)?,
                    row.get::<_, i64>(8)?,
                ))
            })
            .map_err(db_err)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(db_err)?;
        rows.into_iter()
            .map(
                |(id, data, is_read, created_at, chain_event_id, sub_id, category, object_id, sub_subscriber)| {
                    Ok(Notification {
                        id,
                        data: serde_json::from_str(&data)?,
                        is_read,
                        created_at: parse_timestamp(&created_at)?,
                        subscription: Subscription {
                            id: sub_id,
                            category: parse_category(&category)?,
                            object_id,
                            subscriber_id: sub_subscriber,
                        },
                        chain_event_id,
                    })
                },
            )
            .collect()
    }
}

#[async_trait]
impl WebhookStore for SqliteStore {
    async fn endpoints_for(
        &self,
        category: NotificationCategory,
    ) -> Result<Vec<WebhookEndpoint>, StoreError> {
        let conn = self.lock();
        let mut stmt = conn
            .prepare("SELECT id, url, secret FROM webhooks WHERE category = ?1 ORDER BY id ASC")
            .map_err(db_err)?;
        let rows = stmt
            .query_map(params![category.as_str()], |row| {
                Ok(WebhookEndpoint {
                    id: row.get(0)?,
                    url: row.get(1)?,
                    secret: row.get(2)?,
                })
            })
            .map_err(db_err)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(db_err)?;
        Ok(rows)
    }

    async fn insert_endpoint(
        &self,
        category: NotificationCategory,
        url: &str,
        secret: Option<&str>,
    ) -> Result<WebhookEndpoint, StoreError> {
        let conn = self.lock();
        conn.execute(
            "INSERT INTO webhooks (category, url, secret) VALUES (?1, ?2, ?3)",
            params![category.as_str(), url, secret],
        )
        .map_err(db_err)?;
        Ok(WebhookEndpoint {
            id: conn.last_insert_rowid(),
            url: url.to_string(),
            secret: secret.map(str::to_string),
        })
    }
}

#[async_trait]
impl ListenerConfigStore for SqliteStore {
    async fn active_configs(&self) -> Result<Vec<(ListenerConfig, Endpoint)>, StoreError> {
        let conn = self.lock();
        let mut stmt = conn
            .prepare(
                "SELECT l.id, l.chain_id, l.spec, l.contract_address, l.network, l.base,
                        l.url_id, l.verbose_logging, e.id, e.url
                 FROM listeners l JOIN chain_endpoints e ON l.url_id = e.id
                 WHERE l.active = 1
                 ORDER BY l.id ASC",
            )
            .map_err(db_err)?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Option<String>>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                    row.get::<_, i64>(6)?,
                    row.get::<_, bool>(7)?,
                    row.get::<_, i64>(8)?,
                    row.get::<_, String>(9)?,
                ))
            })
            .map_err(db_err)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(db_err)?;
        rows.into_iter()
            .map(
                |(id, chain_id, spec, contract_address, network, base, url_id, verbose, ep_id, url)| {
                    Ok((
                        ListenerConfig {
                            id,
                            chain_id,
                            spec: serde_json::from_str(&spec)?,
                            contract_address,
                            network: parse_network(&network)?,
                            base,
                            url_id,
                            verbose_logging: verbose,
                            active: true,
                        },
                        Endpoint { id: ep_id, url },
                    ))
                },
            )
            .collect()
    }

    async fn add_endpoint(&self, url: &str) -> Result<Endpoint, StoreError> {
        let conn = self.lock();
        conn.execute(
            "INSERT OR IGNORE INTO chain_endpoints (url) VALUES (?1)",
            params![url],
        )
        .map_err(db_err)?;
        let id = conn
            .query_row(
                "SELECT id FROM chain_endpoints WHERE url = ?1",
                params![url],
                |row| row.get::<_, i64>(0),
            )
            .map_err(db_err)?;
        Ok(Endpoint {
            id,
            url: url.to_string(),
        })
    }

    async fn insert_config(&self, new: NewListenerConfig) -> Result<ListenerConfig, StoreError> {
        let spec = serde_json::to_string(&new.spec)?;
        let conn = self.lock();
        conn.execute(
            "INSERT INTO listeners
                (chain_id, spec, contract_address, network, base, url_id, verbose_logging, active)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                &new.chain_id,
                &spec,
                &new.contract_address,
                new.network.as_str(),
                &new.base,
                new.url_id,
                new.verbose_logging as i32,
                new.active as i32,
            ],
        )
        .map_err(db_err)?;
        Ok(ListenerConfig {
            id: conn.last_insert_rowid(),
            chain_id: new.chain_id,
            spec: new.spec,
            contract_address: new.contract_address,
            network: new.network,
            base: new.base,
            url_id: new.url_id,
            verbose_logging: new.verbose_logging,
            active: new.active,
        })
    }

    async fn set_active(&self, id: i64, active: bool) -> Result<(), StoreError> {
        let changed = self
            .lock()
            .execute(
                "UPDATE listeners SET active = ?2 WHERE id = ?1",
                params![id, active as i32],
            )
            .map_err(db_err)?;
        if changed == 0 {
            return Err(StoreError::NotFound {
                what: format!("listener {id}"),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn new_event(hash: &str, data: serde_json::Value) -> NewChainEvent {
        NewChainEvent {
            network: Network::Compound,
            block_number: 77,
            kind: "proposal-created".into(),
            data,
            hash: hash.into(),
            entity_key: Some("proposal-12".into()),
        }
    }

    #[tokio::test]
    async fn insert_and_fetch_event() {
        let store = SqliteStore::in_memory().unwrap();
        let out = store
            .insert_event(new_event("abc", json!({"id": "12"})))
            .await
            .unwrap();
        let EventInsert::Inserted(ev) = out else {
            panic!("expected insert");
        };
        let by_hash = store.event_by_hash("abc").await.unwrap().unwrap();
        assert_eq!(by_hash, ev);
        let by_id = store.event_by_id(ev.id).await.unwrap().unwrap();
        assert_eq!(by_id, ev);
    }

    #[tokio::test]
    async fn duplicate_hash_rejected_by_index() {
        let store = SqliteStore::in_memory().unwrap();
        store
            .insert_event(new_event("dup", json!({"id": "1"})))
            .await
            .unwrap();
        let second = store
            .insert_event(new_event("dup", json!({"id": "1"})))
            .await
            .unwrap();
        assert_eq!(second, EventInsert::Duplicate);
    }

    #[tokio::test]
    async fn notification_pair_unique_only_with_event() {
        let store = SqliteStore::in_memory().unwrap();
        let sub = store
            .insert_subscription(NotificationCategory::ChainEvent, "proposal-12", 3)
            .await
            .unwrap();

        let with_event = || NewNotification {
            subscription_id: sub.id,
            data: json!({"kind": "proposal-created"}),
            chain_event_id: Some(1),
        };
        assert!(matches!(
            store.insert_once(with_event()).await.unwrap(),
            NotificationInsert::Inserted(_)
        ));
        assert_eq!(
            store.insert_once(with_event()).await.unwrap(),
            NotificationInsert::Duplicate
        );

        // Rows without a chain event never collide with each other
        for _ in 0..2 {
            let out = store
                .insert_once(NewNotification {
                    subscription_id: sub.id,
                    data: json!({}),
                    chain_event_id: None,
                })
                .await
                .unwrap();
            assert!(matches!(out, NotificationInsert::Inserted(_)));
        }
        assert_eq!(store.for_subscriber(3).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn outbox_ordering_and_attempts() {
        let store = SqliteStore::in_memory().unwrap();
        for event_id in [10, 11] {
            store
                .enqueue(NewOutboxMessage {
                    event_id,
                    exchange: "chain-events".into(),
                    routing_key: "chain-events.compound".into(),
                })
                .await
                .unwrap();
        }
        let pending = store.load_all().await.unwrap();
        assert_eq!(pending.len(), 2);
        assert_eq!(pending[0].event_id, 10);

        store.bump_attempts(pending[0].id).await.unwrap();
        store.delete(pending[1].id).await.unwrap();
        let pending = store.load_all().await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].attempts, 1);
    }

    #[tokio::test]
    async fn webhooks_filtered_by_category() {
        let store = SqliteStore::in_memory().unwrap();
        store
            .insert_endpoint(
                NotificationCategory::ChainEvent,
                "https://example.com/hook",
                Some("s3cret"),
            )
            .await
            .unwrap();
        store
            .insert_endpoint(NotificationCategory::NewThread, "https://example.com/other", None)
            .await
            .unwrap();

        let hooks = store
            .endpoints_for(NotificationCategory::ChainEvent)
            .await
            .unwrap();
        assert_eq!(hooks.len(), 1);
        assert_eq!(hooks[0].secret.as_deref(), Some("s3cret"));
    }

    #[tokio::test]
    async fn listener_configs_join_endpoints() {
        let store = SqliteStore::in_memory().unwrap();
        let endpoint = store.add_endpoint("wss://mainnet1.edgewa.re").await.unwrap();
        // Same url resolves to the same row
        let again = store.add_endpoint("wss://mainnet1.edgewa.re").await.unwrap();
        assert_eq!(endpoint.id, again.id);

        let new_config = |chain: &str, network: Network, active: bool| NewListenerConfig {
            chain_id: chain.into(),
            spec: json!({"tokenDecimals": 18}),
            contract_address: None,
            network,
            base: "substrate".into(),
            url_id: endpoint.id,
            verbose_logging: true,
            active,
        };
        let edgeware = store
            .insert_config(new_config("edgeware", Network::Substrate, true))
            .await
            .unwrap();
        store
            .insert_config(new_config("kusama", Network::Substrate, false))
            .await
            .unwrap();

        let active = store.active_configs().await.unwrap();
        assert_eq!(active.len(), 1);
        let (config, ep) = &active[0];
        assert_eq!(config.chain_id, "edgeware");
        assert_eq!(config.spec["tokenDecimals"], 18);
        assert!(config.verbose_logging);
        assert_eq!(ep.url, "wss://mainnet1.edgewa.re");

        store.set_active(edgeware.id, false).await.unwrap();
        assert!(store.active_configs().await.unwrap().is_empty());
        assert!(store.set_active(9999, true).await.is_err());
    }
}
