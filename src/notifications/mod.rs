//! Notification bookkeeping: unread counts, read/unread grouping, and the
//! events pushed over the notification socket.

pub mod format;
pub mod socket;

pub use format::{INVALID_DATE_PLACEHOLDER, format_timestamp};
pub use socket::{ConnectionState, NotificationSocket, SocketConfig, notification_ws_url};

use serde::{Deserialize, Serialize};

use crate::api::models::Notification;
use crate::api::{ApiClient, Resource};
use crate::errors::ApiError;

// ── Push events ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum NotificationEvent {
    NotificationCreated { notification: Notification },
    NotificationRead { id: i64 },
    AllRead,
    NotificationDeleted { id: i64 },
}

impl NotificationEvent {
    /// Decode a socket frame. A bare notification object counts as
    /// `NotificationCreated`.
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        match serde_json::from_str::<Self>(text) {
            Ok(event) => Ok(event),
            Err(tagged_err) => serde_json::from_str::<Notification>(text)
                .map(|notification| Self::NotificationCreated { notification })
                .map_err(|_| tagged_err),
        }
    }
}

// ── NotificationCenter ──────────────────────────────────────────────

/// Notifications split by read state, each in list order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotificationGroups<'a> {
    pub unread: Vec<&'a Notification>,
    pub read: Vec<&'a Notification>,
}

#[derive(Debug, Clone, Default)]
pub struct NotificationCenter {
    items: Vec<Notification>,
}

impl NotificationCenter {
    pub fn new(items: Vec<Notification>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[Notification] {
        &self.items
    }

    pub fn unread_count(&self) -> usize {
        self.items.iter().filter(|n| !n.is_read).count()
    }

    pub fn grouped(&self) -> NotificationGroups<'_> {
        let (unread, read) = self.items.iter().partition(|n| !n.is_read);
        NotificationGroups { unread, read }
    }

    /// Returns false when `id` is unknown.
    pub fn mark_read(&mut self, id: i64) -> bool {
        match self.items.iter_mut().find(|n| n.id == id) {
            Some(n) => {
                n.is_read = true;
                true
            }
            None => false,
        }
    }

    /// Returns how many notifications changed state.
    pub fn mark_all_read(&mut self) -> usize {
        let mut changed = 0;
        for n in self.items.iter_mut().filter(|n| !n.is_read) {
            n.is_read = true;
            changed += 1;
        }
        changed
    }

    /// Apply a pushed event. New notifications go to the front; a repeated
    /// id replaces the existing entry.
    pub fn apply(&mut self, event: NotificationEvent) {
        match event {
            NotificationEvent::NotificationCreated { notification } => {
                self.items.retain(|n| n.id != notification.id);
                self.items.insert(0, notification);
            }
            NotificationEvent::NotificationRead { id } => {
                self.mark_read(id);
            }
            NotificationEvent::AllRead => {
                self.mark_all_read();
            }
            NotificationEvent::NotificationDeleted { id } => {
                self.items.retain(|n| n.id != id);
            }
        }
    }
}

// ── Server calls ────────────────────────────────────────────────────

pub async fn fetch_notifications(client: &ApiClient) -> Result<Vec<Notification>, ApiError> {
    client.get_list(Resource::Notifications.path(), &[]).await
}

/// `PATCH /api/notifications/{id}/read`
pub async fn mark_read_remote(client: &ApiClient, id: i64) -> Result<(), ApiError> {
    let path = format!("{}/read", Resource::Notifications.item_path(id));
    client.patch_ack(&path, &serde_json::json!({})).await
}

/// `PATCH /api/notifications/read-all`
pub async fn mark_all_read_remote(client: &ApiClient) -> Result<(), ApiError> {
    let path = format!("{}/read-all", Resource::Notifications.path());
    client.patch_ack(&path, &serde_json::json!({})).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::NoAuth;
    use axum::{Json, Router, routing::patch};
    use serde_json::json;
    use std::sync::{Arc, Mutex};
    use tokio::net::TcpListener;

    fn notification(id: i64, is_read: bool) -> Notification {
        Notification {
            id,
            title: format!("Bildirim {}", id),
            message: "Sipariş SP-2024-014 üretime alındı".to_string(),
            kind: "info".to_string(),
            is_read,
            created_at: "2024-05-20T09:00:00Z".to_string(),
            link: None,
        }
    }

    #[test]
    fn test_one_unread_one_read() {
        let center = NotificationCenter::new(vec![notification(1, false), notification(2, true)]);
        assert_eq!(center.unread_count(), 1);
        let groups = center.grouped();
        assert_eq!(groups.unread.len(), 1);
        assert_eq!(groups.unread[0].id, 1);
        assert_eq!(groups.read[0].id, 2);
    }

    #[test]
    fn test_grouping_preserves_order() {
        let center = NotificationCenter::new(vec![
            notification(5, false),
            notification(4, true),
            notification(3, false),
            notification(2, true),
        ]);
        let groups = center.grouped();
        let unread: Vec<i64> = groups.unread.iter().map(|n| n.id).collect();
        let read: Vec<i64> = groups.read.iter().map(|n| n.id).collect();
        assert_eq!(unread, vec![5, 3]);
        assert_eq!(read, vec![4, 2]);
    }

    #[test]
    fn test_mark_read_and_mark_all_read() {
        let mut center = NotificationCenter::new(vec![
            notification(1, false),
            notification(2, false),
            notification(3, true),
        ]);
        assert!(center.mark_read(1));
        assert!(!center.mark_read(99));
        assert_eq!(center.unread_count(), 1);
        assert_eq!(center.mark_all_read(), 1);
        assert_eq!(center.unread_count(), 0);
    }

    #[test]
    fn test_apply_events() {
        let mut center = NotificationCenter::new(vec![notification(1, false)]);
        center.apply(NotificationEvent::NotificationCreated {
            notification: notification(2, false),
        });
        assert_eq!(center.items()[0].id, 2);
        assert_eq!(center.unread_count(), 2);

        center.apply(NotificationEvent::NotificationRead { id: 2 });
        assert_eq!(center.unread_count(), 1);

        center.apply(NotificationEvent::NotificationDeleted { id: 1 });
        assert_eq!(center.items().len(), 1);

        center.apply(NotificationEvent::NotificationCreated {
            notification: notification(2, false),
        });
        assert_eq!(center.items().len(), 1);

        center.apply(NotificationEvent::AllRead);
        assert_eq!(center.unread_count(), 0);
    }

    #[test]
    fn test_event_wire_format() {
        let json = serde_json::to_string(&NotificationEvent::NotificationRead { id: 4 }).unwrap();
        assert!(json.contains("\"type\":\"NotificationRead\""));
        assert!(json.contains("\"data\":{\"id\":4}"));

        let event = NotificationEvent::parse(r#"{"type":"AllRead"}"#).unwrap();
        assert_eq!(event, NotificationEvent::AllRead);
    }

    #[test]
    fn test_parse_accepts_bare_notification() {
        let event =
            NotificationEvent::parse(r#"{"id":7,"title":"Bakım planı yaklaşıyor","isRead":false}"#)
                .unwrap();
        match event {
            NotificationEvent::NotificationCreated { notification } => {
                assert_eq!(notification.id, 7);
            }
            other => panic!("Expected NotificationCreated, got {:?}", other),
        }
        assert!(NotificationEvent::parse("ping").is_err());
    }

    #[tokio::test]
    async fn test_remote_read_endpoints() {
        let seen = Arc::new(Mutex::new(Vec::<String>::new()));
        let a = seen.clone();
        let b = seen.clone();
        let router = Router::new()
            .route(
                "/api/notifications/{id}/read",
                patch(move |axum::extract::Path(id): axum::extract::Path<i64>| {
                    let a = a.clone();
                    async move {
                        a.lock().unwrap().push(format!("read:{}", id));
                        Json(json!({"success": true}))
                    }
                }),
            )
            .route(
                "/api/notifications/read-all",
                patch(move || {
                    let b = b.clone();
                    async move {
                        b.lock().unwrap().push("read-all".to_string());
                        axum::http::StatusCode::NO_CONTENT
                    }
                }),
            );
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        let client = ApiClient::new(format!("http://{}", addr), Arc::new(NoAuth)).unwrap();

        mark_read_remote(&client, 12).await.unwrap();
        mark_all_read_remote(&client).await.unwrap();
        assert_eq!(*seen.lock().unwrap(), vec!["read:12", "read-all"]);
    }
}
