//! Security audit logging for authentication events
//!
//! Every login, logout, and refresh outcome is logged at INFO level with the
//! "audit" target so it can be filtered and routed separately from
//! application logs. Token values are never part of an event.
//!
//! Author: hephaex@gmail.com

use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Request metadata attached to audit events
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientInfo {
    /// Client IP address (from proxy headers)
    pub ip_address: Option<String>,
    /// User agent string
    pub user_agent: Option<String>,
}

impl ClientInfo {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            ip_address: extract_ip_address(headers),
            user_agent: extract_user_agent(headers),
        }
    }
}

/// Security audit events for the session lifecycle
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum AuditEvent {
    /// Principal authenticated and a session was opened
    LoginSuccess {
        principal_id: i64,
        role: String,
        session_id: i64,
        ip_address: Option<String>,
        user_agent: Option<String>,
    },

    /// Failed administrator login
    LoginFailure {
        username: String,
        reason: String,
        ip_address: Option<String>,
        user_agent: Option<String>,
    },

    /// End-user implicitly registered on first login
    UserRegistered {
        user_id: i64,
        email: String,
        ip_address: Option<String>,
    },

    /// Session closed and its tokens blacklisted
    Logout {
        session_id: i64,
        access_token_revoked: bool,
        ip_address: Option<String>,
    },

    /// Logout refused
    LogoutRejected {
        reason: String,
        ip_address: Option<String>,
    },

    /// New access token minted from a session
    TokenRefresh {
        principal_id: i64,
        role: String,
        session_id: i64,
        ip_address: Option<String>,
    },

    /// Refresh refused
    RefreshRejected {
        reason: String,
        session_id: Option<i64>,
        ip_address: Option<String>,
    },

    /// Invalid, expired, or revoked token presented to a protected route
    InvalidToken {
        reason: String,
        ip_address: Option<String>,
        user_agent: Option<String>,
    },
}

/// Log a security audit event with structured fields
///
/// The full event is also attached as a JSON string for log aggregators.
pub fn audit_log(event: &AuditEvent) {
    let event_json = serde_json::to_string(event)
        .unwrap_or_else(|e| format!("{{\"error\":\"Failed to serialize audit event: {e}\"}}"));

    match event {
        AuditEvent::LoginSuccess {
            principal_id,
            role,
            session_id,
            ip_address,
            ..
        } => {
            info!(
                target: "audit",
                event = %event_json,
                principal_id = %principal_id,
                role = %role,
                session_id = %session_id,
                ip_address = ?ip_address,
                "Login successful"
            );
        }
        AuditEvent::LoginFailure {
            username,
            reason,
            ip_address,
            ..
        } => {
            info!(
                target: "audit",
                event = %event_json,
                username = %username,
                reason = %reason,
                ip_address = ?ip_address,
                "Login failed"
            );
        }
        AuditEvent::UserRegistered {
            user_id,
            email,
            ip_address,
        } => {
            info!(
                target: "audit",
                event = %event_json,
                user_id = %user_id,
                email = %email,
                ip_address = ?ip_address,
                "User registered"
            );
        }
        AuditEvent::Logout {
            session_id,
            access_token_revoked,
            ip_address,
        } => {
            info!(
                target: "audit",
                event = %event_json,
                session_id = %session_id,
                access_token_revoked = %access_token_revoked,
                ip_address = ?ip_address,
                "Logout"
            );
        }
        AuditEvent::LogoutRejected { reason, ip_address } => {
            info!(
                target: "audit",
                event = %event_json,
                reason = %reason,
                ip_address = ?ip_address,
                "Logout rejected"
            );
        }
        AuditEvent::TokenRefresh {
            principal_id,
            role,
            session_id,
            ip_address,
        } => {
            info!(
                target: "audit",
                event = %event_json,
                principal_id = %principal_id,
                role = %role,
                session_id = %session_id,
                ip_address = ?ip_address,
                "Token refresh"
            );
        }
        AuditEvent::RefreshRejected {
            reason,
            session_id,
            ip_address,
        } => {
            info!(
                target: "audit",
                event = %event_json,
                reason = %reason,
                session_id = ?session_id,
                ip_address = ?ip_address,
                "Refresh rejected"
            );
        }
        AuditEvent::InvalidToken {
            reason, ip_address, ..
        } => {
            info!(
                target: "audit",
                event = %event_json,
                reason = %reason,
                ip_address = ?ip_address,
                "Invalid token"
            );
        }
    }
}

/// Extract client IP address from proxy headers
///
/// Checks X-Forwarded-For (first hop) and then X-Real-IP.
pub fn extract_ip_address(headers: &HeaderMap) -> Option<String> {
    if let Some(xff) = headers.get("x-forwarded-for") {
        if let Ok(xff_str) = xff.to_str() {
            if let Some(first_ip) = xff_str.split(',').next() {
                return Some(first_ip.trim().to_string());
            }
        }
    }

    if let Some(real_ip) = headers.get("x-real-ip") {
        if let Ok(ip_str) = real_ip.to_str() {
            return Some(ip_str.to_string());
        }
    }

    None
}

/// Extract user agent from request headers
pub fn extract_user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get(axum::http::header::USER_AGENT)
        .and_then(|ua| ua.to_str().ok())
        .map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audit_event_serialization() {
        let event = AuditEvent::LoginSuccess {
            principal_id: 42,
            role: "user".to_string(),
            session_id: 7,
            ip_address: Some("192.168.1.1".to_string()),
            user_agent: None,
        };

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"event_type\":\"login_success\""));
        assert!(json.contains("\"session_id\":7"));
    }

    #[test]
    fn test_audit_log_does_not_panic() {
        audit_log(&AuditEvent::RefreshRejected {
            reason: "token blacklisted".to_string(),
            session_id: Some(3),
            ip_address: None,
        });
        audit_log(&AuditEvent::LogoutRejected {
            reason: "session not found".to_string(),
            ip_address: Some("203.0.113.1".to_string()),
        });
    }

    #[test]
    fn test_extract_ip_from_x_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            "203.0.113.1, 198.51.100.1".parse().unwrap(),
        );

        assert_eq!(extract_ip_address(&headers), Some("203.0.113.1".to_string()));
    }

    #[test]
    fn test_extract_ip_from_x_real_ip() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", "203.0.113.1".parse().unwrap());

        assert_eq!(extract_ip_address(&headers), Some("203.0.113.1".to_string()));
    }

    #[test]
    fn test_client_info_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::USER_AGENT,
            "Mozilla/5.0 (Test)".parse().unwrap(),
        );

        let info = ClientInfo::from_headers(&headers);
        assert_eq!(info.ip_address, None);
        assert_eq!(info.user_agent.as_deref(), Some("Mozilla/5.0 (Test)"));
    }
}
