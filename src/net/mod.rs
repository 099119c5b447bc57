//! Network layer subsystem.
//!
//! Plain TCP listeners are bound by the caller and handed to
//! [`HttpServer::run`](crate::http::HttpServer::run); TLS termination is
//! optional and configured through `listener.tls`.

pub mod tls;
