//! # melodia_rpc
//!
//! Length-delimited framed RPC protocol for Melodia's internal
//! identity services (auth and user daemons), plus a typed client.
//!
//! Every frame is a JSON envelope inside a `LengthDelimitedCodec`
//! frame. Responses carry a status code modeled after the usual RPC
//! vocabulary: `Ok`, `InvalidArgument`, `AlreadyExists`, `NotFound`,
//! `PermissionDenied`, `Internal`.

pub mod client;
pub mod server;
pub mod wire;

pub use client::{RpcClient, RpcError};
pub use server::{AUTH_SERVICE_METHODS, USER_SERVICE_METHODS};
pub use wire::{Method, Status};
