//! Cardmatch API Library
//!
//! Backend for the credit-card recommendation app: profile CRUD, a static
//! card catalog, deterministic match scoring, recommendation batches, card
//! applications with notification side effects, and a bearer-token
//! authentication gate delegating to an external identity provider.
//!
//! # Modules
//!
//! - `auth`: authentication gate middleware and ownership checks.
//! - `auth_client`: identity provider client.
//! - `config`: configuration management.
//! - `db`: database connection and pool management.
//! - `errors`: error handling types.
//! - `handlers`: HTTP request handlers.
//! - `models`: core data models and wire shapes.
//! - `push_client`: push messaging gateway client.
//! - `router`: route table and middleware stack.
//! - `scoring`: the match scoring engine.
//! - `seed`: one-time card catalog seed.
//! - `services`: recommendation generation and application workflow.

pub mod auth;
pub mod auth_client;
pub mod config;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod push_client;
pub mod router;
pub mod scoring;
pub mod seed;
pub mod services;
