//! RWTS Travel Planner Library
//!
//! Quote-generation backend for a travel agency: admin-managed rate sheets
//! and settings, a three-tier package pricing engine, and customer lead
//! intake.
//!
//! # Modules
//!
//! - `api`: API-layer namespace (handlers, router).
//! - `core`: Domain-layer namespace (pricing, models, errors).
//! - `config`: Configuration management.
//! - `db`: Database connection, pool and schema bootstrap.
//! - `db_storage`: Postgres implementation of the storage traits.
//! - `errors`: Error handling types.
//! - `handlers`: HTTP request handlers.
//! - `intake`: Lenient request schemas for public endpoints.
//! - `models`: Rate, settings, lead and package models.
//! - `pricing`: Package pricing engine.
//! - `routes`: Router and middleware.
//! - `storage`: Storage traits and the in-memory backing.

pub mod api;
pub mod core;

pub mod config;
pub mod db;
pub mod db_storage;
pub mod errors;
pub mod handlers;
pub mod intake;
pub mod models;
pub mod pricing;
pub mod routes;
pub mod storage;
