//! Integration tests for the importer
//!
//! These tests use wiremock to stand in for the survey server and a
//! temporary SQLite catalog to check full runs end-to-end.

mod import_tests;
