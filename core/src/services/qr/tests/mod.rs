//! Unit tests for the QR token services

mod service_tests;
