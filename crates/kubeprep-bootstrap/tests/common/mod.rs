//! Shared test utilities for kubeprep-bootstrap integration tests

#![allow(dead_code)]

pub mod fixtures;
pub mod mocks;
